//! Serialization and deserialization as a flat list of `(base, mask length)`
//! pairs.

use ::serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::LpmTrie;

impl Serialize for LpmTrie {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let prefixes: Vec<(u32, u8)> = self.iter().collect();
        prefixes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LpmTrie {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let prefixes: Vec<(u32, u8)> = Vec::deserialize(deserializer)?;
        let mut trie = LpmTrie::new();
        for (base, len) in prefixes {
            trie.insert(base, len).map_err(de::Error::custom)?;
        }
        Ok(trie)
    }
}

#[cfg(test)]
mod test {
    use crate::LpmTrie;

    #[test]
    fn round_trip() {
        let mut trie = LpmTrie::new();
        for (base, len) in [
            (0x0a000000u32, 8u8),
            (0x0a010000, 16),
            (0x0a020000, 16),
            (0x0a020100, 24),
            (0x0a020100, 25),
        ] {
            trie.insert(base, len).unwrap();
        }
        let s = serde_json::to_string(&trie).unwrap();
        let back: LpmTrie = serde_json::from_str(&s).unwrap();
        assert_eq!(trie, back);
    }

    #[test]
    fn empty_round_trip() {
        let s = serde_json::to_string(&LpmTrie::new()).unwrap();
        let back: LpmTrie = serde_json::from_str(&s).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn invalid_prefixes_are_rejected() {
        // 10.0.0.1/8 has host bits set.
        assert!(serde_json::from_str::<LpmTrie>("[[167772161,8]]").is_err());
        assert!(serde_json::from_str::<LpmTrie>("[[0,33]]").is_err());
    }
}
