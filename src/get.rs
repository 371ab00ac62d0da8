//! Lookup: Patricia descent plus the per-leaf verification scan.

use crate::arena::NodeIdx;
use crate::node::Node;
use crate::LpmTrie;

impl LpmTrie {
    /// Length of the longest stored prefix covering `addr`, if any.
    ///
    /// ```
    /// # use lpm_trie::LpmTrie;
    /// let mut trie = LpmTrie::new();
    /// trie.insert(0, 0)?; // 0.0.0.0/0
    /// trie.insert(0xc0a80100, 24)?; // 192.168.1.0/24
    /// assert_eq!(trie.longest_match(0xc0a80105), Some(24)); // 192.168.1.5
    /// assert_eq!(trie.longest_match(0xc0a80205), Some(0)); // 192.168.2.5
    /// # Ok::<(), lpm_trie::Error>(())
    /// ```
    pub fn longest_match(&self, addr: u32) -> Option<u8> {
        if self.root_child().is_none() {
            return None;
        }
        // The descent only looks at branch bits, so the reached leaf is a
        // candidate, not a guaranteed match; `best_match` settles it.
        let leaf = self.leaf_for(addr);
        let data = &self.data[self.nodes[leaf].leaf_data()];
        data.masks.best_match(data.key, addr)
    }

    /// Descend on branch bits to the unique leaf that could store `key`.
    ///
    /// The tree must be non-empty. The result's key still has to be compared
    /// against `key` by the caller.
    pub(crate) fn leaf_for(&self, key: u32) -> NodeIdx {
        let mut cur = self.root_child();
        debug_assert!(!cur.is_none());
        loop {
            match self.nodes[cur] {
                Node::Inner { bit, zero, one, .. } => {
                    cur = if key & (1 << bit) != 0 { one } else { zero };
                }
                Node::Leaf { .. } => return cur,
                Node::Root { .. } => unreachable!("the root has no incoming edges"),
            }
        }
    }
}
