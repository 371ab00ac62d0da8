//! Insertion: split at the divergence bit and splice a fresh leaf in.

use crate::arena::NodeIdx;
use crate::leaf::{LeafData, MaskSet};
use crate::node::Node;
use crate::{valid, Error, LpmTrie};

impl LpmTrie {
    /// Insert the prefix `base/len`.
    ///
    /// Returns `Ok(true)` when the prefix is new and `Ok(false)` when it was
    /// already stored, in which case the call changes nothing.
    ///
    /// ```
    /// # use lpm_trie::{Error, LpmTrie};
    /// let mut trie = LpmTrie::new();
    /// assert_eq!(trie.insert(0x0a000000, 8), Ok(true));
    /// assert_eq!(trie.insert(0x0a000000, 8), Ok(false));
    /// assert_eq!(
    ///     trie.insert(0x0a000001, 8),
    ///     Err(Error::InvalidPrefix { base: 0x0a000001, len: 8 }),
    /// );
    /// assert_eq!(trie.len(), 1);
    /// ```
    pub fn insert(&mut self, base: u32, len: u8) -> Result<bool, Error> {
        if !valid(base, len) {
            return Err(Error::InvalidPrefix { base, len });
        }

        let top = self.root_child();
        if top.is_none() {
            let leaf = self.alloc_leaf(base, len);
            self.set_root_child(leaf);
            self.count += 1;
            return Ok(true);
        }

        let found = self.leaf_for(base);
        let data = self.nodes[found].leaf_data();
        let key = self.data[data].key;
        if key == base {
            let added = self.data[data].masks.insert(len);
            self.count += usize::from(added);
            return Ok(added);
        }

        let bit = divergence_bit(key, base);

        // The new inner node either becomes the topmost node (the candidate
        // is the root child, or every branch bit on the way down is below
        // `bit`), or it sits right under the first ancestor of the candidate
        // whose branch bit is above `bit`.
        if found == top || branch_bit(&self.nodes[top]) < bit {
            let leaf = self.alloc_leaf(base, len);
            let split = self.join(leaf, top, bit, base);
            self.set_root_child(split);
        } else {
            let mut below = found;
            let mut above = self.nodes[below].parent();
            while branch_bit(&self.nodes[above]) < bit {
                below = above;
                above = self.nodes[above].parent();
            }
            // Keys are distinct, so no ancestor tests `bit` itself.
            debug_assert!(branch_bit(&self.nodes[above]) > bit);
            let leaf = self.alloc_leaf(base, len);
            let split = self.join(leaf, below, bit, base);
            self.nodes[split].set_parent(above);
            self.replace_child(above, below, split);
        }
        self.count += 1;
        Ok(true)
    }

    fn alloc_leaf(&mut self, base: u32, len: u8) -> NodeIdx {
        let data = self.data.alloc(LeafData {
            key: base,
            masks: MaskSet::single(len),
        });
        self.nodes.alloc(Node::Leaf {
            parent: NodeIdx::NONE,
            data,
        })
    }

    /// Build the inner node splitting at `bit`: `leaf`, whose key is `key`,
    /// goes to the side bit `bit` of `key` selects, `sibling` to the other.
    /// Both get their parent rewired; the new node's own parent is left for
    /// the caller to set.
    fn join(&mut self, leaf: NodeIdx, sibling: NodeIdx, bit: u8, key: u32) -> NodeIdx {
        let (zero, one) = if key & (1 << bit) != 0 {
            (sibling, leaf)
        } else {
            (leaf, sibling)
        };
        let split = self.nodes.alloc(Node::Inner {
            bit,
            parent: NodeIdx::NONE,
            zero,
            one,
        });
        self.nodes[zero].set_parent(split);
        self.nodes[one].set_parent(split);
        split
    }
}

/// Highest bit position at which two distinct keys differ.
fn divergence_bit(a: u32, b: u32) -> u8 {
    debug_assert_ne!(a, b);
    (31 - (a ^ b).leading_zeros()) as u8
}

fn branch_bit(node: &Node) -> u8 {
    match *node {
        Node::Inner { bit, .. } => bit,
        _ => unreachable!("expected an inner node"),
    }
}
