//! Deletion: shrink the leaf's mask set, collapsing its parent when the set
//! empties.

use crate::arena::NodeIdx;
use crate::node::Node;
use crate::{valid, Error, LpmTrie};

impl LpmTrie {
    /// Remove the prefix `base/len`.
    ///
    /// Fails with [`Error::NotFound`] when the prefix is not stored and with
    /// [`Error::InvalidPrefix`] when it is malformed; a failed call leaves
    /// the index untouched.
    ///
    /// ```
    /// # use lpm_trie::{Error, LpmTrie};
    /// let mut trie = LpmTrie::new();
    /// trie.insert(0xc0a80100, 24)?; // 192.168.1.0/24
    /// assert_eq!(trie.remove(0xc0a80100, 24), Ok(()));
    /// assert_eq!(trie.remove(0xc0a80100, 24), Err(Error::NotFound));
    /// assert!(trie.is_empty());
    /// # Ok::<(), lpm_trie::Error>(())
    /// ```
    pub fn remove(&mut self, base: u32, len: u8) -> Result<(), Error> {
        if !valid(base, len) {
            return Err(Error::InvalidPrefix { base, len });
        }
        if self.root_child().is_none() {
            return Err(Error::NotFound);
        }

        let leaf = self.leaf_for(base);
        let data = self.nodes[leaf].leaf_data();
        let record = &mut self.data[data];
        if record.key != base || !record.masks.remove(len) {
            return Err(Error::NotFound);
        }
        self.count -= 1;
        if !record.masks.is_empty() {
            return Ok(());
        }
        self.unlink_leaf(leaf);
        Ok(())
    }

    /// Detach `leaf`, whose mask set has emptied, and free it together with
    /// the inner parent it leaves behind.
    fn unlink_leaf(&mut self, leaf: NodeIdx) {
        self.data.release(self.nodes[leaf].leaf_data());

        let parent = self.nodes[leaf].parent();
        if parent == self.root {
            self.set_root_child(NodeIdx::NONE);
            self.nodes[leaf].disconnect();
            self.nodes.free(leaf);
            return;
        }

        // The parent collapses: its other child takes its place under the
        // grandparent.
        let (grand, sibling) = match self.nodes[parent] {
            Node::Inner {
                parent: grand,
                zero,
                one,
                ..
            } => (grand, if zero == leaf { one } else { zero }),
            _ => unreachable!("a stored leaf hangs off the root or an inner node"),
        };
        debug_assert!(!sibling.is_none());

        if grand == self.root {
            self.set_root_child(sibling);
        } else {
            self.nodes[sibling].set_parent(grand);
            self.replace_child(grand, parent, sibling);
        }

        self.nodes[leaf].disconnect();
        self.nodes[parent].disconnect();
        // Free the higher index first: compaction fills a hole from the last
        // slot, and the lower of the two can never be the last slot here.
        let (first, second) = if leaf > parent {
            (leaf, parent)
        } else {
            (parent, leaf)
        };
        self.nodes.free(first);
        self.nodes.free(second);
    }
}
