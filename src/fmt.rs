//! Formatting implementation for the trie.

use std::fmt::{Debug, Formatter, Result};
use std::net::Ipv4Addr;

use crate::arena::NodeIdx;
use crate::node::Node;
use crate::LpmTrie;

impl Debug for LpmTrie {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let top = self.root_child();
        if top.is_none() {
            return f.write_str("{}");
        }
        DebugNode(self, top).fmt(f)
    }
}

struct DebugNode<'a>(&'a LpmTrie, NodeIdx);

impl Debug for DebugNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let idx = self.1;
        match trie.nodes[idx] {
            Node::Inner { bit, zero, one, .. } => f
                .debug_map()
                .entry(&bit, &(DebugNode(trie, zero), DebugNode(trie, one)))
                .finish(),
            Node::Leaf { data, .. } => {
                let record = &trie.data[data];
                f.debug_map()
                    .entry(&Ipv4Addr::from(record.key), &record.masks)
                    .finish()
            }
            Node::Root { .. } => unreachable!("the root has no incoming edges"),
        }
    }
}
