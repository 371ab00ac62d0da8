//! Randomized model checking of the trie (quickcheck).

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::net::Ipv4Addr;

use quickcheck::{Arbitrary, Gen};

use crate::arena::NodeIdx;
use crate::node::Node;
use crate::{netmask, LpmTrie};

const DEFAULT_NUM_TESTS: usize = 2000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        if !f(input.clone()) {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for smaller in input.shrink() {
        if !f(smaller.clone()) {
            shrink_failure(f, smaller)
        }
    }
    // every shrunken input passes, so `input` is minimal
    panic!("[QUICKCHECK] Test case failed!\n  Minimal input:\n    {input:?}");
}

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

mod basic;

/// A well-formed `(base, mask length)` pair. Mask lengths are biased toward
/// short masks and bases toward a small pool, so random cases collide on
/// keys and share leaves.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TestPrefix(pub(crate) u32, pub(crate) u8);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.0), self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1, 2, 2, 3, 3, 4, 4,
                5, 5, 6, 6, 7, 7, 8, 8,
                9, 10, 12, 16, 16, 24, 24, 25, 26, 31, 32, 32,
            ])
            .unwrap();
        let mut base = u32::arbitrary(g);
        if bool::arbitrary(g) {
            base &= 0x8301_0380;
        }
        TestPrefix(base & netmask(len), len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            quickcheck::single_shrinker(TestPrefix(self.0 & netmask(len), len))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Op {
    Insert(TestPrefix),
    Remove(TestPrefix),
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let p = TestPrefix::arbitrary(g);
        if g.choose(&[true, true, true, true, true, false, false])
            .copied()
            .unwrap_or(true)
        {
            Op::Insert(p)
        } else {
            Op::Remove(p)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match *self {
            Op::Insert(p) => Box::new(p.shrink().map(Op::Insert)),
            Op::Remove(p) => Box::new(p.shrink().map(Op::Remove)),
        }
    }
}

/// Run `ops` against both the trie and the reference model, checking that
/// every operation reports the same outcome on both sides.
pub(crate) fn apply(trie: &mut LpmTrie, model: &mut BTreeSet<(u32, u8)>, ops: &[Op]) -> bool {
    ops.iter().all(|op| match *op {
        Op::Insert(TestPrefix(base, len)) => trie.insert(base, len) == Ok(model.insert((base, len))),
        Op::Remove(TestPrefix(base, len)) => {
            trie.remove(base, len).is_ok() == model.remove(&(base, len))
        }
    })
}

/// Brute-force longest prefix match over the model.
pub(crate) fn model_lpm(model: &BTreeSet<(u32, u8)>, addr: u32) -> Option<u8> {
    model
        .iter()
        .filter(|&&(base, len)| (base ^ addr) & netmask(len) == 0)
        .map(|&(_, len)| len)
        .max()
}

/// Walk the whole tree and verify its structural invariants: parent/child
/// symmetry, two children per inner node, strictly decreasing branch bits,
/// bit-partitioned subtrees, distinct keys, well-formed non-empty mask sets,
/// an accurate prefix count, and a node table without leaked slots.
pub(crate) fn invariants_ok(trie: &LpmTrie) -> bool {
    let top = trie.root_child();
    if top.is_none() {
        return trie.len() == 0 && trie.nodes.len() == 1;
    }
    let mut keys = Vec::new();
    let mut prefixes = 0;
    let mut nodes = 0;
    if !walk(
        trie, top, trie.root, 0, 0, 33, &mut keys, &mut prefixes, &mut nodes,
    ) {
        return false;
    }
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    keys.len() == total && prefixes == trie.len() && nodes + 1 == trie.nodes.len()
}

/// `pattern`/`care` carry the bit constraints imposed by ancestors: every
/// key in this subtree must satisfy `key & care == pattern`. `bound` is the
/// parent's branch bit (33 when unconstrained).
#[allow(clippy::too_many_arguments)]
fn walk(
    trie: &LpmTrie,
    idx: NodeIdx,
    parent: NodeIdx,
    pattern: u32,
    care: u32,
    bound: u8,
    keys: &mut Vec<u32>,
    prefixes: &mut usize,
    nodes: &mut usize,
) -> bool {
    *nodes += 1;
    match trie.nodes[idx] {
        Node::Root { .. } => false,
        Node::Inner {
            bit,
            parent: up,
            zero,
            one,
        } => {
            up == parent
                && bit < bound
                && !zero.is_none()
                && !one.is_none()
                && walk(
                    trie,
                    zero,
                    idx,
                    pattern,
                    care | (1 << bit),
                    bit,
                    keys,
                    prefixes,
                    nodes,
                )
                && walk(
                    trie,
                    one,
                    idx,
                    pattern | (1 << bit),
                    care | (1 << bit),
                    bit,
                    keys,
                    prefixes,
                    nodes,
                )
        }
        Node::Leaf { parent: up, data } => {
            let record = &trie.data[data];
            let sorted = record
                .masks
                .iter()
                .zip(record.masks.iter().skip(1))
                .all(|(a, b)| a < b);
            let well_formed = record
                .masks
                .iter()
                .all(|&len| len <= 32 && record.key & !netmask(len) == 0);
            keys.push(record.key);
            *prefixes += record.masks.iter().count();
            up == parent
                && record.key & care == pattern
                && !record.masks.is_empty()
                && sorted
                && well_formed
        }
    }
}
