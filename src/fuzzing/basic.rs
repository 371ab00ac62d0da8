use std::collections::BTreeSet;

use itertools::Itertools;

use super::*;
use crate::Error;

qc!(matches_model, _matches_model);
fn _matches_model(ops: Vec<Op>) -> bool {
    let mut trie = LpmTrie::new();
    let mut model = BTreeSet::new();
    apply(&mut trie, &mut model, &ops)
        && trie.len() == model.len()
        && trie.iter().eq(model.iter().copied())
        && invariants_ok(&trie)
}

qc!(
    longest_match_agrees_with_the_model,
    _longest_match_agrees_with_the_model
);
fn _longest_match_agrees_with_the_model((ops, probes): (Vec<Op>, Vec<u32>)) -> bool {
    let mut trie = LpmTrie::new();
    let mut model = BTreeSet::new();
    if !apply(&mut trie, &mut model, &ops) {
        return false;
    }
    // Probe random addresses plus both ends of every stored range.
    let stored = model
        .iter()
        .flat_map(|&(base, len)| [base, base | !netmask(len)])
        .collect_vec();
    probes
        .into_iter()
        .chain(stored)
        .all(|addr| trie.longest_match(addr) == model_lpm(&model, addr))
}

qc!(insert_is_idempotent, _insert_is_idempotent);
fn _insert_is_idempotent((ops, extra): (Vec<Op>, TestPrefix)) -> bool {
    let mut trie = LpmTrie::new();
    let mut model = BTreeSet::new();
    if !apply(&mut trie, &mut model, &ops) {
        return false;
    }
    let TestPrefix(base, len) = extra;
    if trie.insert(base, len) != Ok(model.insert((base, len))) {
        return false;
    }
    let before = trie.iter().collect_vec();
    trie.insert(base, len) == Ok(false)
        && trie.iter().eq(before.iter().copied())
        && trie.len() == model.len()
        && invariants_ok(&trie)
}

qc!(
    remove_of_absent_fails_without_side_effects,
    _remove_of_absent_fails_without_side_effects
);
fn _remove_of_absent_fails_without_side_effects((ops, victim): (Vec<Op>, TestPrefix)) -> bool {
    let mut trie = LpmTrie::new();
    let mut model = BTreeSet::new();
    if !apply(&mut trie, &mut model, &ops) {
        return false;
    }
    let TestPrefix(base, len) = victim;
    if trie.remove(base, len).is_ok() != model.remove(&(base, len)) {
        return false;
    }
    // The second removal must fail and leave everything in place.
    let before = trie.iter().collect_vec();
    trie.remove(base, len) == Err(Error::NotFound)
        && trie.iter().eq(before.iter().copied())
        && trie.len() == model.len()
        && invariants_ok(&trie)
}

qc!(
    inserts_then_removes_empty_the_tree,
    _inserts_then_removes_empty_the_tree
);
fn _inserts_then_removes_empty_the_tree(list: Vec<TestPrefix>) -> bool {
    let mut trie = LpmTrie::new();
    let mut model = BTreeSet::new();
    for &TestPrefix(base, len) in &list {
        if trie.insert(base, len) != Ok(model.insert((base, len))) {
            return false;
        }
    }
    // Remove interleaved halves to churn the node table from both ends.
    let stored = model.iter().copied().collect_vec();
    let order = stored
        .iter()
        .step_by(2)
        .chain(stored.iter().skip(1).step_by(2));
    for &(base, len) in order {
        if trie.remove(base, len).is_err() {
            return false;
        }
    }
    trie.is_empty() && trie.iter().next().is_none() && invariants_ok(&trie)
}
