use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lpm_trie::LpmTrie;
use rand::prelude::*;

fn random_prefix(rng: &mut ThreadRng) -> (u32, u8) {
    let len = rng.gen_range(1..=24u32);
    let base = rng.gen::<u32>() & (!0u32 << (32 - len));
    (base, len as u8)
}

fn do_random_inserts() {
    let mut trie = LpmTrie::new();
    let mut rng = thread_rng();

    for _ in 0..1_000 {
        let (base, len) = random_prefix(&mut rng);
        let _ = trie.insert(base, len);
    }
}

pub fn random_inserts(c: &mut Criterion) {
    c.bench_function("randomized inserts", |b| b.iter(do_random_inserts));
}

pub fn lookups(c: &mut Criterion) {
    let mut trie = LpmTrie::new();
    let mut rng = thread_rng();
    for _ in 0..10_000 {
        let (base, len) = random_prefix(&mut rng);
        let _ = trie.insert(base, len);
    }
    let probes: Vec<u32> = (0..1_000).map(|_| rng.gen()).collect();

    c.bench_function("randomized lookups", |b| {
        b.iter(|| {
            for &addr in &probes {
                black_box(trie.longest_match(addr));
            }
        })
    });
}

pub fn churn(c: &mut Criterion) {
    c.bench_function("insert/remove churn", |b| {
        b.iter(|| {
            let mut trie = LpmTrie::new();
            let mut rng = thread_rng();
            let mut stored = Vec::new();
            for _ in 0..1_000 {
                let (base, len) = random_prefix(&mut rng);
                if trie.insert(base, len) == Ok(true) {
                    stored.push((base, len));
                }
                if stored.len() > 500 {
                    let at = rng.gen_range(0..stored.len());
                    let (base, len) = stored.swap_remove(at);
                    let _ = trie.remove(base, len);
                }
            }
            black_box(trie.len())
        })
    });
}

criterion_group!(benches, random_inserts, lookups, churn);
criterion_main!(benches);
