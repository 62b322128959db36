use chained_slots::hash_fn::{self, HashFn};
use chained_slots::{ExactEq, HashTable, TableConfig, WideKey};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::cmp::Ordering;
use std::time::Duration;

const WORDS: usize = 100_000;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

// Random 32-byte words, the same shape the table was built to measure.
fn words(seed: u64, n: usize) -> Vec<WideKey> {
    let mut bytes = lcg(seed).flat_map(u64::to_le_bytes);
    (0..n)
        .map(|_| {
            let mut raw = [0u8; 32];
            for b in raw.iter_mut() {
                *b = bytes.next().unwrap_or(0) | 1;
            }
            WideKey::from_bytes(&raw)
        })
        .collect()
}

fn by_bytes(a: &Vec<u8>, b: &Vec<u8>) -> Ordering {
    a.cmp(b)
}

fn bytes_table(keys: &[WideKey], hash: HashFn) -> HashTable<Vec<u8>> {
    let mut t = HashTable::with_config(&TableConfig::default(), Vec::new()).unwrap();
    for k in keys {
        let _ = t.insert(hash(k.as_bytes()), k.as_bytes().to_vec(), &by_bytes).unwrap();
    }
    t
}

fn wide_table(keys: &[WideKey]) -> HashTable<WideKey> {
    let mut t = HashTable::with_config(&TableConfig::default(), WideKey::ZERO).unwrap();
    for k in keys {
        let _ = t.insert(hash_fn::murmur_words(&k.lanes()), *k, &ExactEq).unwrap();
    }
    t
}

fn bench_insert(c: &mut Criterion) {
    let keys = words(1, WORDS);
    c.bench_function("table::insert_bytes_murmur_100k", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| black_box(bytes_table(&keys, hash_fn::murmur)),
            BatchSize::SmallInput,
        )
    });
    c.bench_function("table::insert_wide_murmur_100k", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| black_box(wide_table(&keys)),
            BatchSize::SmallInput,
        )
    });
    c.bench_function("hashbrown::insert_100k", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut set = hashbrown::HashSet::new();
                for k in keys {
                    set.insert(*k.as_bytes());
                }
                black_box(set)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit(c: &mut Criterion) {
    let keys = words(7, WORDS);
    for (name, hash) in [
        ("sum", hash_fn::sum as HashFn),
        ("poly", hash_fn::poly),
        ("murmur", hash_fn::murmur),
    ] {
        let t = bytes_table(&keys, hash);
        let probes: Vec<Vec<u8>> = keys.iter().map(|k| k.as_bytes().to_vec()).collect();
        c.bench_function(&format!("table::find_hit_bytes_{name}_100k"), |b| {
            b.iter(|| {
                for p in &probes {
                    black_box(t.find_value(hash(p), p, &by_bytes));
                }
            })
        });
    }

    let t = wide_table(&keys);
    c.bench_function("table::find_hit_wide_murmur_100k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(t.find_value(hash_fn::murmur_words(&k.lanes()), k, &ExactEq));
            }
        })
    });

    let set: hashbrown::HashSet<[u8; 32]> = keys.iter().map(|k| *k.as_bytes()).collect();
    c.bench_function("hashbrown::find_hit_100k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(set.contains(k.as_bytes()));
            }
        })
    });
}

fn bench_find_miss(c: &mut Criterion) {
    let keys = words(11, WORDS);
    let misses = words(0xdead_beef, 10_000);
    let t = wide_table(&keys);
    c.bench_function("table::find_miss_wide_murmur_10k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(t.find_value(hash_fn::murmur_words(&k.lanes()), k, &ExactEq));
            }
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert
}
criterion_group! {
    name = benches_find;
    config = bench_config();
    targets = bench_find_hit, bench_find_miss
}
criterion_main!(benches_insert, benches_find);
