//! HashTable: a fixed array of `SlotList` buckets with dedup-aware insert.

use crate::compare::Comparator;
use crate::config::TableConfig;
use crate::error::{Defects, ListError};
use crate::position::Position;
use crate::slot_list::SlotList;
use tracing::{debug, error, warn};

/// Result of [`HashTable::insert`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The value was appended to its bucket at this position.
    Inserted(Position),
    /// A matching value already lives at this position; nothing changed.
    AlreadyPresent(Position),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    pub fn position(&self) -> Position {
        match *self {
            InsertOutcome::Inserted(p) | InsertOutcome::AlreadyPresent(p) => p,
        }
    }
}

/// Chained hash table with a bucket count fixed at construction.
///
/// The caller hashes; the table only routes `hash % bucket_count` to a
/// bucket and scans it with the caller's comparator. Buckets grow
/// independently and the table never rehashes.
pub struct HashTable<T> {
    buckets: Box<[SlotList<T>]>,
    len: usize,
}

impl<T: Clone> HashTable<T> {
    /// Build `bucket_count` empty buckets of `bucket_capacity` slots each.
    ///
    /// If any bucket cannot be built, the ones already built are dropped
    /// and the error is returned.
    pub fn new(bucket_count: usize, bucket_capacity: usize, poison: T) -> Result<Self, ListError> {
        if bucket_count == 0 {
            return Err(ListError::InvalidArgument(
                "a table needs at least one bucket",
            ));
        }
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count)
            .map_err(|_| ListError::Allocation {
                requested: bucket_count,
            })?;

        for id in 0..bucket_count {
            match SlotList::with_capacity(bucket_capacity, poison.clone()) {
                Ok(bucket) => buckets.push(bucket),
                Err(e) => {
                    warn!(bucket = id, error = %e, "bucket construction failed, tearing down table");
                    return Err(e);
                }
            }
        }
        debug!(bucket_count, bucket_capacity, "hash table initialized");

        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            len: 0,
        })
    }

    pub fn with_config(config: &TableConfig, poison: T) -> Result<Self, ListError> {
        Self::new(config.bucket_count, config.bucket_capacity, poison)
    }

    /// Append `value` to its bucket unless `cmp` finds a match there.
    ///
    /// Only the target bucket may grow.
    pub fn insert<C>(&mut self, hash: u64, value: T, cmp: &C) -> Result<InsertOutcome, ListError>
    where
        C: Comparator<T> + ?Sized,
    {
        let id = self.bucket_index(hash);
        if let Some((pos, _)) = scan(&self.buckets[id], &value, cmp) {
            return Ok(InsertOutcome::AlreadyPresent(pos));
        }
        let pos = self.buckets[id].push(value)?;
        self.len += 1;
        Ok(InsertOutcome::Inserted(pos))
    }

    /// Consume the table, refusing if any bucket reports corruption.
    pub fn destroy(self) -> Result<(), ListError> {
        let defects = self.validate();
        if !defects.is_clean() {
            error!(%defects, "destroying a corrupted hash table");
            return Err(ListError::InvalidState(defects));
        }
        Ok(())
    }
}

impl<T> HashTable<T> {
    /// Total live elements across all buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// The bucket `hash` routes to, for read-only iteration.
    pub fn find_bucket(&self, hash: u64) -> &SlotList<T> {
        &self.buckets[self.bucket_index(hash)]
    }

    /// First element of the target bucket, in list order, that `cmp`
    /// matches against `value`.
    pub fn find_value<C>(&self, hash: u64, value: &T, cmp: &C) -> Option<&T>
    where
        C: Comparator<T> + ?Sized,
    {
        scan(&self.buckets[self.bucket_index(hash)], value, cmp).map(|(_, stored)| stored)
    }

    pub fn contains<C>(&self, hash: u64, value: &T, cmp: &C) -> bool
    where
        C: Comparator<T> + ?Sized,
    {
        self.find_value(hash, value, cmp).is_some()
    }

    pub fn buckets(&self) -> impl ExactSizeIterator<Item = &SlotList<T>> {
        self.buckets.iter()
    }

    /// Chain length of every bucket, in bucket order.
    pub fn bucket_sizes(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.buckets.iter().map(SlotList::len)
    }

    /// Union of every bucket's defects, plus `STATE_MISMATCH` when the
    /// table's element count disagrees with its buckets.
    pub fn validate(&self) -> Defects {
        let mut defects = self
            .buckets
            .iter()
            .fold(Defects::NONE, |acc, b| acc | b.validate());
        if self.buckets.is_empty() {
            defects |= Defects::MISSING_STORAGE;
        }
        if self.bucket_sizes().sum::<usize>() != self.len {
            defects |= Defects::STATE_MISMATCH;
        }
        defects
    }
}

fn scan<'a, T, C>(bucket: &'a SlotList<T>, probe: &T, cmp: &C) -> Option<(Position, &'a T)>
where
    C: Comparator<T> + ?Sized,
{
    bucket.iter().find(|(_, stored)| cmp.matches(stored, probe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{ExactEq, WideKey};
    use crate::hash_fn;
    use std::cmp::Ordering;

    fn by_ord(a: &String, b: &String) -> Ordering {
        a.cmp(b)
    }

    fn table(buckets: usize, capacity: usize) -> HashTable<String> {
        HashTable::new(buckets, capacity, String::new()).unwrap()
    }

    fn h(s: &str) -> u64 {
        hash_fn::murmur(s.as_bytes())
    }

    /// Invariant: inserting an equal value twice grows the table once.
    #[test]
    fn duplicate_insert_is_noop() {
        let mut t = table(7, 4);
        let first = t.insert(h("dup"), "dup".to_string(), &by_ord).unwrap();
        assert!(first.is_inserted());
        let second = t.insert(h("dup"), "dup".to_string(), &by_ord).unwrap();
        assert_eq!(second, InsertOutcome::AlreadyPresent(first.position()));
        assert_eq!(t.len(), 1);
        assert!(t.validate().is_clean());
    }

    /// Invariant: lookups miss values never inserted and hit values present.
    #[test]
    fn find_value_hits_and_misses() {
        let mut t = table(5, 4);
        for w in ["alpha", "beta", "gamma"] {
            t.insert(h(w), w.to_string(), &by_ord).unwrap();
        }
        for w in ["alpha", "beta", "gamma"] {
            assert_eq!(t.find_value(h(w), &w.to_string(), &by_ord), Some(&w.to_string()));
            assert!(t.contains(h(w), &w.to_string(), &by_ord));
        }
        assert_eq!(t.find_value(h("delta"), &"delta".to_string(), &by_ord), None);
    }

    /// Invariant: values route to `hash % bucket_count` and nowhere else.
    #[test]
    fn routing_follows_hash_modulo() {
        let mut t = table(4, 4);
        t.insert(6, "six".to_string(), &by_ord).unwrap();
        assert_eq!(t.bucket_index(6), 2);
        assert_eq!(t.find_bucket(6).len(), 1);
        assert_eq!(t.find_bucket(2).len(), 1);
        assert_eq!(t.bucket_sizes().collect::<Vec<_>>(), vec![0, 0, 1, 0]);
        // The hash decides the bucket; the same value under another hash is a
        // different entry.
        t.insert(7, "six".to_string(), &by_ord).unwrap();
        assert_eq!(t.len(), 2);
    }

    /// Invariant: a single overloaded bucket grows without touching others.
    #[test]
    fn colliding_values_grow_one_bucket() {
        let mut t = table(3, 2);
        for i in 0..50 {
            t.insert(0, format!("w{i}"), &by_ord).unwrap();
        }
        assert_eq!(t.len(), 50);
        assert_eq!(t.find_bucket(0).len(), 50);
        assert!(t.find_bucket(0).capacity() > 50);
        assert_eq!(t.find_bucket(1).capacity(), 2);
        assert_eq!(t.find_bucket(2).capacity(), 2);
        let order: Vec<String> = t.find_bucket(0).iter().map(|(_, v)| v.clone()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("w{i}")).collect();
        assert_eq!(order, expected);
        for i in 0..50 {
            let w = format!("w{i}");
            assert_eq!(t.find_value(0, &w, &by_ord), Some(&w));
        }
    }

    /// Invariant: the comparator defines identity; first match wins.
    #[test]
    fn comparator_controls_dedup() {
        let mut t = table(1, 4);
        let fold = |a: &String, b: &String| a.to_lowercase().cmp(&b.to_lowercase());
        t.insert(0, "Word".to_string(), &fold).unwrap();
        let out = t.insert(0, "WORD".to_string(), &fold).unwrap();
        assert!(!out.is_inserted());
        assert_eq!(t.len(), 1);
        assert_eq!(t.find_value(0, &"word".to_string(), &fold), Some(&"Word".to_string()));
        assert_eq!(t.find_value(0, &"word".to_string(), &by_ord), None);
    }

    #[test]
    fn wide_keys_use_exact_lane_equality() {
        let mut t = HashTable::new(16, 4, WideKey::ZERO).unwrap();
        for w in ["one", "two", "three", "one"] {
            let key = WideKey::from(w);
            t.insert(hash_fn::murmur_words(&key.lanes()), key, &ExactEq).unwrap();
        }
        assert_eq!(t.len(), 3);
        let probe = WideKey::from("two");
        let hash = hash_fn::murmur_words(&probe.lanes());
        assert_eq!(t.find_value(hash, &probe, &ExactEq), Some(&probe));
        let miss = WideKey::from("four");
        assert!(t
            .find_value(hash_fn::murmur_words(&miss.lanes()), &miss, &ExactEq)
            .is_none());
    }

    #[test]
    fn construction_rejects_bad_layouts() {
        assert!(matches!(
            HashTable::new(0, 4, 0u32),
            Err(ListError::InvalidArgument(_))
        ));
        assert!(matches!(
            HashTable::new(3, 0, 0u32),
            Err(ListError::InvalidArgument(_))
        ));
    }

    #[test]
    fn config_defaults_match_constants() {
        let t: HashTable<u32> = HashTable::with_config(&TableConfig::default(), 0).unwrap();
        assert_eq!(t.bucket_count(), crate::config::DEFAULT_BUCKET_COUNT);
        assert!(t
            .buckets()
            .all(|b| b.capacity() == crate::config::DEFAULT_BUCKET_CAPACITY));
        assert!(t.is_empty());

        let small = TableConfig::default()
            .with_bucket_count(3)
            .with_bucket_capacity(8);
        let t: HashTable<u32> = HashTable::with_config(&small, 0).unwrap();
        assert_eq!(t.bucket_count(), 3);
        assert_eq!(t.buckets().len(), 3);
        assert!(t.destroy().is_ok());
    }

    #[test]
    fn validate_reports_count_mismatch() {
        let mut t = table(2, 4);
        t.insert(1, "x".to_string(), &by_ord).unwrap();
        assert!(t.validate().is_clean());
        t.len = 5;
        assert!(t.validate().contains(Defects::STATE_MISMATCH));
        assert!(matches!(t.destroy(), Err(ListError::InvalidState(_))));
    }

    /// Invariant: a side-effect-free comparator may read the table it is
    /// scanning; only `insert` needs `&mut self`.
    #[test]
    fn read_only_comparator_may_inspect_table() {
        let mut t = table(2, 4);
        t.insert(0, "a".to_string(), &by_ord).unwrap();
        t.insert(1, "b".to_string(), &by_ord).unwrap();
        let tr = &t;
        let reader = |a: &String, b: &String| {
            assert_eq!(tr.find_bucket(1).len(), 1);
            assert!(tr.contains(1, &"b".to_string(), &by_ord));
            a.cmp(b)
        };
        assert_eq!(tr.find_value(0, &"a".to_string(), &reader), Some(&"a".to_string()));
        assert!(tr.find_value(0, &"z".to_string(), &reader).is_none());
        assert!(tr.contains(0, &"a".to_string(), &reader));
    }
}
