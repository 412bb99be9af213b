//! ChainedTable: separate-chaining storage engine with quadratic growth.
//!
//! Buckets are plain `Vec`s of entries. Each entry keeps the hash it was
//! placed with, so probing and rehashing never call the hasher again.

use crate::error::{DictError, Result};
use crate::hash::StrHasher;
use core::iter::FusedIterator;
use core::mem;
use log::{debug, trace};

/// Bucket count of a freshly constructed table.
pub const INITIAL_BUCKET_COUNT: usize = 8;

/// Growth triggers once `len / bucket_count >= LOAD_FACTOR_NUM / LOAD_FACTOR_DEN`.
pub const LOAD_FACTOR_NUM: usize = 2;
pub const LOAD_FACTOR_DEN: usize = 3;

#[derive(Clone, Debug)]
struct Entry<V> {
    key: String,
    value: V,
    hash: u64,
}

type Bucket<V> = Vec<Entry<V>>;

/// String-keyed hash table using separate chaining.
///
/// Growth squares the bucket count (8, 64, 4096, 16_777_216, ...) instead
/// of doubling it. Resizes are therefore rare but each one moves every
/// entry into a much larger array; insertion is still amortized O(1),
/// with a larger per-resize cost than a doubling table.
#[derive(Clone, Debug)]
pub struct ChainedTable<V> {
    hasher: StrHasher,
    buckets: Vec<Bucket<V>>,
    len: usize,
}

impl<V> ChainedTable<V> {
    pub fn new() -> Self {
        Self::with_hasher(StrHasher::default())
    }

    pub fn with_hasher(hasher: StrHasher) -> Self {
        let mut buckets = Vec::with_capacity(INITIAL_BUCKET_COUNT);
        buckets.resize_with(INITIAL_BUCKET_COUNT, Vec::new);
        Self {
            hasher,
            buckets,
            len: 0,
        }
    }

    pub fn hasher(&self) -> &StrHasher {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Index of the bucket `key` currently maps to.
    pub fn bucket_index(&self, key: &str) -> usize {
        self.index_for(self.hasher.hash_str(key))
    }

    /// Keys stored in bucket `index`, in insertion order.
    pub fn bucket_keys(&self, index: usize) -> impl Iterator<Item = &str> {
        self.buckets
            .get(index)
            .into_iter()
            .flatten()
            .map(|e| e.key.as_str())
    }

    #[inline]
    fn index_for(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    // Stored hashes filter candidates before any key comparison.
    fn position(bucket: &[Entry<V>], hash: u64, key: &str) -> Option<usize> {
        bucket.iter().position(|e| e.hash == hash && e.key == key)
    }

    fn locate(&self, key: &str) -> Option<(usize, usize)> {
        let hash = self.hasher.hash_str(key);
        let idx = self.index_for(hash);
        Self::position(&self.buckets[idx], hash, key).map(|pos| (idx, pos))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        let (idx, pos) = self.locate(key)?;
        let e = &self.buckets[idx][pos];
        Some((e.key.as_str(), &e.value))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let (idx, pos) = self.locate(key)?;
        Some(&mut self.buckets[idx][pos].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(key).is_some()
    }

    fn should_grow(&self) -> bool {
        self.len.saturating_mul(LOAD_FACTOR_DEN)
            >= self.buckets.len().saturating_mul(LOAD_FACTOR_NUM)
    }

    /// Replace the bucket array with one of `bucket_count²` buckets.
    ///
    /// The new array is reserved and filled before it is published; on
    /// error the table is left exactly as it was.
    fn grow(&mut self) -> Result<()> {
        let old_count = self.buckets.len();
        let overflow = DictError::CapacityOverflow {
            bucket_count: old_count,
        };
        let new_count = next_bucket_count(old_count).ok_or(overflow.clone())?;

        let mut staged: Vec<Bucket<V>> = Vec::new();
        staged.try_reserve_exact(new_count).map_err(|_| overflow)?;
        staged.resize_with(new_count, Vec::new);

        debug!(
            "growing table from {} to {} buckets ({} entries)",
            old_count, new_count, self.len
        );
        for entry in mem::take(&mut self.buckets).into_iter().flatten() {
            let idx = (entry.hash % new_count as u64) as usize;
            staged[idx].push(entry);
        }
        self.buckets = staged;
        Ok(())
    }

    /// Insert or replace `key`, returning the displaced value.
    ///
    /// The growth check runs first, even when `key` is already present.
    /// A replaced entry is removed and re-appended, so it moves to the tail
    /// of its bucket.
    pub fn insert(&mut self, key: String, value: V) -> Result<Option<V>> {
        if self.should_grow() {
            self.grow()?;
        }
        let hash = self.hasher.hash_str(&key);
        let idx = self.index_for(hash);
        let bucket = &mut self.buckets[idx];
        let displaced = Self::position(bucket, hash, &key).map(|pos| bucket.remove(pos).value);
        if displaced.is_none() {
            self.len += 1;
        }
        bucket.push(Entry { key, value, hash });
        Ok(displaced)
    }

    /// Return the entry for `key`, appending `default()` first if absent.
    ///
    /// Growth is only considered when an entry is actually added.
    pub fn get_or_insert_with<F>(&mut self, key: &str, default: F) -> Result<(&str, &mut V)>
    where
        F: FnOnce() -> V,
    {
        if let Some((idx, pos)) = self.locate(key) {
            let e = &mut self.buckets[idx][pos];
            return Ok((e.key.as_str(), &mut e.value));
        }
        if self.should_grow() {
            self.grow()?;
        }
        let hash = self.hasher.hash_str(key);
        let idx = self.index_for(hash);
        let bucket = &mut self.buckets[idx];
        bucket.push(Entry {
            key: key.to_owned(),
            value: default(),
            hash,
        });
        self.len += 1;
        let pos = bucket.len() - 1;
        let e = &mut bucket[pos];
        Ok((e.key.as_str(), &mut e.value))
    }

    pub fn remove(&mut self, key: &str) -> Option<(String, V)> {
        let (idx, pos) = self.locate(key)?;
        let e = self.buckets[idx].remove(pos);
        self.len -= 1;
        Some((e.key, e.value))
    }

    /// Empty every bucket in place; the bucket count is kept.
    pub fn clear(&mut self) {
        trace!(
            "clearing {} entries across {} buckets",
            self.len,
            self.buckets.len()
        );
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: Default::default(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            current: Default::default(),
            remaining: self.len,
        }
    }
}

#[inline]
fn next_bucket_count(bucket_count: usize) -> Option<usize> {
    bucket_count.checked_mul(bucket_count)
}

impl<V> Default for ChainedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in bucket order, then insertion order.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Bucket<V>>,
    current: core::slice::Iter<'a, Entry<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((e.key.as_str(), &e.value));
            }
            self.current = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

/// Mutable iterator over values, same order as [`Iter`].
pub struct IterMut<'a, V> {
    buckets: core::slice::IterMut<'a, Bucket<V>>,
    current: core::slice::IterMut<'a, Entry<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a str, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((e.key.as_str(), &mut e.value));
            }
            self.current = self.buckets.next()?.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// Owning iterator, same order as [`Iter`].
pub struct IntoIter<V> {
    buckets: std::vec::IntoIter<Bucket<V>>,
    current: std::vec::IntoIter<Entry<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
            self.current = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for ChainedTable<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        IntoIter {
            buckets: self.buckets.into_iter(),
            current: Default::default(),
            remaining: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashSeed;

    fn table() -> ChainedTable<i32> {
        ChainedTable::with_hasher(StrHasher::new(HashSeed::new(7)))
    }

    /// First `n` generated keys that map to the same bucket as "seed".
    fn colliding_keys<V>(t: &ChainedTable<V>, n: usize) -> Vec<String> {
        let target = t.bucket_index("seed");
        (0..)
            .map(|i| format!("c{i}"))
            .filter(|k| t.bucket_index(k) == target)
            .take(n)
            .collect()
    }

    fn bucket_sum<V>(t: &ChainedTable<V>) -> usize {
        t.buckets.iter().map(Vec::len).sum()
    }

    /// Invariant: every entry sits in `hash % bucket_count` for the current count.
    fn assert_placement<V>(t: &ChainedTable<V>) {
        for (idx, bucket) in t.buckets.iter().enumerate() {
            for e in bucket {
                assert_eq!(e.hash, t.hasher.hash_str(&e.key));
                assert_eq!((e.hash % t.buckets.len() as u64) as usize, idx);
            }
        }
    }

    #[test]
    fn new_table_has_initial_buckets() {
        let t = table();
        assert_eq!(t.bucket_count(), INITIAL_BUCKET_COUNT);
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
    }

    #[test]
    fn insert_get_remove() {
        let mut t = table();
        assert_eq!(t.insert("a".to_string(), 1).unwrap(), None);
        assert_eq!(t.get("a"), Some(&1));
        assert!(t.contains_key("a"));
        assert_eq!(t.remove("a"), Some(("a".to_string(), 1)));
        assert_eq!(t.get("a"), None);
        assert_eq!(t.remove("a"), None);
        assert!(t.is_empty());
    }

    #[test]
    fn replace_returns_old_value_and_keeps_len() {
        let mut t = table();
        t.insert("k".to_string(), 1).unwrap();
        assert_eq!(t.insert("k".to_string(), 2).unwrap(), Some(1));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("k"), Some(&2));
    }

    #[test]
    fn growth_is_checked_before_insert_and_squares() {
        let mut t = table();
        for i in 0..6 {
            t.insert(format!("k{i}"), i).unwrap();
        }
        // 5/8 < 2/3 was the last check; 6/8 >= 2/3 fires on the next insert.
        assert_eq!(t.bucket_count(), 8);
        t.insert("k6".to_string(), 6).unwrap();
        assert_eq!(t.bucket_count(), 64);
        assert_eq!(t.len(), 7);
        assert_placement(&t);
    }

    #[test]
    fn overwriting_at_threshold_still_grows() {
        let mut t = table();
        for i in 0..6 {
            t.insert(format!("k{i}"), i).unwrap();
        }
        t.insert("k0".to_string(), 100).unwrap();
        assert_eq!(t.bucket_count(), 64);
        assert_eq!(t.len(), 6);
        assert_eq!(t.get("k0"), Some(&100));
    }

    #[test]
    fn second_growth_reaches_4096() {
        let mut t = table();
        // 64 buckets grow once len reaches 43 (3 * 43 >= 2 * 64).
        for i in 0..44 {
            t.insert(format!("key-{i}"), i).unwrap();
        }
        assert_eq!(t.bucket_count(), 4096);
        assert_eq!(t.len(), 44);
        assert_eq!(bucket_sum(&t), 44);
        for i in 0..44 {
            assert_eq!(t.get(&format!("key-{i}")), Some(&i));
        }
        assert_placement(&t);
    }

    #[test]
    fn replaced_entry_moves_to_bucket_tail() {
        let mut t = table();
        let same = colliding_keys(&t, 2);
        t.insert(same[0].clone(), 0).unwrap();
        t.insert(same[1].clone(), 1).unwrap();
        let idx = t.bucket_index(&same[0]);
        assert_eq!(
            t.bucket_keys(idx).collect::<Vec<_>>(),
            vec![same[0].as_str(), same[1].as_str()]
        );

        t.insert(same[0].clone(), 2).unwrap();
        assert_eq!(
            t.bucket_keys(idx).collect::<Vec<_>>(),
            vec![same[1].as_str(), same[0].as_str()]
        );
    }

    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut t = table();
        t.insert("a".to_string(), 1).unwrap();
        let (k, v) = t
            .get_or_insert_with("a", || panic!("default must not run"))
            .unwrap();
        assert_eq!((k, *v), ("a", 1));
        let (k, v) = t.get_or_insert_with("b", || 2).unwrap();
        assert_eq!(k, "b");
        *v += 10;
        assert_eq!(t.get("b"), Some(&12));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn clear_keeps_bucket_count() {
        let mut t = table();
        for i in 0..10 {
            t.insert(format!("k{i}"), i).unwrap();
        }
        let count = t.bucket_count();
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(bucket_sum(&t), 0);
        assert_eq!(t.bucket_count(), count);
        assert_eq!(t.iter().count(), 0);
    }

    #[test]
    fn iteration_follows_bucket_then_insertion_order() {
        let mut t = table();
        for i in 0..20 {
            t.insert(format!("k{i}"), i).unwrap();
        }
        let expected: Vec<&str> = (0..t.bucket_count())
            .flat_map(|idx| t.bucket_keys(idx))
            .collect();
        let got: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(got, expected);
        assert_eq!(t.iter().len(), 20);
    }

    #[test]
    fn iter_mut_and_into_iter_share_order() {
        let mut t = table();
        for i in 0..10 {
            t.insert(format!("k{i}"), i).unwrap();
        }
        for (_k, v) in t.iter_mut() {
            *v *= 2;
        }
        let borrowed: Vec<(String, i32)> = t.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let owned: Vec<(String, i32)> = t.into_iter().collect();
        assert_eq!(borrowed, owned);
        assert!(owned.iter().all(|(k, v)| format!("k{}", v / 2) == *k));
    }

    #[test]
    fn collisions_resolve_by_key_equality() {
        let mut t = table();
        let same = colliding_keys(&t, 3);
        for (i, k) in same.iter().enumerate() {
            t.insert(k.clone(), i as i32).unwrap();
        }
        assert_eq!(t.bucket_count(), 8);
        for (i, k) in same.iter().enumerate() {
            assert_eq!(t.get(k), Some(&(i as i32)));
        }
        assert_eq!(t.bucket_keys(t.bucket_index(&same[0])).count(), 3);
    }

    #[test]
    fn wrapped_hash_collision_still_compares_keys() {
        // hash("ab") == hash("bQ") == seed * 289 + 1747 for any seed.
        let mut t = table();
        let a = "ab";
        let b = "b\u{51}";
        assert_eq!(t.hasher.hash_str(a), t.hasher.hash_str(b));
        t.insert(a.to_string(), 1).unwrap();
        t.insert(b.to_string(), 2).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(a), Some(&1));
        assert_eq!(t.get(b), Some(&2));
        assert_eq!(t.remove(a), Some((a.to_string(), 1)));
        assert_eq!(t.get(b), Some(&2));
    }

    #[test]
    fn bucket_count_squaring_overflow_is_detected() {
        assert_eq!(next_bucket_count(8), Some(64));
        assert_eq!(next_bucket_count(4096), Some(16_777_216));
        assert_eq!(next_bucket_count(usize::MAX), None);
    }
}
