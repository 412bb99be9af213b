//! Dict: public dictionary API over `ChainedTable`.

use crate::error::{DictError, Result};
use crate::hash::{HashSeed, StrHasher};
use crate::table::{ChainedTable, IntoIter, Iter, IterMut};
use core::fmt;
use core::ops::Index;

/// A string-keyed dictionary using separate chaining.
///
/// Iteration order is bucket order, then insertion order within a bucket.
/// Overwriting a key moves it to the tail of its bucket, and growth
/// redistributes entries, so order is deterministic for a given seed and
/// operation history but otherwise unspecified.
///
/// Iterators borrow the dictionary; it cannot be mutated while one is alive.
#[derive(Clone)]
pub struct Dict<V> {
    pub(crate) table: ChainedTable<V>,
}

impl<V> Dict<V> {
    /// Empty dictionary with 8 buckets and the process-wide clock seed.
    pub fn new() -> Self {
        Self {
            table: ChainedTable::new(),
        }
    }

    /// Empty dictionary hashing with an explicit seed.
    pub fn with_seed(seed: HashSeed) -> Self {
        Self {
            table: ChainedTable::with_hasher(StrHasher::new(seed)),
        }
    }

    pub fn seed(&self) -> HashSeed {
        self.table.hasher().seed()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    /// Insert or overwrite `key`, returning the previous value.
    ///
    /// # Panics
    ///
    /// Panics if growing the bucket array overflows or cannot be allocated.
    /// Use [`Dict::try_set`] to handle that case.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        match self.try_set(key, value) {
            Ok(old) => old,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Dict::set`], but reports growth failure instead of panicking.
    /// On error the dictionary is unchanged.
    pub fn try_set(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        self.table.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Result<&V> {
        self.table
            .get(key)
            .ok_or_else(|| DictError::key_not_found(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        self.table
            .get_mut(key)
            .ok_or_else(|| DictError::key_not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Remove `key`, returning its value.
    pub fn delete(&mut self, key: &str) -> Result<V> {
        self.table
            .remove(key)
            .map(|(_, v)| v)
            .ok_or_else(|| DictError::key_not_found(key))
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    pub fn items(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        self.table.iter_mut()
    }

    /// Value for `key`, or `default` when the key is absent.
    ///
    /// Any supplied default is returned, including zero, empty or `false`
    /// values; only `None` turns a miss into `KeyNotFound`.
    pub fn get_or_default<'a>(&'a self, key: &str, default: Option<&'a V>) -> Result<&'a V> {
        match self.get(key) {
            Ok(v) => Ok(v),
            Err(e) => default.ok_or(e),
        }
    }

    /// Remove `key` and return it with its value.
    ///
    /// A missing key yields `(key, default)` when a default is supplied and
    /// leaves the dictionary untouched.
    pub fn pop(&mut self, key: &str, default: Option<V>) -> Result<(String, V)> {
        match self.table.remove(key) {
            Some(pair) => Ok(pair),
            None => default
                .map(|v| (key.to_owned(), v))
                .ok_or_else(|| DictError::key_not_found(key)),
        }
    }

    /// Insert `default` only if `key` is absent; return the stored pair.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Dict::set`].
    pub fn set_default(&mut self, key: &str, default: V) -> (&str, &mut V) {
        match self.table.get_or_insert_with(key, || default) {
            Ok(pair) => pair,
            Err(e) => panic!("{e}"),
        }
    }

    /// `set` every pair of `source`, in source order.
    pub fn update<K, I>(&mut self, source: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in source {
            self.set(k, v);
        }
    }
}

impl<V: fmt::Debug> Dict<V> {
    /// `{"k": v, "k2": v2}` in iteration order.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Display for Dict<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}: {v:?}")?;
        }
        f.write_str("}")
    }
}

impl<V: fmt::Debug> fmt::Debug for Dict<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<&str> for Dict<V> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        match self.get(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Dict<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Dict::new();
        d.update(iter);
        d
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for Dict<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<V> IntoIterator for Dict<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        self.table.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Dict<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut Dict<V> {
    type Item = (&'a str, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}
