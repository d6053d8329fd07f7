//! Keyed record tables.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// An ordered map with insert-unique / erase-existing semantics.
///
/// `insert` refuses to overwrite and `erase` refuses to remove a missing key,
/// so a caller that skips its own existence check gets an error instead of a
/// silent overwrite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Ord + Serialize, V: Serialize",
    deserialize = "K: Ord + Deserialize<'de>, V: Deserialize<'de>"
))]
pub struct KeyedTable<K, V> {
    rows: BTreeMap<K, V>,
}

impl<K: Ord + Debug, V> KeyedTable<K, V> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    /// Insert a new row. Fails if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), StoreError> {
        if self.rows.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{key:?}")));
        }
        self.rows.insert(key, value);
        Ok(())
    }

    /// Mutate an existing row in place.
    pub fn update<R>(&mut self, key: &K, f: impl FnOnce(&mut V) -> R) -> Result<R, StoreError> {
        self.rows
            .get_mut(key)
            .map(f)
            .ok_or_else(|| StoreError::NotFound(format!("{key:?}")))
    }

    /// Remove and return an existing row.
    pub fn erase(&mut self, key: &K) -> Result<V, StoreError> {
        self.rows
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(format!("{key:?}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K: Ord + Debug, V> Default for KeyedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
