use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::clock::Timestamp;

/// A thread-safe map from key to the latest timestamp it was asserted at.
///
/// Each key holds the maximum timestamp ever submitted for it. Entries are
/// never removed and their timestamps never decrease, which makes merging two
/// maps a pointwise maximum.
///
/// Any number of readers may proceed concurrently; writers exclude everyone
/// else on this map only.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use lww_crdt::TimeMap;
///
/// let t1 = Utc.timestamp_opt(100, 0).unwrap();
/// let t2 = Utc.timestamp_opt(200, 0).unwrap();
///
/// let map = TimeMap::new();
/// map.add("key", t2);
/// map.add("key", t1); // older, ignored
///
/// assert_eq!(map.added_at(&"key"), Some(t2));
/// ```
#[derive(Debug)]
pub struct TimeMap<K: Eq + Hash> {
    entries: RwLock<HashMap<K, Timestamp>>,
}

impl<K: Eq + Hash> TimeMap<K> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A single `HashMap::insert` cannot leave the map half-written, so a
    // poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Timestamp>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Timestamp>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `key` at `timestamp`.
    ///
    /// Stores the timestamp if the key is new or `timestamp` is strictly
    /// after the stored one. Returns `true` if the stored timestamp changed.
    ///
    /// Recording a timestamp cannot fail, so this reports whether the entry
    /// advanced rather than returning a `Result`.
    pub fn add(&self, key: K, timestamp: Timestamp) -> bool {
        let mut entries = self.write();
        if entries.get(&key).is_some_and(|&stored| timestamp <= stored) {
            return false;
        }
        trace!(%timestamp, "timestamp advanced");
        entries.insert(key, timestamp);
        true
    }

    /// The timestamp stored for `key`, if any.
    #[must_use]
    pub fn added_at(&self, key: &K) -> Option<Timestamp> {
        self.read().get(key).copied()
    }

    /// Visit every key/timestamp pair in unspecified order.
    ///
    /// Stops at the first error returned by `visitor` and returns it. The map
    /// stays read-locked for the whole traversal, so `visitor` must not write
    /// to this same map.
    pub fn each<F, E>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&K, Timestamp) -> Result<(), E>,
    {
        for (key, &timestamp) in self.read().iter() {
            visitor(key, timestamp)?;
        }
        Ok(())
    }

    /// Visit every key/timestamp pair with a visitor that cannot fail.
    pub(crate) fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, Timestamp),
    {
        for (key, &timestamp) in self.read().iter() {
            visitor(key, timestamp);
        }
    }

    /// Number of keys stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no key has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<K: Eq + Hash + Clone> TimeMap<K> {
    /// Copy out every pair, releasing the lock before returning.
    pub(crate) fn snapshot(&self) -> Vec<(K, Timestamp)> {
        self.read()
            .iter()
            .map(|(key, &timestamp)| (key.clone(), timestamp))
            .collect()
    }

    /// Fold every pair of `other` into `self` by pointwise maximum.
    ///
    /// Returns the number of keys whose timestamp advanced.
    pub(crate) fn absorb(&self, other: &Self) -> usize {
        // Never hold the peer's read lock while taking our write lock.
        let pairs = other.snapshot();
        let mut entries = self.write();
        let mut advanced = 0;
        for (key, timestamp) in pairs {
            if entries.get(&key).is_some_and(|&stored| timestamp <= stored) {
                continue;
            }
            entries.insert(key, timestamp);
            advanced += 1;
        }
        advanced
    }
}

impl<K: Eq + Hash> Default for TimeMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Clone for TimeMap<K> {
    fn clone(&self) -> Self {
        Self {
            entries: RwLock::new(self.read().clone()),
        }
    }
}

impl<K: Eq + Hash> PartialEq for TimeMap<K> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || *self.read() == *other.read()
    }
}

impl<K: Eq + Hash> Eq for TimeMap<K> {}

impl<K: Eq + Hash> FromIterator<(K, Timestamp)> for TimeMap<K> {
    /// Build a map keeping the latest timestamp seen for each key.
    fn from_iter<I: IntoIterator<Item = (K, Timestamp)>>(iter: I) -> Self {
        let map = Self::new();
        for (key, timestamp) in iter {
            map.add(key, timestamp);
        }
        map
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::collections::HashMap;
    use std::hash::Hash;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::TimeMap;
    use crate::clock::Timestamp;

    /// Serialized as a plain `{key: timestamp}` object.
    impl<K: Eq + Hash + Serialize> Serialize for TimeMap<K> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.read().iter())
        }
    }

    impl<'de, K: Eq + Hash + Deserialize<'de>> Deserialize<'de> for TimeMap<K> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let entries = HashMap::<K, Timestamp>::deserialize(deserializer)?;
            Ok(entries.into_iter().collect())
        }
    }
}
