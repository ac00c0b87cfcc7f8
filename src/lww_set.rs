use std::hash::Hash;

use tracing::debug;

use crate::clock::Timestamp;
use crate::time_map::TimeMap;
use crate::{Crdt, DeltaCrdt, Result};

/// A last-writer-wins element set (LWW-Set).
///
/// Every add and remove is recorded with a timestamp in one of two
/// [`TimeMap`]s. An element is present if its latest addition is strictly
/// after its latest removal. When the two are equal the removal wins, so an
/// element added and removed at the same instant is absent on every replica.
///
/// Unlike a 2P-Set, an element may be re-added after removal by adding it
/// with a later timestamp.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use lww_crdt::prelude::*;
///
/// let t = |s: i64| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap();
///
/// let s1 = LWWSet::new();
/// s1.add("apple", t(1));
/// s1.add("banana", t(1));
/// s1.remove("banana", t(2));
///
/// let s2 = LWWSet::new();
/// s2.add("banana", t(3)); // re-added later on another replica
///
/// s1.merge(&s2).unwrap();
/// assert!(s1.exists(&"apple"));
/// assert!(s1.exists(&"banana"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LWWSet<T: Eq + Hash> {
    additions: TimeMap<T>,
    removals: TimeMap<T>,
}

impl<T: Eq + Hash> LWWSet<T> {
    /// Create a new empty LWW-Set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            additions: TimeMap::new(),
            removals: TimeMap::new(),
        }
    }

    /// Mark `value` as added at `timestamp`.
    ///
    /// Returns `true` if this is the latest addition seen for `value`. There
    /// is no failure case, so no `Result` is returned.
    pub fn add(&self, value: T, timestamp: Timestamp) -> bool {
        self.additions.add(value, timestamp)
    }

    /// Mark `value` as removed at `timestamp`.
    ///
    /// Removing an element that was never added is allowed: the tombstone
    /// hides any addition at or before `timestamp`, including ones that
    /// arrive later through a merge. Returns `true` if this is the latest
    /// removal seen for `value`.
    pub fn remove(&self, value: T, timestamp: Timestamp) -> bool {
        self.removals.add(value, timestamp)
    }

    /// Check if `value` is currently in the set.
    #[must_use]
    pub fn exists(&self, value: &T) -> bool {
        self.additions
            .added_at(value)
            .is_some_and(|added| !self.is_removed(value, added))
    }

    fn is_removed(&self, value: &T, since: Timestamp) -> bool {
        self.removals
            .added_at(value)
            .is_some_and(|removed| removed >= since)
    }

    /// Number of elements currently in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.additions.visit(|value, added| {
            if !self.is_removed(value, added) {
                count += 1;
            }
        });
        count
    }

    /// Check if the set has no present elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw addition timestamps.
    ///
    /// Exposed so a replica can inspect a peer's state; membership must be
    /// queried through [`exists`](Self::exists) or [`get`](Self::get).
    #[must_use]
    pub fn additions(&self) -> &TimeMap<T> {
        &self.additions
    }

    /// Raw removal timestamps (tombstones). See [`additions`](Self::additions).
    #[must_use]
    pub fn removals(&self) -> &TimeMap<T> {
        &self.removals
    }
}

impl<T: Eq + Hash + Clone> LWWSet<T> {
    /// All elements currently in the set, in unspecified order.
    #[must_use]
    pub fn get(&self) -> Vec<T> {
        let mut present = Vec::new();
        self.additions.visit(|value, added| {
            if !self.is_removed(value, added) {
                present.push(value.clone());
            }
        });
        present
    }
}

impl<T: Eq + Hash> Default for LWWSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Crdt for LWWSet<T> {
    fn merge(&self, other: &Self) -> Result<()> {
        let added = self.additions.absorb(&other.additions);
        let removed = self.removals.absorb(&other.removals);
        debug!(added, removed, "merged lww set");
        Ok(())
    }
}

/// Delta for [`LWWSet`]: only the timestamps where `self` is ahead of `other`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LWWSetDelta<T> {
    additions: Vec<(T, Timestamp)>,
    removals: Vec<(T, Timestamp)>,
}

impl<T> LWWSetDelta<T> {
    /// Check if the delta carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

fn newer_entries<T>(ours: &TimeMap<T>, theirs: &TimeMap<T>) -> Vec<(T, Timestamp)>
where
    T: Eq + Hash + Clone,
{
    ours.snapshot()
        .into_iter()
        .filter(|(value, timestamp)| theirs.added_at(value).map_or(true, |t| *timestamp > t))
        .collect()
}

impl<T: Eq + Hash + Clone> DeltaCrdt for LWWSet<T> {
    type Delta = LWWSetDelta<T>;

    fn delta(&self, other: &Self) -> LWWSetDelta<T> {
        LWWSetDelta {
            additions: newer_entries(&self.additions, &other.additions),
            removals: newer_entries(&self.removals, &other.removals),
        }
    }

    fn apply_delta(&self, delta: &LWWSetDelta<T>) {
        for (value, timestamp) in &delta.additions {
            self.add(value.clone(), *timestamp);
        }
        for (value, timestamp) in &delta.removals {
            self.remove(value.clone(), *timestamp);
        }
    }
}
