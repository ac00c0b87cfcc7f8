use crate::Result;

/// Core trait implemented by every replicated structure in this crate.
///
/// Replicas are updated independently and reconciled by merging their
/// states. Merging takes `&self`: the structures synchronize internally so a
/// replica can be shared between threads while it absorbs peer state.
///
/// # Properties
///
/// All implementations must satisfy, with respect to observable membership:
/// - **Commutativity:** `a.merge(b)` and `b.merge(a)` agree
/// - **Associativity:** `a.merge(b.merge(c))` and `a.merge(b).merge(c)` agree
/// - **Idempotency:** `a.merge(a)` changes nothing
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// After merging, `self` holds the pointwise maximum of both states.
    fn merge(&self, other: &Self) -> Result<()>;
}

/// Extension trait for delta-state CRDTs.
///
/// Instead of shipping the full state, a replica ships only what its peer is
/// missing.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use lww_crdt::prelude::*;
///
/// let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
///
/// let s1 = LWWSet::new();
/// s1.add("a", t);
/// s1.add("b", t);
///
/// let s2 = LWWSet::new();
/// s2.add("a", t);
///
/// // Only "b" travels
/// let delta = s1.delta(&s2);
/// s2.apply_delta(&delta);
/// assert!(s2.exists(&"b"));
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this CRDT.
    type Delta;

    /// Generate a delta containing changes in `self` that `other` does not have.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Apply a delta to this replica's state.
    ///
    /// Equivalent to merging the state that produced the delta.
    fn apply_delta(&self, delta: &Self::Delta);
}
