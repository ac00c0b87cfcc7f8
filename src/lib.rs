//! # lww-crdt
//!
//! Last-writer-wins CRDTs: an element set and an undirected graph built on it.
//!
//! A CRDT (Conflict-free Replicated Data Type) is a data structure that can be
//! replicated across multiple devices and updated independently. When replicas
//! are merged, they are guaranteed to converge to the same state without
//! requiring coordination or consensus.
//!
//! Every mutation here carries a wall-clock [`Timestamp`](clock::Timestamp).
//! Merging keeps the latest timestamp per element, so replicas converge no
//! matter in which order they exchange state.
//!
//! ## Quick Start
//!
//! ```
//! use lww_crdt::prelude::*;
//!
//! let a = LWWGraph::new();
//! a.add_vertex("A");
//! a.add_vertex("B");
//! a.add_edge("A", "B").unwrap();
//!
//! let b = LWWGraph::new();
//! b.add_vertex("C");
//!
//! a.merge(&b).unwrap();
//! b.merge(&a).unwrap();
//! assert!(b.edge_exists(&"A", &"B"));
//! assert!(a.vertex_exists(&"C"));
//! ```
//!
//! ## Available structures
//!
//! - [`TimeMap`] - Thread-safe map from key to its latest timestamp
//! - [`LWWSet`] - Last-writer-wins element set (removal wins ties)
//! - [`LWWGraph`] - Last-writer-wins graph with symmetric edges
//!
//! ## The `Crdt` Trait
//!
//! All replicated types implement the [`Crdt`] trait, which provides the
//! [`Crdt::merge`] method. Merge is commutative, associative, and idempotent.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for every structure. A set encodes as
//!   `{"additions": {..}, "removals": {..}}` with RFC 3339 timestamps at full
//!   nanosecond precision.

#![warn(missing_docs)]

mod crdt;
mod error;
mod lww_graph;
mod lww_set;
mod time_map;

pub mod clock;
pub mod prelude;

pub use crdt::{Crdt, DeltaCrdt};
pub use error::{Error, Result};
pub use lww_graph::LWWGraph;
pub use lww_set::{LWWSet, LWWSetDelta};
pub use time_map::TimeMap;
