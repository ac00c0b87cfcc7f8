//! Convenient re-exports for common usage.
//!
//! ```
//! use lww_crdt::prelude::*;
//! ```

pub use crate::clock::{Clock, Timestamp};
pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::Error;
pub use crate::LWWGraph;
pub use crate::LWWSet;
pub use crate::TimeMap;
