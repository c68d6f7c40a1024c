//! Table Module
//!
//! In-memory model of the table-namespaced key space.
//!
//! ## Responsibilities
//! - Hold string keys and values under a table name
//! - Enforce table name uniqueness
//! - Serialize to the canonical snapshot shape
//!
//! ## Data Structure Choice
//! Both levels are BTreeMaps:
//! - Sorted names and keys give a byte-stable snapshot file
//! - Listing operations come out ordered for free
//!
//! Neither type does any locking. The engine wraps a [`TableSet`] in a single
//! RwLock and is the only owner.

mod record;
mod set;

pub use record::RecordTable;
pub use set::TableSet;
