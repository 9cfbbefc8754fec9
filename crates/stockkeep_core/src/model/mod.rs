//! Stock-keeping domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted by the repository.
//! - Provide the stock-level predicates shared by queries and statistics.
//!
//! # Invariants
//! - Every record is identified by a storage-assigned `RecordId`.
//! - Deletion is physical; there are no tombstones.

pub mod record;
