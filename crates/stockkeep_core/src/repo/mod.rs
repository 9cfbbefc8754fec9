//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - The repository never validates; callers hand it accepted drafts.
//! - Repository APIs report absent rows as values (`Option`, `UpdateOutcome`,
//!   `bool`), not as errors.

pub mod record_repo;
