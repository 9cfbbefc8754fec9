//! Core domain logic for StockKeep.
//! This crate is the single source of truth for inventory invariants.

pub mod backup;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;
pub mod validation;

pub use backup::{backup_store, restore_store, BackupError, BackupReport, BackupResult};
pub use config::{ConfigError, InventoryConfig, MissingRecordPolicy, ValidationLimits};
pub use db::{open_db, open_db_in_memory, DbError, StoreHandle};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
    LoggingStatus,
};
pub use model::record::{RecordDraft, RecordId, StockRecord, DEFAULT_REORDER_THRESHOLD};
pub use repo::record_repo::{
    RecordRepository, RepoError, RepoResult, SqliteRecordRepository, UpdateOutcome,
};
pub use service::inventory_service::{InventoryService, RecordInput, ServiceError, ServiceResult};
pub use stats::{compute_stats, InventoryStats};
pub use validation::{
    validate_backup_path, validate_record_id, validate_search_filter, Field, RecordValidator,
    ValidationReport, Violation, ViolationKind,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
