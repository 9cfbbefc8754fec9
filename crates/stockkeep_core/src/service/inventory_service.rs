//! Inventory use-case service.
//!
//! # Responsibility
//! - Run the write pipeline: validate -> uniqueness check -> persist.
//! - Resolve the reorder threshold default and the missing-id policy.
//! - Expose read use-cases (lookup, filtered list, low stock, statistics).
//!
//! # Invariants
//! - No mutation reaches the repository without an accepted validation.
//! - No two live records share a name after a successful add/update.
//! - Updates with a blank threshold keep the stored threshold.

use crate::config::{InventoryConfig, MissingRecordPolicy};
use crate::model::record::{RecordDraft, RecordId, StockRecord};
use crate::repo::record_repo::{RecordRepository, RepoError, UpdateOutcome};
use crate::stats::{compute_stats, InventoryStats};
use crate::validation::{validate_search_filter, RecordValidator, ValidationReport};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for inventory use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input was rejected; carries every violation.
    Validation(ValidationReport),
    /// Another live record already uses this name.
    DuplicateName(String),
    /// Target record does not exist.
    NotFound(RecordId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Human-readable messages suitable for direct display.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(report) => report.messages(),
            other => vec![other.to_string()],
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(report) => write!(f, "{report}"),
            Self::DuplicateName(name) => write!(f, "a record named `{name}` already exists"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(report) => Some(report),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationReport> for ServiceError {
    fn from(value: ValidationReport) -> Self {
        Self::Validation(value)
    }
}

/// Raw field text for add/update, as typed by a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordInput<'a> {
    pub name: &'a str,
    pub quantity: &'a str,
    pub unit_price: &'a str,
    /// `None` or blank: default on add, keep stored value on update.
    pub reorder_threshold: Option<&'a str>,
}

/// Inventory service facade over repository implementations.
pub struct InventoryService<R: RecordRepository> {
    repo: R,
    validator: RecordValidator,
    default_reorder_threshold: i64,
    missing_record_policy: MissingRecordPolicy,
}

impl<R: RecordRepository> InventoryService<R> {
    /// Creates a service configured from `config`.
    pub fn new(repo: R, config: &InventoryConfig) -> Self {
        Self {
            repo,
            validator: RecordValidator::new(config.validation.clone()),
            default_reorder_threshold: config.validation.default_reorder_threshold,
            missing_record_policy: config.service.missing_record_policy,
        }
    }

    /// Creates a service with default bounds and policy.
    pub fn with_defaults(repo: R) -> Self {
        Self::new(repo, &InventoryConfig::default())
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Validates and stores a new record, returning it as persisted.
    pub fn add_record(&self, input: &RecordInput<'_>) -> ServiceResult<StockRecord> {
        let mut draft = self.parse_input(input)?;
        draft.reorder_threshold = Some(
            draft
                .reorder_threshold
                .unwrap_or(self.default_reorder_threshold),
        );

        if self.repo.record_exists_by_name(&draft.name, None)? {
            warn!("event=record_create module=service status=rejected reason=duplicate_name");
            return Err(ServiceError::DuplicateName(draft.name));
        }

        let id = self.repo.create_record(&draft)?;
        info!("event=record_create module=service status=ok record_id={id}");
        self.repo
            .get_record(id)?
            .ok_or(ServiceError::InconsistentState(
                "created record not found in read-back",
            ))
    }

    /// Validates and replaces the mutable fields of record `id`.
    ///
    /// Returns `Ok(None)` when `id` does not exist and the policy is
    /// `MissingRecordPolicy::Ignore`.
    pub fn update_record(
        &self,
        id: RecordId,
        input: &RecordInput<'_>,
    ) -> ServiceResult<Option<StockRecord>> {
        let draft = self.parse_input(input)?;

        if self.repo.record_exists_by_name(&draft.name, Some(id))? {
            warn!(
                "event=record_update module=service status=rejected record_id={id} reason=duplicate_name"
            );
            return Err(ServiceError::DuplicateName(draft.name));
        }

        match self.repo.update_record(id, &draft)? {
            UpdateOutcome::Updated => {
                info!("event=record_update module=service status=ok record_id={id}");
                self.repo
                    .get_record(id)?
                    .map(Some)
                    .ok_or(ServiceError::InconsistentState(
                        "updated record not found in read-back",
                    ))
            }
            UpdateOutcome::Missing => {
                warn!("event=record_update module=service status=missing record_id={id}");
                match self.missing_record_policy {
                    MissingRecordPolicy::Ignore => Ok(None),
                    MissingRecordPolicy::Report => Err(ServiceError::NotFound(id)),
                }
            }
        }
    }

    /// Deletes record `id` and returns what was removed.
    pub fn delete_record(&self, id: RecordId) -> ServiceResult<StockRecord> {
        let record = self
            .repo
            .get_record(id)?
            .ok_or(ServiceError::NotFound(id))?;

        self.repo.delete_record(id)?;
        info!("event=record_delete module=service status=ok record_id={id}");
        Ok(record)
    }

    pub fn get_record(&self, id: RecordId) -> ServiceResult<Option<StockRecord>> {
        Ok(self.repo.get_record(id)?)
    }

    /// Lists records whose name contains `filter` (case-insensitive).
    pub fn list_records(&self, filter: &str) -> ServiceResult<Vec<StockRecord>> {
        let report = validate_search_filter(filter);
        if !report.is_accepted() {
            return Err(report.into());
        }
        Ok(self.repo.search_by_name(filter)?)
    }

    pub fn low_stock_records(&self) -> ServiceResult<Vec<StockRecord>> {
        Ok(self.repo.list_low_stock()?)
    }

    /// Computes statistics over a fresh full scan.
    pub fn statistics(&self) -> ServiceResult<InventoryStats> {
        let records = self.repo.list_records()?;
        Ok(compute_stats(&records))
    }

    fn parse_input(&self, input: &RecordInput<'_>) -> ServiceResult<RecordDraft> {
        self.validator
            .parse_draft(
                input.name,
                input.quantity,
                input.unit_price,
                input.reorder_threshold,
            )
            .map_err(|report| {
                warn!(
                    "event=record_validate module=service status=rejected violations={}",
                    report.violations.len()
                );
                ServiceError::Validation(report)
            })
    }
}
