//! Field-level validation for stock records.
//!
//! # Responsibility
//! - Decide, without side effects, whether raw user input forms an
//!   acceptable record.
//! - Report every violation across all fields in a stable order.
//!
//! # Invariants
//! - Checks never short-circuit across fields; order is
//!   name -> quantity -> unit price -> reorder threshold.
//! - Within a field, `Required` and parse failures are terminal; bound
//!   checks are independent and may both fire.
//! - Malformed numbers are violations, never errors or panics.

use crate::config::ValidationLimits;
use crate::model::record::RecordDraft;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;

static NAME_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9áéíóúÁÉÍÓÚñÑüÜ\s\-_\.]+$").expect("valid name charset regex")
});
static BACKUP_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-\.\\/]+$").expect("valid backup path regex"));

const MAX_SEARCH_FILTER_CHARS: usize = 100;

/// Input field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Quantity,
    UnitPrice,
    ReorderThreshold,
    RecordId,
    BackupPath,
    SearchFilter,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Quantity => "quantity",
            Self::UnitPrice => "unit price",
            Self::ReorderThreshold => "reorder threshold",
            Self::RecordId => "record id",
            Self::BackupPath => "backup path",
            Self::SearchFilter => "search filter",
        }
    }
}

/// Numeric bound carried by range violations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Integer(i64),
    Decimal(f64),
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    NotAnInteger,
    NotADecimal,
    NotPositive,
    BelowMinimum { min: Bound },
    AboveMaximum { max: Bound },
}

/// One rejected rule for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: Field,
    pub kind: ViolationKind,
}

impl Violation {
    fn new(field: Field, kind: ViolationKind) -> Self {
        Self { field, kind }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = self.field.label();
        match &self.kind {
            ViolationKind::Required => write!(f, "{label} is required"),
            ViolationKind::TooShort { min } => {
                write!(f, "{label} must be at least {min} characters")
            }
            ViolationKind::TooLong { max } => write!(f, "{label} cannot exceed {max} characters"),
            ViolationKind::InvalidCharacters => match self.field {
                Field::Name => write!(
                    f,
                    "{label} may only contain letters, digits, spaces and - _ ."
                ),
                _ => write!(f, "{label} contains invalid characters"),
            },
            ViolationKind::NotAnInteger => write!(f, "{label} must be a whole number"),
            ViolationKind::NotADecimal => write!(f, "{label} must be a decimal number"),
            ViolationKind::NotPositive => write!(f, "{label} must be greater than zero"),
            ViolationKind::BelowMinimum { min } => {
                write!(f, "{label} must be greater than or equal to {min}")
            }
            ViolationKind::AboveMaximum { max } => write!(f, "{label} cannot exceed {max}"),
        }
    }
}

/// Outcome of a validation pass. Accepted iff there are no violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_accepted(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable messages in violation order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// Whether any violation refers to `field`.
    pub fn has_field(&self, field: Field) -> bool {
        self.violations.iter().any(|violation| violation.field == field)
    }

    fn extend(&mut self, field: Field, kinds: Vec<ViolationKind>) {
        self.violations
            .extend(kinds.into_iter().map(|kind| Violation::new(field, kind)));
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.messages().join("; "))
    }
}

impl Error for ValidationReport {}

/// Per-field result: collected violations plus the parsed value when clean.
struct FieldCheck<T> {
    violations: Vec<ViolationKind>,
    value: Option<T>,
}

impl<T> FieldCheck<T> {
    fn failed(kind: ViolationKind) -> Self {
        Self {
            violations: vec![kind],
            value: None,
        }
    }

    fn checked(value: T, violations: Vec<ViolationKind>) -> Self {
        let value = violations.is_empty().then_some(value);
        Self { violations, value }
    }
}

/// Stateless validator configured with explicit bounds.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    limits: ValidationLimits,
}

impl RecordValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validates a complete record from raw field text.
    ///
    /// `reorder_threshold` is optional: `None` or blank input is accepted and
    /// left for the caller to default.
    pub fn validate(
        &self,
        name: &str,
        quantity: &str,
        unit_price: &str,
        reorder_threshold: Option<&str>,
    ) -> ValidationReport {
        self.check_all(name, quantity, unit_price, reorder_threshold)
            .0
    }

    /// Validates, then returns the typed draft when accepted.
    ///
    /// The draft name is trimmed; a blank threshold becomes `None`.
    pub fn parse_draft(
        &self,
        name: &str,
        quantity: &str,
        unit_price: &str,
        reorder_threshold: Option<&str>,
    ) -> Result<RecordDraft, ValidationReport> {
        let (report, draft) = self.check_all(name, quantity, unit_price, reorder_threshold);
        match draft {
            Some(draft) if report.is_accepted() => Ok(draft),
            _ => Err(report),
        }
    }

    pub fn validate_name(&self, name: &str) -> Vec<Violation> {
        into_violations(Field::Name, self.check_name(name).violations)
    }

    pub fn validate_quantity(&self, quantity: &str) -> Vec<Violation> {
        into_violations(Field::Quantity, self.check_quantity(quantity).violations)
    }

    pub fn validate_price(&self, unit_price: &str) -> Vec<Violation> {
        into_violations(Field::UnitPrice, self.check_price(unit_price).violations)
    }

    pub fn validate_reorder_threshold(&self, reorder_threshold: Option<&str>) -> Vec<Violation> {
        into_violations(
            Field::ReorderThreshold,
            self.check_threshold(reorder_threshold).violations,
        )
    }

    fn check_all(
        &self,
        name: &str,
        quantity: &str,
        unit_price: &str,
        reorder_threshold: Option<&str>,
    ) -> (ValidationReport, Option<RecordDraft>) {
        let name = self.check_name(name);
        let quantity = self.check_quantity(quantity);
        let unit_price = self.check_price(unit_price);
        let threshold = self.check_threshold(reorder_threshold);

        let mut report = ValidationReport::default();
        report.extend(Field::Name, name.violations);
        report.extend(Field::Quantity, quantity.violations);
        report.extend(Field::UnitPrice, unit_price.violations);
        report.extend(Field::ReorderThreshold, threshold.violations);

        let draft = match (name.value, quantity.value, unit_price.value, threshold.value) {
            (Some(name), Some(quantity), Some(unit_price), Some(reorder_threshold)) => {
                Some(RecordDraft {
                    name,
                    quantity,
                    unit_price,
                    reorder_threshold,
                })
            }
            _ => None,
        };

        (report, draft)
    }

    fn check_name(&self, raw: &str) -> FieldCheck<String> {
        let name = raw.trim();
        if name.is_empty() {
            return FieldCheck::failed(ViolationKind::Required);
        }

        let mut violations = Vec::new();
        let length = name.chars().count();
        if length < self.limits.min_name_length {
            violations.push(ViolationKind::TooShort {
                min: self.limits.min_name_length,
            });
        }
        if length > self.limits.max_name_length {
            violations.push(ViolationKind::TooLong {
                max: self.limits.max_name_length,
            });
        }
        if !NAME_CHARSET_RE.is_match(name) {
            violations.push(ViolationKind::InvalidCharacters);
        }

        FieldCheck::checked(name.to_string(), violations)
    }

    fn check_quantity(&self, raw: &str) -> FieldCheck<i64> {
        check_integer(raw, self.limits.min_quantity, self.limits.max_quantity)
    }

    fn check_price(&self, raw: &str) -> FieldCheck<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldCheck::failed(ViolationKind::Required);
        }

        let below = ViolationKind::BelowMinimum {
            min: Bound::Decimal(self.limits.min_price),
        };
        let above = ViolationKind::AboveMaximum {
            max: Bound::Decimal(self.limits.max_price),
        };

        let value = match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            // Digits that overflow f64 (`1e400`) are out of range, not malformed;
            // spelled-out `inf`/`nan` stay malformed.
            Ok(value) if value.is_infinite() && is_decimal_notation(trimmed) => {
                return FieldCheck::failed(if value > 0.0 { above } else { below });
            }
            _ => return FieldCheck::failed(ViolationKind::NotADecimal),
        };

        let mut violations = Vec::new();
        if value < self.limits.min_price {
            violations.push(below);
        }
        if value > self.limits.max_price {
            violations.push(above);
        }

        FieldCheck::checked(value, violations)
    }

    fn check_threshold(&self, raw: Option<&str>) -> FieldCheck<Option<i64>> {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return FieldCheck::checked(None, Vec::new());
        };

        let check = check_integer(
            raw,
            self.limits.min_reorder_threshold,
            self.limits.max_reorder_threshold,
        );
        FieldCheck {
            violations: check.violations,
            value: check.value.map(Some),
        }
    }
}

/// Validates a record id typed by a user (required, integer, > 0).
pub fn validate_record_id(raw: &str) -> ValidationReport {
    let trimmed = raw.trim();
    let kind = if trimmed.is_empty() {
        Some(ViolationKind::Required)
    } else {
        match trimmed.parse::<i64>() {
            Ok(id) if id > 0 => None,
            Ok(_) => Some(ViolationKind::NotPositive),
            Err(_) => Some(ViolationKind::NotAnInteger),
        }
    };

    single(Field::RecordId, kind)
}

/// Validates a backup/restore file path typed by a user.
pub fn validate_backup_path(raw: &str) -> ValidationReport {
    let trimmed = raw.trim();
    let kind = if trimmed.is_empty() {
        Some(ViolationKind::Required)
    } else if !BACKUP_PATH_RE.is_match(trimmed) {
        Some(ViolationKind::InvalidCharacters)
    } else {
        None
    };

    single(Field::BackupPath, kind)
}

/// Validates a name search filter; empty filters are accepted.
pub fn validate_search_filter(raw: &str) -> ValidationReport {
    let kind = (raw.trim().chars().count() > MAX_SEARCH_FILTER_CHARS).then_some(
        ViolationKind::TooLong {
            max: MAX_SEARCH_FILTER_CHARS,
        },
    );

    single(Field::SearchFilter, kind)
}

fn check_integer(raw: &str, min: i64, max: i64) -> FieldCheck<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldCheck::failed(ViolationKind::Required);
    }

    let below = ViolationKind::BelowMinimum {
        min: Bound::Integer(min),
    };
    let above = ViolationKind::AboveMaximum {
        max: Bound::Integer(max),
    };

    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            return match err.kind() {
                IntErrorKind::PosOverflow => FieldCheck::failed(above),
                IntErrorKind::NegOverflow => FieldCheck::failed(below),
                _ => FieldCheck::failed(ViolationKind::NotAnInteger),
            };
        }
    };

    let mut violations = Vec::new();
    if value < min {
        violations.push(below);
    }
    if value > max {
        violations.push(above);
    }

    FieldCheck::checked(value, violations)
}

fn is_decimal_notation(raw: &str) -> bool {
    raw.chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'))
}

fn into_violations(field: Field, kinds: Vec<ViolationKind>) -> Vec<Violation> {
    kinds
        .into_iter()
        .map(|kind| Violation::new(field, kind))
        .collect()
}

fn single(field: Field, kind: Option<ViolationKind>) -> ValidationReport {
    ValidationReport {
        violations: kind
            .map(|kind| vec![Violation::new(field, kind)])
            .unwrap_or_default(),
    }
}
