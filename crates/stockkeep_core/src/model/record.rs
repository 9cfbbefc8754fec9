//! Stock record domain model.
//!
//! # Responsibility
//! - Define the persisted record and the write-side draft used by mutations.
//! - Resolve the reorder threshold default in exactly one place.
//!
//! # Invariants
//! - `id` is assigned by storage, immutable and never reused.
//! - A persisted record always carries a concrete `reorder_threshold`.
//! - Zero stock implies low stock.

use serde::{Deserialize, Serialize};

/// Storage-assigned record identifier (SQLite rowid).
pub type RecordId = i64;

/// Threshold used when a caller omits `reorder_threshold`.
pub const DEFAULT_REORDER_THRESHOLD: i64 = 10;

/// One stock-keeping entry as stored in `products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: RecordId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub reorder_threshold: i64,
}

impl StockRecord {
    /// `quantity <= reorder_threshold`.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    /// `quantity == 0`; always also low stock since thresholds are non-negative.
    pub fn is_zero_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Stock valuation of this record (`quantity * unit_price`).
    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Mutable fields of a record, as accepted by create/update.
///
/// `reorder_threshold = None` means "use the default" on create and
/// "keep the stored value" on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub reorder_threshold: Option<i64>,
}

impl RecordDraft {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            reorder_threshold: None,
        }
    }

    pub fn with_reorder_threshold(mut self, threshold: i64) -> Self {
        self.reorder_threshold = Some(threshold);
        self
    }

    /// Threshold to persist on create.
    pub fn resolved_threshold(&self) -> i64 {
        self.reorder_threshold.unwrap_or(DEFAULT_REORDER_THRESHOLD)
    }
}
