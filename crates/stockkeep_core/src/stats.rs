//! Aggregate inventory health metrics.
//!
//! # Responsibility
//! - Derive counts, valuation and stock-level totals from a record set.
//!
//! # Invariants
//! - Pure function of its input; nothing is cached or persisted.
//! - `low_stock_count` uses the same predicate as `list_low_stock`.
//! - `critical_count` is `low_stock_count + zero_stock_count`, so zero-stock
//!   records are counted twice. Existing stock alerts depend on this count;
//!   do not deduplicate here.

use crate::model::record::StockRecord;
use serde::Serialize;

/// Snapshot of inventory metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_count: usize,
    pub total_value: f64,
    pub low_stock_count: usize,
    pub zero_stock_count: usize,
    /// `total_value / total_count`, or 0 for an empty inventory.
    pub average_value: f64,
    pub total_quantity: i64,
    pub total_threshold: i64,
    /// Low-stock plus zero-stock count (zero-stock records counted twice).
    pub critical_count: usize,
}

impl InventoryStats {
    /// Stock coverage as `total_quantity / total_threshold * 100`.
    ///
    /// `None` when the summed thresholds are zero.
    pub fn coverage_percent(&self) -> Option<f64> {
        if self.total_threshold == 0 {
            return None;
        }
        Some(self.total_quantity as f64 / self.total_threshold as f64 * 100.0)
    }

    /// Whether any record is at or below its reorder threshold.
    pub fn needs_attention(&self) -> bool {
        self.critical_count > 0
    }
}

/// Computes a fresh snapshot over `records`.
pub fn compute_stats(records: &[StockRecord]) -> InventoryStats {
    let mut stats = InventoryStats {
        total_count: records.len(),
        ..InventoryStats::default()
    };

    for record in records {
        stats.total_value += record.stock_value();
        stats.total_quantity += record.quantity;
        stats.total_threshold += record.reorder_threshold;
        if record.is_low_stock() {
            stats.low_stock_count += 1;
        }
        if record.is_zero_stock() {
            stats.zero_stock_count += 1;
        }
    }

    if stats.total_count > 0 {
        stats.average_value = stats.total_value / stats.total_count as f64;
    }
    stats.critical_count = stats.low_stock_count + stats.zero_stock_count;

    stats
}
