//! Status-based routing of cleaned rows into two disjoint branches.

use orders_core::error::Result;
use orders_core::models::{Branch, SourceLine, STATUS_INDEX};

/// Status value that selects the delivered branch (compared case-insensitively).
pub const DELIVERED_STATUS: &str = "delivered";

/// Rows split by [`Branch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedRows {
    pub delivered: Vec<SourceLine>,
    pub other: Vec<SourceLine>,
}

impl RoutedRows {
    /// Rows of one branch.
    pub fn branch(&self, branch: Branch) -> &[SourceLine] {
        match branch {
            Branch::Delivered => &self.delivered,
            Branch::Other => &self.other,
        }
    }

    /// Total rows across both branches.
    pub fn len(&self) -> usize {
        self.delivered.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decide which branch a cleaned row belongs to.
///
/// Fails with `MalformedRow` when the row has no `status` column.
pub fn route_row(line: &SourceLine) -> Result<Branch> {
    let fields = line.fields_at_least(STATUS_INDEX + 1)?;
    if fields[STATUS_INDEX].to_lowercase() == DELIVERED_STATUS {
        Ok(Branch::Delivered)
    } else {
        Ok(Branch::Other)
    }
}

/// Split `rows` into the delivered and other branches.
///
/// Every row lands in exactly one branch; relative order is kept.
pub fn partition_rows(rows: Vec<SourceLine>) -> Result<RoutedRows> {
    let mut routed = RoutedRows::default();
    for row in rows {
        match route_row(&row)? {
            Branch::Delivered => routed.delivered.push(row),
            Branch::Other => routed.other.push(row),
        }
    }
    Ok(routed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
