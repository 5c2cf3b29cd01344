//! Text rendering for run summaries and warehouse identifiers.

/// Label printed in front of the total row count.
pub const TOTAL_LABEL: &str = "Total Count";

/// Label printed in front of the delivered-branch count.
pub const DELIVERED_LABEL: &str = "Delivered count";

/// Label printed in front of the other-branch count.
pub const OTHER_LABEL: &str = "Others count";

/// Format a count as `"<label>:<count>"`.
///
/// # Examples
///
/// ```
/// use orders_core::formatting::format_count;
///
/// assert_eq!(format_count("Total Count", 42), "Total Count:42");
/// assert_eq!(format_count("Others count", 0), "Others count:0");
/// ```
pub fn format_count(label: &str, count: usize) -> String {
    format!("{}:{}", label, count)
}

/// Join the parts of a fully qualified table name with `.`.
///
/// Empty parts and stray dots around them are dropped, so a dataset given
/// as `".food_orders"` still yields a well-formed spec.
///
/// ```
/// use orders_core::formatting::table_spec;
///
/// assert_eq!(
///     table_spec("proj", ".food_orders", "delivered_orders"),
///     "proj.food_orders.delivered_orders"
/// );
/// ```
pub fn table_spec(project: &str, dataset: &str, table: &str) -> String {
    [project, dataset, table]
        .iter()
        .map(|part| part.trim_matches('.'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_labels() {
        assert_eq!(format_count(TOTAL_LABEL, 3), "Total Count:3");
        assert_eq!(format_count(DELIVERED_LABEL, 2), "Delivered count:2");
        assert_eq!(format_count(OTHER_LABEL, 1), "Others count:1");
    }

    #[test]
    fn test_table_spec_plain() {
        assert_eq!(table_spec("p", "d", "t"), "p.d.t");
    }

    #[test]
    fn test_table_spec_strips_stray_dots() {
        assert_eq!(table_spec("p.", ".d.", "t"), "p.d.t");
    }

    #[test]
    fn test_table_spec_skips_empty_parts() {
        assert_eq!(table_spec("", "d", "t"), "d.t");
    }
}
