//! Row counting over the cleaned stream and its two branches.

use std::io::Write;

use orders_core::error::Result;
use orders_core::formatting::{format_count, DELIVERED_LABEL, OTHER_LABEL, TOTAL_LABEL};

use crate::router::RoutedRows;

// ── RunCounts ─────────────────────────────────────────────────────────────────

/// Cardinalities of the cleaned set and of each branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub total: usize,
    pub delivered: usize,
    pub other: usize,
}

impl RunCounts {
    /// Count a cleaned set and its routed branches.
    pub fn from_routed(total: usize, routed: &RoutedRows) -> Self {
        Self {
            total,
            delivered: count(&routed.delivered),
            other: count(&routed.other),
        }
    }

    /// `total == delivered + other`.
    pub fn is_consistent(&self) -> bool {
        self.total == self.delivered + self.other
    }

    /// The three summary lines, total first.
    pub fn summary_lines(&self) -> [String; 3] {
        [
            format_count(TOTAL_LABEL, self.total),
            format_count(DELIVERED_LABEL, self.delivered),
            format_count(OTHER_LABEL, self.other),
        ]
    }

    /// Write [`RunCounts::summary_lines`] to `out`, one per line.
    pub fn emit(&self, out: &mut dyn Write) -> Result<()> {
        for line in self.summary_lines() {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Number of items in a finite stream, independent of their content.
pub fn count<T>(items: impl IntoIterator<Item = T>) -> usize {
    items.into_iter().count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use orders_core::models::SourceLine;

    fn lines(n: usize) -> Vec<SourceLine> {
        (0..n)
            .map(|i| SourceLine::new(format!("t:{i}"), "x"))
            .collect()
    }

    #[test]
    fn test_count_ignores_content() {
        assert_eq!(count(&lines(4)), 4);
        assert_eq!(count(Vec::<SourceLine>::new()), 0);
    }

    #[test]
    fn test_from_routed() {
        let routed = RoutedRows {
            delivered: lines(2),
            other: lines(3),
        };
        let counts = RunCounts::from_routed(5, &routed);
        assert_eq!(counts.delivered, 2);
        assert_eq!(counts.other, 3);
        assert!(counts.is_consistent());
    }

    #[test]
    fn test_inconsistent_counts_detected() {
        let counts = RunCounts {
            total: 4,
            delivered: 2,
            other: 1,
        };
        assert!(!counts.is_consistent());
    }

    #[test]
    fn test_summary_lines_format() {
        let counts = RunCounts {
            total: 10,
            delivered: 7,
            other: 3,
        };
        assert_eq!(
            counts.summary_lines(),
            [
                "Total Count:10".to_string(),
                "Delivered count:7".to_string(),
                "Others count:3".to_string(),
            ]
        );
    }

    #[test]
    fn test_emit_writes_three_lines() {
        let counts = RunCounts {
            total: 1,
            delivered: 1,
            other: 0,
        };
        let mut buf: Vec<u8> = Vec::new();
        counts.emit(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Total Count:1\nDelivered count:1\nOthers count:0\n"
        );
    }
}
