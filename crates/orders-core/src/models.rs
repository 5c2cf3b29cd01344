use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EtlError, Result};

// ── Row layout ────────────────────────────────────────────────────────────────

/// Column names of an order row, in file order.
pub const FIELD_NAMES: [&str; 12] = [
    "customer_id",
    "date",
    "timestamp",
    "order_id",
    "items",
    "amount",
    "mode",
    "restaurant",
    "status",
    "ratings",
    "feedback",
    "new_col",
];

/// Number of named fields in an [`OrderRecord`].
pub const FIELD_COUNT: usize = FIELD_NAMES.len();

/// Position of the `items` column.
pub const ITEMS_INDEX: usize = 4;

/// Position of the `status` column.
pub const STATUS_INDEX: usize = 8;

/// Field separator used by the input files.
pub const DELIMITER: char = ',';

/// A raw line read from an input file, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Human-readable origin, `"<path>:<line>"`.
    pub location: String,
    /// The line text with any trailing `\r` removed.
    pub text: String,
}

impl SourceLine {
    pub fn new(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            text: text.into(),
        }
    }

    /// Replace the text, keeping the origin.
    pub fn with_text(&self, text: String) -> Self {
        Self {
            location: self.location.clone(),
            text,
        }
    }

    /// Split the text on [`DELIMITER`].
    pub fn fields(&self) -> Vec<&str> {
        self.text.split(DELIMITER).collect()
    }

    /// Split the text and require at least `required` fields.
    pub fn fields_at_least(&self, required: usize) -> Result<Vec<&str>> {
        let fields = self.fields();
        if fields.len() < required {
            return Err(EtlError::malformed(
                self.location.clone(),
                fields.len(),
                required,
            ));
        }
        Ok(fields)
    }
}

// ── Branch ────────────────────────────────────────────────────────────────────

/// The two disjoint streams produced by routing on delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Orders whose status is `delivered`.
    Delivered,
    /// Every other status.
    Other,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Delivered => write!(f, "delivered"),
            Branch::Other => write!(f, "other"),
        }
    }
}

// ── OrderRecord ───────────────────────────────────────────────────────────────

/// The structured, warehouse-ready form of a cleaned order row.
///
/// Serializes to a JSON object keyed by [`FIELD_NAMES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub customer_id: String,
    pub date: String,
    pub timestamp: String,
    pub order_id: String,
    pub items: String,
    pub amount: String,
    pub mode: String,
    pub restaurant: String,
    pub status: String,
    pub ratings: String,
    pub feedback: String,
    pub new_col: String,
}

impl OrderRecord {
    /// Map positional fields onto named columns.
    ///
    /// At least [`FIELD_COUNT`] fields are required; anything past the
    /// twelfth is ignored. `location` is only used in the error.
    pub fn from_fields(fields: &[&str], location: &str) -> Result<Self> {
        let [customer_id, date, timestamp, order_id, items, amount, mode, restaurant, status, ratings, feedback, new_col, ..] = fields
        else {
            return Err(EtlError::malformed(location, fields.len(), FIELD_COUNT));
        };

        Ok(Self {
            customer_id: customer_id.to_string(),
            date: date.to_string(),
            timestamp: timestamp.to_string(),
            order_id: order_id.to_string(),
            items: items.to_string(),
            amount: amount.to_string(),
            mode: mode.to_string(),
            restaurant: restaurant.to_string(),
            status: status.to_string(),
            ratings: ratings.to_string(),
            feedback: feedback.to_string(),
            new_col: new_col.to_string(),
        })
    }

    /// Column values in [`FIELD_NAMES`] order.
    pub fn values(&self) -> [&str; FIELD_COUNT] {
        [
            self.customer_id.as_str(),
            self.date.as_str(),
            self.timestamp.as_str(),
            self.order_id.as_str(),
            self.items.as_str(),
            self.amount.as_str(),
            self.mode.as_str(),
            self.restaurant.as_str(),
            self.status.as_str(),
            self.ratings.as_str(),
            self.feedback.as_str(),
            self.new_col.as_str(),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn twelve() -> Vec<&'static str> {
        vec![
            "john", "2024-01-01", "10:00", "ord1", "pizza", "20.50", "online", "abc",
            "delivered", "5", "good", "1",
        ]
    }

    #[test]
    fn test_from_fields_maps_positions() {
        let record = OrderRecord::from_fields(&twelve(), "t:1").unwrap();
        assert_eq!(record.customer_id, "john");
        assert_eq!(record.items, "pizza");
        assert_eq!(record.status, "delivered");
        assert_eq!(record.new_col, "1");
    }

    #[test]
    fn test_from_fields_ignores_extra_fields() {
        let mut fields = twelve();
        fields.push("extra");
        let record = OrderRecord::from_fields(&fields, "t:1").unwrap();
        assert_eq!(record.new_col, "1");
    }

    #[test]
    fn test_from_fields_too_few_is_malformed() {
        let fields = twelve();
        let err = OrderRecord::from_fields(&fields[..11], "orders.csv:7").unwrap_err();
        match err {
            EtlError::MalformedRow {
                location,
                found,
                required,
            } => {
                assert_eq!(location, "orders.csv:7");
                assert_eq!(found, 11);
                assert_eq!(required, FIELD_COUNT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_record_serializes_with_field_names() {
        let record = OrderRecord::from_fields(&twelve(), "t:1").unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), FIELD_COUNT);
        for name in FIELD_NAMES {
            assert!(obj.contains_key(name), "missing key {name}");
        }
    }

    #[test]
    fn test_values_follow_field_order() {
        let record = OrderRecord::from_fields(&twelve(), "t:1").unwrap();
        assert_eq!(record.values().to_vec(), twelve());
    }

    #[test]
    fn test_fields_at_least() {
        let line = SourceLine::new("f:2", "a,b,c");
        assert_eq!(line.fields_at_least(3).unwrap(), vec!["a", "b", "c"]);
        assert!(matches!(
            line.fields_at_least(5),
            Err(EtlError::MalformedRow { found: 3, required: 5, .. })
        ));
    }

    #[test]
    fn test_branch_display() {
        assert_eq!(Branch::Delivered.to_string(), "delivered");
        assert_eq!(Branch::Other.to_string(), "other");
    }
}
