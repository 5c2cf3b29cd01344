//! Conversion of cleaned rows into named [`OrderRecord`]s.

use orders_core::error::Result;
use orders_core::models::{OrderRecord, SourceLine};

/// Map one cleaned row onto the 12 named columns.
pub fn to_record(line: &SourceLine) -> Result<OrderRecord> {
    OrderRecord::from_fields(&line.fields(), &line.location)
}

/// Convert a whole branch, stopping at the first malformed row.
pub fn to_records(lines: &[SourceLine]) -> Result<Vec<OrderRecord>> {
    lines.iter().map(to_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_core::error::EtlError;

    #[test]
    fn test_to_record_from_cleaned_reference_row() {
        let line = SourceLine::new(
            "orders.csv:2",
            "john,2024-01-01,10:00,ord1,pizza,20.50,online,abc,delivered,5,good,,1",
        );
        let record = to_record(&line).unwrap();
        assert_eq!(record.customer_id, "john");
        assert_eq!(record.items, "pizza");
        assert_eq!(record.status, "delivered");
        assert_eq!(record.feedback, "good");
        // The empty twelfth raw field maps to new_col; the counter is ignored.
        assert_eq!(record.new_col, "");
    }

    #[test]
    fn test_to_record_eleven_raw_fields_gets_counter() {
        let line = SourceLine::new(
            "orders.csv:3",
            "ann,2024-01-02,12:00,ord2,soup,8,cash,xyz,cancelled,4,fine,1",
        );
        assert_eq!(to_record(&line).unwrap().new_col, "1");
    }

    #[test]
    fn test_to_records_fails_on_short_row() {
        let lines = vec![SourceLine::new("orders.csv:4", "a,b,c,d,e,f,g,h,i,1")];
        assert!(matches!(
            to_records(&lines),
            Err(EtlError::MalformedRow { found: 10, required: 12, .. })
        ));
    }
}
