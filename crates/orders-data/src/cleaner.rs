//! Row-level text cleanup.
//!
//! [`clean_row`] applies, in order: trailing-colon removal on the `items`
//! column, lowercasing, special-character stripping, and the `,1` counter
//! suffix. Each step is also exposed on its own.

use orders_core::error::Result;
use orders_core::models::{SourceLine, DELIMITER, ITEMS_INDEX};

/// Characters removed from every field.
pub const SPECIAL_CHARS: [char; 3] = ['?', '%', '&'];

/// Suffix appended to every cleaned row; becomes the `new_col` column.
pub const COUNTER_SUFFIX: &str = ",1";

/// Run the full cleanup on one row.
///
/// Fails with `MalformedRow` when the row has no `items` column.
pub fn clean_row(line: &SourceLine) -> Result<SourceLine> {
    let text = remove_trailing_colon(line)?;
    let text = text.to_lowercase();
    let text = remove_special_characters(&text);
    Ok(line.with_text(append_counter(&text)))
}

/// Clean every row, stopping at the first malformed one.
pub fn clean_rows(lines: &[SourceLine]) -> Result<Vec<SourceLine>> {
    lines.iter().map(clean_row).collect()
}

/// Drop a single trailing `:` from the `items` column.
pub fn remove_trailing_colon(line: &SourceLine) -> Result<String> {
    let mut fields = line.fields_at_least(ITEMS_INDEX + 1)?;
    let items = fields[ITEMS_INDEX];
    if let Some(stripped) = items.strip_suffix(':') {
        fields[ITEMS_INDEX] = stripped;
    }
    Ok(join(&fields))
}

/// Remove [`SPECIAL_CHARS`] from each field, keeping the separators.
pub fn remove_special_characters(text: &str) -> String {
    let fields: Vec<String> = text
        .split(DELIMITER)
        .map(|field| field.replace(SPECIAL_CHARS, ""))
        .collect();
    fields.join(&DELIMITER.to_string())
}

/// Tag the row with the constant counter column.
pub fn append_counter(text: &str) -> String {
    format!("{}{}", text, COUNTER_SUFFIX)
}

fn join(fields: &[&str]) -> String {
    fields.join(&DELIMITER.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use orders_core::error::EtlError;

    fn line(text: &str) -> SourceLine {
        SourceLine::new("orders.csv:2", text)
    }

    #[test]
    fn test_clean_row_reference_example() {
        let raw = line("John,2024-01-01,10:00,ORD1,Pizza:,20.50,online,ABC,Delivered,5,good,");
        let cleaned = clean_row(&raw).unwrap();
        assert_eq!(
            cleaned.text,
            "john,2024-01-01,10:00,ord1,pizza,20.50,online,abc,delivered,5,good,,1"
        );
        assert_eq!(cleaned.location, "orders.csv:2");
    }

    #[test]
    fn test_clean_row_strips_special_characters() {
        let raw = line("c1,2024-01-02,11:00,o2,item?A&B,50%,cash,xyz,pending,3,ok");
        let cleaned = clean_row(&raw).unwrap();
        let fields: Vec<&str> = cleaned.text.split(',').collect();
        assert_eq!(fields[4], "itemab");
        assert_eq!(fields[5], "50");
    }

    #[test]
    fn test_remove_trailing_colon_only_one() {
        let raw = line("a,b,c,d,rice::,f");
        assert_eq!(remove_trailing_colon(&raw).unwrap(), "a,b,c,d,rice:,f");
    }

    #[test]
    fn test_remove_trailing_colon_only_items_column() {
        let raw = line("a:,b,c,d,rice,f:");
        assert_eq!(remove_trailing_colon(&raw).unwrap(), "a:,b,c,d,rice,f:");
    }

    #[test]
    fn test_remove_trailing_colon_too_few_fields() {
        let err = remove_trailing_colon(&line("a,b,c")).unwrap_err();
        assert!(matches!(
            err,
            EtlError::MalformedRow { found: 3, required: 5, .. }
        ));
    }

    #[test]
    fn test_clean_row_three_fields_fails() {
        assert!(clean_row(&line("x,y,z")).is_err());
    }

    #[test]
    fn test_special_character_stripping_is_idempotent() {
        let once = remove_special_characters("a?b,%c%,&&d,e");
        assert_eq!(once, "ab,c,d,e");
        assert_eq!(remove_special_characters(&once), once);
    }

    #[test]
    fn test_special_character_stripping_keeps_field_count() {
        let out = remove_special_characters("?,%,&");
        assert_eq!(out, ",,");
        assert_eq!(out.split(',').count(), 3);
    }

    #[test]
    fn test_clean_row_is_not_idempotent() {
        let raw = line("a,b,c,d,e,f,g,h,delivered,j,k");
        let once = clean_row(&raw).unwrap();
        let twice = clean_row(&once).unwrap();
        assert_eq!(twice.text, format!("{},1", once.text));
    }

    #[test]
    fn test_clean_rows_stops_at_first_error() {
        let rows = vec![line("a,b,c,d,e"), SourceLine::new("orders.csv:3", "bad")];
        let err = clean_rows(&rows).unwrap_err();
        assert!(matches!(
            err,
            EtlError::MalformedRow { ref location, .. } if location == "orders.csv:3"
        ));
    }
}
