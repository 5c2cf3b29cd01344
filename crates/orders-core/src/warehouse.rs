//! Warehouse abstraction used by the sink.
//!
//! A [`Warehouse`] stores datasets, each holding day-partitioned tables of
//! [`OrderRecord`]s. Lookups return `Ok(None)` for "not found" so callers can
//! tell a missing object apart from a failure to reach it.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formatting::table_spec;
use crate::models::{OrderRecord, FIELD_NAMES};

// ── Identifiers ───────────────────────────────────────────────────────────────

/// `<project>.<dataset>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    pub project: String,
    pub dataset: String,
}

impl DatasetRef {
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into().trim_matches('.').to_string(),
        }
    }

    /// Reference a table inside this dataset.
    pub fn table(&self, table: impl Into<String>) -> TableRef {
        TableRef {
            dataset: self.clone(),
            table: table.into(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}

/// `<project>.<dataset>.<table>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub dataset: DatasetRef,
    pub table: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&table_spec(
            &self.dataset.project,
            &self.dataset.dataset,
            &self.table,
        ))
    }
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Dataset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub reference: DatasetRef,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DatasetInfo {
    pub fn new(reference: DatasetRef, location: impl Into<String>) -> Self {
        Self {
            reference,
            location: location.into(),
            description: None,
            created_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Column data types understood by the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "STRING"),
        }
    }
}

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

/// Ordered column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<ColumnSchema>,
}

impl TableSchema {
    /// The fixed order schema: every field in [`FIELD_NAMES`] as `STRING`.
    pub fn orders() -> Self {
        Self {
            fields: FIELD_NAMES
                .iter()
                .map(|name| ColumnSchema {
                    name: name.to_string(),
                    kind: ColumnType::String,
                })
                .collect(),
        }
    }
}

/// Renders as `name:TYPE,name:TYPE,...`.
impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|c| format!("{}:{}", c.name, c.kind))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Partition granularity. Rows are partitioned by ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimePartitioning {
    Day,
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub reference: TableRef,
    pub schema: TableSchema,
    pub partitioning: Option<TimePartitioning>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TableInfo {
    /// A day-partitioned table with the order schema.
    pub fn orders(reference: TableRef) -> Self {
        Self {
            reference,
            schema: TableSchema::orders(),
            partitioning: Some(TimePartitioning::Day),
            created_at: None,
        }
    }
}

// ── Dispositions ──────────────────────────────────────────────────────────────

/// What to do when the destination table is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateDisposition {
    #[default]
    CreateIfNeeded,
    CreateNever,
}

/// What to do with rows already in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDisposition {
    /// Add rows after whatever is there.
    #[default]
    Append,
    /// Refuse to write unless the table holds no rows.
    WriteEmpty,
}

// ── Warehouse trait ───────────────────────────────────────────────────────────

/// Storage backend for datasets and day-partitioned tables.
pub trait Warehouse: Send + Sync {
    /// Fetch dataset metadata; `Ok(None)` only when it does not exist.
    fn get_dataset(&self, dataset: &DatasetRef) -> Result<Option<DatasetInfo>>;

    /// Create a dataset. With `exists_ok`, an existing dataset is returned
    /// unchanged instead of failing.
    fn create_dataset(&self, info: &DatasetInfo, exists_ok: bool) -> Result<DatasetInfo>;

    /// Fetch table metadata; `Ok(None)` only when it does not exist.
    fn get_table(&self, table: &TableRef) -> Result<Option<TableInfo>>;

    /// Create a table inside an existing dataset.
    fn create_table(&self, info: &TableInfo) -> Result<TableInfo>;

    /// Number of rows stored across all partitions.
    fn row_count(&self, table: &TableRef) -> Result<usize>;

    /// Append `rows` to the partition for `partition`. Returns rows written.
    fn append_rows(
        &self,
        table: &TableRef,
        partition: NaiveDate,
        rows: &[OrderRecord],
    ) -> Result<usize>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_schema_string() {
        let schema = TableSchema::orders().to_string();
        assert!(schema.starts_with("customer_id:STRING,date:STRING"));
        assert!(schema.ends_with("feedback:STRING,new_col:STRING"));
        assert_eq!(schema.split(',').count(), 12);
    }

    #[test]
    fn test_dataset_ref_trims_leading_dot() {
        let ds = DatasetRef::new("proj", ".food_orders");
        assert_eq!(ds.dataset, "food_orders");
        assert_eq!(ds.to_string(), "proj.food_orders");
    }

    #[test]
    fn test_table_ref_display() {
        let table = DatasetRef::new("proj", "food_orders").table("delivered_orders");
        assert_eq!(table.to_string(), "proj.food_orders.delivered_orders");
    }

    #[test]
    fn test_table_info_orders_is_day_partitioned() {
        let info = TableInfo::orders(DatasetRef::new("p", "d").table("t"));
        assert_eq!(info.partitioning, Some(TimePartitioning::Day));
        assert_eq!(info.schema, TableSchema::orders());
    }

    #[test]
    fn test_dispositions_default() {
        assert_eq!(CreateDisposition::default(), CreateDisposition::CreateIfNeeded);
        assert_eq!(WriteDisposition::default(), WriteDisposition::Append);
    }

    #[test]
    fn test_schema_json_uses_type_key() {
        let json = serde_json::to_value(TableSchema::orders()).unwrap();
        assert_eq!(json["fields"][0]["name"], "customer_id");
        assert_eq!(json["fields"][0]["type"], "STRING");
    }
}
