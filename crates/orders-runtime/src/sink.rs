//! Dataset bootstrap and per-branch table writes.

use chrono::NaiveDate;
use orders_core::error::{EtlError, Result};
use orders_core::models::OrderRecord;
use orders_core::warehouse::{
    CreateDisposition, DatasetInfo, TableInfo, TableRef, TableSchema, TimePartitioning, Warehouse,
    WriteDisposition,
};
use tracing::{debug, info};

/// Make sure the dataset exists, creating it when it does not.
///
/// Only a definite "not found" leads to creation; any other lookup failure
/// is returned as-is. Creation tolerates a concurrent creator.
pub fn ensure_dataset(warehouse: &dyn Warehouse, dataset: &DatasetInfo) -> Result<DatasetInfo> {
    if let Some(existing) = warehouse.get_dataset(&dataset.reference)? {
        debug!("Dataset {} already exists", dataset.reference);
        return Ok(existing);
    }

    info!(
        "Creating dataset {} in {}",
        dataset.reference, dataset.location
    );
    warehouse.create_dataset(dataset, true)
}

// ── TableSink ─────────────────────────────────────────────────────────────────

/// Destination for one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSink {
    pub table: TableRef,
    pub create_disposition: CreateDisposition,
    pub write_disposition: WriteDisposition,
}

impl TableSink {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            create_disposition: CreateDisposition::default(),
            write_disposition: WriteDisposition::default(),
        }
    }

    pub fn with_dispositions(mut self, create: CreateDisposition, write: WriteDisposition) -> Self {
        self.create_disposition = create;
        self.write_disposition = write;
        self
    }

    /// Fetch the table, creating it when allowed, and check its schema and
    /// day partitioning.
    pub fn ensure_table(&self, warehouse: &dyn Warehouse) -> Result<TableInfo> {
        if let Some(existing) = warehouse.get_table(&self.table)? {
            if existing.schema != TableSchema::orders()
                || existing.partitioning != Some(TimePartitioning::Day)
            {
                return Err(EtlError::SchemaMismatch(self.table.to_string()));
            }
            return Ok(existing);
        }

        match self.create_disposition {
            CreateDisposition::CreateIfNeeded => {
                info!("Creating table {}", self.table);
                warehouse.create_table(&TableInfo::orders(self.table.clone()))
            }
            CreateDisposition::CreateNever => Err(EtlError::TableNotFound(self.table.to_string())),
        }
    }

    /// Ensure the table, then append `records` to the `partition` day.
    pub fn write(
        &self,
        warehouse: &dyn Warehouse,
        partition: NaiveDate,
        records: &[OrderRecord],
    ) -> Result<usize> {
        self.ensure_table(warehouse)?;

        if self.write_disposition == WriteDisposition::WriteEmpty
            && warehouse.row_count(&self.table)? > 0
        {
            return Err(EtlError::TableNotEmpty(self.table.to_string()));
        }

        let written = warehouse.append_rows(&self.table, partition, records)?;
        info!("Wrote {} rows to {}", written, self.table);
        Ok(written)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
