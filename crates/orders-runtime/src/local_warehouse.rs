//! Directory-backed [`Warehouse`].
//!
//! Layout under the root:
//!
//! ```text
//! <project>/<dataset>/dataset.json
//! <project>/<dataset>/<table>/table.json
//! <project>/<dataset>/<table>/<YYYY-MM-DD>/rows.jsonl
//! ```
//!
//! Rows are appended as JSON Lines to the partition file of the given day.
//! Metadata files are written to a temp file and renamed into place.

use std::fs::OpenOptions;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use orders_core::error::{EtlError, Result};
use orders_core::models::OrderRecord;
use orders_core::warehouse::{DatasetInfo, DatasetRef, TableInfo, TableRef, Warehouse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const DATASET_META: &str = "dataset.json";
const TABLE_META: &str = "table.json";
const ROWS_FILE: &str = "rows.jsonl";
const PARTITION_FORMAT: &str = "%Y-%m-%d";

// ── LocalWarehouse ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocalWarehouse {
    root: PathBuf,
}

impl LocalWarehouse {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, dataset: &DatasetRef) -> PathBuf {
        self.root.join(&dataset.project).join(&dataset.dataset)
    }

    fn table_dir(&self, table: &TableRef) -> PathBuf {
        self.dataset_dir(&table.dataset).join(&table.table)
    }

    /// Path of the JSON Lines file holding `table`'s rows for `day`.
    pub fn partition_path(&self, table: &TableRef, day: NaiveDate) -> PathBuf {
        self.table_dir(table)
            .join(day.format(PARTITION_FORMAT).to_string())
            .join(ROWS_FILE)
    }

    /// Read back every row stored in one partition.
    pub fn read_partition(&self, table: &TableRef, day: NaiveDate) -> Result<Vec<OrderRecord>> {
        let path = self.partition_path(table, day);
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(EtlError::Warehouse { path, source }),
        };

        let mut rows = Vec::new();
        for line in std::io::BufReader::new(file).lines() {
            let line = line.map_err(|source| EtlError::Warehouse {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        Ok(rows)
    }

    /// Days that currently have a partition directory, sorted.
    pub fn partitions(&self, table: &TableRef) -> Result<Vec<NaiveDate>> {
        let dir = self.table_dir(table);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(EtlError::Warehouse { path: dir, source }),
        };

        let mut days: Vec<NaiveDate> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                NaiveDate::parse_from_str(&entry.file_name().to_string_lossy(), PARTITION_FORMAT)
                    .ok()
            })
            .collect();
        days.sort();
        Ok(days)
    }
}

impl Warehouse for LocalWarehouse {
    fn get_dataset(&self, dataset: &DatasetRef) -> Result<Option<DatasetInfo>> {
        read_meta(&self.dataset_dir(dataset).join(DATASET_META))
    }

    fn create_dataset(&self, info: &DatasetInfo, exists_ok: bool) -> Result<DatasetInfo> {
        if let Some(existing) = self.get_dataset(&info.reference)? {
            if exists_ok {
                return Ok(existing);
            }
            return Err(EtlError::AlreadyExists(info.reference.to_string()));
        }

        let mut created = info.clone();
        created.created_at = Some(Utc::now());
        write_meta(
            &self.dataset_dir(&info.reference).join(DATASET_META),
            &created,
        )?;
        debug!("Created dataset {}", info.reference);
        Ok(created)
    }

    fn get_table(&self, table: &TableRef) -> Result<Option<TableInfo>> {
        read_meta(&self.table_dir(table).join(TABLE_META))
    }

    fn create_table(&self, info: &TableInfo) -> Result<TableInfo> {
        if self.get_dataset(&info.reference.dataset)?.is_none() {
            return Err(EtlError::Config(format!(
                "dataset {} does not exist",
                info.reference.dataset
            )));
        }
        if self.get_table(&info.reference)?.is_some() {
            return Err(EtlError::AlreadyExists(info.reference.to_string()));
        }

        let mut created = info.clone();
        created.created_at = Some(Utc::now());
        write_meta(&self.table_dir(&info.reference).join(TABLE_META), &created)?;
        debug!("Created table {}", info.reference);
        Ok(created)
    }

    fn row_count(&self, table: &TableRef) -> Result<usize> {
        let mut total = 0;
        for day in self.partitions(table)? {
            total += self.read_partition(table, day)?.len();
        }
        Ok(total)
    }

    fn append_rows(
        &self,
        table: &TableRef,
        partition: NaiveDate,
        rows: &[OrderRecord],
    ) -> Result<usize> {
        if self.get_table(table)?.is_none() {
            return Err(EtlError::TableNotFound(table.to_string()));
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let path = self.partition_path(table, partition);
        let io_err = |source| EtlError::Warehouse {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        debug!(
            "Appended {} rows to {} partition {}",
            rows.len(),
            table,
            partition
        );
        Ok(rows.len())
    }
}

// ── Metadata I/O ──────────────────────────────────────────────────────────────

/// `Ok(None)` when `path` does not exist; any other failure is an error.
fn read_meta<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EtlError::Warehouse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_meta<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let io_err = |source| EtlError::Warehouse {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(value)?;

    // Write to a temp file then rename for atomicity.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
