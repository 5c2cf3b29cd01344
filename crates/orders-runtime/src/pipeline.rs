//! Pipeline construction and execution.
//!
//! [`build_pipeline`] turns a [`PipelineConfig`] into a [`Pipeline`]: the
//! dataset to bootstrap and one [`TableSink`] per branch. [`Pipeline::run`]
//! then executes it against a warehouse:
//!
//! 1. Ensure the dataset exists.
//! 2. Read lines (header skipped per file).
//! 3. Clean every row.
//! 4. Route rows to the delivered and other branches.
//! 5. Count and print the summaries.
//! 6. Convert each branch to records and append them to its table.
//!
//! Any malformed row aborts the run before either table is written. The two
//! table writes are independent: a failure writing the second leaves the
//! first in place.
//!
//! [`Pipeline::run_with_cancel`] checks a shared flag before each table
//! write and stops with [`EtlError::Interrupted`] once it is set.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, Utc};
use orders_core::error::{EtlError, Result};
use orders_core::models::Branch;
use orders_core::settings::Settings;
use orders_core::warehouse::{
    CreateDisposition, DatasetInfo, DatasetRef, Warehouse, WriteDisposition,
};
use orders_data::aggregator::{count, RunCounts};
use orders_data::cleaner::clean_rows;
use orders_data::formatter::to_records;
use orders_data::reader::{load_lines, DEFAULT_HEADER_LINES};
use orders_data::router::partition_rows;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::sink::{ensure_dataset, TableSink};

/// Description attached to the dataset when it is created.
pub const DATASET_DESCRIPTION: &str = "Dataset for food orders";

/// Project, dataset and table names: letters, digits, `_` and `-`.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

// ── PipelineConfig ────────────────────────────────────────────────────────────

/// Everything needed to build a [`Pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Input path, `file://` URI, or file-name pattern.
    pub input: String,
    /// Lines skipped at the top of each input file.
    pub header_lines: usize,
    pub project: String,
    pub dataset: String,
    pub delivered_table: String,
    pub other_table: String,
    /// Location given to the dataset when it is created.
    pub location: String,
    pub create_disposition: CreateDisposition,
    pub write_disposition: WriteDisposition,
    /// Day partition the rows are written to.
    pub partition_date: NaiveDate,
    /// Unrecognised command-line flags, kept for the record.
    pub runtime_args: Vec<String>,
}

impl PipelineConfig {
    /// Config with the default table names, `US` location, and today's
    /// (UTC) partition.
    pub fn new(
        input: impl Into<String>,
        project: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            header_lines: DEFAULT_HEADER_LINES,
            project: project.into(),
            dataset: dataset.into(),
            delivered_table: "delivered_orders".to_string(),
            other_table: "other_status_orders".to_string(),
            location: "US".to_string(),
            create_disposition: CreateDisposition::default(),
            write_disposition: WriteDisposition::default(),
            partition_date: Utc::now().date_naive(),
            runtime_args: Vec::new(),
        }
    }

    /// Build from parsed CLI settings.
    pub fn from_settings(settings: &Settings, partition_date: NaiveDate) -> Result<Self> {
        Ok(Self {
            input: settings.input.clone(),
            header_lines: DEFAULT_HEADER_LINES,
            project: settings.project.clone(),
            dataset: settings.dataset.clone(),
            delivered_table: settings.delivered_table.clone(),
            other_table: settings.other_table.clone(),
            location: settings.location.clone(),
            create_disposition: settings.create_disposition()?,
            write_disposition: settings.write_disposition()?,
            partition_date,
            runtime_args: settings.runtime_args.clone(),
        })
    }

    /// Reject empty or non-identifier names and a shared destination table.
    pub fn validate(&self) -> Result<()> {
        let identifier = Regex::new(IDENTIFIER_PATTERN)
            .map_err(|e| EtlError::Config(format!("invalid identifier pattern: {e}")))?;
        let required = [
            ("project", &self.project),
            ("dataset", &self.dataset),
            ("delivered table", &self.delivered_table),
            ("other table", &self.other_table),
        ];
        for (what, value) in required {
            if value.trim_matches('.').trim().is_empty() {
                return Err(EtlError::Config(format!("{what} name is empty")));
            }
            if !identifier.is_match(value) {
                return Err(EtlError::Config(format!(
                    "{what} name {value:?} may only contain letters, digits, '_' and '-'"
                )));
            }
        }
        if self.delivered_table == self.other_table {
            return Err(EtlError::Config(format!(
                "delivered and other rows cannot share table {}",
                self.delivered_table
            )));
        }
        Ok(())
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub counts: RunCounts,
    pub delivered_written: usize,
    pub other_written: usize,
}

/// A composed, ready-to-run pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    dataset: DatasetInfo,
    delivered: TableSink,
    other: TableSink,
}

/// Compose a [`Pipeline`] from `config`.
pub fn build_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    config.validate()?;

    let reference = DatasetRef::new(config.project.clone(), config.dataset.clone());
    let dataset = DatasetInfo::new(reference.clone(), config.location.clone())
        .with_description(DATASET_DESCRIPTION);

    let sink = |table: &str| {
        TableSink::new(reference.table(table))
            .with_dispositions(config.create_disposition, config.write_disposition)
    };
    let delivered = sink(&config.delivered_table);
    let other = sink(&config.other_table);

    Ok(Pipeline {
        config,
        dataset,
        delivered,
        other,
    })
}

impl Pipeline {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &DatasetInfo {
        &self.dataset
    }

    /// The sink a branch is written to.
    pub fn sink(&self, branch: Branch) -> &TableSink {
        match branch {
            Branch::Delivered => &self.delivered,
            Branch::Other => &self.other,
        }
    }

    /// Execute the pipeline, printing summaries to `out`.
    pub fn run(&self, warehouse: &dyn Warehouse, out: &mut dyn Write) -> Result<RunReport> {
        self.run_with_cancel(warehouse, out, &AtomicBool::new(false))
    }

    /// Like [`Pipeline::run`], stopping before the next table write once
    /// `cancel` is set.
    pub fn run_with_cancel(
        &self,
        warehouse: &dyn Warehouse,
        out: &mut dyn Write,
        cancel: &AtomicBool,
    ) -> Result<RunReport> {
        info!(
            "Running pipeline on {} -> {} (partition {})",
            self.config.input, self.dataset.reference, self.config.partition_date
        );
        if !self.config.runtime_args.is_empty() {
            debug!(args = ?self.config.runtime_args, "runtime pass-through options");
        }

        ensure_dataset(warehouse, &self.dataset)?;

        let lines = load_lines(&self.config.input, self.config.header_lines)?;
        let cleaned = clean_rows(&lines)?;
        let total = count(&cleaned);
        let routed = partition_rows(cleaned)?;

        let counts = RunCounts::from_routed(total, &routed);
        if !counts.is_consistent() {
            warn!(?counts, "branch counts do not add up to the total");
        }
        counts.emit(out)?;
        debug!(?counts, "rows counted");

        let delivered_records = to_records(&routed.delivered)?;
        let other_records = to_records(&routed.other)?;

        let partition = self.config.partition_date;
        checkpoint(cancel, &self.delivered)?;
        let delivered_written = self
            .delivered
            .write(warehouse, partition, &delivered_records)?;
        checkpoint(cancel, &self.other)?;
        let other_written = self.other.write(warehouse, partition, &other_records)?;

        info!(
            "Pipeline finished: {} delivered, {} other",
            delivered_written, other_written
        );

        Ok(RunReport {
            counts,
            delivered_written,
            other_written,
        })
    }
}

fn checkpoint(cancel: &AtomicBool, next: &TableSink) -> Result<()> {
    if cancel.load(Ordering::SeqCst) {
        warn!("Run cancelled before writing {}", next.table);
        return Err(EtlError::Interrupted(format!("writing {}", next.table)));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
