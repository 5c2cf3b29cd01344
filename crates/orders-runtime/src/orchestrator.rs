//! Async entry point for running a [`Pipeline`].
//!
//! The pipeline itself is blocking file and warehouse I/O, so it is moved
//! onto tokio's blocking pool; the caller awaits the result (and can race
//! it against a shutdown signal) without stalling the runtime.
//!
//! Dropping the future returned by [`PipelineRunner::run`] does not stop the
//! blocking task. Call [`PipelineRunner::cancel`] and keep awaiting the run to
//! learn whether it stopped or had already finished.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use orders_core::error::{EtlError, Result};
use orders_core::warehouse::Warehouse;

use crate::pipeline::{Pipeline, RunReport};

// ── PipelineRunner ────────────────────────────────────────────────────────────

/// Owns a pipeline and the warehouse it writes to.
pub struct PipelineRunner {
    pipeline: Arc<Pipeline>,
    warehouse: Arc<dyn Warehouse>,
    cancel: Arc<AtomicBool>,
}

impl PipelineRunner {
    pub fn new(pipeline: Pipeline, warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            warehouse,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask a running pipeline to stop before its next table write.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Run the pipeline, printing summaries to standard output.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_output(std::io::stdout())
            .await
            .map(|(report, _)| report)
    }

    /// Run the pipeline with summaries written to `out`, handing `out` back.
    pub async fn run_with_output<W>(&self, mut out: W) -> Result<(RunReport, W)>
    where
        W: Write + Send + 'static,
    {
        let pipeline = Arc::clone(&self.pipeline);
        let warehouse = Arc::clone(&self.warehouse);
        let cancel = Arc::clone(&self.cancel);

        let joined = tokio::task::spawn_blocking(move || {
            let result = pipeline.run_with_cancel(warehouse.as_ref(), &mut out, &cancel);
            result.map(|report| (report, out))
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("pipeline task did not complete: {}", e);
                Err(EtlError::Other(anyhow::Error::new(e)))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
