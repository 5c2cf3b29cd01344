mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use orders_core::settings::Settings;
use orders_core::warehouse::Warehouse;
use orders_runtime::local_warehouse::LocalWarehouse;
use orders_runtime::orchestrator::PipelineRunner;
use orders_runtime::pipeline::{build_pipeline, PipelineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("food-orders v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Project: {}, Dataset: {}",
        settings.input,
        settings.project,
        settings.dataset
    );

    let config = PipelineConfig::from_settings(&settings, Utc::now().date_naive())?;
    let pipeline = build_pipeline(config)?;

    let warehouse_root = settings.warehouse_root();
    tracing::debug!("Warehouse root: {}", warehouse_root.display());
    let warehouse: Arc<dyn Warehouse> = Arc::new(LocalWarehouse::new(warehouse_root));

    let runner = PipelineRunner::new(pipeline, warehouse);

    // Ctrl+C cancels the run, but its outcome is still awaited: a run that
    // already finished writing exits successfully.
    let run = runner.run();
    tokio::pin!(run);
    let result = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Ctrl+C received; stopping before the next table write");
            runner.cancel();
            run.await
        }
    };

    let report = result?;
    tracing::info!(
        "Loaded {} delivered and {} other rows",
        report.delivered_written,
        report.other_written
    );

    Ok(())
}
