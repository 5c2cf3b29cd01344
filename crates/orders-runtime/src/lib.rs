//! Runtime layer for the food-orders pipeline.
//!
//! Builds the pipeline from configuration, runs it on tokio's blocking pool,
//! and writes both branches into a local day-partitioned warehouse.

pub mod local_warehouse;
pub mod orchestrator;
pub mod pipeline;
pub mod sink;

pub use orders_core as core;
pub use orders_data as data;
