//! Row-processing layer for the food-orders pipeline.
//!
//! Reads delimited order exports, cleans each row, routes rows by delivery
//! status, counts them, and converts them into structured records.

pub mod aggregator;
pub mod cleaner;
pub mod formatter;
pub mod reader;
pub mod router;

pub use orders_core as core;
