//! Shared types for the food-orders pipeline: errors, the order row model,
//! CLI settings, summary formatting, and the warehouse abstraction.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod warehouse;
