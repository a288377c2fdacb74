//! Core types and aggregation service for the areaguide neighbourhood report pipeline.

/// Tag-based categorization of point-of-interest records.
pub mod categories;
/// Explicit runtime configuration for providers.
pub mod config;
/// Domain models shared by all providers and the report consumer.
pub mod model;
/// Traits describing the provider interfaces.
pub mod ports;
/// Heuristic gate for region-specific providers.
pub mod region;
/// Orchestrating service that assembles a full guide report.
pub mod service;

pub use categories::*;
pub use config::*;
pub use model::*;
pub use ports::*;
pub use region::*;
pub use service::*;
