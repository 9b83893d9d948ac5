//! File input and report output
//!
//! Reads the JSON network file (reduced observations and raw time series)
//! and renders adjustment results as text, JSON or CSV.

pub mod formatting;
pub mod types;

pub use formatting::{
    AdjustmentReport, BaselineRow, CoordinateRow, CsvFormatter, JsonFormatter, PrecisionRow, ResidualRow, TextFormatter,
};
pub use types::{ApiError, ApiResult, BaselineRecord, NetworkFile, ObservationRecord, OutputFormat};
