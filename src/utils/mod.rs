//! Configuration

pub mod config;

pub use config::{AdjustmentConfig, ConfigError, CovarianceScaling};
