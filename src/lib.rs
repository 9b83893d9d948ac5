//! GNSS Network Adjustment
//!
//! Weighted least-squares (Gauss-Markov) adjustment of GNSS baseline networks
//! with per-point error ellipses and height standard errors.

pub mod algorithms;
pub mod api;
pub mod core;
pub mod processing;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use algorithms::{
    adjust, AdjustmentResult, DesignMatrixBuilder, ErrorEllipse, NetworkAdjuster, NormalEquationSolver,
    PointPrecision, PrecisionEstimator, Residual, VectorGeometry, WeightMatrixBuilder,
};
pub use api::{AdjustmentReport, CsvFormatter, JsonFormatter, NetworkFile, OutputFormat, TextFormatter};
pub use crate::core::{Axis, Measured, Network, ObservationKind, Point, PointRole, UnknownVector, VectorObservation};
pub use processing::{ObservationReducer, TimeSeries};
pub use utils::{AdjustmentConfig, CovarianceScaling};
pub use validation::{AdjustmentError, SingularityReason};
