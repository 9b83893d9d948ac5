//! Least-squares adjustment algorithms

pub mod adjuster;
pub mod design;
pub mod geometry;
pub mod normal;
pub mod precision;

#[cfg(test)]
pub(crate) mod fixtures;

pub use adjuster::{adjust, AdjustmentResult, NetworkAdjuster, Residual};
pub use design::{DesignMatrixBuilder, ObservationRow, WeightMatrixBuilder};
pub use geometry::{GeometryFault, Partials, VectorGeometry};
pub use normal::{NormalEquationSolver, NormalEquations, NormalSolution};
pub use precision::{ErrorEllipse, PointPrecision, PrecisionEstimator};
