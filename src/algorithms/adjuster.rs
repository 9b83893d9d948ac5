//! End-to-end Gauss-Markov adjustment of a vector network

use crate::algorithms::design::{DesignMatrixBuilder, ObservationRow, WeightMatrixBuilder};
use crate::algorithms::normal::{weighted_square_sum, NormalEquationSolver, NormalEquations};
use crate::algorithms::precision::{PointPrecision, PrecisionEstimator};
use crate::core::network::{Network, UnknownVector};
use crate::core::observation::VectorObservation;
use crate::core::types::Point;
use crate::utils::config::{AdjustmentConfig, CovarianceScaling};
use crate::validation::error::AdjustmentError;
use nalgebra::{DMatrix, DVector, Vector3};
use tracing::{debug, info, warn};

/// Residual of one observation row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub row: ObservationRow,
    /// Metres for distances, radians for angles
    pub value: f64,
}

/// Outcome of one `adjust` call
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentResult {
    /// Every network point with its adjusted coordinates (fixed points unchanged)
    pub coordinates: Vec<Point>,
    pub residuals: Vec<Residual>,
    /// Variance factor of unit weight vᵗPv / r
    pub reference_variance: f64,
    /// Rows minus unknowns
    pub redundancy: usize,
    pub iterations: usize,
    /// Covariance of the unknowns, ordered as `unknowns`
    pub covariance: DMatrix<f64>,
    pub unknowns: UnknownVector,
    /// One entry per network point, fixed points included
    pub precision: Vec<PointPrecision>,
}

impl AdjustmentResult {
    pub fn coordinate(&self, name: &str) -> Option<&Point> {
        self.coordinates.iter().find(|p| p.name == name)
    }

    pub fn precision_of(&self, name: &str) -> Option<&PointPrecision> {
        self.precision.iter().find(|p| p.point == name)
    }

    pub fn max_abs_residual(&self) -> f64 {
        self.residuals.iter().map(|r| r.value.abs()).fold(0.0, f64::max)
    }
}

struct Iterate {
    l: DVector<f64>,
    correction: DVector<f64>,
    cofactor: DMatrix<f64>,
}

/// Runs the adjustment with a fixed configuration.
///
/// Holds no state between calls; one adjuster may serve several threads.
#[derive(Debug, Clone, Default)]
pub struct NetworkAdjuster {
    config: AdjustmentConfig,
}

impl NetworkAdjuster {
    pub fn new(config: AdjustmentConfig) -> Self {
        Self { config }
    }

    pub fn adjust(&self, network: &Network) -> Result<AdjustmentResult, AdjustmentError> {
        let unknowns = UnknownVector::from_network(network);
        let builder = DesignMatrixBuilder::new(network, &unknowns);
        let rows = builder.rows();
        let weights = WeightMatrixBuilder::new().weights(network);
        let a = builder.design_matrix()?;
        let redundancy = rows.len().saturating_sub(unknowns.len());

        debug!(
            rows = rows.len(),
            unknowns = unknowns.len(),
            redundancy,
            "assembled design matrix"
        );

        let mut positions = network.approximate_positions();

        let (iterations, last) = if unknowns.is_empty() {
            (0, None)
        } else {
            let (iterations, last) = self.iterate(network, &unknowns, &builder, &a, &weights, &mut positions)?;
            (iterations, Some(last))
        };

        let (residuals, cofactor) = match last {
            Some(last) => (&a * &last.correction + &last.l, last.cofactor),
            None => (builder.discrepancies(&positions)?, DMatrix::zeros(0, 0)),
        };

        let vtpv = weighted_square_sum(&residuals, &weights);
        let reference_variance = if redundancy > 0 {
            vtpv / redundancy as f64
        } else {
            warn!(
                a_priori_variance = self.config.a_priori_variance,
                "zero redundancy, variance factor not estimable; using a-priori variance"
            );
            self.config.a_priori_variance
        };

        let factor = match self.config.covariance_scaling {
            CovarianceScaling::APosteriori => reference_variance,
            CovarianceScaling::APriori => self.config.a_priori_variance,
        };
        let estimator = PrecisionEstimator::new();
        let covariance = estimator.covariance(&cofactor, factor);
        let precision = estimator.estimate(network, &unknowns, &covariance);

        let coordinates = network
            .points()
            .iter()
            .zip(positions.iter())
            .map(|(point, pos)| Point {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                ..point.clone()
            })
            .collect();

        let residuals = rows
            .into_iter()
            .zip(residuals.iter())
            .map(|(row, &value)| Residual { row, value })
            .collect();

        info!(
            iterations,
            redundancy,
            reference_variance,
            "adjustment complete"
        );

        Ok(AdjustmentResult {
            coordinates,
            residuals,
            reference_variance,
            redundancy,
            iterations,
            covariance,
            unknowns,
            precision,
        })
    }

    fn iterate(
        &self,
        network: &Network,
        unknowns: &UnknownVector,
        builder: &DesignMatrixBuilder<'_>,
        a: &DMatrix<f64>,
        weights: &DVector<f64>,
        positions: &mut [Vector3<f64>],
    ) -> Result<(usize, Iterate), AdjustmentError> {
        let solver = NormalEquationSolver::new(self.config.singularity_tolerance);
        let max_iterations = self.config.max_iterations;
        let mut iteration = 0;

        loop {
            iteration += 1;
            let l = builder.discrepancies(positions)?;
            let equations = NormalEquations::assemble(a, weights, &l);
            let solution = solver.solve(&equations, unknowns)?;

            apply_correction(network, unknowns, &solution.correction, positions);
            let max_correction = solution.correction.amax();
            debug!(iteration, max_correction_m = max_correction, "applied corrections");

            let step = Iterate {
                l,
                correction: solution.correction,
                cofactor: solution.cofactor,
            };

            if max_iterations == 1 || max_correction < self.config.convergence_tolerance_m {
                return Ok((iteration, step));
            }
            if iteration >= max_iterations {
                warn!(iteration, max_correction_m = max_correction, "adjustment did not converge");
                return Err(AdjustmentError::NotConverged {
                    iterations: iteration,
                    last_correction_m: max_correction,
                });
            }
        }
    }
}

fn apply_correction(network: &Network, unknowns: &UnknownVector, dt: &DVector<f64>, positions: &mut [Vector3<f64>]) {
    for (col, unknown) in unknowns.unknowns().iter().enumerate() {
        if let Some(index) = network.point_index(&unknown.point) {
            positions[index][unknown.axis.index()] += dt[col];
        }
    }
}

/// Validate the inputs and adjust with the default configuration
pub fn adjust(points: Vec<Point>, observations: Vec<VectorObservation>) -> Result<AdjustmentResult, AdjustmentError> {
    let network = Network::new(points, observations)?;
    NetworkAdjuster::default().adjust(&network)
}
