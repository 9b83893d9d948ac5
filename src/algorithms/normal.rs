//! Normal equations N·dt = −b with rank checking

use crate::core::network::UnknownVector;
use crate::validation::error::{AdjustmentError, SingularityReason};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Component magnitude in a null-space vector that marks an unknown as free to move
const NULL_SPACE_COMPONENT_THRESHOLD: f64 = 1e-6;

/// N = AᵗPA and b = AᵗPl for a diagonal P
#[derive(Debug, Clone, PartialEq)]
pub struct NormalEquations {
    pub n: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl NormalEquations {
    /// `weights` holds the diagonal of P
    pub fn assemble(a: &DMatrix<f64>, weights: &DVector<f64>, l: &DVector<f64>) -> Self {
        let mut pa = a.clone();
        for (mut row, &w) in pa.row_iter_mut().zip(weights.iter()) {
            row *= w;
        }
        let at = a.transpose();
        let n = &at * &pa;
        let b = at * l.component_mul(weights);
        Self { n, b }
    }
}

/// Correction vector and the cofactor matrix N⁻¹
#[derive(Debug, Clone, PartialEq)]
pub struct NormalSolution {
    pub correction: DVector<f64>,
    pub cofactor: DMatrix<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct NormalEquationSolver {
    singularity_tolerance: f64,
}

impl NormalEquationSolver {
    pub fn new(singularity_tolerance: f64) -> Self {
        Self { singularity_tolerance }
    }

    /// Solve via Cholesky after a singular value check.
    ///
    /// Fails with `SingularNetwork` (rank deficient) naming the points whose
    /// unknowns span the near-null space of N.
    pub fn solve(&self, equations: &NormalEquations, unknowns: &UnknownVector) -> Result<NormalSolution, AdjustmentError> {
        let unconstrained = self.unconstrained_points(&equations.n, unknowns);
        if !unconstrained.is_empty() {
            return Err(AdjustmentError::SingularNetwork {
                reason: SingularityReason::RankDeficient,
                unconstrained_points: unconstrained,
            });
        }

        let cholesky = equations
            .n
            .clone()
            .cholesky()
            .ok_or_else(|| AdjustmentError::SingularNetwork {
                reason: SingularityReason::RankDeficient,
                unconstrained_points: Vec::new(),
            })?;

        let correction = -cholesky.solve(&equations.b);
        let cofactor = cholesky.inverse();

        Ok(NormalSolution { correction, cofactor })
    }

    /// Points touched by singular vectors whose singular value is below
    /// `singularity_tolerance · σ_max`; empty when N has full rank
    pub fn unconstrained_points(&self, n: &DMatrix<f64>, unknowns: &UnknownVector) -> Vec<String> {
        if n.is_empty() {
            return Vec::new();
        }

        let svd = n.clone().svd(false, true);
        let max_sv = svd.singular_values.max();
        let threshold = self.singularity_tolerance * max_sv;
        let min_sv = svd.singular_values.min();
        debug!(
            max_singular_value = max_sv,
            min_singular_value = min_sv,
            "normal matrix spectrum"
        );
        if max_sv > 0.0 && min_sv >= threshold {
            return Vec::new();
        }

        let Some(v_t) = svd.v_t else {
            return Vec::new();
        };

        let mut points: Vec<String> = Vec::new();
        for (i, &sv) in svd.singular_values.iter().enumerate() {
            if max_sv > 0.0 && sv >= threshold {
                continue;
            }
            for (col, &component) in v_t.row(i).iter().enumerate() {
                if component.abs() <= NULL_SPACE_COMPONENT_THRESHOLD {
                    continue;
                }
                if let Some(unknown) = unknowns.unknowns().get(col) {
                    if !points.contains(&unknown.point) {
                        points.push(unknown.point.clone());
                    }
                }
            }
        }

        // Keep network order rather than singular vector order
        points.sort_by_key(|name| {
            unknowns
                .unknowns()
                .iter()
                .position(|u| &u.point == name)
                .unwrap_or(usize::MAX)
        });
        points
    }
}

/// vᵗPv for a diagonal P
pub fn weighted_square_sum(residuals: &DVector<f64>, weights: &DVector<f64>) -> f64 {
    residuals
        .iter()
        .zip(weights.iter())
        .map(|(v, w)| w * v * v)
        .sum()
}
