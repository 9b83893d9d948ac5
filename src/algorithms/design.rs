//! Design matrix, discrepancy vector and weight matrix assembly

use crate::algorithms::geometry::{wrap_angle_difference, VectorGeometry};
use crate::core::network::{Network, UnknownVector};
use crate::core::observation::{ObservationKind, VectorObservation};
use crate::validation::error::AdjustmentError;
use nalgebra::{DMatrix, DVector, Vector3};

/// Identifies the observation and component behind one matrix row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationRow {
    /// Index into `Network::observations()`
    pub observation: usize,
    pub kind: ObservationKind,
}

/// Builds A and l over the global unknown ordering.
///
/// Rows follow the observation order; each observation emits distance,
/// azimuth and (spatial only) zenith rows.
pub struct DesignMatrixBuilder<'a> {
    network: &'a Network,
    unknowns: &'a UnknownVector,
}

impl<'a> DesignMatrixBuilder<'a> {
    pub fn new(network: &'a Network, unknowns: &'a UnknownVector) -> Self {
        Self { network, unknowns }
    }

    /// Row descriptors in matrix order
    pub fn rows(&self) -> Vec<ObservationRow> {
        self.network
            .observations()
            .iter()
            .enumerate()
            .flat_map(|(observation, obs)| {
                obs.components()
                    .into_iter()
                    .map(move |(kind, _)| ObservationRow { observation, kind })
            })
            .collect()
    }

    /// Design matrix with partials evaluated at the reduced observed vectors
    pub fn design_matrix(&self) -> Result<DMatrix<f64>, AdjustmentError> {
        let row_count = self.network.row_count();
        let mut a = DMatrix::zeros(row_count, self.unknowns.len());

        let mut row = 0;
        for obs in self.network.observations() {
            let geometry = VectorGeometry::from_components(obs.relative_vector())
                .map_err(|fault| AdjustmentError::degenerate(&obs.from, &obs.to, fault.describe()))?;
            let partials = geometry.partials();

            let from_cols = self.unknowns.columns_of(&obs.from);
            let to_cols = self.unknowns.columns_of(&obs.to);

            for (kind, _) in obs.components() {
                let coeff = partials.for_kind(kind);
                for axis in 0..3 {
                    if let Some(col) = from_cols[axis] {
                        a[(row, col)] += coeff[axis];
                    }
                    if let Some(col) = to_cols[axis] {
                        a[(row, col)] -= coeff[axis];
                    }
                }
                row += 1;
            }
        }

        Ok(a)
    }

    /// l = computed (from `positions`) − observed, one entry per row.
    ///
    /// `positions` is aligned with `Network::points()`.
    pub fn discrepancies(&self, positions: &[Vector3<f64>]) -> Result<DVector<f64>, AdjustmentError> {
        let mut l = DVector::zeros(self.network.row_count());

        let mut row = 0;
        for obs in self.network.observations() {
            let computed = self.computed_geometry(obs, positions)?;
            for (kind, measured) in obs.components() {
                let mut delta = computed.value(kind) - measured.value;
                if kind == ObservationKind::Azimuth {
                    delta = wrap_angle_difference(delta);
                }
                l[row] = delta;
                row += 1;
            }
        }

        Ok(l)
    }

    fn computed_geometry(
        &self,
        obs: &VectorObservation,
        positions: &[Vector3<f64>],
    ) -> Result<VectorGeometry, AdjustmentError> {
        let lookup = |name: &str| {
            self.network
                .point_index(name)
                .and_then(|i| positions.get(i))
                .copied()
                .ok_or_else(|| AdjustmentError::degenerate(&obs.from, &obs.to, format!("no position for {}", name)))
        };
        let p0 = lookup(&obs.from)?;
        let p1 = lookup(&obs.to)?;
        VectorGeometry::between(&p0, &p1)
            .map_err(|fault| AdjustmentError::degenerate(&obs.from, &obs.to, fault.describe()))
    }
}

/// Diagonal inverse-variance weights, uncorrelated between rows
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightMatrixBuilder;

impl WeightMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Row weights 1/σ² in design-matrix order
    pub fn weights(&self, network: &Network) -> DVector<f64> {
        let weights: Vec<f64> = network
            .observations()
            .iter()
            .flat_map(|obs| obs.components().into_iter().map(|(_, m)| m.weight()))
            .collect();
        DVector::from_vec(weights)
    }

    pub fn weight_matrix(&self, network: &Network) -> DMatrix<f64> {
        DMatrix::from_diagonal(&self.weights(network))
    }
}
