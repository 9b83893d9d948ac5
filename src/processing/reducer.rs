use crate::algorithms::geometry::{GeometryFault, VectorGeometry};
use crate::core::constants::MIN_COMMON_EPOCHS;
use crate::core::observation::{Measured, VectorObservation};
use crate::processing::series::TimeSeries;
use crate::validation::error::AdjustmentError;
use nalgebra::Vector3;
use tracing::debug;

/// Mean relative displacement of a baseline and its empirical spread
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedVector {
    pub from: String,
    pub to: String,
    /// Number of common epochs used
    pub epochs: usize,
    /// Mean (dx, dy, dz)
    pub mean: Vector3<f64>,
    /// Sample standard deviation per axis (Bessel-corrected)
    pub std_dev: Vector3<f64>,
}

/// Reduces two raw time series into one vector observation
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationReducer;

impl ObservationReducer {
    pub fn new() -> Self {
        Self
    }

    /// Mean displacement and standard deviation over common epochs.
    ///
    /// Fails with `InsufficientEpochs` when fewer than two epochs are shared.
    pub fn reduce_vector(
        &self,
        from: &str,
        from_series: &TimeSeries,
        to: &str,
        to_series: &TimeSeries,
    ) -> Result<ReducedVector, AdjustmentError> {
        let diffs = from_series.differences_to(to_series);
        let n = diffs.len();
        if n < MIN_COMMON_EPOCHS {
            return Err(AdjustmentError::InsufficientEpochs {
                from: from.to_string(),
                to: to.to_string(),
                available: n,
                required: MIN_COMMON_EPOCHS,
            });
        }

        let mean = diffs.iter().fold(Vector3::zeros(), |acc, d| acc + d) / n as f64;
        let sum_sq = diffs
            .iter()
            .fold(Vector3::zeros(), |acc: Vector3<f64>, d| {
                let v = d - mean;
                acc + v.component_mul(&v)
            });
        let std_dev = (sum_sq / (n - 1) as f64).map(f64::sqrt);

        debug!(from, to, epochs = n, "reduced baseline");

        Ok(ReducedVector {
            from: from.to_string(),
            to: to.to_string(),
            epochs: n,
            mean,
            std_dev,
        })
    }

    /// Spatial observation (slant distance, azimuth, zenith) with propagated standard errors
    pub fn reduce(
        &self,
        from: &str,
        from_series: &TimeSeries,
        to: &str,
        to_series: &TimeSeries,
    ) -> Result<VectorObservation, AdjustmentError> {
        let reduced = self.reduce_vector(from, from_series, to, to_series)?;
        reduced.to_spatial_observation()
    }

    /// Horizontal observation (horizontal distance, azimuth) with propagated standard errors
    pub fn reduce_horizontal(
        &self,
        from: &str,
        from_series: &TimeSeries,
        to: &str,
        to_series: &TimeSeries,
    ) -> Result<VectorObservation, AdjustmentError> {
        let reduced = self.reduce_vector(from, from_series, to, to_series)?;
        reduced.to_horizontal_observation()
    }
}

impl ReducedVector {
    fn geometry(&self) -> Result<VectorGeometry, AdjustmentError> {
        VectorGeometry::from_components(self.mean)
            .map_err(|fault: GeometryFault| AdjustmentError::degenerate(&self.from, &self.to, fault.describe()))
    }

    pub fn to_spatial_observation(&self) -> Result<VectorObservation, AdjustmentError> {
        let g = self.geometry()?;
        let var = self.std_dev.component_mul(&self.std_dev);
        let (dx, dy, dz, s) = (g.dx, g.dy, g.dz, g.slant);
        let h2 = g.horizontal * g.horizontal;

        let var_s = (dx / s).powi(2) * var.x + (dy / s).powi(2) * var.y + (dz / s).powi(2) * var.z;
        let var_az = (dy / h2).powi(2) * var.x + (dx / h2).powi(2) * var.y;
        let root = (1.0 - (dz / s).powi(2)).sqrt();
        let var_zen = (1.0 / (s * root)).powi(2) * var.z + (dz / (s * s * root)).powi(2) * var_s;

        Ok(VectorObservation::spatial(
            self.from.clone(),
            self.to.clone(),
            Measured::new(s, var_s.sqrt()),
            Measured::new(g.azimuth, var_az.sqrt()),
            Measured::new(g.zenith, var_zen.sqrt()),
        ))
    }

    pub fn to_horizontal_observation(&self) -> Result<VectorObservation, AdjustmentError> {
        let g = self.geometry()?;
        let var = self.std_dev.component_mul(&self.std_dev);
        let h = g.horizontal;
        let h2 = h * h;

        let var_h = (g.dx / h).powi(2) * var.x + (g.dy / h).powi(2) * var.y;
        let var_az = (g.dy / h2).powi(2) * var.x + (g.dx / h2).powi(2) * var.y;

        Ok(VectorObservation::horizontal(
            self.from.clone(),
            self.to.clone(),
            Measured::new(h, var_h.sqrt()),
            Measured::new(g.azimuth, var_az.sqrt()),
        ))
    }
}
