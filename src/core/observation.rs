//! Reduced baseline observations between two points

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed scalar with its standard error, in base units (metres or radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    pub value: f64,
    pub std_error: f64,
}

impl Measured {
    pub fn new(value: f64, std_error: f64) -> Self {
        Self { value, std_error }
    }

    /// Inverse-variance weight
    pub fn weight(&self) -> f64 {
        1.0 / (self.std_error * self.std_error)
    }
}

/// Scalar component carried by one row of the design matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    SlantDistance,
    HorizontalDistance,
    Azimuth,
    Zenith,
}

impl ObservationKind {
    pub fn is_angular(self) -> bool {
        matches!(self, ObservationKind::Azimuth | ObservationKind::Zenith)
    }
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ObservationKind::SlantDistance => "slant_distance",
            ObservationKind::HorizontalDistance => "horizontal_distance",
            ObservationKind::Azimuth => "azimuth",
            ObservationKind::Zenith => "zenith",
        };
        f.write_str(label)
    }
}

/// Relative vector observation from `from` (point 0) to `to` (point 1).
///
/// A spatial observation carries slant distance, azimuth and zenith angle.
/// A horizontal observation omits the zenith; its distance is the horizontal
/// distance and it carries no information about heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    pub from: String,
    pub to: String,
    pub distance: Measured,
    pub azimuth: Measured,
    pub zenith: Option<Measured>,
}

impl VectorObservation {
    pub fn spatial(
        from: impl Into<String>,
        to: impl Into<String>,
        distance: Measured,
        azimuth: Measured,
        zenith: Measured,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            azimuth,
            zenith: Some(zenith),
        }
    }

    pub fn horizontal(
        from: impl Into<String>,
        to: impl Into<String>,
        distance: Measured,
        azimuth: Measured,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            azimuth,
            zenith: None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.zenith.is_none()
    }

    pub fn distance_kind(&self) -> ObservationKind {
        if self.is_horizontal() {
            ObservationKind::HorizontalDistance
        } else {
            ObservationKind::SlantDistance
        }
    }

    /// Observed components in design-matrix row order
    pub fn components(&self) -> Vec<(ObservationKind, Measured)> {
        let mut rows = vec![
            (self.distance_kind(), self.distance),
            (ObservationKind::Azimuth, self.azimuth),
        ];
        if let Some(zenith) = self.zenith {
            rows.push((ObservationKind::Zenith, zenith));
        }
        rows
    }

    /// Relative vector (dx, dy, dz) implied by the observed values.
    /// Horizontal observations yield dz = 0.
    pub fn relative_vector(&self) -> Vector3<f64> {
        let (sin_az, cos_az) = self.azimuth.value.sin_cos();
        match self.zenith {
            Some(zenith) => {
                let (sin_z, cos_z) = zenith.value.sin_cos();
                let s = self.distance.value;
                Vector3::new(s * sin_z * cos_az, s * sin_z * sin_az, s * cos_z)
            }
            None => {
                let h = self.distance.value;
                Vector3::new(h * cos_az, h * sin_az, 0.0)
            }
        }
    }

    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }
}

impl fmt::Display for VectorObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
