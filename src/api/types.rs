//! Input records of the JSON network file

use crate::core::constants::arcsec_to_rad;
use crate::core::network::Network;
use crate::core::observation::{Measured, VectorObservation};
use crate::core::types::Point;
use crate::processing::reducer::ObservationReducer;
use crate::processing::series::{Sample, TimeSeries};
use crate::validation::error::AdjustmentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Result type for input/output operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("parse error: {message}")]
    Parse { message: String },
    /// Zenith value and zenith standard error must be given together
    #[error("observation {from}-{to}: zenith value and standard error must both be present or both absent")]
    IncompleteZenith { from: String, to: String },
    #[error("no time series for point {point}")]
    MissingSeries { point: String },
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
}

/// One reduced observation as written in the network file.
/// Angles in degrees, angular standard errors in arc-seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    pub distance_sigma_m: f64,
    pub azimuth_deg: f64,
    pub azimuth_sigma_arcsec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zenith_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zenith_sigma_arcsec: Option<f64>,
}

impl ObservationRecord {
    pub fn to_observation(&self) -> ApiResult<VectorObservation> {
        let distance = Measured::new(self.distance_m, self.distance_sigma_m);
        let azimuth = Measured::new(self.azimuth_deg.to_radians(), arcsec_to_rad(self.azimuth_sigma_arcsec));

        match (self.zenith_deg, self.zenith_sigma_arcsec) {
            (Some(zenith), Some(sigma)) => Ok(VectorObservation::spatial(
                self.from.clone(),
                self.to.clone(),
                distance,
                azimuth,
                Measured::new(zenith.to_radians(), arcsec_to_rad(sigma)),
            )),
            (None, None) => Ok(VectorObservation::horizontal(
                self.from.clone(),
                self.to.clone(),
                distance,
                azimuth,
            )),
            _ => Err(ApiError::IncompleteZenith {
                from: self.from.clone(),
                to: self.to.clone(),
            }),
        }
    }
}

/// Baseline to be reduced from raw time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub horizontal_only: bool,
}

/// Whole network file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkFile {
    pub points: Vec<Point>,
    #[serde(default)]
    pub observations: Vec<ObservationRecord>,
    /// Raw samples per point name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub series: BTreeMap<String, Vec<Sample>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub baselines: Vec<BaselineRecord>,
}

impl NetworkFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ApiResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ApiError::Io {
            message: format!("Failed to read network file '{}': {}", path_str, e),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ApiResult<Self> {
        serde_json::from_str(content).map_err(|e| ApiError::Parse {
            message: e.to_string(),
        })
    }

    /// All observations: explicit records first, then reduced baselines
    pub fn vector_observations(&self) -> ApiResult<Vec<VectorObservation>> {
        let mut observations = self
            .observations
            .iter()
            .map(ObservationRecord::to_observation)
            .collect::<ApiResult<Vec<_>>>()?;

        let reducer = ObservationReducer::new();
        for baseline in &self.baselines {
            let from_series = self.time_series(&baseline.from)?;
            let to_series = self.time_series(&baseline.to)?;
            let obs = if baseline.horizontal_only {
                reducer.reduce_horizontal(&baseline.from, &from_series, &baseline.to, &to_series)?
            } else {
                reducer.reduce(&baseline.from, &from_series, &baseline.to, &to_series)?
            };
            observations.push(obs);
        }

        Ok(observations)
    }

    fn time_series(&self, point: &str) -> ApiResult<TimeSeries> {
        self.series
            .get(point)
            .map(|samples| samples.iter().copied().collect())
            .ok_or_else(|| ApiError::MissingSeries {
                point: point.to_string(),
            })
    }

    /// Validated network snapshot
    pub fn into_network(self) -> ApiResult<Network> {
        let observations = self.vector_observations()?;
        Ok(Network::new(self.points, observations)?)
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ApiError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PointRole;
    use approx::assert_relative_eq;

    const NETWORK_JSON: &str = r#"{
        "points": [
            { "name": "A", "x": 0.0, "y": 0.0, "z": 0.0, "role": "base" },
            { "name": "P", "x": 300.0, "y": 400.0, "z": 10.0, "role": "rover" }
        ],
        "observations": [
            { "from": "A", "to": "P", "distance_m": 500.1, "distance_sigma_m": 0.005,
              "azimuth_deg": 53.13, "azimuth_sigma_arcsec": 2.0,
              "zenith_deg": 88.85, "zenith_sigma_arcsec": 3.0 }
        ]
    }"#;

    #[test]
    fn test_parse_network_file_with_role_aliases() {
        let file = NetworkFile::from_json(NETWORK_JSON).unwrap();
        assert_eq!(file.points[0].role, PointRole::Fixed);
        assert_eq!(file.points[1].role, PointRole::Free);
        assert!(file.baselines.is_empty());
    }

    #[test]
    fn test_units_are_converted_to_radians() {
        let file = NetworkFile::from_json(NETWORK_JSON).unwrap();
        let obs = file.vector_observations().unwrap();
        assert_relative_eq!(obs[0].azimuth.value, 53.13_f64.to_radians());
        assert_relative_eq!(obs[0].azimuth.std_error, 2.0 / 206_264.806_247_096_36, max_relative = 1e-12);
        assert!(!obs[0].is_horizontal());
    }

    #[test]
    fn test_zenith_without_sigma_is_rejected() {
        let record = ObservationRecord {
            from: "A".into(),
            to: "P".into(),
            distance_m: 500.0,
            distance_sigma_m: 0.005,
            azimuth_deg: 53.0,
            azimuth_sigma_arcsec: 2.0,
            zenith_deg: Some(89.0),
            zenith_sigma_arcsec: None,
        };
        assert!(matches!(record.to_observation(), Err(ApiError::IncompleteZenith { .. })));
    }

    #[test]
    fn test_baselines_are_reduced_from_series() {
        let mut file = NetworkFile::from_json(NETWORK_JSON).unwrap();
        file.observations.clear();
        let samples = |x: f64, y: f64, z: f64, jitter: f64| {
            (0..4u64)
                .map(|i| Sample {
                    epoch_ms: i * 1000,
                    x: x + jitter * (i as f64 - 1.5),
                    y,
                    z,
                })
                .collect::<Vec<_>>()
        };
        file.series.insert("A".into(), samples(0.0, 0.0, 0.0, 0.0));
        file.series.insert("P".into(), samples(300.0, 400.0, 10.0, 0.002));
        file.baselines.push(BaselineRecord {
            from: "A".into(),
            to: "P".into(),
            horizontal_only: true,
        });

        let obs = file.vector_observations().unwrap();
        assert_eq!(obs.len(), 1);
        assert!(obs[0].is_horizontal());
        assert_relative_eq!(obs[0].distance.value, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_series_is_reported() {
        let mut file = NetworkFile::from_json(NETWORK_JSON).unwrap();
        file.baselines.push(BaselineRecord {
            from: "A".into(),
            to: "P".into(),
            horizontal_only: false,
        });
        assert_eq!(
            file.vector_observations().unwrap_err(),
            ApiError::MissingSeries { point: "A".into() }
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
