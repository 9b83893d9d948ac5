//! Per-point position time series keyed by epoch

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Epoch in milliseconds since an arbitrary common origin
    pub epoch_ms: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Ordered position samples of one point.
///
/// Two series are aligned by exact epoch equality: only epochs present in
/// both series take part in a baseline reduction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: BTreeMap<u64, Vector3<f64>>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from samples; a repeated epoch keeps the last sample
    pub fn from_samples<I: IntoIterator<Item = Sample>>(samples: I) -> Self {
        let mut series = Self::new();
        for sample in samples {
            series.insert(sample.epoch_ms, Vector3::new(sample.x, sample.y, sample.z));
        }
        series
    }

    pub fn insert(&mut self, epoch_ms: u64, position: Vector3<f64>) -> Option<Vector3<f64>> {
        self.samples.insert(epoch_ms, position)
    }

    pub fn get(&self, epoch_ms: u64) -> Option<&Vector3<f64>> {
        self.samples.get(&epoch_ms)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn epochs(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.keys().copied()
    }

    /// Epochs present in both series, ascending
    pub fn common_epochs(&self, other: &TimeSeries) -> Vec<u64> {
        self.samples
            .keys()
            .filter(|epoch| other.samples.contains_key(epoch))
            .copied()
            .collect()
    }

    /// Displacements `other - self` at every common epoch, ascending by epoch
    pub fn differences_to(&self, other: &TimeSeries) -> Vec<Vector3<f64>> {
        self.samples
            .iter()
            .filter_map(|(epoch, p0)| other.samples.get(epoch).map(|p1| p1 - p0))
            .collect()
    }
}

impl FromIterator<Sample> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::from_samples(iter)
    }
}
