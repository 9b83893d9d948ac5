//! Covariance of the unknowns and per-point error ellipses

use crate::core::network::{Network, UnknownVector};
use crate::core::types::Axis;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Horizontal error ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorEllipse {
    /// Orientation in degrees, [0, 360)
    pub theta_deg: f64,
    /// Semi-major axis (m)
    pub a: f64,
    /// Semi-minor axis (m)
    pub b: f64,
}

impl ErrorEllipse {
    /// Ellipse of a 2×2 covariance block
    pub fn from_block(qxx: f64, qyy: f64, qxy: f64) -> Self {
        let theta = (2.0 * qxy).atan2(qxx - qyy) / 2.0;
        let mut theta_deg = theta.to_degrees().rem_euclid(360.0);
        if theta_deg >= 360.0 {
            theta_deg = 0.0;
        }

        let trace = qxx + qyy;
        let q = ((qxx - qyy).powi(2) + 4.0 * qxy * qxy).sqrt();
        let a = ((trace + q) / 2.0).max(0.0).sqrt();
        let b = ((trace - q) / 2.0).max(0.0).sqrt();

        Self { theta_deg, a, b }
    }
}

/// Precision summary of one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPrecision {
    pub point: String,
    /// Horizontal position error √(Qxx+Qyy)
    pub m_position: f64,
    pub m_x: f64,
    pub m_y: f64,
    /// Height error; `None` when the point has no z unknown
    pub m_z: Option<f64>,
    pub ellipse: ErrorEllipse,
}

impl PointPrecision {
    /// Fixed points are constants and report zero precision
    pub fn fixed(point: impl Into<String>) -> Self {
        Self {
            point: point.into(),
            m_position: 0.0,
            m_x: 0.0,
            m_y: 0.0,
            m_z: Some(0.0),
            ellipse: ErrorEllipse {
                theta_deg: 0.0,
                a: 0.0,
                b: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionEstimator;

impl PrecisionEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Qx = factor · N⁻¹, symmetrised
    pub fn covariance(&self, cofactor: &DMatrix<f64>, factor: f64) -> DMatrix<f64> {
        let scaled = cofactor * factor;
        (&scaled + scaled.transpose()) * 0.5
    }

    /// Precision of every network point, in network order
    pub fn estimate(&self, network: &Network, unknowns: &UnknownVector, qx: &DMatrix<f64>) -> Vec<PointPrecision> {
        network
            .points()
            .iter()
            .map(|point| {
                if point.is_fixed() {
                    PointPrecision::fixed(point.name.clone())
                } else {
                    self.point_precision(&point.name, unknowns, qx)
                }
            })
            .collect()
    }

    pub fn point_precision(&self, name: &str, unknowns: &UnknownVector, qx: &DMatrix<f64>) -> PointPrecision {
        let entry = |r: Option<usize>, c: Option<usize>| match (r, c) {
            (Some(r), Some(c)) => qx[(r, c)],
            _ => 0.0,
        };
        let x = unknowns.column(name, Axis::X);
        let y = unknowns.column(name, Axis::Y);
        let z = unknowns.column(name, Axis::Z);

        let qxx = entry(x, x);
        let qyy = entry(y, y);
        let qxy = entry(x, y);

        PointPrecision {
            point: name.to_string(),
            m_position: (qxx + qyy).max(0.0).sqrt(),
            m_x: qxx.max(0.0).sqrt(),
            m_y: qyy.max(0.0).sqrt(),
            m_z: z.map(|col| qx[(col, col)].max(0.0).sqrt()),
            ellipse: ErrorEllipse::from_block(qxx, qyy, qxy),
        }
    }
}
