//! Core data types for the network adjustment

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a point in the adjustment datum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointRole {
    /// Known coordinates, never estimated
    #[serde(alias = "base")]
    Fixed,
    /// Coordinates are unknowns of the adjustment
    #[serde(alias = "rover")]
    Free,
}

/// Survey point with approximate coordinates (metres)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub role: PointRole,
}

impl Point {
    pub fn new(name: impl Into<String>, x: f64, y: f64, z: f64, role: PointRole) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z,
            role,
        }
    }

    pub fn fixed(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::new(name, x, y, z, PointRole::Fixed)
    }

    pub fn free(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::new(name, x, y, z, PointRole::Free)
    }

    pub fn is_fixed(&self) -> bool {
        self.role == PointRole::Fixed
    }

    pub fn is_free(&self) -> bool {
        self.role == PointRole::Free
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, x={:.3}, y={:.3}, z={:.3})",
            self.name, self.role, self.x, self.y, self.z
        )
    }
}

/// Coordinate axis of an unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `Vector3`
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(label)
    }
}
