use crate::core::constants::MIN_HORIZONTAL_SEPARATION_M;
use crate::core::observation::ObservationKind;
use nalgebra::Vector3;
use std::f64::consts::{PI, TAU};

/// Observable quantities of one relative vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorGeometry {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    /// Slant distance
    pub slant: f64,
    /// Horizontal distance
    pub horizontal: f64,
    /// Azimuth in [0, 2π)
    pub azimuth: f64,
    /// Zenith angle in [0, π]
    pub zenith: f64,
}

/// Failure of a geometric evaluation; callers attach the point names
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryFault {
    CoincidentPoints,
    ZeroHorizontalSeparation,
}

impl GeometryFault {
    pub fn describe(self) -> &'static str {
        match self {
            GeometryFault::CoincidentPoints => "points coincide",
            GeometryFault::ZeroHorizontalSeparation => "zero horizontal separation",
        }
    }
}

/// Partial derivatives of each observable with respect to point 0.
/// The derivatives with respect to point 1 are the negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partials {
    pub slant: [f64; 3],
    pub horizontal: [f64; 2],
    pub azimuth: [f64; 2],
    pub zenith: [f64; 3],
}

impl Partials {
    /// Row coefficients for (x, y, z) of point 0; z is 0 where the observable ignores height
    pub fn for_kind(&self, kind: ObservationKind) -> [f64; 3] {
        match kind {
            ObservationKind::SlantDistance => self.slant,
            ObservationKind::HorizontalDistance => [self.horizontal[0], self.horizontal[1], 0.0],
            ObservationKind::Azimuth => [self.azimuth[0], self.azimuth[1], 0.0],
            ObservationKind::Zenith => self.zenith,
        }
    }
}

/// Normalize an angle into [0, 2π)
pub fn normalize_azimuth(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angular difference into [-π, π)
pub fn wrap_angle_difference(delta: f64) -> f64 {
    (delta + PI).rem_euclid(TAU) - PI
}

impl VectorGeometry {
    /// Geometry of the vector from `p0` to `p1`
    pub fn between(p0: &Vector3<f64>, p1: &Vector3<f64>) -> Result<Self, GeometryFault> {
        Self::from_components(p1 - p0)
    }

    pub fn from_components(delta: Vector3<f64>) -> Result<Self, GeometryFault> {
        let (dx, dy, dz) = (delta.x, delta.y, delta.z);
        let slant = delta.norm();
        if slant < MIN_HORIZONTAL_SEPARATION_M {
            return Err(GeometryFault::CoincidentPoints);
        }
        let horizontal = dx.hypot(dy);
        if horizontal < MIN_HORIZONTAL_SEPARATION_M {
            return Err(GeometryFault::ZeroHorizontalSeparation);
        }

        let azimuth = normalize_azimuth(dy.atan2(dx));
        // Clamp guards acos against rounding just outside [-1, 1]
        let zenith = (dz / slant).clamp(-1.0, 1.0).acos();

        Ok(Self {
            dx,
            dy,
            dz,
            slant,
            horizontal,
            azimuth,
            zenith,
        })
    }

    /// Observable value of the given kind
    pub fn value(&self, kind: ObservationKind) -> f64 {
        match kind {
            ObservationKind::SlantDistance => self.slant,
            ObservationKind::HorizontalDistance => self.horizontal,
            ObservationKind::Azimuth => self.azimuth,
            ObservationKind::Zenith => self.zenith,
        }
    }

    pub fn partials(&self) -> Partials {
        let (dx, dy, dz) = (self.dx, self.dy, self.dz);
        let s = self.slant;
        let h = self.horizontal;
        let h2 = h * h;
        let s2 = dz * dz + h2;
        let (sin_az, cos_az) = self.azimuth.sin_cos();

        Partials {
            slant: [-dx / s, -dy / s, -dz / s],
            horizontal: [-dx / h, -dy / h],
            azimuth: [dy / h2, -dx / h2],
            zenith: [-dz * cos_az / s2, -dz * sin_az / s2, h / s2],
        }
    }
}
