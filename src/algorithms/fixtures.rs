//! Synthetic networks with observations computed from known true coordinates

use crate::algorithms::geometry::VectorGeometry;
use crate::core::network::Network;
use crate::core::observation::{Measured, VectorObservation};
use crate::core::types::Point;
use nalgebra::Vector3;

pub const TRUE_A: [f64; 3] = [0.0, 0.0, 0.0];
pub const TRUE_B: [f64; 3] = [2000.0, 150.0, 20.0];
pub const TRUE_C: [f64; 3] = [600.0, 1800.0, -10.0];
pub const TRUE_P: [f64; 3] = [1250.0, 830.0, 45.0];
pub const TRUE_Q: [f64; 3] = [1900.0, 1500.0, 60.0];
pub const TRUE_H: [f64; 3] = [400.0, 1100.0, 12.0];

pub const DISTANCE_SIGMA_M: f64 = 0.004;
pub const AZIMUTH_SIGMA_RAD: f64 = 1.5e-6;
pub const ZENITH_SIGMA_RAD: f64 = 2.5e-6;

fn v(p: &[f64; 3]) -> Vector3<f64> {
    Vector3::new(p[0], p[1], p[2])
}

/// 3-D observation computed from two true positions.
/// `noise` is added to (distance, azimuth, zenith) in units of their sigma.
pub fn spatial_with_noise(
    from: (&str, &[f64; 3]),
    to: (&str, &[f64; 3]),
    sigma_scale: f64,
    noise: [f64; 3],
) -> VectorObservation {
    let g = VectorGeometry::between(&v(from.1), &v(to.1)).unwrap();
    let (sd, sa, sz) = (
        DISTANCE_SIGMA_M * sigma_scale,
        AZIMUTH_SIGMA_RAD * sigma_scale,
        ZENITH_SIGMA_RAD * sigma_scale,
    );
    VectorObservation::spatial(
        from.0,
        to.0,
        Measured::new(g.slant + noise[0] * sd, sd),
        Measured::new(g.azimuth + noise[1] * sa, sa),
        Measured::new(g.zenith + noise[2] * sz, sz),
    )
}

pub fn spatial(from: (&str, &[f64; 3]), to: (&str, &[f64; 3]), sigma_scale: f64) -> VectorObservation {
    spatial_with_noise(from, to, sigma_scale, [0.0; 3])
}

pub fn horizontal(from: (&str, &[f64; 3]), to: (&str, &[f64; 3]), sigma_scale: f64) -> VectorObservation {
    let g = VectorGeometry::between(&v(from.1), &v(to.1)).unwrap();
    VectorObservation::horizontal(
        from.0,
        to.0,
        Measured::new(g.horizontal, DISTANCE_SIGMA_M * sigma_scale),
        Measured::new(g.azimuth, AZIMUTH_SIGMA_RAD * sigma_scale),
    )
}

/// Fixed points A and B, free point `P` at `approx`, observations A→P, B→P, P→A
pub fn single_free_point_network(approx: &[f64; 3], sigma_scale: f64) -> Network {
    noisy_single_free_point_network(approx, sigma_scale, [[0.0; 3]; 3])
}

pub fn noisy_single_free_point_network(approx: &[f64; 3], sigma_scale: f64, noise: [[f64; 3]; 3]) -> Network {
    let points = vec![
        Point::fixed("A", TRUE_A[0], TRUE_A[1], TRUE_A[2]),
        Point::fixed("B", TRUE_B[0], TRUE_B[1], TRUE_B[2]),
        Point::free("P", approx[0], approx[1], approx[2]),
    ];
    let observations = vec![
        spatial_with_noise(("A", &TRUE_A), ("P", &TRUE_P), sigma_scale, noise[0]),
        spatial_with_noise(("B", &TRUE_B), ("P", &TRUE_P), sigma_scale, noise[1]),
        spatial_with_noise(("P", &TRUE_P), ("A", &TRUE_A), sigma_scale, noise[2]),
    ];
    Network::new(points, observations).unwrap()
}

/// Two fixed points, free points `P` and `Q` at their true positions
pub fn two_free_point_network(sigma_scale: f64) -> Network {
    noisy_two_free_point_network(&TRUE_P, &TRUE_Q, sigma_scale, [[0.0; 3]; 5])
}

/// Observations A→P, B→P, A→Q, B→Q, P→Q, each with its own noise triple
pub fn noisy_two_free_point_network(
    approx_p: &[f64; 3],
    approx_q: &[f64; 3],
    sigma_scale: f64,
    noise: [[f64; 3]; 5],
) -> Network {
    let points = vec![
        Point::fixed("A", TRUE_A[0], TRUE_A[1], TRUE_A[2]),
        Point::fixed("B", TRUE_B[0], TRUE_B[1], TRUE_B[2]),
        Point::free("P", approx_p[0], approx_p[1], approx_p[2]),
        Point::free("Q", approx_q[0], approx_q[1], approx_q[2]),
    ];
    let observations = vec![
        spatial_with_noise(("A", &TRUE_A), ("P", &TRUE_P), sigma_scale, noise[0]),
        spatial_with_noise(("B", &TRUE_B), ("P", &TRUE_P), sigma_scale, noise[1]),
        spatial_with_noise(("A", &TRUE_A), ("Q", &TRUE_Q), sigma_scale, noise[2]),
        spatial_with_noise(("B", &TRUE_B), ("Q", &TRUE_Q), sigma_scale, noise[3]),
        spatial_with_noise(("P", &TRUE_P), ("Q", &TRUE_Q), sigma_scale, noise[4]),
    ];
    Network::new(points, observations).unwrap()
}

/// `P` observed in 3-D, `H` observed only horizontally
pub fn mixed_dimension_network() -> Network {
    let points = vec![
        Point::fixed("A", TRUE_A[0], TRUE_A[1], TRUE_A[2]),
        Point::fixed("B", TRUE_B[0], TRUE_B[1], TRUE_B[2]),
        Point::fixed("C", TRUE_C[0], TRUE_C[1], TRUE_C[2]),
        Point::free("P", TRUE_P[0], TRUE_P[1], TRUE_P[2]),
        Point::free("H", TRUE_H[0], TRUE_H[1], TRUE_H[2]),
    ];
    let observations = vec![
        spatial(("A", &TRUE_A), ("P", &TRUE_P), 1.0),
        spatial(("B", &TRUE_B), ("P", &TRUE_P), 1.0),
        horizontal(("A", &TRUE_A), ("H", &TRUE_H), 1.0),
        horizontal(("C", &TRUE_C), ("H", &TRUE_H), 1.0),
        horizontal(("P", &TRUE_P), ("H", &TRUE_H), 1.0),
    ];
    Network::new(points, observations).unwrap()
}
