//! Immutable network snapshot and the global ordering of unknowns

use crate::core::observation::VectorObservation;
use crate::core::types::{Axis, Point};
use crate::validation::error::AdjustmentError;
use crate::validation::network::NetworkValidator;
use nalgebra::Vector3;
use std::collections::HashMap;

/// Validated set of points and the observations between them.
///
/// A `Network` is never modified by an adjustment; adjusted coordinates are
/// returned as a separate value. Build a fresh one per scenario instead of
/// cloning and mutating an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    points: Vec<Point>,
    observations: Vec<VectorObservation>,
    index: HashMap<String, usize>,
}

impl Network {
    /// Validate and snapshot the inputs.
    ///
    /// Fails with `DuplicatePoint`, `NonFiniteCoordinate`, `InvalidObservation` or `SingularNetwork`
    /// (free points unreachable from the datum).
    pub fn new(points: Vec<Point>, observations: Vec<VectorObservation>) -> Result<Self, AdjustmentError> {
        Self::with_validator(points, observations, &NetworkValidator::new())
    }

    pub fn with_validator(
        points: Vec<Point>,
        observations: Vec<VectorObservation>,
        validator: &NetworkValidator,
    ) -> Result<Self, AdjustmentError> {
        validator.validate(&points, &observations)?;

        let index = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        Ok(Self {
            points,
            observations,
            index,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn observations(&self) -> &[VectorObservation] {
        &self.observations
    }

    pub fn point(&self, name: &str) -> Option<&Point> {
        self.index.get(name).map(|&i| &self.points[i])
    }

    /// Position of the named point in `points()`
    pub fn point_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Approximate coordinates aligned with `points()`
    pub fn approximate_positions(&self) -> Vec<Vector3<f64>> {
        self.points.iter().map(Point::position).collect()
    }

    pub fn free_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.is_free())
    }

    /// Whether any spatial (zenith-bearing) observation touches the point
    pub fn has_height_information(&self, name: &str) -> bool {
        self.observations
            .iter()
            .any(|obs| !obs.is_horizontal() && obs.touches(name))
    }

    /// Number of scalar observation rows
    pub fn row_count(&self) -> usize {
        self.observations.iter().map(|obs| obs.components().len()).sum()
    }
}

/// One coordinate unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unknown {
    pub point: String,
    pub axis: Axis,
}

/// Ordered mapping from (point, axis) to a column of the design matrix.
///
/// Free points appear in network order with axes x, y and, when the point has
/// height information, z.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVector {
    unknowns: Vec<Unknown>,
    columns: HashMap<String, [Option<usize>; 3]>,
}

impl UnknownVector {
    pub fn from_network(network: &Network) -> Self {
        let mut unknowns = Vec::new();
        let mut columns = HashMap::new();

        for point in network.free_points() {
            let mut slots = [None; 3];
            let axes: &[Axis] = if network.has_height_information(&point.name) {
                &Axis::ALL
            } else {
                &Axis::ALL[..2]
            };
            for &axis in axes {
                slots[axis.index()] = Some(unknowns.len());
                unknowns.push(Unknown {
                    point: point.name.clone(),
                    axis,
                });
            }
            columns.insert(point.name.clone(), slots);
        }

        Self { unknowns, columns }
    }

    pub fn len(&self) -> usize {
        self.unknowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unknowns.is_empty()
    }

    pub fn unknowns(&self) -> &[Unknown] {
        &self.unknowns
    }

    pub fn column(&self, point: &str, axis: Axis) -> Option<usize> {
        self.columns.get(point).and_then(|slots| slots[axis.index()])
    }

    /// Column indices of a point as [x, y, z]; all `None` for fixed points
    pub fn columns_of(&self, point: &str) -> [Option<usize>; 3] {
        self.columns.get(point).copied().unwrap_or([None; 3])
    }

    /// Column label such as `P1_x`
    pub fn label(&self, column: usize) -> Option<String> {
        self.unknowns
            .get(column)
            .map(|u| format!("{}_{}", u.point, u.axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::Measured;

    fn sample_network() -> Network {
        let points = vec![
            Point::fixed("A", 0.0, 0.0, 0.0),
            Point::free("B", 100.0, 0.0, 5.0),
            Point::free("C", 0.0, 100.0, 0.0),
        ];
        let observations = vec![
            VectorObservation::spatial(
                "A",
                "B",
                Measured::new(100.1, 0.01),
                Measured::new(0.0, 1e-5),
                Measured::new(1.52, 1e-5),
            ),
            VectorObservation::horizontal("A", "C", Measured::new(100.0, 0.01), Measured::new(1.57, 1e-5)),
        ];
        Network::new(points, observations).unwrap()
    }

    #[test]
    fn test_unknown_ordering_follows_points() {
        let network = sample_network();
        let unknowns = UnknownVector::from_network(&network);
        assert_eq!(unknowns.len(), 5);
        let labels: Vec<_> = (0..unknowns.len()).map(|c| unknowns.label(c).unwrap()).collect();
        assert_eq!(labels, vec!["B_x", "B_y", "B_z", "C_x", "C_y"]);
    }

    #[test]
    fn test_horizontal_only_point_has_no_height_column() {
        let network = sample_network();
        let unknowns = UnknownVector::from_network(&network);
        assert_eq!(unknowns.column("C", Axis::Z), None);
        assert_eq!(unknowns.column("B", Axis::Z), Some(2));
        assert_eq!(unknowns.columns_of("A"), [None, None, None]);
    }

    #[test]
    fn test_row_count() {
        assert_eq!(sample_network().row_count(), 5);
    }
}
