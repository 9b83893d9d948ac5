use crate::core::observation::VectorObservation;
use crate::core::types::{Axis, Point};
use crate::validation::error::{AdjustmentError, DefectKind, ObservationDefect, SingularityReason};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Structural checks run before any matrix is assembled
#[derive(Debug, Clone, Default)]
pub struct NetworkValidator {
    /// Skip the datum connectivity check (rank is still checked at solve time)
    pub skip_connectivity: bool,
}

impl NetworkValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every check in order: unique names, finite coordinates, observation defects, connectivity
    pub fn validate(&self, points: &[Point], observations: &[VectorObservation]) -> Result<(), AdjustmentError> {
        let roles = self.check_unique_names(points)?;
        self.check_finite_coordinates(points)?;

        let defects = self.observation_defects(&roles, observations);
        if !defects.is_empty() {
            debug!(count = defects.len(), "rejecting network with invalid observations");
            return Err(AdjustmentError::InvalidObservation { defects });
        }

        if !self.skip_connectivity {
            let unreachable = self.unreachable_free_points(points, observations);
            if !unreachable.is_empty() {
                return Err(AdjustmentError::SingularNetwork {
                    reason: SingularityReason::Disconnected,
                    unconstrained_points: unreachable,
                });
            }
        }

        Ok(())
    }

    fn check_unique_names<'a>(&self, points: &'a [Point]) -> Result<HashMap<&'a str, &'a Point>, AdjustmentError> {
        let mut by_name = HashMap::with_capacity(points.len());
        for point in points {
            if by_name.insert(point.name.as_str(), point).is_some() {
                return Err(AdjustmentError::DuplicatePoint {
                    name: point.name.clone(),
                });
            }
        }
        Ok(by_name)
    }

    fn check_finite_coordinates(&self, points: &[Point]) -> Result<(), AdjustmentError> {
        for point in points {
            let position = point.position();
            if let Some(axis) = Axis::ALL.into_iter().find(|axis| !position[axis.index()].is_finite()) {
                return Err(AdjustmentError::NonFiniteCoordinate {
                    name: point.name.clone(),
                    axis,
                });
            }
        }
        Ok(())
    }

    /// Collect every defect instead of stopping at the first one
    pub fn observation_defects(
        &self,
        points: &HashMap<&str, &Point>,
        observations: &[VectorObservation],
    ) -> Vec<ObservationDefect> {
        let mut defects = Vec::new();

        for (index, obs) in observations.iter().enumerate() {
            let mut push = |problem: DefectKind| {
                defects.push(ObservationDefect {
                    index,
                    from: obs.from.clone(),
                    to: obs.to.clone(),
                    problem,
                })
            };

            let from = points.get(obs.from.as_str());
            let to = points.get(obs.to.as_str());
            if from.is_none() {
                push(DefectKind::UnknownPoint { name: obs.from.clone() });
            }
            if to.is_none() && obs.to != obs.from {
                push(DefectKind::UnknownPoint { name: obs.to.clone() });
            }
            if obs.from == obs.to {
                push(DefectKind::IdenticalEndpoints);
            }
            if let (Some(p0), Some(p1)) = (from, to) {
                if p0.is_fixed() && p1.is_fixed() {
                    push(DefectKind::BothEndpointsFixed);
                }
            }

            for (kind, measured) in obs.components() {
                if !measured.value.is_finite() {
                    push(DefectKind::NonFiniteValue {
                        component: kind.to_string(),
                    });
                }
                if !(measured.std_error.is_finite() && measured.std_error > 0.0) {
                    push(DefectKind::InvalidStdError {
                        component: kind.to_string(),
                        value: measured.std_error,
                    });
                }
            }
        }

        defects
    }

    /// Free points with no observation path to a fixed point, in input order
    pub fn unreachable_free_points(&self, points: &[Point], observations: &[VectorObservation]) -> Vec<String> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for obs in observations {
            adjacency.entry(obs.from.as_str()).or_default().push(obs.to.as_str());
            adjacency.entry(obs.to.as_str()).or_default().push(obs.from.as_str());
        }

        let mut reached: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        for point in points.iter().filter(|p| p.is_fixed()) {
            reached.insert(point.name.as_str());
            queue.push_back(point.name.as_str());
        }

        while let Some(name) = queue.pop_front() {
            for &next in adjacency.get(name).map(Vec::as_slice).unwrap_or(&[]) {
                if reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        points
            .iter()
            .filter(|p| p.is_free() && !reached.contains(p.name.as_str()))
            .map(|p| p.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::Measured;

    fn obs(from: &str, to: &str) -> VectorObservation {
        VectorObservation::spatial(
            from,
            to,
            Measured::new(100.0, 0.01),
            Measured::new(0.3, 1e-5),
            Measured::new(1.5, 1e-5),
        )
    }

    fn points() -> Vec<Point> {
        vec![
            Point::fixed("A", 0.0, 0.0, 0.0),
            Point::fixed("B", 500.0, 0.0, 0.0),
            Point::free("P", 200.0, 300.0, 10.0),
            Point::free("Q", 400.0, 400.0, 12.0),
        ]
    }

    #[test]
    fn test_valid_network_passes() {
        let validator = NetworkValidator::new();
        let observations = vec![obs("A", "P"), obs("B", "P"), obs("P", "Q"), obs("B", "Q")];
        assert!(validator.validate(&points(), &observations).is_ok());
    }

    #[test]
    fn test_every_fixed_pair_is_reported() {
        let validator = NetworkValidator::new();
        let observations = vec![obs("A", "B"), obs("A", "P"), obs("B", "A")];
        match validator.validate(&points(), &observations) {
            Err(AdjustmentError::InvalidObservation { defects }) => {
                let fixed: Vec<_> = defects
                    .iter()
                    .filter(|d| d.problem == DefectKind::BothEndpointsFixed)
                    .map(|d| d.index)
                    .collect();
                assert_eq!(fixed, vec![0, 2]);
            }
            other => panic!("expected InvalidObservation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_point_name() {
        let validator = NetworkValidator::new();
        let observations = vec![obs("A", "Z")];
        let err = validator.validate(&points(), &observations).unwrap_err();
        match err {
            AdjustmentError::InvalidObservation { defects } => {
                assert_eq!(defects[0].problem, DefectKind::UnknownPoint { name: "Z".into() });
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zero_std_error_is_rejected_not_defaulted() {
        let validator = NetworkValidator::new();
        let mut bad = obs("A", "P");
        bad.azimuth.std_error = 0.0;
        let err = validator.validate(&points(), &[bad, obs("B", "Q")]).unwrap_err();
        assert_eq!(err.kind(), "InvalidObservation");
    }

    #[test]
    fn test_duplicate_point() {
        let validator = NetworkValidator::new();
        let mut pts = points();
        pts.push(Point::free("P", 1.0, 2.0, 3.0));
        let err = validator.validate(&pts, &[]).unwrap_err();
        assert_eq!(err, AdjustmentError::DuplicatePoint { name: "P".into() });
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let validator = NetworkValidator::new();
        let observations = vec![obs("A", "P"), obs("B", "P"), obs("P", "Q"), obs("B", "Q")];

        let mut pts = points();
        pts[2].x = f64::NAN;
        assert_eq!(
            validator.validate(&pts, &observations).unwrap_err(),
            AdjustmentError::NonFiniteCoordinate {
                name: "P".into(),
                axis: Axis::X,
            }
        );

        let mut pts = points();
        pts[1].z = f64::INFINITY;
        let err = validator.validate(&pts, &observations).unwrap_err();
        assert_eq!(err.kind(), "NonFiniteCoordinate");
    }

    #[test]
    fn test_isolated_free_point_is_singular() {
        let validator = NetworkValidator::new();
        let observations = vec![obs("A", "P"), obs("B", "P")];
        let err = validator.validate(&points(), &observations).unwrap_err();
        assert_eq!(
            err,
            AdjustmentError::SingularNetwork {
                reason: SingularityReason::Disconnected,
                unconstrained_points: vec!["Q".into()],
            }
        );
    }

    #[test]
    fn test_free_island_without_datum_is_singular() {
        let validator = NetworkValidator::new();
        let pts = vec![
            Point::fixed("A", 0.0, 0.0, 0.0),
            Point::free("P", 200.0, 300.0, 10.0),
            Point::free("Q", 400.0, 400.0, 12.0),
            Point::free("R", 600.0, 100.0, 12.0),
        ];
        let observations = vec![obs("A", "P"), obs("Q", "R")];
        let unreachable = validator.unreachable_free_points(&pts, &observations);
        assert_eq!(unreachable, vec!["Q".to_string(), "R".to_string()]);
    }
}
