use crate::core::types::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failures surfaced by the adjustment engine.
///
/// Every variant is detected before or during matrix assembly and solve.
/// None of them is retried or recovered inside the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdjustmentError {
    /// Zero horizontal (or spatial) separation between two points
    #[error("degenerate geometry between {from} and {to}: {detail}")]
    GeometryDegenerate {
        from: String,
        to: String,
        detail: String,
    },

    /// Fewer than two epochs shared by both time series of a baseline
    #[error("insufficient common epochs between {from} and {to}: {available} available, {required} required")]
    InsufficientEpochs {
        from: String,
        to: String,
        available: usize,
        required: usize,
    },

    /// Normal matrix is not invertible
    #[error("singular network ({reason}); unconstrained points: {}", format_names(.unconstrained_points))]
    SingularNetwork {
        reason: SingularityReason,
        unconstrained_points: Vec<String>,
    },

    /// One or more observations cannot enter the adjustment
    #[error("{} invalid observation(s): {}", .defects.len(), format_defects(.defects))]
    InvalidObservation { defects: Vec<ObservationDefect> },

    /// Two points share the same name
    #[error("duplicate point name: {name}")]
    DuplicatePoint { name: String },

    /// A fixed or approximate coordinate is NaN or infinite
    #[error("non-finite {axis} coordinate for point {name}")]
    NonFiniteCoordinate { name: String, axis: Axis },

    /// Iterative re-linearisation did not settle
    #[error("adjustment did not converge after {iterations} iterations (last correction {last_correction_m:.3e} m)")]
    NotConverged {
        iterations: usize,
        last_correction_m: f64,
    },
}

impl AdjustmentError {
    pub fn degenerate(from: &str, to: &str, detail: impl Into<String>) -> Self {
        AdjustmentError::GeometryDegenerate {
            from: from.to_string(),
            to: to.to_string(),
            detail: detail.into(),
        }
    }

    /// Short variant name for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            AdjustmentError::GeometryDegenerate { .. } => "GeometryDegenerate",
            AdjustmentError::InsufficientEpochs { .. } => "InsufficientEpochs",
            AdjustmentError::SingularNetwork { .. } => "SingularNetwork",
            AdjustmentError::InvalidObservation { .. } => "InvalidObservation",
            AdjustmentError::DuplicatePoint { .. } => "DuplicatePoint",
            AdjustmentError::NonFiniteCoordinate { .. } => "NonFiniteCoordinate",
            AdjustmentError::NotConverged { .. } => "NotConverged",
        }
    }
}

/// Why the normal matrix was found singular
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingularityReason {
    /// Free points not reachable from any fixed point
    Disconnected,
    /// Connected, but too few independent observations
    RankDeficient,
}

impl fmt::Display for SingularityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingularityReason::Disconnected => f.write_str("free points disconnected from the datum"),
            SingularityReason::RankDeficient => f.write_str("rank-deficient normal matrix"),
        }
    }
}

/// A single rejected observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationDefect {
    /// Position of the observation in the input list
    pub index: usize,
    pub from: String,
    pub to: String,
    pub problem: DefectKind,
}

/// Reason an observation was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefectKind {
    BothEndpointsFixed,
    UnknownPoint { name: String },
    IdenticalEndpoints,
    NonFiniteValue { component: String },
    InvalidStdError { component: String, value: f64 },
}

impl fmt::Display for ObservationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}-{}: ", self.index, self.from, self.to)?;
        match &self.problem {
            DefectKind::BothEndpointsFixed => f.write_str("both endpoints are fixed"),
            DefectKind::UnknownPoint { name } => write!(f, "unknown point {}", name),
            DefectKind::IdenticalEndpoints => f.write_str("endpoints are the same point"),
            DefectKind::NonFiniteValue { component } => write!(f, "non-finite {}", component),
            DefectKind::InvalidStdError { component, value } => {
                write!(f, "invalid standard error {} for {}", value, component)
            }
        }
    }
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "undetermined".to_string()
    } else {
        names.join(", ")
    }
}

fn format_defects(defects: &[ObservationDefect]) -> String {
    defects
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
