//! Error types and pre-solve network checks

pub mod error;
pub mod network;

pub use error::{AdjustmentError, DefectKind, ObservationDefect, SingularityReason};
pub use network::NetworkValidator;
