//! Points, observations and the network snapshot

pub mod constants;
pub mod network;
pub mod observation;
pub mod types;

pub use constants::*;
pub use network::{Network, Unknown, UnknownVector};
pub use observation::{Measured, ObservationKind, VectorObservation};
pub use types::*;
