//! Raw time series and their reduction to vector observations

pub mod reducer;
pub mod series;

pub use reducer::{ObservationReducer, ReducedVector};
pub use series::{Sample, TimeSeries};
