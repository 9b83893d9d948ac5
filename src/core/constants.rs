//! Unit conversions and numerical thresholds

/// Arc-seconds in one radian
pub const ARCSECONDS_PER_RADIAN: f64 = 206_264.806_247_096_36;

/// Minimum number of common epochs for an empirical standard error
pub const MIN_COMMON_EPOCHS: usize = 2;

/// Horizontal separation (metres) below which azimuth and zenith partials are undefined
pub const MIN_HORIZONTAL_SEPARATION_M: f64 = 1e-9;

/// Converts an angle from arc-seconds to radians
pub fn arcsec_to_rad(arcsec: f64) -> f64 {
    arcsec / ARCSECONDS_PER_RADIAN
}

/// Converts an angle from radians to arc-seconds
pub fn rad_to_arcsec(rad: f64) -> f64 {
    rad * ARCSECONDS_PER_RADIAN
}
