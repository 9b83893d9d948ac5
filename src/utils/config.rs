use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// How the covariance of the unknowns is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceScaling {
    /// Qx = mu · N⁻¹ with mu estimated from the residuals
    APosteriori,
    /// Qx = σ0² · N⁻¹ with the configured a-priori unit variance
    APriori,
}

/// Adjustment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    /// Maximum number of re-linearisation passes (1 = single Gauss-Markov step)
    pub max_iterations: usize,
    /// Largest absolute coordinate correction (metres) that counts as converged
    pub convergence_tolerance_m: f64,
    /// Relative singular value below which the normal matrix is rank deficient
    pub singularity_tolerance: f64,
    /// A-priori variance of unit weight
    pub a_priori_variance: f64,
    /// Scaling of the covariance matrix
    pub covariance_scaling: CovarianceScaling,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("I/O error: {message}")]
    IoError { message: String },
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            convergence_tolerance_m: 1e-8,
            singularity_tolerance: 1e-12,
            a_priori_variance: 1.0,
            covariance_scaling: CovarianceScaling::APosteriori,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl AdjustmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: AdjustmentConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Check every parameter range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 || self.max_iterations > 100 {
            return Err(invalid(
                "max_iterations",
                self.max_iterations,
                "must be between 1 and 100",
            ));
        }
        if !(self.convergence_tolerance_m.is_finite() && self.convergence_tolerance_m > 0.0) {
            return Err(invalid(
                "convergence_tolerance_m",
                self.convergence_tolerance_m,
                "must be a positive number",
            ));
        }
        if !(self.singularity_tolerance > 0.0 && self.singularity_tolerance <= 1e-3) {
            return Err(invalid(
                "singularity_tolerance",
                self.singularity_tolerance,
                "must be in (0, 1e-3]",
            ));
        }
        if !(self.a_priori_variance.is_finite() && self.a_priori_variance > 0.0) {
            return Err(invalid(
                "a_priori_variance",
                self.a_priori_variance,
                "must be a positive number",
            ));
        }
        Ok(())
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Result<Self, ConfigError> {
        self.max_iterations = max_iterations;
        self.validate()?;
        Ok(self)
    }

    pub fn with_convergence_tolerance(mut self, tolerance_m: f64) -> Result<Self, ConfigError> {
        self.convergence_tolerance_m = tolerance_m;
        self.validate()?;
        Ok(self)
    }

    pub fn with_singularity_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        self.singularity_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn with_a_priori_variance(mut self, variance: f64) -> Result<Self, ConfigError> {
        self.a_priori_variance = variance;
        self.validate()?;
        Ok(self)
    }

    pub fn with_covariance_scaling(mut self, scaling: CovarianceScaling) -> Self {
        self.covariance_scaling = scaling;
        self
    }

    /// Single linearisation without iteration
    pub fn single_step() -> Self {
        Self {
            max_iterations: 1,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        let config = AdjustmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.covariance_scaling, CovarianceScaling::APosteriori);
    }

    #[test]
    fn test_invalid_iterations_rejected() {
        let result = AdjustmentConfig::new().with_max_iterations(0);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { ref parameter, .. }) if parameter == "max_iterations"
        ));
        assert!(AdjustmentConfig::new().with_max_iterations(101).is_err());
        assert!(AdjustmentConfig::new().with_max_iterations(1).is_ok());
    }

    #[test]
    fn test_invalid_tolerances_rejected() {
        assert!(AdjustmentConfig::new().with_convergence_tolerance(0.0).is_err());
        assert!(AdjustmentConfig::new().with_convergence_tolerance(f64::NAN).is_err());
        assert!(AdjustmentConfig::new().with_singularity_tolerance(0.1).is_err());
        assert!(AdjustmentConfig::new().with_a_priori_variance(-1.0).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AdjustmentConfig =
            serde_json::from_str(r#"{ "max_iterations": 3, "covariance_scaling": "a_priori" }"#).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.covariance_scaling, CovarianceScaling::APriori);
        assert_eq!(config.a_priori_variance, 1.0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("gnss_adjust_config_{}.json", std::process::id()));
        let config = AdjustmentConfig::single_step().with_covariance_scaling(CovarianceScaling::APriori);
        config.save_to_file(&path).unwrap();
        let loaded = AdjustmentConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = PathBuf::from("/nonexistent/dir/config.json");
        assert!(matches!(
            AdjustmentConfig::from_file(path),
            Err(ConfigError::IoError { .. })
        ));
    }
}
