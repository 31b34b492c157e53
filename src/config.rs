//! Configuration system for ecosim runs.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dynamics::PopulationState;
use crate::error::{EcoError, EcoResult};
use crate::integrator::{
    IntegratorLimits, DEFAULT_DIVERGENCE_CEILING, DEFAULT_MAX_STEPS, MAX_STEP_LIMIT,
};
use crate::params::{SimulationConfig, SimulationState};
use crate::protocol::{SimulationRequest, DEFAULT_POPULATIONS};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model parameters, in the same shape as the request `state`
    #[serde(default)]
    pub simulation: SimulationState,
    /// Initial `[prey, LP, AP]` populations
    #[serde(default = "default_populations")]
    pub initial_populations: [f64; 3],
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Safety limits to prevent runaway simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Population above which a run is reported as diverged
    pub divergence_ceiling: f64,
    /// Maximum integration steps per run
    pub max_steps: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

fn default_populations() -> [f64; 3] {
    DEFAULT_POPULATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationState::default(),
            initial_populations: DEFAULT_POPULATIONS,
            safety: SafetyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            divergence_ceiling: DEFAULT_DIVERGENCE_CEILING,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SafetyConfig {
    pub fn limits(&self) -> IntegratorLimits {
        IntegratorLimits {
            divergence_ceiling: self.divergence_ceiling,
            max_steps: self.max_steps,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> EcoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EcoResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> EcoResult<()> {
        if !self.safety.divergence_ceiling.is_finite() || self.safety.divergence_ceiling <= 0.0 {
            return Err(EcoError::validation("divergence_ceiling must be a finite number > 0"));
        }
        if self.safety.max_steps == 0 || self.safety.max_steps > MAX_STEP_LIMIT {
            return Err(EcoError::Validation(format!(
                "max_steps must be in 1..={MAX_STEP_LIMIT}, got {}",
                self.safety.max_steps
            )));
        }
        let (config, _) = self.scenario()?;
        if config.step_count() > self.safety.max_steps {
            return Err(EcoError::Validation(format!(
                "tRange / stepSize needs {} steps, max_steps is {}",
                config.step_count(),
                self.safety.max_steps
            )));
        }
        Ok(())
    }

    /// Validated model parameters and initial populations
    pub fn scenario(&self) -> EcoResult<(SimulationConfig, PopulationState)> {
        self.request().scenario()
    }

    /// The configured run as a wire request
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            state: self.simulation.clone(),
            populations: self.initial_populations,
        }
    }

    /// Replace the run parameters, e.g. with a jittered request
    pub fn with_request(mut self, request: SimulationRequest) -> Self {
        self.simulation = request.state;
        self.initial_populations = request.populations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ecosim.yaml");

        let config = Config::default();
        config.save(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "logging:\n  log_level: debug\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(config.initial_populations, [50.0, 10.0, 2.0]);
        assert_eq!(config.simulation, SimulationState::default());
    }

    #[test]
    fn test_step_limit_enforced() {
        let mut config = Config::default();
        config.safety.max_steps = 100;
        assert!(config.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_step_limit_bounded() {
        let mut config = Config::default();
        config.safety.max_steps = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("max_steps"));

        config.safety.max_steps = MAX_STEP_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");

        let mut config = Config::default();
        config.simulation.prey_traits.carrying_capacity = -5.0;
        config.save(&path).unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
