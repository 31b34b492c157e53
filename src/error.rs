//! Error hierarchy for the simulation engine.

use thiserror::Error;

use crate::dynamics::Species;

/// Root error type for all engine failures.
#[derive(Error, Debug)]
pub enum EcoError {
    /// Missing, non-numeric or out-of-range input. Raised before any
    /// integration begins.
    #[error("validation error: {0}")]
    Validation(String),

    /// A population left the representable range mid-run.
    #[error("simulation diverged at t={time:.3}: {species} population reached {value:e}")]
    Diverged {
        time: f64,
        species: Species,
        value: f64,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EcoError {
    /// Shorthand for building a validation error from any message.
    pub fn validation(msg: impl Into<String>) -> Self {
        EcoError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EcoError::Validation(_))
    }

    pub fn is_diverged(&self) -> bool {
        matches!(self, EcoError::Diverged { .. })
    }
}

pub type EcoResult<T> = Result<T, EcoError>;
