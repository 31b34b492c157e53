//! Shared application state for the web server.

use crate::config::Config;
use crate::integrator::IntegratorLimits;
use crate::protocol::SimulationRequest;

/// Application state shared between all handlers.
///
/// Read-only after startup; each request builds its own integrator and RNG.
pub struct AppState {
    /// Safety limits applied to every run
    pub limits: IntegratorLimits,
    /// Request served by `/api/defaults`
    pub defaults: SimulationRequest,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &Config) -> Self {
        Self {
            limits: config.safety.limits(),
            defaults: config.request(),
        }
    }
}
