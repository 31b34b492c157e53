//! Request/response shapes of the simulation endpoint.
//!
//! Request: `{ "state": { names, stepSize, tRange, preyTraits, predatorTraits,
//! aggressionRateMatrix }, "populations": [prey, LP, AP] }`.
//!
//! Response: `[{ "time": t, "populations": [prey, LP, AP] }, ...]`, which is
//! exactly the serialized form of [`Trajectory`].

use serde::{Deserialize, Serialize};

use crate::dynamics::PopulationState;
use crate::error::{EcoError, EcoResult};
use crate::integrator::{IntegratorLimits, Rk4Integrator, Trajectory};
use crate::params::{SimulationConfig, SimulationState};

/// Default initial populations `[prey, LP, AP]`.
pub const DEFAULT_POPULATIONS: [f64; 3] = [50.0, 10.0, 2.0];

/// One simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub state: SimulationState,
    pub populations: [f64; 3],
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            state: SimulationState::default(),
            populations: DEFAULT_POPULATIONS,
        }
    }
}

impl SimulationRequest {
    /// Parse a request body. Missing or non-numeric fields are validation
    /// errors, not transport errors.
    pub fn from_json(json: &str) -> EcoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EcoError::Validation(format!("malformed request: {e}")))
    }

    /// Validated parameters and initial state. Names are dropped here.
    pub fn scenario(&self) -> EcoResult<(SimulationConfig, PopulationState)> {
        let config = self.state.to_config()?;
        let initial = PopulationState::initial(self.populations)?;
        Ok((config, initial))
    }

    pub fn run(&self, limits: IntegratorLimits) -> EcoResult<Trajectory> {
        let (config, initial) = self.scenario()?;
        Rk4Integrator::new(limits).run(&config, initial)
    }
}

/// Request body in, response body out.
pub fn handle_json(body: &str, limits: IntegratorLimits) -> EcoResult<String> {
    let trajectory = SimulationRequest::from_json(body)?.run(limits)?;
    Ok(serde_json::to_string(&trajectory)?)
}
