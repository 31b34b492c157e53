//! Log-normal parameter jitter.
//!
//! Each numeric field is multiplied by `exp(σ z)` with `z` a standard normal
//! deviate, so positive values stay positive, zeros stay zero, and the
//! median of the jittered value is the original value.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::params::{AggressionMatrix, PredatorTraitTable, PreyTraits, SimulationState};
use crate::protocol::SimulationRequest;

/// Default dispersion `σ = ln(1.25)`.
pub const DEFAULT_DISPERSION: f64 = 0.223_143_551_314_209_76;

/// Standard normal deviate via the Box-Muller transform.
///
/// `u1` is re-drawn while it is exactly 0 so the logarithm stays finite.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u1: f64 = rng.gen();
    while u1 == 0.0 {
        u1 = rng.gen();
    }
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// One log-normal sample `center * exp(sigma * z)`.
pub fn log_normal<R: Rng + ?Sized>(rng: &mut R, center: f64, sigma: f64) -> f64 {
    center * (sigma * standard_normal(rng)).exp()
}

/// Seeded source of parameter jitter.
///
/// Owns its RNG; concurrent callers each need their own instance.
pub struct Perturber {
    rng: ChaCha8Rng,
    seed: u64,
    sigma: f64,
}

impl Default for Perturber {
    fn default() -> Self {
        Self::new()
    }
}

impl Perturber {
    /// Create a perturber with a random seed
    pub fn new() -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(seed)
    }

    /// Create a perturber with a specific seed for reproducibility
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            sigma: DEFAULT_DISPERSION,
        }
    }

    pub fn with_dispersion(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn dispersion(&self) -> f64 {
        self.sigma
    }

    pub fn sample(&mut self, center: f64) -> f64 {
        log_normal(&mut self.rng, center, self.sigma)
    }

    fn jitter_pair(&mut self, pair: [f64; 2]) -> [f64; 2] {
        [self.sample(pair[0]), self.sample(pair[1])]
    }

    /// Independently jitter every numeric field; names are copied as-is.
    pub fn jitter_state(&mut self, state: &SimulationState) -> SimulationState {
        let m = state.aggression_rate_matrix.0;
        SimulationState {
            names: state.names.clone(),
            step_size: self.sample(state.step_size),
            t_range: self.sample(state.t_range),
            prey_traits: PreyTraits {
                reproduction_rate: self.sample(state.prey_traits.reproduction_rate),
                carrying_capacity: self.sample(state.prey_traits.carrying_capacity),
            },
            predator_traits: PredatorTraitTable {
                reproduction_rate: self.jitter_pair(state.predator_traits.reproduction_rate),
                predation_rate: self.jitter_pair(state.predator_traits.predation_rate),
                efficiency: self.jitter_pair(state.predator_traits.efficiency),
                alternative_food: self.jitter_pair(state.predator_traits.alternative_food),
            },
            aggression_rate_matrix: AggressionMatrix([
                self.jitter_pair(m[0]),
                self.jitter_pair(m[1]),
            ]),
        }
    }

    pub fn jitter_populations(&mut self, populations: [f64; 3]) -> [f64; 3] {
        populations.map(|p| self.sample(p))
    }

    /// Jitter both the parameters and the initial populations.
    pub fn jitter_request(&mut self, request: &SimulationRequest) -> SimulationRequest {
        SimulationRequest {
            state: self.jitter_state(&request.state),
            populations: self.jitter_populations(request.populations),
        }
    }
}
