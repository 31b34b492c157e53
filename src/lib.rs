//! # ecosim
//!
//! Population dynamics engine for a prey / lower predator / apex predator
//! food chain.
//!
//! ## Features
//!
//! - **Model**: logistic prey growth, Type I predation, alternative food and
//!   intraguild aggression between predators
//! - **Integrator**: fixed-step RK4 with non-negative clamping and divergence
//!   detection
//! - **Randomization**: log-normal jitter of every numeric parameter
//! - **Configurable**: YAML configuration files, JSON request/response shapes
//!
//! ## Quick Start
//!
//! ```rust
//! use ecosim::{simulate, PopulationState, SimulationState};
//!
//! // Default parameters: 24 months in steps of 0.23
//! let config = SimulationState::default().to_config().unwrap();
//! let trajectory = simulate(&config, PopulationState::new(50.0, 10.0, 2.0)).unwrap();
//!
//! assert_eq!(trajectory.first().unwrap().time, 0.0);
//! println!("Final: {:?}", trajectory.last().unwrap().populations);
//! ```
//!
//! ## Randomizing parameters
//!
//! ```rust
//! use ecosim::{Perturber, SimulationRequest};
//!
//! let mut perturber = Perturber::new_with_seed(42);
//! let request = perturber.jitter_request(&SimulationRequest::default());
//! assert_eq!(request.state.names, SimulationRequest::default().state.names);
//! ```

pub mod config;
pub mod dynamics;
pub mod error;
pub mod export;
pub mod integrator;
pub mod params;
pub mod perturbation;
pub mod protocol;
pub mod stats;

#[cfg(feature = "web")]
pub mod web;

// Re-export main types
pub use config::Config;
pub use dynamics::{derivative, PopulationState, Species};
pub use error::{EcoError, EcoResult};
pub use integrator::{simulate, IntegratorLimits, Rk4Integrator, Trajectory, TrajectoryRecord};
pub use params::{
    AggressionMatrix, Predator, PredatorTraitTable, PredatorTraits, PreyTraits, SimulationConfig,
    SimulationState, SpeciesNames,
};
pub use perturbation::{log_normal, Perturber, DEFAULT_DISPERSION};
pub use protocol::SimulationRequest;
pub use stats::TrajectorySummary;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time repeated runs of a request
pub fn benchmark(request: &SimulationRequest, runs: u32) -> EcoResult<BenchmarkResult> {
    use std::time::Instant;

    let (config, initial) = request.scenario()?;
    let integrator = Rk4Integrator::default();

    let start = Instant::now();
    let mut records = 0;
    for _ in 0..runs {
        records = integrator.run(&config, initial)?.len();
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        runs,
        steps_per_run: config.step_count(),
        records_per_run: records,
        elapsed_secs: elapsed.as_secs_f64(),
        runs_per_second: runs as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub runs: u32,
    pub steps_per_run: u64,
    pub records_per_run: usize,
    pub elapsed_secs: f64,
    pub runs_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Runs: {}", self.runs)?;
        writeln!(f, "Steps per run: {}", self.steps_per_run)?;
        writeln!(f, "Records per run: {}", self.records_per_run)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} runs/s", self.runs_per_second)?;
        Ok(())
    }
}
