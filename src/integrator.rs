//! Fixed-step fourth-order Runge-Kutta integration of the population model.

use serde::{Deserialize, Serialize};

use crate::dynamics::{derivative, PopulationState, Rates, Species};
use crate::error::{EcoError, EcoResult};
use crate::params::SimulationConfig;

/// Default population bound above which a run is reported as diverged.
pub const DEFAULT_DIVERGENCE_CEILING: f64 = 1e12;

/// Default maximum number of integration steps per run.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

/// Highest step limit a configuration may set.
pub const MAX_STEP_LIMIT: u64 = 10_000_000;

/// Upper bound on records reserved before a run starts.
const PREALLOCATED_RECORDS: u64 = 1 << 16;

/// One `(time, populations)` sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub time: f64,
    pub populations: PopulationState,
}

/// Ordered population time series, starting at `t = 0`.
///
/// Serialized as a plain list of records.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    records: Vec<TrajectoryRecord>,
}

impl Trajectory {
    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&TrajectoryRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryRecord> {
        self.records.iter()
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    /// Population series of a single species
    pub fn series(&self, species: Species) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.populations.get(species))
            .collect()
    }

    pub fn into_records(self) -> Vec<TrajectoryRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryRecord;
    type IntoIter = std::slice::Iter<'a, TrajectoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Per-run safety bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegratorLimits {
    /// Populations above this (or non-finite) abort the run
    pub divergence_ceiling: f64,
    /// Runs needing more steps are rejected before starting
    pub max_steps: u64,
}

impl Default for IntegratorLimits {
    fn default() -> Self {
        Self {
            divergence_ceiling: DEFAULT_DIVERGENCE_CEILING,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Classic RK4 stepper.
///
/// After every step, any non-finite population or one above the divergence
/// ceiling fails the run; otherwise negative populations are clamped to 0
/// before the state is recorded and fed into the next step. The clamp is the
/// only deviation from plain RK4.
#[derive(Clone, Debug, Default)]
pub struct Rk4Integrator {
    pub limits: IntegratorLimits,
}

impl Rk4Integrator {
    pub fn new(limits: IntegratorLimits) -> Self {
        Self { limits }
    }

    /// One unclamped RK4 step of size `config.step_size()`.
    pub fn step(&self, state: &PopulationState, config: &SimulationConfig) -> PopulationState {
        let h = config.step_size();

        let k1 = derivative(state, config);
        let k2 = derivative(&state.advance(&k1, h / 2.0), config);
        let k3 = derivative(&state.advance(&k2, h / 2.0), config);
        let k4 = derivative(&state.advance(&k3, h), config);

        state.advance(&Rates::rk4_blend(&k1, &k2, &k3, &k4), h)
    }

    /// Integrate from `t = 0` until `t >= horizon`.
    ///
    /// Produces `step_count() + 1` records; record `k` is at `k * step_size`.
    /// Either the complete trajectory or an error is returned.
    pub fn run(
        &self,
        config: &SimulationConfig,
        initial: PopulationState,
    ) -> EcoResult<Trajectory> {
        let steps = config.step_count();
        if steps > self.limits.max_steps {
            return Err(EcoError::Validation(format!(
                "run needs {steps} steps (tRange {} / stepSize {}), limit is {}",
                config.horizon(),
                config.step_size(),
                self.limits.max_steps
            )));
        }
        let initial = PopulationState::initial(initial.to_array())?;

        log::debug!(
            "RK4 run: {} steps of {} up to t={}",
            steps,
            config.step_size(),
            config.horizon()
        );

        let record_count = steps.checked_add(1).ok_or_else(|| {
            EcoError::validation(format!("step count {steps} is out of range"))
        })?;
        let capacity = usize::try_from(record_count.min(PREALLOCATED_RECORDS)).unwrap_or(0);
        let mut records = Vec::with_capacity(capacity);
        records.push(TrajectoryRecord {
            time: 0.0,
            populations: initial,
        });

        let mut state = initial;
        let mut clamped = 0usize;
        for k in 1..=steps {
            let time = k as f64 * config.step_size();
            let next = self.step(&state, config);

            if let Some((species, value)) = next.first_out_of_bounds(self.limits.divergence_ceiling)
            {
                log::warn!(
                    "Simulation diverged at t={:.3}: {} = {:e} (ceiling {:e})",
                    time,
                    species,
                    value,
                    self.limits.divergence_ceiling
                );
                return Err(EcoError::Diverged {
                    time,
                    species,
                    value,
                });
            }

            state = next.clamp_non_negative();
            if state != next {
                clamped += 1;
            }
            records.push(TrajectoryRecord {
                time,
                populations: state,
            });
        }

        if clamped > 0 {
            log::debug!("Clamped negative populations on {} of {} steps", clamped, steps);
        }

        Ok(Trajectory { records })
    }
}

/// Run with default limits.
pub fn simulate(config: &SimulationConfig, initial: PopulationState) -> EcoResult<Trajectory> {
    Rk4Integrator::default().run(config, initial)
}
