//! Parameter model: raw simulation inputs and their validated snapshot.
//!
//! [`SimulationState`] is the shape supplied by a configuration surface (a
//! YAML file or the `state` member of an HTTP request). It is unvalidated and
//! carries the cosmetic species names. [`SimulationConfig`] is what the
//! integrator consumes: validated once, immutable afterwards, and free of
//! display concerns.

use serde::{Deserialize, Serialize};

use crate::error::{EcoError, EcoResult};

/// Display labels for the three species. Never reaches the dynamics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesNames {
    pub prey: String,
    #[serde(rename = "LP")]
    pub lower_predator: String,
    #[serde(rename = "AP")]
    pub apex_predator: String,
}

impl Default for SpeciesNames {
    fn default() -> Self {
        Self {
            prey: "토끼".to_string(),
            lower_predator: "여우".to_string(),
            apex_predator: "늑대".to_string(),
        }
    }
}

impl SpeciesNames {
    /// Labels in trajectory order (prey, lower predator, apex predator)
    pub fn as_array(&self) -> [&str; 3] {
        [
            self.prey.as_str(),
            self.lower_predator.as_str(),
            self.apex_predator.as_str(),
        ]
    }
}

/// Index of a predator species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predator {
    Lower = 0,
    Apex = 1,
}

impl Predator {
    pub const ALL: [Predator; 2] = [Predator::Lower, Predator::Apex];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Predator::Lower => "lower predator",
            Predator::Apex => "apex predator",
        }
    }
}

/// Logistic growth parameters of the prey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreyTraits {
    /// Intrinsic growth rate (per month)
    pub reproduction_rate: f64,
    /// Logistic ceiling
    pub carrying_capacity: f64,
}

impl Default for PreyTraits {
    fn default() -> Self {
        Self {
            reproduction_rate: 3.0,
            carrying_capacity: 1300.0,
        }
    }
}

/// Traits of a single predator species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredatorTraits {
    pub reproduction_rate: f64,
    /// Attack rate on prey
    pub predation_rate: f64,
    /// Fraction of consumed prey converted into predator growth (0-1)
    pub efficiency: f64,
    /// Baseline sustenance independent of prey
    pub alternative_food: f64,
}

/// Predator traits laid out the way the configuration surface sends them:
/// one two-element array per trait, indexed `[lower, apex]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredatorTraitTable {
    pub reproduction_rate: [f64; 2],
    pub predation_rate: [f64; 2],
    pub efficiency: [f64; 2],
    pub alternative_food: [f64; 2],
}

impl Default for PredatorTraitTable {
    fn default() -> Self {
        Self {
            reproduction_rate: [0.04, 0.025],
            predation_rate: [0.03, 0.025],
            efficiency: [0.4, 0.12],
            alternative_food: [450.0, 750.0],
        }
    }
}

impl PredatorTraitTable {
    pub fn get(&self, predator: Predator) -> PredatorTraits {
        let i = predator.index();
        PredatorTraits {
            reproduction_rate: self.reproduction_rate[i],
            predation_rate: self.predation_rate[i],
            efficiency: self.efficiency[i],
            alternative_food: self.alternative_food[i],
        }
    }
}

/// Intraguild interaction rates. Row = aggressor, column = victim.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggressionMatrix(pub [[f64; 2]; 2]);

impl AggressionMatrix {
    /// Rate at which `aggressor`'s presence harms `victim`'s population
    pub fn rate(&self, aggressor: Predator, victim: Predator) -> f64 {
        self.0[aggressor.index()][victim.index()]
    }
}

/// Raw simulation inputs in wire/config form.
///
/// Key names and field order match the request contract:
/// `names, stepSize, tRange, preyTraits, predatorTraits, aggressionRateMatrix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    #[serde(default)]
    pub names: SpeciesNames,
    pub step_size: f64,
    /// Total simulated duration (the horizon)
    pub t_range: f64,
    pub prey_traits: PreyTraits,
    pub predator_traits: PredatorTraitTable,
    pub aggression_rate_matrix: AggressionMatrix,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            names: SpeciesNames::default(),
            step_size: 0.23,
            t_range: 24.0,
            prey_traits: PreyTraits::default(),
            predator_traits: PredatorTraitTable::default(),
            aggression_rate_matrix: AggressionMatrix([[0.0, 0.0], [0.003, 0.0025]]),
        }
    }
}

impl SimulationState {
    /// Validate and strip display names.
    pub fn to_config(&self) -> EcoResult<SimulationConfig> {
        SimulationConfig::new(
            self.step_size,
            self.t_range,
            self.prey_traits,
            [
                self.predator_traits.get(Predator::Lower),
                self.predator_traits.get(Predator::Apex),
            ],
            self.aggression_rate_matrix,
        )
    }
}

/// Validated, immutable parameter snapshot consumed by the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    step_size: f64,
    horizon: f64,
    steps: u64,
    prey: PreyTraits,
    predators: [PredatorTraits; 2],
    aggression: AggressionMatrix,
}

impl SimulationConfig {
    pub fn new(
        step_size: f64,
        horizon: f64,
        prey: PreyTraits,
        predators: [PredatorTraits; 2],
        aggression: AggressionMatrix,
    ) -> EcoResult<Self> {
        require_positive("stepSize", step_size)?;
        require_positive("tRange", horizon)?;
        require_positive("preyTraits.reproductionRate", prey.reproduction_rate)?;
        require_positive("preyTraits.carryingCapacity", prey.carrying_capacity)?;

        for predator in Predator::ALL {
            let traits = &predators[predator.index()];
            let i = predator.index();
            require_positive(
                &format!("predatorTraits.reproductionRate[{i}]"),
                traits.reproduction_rate,
            )?;
            require_non_negative(
                &format!("predatorTraits.predationRate[{i}]"),
                traits.predation_rate,
            )?;
            require_non_negative(
                &format!("predatorTraits.alternativeFood[{i}]"),
                traits.alternative_food,
            )?;
            if !(0.0..=1.0).contains(&traits.efficiency) {
                return Err(EcoError::Validation(format!(
                    "predatorTraits.efficiency[{i}] must be in [0, 1], got {}",
                    traits.efficiency
                )));
            }
        }

        for aggressor in Predator::ALL {
            for victim in Predator::ALL {
                require_non_negative(
                    &format!(
                        "aggressionRateMatrix[{}][{}]",
                        aggressor.index(),
                        victim.index()
                    ),
                    aggression.rate(aggressor, victim),
                )?;
            }
        }

        let steps = resolve_step_count(horizon, step_size)?;

        Ok(Self {
            step_size,
            horizon,
            steps,
            prey,
            predators,
            aggression,
        })
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Number of integration steps: the smallest `k >= 1` with `k * step_size >= horizon`.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn prey(&self) -> &PreyTraits {
        &self.prey
    }

    pub fn predator(&self, predator: Predator) -> &PredatorTraits {
        &self.predators[predator.index()]
    }

    pub fn aggression(&self) -> &AggressionMatrix {
        &self.aggression
    }
}

/// Largest step count whose times `k * step_size` are still exact integers in `f64`.
const MAX_RESOLVABLE_STEPS: u64 = 1 << 53;

/// Smallest `k >= 1` with `k * step_size >= horizon`, evaluated the same way
/// the integrator computes record times.
fn resolve_step_count(horizon: f64, step_size: f64) -> EcoResult<u64> {
    let ratio = horizon / step_size;
    if !ratio.is_finite() || ratio > MAX_RESOLVABLE_STEPS as f64 {
        return Err(EcoError::Validation(format!(
            "tRange / stepSize does not resolve to a usable step count ({horizon} / {step_size})"
        )));
    }

    let mut steps = (ratio.ceil() as u64).max(1);
    while steps > 1 && (steps - 1) as f64 * step_size >= horizon {
        steps -= 1;
    }
    while (steps as f64) * step_size < horizon {
        steps += 1;
    }
    Ok(steps)
}

impl TryFrom<&SimulationState> for SimulationConfig {
    type Error = EcoError;

    fn try_from(state: &SimulationState) -> EcoResult<Self> {
        state.to_config()
    }
}

fn require_positive(field: &str, value: f64) -> EcoResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EcoError::Validation(format!(
            "{field} must be a finite number > 0, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> EcoResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EcoError::Validation(format!(
            "{field} must be a finite number >= 0, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_valid() {
        let config = SimulationState::default().to_config().unwrap();
        assert_eq!(config.step_size(), 0.23);
        assert_eq!(config.horizon(), 24.0);
        assert_eq!(config.step_count(), 105);
        assert_eq!(config.predator(Predator::Apex).alternative_food, 750.0);
    }

    #[test]
    fn test_step_count_truncation() {
        let mut state = SimulationState::default();
        state.step_size = 0.5;
        state.t_range = 2.0;
        assert_eq!(state.to_config().unwrap().step_count(), 4);

        state.t_range = 0.1;
        assert_eq!(state.to_config().unwrap().step_count(), 1);
    }

    #[test]
    fn test_step_count_stops_at_first_time_reaching_horizon() {
        for (step_size, t_range, expected) in [(0.09, 0.27, 3), (0.01, 0.07, 7), (0.02, 0.14, 7)] {
            let mut state = SimulationState::default();
            state.step_size = step_size;
            state.t_range = t_range;
            let steps = state.to_config().unwrap().step_count();
            assert_eq!(steps, expected, "{t_range} / {step_size}");
            assert!(steps as f64 * step_size >= t_range);
            assert!(((steps - 1) as f64) * step_size < t_range);
        }
    }

    #[test]
    fn test_rejects_unresolvable_step_count() {
        let mut state = SimulationState::default();
        state.step_size = 1e-300;
        let err = state.to_config().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("step count"));
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let mut state = SimulationState::default();
        state.step_size = 0.0;
        let err = state.to_config().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("stepSize"));

        state.step_size = -0.1;
        assert!(state.to_config().is_err());
    }

    #[test]
    fn test_rejects_non_positive_horizon() {
        let mut state = SimulationState::default();
        state.t_range = 0.0;
        assert!(state.to_config().unwrap_err().to_string().contains("tRange"));
    }

    #[test]
    fn test_rejects_nan_capacity() {
        let mut state = SimulationState::default();
        state.prey_traits.carrying_capacity = f64::NAN;
        assert!(state.to_config().is_err());
    }

    #[test]
    fn test_zero_subsidy_and_interaction_allowed() {
        let mut state = SimulationState::default();
        state.predator_traits.alternative_food = [0.0, 0.0];
        state.predator_traits.predation_rate = [0.0, 0.0];
        state.aggression_rate_matrix = AggressionMatrix([[0.0, 0.0], [0.0, 0.0]]);
        assert!(state.to_config().is_ok());
    }

    #[test]
    fn test_rejects_negative_aggression() {
        let mut state = SimulationState::default();
        state.aggression_rate_matrix.0[1][0] = -0.001;
        let err = state.to_config().unwrap_err();
        assert!(err.to_string().contains("aggressionRateMatrix[1][0]"));
    }

    #[test]
    fn test_rejects_efficiency_out_of_range() {
        let mut state = SimulationState::default();
        state.predator_traits.efficiency[1] = 1.5;
        let err = state.to_config().unwrap_err();
        assert!(err.to_string().contains("efficiency[1]"));
    }

    #[test]
    fn test_rejects_zero_predator_reproduction() {
        let mut state = SimulationState::default();
        state.predator_traits.reproduction_rate[0] = 0.0;
        assert!(state.to_config().is_err());
    }

    #[test]
    fn test_aggression_orientation() {
        let m = AggressionMatrix([[0.1, 0.2], [0.3, 0.4]]);
        assert_eq!(m.rate(Predator::Lower, Predator::Apex), 0.2);
        assert_eq!(m.rate(Predator::Apex, Predator::Lower), 0.3);
    }

    #[test]
    fn test_wire_keys() {
        let json = serde_json::to_value(SimulationState::default()).unwrap();
        assert_eq!(json["names"]["LP"], "여우");
        assert_eq!(json["stepSize"], 0.23);
        assert_eq!(json["tRange"], 24.0);
        assert_eq!(json["preyTraits"]["carryingCapacity"], 1300.0);
        assert_eq!(json["predatorTraits"]["alternativeFood"][1], 750.0);
        assert_eq!(json["aggressionRateMatrix"][1][0], 0.003);
    }

    #[test]
    fn test_names_optional_on_wire() {
        let json = r#"{
            "stepSize": 0.5, "tRange": 10,
            "preyTraits": {"reproductionRate": 1.0, "carryingCapacity": 100},
            "predatorTraits": {
                "reproductionRate": [0.1, 0.1], "predationRate": [0.01, 0.01],
                "efficiency": [0.5, 0.5], "alternativeFood": [0, 0]
            },
            "aggressionRateMatrix": [[0, 0], [0, 0]]
        }"#;
        let state: SimulationState = serde_json::from_str(json).unwrap();
        assert_eq!(state.names, SpeciesNames::default());
        assert_eq!(state.to_config().unwrap().step_count(), 20);
    }
}
