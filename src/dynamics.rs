//! Three-species population dynamics.
//!
//! Generalized Lotka-Volterra model with logistic prey growth, linear
//! (Type I) predation, efficiency-scaled predator growth, an
//! alternative-food subsidy, and intraguild aggression:
//!
//! ```text
//! dx/dt   = r x (1 - x/K) - pL x yL - pA x yA
//! dyL/dt  = bL yL (eL pL x + AL) - yL (a[L][L] yL + a[A][L] yA)
//! dyA/dt  = bA yA (eA pA x + AA) - yA (a[L][A] yL + a[A][A] yA)
//! ```
//!
//! `a[i][j]` is the aggression of predator `i` towards predator `j`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EcoError, EcoResult};
use crate::params::{Predator, SimulationConfig};

/// The three modelled species, in trajectory order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    Prey,
    LowerPredator,
    ApexPredator,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Prey, Species::LowerPredator, Species::ApexPredator];

    pub fn index(self) -> usize {
        match self {
            Species::Prey => 0,
            Species::LowerPredator => 1,
            Species::ApexPredator => 2,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Prey => write!(f, "prey"),
            Species::LowerPredator => write!(f, "{}", Predator::Lower.label()),
            Species::ApexPredator => write!(f, "{}", Predator::Apex.label()),
        }
    }
}

/// Population counts `(prey, lower predator, apex predator)`.
///
/// Serialized as a 3-element list in that order.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct PopulationState {
    pub prey: f64,
    pub lower_predator: f64,
    pub apex_predator: f64,
}

impl PopulationState {
    pub fn new(prey: f64, lower_predator: f64, apex_predator: f64) -> Self {
        Self {
            prey,
            lower_predator,
            apex_predator,
        }
    }

    /// Validate caller-supplied initial populations (finite, non-negative).
    pub fn initial(values: [f64; 3]) -> EcoResult<Self> {
        for species in Species::ALL {
            let value = values[species.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(EcoError::Validation(format!(
                    "initial {species} population must be a finite number >= 0, got {value}"
                )));
            }
        }
        Ok(Self::from(values))
    }

    pub fn get(&self, species: Species) -> f64 {
        match species {
            Species::Prey => self.prey,
            Species::LowerPredator => self.lower_predator,
            Species::ApexPredator => self.apex_predator,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.prey, self.lower_predator, self.apex_predator]
    }

    /// `self + h * rates`
    pub fn advance(&self, rates: &Rates, h: f64) -> Self {
        Self {
            prey: self.prey + h * rates.prey,
            lower_predator: self.lower_predator + h * rates.lower_predator,
            apex_predator: self.apex_predator + h * rates.apex_predator,
        }
    }

    /// Replace negative components with exactly 0.
    pub fn clamp_non_negative(&self) -> Self {
        Self {
            prey: self.prey.max(0.0),
            lower_predator: self.lower_predator.max(0.0),
            apex_predator: self.apex_predator.max(0.0),
        }
    }

    /// First species whose population is non-finite or above `ceiling`.
    pub fn first_out_of_bounds(&self, ceiling: f64) -> Option<(Species, f64)> {
        Species::ALL
            .into_iter()
            .map(|s| (s, self.get(s)))
            .find(|&(_, v)| !v.is_finite() || v > ceiling)
    }
}

impl From<[f64; 3]> for PopulationState {
    fn from(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl From<PopulationState> for [f64; 3] {
    fn from(state: PopulationState) -> Self {
        state.to_array()
    }
}

/// Instantaneous rate of change for each species.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rates {
    pub prey: f64,
    pub lower_predator: f64,
    pub apex_predator: f64,
}

impl Rates {
    /// Weighted RK4 average `(k1 + 2k2 + 2k3 + k4) / 6`.
    pub fn rk4_blend(k1: &Rates, k2: &Rates, k3: &Rates, k4: &Rates) -> Rates {
        let blend = |a: f64, b: f64, c: f64, d: f64| (a + 2.0 * b + 2.0 * c + d) / 6.0;
        Rates {
            prey: blend(k1.prey, k2.prey, k3.prey, k4.prey),
            lower_predator: blend(
                k1.lower_predator,
                k2.lower_predator,
                k3.lower_predator,
                k4.lower_predator,
            ),
            apex_predator: blend(
                k1.apex_predator,
                k2.apex_predator,
                k3.apex_predator,
                k4.apex_predator,
            ),
        }
    }
}

/// Evaluate the model at `state`. Pure; negative inputs are not clamped.
pub fn derivative(state: &PopulationState, config: &SimulationConfig) -> Rates {
    let x = state.prey;
    let y_l = state.lower_predator;
    let y_a = state.apex_predator;

    let prey = config.prey();
    let lower = config.predator(Predator::Lower);
    let apex = config.predator(Predator::Apex);
    let aggr = config.aggression();

    let growth = prey.reproduction_rate * x * (1.0 - x / prey.carrying_capacity);
    let d_prey = growth - lower.predation_rate * x * y_l - apex.predation_rate * x * y_a;

    let d_lower = lower.reproduction_rate
        * y_l
        * (lower.efficiency * lower.predation_rate * x + lower.alternative_food)
        - y_l
            * (aggr.rate(Predator::Lower, Predator::Lower) * y_l
                + aggr.rate(Predator::Apex, Predator::Lower) * y_a);

    let d_apex = apex.reproduction_rate
        * y_a
        * (apex.efficiency * apex.predation_rate * x + apex.alternative_food)
        - y_a
            * (aggr.rate(Predator::Lower, Predator::Apex) * y_l
                + aggr.rate(Predator::Apex, Predator::Apex) * y_a);

    Rates {
        prey: d_prey,
        lower_predator: d_lower,
        apex_predator: d_apex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AggressionMatrix, PredatorTraits, PreyTraits};

    fn config(aggression: [[f64; 2]; 2]) -> SimulationConfig {
        let predator = |b, p, e, a| PredatorTraits {
            reproduction_rate: b,
            predation_rate: p,
            efficiency: e,
            alternative_food: a,
        };
        SimulationConfig::new(
            0.1,
            1.0,
            PreyTraits {
                reproduction_rate: 2.0,
                carrying_capacity: 100.0,
            },
            [predator(0.5, 0.1, 0.5, 1.0), predator(0.2, 0.05, 0.25, 2.0)],
            AggressionMatrix(aggression),
        )
        .unwrap()
    }

    #[test]
    fn test_hand_computed_derivative() {
        let cfg = config([[0.01, 0.02], [0.03, 0.04]]);
        let rates = derivative(&PopulationState::new(50.0, 4.0, 2.0), &cfg);

        // 2*50*(1-0.5) - 0.1*50*4 - 0.05*50*2 = 50 - 20 - 5
        assert!((rates.prey - 25.0).abs() < 1e-12);
        // 0.5*4*(0.5*0.1*50 + 1) - 4*(0.01*4 + 0.03*2) = 7 - 0.4
        assert!((rates.lower_predator - 6.6).abs() < 1e-12);
        // 0.2*2*(0.25*0.05*50 + 2) - 2*(0.02*4 + 0.04*2) = 1.05 - 0.32
        assert!((rates.apex_predator - 0.73).abs() < 1e-12);
    }

    #[test]
    fn test_aggression_row_is_aggressor() {
        // Only the apex predator attacks the lower predator.
        let cfg = config([[0.0, 0.0], [1.0, 0.0]]);
        let base = derivative(&PopulationState::new(0.0, 1.0, 1.0), &config([[0.0; 2]; 2]));
        let rates = derivative(&PopulationState::new(0.0, 1.0, 1.0), &cfg);
        assert!((base.lower_predator - rates.lower_predator - 1.0).abs() < 1e-12);
        assert_eq!(base.apex_predator, rates.apex_predator);
    }

    #[test]
    fn test_zero_population_has_zero_rate() {
        let cfg = config([[0.01, 0.02], [0.03, 0.04]]);
        let rates = derivative(&PopulationState::new(0.0, 0.0, 0.0), &cfg);
        assert_eq!(rates, Rates::default());
    }

    #[test]
    fn test_prey_at_capacity_without_predators() {
        let cfg = config([[0.0; 2]; 2]);
        let rates = derivative(&PopulationState::new(100.0, 0.0, 0.0), &cfg);
        assert_eq!(rates.prey, 0.0);
    }

    #[test]
    fn test_negative_input_not_clamped() {
        let cfg = config([[0.0; 2]; 2]);
        let rates = derivative(&PopulationState::new(-10.0, 0.0, 0.0), &cfg);
        // 2 * -10 * (1 + 0.1)
        assert!((rates.prey + 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_initial_rejects_negative() {
        assert!(PopulationState::initial([50.0, -1.0, 2.0]).is_err());
        assert!(PopulationState::initial([f64::INFINITY, 1.0, 2.0]).is_err());
        assert!(PopulationState::initial([0.0, 0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_out_of_bounds_detection() {
        let state = PopulationState::new(1.0, f64::NAN, 5.0);
        assert_eq!(
            state.first_out_of_bounds(1e12).map(|(s, _)| s),
            Some(Species::LowerPredator)
        );
        let state = PopulationState::new(1.0, 2.0, 2e12);
        assert_eq!(
            state.first_out_of_bounds(1e12).map(|(s, _)| s),
            Some(Species::ApexPredator)
        );
        assert!(PopulationState::new(1.0, 2.0, 3.0).first_out_of_bounds(1e12).is_none());
    }

    #[test]
    fn test_serializes_as_list() {
        let json = serde_json::to_string(&PopulationState::new(50.0, 10.0, 2.0)).unwrap();
        assert_eq!(json, "[50.0,10.0,2.0]");
    }
}
