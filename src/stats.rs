//! Summary statistics over a finished trajectory.

use serde::{Deserialize, Serialize};

use crate::dynamics::Species;
use crate::integrator::Trajectory;

/// Statistics for one species' population series
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub final_value: f64,
    /// Time at which `max` was first reached
    pub peak_time: f64,
    /// Population is exactly 0 at the end of the run
    pub extinct: bool,
}

impl SpeciesStats {
    fn from_series(times: &[f64], values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut peak_time = 0.0;
        for (&t, &v) in times.iter().zip(values) {
            min = min.min(v);
            if v > max {
                max = v;
                peak_time = t;
            }
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let final_value = values[values.len() - 1];

        Self {
            min,
            max,
            mean,
            final_value,
            peak_time,
            extinct: final_value == 0.0,
        }
    }
}

/// Per-species statistics for a trajectory, in trajectory order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub records: usize,
    pub final_time: f64,
    pub prey: SpeciesStats,
    pub lower_predator: SpeciesStats,
    pub apex_predator: SpeciesStats,
}

impl TrajectorySummary {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let times = trajectory.times();
        let stats = |species| SpeciesStats::from_series(&times, &trajectory.series(species));

        Self {
            records: trajectory.len(),
            final_time: trajectory.last().map_or(0.0, |r| r.time),
            prey: stats(Species::Prey),
            lower_predator: stats(Species::LowerPredator),
            apex_predator: stats(Species::ApexPredator),
        }
    }

    pub fn get(&self, species: Species) -> &SpeciesStats {
        match species {
            Species::Prey => &self.prey,
            Species::LowerPredator => &self.lower_predator,
            Species::ApexPredator => &self.apex_predator,
        }
    }

    /// Number of species alive at the end of the run
    pub fn surviving(&self) -> usize {
        Species::ALL
            .iter()
            .filter(|&&s| !self.get(s).extinct)
            .count()
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:7.2} | Records:{:5} | Prey:{:.1} (max {:.1}) | LP:{:.1} (max {:.1}) | AP:{:.1} (max {:.1})",
            self.final_time,
            self.records,
            self.prey.final_value,
            self.prey.max,
            self.lower_predator.final_value,
            self.lower_predator.max,
            self.apex_predator.final_value,
            self.apex_predator.max,
        )
    }
}
