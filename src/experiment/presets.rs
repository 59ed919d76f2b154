//! Named algorithm presets.
//!
//! | Preset | pop | gens | pc | pm | elite | tour | w | objective |
//! |--------|-----|------|----|----|-------|------|---|-----------|
//! | Amaga | 40 | 40 | 0.8 | 0.01 | 2 | 3 | 5 | MaxPriority |
//! | Ampga | 50 | 60 | 0.9 | 0.02 | 4 | 3 | 6 | PriorityLightPenalty |
//! | Diktyoga | 45 | 60 | 0.85 | 0.015 | 3 | 3 | 7 | PriorityStrongPenalty |
//! | Mcssga | 60 | 80 | 0.9 | 0.02 | 4 | 4 | 8 | MultiCriteria |
//! | Mtdp | 70 | 100 | 0.92 | 0.015 | 6 | 5 | 10 | TemperatureAwarePower |
//!
//! `CompRand` and `BERand` are random baselines with no GA behind them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SchedulingError};
use crate::ga::{CrossoverType, EngineConfig};
use crate::models::Encoding;
use crate::objective::ObjectiveMode;

/// Default fraction of total demand offered as capacity.
pub const DEFAULT_CAPACITY_RATIO: f64 = 0.6;

/// Scheduling algorithm for experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Random acceptance with probability 0.5.
    CompRand,
    /// Random acceptance with probability 0.7.
    BERand,
    /// GA maximizing accepted priority.
    Amaga,
    /// GA on priority with a light utilization term.
    Ampga,
    /// GA on priority with a strong utilization term.
    Diktyoga,
    /// GA on the multi-criteria blend of priority, slack and balance.
    Mcssga,
    /// Temperature-aware power minimization with site placement.
    Mtdp,
}

impl Algorithm {
    /// All algorithms, baselines first.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::CompRand,
        Algorithm::BERand,
        Algorithm::Amaga,
        Algorithm::Ampga,
        Algorithm::Diktyoga,
        Algorithm::Mcssga,
        Algorithm::Mtdp,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::CompRand => "CompRand",
            Algorithm::BERand => "BERand",
            Algorithm::Amaga => "Amaga",
            Algorithm::Ampga => "Ampga",
            Algorithm::Diktyoga => "Diktyoga",
            Algorithm::Mcssga => "Mcssga",
            Algorithm::Mtdp => "Mtdp",
        }
    }

    /// Acceptance probability of a random baseline, `None` for GA presets.
    pub fn random_acceptance(self) -> Option<f64> {
        match self {
            Algorithm::CompRand => Some(0.5),
            Algorithm::BERand => Some(0.7),
            _ => None,
        }
    }

    /// Fraction of total demand offered as capacity in experiments.
    pub fn capacity_ratio(self) -> f64 {
        match self {
            Algorithm::Mtdp => 0.65,
            _ => DEFAULT_CAPACITY_RATIO,
        }
    }

    /// Engine configuration of a GA preset, `None` for random baselines.
    ///
    /// Presets run their full generation budget: the stagnation threshold
    /// equals the generation count.
    pub fn engine_config(self) -> Option<EngineConfig> {
        use ObjectiveMode::*;
        let (pop, gens, pc, pm, elite, tour, w, mode) = match self {
            Algorithm::CompRand | Algorithm::BERand => return None,
            Algorithm::Amaga => (40, 40, 0.8, 0.01, 2, 3, 5.0, MaxPriority),
            Algorithm::Ampga => (50, 60, 0.9, 0.02, 4, 3, 6.0, PriorityLightPenalty),
            Algorithm::Diktyoga => (45, 60, 0.85, 0.015, 3, 3, 7.0, PriorityStrongPenalty),
            Algorithm::Mcssga => (60, 80, 0.9, 0.02, 4, 4, 8.0, MultiCriteria),
            Algorithm::Mtdp => (70, 100, 0.92, 0.015, 6, 5, 10.0, TemperatureAwarePower),
        };
        let encoding = if mode.requires_assignment() {
            Encoding::Assignment
        } else {
            Encoding::SelectionOnly
        };
        Some(
            EngineConfig::default()
                .with_population_size(pop)
                .with_iteration_count(gens)
                .with_stop_no_update_iteration(gens)
                .with_crossover_probability(pc)
                .with_mutation_probability(pm)
                .with_elite_count(elite)
                .with_tournament_size(tour)
                .with_penalty_weight(w)
                .with_objective(mode)
                .with_encoding(encoding)
                .with_crossover_type(CrossoverType::OnePoint),
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SchedulingError;

    /// Parses an algorithm name, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SchedulingError::Configuration(format!("unknown algorithm for experiment: {s}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Amaga".parse::<Algorithm>().unwrap(), Algorithm::Amaga);
        assert_eq!("berand".parse::<Algorithm>().unwrap(), Algorithm::BERand);
        assert_eq!("MTDP".parse::<Algorithm>().unwrap(), Algorithm::Mtdp);
        for a in Algorithm::ALL {
            assert_eq!(a.to_string().parse::<Algorithm>().unwrap(), a);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "Annealing".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, SchedulingError::Configuration(_)));
    }

    #[test]
    fn test_baselines_have_no_config() {
        assert!(Algorithm::CompRand.engine_config().is_none());
        assert_eq!(Algorithm::BERand.random_acceptance(), Some(0.7));
        assert_eq!(Algorithm::Amaga.random_acceptance(), None);
    }

    #[test]
    fn test_preset_values() {
        let c = Algorithm::Mcssga.engine_config().unwrap();
        assert_eq!(c.population_size, 60);
        assert_eq!(c.iteration_count, 80);
        assert_eq!(c.elite_count, 4);
        assert_eq!(c.tournament_size, 4);
        assert!((c.penalty_weight - 8.0).abs() < 1e-10);
        assert_eq!(c.objective, ObjectiveMode::MultiCriteria);
        assert_eq!(c.encoding, Encoding::SelectionOnly);

        let m = Algorithm::Mtdp.engine_config().unwrap();
        assert_eq!(m.encoding, Encoding::Assignment);
        assert!((m.crossover_probability - 0.92).abs() < 1e-10);
        assert!((Algorithm::Mtdp.capacity_ratio() - 0.65).abs() < 1e-10);
    }

    #[test]
    fn test_all_presets_validate() {
        for a in Algorithm::ALL {
            if let Some(config) = a.engine_config() {
                assert!(config.validate().is_ok(), "{a} preset invalid");
            }
        }
    }
}
