//! Engine configuration.
//!
//! [`EngineConfig`] holds every parameter of a search run: population and
//! generation budget, operator probabilities, stagnation stop, the objective
//! and its parameters, and the candidate encoding.
//!
//! # Defaults
//!
//! ```
//! use u_placement::ga::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.population_size, 50);
//! assert_eq!(config.iteration_count, 100);
//! assert_eq!(config.tournament_size, 2);
//! ```
//!
//! # Builder Pattern
//!
//! ```
//! use u_placement::ga::EngineConfig;
//! use u_placement::models::Encoding;
//! use u_placement::objective::ObjectiveMode;
//!
//! let config = EngineConfig::default()
//!     .with_population_size(70)
//!     .with_objective(ObjectiveMode::TemperatureAwarePower)
//!     .with_encoding(Encoding::Assignment)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```
//!
//! # File Loading
//!
//! Every field is optional in TOML; missing fields keep their defaults.
//!
//! ```
//! use u_placement::ga::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     population_size = 40
//!     objective = "multi_criteria"
//!     [power]
//!     reject_penalty = 1000.0
//! "#).unwrap();
//! assert_eq!(config.population_size, 40);
//! assert_eq!(config.power.reject_penalty, 1000.0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::operators::CrossoverType;
use crate::error::{Result, SchedulingError};
use crate::models::Encoding;
use crate::objective::{ObjectiveMode, ObjectiveParams, PowerModel};

/// Configuration for the placement search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of candidates per generation. Constant across the run.
    pub population_size: usize,

    /// Generations to run after the initial one.
    pub iteration_count: usize,

    /// Probability that a candidate enters the crossover pool (0.0–1.0).
    pub crossover_probability: f64,

    /// Per-gene probability of being redrawn (0.0–1.0).
    pub mutation_probability: f64,

    /// The run stops once this many consecutive generations fail to
    /// improve the best fitness (the counter must exceed it).
    pub stop_no_update_iteration: usize,

    /// Fitness objective.
    pub objective: ObjectiveMode,

    /// Candidate encoding.
    pub encoding: Encoding,

    /// Capacity-violation penalty weight for the priority objectives.
    pub penalty_weight: f64,

    /// Candidates drawn per tournament (2 = binary tournament).
    pub tournament_size: usize,

    /// Best candidates copied unchanged into the next generation.
    pub elite_count: usize,

    /// Gene exchange scheme.
    pub crossover_type: CrossoverType,

    /// Power model constants for [`ObjectiveMode::TemperatureAwarePower`].
    pub power: PowerModel,

    /// Mutate-then-repair attempts per candidate before giving up.
    pub max_repair_attempts: usize,

    /// Whether phases run on the rayon thread pool.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            iteration_count: 100,
            crossover_probability: 0.9,
            mutation_probability: 0.02,
            stop_no_update_iteration: 20,
            objective: ObjectiveMode::default(),
            encoding: Encoding::default(),
            penalty_weight: 5.0,
            tournament_size: 2,
            elite_count: 0,
            crossover_type: CrossoverType::default(),
            power: PowerModel::default(),
            max_repair_attempts: 1000,
            parallel: true,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations after the initial one.
    pub fn with_iteration_count(mut self, n: usize) -> Self {
        self.iteration_count = n;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the stagnation threshold.
    pub fn with_stop_no_update_iteration(mut self, n: usize) -> Self {
        self.stop_no_update_iteration = n;
        self
    }

    /// Sets the objective.
    pub fn with_objective(mut self, mode: ObjectiveMode) -> Self {
        self.objective = mode;
        self
    }

    /// Sets the encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the penalty weight.
    pub fn with_penalty_weight(mut self, w: f64) -> Self {
        self.penalty_weight = w;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, k: usize) -> Self {
        self.elite_count = k;
        self
    }

    /// Sets the crossover scheme.
    pub fn with_crossover_type(mut self, t: CrossoverType) -> Self {
        self.crossover_type = t;
        self
    }

    /// Sets the power model.
    pub fn with_power_model(mut self, model: PowerModel) -> Self {
        self.power = model;
        self
    }

    /// Sets the repair attempt bound.
    pub fn with_max_repair_attempts(mut self, n: usize) -> Self {
        self.max_repair_attempts = n;
        self
    }

    /// Enables or disables parallel phases.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parameters handed to the objective builder.
    pub fn objective_params(&self) -> ObjectiveParams {
        ObjectiveParams {
            penalty_weight: self.penalty_weight,
            power: self.power.clone(),
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`SchedulingError::Configuration`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SchedulingError::Configuration(msg));
        if self.population_size < 2 {
            return fail("population_size must be at least 2".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return fail(format!(
                "crossover_probability {} outside [0, 1]",
                self.crossover_probability
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return fail(format!(
                "mutation_probability {} outside [0, 1]",
                self.mutation_probability
            ));
        }
        if self.tournament_size < 2 || self.tournament_size > self.population_size {
            return fail(format!(
                "tournament_size {} must be in [2, population_size]",
                self.tournament_size
            ));
        }
        if self.elite_count >= self.population_size {
            return fail("elite_count fills the entire population".into());
        }
        if !self.penalty_weight.is_finite() || self.penalty_weight < 0.0 {
            return fail(format!("penalty_weight {} must be >= 0", self.penalty_weight));
        }
        if self.max_repair_attempts == 0 {
            return fail("max_repair_attempts must be at least 1".into());
        }
        if self.objective.requires_assignment() && !self.encoding.assigns_sites() {
            return fail(format!(
                "objective {} requires the assignment encoding",
                self.objective
            ));
        }
        Ok(())
    }
}
