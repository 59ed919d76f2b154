//! Per-run search state.
//!
//! [`RunState`] keeps the best-ever fitness and candidate per generation
//! plus the stagnation counter that drives early termination. Each run
//! owns its own state; nothing is shared across runs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::models::Candidate;

/// Fitness history of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionTrace {
    /// Best fitness within each generation's evaluated population.
    pub best_each_generation: Vec<f64>,
    /// Best fitness seen so far, after each generation. Non-decreasing.
    pub best_overall: Vec<f64>,
}

impl EvolutionTrace {
    /// Serializes the trace as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SchedulingError::Configuration(format!("trace export failed: {e}")))
    }

    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.best_overall.len()
    }

    /// Whether no generation was recorded.
    pub fn is_empty(&self) -> bool {
        self.best_overall.is_empty()
    }
}

/// Mutable state of one search run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    trace: EvolutionTrace,
    best_candidate_records: Vec<Candidate>,
    stagnation: usize,
}

impl RunState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one generation's best.
    ///
    /// The first generation seeds the best-ever record. Later generations
    /// replace it only on a strict improvement, which also resets the
    /// stagnation counter; anything else increments it.
    ///
    /// # Errors
    /// [`SchedulingError::CorruptedRunState`] if the fitness and candidate
    /// records disagree in length.
    pub fn record_generation(&mut self, fitness: f64, candidate: &Candidate) -> Result<()> {
        let fitness_records = self.trace.best_overall.len();
        let candidate_records = self.best_candidate_records.len();
        if fitness_records != candidate_records {
            return Err(SchedulingError::CorruptedRunState {
                fitness_records,
                candidate_records,
            });
        }

        self.trace.best_each_generation.push(fitness);
        match self.best_fitness() {
            Some(best) if fitness <= best => {
                let kept = self.best_candidate_records[candidate_records - 1].clone();
                self.trace.best_overall.push(best);
                self.best_candidate_records.push(kept);
                self.stagnation += 1;
            }
            _ => {
                self.trace.best_overall.push(fitness);
                self.best_candidate_records.push(candidate.clone());
                self.stagnation = 0;
            }
        }
        Ok(())
    }

    /// Best fitness so far.
    pub fn best_fitness(&self) -> Option<f64> {
        self.trace.best_overall.last().copied()
    }

    /// Best candidate so far.
    pub fn best_candidate(&self) -> Option<&Candidate> {
        self.best_candidate_records.last()
    }

    /// Consecutive generations without strict improvement.
    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    /// Generations recorded.
    pub fn generations(&self) -> usize {
        self.trace.len()
    }

    /// The fitness trace.
    pub fn trace(&self) -> &EvolutionTrace {
        &self.trace
    }

    /// Consumes the state into its best candidate and trace.
    pub fn into_parts(mut self) -> (Option<Candidate>, EvolutionTrace) {
        (self.best_candidate_records.pop(), self.trace)
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self) {
        self.best_candidate_records.push(Candidate::new());
    }
}
