//! Error types for placement scheduling.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while configuring or running the engine.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Unknown objective/algorithm name, invalid parameter, or an objective
    /// that the chosen encoding cannot express.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The catalog failed validation.
    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    /// The search completed zero generations, so there is no best candidate.
    #[error("no solution recorded")]
    NoSolutionRecorded,

    /// Best-fitness and best-candidate traces diverged in length.
    #[error("corrupted run state: {fitness_records} fitness vs {candidate_records} candidates")]
    CorruptedRunState {
        /// Length of the best-fitness trace.
        fitness_records: usize,
        /// Length of the best-candidate trace.
        candidate_records: usize,
    },

    /// Generation or mutation plus repair could not produce a feasible
    /// candidate within the configured number of attempts. Raised when no
    /// workload fits anywhere on its own.
    #[error("repair gave up after {attempts} attempts; input may be infeasible")]
    RepairLivenessRisk {
        /// Attempts made for the failing slot.
        attempts: usize,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map_or("-", |e| e.message.as_str())
}
