//! Genetic search over admission and placement decisions.
//!
//! A candidate carries one [`Gene`](crate::models::Gene) per workload. The
//! engine evolves a fixed-size population through crossover, mutation with
//! repair, and tournament selection, keeping the best-ever candidate.
//!
//! # Encoding
//!
//! - **SelectionOnly**: accept/reject per workload, checked against the
//!   aggregate capacity of all sites.
//! - **Assignment**: accept/reject plus a target site, checked per site.
//!
//! # Submodules
//!
//! - **config**: [`EngineConfig`] defaults, validation and TOML loading
//! - **engine**: [`SearchEngine`], the generational loop
//! - **state**: [`RunState`] best-ever records and [`EvolutionTrace`]
//! - [`operators`]: Runtime-selectable crossover and mutation
//! - [`generator`]: Random feasible candidates for generation 0
//! - [`repair`]: Restoring feasibility after mutation
//! - [`selection`]: Evaluation, elitism and tournament selection
//!
//! # Reference
//! - Holland (1975), "Adaptation in Natural and Artificial Systems"
//! - Chu & Beasley (1998), "A genetic algorithm for the multidimensional
//!   knapsack problem"

mod config;
mod engine;
pub mod generator;
pub mod operators;
pub mod repair;
pub mod selection;
mod solution;
mod state;

pub use config::EngineConfig;
pub use engine::SearchEngine;
pub use operators::{CrossoverType, GeneticOperators};
pub use solution::{AcceptedWorkload, RunReport, SelectionResult, Solution};
pub use state::{EvolutionTrace, RunState};
