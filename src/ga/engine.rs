//! The search loop.
//!
//! [`SearchEngine`] runs a generational GA over admission (and optionally
//! placement) decisions:
//!
//! ```text
//! INIT: generate + repair population → evaluate → select (generation 0)
//! for g in 1..=iteration_count:
//!     crossover → mutate + repair → evaluate → select
//!     stop if stagnation > stop_no_update_iteration
//! ```
//!
//! Every parallel phase draws one `u64` seed per slot from the run's master
//! RNG before fanning out, so a fixed seed gives the same result whether
//! the phases run on rayon or sequentially.
//!
//! # Example
//!
//! ```
//! use u_placement::ga::{EngineConfig, SearchEngine};
//! use u_placement::models::{Catalog, Site, Workload};
//!
//! let catalog = Catalog::new(
//!     vec![
//!         Workload::new("a").with_priority(5).with_cpu(2.0),
//!         Workload::new("b").with_priority(5).with_cpu(2.0),
//!         Workload::new("c").with_priority(5).with_cpu(2.0),
//!     ],
//!     vec![Site::new("s").with_cpu(4.0)],
//! );
//! let engine = SearchEngine::new(EngineConfig::default().with_seed(42)).unwrap();
//! let solution = engine.run(&catalog).unwrap();
//! assert_eq!(solution.accepted_ids().len(), 2);
//! ```

use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::EngineConfig;
use super::generator::initial_population;
use super::operators::GeneticOperators;
use super::repair::mutate_and_repair;
use super::selection::{evaluate_population, select};
use super::solution::{RunReport, Solution};
use super::state::RunState;
use crate::error::{Result, SchedulingError};
use crate::models::{Candidate, Catalog};
use crate::objective::{build_objective, Objective};
use crate::validation::validate_catalog;

/// Genetic search over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: EngineConfig,
    operators: GeneticOperators,
}

impl SearchEngine {
    /// Creates an engine.
    ///
    /// # Errors
    /// [`SchedulingError::Configuration`] if the configuration is invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let operators = GeneticOperators {
            crossover_type: config.crossover_type,
            mutation_probability: config.mutation_probability,
        };
        Ok(Self { config, operators })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a search, seeding from the configured seed or the OS.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidInput`] if the catalog fails validation
    /// - [`SchedulingError::NoSolutionRecorded`] if there are no workloads
    /// - [`SchedulingError::RepairLivenessRisk`] if repair cannot recover
    /// - [`SchedulingError::CorruptedRunState`] on inconsistent traces
    pub fn run(&self, catalog: &Catalog) -> Result<Solution> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.run_with_rng(catalog, &mut rng)
    }

    /// Runs a search with a caller-provided master RNG.
    pub fn run_with_rng<R: Rng>(&self, catalog: &Catalog, rng: &mut R) -> Result<Solution> {
        validate_catalog(catalog).map_err(SchedulingError::InvalidInput)?;
        let mut state = RunState::new();
        self.search(catalog, &mut state, rng)
    }

    fn search<R: Rng>(
        &self,
        catalog: &Catalog,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<Solution> {
        if catalog.workloads().is_empty() {
            return Err(SchedulingError::NoSolutionRecorded);
        }
        let config = &self.config;
        let objective = build_objective(
            config.objective,
            catalog,
            config.encoding,
            &config.objective_params(),
        )?;

        info!(
            objective = objective.name(),
            workloads = catalog.workloads().len(),
            sites = catalog.sites().len(),
            average_temperature = catalog.average_temperature(),
            population = config.population_size,
            "starting placement search"
        );

        let population = initial_population(
            catalog,
            config.encoding,
            config.population_size,
            config.max_repair_attempts,
            rng,
        )?;
        let mut population = self.selection_phase(population, objective.as_ref(), state, rng)?;

        let mut stopped_early = false;
        for generation in 1..=config.iteration_count {
            population = self.crossover_phase(population, catalog, rng);
            population = self.mutation_phase(population, catalog, rng)?;
            population = self.selection_phase(population, objective.as_ref(), state, rng)?;

            debug!(
                generation,
                best = state.best_fitness(),
                stagnation = state.stagnation(),
                "generation complete"
            );

            if state.stagnation() > config.stop_no_update_iteration {
                stopped_early = generation < config.iteration_count;
                break;
            }
        }

        let generations = state.generations();
        let (best, trace) = std::mem::take(state).into_parts();
        let candidate = best.ok_or(SchedulingError::NoSolutionRecorded)?;
        let fitness = trace
            .best_overall
            .last()
            .copied()
            .ok_or(SchedulingError::NoSolutionRecorded)?;

        info!(
            fitness,
            generations,
            stopped_early,
            accepted = candidate.enabled_count(config.encoding),
            "placement search finished"
        );

        Ok(Solution {
            candidate,
            fitness,
            report: RunReport {
                generations,
                stopped_early,
                trace,
                objective: config.objective,
                encoding: config.encoding,
            },
        })
    }

    fn selection_phase<R: Rng>(
        &self,
        mut population: Vec<Candidate>,
        objective: &dyn Objective,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<Vec<Candidate>> {
        evaluate_population(&mut population, objective, self.config.parallel);
        let generation = select(
            &population,
            self.config.tournament_size,
            self.config.elite_count,
            rng,
        )
        .ok_or(SchedulingError::NoSolutionRecorded)?;
        state.record_generation(generation.best_fitness, &generation.best)?;
        Ok(generation.next)
    }

    /// Pairs up a random subset and recombines each pair. Children come
    /// first in pair order, then unpaired candidates in index order.
    fn crossover_phase<R: Rng>(
        &self,
        population: Vec<Candidate>,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Vec<Candidate> {
        if catalog.workloads().len() <= 1 {
            return population;
        }
        let mut chosen: Vec<usize> = (0..population.len())
            .filter(|_| rng.random_bool(self.config.crossover_probability))
            .collect();
        chosen.shuffle(rng);

        let pairs: Vec<(usize, usize)> =
            chosen.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        let mut paired = vec![false; population.len()];
        for &(a, b) in &pairs {
            paired[a] = true;
            paired[b] = true;
        }

        let children = self.fork_join(pairs, rng, |(a, b), r| {
            self.operators.crossover(&population[a], &population[b], catalog, r)
        });

        let mut next = Vec::with_capacity(population.len());
        for (c1, c2) in children {
            next.push(c1);
            next.push(c2);
        }
        next.extend(
            population
                .into_iter()
                .zip(paired)
                .filter(|(_, p)| !p)
                .map(|(c, _)| c),
        );
        next
    }

    fn mutation_phase<R: Rng>(
        &self,
        population: Vec<Candidate>,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Vec<Candidate>> {
        let config = &self.config;
        self.fork_join(population, rng, |parent, r| {
            mutate_and_repair(
                &self.operators,
                &parent,
                catalog,
                config.encoding,
                config.max_repair_attempts,
                r,
            )
        })
        .into_iter()
        .collect()
    }

    /// Runs `f` once per item, each with its own RNG seeded from `rng`.
    /// Output order matches input order.
    fn fork_join<T, U, F, R>(&self, items: Vec<T>, rng: &mut R, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T, &mut SmallRng) -> U + Sync + Send,
        R: Rng,
    {
        let seeded: Vec<(T, u64)> = items
            .into_iter()
            .map(|t| (t, rng.random::<u64>()))
            .collect();
        if self.config.parallel {
            seeded
                .into_par_iter()
                .map(|(t, seed)| f(t, &mut SmallRng::seed_from_u64(seed)))
                .collect()
        } else {
            seeded
                .into_iter()
                .map(|(t, seed)| f(t, &mut SmallRng::seed_from_u64(seed)))
                .collect()
        }
    }
}
