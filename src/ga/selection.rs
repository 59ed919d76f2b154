//! Fitness evaluation and parent selection.
//!
//! Evaluation fills every candidate's cached fitness, in parallel when
//! requested. Selection then builds the next generation: optional elites
//! first, remaining slots by k-way tournament.
//!
//! # Reference
//! Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes Used
//! in Genetic Algorithms"

use rand::Rng;
use rand::seq::index::sample;
use rayon::prelude::*;

use crate::models::Candidate;
use crate::objective::Objective;

/// Result of one selection phase.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The next population, same size as the evaluated one.
    pub next: Vec<Candidate>,
    /// Best fitness in the evaluated population.
    pub best_fitness: f64,
    /// Candidate that scored `best_fitness`.
    pub best: Candidate,
}

/// Evaluates every candidate that has no cached fitness.
pub fn evaluate_population(
    population: &mut [Candidate],
    objective: &dyn Objective,
    parallel: bool,
) {
    if parallel {
        population.par_iter_mut().for_each(|c| {
            c.fitness_or_eval(|c| objective.evaluate(c));
        });
    } else {
        for c in population.iter_mut() {
            c.fitness_or_eval(|c| objective.evaluate(c));
        }
    }
}

fn score(c: &Candidate) -> f64 {
    c.fitness().unwrap_or(f64::NEG_INFINITY)
}

/// Index and fitness of the fittest candidate; ties keep the lowest index.
pub fn best_index(population: &[Candidate]) -> Option<(usize, f64)> {
    population
        .iter()
        .enumerate()
        .map(|(i, c)| (i, score(c)))
        .fold(None, |best, (i, f)| match best {
            Some((_, bf)) if bf >= f => best,
            _ => Some((i, f)),
        })
}

/// Draws `k` distinct candidates and returns the index of the fittest.
pub fn tournament<R: Rng>(population: &[Candidate], k: usize, rng: &mut R) -> usize {
    if population.is_empty() {
        return 0;
    }
    let k = k.clamp(1, population.len());
    sample(rng, population.len(), k)
        .iter()
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if score(&population[b]) >= score(&population[i]) => Some(b),
            _ => Some(i),
        })
        .unwrap_or(0)
}

/// Indices of the `count` fittest candidates, best first.
pub fn elite_indices(population: &[Candidate], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| score(&population[b]).total_cmp(&score(&population[a])));
    order.truncate(count);
    order
}

/// Builds the next generation from an evaluated population.
///
/// Returns `None` for an empty population.
pub fn select<R: Rng>(
    population: &[Candidate],
    tournament_size: usize,
    elite_count: usize,
    rng: &mut R,
) -> Option<Generation> {
    let (best_idx, best_fitness) = best_index(population)?;
    let mut next = Vec::with_capacity(population.len());
    for i in elite_indices(population, elite_count.min(population.len())) {
        next.push(population[i].clone());
    }
    while next.len() < population.len() {
        let winner = tournament(population, tournament_size, rng);
        next.push(population[winner].clone());
    }
    Some(Generation {
        next,
        best_fitness,
        best: population[best_idx].clone(),
    })
}
