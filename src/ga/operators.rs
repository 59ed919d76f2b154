//! Crossover and mutation operators.
//!
//! Provides runtime-selectable gene exchange via [`GeneticOperators`].
//! Cut points are taken over catalog workload order, so a segment of genes
//! always refers to the same workloads in both parents.
//!
//! # Usage
//!
//! ```
//! use u_placement::ga::operators::{CrossoverType, GeneticOperators};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Random);
//! ```

use rand::Rng;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::models::{Candidate, Catalog, Encoding, Gene, Workload};

/// Gene exchange scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// Swap every gene after one cut point.
    OnePoint,
    /// Swap the genes between two cut points.
    TwoPoint,
    /// Choose one- or two-point per pair with equal probability.
    #[default]
    Random,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Crossover scheme.
    pub crossover_type: CrossoverType,
    /// Per-gene mutation probability.
    pub mutation_probability: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::Random,
            mutation_probability: 0.02,
        }
    }
}

impl GeneticOperators {
    /// Recombines two parents with the configured scheme.
    ///
    /// Parents are left untouched; children carry no cached fitness.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Candidate,
        p2: &Candidate,
        catalog: &Catalog,
        rng: &mut R,
    ) -> (Candidate, Candidate) {
        let two_point = match self.crossover_type {
            CrossoverType::OnePoint => false,
            CrossoverType::TwoPoint => true,
            CrossoverType::Random => rng.random_bool(0.5),
        };
        if two_point {
            two_point_crossover(p1, p2, catalog, rng)
        } else {
            one_point_crossover(p1, p2, catalog, rng)
        }
    }

    /// Redraws each gene with the mutation probability; other genes are
    /// cloned. Workloads missing from `candidate` always get a fresh gene.
    pub fn mutate<R: Rng>(
        &self,
        candidate: &Candidate,
        catalog: &Catalog,
        encoding: Encoding,
        rng: &mut R,
    ) -> Candidate {
        let mut out = Candidate::new();
        for w in catalog.workloads() {
            let gene = match candidate.gene(&w.id) {
                Some(g) if !rng.random_bool(self.mutation_probability) => g.clone(),
                prior => random_gene(w, prior, catalog, encoding, rng),
            };
            out.set_gene(w.id.clone(), gene);
        }
        out
    }
}

/// One-point crossover: genes at catalog positions `[cut, n)` are swapped,
/// with `cut` drawn from `[1, n − 1]`.
///
/// With fewer than two workloads the children are copies of the parents.
pub fn one_point_crossover<R: Rng>(
    p1: &Candidate,
    p2: &Candidate,
    catalog: &Catalog,
    rng: &mut R,
) -> (Candidate, Candidate) {
    let n = catalog.workloads().len();
    if n < 2 {
        return (p1.clone(), p2.clone());
    }
    let cut = rng.random_range(1..n);
    swap_segment(p1, p2, catalog, cut, n)
}

/// Two-point crossover: genes at catalog positions `[a, b)` are swapped,
/// with `1 <= a < b <= n`.
pub fn two_point_crossover<R: Rng>(
    p1: &Candidate,
    p2: &Candidate,
    catalog: &Catalog,
    rng: &mut R,
) -> (Candidate, Candidate) {
    let n = catalog.workloads().len();
    if n < 2 {
        return (p1.clone(), p2.clone());
    }
    let a = rng.random_range(1..n);
    let b = rng.random_range(a + 1..=n);
    swap_segment(p1, p2, catalog, a, b)
}

fn swap_segment(
    p1: &Candidate,
    p2: &Candidate,
    catalog: &Catalog,
    from: usize,
    to: usize,
) -> (Candidate, Candidate) {
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    for w in &catalog.workloads()[from..to] {
        let g1 = p1.gene(&w.id).cloned().unwrap_or_default();
        let g2 = p2.gene(&w.id).cloned().unwrap_or_default();
        c1.set_gene(w.id.clone(), g2);
        c2.set_gene(w.id.clone(), g1);
    }
    (c1, c2)
}

/// Draws a fresh decision for `workload`.
///
/// Accepts with probability 0.5. Under [`Encoding::Assignment`] an accepted
/// gene is placed on a uniformly chosen site, excluding the prior target when
/// the prior gene was accepted (unless that leaves no site).
pub fn random_gene<R: Rng>(
    workload: &Workload,
    prior: Option<&Gene>,
    catalog: &Catalog,
    encoding: Encoding,
    rng: &mut R,
) -> Gene {
    if !rng.random_bool(0.5) {
        return Gene::rejected();
    }
    match encoding {
        Encoding::SelectionOnly => Gene::accepted(),
        Encoding::Assignment => {
            let previous = prior.filter(|g| g.accepted).and_then(|g| g.target_site());
            let others: Vec<&str> = catalog
                .sites()
                .iter()
                .map(|s| s.id.as_str())
                .filter(|id| Some(*id) != previous)
                .collect();
            let pool: Vec<&str> = if others.is_empty() {
                catalog.sites().iter().map(|s| s.id.as_str()).collect()
            } else {
                others
            };
            match pool.choose(rng) {
                Some(site) => Gene::placed(*site).with_allocated_cpu(workload.demand.cpu),
                None => Gene::rejected(),
            }
        }
    }
}
