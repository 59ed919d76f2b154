//! Candidate (chromosome) encoding.
//!
//! A [`Candidate`] maps every workload id to a [`Gene`]: the admission
//! decision for that workload and, under the [`Encoding::Assignment`]
//! encoding, the site it is placed on.
//!
//! Fitness is cached on the candidate once computed but is not part of its
//! identity: two candidates with the same genes compare equal whatever
//! their cached fitness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much of the decision a candidate encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Accept/reject only; feasibility is checked against the aggregate
    /// capacity of all sites.
    #[default]
    SelectionOnly,
    /// Accept/reject plus a target site; feasibility is checked per site.
    Assignment,
}

impl Encoding {
    /// Whether accepted genes must name a target site.
    pub fn assigns_sites(self) -> bool {
        matches!(self, Encoding::Assignment)
    }
}

/// Per-workload decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Whether the workload is admitted.
    pub accepted: bool,
    /// Target site (assignment encoding only).
    pub site: Option<String>,
    /// CPU actually granted, overriding the workload's demand.
    pub allocated_cpu: Option<f64>,
}

impl Gene {
    /// A rejected gene.
    pub fn rejected() -> Self {
        Self::default()
    }

    /// An accepted gene without a site.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            ..Self::default()
        }
    }

    /// An accepted gene placed on `site`.
    pub fn placed(site: impl Into<String>) -> Self {
        Self {
            accepted: true,
            site: Some(site.into()),
            allocated_cpu: None,
        }
    }

    /// Sets the allocated cpu override.
    pub fn with_allocated_cpu(mut self, cpu: f64) -> Self {
        self.allocated_cpu = Some(cpu);
        self
    }

    /// The target site, treating an empty id as no site.
    pub fn target_site(&self) -> Option<&str> {
        self.site.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether this gene consumes capacity under `encoding`.
    ///
    /// Under [`Encoding::Assignment`] an accepted gene without a target site
    /// does not run anywhere and therefore counts as not enabled.
    pub fn is_enabled(&self, encoding: Encoding) -> bool {
        match encoding {
            Encoding::SelectionOnly => self.accepted,
            Encoding::Assignment => self.accepted && self.target_site().is_some(),
        }
    }
}

/// A complete trial decision set: one gene per workload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    genes: BTreeMap<String, Gene>,
    #[serde(skip)]
    fitness: Option<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes
    }
}

impl Candidate {
    /// Creates an empty candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a candidate from `(workload_id, gene)` pairs.
    pub fn from_genes<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = (S, Gene)>,
        S: Into<String>,
    {
        Self {
            genes: genes.into_iter().map(|(id, g)| (id.into(), g)).collect(),
            fitness: None,
        }
    }

    /// Sets the gene of a workload, invalidating the cached fitness.
    pub fn set_gene(&mut self, workload_id: impl Into<String>, gene: Gene) {
        self.genes.insert(workload_id.into(), gene);
        self.fitness = None;
    }

    /// Gene of a workload.
    pub fn gene(&self, workload_id: &str) -> Option<&Gene> {
        self.genes.get(workload_id)
    }

    /// Mutable gene of a workload, invalidating the cached fitness.
    pub fn gene_mut(&mut self, workload_id: &str) -> Option<&mut Gene> {
        self.fitness = None;
        self.genes.get_mut(workload_id)
    }

    /// Iterates `(workload_id, gene)` in id order.
    pub fn genes(&self) -> impl Iterator<Item = (&str, &Gene)> {
        self.genes.iter().map(|(id, g)| (id.as_str(), g))
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the candidate has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Ids of workloads whose gene is enabled under `encoding`.
    pub fn enabled_ids(&self, encoding: Encoding) -> Vec<&str> {
        self.genes()
            .filter(|(_, g)| g.is_enabled(encoding))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of enabled genes under `encoding`.
    pub fn enabled_count(&self, encoding: Encoding) -> usize {
        self.genes.values().filter(|g| g.is_enabled(encoding)).count()
    }

    /// Cached fitness, if evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Stores a computed fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Returns the cached fitness, computing and caching it on first use.
    pub fn fitness_or_eval(&mut self, eval: impl FnOnce(&Candidate) -> f64) -> f64 {
        match self.fitness {
            Some(f) => f,
            None => {
                let f = eval(self);
                self.fitness = Some(f);
                f
            }
        }
    }
}
