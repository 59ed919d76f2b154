//! Initial population.
//!
//! Candidates are built greedily from a random permutation of the
//! workloads: each is tried with probability 0.5 and kept only if it still
//! fits. When nothing was kept, one workload that fits on its own is
//! turned on. Every candidate entering generation 0 then passes
//! [`repair`], so the population is complete, feasible and accepts at least
//! one workload.

use rand::Rng;
use rand::prelude::{IndexedRandom, SliceRandom};
use tracing::warn;

use super::repair::repair;
use crate::error::{Result, SchedulingError};
use crate::models::{Candidate, Catalog, Encoding, Gene, Resources};

/// Builds one random capacity-respecting candidate.
///
/// The candidate is empty when no single workload fits.
pub fn random_candidate<R: Rng>(catalog: &Catalog, encoding: Encoding, rng: &mut R) -> Candidate {
    let workloads = catalog.workloads();
    let mut order: Vec<usize> = (0..workloads.len()).collect();
    order.shuffle(rng);

    let mut candidate =
        Candidate::from_genes(workloads.iter().map(|w| (w.id.clone(), Gene::rejected())));
    let capacity = catalog.aggregate_capacity();
    let mut total = Resources::default();
    let mut site_used = vec![Resources::default(); catalog.sites().len()];
    let mut any = false;

    for &i in &order {
        if !rng.random_bool(0.5) {
            continue;
        }
        let w = &workloads[i];
        match encoding {
            Encoding::SelectionOnly => {
                if (total + w.demand).fits_within(&capacity) {
                    total += w.demand;
                    candidate.set_gene(w.id.clone(), Gene::accepted());
                    any = true;
                }
            }
            Encoding::Assignment => {
                let sites = catalog.sites();
                let room: Vec<usize> = (0..site_used.len())
                    .filter(|&s| (site_used[s] + w.demand).fits_within(&sites[s].capacity))
                    .collect();
                if let Some(&s) = room.choose(rng) {
                    site_used[s] += w.demand;
                    let gene = Gene::placed(sites[s].id.clone())
                        .with_allocated_cpu(w.demand.cpu);
                    candidate.set_gene(w.id.clone(), gene);
                    any = true;
                }
            }
        }
    }

    if !any {
        let fallback = order.iter().map(|&i| &workloads[i]).find(|w| match encoding {
            Encoding::SelectionOnly => w.demand.fits_within(&capacity),
            Encoding::Assignment => catalog.fits_somewhere(w),
        });
        if let Some(w) = fallback {
            let gene = match encoding {
                Encoding::SelectionOnly => Some(Gene::accepted()),
                Encoding::Assignment => {
                    let fitting: Vec<&str> = catalog
                        .sites()
                        .iter()
                        .filter(|s| w.demand.fits_within(&s.capacity))
                        .map(|s| s.id.as_str())
                        .collect();
                    fitting
                        .choose(rng)
                        .map(|site| Gene::placed(*site).with_allocated_cpu(w.demand.cpu))
                }
            };
            if let Some(gene) = gene {
                candidate.set_gene(w.id.clone(), gene);
            }
        }
    }
    candidate
}

/// Builds a random candidate that passes [`repair`], retrying up to
/// `max_attempts` times.
///
/// # Errors
/// [`SchedulingError::RepairLivenessRisk`] when no attempt was usable,
/// which happens when no workload fits anywhere.
pub fn feasible_candidate<R: Rng>(
    catalog: &Catalog,
    encoding: Encoding,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Candidate> {
    for _ in 0..max_attempts {
        let mut candidate = random_candidate(catalog, encoding, rng);
        if repair(&mut candidate, catalog, encoding, rng) {
            return Ok(candidate);
        }
    }
    warn!(attempts = max_attempts, "no feasible initial candidate");
    Err(SchedulingError::RepairLivenessRisk {
        attempts: max_attempts,
    })
}

/// Builds `size` feasible random candidates.
///
/// # Errors
/// [`SchedulingError::RepairLivenessRisk`] as for [`feasible_candidate`].
pub fn initial_population<R: Rng>(
    catalog: &Catalog,
    encoding: Encoding,
    size: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<Candidate>> {
    (0..size)
        .map(|_| feasible_candidate(catalog, encoding, max_attempts, rng))
        .collect()
}
