//! Candidate repair.
//!
//! Mutation can leave a candidate empty or over capacity. [`repair`] pulls
//! it back: an empty candidate gets one fitting workload force-enabled, an
//! over-capacity one sheds random enabled workloads until it fits. When the
//! last enabled workload does not fit on its own it is swapped for one
//! that does.
//! [`mutate_and_repair`] retries the pair a bounded number of times.

use rand::Rng;
use rand::prelude::IndexedRandom;
use tracing::warn;

use super::operators::GeneticOperators;
use crate::error::{Result, SchedulingError};
use crate::models::{Candidate, Catalog, Encoding, Gene, Workload};

/// Repairs `candidate` in place.
///
/// Returns `true` when the result is complete, feasible and accepts at
/// least one workload.
pub fn repair<R: Rng>(
    candidate: &mut Candidate,
    catalog: &Catalog,
    encoding: Encoding,
    rng: &mut R,
) -> bool {
    if encoding.assigns_sites() {
        normalize_sites(candidate, catalog);
    }

    if candidate.enabled_count(encoding) == 0 {
        force_enable(candidate, catalog, encoding, rng);
    }

    while !catalog.is_feasible(candidate, encoding) {
        let pool = shedding_pool(candidate, catalog, encoding);
        let Some(id) = pool.choose(rng).cloned() else {
            break;
        };
        let Some(previous) = candidate.gene(&id).cloned() else {
            break;
        };
        candidate.set_gene(id.clone(), Gene::rejected());
        if candidate.enabled_count(encoding) == 0 {
            force_enable(candidate, catalog, encoding, rng);
            if candidate.enabled_count(encoding) == 0 {
                candidate.set_gene(id, previous);
            }
            break;
        }
    }

    catalog.is_complete(candidate)
        && candidate.enabled_count(encoding) > 0
        && catalog.is_feasible(candidate, encoding)
}

/// Mutates `parent` and repairs the result, retrying up to `max_attempts`
/// times.
///
/// # Errors
/// [`SchedulingError::RepairLivenessRisk`] when no attempt produced a
/// usable candidate.
pub fn mutate_and_repair<R: Rng>(
    operators: &GeneticOperators,
    parent: &Candidate,
    catalog: &Catalog,
    encoding: Encoding,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Candidate> {
    for _ in 0..max_attempts {
        let mut child = operators.mutate(parent, catalog, encoding, rng);
        if repair(&mut child, catalog, encoding, rng) {
            return Ok(child);
        }
    }
    warn!(attempts = max_attempts, "repair exhausted its attempts");
    Err(SchedulingError::RepairLivenessRisk {
        attempts: max_attempts,
    })
}

/// Rejects accepted genes whose site is missing or unknown.
fn normalize_sites(candidate: &mut Candidate, catalog: &Catalog) {
    let stray: Vec<String> = candidate
        .genes()
        .filter(|(_, g)| {
            g.accepted && !g.target_site().is_some_and(|s| catalog.site(s).is_some())
        })
        .map(|(id, _)| id.to_string())
        .collect();
    for id in stray {
        candidate.set_gene(id, Gene::rejected());
    }
}

/// Turns on one random workload that fits on its own. Leaves the candidate
/// untouched when none does.
fn force_enable<R: Rng>(
    candidate: &mut Candidate,
    catalog: &Catalog,
    encoding: Encoding,
    rng: &mut R,
) {
    let capacity = catalog.aggregate_capacity();
    let fitting: Vec<&Workload> = catalog
        .workloads()
        .iter()
        .filter(|w| match encoding {
            Encoding::SelectionOnly => w.demand.fits_within(&capacity),
            Encoding::Assignment => catalog.fits_somewhere(w),
        })
        .collect();
    let Some(w) = fitting.choose(rng) else {
        return;
    };
    let gene = match encoding {
        Encoding::SelectionOnly => Gene::accepted(),
        Encoding::Assignment => {
            let sites: Vec<&str> = catalog
                .sites()
                .iter()
                .filter(|s| w.demand.fits_within(&s.capacity))
                .map(|s| s.id.as_str())
                .collect();
            match sites.choose(rng) {
                Some(site) => Gene::placed(*site).with_allocated_cpu(w.demand.cpu),
                None => return,
            }
        }
    };
    candidate.set_gene(w.id.clone(), gene);
}

/// Enabled workload ids that may be shed to restore feasibility.
fn shedding_pool(candidate: &Candidate, catalog: &Catalog, encoding: Encoding) -> Vec<String> {
    match encoding {
        Encoding::SelectionOnly => candidate
            .enabled_ids(encoding)
            .into_iter()
            .map(str::to_string)
            .collect(),
        Encoding::Assignment => {
            let usage = catalog.site_usage(candidate);
            let overloaded: Vec<&str> = catalog
                .sites()
                .iter()
                .zip(&usage)
                .filter(|(site, used)| !used.fits_within(&site.capacity))
                .map(|(site, _)| site.id.as_str())
                .collect();
            candidate
                .genes()
                .filter(|(_, g)| g.is_enabled(encoding))
                .filter(|(_, g)| g.target_site().is_some_and(|s| overloaded.contains(&s)))
                .map(|(id, _)| id.to_string())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::operators::CrossoverType;
    use crate::models::{Site, Workload};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Workload::new("a").with_priority(5).with_cpu(2.0),
                Workload::new("b").with_priority(5).with_cpu(2.0),
                Workload::new("c").with_priority(5).with_cpu(2.0),
            ],
            vec![Site::new("s1").with_cpu(2.0), Site::new("s2").with_cpu(2.0)],
        )
    }

    #[test]
    fn test_feasible_candidate_unchanged() {
        let cat = catalog();
        let mut c = Candidate::from_genes([
            ("a", Gene::placed("s1")),
            ("b", Gene::placed("s2")),
            ("c", Gene::rejected()),
        ]);
        let before = c.clone();
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(repair(&mut c, &cat, Encoding::Assignment, &mut rng));
        assert_eq!(c, before);
    }

    #[test]
    fn test_empty_gets_one_enabled() {
        let cat = catalog();
        let mut c = Candidate::from_genes([
            ("a", Gene::rejected()),
            ("b", Gene::rejected()),
            ("c", Gene::rejected()),
        ]);
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(repair(&mut c, &cat, Encoding::Assignment, &mut rng));
        assert_eq!(c.enabled_count(Encoding::Assignment), 1);
    }

    #[test]
    fn test_over_capacity_sheds_on_overloaded_site_only() {
        let cat = catalog();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut c = Candidate::from_genes([
                ("a", Gene::placed("s1")),
                ("b", Gene::placed("s1")),
                ("c", Gene::placed("s2")),
            ]);
            assert!(repair(&mut c, &cat, Encoding::Assignment, &mut rng));
            assert!(c.gene("c").unwrap().accepted);
            assert_eq!(c.enabled_count(Encoding::Assignment), 2);
        }
    }

    #[test]
    fn test_selection_only_sheds_to_aggregate() {
        let cat = catalog();
        let mut c = Candidate::from_genes([
            ("a", Gene::accepted()),
            ("b", Gene::accepted()),
            ("c", Gene::accepted()),
        ]);
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(repair(&mut c, &cat, Encoding::SelectionOnly, &mut rng));
        assert_eq!(c.enabled_count(Encoding::SelectionOnly), 2);
    }

    #[test]
    fn test_unknown_site_is_rejected() {
        let cat = catalog();
        let mut c = Candidate::from_genes([
            ("a", Gene::placed("nowhere")),
            ("b", Gene::placed("s1")),
            ("c", Gene::rejected()),
        ]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(repair(&mut c, &cat, Encoding::Assignment, &mut rng));
        assert!(!c.gene("a").unwrap().accepted);
    }

    #[test]
    fn test_last_gene_kept_when_nothing_fits() {
        let cat = Catalog::new(
            vec![Workload::new("big").with_cpu(10.0)],
            vec![Site::new("s").with_cpu(1.0)],
        );
        let mut c = Candidate::from_genes([("big", Gene::placed("s"))]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(!repair(&mut c, &cat, Encoding::Assignment, &mut rng));
        assert!(c.gene("big").unwrap().accepted);
    }

    #[test]
    fn test_empty_enables_only_fitting_workload() {
        let cat = Catalog::new(
            vec![
                Workload::new("big").with_priority(10).with_cpu(4.2),
                Workload::new("small").with_priority(1).with_cpu(1.0),
            ],
            vec![Site::new("s").with_cpu(4.0)],
        );
        let mut rng = SmallRng::seed_from_u64(5);
        for encoding in [Encoding::SelectionOnly, Encoding::Assignment] {
            for _ in 0..20 {
                let mut c = Candidate::from_genes([
                    ("big", Gene::rejected()),
                    ("small", Gene::rejected()),
                ]);
                assert!(repair(&mut c, &cat, encoding, &mut rng));
                assert_eq!(c.enabled_ids(encoding), vec!["small"]);
            }
        }
    }

    #[test]
    fn test_empty_stays_empty_when_nothing_fits() {
        let cat = Catalog::new(
            vec![Workload::new("big").with_cpu(10.0)],
            vec![Site::new("s").with_cpu(1.0)],
        );
        let mut c = Candidate::from_genes([("big", Gene::rejected())]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(!repair(&mut c, &cat, Encoding::Assignment, &mut rng));
        assert_eq!(c.enabled_count(Encoding::Assignment), 0);
    }

    #[test]
    fn test_oversized_last_gene_swapped_for_fitting_one() {
        let cat = Catalog::new(
            vec![
                Workload::new("big").with_priority(10).with_cpu(4.2),
                Workload::new("small").with_priority(1).with_cpu(1.0),
            ],
            vec![Site::new("s").with_cpu(4.0)],
        );
        let mut rng = SmallRng::seed_from_u64(9);
        let mut c = Candidate::from_genes([
            ("big", Gene::accepted()),
            ("small", Gene::rejected()),
        ]);
        assert!(repair(&mut c, &cat, Encoding::SelectionOnly, &mut rng));
        assert_eq!(c.enabled_ids(Encoding::SelectionOnly), vec!["small"]);
    }

    #[test]
    fn test_incomplete_candidate_fails() {
        let cat = catalog();
        let mut c = Candidate::from_genes([("a", Gene::placed("s1"))]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(!repair(&mut c, &cat, Encoding::Assignment, &mut rng));
    }

    #[test]
    fn test_mutate_and_repair_feasible() {
        let cat = catalog();
        let ops = GeneticOperators {
            crossover_type: CrossoverType::Random,
            mutation_probability: 0.5,
        };
        let parent = Candidate::from_genes([
            ("a", Gene::placed("s1")),
            ("b", Gene::placed("s2")),
            ("c", Gene::rejected()),
        ]);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let child =
                mutate_and_repair(&ops, &parent, &cat, Encoding::Assignment, 100, &mut rng)
                    .unwrap();
            assert!(cat.is_feasible(&child, Encoding::Assignment));
            assert!(child.enabled_count(Encoding::Assignment) >= 1);
        }
    }

    #[test]
    fn test_liveness_bound() {
        let cat = Catalog::new(
            vec![Workload::new("big").with_cpu(10.0)],
            vec![Site::new("s").with_cpu(1.0)],
        );
        let parent = Candidate::from_genes([("big", Gene::placed("s"))]);
        let mut rng = SmallRng::seed_from_u64(42);
        let err = mutate_and_repair(
            &GeneticOperators::default(),
            &parent,
            &cat,
            Encoding::Assignment,
            25,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulingError::RepairLivenessRisk { attempts: 25 }));
    }
}
