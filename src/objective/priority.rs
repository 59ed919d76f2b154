//! Priority-driven objectives.
//!
//! All four share the same measurements: the summed priority of enabled
//! workloads and the usage ratios of their aggregate demand against the
//! aggregate capacity. They differ in how a feasible candidate is rewarded
//! and where the infeasibility penalty starts.

use super::Objective;
use crate::models::{Candidate, Catalog, Encoding, MAX_PRIORITY};

/// Measurements shared by the priority objectives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityUsage {
    /// Summed priority of enabled workloads.
    pub sum_priority: f64,
    /// CPU usage over aggregate capacity.
    pub cpu_ratio: f64,
    /// Memory usage over aggregate capacity.
    pub memory_ratio: f64,
    /// Storage usage over aggregate capacity.
    pub storage_ratio: f64,
}

impl PriorityUsage {
    /// Measures a candidate.
    pub fn measure(catalog: &Catalog, encoding: Encoding, candidate: &Candidate) -> Self {
        let sum_priority: f64 = catalog
            .workloads()
            .iter()
            .filter(|w| candidate.gene(&w.id).is_some_and(|g| g.is_enabled(encoding)))
            .map(|w| w.priority as f64)
            .sum();
        let used = catalog.enabled_demand(candidate, encoding);
        let (cpu_ratio, memory_ratio, storage_ratio) = used.ratios(&catalog.aggregate_capacity());
        Self {
            sum_priority,
            cpu_ratio,
            memory_ratio,
            storage_ratio,
        }
    }

    /// Largest of the three ratios.
    pub fn max_ratio(&self) -> f64 {
        self.cpu_ratio.max(self.memory_ratio).max(self.storage_ratio)
    }

    /// Sum of pairwise absolute differences between the ratios.
    pub fn imbalance(&self) -> f64 {
        (self.cpu_ratio - self.memory_ratio).abs()
            + (self.cpu_ratio - self.storage_ratio).abs()
            + (self.memory_ratio - self.storage_ratio).abs()
    }

    /// `sumP − weight·sumP·(maxRatio − offset)`.
    fn penalized(&self, weight: f64, offset: f64) -> f64 {
        self.sum_priority - weight * self.sum_priority * (self.max_ratio() - offset)
    }
}

macro_rules! priority_objective {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<'a> {
            catalog: &'a Catalog,
            encoding: Encoding,
            penalty_weight: f64,
        }

        impl<'a> $name<'a> {
            /// Creates the objective over `catalog`.
            pub fn new(catalog: &'a Catalog, encoding: Encoding, penalty_weight: f64) -> Self {
                Self {
                    catalog,
                    encoding,
                    penalty_weight,
                }
            }
        }

        impl Objective for $name<'_> {
            fn evaluate(&self, candidate: &Candidate) -> f64 {
                let usage = PriorityUsage::measure(self.catalog, self.encoding, candidate);
                if usage.sum_priority == 0.0 {
                    return 0.0;
                }
                self.score(&usage)
            }

            fn name(&self) -> &'static str {
                $label
            }
        }
    };
}

priority_objective!(
    /// Summed priority; linear penalty past full capacity.
    MaxPriority,
    "max_priority"
);

priority_objective!(
    /// Priority scaled by `0.8 + 0.2·maxRatio` when feasible.
    PriorityLightPenalty,
    "priority_light_penalty"
);

priority_objective!(
    /// Priority scaled by `0.7 + 0.3·maxRatio` when feasible; penalty
    /// measured from 1.5× capacity.
    PriorityStrongPenalty,
    "priority_strong_penalty"
);

priority_objective!(
    /// `0.6·priorityNorm + 0.3·slack − 0.1·imbalance` when feasible;
    /// penalty measured from 1.2× capacity.
    MultiCriteria,
    "multi_criteria"
);

impl MaxPriority<'_> {
    fn score(&self, u: &PriorityUsage) -> f64 {
        if u.max_ratio() <= 1.0 {
            u.sum_priority
        } else {
            u.penalized(self.penalty_weight, 1.0)
        }
    }
}

impl PriorityLightPenalty<'_> {
    fn score(&self, u: &PriorityUsage) -> f64 {
        let r = u.max_ratio();
        if r <= 1.0 {
            u.sum_priority * (0.8 + 0.2 * r)
        } else {
            u.penalized(self.penalty_weight, 1.0)
        }
    }
}

impl PriorityStrongPenalty<'_> {
    fn score(&self, u: &PriorityUsage) -> f64 {
        let r = u.max_ratio();
        if r <= 1.0 {
            u.sum_priority * (0.7 + 0.3 * r)
        } else {
            u.penalized(self.penalty_weight, 1.5)
        }
    }
}

impl MultiCriteria<'_> {
    const W_PRIORITY: f64 = 0.6;
    const W_SLACK: f64 = 0.3;
    const W_IMBALANCE: f64 = 0.1;

    fn score(&self, u: &PriorityUsage) -> f64 {
        let r = u.max_ratio();
        if r > 1.0 {
            return u.penalized(self.penalty_weight, 1.2);
        }
        let max_possible = (MAX_PRIORITY as usize * self.catalog.workloads().len()) as f64;
        let priority_norm = u.sum_priority / max_possible;
        Self::W_PRIORITY * priority_norm + Self::W_SLACK * (1.0 - r)
            - Self::W_IMBALANCE * u.imbalance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gene, Resources, Site, Workload};

    /// One site {cpu 4, mem 400, storage 40}; three workloads {cpu 2, mem 100, storage 10}.
    fn catalog() -> Catalog {
        let w = |id: &str, p: i32| {
            Workload::new(id)
                .with_priority(p)
                .with_demand(Resources::new(2.0, 100.0, 10.0))
        };
        Catalog::new(
            vec![w("a", 5), w("b", 5), w("c", 2)],
            vec![Site::new("s").with_capacity(Resources::new(4.0, 400.0, 40.0))],
        )
    }

    fn pick(a: bool, b: bool, c: bool) -> Candidate {
        let g = |on: bool| if on { Gene::accepted() } else { Gene::rejected() };
        Candidate::from_genes([("a", g(a)), ("b", g(b)), ("c", g(c))])
    }

    #[test]
    fn test_usage_measure() {
        let cat = catalog();
        let u = PriorityUsage::measure(&cat, Encoding::SelectionOnly, &pick(true, true, false));
        assert!((u.sum_priority - 10.0).abs() < 1e-10);
        assert!((u.cpu_ratio - 1.0).abs() < 1e-10);
        assert!((u.memory_ratio - 0.5).abs() < 1e-10);
        assert!((u.storage_ratio - 0.5).abs() < 1e-10);
        assert!((u.max_ratio() - 1.0).abs() < 1e-10);
        assert!((u.imbalance() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_priority_short_circuit() {
        let cat = catalog();
        let none = pick(false, false, false);
        let objectives: Vec<Box<dyn Objective + '_>> = vec![
            Box::new(MaxPriority::new(&cat, Encoding::SelectionOnly, 5.0)),
            Box::new(PriorityLightPenalty::new(&cat, Encoding::SelectionOnly, 5.0)),
            Box::new(PriorityStrongPenalty::new(&cat, Encoding::SelectionOnly, 5.0)),
            Box::new(MultiCriteria::new(&cat, Encoding::SelectionOnly, 5.0)),
        ];
        for obj in objectives {
            assert_eq!(obj.evaluate(&none), 0.0);
        }
    }

    #[test]
    fn test_max_priority_feasible_and_penalized() {
        let cat = catalog();
        let obj = MaxPriority::new(&cat, Encoding::SelectionOnly, 5.0);
        assert!((obj.evaluate(&pick(true, true, false)) - 10.0).abs() < 1e-10);
        // cpu 6/4 = 1.5 → 12 - 5*12*0.5 = -18
        assert!((obj.evaluate(&pick(true, true, true)) - (-18.0)).abs() < 1e-10);
    }

    #[test]
    fn test_light_penalty() {
        let cat = catalog();
        let obj = PriorityLightPenalty::new(&cat, Encoding::SelectionOnly, 6.0);
        // one workload: ratio 0.5 → 5 * 0.9
        assert!((obj.evaluate(&pick(true, false, false)) - 4.5).abs() < 1e-10);
        // full: ratio 1.0 → 10 * 1.0
        assert!((obj.evaluate(&pick(true, true, false)) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_strong_penalty_offset() {
        let cat = catalog();
        let obj = PriorityStrongPenalty::new(&cat, Encoding::SelectionOnly, 7.0);
        assert!((obj.evaluate(&pick(true, false, false)) - 5.0 * 0.85).abs() < 1e-10);
        // ratio 1.5 → 12 - 7*12*0 = 12
        assert!((obj.evaluate(&pick(true, true, true)) - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_multi_criteria() {
        let cat = catalog();
        let obj = MultiCriteria::new(&cat, Encoding::SelectionOnly, 8.0);
        // sumP 5, n 3 → norm 5/30; ratios (0.5, 0.25, 0.25): slack 0.5, imbalance 0.5
        let expected = 0.6 * (5.0 / 30.0) + 0.3 * 0.5 - 0.1 * 0.5;
        assert!((obj.evaluate(&pick(true, false, false)) - expected).abs() < 1e-10);
        // ratio 1.5 → 12 - 8*12*0.3
        assert!((obj.evaluate(&pick(true, true, true)) - (12.0 - 8.0 * 12.0 * 0.3)).abs() < 1e-10);
    }

    #[test]
    fn test_assignment_encoding_ignores_unplaced() {
        let cat = catalog();
        let obj = MaxPriority::new(&cat, Encoding::Assignment, 5.0);
        let cand = Candidate::from_genes([
            ("a", Gene::placed("s")),
            ("b", Gene::accepted()),
            ("c", Gene::rejected()),
        ]);
        assert!((obj.evaluate(&cand) - 5.0).abs() < 1e-10);
    }
}
