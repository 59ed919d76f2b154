//! Workload and site catalog.
//!
//! The catalog is the engine's read-only view of a scheduling request: the
//! workloads competing for admission in a fixed order, and the sites that
//! can host them. It also answers the capacity questions shared by the
//! generator, repair and the objectives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::site::average_temperature;
use super::{Candidate, Encoding, Gene, Resources, Site, Workload};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    workloads: Vec<Workload>,
    #[serde(default)]
    sites: Vec<Site>,
}

/// Workloads and sites of one scheduling request.
///
/// Workload order is significant: crossover cut points are taken over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CatalogData", into = "CatalogData")]
pub struct Catalog {
    workloads: Vec<Workload>,
    sites: Vec<Site>,
    workload_index: HashMap<String, usize>,
    site_index: HashMap<String, usize>,
}

impl From<CatalogData> for Catalog {
    fn from(data: CatalogData) -> Self {
        Catalog::new(data.workloads, data.sites)
    }
}

impl From<Catalog> for CatalogData {
    fn from(catalog: Catalog) -> Self {
        CatalogData {
            workloads: catalog.workloads,
            sites: catalog.sites,
        }
    }
}

impl Catalog {
    /// Creates a catalog. Duplicate ids resolve to their first occurrence;
    /// use [`crate::validation::validate_catalog`] to reject them.
    pub fn new(workloads: Vec<Workload>, sites: Vec<Site>) -> Self {
        let mut workload_index = HashMap::new();
        for (i, w) in workloads.iter().enumerate() {
            workload_index.entry(w.id.clone()).or_insert(i);
        }
        let mut site_index = HashMap::new();
        for (i, s) in sites.iter().enumerate() {
            site_index.entry(s.id.clone()).or_insert(i);
        }
        Self {
            workloads,
            sites,
            workload_index,
            site_index,
        }
    }

    /// Workloads in catalog order.
    pub fn workloads(&self) -> &[Workload] {
        &self.workloads
    }

    /// Sites in catalog order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Looks up a workload by id.
    pub fn workload(&self, id: &str) -> Option<&Workload> {
        self.workload_index.get(id).map(|&i| &self.workloads[i])
    }

    /// Looks up a site by id.
    pub fn site(&self, id: &str) -> Option<&Site> {
        self.site_index.get(id).map(|&i| &self.sites[i])
    }

    /// Sum of all site capacities.
    pub fn aggregate_capacity(&self) -> Resources {
        self.sites.iter().map(|s| s.capacity).sum()
    }

    /// Average reported site temperature, or the default.
    pub fn average_temperature(&self) -> f64 {
        average_temperature(&self.sites)
    }

    /// Demand a gene places on its site: the workload's demand with the
    /// allocated cpu override applied.
    pub fn gene_demand(&self, workload: &Workload, gene: &Gene) -> Resources {
        let mut demand = workload.demand;
        if let Some(cpu) = gene.allocated_cpu.filter(|c| *c > 0.0) {
            demand.cpu = cpu;
        }
        demand
    }

    /// Aggregate demand of every enabled gene under `encoding`.
    pub fn enabled_demand(&self, candidate: &Candidate, encoding: Encoding) -> Resources {
        self.workloads
            .iter()
            .filter_map(|w| {
                candidate
                    .gene(&w.id)
                    .filter(|g| g.is_enabled(encoding))
                    .map(|g| self.gene_demand(w, g))
            })
            .sum()
    }

    /// Per-site demand of placed genes, in site catalog order.
    ///
    /// Genes targeting unknown sites are ignored here; see [`Self::is_feasible`].
    pub fn site_usage(&self, candidate: &Candidate) -> Vec<Resources> {
        let mut usage = vec![Resources::default(); self.sites.len()];
        for w in &self.workloads {
            let Some(gene) = candidate.gene(&w.id) else {
                continue;
            };
            if !gene.is_enabled(Encoding::Assignment) {
                continue;
            }
            if let Some(&idx) = gene.target_site().and_then(|s| self.site_index.get(s)) {
                usage[idx] += self.gene_demand(w, gene);
            }
        }
        usage
    }

    /// Whether the candidate has exactly one gene per known workload.
    pub fn is_complete(&self, candidate: &Candidate) -> bool {
        candidate.len() == self.workloads.len()
            && self.workloads.iter().all(|w| candidate.gene(&w.id).is_some())
    }

    /// Whether the candidate respects capacity under `encoding`.
    ///
    /// - `SelectionOnly`: total enabled demand within aggregate capacity.
    /// - `Assignment`: every accepted gene names a known site and each
    ///   site's demand is within its capacity.
    pub fn is_feasible(&self, candidate: &Candidate, encoding: Encoding) -> bool {
        match encoding {
            Encoding::SelectionOnly => self
                .enabled_demand(candidate, encoding)
                .fits_within(&self.aggregate_capacity()),
            Encoding::Assignment => {
                let placed_known = candidate.genes().all(|(_, g)| {
                    !g.accepted || g.target_site().is_some_and(|s| self.site_index.contains_key(s))
                });
                placed_known
                    && self
                        .site_usage(candidate)
                        .iter()
                        .zip(&self.sites)
                        .all(|(used, site)| used.fits_within(&site.capacity))
            }
        }
    }

    /// Whether a workload could fit on at least one site on its own.
    pub fn fits_somewhere(&self, workload: &Workload) -> bool {
        self.sites.iter().any(|s| workload.demand.fits_within(&s.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            vec![
                Workload::new("w1").with_priority(5).with_cpu(2.0),
                Workload::new("w2").with_priority(3).with_cpu(3.0),
                Workload::new("w3").with_priority(1).with_cpu(1.0),
            ],
            vec![
                Site::new("s1").with_cpu(4.0).with_temperature(20.0),
                Site::new("s2").with_cpu(2.0),
            ],
        )
    }

    #[test]
    fn test_lookup() {
        let c = sample();
        assert_eq!(c.workload("w2").map(|w| w.priority), Some(3));
        assert!(c.workload("nope").is_none());
        assert!(c.site("s2").is_some());
    }

    #[test]
    fn test_aggregates() {
        let c = sample();
        assert!((c.aggregate_capacity().cpu - 6.0).abs() < 1e-10);
        assert!((c.average_temperature() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_selection_feasibility() {
        let c = sample();
        let all = Candidate::from_genes([
            ("w1", Gene::accepted()),
            ("w2", Gene::accepted()),
            ("w3", Gene::accepted()),
        ]);
        assert!(c.is_feasible(&all, Encoding::SelectionOnly));

        let over = Candidate::from_genes([
            ("w1", Gene::accepted().with_allocated_cpu(3.0)),
            ("w2", Gene::accepted()),
            ("w3", Gene::accepted()),
        ]);
        assert!(!c.is_feasible(&over, Encoding::SelectionOnly));
    }

    #[test]
    fn test_assignment_feasibility() {
        let c = sample();
        let ok = Candidate::from_genes([
            ("w1", Gene::placed("s1")),
            ("w2", Gene::rejected()),
            ("w3", Gene::placed("s2")),
        ]);
        assert!(c.is_feasible(&ok, Encoding::Assignment));

        let crowded = Candidate::from_genes([
            ("w1", Gene::placed("s2")),
            ("w2", Gene::rejected()),
            ("w3", Gene::placed("s2")),
        ]);
        assert!(!c.is_feasible(&crowded, Encoding::Assignment));

        let unknown = Candidate::from_genes([
            ("w1", Gene::placed("s9")),
            ("w2", Gene::rejected()),
            ("w3", Gene::rejected()),
        ]);
        assert!(!c.is_feasible(&unknown, Encoding::Assignment));
    }

    #[test]
    fn test_site_usage() {
        let c = sample();
        let cand = Candidate::from_genes([
            ("w1", Gene::placed("s1")),
            ("w2", Gene::accepted()),
            ("w3", Gene::placed("s1")),
        ]);
        let usage = c.site_usage(&cand);
        assert!((usage[0].cpu - 3.0).abs() < 1e-10);
        assert!((usage[1].cpu - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_completeness() {
        let c = sample();
        let partial = Candidate::from_genes([("w1", Gene::accepted())]);
        assert!(!c.is_complete(&partial));
        let full = Candidate::from_genes([
            ("w1", Gene::rejected()),
            ("w2", Gene::rejected()),
            ("w3", Gene::rejected()),
        ]);
        assert!(c.is_complete(&full));
    }

    #[test]
    fn test_fits_somewhere() {
        let c = sample();
        assert!(c.fits_somewhere(&Workload::new("x").with_cpu(4.0)));
        assert!(!c.fits_somewhere(&Workload::new("x").with_cpu(5.0)));
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let json = r#"{
            "workloads": [{
                "id": "a",
                "priority": 2,
                "demand": {"cpu": 1.0, "memory": 0.0, "storage": 0.0}
            }],
            "sites": [{"id": "s", "capacity": {"cpu": 2.0, "memory": 0.0, "storage": 0.0}}]
        }"#;
        let c: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(c.workload("a").map(|w| w.priority), Some(2));
        assert_eq!(c.site("s").and_then(|s| s.temperature_c), None);
    }
}
