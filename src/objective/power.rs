//! Temperature-aware power objective.
//!
//! Minimizes total data-center power: server power of every site that hosts
//! at least one workload, plus the cooling power needed to remove that heat,
//! plus a fixed penalty per rejected workload so the search does not win by
//! refusing everything.
//!
//! # Model
//!
//! For a site with `c` allocated cpu cores:
//!
//! ```text
//! u        = c / (c + k)                     (saturating utilization)
//! P_server = P_idle + (P_peak − P_idle)·u
//! t        = clamp(site temperature, t_min, t_max)
//! COP      = COP_min + (COP_max − COP_min)·(t − t_min)/(t_max − t_min)
//! P_cool   = P_server / COP
//! ```
//!
//! A warmer supply temperature raises the COP, so the same server load is
//! cheaper to cool at a warmer site.
//!
//! # Reference
//! Moore et al. (2005), "Making Scheduling Cool"; Pakbaznia & Pedram (2009),
//! "Minimizing data center cooling and server power costs", ISLPED.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Objective;
use crate::models::{Candidate, Catalog, Encoding};

/// Constants of the power and cooling model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerModel {
    /// Server power of an active but idle site (W).
    pub idle_power: f64,
    /// Server power at full utilization (W).
    pub peak_power: f64,
    /// Cost added per rejected or unplaced workload.
    pub reject_penalty: f64,
    /// COP at `min_temp_for_cop`.
    pub min_cop: f64,
    /// COP at `max_temp_for_cop`.
    pub max_cop: f64,
    /// Lower bound of the COP temperature range (°C).
    pub min_temp_for_cop: f64,
    /// Upper bound of the COP temperature range (°C).
    pub max_temp_for_cop: f64,
    /// Lowest COP ever used.
    pub cop_floor: f64,
    /// Half-saturation constant of the utilization curve (cpu cores).
    pub utilization_knee: f64,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self {
            idle_power: 120.0,
            peak_power: 250.0,
            reject_penalty: 800.0,
            min_cop: 1.5,
            max_cop: 4.5,
            min_temp_for_cop: 18.0,
            max_temp_for_cop: 28.0,
            cop_floor: 0.5,
            utilization_knee: 4.0,
        }
    }
}

impl PowerModel {
    /// Saturating utilization for `used_cpu` allocated cores, in `[0, 1)`.
    pub fn utilization(&self, used_cpu: f64) -> f64 {
        used_cpu / (used_cpu + self.utilization_knee)
    }

    /// Server power of a site running `used_cpu` cores.
    pub fn server_power(&self, used_cpu: f64) -> f64 {
        self.idle_power + (self.peak_power - self.idle_power) * self.utilization(used_cpu)
    }

    /// Coefficient of performance at `temperature_c`.
    ///
    /// Linear over `[min_temp_for_cop, max_temp_for_cop]`, clamped outside it.
    pub fn cop(&self, temperature_c: f64) -> f64 {
        let t = temperature_c.clamp(self.min_temp_for_cop, self.max_temp_for_cop);
        let span = self.max_temp_for_cop - self.min_temp_for_cop;
        let r = if span > 0.0 {
            (t - self.min_temp_for_cop) / span
        } else {
            0.0
        };
        (self.min_cop + (self.max_cop - self.min_cop) * r).max(self.cop_floor)
    }

    /// Cooling power needed to remove `server_power` at `temperature_c`.
    pub fn cooling_power(&self, server_power: f64, temperature_c: f64) -> f64 {
        server_power / self.cop(temperature_c)
    }
}

/// Power drawn by one active site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePower {
    /// Site identifier.
    pub site_id: String,
    /// CPU cores in use by accepted workloads.
    pub used_cpu: f64,
    /// Temperature used for the COP, before clamping.
    pub temperature_c: f64,
    /// Server power at `used_cpu`.
    pub server_power: f64,
    /// Cooling power needed to remove `server_power`.
    pub cooling_power: f64,
}

/// Full cost breakdown of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBreakdown {
    /// Active sites in id order.
    pub sites: Vec<SitePower>,
    /// Workloads without a gene, rejected, or without a target site.
    pub rejected: usize,
    /// `rejected × reject_penalty`.
    pub rejection_cost: f64,
}

impl PowerBreakdown {
    /// Server power summed over active sites.
    pub fn server_power(&self) -> f64 {
        self.sites.iter().map(|s| s.server_power).sum()
    }

    /// Cooling power summed over active sites.
    pub fn cooling_power(&self) -> f64 {
        self.sites.iter().map(|s| s.cooling_power).sum()
    }

    /// Server + cooling power + rejection cost.
    pub fn total_cost(&self) -> f64 {
        self.server_power() + self.cooling_power() + self.rejection_cost
    }
}

/// Minimizes server + cooling power; fitness is the negated total cost.
#[derive(Debug, Clone)]
pub struct TemperatureAwarePower<'a> {
    catalog: &'a Catalog,
    model: PowerModel,
    average_temperature: f64,
}

impl<'a> TemperatureAwarePower<'a> {
    /// Creates the objective. Sites without a temperature use the catalog's
    /// average temperature.
    pub fn new(catalog: &'a Catalog, model: PowerModel) -> Self {
        Self {
            catalog,
            model,
            average_temperature: catalog.average_temperature(),
        }
    }

    /// Temperature used for sites that report none.
    pub fn average_temperature(&self) -> f64 {
        self.average_temperature
    }

    /// Computes the per-site cost breakdown of a candidate.
    pub fn breakdown(&self, candidate: &Candidate) -> PowerBreakdown {
        let mut per_site_cpu: BTreeMap<&str, f64> = BTreeMap::new();
        let mut rejected = 0usize;

        for w in self.catalog.workloads() {
            let placed = candidate
                .gene(&w.id)
                .filter(|g| g.is_enabled(Encoding::Assignment))
                .and_then(|g| g.target_site().map(|site| (g, site)));
            let Some((gene, site)) = placed else {
                rejected += 1;
                continue;
            };
            let cpu = gene
                .allocated_cpu
                .filter(|c| *c > 0.0)
                .or(Some(w.demand.cpu).filter(|c| *c > 0.0))
                .unwrap_or(1.0);
            *per_site_cpu.entry(site).or_insert(0.0) += cpu;
        }

        let sites = per_site_cpu
            .into_iter()
            .filter(|(_, used)| *used > 0.0)
            .map(|(site_id, used_cpu)| {
                let temperature_c = self
                    .catalog
                    .site(site_id)
                    .map(|s| s.temperature_or(self.average_temperature))
                    .unwrap_or(self.average_temperature);
                let server_power = self.model.server_power(used_cpu);
                SitePower {
                    site_id: site_id.to_string(),
                    used_cpu,
                    temperature_c,
                    server_power,
                    cooling_power: self.model.cooling_power(server_power, temperature_c),
                }
            })
            .collect();

        PowerBreakdown {
            sites,
            rejected,
            rejection_cost: self.model.reject_penalty * rejected as f64,
        }
    }
}

impl Objective for TemperatureAwarePower<'_> {
    fn evaluate(&self, candidate: &Candidate) -> f64 {
        -self.breakdown(candidate).total_cost()
    }

    fn name(&self) -> &'static str {
        "temperature_aware_power"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gene, Site, Workload};

    fn catalog_at(temp: f64) -> Catalog {
        Catalog::new(
            vec![
                Workload::new("a").with_priority(3).with_cpu(2.0),
                Workload::new("b").with_priority(3).with_cpu(2.0),
            ],
            vec![Site::new("s").with_cpu(8.0).with_temperature(temp)],
        )
    }

    #[test]
    fn test_cop_interpolation() {
        let m = PowerModel::default();
        assert!((m.cop(18.0) - 1.5).abs() < 1e-10);
        assert!((m.cop(23.0) - 3.0).abs() < 1e-10);
        assert!((m.cop(28.0) - 4.5).abs() < 1e-10);
        assert!((m.cop(5.0) - 1.5).abs() < 1e-10);
        assert!((m.cop(40.0) - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_cop_monotonic() {
        let m = PowerModel::default();
        let mut prev = m.cop(18.0);
        for step in 1..=20 {
            let c = m.cop(18.0 + step as f64 * 0.5);
            assert!(c > prev);
            prev = c;
        }
    }

    #[test]
    fn test_server_power() {
        let m = PowerModel::default();
        // 4 cores → u = 0.5 → 120 + 130 * 0.5
        assert!((m.server_power(4.0) - 185.0).abs() < 1e-10);
        assert!((m.server_power(0.0) - 120.0).abs() < 1e-10);
    }

    #[test]
    fn test_warm_site_cools_cheaper() {
        let cand = Candidate::from_genes([("a", Gene::placed("s")), ("b", Gene::placed("s"))]);
        let cold_cat = catalog_at(18.0);
        let warm_cat = catalog_at(28.0);
        let cold = TemperatureAwarePower::new(&cold_cat, PowerModel::default());
        let warm = TemperatureAwarePower::new(&warm_cat, PowerModel::default());
        let (cold, warm) = (cold.breakdown(&cand), warm.breakdown(&cand));

        assert!((cold.server_power() - warm.server_power()).abs() < 1e-10);
        assert!(warm.cooling_power() < cold.cooling_power());
        assert!((cold.cooling_power() - 185.0 / 1.5).abs() < 1e-10);
        assert!((warm.cooling_power() - 185.0 / 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_rejection_penalty() {
        let cat = catalog_at(23.0);
        let obj = TemperatureAwarePower::new(&cat, PowerModel::default());
        let cand = Candidate::from_genes([
            ("a", Gene::placed("s")),
            ("b", Gene::accepted()), // no site → rejected
        ]);
        let b = obj.breakdown(&cand);
        assert_eq!(b.rejected, 1);
        // 2 cores: u = 1/3
        let server = 120.0 + 130.0 / 3.0;
        let expected = server + server / 3.0 + 800.0;
        assert!((obj.evaluate(&cand) + expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_gene_counts_as_rejected() {
        let cat = catalog_at(23.0);
        let obj = TemperatureAwarePower::new(&cat, PowerModel::default());
        let cand = Candidate::from_genes([("a", Gene::placed("s"))]);
        assert_eq!(obj.breakdown(&cand).rejected, 1);
    }

    #[test]
    fn test_allocated_cpu_override() {
        let cat = catalog_at(23.0);
        let obj = TemperatureAwarePower::new(&cat, PowerModel::default());
        let cand = Candidate::from_genes([
            ("a", Gene::placed("s").with_allocated_cpu(6.0)),
            ("b", Gene::rejected()),
        ]);
        let b = obj.breakdown(&cand);
        assert!((b.sites[0].used_cpu - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_temperature_uses_average() {
        let cat = Catalog::new(
            vec![Workload::new("a").with_priority(1).with_cpu(1.0)],
            vec![
                Site::new("hot").with_cpu(4.0).with_temperature(26.0),
                Site::new("cold").with_cpu(4.0).with_temperature(20.0),
                Site::new("unknown").with_cpu(4.0),
            ],
        );
        let obj = TemperatureAwarePower::new(&cat, PowerModel::default());
        assert!((obj.average_temperature() - 23.0).abs() < 1e-10);
        let b = obj.breakdown(&Candidate::from_genes([("a", Gene::placed("unknown"))]));
        assert!((b.sites[0].temperature_c - 23.0).abs() < 1e-10);
    }

    #[test]
    fn test_consolidation_is_cheaper() {
        let cat = Catalog::new(
            vec![
                Workload::new("a").with_priority(1).with_cpu(1.0),
                Workload::new("b").with_priority(1).with_cpu(1.0),
            ],
            vec![
                Site::new("s1").with_cpu(4.0).with_temperature(23.0),
                Site::new("s2").with_cpu(4.0).with_temperature(23.0),
            ],
        );
        let obj = TemperatureAwarePower::new(&cat, PowerModel::default());
        let together =
            Candidate::from_genes([("a", Gene::placed("s1")), ("b", Gene::placed("s1"))]);
        let spread =
            Candidate::from_genes([("a", Gene::placed("s1")), ("b", Gene::placed("s2"))]);
        assert!(obj.evaluate(&together) > obj.evaluate(&spread));
    }
}
