//! Experiment harness.
//!
//! Runs named algorithms over generated workloads the way the acceptance
//! experiments do: capacity is a fixed fraction of the total demand, and
//! each request yields a [`SelectionResult`] that feeds
//! [`AcceptanceStats`].
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_placement::experiment::{
//!     generate_workloads, schedule_for_experiment, Algorithm, ExperimentOptions,
//! };
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let workloads = generate_workloads("app", 20, &mut rng);
//! let options = ExperimentOptions::default().with_seed(7);
//! let result = schedule_for_experiment(Algorithm::Amaga, &workloads, &options).unwrap();
//! assert!(result.usable);
//! ```

mod presets;
mod stats;
mod templates;
mod thermal;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{Result, SchedulingError};
use crate::ga::{SearchEngine, SelectionResult};
use crate::models::{Candidate, Catalog, Encoding, Gene, Resources, Site, Workload};
use crate::validation::validate_catalog;

pub use presets::{Algorithm, DEFAULT_CAPACITY_RATIO};
pub use stats::AcceptanceStats;
pub use templates::{generate_workloads, WorkloadTemplate, WORKLOAD_TEMPLATES};
pub use thermal::{thermal_losses, ThermalLosses};

/// Id of the site synthesized when the caller provides none.
pub const SYNTHETIC_SITE_ID: &str = "experiment-pool";

/// Options for [`schedule_for_experiment`].
#[derive(Debug, Clone)]
pub struct ExperimentOptions {
    /// Overrides the algorithm's capacity ratio. Values outside `(0, 1]`
    /// fall back to [`DEFAULT_CAPACITY_RATIO`].
    pub capacity_ratio: Option<f64>,
    /// Sites for placement-aware algorithms (Mtdp). Ignored by the others.
    pub sites: Vec<Site>,
    /// Temperature of the synthetic site.
    pub temperature_c: Option<f64>,
    /// Random seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Whether GA phases run in parallel.
    pub parallel: bool,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            capacity_ratio: None,
            sites: Vec::new(),
            temperature_c: None,
            seed: None,
            parallel: true,
        }
    }
}

impl ExperimentOptions {
    /// Sets the capacity ratio.
    pub fn with_capacity_ratio(mut self, ratio: f64) -> Self {
        self.capacity_ratio = Some(ratio);
        self
    }

    /// Sets the sites used by placement-aware algorithms.
    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    /// Sets the synthetic site's temperature.
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel phases.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Capacity offered to `workloads` at `ratio` of their total demand.
pub fn derived_capacity(workloads: &[Workload], ratio: f64) -> Resources {
    let ratio = if ratio > 0.0 && ratio <= 1.0 {
        ratio
    } else {
        DEFAULT_CAPACITY_RATIO
    };
    workloads.iter().map(|w| w.demand).sum::<Resources>().scale(ratio)
}

/// Runs `algorithm` over `workloads`.
///
/// Empty input, and input for which no candidate can be made feasible,
/// yield an unusable result rather than an error.
///
/// # Errors
/// - [`SchedulingError::InvalidInput`] if the workloads or sites fail
///   validation, for every algorithm including the random baselines
/// - [`SchedulingError::CorruptedRunState`] from the engine
pub fn schedule_for_experiment(
    algorithm: Algorithm,
    workloads: &[Workload],
    options: &ExperimentOptions,
) -> Result<SelectionResult> {
    if workloads.is_empty() {
        return Ok(SelectionResult::unusable());
    }
    let mut rng = match options.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let ratio = options
        .capacity_ratio
        .unwrap_or_else(|| algorithm.capacity_ratio());
    let synthetic =
        Site::new(SYNTHETIC_SITE_ID).with_capacity(derived_capacity(workloads, ratio));
    let synthetic = match options.temperature_c {
        Some(t) => synthetic.with_temperature(t),
        None => synthetic,
    };

    let config = algorithm.engine_config();
    let assigns_sites = config.as_ref().is_some_and(|c| c.encoding.assigns_sites());
    let sites = if assigns_sites && !options.sites.is_empty() {
        options.sites.clone()
    } else {
        vec![synthetic]
    };
    let catalog = Catalog::new(workloads.to_vec(), sites);
    validate_catalog(&catalog).map_err(SchedulingError::InvalidInput)?;

    let Some(config) = config else {
        let p = algorithm.random_acceptance().unwrap_or(0.5);
        return Ok(random_acceptance(&catalog, p, &mut rng));
    };
    let encoding = config.encoding;
    let engine = SearchEngine::new(config.with_parallel(options.parallel))?;

    match engine.run_with_rng(&catalog, &mut rng) {
        Ok(solution) => {
            debug!(
                algorithm = algorithm.name(),
                fitness = solution.fitness,
                generations = solution.report.generations,
                "experiment request solved"
            );
            Ok(SelectionResult::from_candidate(&catalog, &solution.candidate, encoding))
        }
        Err(
            err @ (SchedulingError::NoSolutionRecorded
            | SchedulingError::RepairLivenessRisk { .. }),
        ) => {
            warn!(algorithm = algorithm.name(), error = %err, "experiment request unusable");
            Ok(SelectionResult::unusable())
        }
        Err(err) => Err(err),
    }
}

/// Accepts each workload independently with probability `p`, ignoring
/// capacity. If nothing is accepted, one random workload is.
pub fn random_acceptance<R: Rng>(catalog: &Catalog, p: f64, rng: &mut R) -> SelectionResult {
    let workloads = catalog.workloads();
    if workloads.is_empty() {
        return SelectionResult::unusable();
    }
    let p = p.clamp(0.0, 1.0);
    let mut candidate = Candidate::from_genes(workloads.iter().map(|w| {
        let gene = if rng.random_bool(p) {
            Gene::accepted()
        } else {
            Gene::rejected()
        };
        (w.id.clone(), gene)
    }));
    if candidate.enabled_count(Encoding::SelectionOnly) == 0 {
        let pick = &workloads[rng.random_range(0..workloads.len())];
        candidate.set_gene(pick.id.clone(), Gene::accepted());
    }
    SelectionResult::from_candidate(catalog, &candidate, Encoding::SelectionOnly)
}
