//! Workload admission and site placement for the U-Engine ecosystem.
//!
//! Decides which workloads to accept under finite capacity and, optionally,
//! which site each accepted workload runs on. A genetic search maximizes one
//! of several objectives: accepted priority with capacity penalties, a
//! multi-criteria blend, or total server plus cooling power.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Workload`, `Site`, `Catalog`, `Candidate`, `Gene`
//! - **`objective`**: Fitness objectives and the power/cooling model
//! - **`ga`**: Search engine, operators, configuration and run reports
//! - **`experiment`**: Algorithm presets, random baselines, acceptance statistics
//! - **`validation`**: Input integrity checks (duplicate IDs, priorities, resources)
//! - **`error`**: Crate-wide error type
//!
//! # Quick Start
//!
//! ```
//! use u_placement::ga::{EngineConfig, SearchEngine};
//! use u_placement::models::{Catalog, Encoding, Resources, Site, Workload};
//! use u_placement::objective::ObjectiveMode;
//!
//! let catalog = Catalog::new(
//!     vec![
//!         Workload::new("web").with_priority(8).with_demand(Resources::new(2.0, 2048.0, 10.0)),
//!         Workload::new("batch").with_priority(3).with_demand(Resources::new(4.0, 4096.0, 50.0)),
//!     ],
//!     vec![
//!         Site::new("north")
//!             .with_capacity(Resources::new(4.0, 8192.0, 100.0))
//!             .with_temperature(19.0),
//!         Site::new("south")
//!             .with_capacity(Resources::new(4.0, 8192.0, 100.0))
//!             .with_temperature(27.0),
//!     ],
//! );
//!
//! let config = EngineConfig::default()
//!     .with_objective(ObjectiveMode::TemperatureAwarePower)
//!     .with_encoding(Encoding::Assignment)
//!     .with_seed(42);
//! let solution = SearchEngine::new(config)?.run(&catalog)?;
//! assert!(catalog.is_feasible(&solution.candidate, Encoding::Assignment));
//! # Ok::<(), u_placement::SchedulingError>(())
//! ```
//!
//! # References
//!
//! - Moore et al. (2005), "Making Scheduling Cool: Temperature-Aware
//!   Workload Placement in Data Centers"
//! - Abbasi et al. (2009), "Minimizing Data Center Cooling and Server Power Costs"
//! - Chu & Beasley (1998), "A genetic algorithm for the multidimensional
//!   knapsack problem"

pub mod error;
pub mod experiment;
pub mod ga;
pub mod models;
pub mod objective;
pub mod validation;

pub use error::{Result, SchedulingError};
