//! Placement domain models.
//!
//! Provides the input types (workloads, sites, the catalog that bundles
//! them) and the candidate encoding the genetic search operates on.
//!
//! # Domain Mappings
//!
//! | u-placement | Multi-cloud | Data center | Edge |
//! |------------|-------------|-------------|------|
//! | Workload | Application | VM / job | Container group |
//! | Site | Cloud | Rack / room | Edge cluster |
//! | Gene | Accept + cloud | Accept + rack | Accept + cluster |
//! | Candidate | Admission plan | Placement plan | Rollout plan |

mod candidate;
mod catalog;
mod site;
mod workload;

pub use candidate::{Candidate, Encoding, Gene};
pub use catalog::Catalog;
pub use site::{DEFAULT_TEMPERATURE_C, Site, average_temperature};
pub use workload::{MAX_PRIORITY, MIN_PRIORITY, Resources, Workload};
