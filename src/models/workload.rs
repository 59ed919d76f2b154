//! Workload model.
//!
//! A workload is a unit of work competing for admission: an application,
//! VM or container group with a priority and a resource demand.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Lowest priority a workload may carry.
pub const MIN_PRIORITY: i32 = 1;
/// Highest priority a workload may carry.
pub const MAX_PRIORITY: i32 = 10;

/// A resource vector: cpu cores, memory (MiB) and storage (GiB).
///
/// Used both for workload demands and for site capacities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// CPU cores.
    pub cpu: f64,
    /// Memory in MiB.
    pub memory: f64,
    /// Storage in GiB.
    pub storage: f64,
}

impl Resources {
    /// Creates a resource vector.
    pub fn new(cpu: f64, memory: f64, storage: f64) -> Self {
        Self {
            cpu,
            memory,
            storage,
        }
    }

    /// Whether every dimension of `self` is within `capacity`.
    pub fn fits_within(&self, capacity: &Resources) -> bool {
        self.cpu <= capacity.cpu
            && self.memory <= capacity.memory
            && self.storage <= capacity.storage
    }

    /// Multiplies every dimension by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.cpu * factor, self.memory * factor, self.storage * factor)
    }

    /// Usage ratios `(cpu, memory, storage)` relative to `capacity`.
    ///
    /// A dimension with non-positive capacity yields 0.
    pub fn ratios(&self, capacity: &Resources) -> (f64, f64, f64) {
        fn ratio(used: f64, cap: f64) -> f64 {
            if cap > 0.0 { used / cap } else { 0.0 }
        }
        (
            ratio(self.cpu, capacity.cpu),
            ratio(self.memory, capacity.memory),
            ratio(self.storage, capacity.storage),
        )
    }

    /// Whether any dimension is negative or not finite.
    pub fn is_malformed(&self) -> bool {
        [self.cpu, self.memory, self.storage]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
    }
}

impl Add for Resources {
    type Output = Resources;

    fn add(self, rhs: Resources) -> Resources {
        Resources::new(
            self.cpu + rhs.cpu,
            self.memory + rhs.memory,
            self.storage + rhs.storage,
        )
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Resources) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Resources {
    fn sum<I: Iterator<Item = Resources>>(iter: I) -> Self {
        iter.fold(Resources::default(), |acc, r| acc + r)
    }
}

/// A workload competing for admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    /// Unique workload identifier.
    pub id: String,
    /// Admission priority in `[MIN_PRIORITY, MAX_PRIORITY]` (higher = more important).
    pub priority: i32,
    /// Resource demand.
    pub demand: Resources,
}

impl Workload {
    /// Creates a workload with minimum priority and zero demand.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: MIN_PRIORITY,
            demand: Resources::default(),
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the full demand vector.
    pub fn with_demand(mut self, demand: Resources) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the cpu demand.
    pub fn with_cpu(mut self, cpu: f64) -> Self {
        self.demand.cpu = cpu;
        self
    }

    /// Sets the memory demand (MiB).
    pub fn with_memory(mut self, memory: f64) -> Self {
        self.demand.memory = memory;
        self
    }

    /// Sets the storage demand (GiB).
    pub fn with_storage(mut self, storage: f64) -> Self {
        self.demand.storage = storage;
        self
    }

    /// Whether the priority lies within the supported bounds.
    pub fn has_valid_priority(&self) -> bool {
        (MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority)
    }
}
