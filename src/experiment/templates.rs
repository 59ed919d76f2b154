//! Workload profiles for experiments.
//!
//! Memory is in MiB, storage in GiB.

use rand::Rng;
use rand::prelude::IndexedRandom;
use serde::Serialize;

use crate::models::{Resources, Workload, MAX_PRIORITY, MIN_PRIORITY};

/// A named resource profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkloadTemplate {
    /// Profile name, e.g. `"existingPaperApp1"`.
    pub name: &'static str,
    /// CPU cores.
    pub cpu: f64,
    /// Memory in MiB.
    pub memory: f64,
    /// Storage in GiB.
    pub storage: f64,
}

impl WorkloadTemplate {
    const fn new(name: &'static str, cpu: f64, memory: f64, storage: f64) -> Self {
        Self {
            name,
            cpu,
            memory,
            storage,
        }
    }

    /// Demand vector of this profile.
    pub fn demand(&self) -> Resources {
        Resources::new(self.cpu, self.memory, self.storage)
    }
}

/// Application profiles drawn from by [`generate_workloads`].
pub const WORKLOAD_TEMPLATES: [WorkloadTemplate; 15] = [
    WorkloadTemplate::new("existingPaperApp1", 2.0, 1024.0, 8.0),
    WorkloadTemplate::new("existingPaperApp2", 2.0, 1024.0, 4.0),
    WorkloadTemplate::new("existingPaperApp3", 4.0, 2048.0, 3.0),
    WorkloadTemplate::new("existingPaperApp4", 2.0, 1024.0, 2.0),
    WorkloadTemplate::new("existingPaperMySQL", 1.0, 500.0, 0.0),
    WorkloadTemplate::new("actualNginxController", 8.0, 8192.0, 155.0),
    WorkloadTemplate::new("actualRedis", 4.0, 15360.0, 30.0),
    WorkloadTemplate::new("actualPostgres", 2.0, 2048.0, 1.0),
    WorkloadTemplate::new("actualRabbitmq", 1.0, 256.0, 6.0),
    WorkloadTemplate::new("actualConsul", 4.0, 16384.0, 100.0),
    WorkloadTemplate::new("actualRedmine", 4.0, 4096.0, 20.0),
    WorkloadTemplate::new("actualMiRFleet", 2.0, 8192.0, 128.0),
    WorkloadTemplate::new("actualApacheStorm", 12.0, 24576.0, 0.0),
    WorkloadTemplate::new("actualApacheKafka", 4.0, 8192.0, 500.0),
    WorkloadTemplate::new("actualApacheZookeeper", 2.0, 2048.0, 80.0),
];

/// Generates `count` workloads named `{prefix}-{i}`, each with a random
/// template and a uniform priority in `[MIN_PRIORITY, MAX_PRIORITY]`.
pub fn generate_workloads<R: Rng>(prefix: &str, count: usize, rng: &mut R) -> Vec<Workload> {
    (0..count)
        .map(|i| {
            let demand = WORKLOAD_TEMPLATES
                .choose(rng)
                .map(WorkloadTemplate::demand)
                .unwrap_or_default();
            Workload::new(format!("{prefix}-{i}"))
                .with_priority(rng.random_range(MIN_PRIORITY..=MAX_PRIORITY))
                .with_demand(demand)
        })
        .collect()
}
