//! Execution site model.
//!
//! Sites are the places workloads run on: clouds, data centers, clusters.
//! Each has a capacity vector and optionally a measured ambient temperature,
//! which drives the cooling term of the power-aware objective.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Resources;

/// Temperature assumed when no site reports one (°C).
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;

/// A site that can host workloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Unique site identifier.
    pub id: String,
    /// Total capacity available to the scheduled batch.
    pub capacity: Resources,
    /// Ambient temperature (°C). `None` = unknown.
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// Domain-specific metadata (region, provider, ...).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Site {
    /// Creates a site with zero capacity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capacity: Resources::default(),
            temperature_c: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the full capacity vector.
    pub fn with_capacity(mut self, capacity: Resources) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the cpu capacity, leaving other dimensions unchanged.
    pub fn with_cpu(mut self, cpu: f64) -> Self {
        self.capacity.cpu = cpu;
        self
    }

    /// Sets the ambient temperature.
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Temperature of this site, or `fallback` if unknown.
    pub fn temperature_or(&self, fallback: f64) -> f64 {
        self.temperature_c.unwrap_or(fallback)
    }
}

/// Average of the reported site temperatures.
///
/// Falls back to [`DEFAULT_TEMPERATURE_C`] when no site reports one.
pub fn average_temperature(sites: &[Site]) -> f64 {
    let reported: Vec<f64> = sites.iter().filter_map(|s| s.temperature_c).collect();
    if reported.is_empty() {
        DEFAULT_TEMPERATURE_C
    } else {
        reported.iter().sum::<f64>() / reported.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_builder() {
        let s = Site::new("edge-1")
            .with_capacity(Resources::new(16.0, 32768.0, 500.0))
            .with_temperature(21.5)
            .with_attribute("region", "eu-north");

        assert_eq!(s.id, "edge-1");
        assert!((s.capacity.cpu - 16.0).abs() < 1e-10);
        assert_eq!(s.temperature_c, Some(21.5));
        assert_eq!(s.attributes.get("region").map(String::as_str), Some("eu-north"));
    }

    #[test]
    fn test_average_temperature() {
        let sites = vec![
            Site::new("a").with_temperature(20.0),
            Site::new("b"),
            Site::new("c").with_temperature(30.0),
        ];
        assert!((average_temperature(&sites) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_average_temperature_default() {
        let sites = vec![Site::new("a"), Site::new("b")];
        assert!((average_temperature(&sites) - DEFAULT_TEMPERATURE_C).abs() < 1e-10);
        assert!((average_temperature(&[]) - DEFAULT_TEMPERATURE_C).abs() < 1e-10);
    }

    #[test]
    fn test_temperature_fallback() {
        assert!((Site::new("a").temperature_or(19.0) - 19.0).abs() < 1e-10);
        let warm = Site::new("a").with_temperature(27.0);
        assert!((warm.temperature_or(19.0) - 27.0).abs() < 1e-10);
    }
}
