//! Fitness objectives.
//!
//! Every objective maps a [`Candidate`] to a scalar fitness. The engine
//! always maximizes; objectives that are natively costs return the negated
//! cost. The objective is chosen once per run from an [`ObjectiveMode`] and
//! then called through the [`Objective`] trait, so no per-call branching on
//! the mode happens inside the search loop.
//!
//! # Modes
//!
//! | Mode | Rewards | Infeasible penalty offset |
//! |------|---------|---------------------------|
//! | `MaxPriority` | accepted priority | 1.0 |
//! | `PriorityLightPenalty` | priority, slight bonus for utilization | 1.0 |
//! | `PriorityStrongPenalty` | priority, larger utilization bonus | 1.5 |
//! | `MultiCriteria` | priority, slack, dimension balance | 1.2 |
//! | `TemperatureAwarePower` | low server + cooling power, few rejections | n/a |
//!
//! # Reference
//! Moore et al. (2005), "Making Scheduling Cool: Temperature-Aware Workload
//! Placement in Data Centers"

mod power;
mod priority;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SchedulingError};
use crate::models::{Candidate, Catalog, Encoding};

pub use power::{PowerBreakdown, PowerModel, SitePower, TemperatureAwarePower};
pub use priority::{
    MaxPriority, MultiCriteria, PriorityLightPenalty, PriorityStrongPenalty, PriorityUsage,
};

/// Scores a candidate. Higher is better.
pub trait Objective: Send + Sync {
    /// Computes the fitness of a candidate.
    fn evaluate(&self, candidate: &Candidate) -> f64;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Objective selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveMode {
    /// Maximize summed priority of accepted workloads.
    #[default]
    MaxPriority,
    /// Priority with a light utilization bonus.
    PriorityLightPenalty,
    /// Priority with a strong utilization bonus and later penalty onset.
    PriorityStrongPenalty,
    /// Weighted priority, slack and balance.
    MultiCriteria,
    /// Minimize server plus cooling power; requires [`Encoding::Assignment`].
    TemperatureAwarePower,
}

impl ObjectiveMode {
    /// All modes, in declaration order.
    pub const ALL: [ObjectiveMode; 5] = [
        ObjectiveMode::MaxPriority,
        ObjectiveMode::PriorityLightPenalty,
        ObjectiveMode::PriorityStrongPenalty,
        ObjectiveMode::MultiCriteria,
        ObjectiveMode::TemperatureAwarePower,
    ];

    /// Canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectiveMode::MaxPriority => "max_priority",
            ObjectiveMode::PriorityLightPenalty => "priority_light_penalty",
            ObjectiveMode::PriorityStrongPenalty => "priority_strong_penalty",
            ObjectiveMode::MultiCriteria => "multi_criteria",
            ObjectiveMode::TemperatureAwarePower => "temperature_aware_power",
        }
    }

    /// Whether the mode can only score candidates that carry site assignments.
    pub fn requires_assignment(self) -> bool {
        matches!(self, ObjectiveMode::TemperatureAwarePower)
    }
}

impl fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectiveMode {
    type Err = SchedulingError;

    /// Parses a mode name, ignoring case, `-` and `_`.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        ObjectiveMode::ALL
            .into_iter()
            .find(|m| m.as_str().replace('_', "") == key)
            .ok_or_else(|| {
                SchedulingError::Configuration(format!("unknown objective mode: {s}"))
            })
    }
}

/// Mode-specific parameters needed to build an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveParams {
    /// Weight of the capacity-violation penalty (priority modes).
    pub penalty_weight: f64,
    /// Power model constants (power mode).
    pub power: PowerModel,
}

impl Default for ObjectiveParams {
    fn default() -> Self {
        Self {
            penalty_weight: 5.0,
            power: PowerModel::default(),
        }
    }
}

/// Builds the objective for `mode`.
///
/// # Errors
/// [`SchedulingError::Configuration`] when the mode needs site assignments
/// but `encoding` is [`Encoding::SelectionOnly`].
pub fn build_objective<'a>(
    mode: ObjectiveMode,
    catalog: &'a Catalog,
    encoding: Encoding,
    params: &ObjectiveParams,
) -> Result<Box<dyn Objective + 'a>> {
    if mode.requires_assignment() && !encoding.assigns_sites() {
        return Err(SchedulingError::Configuration(format!(
            "objective {mode} requires the assignment encoding"
        )));
    }
    let w = params.penalty_weight;
    Ok(match mode {
        ObjectiveMode::MaxPriority => Box::new(MaxPriority::new(catalog, encoding, w)),
        ObjectiveMode::PriorityLightPenalty => {
            Box::new(PriorityLightPenalty::new(catalog, encoding, w))
        }
        ObjectiveMode::PriorityStrongPenalty => {
            Box::new(PriorityStrongPenalty::new(catalog, encoding, w))
        }
        ObjectiveMode::MultiCriteria => Box::new(MultiCriteria::new(catalog, encoding, w)),
        ObjectiveMode::TemperatureAwarePower => {
            Box::new(TemperatureAwarePower::new(catalog, params.power.clone()))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gene, Site, Workload};

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "max_priority".parse::<ObjectiveMode>().unwrap(),
            ObjectiveMode::MaxPriority
        );
        assert_eq!(
            "PriorityLightPenalty".parse::<ObjectiveMode>().unwrap(),
            ObjectiveMode::PriorityLightPenalty
        );
        assert_eq!(
            "temperature-aware-power".parse::<ObjectiveMode>().unwrap(),
            ObjectiveMode::TemperatureAwarePower
        );
    }

    #[test]
    fn test_unknown_mode() {
        let err = "min_latency".parse::<ObjectiveMode>().unwrap_err();
        assert!(matches!(err, SchedulingError::Configuration(_)));
    }

    #[test]
    fn test_display_round_trip() {
        for mode in ObjectiveMode::ALL {
            assert_eq!(mode.to_string().parse::<ObjectiveMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_power_needs_assignment() {
        let catalog = Catalog::new(vec![Workload::new("w")], vec![Site::new("s")]);
        let err = build_objective(
            ObjectiveMode::TemperatureAwarePower,
            &catalog,
            Encoding::SelectionOnly,
            &ObjectiveParams::default(),
        );
        assert!(matches!(err, Err(SchedulingError::Configuration(_))));
        assert!(build_objective(
            ObjectiveMode::TemperatureAwarePower,
            &catalog,
            Encoding::Assignment,
            &ObjectiveParams::default(),
        )
        .is_ok());
    }

    #[test]
    fn test_built_objective_scores() {
        let catalog = Catalog::new(
            vec![Workload::new("w").with_priority(4).with_cpu(1.0)],
            vec![Site::new("s").with_cpu(2.0)],
        );
        let obj = build_objective(
            ObjectiveMode::MaxPriority,
            &catalog,
            Encoding::SelectionOnly,
            &ObjectiveParams::default(),
        )
        .unwrap();
        let cand = Candidate::from_genes([("w", Gene::accepted())]);
        assert!((obj.evaluate(&cand) - 4.0).abs() < 1e-10);
        assert_eq!(obj.name(), "max_priority");
    }
}
