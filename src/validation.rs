//! Input validation for placement requests.
//!
//! Checks structural integrity of workloads and sites before the search
//! starts. Detects:
//! - Empty or duplicate IDs
//! - Priorities outside `[MIN_PRIORITY, MAX_PRIORITY]`
//! - Negative or non-finite demands, capacities and temperatures
//! - Workloads submitted without any site to host them

use crate::models::{Catalog, MAX_PRIORITY, MIN_PRIORITY};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has an empty ID.
    EmptyId,
    /// A workload priority is out of bounds.
    PriorityOutOfRange,
    /// A demand or capacity dimension is negative or not finite.
    InvalidResources,
    /// A site temperature is not finite.
    InvalidTemperature,
    /// Workloads were submitted but there are no sites.
    NoSites,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a catalog.
///
/// Checks:
/// 1. Workload and site IDs are non-empty and unique
/// 2. Priorities lie within `[MIN_PRIORITY, MAX_PRIORITY]`
/// 3. Demands and capacities are finite and non-negative
/// 4. Reported temperatures are finite
/// 5. At least one site exists when there are workloads
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    let mut site_ids = HashSet::new();
    for site in catalog.sites() {
        if site.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Site with empty ID",
            ));
        } else if !site_ids.insert(site.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate site ID: {}", site.id),
            ));
        }

        if site.capacity.is_malformed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidResources,
                format!("Site '{}' has invalid capacity {:?}", site.id, site.capacity),
            ));
        }

        if let Some(t) = site.temperature_c {
            if !t.is_finite() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTemperature,
                    format!("Site '{}' reports temperature {t}", site.id),
                ));
            }
        }
    }

    let mut workload_ids = HashSet::new();
    for w in catalog.workloads() {
        if w.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Workload with empty ID",
            ));
        } else if !workload_ids.insert(w.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate workload ID: {}", w.id),
            ));
        }

        if !w.has_valid_priority() {
            errors.push(ValidationError::new(
                ValidationErrorKind::PriorityOutOfRange,
                format!(
                    "Workload '{}' has priority {} outside [{MIN_PRIORITY}, {MAX_PRIORITY}]",
                    w.id, w.priority
                ),
            ));
        }

        if w.demand.is_malformed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidResources,
                format!("Workload '{}' has invalid demand {:?}", w.id, w.demand),
            ));
        }
    }

    if !catalog.workloads().is_empty() && catalog.sites().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSites,
            format!("{} workload(s) but no sites", catalog.workloads().len()),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
