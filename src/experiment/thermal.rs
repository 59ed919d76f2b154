//! Temperature-driven performance and power losses.
//!
//! Between 20 °C and 25 °C there is no loss. Colder sites lose a little
//! performance linearly and pay a heating overhead; hotter sites lose
//! performance exponentially (capped at 70 %) and pay a quadratic cooling
//! overhead (capped at 50 %).

use serde::{Deserialize, Serialize};

const OPTIMAL_LOW_C: f64 = 20.0;
const OPTIMAL_HIGH_C: f64 = 25.0;
const MAX_PERFORMANCE_LOSS: f64 = 0.7;
const MAX_POWER_OVERHEAD_PCT: f64 = 50.0;

/// Losses at a given temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalLosses {
    /// Fraction of performance lost (0.0..=0.7).
    pub performance_loss: f64,
    /// Extra power spent on heating or cooling, in percent (0..=50).
    pub power_overhead_pct: f64,
}

/// Computes the losses at `temperature_c`.
pub fn thermal_losses(temperature_c: f64) -> ThermalLosses {
    if temperature_c < OPTIMAL_LOW_C {
        let deficit = OPTIMAL_LOW_C - temperature_c;
        ThermalLosses {
            performance_loss: deficit / 20.0 * 0.05,
            power_overhead_pct: deficit / 5.0 * 2.0,
        }
    } else if temperature_c <= OPTIMAL_HIGH_C {
        ThermalLosses {
            performance_loss: 0.0,
            power_overhead_pct: 0.0,
        }
    } else {
        let excess = temperature_c - OPTIMAL_HIGH_C;
        ThermalLosses {
            performance_loss: (1.0 - (-0.1 * excess).exp()).min(MAX_PERFORMANCE_LOSS),
            power_overhead_pct: (0.5 * excess + 0.02 * excess * excess)
                .min(MAX_POWER_OVERHEAD_PCT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_band() {
        for t in [20.0, 22.5, 25.0] {
            let l = thermal_losses(t);
            assert_eq!(l.performance_loss, 0.0);
            assert_eq!(l.power_overhead_pct, 0.0);
        }
    }

    #[test]
    fn test_cold() {
        let l = thermal_losses(10.0);
        assert!((l.performance_loss - 0.025).abs() < 1e-10);
        assert!((l.power_overhead_pct - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_hot() {
        let l = thermal_losses(35.0);
        assert!((l.performance_loss - (1.0 - (-1.0f64).exp())).abs() < 1e-10);
        assert!((l.power_overhead_pct - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_caps() {
        let l = thermal_losses(100.0);
        assert!((l.performance_loss - 0.7).abs() < 1e-10);
        assert!((l.power_overhead_pct - 50.0).abs() < 1e-10);
    }
}
