//! Certification pricing
//!
//! ```text
//! price = base_price + (coverage × crap × npath × ccn) × unit_cost
//! ```

use super::{combine_factors, CertificationError, CertificationResult, ExtremeValues};
use crate::models::{MetricKind, SourceLocation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_PRICE: f64 = 119.0;
pub const DEFAULT_UNIT_COST: f64 = 200.0;

/// Business parameters of the certification price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertificationCost {
    /// Fixed price of every certification
    pub base_price: f64,
    /// Price per unit of combined factor
    pub unit_cost: f64,
}

impl Default for CertificationCost {
    fn default() -> Self {
        Self {
            base_price: DEFAULT_BASE_PRICE,
            unit_cost: DEFAULT_UNIT_COST,
        }
    }
}

impl CertificationCost {
    pub fn new(base_price: f64, unit_cost: f64) -> CertificationResult<Self> {
        for (name, amount) in [("base price", base_price), ("unit cost", unit_cost)] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CertificationError::InvalidPricing(format!(
                    "{name} must be a non-negative number, got {amount}"
                )));
            }
        }
        Ok(Self {
            base_price,
            unit_cost,
        })
    }

    /// Price for an already combined factor.
    ///
    /// Saturates at `f64::MAX` so extreme readings never yield `inf`.
    pub fn price_for(&self, combined_factor: f64) -> f64 {
        (self.base_price + combined_factor * self.unit_cost).min(f64::MAX)
    }

    pub fn calculate(&self, values: &ExtremeValues) -> f64 {
        self.price_for(values.calculate_factor())
    }

    /// Snapshot the trackers into a renderable report.
    pub fn report(&self, values: &ExtremeValues) -> FinalReport {
        let metrics: Vec<MetricReport> = values
            .iter()
            .map(|ev| MetricReport {
                kind: ev.kind(),
                label: ev.kind().label().to_string(),
                threshold: ev.threshold(),
                value: ev.value(),
                factor: ev.factor(),
                locations: ev.locations(),
            })
            .collect();

        let combined_factor = combine_factors(metrics.iter().map(|m| m.factor));
        FinalReport {
            metrics,
            combined_factor,
            price: self.price_for(combined_factor),
            base_price: self.base_price,
            unit_cost: self.unit_cost,
        }
    }
}

/// One row of the certification sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub kind: MetricKind,
    pub label: String,
    pub threshold: f64,
    /// Extreme value, or the threshold if nothing exceeded it
    pub value: f64,
    pub factor: f64,
    /// Locations of the violations that set a new extreme, in arrival order
    pub locations: Vec<SourceLocation>,
}

/// Outcome of a certification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub metrics: Vec<MetricReport>,
    pub combined_factor: f64,
    pub price: f64,
    pub base_price: f64,
    pub unit_cost: f64,
}

impl FinalReport {
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricReport> {
        self.metrics.iter().find(|m| m.kind == kind)
    }

    pub fn cost(&self) -> CertificationCost {
        CertificationCost {
            base_price: self.base_price,
            unit_cost: self.unit_cost,
        }
    }

    /// Recompute combined factor and price from the stored metric factors.
    pub fn recompute(&self) -> FinalReport {
        let combined_factor = combine_factors(self.metrics.iter().map(|m| m.factor));
        FinalReport {
            metrics: self.metrics.clone(),
            combined_factor,
            price: self.cost().price_for(combined_factor),
            base_price: self.base_price,
            unit_cost: self.unit_cost,
        }
    }
}
