//! Cost breakdown models.
//!
//! This module contains the [`CostBreakdown`] type produced once per
//! (shipment, carrier service) evaluation, plus the [`ServiceCost`] summary
//! the discount-tier adjuster operates on. Breakdowns are produced fresh per
//! evaluation and never mutated afterward.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The component code under which the base (or oversize) rate is recorded.
pub const BASE_RATE_COMPONENT: &str = "base_rate";

/// A single named component of a cost breakdown.
///
/// The base rate and every triggered surcharge each contribute one
/// component. Fuel is recorded separately on the breakdown since it is
/// derived from a subset of the components rather than being one itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    /// Stable component code (the surcharge rule id, or `base_rate`).
    pub code: String,
    /// Human-readable component label.
    pub label: String,
    /// The component amount in dollars.
    pub amount: Decimal,
    /// Whether this component is part of the carrier's fuel surcharge base.
    pub fuel_eligible: bool,
}

/// The itemized cost of one shipment under one carrier service.
///
/// Invariants maintained by the cost aggregator:
/// - `subtotal` equals the exact sum of `components` (no silent extra terms)
/// - `total == subtotal + fuel`
/// - at most one component per surcharge exclusivity group is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// The carrier identifier.
    pub carrier: String,
    /// The service code within the carrier.
    pub service: String,
    /// The resolved destination zone.
    pub zone: String,
    /// Whether the destination carries the remote/extended-delivery flag.
    pub remote: bool,
    /// The billable weight used for rate lookup (post-floor, pre-cap).
    pub billable_weight: Decimal,
    /// Whether the oversize rate override replaced the bracket lookup.
    pub is_oversize: bool,
    /// Itemized cost components (base rate plus triggered surcharges).
    pub components: Vec<CostComponent>,
    /// Sum of all components.
    pub subtotal: Decimal,
    /// Fuel surcharge amount (zero for carriers without a fuel surcharge).
    pub fuel: Decimal,
    /// `subtotal + fuel`.
    pub total: Decimal,
}

impl CostBreakdown {
    /// Returns the amount of the component with the given code, if present.
    pub fn component(&self, code: &str) -> Option<Decimal> {
        self.components
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.amount)
    }

    /// Returns the base-rate component amount.
    ///
    /// Every breakdown produced by the rating pipeline carries a base-rate
    /// component; a missing component reads as zero rather than panicking.
    pub fn base_rate(&self) -> Decimal {
        self.component(BASE_RATE_COMPONENT).unwrap_or(Decimal::ZERO)
    }

    /// Returns the exact sum of the listed components.
    pub fn components_sum(&self) -> Decimal {
        self.components.iter().map(|c| c.amount).sum()
    }
}

/// A per-service cost summary used by the discount-tier adjuster.
///
/// When a carrier offers multiple services and the cheaper one is selected
/// per shipment, each service's own base-rate component must be retained so
/// tier adjustment can be applied per service. Applying one service's delta
/// to another's total corrupts shipments near the cost crossover point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCost {
    /// The service code.
    pub service: String,
    /// The all-in total for this service.
    pub total: Decimal,
    /// This service's own base-rate component.
    pub base_rate: Decimal,
}
