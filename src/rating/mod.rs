//! Per-shipment cost resolution.
//!
//! This module composes the rating pipeline: dimensional preprocessing,
//! zone resolution, billable weight, surcharge evaluation, rate lookup, and
//! cost aggregation. One call to [`rate_shipment`] produces a fully
//! itemized (shipment, carrier service) cost; [`rate_with_profile`]
//! evaluates all services of a carrier and selects the cheaper per
//! shipment.
//!
//! The pipeline is a pure function of (shipment, static rate card): no
//! shared mutable state, trivially data-parallel across shipments and
//! carriers.

mod billable_weight;
mod dimensions;
mod rate_table;
mod surcharge;
mod zone;

pub use billable_weight::{BillableWeight, apply_weight_floor, billable_weight};
pub use dimensions::DimensionalProfile;
pub use rate_table::{RateLookup, lookup_rate};
pub use surcharge::{SurchargeCharge, SurchargeOutcome, evaluate_surcharges};
pub use zone::{ZoneResolution, ZoneSource, resolve_zone};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{CarrierProfile, CarrierRateCard, FuelBasis};
use crate::models::{
    BASE_RATE_COMPONENT, CostBreakdown, CostComponent, ServiceCost, Shipment,
};

/// The derived attributes of one shipment that surcharge triggers and rate
/// lookups reference.
///
/// Computed once per (shipment, carrier service) evaluation; the billable
/// weight here is pre-floor, so weight-based triggers see the weight the
/// shipment rated at before any surcharge side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentFacts {
    /// The ship date.
    pub ship_date: NaiveDate,
    /// The package-type tag.
    pub package_type: String,
    /// The resolved zone code.
    pub zone: String,
    /// The remote/extended-delivery flag from zone resolution.
    pub remote: bool,
    /// Actual scale weight in pounds.
    pub actual_weight: Decimal,
    /// Billable weight in pounds, before surcharge floors.
    pub billable_weight: Decimal,
    /// Rounded volume in cubic inches.
    pub volume: Decimal,
    /// Longest side in inches.
    pub longest: Decimal,
    /// Median side in inches.
    pub second_longest: Decimal,
    /// Longest side plus twice the sum of the other two.
    pub length_plus_girth: Decimal,
}

/// The result of rating one shipment across all services of a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRating {
    /// The breakdown of the selected (cheapest) service.
    pub breakdown: CostBreakdown,
    /// Per-service cost summaries, each retaining its own base-rate
    /// component for discount-tier adjustment.
    pub services: Vec<ServiceCost>,
}

/// Rates one shipment under one carrier service.
///
/// Runs the full pipeline: dimensional preprocessing → zone resolution →
/// billable weight → surcharge evaluation → weight floor → rate lookup →
/// cost aggregation. Returns `None` when the carrier cannot service the
/// shipment (no price column for the resolved zone); a serviceable
/// shipment never fails.
pub fn rate_shipment(shipment: &Shipment, card: &CarrierRateCard) -> Option<CostBreakdown> {
    let dims = DimensionalProfile::from_shipment(shipment);
    let zone = resolve_zone(&card.zones, &shipment.origin, &shipment.dest_postal);
    let weight = billable_weight(
        shipment.weight_lb,
        dims.volume,
        card.dim_divisor,
        card.dim_threshold_cuin,
    );

    let facts = ShipmentFacts {
        ship_date: shipment.ship_date,
        package_type: shipment.package_type.clone(),
        zone: zone.zone,
        remote: zone.remote,
        actual_weight: shipment.weight_lb,
        billable_weight: weight.billable,
        volume: dims.volume,
        longest: dims.longest,
        second_longest: dims.second_longest,
        length_plus_girth: dims.length_plus_girth,
    };

    let outcome = evaluate_surcharges(&card.surcharges, &facts);
    let floored = apply_weight_floor(weight.billable, outcome.weight_floor);
    let rate = lookup_rate(
        &card.rates,
        &facts.zone,
        floored,
        card.max_billable_weight,
        &facts,
    )?;

    Some(aggregate_costs(card, &facts, floored, rate, outcome))
}

/// Sums base and surcharges into a subtotal, applies fuel over the
/// carrier's pinned base, and assembles the breakdown.
fn aggregate_costs(
    card: &CarrierRateCard,
    facts: &ShipmentFacts,
    billable_weight: Decimal,
    rate: RateLookup,
    outcome: SurchargeOutcome,
) -> CostBreakdown {
    let base_label = if rate.is_oversize {
        "Oversize rate"
    } else {
        "Base rate"
    };
    let mut components = vec![CostComponent {
        code: BASE_RATE_COMPONENT.to_string(),
        label: base_label.to_string(),
        amount: rate.base_rate,
        fuel_eligible: true,
    }];
    for charge in outcome.charges {
        components.push(CostComponent {
            code: charge.rule_id,
            label: charge.name,
            amount: charge.amount,
            fuel_eligible: charge.fuel_eligible,
        });
    }

    let subtotal: Decimal = components.iter().map(|c| c.amount).sum();
    let fuel = match &card.fuel {
        None => Decimal::ZERO,
        Some(fuel) => {
            let base = match fuel.basis {
                FuelBasis::FullSubtotal => subtotal,
                FuelBasis::BaseAndEligibleSurcharges => components
                    .iter()
                    .filter(|c| c.fuel_eligible)
                    .map(|c| c.amount)
                    .sum(),
            };
            (base * fuel.rate).round_dp(2)
        }
    };

    CostBreakdown {
        carrier: card.carrier.clone(),
        service: card.service.clone(),
        zone: facts.zone.clone(),
        remote: facts.remote,
        billable_weight,
        is_oversize: rate.is_oversize,
        components,
        subtotal,
        fuel,
        total: subtotal + fuel,
    }
}

/// Rates one shipment under every service of a carrier profile and selects
/// the cheaper service.
///
/// Each service's own base-rate component is retained in `services` so a
/// discount-tier adjustment can be applied per service and the selection
/// re-run afterward. Returns `None` when no service can handle the
/// shipment; the carrier is then excluded from optimizer candidates for
/// the shipment's group.
pub fn rate_with_profile(shipment: &Shipment, profile: &CarrierProfile) -> Option<ProfileRating> {
    let rated: Vec<CostBreakdown> = profile
        .services
        .iter()
        .filter_map(|card| rate_shipment(shipment, card))
        .collect();
    if rated.is_empty() {
        return None;
    }

    let services: Vec<ServiceCost> = rated
        .iter()
        .map(|b| ServiceCost {
            service: b.service.clone(),
            total: b.total,
            base_rate: b.base_rate(),
        })
        .collect();

    let breakdown = rated
        .into_iter()
        .min_by(|a, b| a.total.cmp(&b.total).then_with(|| a.service.cmp(&b.service)))?;

    Some(ProfileRating {
        breakdown,
        services,
    })
}
