//! Rate table lookup.
//!
//! Resolves a base rate from a bracketed (weight × zone) table, with the
//! billable weight capped at the carrier's maximum serviceable weight.
//! Carriers with a full-override oversize path bypass the bracket lookup
//! entirely when the oversize condition holds. A zone missing from the
//! price columns means the carrier cannot service the shipment: the lookup
//! returns `None` (cost absent), never an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateTable;

use super::ShipmentFacts;

/// The result of a rate table lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLookup {
    /// The base rate read from the table.
    pub base_rate: Decimal,
    /// True when the oversize override replaced the bracket lookup.
    pub is_oversize: bool,
}

/// Looks up the base rate for a zone and billable weight.
///
/// The weight is capped at `max_weight` before the bracket scan; the
/// bracket containing the weight satisfies `lower < w <= upper`. When the
/// table defines an oversize override and its trigger holds against the
/// shipment, the bracket scan is bypassed for the flat zone-indexed
/// oversize rate.
///
/// Returns `None` when the resolved zone has no price column (the carrier
/// cannot service the destination) or no bracket contains the weight.
pub fn lookup_rate(
    table: &RateTable,
    zone: &str,
    billable_weight: Decimal,
    max_weight: Decimal,
    facts: &ShipmentFacts,
) -> Option<RateLookup> {
    if let Some(oversize) = &table.oversize {
        if oversize.trigger.matches(facts) {
            return oversize.prices.get(zone).map(|price| RateLookup {
                base_rate: *price,
                is_oversize: true,
            });
        }
    }

    let capped = billable_weight.min(max_weight);
    let bracket = table
        .brackets
        .iter()
        .find(|b| b.lower < capped && capped <= b.upper)?;
    bracket.prices.get(zone).map(|price| RateLookup {
        base_rate: *price,
        is_oversize: false,
    })
}
