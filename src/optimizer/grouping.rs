//! Shipment aggregation into assignment groups.
//!
//! The optimizer reasons about (package type, destination bucket, weight
//! bracket) groups rather than individual shipments. Each group carries
//! per-carrier aggregate costs computed at the carrier's cheaper service
//! per shipment; a carrier that cannot service every shipment in a group
//! is excluded from that group's candidates entirely.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::CarrierProfile;
use crate::models::{AssignmentGroup, GroupCarrierCost, GroupKey, Shipment};
use crate::rating::rate_with_profile;

/// Bucketing configuration for group construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingConfig {
    /// Postal-code prefix length defining the destination bucket.
    pub postal_prefix_len: usize,
    /// Ascending weight-bracket boundaries in pounds. Brackets are
    /// lower-exclusive, upper-inclusive, matching the rate-table
    /// convention; actual weight is used so the bucket is carrier-agnostic.
    pub weight_breaks: Vec<Decimal>,
}

impl GroupingConfig {
    /// Creates a grouping configuration.
    pub fn new(postal_prefix_len: usize, weight_breaks: Vec<Decimal>) -> Self {
        let mut breaks = weight_breaks;
        breaks.sort();
        Self {
            postal_prefix_len,
            weight_breaks: breaks,
        }
    }

    /// Returns the bracket label for an actual weight.
    pub fn bracket_label(&self, weight: Decimal) -> String {
        let mut lower = Decimal::ZERO;
        for upper in &self.weight_breaks {
            if weight <= *upper {
                return format!("{}-{}", lower, upper);
            }
            lower = *upper;
        }
        format!("{}+", lower)
    }

    fn dest_bucket(&self, postal: &str) -> String {
        postal.chars().take(self.postal_prefix_len).collect()
    }
}

#[derive(Default)]
struct CarrierAccumulator {
    total: Decimal,
    base_total: Decimal,
    qualifying_total: Decimal,
    rated: u32,
}

/// Aggregates shipments into assignment groups with per-carrier costs.
///
/// Every shipment is rated under every profile (cheaper service wins per
/// shipment); a carrier appears in a group's candidates only when it rated
/// every shipment of the group. Groups come back sorted by key so
/// downstream iteration is deterministic.
pub fn build_groups(
    shipments: &[Shipment],
    profiles: &[CarrierProfile],
    config: &GroupingConfig,
) -> Vec<AssignmentGroup> {
    let mut accumulators: BTreeMap<GroupKey, (u32, BTreeMap<String, CarrierAccumulator>)> =
        BTreeMap::new();

    for shipment in shipments {
        let key = GroupKey {
            package_type: shipment.package_type.clone(),
            dest_bucket: config.dest_bucket(&shipment.dest_postal),
            weight_bracket: config.bracket_label(shipment.weight_lb),
        };
        let (count, carriers) = accumulators.entry(key).or_default();
        *count += 1;

        for profile in profiles {
            let Some(rating) = rate_with_profile(shipment, profile) else {
                continue;
            };
            let breakdown = &rating.breakdown;
            let qualifying = profile
                .discounts
                .qualifying_amount(breakdown.base_rate(), breakdown.total);
            let acc = carriers.entry(profile.carrier.clone()).or_default();
            acc.total += breakdown.total;
            acc.base_total += breakdown.base_rate();
            acc.qualifying_total += qualifying;
            acc.rated += 1;
        }
    }

    accumulators
        .into_iter()
        .map(|(key, (count, carriers))| AssignmentGroup {
            key,
            shipment_count: count,
            carrier_costs: carriers
                .into_iter()
                .filter(|(_, acc)| acc.rated == count)
                .map(|(carrier, acc)| {
                    (
                        carrier,
                        GroupCarrierCost {
                            total: acc.total,
                            base_total: acc.base_total,
                            qualifying_total: acc.qualifying_total,
                        },
                    )
                })
                .collect(),
        })
        .collect()
}
