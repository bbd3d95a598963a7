//! Assignment group models.
//!
//! Groups are the unit the carrier-mix optimizer reasons about: a
//! (package type, destination bucket, weight bracket) aggregation of
//! shipments with per-carrier cost totals, rather than individual shipments,
//! for tractability.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The aggregation key of an assignment group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// The package-type tag shared by all shipments in the group.
    pub package_type: String,
    /// The destination bucket (postal-code prefix).
    pub dest_bucket: String,
    /// The weight-bracket label (e.g. "1-5").
    pub weight_bracket: String,
}

impl GroupKey {
    /// Returns the stable string label used as the assignment-map key.
    pub fn label(&self) -> String {
        format!(
            "{}|{}|{}",
            self.package_type, self.dest_bucket, self.weight_bracket
        )
    }
}

/// Aggregate cost of a group under one carrier.
///
/// All amounts are sums over the group's shipments, costed at the carrier's
/// cheaper service per shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCarrierCost {
    /// Total all-in cost for the group.
    pub total: Decimal,
    /// Sum of per-shipment base-rate components.
    pub base_total: Decimal,
    /// Sum of per-shipment qualifying spend (per the carrier's basis).
    pub qualifying_total: Decimal,
}

impl GroupCarrierCost {
    /// Returns the average per-shipment cost for a group of `count` shipments.
    ///
    /// Returns zero for an empty group rather than dividing by zero.
    pub fn average(&self, count: u32) -> Decimal {
        if count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(count)
        }
    }
}

/// A coarsened unit of optimization.
///
/// A carrier appears in `carrier_costs` only when it can service every
/// shipment in the group; a carrier that cannot service the group at all is
/// explicitly absent (not zero-cost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    /// The aggregation key.
    pub key: GroupKey,
    /// Number of shipments aggregated into the group.
    pub shipment_count: u32,
    /// Per-carrier aggregate costs, keyed by carrier id.
    pub carrier_costs: BTreeMap<String, GroupCarrierCost>,
}

impl AssignmentGroup {
    /// Returns this group's aggregate cost under the given carrier, if the
    /// carrier can service the group.
    pub fn cost_for(&self, carrier: &str) -> Option<&GroupCarrierCost> {
        self.carrier_costs.get(carrier)
    }

    /// Returns the serviceable carrier with the lowest total cost.
    ///
    /// Ties break toward the lexically smallest carrier id (the map iterates
    /// in key order), keeping assignment deterministic.
    pub fn cheapest_carrier(&self) -> Option<(&str, &GroupCarrierCost)> {
        self.carrier_costs
            .iter()
            .min_by(|a, b| a.1.total.cmp(&b.1.total).then_with(|| a.0.cmp(b.0)))
            .map(|(id, cost)| (id.as_str(), cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cost(total: &str) -> GroupCarrierCost {
        GroupCarrierCost {
            total: dec(total),
            base_total: dec(total),
            qualifying_total: dec(total),
        }
    }

    fn sample_group() -> AssignmentGroup {
        let mut carrier_costs = BTreeMap::new();
        carrier_costs.insert("apex".to_string(), cost("120.00"));
        carrier_costs.insert("meridian".to_string(), cost("98.50"));
        AssignmentGroup {
            key: GroupKey {
                package_type: "carton".to_string(),
                dest_bucket: "606".to_string(),
                weight_bracket: "1-5".to_string(),
            },
            shipment_count: 10,
            carrier_costs,
        }
    }

    #[test]
    fn test_key_label() {
        let group = sample_group();
        assert_eq!(group.key.label(), "carton|606|1-5");
    }

    #[test]
    fn test_cheapest_carrier() {
        let group = sample_group();
        let (carrier, cost) = group.cheapest_carrier().unwrap();
        assert_eq!(carrier, "meridian");
        assert_eq!(cost.total, dec("98.50"));
    }

    #[test]
    fn test_cheapest_carrier_tie_breaks_lexically() {
        let mut group = sample_group();
        group
            .carrier_costs
            .insert("apex".to_string(), cost("98.50"));
        let (carrier, _) = group.cheapest_carrier().unwrap();
        assert_eq!(carrier, "apex");
    }

    #[test]
    fn test_unserviceable_carrier_is_absent() {
        let group = sample_group();
        assert!(group.cost_for("ghost").is_none());
    }

    #[test]
    fn test_average_cost() {
        let group = sample_group();
        let cost = group.cost_for("apex").unwrap();
        assert_eq!(cost.average(group.shipment_count), dec("12.00"));
    }

    #[test]
    fn test_average_of_empty_group_is_zero() {
        let cost = cost("50.00");
        assert_eq!(cost.average(0), Decimal::ZERO);
    }

    #[test]
    fn test_group_serialization_round_trip() {
        let group = sample_group();
        let json = serde_json::to_string(&group).unwrap();
        let deserialized: AssignmentGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(group, deserialized);
    }
}
