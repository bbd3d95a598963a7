//! Optimizer constraint and result models.
//!
//! This module contains the [`Constraint`] type describing contractual
//! commitments, and the [`OptimizationResult`] produced once per optimizer
//! run. Infeasibility is surfaced as an explicit flag on the result, never
//! as a silently-substituted best-effort cost.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A contractual constraint on the carrier mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// A minimum shipment-count commitment for a carrier.
    MinimumVolume {
        /// The committed carrier.
        carrier: String,
        /// The minimum number of shipments that must route to the carrier.
        min_shipments: u32,
    },
    /// A minimum qualifying-spend threshold unlocking a discount tier.
    SpendThreshold {
        /// The carrier offering the tier.
        carrier: String,
        /// The qualifying spend that must be cleared.
        min_qualifying_spend: Decimal,
        /// The discount tier unlocked at the threshold.
        tier: String,
    },
}

impl Constraint {
    /// Returns the carrier this constraint applies to.
    pub fn carrier(&self) -> &str {
        match self {
            Constraint::MinimumVolume { carrier, .. } => carrier,
            Constraint::SpendThreshold { carrier, .. } => carrier,
        }
    }
}

/// The evaluated status of one constraint after an optimizer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintStatus {
    /// The constraint that was evaluated.
    pub constraint: Constraint,
    /// Whether the final assignment satisfies the constraint.
    pub satisfied: bool,
}

/// Per-carrier volume and spend under an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierUsage {
    /// Number of shipments routed to the carrier.
    pub shipments: u32,
    /// Total all-in spend at the carrier.
    pub spend: Decimal,
    /// Qualifying spend per the carrier's discount schedule basis.
    pub qualifying_spend: Decimal,
}

/// The complete result of a carrier-mix optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the optimization was performed.
    pub timestamp: DateTime<Utc>,
    /// Assignment map: group label → carrier id.
    pub assignments: BTreeMap<String, String>,
    /// Aggregate total cost of the assignment.
    pub total_cost: Decimal,
    /// Per-carrier volume and spend.
    pub carrier_usage: BTreeMap<String, CarrierUsage>,
    /// Per-constraint satisfied/violated flags.
    pub constraint_status: Vec<ConstraintStatus>,
    /// True only when every constraint is satisfied.
    pub feasible: bool,
}

impl OptimizationResult {
    /// Returns the usage recorded for a carrier, or a zeroed default.
    pub fn usage(&self, carrier: &str) -> CarrierUsage {
        self.carrier_usage.get(carrier).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_constraint_carrier_accessor() {
        let min = Constraint::MinimumVolume {
            carrier: "apex".to_string(),
            min_shipments: 100,
        };
        assert_eq!(min.carrier(), "apex");

        let threshold = Constraint::SpendThreshold {
            carrier: "meridian".to_string(),
            min_qualifying_spend: dec("250000"),
            tier: "tier_3".to_string(),
        };
        assert_eq!(threshold.carrier(), "meridian");
    }

    #[test]
    fn test_constraint_serialization() {
        let min = Constraint::MinimumVolume {
            carrier: "apex".to_string(),
            min_shipments: 100,
        };
        let json = serde_json::to_string(&min).unwrap();
        assert!(json.contains("\"kind\":\"minimum_volume\""));
        assert!(json.contains("\"min_shipments\":100"));
    }

    #[test]
    fn test_constraint_deserialization() {
        let json = r#"{
            "kind": "spend_threshold",
            "carrier": "apex",
            "min_qualifying_spend": "250000",
            "tier": "tier_3"
        }"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        match constraint {
            Constraint::SpendThreshold {
                carrier,
                min_qualifying_spend,
                tier,
            } => {
                assert_eq!(carrier, "apex");
                assert_eq!(min_qualifying_spend, dec("250000"));
                assert_eq!(tier, "tier_3");
            }
            other => panic!("Expected SpendThreshold, got {:?}", other),
        }
    }

    #[test]
    fn test_result_serialization_round_trip() {
        let mut assignments = BTreeMap::new();
        assignments.insert("carton|606|1-5".to_string(), "apex".to_string());
        let mut carrier_usage = BTreeMap::new();
        carrier_usage.insert(
            "apex".to_string(),
            CarrierUsage {
                shipments: 10,
                spend: dec("240.30"),
                qualifying_spend: dec("273.53"),
            },
        );

        let result = OptimizationResult {
            run_id: Uuid::nil(),
            timestamp: DateTime::parse_from_rfc3339("2026-02-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            assignments,
            total_cost: dec("240.30"),
            carrier_usage,
            constraint_status: vec![ConstraintStatus {
                constraint: Constraint::MinimumVolume {
                    carrier: "apex".to_string(),
                    min_shipments: 5,
                },
                satisfied: true,
            }],
            feasible: true,
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }

    #[test]
    fn test_usage_defaults_to_zero_for_unknown_carrier() {
        let result = OptimizationResult {
            run_id: Uuid::nil(),
            timestamp: Utc::now(),
            assignments: BTreeMap::new(),
            total_cost: Decimal::ZERO,
            carrier_usage: BTreeMap::new(),
            constraint_status: vec![],
            feasible: true,
        };
        let usage = result.usage("ghost");
        assert_eq!(usage.shipments, 0);
        assert_eq!(usage.spend, Decimal::ZERO);
    }
}
