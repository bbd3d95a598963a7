//! Property tests for the rating engine's documented invariants.
//!
//! - billable weight is monotonically non-decreasing in actual weight and
//!   package volume
//! - `total == subtotal + fuel` and `subtotal` equals the exact component
//!   sum for every breakdown
//! - at most one surcharge per exclusivity group is ever charged
//! - discount-tier adjustment round-trips to the original cost
//! - greedy assignment never costs more than any single fixed carrier

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use rating_engine::config::{CarrierProfile, ConfigLoader};
use rating_engine::models::{
    AssignmentGroup, GroupCarrierCost, GroupKey, ServiceCost, Shipment,
};
use rating_engine::optimizer::{TierAdjustment, optimize};
use rating_engine::rating::{billable_weight, rate_shipment};

fn apex() -> &'static CarrierProfile {
    static APEX: OnceLock<CarrierProfile> = OnceLock::new();
    APEX.get_or_init(|| {
        ConfigLoader::load("./config/carriers/apex").expect("Failed to load apex config")
    })
}

/// Builds a Decimal with one fractional digit from tenths.
fn tenths(n: u32) -> Decimal {
    Decimal::new(n as i64, 1)
}

/// Builds a Decimal with two fractional digits from hundredths.
fn cents(n: u32) -> Decimal {
    Decimal::new(n as i64, 2)
}

const DESTS: [&str; 5] = ["60601", "90001", "10001", "84101", "59901"];

fn shipment(dest_idx: usize, l: u32, w: u32, h: u32, weight: u32, day_offset: u32) -> Shipment {
    Shipment {
        id: "prop".to_string(),
        ship_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
            + chrono::Duration::days(day_offset as i64),
        origin: "ONT".to_string(),
        dest_postal: DESTS[dest_idx % DESTS.len()].to_string(),
        package_type: "carton".to_string(),
        length_in: tenths(l),
        width_in: tenths(w),
        height_in: tenths(h),
        weight_lb: tenths(weight),
    }
}

proptest! {
    #[test]
    fn billable_weight_monotone_in_actual(
        actual in 1u32..2000,
        bump in 1u32..500,
        volume in 1u32..30000,
    ) {
        let divisor = Decimal::new(250, 0);
        let threshold = Some(Decimal::new(1728, 0));
        let low = billable_weight(tenths(actual), Decimal::from(volume), divisor, threshold);
        let high = billable_weight(tenths(actual + bump), Decimal::from(volume), divisor, threshold);
        prop_assert!(high.billable >= low.billable);
    }

    #[test]
    fn billable_weight_monotone_in_volume(
        actual in 1u32..2000,
        volume in 1u32..30000,
        bump in 1u32..10000,
    ) {
        let divisor = Decimal::new(250, 0);
        let threshold = Some(Decimal::new(1728, 0));
        let low = billable_weight(tenths(actual), Decimal::from(volume), divisor, threshold);
        let high = billable_weight(
            tenths(actual),
            Decimal::from(volume + bump),
            divisor,
            threshold,
        );
        prop_assert!(high.billable >= low.billable);
    }

    #[test]
    fn breakdown_totals_are_exact(
        dest_idx in 0usize..5,
        l in 10u32..700,
        w in 10u32..500,
        h in 10u32..500,
        weight in 1u32..1600,
        day_offset in 0u32..365,
    ) {
        let shipment = shipment(dest_idx, l, w, h, weight, day_offset);
        for card in &apex().services {
            if let Some(breakdown) = rate_shipment(&shipment, card) {
                prop_assert_eq!(breakdown.total, breakdown.subtotal + breakdown.fuel);
                prop_assert_eq!(breakdown.components_sum(), breakdown.subtotal);
            }
        }
    }

    #[test]
    fn at_most_one_charge_per_exclusivity_group(
        dest_idx in 0usize..5,
        l in 10u32..700,
        w in 10u32..500,
        h in 10u32..500,
        weight in 1u32..1600,
        day_offset in 0u32..365,
    ) {
        let shipment = shipment(dest_idx, l, w, h, weight, day_offset);
        let ground = apex().service("ground").unwrap();
        if let Some(breakdown) = rate_shipment(&shipment, ground) {
            let ahs = breakdown
                .components
                .iter()
                .filter(|c| c.code.starts_with("ahs_"))
                .count();
            let demand = breakdown
                .components
                .iter()
                .filter(|c| c.code.starts_with("demand_ahs"))
                .count();
            prop_assert!(ahs <= 1, "multiple additional-handling charges: {:?}", breakdown);
            prop_assert!(demand <= 1, "multiple demand charges: {:?}", breakdown);
        }
    }

    #[test]
    fn tier_adjustment_round_trips(
        total in 500u32..50000,
        base_share in 1u32..100,
        baked in 30u32..95,
        target in 30u32..95,
        fuel in 0u32..30,
    ) {
        let total = cents(total);
        let base_rate = total * cents(base_share);
        let adjustment = TierAdjustment {
            baked_factor: cents(baked),
            target_factor: cents(target),
            fuel_rate: cents(fuel),
        };
        let cost = ServiceCost {
            service: "ground".to_string(),
            total,
            base_rate,
        };
        let back = adjustment.inverse().apply_service(&adjustment.apply_service(&cost));
        prop_assert_eq!(back.total.round_dp(4), cost.total.round_dp(4));
        prop_assert_eq!(back.base_rate.round_dp(4), cost.base_rate.round_dp(4));
    }

    #[test]
    fn greedy_never_beats_a_fixed_carrier(
        costs in proptest::collection::vec((100u32..100000, 100u32..100000, 1u32..50), 1..12),
    ) {
        let groups: Vec<AssignmentGroup> = costs
            .iter()
            .enumerate()
            .map(|(i, (a, b, count))| {
                let mut carrier_costs = BTreeMap::new();
                for (carrier, total) in [("a", a), ("b", b)] {
                    carrier_costs.insert(
                        carrier.to_string(),
                        GroupCarrierCost {
                            total: cents(*total),
                            base_total: cents(*total),
                            qualifying_total: cents(*total),
                        },
                    );
                }
                AssignmentGroup {
                    key: GroupKey {
                        package_type: "carton".to_string(),
                        dest_bucket: format!("{i:03}"),
                        weight_bracket: "1-5".to_string(),
                    },
                    shipment_count: *count,
                    carrier_costs,
                }
            })
            .collect();

        let result = optimize(&groups, &[], &[]);
        prop_assert!(result.feasible);
        for carrier in ["a", "b"] {
            let single: Decimal = groups
                .iter()
                .map(|g| g.cost_for(carrier).unwrap().total)
                .sum();
            prop_assert!(result.total_cost <= single);
        }
    }
}
