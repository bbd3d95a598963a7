//! Greedy assignment and iterative constraint repair.
//!
//! The optimizer assigns each group to its cheapest serviceable carrier,
//! then repairs minimum-volume commitments in a fixed carrier order
//! (the order constraints are supplied), reassigning the groups with the
//! smallest cost penalty first and locking repaired carriers so one
//! carrier's repair cannot undo another's. Discount-tier feedback re-derives
//! a carrier's group costs when the assignment's qualifying spend earns a
//! different tier than the one baked into its rates, then re-runs
//! assignment, bounded by a small iteration cap.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CarrierProfile;
use crate::models::{
    AssignmentGroup, CarrierUsage, Constraint, ConstraintStatus, OptimizationResult,
};

use super::discount::TierAdjustment;

/// Upper bound on assign → tier-check → adjust cycles.
///
/// Shifting volume changes which tier a carrier earns, which changes its
/// costs, which can change the assignment; the loop converges quickly in
/// practice and is capped to stay bounded when tiers oscillate.
pub const MAX_TIER_ITERATIONS: u32 = 4;

/// Assigns every group to its cheapest serviceable carrier.
///
/// Groups with no serviceable carrier are left unassigned (and logged);
/// they cannot participate in the optimization at all.
pub fn greedy_assignment(groups: &[AssignmentGroup]) -> BTreeMap<String, String> {
    let mut assignment = BTreeMap::new();
    for group in groups {
        match group.cheapest_carrier() {
            Some((carrier, _)) => {
                assignment.insert(group.key.label(), carrier.to_string());
            }
            None => {
                warn!(group = %group.key.label(), "group has no serviceable carrier");
            }
        }
    }
    assignment
}

/// Repairs minimum-volume commitments, in constraint order.
///
/// For each under-filled carrier, candidate groups currently assigned to
/// other, not-yet-locked carriers are sorted ascending by penalty
/// `(avg_cost_at_target − avg_cost_at_current) × shipment_count` (ties by
/// group key) and reassigned cumulatively until the minimum holds.
/// Reassigned groups lock immediately; once a carrier's minimum is met,
/// every group it holds locks before the next constraint is processed.
fn repair_minimums(
    groups: &[AssignmentGroup],
    constraints: &[Constraint],
    mut assignment: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut locked: BTreeSet<String> = BTreeSet::new();

    for constraint in constraints {
        let Constraint::MinimumVolume {
            carrier,
            min_shipments,
        } = constraint
        else {
            continue;
        };

        let mut count: u32 = groups
            .iter()
            .filter(|g| assignment.get(&g.key.label()).is_some_and(|c| c == carrier))
            .map(|g| g.shipment_count)
            .sum();

        if count < *min_shipments {
            let mut candidates: Vec<(Decimal, String, u32)> = Vec::new();
            for group in groups {
                let label = group.key.label();
                let Some(current) = assignment.get(&label) else {
                    continue;
                };
                if current == carrier || locked.contains(&label) {
                    continue;
                }
                let (Some(target_cost), Some(current_cost)) =
                    (group.cost_for(carrier), group.cost_for(current))
                else {
                    continue;
                };
                let penalty = (target_cost.average(group.shipment_count)
                    - current_cost.average(group.shipment_count))
                    * Decimal::from(group.shipment_count);
                candidates.push((penalty, label, group.shipment_count));
            }
            candidates.sort();

            for (penalty, label, shipments) in candidates {
                if count >= *min_shipments {
                    break;
                }
                debug!(
                    group = %label,
                    carrier = %carrier,
                    penalty = %penalty,
                    "reassigning group to meet minimum-volume commitment"
                );
                assignment.insert(label.clone(), carrier.clone());
                locked.insert(label);
                count += shipments;
            }
        }

        if count >= *min_shipments {
            for group in groups {
                let label = group.key.label();
                if assignment.get(&label).is_some_and(|c| c == carrier) {
                    locked.insert(label);
                }
            }
        } else {
            warn!(
                carrier = %carrier,
                assigned = count,
                required = min_shipments,
                "minimum-volume commitment cannot be met"
            );
        }
    }

    assignment
}

/// Computes per-carrier volume and spend under an assignment.
fn usage_of(
    groups: &[AssignmentGroup],
    assignment: &BTreeMap<String, String>,
) -> BTreeMap<String, CarrierUsage> {
    let mut usage: BTreeMap<String, CarrierUsage> = BTreeMap::new();
    for group in groups {
        let Some(carrier) = assignment.get(&group.key.label()) else {
            continue;
        };
        let Some(cost) = group.cost_for(carrier) else {
            continue;
        };
        let entry = usage.entry(carrier.clone()).or_default();
        entry.shipments += group.shipment_count;
        entry.spend += cost.total;
        entry.qualifying_spend += cost.qualifying_total;
    }
    usage
}

/// Runs the carrier-mix optimization: greedy assignment, minimum-volume
/// repair, and discount-tier feedback.
///
/// `profiles` supplies the discount schedules and fuel rates used for tier
/// feedback; carriers without a profile keep their as-rated costs. The
/// result carries per-constraint satisfied flags and an explicit
/// feasibility flag — combined minimums exceeding the available volume or
/// an unreachable spend threshold surface as `feasible: false`, never as a
/// silently reported best-effort cost.
pub fn optimize(
    groups: &[AssignmentGroup],
    constraints: &[Constraint],
    profiles: &[CarrierProfile],
) -> OptimizationResult {
    let total_volume: u32 = groups.iter().map(|g| g.shipment_count).sum();
    let committed: u32 = constraints
        .iter()
        .filter_map(|c| match c {
            Constraint::MinimumVolume { min_shipments, .. } => Some(*min_shipments),
            _ => None,
        })
        .sum();
    if committed > total_volume {
        warn!(
            committed,
            total_volume, "combined minimum-volume commitments exceed available volume"
        );
    }

    let mut working: Vec<AssignmentGroup> = groups.to_vec();
    let mut current_tiers: BTreeMap<String, String> = profiles
        .iter()
        .map(|p| (p.carrier.clone(), p.discounts.baked_tier.clone()))
        .collect();

    let mut assignment = BTreeMap::new();
    for _ in 0..MAX_TIER_ITERATIONS {
        assignment = repair_minimums(&working, constraints, greedy_assignment(&working));
        let usage = usage_of(&working, &assignment);

        let mut changed = false;
        for profile in profiles {
            let Some(carrier_usage) = usage.get(&profile.carrier) else {
                continue;
            };
            let Some(earned) = profile
                .discounts
                .earned_tier(carrier_usage.qualifying_spend)
            else {
                continue;
            };
            let current = current_tiers
                .get(&profile.carrier)
                .cloned()
                .unwrap_or_else(|| profile.discounts.baked_tier.clone());
            if earned.name == current {
                continue;
            }

            debug!(
                carrier = %profile.carrier,
                from = %current,
                to = %earned.name,
                "re-deriving carrier costs at earned discount tier"
            );
            let adjustment = TierAdjustment {
                baked_factor: profile.discounts.baked_factor(),
                target_factor: earned.factor(),
                fuel_rate: profile.fuel_rate(),
            };
            for (original, work) in groups.iter().zip(working.iter_mut()) {
                if let Some(cost) = original.cost_for(&profile.carrier) {
                    work.carrier_costs.insert(
                        profile.carrier.clone(),
                        adjustment.apply_group(cost, profile.discounts.qualifying_basis),
                    );
                }
            }
            current_tiers.insert(profile.carrier.clone(), earned.name.clone());
            changed = true;
        }
        if !changed {
            break;
        }
    }

    let usage = usage_of(&working, &assignment);
    let total_cost: Decimal = usage.values().map(|u| u.spend).sum();

    let constraint_status: Vec<ConstraintStatus> = constraints
        .iter()
        .map(|constraint| {
            let carrier_usage = usage.get(constraint.carrier()).cloned().unwrap_or_default();
            let satisfied = match constraint {
                Constraint::MinimumVolume { min_shipments, .. } => {
                    carrier_usage.shipments >= *min_shipments
                }
                Constraint::SpendThreshold {
                    min_qualifying_spend,
                    ..
                } => carrier_usage.qualifying_spend >= *min_qualifying_spend,
            };
            ConstraintStatus {
                constraint: constraint.clone(),
                satisfied,
            }
        })
        .collect();

    let feasible = constraint_status.iter().all(|s| s.satisfied);
    if !feasible {
        warn!("optimization result is infeasible under the supplied constraints");
    }

    OptimizationResult {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        assignments: assignment,
        total_cost,
        carrier_usage: usage,
        constraint_status,
        feasible,
    }
}
