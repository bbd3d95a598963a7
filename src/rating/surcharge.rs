//! Surcharge resolution.
//!
//! Evaluates a carrier's ordered, declarative surcharge rules against a
//! shipment's derived attributes in two passes: independent rules first
//! (with exclusivity-group resolution), then rules dependent on an earlier
//! rule's outcome (typically seasonal demand surcharges). Allocation-based
//! rules bypass boolean triggering entirely and charge an expected-value
//! amount on every shipment.
//!
//! All numeric thresholds are strictly greater-than, and temporal windows
//! are closed intervals after the billing-lag adjustment. Off-by-one
//! boundary handling here is a primary source of invoice mismatches, so the
//! conventions are applied uniformly and tested at the edges.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{SurchargeRule, Trigger};

use super::ShipmentFacts;

impl Trigger {
    /// Evaluates the predicate against a shipment's derived attributes.
    pub(crate) fn matches(&self, facts: &ShipmentFacts) -> bool {
        match self {
            Trigger::Always => true,
            Trigger::LongestSideOver { inches } => facts.longest > *inches,
            Trigger::SecondLongestSideOver { inches } => facts.second_longest > *inches,
            Trigger::LengthPlusGirthOver { inches } => facts.length_plus_girth > *inches,
            Trigger::ActualWeightOver { pounds } => facts.actual_weight > *pounds,
            Trigger::BillableWeightOver { pounds } => facts.billable_weight > *pounds,
            Trigger::VolumeOver { cubic_inches } => facts.volume > *cubic_inches,
            Trigger::Remote => facts.remote,
            Trigger::PackageType { tag } => facts.package_type == *tag,
            Trigger::ZoneIn { zones } => zones.iter().any(|z| *z == facts.zone),
            Trigger::AllOf { all } => all.iter().all(|t| t.matches(facts)),
            Trigger::AnyOf { any } => any.iter().any(|t| t.matches(facts)),
            Trigger::Not { not } => !not.matches(facts),
        }
    }
}

/// One charged surcharge in a shipment's breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeCharge {
    /// The rule id, used as the cost-component code.
    pub rule_id: String,
    /// The surcharge name.
    pub name: String,
    /// The charged amount (net of contractual discount, allocation-weighted
    /// for allocation rules), rounded to cents.
    pub amount: Decimal,
    /// Whether the charge enters the fuel surcharge base.
    pub fuel_eligible: bool,
    /// True when the amount is an expected-value allocation rather than a
    /// deterministically triggered charge.
    pub allocated: bool,
}

/// The outcome of evaluating a rule set against one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeOutcome {
    /// Charges in rule-declaration order.
    pub charges: Vec<SurchargeCharge>,
    /// Boolean outcome per rule id (allocation rules record their window
    /// applicability).
    pub triggered: BTreeMap<String, bool>,
    /// The maximum billable-weight floor across triggered rules, if any.
    pub weight_floor: Option<Decimal>,
}

fn window_allows(rule: &SurchargeRule, facts: &ShipmentFacts) -> bool {
    match &rule.window {
        None => true,
        Some(w) => {
            let effective = facts.ship_date + Duration::days(w.billing_lag_days);
            w.start <= effective && effective <= w.end
        }
    }
}

/// Resolves an exclusivity group: candidates in ascending priority order
/// (ties by declaration order), first eligible member wins.
fn resolve_group(members: &mut Vec<(usize, &SurchargeRule, bool)>) {
    members.sort_by_key(|(idx, rule, _)| {
        (
            rule.exclusivity.as_ref().map(|e| e.priority).unwrap_or(0),
            *idx,
        )
    });
    let mut winner_seen = false;
    for (_, _, eligible) in members.iter_mut() {
        if winner_seen {
            *eligible = false;
        } else if *eligible {
            winner_seen = true;
        }
    }
}

/// Evaluates a carrier's surcharge rules against one shipment.
///
/// Pass 1 evaluates every independent rule (exclusivity groups resolved by
/// priority; ungrouped rules stack). Pass 2 evaluates dependent rules using
/// Pass-1 outcomes. Allocation rules charge
/// `list_price × (1 − discount) × allocation_rate` on every shipment
/// (subject only to their temporal window); this is a deliberate
/// expected-value amortization of a surcharge the carrier applies
/// inconsistently, not a triggered charge.
pub fn evaluate_surcharges(rules: &[SurchargeRule], facts: &ShipmentFacts) -> SurchargeOutcome {
    let mut triggered: BTreeMap<String, bool> = BTreeMap::new();

    // Pass 1: independent rules.
    let mut pass1_groups: BTreeMap<&str, Vec<(usize, &SurchargeRule, bool)>> = BTreeMap::new();
    for (idx, rule) in rules.iter().enumerate() {
        if rule.is_allocation() || rule.is_dependent() {
            continue;
        }
        let eligible = rule.trigger.matches(facts) && window_allows(rule, facts);
        match &rule.exclusivity {
            Some(excl) => pass1_groups
                .entry(excl.group.as_str())
                .or_default()
                .push((idx, rule, eligible)),
            None => {
                triggered.insert(rule.id.clone(), eligible);
            }
        }
    }
    for members in pass1_groups.values_mut() {
        resolve_group(members);
        for (_, rule, eligible) in members.iter() {
            triggered.insert(rule.id.clone(), *eligible);
        }
    }

    // Pass 2: dependent rules, gated on Pass-1 outcomes.
    let mut pass2_groups: BTreeMap<&str, Vec<(usize, &SurchargeRule, bool)>> = BTreeMap::new();
    for (idx, rule) in rules.iter().enumerate() {
        let Some(parent_id) = &rule.depends_on else {
            continue;
        };
        let parent_triggered = triggered.get(parent_id).copied().unwrap_or(false);
        let eligible =
            parent_triggered && rule.trigger.matches(facts) && window_allows(rule, facts);
        match &rule.exclusivity {
            Some(excl) => pass2_groups
                .entry(excl.group.as_str())
                .or_default()
                .push((idx, rule, eligible)),
            None => {
                triggered.insert(rule.id.clone(), eligible);
            }
        }
    }
    for members in pass2_groups.values_mut() {
        resolve_group(members);
        for (_, rule, eligible) in members.iter() {
            triggered.insert(rule.id.clone(), *eligible);
        }
    }

    // Allocation rules apply to every shipment inside their window.
    for rule in rules.iter().filter(|r| r.is_allocation()) {
        triggered.insert(rule.id.clone(), window_allows(rule, facts));
    }

    // Emit charges in declaration order and collect the strongest floor.
    let mut charges = Vec::new();
    let mut weight_floor: Option<Decimal> = None;
    for rule in rules {
        if !triggered.get(&rule.id).copied().unwrap_or(false) {
            continue;
        }
        let (amount, allocated) = match rule.allocation_rate {
            Some(rate) => ((rule.net_price() * rate).round_dp(2), true),
            None => (rule.net_price(), false),
        };
        charges.push(SurchargeCharge {
            rule_id: rule.id.clone(),
            name: rule.name.clone(),
            amount,
            fuel_eligible: rule.fuel_eligible,
            allocated,
        });
        if !allocated {
            if let Some(floor) = rule.weight_floor {
                weight_floor = Some(weight_floor.map_or(floor, |f| f.max(floor)));
            }
        }
    }

    SurchargeOutcome {
        charges,
        triggered,
        weight_floor,
    }
}
