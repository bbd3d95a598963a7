//! Threshold-aware cutoff grid search.
//!
//! When routing rules are expressed as simple weight cutoffs rather than
//! raw per-group assignment — "up to the light cutoff ships carrier X,
//! up to the heavy cutoff carrier Y, above it carrier Z" — the optimizer
//! brute-forces the bounded 2D space of (light, heavy) cutoff pairs. For
//! each candidate pair it computes the total cost and the qualifying spend
//! routed to the threshold-bearing carrier, retaining the cheapest pair
//! that clears the threshold separately from the cheapest unconstrained
//! pair. An iteration cap keeps the search bounded-time.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

use super::discount::TierAdjustment;

/// Aggregate cost of one lane bracket under one carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneCost {
    /// Total all-in cost for the bracket's shipments.
    pub total: Decimal,
    /// Sum of base-rate components (for tier adjustment of clearing plans).
    pub base: Decimal,
    /// Sum of qualifying spend per the carrier's basis.
    pub qualifying: Decimal,
}

/// One weight bracket of a cutoff lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneBracket {
    /// The bracket's inclusive upper weight bound.
    pub upper: Decimal,
    /// Number of shipments in the bracket.
    pub shipments: u32,
    /// Per-carrier bracket costs, keyed by carrier id.
    pub costs: BTreeMap<String, LaneCost>,
}

/// A routing lane: one optimizer group's weight brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffLane {
    /// The lane key (package type × destination bucket).
    pub key: String,
    /// Weight brackets in ascending order.
    pub brackets: Vec<LaneBracket>,
}

/// A qualifying-spend threshold the search must clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffThreshold {
    /// The threshold-bearing carrier.
    pub carrier: String,
    /// The qualifying spend that unlocks the discount tier.
    pub min_qualifying_spend: Decimal,
    /// Tier adjustment applied to the clearing carrier's cost when
    /// comparing plans that clear the threshold, reflecting the discount
    /// the cleared tier would earn.
    pub tier_adjust: Option<TierAdjustment>,
}

/// Configuration of a cutoff search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffConfig {
    /// Carrier for brackets at or below the light cutoff.
    pub light_carrier: String,
    /// Carrier for brackets between the cutoffs.
    pub mid_carrier: String,
    /// Carrier for brackets above the heavy cutoff.
    pub heavy_carrier: String,
    /// The spend threshold to clear, if any.
    pub threshold: Option<CutoffThreshold>,
    /// Maximum number of cutoff pairs evaluated.
    pub iteration_cap: usize,
}

/// One evaluated cutoff combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffPlan {
    /// The light cutoff: brackets with `upper <= light_cutoff` route light.
    pub light_cutoff: Decimal,
    /// The heavy cutoff: remaining brackets with `upper <= heavy_cutoff`
    /// route mid; the rest route heavy.
    pub heavy_cutoff: Decimal,
    /// Total cost of the combination (tier-adjusted for clearing plans).
    pub total_cost: Decimal,
    /// Qualifying spend routed to the threshold carrier.
    pub threshold_spend: Decimal,
}

/// The outcome of a cutoff search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffSearchResult {
    /// The cheapest combination ignoring the threshold.
    pub best_unconstrained: Option<CutoffPlan>,
    /// The cheapest combination whose threshold spend clears the minimum,
    /// costed at the target tier. `None` when no combination clears: the
    /// threshold is unreachable under this routing scheme, which callers
    /// must surface rather than fall back silently.
    pub best_clearing_threshold: Option<CutoffPlan>,
    /// Number of cutoff pairs evaluated.
    pub evaluated: usize,
    /// True when the iteration cap stopped the search early.
    pub capped: bool,
}

fn evaluate_pair(
    lanes: &[CutoffLane],
    config: &CutoffConfig,
    light: Decimal,
    heavy: Decimal,
) -> Option<(Decimal, Decimal, Decimal)> {
    let mut total = Decimal::ZERO;
    let mut threshold_spend = Decimal::ZERO;
    let mut threshold_base = Decimal::ZERO;
    let threshold_carrier = config.threshold.as_ref().map(|t| t.carrier.as_str());

    for lane in lanes {
        for bracket in &lane.brackets {
            let carrier = if bracket.upper <= light {
                &config.light_carrier
            } else if bracket.upper <= heavy {
                &config.mid_carrier
            } else {
                &config.heavy_carrier
            };
            // A bracket the routed carrier cannot service invalidates the
            // whole combination.
            let cost = bracket.costs.get(carrier)?;
            total += cost.total;
            if threshold_carrier == Some(carrier.as_str()) {
                threshold_spend += cost.qualifying;
                threshold_base += cost.base;
            }
        }
    }
    Some((total, threshold_spend, threshold_base))
}

fn better(candidate: &CutoffPlan, incumbent: &Option<CutoffPlan>) -> bool {
    match incumbent {
        None => true,
        Some(plan) => {
            (
                candidate.total_cost,
                candidate.light_cutoff,
                candidate.heavy_cutoff,
            ) < (plan.total_cost, plan.light_cutoff, plan.heavy_cutoff)
        }
    }
}

/// Searches the 2D space of (light, heavy) cutoff pairs.
///
/// Candidate cutoffs are the distinct bracket upper bounds across all
/// lanes; pairs satisfy `light <= heavy`. Ties on cost break toward the
/// smaller cutoff pair so results are deterministic.
pub fn search(lanes: &[CutoffLane], config: &CutoffConfig) -> CutoffSearchResult {
    let mut cutoffs: Vec<Decimal> = lanes
        .iter()
        .flat_map(|l| l.brackets.iter().map(|b| b.upper))
        .collect();
    cutoffs.sort();
    cutoffs.dedup();

    let mut evaluated = 0;
    let mut capped = false;
    let mut best_unconstrained: Option<CutoffPlan> = None;
    let mut best_clearing: Option<CutoffPlan> = None;

    'outer: for (i, light) in cutoffs.iter().enumerate() {
        for heavy in &cutoffs[i..] {
            if evaluated >= config.iteration_cap {
                capped = true;
                warn!(
                    evaluated,
                    cap = config.iteration_cap,
                    "cutoff search stopped at iteration cap"
                );
                break 'outer;
            }
            evaluated += 1;

            let Some((total, threshold_spend, threshold_base)) =
                evaluate_pair(lanes, config, *light, *heavy)
            else {
                continue;
            };

            let plan = CutoffPlan {
                light_cutoff: *light,
                heavy_cutoff: *heavy,
                total_cost: total,
                threshold_spend,
            };
            if better(&plan, &best_unconstrained) {
                best_unconstrained = Some(plan.clone());
            }

            if let Some(threshold) = &config.threshold {
                if threshold_spend >= threshold.min_qualifying_spend {
                    let adjusted_total = match &threshold.tier_adjust {
                        Some(adjust) => total + adjust.delta(threshold_base),
                        None => total,
                    };
                    let clearing = CutoffPlan {
                        total_cost: adjusted_total,
                        ..plan
                    };
                    if better(&clearing, &best_clearing) {
                        best_clearing = Some(clearing);
                    }
                }
            }
        }
    }

    CutoffSearchResult {
        best_unconstrained,
        best_clearing_threshold: best_clearing,
        evaluated,
        capped,
    }
}
