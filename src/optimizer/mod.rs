//! Constrained carrier-mix optimization.
//!
//! Consumes the rating pipeline's per-(group, carrier) costs and produces a
//! cost-minimizing assignment subject to minimum-volume commitments and
//! discount-tier spend thresholds. The optimizer runs single-threaded over
//! pre-aggregated group data; determinism rests on the fixed constraint
//! order during repair, not on any execution order.

mod assignment;
mod cutoff;
mod discount;
mod grouping;

pub use assignment::{MAX_TIER_ITERATIONS, greedy_assignment, optimize};
pub use cutoff::{
    CutoffConfig, CutoffLane, CutoffPlan, CutoffSearchResult, CutoffThreshold, LaneBracket,
    LaneCost, search,
};
pub use discount::{TierAdjustment, adjust_and_select};
pub use grouping::{GroupingConfig, build_groups};
