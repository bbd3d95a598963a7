//! Discount-tier adjustment.
//!
//! Recomputes costs under an alternate discount tier via a multiplicative
//! delta on the base-rate component only:
//! `delta = base × (target_factor / baked_factor − 1) × (1 + fuel_rate)`,
//! where `factor = 1 − (sum of discounts at that tier)`.
//!
//! The adjustment is applied per service using that service's own base-rate
//! component — applying one service's delta to another's total silently
//! corrupts shipments near the service cost crossover — and service
//! selection re-runs after adjustment since the relative ranking can
//! change. No rounding happens inside the adjuster, so inverting the
//! factors recovers the original cost exactly (up to division precision).

use rust_decimal::Decimal;

use crate::config::QualifyingBasis;
use crate::models::{GroupCarrierCost, ServiceCost};

/// A move from a carrier's baked discount tier to a target tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierAdjustment {
    /// The rate factor the stored rates are net of.
    pub baked_factor: Decimal,
    /// The rate factor of the target tier.
    pub target_factor: Decimal,
    /// The carrier's fuel rate, since fuel is levied on the base rate.
    pub fuel_rate: Decimal,
}

impl TierAdjustment {
    /// Returns the ratio the base-rate component scales by.
    pub fn ratio(&self) -> Decimal {
        self.target_factor / self.baked_factor
    }

    /// Returns the total-cost delta for a given base-rate component.
    pub fn delta(&self, base_rate: Decimal) -> Decimal {
        base_rate * (self.ratio() - Decimal::ONE) * (Decimal::ONE + self.fuel_rate)
    }

    /// Returns the inverse adjustment (target back to baked).
    pub fn inverse(&self) -> TierAdjustment {
        TierAdjustment {
            baked_factor: self.target_factor,
            target_factor: self.baked_factor,
            fuel_rate: self.fuel_rate,
        }
    }

    /// Adjusts one service's cost, rescaling its base-rate component so the
    /// adjustment composes and inverts cleanly.
    pub fn apply_service(&self, cost: &ServiceCost) -> ServiceCost {
        ServiceCost {
            service: cost.service.clone(),
            total: cost.total + self.delta(cost.base_rate),
            base_rate: cost.base_rate * self.ratio(),
        }
    }

    /// Adjusts a group-level aggregate cost.
    ///
    /// The qualifying total follows the carrier's basis: an
    /// undiscounted-base basis is invariant under tier moves, while
    /// base-rate and total bases track the adjusted amounts.
    pub fn apply_group(&self, cost: &GroupCarrierCost, basis: QualifyingBasis) -> GroupCarrierCost {
        let total = cost.total + self.delta(cost.base_total);
        let base_total = cost.base_total * self.ratio();
        let qualifying_total = match basis {
            QualifyingBasis::UndiscountedBase => cost.qualifying_total,
            QualifyingBasis::BaseRate => base_total,
            QualifyingBasis::Total => total,
        };
        GroupCarrierCost {
            total,
            base_total,
            qualifying_total,
        }
    }
}

/// Adjusts every service of a shipment and re-selects the cheapest.
///
/// Each service is adjusted by its own base-rate component; ties break
/// toward the lexically smallest service code.
pub fn adjust_and_select(services: &[ServiceCost], adj: &TierAdjustment) -> Option<ServiceCost> {
    services
        .iter()
        .map(|s| adj.apply_service(s))
        .min_by(|a, b| a.total.cmp(&b.total).then_with(|| a.service.cmp(&b.service)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn adjustment() -> TierAdjustment {
        TierAdjustment {
            baked_factor: dec("0.68"),
            target_factor: dec("0.62"),
            fuel_rate: dec("0.145"),
        }
    }

    #[test]
    fn test_delta_formula() {
        // ratio = 0.62/0.68; delta = 10 * (ratio - 1) * 1.145
        let adj = TierAdjustment {
            baked_factor: dec("0.5"),
            target_factor: dec("0.6"),
            fuel_rate: Decimal::ZERO,
        };
        // ratio 1.2 → delta = 10 * 0.2 = 2
        assert_eq!(adj.delta(dec("10")), dec("2.0"));
    }

    #[test]
    fn test_deeper_discount_lowers_cost() {
        let adj = adjustment();
        let cost = ServiceCost {
            service: "ground".to_string(),
            total: dec("24.03"),
            base_rate: dec("18.60"),
        };
        let adjusted = adj.apply_service(&cost);
        assert!(adjusted.total < cost.total);
        assert!(adjusted.base_rate < cost.base_rate);
    }

    #[test]
    fn test_round_trip_recovers_original() {
        let adj = TierAdjustment {
            baked_factor: dec("0.5"),
            target_factor: dec("0.625"),
            fuel_rate: dec("0.10"),
        };
        let cost = ServiceCost {
            service: "ground".to_string(),
            total: dec("24.03"),
            base_rate: dec("18.60"),
        };
        let there = adj.apply_service(&cost);
        let back = adj.inverse().apply_service(&there);
        assert_eq!(back.total, cost.total);
        assert_eq!(back.base_rate, cost.base_rate);
    }

    #[test]
    fn test_each_service_adjusts_by_its_own_base() {
        // Near the crossover: select is cheaper as rated, but carries a
        // larger base-rate component, so a shallower target tier raises it
        // past ground. Applying ground's delta to both totals would keep
        // select selected — the exact corruption this guards against.
        let adj = TierAdjustment {
            baked_factor: dec("0.5"),
            target_factor: dec("0.6"),
            fuel_rate: Decimal::ZERO,
        };
        let ground = ServiceCost {
            service: "ground".to_string(),
            total: dec("20.00"),
            base_rate: dec("15.00"),
        };
        let select = ServiceCost {
            service: "select".to_string(),
            total: dec("19.50"),
            base_rate: dec("18.00"),
        };

        let chosen = adjust_and_select(&[ground.clone(), select.clone()], &adj).unwrap();
        // ground: 20 + 15*0.2 = 23.00; select: 19.5 + 18*0.2 = 23.10
        assert_eq!(chosen.service, "ground");
        assert_eq!(chosen.total, dec("23.00"));

        // The naive shared delta would have left select in front.
        let shared_delta = adj.delta(ground.base_rate);
        assert!(select.total + shared_delta < ground.total + shared_delta);
    }

    #[test]
    fn test_group_adjustment_undiscounted_basis_is_invariant() {
        let adj = adjustment();
        let cost = GroupCarrierCost {
            total: dec("240.30"),
            base_total: dec("186.00"),
            qualifying_total: dec("273.53"),
        };
        let adjusted = adj.apply_group(&cost, QualifyingBasis::UndiscountedBase);
        assert_eq!(adjusted.qualifying_total, cost.qualifying_total);
        assert!(adjusted.total < cost.total);
    }

    #[test]
    fn test_group_adjustment_total_basis_tracks_total() {
        let adj = adjustment();
        let cost = GroupCarrierCost {
            total: dec("240.30"),
            base_total: dec("186.00"),
            qualifying_total: dec("240.30"),
        };
        let adjusted = adj.apply_group(&cost, QualifyingBasis::Total);
        assert_eq!(adjusted.qualifying_total, adjusted.total);
    }
}
