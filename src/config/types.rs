//! Configuration types for carrier rate cards.
//!
//! This module contains the strongly-typed configuration structures that are
//! deserialized from YAML configuration files, plus the built runtime types
//! (with precomputed derived data) the rating pipeline consumes. Reference
//! data is loaded once per run and treated as immutable for the duration.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Metadata identifying a carrier contract.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierMetadata {
    /// The carrier identifier (e.g. "apex").
    pub id: String,
    /// The human-readable carrier name.
    pub name: String,
    /// The rate-card version or effective period (e.g. "2026-01").
    pub version: String,
}

/// How the fuel surcharge base is defined for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelBasis {
    /// Base rate plus fuel-eligible surcharges (the common contract form).
    BaseAndEligibleSurcharges,
    /// The full subtotal, including every surcharge.
    FullSubtotal,
}

/// Fuel surcharge configuration for a service.
///
/// The base the percentage applies to is a frequent source of discrepancy
/// against real invoices, so it is pinned explicitly per carrier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FuelConfig {
    /// The fuel surcharge rate as a fraction (e.g. "0.145").
    pub rate: Decimal,
    /// Which amounts the rate applies to.
    pub basis: FuelBasis,
}

/// Per-service physical rating parameters from `carrier.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// The service code (e.g. "ground").
    pub code: String,
    /// Dimensional-weight divisor (cubic inches per pound).
    pub dim_divisor: Decimal,
    /// Volume threshold above which dimensional weight is considered.
    ///
    /// `None` means dimensional weight is always compared against actual.
    #[serde(default)]
    pub dim_threshold_cuin: Option<Decimal>,
    /// Maximum billable weight the rate table covers; heavier shipments are
    /// capped at this weight for lookup.
    pub max_billable_weight: Decimal,
    /// Fuel surcharge configuration, absent for carriers without fuel.
    #[serde(default)]
    pub fuel: Option<FuelConfig>,
}

/// The `carrier.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierFile {
    /// Carrier metadata.
    pub carrier: CarrierMetadata,
    /// The services offered under this contract.
    pub services: Vec<ServiceConfig>,
}

/// One postal-code entry in a zone table, as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneEntryConfig {
    /// The destination postal code.
    pub postal: String,
    /// The zone code for this destination.
    pub zone: String,
    /// Whether the destination carries the remote/extended-delivery flag.
    #[serde(default)]
    pub remote: bool,
}

/// The `zones.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneFile {
    /// The fixed zone used when both exact and region lookups miss.
    pub default_zone: String,
    /// Postal-code prefix length defining the region fallback bucket.
    pub region_prefix_len: usize,
    /// Zone entries per origin facility.
    pub origins: HashMap<String, Vec<ZoneEntryConfig>>,
}

/// A resolved zone-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// The zone code.
    pub zone: String,
    /// The remote/extended-delivery flag.
    pub remote: bool,
}

/// Zone entries for one origin facility, with precomputed region fallbacks.
#[derive(Debug, Clone)]
pub struct OriginZones {
    entries: HashMap<String, ZoneEntry>,
    region_modes: HashMap<String, String>,
}

impl OriginZones {
    /// Returns the exact entry for a postal code, if configured.
    pub fn entry(&self, postal: &str) -> Option<&ZoneEntry> {
        self.entries.get(postal)
    }

    /// Returns the precomputed most-frequent zone for a region bucket.
    pub fn region_mode(&self, region: &str) -> Option<&str> {
        self.region_modes.get(region).map(|z| z.as_str())
    }
}

/// A carrier's zone table with precomputed region fallbacks.
///
/// Built once per load; the most frequently occurring zone within each
/// region (postal-code prefix) is precomputed so per-shipment resolution is
/// a pair of map lookups. Mode ties break toward the lexically smallest
/// zone so resolution is deterministic.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    default_zone: String,
    region_prefix_len: usize,
    origins: HashMap<String, OriginZones>,
}

impl ZoneTable {
    /// Builds a zone table from its configuration, precomputing the
    /// per-origin region fallback modes.
    pub fn build(file: ZoneFile) -> Self {
        let mut origins = HashMap::new();
        for (origin, entries) in file.origins {
            let mut map = HashMap::new();
            let mut counts: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
            for e in entries {
                let region = region_of(&e.postal, file.region_prefix_len);
                *counts
                    .entry(region)
                    .or_default()
                    .entry(e.zone.clone())
                    .or_insert(0) += 1;
                map.insert(
                    e.postal,
                    ZoneEntry {
                        zone: e.zone,
                        remote: e.remote,
                    },
                );
            }
            let mut region_modes = HashMap::new();
            for (region, zones) in counts {
                // BTreeMap iterates zones in order, so on a tie the lexically
                // smallest zone is kept.
                if let Some(mode) = zones
                    .iter()
                    .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                {
                    region_modes.insert(region, mode.0.clone());
                }
            }
            origins.insert(
                origin,
                OriginZones {
                    entries: map,
                    region_modes,
                },
            );
        }
        Self {
            default_zone: file.default_zone,
            region_prefix_len: file.region_prefix_len,
            origins,
        }
    }

    /// Returns the fixed default zone.
    pub fn default_zone(&self) -> &str {
        &self.default_zone
    }

    /// Returns the region bucket for a postal code.
    pub fn region_of(&self, postal: &str) -> String {
        region_of(postal, self.region_prefix_len)
    }

    /// Returns the zone entries for an origin facility.
    pub fn origin(&self, origin: &str) -> Option<&OriginZones> {
        self.origins.get(origin)
    }
}

fn region_of(postal: &str, prefix_len: usize) -> String {
    postal.chars().take(prefix_len).collect()
}

/// A declarative surcharge trigger predicate.
///
/// Predicates reference shipment-derived attributes only; rules evaluated
/// against other rules' outcomes use `depends_on` instead. All numeric
/// comparisons are strictly greater-than — a value exactly at a threshold
/// does not trigger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Always true. The default when a rule omits its trigger.
    Always,
    /// Longest side strictly greater than the threshold (inches).
    LongestSideOver {
        /// Threshold in inches.
        inches: Decimal,
    },
    /// Second-longest side strictly greater than the threshold (inches).
    SecondLongestSideOver {
        /// Threshold in inches.
        inches: Decimal,
    },
    /// Length plus girth strictly greater than the threshold (inches).
    LengthPlusGirthOver {
        /// Threshold in inches.
        inches: Decimal,
    },
    /// Actual scale weight strictly greater than the threshold (pounds).
    ActualWeightOver {
        /// Threshold in pounds.
        pounds: Decimal,
    },
    /// Billable weight (pre-floor) strictly greater than the threshold.
    BillableWeightOver {
        /// Threshold in pounds.
        pounds: Decimal,
    },
    /// Volume strictly greater than the threshold (cubic inches).
    VolumeOver {
        /// Threshold in cubic inches.
        cubic_inches: Decimal,
    },
    /// The destination carries the remote/extended-delivery flag.
    Remote,
    /// The shipment's package-type tag equals the given tag.
    PackageType {
        /// The package-type tag to match.
        tag: String,
    },
    /// The resolved zone is one of the listed zones.
    ZoneIn {
        /// The zone codes that satisfy the predicate.
        zones: Vec<String>,
    },
    /// Every inner predicate holds.
    AllOf {
        /// The conjunct predicates.
        all: Vec<Trigger>,
    },
    /// At least one inner predicate holds.
    AnyOf {
        /// The disjunct predicates.
        any: Vec<Trigger>,
    },
    /// The inner predicate does not hold.
    Not {
        /// The negated predicate.
        not: Box<Trigger>,
    },
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Always
    }
}

/// Exclusivity-group membership of a surcharge rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Exclusivity {
    /// The exclusivity group id.
    pub group: String,
    /// Priority within the group; lower numbers win.
    pub priority: u32,
}

/// A temporal applicability window for a surcharge rule.
///
/// Windows are closed intervals: both `start` and `end` are inclusive. The
/// billing lag is added to the ship date before the window check,
/// reflecting the delay between shipment and invoice dating.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurchargeWindow {
    /// First date (inclusive) the rule applies.
    pub start: NaiveDate,
    /// Last date (inclusive) the rule applies.
    pub end: NaiveDate,
    /// Days added to the ship date before the window check.
    #[serde(default)]
    pub billing_lag_days: i64,
}

/// A declarative surcharge rule record.
///
/// Rules are data evaluated by one generic interpreter, not types; the
/// two-pass (independent/dependent) evaluation order is a property of the
/// interpreter rather than of rule declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurchargeRule {
    /// Stable rule identifier, also used as the cost-component code.
    pub id: String,
    /// Human-readable surcharge name.
    pub name: String,
    /// Trigger predicate; defaults to `Always`.
    #[serde(default)]
    pub trigger: Trigger,
    /// The carrier's list price for the surcharge.
    pub list_price: Decimal,
    /// Contractual discount off list, as a fraction in `[0, 1)`.
    #[serde(default)]
    pub discount: Decimal,
    /// Exclusivity-group membership, if any.
    #[serde(default)]
    pub exclusivity: Option<Exclusivity>,
    /// Id of the rule whose triggered outcome gates this rule.
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Billable-weight floor applied when this rule triggers.
    #[serde(default)]
    pub weight_floor: Option<Decimal>,
    /// Expected-value allocation rate in `(0, 1]`.
    ///
    /// Present only on allocation-based rules, whose true per-shipment
    /// trigger is unobservable; the cost applies to every shipment at this
    /// rate regardless of the trigger predicate.
    #[serde(default)]
    pub allocation_rate: Option<Decimal>,
    /// Temporal applicability window, if any.
    #[serde(default)]
    pub window: Option<SurchargeWindow>,
    /// Whether the surcharge is part of the fuel surcharge base.
    #[serde(default)]
    pub fuel_eligible: bool,
}

impl SurchargeRule {
    /// Returns the contractual net price (`list_price × (1 − discount)`),
    /// rounded to cents.
    pub fn net_price(&self) -> Decimal {
        (self.list_price * (Decimal::ONE - self.discount)).round_dp(2)
    }

    /// Returns true for allocation-based rules.
    pub fn is_allocation(&self) -> bool {
        self.allocation_rate.is_some()
    }

    /// Returns true for rules gated on another rule's outcome.
    pub fn is_dependent(&self) -> bool {
        self.depends_on.is_some()
    }
}

/// One row of a weight-bracket rate table.
///
/// Brackets are lower-exclusive, upper-inclusive: a weight `w` falls in the
/// bracket when `lower < w <= upper`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightBracket {
    /// Exclusive lower bound in pounds.
    pub lower: Decimal,
    /// Inclusive upper bound in pounds.
    pub upper: Decimal,
    /// Price per zone code.
    pub prices: BTreeMap<String, Decimal>,
}

/// A full-override oversize rate path.
///
/// When the trigger holds, the weight-based bracket lookup is bypassed
/// entirely in favor of a flat zone-indexed rate.
#[derive(Debug, Clone, Deserialize)]
pub struct OversizeRate {
    /// The oversize condition (typically length plus girth).
    pub trigger: Trigger,
    /// Flat price per zone code.
    pub prices: BTreeMap<String, Decimal>,
}

/// A service's weight × zone rate table.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// Weight brackets, sorted ascending and contiguous from zero.
    pub brackets: Vec<WeightBracket>,
    /// Optional oversize override path.
    #[serde(default)]
    pub oversize: Option<OversizeRate>,
}

/// The `rates.yaml` file structure: one rate table per service code.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesFile {
    /// Rate tables keyed by service code.
    pub services: HashMap<String, RateTable>,
}

/// The `surcharges.yaml` file structure: one rule list per service code.
#[derive(Debug, Clone, Deserialize)]
pub struct SurchargesFile {
    /// Ordered surcharge rules keyed by service code.
    pub services: HashMap<String, Vec<SurchargeRule>>,
}

/// Which cost component a carrier's spend threshold is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifyingBasis {
    /// The undiscounted equivalent of the base rate (`base / baked_factor`).
    UndiscountedBase,
    /// The base-rate component as rated.
    BaseRate,
    /// The all-in shipment total.
    Total,
}

/// One earned discount tier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscountTier {
    /// The tier name (e.g. "tier_2").
    pub name: String,
    /// Qualifying spend at which the tier is earned.
    pub threshold: Decimal,
    /// The discounts granted at this tier, as fractions of list.
    pub discounts: Vec<Decimal>,
}

impl DiscountTier {
    /// Returns the multiplicative rate factor at this tier:
    /// `1 − (sum of all discounts)`.
    pub fn factor(&self) -> Decimal {
        Decimal::ONE - self.discounts.iter().copied().sum::<Decimal>()
    }
}

/// A carrier's earned-discount schedule (`discounts.yaml`).
///
/// Stored rate-table prices are net of the *baked* tier; the baked factor is
/// an explicit, versioned constant used to derive undiscounted equivalents
/// for threshold checks. Whether that constant matches the carrier's actual
/// netting should be validated against a known invoice sample when
/// onboarding a carrier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscountSchedule {
    /// The component qualifying spend is measured on.
    pub qualifying_basis: QualifyingBasis,
    /// The tier the stored rates are already net of.
    pub baked_tier: String,
    /// Earned tiers, sorted ascending by threshold.
    pub tiers: Vec<DiscountTier>,
}

impl DiscountSchedule {
    /// Returns the tier with the given name.
    pub fn tier(&self, name: &str) -> Option<&DiscountTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Returns the rate factor of the baked tier.
    ///
    /// Validation guarantees the baked tier exists; a missing tier reads as
    /// factor 1 rather than panicking.
    pub fn baked_factor(&self) -> Decimal {
        self.tier(&self.baked_tier)
            .map(DiscountTier::factor)
            .unwrap_or(Decimal::ONE)
    }

    /// Returns the highest tier earned at the given qualifying spend.
    ///
    /// Falls back to the first (lowest) tier when the spend clears no
    /// threshold at all.
    pub fn earned_tier(&self, qualifying_spend: Decimal) -> Option<&DiscountTier> {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.threshold <= qualifying_spend)
            .or_else(|| self.tiers.first())
    }

    /// Returns the qualifying spend contributed by one shipment, given its
    /// base-rate component and all-in total.
    pub fn qualifying_amount(&self, base_rate: Decimal, total: Decimal) -> Decimal {
        match self.qualifying_basis {
            QualifyingBasis::UndiscountedBase => {
                let factor = self.baked_factor();
                if factor > Decimal::ZERO {
                    base_rate / factor
                } else {
                    base_rate
                }
            }
            QualifyingBasis::BaseRate => base_rate,
            QualifyingBasis::Total => total,
        }
    }
}

/// The complete rate card for one carrier service.
///
/// Owns every piece of static reference data the rating pipeline needs:
/// zone table, rate table, dimensional parameters, fuel, and surcharge
/// rules. Built once per load and immutable thereafter.
#[derive(Debug, Clone)]
pub struct CarrierRateCard {
    /// The carrier identifier.
    pub carrier: String,
    /// The service code.
    pub service: String,
    /// The rate-card version.
    pub version: String,
    /// The carrier's zone table.
    pub zones: ZoneTable,
    /// The service's weight × zone rate table.
    pub rates: RateTable,
    /// Dimensional-weight divisor.
    pub dim_divisor: Decimal,
    /// Volume threshold gating dimensional weight; `None` = always compare.
    pub dim_threshold_cuin: Option<Decimal>,
    /// Maximum billable weight for rate lookup.
    pub max_billable_weight: Decimal,
    /// Fuel surcharge configuration.
    pub fuel: Option<FuelConfig>,
    /// Ordered surcharge rules for this service.
    pub surcharges: Vec<SurchargeRule>,
}

impl CarrierRateCard {
    /// Returns the fuel surcharge rate, or zero without a fuel config.
    pub fn fuel_rate(&self) -> Decimal {
        self.fuel.as_ref().map(|f| f.rate).unwrap_or(Decimal::ZERO)
    }
}

/// All services of one carrier plus its discount schedule.
#[derive(Debug, Clone)]
pub struct CarrierProfile {
    /// The carrier identifier.
    pub carrier: String,
    /// The human-readable carrier name.
    pub name: String,
    /// The rate-card version.
    pub version: String,
    /// One rate card per service.
    pub services: Vec<CarrierRateCard>,
    /// The carrier's earned-discount schedule.
    pub discounts: DiscountSchedule,
}

impl CarrierProfile {
    /// Returns the rate card for a service code.
    pub fn service(&self, code: &str) -> Option<&CarrierRateCard> {
        self.services.iter().find(|s| s.service == code)
    }

    /// Returns the carrier's fuel rate.
    ///
    /// Validation guarantees all services of a profile share one fuel rate,
    /// so the first configured rate is representative.
    pub fn fuel_rate(&self) -> Decimal {
        self.services
            .iter()
            .find_map(|s| s.fuel.as_ref().map(|f| f.rate))
            .unwrap_or(Decimal::ZERO)
    }
}
