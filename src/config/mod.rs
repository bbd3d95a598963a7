//! Carrier configuration for the rating engine.
//!
//! Static reference data (zone tables, rate tables, surcharge definitions,
//! discount schedules) is loaded once per run from YAML directories and
//! treated as immutable for the duration — an explicit, passed-in
//! configuration object per carrier rather than ambient global state.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CarrierFile, CarrierMetadata, CarrierProfile, CarrierRateCard, DiscountSchedule, DiscountTier,
    Exclusivity, FuelBasis, FuelConfig, OriginZones, OversizeRate, QualifyingBasis, RateTable,
    RatesFile, ServiceConfig, SurchargeRule, SurchargeWindow, SurchargesFile, Trigger,
    WeightBracket, ZoneEntry, ZoneEntryConfig, ZoneFile, ZoneTable,
};
