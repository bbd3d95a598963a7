//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading carrier
//! configuration from YAML directories. Loading is the only fatal-error
//! surface in the engine: a profile that loads successfully can rate any
//! shipment without raising.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{
    CarrierFile, CarrierProfile, CarrierRateCard, RatesFile, SurchargeRule, SurchargesFile,
    ZoneFile, ZoneTable,
};

/// Loads carrier profiles from YAML configuration directories.
///
/// # Directory Structure
///
/// Each carrier directory has the following structure:
/// ```text
/// config/carriers/apex/
/// ├── carrier.yaml     # metadata + per-service rating parameters
/// ├── zones.yaml       # zone table with per-origin entries
/// ├── rates.yaml       # per-service weight × zone rate tables
/// ├── surcharges.yaml  # per-service surcharge rule lists
/// └── discounts.yaml   # earned-discount schedule
/// ```
///
/// # Example
///
/// ```no_run
/// use rating_engine::config::ConfigLoader;
///
/// let profile = ConfigLoader::load("./config/carriers/apex")?;
/// println!("Loaded {} with {} services", profile.name, profile.services.len());
/// # Ok::<(), rating_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads one carrier profile from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the carrier directory (e.g. "./config/carriers/apex")
    ///
    /// # Returns
    ///
    /// Returns a validated [`CarrierProfile`], or an error if any required
    /// file is missing, contains invalid YAML, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<CarrierProfile> {
        let path = path.as_ref();

        let carrier_file = Self::load_yaml::<CarrierFile>(&path.join("carrier.yaml"))?;
        let zone_file = Self::load_yaml::<ZoneFile>(&path.join("zones.yaml"))?;
        let mut rates_file = Self::load_yaml::<RatesFile>(&path.join("rates.yaml"))?;
        let mut surcharges_file = Self::load_yaml::<SurchargesFile>(&path.join("surcharges.yaml"))?;
        let discounts = Self::load_yaml(&path.join("discounts.yaml"))?;

        let carrier_id = carrier_file.carrier.id.clone();
        let zones = ZoneTable::build(zone_file);

        let mut services = Vec::new();
        for svc in carrier_file.services {
            let rates = rates_file.services.remove(&svc.code).ok_or_else(|| {
                EngineError::InvalidRateCard {
                    carrier: carrier_id.clone(),
                    message: format!("no rate table for service '{}'", svc.code),
                }
            })?;
            let surcharges = surcharges_file
                .services
                .remove(&svc.code)
                .unwrap_or_default();

            services.push(CarrierRateCard {
                carrier: carrier_id.clone(),
                service: svc.code,
                version: carrier_file.carrier.version.clone(),
                zones: zones.clone(),
                rates,
                dim_divisor: svc.dim_divisor,
                dim_threshold_cuin: svc.dim_threshold_cuin,
                max_billable_weight: svc.max_billable_weight,
                fuel: svc.fuel,
                surcharges,
            });
        }

        let profile = CarrierProfile {
            carrier: carrier_id,
            name: carrier_file.carrier.name,
            version: carrier_file.carrier.version,
            services,
            discounts,
        };

        validate_profile(&profile)?;

        info!(
            carrier = %profile.carrier,
            services = profile.services.len(),
            rules = profile
                .services
                .iter()
                .map(|s| s.surcharges.len())
                .sum::<usize>(),
            "Loaded carrier profile"
        );

        Ok(profile)
    }

    /// Loads every carrier profile found under a parent directory.
    ///
    /// Subdirectories are loaded in name order so the returned ordering is
    /// deterministic.
    pub fn load_all<P: AsRef<Path>>(path: P) -> EngineResult<Vec<CarrierProfile>> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: path_str.clone(),
            })?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        if dirs.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no carrier directories found)", path_str),
            });
        }

        dirs.into_iter().map(Self::load).collect()
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}

fn invalid(carrier: &str, message: String) -> EngineError {
    EngineError::InvalidRateCard {
        carrier: carrier.to_string(),
        message,
    }
}

fn validate_profile(profile: &CarrierProfile) -> EngineResult<()> {
    let carrier = &profile.carrier;

    if profile.services.is_empty() {
        return Err(invalid(carrier, "profile defines no services".to_string()));
    }

    let mut fuel_rates: Vec<Decimal> = profile
        .services
        .iter()
        .filter_map(|s| s.fuel.as_ref().map(|f| f.rate))
        .collect();
    fuel_rates.sort();
    fuel_rates.dedup();
    if fuel_rates.len() > 1 {
        return Err(invalid(
            carrier,
            "services of one profile must share a fuel rate".to_string(),
        ));
    }

    for card in &profile.services {
        validate_card(card)?;
    }

    validate_discounts(profile)?;

    Ok(())
}

fn validate_card(card: &CarrierRateCard) -> EngineResult<()> {
    let carrier = &card.carrier;
    let svc = &card.service;

    if card.dim_divisor <= Decimal::ZERO {
        return Err(invalid(
            carrier,
            format!("service '{}': dim_divisor must be positive", svc),
        ));
    }
    if card.max_billable_weight <= Decimal::ZERO {
        return Err(invalid(
            carrier,
            format!("service '{}': max_billable_weight must be positive", svc),
        ));
    }
    if let Some(fuel) = &card.fuel {
        if fuel.rate < Decimal::ZERO {
            return Err(invalid(
                carrier,
                format!("service '{}': fuel rate must be non-negative", svc),
            ));
        }
    }

    validate_brackets(card)?;
    validate_surcharges(carrier, svc, &card.surcharges)?;

    Ok(())
}

fn validate_brackets(card: &CarrierRateCard) -> EngineResult<()> {
    let carrier = &card.carrier;
    let svc = &card.service;
    let brackets = &card.rates.brackets;

    if brackets.is_empty() {
        return Err(invalid(
            carrier,
            format!("service '{}': rate table has no weight brackets", svc),
        ));
    }
    if brackets[0].lower != Decimal::ZERO {
        return Err(invalid(
            carrier,
            format!("service '{}': first weight bracket must start at 0", svc),
        ));
    }
    let mut prev_upper = Decimal::ZERO;
    for bracket in brackets {
        if bracket.lower >= bracket.upper {
            return Err(invalid(
                carrier,
                format!(
                    "service '{}': weight bracket ({}, {}] is empty",
                    svc, bracket.lower, bracket.upper
                ),
            ));
        }
        if bracket.lower != prev_upper {
            return Err(invalid(
                carrier,
                format!(
                    "service '{}': weight brackets are not contiguous at {}",
                    svc, bracket.lower
                ),
            ));
        }
        if bracket.prices.values().any(|p| *p < Decimal::ZERO) {
            return Err(invalid(
                carrier,
                format!("service '{}': negative bracket price", svc),
            ));
        }
        prev_upper = bracket.upper;
    }
    if card.max_billable_weight > prev_upper {
        return Err(invalid(
            carrier,
            format!(
                "service '{}': max_billable_weight {} exceeds the last bracket upper bound {}",
                svc, card.max_billable_weight, prev_upper
            ),
        ));
    }

    Ok(())
}

fn validate_surcharges(carrier: &str, svc: &str, rules: &[SurchargeRule]) -> EngineResult<()> {
    for rule in rules {
        if rule.list_price < Decimal::ZERO {
            return Err(invalid(
                carrier,
                format!("rule '{}': negative list price", rule.id),
            ));
        }
        if rule.discount < Decimal::ZERO || rule.discount >= Decimal::ONE {
            return Err(invalid(
                carrier,
                format!("rule '{}': discount must be in [0, 1)", rule.id),
            ));
        }
        if let Some(rate) = rule.allocation_rate {
            if rate <= Decimal::ZERO || rate > Decimal::ONE {
                return Err(invalid(
                    carrier,
                    format!("rule '{}': allocation_rate must be in (0, 1]", rule.id),
                ));
            }
            if rule.exclusivity.is_some() || rule.depends_on.is_some() {
                return Err(invalid(
                    carrier,
                    format!(
                        "rule '{}': allocation rules cannot join exclusivity groups or declare dependencies",
                        rule.id
                    ),
                ));
            }
            if rule.weight_floor.is_some() {
                return Err(invalid(
                    carrier,
                    format!("rule '{}': allocation rules cannot raise the weight floor", rule.id),
                ));
            }
        }
        if let Some(window) = &rule.window {
            if window.start > window.end {
                return Err(invalid(
                    carrier,
                    format!("rule '{}': window start is after its end", rule.id),
                ));
            }
        }
        if let Some(parent_id) = &rule.depends_on {
            let parent = rules.iter().find(|r| r.id == *parent_id).ok_or_else(|| {
                invalid(
                    carrier,
                    format!(
                        "service '{}': rule '{}' depends on unknown rule '{}'",
                        svc, rule.id, parent_id
                    ),
                )
            })?;
            if parent.is_dependent() || parent.is_allocation() {
                return Err(invalid(
                    carrier,
                    format!(
                        "rule '{}': dependency target '{}' must be an independent rule",
                        rule.id, parent_id
                    ),
                ));
            }
        }
    }

    // Exclusivity groups may not mix independent and dependent members;
    // group resolution happens within a single evaluation pass.
    let mut group_kinds: std::collections::HashMap<&str, bool> = std::collections::HashMap::new();
    for rule in rules {
        if let Some(excl) = &rule.exclusivity {
            let dependent = rule.is_dependent();
            if let Some(prev) = group_kinds.insert(excl.group.as_str(), dependent) {
                if prev != dependent {
                    return Err(invalid(
                        carrier,
                        format!(
                            "service '{}': exclusivity group '{}' mixes independent and dependent rules",
                            svc, excl.group
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn validate_discounts(profile: &CarrierProfile) -> EngineResult<()> {
    let carrier = &profile.carrier;
    let schedule = &profile.discounts;

    if schedule.tiers.is_empty() {
        return Err(invalid(
            carrier,
            "discount schedule has no tiers".to_string(),
        ));
    }
    if schedule.tier(&schedule.baked_tier).is_none() {
        return Err(invalid(
            carrier,
            format!("baked tier '{}' is not defined", schedule.baked_tier),
        ));
    }
    let mut prev_threshold: Option<Decimal> = None;
    for tier in &schedule.tiers {
        if tier.factor() <= Decimal::ZERO {
            return Err(invalid(
                carrier,
                format!("tier '{}': combined discounts reach or exceed 100%", tier.name),
            ));
        }
        if let Some(prev) = prev_threshold {
            if tier.threshold <= prev {
                return Err(invalid(
                    carrier,
                    format!(
                        "tier '{}': thresholds must be strictly ascending",
                        tier.name
                    ),
                ));
            }
        }
        prev_threshold = Some(tier.threshold);
    }
    let names: std::collections::HashSet<&str> =
        schedule.tiers.iter().map(|t| t.name.as_str()).collect();
    if names.len() != schedule.tiers.len() {
        return Err(invalid(carrier, "duplicate tier names".to_string()));
    }

    Ok(())
}
