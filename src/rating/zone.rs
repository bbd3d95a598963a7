//! Zone resolution.
//!
//! Maps (origin facility, destination postal code) to a carrier-specific
//! zone through a three-tier fallback chain: exact postal match, precomputed
//! region mode, fixed default. The resolver never fails; absence of data
//! degrades gracefully. A secondary remote/extended-delivery flag rides the
//! same lookup and is surfaced to the surcharge engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ZoneTable;

/// Which tier of the fallback chain produced a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    /// Exact postal-code match in the carrier's zone table.
    Exact,
    /// The most frequent zone among the destination's region bucket.
    RegionFallback,
    /// The carrier's fixed default zone.
    Default,
}

/// A resolved destination zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneResolution {
    /// The zone code.
    pub zone: String,
    /// The remote/extended-delivery flag for the destination.
    ///
    /// Only an exact match can set this; fallback tiers resolve it false.
    pub remote: bool,
    /// The fallback tier that produced the zone.
    pub source: ZoneSource,
}

/// Resolves the zone for a destination postal code from an origin facility.
///
/// Resolution order: exact per-origin postal match, then the most frequently
/// occurring zone among postal codes sharing the destination's region
/// prefix, then the carrier's default zone. Unknown origin facilities skip
/// straight to the default zone.
pub fn resolve_zone(table: &ZoneTable, origin: &str, dest_postal: &str) -> ZoneResolution {
    if let Some(origin_zones) = table.origin(origin) {
        if let Some(entry) = origin_zones.entry(dest_postal) {
            return ZoneResolution {
                zone: entry.zone.clone(),
                remote: entry.remote,
                source: ZoneSource::Exact,
            };
        }
        let region = table.region_of(dest_postal);
        if let Some(zone) = origin_zones.region_mode(&region) {
            debug!(origin, dest_postal, region = %region, zone, "zone resolved via region fallback");
            return ZoneResolution {
                zone: zone.to_string(),
                remote: false,
                source: ZoneSource::RegionFallback,
            };
        }
    }
    debug!(origin, dest_postal, "zone resolved via default");
    ZoneResolution {
        zone: table.default_zone().to_string(),
        remote: false,
        source: ZoneSource::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneFile;

    fn table() -> ZoneTable {
        let yaml = r#"
default_zone: "8"
region_prefix_len: 3
origins:
  ONT:
    - { postal: "60601", zone: "6" }
    - { postal: "60607", zone: "6" }
    - { postal: "60610", zone: "5" }
    - { postal: "59901", zone: "6", remote: true }
"#;
        let file: ZoneFile = serde_yaml::from_str(yaml).unwrap();
        ZoneTable::build(file)
    }

    #[test]
    fn test_exact_match() {
        let resolution = resolve_zone(&table(), "ONT", "60601");
        assert_eq!(resolution.zone, "6");
        assert_eq!(resolution.source, ZoneSource::Exact);
        assert!(!resolution.remote);
    }

    #[test]
    fn test_exact_match_carries_remote_flag() {
        let resolution = resolve_zone(&table(), "ONT", "59901");
        assert_eq!(resolution.zone, "6");
        assert!(resolution.remote);
    }

    #[test]
    fn test_region_fallback_uses_mode() {
        // 60699 is not in the table; region "606" has zones {6: 2, 5: 1}.
        let resolution = resolve_zone(&table(), "ONT", "60699");
        assert_eq!(resolution.zone, "6");
        assert_eq!(resolution.source, ZoneSource::RegionFallback);
        assert!(!resolution.remote);
    }

    #[test]
    fn test_default_when_region_unknown() {
        let resolution = resolve_zone(&table(), "ONT", "10001");
        assert_eq!(resolution.zone, "8");
        assert_eq!(resolution.source, ZoneSource::Default);
    }

    #[test]
    fn test_default_when_origin_unknown() {
        let resolution = resolve_zone(&table(), "EWR", "60601");
        assert_eq!(resolution.zone, "8");
        assert_eq!(resolution.source, ZoneSource::Default);
    }
}
