//! Dimensional preprocessing.
//!
//! Derives the volume, longest/second-longest side, and length-plus-girth
//! figures every carrier's surcharge triggers and dimensional-weight rules
//! reference. Raw sides are rounded to one decimal place *before* any
//! comparison so threshold checks cannot be missed to floating-point noise,
//! and volume is rounded to a whole cubic inch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Shipment;

/// Derived dimensional attributes of a parcel.
///
/// # Example
///
/// ```
/// use rating_engine::rating::DimensionalProfile;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let profile = DimensionalProfile::new(dec("20"), dec("20"), dec("10"));
/// assert_eq!(profile.volume, dec("4000"));
/// assert_eq!(profile.longest, dec("20"));
/// assert_eq!(profile.second_longest, dec("20"));
/// assert_eq!(profile.length_plus_girth, dec("80"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionalProfile {
    /// Rounded volume in cubic inches.
    pub volume: Decimal,
    /// The longest side in inches.
    pub longest: Decimal,
    /// The median side in inches.
    pub second_longest: Decimal,
    /// Longest side plus twice the sum of the other two sides.
    pub length_plus_girth: Decimal,
}

impl DimensionalProfile {
    /// Derives the profile from raw length, width, and height in inches.
    ///
    /// Sides are rounded to one decimal place first; `volume` is
    /// `round(L*W*H, 0)`. Pure function with no failure modes.
    pub fn new(length: Decimal, width: Decimal, height: Decimal) -> Self {
        let mut sides = [
            length.round_dp(1),
            width.round_dp(1),
            height.round_dp(1),
        ];
        let volume = (sides[0] * sides[1] * sides[2]).round_dp(0);
        sides.sort();

        let longest = sides[2];
        let second_longest = sides[1];
        let length_plus_girth = longest + Decimal::TWO * (sides[0] + sides[1]);

        Self {
            volume,
            longest,
            second_longest,
            length_plus_girth,
        }
    }

    /// Derives the profile from a shipment's raw dimensions.
    pub fn from_shipment(shipment: &Shipment) -> Self {
        Self::new(shipment.length_in, shipment.width_in, shipment.height_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_box_20_20_10() {
        let profile = DimensionalProfile::new(dec("20"), dec("20"), dec("10"));
        assert_eq!(profile.volume, dec("4000"));
        assert_eq!(profile.longest, dec("20"));
        assert_eq!(profile.second_longest, dec("20"));
        assert_eq!(profile.length_plus_girth, dec("80"));
    }

    #[test]
    fn test_sides_are_rounded_before_comparison() {
        // 48.04 rounds to 48.0 and must not read as over a 48" threshold.
        let profile = DimensionalProfile::new(dec("48.04"), dec("10"), dec("10"));
        assert_eq!(profile.longest, dec("48.0"));

        let profile = DimensionalProfile::new(dec("48.06"), dec("10"), dec("10"));
        assert_eq!(profile.longest, dec("48.1"));
    }

    #[test]
    fn test_second_longest_is_the_median() {
        let profile = DimensionalProfile::new(dec("10"), dec("30"), dec("20"));
        assert_eq!(profile.longest, dec("30"));
        assert_eq!(profile.second_longest, dec("20"));
    }

    #[test]
    fn test_length_plus_girth_uses_two_shorter_sides() {
        // 30 + 2*(20 + 10) = 90
        let profile = DimensionalProfile::new(dec("30"), dec("10"), dec("20"));
        assert_eq!(profile.length_plus_girth, dec("90"));
    }

    #[test]
    fn test_volume_rounds_to_whole_cubic_inches() {
        // 10.5 * 10.5 * 10.5 = 1157.625 → 1158
        let profile = DimensionalProfile::new(dec("10.5"), dec("10.5"), dec("10.5"));
        assert_eq!(profile.volume, dec("1158"));
    }

    #[test]
    fn test_order_of_sides_does_not_matter() {
        let a = DimensionalProfile::new(dec("12"), dec("9"), dec("3"));
        let b = DimensionalProfile::new(dec("3"), dec("12"), dec("9"));
        assert_eq!(a, b);
    }
}
