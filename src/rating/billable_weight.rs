//! Billable weight calculation.
//!
//! Computes dimensional weight from volume and a carrier-specific divisor,
//! gates it on the carrier's volume threshold, and combines it with actual
//! weight. Surcharge-triggered weight floors are re-applied after rule
//! evaluation, before rate lookup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The result of a billable-weight calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillableWeight {
    /// The actual scale weight.
    pub actual: Decimal,
    /// The dimensional weight, when it was considered at all.
    pub dim_weight: Option<Decimal>,
    /// The billable weight before any surcharge floor.
    pub billable: Decimal,
    /// True when dimensional weight was considered and exceeded actual.
    pub dim_applied: bool,
}

/// Computes the billable weight for a shipment.
///
/// `dim_weight = volume / divisor`. When the carrier defines a volume
/// threshold, dimensional weight is only considered for `volume >
/// threshold` (strictly); without a threshold it is always considered.
/// When considered, `billable = max(actual, dim_weight)`.
///
/// # Example
///
/// ```
/// use rating_engine::rating::billable_weight;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// // 20x20x10 at 5 lbs actual, divisor 250, threshold 1728 cu in:
/// // volume 4000 > 1728, dim weight 16.0, dimensional wins.
/// let result = billable_weight(dec("5"), dec("4000"), dec("250"), Some(dec("1728")));
/// assert_eq!(result.billable, dec("16"));
/// assert!(result.dim_applied);
/// ```
pub fn billable_weight(
    actual: Decimal,
    volume: Decimal,
    divisor: Decimal,
    threshold: Option<Decimal>,
) -> BillableWeight {
    let considered = match threshold {
        Some(t) => volume > t,
        None => true,
    };

    if !considered {
        return BillableWeight {
            actual,
            dim_weight: None,
            billable: actual,
            dim_applied: false,
        };
    }

    let dim = volume / divisor;
    let billable = actual.max(dim);
    BillableWeight {
        actual,
        dim_weight: Some(dim),
        billable,
        dim_applied: dim > actual,
    }
}

/// Applies a surcharge-declared minimum billable weight.
///
/// The floor is the maximum across all triggered rules; rate lookup always
/// uses the post-floor weight.
pub fn apply_weight_floor(billable: Decimal, floor: Option<Decimal>) -> Decimal {
    match floor {
        Some(f) => billable.max(f),
        None => billable,
    }
}
