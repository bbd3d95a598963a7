//! Shipment model.
//!
//! This module defines the Shipment struct representing a single parcel
//! presented to the rating pipeline. Shipments are immutable inputs; every
//! derived attribute (volume, billable weight, zone) is computed downstream.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a single parcel to be rated.
///
/// Physical dimensions are in inches, weight in pounds. The package-type tag
/// is an opaque label used by surcharge triggers and by the optimizer's
/// grouping key (e.g. `"carton"`, `"poly"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique identifier for the shipment.
    pub id: String,
    /// The date the shipment was tendered to the carrier.
    pub ship_date: NaiveDate,
    /// The origin facility code (e.g. "ONT").
    pub origin: String,
    /// The destination postal code.
    pub dest_postal: String,
    /// Package-type tag used for surcharge triggers and grouping.
    pub package_type: String,
    /// Length in inches, as measured.
    pub length_in: Decimal,
    /// Width in inches, as measured.
    pub width_in: Decimal,
    /// Height in inches, as measured.
    pub height_in: Decimal,
    /// Actual scale weight in pounds.
    pub weight_lb: Decimal,
}
