//! Core data models for the rating engine.
//!
//! This module contains all the domain models used throughout the engine.

mod cost;
mod group;
mod optimization;
mod shipment;

pub use cost::{BASE_RATE_COMPONENT, CostBreakdown, CostComponent, ServiceCost};
pub use group::{AssignmentGroup, GroupCarrierCost, GroupKey};
pub use optimization::{CarrierUsage, Constraint, ConstraintStatus, OptimizationResult};
pub use shipment::Shipment;
