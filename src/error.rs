//! Error types for the rating engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Malformed or missing carrier configuration at load time is the only fatal
//! error class; everything downstream of a successful load degrades
//! gracefully (zone fallbacks, weight capping, absent costs) rather than
//! failing per shipment.

use thiserror::Error;

/// The main error type for the rating engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use rating_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A carrier rate card failed validation after parsing.
    #[error("Invalid rate card for carrier '{carrier}': {message}")]
    InvalidRateCard {
        /// The carrier whose configuration is invalid.
        carrier: String,
        /// A description of what made the configuration invalid.
        message: String,
    },

    /// A carrier referenced by a constraint or lookup is not loaded.
    #[error("Unknown carrier: {id}")]
    UnknownCarrier {
        /// The carrier identifier that was not found.
        id: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
