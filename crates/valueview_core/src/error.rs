//! Error types for valueview
//!
//! Everything in here is a programmer or contract error: it is returned
//! synchronously to the caller of the offending operation. Failures of the
//! asynchronous parse/format services travel separately as
//! [`ServiceError`](crate::service::ServiceError).

use thiserror::Error;

/// Errors raised by the valueview crates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A registry already holds an entry for this key
    #[error("An expert is already registered for {kind} \"{key}\"")]
    DuplicateRegistration { kind: &'static str, key: String },

    /// A registry key was empty
    #[error("Invalid {kind} key: registry keys must be non-empty strings")]
    InvalidKey { kind: &'static str },

    /// A lookup was attempted with neither a data value type nor a data type id
    #[error("Expert lookup needs a data value type or a data type id")]
    MissingLookupKey,

    /// An expert lifecycle method was called out of order
    #[error("Expert \"{expert}\" cannot {operation} while {phase}")]
    Lifecycle {
        expert: &'static str,
        operation: &'static str,
        phase: &'static str,
    },

    /// The option may only be set when the view is constructed
    #[error("Option \"{0}\" can only be set on construction")]
    InitOnlyOption(String),

    /// The option does not exist
    #[error("Unknown option \"{0}\"")]
    UnknownOption(String),

    /// The option value has the wrong shape
    #[error("Invalid value for option \"{key}\": {reason}")]
    InvalidOption { key: String, reason: String },

    /// A serialized data value could not be read
    #[error("Invalid data value: {0}")]
    InvalidDataValue(String),

    /// Built-in or injected message tables could not be loaded
    #[error("Message table error: {0}")]
    Messages(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for valueview operations
pub type Result<T> = std::result::Result<T, Error>;
