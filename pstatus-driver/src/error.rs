//! Error types for the driver

use pstatus_core::codec::CodecError;
use pstatus_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

/// Identity attribute checked before a build starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Pipeline,
    Team,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::Pipeline => f.write_str("pipeline"),
            IdentityField::Team => f.write_str("team"),
        }
    }
}

/// Errors that can occur while driving a status document
#[derive(Debug, Error)]
pub enum DriverError {
    /// Backend failure, surfaced verbatim
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored document could not be read or written
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Stored document belongs to a different pipeline or team
    #[error(
        "status document is already associated with {field} {stored} but is trying to be associated with {field} {configured}"
    )]
    IdentityMismatch {
        field: IdentityField,
        stored: String,
        configured: String,
    },

    /// Requested change is not allowed from the current state
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}
