//! Error types for the anonymization engine.
//!
//! Every variant is raised while a chain or binding is being configured.
//! Applying a configured chain to a buffer never fails.

use std::net::Ipv4Addr;
use thiserror::Error;

/// Result type for anonymization setup.
pub type Result<T> = std::result::Result<T, AnonError>;

/// Errors that can occur while building anonymization chains.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnonError {
    /// Method name is not one of the supported primitives.
    #[error("unknown anonymization method '{0}'")]
    UnknownMethod(String),

    /// Method parameter has the wrong shape.
    #[error("invalid parameter for {method}: {message}")]
    InvalidParameter { method: String, message: String },

    /// Key material could not be decoded or generated.
    #[error("key error: {0}")]
    InvalidKey(String),

    /// Subnet mapping address is not dotted-decimal IPv4.
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    /// Subnet mapping prefix length is not an integer in 0..=32.
    #[error("invalid cidr '{0}'")]
    InvalidCidr(String),

    /// The same source subnet was mapped twice.
    #[error("duplicate subnet mapping for {network}/{cidr}")]
    DuplicateSubnet { network: Ipv4Addr, cidr: u8 },

    /// Method cannot operate on a field of this length.
    #[error("{method} cannot be applied to field {field} with length {length}")]
    InvalidFieldLength {
        method: String,
        field: String,
        length: String,
    },

    /// Field length could not be resolved from the dictionary.
    #[error("unknown or unsupported information element {0}")]
    UnknownField(String),
}

impl AnonError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            AnonError::UnknownMethod(_) => 40,
            AnonError::InvalidParameter { .. } => 41,
            AnonError::InvalidKey(_) => 42,
            AnonError::InvalidAddress(_) => 43,
            AnonError::InvalidCidr(_) => 44,
            AnonError::DuplicateSubnet { .. } => 45,
            AnonError::InvalidFieldLength { .. } => 46,
            AnonError::UnknownField(_) => 47,
        }
    }

    pub(crate) fn parameter(method: impl Into<String>, message: impl Into<String>) -> Self {
        AnonError::InvalidParameter {
            method: method.into(),
            message: message.into(),
        }
    }
}
