//! Information element identity types.
//!
//! A field inside a flow record is identified by its numeric type id plus
//! the enterprise number that scopes it. Standard IANA elements use
//! enterprise number 0.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Enterprise number of IANA-registered information elements.
pub const IANA_PEN: u32 = 0;

/// Enterprise number marking the reverse direction of a biflow (RFC 5103).
pub const REVERSE_PEN: u32 = 29305;

/// Enterprise number used for collector-private elements.
///
/// Large enough to be OR-ed with [`REVERSE_PEN`] for private reverse elements.
pub const PRIVATE_PEN: u32 = 0x7770_0000;

/// Wire value announcing a variable-length field in a template.
pub const VARIABLE_LENGTH: u16 = 65535;

/// Composite key of an information element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InformationElementId {
    /// Numeric type id.
    pub type_id: u16,
    /// Enterprise number (0 for IANA elements).
    #[serde(default)]
    pub enterprise: u32,
}

impl InformationElementId {
    /// Create an id scoped to an enterprise number.
    pub const fn new(type_id: u16, enterprise: u32) -> Self {
        Self {
            type_id,
            enterprise,
        }
    }

    /// Create an IANA-registered id.
    pub const fn iana(type_id: u16) -> Self {
        Self::new(type_id, IANA_PEN)
    }

    /// Whether this id carries an enterprise number.
    pub fn is_enterprise(&self) -> bool {
        self.enterprise != IANA_PEN
    }
}

impl fmt::Display for InformationElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_enterprise() {
            write!(f, "{}:{}", self.type_id, self.enterprise)
        } else {
            write!(f, "{}", self.type_id)
        }
    }
}

impl From<u16> for InformationElementId {
    fn from(type_id: u16) -> Self {
        InformationElementId::iana(type_id)
    }
}

/// Errors parsing a numeric information element id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IeParseError {
    #[error("empty information element id")]
    Empty,

    #[error("invalid type id '{0}'")]
    InvalidTypeId(String),

    #[error("invalid enterprise number '{0}'")]
    InvalidEnterprise(String),
}

impl FromStr for InformationElementId {
    type Err = IeParseError;

    /// Parses `"<type_id>"` or `"<type_id>:<enterprise>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IeParseError::Empty);
        }

        let (type_part, pen_part) = match s.split_once(':') {
            Some((t, p)) => (t, Some(p)),
            None => (s, None),
        };

        let type_id = type_part
            .trim()
            .parse::<u16>()
            .map_err(|_| IeParseError::InvalidTypeId(type_part.to_string()))?;
        let enterprise = match pen_part {
            Some(p) => p
                .trim()
                .parse::<u32>()
                .map_err(|_| IeParseError::InvalidEnterprise(p.to_string()))?,
            None => IANA_PEN,
        };

        Ok(InformationElementId::new(type_id, enterprise))
    }
}

/// Byte length of a field as announced by a template or the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLength {
    /// Fixed number of bytes.
    Fixed(u16),
    /// Length is only known per record.
    Variable,
}

impl FieldLength {
    /// Interpret a raw length value, treating 0 and 65535 as variable.
    pub fn from_raw(len: u16) -> Self {
        match len {
            0 | VARIABLE_LENGTH => FieldLength::Variable,
            n => FieldLength::Fixed(n),
        }
    }

    /// Length to operate on given the length of the bytes actually present.
    ///
    /// Never exceeds `available`.
    pub fn effective(&self, available: usize) -> usize {
        match self {
            FieldLength::Fixed(n) => (*n as usize).min(available),
            FieldLength::Variable => available,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, FieldLength::Variable)
    }
}

impl fmt::Display for FieldLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLength::Fixed(n) => write!(f, "{}", n),
            FieldLength::Variable => write!(f, "variable"),
        }
    }
}
