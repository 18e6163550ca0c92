//! Shared types for flowanon.
//!
//! This crate provides the vocabulary the anonymization core and the
//! configuration layer agree on:
//! - Information element identifiers (type id + enterprise number)
//! - The information element dictionary used to resolve field lengths
//!   and display names

pub mod dictionary;
pub mod ie;

pub use dictionary::{IeDictionary, IeInfo, StandardDictionary};
pub use ie::{
    FieldLength, IeParseError, InformationElementId, IANA_PEN, PRIVATE_PEN, REVERSE_PEN,
    VARIABLE_LENGTH,
};
