//! Anonymization method names.

use crate::error::{AnonError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Separator joining several methods into one chain (`PreserveBroadcast+CryptoPan`).
pub const CHAIN_SEPARATOR: char = '+';

/// Anonymization primitive selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnonMethod {
    /// Overwrite with a repeated SHA-1 digest of the field.
    HashSha1,
    /// Overwrite with a repeated HMAC-SHA-1 of the field.
    HashHmacSha1,
    /// Substitute each byte through a SHA-1 derived table.
    BytewiseHashSha1,
    /// Substitute each byte through an HMAC-SHA-1 derived table.
    BytewiseHashHmacSha1,
    /// Overwrite every byte with one constant.
    ConstOverwrite,
    /// Overwrite with an ascending run of characters.
    ContinuousChar,
    /// Flip a random number of random bits.
    Whitenoise,
    /// Overwrite with random bytes.
    Randomize,
    /// Randomly permute the field's bytes.
    Shuffle,
    /// Stop the chain for all-ones (broadcast) fields.
    PreserveBroadcast,
    /// Crypto-PAn over the first four bytes.
    CryptoPan,
    /// Crypto-PAn restricted to configured subnet mappings.
    CryptoPanPrefix,
}

impl AnonMethod {
    /// All methods, in display order.
    pub const ALL: [AnonMethod; 12] = [
        AnonMethod::HashSha1,
        AnonMethod::HashHmacSha1,
        AnonMethod::BytewiseHashSha1,
        AnonMethod::BytewiseHashHmacSha1,
        AnonMethod::ConstOverwrite,
        AnonMethod::ContinuousChar,
        AnonMethod::Whitenoise,
        AnonMethod::Randomize,
        AnonMethod::Shuffle,
        AnonMethod::PreserveBroadcast,
        AnonMethod::CryptoPan,
        AnonMethod::CryptoPanPrefix,
    ];

    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            AnonMethod::HashSha1 => "HashSha1",
            AnonMethod::HashHmacSha1 => "HashHmacSha1",
            AnonMethod::BytewiseHashSha1 => "BytewiseHashSha1",
            AnonMethod::BytewiseHashHmacSha1 => "BytewiseHashHmacSha1",
            AnonMethod::ConstOverwrite => "ConstOverwrite",
            AnonMethod::ContinuousChar => "ContinuousChar",
            AnonMethod::Whitenoise => "Whitenoise",
            AnonMethod::Randomize => "Randomize",
            AnonMethod::Shuffle => "Shuffle",
            AnonMethod::PreserveBroadcast => "PreserveBroadcast",
            AnonMethod::CryptoPan => "CryptoPan",
            AnonMethod::CryptoPanPrefix => "CryptoPanPrefix",
        }
    }

    /// Short description of the parameter this method expects.
    pub fn param_hint(&self) -> &'static str {
        match self {
            AnonMethod::HashHmacSha1 | AnonMethod::BytewiseHashHmacSha1 => {
                "key string (raw or 0x hex)"
            }
            AnonMethod::ConstOverwrite => "one character or 0x plus 2 hex digits",
            AnonMethod::ContinuousChar => "optional start character (default 'a')",
            AnonMethod::Whitenoise => "strength percentage 0-100",
            AnonMethod::CryptoPan => "32-byte key or 0x plus 64 hex digits",
            AnonMethod::CryptoPanPrefix => {
                "32-byte key or 0x plus 64 hex digits, plus subnet mappings"
            }
            AnonMethod::HashSha1
            | AnonMethod::BytewiseHashSha1
            | AnonMethod::Randomize
            | AnonMethod::Shuffle
            | AnonMethod::PreserveBroadcast => "none",
        }
    }

    /// Whether the method only works on IPv4 fields (4 bytes, or 5 with a mask octet).
    pub fn requires_ipv4(&self) -> bool {
        matches!(self, AnonMethod::CryptoPan | AnonMethod::CryptoPanPrefix)
    }

    /// Whether the method output depends only on its configuration and input.
    pub fn is_deterministic(&self) -> bool {
        !matches!(
            self,
            AnonMethod::Whitenoise | AnonMethod::Randomize | AnonMethod::Shuffle
        )
    }

    /// Parse a `+`-joined chain of method names.
    pub fn parse_chain(s: &str) -> Result<Vec<AnonMethod>> {
        s.split(CHAIN_SEPARATOR)
            .map(str::parse::<AnonMethod>)
            .collect()
    }
}

impl FromStr for AnonMethod {
    type Err = AnonError;

    /// Case-insensitive match on the canonical name.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        AnonMethod::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| AnonError::UnknownMethod(s.to_string()))
    }
}

impl std::fmt::Display for AnonMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
