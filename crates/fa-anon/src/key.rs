//! Key material and method parameter decoding.
//!
//! Parameters arrive as strings. A parameter starting with `0x` is read as
//! hex; anything else is taken as raw bytes.

use crate::error::{AnonError, Result};

/// Length of a Crypto-PAn key in bytes.
pub const CRYPTOPAN_KEY_LEN: usize = 32;

/// Whether a parameter should be decoded as hex.
pub fn is_hex_param(param: &str) -> bool {
    let Some(digits) = param
        .strip_prefix("0x")
        .or_else(|| param.strip_prefix("0X"))
    else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a parameter into bytes, honoring the `0x` hex form.
pub fn decode_param(method: &str, param: &str) -> Result<Vec<u8>> {
    if is_hex_param(param) {
        hex::decode(&param[2..]).map_err(|e| {
            AnonError::parameter(
                method,
                format!("failed to convert hexadecimal parameter '{}': {}", param, e),
            )
        })
    } else {
        Ok(param.as_bytes().to_vec())
    }
}

/// Decode a parameter that must be exactly one byte.
pub fn decode_single_byte(method: &str, param: &str) -> Result<u8> {
    let bytes = decode_param(method, param)?;
    match bytes.as_slice() {
        [b] => Ok(*b),
        _ => Err(AnonError::parameter(
            method,
            format!(
                "expected one character or 0x plus two hex digits, got '{}'",
                param
            ),
        )),
    }
}

/// 256-bit Crypto-PAn key: 128-bit cipher key followed by the 128-bit pad seed.
#[derive(Clone, PartialEq, Eq)]
pub struct CryptoPanKey {
    bytes: [u8; CRYPTOPAN_KEY_LEN],
}

impl CryptoPanKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(bytes: [u8; CRYPTOPAN_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Parse a key parameter: 32 raw bytes or `0x` plus 64 hex digits.
    pub fn from_param(param: &str) -> Result<Self> {
        let decoded = if is_hex_param(param) {
            if param.len() != 2 + CRYPTOPAN_KEY_LEN * 2 {
                return Err(AnonError::InvalidKey(format!(
                    "hex key must have exactly {} hex digits, got {}",
                    CRYPTOPAN_KEY_LEN * 2,
                    param.len() - 2
                )));
            }
            hex::decode(&param[2..])
                .map_err(|e| AnonError::InvalidKey(format!("invalid hex key: {}", e)))?
        } else {
            param.as_bytes().to_vec()
        };

        if decoded.len() != CRYPTOPAN_KEY_LEN {
            return Err(AnonError::InvalidKey(format!(
                "key must have exactly {} bytes, got {}",
                CRYPTOPAN_KEY_LEN,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; CRYPTOPAN_KEY_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Generate a fresh random key from the OS RNG.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; CRYPTOPAN_KEY_LEN];
        getrandom::getrandom(&mut bytes).map_err(|e| {
            AnonError::InvalidKey(format!("failed to generate random key: {}", e))
        })?;
        Ok(Self { bytes })
    }

    /// Render as a `0x` hex parameter.
    pub fn to_param(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Cipher key half.
    pub fn cipher_key(&self) -> [u8; 16] {
        let mut key = [0u8; 16];
        key.copy_from_slice(&self.bytes[..16]);
        key
    }

    /// Pad seed half.
    pub fn pad_seed(&self) -> [u8; 16] {
        let mut seed = [0u8; 16];
        seed.copy_from_slice(&self.bytes[16..]);
        seed
    }
}

impl std::fmt::Debug for CryptoPanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CryptoPanKey([REDACTED])")
    }
}
