//! Digest-based overwrite and byte substitution.
//!
//! Whole-field hashing overwrites the field with its digest, repeated or
//! truncated to the field length. Byte-wise hashing substitutes every byte
//! through a 256-entry table built once from the same digest.

use crate::error::{AnonError, Result};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

type HmacSha1 = Hmac<Sha1>;

/// SHA-1 or keyed HMAC-SHA-1 digest of a byte string.
#[derive(Clone)]
pub enum FieldDigest {
    Sha1,
    HmacSha1(HmacSha1),
}

impl FieldDigest {
    /// Keyed digest.
    pub fn keyed(key: &[u8]) -> Result<Self> {
        let mac = HmacSha1::new_from_slice(key)
            .map_err(|e| AnonError::InvalidKey(format!("invalid HMAC key: {}", e)))?;
        Ok(FieldDigest::HmacSha1(mac))
    }

    /// Compute the 20-byte digest of `data`.
    pub fn digest(&self, data: &[u8]) -> [u8; 20] {
        match self {
            FieldDigest::Sha1 => Sha1::digest(data).into(),
            FieldDigest::HmacSha1(mac) => {
                let mut mac = mac.clone();
                mac.update(data);
                mac.finalize().into_bytes().into()
            }
        }
    }

    /// Overwrite `buf` with its own digest, cycling the digest as needed.
    ///
    /// Returns whether any byte changed.
    pub fn overwrite(&self, buf: &mut [u8]) -> bool {
        let digest = self.digest(buf);
        let mut changed = false;
        for (byte, d) in buf.iter_mut().zip(digest.iter().cycle()) {
            changed |= *byte != *d;
            *byte = *d;
        }
        changed
    }
}

/// Precomputed single-byte substitution table.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteTable {
    table: [u8; 256],
}

impl ByteTable {
    /// Map every byte value through the first byte of its digest.
    pub fn build(digest: &FieldDigest) -> Self {
        let mut table = [0u8; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = digest.digest(&[value as u8])[0];
        }
        Self { table }
    }

    pub fn get(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// Substitute every byte in place. Returns whether any byte changed.
    pub fn substitute(&self, buf: &mut [u8]) -> bool {
        let mut changed = false;
        for byte in buf.iter_mut() {
            let mapped = self.table[*byte as usize];
            changed |= mapped != *byte;
            *byte = mapped;
        }
        changed
    }
}

impl std::fmt::Debug for ByteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ByteTable { .. }")
    }
}
