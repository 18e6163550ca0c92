//! Prefix-preserving IPv4 pseudonymization (Crypto-PAn).
//!
//! Two addresses sharing their top `k` bits map to pseudonyms sharing their
//! top `k` bits. Bit `31 - pos` of the one-time pad is the first output bit
//! of the block cipher applied to the address's top `pos` bits padded with
//! the secret pad, so it depends only on that prefix.

use crate::cipher::{Aes128Cipher, BlockCipher};
use crate::key::CryptoPanKey;
use std::net::Ipv4Addr;

/// Mask selecting the top `bits` bits of a host-order address.
///
/// `bits` of 0 and 32 (or more) are handled without shifting by the width.
pub fn prefix_mask(bits: u8) -> u32 {
    match bits {
        0 => 0,
        n if n >= 32 => u32::MAX,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

/// Crypto-PAn pseudonymizer over a 128-bit block cipher.
#[derive(Clone)]
pub struct PrefixPseudonymizer<C: BlockCipher = Aes128Cipher> {
    cipher: C,
    pad: [u8; 16],
}

impl PrefixPseudonymizer<Aes128Cipher> {
    /// Create an AES-128 backed pseudonymizer.
    pub fn new(key: &CryptoPanKey) -> Self {
        Self::with_cipher(Aes128Cipher::from_key(&key.cipher_key()), &key.pad_seed())
    }
}

impl<C: BlockCipher> PrefixPseudonymizer<C> {
    /// Create a pseudonymizer from an initialized cipher and the pad seed.
    ///
    /// The seed is encrypted once here to produce the stored pad.
    pub fn with_cipher(cipher: C, pad_seed: &[u8; 16]) -> Self {
        let pad = cipher.encrypt_block(pad_seed);
        Self { cipher, pad }
    }

    /// Pseudonymize a host-order IPv4 address.
    pub fn anonymize(&self, addr: u32) -> u32 {
        let pad_head = u32::from_be_bytes([self.pad[0], self.pad[1], self.pad[2], self.pad[3]]);
        let mut input = self.pad;
        let mut otp: u32 = 0;

        for pos in 0u8..32 {
            let mask = prefix_mask(pos);
            let head = (addr & mask) | (pad_head & !mask);
            input[..4].copy_from_slice(&head.to_be_bytes());

            let output = self.cipher.encrypt_block(&input);
            otp |= u32::from(output[0] >> 7) << (31 - pos as u32);
        }

        otp ^ addr
    }

    /// Pseudonymize an [`Ipv4Addr`].
    pub fn anonymize_addr(&self, addr: Ipv4Addr) -> Ipv4Addr {
        Ipv4Addr::from(self.anonymize(u32::from(addr)))
    }
}

impl<C: BlockCipher> std::fmt::Debug for PrefixPseudonymizer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrefixPseudonymizer { .. }")
    }
}
