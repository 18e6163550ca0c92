//! Keyed 128-bit block cipher used as a pseudorandom function.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

/// Single-block ECB encryption over 128-bit blocks.
///
/// Implementations must be deterministic for a given key. The prefix
/// pseudonymizer calls this 32 times per IPv4 address, so the key schedule
/// should be expanded once at construction.
pub trait BlockCipher: Send + Sync {
    /// Build the cipher from a 128-bit key.
    fn from_key(key: &[u8; 16]) -> Self
    where
        Self: Sized;

    /// Encrypt one 128-bit block.
    fn encrypt_block(&self, input: &[u8; 16]) -> [u8; 16];
}

/// AES-128 with an expanded key schedule.
#[derive(Clone)]
pub struct Aes128Cipher {
    inner: Aes128,
}

impl BlockCipher for Aes128Cipher {
    fn from_key(key: &[u8; 16]) -> Self {
        Self {
            inner: Aes128::new(GenericArray::from_slice(key)),
        }
    }

    fn encrypt_block(&self, input: &[u8; 16]) -> [u8; 16] {
        let mut block = GenericArray::clone_from_slice(input);
        self.inner.encrypt_block(&mut block);

        let mut output = [0u8; 16];
        output.copy_from_slice(&block);
        output
    }
}

impl std::fmt::Debug for Aes128Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Aes128Cipher { .. }")
    }
}
