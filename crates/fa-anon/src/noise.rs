//! Randomized primitives: bit noise, random overwrite, byte shuffle.
//!
//! Each function takes the RNG explicitly so tests can seed it; the chain
//! uses the thread-local RNG. None of these are repeatable.

use rand::seq::SliceRandom;
use rand::Rng;

/// Highest accepted whitenoise strength (percent).
pub const MAX_STRENGTH: u8 = 100;

/// Number of bit flips whitenoise performs for a field of `bits` bits.
///
/// A draw in `0..=bits` is scaled by `strength` percent and rounded up.
/// At least one flip happens whenever the field has bits.
pub fn flip_count(bits: usize, draw: usize, strength: u8) -> usize {
    if bits == 0 {
        return 0;
    }
    let strength = usize::from(strength.min(MAX_STRENGTH));
    let flips = (draw.min(bits) * strength).div_ceil(100);
    flips.max(1)
}

/// Flip a strength-scaled number of randomly chosen bits.
///
/// Positions are drawn with replacement, so a bit may flip back.
/// Returns whether the field changed.
pub fn whitenoise<R: Rng + ?Sized>(buf: &mut [u8], strength: u8, rng: &mut R) -> bool {
    let bits = buf.len() * 8;
    if bits == 0 {
        return false;
    }

    let flips = flip_count(bits, rng.random_range(0..=bits), strength);
    let before = buf.to_vec();
    for _ in 0..flips {
        let bit = rng.random_range(0..bits);
        buf[bit / 8] ^= 1 << (bit % 8);
    }

    before != buf
}

/// Overwrite with random bytes. Returns whether the field changed.
pub fn randomize<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> bool {
    let before = buf.to_vec();
    rng.fill(&mut buf[..]);
    before != buf
}

/// Apply a uniformly random permutation to the field's bytes (Fisher-Yates).
///
/// The output is a rearrangement of the input's byte multiset.
/// Returns whether the byte order changed.
pub fn shuffle<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> bool {
    let before = buf.to_vec();
    buf.shuffle(rng);
    before != buf
}
