//! Single anonymization steps.
//!
//! A [`Primitive`] is built once from a method name and its parameter, then
//! applied to field buffers. Building validates everything; applying never
//! fails.

use crate::cryptopan::PrefixPseudonymizer;
use crate::digest::{ByteTable, FieldDigest};
use crate::error::{AnonError, Result};
use crate::key::{decode_param, decode_single_byte, CryptoPanKey};
use crate::method::AnonMethod;
use crate::noise;
use crate::subnet::{SubnetMapSpec, SubnetPseudonymizer};
use tracing::warn;

/// Start character of `ContinuousChar` when no parameter is given.
pub const DEFAULT_CONTINUOUS_START: u8 = b'a';

/// Number of leading bytes the Crypto-PAn methods transform.
pub const IPV4_LEN: usize = 4;

/// Result of applying one primitive to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Length of the field after this step.
    pub length: usize,
    /// Whether later primitives in the chain may run.
    pub proceed: bool,
    /// Whether at least one byte changed.
    pub changed: bool,
}

impl Outcome {
    fn next(length: usize, changed: bool) -> Self {
        Self {
            length,
            proceed: true,
            changed,
        }
    }

    fn stop(length: usize) -> Self {
        Self {
            length,
            proceed: false,
            changed: false,
        }
    }
}

/// Configured anonymization step.
#[derive(Clone)]
pub enum Primitive {
    Hash(FieldDigest),
    HmacHash(FieldDigest),
    BytewiseHash(ByteTable),
    BytewiseHmacHash(ByteTable),
    ConstOverwrite(u8),
    ContinuousChar(u8),
    Whitenoise(u8),
    Randomize,
    Shuffle,
    PreserveBroadcast,
    CryptoPan(Box<PrefixPseudonymizer>),
    CryptoPanPrefix(Box<SubnetPseudonymizer>),
}

impl Primitive {
    /// Build a primitive from its method, parameter and subnet mappings.
    ///
    /// `mappings` is only read by `CryptoPanPrefix`.
    pub fn build(method: AnonMethod, param: &str, mappings: &[SubnetMapSpec]) -> Result<Self> {
        let name = method.name();
        let primitive = match method {
            AnonMethod::HashSha1 => Primitive::Hash(FieldDigest::Sha1),
            AnonMethod::HashHmacSha1 => Primitive::HmacHash(hmac_digest(name, param)?),
            AnonMethod::BytewiseHashSha1 => {
                Primitive::BytewiseHash(ByteTable::build(&FieldDigest::Sha1))
            }
            AnonMethod::BytewiseHashHmacSha1 => {
                Primitive::BytewiseHmacHash(ByteTable::build(&hmac_digest(name, param)?))
            }
            AnonMethod::ConstOverwrite => {
                Primitive::ConstOverwrite(decode_single_byte(name, param)?)
            }
            AnonMethod::ContinuousChar => {
                if param.is_empty() {
                    Primitive::ContinuousChar(DEFAULT_CONTINUOUS_START)
                } else {
                    Primitive::ContinuousChar(decode_single_byte(name, param)?)
                }
            }
            AnonMethod::Whitenoise => Primitive::Whitenoise(parse_strength(name, param)?),
            AnonMethod::Randomize => Primitive::Randomize,
            AnonMethod::Shuffle => Primitive::Shuffle,
            AnonMethod::PreserveBroadcast => Primitive::PreserveBroadcast,
            AnonMethod::CryptoPan => {
                let key = CryptoPanKey::from_param(param)?;
                Primitive::CryptoPan(Box::new(PrefixPseudonymizer::new(&key)))
            }
            AnonMethod::CryptoPanPrefix => {
                let key = CryptoPanKey::from_param(param)?;
                if mappings.is_empty() {
                    warn!(
                        method = name,
                        "no subnet mappings configured; every address will pass through unchanged"
                    );
                }
                Primitive::CryptoPanPrefix(Box::new(SubnetPseudonymizer::new(&key, mappings)?))
            }
        };
        Ok(primitive)
    }

    /// Method this primitive was built from.
    pub fn method(&self) -> AnonMethod {
        match self {
            Primitive::Hash(_) => AnonMethod::HashSha1,
            Primitive::HmacHash(_) => AnonMethod::HashHmacSha1,
            Primitive::BytewiseHash(_) => AnonMethod::BytewiseHashSha1,
            Primitive::BytewiseHmacHash(_) => AnonMethod::BytewiseHashHmacSha1,
            Primitive::ConstOverwrite(_) => AnonMethod::ConstOverwrite,
            Primitive::ContinuousChar(_) => AnonMethod::ContinuousChar,
            Primitive::Whitenoise(_) => AnonMethod::Whitenoise,
            Primitive::Randomize => AnonMethod::Randomize,
            Primitive::Shuffle => AnonMethod::Shuffle,
            Primitive::PreserveBroadcast => AnonMethod::PreserveBroadcast,
            Primitive::CryptoPan(_) => AnonMethod::CryptoPan,
            Primitive::CryptoPanPrefix(_) => AnonMethod::CryptoPanPrefix,
        }
    }

    /// Apply this step to the whole of `buf`.
    pub fn attempt(&self, buf: &mut [u8]) -> Outcome {
        let len = buf.len();
        match self {
            Primitive::Hash(digest) | Primitive::HmacHash(digest) => {
                Outcome::next(len, digest.overwrite(buf))
            }
            Primitive::BytewiseHash(table) | Primitive::BytewiseHmacHash(table) => {
                Outcome::next(len, table.substitute(buf))
            }
            Primitive::ConstOverwrite(value) => Outcome::next(len, fill(buf, |_| *value)),
            Primitive::ContinuousChar(start) => {
                Outcome::next(len, fill(buf, |i| start.wrapping_add(i as u8)))
            }
            Primitive::Whitenoise(strength) => {
                Outcome::next(len, noise::whitenoise(buf, *strength, &mut rand::rng()))
            }
            Primitive::Randomize => Outcome::next(len, noise::randomize(buf, &mut rand::rng())),
            Primitive::Shuffle => Outcome::next(len, noise::shuffle(buf, &mut rand::rng())),
            Primitive::PreserveBroadcast => {
                if is_broadcast(buf) {
                    Outcome::stop(len)
                } else {
                    Outcome::next(len, false)
                }
            }
            Primitive::CryptoPan(p) => {
                Outcome::next(len, map_ipv4(buf, |addr| p.anonymize(addr)))
            }
            Primitive::CryptoPanPrefix(p) => {
                Outcome::next(len, map_ipv4(buf, |addr| p.pseudonymize_host(addr)))
            }
        }
    }
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Primitive").field(&self.method()).finish()
    }
}

fn hmac_digest(method: &str, param: &str) -> Result<FieldDigest> {
    if param.is_empty() {
        return Err(AnonError::parameter(method, "a key parameter is required"));
    }
    FieldDigest::keyed(&decode_param(method, param)?)
}

fn parse_strength(method: &str, param: &str) -> Result<u8> {
    match param.trim().parse::<u8>() {
        Ok(strength) if strength <= noise::MAX_STRENGTH => Ok(strength),
        _ => Err(AnonError::parameter(
            method,
            format!(
                "strength must be an integer between 0 and {}, got '{}'",
                noise::MAX_STRENGTH,
                param
            ),
        )),
    }
}

/// Overwrite each byte with `value(index)`. Returns whether any byte changed.
fn fill(buf: &mut [u8], value: impl Fn(usize) -> u8) -> bool {
    let mut changed = false;
    for (i, byte) in buf.iter_mut().enumerate() {
        let v = value(i);
        changed |= *byte != v;
        *byte = v;
    }
    changed
}

/// Every byte of the field is `0xff`.
///
/// The whole field is checked, so on an address-plus-mask field
/// (`IPV4_LEN + 1` bytes) the mask octet must be `0xff` too.
fn is_broadcast(buf: &[u8]) -> bool {
    !buf.is_empty() && buf.iter().all(|&b| b == 0xff)
}

/// Transform the leading IPv4 address; trailing bytes (a mask octet) are kept.
fn map_ipv4(buf: &mut [u8], f: impl Fn(u32) -> u32) -> bool {
    let Some(head) = buf.get_mut(..IPV4_LEN) else {
        return false;
    };
    let addr = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
    let mapped = f(addr);
    head.copy_from_slice(&mapped.to_be_bytes());
    mapped != addr
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0x1522178d33a4cf80130a5b1649907d10d8988f837979652762574c2d2a842202";

    fn key_param() -> String {
        KEY_HEX.to_string()
    }

    fn build(method: AnonMethod, param: &str) -> Primitive {
        Primitive::build(method, param, &[]).unwrap()
    }

    #[test]
    fn test_const_overwrite_raw_and_hex() {
        let mut buf = [1u8, 2, 3];
        let out = build(AnonMethod::ConstOverwrite, "X").attempt(&mut buf);
        assert_eq!(buf, *b"XXX");
        assert_eq!(out, Outcome::next(3, true));

        let mut buf = [1u8, 2];
        build(AnonMethod::ConstOverwrite, "0x00").attempt(&mut buf);
        assert_eq!(buf, [0, 0]);
    }

    #[test]
    fn test_const_overwrite_unchanged_when_already_constant() {
        let mut buf = *b"XX";
        let out = build(AnonMethod::ConstOverwrite, "X").attempt(&mut buf);
        assert!(!out.changed);
    }

    #[test]
    fn test_const_overwrite_rejects_bad_param() {
        for param in ["", "XY", "0x0", "0x0102", "0xZZ"] {
            let err = Primitive::build(AnonMethod::ConstOverwrite, param, &[]).unwrap_err();
            assert_eq!(err.code(), 41, "param {:?}", param);
        }
    }

    #[test]
    fn test_continuous_char() {
        let mut buf = [0u8; 4];
        build(AnonMethod::ContinuousChar, "").attempt(&mut buf);
        assert_eq!(buf, *b"abcd");

        let mut buf = [0u8; 3];
        build(AnonMethod::ContinuousChar, "x").attempt(&mut buf);
        assert_eq!(buf, *b"xyz");

        let mut buf = [0u8; 2];
        build(AnonMethod::ContinuousChar, "0xff").attempt(&mut buf);
        assert_eq!(buf, [0xff, 0x00]);
    }

    #[test]
    fn test_preserve_broadcast() {
        let guard = build(AnonMethod::PreserveBroadcast, "");

        let mut buf = [0xffu8; 4];
        assert_eq!(guard.attempt(&mut buf), Outcome::stop(4));
        assert_eq!(buf, [0xff; 4]);

        let mut buf = [0xff, 0xff, 0xff, 0xfe];
        assert_eq!(guard.attempt(&mut buf), Outcome::next(4, false));

        let mut buf: [u8; 0] = [];
        assert!(guard.attempt(&mut buf).proceed);
    }

    #[test]
    fn test_hmac_requires_key() {
        let err = Primitive::build(AnonMethod::HashHmacSha1, "", &[]).unwrap_err();
        assert_eq!(err.code(), 41);
        let err = Primitive::build(AnonMethod::BytewiseHashHmacSha1, "", &[]).unwrap_err();
        assert_eq!(err.code(), 41);
    }

    #[test]
    fn test_hex_and_raw_hmac_keys_agree() {
        let raw = build(AnonMethod::HashHmacSha1, "Jefe");
        let hex = build(AnonMethod::HashHmacSha1, "0x4a656665");
        let mut a = *b"10.0.0.1";
        let mut b = *b"10.0.0.1";
        raw.attempt(&mut a);
        hex.attempt(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bytewise_matches_single_byte_attempts() {
        let p = build(AnonMethod::BytewiseHashHmacSha1, "secret");
        let Primitive::BytewiseHmacHash(table) = &p else {
            panic!("wrong variant");
        };
        for value in 0..=255u8 {
            let mut buf = [value];
            p.attempt(&mut buf);
            assert_eq!(buf[0], table.get(value));
        }
    }

    #[test]
    fn test_whitenoise_strength_bounds() {
        assert!(Primitive::build(AnonMethod::Whitenoise, "0", &[]).is_ok());
        assert!(Primitive::build(AnonMethod::Whitenoise, "100", &[]).is_ok());
        assert!(Primitive::build(AnonMethod::Whitenoise, "101", &[]).is_err());
        assert!(Primitive::build(AnonMethod::Whitenoise, "", &[]).is_err());
        assert!(Primitive::build(AnonMethod::Whitenoise, "-5", &[]).is_err());
    }

    #[test]
    fn test_cryptopan_rejects_short_key() {
        let err = Primitive::build(AnonMethod::CryptoPan, "short", &[]).unwrap_err();
        assert_eq!(err.code(), 42);
        let err = Primitive::build(AnonMethod::CryptoPan, "0xabcd", &[]).unwrap_err();
        assert_eq!(err.code(), 42);
    }

    #[test]
    fn test_cryptopan_keeps_mask_octet() {
        let p = build(AnonMethod::CryptoPan, &key_param());
        let mut buf = [10u8, 0, 0, 1, 24];
        let out = p.attempt(&mut buf);
        assert_eq!(out.length, 5);
        assert_eq!(buf[4], 24);
    }

    #[test]
    fn test_cryptopan_short_buffer_untouched() {
        let p = build(AnonMethod::CryptoPan, &key_param());
        let mut buf = [10u8, 0, 0];
        let out = p.attempt(&mut buf);
        assert_eq!(buf, [10, 0, 0]);
        assert!(!out.changed);
    }

    #[test]
    fn test_cryptopan_prefix_outside_mapping_unchanged() {
        let mappings = [SubnetMapSpec::new("10.0.0.0", "192.168.0.0", "16")];
        let p = Primitive::build(AnonMethod::CryptoPanPrefix, &key_param(), &mappings).unwrap();

        let mut buf = [172u8, 16, 0, 5];
        let out = p.attempt(&mut buf);
        assert_eq!(buf, [172, 16, 0, 5]);
        assert!(!out.changed);
        assert!(out.proceed);

        let mut buf = [10u8, 0, 3, 4];
        assert!(p.attempt(&mut buf).changed);
        assert_eq!(buf[..2], [192, 168]);
    }

    #[test]
    fn test_method_roundtrip() {
        for method in AnonMethod::ALL {
            let param = match method {
                AnonMethod::HashHmacSha1 | AnonMethod::BytewiseHashHmacSha1 => "k".to_string(),
                AnonMethod::ConstOverwrite => "X".to_string(),
                AnonMethod::Whitenoise => "50".to_string(),
                AnonMethod::CryptoPan | AnonMethod::CryptoPanPrefix => key_param(),
                _ => String::new(),
            };
            let p = Primitive::build(method, &param, &[]).unwrap();
            assert_eq!(p.method(), method);
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let p = build(AnonMethod::CryptoPan, &key_param());
        assert_eq!(format!("{:?}", p), "Primitive(CryptoPan)");
    }
}
