//! Field anonymization engine for flow records.
//!
//! This crate rewrites individual record fields in place according to a
//! configured set of anonymization chains.
//!
//! # Key Features
//!
//! - **Prefix-preserving pseudonymization**: Crypto-PAn over AES-128 keeps
//!   shared address prefixes shared after anonymization.
//! - **Subnet remapping**: addresses inside configured subnets are moved into
//!   target subnets; everything else passes through unchanged.
//! - **Primitive chains**: hashing, keyed hashing, byte-wise substitution,
//!   constant fills and randomized noise, combined with `+` and stopped early
//!   for broadcast addresses.
//! - **Field registry**: chains bound to information elements, applied per
//!   field or per record.
//!
//! # Example
//!
//! ```no_run
//! use fa_anon::FieldRegistry;
//! use fa_common::InformationElementId;
//!
//! let key = "0x1522178d33a4cf80130a5b1649907d10d8988f837979652762574c2d2a842202";
//! let mut registry = FieldRegistry::new();
//! registry
//!     .add_binding(InformationElementId::iana(8), None, "PreserveBroadcast+CryptoPan", key, &[])
//!     .unwrap();
//!
//! let mut addr = [10, 0, 0, 1];
//! assert!(registry.apply_field(InformationElementId::iana(8), &mut addr));
//! ```

pub mod chain;
pub mod cipher;
pub mod cryptopan;
pub mod digest;
pub mod error;
pub mod key;
pub mod method;
pub mod noise;
pub mod primitive;
pub mod registry;
pub mod subnet;

pub use chain::{Chain, ChainResult};
pub use cipher::{Aes128Cipher, BlockCipher};
pub use cryptopan::{prefix_mask, PrefixPseudonymizer};
pub use digest::{ByteTable, FieldDigest};
pub use error::{AnonError, Result};
pub use key::{CryptoPanKey, CRYPTOPAN_KEY_LEN};
pub use method::{AnonMethod, CHAIN_SEPARATOR};
pub use primitive::{Outcome, Primitive};
pub use registry::{FieldBinding, FieldRegistry, RecordOutcome, TemplateField};
pub use subnet::{SubnetMapSpec, SubnetMapping, SubnetPseudonymizer};
