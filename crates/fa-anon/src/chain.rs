//! Ordered primitive chains with early exit.

use crate::error::{AnonError, Result};
use crate::method::{AnonMethod, CHAIN_SEPARATOR};
use crate::primitive::Primitive;
use crate::subnet::SubnetMapSpec;
use std::fmt;

/// Result of running a chain over one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainResult {
    /// Smallest length reported by any step that ran.
    pub length: usize,
    /// Whether any step changed at least one byte.
    pub anonymized: bool,
}

/// Primitives applied in order to the same buffer.
///
/// A step that returns `proceed = false` ends the chain; steps after it do
/// not run.
#[derive(Debug, Clone)]
pub struct Chain {
    primitives: Vec<Primitive>,
}

impl Chain {
    /// Build a chain from a `+`-joined method string.
    ///
    /// `param` is handed to every step; `mappings` requires a
    /// `CryptoPanPrefix` step somewhere in the chain.
    pub fn build(methods: &str, param: &str, mappings: &[SubnetMapSpec]) -> Result<Self> {
        let methods = AnonMethod::parse_chain(methods)?;
        if !mappings.is_empty() && !methods.contains(&AnonMethod::CryptoPanPrefix) {
            return Err(AnonError::parameter(
                methods_label(&methods),
                "subnet mappings are only allowed with CryptoPanPrefix",
            ));
        }

        let primitives = methods
            .into_iter()
            .map(|method| Primitive::build(method, param, mappings))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { primitives })
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Methods in chain order.
    pub fn methods(&self) -> Vec<AnonMethod> {
        self.primitives.iter().map(Primitive::method).collect()
    }

    /// Whether any step only works on IPv4-sized fields.
    pub fn requires_ipv4(&self) -> bool {
        self.primitives.iter().any(|p| p.method().requires_ipv4())
    }

    /// Run every step over `buf` until one asks to stop.
    pub fn run(&self, buf: &mut [u8]) -> ChainResult {
        let mut result = ChainResult {
            length: buf.len(),
            anonymized: false,
        };

        for primitive in &self.primitives {
            let outcome = primitive.attempt(&mut buf[..result.length]);
            result.length = result.length.min(outcome.length);
            result.anonymized |= outcome.changed;
            if !outcome.proceed {
                break;
            }
        }

        result
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&methods_label(&self.methods()))
    }
}

fn methods_label(methods: &[AnonMethod]) -> String {
    methods
        .iter()
        .map(AnonMethod::name)
        .collect::<Vec<_>>()
        .join(&CHAIN_SEPARATOR.to_string())
}
