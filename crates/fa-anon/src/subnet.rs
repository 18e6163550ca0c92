//! Prefix-preserving anonymization across explicit subnet mappings.
//!
//! Addresses inside a configured source subnet are pseudonymized with
//! Crypto-PAn and then moved into the corresponding target subnet: the top
//! `cidr` bits come from the target network, the remaining bits from the
//! pseudonym. Addresses outside every source subnet pass through unchanged.

use crate::cryptopan::{prefix_mask, PrefixPseudonymizer};
use crate::error::{AnonError, Result};
use crate::key::CryptoPanKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Subnet mapping as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetMapSpec {
    /// Source network in dotted-decimal form.
    pub from: String,
    /// Target network in dotted-decimal form.
    pub to: String,
    /// Prefix length, 0..=32. Accepts `cidr = 16` as well as `cidr = "16"`.
    #[serde(deserialize_with = "cidr_text")]
    pub cidr: String,
}

/// Keep the prefix length as text so range checks happen in one place.
fn cidr_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cidr {
        Text(String),
        Number(i64),
    }

    Ok(match Cidr::deserialize(deserializer)? {
        Cidr::Text(text) => text,
        Cidr::Number(n) => n.to_string(),
    })
}

impl SubnetMapSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            cidr: cidr.into(),
        }
    }
}

/// Validated mapping with both networks masked to `cidr` bits (host order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetMapping {
    pub source: u32,
    pub target: u32,
    pub cidr: u8,
}

impl SubnetMapping {
    /// Parse and canonicalize a configured mapping.
    pub fn parse(entry: &SubnetMapSpec) -> Result<Self> {
        let source = parse_ipv4(&entry.from)?;
        let target = parse_ipv4(&entry.to)?;
        let cidr = parse_cidr(&entry.cidr)?;
        let mask = prefix_mask(cidr);

        Ok(Self {
            source: source & mask,
            target: target & mask,
            cidr,
        })
    }

    /// Whether a host-order address falls inside the source subnet.
    pub fn contains(&self, addr: u32) -> bool {
        addr & prefix_mask(self.cidr) == self.source
    }
}

fn parse_ipv4(s: &str) -> Result<u32> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| AnonError::InvalidAddress(s.to_string()))
}

fn parse_cidr(s: &str) -> Result<u8> {
    match s.trim().parse::<u8>() {
        Ok(cidr) if cidr <= 32 => Ok(cidr),
        _ => Err(AnonError::InvalidCidr(s.to_string())),
    }
}

/// Crypto-PAn restricted to, and remapped across, configured subnets.
///
/// Overlapping source subnets are allowed; the longest matching prefix wins.
#[derive(Clone)]
pub struct SubnetPseudonymizer {
    inner: PrefixPseudonymizer,
    /// Distinct prefix lengths, longest first.
    cidrs: Vec<u8>,
    mappings: HashMap<(u8, u32), SubnetMapping>,
}

impl SubnetPseudonymizer {
    /// Build from a key and configured mappings.
    pub fn new(key: &CryptoPanKey, entries: &[SubnetMapSpec]) -> Result<Self> {
        let mut cidrs = Vec::new();
        let mut mappings = HashMap::with_capacity(entries.len());

        for entry in entries {
            let mapping = SubnetMapping::parse(entry)?;
            if mappings
                .insert((mapping.cidr, mapping.source), mapping)
                .is_some()
            {
                return Err(AnonError::DuplicateSubnet {
                    network: Ipv4Addr::from(mapping.source),
                    cidr: mapping.cidr,
                });
            }
            if !cidrs.contains(&mapping.cidr) {
                cidrs.push(mapping.cidr);
            }
        }
        cidrs.sort_unstable_by(|a, b| b.cmp(a));

        Ok(Self {
            inner: PrefixPseudonymizer::new(key),
            cidrs,
            mappings,
        })
    }

    /// Number of configured mappings.
    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// Prefix lengths tried during lookup, in lookup order.
    pub fn cidrs(&self) -> &[u8] {
        &self.cidrs
    }

    /// Find the mapping covering a host-order address.
    pub fn find(&self, addr: u32) -> Option<&SubnetMapping> {
        self.cidrs
            .iter()
            .find_map(|&cidr| self.mappings.get(&(cidr, addr & prefix_mask(cidr))))
    }

    /// Pseudonymize a host-order address.
    pub fn pseudonymize_host(&self, addr: u32) -> u32 {
        let Some(mapping) = self.find(addr) else {
            return addr;
        };

        let mask = prefix_mask(mapping.cidr);
        let anonymized = self.inner.anonymize(addr);
        (mapping.target & mask) | (anonymized & !mask)
    }

    /// Pseudonymize an address given in network byte order.
    pub fn pseudonymize(&self, octets: [u8; 4]) -> [u8; 4] {
        self.pseudonymize_host(u32::from_be_bytes(octets))
            .to_be_bytes()
    }

    /// Pseudonymize an [`Ipv4Addr`].
    pub fn pseudonymize_addr(&self, addr: Ipv4Addr) -> Ipv4Addr {
        Ipv4Addr::from(self.pseudonymize(addr.octets()))
    }
}

impl std::fmt::Debug for SubnetPseudonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubnetPseudonymizer")
            .field("cidrs", &self.cidrs)
            .field("mappings", &self.mappings.len())
            .finish_non_exhaustive()
    }
}
