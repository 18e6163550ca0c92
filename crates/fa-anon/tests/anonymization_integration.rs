//! Integration tests for fa-anon.
//!
//! These tests verify:
//! - Published Crypto-PAn results through the field registry
//! - Broadcast addresses survive guarded chains
//! - Subnet remapping reports untouched addresses as not anonymized
//! - Byte-wise tables agree with single-byte application
//! - Configuration errors surface at binding time

use fa_anon::{
    AnonError, AnonMethod, Chain, CryptoPanKey, FieldRegistry, Primitive, PrefixPseudonymizer,
    SubnetMapSpec, TemplateField,
};
use fa_common::{FieldLength, InformationElementId, StandardDictionary};
use std::net::Ipv4Addr;

const SAMPLE_KEY: &str = "0x1522178d33a4cf80130a5b1649907d10d8988f837979652762574c2d2a842202";

fn src() -> InformationElementId {
    InformationElementId::iana(8)
}

fn dst() -> InformationElementId {
    InformationElementId::iana(12)
}

fn octets(s: &str) -> [u8; 4] {
    s.parse::<Ipv4Addr>().unwrap().octets()
}

// ============================================================================
// Crypto-PAn through the registry
// ============================================================================

#[test]
fn test_reference_trace_through_registry() {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(src(), None, "CryptoPan", SAMPLE_KEY, &[])
        .unwrap();

    let cases = [
        ("128.11.68.132", "135.242.180.132"),
        ("129.118.74.4", "134.136.186.123"),
        ("130.132.252.244", "133.68.164.234"),
        ("141.223.7.43", "141.167.8.160"),
    ];
    for (input, expected) in cases {
        let mut buf = octets(input);
        assert!(registry.apply_field(src(), &mut buf));
        assert_eq!(buf, octets(expected), "input {}", input);
    }
}

#[test]
fn test_same_key_same_pseudonyms_across_registries() {
    let build = || {
        let mut registry = FieldRegistry::new();
        registry
            .add_binding(src(), None, "CryptoPan", SAMPLE_KEY, &[])
            .unwrap();
        registry
    };
    let (a, b) = (build(), build());
    let mut x = octets("198.51.100.7");
    let mut y = octets("198.51.100.7");
    a.apply_field(src(), &mut x);
    b.apply_field(src(), &mut y);
    assert_eq!(x, y);
}

// ============================================================================
// Broadcast guard
// ============================================================================

#[test]
fn test_broadcast_guard_then_constant() {
    let chain = Chain::build("PreserveBroadcast+ConstOverwrite", "X", &[]).unwrap();

    let mut broadcast = [0xffu8; 4];
    assert!(!chain.run(&mut broadcast).anonymized);
    assert_eq!(broadcast, [0xff; 4]);

    let mut addr = [0x0au8, 0x00, 0x00, 0x01];
    assert!(chain.run(&mut addr).anonymized);
    assert_eq!(addr, [b'X'; 4]);
}

#[test]
fn test_broadcast_guard_only_stops_its_own_chain() {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(src(), None, "PreserveBroadcast+CryptoPan", SAMPLE_KEY, &[])
        .unwrap();
    registry
        .add_binding(src(), None, "ConstOverwrite", "0x00", &[])
        .unwrap();

    let mut buf = [0xffu8; 4];
    assert!(registry.apply_field(src(), &mut buf));
    assert_eq!(buf, [0; 4]);
}

#[test]
fn test_broadcast_guard_checks_mask_octet() {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(
            src(),
            Some(FieldLength::Fixed(5)),
            "PreserveBroadcast+CryptoPan",
            SAMPLE_KEY,
            &[],
        )
        .unwrap();

    let mut all_ones = [0xffu8; 5];
    assert!(!registry.apply_field(src(), &mut all_ones));
    assert_eq!(all_ones, [0xff; 5]);

    // a /24 mask octet means the field is not all ones, so the address is mapped
    let mut masked = [0xff, 0xff, 0xff, 0xff, 24];
    assert!(registry.apply_field(src(), &mut masked));
    assert_ne!(&masked[..4], &[0xff; 4]);
    assert_eq!(masked[4], 24);
}

// ============================================================================
// Subnet remapping
// ============================================================================

fn subnet_registry() -> FieldRegistry {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(
            src(),
            None,
            "CryptoPanPrefix",
            SAMPLE_KEY,
            &[SubnetMapSpec::new("10.0.0.0", "192.168.0.0", "16")],
        )
        .unwrap();
    registry
}

#[test]
fn test_subnet_outside_mapping_not_anonymized() {
    let registry = subnet_registry();
    let mut buf = octets("172.16.0.5");
    assert!(!registry.apply_field(src(), &mut buf));
    assert_eq!(buf, octets("172.16.0.5"));
}

#[test]
fn test_subnet_inside_mapping_moves_and_preserves_prefix() {
    let registry = subnet_registry();
    let plain = PrefixPseudonymizer::new(&CryptoPanKey::from_param(SAMPLE_KEY).unwrap());

    let mut a = octets("10.0.2.3");
    let mut b = octets("10.0.2.77");
    assert!(registry.apply_field(src(), &mut a));
    registry.apply_field(src(), &mut b);

    assert_eq!(a[..2], [192, 168]);
    assert_eq!(a[..3], b[..3]);

    let expected_host = plain.anonymize(u32::from_be_bytes(octets("10.0.2.3"))) & 0xffff;
    assert_eq!(u32::from_be_bytes(a) & 0xffff, expected_host);
}

#[test]
fn test_subnet_mask_octet_kept() {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(
            src(),
            Some(FieldLength::Fixed(5)),
            "CryptoPanPrefix",
            SAMPLE_KEY,
            &[SubnetMapSpec::new("10.0.0.0", "192.168.0.0", "16")],
        )
        .unwrap();
    let mut buf = [10u8, 0, 0, 1, 24];
    assert!(registry.apply_field(src(), &mut buf));
    assert_eq!(buf[..2], [192, 168]);
    assert_eq!(buf[4], 24);
}

// ============================================================================
// Byte-wise tables
// ============================================================================

#[test]
fn test_bytewise_keyed_table_matches_attempt() {
    let p = Primitive::build(AnonMethod::BytewiseHashHmacSha1, "table-key", &[]).unwrap();
    let Primitive::BytewiseHmacHash(table) = &p else {
        panic!("expected byte-wise keyed hash");
    };
    for value in 0..=255u8 {
        let mut buf = [value];
        p.attempt(&mut buf);
        assert_eq!(buf[0], table.get(value), "byte {}", value);
    }
}

#[test]
fn test_bytewise_field_is_per_byte() {
    let chain = Chain::build("BytewiseHashSha1", "", &[]).unwrap();
    let mut field = [7u8, 7, 9];
    chain.run(&mut field);
    assert_eq!(field[0], field[1]);
}

// ============================================================================
// Record application
// ============================================================================

#[test]
fn test_record_copy_mode_leaves_input() {
    let mut registry = FieldRegistry::new();
    registry
        .add_binding(src(), None, "CryptoPan", SAMPLE_KEY, &[])
        .unwrap();
    registry
        .add_binding(dst(), None, "PreserveBroadcast+CryptoPan", SAMPLE_KEY, &[])
        .unwrap();

    let mut record = Vec::new();
    record.extend_from_slice(&octets("128.11.68.132"));
    record.extend_from_slice(&[0xff; 4]);
    record.extend_from_slice(&[0x01, 0xbb]);

    let fields = [
        TemplateField::new(src(), 0, 4),
        TemplateField::new(dst(), 4, 4),
        TemplateField::new(InformationElementId::iana(7), 8, 2),
    ];

    let (copy, outcome) = registry.anonymize_copy(&record, &fields);
    assert_eq!(record[..4], octets("128.11.68.132"));
    assert_eq!(copy[..4], octets("135.242.180.132"));
    assert_eq!(copy[4..8], [0xff; 4]);
    assert_eq!(copy[8..], [0x01, 0xbb]);
    assert_eq!(outcome.fields_processed, 2);
    assert_eq!(outcome.fields_anonymized, 1);
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_configuration_errors() {
    let mut registry = FieldRegistry::with_dictionary(Box::new(StandardDictionary::new()));

    assert_eq!(
        registry.add_binding(src(), None, "Scramble", "", &[]),
        Err(AnonError::UnknownMethod("Scramble".to_string()))
    );
    assert!(matches!(
        registry.add_binding(src(), None, "CryptoPan", "0x1234", &[]),
        Err(AnonError::InvalidKey(_))
    ));
    assert!(matches!(
        registry.add_binding(src(), None, "ConstOverwrite", "0x123", &[]),
        Err(AnonError::InvalidParameter { .. })
    ));
    assert!(matches!(
        registry.add_binding(
            src(),
            None,
            "CryptoPanPrefix",
            SAMPLE_KEY,
            &[SubnetMapSpec::new("10.0.0.0", "192.168.0.0", "40")]
        ),
        Err(AnonError::InvalidCidr(_))
    ));
    assert!(matches!(
        registry.add_binding(
            InformationElementId::iana(1),
            None,
            "CryptoPan",
            SAMPLE_KEY,
            &[]
        ),
        Err(AnonError::InvalidFieldLength { .. })
    ));

    assert!(registry.is_empty());
}
