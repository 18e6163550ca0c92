//! Information element dictionary.
//!
//! Resolves canonical byte lengths and display names for information
//! elements. The anonymization registry consults it when a configured
//! field omits an explicit length.

use crate::ie::{FieldLength, InformationElementId, IANA_PEN, PRIVATE_PEN, REVERSE_PEN};

/// Dictionary entry for one information element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeInfo {
    pub id: InformationElementId,
    pub length: FieldLength,
    pub name: &'static str,
}

/// Lookup interface for information element metadata.
pub trait IeDictionary: Send + Sync {
    /// Find an element by id.
    fn lookup(&self, id: InformationElementId) -> Option<&IeInfo>;

    /// Find an element by name (case-insensitive).
    fn lookup_name(&self, name: &str) -> Option<&IeInfo>;

    /// Resolve a user-supplied element reference.
    ///
    /// Accepts a name (`sourceIPv4Address`) or a numeric id (`8`, `1:29305`).
    /// Numeric ids resolve even when the dictionary does not know them.
    fn resolve(&self, reference: &str) -> Option<InformationElementId> {
        if let Some(info) = self.lookup_name(reference) {
            return Some(info.id);
        }
        reference.parse::<InformationElementId>().ok()
    }

    /// Display name for an id, falling back to its numeric form.
    fn display_name(&self, id: InformationElementId) -> String {
        self.lookup(id)
            .map(|info| info.name.to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

const fn entry(type_id: u16, enterprise: u32, length: u16, name: &'static str) -> IeInfo {
    IeInfo {
        id: InformationElementId::new(type_id, enterprise),
        length: if length == 0 {
            FieldLength::Variable
        } else {
            FieldLength::Fixed(length)
        },
        name,
    }
}

/// Built-in table of the elements a flow collector usually anonymizes.
static STANDARD_ELEMENTS: &[IeInfo] = &[
    entry(1, IANA_PEN, 8, "octetDeltaCount"),
    entry(1, REVERSE_PEN, 8, "revOctetDeltaCount"),
    entry(2, IANA_PEN, 8, "packetDeltaCount"),
    entry(2, REVERSE_PEN, 8, "revPacketDeltaCount"),
    entry(4, IANA_PEN, 1, "protocolIdentifier"),
    entry(5, IANA_PEN, 1, "ipClassOfService"),
    entry(6, IANA_PEN, 1, "tcpControlBits"),
    entry(6, REVERSE_PEN, 1, "revTcpControlBits"),
    entry(7, IANA_PEN, 2, "sourceTransportPort"),
    entry(8, IANA_PEN, 4, "sourceIPv4Address"),
    entry(9, IANA_PEN, 1, "sourceIPv4PrefixLength"),
    entry(10, IANA_PEN, 4, "ingressInterface"),
    entry(11, IANA_PEN, 2, "destinationTransportPort"),
    entry(12, IANA_PEN, 4, "destinationIPv4Address"),
    entry(13, IANA_PEN, 1, "destinationIPv4PrefixLength"),
    entry(14, IANA_PEN, 4, "egressInterface"),
    entry(15, IANA_PEN, 4, "ipNextHopIPv4Address"),
    entry(16, IANA_PEN, 4, "bgpSourceAsNumber"),
    entry(17, IANA_PEN, 4, "bgpDestinationAsNumber"),
    entry(18, IANA_PEN, 4, "bgpNextHopIPv4Address"),
    entry(27, IANA_PEN, 16, "sourceIPv6Address"),
    entry(28, IANA_PEN, 16, "destinationIPv6Address"),
    entry(29, IANA_PEN, 1, "sourceIPv6PrefixLength"),
    entry(30, IANA_PEN, 1, "destinationIPv6PrefixLength"),
    entry(31, IANA_PEN, 4, "flowLabelIPv6"),
    entry(32, IANA_PEN, 2, "icmpTypeCodeIPv4"),
    entry(33, IANA_PEN, 1, "igmpType"),
    entry(44, IANA_PEN, 4, "sourceIPv4Prefix"),
    entry(45, IANA_PEN, 4, "destinationIPv4Prefix"),
    entry(52, IANA_PEN, 1, "minimumTTL"),
    entry(53, IANA_PEN, 1, "maximumTTL"),
    entry(56, IANA_PEN, 6, "sourceMacAddress"),
    entry(60, IANA_PEN, 1, "ipVersion"),
    entry(62, IANA_PEN, 16, "ipNextHopIPv6Address"),
    entry(63, IANA_PEN, 16, "bgpNextHopIPv6Address"),
    entry(80, IANA_PEN, 6, "destinationMacAddress"),
    entry(85, IANA_PEN, 8, "octetTotalCount"),
    entry(86, IANA_PEN, 8, "packetTotalCount"),
    entry(130, IANA_PEN, 4, "exporterIPv4Address"),
    entry(131, IANA_PEN, 16, "exporterIPv6Address"),
    entry(136, IANA_PEN, 1, "flowEndReason"),
    entry(150, IANA_PEN, 4, "flowStartSeconds"),
    entry(150, REVERSE_PEN, 4, "revFlowStartSeconds"),
    entry(151, IANA_PEN, 4, "flowEndSeconds"),
    entry(151, REVERSE_PEN, 4, "revFlowEndSeconds"),
    entry(152, IANA_PEN, 8, "flowStartMilliseconds"),
    entry(153, IANA_PEN, 8, "flowEndMilliseconds"),
    entry(184, IANA_PEN, 4, "tcpSequenceNumber"),
    entry(185, IANA_PEN, 4, "tcpAcknowledgementNumber"),
    entry(186, IANA_PEN, 2, "tcpWindowSize"),
    entry(190, IANA_PEN, 2, "totalLengthIPv4"),
    entry(192, IANA_PEN, 1, "ipTTL"),
    entry(291, IANA_PEN, 0, "basicList"),
    entry(292, IANA_PEN, 0, "subTemplateList"),
    entry(293, IANA_PEN, 0, "subTemplateMultiList"),
    entry(313, IANA_PEN, 0, "ipHeaderPacketSection"),
    entry(314, IANA_PEN, 0, "ipPayloadPacketSection"),
    entry(322, IANA_PEN, 4, "observationTimeSeconds"),
    entry(323, IANA_PEN, 8, "observationTimeMilliseconds"),
    entry(1, PRIVATE_PEN, 0, "frontPayload"),
    entry(1, PRIVATE_PEN | REVERSE_PEN, 0, "revFrontPayload"),
    entry(2, PRIVATE_PEN, 4, "frontPayloadLen"),
    entry(2, PRIVATE_PEN | REVERSE_PEN, 4, "revFrontPayloadLen"),
    entry(3, PRIVATE_PEN, 4, "maxPacketGap"),
    entry(4, PRIVATE_PEN, 4, "frontPayloadPktCount"),
    entry(8, PRIVATE_PEN, 8, "transportOctetDeltaCount"),
    entry(9, PRIVATE_PEN, 1, "anonymisationType"),
];

/// Dictionary backed by the built-in element table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDictionary;

impl StandardDictionary {
    pub fn new() -> Self {
        StandardDictionary
    }

    /// All known elements, in table order.
    pub fn elements(&self) -> &'static [IeInfo] {
        STANDARD_ELEMENTS
    }
}

impl IeDictionary for StandardDictionary {
    fn lookup(&self, id: InformationElementId) -> Option<&IeInfo> {
        STANDARD_ELEMENTS.iter().find(|info| info.id == id)
    }

    fn lookup_name(&self, name: &str) -> Option<&IeInfo> {
        let name = name.trim();
        STANDARD_ELEMENTS
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_by_id() {
        let dict = StandardDictionary::new();
        let info = dict.lookup(InformationElementId::iana(8)).unwrap();
        assert_eq!(info.name, "sourceIPv4Address");
        assert_eq!(info.length, FieldLength::Fixed(4));
    }

    #[test]
    fn test_lookup_reverse_scoped() {
        let dict = StandardDictionary::new();
        let info = dict
            .lookup(InformationElementId::new(1, REVERSE_PEN))
            .unwrap();
        assert_eq!(info.name, "revOctetDeltaCount");
    }

    #[test]
    fn test_lookup_name_case_insensitive() {
        let dict = StandardDictionary::new();
        let info = dict.lookup_name("DESTINATIONIPV4ADDRESS").unwrap();
        assert_eq!(info.id, InformationElementId::iana(12));
    }

    #[test]
    fn test_variable_length_entries() {
        let dict = StandardDictionary::new();
        let info = dict.lookup_name("frontPayload").unwrap();
        assert!(info.length.is_variable());
    }

    #[test]
    fn test_resolve_name_and_number() {
        let dict = StandardDictionary::new();
        assert_eq!(
            dict.resolve("sourceTransportPort"),
            Some(InformationElementId::iana(7))
        );
        assert_eq!(
            dict.resolve("4242:9"),
            Some(InformationElementId::new(4242, 9))
        );
        assert_eq!(dict.resolve("noSuchElement"), None);
    }

    #[test]
    fn test_display_name_fallback() {
        let dict = StandardDictionary::new();
        assert_eq!(
            dict.display_name(InformationElementId::iana(12)),
            "destinationIPv4Address"
        );
        assert_eq!(dict.display_name(InformationElementId::iana(999)), "999");
    }

    #[test]
    fn test_table_has_unique_ids() {
        let dict = StandardDictionary::new();
        let mut seen = HashSet::new();
        for info in dict.elements() {
            assert!(seen.insert(info.id), "duplicate id {}", info.id);
        }
    }
}
