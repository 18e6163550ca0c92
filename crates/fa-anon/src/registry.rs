//! Field registry: which chains run on which information elements.
//!
//! Bindings are added once at configuration time. At runtime
//! [`FieldRegistry::apply_field`] looks up the field's binding and runs its
//! chains in the order they were added. Fields without a binding are left
//! untouched.

use crate::chain::Chain;
use crate::error::{AnonError, Result};
use crate::primitive::IPV4_LEN;
use crate::subnet::SubnetMapSpec;
use fa_common::{FieldLength, IeDictionary, InformationElementId, StandardDictionary};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Chains configured for one information element.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    pub id: InformationElementId,
    /// Display name from the dictionary, or the numeric id.
    pub name: String,
    /// Declared field length; the first declaration wins.
    pub length: FieldLength,
    pub chains: Vec<Chain>,
}

impl FieldBinding {
    /// Run every chain over the field at the start of `buf`.
    ///
    /// A fixed declared length selects that many leading bytes (clamped to
    /// the buffer); a variable one uses the whole buffer. Returns whether
    /// any chain changed the field.
    pub fn apply(&self, buf: &mut [u8]) -> bool {
        if let FieldLength::Fixed(declared) = self.length {
            if usize::from(declared) > buf.len() {
                warn!(
                    field = %self.name,
                    declared,
                    available = buf.len(),
                    "field shorter than its declared length; anonymizing available bytes"
                );
            }
        }

        let len = self.length.effective(buf.len());
        let field = &mut buf[..len];
        let mut anonymized = false;
        for chain in &self.chains {
            anonymized |= chain.run(field).anonymized;
        }
        anonymized
    }
}

/// Location of one field inside a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateField {
    pub id: InformationElementId,
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// Byte length of the field in this record.
    pub length: usize,
}

impl TemplateField {
    pub fn new(id: InformationElementId, offset: usize, length: usize) -> Self {
        Self { id, offset, length }
    }
}

/// Summary of anonymizing one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Template fields that had a binding and fit inside the record.
    pub fields_processed: usize,
    /// Fields with at least one changed byte.
    pub fields_anonymized: usize,
    /// Template fields that extended past the end of the record.
    pub fields_skipped: usize,
}

impl RecordOutcome {
    pub fn anonymized(&self) -> bool {
        self.fields_anonymized > 0
    }
}

/// Registry of field bindings keyed by information element.
pub struct FieldRegistry {
    bindings: HashMap<InformationElementId, FieldBinding>,
    /// Binding ids in the order they were first added.
    order: Vec<InformationElementId>,
    dictionary: Box<dyn IeDictionary>,
}

impl FieldRegistry {
    /// Empty registry backed by the built-in element dictionary.
    pub fn new() -> Self {
        Self::with_dictionary(Box::new(StandardDictionary::new()))
    }

    /// Empty registry backed by a custom dictionary.
    pub fn with_dictionary(dictionary: Box<dyn IeDictionary>) -> Self {
        Self {
            bindings: HashMap::new(),
            order: Vec::new(),
            dictionary,
        }
    }

    pub fn dictionary(&self) -> &dyn IeDictionary {
        self.dictionary.as_ref()
    }

    /// Add a chain for a field.
    ///
    /// With `length` of `None` the length comes from the dictionary. The
    /// chain is appended to an existing binding for the same field, which
    /// keeps its original length.
    pub fn add_binding(
        &mut self,
        id: InformationElementId,
        length: Option<FieldLength>,
        methods: &str,
        param: &str,
        mappings: &[SubnetMapSpec],
    ) -> Result<()> {
        let name = self.dictionary.display_name(id);
        let declared = match length {
            Some(length) => length,
            None => self
                .dictionary
                .lookup(id)
                .map(|info| info.length)
                .ok_or_else(|| AnonError::UnknownField(name.clone()))?,
        };

        let effective = match self.bindings.get(&id) {
            Some(existing) if existing.length != declared => {
                warn!(
                    field = %name,
                    existing = %existing.length,
                    requested = %declared,
                    "field already bound with a different length; keeping the first"
                );
                existing.length
            }
            Some(existing) => existing.length,
            None => declared,
        };

        let chain = Chain::build(methods, param, mappings)?;
        if chain.requires_ipv4() && !fits_ipv4(effective) {
            return Err(AnonError::InvalidFieldLength {
                method: chain.to_string(),
                field: name,
                length: effective.to_string(),
            });
        }

        debug!(
            field = %name,
            id = %id,
            length = %effective,
            chain = %chain,
            "added anonymization binding"
        );

        match self.bindings.get_mut(&id) {
            Some(binding) => binding.chains.push(chain),
            None => {
                self.order.push(id);
                self.bindings.insert(
                    id,
                    FieldBinding {
                        id,
                        name,
                        length: effective,
                        chains: vec![chain],
                    },
                );
            }
        }
        Ok(())
    }

    /// Anonymize one field in place.
    ///
    /// Returns whether any byte changed; unbound fields return `false`.
    pub fn apply_field(&self, id: InformationElementId, buf: &mut [u8]) -> bool {
        match self.bindings.get(&id) {
            Some(binding) => binding.apply(buf),
            None => false,
        }
    }

    /// Anonymize every bound field of a record in place.
    pub fn apply_record(&self, record: &mut [u8], fields: &[TemplateField]) -> RecordOutcome {
        let mut outcome = RecordOutcome::default();

        for field in fields {
            let Some(binding) = self.bindings.get(&field.id) else {
                continue;
            };
            let Some(range) = field
                .offset
                .checked_add(field.length)
                .filter(|&end| end <= record.len())
                .map(|end| field.offset..end)
            else {
                debug!(
                    field = %binding.name,
                    offset = field.offset,
                    length = field.length,
                    record_len = record.len(),
                    "field extends past end of record; skipped"
                );
                outcome.fields_skipped += 1;
                continue;
            };

            outcome.fields_processed += 1;
            if binding.apply(&mut record[range]) {
                outcome.fields_anonymized += 1;
            }
        }

        outcome
    }

    /// Anonymize a copy of a record, leaving the input untouched.
    pub fn anonymize_copy(
        &self,
        record: &[u8],
        fields: &[TemplateField],
    ) -> (Vec<u8>, RecordOutcome) {
        let mut copy = record.to_vec();
        let outcome = self.apply_record(&mut copy, fields);
        (copy, outcome)
    }

    pub fn binding(&self, id: InformationElementId) -> Option<&FieldBinding> {
        self.bindings.get(&id)
    }

    /// Bindings in the order their fields were first configured.
    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding> {
        self.order.iter().filter_map(|id| self.bindings.get(id))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("bindings", &self.iter().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// IPv4 address, optionally followed by a mask octet.
fn fits_ipv4(length: FieldLength) -> bool {
    matches!(length, FieldLength::Fixed(n) if usize::from(n) == IPV4_LEN || usize::from(n) == IPV4_LEN + 1)
}
