//! The output patch: overrides for records the pruner changed.

use crate::error::IntegrityError;
use crate::id::{FormKey, ModKey};
use crate::record::{Record, RecordKind};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Write-once collection of override records, keyed and ordered by identity.
///
/// Only records that differ from their winning definition belong here.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    mod_key: ModKey,
    records: BTreeMap<FormKey, Record>,
}

impl Patch {
    /// Create an empty patch that will be saved as plugin `mod_key`.
    pub fn new(mod_key: impl Into<ModKey>) -> Self {
        Self {
            mod_key: mod_key.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }

    /// Add an override. Each identity may be written once per patch.
    pub fn insert(&mut self, record: Record) -> Result<(), IntegrityError> {
        match self.records.entry(record.form_key().clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(slot) => Err(IntegrityError::DuplicateOverride(slot.key().clone())),
        }
    }

    /// Move every override from `other` into `self`.
    pub fn merge(&mut self, other: Patch) -> Result<(), IntegrityError> {
        for (_, record) in other.records {
            self.insert(record)?;
        }
        Ok(())
    }

    pub fn get(&self, form_key: &FormKey) -> Option<&Record> {
        self.records.get(form_key)
    }

    pub fn contains(&self, form_key: &FormKey) -> bool {
        self.records.contains_key(form_key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FormKey, &Record)> {
        self.records.iter()
    }

    pub fn records_of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records.values().filter(move |r| r.kind() == kind)
    }
}

impl IntoIterator for Patch {
    type Item = (FormKey, Record);
    type IntoIter = std::collections::btree_map::IntoIter<FormKey, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
