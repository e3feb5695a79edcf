//! Layers, the load order, and override resolution.
//!
//! Layers are registered lowest priority first. [`LoadOrderBuilder::build`]
//! validates the stack and computes the winning index once; the resulting
//! [`LoadOrder`] is immutable and answers every [`RecordStore`] query from that
//! index.

use crate::error::IntegrityError;
use crate::id::{FormKey, ModKey};
use crate::record::{Record, RecordKind};
use crate::store::RecordStore;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::debug;

// ===========================================================================
// Layer
// ===========================================================================

/// One data source (plugin): the records it defines or overrides.
#[derive(Debug, Clone)]
pub struct Layer {
    mod_key: ModKey,
    records: Vec<Record>,
}

impl Layer {
    pub fn new(mod_key: impl Into<ModKey>) -> Self {
        Self {
            mod_key: mod_key.into(),
            records: Vec::new(),
        }
    }

    pub fn with_records(mod_key: impl Into<ModKey>, records: Vec<Record>) -> Self {
        Self {
            mod_key: mod_key.into(),
            records,
        }
    }

    pub fn push(&mut self, record: impl Into<Record>) {
        self.records.push(record.into());
    }

    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, form_key: &FormKey) -> Option<&Record> {
        self.records.iter().find(|r| r.form_key() == form_key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scan `layers` from the highest priority down and return the first
/// definition of `form_key`.
///
/// This is the uncached form of [`LoadOrder::resolve_winning`].
pub fn resolve_winning<'a>(layers: &'a [Layer], form_key: &FormKey) -> Option<&'a Record> {
    layers.iter().rev().find_map(|layer| layer.get(form_key))
}

// ===========================================================================
// Builder
// ===========================================================================

/// Location of a record inside the load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    layer: usize,
    record: usize,
}

/// Builder for an immutable [`LoadOrder`].
#[derive(Debug, Default)]
pub struct LoadOrderBuilder {
    layers: Vec<Layer>,
}

impl LoadOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer on top of those already registered. Returns its index.
    pub fn register_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Validate the stack and freeze it.
    ///
    /// Fails if a plugin appears twice, if a layer defines one identity twice,
    /// or if two layers disagree about an identity's kind.
    pub fn build(self) -> Result<LoadOrder, IntegrityError> {
        let mut seen_layers = HashSet::new();
        let mut definitions: HashMap<FormKey, Vec<Slot>> = HashMap::new();
        let mut first_seen: Vec<FormKey> = Vec::new();

        for (layer_idx, layer) in self.layers.iter().enumerate() {
            if !seen_layers.insert(layer.mod_key.clone()) {
                return Err(IntegrityError::DuplicateLayer(layer.mod_key.clone()));
            }

            for (record_idx, record) in layer.records.iter().enumerate() {
                let form_key = record.form_key();
                let slot = Slot {
                    layer: layer_idx,
                    record: record_idx,
                };

                let slots = match definitions.entry(form_key.clone()) {
                    Entry::Vacant(vacant) => {
                        vacant.insert(vec![slot]);
                        first_seen.push(form_key.clone());
                        continue;
                    }
                    Entry::Occupied(occupied) => occupied.into_mut(),
                };

                if slots.iter().any(|s| s.layer == layer_idx) {
                    return Err(IntegrityError::DuplicateInLayer {
                        layer: layer.mod_key.clone(),
                        form_key: form_key.clone(),
                    });
                }
                let expected = self.layers[slots[0].layer].records[slots[0].record].kind();
                if expected != record.kind() {
                    return Err(IntegrityError::ConflictingKind {
                        form_key: form_key.clone(),
                        layer: layer.mod_key.clone(),
                        expected,
                        found: record.kind(),
                    });
                }
                slots.push(slot);
            }
        }

        let mut winners_by_kind: HashMap<RecordKind, Vec<Slot>> = HashMap::new();
        for form_key in &first_seen {
            // Slots are pushed in layer order, so the last one wins.
            if let Some(&winner) = definitions.get(form_key).and_then(|s| s.last()) {
                let kind = self.layers[winner.layer].records[winner.record].kind();
                winners_by_kind.entry(kind).or_default().push(winner);
            }
        }

        debug!(
            layers = self.layers.len(),
            identities = first_seen.len(),
            "load order built"
        );

        Ok(LoadOrder {
            layers: self.layers,
            definitions,
            winners_by_kind,
        })
    }
}

// ===========================================================================
// LoadOrder
// ===========================================================================

/// Immutable, validated layer stack with a precomputed winning view.
#[derive(Debug)]
pub struct LoadOrder {
    layers: Vec<Layer>,
    definitions: HashMap<FormKey, Vec<Slot>>,
    winners_by_kind: HashMap<RecordKind, Vec<Slot>>,
}

impl LoadOrder {
    fn at(&self, slot: Slot) -> &Record {
        &self.layers[slot.layer].records[slot.record]
    }

    /// Layers in priority order, lowest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of distinct identities defined by any layer.
    pub fn identity_count(&self) -> usize {
        self.definitions.len()
    }

    /// Number of winning records of `kind`.
    pub fn winning_count(&self, kind: RecordKind) -> usize {
        self.winners_by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Every layer's definition of `form_key`, lowest priority first.
    pub fn definitions(&self, form_key: &FormKey) -> impl Iterator<Item = (&ModKey, &Record)> {
        self.definitions
            .get(form_key)
            .into_iter()
            .flatten()
            .map(|&slot| (&self.layers[slot.layer].mod_key, self.at(slot)))
    }

    /// The plugin whose definition of `form_key` wins.
    pub fn winning_layer(&self, form_key: &FormKey) -> Option<&ModKey> {
        let slot = self.definitions.get(form_key)?.last()?;
        Some(&self.layers[slot.layer].mod_key)
    }
}

impl RecordStore for LoadOrder {
    fn resolve_winning(&self, form_key: &FormKey) -> Option<&Record> {
        let slot = self.definitions.get(form_key)?.last()?;
        Some(self.at(*slot))
    }

    fn iterate_winning(&self, kind: RecordKind) -> Box<dyn Iterator<Item = &Record> + '_> {
        match self.winners_by_kind.get(&kind) {
            Some(slots) => Box::new(slots.iter().map(|&slot| self.at(slot))),
            None => Box::new(std::iter::empty()),
        }
    }
}
