//! Reference resolution: following a [`FormLink`] to its winning record.
//!
//! A link that is null, or that names an identity no layer defines, simply
//! resolves to nothing. That is routine data (a plugin removing content), so
//! nothing here returns an error.

use crate::id::FormKey;
use crate::record::{Ammunition, Record};
use crate::store::RecordStore;

/// A pointer from one record to another record's identity. May be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FormLink(Option<FormKey>);

impl FormLink {
    pub const NULL: FormLink = FormLink(None);

    pub fn new(target: FormKey) -> Self {
        Self(Some(target))
    }

    pub fn form_key(&self) -> Option<&FormKey> {
        self.0.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn set_to_null(&mut self) {
        self.0 = None;
    }

    /// Resolve through the store's winning view.
    pub fn try_resolve<'s, S>(&self, store: &'s S) -> Option<&'s Record>
    where
        S: RecordStore + ?Sized,
    {
        store.resolve_reference(self)
    }

    /// Resolve and keep the result only if the winning record is ammunition.
    pub fn resolve_ammunition<'s, S>(&self, store: &'s S) -> Option<&'s Ammunition>
    where
        S: RecordStore + ?Sized,
    {
        match self.try_resolve(store) {
            Some(Record::Ammunition(ammo)) => Some(ammo),
            _ => None,
        }
    }
}

impl From<FormKey> for FormLink {
    fn from(key: FormKey) -> Self {
        Self::new(key)
    }
}

impl From<Option<FormKey>> for FormLink {
    fn from(key: Option<FormKey>) -> Self {
        Self(key)
    }
}
