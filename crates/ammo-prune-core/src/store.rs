//! The query interface the pruner reads records through.

use crate::error::IntegrityError;
use crate::id::FormKey;
use crate::link::FormLink;
use crate::record::{Record, RecordKind};

/// A merged, read-only view over a layered set of records.
///
/// Implementors answer queries against the winning view: for each identity,
/// the definition from the highest-priority layer. Stores are shared between
/// the pruning passes, hence the `Sync` bound.
pub trait RecordStore: Sync {
    /// The winning definition of `form_key`, or `None` if no layer defines it.
    fn resolve_winning(&self, form_key: &FormKey) -> Option<&Record>;

    /// Every winning record of `kind`. Finite, and restartable by calling again.
    fn iterate_winning(&self, kind: RecordKind) -> Box<dyn Iterator<Item = &Record> + '_>;

    fn resolve_reference(&self, link: &FormLink) -> Option<&Record> {
        link.form_key().and_then(|key| self.resolve_winning(key))
    }

    /// An independent copy of `record`, suitable for mutation.
    fn deep_copy(&self, record: &Record) -> Record {
        record.clone()
    }
}

/// Iterate the winning records of `kind`, checking each one against
/// `resolve_winning` so a store that hands out stale definitions is caught.
pub(crate) fn winning<'s, S>(
    store: &'s S,
    kind: RecordKind,
) -> impl Iterator<Item = Result<&'s Record, IntegrityError>> + 's
where
    S: RecordStore + ?Sized,
{
    store.iterate_winning(kind).map(move |record| {
        let form_key = record.form_key();
        match store.resolve_winning(form_key) {
            Some(winner) if std::ptr::eq(winner, record) || winner.same_definition(record) => {
                Ok(record)
            }
            _ => Err(IntegrityError::IdentityMismatch {
                form_key: form_key.clone(),
            }),
        }
    })
}
