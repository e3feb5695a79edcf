use crate::id::{FormKey, ModKey};
use crate::record::{Record, RecordKind};

/// Structural problems in the input that make a run unsound.
///
/// Unresolved links and links to unexpected kinds are ordinary data and never
/// show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("layer '{0}' appears more than once in the load order")]
    DuplicateLayer(ModKey),

    #[error("{form_key} is defined more than once in layer '{layer}'")]
    DuplicateInLayer { layer: ModKey, form_key: FormKey },

    #[error("{form_key} is {expected} in an earlier layer but {found} in '{layer}'")]
    ConflictingKind {
        form_key: FormKey,
        layer: ModKey,
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("store yielded {form_key} as {found} while iterating {expected} records")]
    KindMismatch {
        form_key: FormKey,
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("store yielded a definition of {form_key} that is not its winning override")]
    IdentityMismatch { form_key: FormKey },

    #[error("patch already holds an override for {0}")]
    DuplicateOverride(FormKey),
}

impl IntegrityError {
    pub(crate) fn kind_mismatch(expected: RecordKind, record: &Record) -> Self {
        IntegrityError::KindMismatch {
            form_key: record.form_key().clone(),
            expected,
            found: record.kind(),
        }
    }
}
