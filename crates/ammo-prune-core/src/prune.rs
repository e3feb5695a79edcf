//! The two pruning passes.
//!
//! Both read the winning view and a finished [`AmmoUsage`], and write copies
//! into a [`Patch`]. A winning record is never modified; it is copied only
//! after the pass has decided the copy will differ.

use crate::error::IntegrityError;
use crate::patch::Patch;
use crate::record::{ConstructibleObject, LeveledItem, LeveledItemEntry, Record, RecordKind};
use crate::store::{RecordStore, winning};
use crate::usage::AmmoUsage;
use tracing::{debug, trace};

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Winning records inspected.
    pub scanned: usize,
    /// Overrides written to the patch.
    pub changed: usize,
    /// Leveled-list entries dropped (always zero for recipes).
    pub entries_removed: usize,
}

// ===========================================================================
// Leveled items
// ===========================================================================

/// Whether `entry` stays in its leveled list.
///
/// Entries pointing at unused ammunition go. Entries without data stay.
/// Entries whose reference is null or dangling stay unless
/// `drop_unresolved` is set.
pub fn entry_survives<S>(
    store: &S,
    usage: &AmmoUsage,
    entry: &LeveledItemEntry,
    drop_unresolved: bool,
) -> bool
where
    S: RecordStore + ?Sized,
{
    let Some(reference) = entry.reference() else {
        return true;
    };
    match reference.try_resolve(store) {
        Some(Record::Ammunition(ammo)) => usage.contains(&ammo.form_key),
        Some(_) => true,
        None => !drop_unresolved,
    }
}

/// Whether at least one entry of `item` would be removed.
pub fn has_prunable_entries<S>(
    store: &S,
    usage: &AmmoUsage,
    item: &LeveledItem,
    drop_unresolved: bool,
) -> bool
where
    S: RecordStore + ?Sized,
{
    item.entries
        .iter()
        .any(|entry| !entry_survives(store, usage, entry, drop_unresolved))
}

/// Drop every entry that does not survive and return how many went.
///
/// Kept entries retain their relative order.
pub fn retain_surviving<S>(
    store: &S,
    usage: &AmmoUsage,
    entries: &mut Vec<LeveledItemEntry>,
    drop_unresolved: bool,
) -> usize
where
    S: RecordStore + ?Sized,
{
    let before = entries.len();
    entries.retain(|entry| entry_survives(store, usage, entry, drop_unresolved));
    before - entries.len()
}

/// Strip unused ammunition from every winning leveled list.
pub fn prune_leveled_items<S>(
    store: &S,
    usage: &AmmoUsage,
    drop_unresolved: bool,
    patch: &mut Patch,
) -> Result<PassStats, IntegrityError>
where
    S: RecordStore + ?Sized,
{
    let mut stats = PassStats::default();

    for record in winning(store, RecordKind::LeveledItem) {
        let record = record?;
        let Record::LeveledItem(item) = record else {
            return Err(IntegrityError::kind_mismatch(RecordKind::LeveledItem, record));
        };
        stats.scanned += 1;

        if !has_prunable_entries(store, usage, item, drop_unresolved) {
            continue;
        }

        let mut copy = store.deep_copy(record);
        let removed = match &mut copy {
            Record::LeveledItem(copy) => {
                retain_surviving(store, usage, &mut copy.entries, drop_unresolved)
            }
            other => return Err(IntegrityError::kind_mismatch(RecordKind::LeveledItem, other)),
        };
        trace!(lvli = %item.form_key, removed, "pruned leveled list");
        patch.insert(copy)?;

        stats.changed += 1;
        stats.entries_removed += removed;
    }

    debug!(
        scanned = stats.scanned,
        changed = stats.changed,
        entries_removed = stats.entries_removed,
        "leveled item pass done"
    );
    Ok(stats)
}

// ===========================================================================
// Constructible objects
// ===========================================================================

/// Whether `recipe` crafts ammunition that nothing uses. Recipes whose
/// created object is dangling or not ammunition are left alone.
pub fn crafts_unused_ammo<S>(store: &S, usage: &AmmoUsage, recipe: &ConstructibleObject) -> bool
where
    S: RecordStore + ?Sized,
{
    recipe
        .created_object
        .resolve_ammunition(store)
        .is_some_and(|ammo| !usage.contains(&ammo.form_key))
}

/// Null the created object and workbench keyword of every winning recipe
/// that crafts unused ammunition.
pub fn prune_recipes<S>(
    store: &S,
    usage: &AmmoUsage,
    patch: &mut Patch,
) -> Result<PassStats, IntegrityError>
where
    S: RecordStore + ?Sized,
{
    let mut stats = PassStats::default();

    for record in winning(store, RecordKind::ConstructibleObject) {
        let record = record?;
        let Record::ConstructibleObject(recipe) = record else {
            return Err(IntegrityError::kind_mismatch(
                RecordKind::ConstructibleObject,
                record,
            ));
        };
        stats.scanned += 1;

        if !crafts_unused_ammo(store, usage, recipe) {
            continue;
        }

        let mut copy = store.deep_copy(record);
        match &mut copy {
            Record::ConstructibleObject(copy) => {
                copy.created_object.set_to_null();
                copy.workbench_keyword.set_to_null();
            }
            other => {
                return Err(IntegrityError::kind_mismatch(
                    RecordKind::ConstructibleObject,
                    other,
                ));
            }
        }
        trace!(cobj = %recipe.form_key, "nulled recipe");
        patch.insert(copy)?;
        stats.changed += 1;
    }

    debug!(
        scanned = stats.scanned,
        changed = stats.changed,
        "recipe pass done"
    );
    Ok(stats)
}
