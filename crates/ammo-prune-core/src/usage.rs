//! Ammunition usage closure.
//!
//! An ammunition record is *used* when a winning weapon's `ammo` link, or an
//! `Ammo` property of a winning weapon modification, resolves to it. Nothing
//! else (loot tables, recipes, weapon keywords, other mod properties) adds to
//! the set.

use crate::error::IntegrityError;
use crate::id::FormKey;
use crate::link::FormLink;
use crate::record::{Record, RecordKind};
use crate::store::{RecordStore, winning};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// The finished set of used ammunition identities.
///
/// Only obtainable from [`AmmoUsage::collect`] once both scans are complete,
/// and has no mutating methods. Each member also remembers which winning
/// records referenced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmoUsage {
    used: BTreeMap<FormKey, Vec<FormKey>>,
}

impl AmmoUsage {
    /// Scan every winning weapon and weapon modification in `store`.
    pub fn collect<S>(store: &S) -> Result<Self, IntegrityError>
    where
        S: RecordStore + ?Sized,
    {
        Self::collect_with(store, &[])
    }

    /// Like [`collect`](Self::collect), but also treats every identity in
    /// `keep` as used, provided it resolves to ammunition.
    pub fn collect_with<S>(store: &S, keep: &[FormKey]) -> Result<Self, IntegrityError>
    where
        S: RecordStore + ?Sized,
    {
        let mut used: BTreeMap<FormKey, Vec<FormKey>> = BTreeMap::new();

        for key in keep {
            if let Some(ammo) = FormLink::new(key.clone()).resolve_ammunition(store) {
                used.entry(ammo.form_key.clone()).or_default();
            }
        }

        let mut weapons = 0usize;
        for record in winning(store, RecordKind::Weapon) {
            match record? {
                Record::Weapon(weapon) => {
                    weapons += 1;
                    if let Some(ammo) = weapon.ammo.resolve_ammunition(store) {
                        trace!(weapon = %weapon.form_key, ammo = %ammo.form_key, "weapon uses ammo");
                        mark(&mut used, &ammo.form_key, &weapon.form_key);
                    }
                }
                other => return Err(IntegrityError::kind_mismatch(RecordKind::Weapon, other)),
            }
        }

        let mut mods = 0usize;
        for record in winning(store, RecordKind::WeaponModification) {
            match record? {
                Record::WeaponModification(omod) => {
                    mods += 1;
                    for link in omod.ammo_overrides() {
                        if let Some(ammo) = link.resolve_ammunition(store) {
                            trace!(omod = %omod.form_key, ammo = %ammo.form_key, "mod swaps ammo");
                            mark(&mut used, &ammo.form_key, &omod.form_key);
                        }
                    }
                }
                other => {
                    return Err(IntegrityError::kind_mismatch(
                        RecordKind::WeaponModification,
                        other,
                    ));
                }
            }
        }

        debug!(weapons, mods, used = used.len(), "ammunition usage collected");
        Ok(Self { used })
    }

    pub fn contains(&self, form_key: &FormKey) -> bool {
        self.used.contains_key(form_key)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Used ammunition identities in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &FormKey> {
        self.used.keys()
    }

    /// Winning weapons and mods that referenced `form_key`. Empty for
    /// ammunition that is only used because it was kept explicitly.
    pub fn users(&self, form_key: &FormKey) -> &[FormKey] {
        self.used.get(form_key).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn mark(used: &mut BTreeMap<FormKey, Vec<FormKey>>, ammo: &FormKey, user: &FormKey) {
    let users = used.entry(ammo.clone()).or_default();
    if !users.contains(user) {
        users.push(user.clone());
    }
}
