//! Shared fixture builders for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Records built
//! here live in `Fallout4.esm` unless a plugin is given, and reference other
//! records by local id.

use crate::id::{FormKey, ModKey};
use crate::link::FormLink;
use crate::load_order::{Layer, LoadOrder, LoadOrderBuilder};
use crate::record::*;

/// Plugin every fixture identity originates from.
pub const BASE_PLUGIN: &str = "Fallout4.esm";

/// Workbench keyword every fixture recipe uses. No record defines it.
pub const WORKBENCH_KEYWORD: u32 = 0x00F0_0001;

// ===========================================================================
// Identities
// ===========================================================================

pub fn fk(local: u32) -> FormKey {
    FormKey::new(local, BASE_PLUGIN)
}

pub fn fk_in(local: u32, plugin: &str) -> FormKey {
    FormKey::new(local, plugin)
}

pub fn link(local: u32) -> FormLink {
    FormLink::new(fk(local))
}

fn opt_link(local: Option<u32>) -> FormLink {
    local.map_or(FormLink::NULL, link)
}

// ===========================================================================
// Records
// ===========================================================================

pub fn weapon_record(local: u32, ammo: Option<u32>) -> Weapon {
    Weapon {
        form_key: fk(local),
        editor_id: Some(format!("Weapon{local:06X}")),
        ammo: opt_link(ammo),
        keywords: Vec::new(),
    }
}

pub fn weapon(local: u32, ammo: Option<u32>) -> Record {
    weapon_record(local, ammo).into()
}

pub fn ammo(local: u32) -> Record {
    Ammunition {
        form_key: fk(local),
        editor_id: Some(format!("Ammo{local:06X}")),
        damage: 10.0,
        projectile: FormLink::NULL,
    }
    .into()
}

/// A weapon modification with a single `Ammo` property pointing at `ammo`.
pub fn omod_ammo(local: u32, ammo: u32) -> Record {
    WeaponModification {
        form_key: fk(local),
        editor_id: Some(format!("Mod{local:06X}")),
        properties: vec![ObjectModProperty {
            property: WeaponProperty::Ammo,
            value: ObjectModValue::FormLink {
                record: link(ammo),
                count: 0,
            },
        }],
    }
    .into()
}

/// A leveled list with one level-1, count-1 entry per reference.
pub fn leveled_record(local: u32, refs: &[u32]) -> LeveledItem {
    LeveledItem {
        form_key: fk(local),
        editor_id: Some(format!("LL{local:06X}")),
        chance_none: 0,
        entries: refs
            .iter()
            .map(|&r| LeveledItemEntry::new(1, 1, link(r)))
            .collect(),
    }
}

pub fn leveled(local: u32, refs: &[u32]) -> Record {
    leveled_record(local, refs).into()
}

pub fn recipe_record(local: u32, creates: u32) -> ConstructibleObject {
    ConstructibleObject {
        form_key: fk(local),
        editor_id: Some(format!("co_{local:06X}")),
        created_object: link(creates),
        created_count: 10,
        workbench_keyword: link(WORKBENCH_KEYWORD),
        components: vec![RecipeComponent {
            item: link(0x000F_0002),
            count: 2,
        }],
    }
}

pub fn recipe(local: u32, creates: u32) -> Record {
    recipe_record(local, creates).into()
}

// ===========================================================================
// Load orders
// ===========================================================================

pub fn layer(plugin: &str, records: Vec<Record>) -> Layer {
    Layer::with_records(ModKey::new(plugin), records)
}

/// A load order holding only `records`, in `Fallout4.esm`.
pub fn single_layer(records: Vec<Record>) -> LoadOrder {
    let mut builder = LoadOrderBuilder::new();
    builder.register_layer(layer(BASE_PLUGIN, records));
    // Fixture identities are distinct by construction.
    match builder.build() {
        Ok(order) => order,
        Err(e) => panic!("fixture load order is invalid: {e}"),
    }
}

/// A synthetic load order of `layers` plugins over a base of `weapons`
/// weapons, twice as many ammunition records, `lists` leveled lists and
/// `recipes` recipes. Every upper layer re-points a slice of the weapons at
/// different ammunition.
pub fn synthetic_load_order(layers: usize, weapons: u32, lists: u32, recipes: u32) -> LoadOrder {
    let weapon_base = 0x10_0000_u32;
    let ammo_base = 0x20_0000_u32;
    let list_base = 0x30_0000_u32;
    let recipe_base = 0x40_0000_u32;
    let ammo_count = (weapons * 2).max(1);

    let mut base = Vec::new();
    for w in 0..weapons {
        base.push(weapon(weapon_base + w, Some(ammo_base + w)));
    }
    for a in 0..ammo_count {
        base.push(ammo(ammo_base + a));
    }
    for l in 0..lists {
        let refs: Vec<u32> = (0..8).map(|i| ammo_base + (l * 7 + i) % ammo_count).collect();
        base.push(leveled(list_base + l, &refs));
    }
    for r in 0..recipes {
        base.push(recipe(recipe_base + r, ammo_base + (r * 3) % ammo_count));
    }

    let mut builder = LoadOrderBuilder::new();
    builder.register_layer(layer(BASE_PLUGIN, base));
    for n in 1..layers {
        let records = (0..weapons)
            .filter(|w| (*w as usize) % layers == n)
            .map(|w| weapon(weapon_base + w, Some(ammo_base + (weapons + w) % ammo_count)))
            .collect();
        builder.register_layer(layer(&format!("Layer{n:02}.esp"), records));
    }
    match builder.build() {
        Ok(order) => order,
        Err(e) => panic!("synthetic load order is invalid: {e}"),
    }
}
