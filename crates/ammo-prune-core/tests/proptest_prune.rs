//! Property-based tests for the usage closure and pruning passes.
//!
//! Generates random layered load orders, then checks the results against an
//! oracle built from the uncached layer scan.

use ammo_prune_core::id::FormKey;
use ammo_prune_core::load_order::{LoadOrder, LoadOrderBuilder, resolve_winning};
use ammo_prune_core::patch::Patch;
use ammo_prune_core::pruner::Pruner;
use ammo_prune_core::record::{Record, RecordKind};
use ammo_prune_core::store::RecordStore;
use ammo_prune_core::test_utils::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const AMMO: u32 = 0x10;
const WEAPONS: u32 = 0x100;
const MODS: u32 = 0x200;
const LISTS: u32 = 0x300;
const RECIPES: u32 = 0x400;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
struct LayerSpec {
    weapons: Vec<(u32, Option<u32>)>,
    mods: Vec<(u32, u32)>,
    lists: Vec<(u32, Vec<u32>)>,
    recipes: Vec<(u32, u32)>,
}

/// Map a generated target index onto an identity: 0..8 ammunition,
/// 8..12 dangling, 12..16 weapons.
fn target(t: u32) -> u32 {
    match t {
        0..8 => AMMO + t,
        8..12 => 0xDEAD0 + t,
        _ => WEAPONS + (t - 12),
    }
}

fn arb_layer() -> impl Strategy<Value = LayerSpec> {
    (
        proptest::collection::vec((0..8u32, proptest::option::of(0..16u32)), 0..6),
        proptest::collection::vec((0..4u32, 0..16u32), 0..3),
        proptest::collection::vec((0..4u32, proptest::collection::vec(0..16u32, 0..6)), 0..4),
        proptest::collection::vec((0..4u32, 0..16u32), 0..4),
    )
        .prop_map(|(weapons, mods, lists, recipes)| LayerSpec {
            weapons,
            mods,
            lists,
            recipes,
        })
}

fn build(specs: &[LayerSpec]) -> LoadOrder {
    let mut builder = LoadOrderBuilder::new();

    let mut base: Vec<Record> = (0..8).map(|a| ammo(AMMO + a)).collect();
    // Targets 12..16 point at these; upper layers may override them.
    base.extend((0..4).map(|w| weapon(WEAPONS + w, None)));
    builder.register_layer(layer("Fallout4.esm", base_dedup(base, specs.first())));

    for (n, spec) in specs.iter().enumerate().skip(1) {
        builder.register_layer(layer(&format!("Mod{n:02}.esp"), records_of(spec)));
    }
    builder.build().unwrap()
}

/// Records a generated layer defines, one per identity (last one wins).
fn records_of(spec: &LayerSpec) -> Vec<Record> {
    let mut by_key: BTreeMap<u32, Record> = BTreeMap::new();
    for (w, a) in &spec.weapons {
        by_key.insert(WEAPONS + w, weapon(WEAPONS + w, a.map(target)));
    }
    for (m, a) in &spec.mods {
        by_key.insert(MODS + m, omod_ammo(MODS + m, target(*a)));
    }
    for (l, refs) in &spec.lists {
        let refs: Vec<u32> = refs.iter().map(|&t| target(t)).collect();
        by_key.insert(LISTS + l, leveled(LISTS + l, &refs));
    }
    for (r, a) in &spec.recipes {
        by_key.insert(RECIPES + r, recipe(RECIPES + r, target(*a)));
    }
    by_key.into_values().collect()
}

/// The base layer merged with the first generated layer, which takes precedence.
fn base_dedup(base: Vec<Record>, first: Option<&LayerSpec>) -> Vec<Record> {
    let mut by_key: BTreeMap<FormKey, Record> = base
        .into_iter()
        .map(|r| (r.form_key().clone(), r))
        .collect();
    if let Some(spec) = first {
        for r in records_of(spec) {
            by_key.insert(r.form_key().clone(), r);
        }
    }
    by_key.into_values().collect()
}

fn arb_load_order() -> impl Strategy<Value = LoadOrder> {
    proptest::collection::vec(arb_layer(), 1..5).prop_map(|specs| build(&specs))
}

// ===========================================================================
// Oracle
// ===========================================================================

fn oracle_is_ammo(order: &LoadOrder, local: u32) -> bool {
    matches!(
        resolve_winning(order.layers(), &fk(local)),
        Some(Record::Ammunition(_))
    )
}

fn expected_usage(order: &LoadOrder) -> BTreeSet<FormKey> {
    let mut used = BTreeSet::new();
    let layers = order.layers();
    let candidate = |key: &FormKey, used: &mut BTreeSet<FormKey>| {
        if matches!(resolve_winning(layers, key), Some(Record::Ammunition(_))) {
            used.insert(key.clone());
        }
    };
    for w in 0..8 {
        if let Some(Record::Weapon(weapon)) = resolve_winning(layers, &fk(WEAPONS + w)) {
            if let Some(key) = weapon.ammo.form_key() {
                candidate(key, &mut used);
            }
        }
    }
    for m in 0..4 {
        if let Some(Record::WeaponModification(omod)) = resolve_winning(layers, &fk(MODS + m)) {
            for link in omod.ammo_overrides() {
                if let Some(key) = link.form_key() {
                    candidate(key, &mut used);
                }
            }
        }
    }
    used
}

fn run(order: &LoadOrder) -> (BTreeSet<FormKey>, Patch) {
    let outcome = Pruner::new().run(order).unwrap();
    (outcome.usage.iter().cloned().collect(), outcome.patch)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The usage set is exactly what the two closure rules allow.
    #[test]
    fn usage_is_sound_and_minimal(order in arb_load_order()) {
        let (usage, _) = run(&order);
        prop_assert_eq!(usage, expected_usage(&order));
    }

    /// The cached winning index agrees with a top-down layer scan.
    #[test]
    fn cached_winner_matches_layer_scan(order in arb_load_order()) {
        for local in (AMMO..AMMO + 8)
            .chain(WEAPONS..WEAPONS + 8)
            .chain(MODS..MODS + 4)
            .chain(LISTS..LISTS + 4)
            .chain(RECIPES..RECIPES + 4)
        {
            let key = fk(local);
            prop_assert_eq!(order.resolve_winning(&key), resolve_winning(order.layers(), &key));
        }
    }

    /// Running twice over the same view gives the same patch.
    #[test]
    fn pruning_is_idempotent(order in arb_load_order()) {
        let (_, first) = run(&order);
        let (_, second) = run(&order);
        prop_assert_eq!(first, second);
    }

    /// Patched lists hold no unused ammunition, and unpatched lists held none.
    #[test]
    fn leveled_lists_lose_exactly_unused_ammo(order in arb_load_order()) {
        let (usage, patch) = run(&order);
        for winner in order.iterate_winning(RecordKind::LeveledItem) {
            let Record::LeveledItem(original) = winner else { unreachable!() };
            let unused = |local: u32| oracle_is_ammo(&order, local) && !usage.contains(&fk(local));
            let refs = |entries: &[ammo_prune_core::record::LeveledItemEntry]| -> Vec<u32> {
                entries
                    .iter()
                    .filter_map(|e| e.reference().and_then(|l| l.form_key()).map(|k| k.local))
                    .collect()
            };
            let expected: Vec<u32> = refs(original.entries.as_slice()).into_iter().filter(|&r| !unused(r)).collect();

            match patch.get(&original.form_key) {
                Some(Record::LeveledItem(pruned)) => {
                    prop_assert!(expected.len() < original.entries.len());
                    prop_assert_eq!(refs(pruned.entries.as_slice()), expected);
                }
                Some(other) => prop_assert!(false, "unexpected override {:?}", other),
                None => prop_assert_eq!(refs(original.entries.as_slice()), expected),
            }
        }
    }

    /// Exactly the recipes crafting unused ammunition are nulled.
    #[test]
    fn recipes_nulled_iff_output_is_unused_ammo(order in arb_load_order()) {
        let (usage, patch) = run(&order);
        for winner in order.iterate_winning(RecordKind::ConstructibleObject) {
            let Record::ConstructibleObject(cobj) = winner else { unreachable!() };
            let crafts_unused = cobj
                .created_object
                .form_key()
                .is_some_and(|k| oracle_is_ammo(&order, k.local) && !usage.contains(k));
            match patch.get(&cobj.form_key) {
                Some(Record::ConstructibleObject(nulled)) => {
                    prop_assert!(crafts_unused);
                    prop_assert!(nulled.created_object.is_null());
                    prop_assert!(nulled.workbench_keyword.is_null());
                }
                Some(other) => prop_assert!(false, "unexpected override {:?}", other),
                None => prop_assert!(!crafts_unused),
            }
        }
    }

    /// Every override targets a winning record of a prunable kind.
    #[test]
    fn overrides_only_for_prunable_winners(order in arb_load_order()) {
        let (_, patch) = run(&order);
        for (key, record) in patch.iter() {
            let winner = order.resolve_winning(key);
            prop_assert!(winner.is_some());
            prop_assert_eq!(winner.map(Record::kind), Some(record.kind()));
            prop_assert!(record.kind().is_prunable());
        }
    }
}
