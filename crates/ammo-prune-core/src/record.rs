//! Record definitions for the five kinds the pruner understands.
//!
//! A [`Record`] is one layer's definition of a logical record. Several layers
//! may hold a `Record` with the same [`FormKey`]; the load order decides which
//! one wins.

use crate::id::FormKey;
use crate::link::FormLink;
use serde::{Deserialize, Serialize};
use std::fmt;

// ===========================================================================
// Kinds
// ===========================================================================

/// Tag identifying which variant of [`Record`] a definition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Weapon,
    WeaponModification,
    LeveledItem,
    ConstructibleObject,
    Ammunition,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Weapon,
        RecordKind::WeaponModification,
        RecordKind::LeveledItem,
        RecordKind::ConstructibleObject,
        RecordKind::Ammunition,
    ];

    /// Four-letter signature used by the game's plugin format.
    pub fn signature(self) -> &'static str {
        match self {
            RecordKind::Weapon => "WEAP",
            RecordKind::WeaponModification => "OMOD",
            RecordKind::LeveledItem => "LVLI",
            RecordKind::ConstructibleObject => "COBJ",
            RecordKind::Ammunition => "AMMO",
        }
    }

    /// Whether the pruner may emit overrides for this kind.
    pub fn is_prunable(self) -> bool {
        matches!(
            self,
            RecordKind::LeveledItem | RecordKind::ConstructibleObject
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature())
    }
}

// ===========================================================================
// Record
// ===========================================================================

/// One layer's definition of a logical record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Weapon(Weapon),
    WeaponModification(WeaponModification),
    LeveledItem(LeveledItem),
    ConstructibleObject(ConstructibleObject),
    Ammunition(Ammunition),
}

impl Record {
    pub fn form_key(&self) -> &FormKey {
        match self {
            Record::Weapon(r) => &r.form_key,
            Record::WeaponModification(r) => &r.form_key,
            Record::LeveledItem(r) => &r.form_key,
            Record::ConstructibleObject(r) => &r.form_key,
            Record::Ammunition(r) => &r.form_key,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Weapon(_) => RecordKind::Weapon,
            Record::WeaponModification(_) => RecordKind::WeaponModification,
            Record::LeveledItem(_) => RecordKind::LeveledItem,
            Record::ConstructibleObject(_) => RecordKind::ConstructibleObject,
            Record::Ammunition(_) => RecordKind::Ammunition,
        }
    }

    pub fn editor_id(&self) -> Option<&str> {
        let id = match self {
            Record::Weapon(r) => &r.editor_id,
            Record::WeaponModification(r) => &r.editor_id,
            Record::LeveledItem(r) => &r.editor_id,
            Record::ConstructibleObject(r) => &r.editor_id,
            Record::Ammunition(r) => &r.editor_id,
        };
        id.as_deref()
    }

    /// Structural equality that compares floats by bit pattern, so a
    /// definition holding `NaN` still matches an identical copy of itself.
    pub fn same_definition(&self, other: &Record) -> bool {
        match (self, other) {
            (Record::Weapon(a), Record::Weapon(b)) => a == b,
            (Record::WeaponModification(a), Record::WeaponModification(b)) => {
                a.form_key == b.form_key
                    && a.editor_id == b.editor_id
                    && a.properties.len() == b.properties.len()
                    && a.properties.iter().zip(&b.properties).all(|(x, y)| {
                        x.property == y.property && x.value.same_value(&y.value)
                    })
            }
            (Record::LeveledItem(a), Record::LeveledItem(b)) => a == b,
            (Record::ConstructibleObject(a), Record::ConstructibleObject(b)) => a == b,
            (Record::Ammunition(a), Record::Ammunition(b)) => {
                a.form_key == b.form_key
                    && a.editor_id == b.editor_id
                    && a.damage.to_bits() == b.damage.to_bits()
                    && a.projectile == b.projectile
            }
            _ => false,
        }
    }
}

impl From<Weapon> for Record {
    fn from(r: Weapon) -> Self {
        Record::Weapon(r)
    }
}

impl From<WeaponModification> for Record {
    fn from(r: WeaponModification) -> Self {
        Record::WeaponModification(r)
    }
}

impl From<LeveledItem> for Record {
    fn from(r: LeveledItem) -> Self {
        Record::LeveledItem(r)
    }
}

impl From<ConstructibleObject> for Record {
    fn from(r: ConstructibleObject) -> Self {
        Record::ConstructibleObject(r)
    }
}

impl From<Ammunition> for Record {
    fn from(r: Ammunition) -> Self {
        Record::Ammunition(r)
    }
}

// ===========================================================================
// Weapons
// ===========================================================================

/// A weapon. Its `ammo` link is what makes ammunition "used".
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub ammo: FormLink,
    pub keywords: Vec<FormLink>,
}

/// Weapon properties an object modification can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponProperty {
    Ammo,
    AmmoCapacity,
    AttackDamage,
    ImpactDataSet,
    Keywords,
    NpcAmmoList,
    ReloadSpeed,
}

/// The value half of an object modification property.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectModValue {
    FormLink { record: FormLink, count: i32 },
    Int(i32),
    Float(f32),
    Bool(bool),
}

impl ObjectModValue {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// A single property change carried by a weapon modification.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectModProperty {
    pub property: WeaponProperty,
    pub value: ObjectModValue,
}

/// A weapon modification (attachment), carrying a list of property changes.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponModification {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub properties: Vec<ObjectModProperty>,
}

impl WeaponModification {
    /// Links carried by `Ammo` properties with a form-link value. No other
    /// property kind is considered an ammunition override.
    pub fn ammo_overrides(&self) -> impl Iterator<Item = &FormLink> {
        self.properties.iter().filter_map(|p| match (&p.property, &p.value) {
            (WeaponProperty::Ammo, ObjectModValue::FormLink { record, .. }) => Some(record),
            _ => None,
        })
    }
}

// ===========================================================================
// Leveled items
// ===========================================================================

/// The item data of a leveled-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledItemEntryData {
    pub level: u16,
    pub count: u16,
    pub reference: FormLink,
}

/// One entry of a leveled list. Entries without data reference nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledItemEntry {
    pub data: Option<LeveledItemEntryData>,
}

impl LeveledItemEntry {
    pub fn new(level: u16, count: u16, reference: FormLink) -> Self {
        Self {
            data: Some(LeveledItemEntryData {
                level,
                count,
                reference,
            }),
        }
    }

    pub fn reference(&self) -> Option<&FormLink> {
        self.data.as_ref().map(|d| &d.reference)
    }
}

/// A loot table: a leveled list of item entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledItem {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub chance_none: u8,
    pub entries: Vec<LeveledItemEntry>,
}

// ===========================================================================
// Constructible objects
// ===========================================================================

/// One input component of a crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeComponent {
    pub item: FormLink,
    pub count: u32,
}

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructibleObject {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub created_object: FormLink,
    pub created_count: u16,
    pub workbench_keyword: FormLink,
    pub components: Vec<RecipeComponent>,
}

// ===========================================================================
// Ammunition
// ===========================================================================

/// An ammunition record.
#[derive(Debug, Clone, PartialEq)]
pub struct Ammunition {
    pub form_key: FormKey,
    pub editor_id: Option<String>,
    pub damage: f32,
    pub projectile: FormLink,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(weapon(1, None).kind(), RecordKind::Weapon);
        assert_eq!(ammo(2).kind(), RecordKind::Ammunition);
        assert_eq!(leveled(3, &[]).kind(), RecordKind::LeveledItem);
        assert_eq!(recipe(4, 2).kind(), RecordKind::ConstructibleObject);
        assert_eq!(omod_ammo(5, 2).kind(), RecordKind::WeaponModification);
    }

    #[test]
    fn form_key_and_editor_id() {
        let record = ammo(0x1F);
        assert_eq!(record.form_key(), &fk(0x1F));
        assert_eq!(record.editor_id(), Some("Ammo00001F"));
    }

    #[test]
    fn only_loot_and_recipes_are_prunable() {
        let prunable: Vec<_> = RecordKind::ALL
            .into_iter()
            .filter(|k| k.is_prunable())
            .collect();
        assert_eq!(
            prunable,
            vec![RecordKind::LeveledItem, RecordKind::ConstructibleObject]
        );
    }

    #[test]
    fn signatures_are_distinct() {
        let mut sigs: Vec<_> = RecordKind::ALL.iter().map(|k| k.signature()).collect();
        sigs.sort();
        sigs.dedup();
        assert_eq!(sigs.len(), RecordKind::ALL.len());
    }

    #[test]
    fn ammo_overrides_ignore_other_properties() {
        let omod = WeaponModification {
            form_key: fk(0x40),
            editor_id: None,
            properties: vec![
                ObjectModProperty {
                    property: WeaponProperty::NpcAmmoList,
                    value: ObjectModValue::FormLink {
                        record: FormLink::new(fk(0x10)),
                        count: 0,
                    },
                },
                ObjectModProperty {
                    property: WeaponProperty::Ammo,
                    value: ObjectModValue::Int(3),
                },
                ObjectModProperty {
                    property: WeaponProperty::Ammo,
                    value: ObjectModValue::FormLink {
                        record: FormLink::new(fk(0x11)),
                        count: 0,
                    },
                },
            ],
        };
        let links: Vec<_> = omod.ammo_overrides().collect();
        assert_eq!(links, vec![&FormLink::new(fk(0x11))]);
    }

    #[test]
    fn entry_without_data_has_no_reference() {
        let entry = LeveledItemEntry { data: None };
        assert!(entry.reference().is_none());
        let entry = LeveledItemEntry::new(1, 1, FormLink::new(fk(2)));
        assert_eq!(entry.reference(), Some(&FormLink::new(fk(2))));
    }

    fn nan_mod() -> Record {
        WeaponModification {
            form_key: fk(0x200),
            editor_id: None,
            properties: vec![ObjectModProperty {
                property: WeaponProperty::ReloadSpeed,
                value: ObjectModValue::Float(f32::NAN),
            }],
        }
        .into()
    }

    #[test]
    fn same_definition_matches_nan_copies() {
        let original = nan_mod();
        let copy = original.clone();
        assert_ne!(original, copy);
        assert!(original.same_definition(&copy));

        let mut nan_ammo = ammo(0x10);
        if let Record::Ammunition(a) = &mut nan_ammo {
            a.damage = f32::NAN;
        }
        assert!(nan_ammo.same_definition(&nan_ammo.clone()));
    }

    #[test]
    fn same_definition_detects_differences() {
        assert!(!weapon(1, Some(2)).same_definition(&weapon(1, Some(3))));
        assert!(!ammo(1).same_definition(&weapon(1, None)));
        assert!(!nan_mod().same_definition(&omod_ammo(0x200, 0x10)));

        let mut heavier = ammo(0x10);
        if let Record::Ammunition(a) = &mut heavier {
            a.damage = 99.0;
        }
        assert!(!ammo(0x10).same_definition(&heavier));
    }
}
