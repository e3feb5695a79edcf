//! Serde data file structs for layer and patch files.
//!
//! A layer file holds one plugin's records. Identities and links are written
//! in text form (`"000801:Fallout4.esm"`); a missing or `None` link is null.
//! The same structure is used for written patches, so a patch can be fed back
//! in as the top layer of a later run.

use ammo_prune_core::record::WeaponProperty;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Layers
// ===========================================================================

/// One plugin's worth of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    pub plugin: String,
    #[serde(default)]
    pub records: Vec<RecordData>,
}

/// A record definition in a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordData {
    Weapon {
        form_key: String,
        #[serde(default)]
        editor_id: Option<String>,
        #[serde(default)]
        ammo: Option<String>,
        #[serde(default)]
        keywords: Vec<String>,
    },
    WeaponModification {
        form_key: String,
        #[serde(default)]
        editor_id: Option<String>,
        #[serde(default)]
        properties: Vec<PropertyData>,
    },
    LeveledItem {
        form_key: String,
        #[serde(default)]
        editor_id: Option<String>,
        #[serde(default)]
        chance_none: u8,
        #[serde(default)]
        entries: Vec<LeveledEntryData>,
    },
    ConstructibleObject {
        form_key: String,
        #[serde(default)]
        editor_id: Option<String>,
        #[serde(default)]
        created_object: Option<String>,
        #[serde(default = "default_one")]
        created_count: u16,
        #[serde(default)]
        workbench_keyword: Option<String>,
        #[serde(default)]
        components: Vec<ComponentData>,
    },
    Ammunition {
        form_key: String,
        #[serde(default)]
        editor_id: Option<String>,
        #[serde(default)]
        damage: f32,
        #[serde(default)]
        projectile: Option<String>,
    },
}

fn default_one() -> u16 {
    1
}

// ===========================================================================
// Record parts
// ===========================================================================

/// A weapon modification property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyData {
    pub property: WeaponProperty,
    pub value: PropertyValueData,
}

/// The value of a weapon modification property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValueData {
    FormLink {
        #[serde(default)]
        record: Option<String>,
        #[serde(default)]
        count: i32,
    },
    Int(i32),
    Float(f32),
    Bool(bool),
}

/// A leveled-list entry: either an item reference or an entry with no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeveledEntryData {
    Item {
        #[serde(default = "default_one")]
        level: u16,
        #[serde(default = "default_one")]
        count: u16,
        #[serde(default)]
        reference: Option<String>,
    },
    Empty,
}

/// A recipe input component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    #[serde(default)]
    pub item: Option<String>,
    pub count: u32,
}

// ===========================================================================
// Load order
// ===========================================================================

/// Wrapper for the load order list in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlLoadOrder {
    pub layers: Vec<String>,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // RON
    // -----------------------------------------------------------------------

    #[test]
    fn weapon_from_ron() {
        let ron = r#"
            Weapon(
                form_key: "000100:Fallout4.esm",
                editor_id: Some("Pipe"),
                ammo: Some("000010:Fallout4.esm"),
            )
        "#;
        let record: RecordData = ron::from_str(ron).unwrap();
        match record {
            RecordData::Weapon {
                form_key,
                ammo,
                keywords,
                ..
            } => {
                assert_eq!(form_key, "000100:Fallout4.esm");
                assert_eq!(ammo.as_deref(), Some("000010:Fallout4.esm"));
                assert!(keywords.is_empty());
            }
            other => panic!("expected Weapon, got {other:?}"),
        }
    }

    #[test]
    fn weapon_without_ammo_from_ron() {
        let record: RecordData = ron::from_str(r#"Weapon(form_key: "000100:Fallout4.esm")"#).unwrap();
        assert!(matches!(record, RecordData::Weapon { ammo: None, .. }));
    }

    #[test]
    fn weapon_mod_from_ron() {
        let ron = r#"
            WeaponModification(
                form_key: "000200:Fallout4.esm",
                properties: [
                    (property: ammo, value: FormLink(record: Some("000011:Fallout4.esm"))),
                    (property: ammo_capacity, value: Int(30)),
                ],
            )
        "#;
        let record: RecordData = ron::from_str(ron).unwrap();
        let RecordData::WeaponModification { properties, .. } = record else {
            panic!("expected WeaponModification");
        };
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].property, WeaponProperty::Ammo);
        assert!(matches!(
            properties[0].value,
            PropertyValueData::FormLink { ref record, count: 0 } if record.as_deref() == Some("000011:Fallout4.esm")
        ));
        assert_eq!(properties[1].value, PropertyValueData::Int(30));
    }

    #[test]
    fn leveled_item_from_ron() {
        let ron = r#"
            LeveledItem(
                form_key: "000300:Fallout4.esm",
                chance_none: 10,
                entries: [
                    Item(reference: Some("000010:Fallout4.esm")),
                    Item(level: 5, count: 20, reference: Some("000011:Fallout4.esm")),
                    Empty,
                ],
            )
        "#;
        let record: RecordData = ron::from_str(ron).unwrap();
        let RecordData::LeveledItem {
            chance_none,
            entries,
            ..
        } = record
        else {
            panic!("expected LeveledItem");
        };
        assert_eq!(chance_none, 10);
        assert_eq!(
            entries[0],
            LeveledEntryData::Item {
                level: 1,
                count: 1,
                reference: Some("000010:Fallout4.esm".to_string()),
            }
        );
        assert!(matches!(entries[1], LeveledEntryData::Item { level: 5, count: 20, .. }));
        assert_eq!(entries[2], LeveledEntryData::Empty);
    }

    #[test]
    fn recipe_defaults_from_ron() {
        let ron = r#"
            ConstructibleObject(
                form_key: "000400:Fallout4.esm",
                created_object: Some("000010:Fallout4.esm"),
                components: [(item: Some("000500:Fallout4.esm"), count: 2)],
            )
        "#;
        let record: RecordData = ron::from_str(ron).unwrap();
        let RecordData::ConstructibleObject {
            created_count,
            workbench_keyword,
            components,
            ..
        } = record
        else {
            panic!("expected ConstructibleObject");
        };
        assert_eq!(created_count, 1);
        assert!(workbench_keyword.is_none());
        assert_eq!(components[0].count, 2);
    }

    #[test]
    fn layer_from_ron() {
        let ron = r#"
            (
                plugin: "Fallout4.esm",
                records: [
                    Ammunition(form_key: "000010:Fallout4.esm", damage: 12.5),
                ],
            )
        "#;
        let layer: LayerData = ron::from_str(ron).unwrap();
        assert_eq!(layer.plugin, "Fallout4.esm");
        assert_eq!(layer.records.len(), 1);
    }

    #[test]
    fn empty_layer_from_ron() {
        let layer: LayerData = ron::from_str(r#"(plugin: "Empty.esp")"#).unwrap();
        assert!(layer.records.is_empty());
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    #[test]
    fn layer_from_json() {
        let json = r#"{
            "plugin": "Mod.esp",
            "records": [
                {"Weapon": {"form_key": "000100:Fallout4.esm", "ammo": null}},
                {"LeveledItem": {"form_key": "000300:Fallout4.esm", "entries": [
                    {"Item": {"reference": "000010:Fallout4.esm"}},
                    "Empty"
                ]}}
            ]
        }"#;
        let layer: LayerData = serde_json::from_str(json).unwrap();
        assert_eq!(layer.records.len(), 2);
        assert!(matches!(layer.records[0], RecordData::Weapon { ammo: None, .. }));
        let RecordData::LeveledItem { entries, .. } = &layer.records[1] else {
            panic!("expected LeveledItem");
        };
        assert_eq!(entries[1], LeveledEntryData::Empty);
    }

    #[test]
    fn property_value_variants_from_json() {
        let json = r#"[
            {"property": "reload_speed", "value": {"Float": 1.5}},
            {"property": "keywords", "value": {"Bool": true}},
            {"property": "npc_ammo_list", "value": {"FormLink": {"record": "000012:Fallout4.esm", "count": 3}}}
        ]"#;
        let props: Vec<PropertyData> = serde_json::from_str(json).unwrap();
        assert_eq!(props[0].property, WeaponProperty::ReloadSpeed);
        assert_eq!(props[1].value, PropertyValueData::Bool(true));
        assert!(matches!(
            props[2].value,
            PropertyValueData::FormLink { count: 3, .. }
        ));
    }

    // -----------------------------------------------------------------------
    // TOML
    // -----------------------------------------------------------------------

    #[test]
    fn load_order_from_toml() {
        let order: TomlLoadOrder =
            toml::from_str(r#"layers = ["Fallout4.ron", "Mod.json"]"#).unwrap();
        assert_eq!(order.layers, vec!["Fallout4.ron", "Mod.json"]);
    }

    #[test]
    fn layer_from_toml() {
        let toml_src = r#"
plugin = "Mod.esp"

[[records]]
[records.Ammunition]
form_key = "000010:Fallout4.esm"
damage = 4.0
"#;
        let layer: LayerData = toml::from_str(toml_src).unwrap();
        assert_eq!(layer.plugin, "Mod.esp");
        assert!(matches!(
            layer.records[0],
            RecordData::Ammunition { ref form_key, .. } if form_key == "000010:Fallout4.esm"
        ));
    }
}
