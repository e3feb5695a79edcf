//! Writing patches back out as layer files.

use crate::loader::{DataLoadError, Format, detect_format};
use crate::schema::*;
use ammo_prune_core::link::FormLink;
use ammo_prune_core::patch::Patch;
use ammo_prune_core::record::*;
use serde::Serialize;
use std::path::Path;
use tracing::info;

fn link_text(link: &FormLink) -> Option<String> {
    link.form_key().map(ToString::to_string)
}

/// Convert a core [`Record`] into its data file form.
pub fn record_to_data(record: &Record) -> RecordData {
    match record {
        Record::Weapon(w) => RecordData::Weapon {
            form_key: w.form_key.to_string(),
            editor_id: w.editor_id.clone(),
            ammo: link_text(&w.ammo),
            keywords: w.keywords.iter().filter_map(link_text).collect(),
        },
        Record::WeaponModification(m) => RecordData::WeaponModification {
            form_key: m.form_key.to_string(),
            editor_id: m.editor_id.clone(),
            properties: m
                .properties
                .iter()
                .map(|p| PropertyData {
                    property: p.property,
                    value: match &p.value {
                        ObjectModValue::FormLink { record, count } => PropertyValueData::FormLink {
                            record: link_text(record),
                            count: *count,
                        },
                        ObjectModValue::Int(v) => PropertyValueData::Int(*v),
                        ObjectModValue::Float(v) => PropertyValueData::Float(*v),
                        ObjectModValue::Bool(v) => PropertyValueData::Bool(*v),
                    },
                })
                .collect(),
        },
        Record::LeveledItem(l) => RecordData::LeveledItem {
            form_key: l.form_key.to_string(),
            editor_id: l.editor_id.clone(),
            chance_none: l.chance_none,
            entries: l
                .entries
                .iter()
                .map(|e| match &e.data {
                    Some(d) => LeveledEntryData::Item {
                        level: d.level,
                        count: d.count,
                        reference: link_text(&d.reference),
                    },
                    None => LeveledEntryData::Empty,
                })
                .collect(),
        },
        Record::ConstructibleObject(c) => RecordData::ConstructibleObject {
            form_key: c.form_key.to_string(),
            editor_id: c.editor_id.clone(),
            created_object: link_text(&c.created_object),
            created_count: c.created_count,
            workbench_keyword: link_text(&c.workbench_keyword),
            components: c
                .components
                .iter()
                .map(|comp| ComponentData {
                    item: link_text(&comp.item),
                    count: comp.count,
                })
                .collect(),
        },
        Record::Ammunition(a) => RecordData::Ammunition {
            form_key: a.form_key.to_string(),
            editor_id: a.editor_id.clone(),
            damage: a.damage,
            projectile: link_text(&a.projectile),
        },
    }
}

/// The layer file form of a patch, with records in identity order.
pub fn patch_to_layer_data(patch: &Patch) -> LayerData {
    LayerData {
        plugin: patch.mod_key().to_string(),
        records: patch.iter().map(|(_, r)| record_to_data(r)).collect(),
    }
}

/// Serialize a value in the given format, pretty-printed.
pub fn serialize_to_string<T: Serialize>(
    value: &T,
    format: Format,
    path: &Path,
) -> Result<String, DataLoadError> {
    let serialize_error = |detail: String| DataLoadError::Serialize {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map_err(|e| serialize_error(e.to_string())),
        Format::Json => {
            serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
        }
        Format::Toml => toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string())),
    }
}

/// Write a patch as a layer file. The format follows the file extension, and
/// the written file can be loaded back with [`crate::loader::load_layer`].
pub fn write_patch(path: &Path, patch: &Patch) -> Result<(), DataLoadError> {
    let format = detect_format(path)?;
    let content = serialize_to_string(&patch_to_layer_data(patch), format, path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!(
        file = %path.display(),
        plugin = %patch.mod_key(),
        records = patch.len(),
        "patch written"
    );
    Ok(())
}
