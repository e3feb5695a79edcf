//! Resolution pipeline: reads layer files, parses identities, builds the load order.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and deserialization
//! helpers shared by layer, load order, and config loading.

use crate::schema::*;
use ammo_prune_core::id::{FormKey, FormKeyParseError};
use ammo_prune_core::link::FormLink;
use ammo_prune_core::load_order::{Layer, LoadOrder, LoadOrderBuilder};
use ammo_prune_core::record::*;
use ammo_prune_core::{IntegrityError, config::PruneConfig};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base name of the file listing a data directory's layers, lowest first.
pub const LOAD_ORDER_FILE: &str = "load_order";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A serialization error occurred while writing.
    #[error("could not serialize {file}: {detail}")]
    Serialize { file: PathBuf, detail: String },

    /// A form key or link in a data file is malformed.
    #[error("invalid form key in {file}: {source}")]
    InvalidFormKey {
        file: PathBuf,
        source: FormKeyParseError,
    },

    /// The loaded layers do not form a valid load order.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// On-disk formats for layers, load order lists, configs, and patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Map a file extension to its [`Format`].
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `dir/{base_name}` in whichever of the three formats is present.
///
/// `Ok(None)` when none is; `ConflictingFormats` when more than one is.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// [`find_data_file`], with absence reported as `MissingRequired`.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read and deserialize `path` in the format its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a top-level list from `path`. TOML has no top-level arrays, so there
/// the list lives under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Identity resolution
// ===========================================================================

fn parse_key(value: &str, file: &Path) -> Result<FormKey, DataLoadError> {
    value.parse().map_err(|source| DataLoadError::InvalidFormKey {
        file: file.to_path_buf(),
        source,
    })
}

fn parse_link(value: Option<&str>, file: &Path) -> Result<FormLink, DataLoadError> {
    match value {
        Some(v) => parse_key(v, file).map(FormLink::new),
        None => Ok(FormLink::NULL),
    }
}

fn parse_links(values: &[String], file: &Path) -> Result<Vec<FormLink>, DataLoadError> {
    values
        .iter()
        .map(|v| parse_key(v, file).map(FormLink::new))
        .collect()
}

/// Convert a record definition from a data file into a core [`Record`].
pub fn record_from_data(data: RecordData, file: &Path) -> Result<Record, DataLoadError> {
    let record = match data {
        RecordData::Weapon {
            form_key,
            editor_id,
            ammo,
            keywords,
        } => Record::Weapon(Weapon {
            form_key: parse_key(&form_key, file)?,
            editor_id,
            ammo: parse_link(ammo.as_deref(), file)?,
            keywords: parse_links(&keywords, file)?,
        }),
        RecordData::WeaponModification {
            form_key,
            editor_id,
            properties,
        } => Record::WeaponModification(WeaponModification {
            form_key: parse_key(&form_key, file)?,
            editor_id,
            properties: properties
                .into_iter()
                .map(|p| -> Result<ObjectModProperty, DataLoadError> {
                    let value = match p.value {
                        PropertyValueData::FormLink { record, count } => ObjectModValue::FormLink {
                            record: parse_link(record.as_deref(), file)?,
                            count,
                        },
                        PropertyValueData::Int(v) => ObjectModValue::Int(v),
                        PropertyValueData::Float(v) => ObjectModValue::Float(v),
                        PropertyValueData::Bool(v) => ObjectModValue::Bool(v),
                    };
                    Ok(ObjectModProperty {
                        property: p.property,
                        value,
                    })
                })
                .collect::<Result<_, _>>()?,
        }),
        RecordData::LeveledItem {
            form_key,
            editor_id,
            chance_none,
            entries,
        } => Record::LeveledItem(LeveledItem {
            form_key: parse_key(&form_key, file)?,
            editor_id,
            chance_none,
            entries: entries
                .into_iter()
                .map(|e| -> Result<LeveledItemEntry, DataLoadError> {
                    match e {
                        LeveledEntryData::Item {
                            level,
                            count,
                            reference,
                        } => Ok(LeveledItemEntry::new(
                            level,
                            count,
                            parse_link(reference.as_deref(), file)?,
                        )),
                        LeveledEntryData::Empty => Ok(LeveledItemEntry { data: None }),
                    }
                })
                .collect::<Result<_, _>>()?,
        }),
        RecordData::ConstructibleObject {
            form_key,
            editor_id,
            created_object,
            created_count,
            workbench_keyword,
            components,
        } => Record::ConstructibleObject(ConstructibleObject {
            form_key: parse_key(&form_key, file)?,
            editor_id,
            created_object: parse_link(created_object.as_deref(), file)?,
            created_count,
            workbench_keyword: parse_link(workbench_keyword.as_deref(), file)?,
            components: components
                .into_iter()
                .map(|c| -> Result<RecipeComponent, DataLoadError> {
                    Ok(RecipeComponent {
                        item: parse_link(c.item.as_deref(), file)?,
                        count: c.count,
                    })
                })
                .collect::<Result<_, _>>()?,
        }),
        RecordData::Ammunition {
            form_key,
            editor_id,
            damage,
            projectile,
        } => Record::Ammunition(Ammunition {
            form_key: parse_key(&form_key, file)?,
            editor_id,
            damage,
            projectile: parse_link(projectile.as_deref(), file)?,
        }),
    };
    Ok(record)
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load a single layer file.
pub fn load_layer(path: &Path) -> Result<Layer, DataLoadError> {
    let data: LayerData = deserialize_file(path)?;
    let records = data
        .records
        .into_iter()
        .map(|r| record_from_data(r, path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(file = %path.display(), records = records.len(), "layer parsed");
    Ok(Layer::with_records(data.plugin.as_str(), records))
}

/// Load every layer listed in `dir/load_order.{ron,toml,json}` and build the
/// load order. Listed paths are relative to `dir`, lowest priority first.
pub fn load_load_order(dir: &Path) -> Result<LoadOrder, DataLoadError> {
    let list_path = require_data_file(dir, LOAD_ORDER_FILE)?;
    let files: Vec<String> = deserialize_list(&list_path, "layers")?;

    let mut builder = LoadOrderBuilder::new();
    for file in &files {
        let layer = load_layer(&dir.join(file))?;
        info!(
            plugin = %layer.mod_key(),
            records = layer.len(),
            "loaded layer {file}"
        );
        builder.register_layer(layer);
    }
    Ok(builder.build()?)
}

/// Load a [`PruneConfig`] from a RON, TOML, or JSON file.
pub fn load_prune_config(path: &Path) -> Result<PruneConfig, DataLoadError> {
    deserialize_file(path)
}

// ===========================================================================
// Tests
// ===========================================================================
