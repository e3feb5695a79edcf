//! File-backed layers for the ammunition pruner.
//!
//! Layers, the load order list, and prune configs are read from RON, TOML, or
//! JSON files. Patches are written back in the same layer format.

pub mod loader;
pub mod persist;
pub mod schema;

pub use loader::{DataLoadError, load_layer, load_load_order, load_prune_config};
pub use persist::write_patch;
