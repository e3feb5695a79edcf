//! Ammo Prune Core -- override resolution and unused-ammunition pruning.
//!
//! Given a layered load order of game records, this crate works out which
//! ammunition is still reachable from any weapon or weapon modification and
//! produces a minimal patch that strips the rest out of leveled lists and
//! crafting recipes.
//!
//! # Run Pipeline
//!
//! [`pruner::Pruner::run`] performs, strictly in order:
//!
//! 1. **Usage closure** -- scan winning weapons (their `ammo` link) and winning
//!    weapon modifications (their `Ammo` properties) into an immutable
//!    [`usage::AmmoUsage`].
//! 2. **Leveled item pass** -- drop entries that point at unused ammunition.
//! 3. **Recipe pass** -- null the created object and workbench keyword of
//!    recipes that craft unused ammunition.
//!
//! Passes 2 and 3 only read the winning view and only write to the
//! [`patch::Patch`]. With the `parallel` feature they run concurrently.
//!
//! # Key Types
//!
//! - [`id::FormKey`] -- a record's identity, stable across layers.
//! - [`record::Record`] -- sum type over the five record kinds.
//! - [`store::RecordStore`] -- the query trait the passes read through.
//! - [`load_order::LoadOrder`] -- validated, frozen layer stack implementing
//!   `RecordStore` with a precomputed winning index.
//! - [`link::FormLink`] -- nullable reference resolved through the store.
//!
//! ```rust,ignore
//! let mut builder = LoadOrderBuilder::new();
//! builder.register_layer(base);
//! builder.register_layer(my_mod);
//! let order = builder.build()?;
//! let patch = ammo_prune_core::run(&order)?;
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod link;
pub mod load_order;
pub mod patch;
pub mod prune;
pub mod pruner;
pub mod record;
pub mod store;
pub mod usage;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::IntegrityError;
pub use pruner::run;
