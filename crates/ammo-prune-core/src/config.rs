use crate::id::{FormKey, ModKey};
use serde::{Deserialize, Serialize};

/// Plugin name the patch is saved under unless configured otherwise.
pub const DEFAULT_PATCH_NAME: &str = "UnusedAmmoRemover.esp";

/// Options for a pruning run. Every field has a default, so an empty config
/// file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Plugin name for the generated patch.
    pub patch_name: ModKey,
    /// Strip unused ammunition from leveled lists.
    pub prune_leveled_items: bool,
    /// Null out recipes that craft unused ammunition.
    pub prune_recipes: bool,
    /// Also remove leveled-list entries whose reference is null or dangling.
    pub drop_unresolved_entries: bool,
    /// Ammunition to treat as used even if no weapon references it.
    pub keep: Vec<FormKey>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            patch_name: ModKey::new(DEFAULT_PATCH_NAME),
            prune_leveled_items: true,
            prune_recipes: true,
            drop_unresolved_entries: false,
            keep: Vec::new(),
        }
    }
}
