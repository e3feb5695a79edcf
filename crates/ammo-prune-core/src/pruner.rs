//! Run orchestration: usage closure first, then both pruning passes.

use crate::config::PruneConfig;
use crate::error::IntegrityError;
use crate::patch::Patch;
use crate::prune::{PassStats, prune_leveled_items, prune_recipes};
use crate::store::RecordStore;
use crate::usage::AmmoUsage;
use tracing::info;

/// Summary counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub used_ammunition: usize,
    pub leveled_items: PassStats,
    pub recipes: PassStats,
}

impl RunReport {
    /// Total overrides emitted.
    pub fn changed(&self) -> usize {
        self.leveled_items.changed + self.recipes.changed
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub usage: AmmoUsage,
    pub patch: Patch,
    pub report: RunReport,
}

/// Configured pruner. Holds no state between runs.
#[derive(Debug, Clone, Default)]
pub struct Pruner {
    config: PruneConfig,
}

impl Pruner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PruneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Build the usage set, honoring the configured `keep` list.
    pub fn collect_usage<S>(&self, store: &S) -> Result<AmmoUsage, IntegrityError>
    where
        S: RecordStore + ?Sized,
    {
        AmmoUsage::collect_with(store, &self.config.keep)
    }

    /// Run the enabled pruning passes against a finished usage set.
    pub fn prune<S>(
        &self,
        store: &S,
        usage: &AmmoUsage,
    ) -> Result<(Patch, RunReport), IntegrityError>
    where
        S: RecordStore + ?Sized,
    {
        let loot = || -> Result<(Patch, PassStats), IntegrityError> {
            let mut patch = Patch::new(self.config.patch_name.clone());
            if !self.config.prune_leveled_items {
                return Ok((patch, PassStats::default()));
            }
            let stats =
                prune_leveled_items(store, usage, self.config.drop_unresolved_entries, &mut patch)?;
            Ok((patch, stats))
        };
        let recipes = || -> Result<(Patch, PassStats), IntegrityError> {
            let mut patch = Patch::new(self.config.patch_name.clone());
            if !self.config.prune_recipes {
                return Ok((patch, PassStats::default()));
            }
            let stats = prune_recipes(store, usage, &mut patch)?;
            Ok((patch, stats))
        };

        // The passes touch disjoint record kinds, so they can run side by side.
        #[cfg(feature = "parallel")]
        let (loot, recipes) = rayon::join(loot, recipes);
        #[cfg(not(feature = "parallel"))]
        let (loot, recipes) = (loot(), recipes());

        let (mut patch, loot_stats) = loot?;
        let (recipe_patch, recipe_stats) = recipes?;
        patch.merge(recipe_patch)?;

        Ok((
            patch,
            RunReport {
                used_ammunition: usage.len(),
                leveled_items: loot_stats,
                recipes: recipe_stats,
            },
        ))
    }

    /// Collect usage, then prune.
    pub fn run<S>(&self, store: &S) -> Result<RunOutcome, IntegrityError>
    where
        S: RecordStore + ?Sized,
    {
        let usage = self.collect_usage(store)?;
        let (patch, report) = self.prune(store, &usage)?;
        info!(
            patch = %patch.mod_key(),
            used_ammunition = report.used_ammunition,
            leveled_items = report.leveled_items.changed,
            entries_removed = report.leveled_items.entries_removed,
            recipes = report.recipes.changed,
            "prune run complete"
        );
        Ok(RunOutcome {
            usage,
            patch,
            report,
        })
    }
}

/// Run with the default configuration and return only the patch.
pub fn run<S>(store: &S) -> Result<Patch, IntegrityError>
where
    S: RecordStore + ?Sized,
{
    Pruner::new().run(store).map(|outcome| outcome.patch)
}
