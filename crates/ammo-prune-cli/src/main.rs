//! `ammo-prune`: load a layered data directory, remove unused ammunition from
//! leveled lists and recipes, and write the resulting patch.

use ammo_prune_core::config::PruneConfig;
use ammo_prune_core::id::ModKey;
use ammo_prune_core::pruner::{Pruner, RunReport};
use ammo_prune_data::{load_load_order, load_prune_config, write_patch};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ammo-prune", version, about)]
struct Args {
    /// Directory holding the `load_order` file and the layer files it lists.
    #[arg(long)]
    data: PathBuf,

    /// Where to write the patch. The extension picks RON, TOML, or JSON.
    #[arg(long, default_value = "UnusedAmmoRemover.json")]
    output: PathBuf,

    /// Plugin name for the patch. Overrides the config file.
    #[arg(long)]
    patch_name: Option<String>,

    /// Prune config file (RON, TOML, or JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report what would change without writing the patch.
    #[arg(long)]
    dry_run: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<PruneConfig> {
    let mut config = match &args.config {
        Some(path) => load_prune_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PruneConfig::default(),
    };
    if let Some(name) = &args.patch_name {
        config.patch_name = ModKey::new(name.as_str());
    }
    Ok(config)
}

fn print_summary(patch_name: &ModKey, report: &RunReport) {
    println!("used ammunition: {}", report.used_ammunition);
    println!(
        "leveled lists: {} scanned, {} changed, {} entries removed",
        report.leveled_items.scanned,
        report.leveled_items.changed,
        report.leveled_items.entries_removed
    );
    println!(
        "recipes: {} scanned, {} disabled",
        report.recipes.scanned, report.recipes.changed
    );
    println!("{patch_name}: {} overrides", report.changed());
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let order = load_load_order(&args.data)
        .with_context(|| format!("loading load order from {}", args.data.display()))?;
    info!(
        layers = order.layer_count(),
        identities = order.identity_count(),
        "load order ready"
    );

    let pruner = Pruner::with_config(config);
    let outcome = pruner.run(&order).context("pruning load order")?;
    print_summary(&pruner.config().patch_name, &outcome.report);

    if args.dry_run {
        info!("dry run, patch not written");
        return Ok(());
    }
    write_patch(&args.output, &outcome.patch)
        .with_context(|| format!("writing patch {}", args.output.display()))?;
    println!("wrote {}", args.output.display());
    Ok(())
}
