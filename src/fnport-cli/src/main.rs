//! fnport - catalog asset dump classifier and exporter

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

mod cli;
mod config;
mod loader;

use cli::{Args, Commands};
use config::Config;
use fnport::{CategoryRegistry, ExportRecord, ExportWriter, StatsCache};
use loader::{AssetLoader, LoadedAsset};

enum Outcome {
    Exported,
    Skipped,
    Failed,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Commands::Configure { export_path }) = args.command {
        let mut config = Config::load()?;
        config.export_path = Some(export_path.display().to_string());
        config.save()?;
        eprintln!("Saved default export path {}", export_path.display());
        return Ok(());
    }

    let config = Config::load()?;
    let input = args
        .input
        .clone()
        .context("Input directory is required for export")?;
    let output = args
        .output
        .clone()
        .or_else(|| config.export_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("exported"));

    let active_items: HashSet<String> = match &args.active_list {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read active list {}", path.display()))?;
            let names: Vec<String> = serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse active list {}", path.display()))?;
            names.into_iter().collect()
        }
        None => HashSet::new(),
    };
    if args.verbose && !active_items.is_empty() {
        eprintln!("Loaded {} active item names", active_items.len());
    }

    let registry = CategoryRegistry::new(active_items);
    let cache = StatsCache::new();

    let mut loader = AssetLoader::new(&input);
    let assets = loader.load_dir(args.verbose)?;
    eprintln!("Loaded {} asset dumps", assets.len());

    if args.list {
        for asset in &assets {
            match registry.classify(&asset.bag, &asset.class_name) {
                Some(descriptor) => println!("{} [{}]", asset.bag.name(), descriptor.category),
                None => {
                    if args.verbose {
                        println!("{} [skipped]", asset.bag.name());
                    }
                }
            }
        }
        return Ok(());
    }

    let writer = ExportWriter::new(&output, args.compression.into());

    let pb = ProgressBar::new(assets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let outcomes: Vec<Outcome> = assets
        .par_iter()
        .map(|asset| {
            let outcome = export_asset(asset, &registry, &cache, &writer);
            pb.inc(1);
            outcome
        })
        .collect();

    pb.finish_with_message("Done");

    let exported = outcomes.iter().filter(|o| matches!(o, Outcome::Exported)).count();
    let skipped = outcomes.iter().filter(|o| matches!(o, Outcome::Skipped)).count();
    let failed = outcomes.iter().filter(|o| matches!(o, Outcome::Failed)).count();
    eprintln!("Exported: {}, Skipped: {}, Failed: {}", exported, skipped, failed);

    Ok(())
}

/// Classify, resolve and export one asset. Failures are reported and
/// scoped to the asset; the batch carries on.
fn export_asset(
    asset: &LoadedAsset,
    registry: &CategoryRegistry,
    cache: &StatsCache,
    writer: &ExportWriter,
) -> Outcome {
    let Some(descriptor) = registry.classify(&asset.bag, &asset.class_name) else {
        return Outcome::Skipped;
    };

    let record = match ExportRecord::build(&asset.bag, descriptor, cache) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Error {}: {}", asset.bag.name(), e);
            return Outcome::Failed;
        }
    };

    if let Err(e) = writer.export(&record) {
        eprintln!("Error {}: {}", record.id, e);
        return Outcome::Failed;
    }
    Outcome::Exported
}
