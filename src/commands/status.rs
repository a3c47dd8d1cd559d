use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::PriceUpdateRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_root.join("manifests");

    info!(out_root = %args.out_root.display(), "status requested");

    match latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw = fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: PriceUpdateRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                price_rows_parsed = manifest.counts.price_rows_parsed,
                price_rows_skipped = manifest.counts.price_rows_skipped,
                catalog_products = manifest.counts.catalog_products,
                matched = manifest.counts.matched,
                unmatched = manifest.counts.unmatched,
                exact_matches = manifest.counts.exact_matches,
                contains_matches = manifest.counts.contains_matches,
                words_matches = manifest.counts.words_matches,
                warnings = manifest.warnings.len(),
                "loaded latest run manifest"
            );
        }
        None => {
            warn!(path = %manifest_dir.display(), "no run manifests found");
        }
    }

    for artifact in [
        "price_update.sql",
        "price_update_report.md",
        "create_categories.sql",
        "category_creation_summary.md",
        "create_products.sql",
        "product_creation_summary.md",
        "extracted_products.csv",
        "update_menu.sql",
    ] {
        let path = args.out_root.join(artifact);
        if path.exists() {
            info!(path = %path.display(), "artifact present");
        } else {
            warn!(path = %path.display(), "artifact missing");
        }
    }

    Ok(())
}

/// Run ids embed a compact UTC timestamp, so the lexicographically largest
/// manifest filename is the most recent run.
fn latest_run_manifest(manifest_dir: &std::path::Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut manifests = Vec::new();
    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();

        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("price_update_run_") && name.ends_with(".json"))
            .unwrap_or(false);

        if is_run_manifest {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests.pop())
}
