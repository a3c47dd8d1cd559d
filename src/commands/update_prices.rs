use std::cmp::Ordering;
use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::UpdatePricesArgs;
use crate::matcher::{AliasTable, MatchType, match_products, percent_change};
use crate::model::{
    CatalogSnapshot, PriceUpdateCounts, PriceUpdatePaths, PriceUpdateRunManifest, SourceFileEntry,
};
use crate::pricesheet::load_price_sheet;
use crate::report::render_price_update_report;
use crate::sqlgen::render_price_update_sql;
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
    write_text_file,
};

pub fn run(args: UpdatePricesArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let out_root = args.out_root.clone();
    let manifest_dir = out_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let sql_path = args
        .sql_path
        .clone()
        .unwrap_or_else(|| out_root.join("price_update.sql"));
    let report_path = args
        .report_path
        .clone()
        .unwrap_or_else(|| out_root.join("price_update_report.md"));
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "price_update_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(
        price_sheet = %args.price_sheet.display(),
        catalog = %args.catalog.display(),
        run_id = %run_id,
        "starting price update"
    );

    let sheet = load_price_sheet(&args.price_sheet)?;
    info!(
        rows = sheet.items.len(),
        skipped = sheet.skipped_rows,
        "parsed price sheet"
    );

    let raw = fs::read(&args.catalog)
        .with_context(|| format!("failed to read {}", args.catalog.display()))?;
    let snapshot: CatalogSnapshot = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.catalog.display()))?;
    info!(products = snapshot.products.len(), "loaded catalog snapshot");

    let aliases = AliasTable::builtin();
    let outcome = match_products(&sheet.items, &snapshot.products, &aliases);
    info!(
        matched = outcome.matches.len(),
        unmatched = outcome.unmatched.len(),
        "matching completed"
    );

    let sql = render_price_update_sql(&outcome.matches);
    write_text_file(&sql_path, &sql)?;
    info!(path = %sql_path.display(), "wrote price update script");

    let report = render_price_update_report(
        &outcome.matches,
        &outcome.unmatched,
        args.unmatched_limit,
        &started_at,
    );
    write_text_file(&report_path, &report)?;
    info!(path = %report_path.display(), "wrote price update report");

    let mut warnings = Vec::new();
    if sheet.skipped_rows > 0 {
        warnings.push(format!(
            "{} price sheet rows were skipped for missing or invalid prices",
            sheet.skipped_rows
        ));
    }
    if outcome.matches.is_empty() {
        warnings.push("no price items matched the catalog".to_string());
    }

    let updated_at = now_utc_string();
    let manifest = PriceUpdateRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        command: render_command(&args),
        paths: PriceUpdatePaths {
            out_root: out_root.display().to_string(),
            sql_path: sql_path.display().to_string(),
            report_path: report_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        counts: PriceUpdateCounts {
            price_rows_parsed: sheet.items.len(),
            price_rows_skipped: sheet.skipped_rows,
            catalog_products: snapshot.products.len(),
            matched: outcome.matches.len(),
            unmatched: outcome.unmatched.len(),
            exact_matches: count_type(&outcome.matches, MatchType::Exact),
            contains_matches: count_type(&outcome.matches, MatchType::Contains),
            words_matches: count_type(&outcome.matches, MatchType::Words),
        },
        source_hashes: vec![
            SourceFileEntry {
                path: args.price_sheet.display().to_string(),
                sha256: sha256_file(&args.price_sheet)?,
            },
            SourceFileEntry {
                path: args.catalog.display().to_string(),
                sha256: sha256_file(&args.catalog)?,
            },
        ],
        warnings,
        notes: vec![
            "Review the report before applying the SQL script to production.".to_string(),
            "Unmatched items feed the create-categories and create-products commands."
                .to_string(),
        ],
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote run manifest");

    log_largest_changes(&outcome.matches, args.preview_limit);

    if !outcome.unmatched.is_empty() {
        warn!(
            unmatched = outcome.unmatched.len(),
            "some price items have no catalog counterpart; see the report"
        );
    }

    info!(
        matched = outcome.matches.len(),
        unmatched = outcome.unmatched.len(),
        "price update completed"
    );

    Ok(())
}

fn count_type(matches: &[crate::matcher::ProductMatch], match_type: MatchType) -> usize {
    matches
        .iter()
        .filter(|matched| matched.match_type == match_type)
        .count()
}

fn log_largest_changes(matches: &[crate::matcher::ProductMatch], limit: usize) {
    let mut sorted: Vec<_> = matches.iter().collect();
    sorted.sort_by(|a, b| {
        let change_a = percent_change(a.product.price, a.item.price).abs();
        let change_b = percent_change(b.product.price, b.item.price).abs();
        change_b.partial_cmp(&change_a).unwrap_or(Ordering::Equal)
    });

    for matched in sorted.iter().take(limit) {
        let change = percent_change(matched.product.price, matched.item.price);
        info!(
            product = %matched.product.name,
            old_price = matched.product.price,
            new_price = matched.item.price,
            change_percent = format!("{change:+.1}"),
            match_type = matched.match_type.as_str(),
            "price change preview"
        );
    }
}

fn render_command(args: &UpdatePricesArgs) -> String {
    format!(
        "posmaint update-prices --price-sheet {} --catalog {} --out-root {}",
        args.price_sheet.display(),
        args.catalog.display(),
        args.out_root.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_inputs(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let price_sheet = dir.join("price_sheet.txt");
        fs::write(
            &price_sheet,
            "NAME\tCATEGORY\tALERT_QUANTITY\tSELLING_PRICE\n\
             JW Red\tWHISKEY\t2\t2500\n\
             Tusker Malt 500ml\tBEER\t12\t300\n\
             XYZ Unknown Item\tCANS\t\t100\n\
             Broken Row\tBEER\t1\tn/a\n",
        )
        .unwrap();

        let catalog = dir.join("catalog.json");
        fs::write(
            &catalog,
            r#"{"products": [
                {"name": "Johnnie Walker Red Label", "price": 2300},
                {"name": "Tusker Malt", "price": 280}
            ]}"#,
        )
        .unwrap();

        (price_sheet, catalog)
    }

    #[test]
    fn writes_sql_report_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let (price_sheet, catalog) = write_inputs(dir.path());
        let out_root = dir.path().join("out");

        let args = UpdatePricesArgs {
            price_sheet,
            catalog,
            out_root: out_root.clone(),
            sql_path: None,
            report_path: None,
            manifest_path: None,
            unmatched_limit: 20,
            preview_limit: 5,
        };

        run(args).unwrap();

        let sql = fs::read_to_string(out_root.join("price_update.sql")).unwrap();
        assert!(sql.contains("UPDATE products"));
        assert!(sql.contains("WHERE name = 'Johnnie Walker Red Label';"));

        let report = fs::read_to_string(out_root.join("price_update_report.md")).unwrap();
        assert!(report.contains("- **Products matched**: 2"));
        assert!(report.contains("- **Products not matched**: 1"));
        assert!(report.contains("| XYZ Unknown Item | CANS | 100 |"));

        let manifests: Vec<_> = fs::read_dir(out_root.join("manifests"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(manifests.len(), 1);

        let manifest: PriceUpdateRunManifest =
            serde_json::from_slice(&fs::read(&manifests[0]).unwrap()).unwrap();
        assert_eq!(manifest.status, "completed");
        assert_eq!(manifest.counts.price_rows_parsed, 3);
        assert_eq!(manifest.counts.price_rows_skipped, 1);
        assert_eq!(manifest.counts.matched, 2);
        assert_eq!(manifest.counts.unmatched, 1);
        assert_eq!(manifest.counts.exact_matches, 1);
        assert_eq!(manifest.counts.contains_matches, 1);
        assert_eq!(manifest.source_hashes.len(), 2);
        assert!(!manifest.warnings.is_empty());
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (price_sheet, _) = write_inputs(dir.path());

        let args = UpdatePricesArgs {
            price_sheet,
            catalog: dir.path().join("nope.json"),
            out_root: dir.path().join("out"),
            sql_path: None,
            report_path: None,
            manifest_path: None,
            unmatched_limit: 20,
            preview_limit: 5,
        };

        assert!(run(args).is_err());
    }
}
