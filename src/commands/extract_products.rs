use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::ExtractProductsArgs;
use crate::model::ExportedProduct;
use crate::util::ensure_directory;

pub fn run(args: ExtractProductsArgs) -> Result<()> {
    let csv_path = args
        .csv_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("extracted_products.csv"));

    info!(pdf = %args.pdf_path.display(), "extracting product export");

    let text = extract_text_with_pdftotext(&args.pdf_path, args.max_pages)?;
    let products = parse_export_text(&text);

    if products.is_empty() {
        bail!(
            "no product rows recovered from {}",
            args.pdf_path.display()
        );
    }

    info!(products = products.len(), "extracted product rows");

    let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for product in &products {
        *category_counts.entry(product.category.as_str()).or_insert(0) += 1;
    }
    for (category, count) in &category_counts {
        info!(category = %category, count, "category item count");
    }

    if let Some(parent) = csv_path.parent() {
        ensure_directory(parent)?;
    }
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("failed to create {}", csv_path.display()))?;
    for product in &products {
        writer
            .serialize(product)
            .with_context(|| format!("failed to write row for {}", product.name))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", csv_path.display()))?;

    info!(path = %csv_path.display(), "wrote extracted products csv");

    Ok(())
}

fn extract_text_with_pdftotext(pdf_path: &Path, max_pages: Option<usize>) -> Result<String> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    Ok(raw.replace('\u{000C}', "\n").replace('\u{0000}', ""))
}

/// Parses the whitespace-separated export rows out of the PDF text layer.
/// Expected column order: NAME BRAND UNIT CATEGORY SUB-CATEGORY SKU
/// BARCODE TYPE MANAGE_STOCK ALERT_QUANTITY; only the first six matter.
fn parse_export_text(text: &str) -> Vec<ExportedProduct> {
    let mut products = Vec::new();

    for line in text.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() || line.starts_with("NAME BRAND") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let name = parts[0];
        let brand = parts.get(1).copied().unwrap_or("GEN");
        let unit = parts.get(2).copied().unwrap_or("Pcs");
        let category = parts.get(3).copied().unwrap_or("MISC");
        let sub_category = parts.get(4).copied().unwrap_or("");
        // C128 is the barcode symbology column bleeding into the SKU slot.
        let sku = match parts.get(5) {
            Some(&"C128") | None => "",
            Some(sku) => sku,
        };

        products.push(ExportedProduct {
            name: clean_export_name(name),
            brand: brand.to_string(),
            unit: unit.to_string(),
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            sku: sku.to_string(),
        });
    }

    products
}

/// Export names carry a GEN brand marker and underscores for spaces.
fn clean_export_name(name: &str) -> String {
    let cleaned = name.replace("GEN", "").replace('_', " ").trim().to_string();
    if cleaned.is_empty() {
        name.to_string()
    } else {
        cleaned
    }
}
