use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::model::PriceListItem;

#[derive(Debug, Clone, Default)]
pub struct ParsedPriceSheet {
    pub items: Vec<PriceListItem>,
    pub skipped_rows: usize,
}

/// Reads a tab-delimited price sheet (NAME, CATEGORY, ALERT_QUANTITY,
/// SELLING_PRICE). The first line is the header. Rows without a positive
/// numeric selling price are skipped, not fatal.
pub fn load_price_sheet(path: &Path) -> Result<ParsedPriceSheet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read price sheet {}", path.display()))?;
    Ok(parse_price_sheet(&raw))
}

pub fn parse_price_sheet(raw: &str) -> ParsedPriceSheet {
    let mut parsed = ParsedPriceSheet::default();

    for (line_number, line) in raw.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
        if columns.len() < 4 {
            warn!(line = line_number + 1, "price sheet row has too few columns");
            parsed.skipped_rows += 1;
            continue;
        }

        let name = columns[0];
        let category = columns[1];
        let alert_quantity = columns[2];
        let selling_price = columns[3];

        if selling_price.is_empty() || selling_price == "0" {
            parsed.skipped_rows += 1;
            continue;
        }

        let price = match selling_price.parse::<f64>() {
            Ok(price) if price > 0.0 => price,
            Ok(_) => {
                parsed.skipped_rows += 1;
                continue;
            }
            Err(_) => {
                warn!(
                    line = line_number + 1,
                    value = selling_price,
                    "price sheet row has non-numeric selling price"
                );
                parsed.skipped_rows += 1;
                continue;
            }
        };

        parsed.items.push(PriceListItem {
            name: name.to_string(),
            category: category.to_string(),
            price,
            alert_quantity: if alert_quantity.is_empty() {
                None
            } else {
                Some(alert_quantity.to_string())
            },
        });
    }

    parsed
}
