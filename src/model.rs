use serde::{Deserialize, Serialize};

/// One usable row of the externally supplied price sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListItem {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub alert_quantity: Option<String>,
}

/// Product as stored in the catalog snapshot. The export carries more
/// fields (id, category, image_url, ...); only name and price matter here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSnapshot {
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuSnapshot {
    pub categories: Vec<MenuCategory>,
    pub products: Vec<MenuProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuCategory {
    pub name: String,
    pub description: String,
    pub display_order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub cost: f64,
    pub preparation_time: u32,
}

/// Row recovered from a products-export PDF's text layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedProduct {
    pub name: String,
    pub brand: String,
    pub unit: String,
    pub category: String,
    pub sub_category: String,
    pub sku: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileEntry {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdatePaths {
    pub out_root: String,
    pub sql_path: String,
    pub report_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceUpdateCounts {
    pub price_rows_parsed: usize,
    pub price_rows_skipped: usize,
    pub catalog_products: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub exact_matches: usize,
    pub contains_matches: usize,
    pub words_matches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: PriceUpdatePaths,
    pub counts: PriceUpdateCounts,
    pub source_hashes: Vec<SourceFileEntry>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
