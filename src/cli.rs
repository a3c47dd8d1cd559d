use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "posmaint",
    version,
    about = "Batch maintenance tooling for the POS product catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match a tab-delimited price sheet against the catalog and emit a price update script
    UpdatePrices(UpdatePricesArgs),
    /// Generate category creation SQL from a price update report's unmatched items
    CreateCategories(CreateCategoriesArgs),
    /// Generate product creation SQL from a price update report's unmatched items
    CreateProducts(CreateProductsArgs),
    /// Extract product export rows from a PDF into CSV
    ExtractProducts(ExtractProductsArgs),
    /// Rebuild the full menu SQL and image scaffolding from a menu snapshot
    UpdateMenu(UpdateMenuArgs),
    /// Inspect generated artifacts and the latest run manifest
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdatePricesArgs {
    /// Tab-delimited sheet: NAME, CATEGORY, ALERT_QUANTITY, SELLING_PRICE
    #[arg(long)]
    pub price_sheet: PathBuf,

    /// Catalog snapshot JSON with a top-level `products` array
    #[arg(long)]
    pub catalog: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,

    #[arg(long)]
    pub sql_path: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Cap on unmatched rows shown in the report table
    #[arg(long, default_value_t = 20)]
    pub unmatched_limit: usize,

    /// How many of the largest price swings to log after the run
    #[arg(long, default_value_t = 5)]
    pub preview_limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CreateCategoriesArgs {
    /// Price update report produced by `update-prices`
    #[arg(long)]
    pub report_path: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,

    #[arg(long)]
    pub sql_path: Option<PathBuf>,

    #[arg(long)]
    pub summary_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CreateProductsArgs {
    /// Price update report produced by `update-prices`
    #[arg(long)]
    pub report_path: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,

    #[arg(long)]
    pub sql_path: Option<PathBuf>,

    #[arg(long)]
    pub summary_path: Option<PathBuf>,

    /// Estimated cost as a fraction of selling price
    #[arg(long, default_value_t = 0.6)]
    pub cost_ratio: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractProductsArgs {
    /// Products export PDF from the stock system
    #[arg(long)]
    pub pdf_path: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,

    #[arg(long)]
    pub csv_path: Option<PathBuf>,

    #[arg(long)]
    pub max_pages: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateMenuArgs {
    /// Menu snapshot JSON with `categories` and `products` arrays
    #[arg(long)]
    pub menu_data: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,

    /// Web root that receives the image directory scaffolding
    #[arg(long, default_value = "public")]
    pub public_root: PathBuf,

    #[arg(long)]
    pub sql_path: Option<PathBuf>,

    #[arg(long)]
    pub readme_path: Option<PathBuf>,

    /// Skip creating image directories and placeholder files
    #[arg(long, default_value_t = false)]
    pub skip_images: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "out")]
    pub out_root: PathBuf,
}
