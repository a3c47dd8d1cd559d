mod categories;
mod cli;
mod commands;
mod matcher;
mod model;
mod pricesheet;
mod report;
mod sqlgen;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::UpdatePrices(args) => commands::update_prices::run(args),
        Commands::CreateCategories(args) => commands::create_categories::run(args),
        Commands::CreateProducts(args) => commands::create_products::run(args),
        Commands::ExtractProducts(args) => commands::extract_products::run(args),
        Commands::UpdateMenu(args) => commands::update_menu::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
