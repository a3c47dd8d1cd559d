use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::categories::{FALLBACK_CATEGORY_ID, FALLBACK_CATEGORY_NAME, category_id};
use crate::cli::CreateProductsArgs;
use crate::report::parse_unmatched_rows;
use crate::sqlgen::{NewProduct, ProductGroup, render_product_creation_sql};
use crate::util::{now_utc_string, title_case, write_text_file};

#[derive(Debug, Clone)]
struct PendingProduct {
    name: String,
    category: String,
    price: f64,
}

pub fn run(args: CreateProductsArgs) -> Result<()> {
    let sql_path = args
        .sql_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("create_products.sql"));
    let summary_path = args
        .summary_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("product_creation_summary.md"));

    info!(report = %args.report_path.display(), "extracting unmatched products from report");

    let raw = fs::read_to_string(&args.report_path)
        .with_context(|| format!("failed to read {}", args.report_path.display()))?;
    let rows = parse_unmatched_rows(&raw)?;

    let mut products = Vec::new();
    for row in &rows {
        let price = match row.price.parse::<f64>() {
            Ok(price) => price,
            Err(_) => {
                warn!(
                    product = %row.name,
                    value = %row.price,
                    "skipping product with invalid price"
                );
                continue;
            }
        };

        products.push(PendingProduct {
            name: title_case(&row.name),
            category: row.category.to_uppercase(),
            price,
        });
    }

    if products.is_empty() {
        bail!("no unmatched products found to create");
    }

    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    for product in &products {
        *category_counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    for (category, count) in &category_counts {
        info!(category = %category, count, "products to create");
    }

    let groups = group_by_category(&products, args.cost_ratio);

    let generated_at = now_utc_string();
    let sql = render_product_creation_sql(&groups, &generated_at);
    write_text_file(&sql_path, &sql)?;
    info!(path = %sql_path.display(), "wrote product creation script");

    let summary = render_summary(
        &products,
        &category_counts,
        args.cost_ratio,
        &sql_path.display().to_string(),
    );
    write_text_file(&summary_path, &summary)?;
    info!(path = %summary_path.display(), "wrote product creation summary");

    Ok(())
}

fn group_by_category(products: &[PendingProduct], cost_ratio: f64) -> Vec<ProductGroup> {
    let mut mapped: BTreeMap<String, (u32, Vec<NewProduct>)> = BTreeMap::new();
    let mut unmapped: Vec<NewProduct> = Vec::new();
    let mut unmapped_categories: BTreeSet<String> = BTreeSet::new();

    for product in products {
        let entry = NewProduct {
            name: product.name.clone(),
            description: format!(
                "{} from {} category",
                product.name,
                title_case(&product.category)
            ),
            price: product.price,
            cost: estimated_cost(product.price, cost_ratio),
        };

        match category_id(&product.category) {
            Some(id) => {
                mapped
                    .entry(product.category.clone())
                    .or_insert_with(|| (id, Vec::new()))
                    .1
                    .push(entry);
            }
            None => {
                unmapped_categories.insert(product.category.clone());
                unmapped.push(entry);
            }
        }
    }

    if !unmapped_categories.is_empty() {
        let names: Vec<&str> = unmapped_categories.iter().map(String::as_str).collect();
        warn!(
            categories = %names.join(", "),
            fallback = FALLBACK_CATEGORY_NAME,
            fallback_id = FALLBACK_CATEGORY_ID,
            "unmapped categories assigned to fallback"
        );
    }

    let mut groups: Vec<ProductGroup> = mapped
        .into_iter()
        .map(|(category, (id, products))| ProductGroup {
            heading: format!("{category} products (Category ID: {id})"),
            category_id: id,
            products,
        })
        .collect();

    if !unmapped.is_empty() {
        groups.push(ProductGroup {
            heading: format!(
                "Products with unmapped categories (assigned to {FALLBACK_CATEGORY_NAME})"
            ),
            category_id: FALLBACK_CATEGORY_ID,
            products: unmapped,
        });
    }

    groups
}

fn estimated_cost(price: f64, cost_ratio: f64) -> f64 {
    (price * cost_ratio * 100.0).round() / 100.0
}

fn render_summary(
    products: &[PendingProduct],
    category_counts: &BTreeMap<String, usize>,
    cost_ratio: f64,
    sql_path: &str,
) -> String {
    let mut summary = format!(
        "# Product Creation Summary\n\
         \n\
         ## Overview\n\
         - **Total products to create**: {}\n\
         - **Categories involved**: {}\n\
         - **Source**: Unmatched items from price update report\n\
         - **SQL file**: `{sql_path}`\n\
         \n\
         ## Products by Category\n\
         \n",
        products.len(),
        category_counts.len(),
    );

    for (category, count) in category_counts {
        let prices: Vec<f64> = products
            .iter()
            .filter(|product| product.category == *category)
            .map(|product| product.price)
            .collect();
        let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_price = prices.iter().sum::<f64>() / prices.len() as f64;

        let examples: Vec<&str> = products
            .iter()
            .filter(|product| product.category == *category)
            .take(5)
            .map(|product| product.name.as_str())
            .collect();
        let more = if *count > 5 { "..." } else { "" };

        summary.push_str(&format!(
            "### {category} ({count} products)\n\
             - **Price range**: KES {min_price:.0} - KES {max_price:.0}\n\
             - **Average price**: KES {avg_price:.0}\n\
             - **Products**: {}{more}\n\
             \n",
            examples.join(", "),
        ));
    }

    summary.push_str(
        "## Product Examples\n\
         \n\
         | Name | Category | Price (KES) | Estimated Cost (KES) |\n\
         |------|----------|-------------|---------------------|\n",
    );

    for product in products.iter().take(10) {
        summary.push_str(&format!(
            "| {} | {} | {:.0} | {:.0} |\n",
            product.name,
            product.category,
            product.price,
            estimated_cost(product.price, cost_ratio),
        ));
    }

    if products.len() > 10 {
        summary.push_str(&format!("\n... and {} more products\n", products.len() - 10));
    }

    summary.push_str(&format!(
        "\n## Important Notes\n\
         \n\
         1. **Cost Estimation**: Product costs are estimated at {:.0}% of selling price\n\
         2. **Category Assignment**: Products are mapped to existing database categories\n\
         3. **Duplicate Prevention**: Script checks for existing products with same name and category\n\
         4. **Default Settings**: All products are created as active and available\n\
         5. **Preparation Time**: Default 5 minutes assigned to all products\n\
         \n\
         ## Next Steps\n\
         \n\
         1. **Review the SQL file**: Check the generated statements\n\
         2. **Test on backup**: Run the SQL on a backup database first\n\
         3. **Execute on production**: Apply the products to the main database\n\
         4. **Update images**: Consider adding product images after creation\n\
         5. **Review pricing**: Fine-tune prices and costs based on business needs\n",
        cost_ratio * 100.0,
    ));

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
# Price Update Report

## Unmatched Price Items (4 items)

| Name | Category | Price (KES) |
|------|----------|------------|
| fanta blackcurrant | SOFT DRINKS | 120 |
| savanna dry can | CAN | 350 |
| nyama choma platter | GRILLED MEATS CHOMA | 850 |
| broken row item | CANS | n/a |
";

    #[test]
    fn groups_products_and_applies_fallback_category() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.md");
        fs::write(&report_path, REPORT).unwrap();
        let out_root = dir.path().join("out");

        run(CreateProductsArgs {
            report_path,
            out_root: out_root.clone(),
            sql_path: None,
            summary_path: None,
            cost_ratio: 0.6,
        })
        .unwrap();

        let sql = fs::read_to_string(out_root.join("create_products.sql")).unwrap();
        assert!(sql.contains("-- CAN products (Category ID: 25)"));
        assert!(sql.contains("-- SOFT DRINKS products (Category ID: 11)"));
        assert!(sql.contains("-- Products with unmapped categories (assigned to SNACKS)"));
        assert!(sql.contains("'Fanta Blackcurrant'"));
        assert!(sql.contains("'Savanna Dry Can'"));
        // Invalid price row is dropped, not emitted.
        assert!(!sql.contains("Broken Row Item"));

        let summary = fs::read_to_string(out_root.join("product_creation_summary.md")).unwrap();
        assert!(summary.contains("- **Total products to create**: 3"));
        assert!(summary.contains("| Savanna Dry Can | CAN | 350 | 210 |"));
    }

    #[test]
    fn all_invalid_prices_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.md");
        fs::write(
            &report_path,
            "## Unmatched Price Items (1 items)\n\n\
             | Name | Category | Price (KES) |\n\
             |------|----------|------------|\n\
             | only item | CANS | free |\n",
        )
        .unwrap();

        let result = run(CreateProductsArgs {
            report_path,
            out_root: dir.path().join("out"),
            sql_path: None,
            summary_path: None,
            cost_ratio: 0.6,
        });

        assert!(result.is_err());
    }
}
