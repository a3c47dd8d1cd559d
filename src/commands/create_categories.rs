use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::categories::category_description;
use crate::cli::CreateCategoriesArgs;
use crate::report::parse_unmatched_rows;
use crate::sqlgen::{NewCategory, render_category_creation_sql};
use crate::util::{now_utc_string, write_text_file};

pub fn run(args: CreateCategoriesArgs) -> Result<()> {
    let sql_path = args
        .sql_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("create_categories.sql"));
    let summary_path = args
        .summary_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("category_creation_summary.md"));

    info!(report = %args.report_path.display(), "extracting categories from report");

    let raw = fs::read_to_string(&args.report_path)
        .with_context(|| format!("failed to read {}", args.report_path.display()))?;
    let rows = parse_unmatched_rows(&raw)?;

    let categories: BTreeSet<String> = rows
        .iter()
        .map(|row| row.category.trim().to_uppercase())
        .filter(|category| !category.is_empty())
        .collect();

    if categories.is_empty() {
        bail!("no categories found in unmatched items");
    }

    let names: Vec<&str> = categories.iter().map(String::as_str).collect();
    info!(
        count = categories.len(),
        categories = %names.join(", "),
        "categories to create"
    );

    let new_categories: Vec<NewCategory> = categories
        .iter()
        .map(|name| NewCategory {
            name: name.clone(),
            description: category_description(name),
        })
        .collect();

    let generated_at = now_utc_string();
    let sql = render_category_creation_sql(&new_categories, &generated_at);
    write_text_file(&sql_path, &sql)?;
    info!(path = %sql_path.display(), "wrote category creation script");

    let summary = render_summary(&new_categories, &sql_path.display().to_string());
    write_text_file(&summary_path, &summary)?;
    info!(path = %summary_path.display(), "wrote category creation summary");

    Ok(())
}

fn render_summary(categories: &[NewCategory], sql_path: &str) -> String {
    let mut summary = format!(
        "# Category Creation Summary\n\
         \n\
         ## Overview\n\
         - **Total categories to create**: {}\n\
         - **Source**: Unmatched items from price update report\n\
         - **SQL file**: `{sql_path}`\n\
         \n\
         ## Categories to Create\n\
         \n\
         | Category Name | Description | Display Order |\n\
         |---------------|-------------|---------------|\n",
        categories.len(),
    );

    for (index, category) in categories.iter().enumerate() {
        summary.push_str(&format!(
            "| {} | {} | {} |\n",
            category.name,
            category.description,
            index + 1,
        ));
    }

    summary.push_str(
        "\n## Next Steps\n\
         \n\
         1. **Review the SQL file**: Check the generated SQL statements\n\
         2. **Test on backup**: Run the SQL on a backup database first\n\
         3. **Execute on production**: Apply the categories to the main database\n\
         4. **Update products**: Consider updating product category assignments for unmatched items\n\
         5. **Add missing products**: Create products for the unmatched items using the new categories\n\
         \n\
         ## Notes\n\
         \n\
         - Categories are created with `ON CONFLICT (name) DO NOTHING` to avoid duplicates\n\
         - All new categories are set as active by default\n\
         - Display order is automatically assigned based on alphabetical order\n\
         - Existing categories will not be affected\n",
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
# Price Update Report

## Unmatched Price Items (3 items)

| Name | Category | Price (KES) |
|------|----------|------------|
| Fanta Blackcurrant | soft drinks | 120 |
| Nyama Choma Platter | GRILLED MEATS | 850 |
| Krest Bitter Lemon | SOFT DRINKS | 130 |
";

    #[test]
    fn writes_sql_and_summary_with_deduplicated_categories() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.md");
        fs::write(&report_path, REPORT).unwrap();
        let out_root = dir.path().join("out");

        run(CreateCategoriesArgs {
            report_path,
            out_root: out_root.clone(),
            sql_path: None,
            summary_path: None,
        })
        .unwrap();

        let sql = fs::read_to_string(out_root.join("create_categories.sql")).unwrap();
        // "soft drinks" and "SOFT DRINKS" collapse to one category.
        assert_eq!(sql.matches("ON CONFLICT (name) DO NOTHING;").count(), 2);
        assert!(sql.contains("'SOFT DRINKS', 'Non-alcoholic soft drinks'"));
        assert!(sql.contains("'GRILLED MEATS'"));

        let summary =
            fs::read_to_string(out_root.join("category_creation_summary.md")).unwrap();
        assert!(summary.contains("- **Total categories to create**: 2"));
        assert!(summary.contains("| SOFT DRINKS | Non-alcoholic soft drinks | 2 |"));
    }

    #[test]
    fn report_without_unmatched_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.md");
        fs::write(&report_path, "# Price Update Report\n\nAll matched.\n").unwrap();

        let result = run(CreateCategoriesArgs {
            report_path,
            out_root: dir.path().join("out"),
            sql_path: None,
            summary_path: None,
        });

        assert!(result.is_err());
    }
}
