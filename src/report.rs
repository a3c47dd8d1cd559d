use std::cmp::Ordering;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::matcher::{ProductMatch, percent_change};
use crate::model::PriceListItem;
use crate::util::truncate_chars;

const UNMATCHED_SECTION_HEADING: &str = "## Unmatched Price Items";

/// Renders the price update report. The unmatched table is the contract
/// consumed later by `create-categories` and `create-products`, so its
/// shape (three columns, pipe-delimited) must stay stable.
pub fn render_price_update_report(
    matches: &[ProductMatch],
    unmatched: &[PriceListItem],
    unmatched_limit: usize,
    generated_at: &str,
) -> String {
    let mut report = format!(
        "# Price Update Report\n\
         Generated: {generated_at}\n\
         \n\
         ## Summary\n\
         - **Products matched**: {}\n\
         - **Products not matched**: {}\n\
         - **Total price items processed**: {}\n\
         \n\
         ## Matched Products and Price Changes\n\
         \n\
         | Product Name | Old Price (KES) | New Price (KES) | Change (%) | Match Type |\n\
         |--------------|----------------|----------------|-----------|------------|\n",
        matches.len(),
        unmatched.len(),
        matches.len() + unmatched.len(),
    );

    let mut sorted: Vec<&ProductMatch> = matches.iter().collect();
    sorted.sort_by(|a, b| {
        let change_a = percent_change(a.product.price, a.item.price);
        let change_b = percent_change(b.product.price, b.item.price);
        change_b.partial_cmp(&change_a).unwrap_or(Ordering::Equal)
    });

    for matched in sorted {
        let change = percent_change(matched.product.price, matched.item.price);
        report.push_str(&format!(
            "| {} | {:.0} | {:.0} | {:+.1}% | {} |\n",
            truncate_chars(&matched.product.name, 40),
            matched.product.price,
            matched.item.price,
            change,
            matched.match_type.as_str(),
        ));
    }

    if !unmatched.is_empty() {
        report.push_str(&format!(
            "\n{UNMATCHED_SECTION_HEADING} ({} items)\n\
             \n\
             These items from the price list could not be matched with existing products in the database:\n\
             \n\
             | Name | Category | Price (KES) |\n\
             |------|----------|------------|\n",
            unmatched.len(),
        ));

        for item in unmatched.iter().take(unmatched_limit) {
            report.push_str(&format!(
                "| {} | {} | {:.0} |\n",
                truncate_chars(&item.name, 40),
                truncate_chars(&item.category, 15),
                item.price,
            ));
        }

        if unmatched.len() > unmatched_limit {
            report.push_str(&format!(
                "\n... and {} more items\n",
                unmatched.len() - unmatched_limit
            ));
        }
    }

    report.push_str(
        "\n## Recommendations\n\
         \n\
         1. **Review unmatched items**: Consider adding missing products to the database\n\
         2. **Verify price changes**: Large price changes should be reviewed before applying\n\
         3. **Update cost prices**: Consider updating cost prices proportionally to maintain margins\n\
         4. **Test before production**: Run this update on a test database first\n\
         \n\
         ## Next Steps\n\
         \n\
         1. Review the generated SQL script: `price_update.sql`\n\
         2. Test on a backup database\n\
         3. Apply to production database\n\
         4. Update any cached price data in the application\n",
    );

    report
}

/// Row of the unmatched-items table, untouched except for cell trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRow {
    pub name: String,
    pub category: String,
    pub price: String,
}

/// Pulls the unmatched-items table back out of a rendered report.
pub fn parse_unmatched_rows(report: &str) -> Result<Vec<UnmatchedRow>> {
    let section_start = report
        .find(UNMATCHED_SECTION_HEADING)
        .with_context(|| format!("report has no `{UNMATCHED_SECTION_HEADING}` section"))?;

    let row_pattern = Regex::new(r"\| ([^|]+) \| ([^|]+) \| ([^|]+) \|")
        .context("failed to compile unmatched table row regex")?;

    let mut rows = Vec::new();
    for captures in row_pattern.captures_iter(&report[section_start..]) {
        let name = captures[1].trim().to_string();
        let category = captures[2].trim().to_string();
        let price = captures[3].trim().to_string();

        // Header and separator rows carry no data.
        if name == "Name" || category == "Category" || name == "---" || category == "---" {
            continue;
        }
        if name.is_empty() || category.is_empty() {
            continue;
        }

        rows.push(UnmatchedRow {
            name,
            category,
            price,
        });
    }

    if rows.is_empty() {
        bail!("unmatched items section contains no table rows");
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchType;
    use crate::model::CatalogProduct;

    fn sample_match(name: &str, old: f64, new: f64, match_type: MatchType) -> ProductMatch {
        ProductMatch {
            item: PriceListItem {
                name: name.to_string(),
                category: "BEER".to_string(),
                price: new,
                alert_quantity: None,
            },
            product: CatalogProduct {
                name: name.to_string(),
                price: old,
            },
            match_type,
            score: 1.0,
        }
    }

    fn sample_unmatched(name: &str, category: &str, price: f64) -> PriceListItem {
        PriceListItem {
            name: name.to_string(),
            category: category.to_string(),
            price,
            alert_quantity: None,
        }
    }

    #[test]
    fn matched_rows_are_sorted_by_percent_change_descending() {
        let matches = vec![
            sample_match("Small Riser", 100.0, 105.0, MatchType::Exact),
            sample_match("Big Riser", 100.0, 150.0, MatchType::Exact),
            sample_match("Faller", 100.0, 80.0, MatchType::Contains),
        ];

        let report = render_price_update_report(&matches, &[], 20, "2026-08-30T00:00:00Z");

        let big = report.find("Big Riser").unwrap();
        let small = report.find("Small Riser").unwrap();
        let faller = report.find("Faller").unwrap();
        assert!(big < small && small < faller);
        assert!(report.contains("| +50.0% |"));
        assert!(report.contains("| -20.0% |"));
    }

    #[test]
    fn unmatched_table_is_capped_with_a_trailer() {
        let unmatched: Vec<PriceListItem> = (0..25)
            .map(|i| sample_unmatched(&format!("Item {i}"), "CANS", 100.0))
            .collect();

        let report = render_price_update_report(&[], &unmatched, 20, "2026-08-30T00:00:00Z");

        assert!(report.contains("## Unmatched Price Items (25 items)"));
        assert!(report.contains("... and 5 more items"));
        assert!(report.contains("| Item 19 | CANS | 100 |"));
        assert!(!report.contains("| Item 20 | CANS | 100 |"));
    }

    #[test]
    fn parse_recovers_rendered_unmatched_rows() {
        let unmatched = vec![
            sample_unmatched("Fanta Blackcurrant", "SOFT DRINKS", 120.0),
            sample_unmatched("Nyama Choma Platter", "GRILLED MEATS", 850.0),
        ];

        let report = render_price_update_report(&[], &unmatched, 20, "2026-08-30T00:00:00Z");
        let rows = parse_unmatched_rows(&report).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Fanta Blackcurrant");
        assert_eq!(rows[0].category, "SOFT DRINKS");
        assert_eq!(rows[0].price, "120");
        assert_eq!(rows[1].category, "GRILLED MEATS");
    }

    #[test]
    fn parse_fails_without_an_unmatched_section() {
        let report = render_price_update_report(
            &[sample_match("Only Match", 100.0, 110.0, MatchType::Exact)],
            &[],
            20,
            "2026-08-30T00:00:00Z",
        );

        assert!(parse_unmatched_rows(&report).is_err());
    }

    #[test]
    fn parse_ignores_header_rows() {
        let report = "\
## Unmatched Price Items (1 items)

| Name | Category | Price (KES) |
|------|----------|------------|
| Krest Bitter Lemon | SOFT DRINKS | 130 |
";
        let rows = parse_unmatched_rows(report).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Krest Bitter Lemon");
    }
}
