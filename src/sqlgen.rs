use crate::matcher::{ProductMatch, percent_change};
use crate::model::MenuSnapshot;
use crate::util::slugify;

/// Doubles embedded single quotes for SQL string literals.
pub fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

/// Transactional price update script: snapshot of the old prices into a
/// temp table, one commented UPDATE per matched product, then
/// verification SELECTs.
pub fn render_price_update_sql(matches: &[ProductMatch]) -> String {
    let product_names = matches
        .iter()
        .map(|matched| format!("'{}'", escape_sql(&matched.product.name)))
        .collect::<Vec<_>>()
        .join(",");

    let mut sql = format!(
        "-- Price Update Script\n\
         -- Generated from price list text file\n\
         -- Updates product prices based on current market rates\n\
         \n\
         BEGIN;\n\
         \n\
         -- Record original prices for reference\n\
         CREATE TEMP TABLE original_prices AS\n\
         SELECT id, name, price as old_price\n\
         FROM products\n\
         WHERE name IN ({product_names});\n\
         \n"
    );

    for matched in matches {
        let old_price = matched.product.price;
        let new_price = matched.item.price;
        let change = percent_change(old_price, new_price);

        sql.push_str(&format!(
            "-- Update: {} (Match type: {})\n\
             -- Price: KES {} → KES {} ({:+.1}%)\n\
             UPDATE products\n\
             SET price = {},\n\
             \x20   updated_at = NOW()\n\
             WHERE name = '{}';\n\
             \n",
            matched.product.name,
            matched.match_type.as_str(),
            old_price,
            new_price,
            change,
            new_price,
            escape_sql(&matched.product.name),
        ));
    }

    sql.push_str(
        "-- Show updated prices\n\
         SELECT\n\
         \x20   p.id,\n\
         \x20   p.name,\n\
         \x20   op.old_price,\n\
         \x20   p.price as new_price,\n\
         \x20   ROUND(((p.price - op.old_price) / op.old_price * 100)::numeric, 1) as price_change_percent\n\
         FROM products p\n\
         JOIN original_prices op ON p.id = op.id\n\
         ORDER BY price_change_percent DESC;\n\
         \n\
         COMMIT;\n\
         \n\
         -- Final verification\n\
         SELECT COUNT(*) as updated_products FROM products WHERE updated_at > NOW() - INTERVAL '1 minute';\n",
    );

    sql
}

/// Category to insert along with its canned description.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

pub fn render_category_creation_sql(categories: &[NewCategory], generated_at: &str) -> String {
    let mut inserts = String::new();
    for (index, category) in categories.iter().enumerate() {
        inserts.push_str(&format!(
            "\n-- Create category: {}\n\
             INSERT INTO categories (name, description, is_active, display_order, created_at, updated_at)\n\
             VALUES ('{}', '{}', true, {}, NOW(), NOW())\n\
             ON CONFLICT (name) DO NOTHING;\n",
            category.name,
            escape_sql(&category.name),
            escape_sql(&category.description),
            index + 1,
        ));
    }

    format!(
        "-- Category Creation Script\n\
         -- Generated automatically from price update report\n\
         -- Date: {generated_at}\n\
         \n\
         -- Note: This script creates categories that were found in the unmatched items\n\
         -- from the price update but don't exist in the current database.\n\
         \n\
         BEGIN;\n\
         \n\
         -- Ensure the categories table has the proper structure\n\
         DO $$\n\
         BEGIN\n\
         \x20   IF NOT EXISTS (SELECT FROM pg_tables WHERE schemaname = 'public' AND tablename = 'categories') THEN\n\
         \x20       CREATE TABLE categories (\n\
         \x20           id SERIAL PRIMARY KEY,\n\
         \x20           name VARCHAR(255) UNIQUE NOT NULL,\n\
         \x20           description TEXT,\n\
         \x20           is_active BOOLEAN DEFAULT true,\n\
         \x20           display_order INTEGER DEFAULT 0,\n\
         \x20           created_at TIMESTAMP DEFAULT NOW(),\n\
         \x20           updated_at TIMESTAMP DEFAULT NOW()\n\
         \x20       );\n\
         \n\
         \x20       CREATE INDEX idx_categories_active ON categories (is_active);\n\
         \x20       CREATE INDEX idx_categories_display_order ON categories (display_order);\n\
         \x20   END IF;\n\
         END $$;\n\
         {inserts}\n\
         -- Update display orders to ensure proper ordering\n\
         UPDATE categories\n\
         SET display_order = subq.new_order\n\
         FROM (\n\
         \x20   SELECT id, ROW_NUMBER() OVER (ORDER BY name) as new_order\n\
         \x20   FROM categories\n\
         ) subq\n\
         WHERE categories.id = subq.id;\n\
         \n\
         COMMIT;\n\
         \n\
         -- Verification: List all categories\n\
         SELECT id, name, description, is_active, display_order, created_at\n\
         FROM categories\n\
         ORDER BY display_order, name;\n"
    )
}

/// Product insert prepared by the command layer.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub cost: f64,
}

/// Products grouped under a resolved category id.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub heading: String,
    pub category_id: u32,
    pub products: Vec<NewProduct>,
}

pub fn render_product_creation_sql(groups: &[ProductGroup], generated_at: &str) -> String {
    let mut statements = String::new();

    for group in groups {
        statements.push_str(&format!("\n-- {}\n", group.heading));

        for product in &group.products {
            let name = escape_sql(&product.name);
            statements.push_str(&format!(
                "\nINSERT INTO products (\n\
                 \x20   name,\n\
                 \x20   category_id,\n\
                 \x20   price,\n\
                 \x20   cost,\n\
                 \x20   description,\n\
                 \x20   is_available,\n\
                 \x20   is_active,\n\
                 \x20   preparation_time,\n\
                 \x20   created_at,\n\
                 \x20   updated_at\n\
                 )\n\
                 SELECT\n\
                 \x20   '{name}',\n\
                 \x20   {},\n\
                 \x20   {},\n\
                 \x20   {},\n\
                 \x20   '{}',\n\
                 \x20   true,\n\
                 \x20   true,\n\
                 \x20   5,\n\
                 \x20   NOW(),\n\
                 \x20   NOW()\n\
                 WHERE NOT EXISTS (\n\
                 \x20   SELECT 1 FROM products\n\
                 \x20   WHERE UPPER(name) = UPPER('{name}')\n\
                 \x20   AND category_id = {}\n\
                 );\n",
                group.category_id,
                product.price,
                product.cost,
                escape_sql(&product.description),
                group.category_id,
            ));
        }
    }

    format!(
        "-- Product Creation Script\n\
         -- Generated automatically from price update report unmatched items\n\
         -- Date: {generated_at}\n\
         \n\
         -- Note: This script creates products that were unmatched in the price update\n\
         -- All products are created with estimated costs\n\
         -- Products are assigned to appropriate categories based on their category field\n\
         \n\
         BEGIN;\n\
         {statements}\n\
         COMMIT;\n\
         \n\
         -- Verification: Count products by category\n\
         SELECT\n\
         \x20   c.name as category_name,\n\
         \x20   COUNT(p.id) as product_count,\n\
         \x20   MIN(p.price) as min_price,\n\
         \x20   MAX(p.price) as max_price,\n\
         \x20   AVG(p.price) as avg_price\n\
         FROM categories c\n\
         LEFT JOIN products p ON c.id = p.category_id AND p.is_active = true\n\
         GROUP BY c.id, c.name\n\
         ORDER BY c.display_order;\n"
    )
}

/// Destructive full-menu rebuild from a snapshot. Clears both tables,
/// reinserts with stable ids, and restarts the sequences past the new
/// high-water mark.
pub fn render_menu_update_sql(snapshot: &MenuSnapshot) -> String {
    let mut sql = String::from(
        "-- Menu Update Script\n\
         -- Generated from products export PDF\n\
         \n\
         -- Clear existing data (be careful in production!)\n\
         DELETE FROM products WHERE id > 0;\n\
         DELETE FROM categories WHERE id > 0;\n\
         \n\
         -- Reset sequences\n\
         ALTER SEQUENCE categories_id_seq RESTART WITH 1;\n\
         ALTER SEQUENCE products_id_seq RESTART WITH 1;\n\
         \n\
         -- Insert categories\n",
    );

    for (index, category) in snapshot.categories.iter().enumerate() {
        sql.push_str(&format!(
            "INSERT INTO categories (id, name, description, is_active, display_order, created_at, updated_at)\n\
             VALUES ({}, '{}', '{}', true, {}, NOW(), NOW());\n",
            index + 1,
            escape_sql(&category.name),
            escape_sql(&category.description),
            category.display_order,
        ));
    }

    sql.push_str("\n-- Insert products\n");

    for (index, product) in snapshot.products.iter().enumerate() {
        let category_id = snapshot
            .categories
            .iter()
            .position(|category| category.name == product.category)
            .map(|position| position + 1)
            .unwrap_or(0);

        let image_url = format!(
            "/images/products/{}/{}.jpg",
            slugify(&product.category),
            slugify(&product.name),
        );

        sql.push_str(&format!(
            "INSERT INTO products (id, category_id, name, description, price, cost, is_available, is_active, image_url, preparation_time, created_at, updated_at)\n\
             VALUES ({}, {}, '{}', '{}', {}, {}, true, true, '{}', {}, NOW(), NOW());\n",
            index + 1,
            category_id,
            escape_sql(&product.name),
            escape_sql(&product.description),
            product.price,
            product.cost,
            image_url,
            product.preparation_time,
        ));
    }

    sql.push_str(&format!(
        "\n-- Update sequences to correct values\n\
         ALTER SEQUENCE categories_id_seq RESTART WITH {};\n\
         ALTER SEQUENCE products_id_seq RESTART WITH {};\n\
         \n\
         -- Verify counts\n\
         SELECT 'Categories' as table_name, COUNT(*) as count FROM categories\n\
         UNION ALL\n\
         SELECT 'Products' as table_name, COUNT(*) as count FROM products;\n",
        snapshot.categories.len() + 1,
        snapshot.products.len() + 1,
    ));

    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchType;
    use crate::model::{CatalogProduct, MenuCategory, MenuProduct, PriceListItem};

    #[test]
    fn escape_sql_doubles_single_quotes() {
        assert_eq!(escape_sql("O'Briens Ale"), "O''Briens Ale");
        assert_eq!(escape_sql("plain"), "plain");
    }

    #[test]
    fn price_update_sql_carries_updates_and_transaction() {
        let matches = vec![ProductMatch {
            item: PriceListItem {
                name: "Tusker Lager".to_string(),
                category: "BEER".to_string(),
                price: 300.0,
                alert_quantity: None,
            },
            product: CatalogProduct {
                name: "O'Tusker Lager".to_string(),
                price: 250.0,
            },
            match_type: MatchType::Exact,
            score: 1.0,
        }];

        let sql = render_price_update_sql(&matches);

        assert!(sql.starts_with("-- Price Update Script"));
        assert!(sql.contains("BEGIN;"));
        assert!(sql.contains("COMMIT;"));
        assert!(sql.contains("WHERE name IN ('O''Tusker Lager');"));
        assert!(sql.contains("SET price = 300,"));
        assert!(sql.contains("WHERE name = 'O''Tusker Lager';"));
        assert!(sql.contains("(Match type: exact)"));
        assert!(sql.contains("(+20.0%)"));
    }

    #[test]
    fn category_sql_inserts_in_order_with_conflict_guard() {
        let categories = vec![
            NewCategory {
                name: "BEER".to_string(),
                description: "Alcoholic beer beverages".to_string(),
            },
            NewCategory {
                name: "CANS".to_string(),
                description: "Canned beverages and drinks".to_string(),
            },
        ];

        let sql = render_category_creation_sql(&categories, "2026-08-30T00:00:00Z");

        assert!(sql.contains("VALUES ('BEER', 'Alcoholic beer beverages', true, 1, NOW(), NOW())"));
        assert!(sql.contains("VALUES ('CANS', 'Canned beverages and drinks', true, 2, NOW(), NOW())"));
        assert_eq!(sql.matches("ON CONFLICT (name) DO NOTHING;").count(), 2);
        assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY name)"));
    }

    #[test]
    fn product_sql_guards_against_duplicates() {
        let groups = vec![ProductGroup {
            heading: "CANS products (Category ID: 25)".to_string(),
            category_id: 25,
            products: vec![NewProduct {
                name: "O'Malley Cider Can".to_string(),
                description: "O'Malley Cider Can from Cans category".to_string(),
                price: 350.0,
                cost: 210.0,
            }],
        }];

        let sql = render_product_creation_sql(&groups, "2026-08-30T00:00:00Z");

        assert!(sql.contains("-- CANS products (Category ID: 25)"));
        assert!(sql.contains("'O''Malley Cider Can'"));
        assert!(sql.contains("WHERE UPPER(name) = UPPER('O''Malley Cider Can')"));
        assert!(sql.contains("AND category_id = 25"));
    }

    #[test]
    fn menu_sql_rebuilds_tables_and_restarts_sequences() {
        let snapshot = MenuSnapshot {
            categories: vec![MenuCategory {
                name: "Beer".to_string(),
                description: "Beers".to_string(),
                display_order: 1,
            }],
            products: vec![MenuProduct {
                name: "Tusker Lager".to_string(),
                description: "Flagship lager".to_string(),
                category: "Beer".to_string(),
                price: 250.0,
                cost: 150.0,
                preparation_time: 2,
            }],
        };

        let sql = render_menu_update_sql(&snapshot);

        assert!(sql.contains("DELETE FROM products WHERE id > 0;"));
        assert!(sql.contains("VALUES (1, 'Beer', 'Beers', true, 1, NOW(), NOW());"));
        assert!(sql.contains("'/images/products/beer/tusker-lager.jpg'"));
        assert!(sql.contains("ALTER SEQUENCE categories_id_seq RESTART WITH 2;"));
        assert!(sql.contains("ALTER SEQUENCE products_id_seq RESTART WITH 2;"));
    }
}
