use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::UpdateMenuArgs;
use crate::model::MenuSnapshot;
use crate::sqlgen::render_menu_update_sql;
use crate::util::{ensure_directory, slugify, title_case, write_text_file};

pub fn run(args: UpdateMenuArgs) -> Result<()> {
    let sql_path = args
        .sql_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("update_menu.sql"));
    let readme_path = args
        .readme_path
        .clone()
        .unwrap_or_else(|| args.out_root.join("MENU_UPDATE_README.md"));

    info!(menu_data = %args.menu_data.display(), "starting menu rebuild");

    let raw = fs::read(&args.menu_data)
        .with_context(|| format!("failed to read {}", args.menu_data.display()))?;
    let snapshot: MenuSnapshot = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.menu_data.display()))?;

    info!(
        categories = snapshot.categories.len(),
        products = snapshot.products.len(),
        "loaded menu snapshot"
    );

    let sql = render_menu_update_sql(&snapshot);
    write_text_file(&sql_path, &sql)?;
    info!(path = %sql_path.display(), "wrote menu update script");

    if args.skip_images {
        info!("skipping image directory scaffolding");
    } else {
        scaffold_image_directories(&args, &snapshot)?;
    }

    let readme = render_readme(&snapshot);
    write_text_file(&readme_path, &readme)?;
    info!(path = %readme_path.display(), "wrote menu update readme");

    Ok(())
}

fn scaffold_image_directories(args: &UpdateMenuArgs, snapshot: &MenuSnapshot) -> Result<()> {
    let products_root = args.public_root.join("images").join("products");

    for category in &snapshot.categories {
        let slug = slugify(&category.name);
        let category_dir = products_root.join(&slug);
        ensure_directory(&category_dir)?;

        let placeholder = format!(
            "<!-- Placeholder for {slug} products -->\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\" viewBox=\"0 0 200 200\">\n\
             \x20 <rect width=\"200\" height=\"200\" fill=\"#f3f4f6\"/>\n\
             \x20 <text x=\"100\" y=\"100\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"14\" fill=\"#6b7280\">\n\
             \x20   {}\n\
             \x20 </text>\n\
             </svg>\n",
            title_case(&slug.replace('-', " ")),
        );
        write_text_file(&category_dir.join("placeholder.svg"), &placeholder)?;
    }

    info!(
        path = %products_root.display(),
        categories = snapshot.categories.len(),
        "created image directories"
    );

    Ok(())
}

fn render_readme(snapshot: &MenuSnapshot) -> String {
    let mut directories = String::new();
    for category in &snapshot.categories {
        directories.push_str(&format!("- {}/\n", slugify(&category.name)));
    }

    format!(
        "# Menu Update - Product Images Setup\n\
         \n\
         ## Overview\n\
         This update rebuilds the menu data from the products export and sets up image handling.\n\
         \n\
         ## What was updated:\n\
         \n\
         ### 1. Database Structure\n\
         - Added {} product categories\n\
         - Added {} products with proper pricing and descriptions\n\
         - Each product has an image_url field for future image uploads\n\
         \n\
         ### 2. Image Directory Structure\n\
         Created `/public/images/products/` with subdirectories for each category:\n\
         {directories}\
         \n\
         ### 3. How to add product images:\n\
         \n\
         1. **Naming Convention**:\n\
         \x20  - File format: JPG or PNG\n\
         \x20  - Name format: `product-name-lowercase-with-dashes.jpg`\n\
         \x20  - Example: \"Tusker Lager\" -> `tusker-lager.jpg`\n\
         \n\
         2. **Directory Structure**:\n\
         \x20  - Place images in `/public/images/products/{{category}}/`\n\
         \n\
         3. **Image Specifications**:\n\
         \x20  - Recommended size: 400x400px (square)\n\
         \x20  - File size: Under 500KB for optimal loading\n\
         \n\
         ### 4. Database Update Instructions:\n\
         Run the generated SQL script against the PostgreSQL database:\n\
         ```sql\n\
         psql -d your_database_name -f update_menu.sql\n\
         ```\n\
         \n\
         ## Notes:\n\
         - All products are set as available by default\n\
         - Pricing is in KES (Kenyan Shillings)\n\
         - Preparation times are estimated and can be adjusted\n\
         - Image URLs are pre-configured but actual images need to be uploaded\n",
        snapshot.categories.len(),
        snapshot.products.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MENU_JSON: &str = r#"{
        "categories": [
            {"name": "Beer", "description": "Beers", "display_order": 1},
            {"name": "Soft Drinks", "description": "Sodas", "display_order": 2}
        ],
        "products": [
            {
                "name": "Tusker Lager",
                "description": "Flagship lager",
                "category": "Beer",
                "price": 250,
                "cost": 150,
                "preparation_time": 2
            }
        ]
    }"#;

    fn write_menu(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("menu_update_data.json");
        fs::write(&path, MENU_JSON).unwrap();
        path
    }

    #[test]
    fn writes_sql_readme_and_image_scaffolding() {
        let dir = tempfile::tempdir().unwrap();
        let menu_data = write_menu(dir.path());
        let out_root = dir.path().join("out");
        let public_root = dir.path().join("public");

        run(UpdateMenuArgs {
            menu_data,
            out_root: out_root.clone(),
            public_root: public_root.clone(),
            sql_path: None,
            readme_path: None,
            skip_images: false,
        })
        .unwrap();

        let sql = fs::read_to_string(out_root.join("update_menu.sql")).unwrap();
        assert!(sql.contains("VALUES (1, 'Beer', 'Beers', true, 1, NOW(), NOW());"));
        assert!(sql.contains("'/images/products/beer/tusker-lager.jpg'"));

        let placeholder = public_root
            .join("images")
            .join("products")
            .join("soft-drinks")
            .join("placeholder.svg");
        let svg = fs::read_to_string(placeholder).unwrap();
        assert!(svg.contains("Soft Drinks"));

        let readme = fs::read_to_string(out_root.join("MENU_UPDATE_README.md")).unwrap();
        assert!(readme.contains("- Added 2 product categories"));
        assert!(readme.contains("- Added 1 products"));
        assert!(readme.contains("- soft-drinks/"));
    }

    #[test]
    fn skip_images_leaves_public_root_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let menu_data = write_menu(dir.path());
        let public_root = dir.path().join("public");

        run(UpdateMenuArgs {
            menu_data,
            out_root: dir.path().join("out"),
            public_root: public_root.clone(),
            sql_path: None,
            readme_path: None,
            skip_images: true,
        })
        .unwrap();

        assert!(!public_root.exists());
    }
}
