pub mod create_categories;
pub mod create_products;
pub mod extract_products;
pub mod status;
pub mod update_menu;
pub mod update_prices;
