use crate::util::title_case;

/// Canned descriptions for categories we know show up on price sheets.
/// Lookup key is the category name with spaces/dashes folded to
/// underscores and uppercased.
const CATEGORY_DESCRIPTIONS: &[(&str, &str)] = &[
    ("BEER", "Alcoholic beer beverages"),
    ("CIDERS", "Cider and flavored alcoholic beverages"),
    ("CANS", "Canned beverages and drinks"),
    ("WHISKEY", "Whiskey and whisky spirits"),
    ("BRANDY", "Brandy spirits and cognac"),
    ("GIN", "Gin spirits and juniper-based drinks"),
    ("VODKA", "Vodka spirits and neutral grain spirits"),
    ("RUM", "Rum spirits and sugar-based spirits"),
    ("WINE", "Wine and grape-based alcoholic beverages"),
    ("SPIRITS", "Mixed spirits and liqueurs"),
    ("COCKTAILS", "Pre-mixed cocktails and specialty drinks"),
    ("SOFT_DRINKS", "Non-alcoholic soft drinks"),
    ("JUICES", "Fruit juices and natural beverages"),
    ("WATER", "Water and hydration beverages"),
    ("HOT_DRINKS", "Coffee, tea, and hot beverages"),
    ("SNACKS", "Light snacks and appetizers"),
    ("APPETIZERS", "Starter dishes and small plates"),
    ("MAIN_COURSE", "Main dishes and entrees"),
    ("DESSERTS", "Sweet desserts and treats"),
    ("BREAKFAST", "Breakfast items and morning dishes"),
    ("SIDES", "Side dishes and accompaniments"),
    ("SOUPS", "Soups and liquid dishes"),
    ("SALADS", "Fresh salads and vegetable dishes"),
];

/// Category ids as they exist in the production `categories` table after
/// the category creation script has run.
const CATEGORY_IDS: &[(&str, u32)] = &[
    ("BEER", 1),
    ("CIDERS", 2),
    ("WHISKEY", 3),
    ("GIN", 4),
    ("VODKA", 5),
    ("RUM", 6),
    ("BRANDY", 7),
    ("TEQUILA", 8),
    ("WINES", 9),
    ("LIQUEURS", 10),
    ("SOFT_DRINKS", 11),
    ("JUICES", 12),
    ("ENERGY_DRINKS", 13),
    ("MAIN_DISHES", 14),
    ("GRILLED_MEATS", 15),
    ("FISH", 16),
    ("CHICKEN", 17),
    ("PORK", 18),
    ("VEGETARIAN", 19),
    ("SNACKS", 20),
    ("BREAKFAST", 21),
    ("SOUPS", 22),
    ("BURGERS", 23),
    ("SERVICES", 24),
    ("CANS", 25),
    // Spellings price sheets use for the same rows.
    ("CAN", 25),
    ("CIDER", 2),
    ("WINE", 9),
    ("SPIRITS", 10),
    ("SOFT DRINKS", 11),
    ("ENERGY DRINKS", 13),
];

/// Catch-all for categories the id table does not know.
pub const FALLBACK_CATEGORY_ID: u32 = 20;
pub const FALLBACK_CATEGORY_NAME: &str = "SNACKS";

pub fn clean_category_key(category: &str) -> String {
    category.replace([' ', '-'], "_").to_uppercase()
}

pub fn category_description(category: &str) -> String {
    let key = clean_category_key(category);
    CATEGORY_DESCRIPTIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, description)| (*description).to_string())
        .unwrap_or_else(|| format!("{} category items", title_case(category)))
}

pub fn category_id(category: &str) -> Option<u32> {
    CATEGORY_IDS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_have_canned_descriptions() {
        assert_eq!(category_description("BEER"), "Alcoholic beer beverages");
        assert_eq!(
            category_description("SOFT DRINKS"),
            "Non-alcoholic soft drinks"
        );
        assert_eq!(
            category_description("soft-drinks"),
            "Non-alcoholic soft drinks"
        );
    }

    #[test]
    fn unknown_categories_get_a_generic_description() {
        assert_eq!(
            category_description("NYAMA CHOMA"),
            "Nyama Choma category items"
        );
    }

    #[test]
    fn alias_spellings_map_to_the_same_id() {
        assert_eq!(category_id("CANS"), Some(25));
        assert_eq!(category_id("CAN"), Some(25));
        assert_eq!(category_id("WINE"), Some(9));
        assert_eq!(category_id("WINES"), Some(9));
        assert_eq!(category_id("SPIRITS"), Some(10));
    }

    #[test]
    fn unknown_categories_have_no_id() {
        assert_eq!(category_id("NYAMA CHOMA"), None);
    }
}
