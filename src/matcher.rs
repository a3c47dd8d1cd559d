use std::collections::HashSet;

use serde::Serialize;

use crate::model::{CatalogProduct, PriceListItem};

/// Minimum confidence for a best candidate to count as a match.
const ACCEPT_THRESHOLD: f64 = 0.4;

/// Word-overlap candidates below this score are not considered at all.
const WORD_OVERLAP_THRESHOLD: f64 = 0.5;

/// Abbreviation-to-canonical substitutions applied during normalization.
/// Keys are matched as substrings of the normalized name, in table order,
/// cumulatively on the evolving string. Grown from real price sheets; the
/// misspellings are ones suppliers actually produce.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("whitecap", "white cap"),
    ("pilsner lager", "pilsner"),
    ("j w black", "johnnie walker black label"),
    ("jwred", "johnnie walker red label"),
    ("jw black", "johnnie walker black label"),
    ("jw red", "johnnie walker red label"),
    ("jw gold reserve", "johnnie walker gold reserve"),
    ("jw green", "johnnie walker green label"),
    ("jw platinum", "johnnie walker platinum"),
    ("jw blue label", "johnnie walker blue label"),
    ("jw double black", "johnnie walker double black"),
    ("gilbeys", "gilbeys gin"),
    ("gordons", "gordons gin"),
    ("smirnoff", "smirnoff vodka"),
    ("captn morgan", "captain morgan"),
    ("camino gold", "camino real gold"),
    ("camino silver", "camino real silver"),
    ("viceroy", "viceroy brandy"),
    ("richot", "richot brandy"),
    ("cellar cask red", "drostdy hof red"),
    ("cellar cask white", "drostdy hof white"),
    ("4th street red", "fourth street red"),
    ("4th street white", "fourth street white"),
    ("drostyhof", "drostdy hof"),
    ("drostoff", "drostdy hof"),
    ("baieys", "baileys"),
    ("baleys", "baileys"),
    ("jagermeister", "jägermeister"),
];

/// Immutable alias configuration handed to the normalizer.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string())),
        )
    }

    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

/// Canonical form of a product name for comparison: lowercase, collapsed
/// whitespace, then every alias whose key occurs substituted in.
pub fn normalize_name(name: &str, aliases: &AliasTable) -> String {
    let lowered = name.to_lowercase();
    let mut normalized = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    for (alias, canonical) in &aliases.entries {
        if normalized.contains(alias.as_str()) {
            normalized = normalized.replace(alias.as_str(), canonical);
        }
    }

    normalized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Contains,
    Words,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Words => "words",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductMatch {
    pub item: PriceListItem,
    pub product: CatalogProduct,
    pub match_type: MatchType,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matches: Vec<ProductMatch>,
    pub unmatched: Vec<PriceListItem>,
}

/// Pairs each price item with at most one catalog product. Every input item
/// lands in exactly one of `matches` / `unmatched`.
///
/// Candidates are scored in three tiers: exact normalized equality (1.0,
/// stops the scan for that item), substring containment (shorter length /
/// longer length), and word overlap (shared words / larger word count,
/// only above 0.5). A later candidate must score strictly higher to
/// replace the current best, so catalog order breaks ties.
pub fn match_products(
    items: &[PriceListItem],
    catalog: &[CatalogProduct],
    aliases: &AliasTable,
) -> MatchOutcome {
    let catalog_normalized: Vec<String> = catalog
        .iter()
        .map(|product| normalize_name(&product.name, aliases))
        .collect();

    let mut outcome = MatchOutcome::default();

    for item in items {
        let item_norm = normalize_name(&item.name, aliases);
        if item_norm.is_empty() {
            outcome.unmatched.push(item.clone());
            continue;
        }

        let mut best: Option<(&CatalogProduct, MatchType)> = None;
        let mut best_score = 0.0_f64;

        for (product, product_norm) in catalog.iter().zip(&catalog_normalized) {
            if item_norm == *product_norm {
                best = Some((product, MatchType::Exact));
                best_score = 1.0;
                break;
            }

            if item_norm.contains(product_norm.as_str())
                || product_norm.contains(item_norm.as_str())
            {
                let score = length_ratio(&item_norm, product_norm);
                if score > best_score {
                    best = Some((product, MatchType::Contains));
                    best_score = score;
                }
            } else {
                let score = word_overlap_score(&item_norm, product_norm);
                if score > WORD_OVERLAP_THRESHOLD && score > best_score {
                    best = Some((product, MatchType::Words));
                    best_score = score;
                }
            }
        }

        match best {
            Some((product, match_type)) if best_score > ACCEPT_THRESHOLD => {
                outcome.matches.push(ProductMatch {
                    item: item.clone(),
                    product: product.clone(),
                    match_type,
                    score: best_score,
                });
            }
            _ => outcome.unmatched.push(item.clone()),
        }
    }

    outcome
}

fn length_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longer = len_a.max(len_b);
    if longer == 0 {
        return 0.0;
    }
    len_a.min(len_b) as f64 / longer as f64
}

fn word_overlap_score(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let common = words_a.intersection(&words_b).count();
    if common == 0 {
        return 0.0;
    }

    common as f64 / words_a.len().max(words_b.len()) as f64
}

/// Percent change from `old` to `new`; defined as 0 when the old price is
/// not positive.
pub fn percent_change(old: f64, new: f64) -> f64 {
    if old > 0.0 {
        (new - old) / old * 100.0
    } else {
        0.0
    }
}
