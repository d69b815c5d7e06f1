//! Domain Ordering Module
//!
//! Pure helpers imposing the fixed display order on category collections.
//! No I/O; the sort is stable and deterministic for a given input.

use std::collections::HashMap;

// == Display Order Reference ==
/// Fixed presentation order for catalog categories.
pub const CATEGORY_DISPLAY_ORDER: [&str; 14] = [
    "Filters & Filtration Systems",
    "Pumps",
    "Air Blower",
    "Pool Cleaning Equipment",
    "Pool Cleaning Robots",
    "Pool Dis-Infection System",
    "Pool Fittings and Cleaners",
    "Lighting",
    "Heat Pump & Chill Pump",
    "Wellness",
    "Pool Cover",
    "Stainless Steel",
    "Acrylic Pool",
    "Fountain Nozzle",
];

// == Display Ordered Trait ==
/// Anything sortable by the custom display order.
pub trait DisplayOrdered {
    fn display_name(&self) -> Option<&str>;
    fn display_slug(&self) -> Option<&str>;
}

// == Normalization ==
/// Normalizes a label for order matching: lowercase, with runs of
/// whitespace, hyphens and ampersands collapsed to single spaces, trimmed.
pub(crate) fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '&' {
            pending_separator = true;
        } else {
            if pending_separator && !out.is_empty() {
                out.push(' ');
            }
            pending_separator = false;
            out.push(ch);
        }
    }

    out
}

// == Custom Order Sort ==
/// Sorts items by their rank in `order`, matching the normalized name
/// first and the slug when the name does not match. Items absent from the
/// reference list sort after all matched items, alphabetically by
/// normalized name (falling back to slug).
///
/// The result is a deterministic total order: applying the sort to its own
/// output yields the same sequence.
pub fn sort_by_custom_order<T: DisplayOrdered>(mut items: Vec<T>, order: &[&str]) -> Vec<T> {
    let ranks: HashMap<String, usize> = order
        .iter()
        .enumerate()
        .map(|(rank, name)| (normalize(name), rank))
        .collect();

    items.sort_by(|a, b| sort_key(a, &ranks).cmp(&sort_key(b, &ranks)));
    items
}

fn sort_key<T: DisplayOrdered>(item: &T, ranks: &HashMap<String, usize>) -> (usize, String) {
    let name = item
        .display_name()
        .map(normalize)
        .filter(|key| !key.is_empty());
    let slug = item
        .display_slug()
        .map(normalize)
        .filter(|key| !key.is_empty());

    let rank = name
        .as_deref()
        .and_then(|key| ranks.get(key))
        .or_else(|| slug.as_deref().and_then(|key| ranks.get(key)))
        .copied()
        .unwrap_or(usize::MAX);

    let alphabetical = name.or(slug).unwrap_or_default();
    (rank, alphabetical)
}
