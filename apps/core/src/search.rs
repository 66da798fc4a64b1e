use crate::model::{normalize_for_search, SearchResult};

/// Stable substring filter over title and description.
///
/// Blank queries match nothing. Results keep the catalog's relative order.
pub fn search(items: &[SearchResult], query: &str) -> Vec<SearchResult> {
    if items.is_empty() || query.trim().is_empty() {
        return Vec::new();
    }

    let normalized_query = normalize_for_search(query);
    items
        .iter()
        .filter(|item| matches_item(item, &normalized_query))
        .cloned()
        .collect()
}

pub fn matches_item(item: &SearchResult, normalized_query: &str) -> bool {
    item.normalized_title().contains(normalized_query)
        || item.normalized_description().contains(normalized_query)
}
