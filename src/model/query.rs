//! Client-side filtering and pagination over fetched collections
//!
//! Nothing here talks to the backend: views always hold the full collection
//! and derive what they show from it.

use std::ops::Range;

/// Number of dataset samples shown per page
pub const SAMPLES_PER_PAGE: usize = 5;

/// Case-insensitive substring test. `needle_lower` must already be lowercased.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Keep the items for which `matches` accepts the lowercased query.
///
/// An empty query returns every item in the original order.
pub fn filter_items<'a, T, F>(items: &'a [T], query: &str, matches: F) -> Vec<&'a T>
where
    F: Fn(&T, &str) -> bool,
{
    if query.is_empty() {
        return items.iter().collect();
    }
    let needle = query.to_lowercase();
    items.iter().filter(|item| matches(item, &needle)).collect()
}

/// Fixed-size, 1-based page cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page_size: usize,
    pub current_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(SAMPLES_PER_PAGE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Index of the first item on the current page
    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    /// Slice bounds of the current page, clipped to `total`
    pub fn page_range(&self, total: usize) -> Range<usize> {
        let start = self.start_index().min(total);
        let end = (self.start_index() + self.page_size).min(total);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.current_page < self.total_pages(total)
    }

    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.current_page += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.has_previous() {
            self.current_page -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Vec<String> {
        ["Alpha", "beta", "GAMMA", "alphabet"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let items = words();
        let filtered = filter_items(&items, "", |w, q| contains_ci(w, q));
        assert_eq!(filtered.len(), items.len());
        assert!(filtered.iter().zip(items.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let items = words();
        let filtered = filter_items(&items, "ALPHA", |w, q| contains_ci(w, q));
        assert_eq!(filtered, vec!["Alpha", "alphabet"]);

        let filtered = filter_items(&items, "amm", |w, q| contains_ci(w, q));
        assert_eq!(filtered, vec!["GAMMA"]);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        let pager = Pager::new(5);
        assert_eq!(pager.total_pages(0), 0);
        assert_eq!(pager.total_pages(1), 1);
        assert_eq!(pager.total_pages(5), 1);
        assert_eq!(pager.total_pages(6), 2);
        assert_eq!(pager.total_pages(12), 3);
    }

    #[test]
    fn test_first_page_starts_at_zero() {
        let pager = Pager::new(5);
        assert_eq!(pager.start_index(), 0);
        assert_eq!(pager.page_range(12), 0..5);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut pager = Pager::new(5);
        let total = 12;

        assert!(!pager.has_previous());
        assert!(pager.has_next(total));

        pager.next(total);
        pager.next(total);
        assert_eq!(pager.current_page, 3);
        assert_eq!(pager.page_range(total), 10..12);
        assert!(!pager.has_next(total));
        assert!(pager.has_previous());

        // Disabled controls are no-ops
        pager.next(total);
        assert_eq!(pager.current_page, 3);

        pager.previous();
        pager.previous();
        pager.previous();
        assert_eq!(pager.current_page, 1);
    }

    #[test]
    fn test_range_clipped_when_collection_shrinks() {
        let mut pager = Pager::new(5);
        pager.next(20);
        pager.next(20);
        assert_eq!(pager.page_range(3), 3..3);
        pager.reset();
        assert_eq!(pager.page_range(3), 0..3);
    }
}
