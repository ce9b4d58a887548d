//! Page arithmetic and the compressed page-number range shown by navigation controls.

use shared::domain::PageEntry;

/// Above this many pages the range collapses gaps into ellipsis markers.
pub const MAX_UNCOLLAPSED_PAGES: usize = 7;

pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    item_count.div_ceil(page_size)
}

/// Items visible on the 1-based `page`; empty when the page lies outside the list.
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Near either edge the first or last four pages are shown; elsewhere a
/// three-wide window around `current`, always flanked by the first and last page.
pub fn generate_pagination(current: usize, total: usize) -> Vec<PageEntry> {
    use PageEntry::{Ellipsis, Page};

    if total <= MAX_UNCOLLAPSED_PAGES {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        return vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total)];
    }
    if current >= total - 2 {
        return vec![
            Page(1),
            Ellipsis,
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ];
    }
    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
