//! Generic list pagination.
//!
//! Pages are 1-based. A page past the end clamps to the last page and a page
//! size of zero is treated as one, so callers always get a renderable page.

use serde::{Deserialize, Serialize};

/// One page of items plus the numbers needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub page_numbers: Vec<usize>,
    pub is_first: bool,
    pub is_last: bool,
}

/// Query parameters accepted by paginated endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageQuery {
    /// Resolve against a default and an upper bound for the page size.
    pub fn resolve(&self, default_size: usize, max_size: usize) -> (usize, usize) {
        let size = self.page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        (self.page.unwrap_or(1), size)
    }
}

/// Slice `items` into the requested page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
        page_numbers: (1..=total_pages).collect(),
        is_first: page == 1,
        is_last: page == total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 2, 10);

        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_numbers, vec![1, 2, 3]);
        assert!(!page.is_first);
        assert!(!page.is_last);
    }

    #[test]
    fn test_last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(page.is_last);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let items = vec!["a", "b", "c"];
        let page = paginate(&items, 9, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, vec!["c"]);

        let page = paginate(&items, 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec!["a"]);
    }

    #[test]
    fn test_empty_list() {
        let items: Vec<u8> = vec![];
        let page = paginate(&items, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(page.is_first && page.is_last);
    }

    #[test]
    fn test_query_resolve() {
        let query = PageQuery {
            page: Some(3),
            page_size: Some(500),
        };
        assert_eq!(query.resolve(10, 100), (3, 100));
        assert_eq!(PageQuery::default().resolve(10, 100), (1, 10));
    }
}
