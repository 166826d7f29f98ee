use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default window size when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u64 = 20;
/// Upper bound on the window size; larger requests are clamped.
pub const MAX_PER_PAGE: u64 = 100;

/// A 1-indexed pagination request.
///
/// By default an out-of-range page yields an empty page; `strict`
/// turns that into an error instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PageRequest {
    /// Page number, 1-indexed
    pub page: u64,
    /// Items per page
    pub per_page: u64,
    /// Error on out-of-range pages instead of returning an empty page
    pub strict: bool,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            strict: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One window of a sorted listing plus the navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Items in this window
    pub items: Vec<T>,
    /// Page number that was served, 1-indexed
    pub page: u64,
    /// Window size used
    pub per_page: u64,
    /// Total items across all pages
    pub total_items: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether a later page exists
    pub has_next: bool,
    /// Whether an earlier page exists
    pub has_prev: bool,
    /// Next page number, when one exists
    pub next_page: Option<u64>,
    /// Previous page number, when one exists
    pub prev_page: Option<u64>,
}

impl<T> Page<T> {
    /// An empty window for a request past the end of the listing.
    pub fn empty(req: &PageRequest, total_items: u64, total_pages: u64) -> Self {
        let has_prev = req.page > 1 && total_pages > 0;
        Self {
            items: Vec::new(),
            page: req.page,
            per_page: req.per_page,
            total_items,
            total_pages,
            has_next: false,
            has_prev,
            next_page: None,
            prev_page: has_prev.then(|| req.page.saturating_sub(1).min(total_pages)),
        }
    }

    pub fn new(items: Vec<T>, req: &PageRequest, total_items: u64, total_pages: u64) -> Self {
        let has_next = req.page < total_pages;
        let has_prev = req.page > 1;
        Self {
            items,
            page: req.page,
            per_page: req.per_page,
            total_items,
            total_pages,
            has_next,
            has_prev,
            next_page: has_next.then(|| req.page + 1),
            prev_page: has_prev.then(|| req.page - 1),
        }
    }

    /// Re-shape the items while keeping the window metadata intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
            next_page: self.next_page,
            prev_page: self.prev_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(PageRequest::new(1, 0).per_page, 1);
        assert_eq!(PageRequest::new(1, 50).per_page, 50);
        assert_eq!(PageRequest::new(1, 10_000).per_page, MAX_PER_PAGE);
    }

    #[test]
    fn navigation_metadata() {
        let req = PageRequest::new(2, 10);
        let page = Page::new(vec![1, 2, 3], &req, 23, 3);
        assert!(page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.next_page, Some(3));
        assert_eq!(page.prev_page, Some(1));
    }

    #[test]
    fn empty_window_past_the_end() {
        let req = PageRequest::new(9, 10);
        let page: Page<i32> = Page::empty(&req, 23, 3);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(page.has_prev);
        // prev is clamped back to the last real page
        assert_eq!(page.prev_page, Some(3));
    }

    #[test]
    fn page_serializes_with_metadata() {
        let req = PageRequest::new(1, 10);
        let page = Page::new(vec!["a"], &req, 1, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0], "a");
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["has_next"], false);
    }
}
