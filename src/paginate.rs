//! Page metadata over the collection read paths
//!
//! Pagination is presentation only: it reuses the same id window as
//! `find` and wraps it with page metadata. Requests are clamped into
//! range rather than rejected, so paginating never fails on its own.

/// Default page size when a request leaves `per_page` unset
pub const DEFAULT_PER_PAGE: usize = 50;

/// A pagination request
///
/// Unset fields fall back to page 1 and [`DEFAULT_PER_PAGE`]. Out-of-range
/// values are clamped: `page` into `[1, total]` (1 when the collection is
/// empty), `per_page` to at least 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: Option<usize>,
    /// Number of items per page
    pub per_page: Option<usize>,
}

impl PageRequest {
    /// Set the page number
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// One page of results plus metadata
///
/// `total_entries` is the real entry count of the collection and
/// `page_count` the number of pages it spans at this page size
/// (`ceil(total_entries / per_page)`, 0 for an empty collection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page, in collection order
    pub items: Vec<T>,
    /// 1-based number of this page (after clamping)
    pub page_number: usize,
    /// Page size used (after clamping)
    pub per_page: usize,
    /// Total number of pages at this page size
    pub page_count: usize,
    /// Total number of entries in the collection
    pub total_entries: usize,
}

impl<T> Page<T> {
    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the items, keeping the metadata (hydration)
    pub(crate) fn map_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            page_number: self.page_number,
            per_page: self.per_page,
            page_count: self.page_count,
            total_entries: self.total_entries,
        }
    }
}

/// Resolved window for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub page: usize,
    pub per_page: usize,
    pub offset: usize,
    pub page_count: usize,
}

/// Clamp a request against the collection size and compute its window
///
/// Arithmetic is overflow-safe for any `per_page`: the page count is
/// computed without the `+ per_page - 1` trick and the offset saturates,
/// which the read path then clamps to the collection size.
pub(crate) fn resolve(request: &PageRequest, total_entries: usize) -> PageWindow {
    let per_page = request.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let page = request.page.unwrap_or(1).clamp(1, total_entries.max(1));
    let page_count = if total_entries == 0 {
        0
    } else {
        (total_entries - 1) / per_page + 1
    };
    PageWindow {
        page,
        per_page,
        offset: (page - 1).saturating_mul(per_page),
        page_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let w = resolve(&PageRequest::default(), 120);
        assert_eq!(w.page, 1);
        assert_eq!(w.per_page, DEFAULT_PER_PAGE);
        assert_eq!(w.offset, 0);
        assert_eq!(w.page_count, 3);
    }

    #[test]
    fn test_offset_of_later_page() {
        let w = resolve(&PageRequest::default().with_page(3).with_per_page(10), 45);
        assert_eq!(w.offset, 20);
        assert_eq!(w.page_count, 5);
    }

    #[test]
    fn test_page_count_exact_division() {
        let w = resolve(&PageRequest::default().with_per_page(10), 40);
        assert_eq!(w.page_count, 4);
    }

    #[test]
    fn test_page_clamped_low() {
        let w = resolve(&PageRequest::default().with_page(0), 10);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_page_clamped_high() {
        let w = resolve(&PageRequest::default().with_page(99).with_per_page(2), 5);
        assert_eq!(w.page, 5);
        assert_eq!(w.offset, 8);
    }

    #[test]
    fn test_per_page_clamped_to_one() {
        let w = resolve(&PageRequest::default().with_per_page(0), 5);
        assert_eq!(w.per_page, 1);
        assert_eq!(w.page_count, 5);
    }

    #[test]
    fn test_huge_per_page_does_not_overflow() {
        let w = resolve(&PageRequest::default().with_per_page(usize::MAX), 3);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
        assert_eq!(w.page_count, 1);
    }

    #[test]
    fn test_huge_per_page_on_later_page_saturates_offset() {
        let w = resolve(
            &PageRequest::default().with_page(2).with_per_page(usize::MAX),
            5,
        );
        assert_eq!(w.page, 2);
        assert_eq!(w.offset, usize::MAX);
        assert_eq!(w.page_count, 1);
    }

    #[test]
    fn test_empty_collection() {
        let w = resolve(&PageRequest::default().with_page(7), 0);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
        assert_eq!(w.page_count, 0);
    }

    #[test]
    fn test_page_len_helpers() {
        let page = Page {
            items: vec![1, 2, 3],
            page_number: 1,
            per_page: 3,
            page_count: 1,
            total_entries: 3,
        };
        assert_eq!(page.len(), 3);
        assert!(!page.is_empty());
        let mapped = page.map_items(vec!["a"]);
        assert_eq!(mapped.total_entries, 3);
        assert_eq!(mapped.items, vec!["a"]);
    }
}
