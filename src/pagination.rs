//! Page arithmetic for list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit store parameter.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// A validated page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamps to `1 <= page <= MAX_PAGE` and `1 <= limit <= 100`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Builds a request from raw query-string values. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pages {
    pub current: u64,
    pub prev: u64,
    pub has_prev: bool,
    pub next: u64,
    pub has_next: bool,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Items {
    pub limit: u64,
    /// 1-based index of the first item on the page, capped at `total`.
    pub begin: u64,
    pub end: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pages: Pages,
    pub items: Items,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let PageRequest { page, limit } = request;
        let total_pages = total.div_ceil(limit);
        let begin = page.saturating_mul(limit) - limit + 1;
        let end = page.saturating_mul(limit);

        Self {
            data,
            pages: Pages {
                current: page,
                prev: page - 1,
                has_prev: page > 1,
                next: page.saturating_add(1),
                has_next: page < total_pages,
                total: total_pages,
            },
            items: Items {
                limit,
                begin: begin.min(total),
                end: end.min(total),
                total,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pages: self.pages,
            items: self.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_partial_page() {
        let page = Paginated::new(vec!["first", "second"], 2, PageRequest::default());
        assert_eq!(
            page.pages,
            Pages {
                current: 1,
                prev: 0,
                has_prev: false,
                next: 2,
                has_next: false,
                total: 1,
            }
        );
        assert_eq!(
            page.items,
            Items {
                limit: 10,
                begin: 1,
                end: 2,
                total: 2,
            }
        );
    }

    #[test]
    fn test_middle_page() {
        let page = Paginated::new(vec![0u8; 10], 35, PageRequest::new(2, 10));
        assert!(page.pages.has_prev);
        assert!(page.pages.has_next);
        assert_eq!(page.pages.total, 4);
        assert_eq!((page.items.begin, page.items.end), (11, 20));
    }

    #[test]
    fn test_past_the_end_clamps_to_total() {
        let page: Paginated<u8> = Paginated::new(vec![], 5, PageRequest::new(3, 10));
        assert_eq!((page.items.begin, page.items.end), (5, 5));
        assert!(!page.pages.has_next);
    }

    #[test]
    fn test_empty() {
        let page: Paginated<u8> = Paginated::new(vec![], 0, PageRequest::default());
        assert_eq!(page.pages.total, 0);
        assert_eq!((page.items.begin, page.items.end), (0, 0));
    }

    #[test]
    fn test_request_clamping() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(4, 1000).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_huge_page() {
        let request = PageRequest::from_query(Some("18446744073709551615"), Some("10"));
        assert_eq!(request.page, MAX_PAGE);
        assert!(i64::try_from(request.offset()).is_ok());

        let page: Paginated<u8> = Paginated::new(vec![], 5, request);
        assert_eq!(page.pages.current, MAX_PAGE);
        assert_eq!(page.pages.next, MAX_PAGE + 1);
        assert!(!page.pages.has_next);
        assert_eq!((page.items.begin, page.items.end), (5, 5));
    }

    #[test]
    fn test_from_query() {
        assert_eq!(PageRequest::from_query(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_query(Some("2"), Some("abc")),
            PageRequest::new(2, 10)
        );
        assert_eq!(
            PageRequest::from_query(Some("-1"), Some("25")),
            PageRequest::new(1, 25)
        );
    }

    #[test]
    fn test_json_field_names() {
        let page = Paginated::new(vec![1], 1, PageRequest::default());
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["pages"]["hasPrev"], false);
        assert_eq!(value["items"]["begin"], 1);
    }
}
