//! Shared API response types.

use bellyfed_core::Page;
use serde::Serialize;

/// Pagination envelope included in list responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl<T> From<&Page<T>> for PaginationMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.pages(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_math() {
        let page = Page::<u8> {
            items: Vec::new(),
            page: 2,
            limit: 20,
            total: 45,
        };
        let meta = PaginationMeta::from(&page);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.page, 2);
    }
}
