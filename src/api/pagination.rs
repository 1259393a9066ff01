//! Pagination utilities for list endpoints

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Pagination query parameters (`?page=2&perPage=50`)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed)
    pub page: Option<u32>,

    /// Items per page
    pub per_page: Option<u32>,
}

impl PaginationParams {
    pub const DEFAULT_PER_PAGE: u32 = 20;

    /// Maximum allowed items per page
    pub const MAX_PER_PAGE: u32 = 100;

    /// Returns the clamped per_page value
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    /// Returns the page (1-indexed, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.per_page() as usize
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: u64) -> Self {
        let per_page = params.per_page();
        let page = params.page();
        let total_pages = total_items.div_ceil(per_page as u64) as u32;

        Self {
            page,
            per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
        }
    }

    /// Slice an already filtered collection down to the requested page.
    pub fn from_vec(items: Vec<T>, params: &PaginationParams) -> Self {
        let total = items.len() as u64;
        let page = items
            .into_iter()
            .skip(params.offset())
            .take(params.per_page() as usize)
            .collect();
        Self::new(page, params, total)
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, per_page: u32) -> PaginationParams {
        PaginationParams {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    #[test]
    fn clamps_page_size() {
        assert_eq!(PaginationParams::default().per_page(), 20);
        assert_eq!(params(1, 0).per_page(), 1);
        assert_eq!(params(1, 1000).per_page(), 100);
        assert_eq!(params(0, 10).page(), 1);
    }

    #[test]
    fn from_vec_slices_the_requested_page() {
        let page = Paginated::from_vec((1..=25).collect::<Vec<u32>>(), &params(2, 10));
        assert_eq!(page.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.pagination.total_items, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Paginated::from_vec(vec![1, 2, 3], &params(5, 10));
        assert!(page.data.is_empty());
        assert!(!page.pagination.has_next);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let json = serde_json::to_value(PaginationMeta::new(&params(1, 10), 0)).unwrap();
        assert_eq!(json["perPage"], 10);
        assert_eq!(json["totalPages"], 0);
    }
}
