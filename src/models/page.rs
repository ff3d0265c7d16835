//! Pagination types shared by list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::{
    author::AuthorShort,
    book::BookShort,
    book_instance::{BookInstance, LoanEntry},
};

/// `?page=` query parameter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<String>,
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Parse the raw page number. Missing means page 1.
    pub fn parse(raw: Option<&str>, per_page: i64) -> AppResult<Self> {
        let page = match raw.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::field("page", format!("Invalid page number: {}", raw)))?,
        };

        if page < 1 {
            return Err(AppError::field("page", "Page number must be at least 1"));
        }

        Ok(Self {
            page,
            per_page: per_page.max(1),
        })
    }

    /// Rows to skip. Saturates for huge page numbers, which then fall past
    /// the last page and are rejected by `Page::new`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

impl PageQuery {
    pub fn request(&self, per_page: i64) -> AppResult<PageRequest> {
        PageRequest::parse(self.page.as_deref(), per_page)
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<AuthorShort>,
    BookPage = Page<BookShort>,
    CopyPage = Page<BookInstance>,
    LoanPage = Page<LoanEntry>
)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries on this page
    pub items: Vec<T>,
    /// Total number of entries across all pages
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
    /// Number of pages (at least 1)
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Number of pages needed for `total` entries; an empty set still has one page
pub fn num_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Build a page, rejecting page numbers past the last page
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> AppResult<Self> {
        let num_pages = num_pages(total, request.per_page);
        if request.page > num_pages {
            return Err(AppError::NotFound(format!(
                "Page {} does not exist ({} pages)",
                request.page, num_pages
            )));
        }

        Ok(Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            num_pages,
            has_next: request.page < num_pages,
            has_previous: request.page > 1,
        })
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        U: for<'a> ToSchema<'a>,
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            num_pages: self.num_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
