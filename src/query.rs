//! Listing filters and pagination.

use serde::Serialize;

use crate::product::Product;
use crate::request::Request;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Parsed `GET /api/products` query string.
///
/// Filters combine with AND. Empty filter values count as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub q: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl ListQuery {
    pub fn from_request(req: &Request) -> Self {
        let text = |key: &str| req.query(key).filter(|v| !v.is_empty()).map(str::to_owned);

        Self {
            category: text("category"),
            in_stock: text("inStock").map(|v| v.eq_ignore_ascii_case("true")),
            q: text("q"),
            page: positive_or(req.query("page"), DEFAULT_PAGE),
            limit: positive_or(req.query("limit"), DEFAULT_LIMIT),
        }
    }

    pub(crate) fn filter(&self) -> Filter {
        Filter {
            category: self.category.as_deref().map(str::to_lowercase),
            in_stock: self.in_stock,
            term: self.q.as_deref().map(str::to_lowercase),
        }
    }
}

/// Reads a leading integer the way `parseInt` does: `"2abc"` and `"2.5"`
/// give 2. No digits, zero and negative values all fall back to `default`.
fn positive_or(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else { return default };
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    match rest[..digits].parse::<usize>() {
        Ok(n) if n > 0 && !negative => n,
        _ => default,
    }
}

/// Lower-cased predicate built once per listing.
pub(crate) struct Filter {
    category: Option<String>,
    in_stock: Option<bool>,
    term: Option<String>,
}

impl Filter {
    pub(crate) fn matches(&self, p: &Product) -> bool {
        self.category.as_deref().is_none_or(|c| p.in_category(c))
            && self.in_stock.is_none_or(|s| p.in_stock == s)
            && self.term.as_deref().is_none_or(|t| p.mentions(t))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_products: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One window of a filtered listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

impl Page {
    /// Windows `matched` to `[(page-1)*limit, page*limit)`. Out-of-range pages
    /// come back empty.
    pub(crate) fn window(matched: Vec<Product>, page: usize, limit: usize) -> Self {
        let total = matched.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let end = start.saturating_add(limit);

        let products = matched.into_iter().skip(start).take(limit).collect();

        Self {
            products,
            pagination: Pagination {
                current_page: page,
                total_pages: total.div_ceil(limit),
                total_products: total,
                has_next: end < total,
                has_prev: page > 1,
            },
        }
    }
}
