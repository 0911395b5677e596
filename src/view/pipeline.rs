//! Filter, sort and paginate the in-memory product list.
//!
//! Steps always run in the same order: search, stock bucket, sort, page
//! window. The output depends only on the product slice and the view state.

use std::cmp::Ordering;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::state::{SortDirection, SortField, SortKey, StockFilter, ViewState};
use crate::types::Product;

/// The visible slice plus the facts the pagination controls need
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Product>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub showing_start: usize,
    pub showing_end: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run the whole pipeline for the current view
pub fn apply_view<'a>(products: &'a [Product], state: &ViewState) -> PageView<'a> {
    let mut matching = filter_products(products, &state.search, state.stock);
    sort_products(&mut matching, state.sort);
    paginate(matching, state.page, state.page_size.get())
}

/// How many products survive the search and stock filters
pub fn count_matching(products: &[Product], state: &ViewState) -> usize {
    filter_products(products, &state.search, state.stock).len()
}

/// Case-insensitive substring search over name or description, then stock bucket
pub fn filter_products<'a>(products: &'a [Product], search: &str, stock: StockFilter) -> Vec<&'a Product> {
    let needle = search.to_lowercase();
    products
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .filter(|p| stock.matches(p.stock))
        .collect()
}

/// Stable sort; `None` keeps filter order
pub fn sort_products(items: &mut [&Product], key: Option<SortKey>) {
    let Some(key) = key else { return };
    items.sort_by(|a, b| {
        let ordering = match key.field {
            SortField::Name => locale_cmp(&a.name, &b.name),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Stock => a.stock.cmp(&b.stock),
        };
        match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Locale-style string order: base letters first (accents and case
/// ignored), then accents, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

// "Ñandú" -> "nandu"
fn base_letters(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cut the page window out of the matching rows
pub fn paginate(matching: Vec<&Product>, page: usize, page_size: usize) -> PageView<'_> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = matching.len();
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size);

    let rows: Vec<&Product> = matching.into_iter().skip(start).take(page_size).collect();

    PageView {
        rows,
        page,
        page_size,
        total,
        showing_start: if total > 0 { (start + 1).min(total) } else { 0 },
        showing_end: end.min(total),
        has_previous: page != 1,
        has_next: end < total,
    }
}
