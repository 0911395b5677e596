//! Plain-text table rendering shared by the list component and the page.

use super::pipeline::PageView;
use crate::types::Product;
use crate::util::format_price;

pub const EMPTY_PLACEHOLDER: &str = "No products available";

const NAME_WIDTH: usize = 24;
const DESCRIPTION_WIDTH: usize = 32;
const LOW_STOCK_THRESHOLD: i64 = 5;

pub fn header() -> String {
    format!(
        "{:<6} {:<name$} {:<desc$} {:>14} {:>7}  {}",
        "ID", "NAME", "DESCRIPTION", "PRICE", "STOCK", "ACTIONS",
        name = NAME_WIDTH,
        desc = DESCRIPTION_WIDTH,
    )
}

pub fn rule() -> String {
    "-".repeat(6 + NAME_WIDTH + DESCRIPTION_WIDTH + 14 + 7 + 26)
}

/// One product row; low stock is flagged with `!`
pub fn row(product: &Product) -> String {
    let stock = if product.stock <= LOW_STOCK_THRESHOLD {
        format!("{}!", product.stock)
    } else {
        product.stock.to_string()
    };
    format!(
        "{:<6} {:<name$} {:<desc$} {:>14} {:>7}  [edit {id}] [delete {id}]",
        product.id,
        truncate(&product.name, NAME_WIDTH),
        truncate(&product.description, DESCRIPTION_WIDTH),
        format_price(product.price),
        stock,
        id = product.id,
        name = NAME_WIDTH,
        desc = DESCRIPTION_WIDTH,
    )
}

/// Header, rows, or a single placeholder row when there is nothing to show
pub fn render_rows<'a>(rows: impl IntoIterator<Item = &'a Product>, placeholder: &str) -> String {
    let mut lines = vec![header(), rule()];
    let before = lines.len();
    lines.extend(rows.into_iter().map(row));
    if lines.len() == before {
        lines.push(format!("{:^width$}", placeholder, width = rule().len()));
    }
    lines.join("\n")
}

/// `Showing 11-20 of 23 | Page 2 | [prev] [next]`, disabled controls in parentheses
pub fn render_pagination(view: &PageView<'_>) -> String {
    let prev = if view.has_previous { "[prev]" } else { "(prev)" };
    let next = if view.has_next { "[next]" } else { "(next)" };
    format!(
        "Showing {}-{} of {} | Page {} | {} {}",
        view.showing_start, view.showing_end, view.total, view.page, prev, next
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
