pub mod list;
pub mod pipeline;
pub mod state;
pub mod table;

pub use list::{EditableList, EmptyState, ListEvent};
pub use pipeline::{apply_view, PageView};
pub use state::{PageSize, SortDirection, SortField, SortKey, StockFilter, ViewAction, ViewState};

use thiserror::Error;

use crate::types::ProductId;

#[derive(Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("Unknown stock filter: {0} (expected any, in-stock, low-stock or out-of-stock)")]
    UnknownStockFilter(String),

    #[error("Unknown sort key: {0} (expected name|price|stock followed by -asc or -desc)")]
    UnknownSort(String),

    #[error("Invalid page size: {0} (expected one of {choices:?})", choices = state::PAGE_SIZE_CHOICES)]
    InvalidPageSize(usize),

    #[error("No row for product {0} in the current view")]
    NoSuchRow(ProductId),
}
