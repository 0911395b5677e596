use std::str::FromStr;

use serde::Serialize;

use super::ViewError;

/// Page sizes offered by the table
pub const PAGE_SIZE_CHOICES: [usize; 4] = [5, 10, 20, 50];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockFilter {
    #[default]
    Any,
    InStock,
    LowStock,
    OutOfStock,
}

impl StockFilter {
    /// in-stock: more than 5, low-stock: 1 to 5, out-of-stock: 0
    pub fn matches(&self, stock: i64) -> bool {
        match self {
            StockFilter::Any => true,
            StockFilter::InStock => stock > 5,
            StockFilter::LowStock => stock > 0 && stock <= 5,
            StockFilter::OutOfStock => stock == 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockFilter::Any => "any",
            StockFilter::InStock => "in-stock",
            StockFilter::LowStock => "low-stock",
            StockFilter::OutOfStock => "out-of-stock",
        }
    }
}

impl FromStr for StockFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "all" => Ok(StockFilter::Any),
            "in-stock" => Ok(StockFilter::InStock),
            "low-stock" => Ok(StockFilter::LowStock),
            "out-stock" | "out-of-stock" => Ok(StockFilter::OutOfStock),
            other => Err(ViewError::UnknownStockFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Price,
    Stock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = match self.field {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Stock => "stock",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}-{}", field, direction)
    }
}

impl FromStr for SortKey {
    type Err = ViewError;

    /// `name-asc`, `price-desc`, `stock-asc`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let (field, direction) = normalized
            .split_once('-')
            .ok_or_else(|| ViewError::UnknownSort(s.to_string()))?;

        let field = match field {
            "name" => SortField::Name,
            "price" => SortField::Price,
            "stock" => SortField::Stock,
            _ => return Err(ViewError::UnknownSort(s.to_string())),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(ViewError::UnknownSort(s.to_string())),
        };
        Ok(SortKey { field, direction })
    }
}

/// Parse an optional sort selection; empty or `none` clears sorting
pub fn parse_sort(s: &str) -> Result<Option<SortKey>, ViewError> {
    match s.trim() {
        "" | "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// A page size restricted to `PAGE_SIZE_CHOICES`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(size: usize) -> Result<Self, ViewError> {
        if PAGE_SIZE_CHOICES.contains(&size) {
            Ok(Self(size))
        } else {
            Err(ViewError::InvalidPageSize(size))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(10)
    }
}

impl FromStr for PageSize {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = s
            .trim()
            .parse::<usize>()
            .map_err(|_| ViewError::InvalidPageSize(0))?;
        Self::new(size)
    }
}

/// Table controls: what is shown and in which order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub page: usize,
    pub page_size: PageSize,
    pub search: String,
    pub stock: StockFilter,
    pub sort: Option<SortKey>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            search: String::new(),
            stock: StockFilter::Any,
            sort: None,
        }
    }
}

/// User input that changes the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    Search(String),
    StockFilter(StockFilter),
    Sort(Option<SortKey>),
    PageSize(PageSize),
    NextPage,
    PreviousPage,
}

impl ViewState {
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self { page_size, ..Self::default() }
    }

    /// Number of pages needed for `total` matching rows (at least one)
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.get()).max(1)
    }

    /// Next state after `action`, given how many rows currently match.
    ///
    /// Anything that changes which rows match, or how many fit on a page,
    /// sends the view back to page 1.
    pub fn apply(&self, action: ViewAction, matching: usize) -> ViewState {
        let mut next = self.clone();
        match action {
            ViewAction::Search(term) => {
                next.search = term;
                next.page = 1;
            }
            ViewAction::StockFilter(stock) => {
                next.stock = stock;
                next.page = 1;
            }
            ViewAction::Sort(sort) => {
                next.sort = sort;
                next.page = 1;
            }
            ViewAction::PageSize(size) => {
                next.page_size = size;
                next.page = 1;
            }
            ViewAction::NextPage => {
                if next.page < self.page_count(matching) {
                    next.page += 1;
                }
            }
            ViewAction::PreviousPage => {
                if next.page > 1 {
                    next.page -= 1;
                }
            }
        }
        next
    }

    /// Pull the page back after the list shrank under it
    pub fn clamp_page(&mut self, matching: usize) {
        self.page = self.page.clamp(1, self.page_count(matching));
    }
}
