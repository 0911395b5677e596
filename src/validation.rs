//! Product form validation.
//!
//! Validation runs on the raw text of a form, before anything is parsed or
//! sent, and reports one message per invalid field.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Product, ProductDraft};

const NAME_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductField {
    Name,
    Description,
    Price,
    Stock,
}

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Stock => "stock",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to message, ordered by field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<ProductField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: ProductField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw product form input, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
}

impl ProductForm {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
        stock: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price: price.into(),
            stock: stock.into(),
        }
    }

    /// Validate and convert into a request body
    pub fn parse(&self) -> Result<ProductDraft, ValidationErrors> {
        let errors = validate_product(self);
        if !errors.is_empty() {
            return Err(errors);
        }

        match (parse_price(&self.price), parse_stock(&self.stock)) {
            (Some(price), Some(stock)) => Ok(ProductDraft {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                price,
                stock,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&ProductDraft> for ProductForm {
    fn from(draft: &ProductDraft) -> Self {
        Self::new(
            draft.name.clone(),
            draft.description.clone(),
            draft.price.to_string(),
            draft.stock.to_string(),
        )
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self::from(&ProductDraft::from(product))
    }
}

/// Check every rule and collect the failures
pub fn validate_product(form: &ProductForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if !is_present(&form.name) {
        errors.insert(ProductField::Name, "Name is required");
    } else if form.name.trim().chars().count() < NAME_MIN_CHARS {
        errors.insert(ProductField::Name, "Name must be at least 3 characters");
    }

    if !is_present(&form.description) {
        errors.insert(ProductField::Description, "Description is required");
    }

    if !parse_price(&form.price).is_some_and(|price| price > Decimal::ZERO) {
        errors.insert(ProductField::Price, "Price must be a positive number");
    }

    if !parse_stock(&form.stock).is_some_and(|stock| stock >= 0) {
        errors.insert(ProductField::Stock, "Stock must be a non-negative integer");
    }

    errors
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn parse_price(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

fn parse_stock(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(stock) = value.parse::<i64>() {
        return Some(stock);
    }
    // "2.0" is an integer too
    let decimal = parse_price(value)?;
    if decimal.fract().is_zero() {
        decimal.to_i64()
    } else {
        None
    }
}
