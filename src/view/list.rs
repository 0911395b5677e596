//! Self-contained product list component.
//!
//! Holds its own copy of the rows, renders a creation form and a table, and
//! reports user actions as [`ListEvent`]s on a channel. Row actions are bound
//! per render: only ids drawn by the latest render can be clicked.

use tokio::sync::mpsc;

use super::table::{self, EMPTY_PLACEHOLDER};
use super::ViewError;
use crate::types::{Product, ProductId};
use crate::validation::ProductForm;

const FORM_HINT: &str = "[add] name | description | price | stock";

/// What the list asks its container to do
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// New record from the embedded form; the server assigns the id
    Create(ProductForm),
    Edit(Product),
    Delete { id: ProductId },
}

/// What the list draws when it has no rows
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyState {
    /// Free text in place of the table
    Message(String),
    /// Table header over a single centered placeholder row
    PlaceholderRow(String),
}

pub struct EditableList {
    products: Vec<Product>,
    empty: EmptyState,
    bound_ids: Vec<ProductId>,
    rendered: String,
    events: mpsc::UnboundedSender<ListEvent>,
}

impl EditableList {
    /// Create the component and the receiving end of its events
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ListEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let mut list = Self {
            products: Vec::new(),
            empty: EmptyState::Message(format!("{}. Add a new one.", EMPTY_PLACEHOLDER)),
            bound_ids: Vec::new(),
            rendered: String::new(),
            events,
        };
        list.render();
        (list, rx)
    }

    /// Switch between a bare message and a placeholder row for the empty case
    pub fn set_empty_state(&mut self, empty: EmptyState) {
        self.empty = empty;
        self.render();
    }

    /// Replace the rows and re-render
    pub fn set_data(&mut self, products: Vec<Product>) {
        self.products = products;
        self.render();
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Redraw from the current rows and re-bind the row actions
    pub fn render(&mut self) -> &str {
        self.bound_ids = self.products.iter().map(|p| p.id).collect();

        let body = match &self.empty {
            EmptyState::Message(message) if self.products.is_empty() => message.clone(),
            EmptyState::Message(_) => table::render_rows(&self.products, EMPTY_PLACEHOLDER),
            EmptyState::PlaceholderRow(placeholder) => table::render_rows(&self.products, placeholder),
        };
        self.rendered = format!("{}\n\n{}", FORM_HINT, body);
        &self.rendered
    }

    /// Output of the latest render
    pub fn output(&self) -> &str {
        &self.rendered
    }

    /// Submit the embedded creation form
    pub fn submit_form(&self, form: ProductForm) {
        self.emit(ListEvent::Create(form));
    }

    pub fn click_edit(&self, id: ProductId) -> Result<(), ViewError> {
        self.ensure_bound(id)?;
        let product = self
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ViewError::NoSuchRow(id))?;
        self.emit(ListEvent::Edit(product));
        Ok(())
    }

    pub fn click_delete(&self, id: ProductId) -> Result<(), ViewError> {
        self.ensure_bound(id)?;
        self.emit(ListEvent::Delete { id });
        Ok(())
    }

    fn ensure_bound(&self, id: ProductId) -> Result<(), ViewError> {
        if self.bound_ids.contains(&id) {
            Ok(())
        } else {
            Err(ViewError::NoSuchRow(id))
        }
    }

    fn emit(&self, event: ListEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("List event dropped: no receiver");
        }
    }
}
