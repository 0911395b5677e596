//! Page controller: the session state machine and the product workflow.
//!
//! The controller owns the full product list and the view state. Every
//! mutation goes to the server first; on success the whole list is fetched
//! again and the view is re-rendered from it. Failures become notifications
//! and leave the previous state in place.

use std::time::Duration;

use tokio::sync::mpsc;

use super::notify::{Notification, Notifications};
use super::prompt::Confirm;
use crate::api::InventoryApi;
use crate::config::config;
use crate::error::ClientError;
use crate::types::{Credentials, Product, ProductId, SessionUser};
use crate::validation::{ProductForm, ValidationErrors};
use crate::view::pipeline::{apply_view, count_matching};
use crate::view::table::{render_pagination, EMPTY_PLACEHOLDER};
use crate::view::{EditableList, EmptyState, ListEvent, PageSize, PageView, ViewAction, ViewError, ViewState};

const LOGOUT_PROMPT: &str = "Are you sure you want to log out?";
const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Unauthenticated(AuthForm),
    Authenticated(SessionUser),
}

/// Edit dialog, pre-filled from the server copy of the product
#[derive(Debug, Clone, PartialEq)]
pub struct EditModal {
    pub id: ProductId,
    pub form: ProductForm,
    pub errors: ValidationErrors,
}

pub struct PageController<A, C> {
    api: A,
    confirm: C,
    screen: Screen,
    products: Vec<Product>,
    view: ViewState,
    list: EditableList,
    list_events: mpsc::UnboundedReceiver<ListEvent>,
    form_errors: ValidationErrors,
    modal: Option<EditModal>,
    notifications: Notifications,
}

impl<A: InventoryApi, C: Confirm> PageController<A, C> {
    /// Controller with page size and notification timing from the global config
    pub fn new(api: A, confirm: C) -> Self {
        let settings = config();
        let page_size = PageSize::new(settings.view.default_page_size).unwrap_or_default();
        Self::with_settings(
            api,
            confirm,
            page_size,
            Duration::from_millis(settings.ui.notification_ms),
        )
    }

    pub fn with_settings(api: A, confirm: C, page_size: PageSize, notification_ttl: Duration) -> Self {
        let (mut list, list_events) = EditableList::new();
        list.set_empty_state(EmptyState::PlaceholderRow(EMPTY_PLACEHOLDER.to_string()));

        Self {
            api,
            confirm,
            screen: Screen::Unauthenticated(AuthForm::Login),
            products: Vec::new(),
            view: ViewState::with_page_size(page_size),
            list,
            list_events,
            form_errors: ValidationErrors::default(),
            modal: None,
            notifications: Notifications::new(notification_ttl),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn confirm(&self) -> &C {
        &self.confirm
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.screen, Screen::Authenticated(_))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn modal(&self) -> Option<&EditModal> {
        self.modal.as_ref()
    }

    /// Inline errors from the last rejected creation form
    pub fn form_errors(&self) -> &ValidationErrors {
        &self.form_errors
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    /// Drop the notification once its time is up; true if the screen changed
    pub fn expire_notification(&mut self) -> bool {
        self.notifications.dismiss_expired()
    }

    pub fn list(&self) -> &EditableList {
        &self.list
    }

    /// Rows, range and navigation state for the current view
    pub fn page_view(&self) -> PageView<'_> {
        apply_view(&self.products, &self.view)
    }

    // ---- session -------------------------------------------------------

    /// Check for an existing session; load products if there is one
    pub async fn start(&mut self) -> bool {
        match self.api.check_session().await {
            Ok(user) => {
                tracing::debug!("Session valid for {}", user.label());
                self.screen = Screen::Authenticated(user);
                if let Err(e) = self.load_products().await {
                    tracing::debug!("Initial load failed: {}", e);
                }
                true
            }
            Err(e) => {
                tracing::debug!("No valid session: {}", e);
                self.screen = Screen::Unauthenticated(AuthForm::Login);
                false
            }
        }
    }

    pub fn show_register(&mut self) {
        if !self.is_authenticated() {
            self.screen = Screen::Unauthenticated(AuthForm::Register);
        }
    }

    pub fn show_login(&mut self) {
        if !self.is_authenticated() {
            self.screen = Screen::Unauthenticated(AuthForm::Login);
        }
    }

    pub async fn register(&mut self, credentials: Credentials) -> Result<(), ClientError> {
        match self.api.register(&credentials).await {
            Ok(_) => {
                self.notifications.success("Registration successful. Please sign in.");
                self.screen = Screen::Unauthenticated(AuthForm::Login);
                Ok(())
            }
            Err(e) => {
                self.notifications.error(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn login(&mut self, credentials: Credentials) -> Result<(), ClientError> {
        match self.api.login(&credentials).await {
            Ok(user) => {
                tracing::info!("Signed in as {}", user.label());
                self.screen = Screen::Authenticated(user);
                self.load_products().await
            }
            Err(e) => {
                self.notifications.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Returns `Ok(false)` when the user declines the prompt
    pub async fn logout(&mut self) -> Result<bool, ClientError> {
        if !self.is_authenticated() {
            return Ok(false);
        }
        if !self.confirm.confirm(LOGOUT_PROMPT).await {
            return Ok(false);
        }

        match self.api.logout().await {
            Ok(_) => {
                self.notifications.success("Signed out successfully");
                self.screen = Screen::Unauthenticated(AuthForm::Login);
                self.products.clear();
                self.modal = None;
                self.form_errors = ValidationErrors::default();
                self.view = ViewState::with_page_size(self.view.page_size);
                self.sync_list();
                Ok(true)
            }
            Err(e) => {
                self.notifications.error("Failed to sign out");
                Err(e)
            }
        }
    }

    // ---- products ------------------------------------------------------

    /// Replace the local list with the server's and re-render
    pub async fn load_products(&mut self) -> Result<(), ClientError> {
        match self.api.list_products().await {
            Ok(products) => {
                tracing::debug!("Loaded {} products", products.len());
                self.products = products;
                let matching = count_matching(&self.products, &self.view);
                self.view.clamp_page(matching);
                self.sync_list();
                Ok(())
            }
            Err(e) => {
                self.notifications.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate, create, then reload. Invalid input never reaches the server.
    pub async fn submit_new_product(&mut self, form: &ProductForm) -> Result<(), ClientError> {
        let draft = match form.parse() {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!("Rejected product form: {}", errors);
                self.form_errors = errors.clone();
                return Err(ClientError::Validation(errors));
            }
        };
        self.form_errors = ValidationErrors::default();

        if let Err(e) = self.api.create_product(&draft).await {
            self.notifications.error(e.to_string());
            return Err(e);
        }
        self.notifications.success("Product added successfully");
        self.load_products().await
    }

    /// Fetch the product and open the edit dialog with its values
    pub async fn open_edit(&mut self, id: ProductId) -> Result<(), ClientError> {
        match self.api.get_product(id).await {
            Ok(product) => {
                self.modal = Some(EditModal {
                    id: product.id,
                    form: ProductForm::from(&product),
                    errors: ValidationErrors::default(),
                });
                Ok(())
            }
            Err(e) => {
                self.notifications.error("Failed to load product");
                Err(e)
            }
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Validate the dialog's form, update, close the dialog and reload
    pub async fn submit_edit(&mut self, form: ProductForm) -> Result<(), ClientError> {
        let Some(modal) = self.modal.as_mut() else {
            return Err(ClientError::NoOpenModal);
        };
        let id = modal.id;
        modal.form = form;

        let draft = match modal.form.parse() {
            Ok(draft) => draft,
            Err(errors) => {
                modal.errors = errors.clone();
                return Err(ClientError::Validation(errors));
            }
        };
        modal.errors = ValidationErrors::default();

        if let Err(e) = self.api.update_product(id, &draft).await {
            self.notifications.error(e.to_string());
            return Err(e);
        }
        self.notifications.success("Product updated successfully");
        self.modal = None;
        self.load_products().await
    }

    /// Returns `Ok(false)` when the user declines the prompt
    pub async fn delete_product(&mut self, id: ProductId) -> Result<bool, ClientError> {
        if !self.confirm.confirm(DELETE_PROMPT).await {
            return Ok(false);
        }

        if let Err(e) = self.api.delete_product(id).await {
            self.notifications.error("Failed to delete product");
            return Err(e);
        }
        self.notifications.success("Product deleted successfully");
        self.load_products().await?;
        Ok(true)
    }

    // ---- view ----------------------------------------------------------

    /// Apply a table control change and re-render once
    pub fn dispatch(&mut self, action: ViewAction) {
        let matching = count_matching(&self.products, &self.view);
        self.view = self.view.apply(action, matching);
        self.sync_list();
    }

    /// Submit the list's embedded creation form
    pub fn submit_form(&self, form: ProductForm) {
        self.list.submit_form(form);
    }

    pub fn click_edit(&self, id: ProductId) -> Result<(), ViewError> {
        self.list.click_edit(id)
    }

    pub fn click_delete(&self, id: ProductId) -> Result<(), ViewError> {
        self.list.click_delete(id)
    }

    /// React to one list event
    pub async fn handle_event(&mut self, event: ListEvent) -> Result<(), ClientError> {
        match event {
            ListEvent::Create(form) => self.submit_new_product(&form).await,
            ListEvent::Edit(product) => self.open_edit(product.id).await,
            ListEvent::Delete { id } => self.delete_product(id).await.map(|_| ()),
        }
    }

    /// Drain and handle every queued list event. Failures are already on
    /// screen as notifications; the count of failed events is returned.
    pub async fn process_events(&mut self) -> usize {
        let mut failed = 0;
        while let Ok(event) = self.list_events.try_recv() {
            if let Err(e) = self.handle_event(event).await {
                tracing::debug!("List event failed: {}", e);
                failed += 1;
            }
        }
        failed
    }

    fn sync_list(&mut self) {
        let rows: Vec<Product> = self.page_view().rows.into_iter().cloned().collect();
        self.list.set_data(rows);
    }

    // ---- rendering -----------------------------------------------------

    /// The whole screen as text
    pub fn render(&self) -> String {
        let mut out = Vec::new();

        match &self.screen {
            Screen::Unauthenticated(form) => {
                out.push("Tienda inventory".to_string());
                if let Some(note) = self.notification() {
                    out.push(note.to_string());
                }
                out.push(String::new());
                match form {
                    AuthForm::Login => {
                        out.push("== Sign in ==".to_string());
                        out.push("  username: ____".to_string());
                        out.push("  password: ____".to_string());
                        out.push("No account yet? Register.".to_string());
                    }
                    AuthForm::Register => {
                        out.push("== Register ==".to_string());
                        out.push("  username: ____".to_string());
                        out.push("  password: ____".to_string());
                        out.push("Already registered? Sign in.".to_string());
                    }
                }
            }
            Screen::Authenticated(user) => {
                out.push(format!("Tienda inventory | Signed in as {}", user.label()));
                if let Some(note) = self.notification() {
                    out.push(note.to_string());
                }
                out.push(String::new());
                out.push(self.render_toolbar());
                out.push(String::new());
                out.push(self.list.output().to_string());
                for (field, message) in self.form_errors.iter() {
                    out.push(format!("  ! {}: {}", field, message));
                }
                out.push(String::new());
                out.push(render_pagination(&self.page_view()));
                if let Some(modal) = &self.modal {
                    out.push(String::new());
                    out.push(render_modal(modal));
                }
            }
        }

        out.join("\n")
    }

    fn render_toolbar(&self) -> String {
        let sort = self
            .view
            .sort
            .map(|key| key.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "Search: \"{}\" | Stock: {} | Sort: {} | Per page: {}",
            self.view.search,
            self.view.stock.as_str(),
            sort,
            self.view.page_size.get()
        )
    }
}

fn render_modal(modal: &EditModal) -> String {
    let mut lines = vec![
        format!("== Edit product #{} ==", modal.id),
        format!("  name:        {}", modal.form.name),
        format!("  description: {}", modal.form.description),
        format!("  price:       {}", modal.form.price),
        format!("  stock:       {}", modal.form.stock),
    ];
    for (field, message) in modal.errors.iter() {
        lines.push(format!("  ! {}: {}", field, message));
    }
    lines.push("[save] [cancel]".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::notify::NoticeKind;
    use crate::testing::{FakeApi, ScriptedConfirm};
    use crate::validation::ProductField;
    use crate::view::StockFilter;

    fn controller(api: FakeApi, answers: &[bool]) -> PageController<FakeApi, ScriptedConfirm> {
        PageController::with_settings(
            api,
            ScriptedConfirm::new(answers),
            PageSize::new(10).unwrap(),
            Duration::from_secs(3),
        )
    }

    async fn signed_in(api: FakeApi, answers: &[bool]) -> PageController<FakeApi, ScriptedConfirm> {
        api.sign_in("admin", "Admin");
        let mut page = controller(api, answers);
        assert!(page.start().await);
        page
    }

    #[tokio::test]
    async fn start_without_session_shows_login() {
        let mut page = controller(FakeApi::new(), &[]);
        assert!(!page.start().await);
        assert_eq!(page.screen(), &Screen::Unauthenticated(AuthForm::Login));
        assert_eq!(page.api().calls(), vec!["check-session"]);
        assert!(page.render().contains("== Sign in =="));
    }

    #[tokio::test]
    async fn start_with_session_loads_products() {
        let api = FakeApi::with_products(3);
        let page = signed_in(api, &[]).await;
        assert!(page.is_authenticated());
        assert_eq!(page.products().len(), 3);
        assert_eq!(page.api().calls(), vec!["check-session", "list"]);
        assert!(page.render().contains("Signed in as admin (Admin)"));
    }

    #[tokio::test]
    async fn start_keeps_session_when_first_load_fails() {
        let api = FakeApi::with_products(3);
        api.sign_in("admin", "Admin");
        api.fail_next("list", 500, "Database unavailable");
        let mut page = controller(api, &[]);

        assert!(page.start().await);
        assert!(page.is_authenticated());
        assert!(page.products().is_empty());
        let note = page.notification().unwrap();
        assert!(note.is_error());
        assert_eq!(note.message, "Database unavailable");
    }

    #[tokio::test]
    async fn register_then_login() {
        let api = FakeApi::with_products(2);
        let mut page = controller(api, &[]);
        page.start().await;
        page.show_register();
        assert!(page.render().contains("== Register =="));

        page.register(Credentials::new("carol", "pw")).await.unwrap();
        assert_eq!(page.screen(), &Screen::Unauthenticated(AuthForm::Login));
        assert_eq!(page.notification().unwrap().kind, NoticeKind::Success);

        page.login(Credentials::new("carol", "pw")).await.unwrap();
        assert!(page.is_authenticated());
        assert_eq!(page.products().len(), 2);
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_message() {
        let mut page = controller(FakeApi::new(), &[]);
        let err = page.login(Credentials::new("nobody", "wrong")).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!page.is_authenticated());
        let note = page.notification().unwrap();
        assert!(note.is_error());
        assert_eq!(note.message, "Invalid credentials");
    }

    #[tokio::test]
    async fn logout_requires_confirmation() {
        let mut page = signed_in(FakeApi::with_products(1), &[false, true]).await;

        assert!(!page.logout().await.unwrap());
        assert!(page.is_authenticated());
        assert!(!page.api().calls().contains(&"logout".to_string()));

        assert!(page.logout().await.unwrap());
        assert_eq!(page.screen(), &Screen::Unauthenticated(AuthForm::Login));
        assert!(page.products().is_empty());
        assert_eq!(page.confirm().prompts(), vec![LOGOUT_PROMPT, LOGOUT_PROMPT]);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_server() {
        let mut page = signed_in(FakeApi::new(), &[]).await;
        let before = page.api().calls().len();

        let err = page
            .submit_new_product(&ProductForm::new("ab", "x", "5", "2"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(page.api().calls().len(), before);
        assert!(page.form_errors().get(ProductField::Name).is_some());
        assert!(page.render().contains("! name: Name must be at least 3 characters"));
    }

    #[tokio::test]
    async fn create_is_followed_by_exactly_one_reload() {
        let mut page = signed_in(FakeApi::new(), &[]).await;
        page.api().clear_calls();

        page.submit_new_product(&ProductForm::new("Lamp", "Desk lamp", "19.99", "4"))
            .await
            .unwrap();

        assert_eq!(page.api().calls(), vec!["create", "list"]);
        assert_eq!(page.products().len(), 1);
        assert!(page.form_errors().is_empty());
        assert_eq!(page.notification().unwrap().message, "Product added successfully");
    }

    #[tokio::test]
    async fn failed_create_keeps_previous_list() {
        let mut page = signed_in(FakeApi::with_products(2), &[]).await;
        page.api().fail_next("create", 403, "Access denied");
        page.api().clear_calls();

        let err = page
            .submit_new_product(&ProductForm::new("Lamp", "Desk lamp", "19.99", "4"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Access denied");
        assert_eq!(page.api().calls(), vec!["create"]);
        assert_eq!(page.products().len(), 2);
        assert_eq!(page.notification().unwrap().message, "Access denied");
    }

    #[tokio::test]
    async fn edit_flow_fetches_updates_and_reloads() {
        let mut page = signed_in(FakeApi::with_products(3), &[]).await;
        page.api().clear_calls();

        page.open_edit(2).await.unwrap();
        let modal = page.modal().unwrap();
        assert_eq!(modal.id, 2);
        assert_eq!(modal.form.name, "Product 2");
        assert!(page.render().contains("== Edit product #2 =="));

        let bad = ProductForm::new("Product 2", "desc", "-1", "3");
        assert!(page.submit_edit(bad).await.is_err());
        assert!(page.modal().unwrap().errors.get(ProductField::Price).is_some());

        page.submit_edit(ProductForm::new("Renamed", "desc", "7.5", "3")).await.unwrap();
        assert!(page.modal().is_none());
        assert_eq!(page.api().calls(), vec!["get 2", "update 2", "list"]);
        assert!(page.products().iter().any(|p| p.name == "Renamed"));
    }

    #[tokio::test]
    async fn submit_edit_without_modal_is_an_error() {
        let mut page = signed_in(FakeApi::new(), &[]).await;
        let err = page.submit_edit(ProductForm::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::NoOpenModal));
    }

    #[tokio::test]
    async fn delete_asks_first() {
        let mut page = signed_in(FakeApi::with_products(2), &[false, true]).await;
        page.api().clear_calls();

        assert!(!page.delete_product(1).await.unwrap());
        assert!(page.api().calls().is_empty());

        assert!(page.delete_product(1).await.unwrap());
        assert_eq!(page.api().calls(), vec!["delete 1", "list"]);
        assert_eq!(page.products().len(), 1);
    }

    #[tokio::test]
    async fn list_events_route_to_handlers() {
        let mut page = signed_in(FakeApi::with_products(2), &[true]).await;
        page.api().clear_calls();

        page.submit_form(ProductForm::new("Lamp", "Desk lamp", "5", "1"));
        page.click_edit(1).unwrap();
        page.click_delete(2).unwrap();
        assert_eq!(page.process_events().await, 0);

        assert_eq!(
            page.api().calls(),
            vec!["create", "list", "get 1", "delete 2", "list"]
        );
        assert!(page.modal().is_some());
    }

    #[tokio::test]
    async fn unrendered_rows_cannot_be_clicked() {
        let page = signed_in(FakeApi::with_products(12), &[]).await;
        assert_eq!(page.click_delete(11), Err(ViewError::NoSuchRow(11)));
    }

    #[tokio::test]
    async fn view_actions_reduce_then_render() {
        let mut page = signed_in(FakeApi::with_products(23), &[]).await;

        page.dispatch(ViewAction::NextPage);
        page.dispatch(ViewAction::NextPage);
        let view = page.page_view();
        assert_eq!(view.page, 3);
        assert_eq!(view.rows.len(), 3);
        assert!(page.render().contains("Showing 21-23 of 23 | Page 3 | [prev] (next)"));

        page.dispatch(ViewAction::StockFilter(StockFilter::OutOfStock));
        assert_eq!(page.view().page, 1);
        let out = page.render();
        assert!(out.contains(EMPTY_PLACEHOLDER));
        assert!(out.contains("ACTIONS"), "placeholder belongs inside the table:\n{out}");
    }

    #[tokio::test]
    async fn reload_clamps_page_after_shrink() {
        let mut page = signed_in(FakeApi::with_products(11), &[true]).await;
        page.dispatch(ViewAction::NextPage);
        assert_eq!(page.view().page, 2);

        page.delete_product(11).await.unwrap();
        assert_eq!(page.view().page, 1);
        assert_eq!(page.page_view().rows.len(), 10);
    }
}
