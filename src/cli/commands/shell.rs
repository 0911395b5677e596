//! Interactive product page.
//!
//! Stdin is read on its own task and forwarded over a channel. The loop owns
//! the controller and waits for the next line or a timer (search debounce,
//! notification expiry). Confirmation prompts read from the same channel.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep_until, Instant};

use crate::api::HttpApi;
use crate::cli::session::{clear_session, connect, persist};
use crate::config::config;
use crate::controller::{ChannelConfirm, PageController, Screen};
use crate::types::{Credentials, ProductId};
use crate::util::Debounce;
use crate::validation::ProductForm;
use crate::view::state::parse_sort;
use crate::view::{PageSize, SortKey, StockFilter, ViewAction, ViewError};

type Page = PageController<HttpApi, ChannelConfirm>;

const HELP: &str = "\
Commands:
  login [<username> <password>]        sign in (no arguments: show the form)
  register [<username> <password>]     create an account
  logout                               sign out
  reload                               fetch the product list again
  search [<text>]                      filter by name or description
  stock any|in-stock|low-stock|out-of-stock
  sort name-asc|name-desc|price-asc|price-desc|stock-asc|stock-desc|none
  page-size 5|10|20|50
  next | prev                          change page
  add <name> | <description> | <price> | <stock>
  edit <id>                            open the edit dialog
  save [<name> | <description> | <price> | <stock>]
  cancel                               close the edit dialog
  delete <id>
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Login(Option<Credentials>),
    Register(Option<Credentials>),
    Logout,
    Reload,
    Search(String),
    Stock(StockFilter),
    Sort(Option<SortKey>),
    PageSize(PageSize),
    Next,
    Prev,
    Add(ProductForm),
    Edit(ProductId),
    Save(Option<ProductForm>),
    Cancel,
    Delete(ProductId),
    Redraw,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    View(#[from] ViewError),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Redraw,
            "login" => ShellCommand::Login(credentials(rest, "login [<username> <password>]")?),
            "register" => ShellCommand::Register(credentials(rest, "register [<username> <password>]")?),
            "logout" => ShellCommand::Logout,
            "reload" => ShellCommand::Reload,
            "search" => ShellCommand::Search(rest.to_string()),
            "stock" => ShellCommand::Stock(rest.parse()?),
            "sort" => ShellCommand::Sort(parse_sort(rest)?),
            "page-size" => ShellCommand::PageSize(rest.parse()?),
            "next" => ShellCommand::Next,
            "prev" | "previous" => ShellCommand::Prev,
            "add" => ShellCommand::Add(
                product_form(rest).ok_or(ParseError::Usage("add <name> | <description> | <price> | <stock>"))?,
            ),
            "edit" => ShellCommand::Edit(product_id(rest, "edit <id>")?),
            "save" if rest.is_empty() => ShellCommand::Save(None),
            "save" => ShellCommand::Save(Some(
                product_form(rest).ok_or(ParseError::Usage("save [<name> | <description> | <price> | <stock>]"))?,
            )),
            "cancel" => ShellCommand::Cancel,
            "delete" => ShellCommand::Delete(product_id(rest, "delete <id>")?),
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn credentials(rest: &str, usage: &'static str) -> Result<Option<Credentials>, ParseError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(None),
        [username, password] => Ok(Some(Credentials::new(*username, *password))),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn product_form(rest: &str) -> Option<ProductForm> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [name, description, price, stock] => Some(ProductForm::new(*name, *description, *price, *stock)),
        _ => None,
    }
}

fn product_id(rest: &str, usage: &'static str) -> Result<ProductId, ParseError> {
    rest.parse().map_err(|_| ParseError::Usage(usage))
}

enum Input {
    Line(Option<String>),
    SearchSettled,
    NoticeExpired,
}

pub async fn handle(api_url: &str) -> anyhow::Result<()> {
    let api = connect(api_url)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let lines = Arc::new(Mutex::new(rx));
    tokio::spawn(forward_stdin(tx));

    let mut page = PageController::new(api, ChannelConfirm::new(Arc::clone(&lines)));
    let mut search = Debounce::new(Duration::from_millis(config().view.search_debounce_ms));

    page.start().await;
    redraw(&page);

    loop {
        let input = {
            let mut rx = lines.lock().await;
            let deadline = search.deadline();
            let expiry = page.notification().map(|n| n.expires_at());
            tokio::select! {
                line = rx.recv() => Input::Line(line),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Input::SearchSettled,
                _ = sleep_until(expiry.unwrap_or_else(Instant::now)), if expiry.is_some() => Input::NoticeExpired,
            }
        };

        let line = match input {
            Input::SearchSettled => {
                if let Some(term) = search.take_ready(Instant::now()) {
                    page.dispatch(ViewAction::Search(term));
                    redraw(&page);
                }
                continue;
            }
            Input::NoticeExpired => {
                if page.expire_notification() {
                    redraw(&page);
                }
                continue;
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => line,
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                prompt();
                continue;
            }
        };

        match command {
            ShellCommand::Search(term) => {
                search.push(term);
                continue;
            }
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{}", HELP);
                prompt();
                continue;
            }
            command => {
                // Typed-ahead search applies before anything that reads the view
                if let Some(term) = search.flush() {
                    page.dispatch(ViewAction::Search(term));
                }
                if let Err(e) = execute(&mut page, &mut search, command).await {
                    println!("{}", e);
                }
                page.process_events().await;
                redraw(&page);
            }
        }
    }

    Ok(())
}

async fn execute(page: &mut Page, search: &mut Debounce<String>, command: ShellCommand) -> anyhow::Result<()> {
    // Controller failures are already on screen as notifications
    match command {
        ShellCommand::Login(None) => page.show_login(),
        ShellCommand::Register(None) => page.show_register(),
        ShellCommand::Login(Some(credentials)) => {
            if page.login(credentials).await.is_ok() {
                if let Screen::Authenticated(user) = page.screen() {
                    persist(page.api(), Some(user.clone()))?;
                }
            }
        }
        ShellCommand::Register(Some(credentials)) => {
            let _ = page.register(credentials).await;
        }
        ShellCommand::Logout => {
            if let Ok(true) = page.logout().await {
                search.cancel();
                clear_session()?;
            }
        }
        ShellCommand::Reload => {
            let _ = page.load_products().await;
        }
        ShellCommand::Stock(filter) => page.dispatch(ViewAction::StockFilter(filter)),
        ShellCommand::Sort(sort) => page.dispatch(ViewAction::Sort(sort)),
        ShellCommand::PageSize(size) => page.dispatch(ViewAction::PageSize(size)),
        ShellCommand::Next => page.dispatch(ViewAction::NextPage),
        ShellCommand::Prev => page.dispatch(ViewAction::PreviousPage),
        ShellCommand::Add(form) => page.submit_form(form),
        ShellCommand::Edit(id) => page.click_edit(id)?,
        ShellCommand::Delete(id) => page.click_delete(id)?,
        ShellCommand::Save(form) => {
            let form = match (form, page.modal()) {
                (Some(form), _) => form,
                (None, Some(modal)) => modal.form.clone(),
                (None, None) => anyhow::bail!("No product is open for editing"),
            };
            let _ = page.submit_edit(form).await;
        }
        ShellCommand::Cancel => page.close_modal(),
        ShellCommand::Redraw | ShellCommand::Search(_) | ShellCommand::Help | ShellCommand::Quit => {}
    }
    Ok(())
}

async fn forward_stdin(tx: mpsc::UnboundedSender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

fn redraw(page: &Page) {
    println!();
    println!("{}", page.render());
    prompt();
}

fn prompt() {
    print!("tienda> ");
    let _ = std::io::stdout().flush();
}
