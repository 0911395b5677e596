use clap::Subcommand;
use serde_json::{json, Value};

use crate::api::{HttpApi, InventoryApi};
use crate::cli::session::connect;
use crate::cli::utils::{output_product, output_products, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::controller::{AssumeYes, Confirm, StdinConfirm};
use crate::error::ClientError;
use crate::types::ProductId;
use crate::validation::ProductForm;
use crate::view::pipeline::count_matching;
use crate::view::state::parse_sort;
use crate::view::{apply_view, PageSize, StockFilter, ViewState};

#[derive(Subcommand)]
pub enum ProductCommands {
    #[command(about = "List products with search, stock filter, sorting and paging")]
    List {
        #[arg(long, default_value = "", help = "Case-insensitive match on name or description")]
        search: String,
        #[arg(long, default_value = "any", help = "any, in-stock, low-stock or out-of-stock")]
        stock: String,
        #[arg(long, help = "name|price|stock followed by -asc or -desc")]
        sort: Option<String>,
        #[arg(long, default_value_t = 1, help = "Page number (1-based)")]
        page: usize,
        #[arg(long, help = "Rows per page: 5, 10, 20 or 50")]
        page_size: Option<usize>,
    },

    #[command(about = "Show one product")]
    Show {
        #[arg(help = "Product id")]
        id: ProductId,
    },

    #[command(about = "Create a product")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
    },

    #[command(about = "Update a product; omitted fields keep their current values")]
    Update {
        #[arg(help = "Product id")]
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
    },

    #[command(about = "Delete a product")]
    Delete {
        #[arg(help = "Product id")]
        id: ProductId,
        #[arg(long, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

pub async fn handle(cmd: ProductCommands, api_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let api = connect(api_url)?;

    match dispatch(cmd, &api, &output_format).await {
        Err(e) if e.downcast_ref::<ClientError>().is_some_and(ClientError::is_unauthorized) => {
            Err(e.context("Not signed in; run `tienda auth login <username>` first"))
        }
        other => other,
    }
}

async fn dispatch(cmd: ProductCommands, api: &HttpApi, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProductCommands::List {
            search,
            stock,
            sort,
            page,
            page_size,
        } => {
            let page_size = PageSize::new(page_size.unwrap_or(config().view.default_page_size))?;
            let mut view = ViewState {
                page,
                search,
                stock: stock.parse::<StockFilter>()?,
                sort: parse_sort(sort.as_deref().unwrap_or(""))?,
                ..ViewState::with_page_size(page_size)
            };

            let products = api.list_products().await?;
            view.clamp_page(count_matching(&products, &view));
            output_products(output_format, &apply_view(&products, &view))
        }
        ProductCommands::Show { id } => {
            let product = api.get_product(id).await?;
            output_product(output_format, &product)
        }
        ProductCommands::Create {
            name,
            description,
            price,
            stock,
        } => {
            let draft = ProductForm::new(name, description, price, stock)
                .parse()
                .map_err(ClientError::from)?;
            let body = api.create_product(&draft).await?;
            output_success(output_format, "Product added successfully", Some(response_data(body)))
        }
        ProductCommands::Update {
            id,
            name,
            description,
            price,
            stock,
        } => {
            let current = api.get_product(id).await?;
            let mut form = ProductForm::from(&current);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(price) = price {
                form.price = price;
            }
            if let Some(stock) = stock {
                form.stock = stock;
            }

            let draft = form.parse().map_err(ClientError::from)?;
            api.update_product(id, &draft).await?;
            output_success(output_format, "Product updated successfully", Some(json!({ "id": id })))
        }
        ProductCommands::Delete { id, yes } => {
            let prompt = "Are you sure you want to delete this product?";
            let confirmed = if yes {
                AssumeYes(true).confirm(prompt).await
            } else {
                StdinConfirm.confirm(prompt).await
            };
            if !confirmed {
                return output_success(output_format, "Delete cancelled", Some(json!({ "deleted": false })));
            }

            api.delete_product(id).await?;
            output_success(
                output_format,
                "Product deleted successfully",
                Some(json!({ "id": id, "deleted": true })),
            )
        }
    }
}

/// Whatever the server sent back, under `response`; the shape is not relied on
fn response_data(body: Value) -> Value {
    json!({ "response": body })
}
