use std::io::Write;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::OutputFormat;
use crate::types::Product;
use crate::util::format_price;
use crate::view::table::{render_pagination, render_rows, EMPTY_PLACEHOLDER};
use crate::view::PageView;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

fn products_json(view: &PageView<'_>) -> Value {
    json!({
        "products": view.rows,
        "page": view.page,
        "page_size": view.page_size,
        "total": view.total,
        "showing_start": view.showing_start,
        "showing_end": view.showing_end,
        "has_previous": view.has_previous,
        "has_next": view.has_next,
    })
}

/// Output one page of the product table
pub fn output_products(output_format: &OutputFormat, view: &PageView<'_>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&products_json(view))?);
        }
        OutputFormat::Text => {
            println!("{}", render_rows(view.rows.iter().copied(), EMPTY_PLACEHOLDER));
            println!();
            println!("{}", render_pagination(view));
        }
    }
    Ok(())
}

/// Output a single product in the appropriate format
pub fn output_product(output_format: &OutputFormat, product: &Product) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(product)?);
        }
        OutputFormat::Text => {
            println!("ID: {}", product.id);
            println!("Name: {}", product.name);
            println!("Description: {}", product.description);
            println!("Price: {}", format_price(product.price));
            println!("Stock: {}", product.stock);
            if let Some(created_at) = product.created_at {
                println!("Created: {}", created_at.to_rfc3339());
            }
            if let Some(updated_at) = product.updated_at {
                println!("Updated: {}", updated_at.to_rfc3339());
            }
        }
    }
    Ok(())
}

/// Use the provided value or ask for it on the terminal
pub async fn value_or_prompt(provided: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }

    eprint!("{}: ", prompt);
    std::io::stderr().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        anyhow::bail!("{} is required", prompt);
    }
    Ok(value)
}
