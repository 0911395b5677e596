pub mod commands;
pub mod session;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;

#[derive(Parser)]
#[command(name = "tienda")]
#[command(about = "Tienda CLI - sign in and manage the product inventory")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Inventory API base URL (overrides TIENDA_API_URL)")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Registration, sign in and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List, inspect and change products")]
    Products {
        #[command(subcommand)]
        cmd: commands::products::ProductCommands,
    },

    #[command(about = "Interactive product page")]
    Shell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config().api.base_url.clone());

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &api_url, output_format).await,
        Commands::Products { cmd } => commands::products::handle(cmd, &api_url, output_format).await,
        Commands::Shell => commands::shell::handle(&api_url).await,
    }
}
