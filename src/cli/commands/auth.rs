use clap::Subcommand;
use serde_json::json;

use crate::api::InventoryApi;
use crate::cli::session::{clear_session, connect, persist};
use crate::cli::utils::{output_success, value_or_prompt};
use crate::cli::OutputFormat;
use crate::types::Credentials;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign in and keep the session for later commands")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, api_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let api = connect(api_url)?;

    match cmd {
        AuthCommands::Register { username, password } => {
            let password = value_or_prompt(password, "Password").await?;
            api.register(&Credentials::new(username.clone(), password)).await?;
            output_success(
                &output_format,
                "Registration successful. Please sign in.",
                Some(json!({ "username": username })),
            )
        }
        AuthCommands::Login { username, password } => {
            let password = value_or_prompt(password, "Password").await?;
            let user = api.login(&Credentials::new(username, password)).await?;
            persist(&api, Some(user.clone()))?;
            output_success(
                &output_format,
                &format!("Signed in as {}", user.label()),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            let result = api.logout().await;
            clear_session()?;
            result?;
            output_success(&output_format, "Signed out successfully", None)
        }
        AuthCommands::Status => match api.check_session().await {
            Ok(user) => output_success(
                &output_format,
                &format!("Signed in as {}", user.label()),
                Some(json!({ "authenticated": true, "user": user })),
            ),
            Err(e) if e.is_unauthorized() => output_success(
                &output_format,
                "Not signed in",
                Some(json!({ "authenticated": false })),
            ),
            Err(e) => Err(e.into()),
        },
    }
}
