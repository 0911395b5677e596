use clap::Parser;
use tienda_client::cli::{utils::output_error, Cli, OutputFormat};
use tienda_client::error::ClientError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so TIENDA_API_URL and friends can live next to the binary
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = tienda_client::config::config();
    tracing::debug!("Using {} in {:?} mode", config.api.base_url, config.environment);

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = tienda_client::cli::run(cli).await {
        let code = e.downcast_ref::<ClientError>().map(ClientError::error_code);
        let message = match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => format!("{e:?}"),
            _ => format!("{e:#}"),
        };
        output_error(&output_format, &message, code)?;
        std::process::exit(1);
    }

    Ok(())
}
