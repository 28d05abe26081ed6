mod handlers;
mod protocol;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use oauth_token::{ErrorCode, Provider};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use protocol::{error, JsonRpcRequest};

#[derive(Parser, Debug)]
#[command(name = "terraform-provider-oauth", version)]
struct Args {
    /// Log filter, overriding RUST_LOG (e.g. "debug" or "oauth_token=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve JSON-RPC requests on stdin/stdout (default)
    Serve,
    /// Print the schema of every data source
    Schema,
    /// Read one data source and print its state
    Read {
        /// Data source type name, e.g. oauth_refresh_access_token
        data_source: String,
        /// JSON config file; stdin when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // stdout carries protocol traffic; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let provider = Provider::new().context("failed to initialize provider")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&provider).await,
        Command::Schema => {
            let schema = handlers::schema_response(&provider);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Read {
            data_source,
            config,
        } => {
            let raw = match config {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read config file {}", path.display()))?,
                None => {
                    let mut raw = String::new();
                    tokio::io::stdin().read_to_string(&mut raw).await?;
                    raw
                }
            };
            let config = if raw.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&raw).context("config is not valid JSON")?
            };

            let state = provider.read(&data_source, config).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
    }
}

async fn serve(provider: &Provider) -> anyhow::Result<()> {
    tracing::info!("Serving JSON-RPC on stdio");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => {
                if request.id.is_none() {
                    // Notifications get no response
                    tracing::debug!(method = %request.method, "Ignoring notification");
                    continue;
                }
                handlers::handle_request(provider, request).await
            }
            Err(e) => error(
                serde_json::Value::Null,
                ErrorCode::ParseError.code(),
                format!("parse error: {}", e),
                None,
            ),
        };

        stdout.write_all(serde_json::to_string(&response)?.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
