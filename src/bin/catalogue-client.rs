use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use catalogue_client::config::loader::file_to_config;
use catalogue_client::observability::metrics::get_metrics;
use catalogue_client::utils::logging::{self, LogLevel};
use catalogue_client::{CallContext, CatalogueClient};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "catalogue-client.yaml")]
    config: PathBuf,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Abort the lookup after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print Prometheus metrics to stderr before exiting.
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one work
    Work { identifier: String },
    /// Fetch several works
    Works {
        #[arg(required = true, num_args = 1..)]
        identifiers: Vec<String>,
    },
    /// Fetch one person
    Person { identifier: String },
    /// Fetch several people
    People {
        #[arg(required = true, num_args = 1..)]
        identifiers: Vec<String>,
    },
    /// Fetch one article
    Article { identifier: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config and logging
    // -------------------------------

    let args = Args::parse();
    let file_config = file_to_config(&args.config).await?;
    let logging_config = logging::effective_config(&file_config.logging, args.log_level);
    logging::init_logging(&logging_config);

    // -------------------------------
    // 2. Build the client and the call context
    // -------------------------------

    let client = CatalogueClient::new(file_config.client_config())?;

    let shutdown = CancellationToken::new();
    let mut ctx = CallContext::new().with_cancellation(shutdown.clone());
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling request");
            shutdown.cancel();
        }
    });

    // -------------------------------
    // 3. Run the lookup
    // -------------------------------

    info!(config = %args.config.display(), "catalogue client starting");
    let outcome = run(&client, &ctx, args.command).await;

    if args.print_metrics {
        eprintln!("{}", get_metrics().await.render()?);
    }
    println!("{}", outcome?);
    Ok(())
}

async fn run(client: &CatalogueClient, ctx: &CallContext, command: Command) -> Result<String> {
    match command {
        Command::Work { identifier } => {
            pretty(&client.works().get_by_identifier(ctx, &identifier).await?)
        }
        Command::Works { identifiers } => {
            pretty(&client.works().get_by_identifiers(ctx, &identifiers).await?)
        }
        Command::Person { identifier } => {
            pretty(&client.people().get_by_identifier(ctx, &identifier).await?)
        }
        Command::People { identifiers } => {
            pretty(&client.people().get_by_identifiers(ctx, &identifiers).await?)
        }
        Command::Article { identifier } => {
            pretty(&client.articles().get_by_identifier(ctx, &identifier).await?)
        }
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("cannot render response as JSON")
}
