use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ghost::banner::FileSink;
use ghost::config::{ScrapeConfig, ServerConfig, StoreConfig, DEFAULT_TERM};
use ghost::pipeline;
use ghost::server::create_router;
use ghost::store::{DocumentStore, MemoryStore, SqliteStore};
use ghost::types::AppState;

/// ghost - find empty classrooms from the course schedule
#[derive(Parser, Debug)]
#[command(name = "ghost", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one term into the database
    Scrape(ScrapeArgs),
    /// Serve the read API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Term code, e.g. 202610
    #[arg(long, env = "GHOST_TERM", default_value = DEFAULT_TERM)]
    term: String,

    /// Comma separated subject codes; all subjects when omitted
    #[arg(long, env = "GHOST_SUBJECTS", value_delimiter = ',')]
    subjects: Vec<String>,

    /// SQLite database path
    #[arg(long, env = "GHOST_DB")]
    db: Option<String>,

    /// Registration portal base URL
    #[arg(long, env = "GHOST_BASE_URL")]
    base_url: Option<String>,

    /// Maximum concurrent room writes
    #[arg(long, env = "GHOST_ROOM_WRITERS")]
    room_writers: Option<usize>,

    /// Pause between pages, in milliseconds
    #[arg(long, env = "GHOST_PAGE_DELAY_MS")]
    page_delay_ms: Option<u64>,

    /// Directory for responses the scraper could not understand
    #[arg(long, env = "GHOST_DEBUG_DIR")]
    debug_dir: Option<PathBuf>,

    /// Write to an in-memory store and only report counts
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "HOST")]
    host: Option<String>,

    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database path
    #[arg(long, env = "GHOST_DB")]
    db: Option<String>,
}

impl ScrapeArgs {
    fn scrape_config(&self) -> ScrapeConfig {
        let defaults = ScrapeConfig::default();
        ScrapeConfig {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            term: self.term.clone(),
            subjects: self
                .subjects
                .iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            page_delay: self
                .page_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.page_delay),
            room_writers: self.room_writers.unwrap_or(defaults.room_writers),
            debug_dir: self.debug_dir.clone().unwrap_or(defaults.debug_dir),
            ..defaults
        }
    }
}

fn store_config(db: Option<&str>) -> StoreConfig {
    db.map(|db_path| StoreConfig {
        db_path: db_path.to_string(),
    })
    .unwrap_or_default()
}

async fn scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = args.scrape_config();

    let store: Arc<dyn DocumentStore> = if args.dry_run {
        info!("Dry run, writing to an in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let store_config = store_config(args.db.as_deref());
        info!(db = %store_config.db_path, "Opening database");
        Arc::new(
            SqliteStore::open(&store_config.db_path)
                .with_context(|| format!("failed to open {}", store_config.db_path))?,
        )
    };

    let sink = FileSink::new(&config.debug_dir);
    let summary = pipeline::run_scrape(&config, store, &sink)
        .await
        .context("scrape aborted")?;

    if summary.writes.failures() > 0 {
        warn!(
            run_id = %summary.run_id,
            failed = summary.writes.failures(),
            "Some documents were not written"
        );
    }
    info!(?summary, "Done");
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let server_config = ServerConfig {
        host: args.host.unwrap_or(defaults.host),
        port: args.port.unwrap_or(defaults.port),
    };
    let store_config = store_config(args.db.as_deref());

    let store = SqliteStore::open(&store_config.db_path)
        .with_context(|| format!("failed to open {}", store_config.db_path))?;
    let app_state = Arc::new(AppState::new(Arc::new(store)));

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, db = %store_config.db_path, "Server listening");

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found, relying on environment variables");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Scrape(args) => scrape(args).await,
        Command::Serve(args) => serve(args).await,
    }
}
