/*
newsbrief - single-binary main.rs
This binary starts the Rocket HTTP server that serves the NewsBrief page and
its JSON API.
*/

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newsbrief::gateway::SummarizationGateway;
use newsbrief::ingestion::FeedClient;
use newsbrief::llm::remote::RemoteSummarizer;
use newsbrief::llm::Summarizer;
use newsbrief::recency::DEFAULT_WINDOW_DAYS;
use newsbrief::server::{launch_rocket, AppState};
use newsbrief::sessions::SessionRegistry;

const DEFAULT_CACHE_SECONDS: u64 = 3600;
const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 20;

#[derive(Parser, Debug)]
#[command(name = "newsbrief", about = "NewsBrief server: AI article summaries grouped by country")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override bind address from config
    #[arg(long)]
    address: Option<String>,

    /// Override bind port from config
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            anyhow::bail!("Config file not found: {}", p.display());
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let feed = Arc::new(FeedClient::new(
        &config.feed.url,
        config.feed.window_days.unwrap_or(DEFAULT_WINDOW_DAYS),
        config.feed.cache_seconds.unwrap_or(DEFAULT_CACHE_SECONDS),
        config
            .feed
            .fetch_timeout_seconds
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS),
    )?);
    info!(url = %feed.url(), window_days = feed.window_days(), "feed client initialized");

    let summarizer = build_summarizer(&config)?;
    let state = AppState {
        started_at: Utc::now(),
        feed,
        gateway: Arc::new(SummarizationGateway::new(summarizer)),
        sessions: Arc::new(SessionRegistry::new()),
    };

    let bind = args
        .address
        .or_else(|| config.server.as_ref().and_then(|s| s.bind.clone()));
    let port = args
        .port
        .or_else(|| config.server.as_ref().and_then(|s| s.port));

    launch_rocket(state, bind, port).await
}

/// Build the remote summarization provider from the `[llm.remote]` section,
/// resolving the API key from the environment variable named in config.
fn build_summarizer(config: &Config) -> Result<Arc<dyn Summarizer>> {
    let remote = config
        .llm
        .as_ref()
        .and_then(|l| l.remote.as_ref())
        .context("missing [llm.remote] configuration")?;

    let api_url = remote
        .api_url
        .as_deref()
        .context("missing llm.remote.api_url in configuration")?;

    let api_key = match remote.api_key_env.as_deref() {
        Some(var) => std::env::var(var).unwrap_or_else(|_| {
            warn!(var, "API key environment variable not set; proceeding without a key");
            String::new()
        }),
        None => String::new(),
    };

    let model = remote.model.as_deref().unwrap_or("gpt-4o-mini");
    let provider = RemoteSummarizer::new(api_url, api_key, model).with_defaults(
        remote.timeout_seconds.unwrap_or(30),
        remote.max_tokens.unwrap_or(400),
        remote.temperature.unwrap_or(0.5),
    );
    info!(api_url, model, "remote summarizer initialized");

    Ok(Arc::new(provider))
}
