use chat_relay::{build_router, AppState, RelayConfig, SharedLogger};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "chat-relay",
    about = "Allow-listed chat-completion relay for ChatGPT and Gemini upstreams",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Append request events to this JSONL file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in chat_relay::config::config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = RelayConfig::find_and_load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let logger = match cli.log_file {
        Some(ref path) => SharedLogger::with_file(path)?,
        None => SharedLogger::in_memory(),
    };

    info!("chat-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  ChatGPT:   {}", config.upstream.chatgpt_url);
    info!("  Gemini:    {}", config.upstream.gemini_url);
    info!("  Identity:  header '{}'", config.identity_header);
    match config.upstream_timeout() {
        Some(t) => info!("  Timeout:   {}s", t.as_secs()),
        None => info!("  Timeout:   none"),
    }
    if let Some(ref path) = cli.log_file {
        info!("  Log file:  {}", path.display());
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config, logger.clone())?);

    info!("  Callers:   {} allowed", state.guard.len());
    if state.guard.is_empty() {
        warn!("allowed_ids is empty; every request will be denied");
        logger.warn("startup", "allowed_ids is empty; every request will be denied");
    }

    logger.info(
        "startup",
        format!(
            "Starting chat-relay port={} allowed={}",
            port,
            state.guard.len()
        ),
    );

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        logger.error("server", format!("Server stopped: {}", e));
        return Err(e.into());
    }

    Ok(())
}
