//! Mock API Server - CLI Entry Point

use anyhow::Result;
use clap::Parser;
use mock_api_server::server::build_router;
use mock_api_server::store::InMemoryStore;
use mock_api_server::{MockEngine, MockServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "mock-api-server",
    about = "Mock API server - schema-driven synthetic JSON responses for project endpoints",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mock-server.yaml")]
    config: PathBuf,

    /// Address to listen on (overrides settings.listen)
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print default config if requested
    if args.print_config {
        let default_config = include_str!("../demos/default-config.yaml");
        println!("{}", default_config);
        return Ok(());
    }

    // Load configuration
    let config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        MockServerConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using default configuration (no projects)");
        MockServerConfig::default()
    };

    // Validate and exit if requested
    if args.validate {
        println!(
            "Configuration is valid ({} projects, {} endpoints defined)",
            config.projects.len(),
            config.endpoint_count()
        );
        return Ok(());
    }

    let store = Arc::new(InMemoryStore::from_config(&config));
    let listen = args.listen.unwrap_or(config.settings.listen);
    let prefix = config.settings.mount_prefix.clone();
    let engine = Arc::new(MockEngine::new(store.clone(), config.settings));

    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(args.config.clone(), store));

    let app = build_router(engine);
    let listener = TcpListener::bind(listen).await?;
    let mount = format!("/{}/{{project_id}}/...", prefix);
    info!(address = %listen, mount = %mount, "Mock API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Reload project definitions from `path` on every SIGHUP.
///
/// Settings are fixed at startup; only projects are replaced. A file that
/// fails to load leaves the current projects in place.
#[cfg(unix)]
async fn reload_on_hangup(path: PathBuf, store: Arc<InMemoryStore>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to install SIGHUP handler; reload disabled");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        match MockServerConfig::from_file(&path) {
            Ok(config) => {
                store.replace_all(&config).await;
                info!(
                    path = ?path,
                    projects = config.projects.len(),
                    endpoints = config.endpoint_count(),
                    "Configuration reloaded"
                );
            }
            Err(e) => error!(path = ?path, error = %e, "Reload failed; keeping current configuration"),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
