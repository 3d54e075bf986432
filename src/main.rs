//! vaiz-mcp-proxy - Resilient stdio-to-HTTP bridge for the Model Context Protocol
#![doc = "Main entry point for the MCP proxy."]

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vaiz_mcp_proxy::cli::Cli;
use vaiz_mcp_proxy::config::Config;
use vaiz_mcp_proxy::mcp;

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse_args();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(config.debug);

    let out = mcp::framer::shared_output();
    let coordinator = mcp::coordinator::Coordinator::new(&config, out)?;

    let stdin = tokio::io::stdin();
    tokio::select! {
        result = mcp::framer::read_loop(stdin, {
            let coordinator = Arc::clone(&coordinator);
            move |value| {
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    coordinator.handle_message(value).await;
                });
            }
        }) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "stdin read loop terminated");
            } else {
                tracing::info!("stdin closed; shutting down");
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

/// Resolves on `SIGINT` (or `Ctrl+C`) or `SIGTERM`.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        signal.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Stderr-only tracing, gated by the resolved `Config::debug` (itself read
/// from `VAIZ_DEBUG`). Stdout is reserved for the JSON-RPC wire protocol.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "vaiz_mcp_proxy=debug"
    } else {
        "vaiz_mcp_proxy=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
