//! Sakura CLI and interaction webhook server entry point.
//!
//! Binary name: `sakura`
//!
//! Parses CLI arguments, loads and validates configuration, then starts the
//! webhook server.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use sakura_infra::config::{Settings, apply_env_overrides, default_config_path, load_config};
use sakura_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "sakura", &mut std::io::stdout());
        }

        Commands::Serve {
            port,
            host,
            config,
            otel,
        } => {
            init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), otel)
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

            let result = serve(config, host, port).await;
            shutdown_tracing();
            result?;
        }
    }

    Ok(())
}

async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let config_path = config_path.unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path).await;
    apply_env_overrides(&mut config);
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let settings = Settings::from_config(config).context("invalid configuration")?;
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState::from_settings(settings)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, model = state.chat.model(), "interaction server listening");
    println!(
        "  {} Sakura listening on {}",
        console::style("🌸").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// If a handler cannot be installed, that signal source is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
