//! omegabrr entry point
//!
//! `arr` and `lists` run once and exit; `run` serves the HTTP API and
//! processes filters on the configured schedule.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use omegabrr::api::version::VersionResponse;
use omegabrr::app::{AppState, build_app};
use omegabrr::cli::{Cli, Command};
use omegabrr::config::{Config, resolve_config_path};
use omegabrr::jobs;
use omegabrr::services::{ProcessorService, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.command == Command::Version {
        let info = VersionResponse::current();
        println!("omegabrr {} (commit {})", info.version, info.commit);
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(cli.log_format)?;

    let config_path = resolve_config_path(cli.config.clone());
    let config = Arc::new(Config::load(config_path.as_deref())?);
    let processor = Arc::new(ProcessorService::new(config.clone())?);

    if cli.dry_run {
        info!("Dry run, filters will not be updated");
    }

    match cli.command {
        Command::Arr => Ok(report(processor.process_arrs(cli.dry_run).await?)),
        Command::Lists => Ok(report(processor.process_lists(cli.dry_run).await?)),
        Command::Run | Command::Version => {
            run(config, processor, cli.dry_run).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report(errors: Vec<String>) -> ExitCode {
    if errors.is_empty() {
        info!("Processing finished");
        return ExitCode::SUCCESS;
    }

    for message in &errors {
        error!("{}", message);
    }
    error!(failed = errors.len(), "Processing finished with errors");
    ExitCode::FAILURE
}

async fn run(
    config: Arc<Config>,
    processor: Arc<ProcessorService>,
    dry_run: bool,
) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting omegabrr");

    let mut scheduler =
        jobs::start_scheduler(processor.clone(), &config.cron_schedule(), dry_run).await?;
    let initial_run = jobs::spawn_initial_run(processor.clone(), dry_run);

    let app = build_app(AppState {
        config: config.clone(),
        processor,
    });

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    initial_run.abort();
    scheduler.shutdown().await?;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
