//! # dg-trigger
//!
//! Trigger binary — loads settings, picks the launcher and either serves
//! `/invoke` over HTTP or handles one event from a file.

#![deny(unsafe_code)]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dg_logging::LogFormat;
use dg_settings::TriggerSettings;
use dg_trigger::{TriggerHandler, TriggerServer};
use serde_json::Value;

/// Starts Deepgram integrator sessions for contact-flow events.
#[derive(Parser, Debug)]
#[command(name = "dg-trigger", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `POST /invoke` and `GET /health`.
    Serve {
        /// Host to bind (overrides settings).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides settings).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Handle one event and print the result object.
    Handle {
        /// Event JSON file, or `-` for stdin.
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = dg_settings::load_settings().context("Failed to load settings")?;
    dg_logging::init_subscriber(
        &settings.logging.level,
        LogFormat::from_json_flag(settings.logging.json),
    );

    let handler = TriggerHandler::from_settings(&settings).await;

    match cli.command {
        Command::Serve { host, port } => serve(&settings, handler, host, port).await,
        Command::Handle { event } => {
            let event = read_event(&event)?;
            let result = handler.handle(&event).await;
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
    }
}

async fn serve(
    settings: &TriggerSettings,
    handler: TriggerHandler,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = settings.server.clone();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let server = TriggerServer::new(config, handler);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("dg-trigger listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown_token().cancel();
    let _ = handle.await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn read_event(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        let _ = std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Event is not valid JSON")
}
