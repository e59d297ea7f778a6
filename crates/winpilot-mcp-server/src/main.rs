//! MCP server for Win32 UI automation
//!
//! This server exposes window capture, mouse clicks, key presses and a wait
//! tool over newline-delimited JSON-RPC on stdin/stdout.

mod args;
mod config;
mod constants;
mod coords;
mod engine;
mod errors;
mod keymap;
mod platform;
mod requests;
mod tools;
mod transport;
mod window;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Cli;
use crate::config::ServerConfig;
use crate::engine::ProtocolEngine;
use crate::tools::ToolExecutor;

#[cfg(target_os = "windows")]
fn native_desktop() -> platform::Win32Desktop {
    platform::Win32Desktop::new()
}

#[cfg(not(target_os = "windows"))]
fn native_desktop() -> platform::UnsupportedDesktop {
    tracing::warn!("Not running on Windows: window, capture and input tools will fail");
    platform::UnsupportedDesktop::new()
}

// Requests are handled strictly one after another, so one thread is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is used for MCP communication)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref());
    let default_class = config.resolve_hwnd_class(cli.hwnd_class.as_deref());

    tracing::info!(
        "Starting winpilot-mcp server (default window class: {})",
        default_class.as_deref().unwrap_or("none")
    );

    let engine = ProtocolEngine::new(ToolExecutor::new(native_desktop(), default_class));

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    transport::serve(&engine, &mut reader, &mut writer).await?;

    tracing::info!("Input closed, shutting down");
    Ok(())
}
