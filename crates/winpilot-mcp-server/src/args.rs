//! CLI argument parsing with clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// MCP server for Win32 window capture and input automation.
///
/// Speaks newline-delimited JSON-RPC on stdin/stdout and exposes the
/// `capture`, `click`, `key` and `wait` tools. Logs go to stderr; set
/// RUST_LOG=debug to see dropped lines and dispatch details.
#[derive(Debug, Parser)]
#[command(name = "winpilot-mcp-server", version)]
pub struct Cli {
    /// JSON config file [default: winpilot-mcp.json in the working directory]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Default window class for calls that do not name one (overrides the config file)
    #[arg(long, value_name = "CLASS")]
    pub hwnd_class: Option<String>,
}
