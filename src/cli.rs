//! Command-line interface definition
//!
//! The proxy has no subcommands: `--help`/`--version` are handled by clap's
//! derive, and any other argument is accepted and ignored so future editor
//! integrations can pass positional hints without breaking startup.

use clap::Parser;

/// Resilient stdio-to-HTTP bridge for the Model Context Protocol.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vaiz-mcp-proxy")]
#[command(version, about, long_about = None)]
#[command(allow_hyphen_values = true)]
pub struct Cli {
    /// Accepted and ignored; reserved for future editor-supplied hints.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
