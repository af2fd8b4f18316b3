//! Command-line interface for slowtask
//!
//! Every option can also come from the environment, so `PORT=9000 slowtask`
//! and `slowtask --port 9000` are equivalent.

use clap::{Parser, ValueEnum};

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Minimal HTTP service with a simulated slow task and Prometheus metrics
#[derive(Debug, Parser)]
#[command(name = "slowtask")]
#[command(version)]
#[command(about = "Minimal HTTP service with a simulated slow task and Prometheus metrics")]
pub struct Cli {
    /// IP address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on [default: 8000]
    ///
    /// Kept as text so an empty `PORT=` falls back to the default instead of
    /// failing to parse; see `Config::from_cli`.
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Output format for logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-field lines
    #[default]
    Pretty,
    /// Single-line abbreviated output
    Compact,
    /// One JSON object per line, for log shippers
    Json,
}
