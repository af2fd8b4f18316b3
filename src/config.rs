//! Configuration for slowtask
//!
//! The only real setting is the listen address. Logging knobs ride along so
//! `main` has a single validated value to work from.

use crate::cli::{Cli, DEFAULT_PORT, LogFormat};
use crate::error::{AppError, AppResult};
use std::net::{IpAddr, SocketAddr};

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Build and validate configuration from parsed command-line arguments
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the host is not an IP address or the
    /// port is not a non-zero number.
    pub fn from_cli(cli: Cli) -> AppResult<Self> {
        let host = cli.host.parse::<IpAddr>().map_err(|e| {
            AppError::Config(format!("host '{}' is not an IP address: {}", cli.host, e))
        })?;

        let port = resolve_port(cli.port.as_deref())?;

        if cli.log_level.trim().is_empty() {
            return Err(AppError::Config("log level must not be empty".to_string()));
        }

        Ok(Self {
            server: ServerConfig {
                host,
                port,
            },
            observability: ObservabilityConfig {
                log_level: cli.log_level,
                log_format: cli.log_format,
            },
        })
    }
}

/// Resolve the listen port from its raw flag or `PORT` value
///
/// A missing or blank value means [`DEFAULT_PORT`].
///
/// # Errors
///
/// Returns `AppError::Config` if the value is not a port number or is zero.
pub fn resolve_port(raw: Option<&str>) -> AppResult<u16> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_PORT),
        Some(raw) => raw,
    };

    let port = raw.parse::<u16>().map_err(|e| {
        AppError::Config(format!("port '{}' is not a valid port number: {}", raw, e))
    })?;

    if port == 0 {
        return Err(AppError::Config("port must be non-zero".to_string()));
    }

    Ok(port)
}
