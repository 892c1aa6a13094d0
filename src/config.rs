//! Runtime configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | listen address |
//! | `PORT` | `3000` | listen port |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | `info` | tracing filter, read by [`telemetry`](crate::telemetry) |
//!
//! A `.env` file in the working directory is loaded first when present.

use std::net::{IpAddr, SocketAddr};

use crate::error::Error;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Reads the process environment (after loading `.env`, if any).
    pub fn from_env() -> Result<Self, Error> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host.trim().parse().map_err(|e| Error::Config {
                key: "HOST",
                message: format!("`{host}`: {e}"),
            })?;
        }

        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|e| Error::Config {
                key: "PORT",
                message: format!("`{port}`: {e}"),
            })?;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "text" | "" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => {
                    return Err(Error::Config {
                        key: "LOG_FORMAT",
                        message: format!("expected `text` or `json`, got `{other}`"),
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
