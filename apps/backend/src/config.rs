//! Service configuration read from the environment.

use std::path::PathBuf;

use anyhow::Context;
use drill_core::DEFAULT_TOLERANCE;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root directory for saved progress.
    pub data_dir: PathBuf,
    /// Tolerance given to newly created sessions.
    pub default_tolerance: u8,
}

impl Config {
    /// Read `HOST`, `PORT`, `DATA_DIR` and `DEFAULT_TOLERANCE`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => 3000,
        };

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let default_tolerance = match lookup("DEFAULT_TOLERANCE") {
            Some(raw) => {
                let value: u8 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DEFAULT_TOLERANCE must be 0-100, got {:?}", raw))?;
                anyhow::ensure!(value <= 100, "DEFAULT_TOLERANCE must be 0-100, got {}", value);
                value
            }
            None => DEFAULT_TOLERANCE,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            default_tolerance,
        })
    }

    /// Configuration for tests and embedding: everything default except the data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: data_dir.into(),
            default_tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
