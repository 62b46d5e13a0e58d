//! Server configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: String,

    /// Listen port
    pub port: u16,

    /// Snapshot file loaded at start and written on shutdown
    pub data_file: Option<PathBuf>,

    /// Seconds between background saves of a changed store; 0 saves only on shutdown
    pub save_interval_secs: u64,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,

    /// Report rendering options
    pub report: ReportConfig,
}

impl ServerConfig {
    /// Load configuration from file, `PROBABILITAS_*` env vars, and CLI overrides
    ///
    /// Later sources win. A missing config file is not an error.
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::new(config_path, config::FileFormat::Yaml).required(false),
            )
            .add_source(
                config::Environment::with_prefix("PROBABILITAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", config_path))?;

        let mut config: Self = settings
            .try_deserialize()
            .context("invalid configuration")?;

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(data_file) = &cli.data_file {
            config.data_file = Some(data_file.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.report.decimal_places > 10 {
            anyhow::bail!(
                "report.decimal_places must be at most 10, got {}",
                self.report.decimal_places
            );
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1".to_string(),
            port: 8080,
            data_file: None,
            save_interval_secs: 30,
            max_body_bytes: default_max_body_bytes(),
            report: ReportConfig::default(),
        }
    }
}

/// Report rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Prefix shown before the project title
    pub title_prefix: String,

    /// Decimal places for percentages
    pub decimal_places: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title_prefix: "Naive Bayes Analysis".to_string(),
            decimal_places: 2,
        }
    }
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli::parse_from(["probabilitas-server"]);
        let config = ServerConfig::load("/nonexistent/probabilitas.yaml", &cli).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.report.decimal_places, 2);
        assert!(config.data_file.is_none());
        assert_eq!(config.save_interval_secs, 30);
    }

    #[test]
    fn test_file_then_cli_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "listen: 0.0.0.0\nport: 9000\nsave_interval_secs: 5\nreport:\n  title_prefix: Diagnosis\n  decimal_places: 3\n",
        )
        .unwrap();

        let cli = Cli::parse_from(["probabilitas-server", "--port", "9100"]);
        let config = ServerConfig::load(path.to_str().unwrap(), &cli).unwrap();

        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert_eq!(config.report.title_prefix, "Diagnosis");
        assert_eq!(config.report.decimal_places, 3);
        assert_eq!(config.save_interval_secs, 5);
    }

    #[test]
    fn test_rejects_excessive_precision() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "report:\n  decimal_places: 40\n").unwrap();

        let cli = Cli::parse_from(["probabilitas-server"]);
        assert!(ServerConfig::load(path.to_str().unwrap(), &cli).is_err());
    }
}
