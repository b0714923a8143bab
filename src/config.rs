//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.collatz.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".collatz.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Sequence engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Show a progress bar during range scans.
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            progress: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Sequence engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum transitions per trajectory. Unset means unbounded.
    #[serde(default)]
    pub max_iterations: Option<u64>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment reported by `/health`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Largest `end - start` accepted by `/batch`.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: i64,

    /// Largest `end - start` accepted by `/longest`.
    #[serde(default = "default_longest_limit")]
    pub longest_limit: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            batch_limit: default_batch_limit(),
            longest_limit: default_longest_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_batch_limit() -> i64 {
    1000
}

fn default_longest_limit() -> i64 {
    10000
}

/// Persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the JSON record files. Unset disables persistence.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.collatz.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.verbose {
            self.general.verbose = true;
        }
        if args.no_progress || args.quiet {
            self.general.progress = false;
        }

        if let Some(max_iterations) = args.max_iterations {
            self.engine.max_iterations = Some(max_iterations);
        }

        if let Some(ref store) = args.store {
            self.store.directory = Some(store.clone());
        }

        if let Some(crate::cli::Command::Serve {
            host,
            port,
            environment,
        }) = &args.command
        {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
            if let Some(environment) = environment {
                self.server.environment = environment.clone();
            }
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command, OutputFormat};

    fn make_args(command: Option<Command>) -> Args {
        Args {
            command,
            config: None,
            verbose: false,
            quiet: false,
            format: OutputFormat::Text,
            output: None,
            max_iterations: None,
            store: None,
            no_progress: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.batch_limit, 1000);
        assert_eq!(config.server.longest_limit, 10000);
        assert!(config.engine.max_iterations.is_none());
        assert!(config.store.directory.is_none());
        assert!(config.general.progress);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[engine]
max_iterations = 5000

[server]
port = 9000
batch_limit = 50

[store]
directory = "data"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.engine.max_iterations, Some(5000));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.batch_limit, 50);
        assert_eq!(config.server.longest_limit, 10000);
        assert_eq!(config.store.directory, Some(PathBuf::from("data")));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[engine]\nmax_iterations = 10\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.engine.max_iterations, Some(10));

        std::fs::write(dir.path().join(CONFIG_FILE), "[engine\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.engine.max_iterations = Some(10);

        let mut args = make_args(Some(Command::Serve {
            host: Some("127.0.0.1".to_string()),
            port: None,
            environment: Some("production".to_string()),
        }));
        args.store = Some(PathBuf::from("records"));
        args.no_progress = true;

        config.merge_with_args(&args);

        assert_eq!(config.engine.max_iterations, Some(10));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, "production");
        assert_eq!(config.store.directory, Some(PathBuf::from("records")));
        assert!(!config.general.progress);

        args.max_iterations = Some(500);
        config.merge_with_args(&args);
        assert_eq!(config.engine.max_iterations, Some(500));
    }
}
