//! Configuration management for the scoped-store simulator.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::simulate::SimulationConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulation workload.
    pub simulation: SimulationSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Simulation configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Number of independent stores.
    pub stores: usize,
    /// Sessions run against each store.
    pub sessions_per_store: usize,
    /// Initial capacity of the counter table.
    pub table_capacity: usize,
    /// Fail every N-th session (0 = never).
    pub fail_every: usize,
    /// Reset all cells at the start of every N-th session (0 = never).
    pub reset_every: usize,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            stores: defaults.stores,
            sessions_per_store: defaults.sessions_per_store,
            table_capacity: defaults.table_capacity,
            fail_every: defaults.fail_every,
            reset_every: defaults.reset_every,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Some(stores) = env_usize("SCOPED_STORE_STORES") {
            self.simulation.stores = stores;
        }

        if let Some(sessions) = env_usize("SCOPED_STORE_SESSIONS") {
            self.simulation.sessions_per_store = sessions;
        }

        if let Some(capacity) = env_usize("SCOPED_STORE_CAPACITY") {
            self.simulation.table_capacity = capacity;
        }

        if let Some(every) = env_usize("SCOPED_STORE_FAIL_EVERY") {
            self.simulation.fail_every = every;
        }

        if let Some(every) = env_usize("SCOPED_STORE_RESET_EVERY") {
            self.simulation.reset_every = every;
        }

        if let Ok(level) = std::env::var("SCOPED_STORE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(stores) = args.stores {
            self.simulation.stores = stores;
        }

        if let Some(sessions) = args.sessions {
            self.simulation.sessions_per_store = sessions;
        }

        if let Some(capacity) = args.capacity {
            self.simulation.table_capacity = capacity;
        }

        if let Some(every) = args.fail_every {
            self.simulation.fail_every = every;
        }

        if let Some(every) = args.reset_every {
            self.simulation.reset_every = every;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to the simulator's workload parameters.
    pub fn to_simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        if self.simulation.stores == 0 {
            return Err(ConfigError::InvalidValue(
                "stores",
                self.simulation.stores.to_string(),
            ));
        }

        Ok(SimulationConfig {
            stores: self.simulation.stores,
            sessions_per_store: self.simulation.sessions_per_store,
            table_capacity: self.simulation.table_capacity,
            fail_every: self.simulation.fail_every,
            reset_every: self.simulation.reset_every,
        })
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Setting out of range.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidValue(name, value) => write!(f, "invalid value for {}: {}", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.simulation.stores, 2);
        assert_eq!(config.simulation.sessions_per_store, 3);
        assert_eq!(config.simulation.fail_every, 0);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "simulation": {
                "stores": 4,
                "sessions_per_store": 10,
                "fail_every": 3
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.simulation.stores, 4);
        assert_eq!(config.simulation.sessions_per_store, 10);
        assert_eq!(config.simulation.fail_every, 3);
        assert_eq!(config.simulation.table_capacity, 16); // Default
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            stores: Some(5),
            sessions: Some(7),
            reset_every: Some(2),
            log_level: Some("trace".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.simulation.stores, 5);
        assert_eq!(config.simulation.sessions_per_store, 7);
        assert_eq!(config.simulation.reset_every, 2);
        assert_eq!(config.simulation.table_capacity, 16);
        assert_eq!(config.log_filter(), "trace");
    }

    #[test]
    fn test_to_simulation_config() {
        let config = Config::default();
        let simulation = config.to_simulation_config().unwrap();
        assert_eq!(simulation, SimulationConfig::default());
    }

    #[test]
    fn test_zero_stores_rejected() {
        let mut config = Config::default();
        config.simulation.stores = 0;

        let result = config.to_simulation_config();
        assert!(matches!(result, Err(ConfigError::InvalidValue("stores", _))));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"stores\""));
        assert!(json.contains("\"level\""));
    }
}
