// Configuration module for reading Snake.toml
// Board size, sensing weights, normalization, network architecture and server settings

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::network::Activation;
use crate::sensor::{default_scales, FeatureVector, SenseWeights, NUM_FEATURES};

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub board: BoardConfig,
    pub senses: SenseWeights,
    pub normalization: NormalizationConfig,
    pub network: NetworkConfig,
    pub server: ServerConfig,
    pub debug: DebugConfig,
}

/// Grid dimensions, fixed for the lifetime of the process
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

/// Per-feature divisors applied before inference
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NormalizationConfig {
    pub scales: FeatureVector,
}

/// Layer widths after the input layer, and the activation used by all of them
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NetworkConfig {
    pub layers: Vec<usize>,
    pub activation: Activation,
}

/// Game server connection
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub venue: String,
    pub player_name: String,
    pub heartbeat_period_ms: u64,
}

impl ServerConfig {
    /// Websocket URL of the venue
    pub fn url(&self) -> String {
        format!("ws://{}:{}/{}", self.host, self.port, self.venue)
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed and validated configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        let (width, height) = (46, 34);
        Config {
            board: BoardConfig { width, height },
            senses: SenseWeights::default(),
            normalization: NormalizationConfig {
                scales: default_scales(width, height),
            },
            network: NetworkConfig {
                layers: vec![16, 7, 1],
                activation: Activation::Tanh,
            },
            server: ServerConfig {
                host: "localhost".to_string(),
                port: 8080,
                venue: "training".to_string(),
                player_name: "Neurotic".to_string(),
                heartbeat_period_ms: 2000,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "neurotic_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Could not load Snake.toml ({}), using hardcoded defaults", e);
                Self::default_hardcoded()
            })
    }

    /// Rejects configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.board.width == 0 || self.board.height == 0 {
            return Err(format!(
                "Board must not be empty (got {}x{})",
                self.board.width, self.board.height
            ));
        }

        if let Some(i) = self.normalization.scales.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(format!(
                "Normalization scale {} must be finite and nonzero (got {})",
                i, self.normalization.scales[i]
            ));
        }

        if self.network.layers.is_empty() || self.network.layers.contains(&0) {
            return Err(format!(
                "Network layers must be non-empty with nonzero widths (got {:?})",
                self.network.layers
            ));
        }

        if self.network.layers.last() != Some(&1) {
            return Err(format!(
                "Network must end in a single output unit (got {:?})",
                self.network.layers
            ));
        }

        if self.server.heartbeat_period_ms == 0 {
            return Err("Heartbeat period must be positive".to_string());
        }

        Ok(())
    }

    /// Flat parameter count the configured architecture expects
    pub fn parameter_count(&self) -> usize {
        let mut inputs = NUM_FEATURES;
        let mut total = 0;
        for &width in &self.network.layers {
            total += width * (inputs + 1);
            inputs = width;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameter_count() {
        let config = Config::default_hardcoded();
        assert_eq!(config.parameter_count(), 287);
    }

    #[test]
    fn test_hardcoded_defaults_are_valid() {
        assert!(Config::default_hardcoded().validate().is_ok());
    }

    #[test]
    fn test_server_url() {
        let config = Config::default_hardcoded();
        assert_eq!(config.server.url(), "ws://localhost:8080/training");
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml")
            .expect("Snake.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.board, hardcoded_config.board);
        assert_eq!(file_config.senses, hardcoded_config.senses);
        assert_eq!(file_config.network, hardcoded_config.network);
        assert_eq!(file_config.server, hardcoded_config.server);
        assert_eq!(file_config.debug, hardcoded_config.debug);

        for (file, hard) in file_config
            .normalization
            .scales
            .iter()
            .zip(hardcoded_config.normalization.scales.iter())
        {
            assert!((file - hard).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.normalization.scales[3] = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multi_output_network_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.network.layers = vec![16, 2];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
