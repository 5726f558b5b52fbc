//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `sidequest-config.yaml` at the
//! project root. This module defines strongly-typed structs mirroring the
//! YAML structure and a loader that reads the file. Every field has a
//! default, so a missing file or a partial file still yields a runnable
//! configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// World and broadcast settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Vision producer settings.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Demo tooling toggles.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// World and broadcast settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Starting latitude (San Francisco City Hall by default).
    #[serde(default = "default_start_lat")]
    pub start_lat: f64,
    /// Starting longitude.
    #[serde(default = "default_start_lon")]
    pub start_lon: f64,
    /// Radius of the nearby-POI filter, in kilometers.
    #[serde(default = "default_poi_radius_km")]
    pub poi_radius_km: f64,
    /// Broadcast tick period in milliseconds (100 ms = 10 Hz).
    #[serde(default = "default_broadcast_interval_ms")]
    pub broadcast_interval_ms: u64,
    /// Capacity of the rolling observation window.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            start_lat: default_start_lat(),
            start_lon: default_start_lon(),
            poi_radius_km: default_poi_radius_km(),
            broadcast_interval_ms: default_broadcast_interval_ms(),
            history_size: default_history_size(),
        }
    }
}

/// Vision producer settings.
///
/// The API key is read from the environment variable named by
/// `api_key_env`, never from the YAML file itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VisionConfig {
    /// Backend type: `openai` (also `deepseek`, `ollama`) or `anthropic`.
    #[serde(default = "default_vision_backend")]
    pub backend: String,
    /// Base API URL.
    #[serde(default = "default_vision_api_url")]
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Model identifier.
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// Overall deadline for one producer call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Path to the prompt templates directory.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            backend: default_vision_backend(),
            api_url: default_vision_api_url(),
            api_key_env: default_api_key_env(),
            model: default_vision_model(),
            request_timeout_ms: default_request_timeout_ms(),
            templates_dir: default_templates_dir(),
        }
    }
}

/// Demo tooling toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// When true, a simulated GPS producer walks a circular path around
    /// the start position, exercising the mutation API like a real phone.
    #[serde(default)]
    pub mock_gps: bool,
    /// Simulated GPS update period in milliseconds (200 ms = 5 Hz).
    #[serde(default = "default_mock_gps_interval_ms")]
    pub mock_gps_interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mock_gps: false,
            mock_gps_interval_ms: default_mock_gps_interval_ms(),
        }
    }
}

impl BackendConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&content)?)
    }

    /// Load from the given path, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8787
}

const fn default_start_lat() -> f64 {
    37.7749
}

const fn default_start_lon() -> f64 {
    -122.4194
}

const fn default_poi_radius_km() -> f64 {
    1.5
}

const fn default_broadcast_interval_ms() -> u64 {
    100
}

const fn default_history_size() -> usize {
    5
}

fn default_vision_backend() -> String {
    String::from("openai")
}

fn default_vision_api_url() -> String {
    String::from("https://api.openai.com/v1")
}

fn default_api_key_env() -> String {
    String::from("OPENAI_API_KEY")
}

fn default_vision_model() -> String {
    String::from("gpt-4o-mini")
}

const fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_templates_dir() -> String {
    String::from("templates")
}

const fn default_mock_gps_interval_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: Result<BackendConfig, _> = serde_yml::from_str("{}");
        assert_eq!(config.ok(), Some(BackendConfig::default()));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "server:\n  port: 9000\nworld:\n  broadcast_interval_ms: 50\n";
        let config: BackendConfig = serde_yml::from_str(yaml).unwrap_or_default();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.world.broadcast_interval_ms, 50);
        assert_eq!(config.world.history_size, 5);
        assert!((config.world.poi_radius_km - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_point_at_san_francisco() {
        let config = BackendConfig::default();
        assert!((config.world.start_lat - 37.7749).abs() < 1e-9);
        assert!((config.world.start_lon + 122.4194).abs() < 1e-9);
        assert_eq!(config.world.broadcast_interval_ms, 100);
        assert_eq!(config.vision.backend, "openai");
        assert!(!config.demo.mock_gps);
    }
}
