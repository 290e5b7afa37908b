use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub ollama_config: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load a YAML or JSON config file (chosen by extension) and validate it.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Err(ConfigError::NotFound(path.to_string()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let content = substitute_env_vars(&content);

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_string(),
            message,
        };
        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the first config file that exists among `paths`, or fall back to
    /// the built-in defaults when none does. Returns the path that was used.
    pub fn load_first(paths: &[String]) -> Result<(Self, Option<String>), ConfigError> {
        for path in paths {
            match Self::load(path) {
                Ok(config) => return Ok((config, Some(path.clone()))),
                Err(ConfigError::NotFound(_)) => {
                    tracing::debug!("No config at {}", path);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok((Self::default(), None))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ollama = &self.ollama_config;
        if ollama.model.trim().is_empty() {
            return Err(ConfigError::Invalid("ollama_config.model cannot be empty".to_string()));
        }
        if ollama.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ollama_config.request_timeout_secs must be positive".to_string(),
            ));
        }
        if !(ollama.endpoint.starts_with("http://") || ollama.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "ollama_config.endpoint must be an http(s) URL, got {}",
                ollama.endpoint
            )));
        }
        Ok(())
    }
}

/// Replace `${VAR}` with the value of the environment variable `VAR`.
/// Unset variables are left as written.
fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
