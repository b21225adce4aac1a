use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::remote::{RemoteClassifierConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierSection,
    pub export: ExportSection,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ClassifierSection {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        ClassifierSection {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token_env: "HF_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExportSection {
    pub default_path: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        ExportSection {
            default_path: PathBuf::from("comentarios.csv"),
        }
    }
}

impl Config {
    /// Classifier settings with the token resolved through `lookup_env`.
    pub fn remote_classifier<F>(&self, lookup_env: F) -> RemoteClassifierConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup_env(&self.classifier.token_env).filter(|t| !t.trim().is_empty());
        RemoteClassifierConfig {
            endpoint: self.classifier.endpoint.clone(),
            model: self.classifier.model.clone(),
            token,
            timeout: Duration::from_secs(self.classifier.timeout_secs),
        }
    }
}

pub fn parse_config(file_path: &str, contents: &str) -> Result<Config, ConfigError> {
    let config = toml::from_str::<Config>(contents).map_err(|source| ConfigError::Parse {
        path: file_path.to_string(),
        source,
    })?;
    let invalid = |key: &'static str, reason: &str| ConfigError::Invalid {
        path: file_path.to_string(),
        key,
        reason: reason.to_string(),
    };
    if config.classifier.endpoint.trim().is_empty() {
        return Err(invalid("classifier.endpoint", "must not be empty"));
    }
    if config.classifier.model.trim().is_empty() {
        return Err(invalid("classifier.model", "must not be empty"));
    }
    if config.classifier.timeout_secs == 0 {
        return Err(invalid("classifier.timeout_secs", "must be greater than zero"));
    }
    if config.export.default_path.as_os_str().is_empty() {
        return Err(invalid("export.default_path", "must not be empty"));
    }
    Ok(config)
}

/// Loads `file_path`, falling back to defaults when the file does not exist.
pub fn load_config_from_file(file_path: &str) -> Result<Config, ConfigError> {
    match fs::read_to_string(file_path) {
        Ok(contents) => parse_config(file_path, &contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(source) => Err(ConfigError::Read {
            path: file_path.to_string(),
            source,
        }),
    }
}
