//! Runtime configuration: YAML file, then environment overrides.

use std::path::{Path, PathBuf};

use life_ai::GeneratorConfig;
use life_core::{validate_ages, ValidationError};
use persistence::{default_sqlite_url, DEFAULT_SAVE_KEY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::{DEFAULT_START_AGE, DEFAULT_TARGET_AGE};

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_DATABASE_URL: &str = "LIFESIM_DATABASE_URL";
pub const ENV_BIND: &str = "LIFESIM_BIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeSimConfig {
    pub start_age: u32,
    pub target_age: u32,
    pub rng_seed: u64,
    pub save_key: String,
    pub database_url: String,
    /// Listen address of the HTTP surface.
    pub bind: String,
    pub generator: GeneratorConfig,
}

impl Default for LifeSimConfig {
    fn default() -> Self {
        Self {
            start_age: DEFAULT_START_AGE,
            target_age: DEFAULT_TARGET_AGE,
            rng_seed: 42,
            save_key: DEFAULT_SAVE_KEY.to_string(),
            database_url: default_sqlite_url().to_string(),
            bind: "127.0.0.1:3000".to_string(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl LifeSimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Defaults, overlaid by `path` when given, overlaid by the process
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&text)?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_API_KEY) {
            self.generator.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.generator.model = model;
        }
        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database_url = url;
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind = bind;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ages(self.start_age, self.target_age)?;
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.generator
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}
