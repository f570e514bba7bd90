//! Configuration for the schema-to-sdk generation step.
//!
//! Generation happens offline: a generator reads the backend's OpenAPI
//! document and emits typed bindings. This module only describes what to feed
//! it. Values are layered:
//! 1. Built-in defaults
//! 2. `openapi-ts.toml` (or the path given to [`GeneratorConfig::load_from`])
//! 3. `OPENAPI_URL` environment variable, overriding `input`

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "openapi-ts.toml";
pub const DEFAULT_SCHEMA_URL: &str = "http://localhost:8000/openapi.json";

#[derive(Debug, Error)]
pub enum GeneratorConfigError {
    #[error("failed to load generator config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid generator config: {0}")]
    Invalid(&'static str),
}

/// Artifact families the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plugin {
    /// Request and response types.
    Types,
    /// One function per operation.
    Sdk,
    /// Cache-key builders for the read cache.
    QueryKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// HTTP client flavor the generated functions target.
    pub client: String,
    /// URL or file path of the API schema document.
    pub input: String,
    pub output: OutputConfig,
    pub plugins: Vec<Plugin>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client: "reqwest".to_string(),
            input: DEFAULT_SCHEMA_URL.to_string(),
            output: OutputConfig {
                path: "src".to_string(),
                format: Some("rustfmt".to_string()),
            },
            plugins: vec![Plugin::Types, Plugin::Sdk, Plugin::QueryKeys],
        }
    }
}

impl GeneratorConfig {
    pub fn load() -> Result<Self, GeneratorConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from `path`, which may be missing; defaults then apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, GeneratorConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::raw().only(&["OPENAPI_URL"]).map(|_| "input".into()))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GeneratorConfigError> {
        if self.input.trim().is_empty() {
            return Err(GeneratorConfigError::Invalid("input must not be empty"));
        }
        if self.output.path.trim().is_empty() {
            return Err(GeneratorConfigError::Invalid("output.path must not be empty"));
        }
        if self.plugins.is_empty() {
            return Err(GeneratorConfigError::Invalid("at least one plugin is required"));
        }
        Ok(())
    }

    pub fn emits(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }
}
