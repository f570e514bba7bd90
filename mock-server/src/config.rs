//! Server configuration using Figment
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (prefix: MOCK_), e.g. `MOCK_PORT=9000`
//! 2. `mock-server.toml` in the working directory
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "mock-server.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed by the CORS policy
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MOCK_"))
            .extract()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
