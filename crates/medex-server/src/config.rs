use std::path::{Path, PathBuf};

use medex_core::CategoryConfig;
use tracing::warn;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Http,
    /// MCP JSON-RPC over stdin/stdout
    Stdio,
}

/// Which engine answers extraction requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Keyword,
    /// Model only; model failures are returned to the caller
    Model,
    /// Model first, keyword extraction when the model fails
    Hybrid,
}

/// Application configuration loaded explicitly from environment variables.
///
/// Nothing is required for the default keyword mode. The category dictionary is
/// built-in unless a file is named.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub categories_path: Option<PathBuf>,
    pub transport: Transport,
    pub mode: Mode,
    /// Model ID passed to the chat endpoint; required unless `mode` is `Keyword`.
    pub model: Option<String>,
}

impl Config {
    /// Optional:
    /// - `MEDEX_HOST` (default: "0.0.0.0"), `PORT` (default: 3000)
    /// - `MEDEX_STATIC_DIR` (default: "public")
    /// - `MEDEX_CATEGORIES_PATH`: JSON category file replacing the built-in dictionary
    /// - `MEDEX_TRANSPORT`: "http" (default) or "stdio"
    /// - `MEDEX_MODE`: "keyword" (default), "model" or "hybrid"
    /// - `MEDEX_MODEL`: required when `MEDEX_MODE` is "model" or "hybrid"
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{raw}'")))?,
            None => 3000,
        };

        let transport = match lookup("MEDEX_TRANSPORT").as_deref().map(str::trim) {
            None | Some("") | Some("http") => Transport::Http,
            Some("stdio") => Transport::Stdio,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "MEDEX_TRANSPORT must be 'http' or 'stdio', got '{other}'"
                )))
            }
        };

        let mode = match lookup("MEDEX_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("keyword") => Mode::Keyword,
            Some("model") => Mode::Model,
            Some("hybrid") => Mode::Hybrid,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "MEDEX_MODE must be 'keyword', 'model' or 'hybrid', got '{other}'"
                )))
            }
        };

        let model = lookup("MEDEX_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if mode != Mode::Keyword && model.is_none() {
            return Err(AppError::Config(
                "MEDEX_MODEL environment variable is required when MEDEX_MODE uses a model"
                    .to_string(),
            ));
        }

        Ok(Self {
            host: lookup("MEDEX_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            static_dir: lookup("MEDEX_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            categories_path: lookup("MEDEX_CATEGORIES_PATH").map(PathBuf::from),
            transport,
            mode,
            model,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The static asset directory, if it exists.
    pub fn static_dir(&self) -> Option<&Path> {
        if self.static_dir.is_dir() {
            Some(&self.static_dir)
        } else {
            warn!(path = %self.static_dir.display(), "static directory not found, not serving assets");
            None
        }
    }

    pub fn load_categories(&self) -> Result<CategoryConfig, AppError> {
        match &self.categories_path {
            Some(path) => Ok(CategoryConfig::from_path(path)?),
            None => Ok(CategoryConfig::medical_default()),
        }
    }
}
