use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::rewrite::DEFAULT_MODEL;
use crate::store::SqliteStore;

pub const DEFAULT_DATABASE_URI: &str = "sqlite:///diagrams.db";
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5000,http://127.0.0.1:5000,http://localhost:3000";

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parses `sqlite:///path`, `sqlite://path`, `sqlite::memory:`,
    /// `:memory:` or a bare filesystem path. An empty path is rejected.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(Error::Config("database URI cannot be empty".to_string()));
        }

        let path = if let Some(rest) = uri.strip_prefix("sqlite:") {
            rest.strip_prefix("///")
                .or_else(|| rest.strip_prefix("//"))
                .unwrap_or(rest)
        } else if uri.contains("://") {
            return Err(Error::Config(format!(
                "unsupported database URI '{uri}', only sqlite is supported"
            )));
        } else {
            uri
        };

        match path {
            ":memory:" => Ok(Self::Memory),
            "" => Err(Error::Config(format!(
                "database URI '{uri}' has no path"
            ))),
            p => Ok(Self::File(PathBuf::from(p))),
        }
    }

    pub fn open(&self) -> Result<SqliteStore> {
        match self {
            Self::Memory => SqliteStore::in_memory(),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                SqliteStore::new(path)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
    /// Origins allowed by CORS. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Key for the diagram rewrite endpoint. The server starts without it;
    /// the endpoint then answers 503.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub debug: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT '{port}'")))?;
        }

        if let Some(uri) = lookup("DATABASE_URI") {
            config.database = DatabaseLocation::from_uri(&uri)?;
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = parse_origins(&origins);
        }

        config.anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());

        if let Some(model) = lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()) {
            config.llm_model = model;
        }

        if let Some(debug) = lookup("DEBUG") {
            config.debug = parse_flag(&debug);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database: DatabaseLocation::File(PathBuf::from("diagrams.db")),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            anthropic_api_key: None,
            llm_model: DEFAULT_MODEL.to_string(),
            debug: false,
        }
    }
}

pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
