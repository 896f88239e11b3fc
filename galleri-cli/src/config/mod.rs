//! Runtime configuration and store selection
//!
//! Remote credentials come from `config.toml` in the platform config
//! directory, overridable via environment variables (a `.env` file is
//! honored). A missing or incomplete remote section is a typed state that
//! selects the local database, never a null client.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_REMOTE_URL: &str = "GALLERI_SUPABASE_URL";
pub const ENV_REMOTE_KEY: &str = "GALLERI_SUPABASE_KEY";
pub const ENV_DB_PATH: &str = "GALLERI_DB_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    remote: RemoteSection,
    #[serde(default)]
    local: LocalSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RemoteSection {
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocalSection {
    db_path: Option<PathBuf>,
}

/// The storage backend this invocation runs against
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Remote { url: String, api_key: String },
    Local { db_path: PathBuf },
}

impl StoreConfig {
    /// Resolve the backend from config file and environment
    pub fn load() -> Result<Self> {
        let file = read_config_file()?;
        Self::resolve(
            env::var(ENV_REMOTE_URL).ok().or(file.remote.url),
            env::var(ENV_REMOTE_KEY).ok().or(file.remote.api_key),
            env::var(ENV_DB_PATH).ok().map(PathBuf::from).or(file.local.db_path),
        )
    }

    fn resolve(
        url: Option<String>,
        api_key: Option<String>,
        db_path: Option<PathBuf>,
    ) -> Result<Self> {
        match (url, api_key) {
            (Some(url), Some(api_key)) if !url.trim().is_empty() && !api_key.trim().is_empty() => {
                Ok(StoreConfig::Remote { url, api_key })
            }
            _ => {
                let db_path = match db_path {
                    Some(path) => path,
                    None => default_db_path()?,
                };
                Ok(StoreConfig::Local { db_path })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Remote { url, .. } => format!("remote ({})", url),
            StoreConfig::Local { db_path } => format!("local ({})", db_path.display()),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("galleri").join("config.toml"))
}

fn read_config_file() -> Result<ConfigFile> {
    let Some(path) = config_path() else {
        return Ok(ConfigFile::default());
    };
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Could not determine the data directory")?
        .join("galleri");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    Ok(dir.join("customers.db"))
}
