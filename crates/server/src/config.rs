use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    pub port: u16,
    /// Base URL handed out for locally stored objects. Empty means
    /// `http://localhost:<port>`.
    pub public_url: String,
    pub blob_root: String,
    pub blob_api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub blob_token: String,
    pub blob_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            port: DEFAULT_PORT,
            public_url: "".to_string(),
            blob_root: "".to_string(),
            blob_api_url: blobstore::DEFAULT_API_URL.to_string(),
            blob_token: "".to_string(),
            blob_timeout_secs: 15,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn public_url(&self) -> String {
        let trimmed = self.public_url.trim();
        if trimmed.is_empty() {
            format!("http://localhost:{}", self.port)
        } else {
            trimmed.to_string()
        }
    }

    /// Remote token wins over a local directory; neither means storage is
    /// not configured.
    pub fn storage_backend(&self, config_path: &Path) -> StorageBackend {
        let token = self.blob_token.trim();
        if !token.is_empty() {
            let api_url = self.blob_api_url.trim();
            let api_url = if api_url.is_empty() {
                blobstore::DEFAULT_API_URL
            } else {
                api_url
            };
            return StorageBackend::Remote {
                api_url: api_url.to_string(),
                token: token.to_string(),
            };
        }
        match resolve_optional_path(config_path, &self.blob_root) {
            Some(root) => StorageBackend::Local(root),
            None => StorageBackend::Unconfigured,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Unconfigured,
    Local(PathBuf),
    Remote { api_url: String, token: String },
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("ERAS_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        if config.blob_timeout_secs == 0 {
            config.blob_timeout_secs = 15;
        }
        if config.max_upload_bytes == 0 {
            config.max_upload_bytes = DEFAULT_MAX_UPLOAD_BYTES;
        }
        return Ok((config, false));
    }

    let config = ServerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Environment settings layered over the file. `BLOB_READ_WRITE_TOKEN` is the
/// switch for the hosted backend.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(token) = non_empty("BLOB_READ_WRITE_TOKEN") {
        config.blob_token = token.trim().to_string();
    }
    if let Some(root) = non_empty("ERAS_BLOB_ROOT") {
        config.blob_root = root;
    }
    if let Some(url) = non_empty("ERAS_PUBLIC_URL") {
        config.public_url = url;
    }
    if let Some(port) = non_empty("ERAS_PORT").and_then(|value| value.trim().parse::<u16>().ok()) {
        if port != 0 {
            config.port = port;
        }
    }
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

pub fn resolve_optional_path(config_path: &Path, value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(resolve_path(config_path, trimmed))
    }
}
