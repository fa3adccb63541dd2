use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::DatePolicy;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// How unparseable campaign dates in uploads are handled.
    pub date_policy: DatePolicy,
    /// Largest accepted flyer image, in bytes.
    pub max_upload_bytes: usize,
}

/// On-disk form of [`ServerConfig`]. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub date_policy: Option<DatePolicy>,
    pub max_upload_bytes: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("chirashi.db")
    }

    /// Layers the values present in `file` over `self`.
    #[must_use]
    pub fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(date_policy) = file.date_policy {
            self.date_policy = date_policy;
        }
        if let Some(max_upload_bytes) = file.max_upload_bytes {
            self.max_upload_bytes = max_upload_bytes;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            date_policy: DatePolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
