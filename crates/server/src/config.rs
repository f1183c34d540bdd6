use std::path::{Path, PathBuf};
use std::str::FromStr;

use recibos_ocr::{DEFAULT_LANGUAGE, DEFAULT_MAX_SIDE};
use recibos_pdf::ReceiptOptions;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "RECIBOS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable `fmt` output.
    #[default]
    Pretty,
    /// Bunyan JSON lines.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    /// Directory holding `*.traineddata`; the engine default when unset.
    pub data_path: Option<String>,
    pub max_side: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            data_path: None,
            max_side: DEFAULT_MAX_SIDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
    pub receipt: ReceiptOptions,
    pub ocr: OcrConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            log_format: LogFormat::default(),
            receipt: ReceiptOptions::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the file named by `RECIBOS_CONFIG` (if any), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `PORT` keeps the default host; `RECIBOS_BIND` replaces the whole
    /// address and wins over `PORT`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value: port.clone() })?;
            let host = self.bind.rsplit_once(':').map_or("0.0.0.0", |(host, _)| host);
            self.bind = format!("{host}:{port}");
        }
        if let Some(bind) = lookup("RECIBOS_BIND") {
            self.bind = bind;
        }
        if let Some(format) = lookup("RECIBOS_LOG_FORMAT") {
            self.log_format = format.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "RECIBOS_LOG_FORMAT",
                value: format.clone(),
            })?;
        }
        if let Some(path) = lookup("RECIBOS_TESSDATA") {
            self.ocr.data_path = Some(path);
        }
        Ok(())
    }
}
