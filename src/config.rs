use crate::{engine::Engine, error::OcrError, installer::Variant};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

/// Where the OCR server lives and how requests to it behave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub open_timeout_seconds: u64,
    pub engine: Engine,
    pub content_types: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9292".into(),
            timeout_seconds: 30,
            open_timeout_seconds: 5,
            engine: Engine::Default,
            content_types: vec![
                "image/png".into(),
                "image/jpeg".into(),
                "image/gif".into(),
                "image/bmp".into(),
                "image/webp".into(),
                "image/tiff".into(),
                "application/pdf".into(),
            ],
        }
    }
}

impl ServerConfig {
    /// Validates and stores the default engine. An unknown name leaves the config untouched.
    pub fn set_engine(&mut self, name: &str) -> std::result::Result<(), OcrError> {
        self.engine = name.parse()?;
        Ok(())
    }

    /// Whether a blob of this content type should be sent for recognition.
    pub fn accepts(&self, content_type: &str) -> bool {
        let ct = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.content_types.iter().any(|c| c.eq_ignore_ascii_case(&ct))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }
}

/// Where the server executable comes from and where it is staged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub dir: String,
    pub version: String,
    pub variant: Variant,
    pub binary_name: String,
    pub release_base_url: String,
    pub redirect_limit: u32,
    pub download_timeout_seconds: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            dir: "bin".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            variant: Variant::Ocrs,
            binary_name: "activestorage-ocr-server".into(),
            release_base_url: "https://github.com/Cause-of-a-Kind/activestorage-ocr/releases/download"
                .into(),
            redirect_limit: 10,
            download_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
