//! Fetches and stages the OCR server executable for the current host.
//!
//! An install moves through `NotInstalled -> Downloading -> Extracting -> Installed`,
//! dropping to `Failed` if the download or the extraction goes wrong. Nothing is
//! retried here; the caller owns retry policy and must serialize concurrent
//! installs into the same directory.

pub mod archive;
pub mod fetch;
pub mod platform;
pub mod variant;

pub use archive::extract_named_entry;
pub use fetch::{FetchResponse, Fetcher, HttpFetcher, fetch_following_redirects};
pub use platform::{Arch, Os, Platform};
pub use variant::Variant;

use crate::{
    config::InstallConfig,
    error::{OcrError, Result},
    util::sha256_hex,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Downloading,
    Extracting,
    Installed,
    Failed,
}

pub struct Installer<F: Fetcher = HttpFetcher> {
    cfg: InstallConfig,
    fetcher: F,
    platform: Option<Platform>,
    host: Option<(String, String)>,
}

impl Installer<HttpFetcher> {
    pub fn new(cfg: &InstallConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(Duration::from_secs(cfg.download_timeout_seconds))
            .map_err(OcrError::connection)?;
        Ok(Self::with_fetcher(cfg, fetcher))
    }
}

impl<F: Fetcher> Installer<F> {
    pub fn with_fetcher(cfg: &InstallConfig, fetcher: F) -> Self {
        Self {
            cfg: cfg.clone(),
            fetcher,
            platform: None,
            host: None,
        }
    }

    /// Pins the target platform instead of inspecting the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Classifies raw OS and CPU strings instead of the ones this process reports.
    pub fn with_host(mut self, os: &str, arch: &str) -> Self {
        self.host = Some((os.to_string(), arch.to_string()));
        self
    }

    pub fn platform(&self) -> Result<Platform> {
        match (self.platform, &self.host) {
            (Some(p), _) => Ok(p),
            (None, Some((os, arch))) => Platform::from_host(os, arch),
            (None, None) => Platform::detect(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn binary_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.cfg.binary_name)
    }

    /// Whether an executable regular file already sits at the install path.
    pub fn is_installed(&self, dir: &Path) -> bool {
        is_executable_file(&self.binary_path(dir))
    }

    /// Release URL for `variant` on this host, e.g.
    /// `.../v0.1.0/activestorage-ocr-server-leptess-linux-x86_64.tar.gz`.
    pub fn build_download_url(&self, version: &str, variant: Variant) -> Result<String> {
        let platform = self.platform()?;
        let version = version.trim_start_matches('v');
        let filename = format!(
            "{}{}-{}.tar.gz",
            self.cfg.binary_name,
            variant.suffix(),
            platform
        );
        Ok(format!(
            "{}/v{}/{}",
            self.cfg.release_base_url.trim_end_matches('/'),
            version,
            filename
        ))
    }

    /// Installs the configured version and variant into `target_dir`.
    pub fn install(&self, target_dir: &Path, variant: Variant, force: bool) -> Result<PathBuf> {
        let version = self.cfg.version.clone();
        self.install_version(target_dir, &version, variant, force)
    }

    pub fn install_version(
        &self,
        target_dir: &Path,
        version: &str,
        variant: Variant,
        force: bool,
    ) -> Result<PathBuf> {
        let dest = self.binary_path(target_dir);
        if !force && is_executable_file(&dest) {
            info!("already installed at {}", dest.display());
            return Ok(dest);
        }
        transition(InstallState::NotInstalled, &dest);

        let url = self.build_download_url(version, variant)?;
        std::fs::create_dir_all(target_dir)?;

        transition(InstallState::Downloading, &dest);
        info!("downloading {url}");
        let resp = fetch_following_redirects(&self.fetcher, &url, self.cfg.redirect_limit)
            .inspect_err(|_| transition(InstallState::Failed, &dest))?;
        if !resp.is_success() {
            transition(InstallState::Failed, &dest);
            return Err(OcrError::Artifact(format!(
                "failed to download {url}: HTTP {}. No prebuilt '{variant}' binary may exist \
                 for this platform; build the server from source and place it at {}",
                resp.status,
                dest.display()
            )));
        }
        info!(
            "downloaded {} bytes sha256={}",
            resp.body.len(),
            sha256_hex(&resp.body)
        );

        transition(InstallState::Extracting, &dest);
        extract_named_entry(&resp.body, &self.cfg.binary_name, &dest)
            .inspect_err(|_| transition(InstallState::Failed, &dest))?;

        transition(InstallState::Installed, &dest);
        Ok(dest)
    }
}

fn transition(state: InstallState, dest: &Path) {
    match state {
        InstallState::Failed => warn!(?state, "install of {} failed", dest.display()),
        _ => info!(?state, "{}", dest.display()),
    }
}

fn is_executable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && has_exec_bit(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_exec_bit(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &std::fs::Metadata) -> bool {
    true
}
