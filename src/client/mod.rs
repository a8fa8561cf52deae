//! Blocking client for the OCR server's HTTP/JSON API.

pub mod transport;
pub mod types;

pub use transport::{HttpResponse, HttpTransport, Transport};
pub use types::{EngineInfo, OcrResult, PreprocessingStats, ServerInfo, StepTiming, Upload};

use crate::{
    config::ServerConfig,
    engine::Engine,
    error::{OcrError, Result},
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct Client<T: Transport = HttpTransport> {
    cfg: ServerConfig,
    transport: T,
}

impl Client<HttpTransport> {
    pub fn new(cfg: &ServerConfig) -> Result<Self> {
        let transport = HttpTransport::new(cfg).map_err(OcrError::connection)?;
        Ok(Self::with_transport(cfg, transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(cfg: &ServerConfig, transport: T) -> Self {
        Self {
            cfg: cfg.clone(),
            transport,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.cfg
    }

    /// Engine and URL changes apply to the next call; timeouts are fixed by the transport.
    pub fn config_mut(&mut self) -> &mut ServerConfig {
        &mut self.cfg
    }

    pub fn set_engine(&mut self, name: &str) -> Result<()> {
        self.cfg.set_engine(name)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `reader`'s contents to the engine's endpoint and decodes the result.
    pub fn extract<R: Read>(
        &self,
        reader: R,
        content_type: &str,
        filename: &str,
        engine: Option<Engine>,
    ) -> Result<OcrResult> {
        let upload = Upload::from_reader(reader, content_type, filename)?;
        self.extract_upload(&upload, engine)
    }

    pub fn extract_from_path(
        &self,
        path: &Path,
        content_type: Option<&str>,
        filename: Option<&str>,
        engine: Option<Engine>,
    ) -> Result<OcrResult> {
        let upload = Upload::from_path(path, content_type, filename)?;
        self.extract_upload(&upload, engine)
    }

    pub fn extract_upload(&self, upload: &Upload, engine: Option<Engine>) -> Result<OcrResult> {
        let engine = Engine::resolve(engine, self.cfg.engine);
        let path = engine.path();
        let url = self.cfg.endpoint(path);
        debug!("extract engine={engine} url={url}");

        let resp = self
            .transport
            .post_file(&url, upload)
            .map_err(OcrError::connection)?;
        let result: OcrResult = check(path, &resp).and_then(|resp| {
            OcrResult::from_json(&resp.body).map_err(|e| malformed(path, e))
        })?;

        info!(
            "ocr engine={} confidence={:.2} chars={} time_ms={}",
            if result.engine().is_empty() { engine.as_str() } else { result.engine() },
            result.confidence(),
            result.text().len(),
            result.processing_time_ms()
        );
        Ok(result)
    }

    /// Runs every alternate engine on the same file. The first failure aborts the comparison.
    pub fn compare(&self, upload: &Upload) -> Result<BTreeMap<Engine, OcrResult>> {
        let mut out = BTreeMap::new();
        for engine in Engine::ALTERNATES {
            let result = self.extract_upload(upload, Some(engine))?;
            out.insert(engine, result);
        }
        Ok(out)
    }

    pub fn compare_path(&self, path: &Path) -> Result<BTreeMap<Engine, OcrResult>> {
        let upload = Upload::from_path(path, None, None)?;
        self.compare(&upload)
    }

    /// True only for a 2xx `/health` answer whose status is `"ok"`. Never fails.
    pub fn healthy(&self) -> bool {
        let url = self.cfg.endpoint("/health");
        let resp = match self.transport.get(&url) {
            Ok(resp) => resp,
            Err(err) => {
                debug!("health check failed: {err:#}");
                return false;
            }
        };
        if !resp.is_success() {
            debug!("health check returned {}", resp.status);
            return false;
        }
        match serde_json::from_slice::<types::HealthBody>(&resp.body) {
            Ok(body) => body.status == "ok",
            Err(err) => {
                debug!("health check body unreadable: {err}");
                false
            }
        }
    }

    pub fn server_info(&self) -> Result<ServerInfo> {
        self.get_json("/info")
    }

    fn get_json<O: DeserializeOwned>(&self, path: &str) -> Result<O> {
        let url = self.cfg.endpoint(path);
        let resp = self.transport.get(&url).map_err(OcrError::connection)?;
        let resp = check(path, &resp)?;
        serde_json::from_slice(&resp.body).map_err(|e| malformed(path, e))
    }
}

/// Turns a non-2xx response into a server error, preferring the body's `error` field.
fn check<'a>(path: &str, resp: &'a HttpResponse) -> Result<&'a HttpResponse> {
    if resp.is_success() {
        return Ok(resp);
    }
    let message = serde_json::from_slice::<types::ErrorBody>(&resp.body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("server returned {}", resp.status));
    warn!("{path} failed with {}: {message}", resp.status);
    Err(OcrError::Server(message))
}

fn malformed(path: &str, err: serde_json::Error) -> OcrError {
    OcrError::Server(format!("malformed response from {path}: {err}"))
}
