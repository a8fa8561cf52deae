use super::types::Upload;
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

/// Status and body of an HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP round trip per call. An `Err` means no response was received at all.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;
    fn post_file(&self, url: &str, upload: &Upload) -> Result<HttpResponse>;
}

/// `reqwest` blocking transport; the connection pool is built once, up front.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(cfg: &ServerConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .connect_timeout(Duration::from_secs(cfg.open_timeout_seconds))
            .user_agent(concat!("ocr-sidecar/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().with_context(|| "reading response body")?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn post_file(&self, url: &str, upload: &Upload) -> Result<HttpResponse> {
        debug!(
            "POST {url} file={} content_type={} bytes={}",
            upload.filename,
            upload.content_type,
            upload.bytes.len()
        );
        let content_type = if upload.content_type.parse::<mime_guess::Mime>().is_ok() {
            upload.content_type.as_str()
        } else {
            warn!("unparsable content type {:?}; sending as octet-stream", upload.content_type);
            "application/octet-stream"
        };
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(content_type)
            .with_context(|| format!("invalid content type: {content_type}"))?;
        let form = Form::new().part("file", part);
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().with_context(|| "reading response body")?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
