use crate::error::{OcrError, Result};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// A single, non-following GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }
}

/// Issues one GET and reports what came back; must not follow redirects itself.
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &str) -> anyhow::Result<FetchResponse>;
}

pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("ocr-sidecar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> anyhow::Result<FetchResponse> {
        let resp = self.http.get(url).send()?;
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes()?.to_vec();
        Ok(FetchResponse {
            status,
            location,
            body,
        })
    }
}

/// GETs `url`, following at most `redirect_limit` redirects.
///
/// Any final status other than a redirect is handed back untouched; deciding
/// whether it is a failure is up to the caller.
pub fn fetch_following_redirects(
    fetcher: &dyn Fetcher,
    url: &str,
    redirect_limit: u32,
) -> Result<FetchResponse> {
    let mut current = url.to_string();
    let mut remaining = redirect_limit;
    loop {
        let resp = fetcher.get(&current).map_err(OcrError::connection)?;
        if !resp.is_redirect() {
            return Ok(resp);
        }
        let Some(location) = resp.location.as_deref() else {
            return Ok(resp);
        };
        if remaining == 0 {
            return Err(OcrError::TooManyRedirects {
                url: url.to_string(),
                limit: redirect_limit,
            });
        }
        remaining -= 1;
        let next = resolve_location(&current, location)?;
        debug!("redirect {} -> {next}", resp.status);
        current = next;
    }
}

fn resolve_location(base: &str, location: &str) -> Result<String> {
    let base = Url::parse(base)
        .map_err(|e| OcrError::Artifact(format!("invalid download URL {base}: {e}")))?;
    let next = base
        .join(location)
        .map_err(|e| OcrError::Artifact(format!("invalid redirect target {location}: {e}")))?;
    Ok(next.into())
}
