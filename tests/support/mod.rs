#![allow(dead_code)]

use anyhow::{Result, anyhow};
use ocr_sidecar::client::{HttpResponse, Transport, Upload};
use ocr_sidecar::installer::{FetchResponse, Fetcher};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Scripted transport: answers calls from a queue, in order, and records them.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<HttpResponse>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn refuse(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(anyhow!(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: Call) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted reply")))
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        self.next(Call {
            method: "GET",
            url: url.to_string(),
            filename: None,
            content_type: None,
        })
    }

    fn post_file(&self, url: &str, upload: &Upload) -> Result<HttpResponse> {
        self.next(Call {
            method: "POST",
            url: url.to_string(),
            filename: Some(upload.filename.clone()),
            content_type: Some(upload.content_type.clone()),
        })
    }
}

/// Scripted fetcher for installer tests; same queue discipline as [`FakeTransport`].
#[derive(Default)]
pub struct FakeFetcher {
    replies: Mutex<VecDeque<FetchResponse>>,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, body: Vec<u8>) -> Self {
        self.push(200, None, body)
    }

    pub fn status(self, status: u16) -> Self {
        self.push(status, None, Vec::new())
    }

    pub fn redirect(self, location: &str) -> Self {
        self.push(302, Some(location.to_string()), Vec::new())
    }

    fn push(self, status: u16, location: Option<String>, body: Vec<u8>) -> Self {
        self.replies.lock().unwrap().push_back(FetchResponse {
            status,
            location,
            body,
        });
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted reply for {url}"))
    }
}

/// Builds a gzip-compressed tar holding `(name, contents)` regular files.
pub fn tar_gz<C: AsRef<[u8]>>(files: &[(&str, C)]) -> Vec<u8> {
    let enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.as_ref().len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, name, contents.as_ref())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

pub const SUCCESS_BODY: &str =
    r#"{"text":"Hello World","confidence":0.95,"processing_time_ms":150,"warnings":[]}"#;
