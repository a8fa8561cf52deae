use crate::{error::OcrError, util};
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::Path;

/// Outcome of one recognition request.
///
/// Built only by decoding a server response; fields are read through accessors
/// so a result handed to a caller stays exactly what the server said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    text: String,
    #[serde(deserialize_with = "unit_interval")]
    confidence: f32,
    processing_time_ms: u64,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    engine: String,
    #[serde(default)]
    preprocessing: Option<PreprocessingStats>,
}

impl OcrResult {
    /// Decodes a success body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Engine that produced the result; empty when the server did not say.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn preprocessing(&self) -> Option<&PreprocessingStats> {
        self.preprocessing.as_ref()
    }

    pub fn is_success(&self) -> bool {
        !self.text.is_empty()
    }

    /// Metadata map for an attachment-analysis step.
    pub fn analysis_metadata(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut meta = serde_json::Map::new();
        meta.insert("ocr_text".into(), self.text.clone().into());
        meta.insert("ocr_confidence".into(), f64::from(self.confidence).into());
        meta.insert("ocr_engine".into(), self.engine.clone().into());
        meta.insert(
            "ocr_processing_time_ms".into(),
            self.processing_time_ms.into(),
        );
        meta.insert("ocr_processed_at".into(), util::now_rfc3339().into());
        meta
    }
}

/// Confidence is clamped into `[0.0, 1.0]`; NaN reads as zero.
fn unit_interval<'de, D: Deserializer<'de>>(de: D) -> Result<f32, D::Error> {
    let raw = f32::deserialize(de)?;
    Ok(if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingStats {
    pub preset: String,
    pub total_time_ms: u64,
    #[serde(default)]
    pub steps: Vec<StepTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub version: String,
    pub default_engine: String,
    #[serde(default)]
    pub available_engines: Vec<EngineInfo>,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub max_file_size_bytes: Option<u64>,
    #[serde(default)]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub supported_languages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HealthBody {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// One file, held in memory so it can be sent to several engines.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, content_type: &str, filename: &str) -> Self {
        Self {
            bytes,
            content_type: content_type.to_string(),
            filename: filename.to_string(),
        }
    }

    pub fn from_reader<R: Read>(
        mut reader: R,
        content_type: &str,
        filename: &str,
    ) -> Result<Self, OcrError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(bytes, content_type, filename))
    }

    /// Reads a local file. Content type falls back to the extension, filename to the base name.
    pub fn from_path(
        path: &Path,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Self, OcrError> {
        let bytes = std::fs::read(path)?;
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| util::content_type_for(path));
        let filename = filename.map(str::to_string).unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string())
        });
        Ok(Self {
            bytes,
            content_type,
            filename,
        })
    }
}
