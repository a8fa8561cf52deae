//! Recognition engines the OCR server exposes, and how requests reach them.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Whatever engine the server itself considers its default.
    #[default]
    Default,
    Ocrs,
    Leptess,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Default, Engine::Ocrs, Engine::Leptess];

    /// Named engines, excluding the server-chosen default. `compare` runs each of these.
    pub const ALTERNATES: [Engine; 2] = [Engine::Ocrs, Engine::Leptess];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Default => "default",
            Engine::Ocrs => "ocrs",
            Engine::Leptess => "leptess",
        }
    }

    /// URL path of the recognition endpoint for this engine.
    pub fn path(&self) -> &'static str {
        match self {
            Engine::Default => "/ocr",
            Engine::Ocrs => "/ocr/ocrs",
            Engine::Leptess => "/ocr/leptess",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Engine::Default => "server default engine",
            Engine::Ocrs => "pure Rust engine, fast on clean input",
            Engine::Leptess => "Tesseract engine, better on noisy scans",
        }
    }

    /// A per-call override wins over the configured engine.
    pub fn resolve(override_engine: Option<Engine>, configured: Engine) -> Engine {
        override_engine.unwrap_or(configured)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Engine::Default),
            "ocrs" => Ok(Engine::Ocrs),
            "leptess" => Ok(Engine::Leptess),
            _ => Err(OcrError::InvalidEngine(s.to_string())),
        }
    }
}
