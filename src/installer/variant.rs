use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Published builds of the server executable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Ocrs,
    Leptess,
    All,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Ocrs, Variant::Leptess, Variant::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Ocrs => "ocrs",
            Variant::Leptess => "leptess",
            Variant::All => "all",
        }
    }

    /// Fragment inserted after the binary name in the archive filename.
    pub fn suffix(&self) -> &'static str {
        match self {
            Variant::Ocrs => "",
            Variant::Leptess => "-leptess",
            Variant::All => "-all",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Variant::Ocrs => "pure Rust engine; no system libraries required",
            Variant::Leptess => "Tesseract engine; needs libtesseract and leptonica installed",
            Variant::All => "every engine in one executable",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ocrs" => Ok(Variant::Ocrs),
            "leptess" => Ok(Variant::Leptess),
            "all" => Ok(Variant::All),
            _ => Err(OcrError::InvalidVariant(s.to_string())),
        }
    }
}
