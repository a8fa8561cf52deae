use crate::error::OcrError;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
}

/// Normalized `{os}-{arch}` pair naming a release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

const OS_PATTERNS: [(Os, &str); 2] = [
    (Os::Darwin, r"(?i)darwin|macos"),
    (Os::Linux, r"(?i)linux"),
];

const ARCH_PATTERNS: [(Arch, &str); 2] = [
    (Arch::X86_64, r"(?i)x86_64|amd64|x64"),
    (Arch::Aarch64, r"(?i)arm64|aarch64"),
];

/// First token whose pattern matches `value`.
fn classify<T: Copy>(table: &[(T, &str)], value: &str) -> Result<Option<T>, OcrError> {
    for (token, pattern) in table {
        if Regex::new(pattern)?.is_match(value) {
            return Ok(Some(*token));
        }
    }
    Ok(None)
}

impl Platform {
    /// The platform this process is running on.
    pub fn detect() -> Result<Self, OcrError> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps host OS and CPU strings such as `("darwin", "arm64")` to a platform.
    pub fn from_host(os: &str, arch: &str) -> Result<Self, OcrError> {
        let unsupported = || OcrError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };
        let os_token = classify(&OS_PATTERNS, os)?.ok_or_else(unsupported)?;
        let arch_token = classify(&ARCH_PATTERNS, arch)?.ok_or_else(unsupported)?;
        Ok(Self {
            os: os_token,
            arch: arch_token,
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
