use thiserror::Error;

/// Errors surfaced by the client and the installer.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The server could not be reached, or the request timed out.
    #[error("connection to OCR server failed: {0}")]
    Connection(String),

    /// The server answered, but with a failure.
    #[error("{0}")]
    Server(String),

    #[error("unknown engine '{0}' (expected one of: default, ocrs, leptess)")]
    InvalidEngine(String),

    #[error("unknown variant '{0}' (expected one of: ocrs, leptess, all)")]
    InvalidVariant(String),

    #[error("unsupported platform: os={os} arch={arch} (supported: darwin/linux on x86_64/aarch64)")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("{0}")]
    Artifact(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`OcrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Server,
    Validation,
    UnsupportedPlatform,
    Artifact,
    Io,
}

impl OcrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OcrError::Connection(_) => ErrorKind::Connection,
            OcrError::Server(_) => ErrorKind::Server,
            OcrError::InvalidEngine(_) | OcrError::InvalidVariant(_) | OcrError::Pattern(_) => {
                ErrorKind::Validation
            }
            OcrError::UnsupportedPlatform { .. } => ErrorKind::UnsupportedPlatform,
            OcrError::TooManyRedirects { .. } | OcrError::Artifact(_) => ErrorKind::Artifact,
            OcrError::Io(_) => ErrorKind::Io,
        }
    }

    /// Wraps a transport failure, keeping the whole cause chain in the message.
    pub(crate) fn connection(err: anyhow::Error) -> Self {
        OcrError::Connection(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
