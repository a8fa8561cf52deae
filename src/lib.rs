pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod installer;
pub mod util;

pub use client::{Client, OcrResult, Upload};
pub use engine::Engine;
pub use error::{ErrorKind, OcrError};
pub use installer::{Installer, Platform, Variant};
