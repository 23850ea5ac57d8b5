pub mod local;

use crate::config::Config;
use crate::error::ExtractionError;
use std::path::Path;
use tracing::warn;

pub use local::LocalExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    PlainText,
}

impl SourceKind {
    pub fn detect(input: &Path) -> Result<Self, ExtractionError> {
        match input
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => Ok(SourceKind::Pdf),
            Some("txt") | Some("md") => Ok(SourceKind::PlainText),
            _ => Err(ExtractionError::Unsupported {
                path: input.display().to_string(),
            }),
        }
    }
}

pub trait TextExtractor {
    fn extract(&self, input: &Path) -> Result<String, ExtractionError>;
}

pub fn validate_input(cfg: &Config, input: &Path) -> Result<SourceKind, ExtractionError> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(ExtractionError::UrlRejected { path: input_str });
    }

    let meta = std::fs::metadata(input).map_err(|_| ExtractionError::NotFound {
        path: input_str.clone(),
    })?;
    if meta.len() > cfg.extraction.max_input_file_bytes {
        return Err(ExtractionError::TooLarge {
            path: input_str,
            bytes: meta.len(),
            limit: cfg.extraction.max_input_file_bytes,
        });
    }
    if meta.len() == 0 {
        warn!("input is empty: {}", input.display());
    }

    SourceKind::detect(input)
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
