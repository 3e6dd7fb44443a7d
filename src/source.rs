//! Image reference resolution.
//!
//! Turns whatever the caller holds — a `data:` URI handed back by the image
//! generator, an `http(s)://` URL, a `file://` URL or a plain path — into the
//! raw encoded bytes the imaging backend decodes. Every source is capped at
//! [`SourceLimits::max_bytes`] and fails fast; nothing is retried.

use base64::{Engine as _, engine::general_purpose};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Download failed: {0}")]
    Http(String),
    #[error("Image is too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
    #[error("Image reference is empty")]
    Empty,
}

/// Limits applied while loading a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    pub max_bytes: u64,
    pub timeout: Duration,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A reference to an encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// `data:image/<type>;base64,<payload>`; only the payload is kept.
    DataUri { mime: String, payload: String },
    Url(String),
    Path(PathBuf),
}

impl ImageRef {
    /// Classify a reference string. Data URIs are validated here; URLs and
    /// paths are only checked when loaded.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SourceError::Empty);
        }

        if let Some(rest) = strip_prefix_ignore_case(input, "data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| SourceError::InvalidDataUri("missing ',' separator".into()))?;
            let mime = strip_suffix_ignore_case(header, ";base64")
                .ok_or_else(|| {
                    SourceError::InvalidDataUri(
                        "only base64-encoded data URIs are supported".into(),
                    )
                })?
                .to_ascii_lowercase();
            if !mime.starts_with("image/") {
                return Err(SourceError::InvalidDataUri(format!(
                    "expected an image media type, got '{}'",
                    mime
                )));
            }
            // Wrapped payloads (MIME-style line breaks) decode as one run.
            let payload: String = payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            return Ok(ImageRef::DataUri { mime, payload });
        }

        if let Some(path) = strip_prefix_ignore_case(input, "file://") {
            return Ok(ImageRef::Path(PathBuf::from(path)));
        }

        if strip_prefix_ignore_case(input, "http://").is_some()
            || strip_prefix_ignore_case(input, "https://").is_some()
        {
            return Ok(ImageRef::Url(input.to_string()));
        }

        Ok(ImageRef::Path(PathBuf::from(input)))
    }

    /// Resolve to raw encoded bytes.
    pub fn load(&self, limits: &SourceLimits) -> Result<Vec<u8>, SourceError> {
        let bytes = match self {
            ImageRef::DataUri { payload, .. } => decode_payload(payload, limits.max_bytes)?,
            ImageRef::Url(url) => download(url, limits)?,
            ImageRef::Path(path) => read_file(path, limits.max_bytes)?,
        };
        log::debug!("loaded {} bytes from {}", bytes.len(), self);
        Ok(bytes)
    }
}

impl fmt::Display for ImageRef {
    /// Short form for logs; data URIs are never printed in full.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::DataUri { mime, payload } => {
                write!(f, "data:{};base64 ({} chars)", mime, payload.len())
            }
            ImageRef::Url(url) => f.write_str(url),
            ImageRef::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// URI schemes and the `;base64` marker are case-insensitive.
fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    input
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &input[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(input: &'a str, suffix: &str) -> Option<&'a str> {
    let split = input.len().checked_sub(suffix.len())?;
    input
        .get(split..)
        .filter(|tail| tail.eq_ignore_ascii_case(suffix))
        .map(|_| &input[..split])
}

fn check_size(size: u64, limit: u64) -> Result<(), SourceError> {
    if size > limit {
        return Err(SourceError::TooLarge { size, limit });
    }
    Ok(())
}

/// Upper bound on decoded length, checked before allocating.
fn decoded_upper_bound(payload: &str) -> u64 {
    (payload.len() as u64).div_ceil(4) * 3
}

fn decode_payload(payload: &str, max_bytes: u64) -> Result<Vec<u8>, SourceError> {
    let payload = payload.trim();
    check_size(decoded_upper_bound(payload), max_bytes.saturating_add(2))?;
    let bytes = general_purpose::STANDARD.decode(payload)?;
    check_size(bytes.len() as u64, max_bytes)?;
    Ok(bytes)
}

fn read_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(io_err)?;
    check_size(metadata.len(), max_bytes)?;
    std::fs::read(path).map_err(io_err)
}

fn download(url: &str, limits: &SourceLimits) -> Result<Vec<u8>, SourceError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(limits.timeout))
        .build()
        .into();

    let mut response = agent
        .get(url)
        .call()
        .map_err(|e| SourceError::Http(format!("{}: {}", url, e)))?;

    response
        .body_mut()
        .with_config()
        .limit(limits.max_bytes)
        .read_to_vec()
        .map_err(|e| SourceError::Http(format!("{}: {}", url, e)))
}
