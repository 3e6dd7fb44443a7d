//! The post-processing entry point.
//!
//! [`process`] takes an image reference and per-invocation options and
//! returns a finished [`OutputImage`]: resolve the reference, decode, apply
//! the enhancement preset at native resolution, upscale to the megapixel
//! budget, and encode. Delivery is the caller's move, typically
//! [`OutputImage::save_in`].
//!
//! ## Failures
//!
//! Every failure aborts the invocation with one [`ProcessingError`]; nothing
//! is retried and no partial output exists. [`ProcessingError::kind`] sorts
//! failures into three buckets:
//!
//! | Kind | Cause |
//! |---|---|
//! | `Decode` | reference unreadable, download failed, bytes not an image, resampler rejected the pixels |
//! | `Surface` | a drawing buffer could not be allocated at any stage (e.g. out of memory at 108 MP) |
//! | `Encode` | final serialization failed |

use crate::config::Settings;
use crate::imaging::{
    BackendError, Dimensions, Filter, ImageBackend, ProcessingOptions, ProcessingPlan,
    RenderConfig, RustBackend, enhance, plan,
};
use crate::source::{ImageRef, SourceError, SourceLimits};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("could not process image: {0}")]
    Source(#[from] SourceError),
    #[error("could not acquire drawing surface: {0}")]
    Surface(String),
    #[error("could not process image: {0}")]
    Imaging(BackendError),
}

impl From<BackendError> for ProcessingError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Surface(msg) => ProcessingError::Surface(msg),
            other => ProcessingError::Imaging(other),
        }
    }
}

/// Failure taxonomy surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Surface,
    Encode,
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::Source(_) => ErrorKind::Decode,
            ProcessingError::Surface(_) => ErrorKind::Surface,
            ProcessingError::Imaging(BackendError::Encode(_)) => ErrorKind::Encode,
            ProcessingError::Imaging(_) => ErrorKind::Decode,
        }
    }
}

/// A finished, encoded image ready for delivery.
#[derive(Debug, Clone)]
pub struct OutputImage {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
    pub filter: Filter,
    /// Suggested download name, e.g. `enhanced-image-6MP.jpeg`.
    pub filename: String,
}

impl OutputImage {
    /// Write the image into `dir` under its download filename.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a failed write never leaves a truncated download behind.
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        let partial = dir.join(format!(".{}.partial", self.filename));
        std::fs::write(&partial, &self.bytes)?;
        if let Err(e) = std::fs::rename(&partial, &path) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        log::info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Run the full pipeline with the production backend.
pub fn process(
    image_ref: &ImageRef,
    options: &ProcessingOptions,
    settings: &Settings,
) -> Result<OutputImage, ProcessingError> {
    process_with(
        &RustBackend::new(),
        image_ref,
        options,
        &settings.render_config(),
        &settings.source_limits(),
    )
}

/// Run the full pipeline on any backend.
pub fn process_with(
    backend: &impl ImageBackend,
    image_ref: &ImageRef,
    options: &ProcessingOptions,
    render: &RenderConfig,
    limits: &SourceLimits,
) -> Result<OutputImage, ProcessingError> {
    log::info!(
        "processing {} at {} MP ({})",
        image_ref,
        options.target_megapixels,
        options.filter()
    );
    let bytes = image_ref.load(limits)?;
    let encoded = enhance(backend, &bytes, options, render).inspect_err(|e| {
        log::warn!("processing {} failed: {}", image_ref, e);
    })?;

    Ok(OutputImage {
        bytes: encoded.bytes,
        dimensions: encoded.plan.output,
        filter: encoded.plan.filter,
        filename: encoded.plan.filename,
    })
}

/// Plan a run without rendering: sizes, preset and filename only.
pub fn plan_only(
    image_ref: &ImageRef,
    options: &ProcessingOptions,
    settings: &Settings,
) -> Result<ProcessingPlan, ProcessingError> {
    let bytes = image_ref.load(&settings.source_limits())?;
    Ok(plan(
        &RustBackend::new(),
        &bytes,
        options,
        &settings.render_config(),
    )?)
}
