//! High-level image operations.
//!
//! These functions combine calculations with backend execution. [`enhance`]
//! is the whole post-processing run, one linear pass:
//!
//! ```text
//! decode → filter (native size) → compute size → resample → encode
//! ```
//!
//! The colour filter is applied before resampling so the presets act on
//! native detail, once per source pixel. Any failure aborts the run and no
//! partial output is produced.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{calculate_output_dimensions, download_filename};
use super::params::{Filter, OutputFormat, Quality, Smoothing};
use serde::Serialize;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Per-invocation options chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Pixel budget in millions. The upscale menu is enforced by callers.
    pub target_megapixels: u32,
    pub enhance: bool,
    /// Stronger preset; takes precedence over `enhance`.
    pub detailed_enhance: bool,
    /// Acknowledged only. No physical-resolution metadata is written; the
    /// pixel upscale is what satisfies print-size expectations.
    pub set_dpi_300: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            target_megapixels: 6,
            enhance: true,
            detailed_enhance: false,
            set_dpi_300: true,
        }
    }
}

impl ProcessingOptions {
    pub fn filter(&self) -> Filter {
        Filter::select(self.enhance, self.detailed_enhance)
    }
}

/// Encoder and resampler settings that stay fixed across invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub quality: Quality,
    pub smoothing: Smoothing,
}

/// Everything decided about a run before any pixel is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingPlan {
    pub native: Dimensions,
    pub output: Dimensions,
    pub filter: Filter,
    pub upscaled: bool,
    pub filename: String,
}

/// Plan a run for an image of known native size.
pub fn plan_for(
    native: Dimensions,
    options: &ProcessingOptions,
    config: &RenderConfig,
) -> ProcessingPlan {
    let output = calculate_output_dimensions(native, options.target_megapixels);
    ProcessingPlan {
        native,
        output,
        filter: options.filter(),
        upscaled: output != native,
        filename: download_filename(options.target_megapixels, config.format.extension()),
    }
}

/// Plan a run from the encoded header alone, without decoding pixels.
pub fn plan(
    backend: &impl ImageBackend,
    bytes: &[u8],
    options: &ProcessingOptions,
    config: &RenderConfig,
) -> Result<ProcessingPlan> {
    let native = backend.identify(bytes)?;
    Ok(plan_for(native, options, config))
}

/// Encoded output of a completed run.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub plan: ProcessingPlan,
}

/// Decode, enhance, upscale and encode one image.
pub fn enhance<B: ImageBackend>(
    backend: &B,
    bytes: &[u8],
    options: &ProcessingOptions,
    config: &RenderConfig,
) -> Result<EncodedImage> {
    let source = backend.decode(bytes)?;
    let native = backend.dimensions(&source);
    let plan = plan_for(native, options, config);
    log::debug!(
        "decoded {}x{} source, filter: {}",
        native.width,
        native.height,
        plan.filter
    );

    if options.set_dpi_300 {
        log::debug!("300 DPI requested; resolution metadata is not embedded");
    }

    let mut filtered = backend.allocate(native)?;
    backend.draw_filtered(&source, &mut filtered, plan.filter)?;
    drop(source);

    let output = if plan.upscaled {
        log::debug!(
            "resampling to {}x{} ({:?} smoothing)",
            plan.output.width,
            plan.output.height,
            config.smoothing
        );
        let mut output = backend.allocate(plan.output)?;
        backend.resample_into(&filtered, &mut output, config.smoothing)?;
        drop(filtered);
        output
    } else {
        log::debug!(
            "source already meets {} MP, keeping native size",
            options.target_megapixels
        );
        filtered
    };

    let bytes = backend.encode(&output, config.format, config.quality)?;
    log::info!(
        "enhanced {}x{} → {}x{} ({} bytes, {})",
        plan.native.width,
        plan.native.height,
        plan.output.width,
        plan.output.height,
        bytes.len(),
        config.format.mime_type()
    );

    Ok(EncodedImage { bytes, plan })
}
