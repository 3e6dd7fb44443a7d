//! Raster-surface backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the enhancement pipeline and
//! whatever actually owns pixels. It exposes the handful of drawing-surface
//! operations the pipeline needs: identify, decode, allocate, draw through a
//! filter, resample into another surface, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use a recording
//! mock whose surfaces carry only their dimensions.

use super::params::{Filter, OutputFormat, Quality, Smoothing};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Surface unavailable: {0}")]
    Surface(String),
    #[error("Resampling failed: {0}")]
    Resample(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Width and height of an image or surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Trait for raster backends.
///
/// Surfaces are owned by a single pipeline invocation. A backend holds no
/// per-invocation state, so one instance can serve concurrent callers.
pub trait ImageBackend: Sync {
    type Surface;

    /// Read dimensions from the encoded header without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode an encoded image into a surface at its natural size.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Surface, BackendError>;

    fn dimensions(&self, surface: &Self::Surface) -> Dimensions;

    /// Acquire a blank surface.
    fn allocate(&self, dims: Dimensions) -> Result<Self::Surface, BackendError>;

    /// Draw `source` onto a same-sized `target` through a colour filter.
    fn draw_filtered(
        &self,
        source: &Self::Surface,
        target: &mut Self::Surface,
        filter: Filter,
    ) -> Result<(), BackendError>;

    /// Scale all of `source` to fill all of `target`.
    fn resample_into(
        &self,
        source: &Self::Surface,
        target: &mut Self::Surface,
        smoothing: Smoothing,
    ) -> Result<(), BackendError>;

    /// Serialize a surface. Must be deterministic for identical input.
    fn encode(
        &self,
        surface: &Self::Surface,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
