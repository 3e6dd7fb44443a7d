//! Image post-processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / decode** | `image` (JPEG, PNG, TIFF, WebP) |
//! | **Enhance** | [`filter`] — saturate / contrast / brightness |
//! | **Upscale** | `fast_image_resize` Lanczos3 into a pre-allocated surface |
//! | **Encode** | `image` JPEG (quality 98) or PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Presets, quality and format values
//! - **Filter**: Per-pixel colour math behind the presets
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`plan`] and [`enhance`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod filter;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_output_dimensions, download_filename, target_pixels};
pub use operations::{
    EncodedImage, ProcessingOptions, ProcessingPlan, RenderConfig, enhance, plan, plan_for,
};
pub use params::{ColorAdjustment, Filter, OutputFormat, Quality, Smoothing};
pub use rust_backend::RustBackend;
