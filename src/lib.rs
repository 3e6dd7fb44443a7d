//! # Enhance Image
//!
//! Post-processing for generated stock images: take a (usually low
//! resolution) image, give it a subtle or stronger colour lift, upscale it to
//! a megapixel budget, and hand back a high-quality JPEG ready to download.
//!
//! # Pipeline
//!
//! One call runs one linear pass; there are no stages to resume:
//!
//! ```text
//! ImageRef ─load→ bytes ─decode→ surface ─filter→ surface (native size)
//!          ─size→ output dims ─resample→ surface ─encode→ OutputImage
//! ```
//!
//! The colour preset is applied at native resolution, before resampling.
//! Resolution only ever goes up: an image already at or above the budget is
//! encoded at its own size.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Entry point: [`process::process`], delivery, error taxonomy |
//! | [`imaging`] | Dimension math, presets, backend trait, pure-Rust backend, pipeline |
//! | [`source`] | Resolves data URIs, paths and URLs into encoded bytes |
//! | [`config`] | `enhance-image.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Backend Trait, Not a Canvas
//!
//! The pipeline talks to an [`imaging::ImageBackend`]: allocate a surface,
//! draw through a filter, resample into another surface, encode. The
//! production [`imaging::RustBackend`] is pure Rust; tests swap in a
//! recording mock so pipeline ordering and failure handling can be checked
//! without touching pixels.
//!
//! ## Presets Are Values
//!
//! [`imaging::Filter`] is `None`, `Subtle` or `Detailed`, each a fixed
//! (saturation, contrast, brightness) triple. `Detailed` wins whenever it is
//! requested.
//!
//! ## No DPI Metadata
//!
//! The 300 DPI option is accepted and ignored: no physical-resolution
//! metadata is embedded. Print quality comes from the pixel count alone.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
