//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides sizes and presets) and the [`backend`](super::backend)
//! (which does the actual pixel work). Keeping them plain values lets a mock
//! backend record exactly what the pipeline asked for.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 98). Clamped on construction.
//! - [`Smoothing`] — Resampling quality tier, mirroring a canvas `imageSmoothingQuality`.
//! - [`OutputFormat`] — Encoded container for the final artifact.
//! - [`Filter`] — Enhancement preset: `None`, `Subtle` or `Detailed`.
//! - [`ColorAdjustment`] — The (saturation, contrast, brightness) triple behind a preset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    /// 98: near-lossless JPEG, the level used for downloadable masters.
    fn default() -> Self {
        Self(98)
    }
}

/// Resampling quality. Never nearest-neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    Low,
    Medium,
    #[default]
    High,
}

/// Encoded output container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension used in the download filename.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Multipliers applied, in order, by an enhancement preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorAdjustment {
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
}

impl ColorAdjustment {
    pub const IDENTITY: Self = Self {
        saturation: 1.0,
        contrast: 1.0,
        brightness: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Enhancement preset applied at native resolution before resampling.
///
/// | Preset | saturate | contrast | brightness |
/// |---|---|---|---|
/// | `None` | 1.0 | 1.0 | 1.0 |
/// | `Subtle` | 1.1 | 1.1 | 1.0 |
/// | `Detailed` | 1.2 | 1.25 | 1.05 |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    None,
    Subtle,
    Detailed,
}

impl Filter {
    /// Pick the preset for a pair of option flags. `detailed` wins over `enhance`.
    pub fn select(enhance: bool, detailed: bool) -> Self {
        if detailed {
            Filter::Detailed
        } else if enhance {
            Filter::Subtle
        } else {
            Filter::None
        }
    }

    pub fn adjustment(self) -> ColorAdjustment {
        match self {
            Filter::None => ColorAdjustment::IDENTITY,
            Filter::Subtle => ColorAdjustment {
                saturation: 1.1,
                contrast: 1.1,
                brightness: 1.0,
            },
            Filter::Detailed => ColorAdjustment {
                saturation: 1.2,
                contrast: 1.25,
                brightness: 1.05,
            },
        }
    }
}

impl fmt::Display for Filter {
    /// CSS filter-function notation, e.g. `saturate(1.1) contrast(1.1)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::None => f.write_str("none"),
            Filter::Subtle => f.write_str("saturate(1.1) contrast(1.1)"),
            Filter::Detailed => f.write_str("saturate(1.2) contrast(1.25) brightness(1.05)"),
        }
    }
}
