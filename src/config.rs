//! Settings loaded from `enhance-image.toml`.
//!
//! Every key is optional; a user file is a sparse overlay merged onto the
//! stock defaults, so a file containing only
//!
//! ```toml
//! [output]
//! quality = 95
//! ```
//!
//! changes the quality and nothing else. Unknown keys are rejected to catch
//! typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! [output]
//! format = "jpeg"           # "jpeg" or "png"
//! quality = 98              # JPEG quality (1-100)
//! directory = "."           # Where downloads are written
//!
//! [resample]
//! smoothing = "high"        # "low", "medium" or "high"
//!
//! [source]
//! max_bytes = 67108864      # Largest accepted encoded input (64 MiB)
//! timeout_secs = 30         # Download timeout for http(s) sources
//!
//! [defaults]
//! megapixels = 6            # One of 6, 8, 12, 24, 32, 64, 108
//! enhance = true
//! detailed_enhance = false
//! dpi_300 = true
//! ```

use crate::imaging::{OutputFormat, ProcessingOptions, Quality, RenderConfig, Smoothing};
use crate::source::SourceLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Megapixel budgets offered for download.
pub const UPSCALE_OPTIONS: [u32; 7] = [6, 8, 12, 24, 32, 64, 108];

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "enhance-image.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Whether `megapixels` is one of the offered budgets.
pub fn is_upscale_option(megapixels: u32) -> bool {
    UPSCALE_OPTIONS.contains(&megapixels)
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub output: OutputConfig,
    pub resample: ResampleConfig,
    pub source: SourceConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Lossy quality, 1 (worst) to 100 (best). Ignored for PNG.
    pub quality: u32,
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 98,
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub smoothing: Smoothing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub max_bytes: u64,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let limits = SourceLimits::default();
        Self {
            max_bytes: limits.max_bytes,
            timeout_secs: limits.timeout.as_secs(),
        }
    }
}

/// Option values used when the command line does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub megapixels: u32,
    pub enhance: bool,
    pub detailed_enhance: bool,
    pub dpi_300: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let options = ProcessingOptions::default();
        Self {
            megapixels: options.target_megapixels,
            enhance: options.enhance,
            detailed_enhance: options.detailed_enhance,
            dpi_300: options.set_dpi_300,
        }
    }
}

impl Settings {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.source.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "source.max_bytes must be non-zero".into(),
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be non-zero".into(),
            ));
        }
        if !is_upscale_option(self.defaults.megapixels) {
            return Err(ConfigError::Validation(format!(
                "defaults.megapixels must be one of {:?}",
                UPSCALE_OPTIONS
            )));
        }
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            format: self.output.format,
            quality: Quality::new(self.output.quality),
            smoothing: self.resample.smoothing,
        }
    }

    pub fn source_limits(&self) -> SourceLimits {
        SourceLimits {
            max_bytes: self.source.max_bytes,
            timeout: Duration::from_secs(self.source.timeout_secs),
        }
    }

    pub fn default_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            target_megapixels: self.defaults.megapixels,
            enhance: self.defaults.enhance,
            detailed_enhance: self.defaults.detailed_enhance,
            set_dpi_300: self.defaults.dpi_300,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Settings::default())
        .map_err(|e| ConfigError::Validation(format!("default settings must serialize: {}", e)))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an overlay parsed from `content` onto the stock defaults, then
/// deserialize and validate.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a file.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in the
/// working directory is used if present, otherwise stock defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(Settings::default());
            }
            fallback
        }
    };
    log::debug!("loading settings from {}", path.display());
    let content = fs::read_to_string(&path)?;
    parse_settings(&content)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# enhance-image configuration
# ===========================
# All keys are optional. Values shown are the defaults.

[output]
# Encoded container for downloads: "jpeg" or "png".
format = "jpeg"
# Lossy quality, 1 (worst) to 100 (best). PNG ignores it.
quality = 98
# Directory the finished file is written to.
directory = "."

[resample]
# Upscaling filter: "low" (bilinear), "medium" (Catmull-Rom), "high" (Lanczos3).
smoothing = "high"

[source]
# Largest encoded input accepted, in bytes.
max_bytes = 67108864
# Timeout for http(s) downloads, in seconds.
timeout_secs = 30

[defaults]
# Megapixel budget: one of 6, 8, 12, 24, 32, 64, 108.
megapixels = 6
# Subtle saturation/contrast boost.
enhance = true
# Stronger boost with a touch of brightness; wins over `enhance`.
detailed_enhance = false
# Acknowledged only: no DPI metadata is written, the upscale carries print quality.
dpi_300 = true
"##
}
