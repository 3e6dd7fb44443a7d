//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Source: photo.jpg
//!     Native: 1024x768 (0.79 MP)
//!     Output: 4000x3000 (12.00 MP, upscaled)
//!     Filter: saturate(1.1) contrast(1.1)
//!     File: enhanced-image-12MP.jpeg
//! ```
//!
//! ## Upscale
//!
//! ```text
//! enhanced-image-12MP.jpeg → ./enhanced-image-12MP.jpeg
//!     Output: 4000x3000 (12.00 MP)
//!     Filter: saturate(1.1) contrast(1.1)
//!     Size: 4.21 MB
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::imaging::{Dimensions, ProcessingPlan};
use crate::process::OutputImage;
use crate::source::ImageRef;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn megapixels(dims: Dimensions) -> String {
    format!("{:.2} MP", dims.pixel_count() as f64 / 1_000_000.0)
}

fn size_line(dims: Dimensions) -> String {
    format!("{}x{} ({})", dims.width, dims.height, megapixels(dims))
}

fn human_bytes(len: usize) -> String {
    const KB: f64 = 1024.0;
    let len = len as f64;
    if len >= KB * KB {
        format!("{:.2} MB", len / (KB * KB))
    } else if len >= KB {
        format!("{:.1} KB", len / KB)
    } else {
        format!("{} B", len)
    }
}

pub fn format_plan(image_ref: &ImageRef, plan: &ProcessingPlan) -> Vec<String> {
    let output = if plan.upscaled {
        format!(
            "{}x{} ({}, upscaled)",
            plan.output.width,
            plan.output.height,
            megapixels(plan.output)
        )
    } else {
        format!("{} (unchanged)", size_line(plan.output))
    };
    vec![
        format!("Source: {}", image_ref),
        format!("{}Native: {}", indent(1), size_line(plan.native)),
        format!("{}Output: {}", indent(1), output),
        format!("{}Filter: {}", indent(1), plan.filter),
        format!("{}File: {}", indent(1), plan.filename),
    ]
}

pub fn print_plan(image_ref: &ImageRef, plan: &ProcessingPlan) {
    for line in format_plan(image_ref, plan) {
        println!("{}", line);
    }
}

pub fn format_saved(image: &OutputImage, path: &Path) -> Vec<String> {
    vec![
        format!("{} → {}", image.filename, path.display()),
        format!("{}Output: {}", indent(1), size_line(image.dimensions)),
        format!("{}Filter: {}", indent(1), image.filter),
        format!("{}Size: {}", indent(1), human_bytes(image.bytes.len())),
    ]
}

pub fn print_saved(image: &OutputImage, path: &Path) {
    for line in format_saved(image, path) {
        println!("{}", line);
    }
}
