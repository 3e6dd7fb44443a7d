//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Pixels in one megapixel.
pub const PIXELS_PER_MEGAPIXEL: u64 = 1_000_000;

/// Total pixel count for a megapixel budget.
pub fn target_pixels(megapixels: u32) -> u64 {
    megapixels as u64 * PIXELS_PER_MEGAPIXEL
}

/// Calculate output dimensions for a megapixel budget.
///
/// Images that already meet the budget keep their native size; the result is
/// never smaller than the source. Smaller images are scaled isotropically by
/// `sqrt(target / current)` with each edge floored on its own, so the realized
/// pixel count can land a few rows short of the nominal target.
///
/// # Examples
/// ```
/// # use enhance_image::imaging::{Dimensions, calculate_output_dimensions};
/// // 1000x1000 at 6 MP → scale sqrt(6) ≈ 2.449 → 2449x2449
/// let out = calculate_output_dimensions(Dimensions { width: 1000, height: 1000 }, 6);
/// assert_eq!((out.width, out.height), (2449, 2449));
///
/// // 5000x5000 is already 25 MP → unchanged
/// let out = calculate_output_dimensions(Dimensions { width: 5000, height: 5000 }, 6);
/// assert_eq!((out.width, out.height), (5000, 5000));
/// ```
pub fn calculate_output_dimensions(native: Dimensions, megapixels: u32) -> Dimensions {
    let current = native.pixel_count();
    let target = target_pixels(megapixels);

    if current == 0 || current >= target {
        return native;
    }

    let scale = (target as f64 / current as f64).sqrt();
    Dimensions {
        // `as` saturates, so absurd budgets clamp to u32::MAX instead of wrapping
        width: (native.width as f64 * scale).floor() as u32,
        height: (native.height as f64 * scale).floor() as u32,
    }
}

/// Download filename for a finished image, e.g. `enhanced-image-6MP.jpeg`.
pub fn download_filename(megapixels: u32, extension: &str) -> String {
    format!("enhanced-image-{}MP.{}", megapixels, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // calculate_output_dimensions tests
    // =========================================================================

    #[test]
    fn square_upscale_to_6mp() {
        // sqrt(6) = 2.44948... → floor(2449.48) = 2449
        assert_eq!(calculate_output_dimensions(dims(1000, 1000), 6), dims(2449, 2449));
    }

    #[test]
    fn already_above_target_is_unchanged() {
        assert_eq!(calculate_output_dimensions(dims(5000, 5000), 6), dims(5000, 5000));
    }

    #[test]
    fn exactly_at_target_is_unchanged() {
        // 3000x2000 = 6,000,000 exactly; no scaling
        assert_eq!(calculate_output_dimensions(dims(3000, 2000), 6), dims(3000, 2000));
    }

    #[test]
    fn landscape_upscale_to_12mp() {
        // 1024x768 = 786,432 px; scale = sqrt(12e6 / 786432) = 3.90625
        // 1024 * 3.90625 = 4000, 768 * 3.90625 = 3000
        assert_eq!(calculate_output_dimensions(dims(1024, 768), 12), dims(4000, 3000));
    }

    #[test]
    fn portrait_upscale_to_24mp() {
        // 768x1024 is the transpose of the 12MP landscape case
        let out = calculate_output_dimensions(dims(768, 1024), 24);
        assert!(out.width < out.height);
        // scale = sqrt(24e6 / 786432) = 5.5242...
        assert_eq!(out, dims(4242, 5656));
    }

    #[test]
    fn floor_can_land_below_nominal_target() {
        let out = calculate_output_dimensions(dims(1000, 1000), 6);
        assert!(out.pixel_count() < target_pixels(6));
        // the shortfall is bounded by one row plus one column
        assert!(target_pixels(6) - out.pixel_count() < (out.width + out.height + 1) as u64);
    }

    #[test]
    fn never_downscales_for_every_menu_value() {
        for mp in [6, 8, 12, 24, 32, 64, 108] {
            for (w, h) in [(1, 1), (640, 480), (1024, 1792), (12000, 9000)] {
                let out = calculate_output_dimensions(dims(w, h), mp);
                assert!(out.width >= w && out.height >= h, "{w}x{h} at {mp}MP → {out:?}");
            }
        }
    }

    #[test]
    fn aspect_ratio_is_preserved_within_floor_error() {
        for (w, h) in [(1024, 768), (768, 1344), (1408, 768), (333, 1000)] {
            let out = calculate_output_dimensions(dims(w, h), 32);
            let before = w as f64 / h as f64;
            let after = out.width as f64 / out.height as f64;
            // each edge loses less than one pixel to flooring
            let epsilon = (before + 1.0) / out.height as f64;
            assert!(
                (after - before).abs() < epsilon,
                "{w}x{h} → {}x{}",
                out.width,
                out.height
            );
        }
    }

    #[test]
    fn zero_budget_keeps_native_size() {
        assert_eq!(calculate_output_dimensions(dims(800, 600), 0), dims(800, 600));
    }

    #[test]
    fn single_pixel_to_108mp() {
        // sqrt(108e6) = 10392.3...
        assert_eq!(calculate_output_dimensions(dims(1, 1), 108), dims(10392, 10392));
    }

    // =========================================================================
    // download_filename tests
    // =========================================================================

    #[test]
    fn filename_pattern() {
        assert_eq!(download_filename(6, "jpeg"), "enhanced-image-6MP.jpeg");
        assert_eq!(download_filename(108, "png"), "enhanced-image-108MP.png");
    }
}
