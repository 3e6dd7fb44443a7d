//! Colour transform behind the enhancement presets.
//!
//! Follows the CSS filter-effects definitions so a preset renders the same
//! way it would through a canvas `filter` string:
//!
//! - `saturate(s)`: the feColorMatrix `saturate` matrix (Rec. 709 luma weights)
//! - `contrast(c)`: `v' = (v - 0.5) * c + 0.5`
//! - `brightness(b)`: `v' = v * b`
//!
//! Functions are applied left to right on straight (non-premultiplied) sRGB
//! values in `[0, 1]`, each result clamped before the next. Alpha is untouched.

use super::params::ColorAdjustment;
use image::{Rgba, RgbaImage};

/// Apply an adjustment to a single RGB triple in `[0, 1]`.
pub fn adjust_rgb(rgb: [f32; 3], adj: &ColorAdjustment) -> [f32; 3] {
    let [r, g, b] = saturate(rgb, adj.saturation);
    [r, g, b].map(|v| {
        let v = ((v - 0.5) * adj.contrast + 0.5).clamp(0.0, 1.0);
        (v * adj.brightness).clamp(0.0, 1.0)
    })
}

fn saturate([r, g, b]: [f32; 3], s: f32) -> [f32; 3] {
    let out = [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ];
    out.map(|v| v.clamp(0.0, 1.0))
}

/// Apply an adjustment to one 8-bit pixel.
pub fn adjust_pixel(px: Rgba<u8>, adj: &ColorAdjustment) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    let rgb = [r, g, b].map(|c| c as f32 / 255.0);
    let [r, g, b] = adjust_rgb(rgb, adj).map(|v| (v * 255.0).round() as u8);
    Rgba([r, g, b, a])
}

/// Write `source` through `adj` into `target`. Both buffers must share dimensions.
pub fn apply_into(source: &RgbaImage, target: &mut RgbaImage, adj: &ColorAdjustment) {
    if adj.is_identity() {
        target.copy_from_slice(source.as_raw());
        return;
    }
    for (dst, src) in target.pixels_mut().zip(source.pixels()) {
        *dst = adjust_pixel(*src, adj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Filter;

    #[test]
    fn identity_leaves_pixels_alone() {
        let adj = Filter::None.adjustment();
        for px in [[0, 0, 0, 255], [12, 200, 99, 40], [255, 255, 255, 0]] {
            assert_eq!(adjust_pixel(Rgba(px), &adj), Rgba(px));
        }
    }

    #[test]
    fn grey_is_invariant_under_saturation() {
        let adj = ColorAdjustment {
            saturation: 1.2,
            contrast: 1.0,
            brightness: 1.0,
        };
        assert_eq!(adjust_pixel(Rgba([128, 128, 128, 255]), &adj), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn mid_grey_is_contrast_pivot() {
        // 0.5 maps to itself for any contrast; 127.5 is the exact pivot
        let adj = Filter::Subtle.adjustment();
        let [r, g, b] = adjust_rgb([0.5, 0.5, 0.5], &adj);
        assert!((r - 0.5).abs() < 1e-6 && (g - 0.5).abs() < 1e-6 && (b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn contrast_spreads_values_away_from_mid() {
        let adj = ColorAdjustment {
            saturation: 1.0,
            contrast: 1.25,
            brightness: 1.0,
        };
        let dark = adjust_pixel(Rgba([64, 64, 64, 255]), &adj);
        let light = adjust_pixel(Rgba([192, 192, 192, 255]), &adj);
        assert!(dark.0[0] < 64);
        assert!(light.0[0] > 192);
    }

    #[test]
    fn saturation_pushes_channels_apart() {
        let adj = ColorAdjustment {
            saturation: 1.2,
            contrast: 1.0,
            brightness: 1.0,
        };
        let out = adjust_pixel(Rgba([200, 100, 50, 255]), &adj);
        assert!(out.0[0] > 200);
        assert!(out.0[2] < 50);
    }

    #[test]
    fn brightness_clamps_at_white() {
        let adj = Filter::Detailed.adjustment();
        assert_eq!(adjust_pixel(Rgba([255, 255, 255, 255]), &adj), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn alpha_is_preserved() {
        let adj = Filter::Detailed.adjustment();
        assert_eq!(adjust_pixel(Rgba([10, 120, 240, 77]), &adj).0[3], 77);
    }

    #[test]
    fn apply_into_copies_for_identity() {
        let src = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 50, y as u8 * 70, 9, 255]));
        let mut dst = RgbaImage::new(4, 3);
        apply_into(&src, &mut dst, &ColorAdjustment::IDENTITY);
        assert_eq!(src, dst);
    }

    #[test]
    fn apply_into_transforms_every_pixel() {
        let src = RgbaImage::from_pixel(3, 3, Rgba([64, 64, 64, 255]));
        let mut dst = RgbaImage::new(3, 3);
        apply_into(&src, &mut dst, &Filter::Subtle.adjustment());
        let expected = adjust_pixel(Rgba([64, 64, 64, 255]), &Filter::Subtle.adjustment());
        assert!(dst.pixels().all(|p| *p == expected));
    }
}
