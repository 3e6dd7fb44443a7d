//! Pure Rust raster backend.
//!
//! Surfaces are straight-alpha `RgbaImage` buffers.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | Allocate, JPEG flatten | fallible `Vec::try_reserve_exact`, so exhaustion is an error, not an abort |
//! | Colour filter | [`filter`](super::filter) (CSS filter-effects math) |
//! | Resample | `fast_image_resize` convolution (Lanczos3 / CatmullRom / Bilinear) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder`, alpha flattened over black |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::filter;
use super::params::{Filter, OutputFormat, Quality, Smoothing};
use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn dimensions_of(img: &RgbaImage) -> Dimensions {
    Dimensions {
        width: img.width(),
        height: img.height(),
    }
}

/// Byte length of a `channels`-per-pixel buffer, or `None` if it cannot be addressed.
fn buffer_len(dims: Dimensions, channels: usize) -> Option<usize> {
    (dims.width as usize)
        .checked_mul(dims.height as usize)
        .and_then(|pixels| pixels.checked_mul(channels))
}

/// Reserve an empty buffer for a full-size `dims` raster.
///
/// Every full-resolution buffer goes through here so that exhaustion at large
/// targets comes back as [`BackendError::Surface`] instead of aborting.
fn reserve_buffer(dims: Dimensions, channels: usize) -> Result<Vec<u8>, BackendError> {
    let len = buffer_len(dims, channels).ok_or_else(|| {
        BackendError::Surface(format!(
            "{}x{} surface exceeds addressable memory",
            dims.width, dims.height
        ))
    })?;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        BackendError::Surface(format!(
            "Out of memory for {}x{} surface ({} bytes): {}",
            dims.width, dims.height, len, e
        ))
    })?;
    Ok(buf)
}

fn filter_type(smoothing: Smoothing) -> fr::FilterType {
    match smoothing {
        Smoothing::Low => fr::FilterType::Bilinear,
        Smoothing::Medium => fr::FilterType::CatmullRom,
        Smoothing::High => fr::FilterType::Lanczos3,
    }
}

/// Composite straight-alpha RGBA over black, as a canvas does for `image/jpeg`.
/// Returns packed RGB bytes.
fn flatten_over_black(img: &RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut rgb = reserve_buffer(dimensions_of(img), 3)?;
    for px in img.as_raw().chunks_exact(4) {
        let a = px[3] as u32;
        let over = |c: u8| ((c as u32 * a + 127) / 255) as u8;
        rgb.extend_from_slice(&[over(px[0]), over(px[1]), over(px[2])]);
    }
    Ok(rgb)
}

impl ImageBackend for RustBackend {
    type Surface = RgbaImage;

    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(format!("Failed to sniff format: {}", e)))?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| BackendError::Decode(format!("Failed to decode image: {}", e)))?;
        Ok(img.into_rgba8())
    }

    fn dimensions(&self, surface: &RgbaImage) -> Dimensions {
        dimensions_of(surface)
    }

    fn allocate(&self, dims: Dimensions) -> Result<RgbaImage, BackendError> {
        if dims.width == 0 || dims.height == 0 {
            return Err(BackendError::Surface(format!(
                "Cannot create a {}x{} surface",
                dims.width, dims.height
            )));
        }
        let mut buf = reserve_buffer(dims, 4)?;
        buf.resize(dims.pixel_count() as usize * 4, 0);

        RgbaImage::from_raw(dims.width, dims.height, buf).ok_or_else(|| {
            BackendError::Surface("Surface buffer length does not match dimensions".into())
        })
    }

    fn draw_filtered(
        &self,
        source: &RgbaImage,
        target: &mut RgbaImage,
        filter: Filter,
    ) -> Result<(), BackendError> {
        if source.dimensions() != target.dimensions() {
            return Err(BackendError::Surface(format!(
                "Filter target is {}x{}, source is {}x{}",
                target.width(),
                target.height(),
                source.width(),
                source.height()
            )));
        }
        filter::apply_into(source, target, &filter.adjustment());
        Ok(())
    }

    fn resample_into(
        &self,
        source: &RgbaImage,
        target: &mut RgbaImage,
        smoothing: Smoothing,
    ) -> Result<(), BackendError> {
        if source.dimensions() == target.dimensions() {
            target.copy_from_slice(source.as_raw());
            return Ok(());
        }

        let (src_w, src_h) = source.dimensions();
        let (dst_w, dst_h) = target.dimensions();

        let src_image =
            fr::images::ImageRef::new(src_w, src_h, source.as_raw(), fr::PixelType::U8x4)
                .map_err(|e| BackendError::Resample(format!("Source buffer rejected: {}", e)))?;

        // Resize straight into the target's allocation rather than a fresh one.
        let dst_buf = std::mem::replace(target, RgbaImage::new(0, 0)).into_raw();
        let mut dst_image = fr::images::Image::from_vec_u8(dst_w, dst_h, dst_buf, fr::PixelType::U8x4)
            .map_err(|e| BackendError::Resample(format!("Target buffer rejected: {}", e)))?;

        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(filter_type(smoothing)));
        fr::Resizer::new()
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| BackendError::Resample(format!("Resampling failed: {}", e)))?;

        *target = RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec()).ok_or_else(|| {
            BackendError::Resample("Resampled buffer length does not match dimensions".into())
        })?;
        Ok(())
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let (width, height) = surface.dimensions();
        let mut out = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let rgb = flatten_over_black(surface)?;
                JpegEncoder::new_with_quality(&mut out, quality.value())
                    .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
            }
            OutputFormat::Png => {
                PngEncoder::new(&mut out)
                    .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| BackendError::Encode(format!("PNG encode failed: {}", e)))?;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_jpeg, solid_png};
    use image::Rgba;

    #[test]
    fn identify_synthetic_jpeg() {
        let bytes = gradient_jpeg(200, 150);
        let dims = RustBackend::new().identify(&bytes).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_garbage_errors() {
        let result = RustBackend::new().identify(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_png_keeps_alpha() {
        let bytes = solid_png(3, 2, [10, 20, 30, 40]);
        let img = RustBackend::new().decode(&bytes).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1), &Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn decode_unknown_format_errors() {
        let result = RustBackend::new().decode(b"just some text");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn allocate_zero_sized_errors() {
        let result = RustBackend::new().allocate(Dimensions { width: 0, height: 10 });
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn allocate_unaddressable_errors() {
        let result = RustBackend::new().allocate(Dimensions {
            width: u32::MAX,
            height: u32::MAX,
        });
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn allocate_is_blank() {
        let surface = RustBackend::new()
            .allocate(Dimensions { width: 5, height: 4 })
            .unwrap();
        assert_eq!(surface.dimensions(), (5, 4));
        assert!(surface.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_filtered_rejects_mismatched_target() {
        let backend = RustBackend::new();
        let source = RgbaImage::new(4, 4);
        let mut target = RgbaImage::new(5, 4);
        let result = backend.draw_filtered(&source, &mut target, Filter::Subtle);
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn resample_uniform_colour_stays_uniform() {
        let backend = RustBackend::new();
        let source = RgbaImage::from_pixel(6, 4, Rgba([90, 160, 30, 255]));
        let mut target = backend
            .allocate(Dimensions { width: 15, height: 10 })
            .unwrap();
        backend
            .resample_into(&source, &mut target, Smoothing::High)
            .unwrap();

        assert_eq!(target.dimensions(), (15, 10));
        for px in target.pixels() {
            for (got, want) in px.0.iter().zip([90u8, 160, 30, 255]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", px);
            }
        }
    }

    #[test]
    fn resample_same_size_is_a_copy() {
        let backend = RustBackend::new();
        let source = RgbaImage::from_fn(8, 8, |x, y| Rgba([x as u8 * 30, y as u8 * 30, 7, 255]));
        let mut target = backend.allocate(Dimensions { width: 8, height: 8 }).unwrap();
        backend
            .resample_into(&source, &mut target, Smoothing::Low)
            .unwrap();
        assert_eq!(source, target);
    }

    #[test]
    fn jpeg_encode_is_deterministic_and_decodable() {
        let backend = RustBackend::new();
        let surface = RgbaImage::from_fn(40, 30, |x, y| Rgba([x as u8 * 6, y as u8 * 8, 100, 255]));

        let first = backend
            .encode(&surface, OutputFormat::Jpeg, Quality::default())
            .unwrap();
        let second = backend
            .encode(&surface, OutputFormat::Jpeg, Quality::default())
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[..2], &[0xFF, 0xD8]);

        let dims = backend.identify(&first).unwrap();
        assert_eq!(dims, Dimensions { width: 40, height: 30 });
    }

    #[test]
    fn png_encode_keeps_alpha() {
        let backend = RustBackend::new();
        let surface = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        let bytes = backend
            .encode(&surface, OutputFormat::Png, Quality::default())
            .unwrap();
        let decoded = backend.decode(&bytes).unwrap();
        assert_eq!(decoded, surface);
    }

    #[test]
    fn flatten_composites_over_black() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([200, 100, 50, 255]),
            1 => Rgba([200, 100, 50, 0]),
            _ => Rgba([200, 100, 50, 128]),
        });
        let flat = flatten_over_black(&img).unwrap();
        assert_eq!(flat, vec![200, 100, 50, 0, 0, 0, 100, 50, 25]);
    }

    #[test]
    fn unreservable_buffer_is_surface_error() {
        // Fits in usize but exceeds isize::MAX, so the reservation itself fails.
        let dims = Dimensions {
            width: u32::MAX,
            height: 1 << 30,
        };
        assert!(buffer_len(dims, 3).is_some());
        let result = reserve_buffer(dims, 3);
        assert!(matches!(result, Err(BackendError::Surface(ref msg)) if msg.starts_with("Out of memory")));
    }

    #[test]
    fn unaddressable_buffer_is_surface_error() {
        let dims = Dimensions {
            width: u32::MAX,
            height: u32::MAX,
        };
        assert!(buffer_len(dims, 3).is_none());
        assert!(matches!(reserve_buffer(dims, 3), Err(BackendError::Surface(_))));
    }

    #[test]
    fn draw_filtered_applies_preset_per_pixel() {
        let backend = RustBackend::new();
        let source = RgbaImage::from_fn(6, 5, |x, y| {
            Rgba([x as u8 * 40, y as u8 * 50, 128, 200 + x as u8])
        });

        for preset in [Filter::Subtle, Filter::Detailed] {
            let mut target = backend.allocate(Dimensions { width: 6, height: 5 }).unwrap();
            backend.draw_filtered(&source, &mut target, preset).unwrap();

            let adj = preset.adjustment();
            for (x, y, px) in source.enumerate_pixels() {
                assert_eq!(
                    target.get_pixel(x, y),
                    &filter::adjust_pixel(*px, &adj),
                    "{:?} at ({}, {})",
                    preset,
                    x,
                    y
                );
            }
            assert_ne!(target, source, "{:?} left the image untouched", preset);
        }
    }

    #[test]
    fn draw_filtered_without_preset_copies() {
        let backend = RustBackend::new();
        let source = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 70, 9, 255]));
        let mut target = backend.allocate(Dimensions { width: 4, height: 3 }).unwrap();
        backend.draw_filtered(&source, &mut target, Filter::None).unwrap();
        assert_eq!(target, source);
    }
}
