//! Side-by-side composite builder for single-image providers.
//!
//! Some providers accept only one input image, so the selfie and the
//! reference image(s) are pasted into one horizontal multi-panel JPEG.
//! Panel heights are normalized to the tallest input, capped at 1024px,
//! and widths scale proportionally.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::ProviderError;

/// JPEG quality for the composed panel image.
const COMPOSITE_JPEG_QUALITY: u8 = 93;

/// Height cap for the composed panels.
const MAX_PANEL_HEIGHT: u32 = 1024;

/// Background fill behind the panels.
const CANVAS_FILL: [u8; 3] = [245, 245, 245];

/// Compose `selfie` followed by each reference into one JPEG, left to
/// right in argument order.
pub fn build_composite(selfie_path: &str, reference_paths: &[&str]) -> Result<Vec<u8>, ProviderError> {
    let mut panels: Vec<RgbImage> = Vec::with_capacity(1 + reference_paths.len());
    for path in std::iter::once(selfie_path).chain(reference_paths.iter().copied()) {
        let img = image::open(path)
            .map_err(|e| ProviderError::Io(format!("{path}: {e}")))?
            .to_rgb8();
        panels.push(img);
    }

    let target_height = panels
        .iter()
        .map(|img| img.height())
        .max()
        .unwrap_or(1)
        .min(MAX_PANEL_HEIGHT);

    let resized: Vec<RgbImage> = panels
        .into_iter()
        .map(|img| {
            let width =
                ((img.width() as u64 * target_height as u64) / img.height().max(1) as u64).max(1);
            image::imageops::resize(&img, width as u32, target_height, FilterType::Lanczos3)
        })
        .collect();

    let total_width: u32 = resized.iter().map(|img| img.width()).sum();
    let mut composed = RgbImage::from_pixel(total_width, target_height, image::Rgb(CANVAS_FILL));
    let mut x_offset: i64 = 0;
    for panel in &resized {
        image::imageops::replace(&mut composed, panel, x_offset, 0);
        x_offset += i64::from(panel.width());
    }

    let mut buffer = std::io::Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, COMPOSITE_JPEG_QUALITY);
    DynamicImage::ImageRgb8(composed)
        .write_with_encoder(encoder)
        .map_err(|e| ProviderError::Io(format!("composite encode failed: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &std::path::Path, width: u32, height: u32, fill: [u8; 3]) {
        let img = RgbImage::from_pixel(width, height, image::Rgb(fill));
        img.save(path).unwrap();
    }

    #[test]
    fn panels_are_height_normalized_and_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let selfie = dir.path().join("selfie.png");
        let reference = dir.path().join("reference.png");
        // 100x200 selfie next to a 50x100 reference: the reference is
        // scaled up to height 200, width 100.
        write_png(&selfie, 100, 200, [10, 20, 30]);
        write_png(&reference, 50, 100, [200, 100, 50]);

        let bytes = build_composite(
            selfie.to_str().unwrap(),
            &[reference.to_str().unwrap()],
        )
        .unwrap();

        let composed = image::load_from_memory(&bytes).unwrap();
        assert_eq!(composed.height(), 200);
        assert_eq!(composed.width(), 200);
    }

    #[test]
    fn tall_inputs_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let selfie = dir.path().join("selfie.png");
        let reference = dir.path().join("reference.png");
        write_png(&selfie, 100, 4096, [0, 0, 0]);
        write_png(&reference, 100, 4096, [255, 255, 255]);

        let bytes = build_composite(
            selfie.to_str().unwrap(),
            &[reference.to_str().unwrap()],
        )
        .unwrap();
        let composed = image::load_from_memory(&bytes).unwrap();
        assert_eq!(composed.height(), 1024);
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let result = build_composite("/nonexistent/selfie.png", &[]);
        assert!(matches!(result, Err(ProviderError::Io(_))));
    }
}
