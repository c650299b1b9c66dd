//! CPU rasterisation of the iris for still exports and the fallback disc.
//!
//! Images are square, cover the lens quad edge to edge, and carry straight
//! (non-premultiplied) alpha as PNG expects.

use std::path::Path;

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};
use iris::{iris_color, FallbackDisc, Palette};

use crate::RendererError;

/// Evaluates the iris colour field at `time` seconds for every pixel.
pub fn render_iris_image(size: u32, time: f32, palette: &Palette) -> RgbaImage {
    rasterize(size, |uv| iris_color(uv, time, palette))
}

/// Renders the static radial disc shown when no GPU surface is available.
pub fn render_fallback_image(size: u32, palette: &Palette) -> RgbaImage {
    let disc = FallbackDisc::new(*palette);
    rasterize(size, |uv| disc.sample(uv))
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), RendererError> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| RendererError::Export {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "wrote image"
    );
    Ok(())
}

fn rasterize(size: u32, shade: impl Fn(Vec2) -> Vec4) -> RgbaImage {
    let extent = size as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        // Sample pixel centres; uv origin is the top-left corner.
        let uv = Vec2::new((x as f32 + 0.5) / extent, (y as f32 + 0.5) / extent);
        to_rgba8(shade(uv))
    })
}

fn to_rgba8(color: Vec4) -> Rgba<u8> {
    let quantize = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        quantize(color.w),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iris_image_is_clear_in_corners_and_opaque_inside() {
        let image = render_iris_image(64, 0.0, &Palette::default());
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(63, 63)[3], 0);
        assert_eq!(image.get_pixel(16, 32)[3], 255);
    }

    #[test]
    fn export_time_changes_pixels() {
        let palette = Palette::default();
        let early = render_iris_image(32, 0.0, &palette);
        let late = render_iris_image(32, 2.0, &palette);
        assert_ne!(early.as_raw(), late.as_raw());
    }

    #[test]
    fn fallback_centre_matches_secondary_colour() {
        let palette = Palette::default();
        let image = render_fallback_image(65, &palette);
        let centre = image.get_pixel(32, 32);
        let expected = to_rgba8(palette.secondary.extend(1.0));
        for channel in 0..4 {
            assert!(centre[channel].abs_diff(expected[channel]) <= 1);
        }
    }

    #[test]
    fn png_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disc.png");
        let image = render_fallback_image(16, &Palette::default());
        write_png(&image, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn unwritable_path_reports_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("disc.png");
        let err = write_png(&render_fallback_image(4, &Palette::default()), &path).unwrap_err();
        assert!(matches!(err, RendererError::Export { .. }));
    }
}
