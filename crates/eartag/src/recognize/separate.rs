use image::{imageops, GrayImage, Luma};

use crate::config::SeparationConfig;
use crate::contour::{draw_outline, external_ink_contours};
use crate::error::{ConfigError, DetectionFailure};
use crate::morphology::SquareElement;
use crate::raster::Rect;

/// Result of [`CharacterSeparator::separate`].
#[derive(Debug, Clone)]
pub struct SeparatedCharacters {
    /// Evenly spaced single-line bitmap, dark ink on white.
    pub image: GrayImage,
    /// Per-character boxes in padded rectified coordinates, ascending by x.
    pub rects: Vec<Rect>,
}

/// Cleans the rectified band and re-lays its characters on a white canvas
/// with uniform spacing.
#[derive(Debug, Clone)]
pub struct CharacterSeparator {
    padding: u32,
    close: SquareElement,
    open: SquareElement,
    seal_thickness: u32,
}

impl CharacterSeparator {
    pub fn new(config: &SeparationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            padding: config.padding,
            close: SquareElement::new(config.close_size),
            open: SquareElement::new(config.open_size),
            seal_thickness: config.seal_thickness,
        })
    }

    /// White border of `padding` pixels on every side.
    fn pad(&self, image: &GrayImage) -> GrayImage {
        let p = self.padding;
        let mut out = GrayImage::from_pixel(image.width() + 2 * p, image.height() + 2 * p, Luma([255]));
        imageops::replace(&mut out, image, i64::from(p), i64::from(p));
        out
    }

    pub fn separate(&self, rectified: &GrayImage) -> Result<SeparatedCharacters, DetectionFailure> {
        let cleaned = self.open.open(&self.close.close(rectified));
        let mut sealed = self.pad(&cleaned);

        let contours = external_ink_contours(&sealed);
        if contours.is_empty() {
            return Err(DetectionFailure::NoCharacters);
        }
        for c in &contours {
            draw_outline(&mut sealed, &c.contour, self.seal_thickness);
        }

        let mut rects: Vec<Rect> = contours.iter().map(|c| c.rect).collect();
        rects.sort_by_key(|r| r.x);

        let p = self.padding;
        let max_h = rects.iter().map(|r| r.height).max().unwrap_or(0);
        let total_w: u32 = rects.iter().map(|r| r.width).sum();
        let n = rects.len() as u32;
        let mut canvas = GrayImage::from_pixel(total_w + (n + 1) * p, max_h + 2 * p, Luma([255]));

        let mut x_offset = p;
        for r in &rects {
            let glyph = imageops::crop_imm(&sealed, r.x, r.y, r.width, r.height).to_image();
            imageops::replace(&mut canvas, &glyph, i64::from(x_offset), i64::from(p));
            x_offset += r.width + p;
        }

        tracing::debug!(
            characters = rects.len(),
            width = canvas.width(),
            height = canvas.height(),
            "characters re-spaced"
        );
        Ok(SeparatedCharacters {
            image: canvas,
            rects,
        })
    }
}
