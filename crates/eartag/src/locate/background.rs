use image::GrayImage;
use imageproc::contrast::otsu_level;

use crate::clahe;
use crate::config::ClaheConfig;
use crate::morphology::SquareElement;
use crate::raster::TagMask;

/// Produces a digits-only binary image: 0 = candidate ink, 255 = background.
#[derive(Debug, Clone)]
pub struct BackgroundRemover {
    fallback_threshold: u8,
    clahe: ClaheConfig,
    element: SquareElement,
}

impl BackgroundRemover {
    pub(crate) fn new(fallback_threshold: u8, clahe: ClaheConfig, element_size: u32) -> Self {
        Self {
            fallback_threshold,
            clahe,
            element: SquareElement::new(element_size),
        }
    }

    /// Binarization level for the enhanced image.
    ///
    /// Otsu's level wins; a single-intensity histogram has no between-class
    /// variance, so the fixed threshold stands in.
    fn level(&self, enhanced: &GrayImage) -> u8 {
        let mut pixels = enhanced.pixels();
        let single_intensity = match pixels.next() {
            Some(first) => pixels.all(|p| p[0] == first[0]),
            None => true,
        };
        if single_intensity {
            self.fallback_threshold
        } else {
            otsu_level(enhanced)
        }
    }

    pub fn remove(&self, gray: &GrayImage, mask: &TagMask) -> GrayImage {
        debug_assert_eq!(gray.dimensions(), mask.dimensions());
        let enhanced = clahe::equalize(gray, &self.clahe);
        let level = self.level(&enhanced);

        let mut binary = GrayImage::new(gray.width(), gray.height());
        for (x, y, px) in binary.enumerate_pixels_mut() {
            let on_tag = mask.contains(x, y);
            let bright = enhanced.get_pixel(x, y)[0] > level;
            px.0 = [if bright || !on_tag { 255 } else { 0 }];
        }
        tracing::debug!(otsu_level = level, "background removed");
        self.element.close(&binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::TagMaskExtractor;
    use crate::test_utils::{fill_rect, synthetic_tag_gray, SYNTHETIC_DIGITS, SYNTHETIC_SPECK};

    #[test]
    fn synthetic_tag_keeps_only_digit_ink() {
        let gray = synthetic_tag_gray();
        let mask = TagMaskExtractor::new(30, 5).extract(&gray);
        let out = BackgroundRemover::new(30, ClaheConfig::default(), 5).remove(&gray, &mask);

        for r in SYNTHETIC_DIGITS {
            let cx = r.x + r.width / 2;
            let cy = r.y + r.height / 2;
            assert_eq!(out.get_pixel(cx, cy)[0], 0, "digit centre at ({cx},{cy}) is ink");
        }
        assert_eq!(out.get_pixel(2, 2)[0], 255, "off-tag background suppressed");
        assert_eq!(out.get_pixel(35, 40)[0], 255, "plain tag surface is background");
        let ink = out.pixels().filter(|p| p[0] == 0).count();
        let expected: u64 = SYNTHETIC_DIGITS.iter().map(|r| r.area()).sum::<u64>()
            + SYNTHETIC_SPECK.area();
        assert_eq!(ink as u64, expected);
    }

    #[test]
    fn empty_mask_whitens_everything() {
        let mut gray = GrayImage::from_pixel(60, 40, image::Luma([20]));
        fill_rect(&mut gray, crate::raster::Rect::new(10, 10, 10, 10), 220);
        let mask = TagMask::from_foreground(&GrayImage::new(60, 40));
        let out = BackgroundRemover::new(30, ClaheConfig::default(), 5).remove(&gray, &mask);
        assert!(out.pixels().all(|p| p[0] == 255));
    }
}
