use image::GrayImage;

use crate::morphology::SquareElement;
use crate::raster::TagMask;

/// Thresholds a grayscale photo into a cleaned tag-region mask.
#[derive(Debug, Clone)]
pub struct TagMaskExtractor {
    threshold: u8,
    element: SquareElement,
}

impl TagMaskExtractor {
    /// `element_size` must be odd; [`crate::LocatorConfig::validate`] checks it.
    pub(crate) fn new(threshold: u8, element_size: u32) -> Self {
        Self {
            threshold,
            element: SquareElement::new(element_size),
        }
    }

    /// Pixels at or above the threshold, closed then opened.
    ///
    /// An all-false mask is a valid result.
    pub fn extract(&self, gray: &GrayImage) -> TagMask {
        let mut binary = GrayImage::new(gray.width(), gray.height());
        for (src, dst) in gray.pixels().zip(binary.pixels_mut()) {
            dst.0 = [if src[0] >= self.threshold { 255 } else { 0 }];
        }
        let cleaned = self.element.open(&self.element.close(&binary));
        let mask = TagMask::from_foreground(&cleaned);
        tracing::trace!(
            threshold = self.threshold,
            tag_pixels = mask.count(),
            "tag mask extracted"
        );
        mask
    }
}
