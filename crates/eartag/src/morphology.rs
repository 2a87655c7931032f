//! Square-element morphology on 8-bit rasters.
//!
//! On 0/255 images grayscale closing/opening coincide with their binary
//! counterparts, so one implementation serves masks and gray images alike.

use image::GrayImage;
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

/// Largest square side expressible by an `imageproc` mask.
pub(crate) const MAX_ELEMENT_SIZE: u32 = 2 * u8::MAX as u32 + 1;

/// Square all-ones structuring element with an odd side length.
#[derive(Debug, Clone)]
pub(crate) struct SquareElement {
    mask: Mask,
}

impl SquareElement {
    /// `size` must be odd and at most [`MAX_ELEMENT_SIZE`]; config validation
    /// guarantees both before any element is built.
    pub(crate) fn new(size: u32) -> Self {
        debug_assert!(size % 2 == 1 && size <= MAX_ELEMENT_SIZE);
        let radius = (size / 2).min(u32::from(u8::MAX)) as u8;
        Self {
            mask: Mask::square(radius),
        }
    }

    /// Dilate then erode: fills dark gaps narrower than the element.
    pub(crate) fn close(&self, image: &GrayImage) -> GrayImage {
        grayscale_close(image, &self.mask)
    }

    /// Erode then dilate: removes bright specks narrower than the element.
    pub(crate) fn open(&self, image: &GrayImage) -> GrayImage {
        grayscale_open(image, &self.mask)
    }
}
