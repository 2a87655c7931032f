//! Digit localization: tag masking, background removal and largest-object
//! candidate selection.

mod background;
mod largest;
mod tag_mask;

pub use background::BackgroundRemover;
pub use largest::LargestObjectLocator;
pub use tag_mask::TagMaskExtractor;

use image::GrayImage;

use crate::config::LocatorConfig;
use crate::error::{ConfigError, DetectionFailure};
use crate::raster::Rect;

/// Output of a [`TextLocator`].
#[derive(Debug, Clone)]
pub struct Localization {
    /// Digit candidate rectangles, in discovery order.
    pub rects: Vec<Rect>,
    /// The binarized digits-only image the rectangles were found on.
    pub processed: GrayImage,
}

/// Finds the digit region of a grayscale tag photo.
pub trait TextLocator: Send + Sync {
    fn locate(&self, gray: &GrayImage) -> Result<Localization, DetectionFailure>;
}

/// Mask → background removal → largest-object selection.
#[derive(Debug, Clone)]
pub struct LargestTextLocator {
    mask: TagMaskExtractor,
    background: BackgroundRemover,
    objects: LargestObjectLocator,
}

impl LargestTextLocator {
    pub fn new(config: &LocatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mask: TagMaskExtractor::new(config.mask_threshold, config.element_size),
            background: BackgroundRemover::new(
                config.mask_threshold,
                config.clahe.clone(),
                config.element_size,
            ),
            objects: LargestObjectLocator::new(config.area_ratio),
        })
    }

    pub fn mask_extractor(&self) -> &TagMaskExtractor {
        &self.mask
    }

    pub fn background_remover(&self) -> &BackgroundRemover {
        &self.background
    }

    pub fn object_locator(&self) -> &LargestObjectLocator {
        &self.objects
    }
}

impl TextLocator for LargestTextLocator {
    fn locate(&self, gray: &GrayImage) -> Result<Localization, DetectionFailure> {
        let mask = self.mask.extract(gray);
        let processed = self.background.remove(gray, &mask);
        let rects = self.objects.locate(&processed)?;
        Ok(Localization { rects, processed })
    }
}
