//! Character reading: rectification, re-spacing and the OCR collaborator.

mod align;
mod engine;
mod separate;
#[cfg(feature = "tesseract")]
mod tesseract;

pub use align::PerspectiveAligner;
pub use engine::OcrEngine;
pub use separate::{CharacterSeparator, SeparatedCharacters};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

use image::GrayImage;

use crate::config::{OcrSettings, RecognizerConfig};
use crate::error::{ConfigError, TagError};
use crate::raster::Rect;

/// Reads the digit string from a localized image region.
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &GrayImage, rects: &[Rect]) -> Result<String, TagError>;
}

/// Align → separate → OCR, with whitespace stripped from the result.
pub struct ClassicOcr {
    aligner: PerspectiveAligner,
    separator: CharacterSeparator,
    settings: OcrSettings,
    engine: Box<dyn OcrEngine>,
}

impl std::fmt::Debug for ClassicOcr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassicOcr")
            .field("aligner", &self.aligner)
            .field("separator", &self.separator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ClassicOcr {
    pub fn new(config: &RecognizerConfig, engine: Box<dyn OcrEngine>) -> Result<Self, ConfigError> {
        Ok(Self {
            aligner: PerspectiveAligner::new(&config.align)?,
            separator: CharacterSeparator::new(&config.separation)?,
            settings: config.ocr.clone(),
            engine,
        })
    }

    pub fn aligner(&self) -> &PerspectiveAligner {
        &self.aligner
    }

    pub fn separator(&self) -> &CharacterSeparator {
        &self.separator
    }

    /// The bitmap handed to the engine for `rects` on `image`.
    pub fn prepare(&self, image: &GrayImage, rects: &[Rect]) -> Result<SeparatedCharacters, TagError> {
        let rectified = self.aligner.align(image, rects)?;
        Ok(self.separator.separate(&rectified)?)
    }
}

impl TextRecognizer for ClassicOcr {
    fn recognize_text(&self, image: &GrayImage, rects: &[Rect]) -> Result<String, TagError> {
        let separated = self.prepare(image, rects)?;
        let raw = self.engine.read(&separated.image, &self.settings)?;
        Ok(engine::strip_whitespace(&raw))
    }
}
