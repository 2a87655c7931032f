//! Classical-vision digit extraction for livestock ear tags.
//!
//! Turns a color photo of an ear tag into a clean, evenly spaced bitmap of
//! its printed digits and hands it to a character-recognition engine. The
//! stages are:
//!
//! 1. **Tag mask** – fixed threshold plus closing/opening isolates the tag.
//! 2. **Background removal** – CLAHE, Otsu rebinarization, mask suppression.
//! 3. **Localization** – ink contours filtered by normalized area and
//!    vertical alignment with the largest object.
//! 4. **Alignment** – crop to the digit band and rectify it with a DLT
//!    homography built from the outermost digit boxes.
//! 5. **Separation** – clean, seal and re-lay characters with even spacing.
//! 6. **Recognition** – any [`OcrEngine`]; whitespace is stripped.
//!
//! # Public API
//! - [`TagKind`] and [`TagRecognizer`] as primary entry points
//! - [`TagBatchRecognizer`] for files and folders
//! - [`RecognizerConfig`] for tuning
//! - the individual stages for callers that drive the pipeline themselves

mod batch;
mod clahe;
mod config;
mod contour;
mod error;
mod homography;
mod locate;
pub mod metrics;
mod morphology;
mod raster;
mod recognize;
mod recognizer;
mod tag;

#[cfg(test)]
pub(crate) mod test_utils;

pub use batch::{BatchRequest, TagBatchRecognizer};
pub use config::{
    AlignConfig, ClaheConfig, LocatorConfig, OcrSettings, RecognizerConfig, SegmentationMode,
    SeparationConfig,
};
pub use error::{ConfigError, DetectionFailure, RecognitionError, TagError};
pub use locate::{
    BackgroundRemover, LargestObjectLocator, LargestTextLocator, Localization, TagMaskExtractor,
    TextLocator,
};
pub use raster::{to_grayscale, Rect, TagMask};
pub use recognize::{
    CharacterSeparator, ClassicOcr, OcrEngine, PerspectiveAligner, SeparatedCharacters,
    TextRecognizer,
};
#[cfg(feature = "tesseract")]
pub use recognize::TesseractEngine;
pub use recognizer::{CowTagRecognizer, TagKind, TagRecognizer};
pub use tag::{Detection, Tag};
