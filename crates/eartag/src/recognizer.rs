//! Tag recognizers and the tag-kind registry.

use std::fmt;
use std::str::FromStr;

use image::RgbImage;

use crate::config::RecognizerConfig;
use crate::error::{ConfigError, TagError};
use crate::locate::{LargestTextLocator, TextLocator};
use crate::recognize::{ClassicOcr, OcrEngine, TextRecognizer};
use crate::tag::Tag;

/// Recognizes the digits of one tag photograph.
pub trait TagRecognizer: Send + Sync {
    /// Fill in the detection of `tag`.
    fn recognize_tag(&self, tag: &mut Tag) -> Result<(), TagError>;

    /// Build a [`Tag`] for `image` and recognize it.
    fn recognize(&self, identifier: &str, image: RgbImage) -> Result<Tag, TagError> {
        let mut tag = Tag::new(identifier, image);
        self.recognize_tag(&mut tag)?;
        Ok(tag)
    }
}

/// Cow ear tags: largest-object localization on the gray photo, then
/// classic OCR on the binarized digits-only image.
///
/// Reported rectangles are the localization boxes, not the per-character
/// boxes found while re-spacing.
pub struct CowTagRecognizer {
    locator: Box<dyn TextLocator>,
    reader: Box<dyn TextRecognizer>,
}

impl CowTagRecognizer {
    pub fn new(config: &RecognizerConfig, engine: Box<dyn OcrEngine>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(
            Box::new(LargestTextLocator::new(&config.locator)?),
            Box::new(ClassicOcr::new(config, engine)?),
        ))
    }

    pub fn from_parts(locator: Box<dyn TextLocator>, reader: Box<dyn TextRecognizer>) -> Self {
        Self { locator, reader }
    }
}

impl TagRecognizer for CowTagRecognizer {
    fn recognize_tag(&self, tag: &mut Tag) -> Result<(), TagError> {
        let localization = self.locator.locate(tag.gray())?;
        tracing::debug!(
            identifier = tag.identifier(),
            candidates = localization.rects.len(),
            "digits localized"
        );
        let digits = self
            .reader
            .recognize_text(&localization.processed, &localization.rects)?;
        tracing::info!(identifier = tag.identifier(), digits = %digits, "tag recognized");
        tag.set_detection(digits, localization.rects)
    }
}

/// Registered tag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Cow,
}

impl TagKind {
    pub const ALL: [TagKind; 1] = [TagKind::Cow];

    /// Numeric registry id.
    pub fn id(self) -> u32 {
        match self {
            Self::Cow => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cow => "cow",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Cow => "Cow recognizer",
        }
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(|k| format!("{} ({})", k.name(), k.id()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn from_id(id: u32) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| ConfigError::UnknownTagKind {
                requested: id.to_string(),
                available: Self::available(),
            })
    }

    pub fn build(
        self,
        config: &RecognizerConfig,
        engine: Box<dyn OcrEngine>,
    ) -> Result<Box<dyn TagRecognizer>, ConfigError> {
        match self {
            Self::Cow => Ok(Box::new(CowTagRecognizer::new(config, engine)?)),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagKind {
    type Err = ConfigError;

    /// Accepts a kind name (case-insensitive) or its numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u32>() {
            return Self::from_id(id);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownTagKind {
                requested: s.to_string(),
                available: Self::available(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionFailure, RecognitionError};
    use crate::test_utils::{fixed_engine, synthetic_tag_rgb, SYNTHETIC_DIGITS};
    use image::GrayImage;

    #[test]
    fn kinds_parse_by_name_and_id() {
        assert_eq!("cow".parse::<TagKind>().unwrap(), TagKind::Cow);
        assert_eq!("COW".parse::<TagKind>().unwrap(), TagKind::Cow);
        assert_eq!("1".parse::<TagKind>().unwrap(), TagKind::Cow);
        assert_eq!(TagKind::from_id(1).unwrap().to_string(), "cow");
        assert!(matches!(
            "2".parse::<TagKind>(),
            Err(ConfigError::UnknownTagKind { .. })
        ));
        assert!(matches!(
            "sheep".parse::<TagKind>(),
            Err(ConfigError::UnknownTagKind { .. })
        ));
    }

    #[test]
    fn synthetic_tag_end_to_end_with_stub_engine() {
        let recognizer = TagKind::Cow
            .build(&RecognizerConfig::default(), fixed_engine("12 34\n"))
            .unwrap();
        let tag = recognizer.recognize("synthetic", synthetic_tag_rgb()).unwrap();
        let det = tag.detection().unwrap();
        assert_eq!(det.digits, "1234");
        assert_eq!(det.identifier, "synthetic");
        assert_eq!(det.bounding_rects, SYNTHETIC_DIGITS.to_vec());
        assert!(det.bounding_rects.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn blank_photo_fails_without_detection() {
        let recognizer =
            CowTagRecognizer::new(&RecognizerConfig::default(), fixed_engine("0")).unwrap();
        let mut tag = Tag::new("blank", RgbImage::new(64, 48));
        let err = recognizer.recognize_tag(&mut tag).unwrap_err();
        assert_eq!(err.detection_failure(), Some(DetectionFailure::NoInk));
        assert!(!tag.is_detected());
    }

    #[test]
    fn second_recognition_of_same_tag_is_rejected() {
        let engine: Box<dyn OcrEngine> =
            Box::new(|_: &GrayImage, _: &crate::OcrSettings| -> Result<String, RecognitionError> {
                Ok("7".into())
            });
        let recognizer = CowTagRecognizer::new(&RecognizerConfig::default(), engine).unwrap();
        let mut tag = Tag::new("twice", synthetic_tag_rgb());
        recognizer.recognize_tag(&mut tag).unwrap();
        assert!(matches!(
            recognizer.recognize_tag(&mut tag),
            Err(TagError::AlreadyDetected(_))
        ));
    }
}
