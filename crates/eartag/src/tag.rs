//! Detection record for one tag photograph.

use image::{GrayImage, RgbImage};

use crate::error::TagError;
use crate::raster::{to_grayscale, Rect};

/// Exported detection: exactly `digits`, `bounding_rects` and `identifier`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    pub digits: String,
    pub bounding_rects: Vec<Rect>,
    pub identifier: String,
}

/// A tag photograph and, once recognized, its detection.
///
/// The detection is set exactly once; rectangles are kept ascending by x.
#[derive(Debug, Clone)]
pub struct Tag {
    identifier: String,
    image: RgbImage,
    gray: GrayImage,
    detection: Option<(String, Vec<Rect>)>,
}

impl Tag {
    pub fn new(identifier: impl Into<String>, image: RgbImage) -> Self {
        let gray = to_grayscale(&image);
        Self {
            identifier: identifier.into(),
            image,
            gray,
            detection: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn digits(&self) -> Option<&str> {
        self.detection.as_ref().map(|(d, _)| d.as_str())
    }

    pub fn bounding_rects(&self) -> Option<&[Rect]> {
        self.detection.as_ref().map(|(_, r)| r.as_slice())
    }

    pub fn is_detected(&self) -> bool {
        self.detection.is_some()
    }

    /// Record the detection; rectangles are sorted ascending by x.
    pub fn set_detection(&mut self, digits: String, mut rects: Vec<Rect>) -> Result<(), TagError> {
        if self.detection.is_some() {
            return Err(TagError::AlreadyDetected(self.identifier.clone()));
        }
        rects.sort_by_key(|r| r.x);
        self.detection = Some((digits, rects));
        Ok(())
    }

    pub fn detection(&self) -> Option<Detection> {
        self.detection.as_ref().map(|(digits, rects)| Detection {
            digits: digits.clone(),
            bounding_rects: rects.clone(),
            identifier: self.identifier.clone(),
        })
    }

    /// Consume the tag, keeping only its exported record.
    pub fn into_detection(self) -> Result<Detection, TagError> {
        match self.detection {
            Some((digits, bounding_rects)) => Ok(Detection {
                digits,
                bounding_rects,
                identifier: self.identifier,
            }),
            None => Err(TagError::MissingDetection(self.identifier)),
        }
    }

    pub fn export_json(&self) -> Result<String, TagError> {
        let detection = self
            .detection()
            .ok_or_else(|| TagError::MissingDetection(self.identifier.clone()))?;
        Ok(serde_json::to_string(&detection)?)
    }
}
