use image::GrayImage;

use crate::config::OcrSettings;
use crate::error::RecognitionError;

/// Reads characters from a single-line bitmap (dark ink on white).
///
/// Any `Fn(&GrayImage, &OcrSettings) -> Result<String, RecognitionError>`
/// closure is an engine, which keeps tests free of external binaries.
pub trait OcrEngine: Send + Sync {
    fn read(&self, image: &GrayImage, settings: &OcrSettings) -> Result<String, RecognitionError>;
}

impl<F> OcrEngine for F
where
    F: Fn(&GrayImage, &OcrSettings) -> Result<String, RecognitionError> + Send + Sync,
{
    fn read(&self, image: &GrayImage, settings: &OcrSettings) -> Result<String, RecognitionError> {
        self(image, settings)
    }
}

/// Drop every whitespace character from engine output.
pub(crate) fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_engines() {
        let engine = |img: &GrayImage, s: &OcrSettings| -> Result<String, RecognitionError> {
            Ok(format!("{}x{} {}", img.width(), img.height(), s.whitelist.len()))
        };
        let out = engine.read(&GrayImage::new(3, 2), &OcrSettings::default()).unwrap();
        assert_eq!(out, "3x2 10");
    }

    #[test]
    fn whitespace_of_every_kind_is_removed() {
        assert_eq!(strip_whitespace(" 02 88\n\x0c"), "0288");
        assert_eq!(strip_whitespace("0 2\t8 8\r\n"), "0288");
    }
}
