//! Tesseract-backed [`OcrEngine`] via `rusty-tesseract`.
//!
//! Requires the `tesseract` executable on `PATH` at runtime.

use std::collections::HashMap;

use image::{GrayImage, ImageFormat};
use rusty_tesseract::{Args, Image};

use super::engine::OcrEngine;
use crate::config::OcrSettings;
use crate::error::RecognitionError;

/// Runs the `tesseract` CLI on a temporary PNG of the bitmap.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    dpi: Option<i32>,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolution hint passed as `--dpi`.
    pub fn with_dpi(mut self, dpi: i32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    fn args(&self, settings: &OcrSettings) -> Args {
        Args {
            lang: settings.language.clone(),
            config_variables: HashMap::from([(
                "tessedit_char_whitelist".to_string(),
                settings.whitelist.clone(),
            )]),
            dpi: self.dpi,
            psm: Some(settings.segmentation.psm()),
            oem: settings.engine_mode,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn read(&self, image: &GrayImage, settings: &OcrSettings) -> Result<String, RecognitionError> {
        let file = tempfile::Builder::new()
            .prefix("eartag-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| RecognitionError::new(format!("temporary bitmap: {e}")))?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| RecognitionError::new(format!("writing bitmap: {e}")))?;
        let path = file
            .path()
            .to_str()
            .ok_or_else(|| RecognitionError::new("temporary path is not valid UTF-8"))?;

        let tess_image = Image::from_path(path)
            .map_err(|e| RecognitionError::new(format!("tesseract input: {e}")))?;
        let text = rusty_tesseract::image_to_string(&tess_image, &self.args(settings))
            .map_err(|e| RecognitionError::new(format!("tesseract: {e}")))?;
        tracing::trace!(raw = %text.trim_end(), "tesseract output");
        Ok(text)
    }
}
