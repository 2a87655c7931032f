//! Tunable parameters of the recognition pipeline.
//!
//! All structures derive `serde` with `#[serde(default)]`, so a JSON override
//! file only needs the fields it changes. [`RecognizerConfig::default`]
//! carries the cow-tag constants.

use std::path::Path;

use crate::error::ConfigError;
use crate::morphology::MAX_ELEMENT_SIZE;

/// Tag masking and digit localization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Gray level at or above which a pixel belongs to the tag.
    pub mask_threshold: u8,
    /// Side of the square structuring element used by mask cleanup and
    /// background removal (odd).
    pub element_size: u32,
    /// Normalized-area acceptance ratio for digit candidates, in (0, 1).
    pub area_ratio: f64,
    /// Local contrast enhancement applied before rebinarization.
    pub clahe: ClaheConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            mask_threshold: 30,
            element_size: 5,
            area_ratio: 0.3,
            clahe: ClaheConfig::default(),
        }
    }
}

/// Clip-limited adaptive histogram equalization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    /// Histogram clip limit relative to a flat histogram.
    pub clip_limit: f32,
    /// Tile grid `[columns, rows]`.
    pub tile_grid: [u32; 2],
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: [19, 19],
        }
    }
}

/// Output geometry of the perspective rectification.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
        }
    }
}

/// Character cleanup and re-spacing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// White margin around and between characters (pixels).
    pub padding: u32,
    /// Closing element side (odd).
    pub close_size: u32,
    /// Opening element side (odd).
    pub open_size: u32,
    /// Outline width used to seal broken strokes.
    pub seal_thickness: u32,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            padding: 50,
            close_size: 5,
            open_size: 9,
            seal_thickness: 3,
        }
    }
}

/// Page-segmentation hint handed to the character engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    SingleLine,
    SingleWord,
}

impl SegmentationMode {
    /// Tesseract `--psm` value.
    pub fn psm(self) -> i32 {
        match self {
            Self::SingleLine => 7,
            Self::SingleWord => 8,
        }
    }
}

/// Character-engine options.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub whitelist: String,
    pub segmentation: SegmentationMode,
    /// Engine mode override (`--oem`); `None` keeps the engine default.
    pub engine_mode: Option<i32>,
    pub language: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            whitelist: "0123456789".to_string(),
            segmentation: SegmentationMode::SingleWord,
            engine_mode: None,
            language: "eng".to_string(),
        }
    }
}

/// Full recognizer configuration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub locator: LocatorConfig,
    pub align: AlignConfig,
    pub separation: SeparationConfig,
    pub ocr: OcrSettings,
}

fn check_element(name: &'static str, size: u32) -> Result<(), ConfigError> {
    if size == 0 || size % 2 == 0 {
        return Err(ConfigError::invalid(name, format!("must be odd, got {size}")));
    }
    if size > MAX_ELEMENT_SIZE {
        return Err(ConfigError::invalid(
            name,
            format!("must be at most {MAX_ELEMENT_SIZE}, got {size}"),
        ));
    }
    Ok(())
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.area_ratio > 0.0 && self.area_ratio < 1.0) {
            return Err(ConfigError::invalid(
                "locator.area_ratio",
                format!("must lie in (0, 1), got {}", self.area_ratio),
            ));
        }
        check_element("locator.element_size", self.element_size)?;
        if !(self.clahe.clip_limit > 0.0) {
            return Err(ConfigError::invalid(
                "locator.clahe.clip_limit",
                format!("must be positive, got {}", self.clahe.clip_limit),
            ));
        }
        if self.clahe.tile_grid.contains(&0) {
            return Err(ConfigError::invalid(
                "locator.clahe.tile_grid",
                "tile counts must be non-zero",
            ));
        }
        Ok(())
    }
}

impl AlignConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid(
                "align",
                format!(
                    "output size must be non-zero, got {}x{}",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }
}

impl SeparationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_element("separation.close_size", self.close_size)?;
        check_element("separation.open_size", self.open_size)?;
        if self.seal_thickness == 0 {
            return Err(ConfigError::invalid(
                "separation.seal_thickness",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

impl RecognizerConfig {
    /// Load overrides from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locator.validate()?;
        self.align.validate()?;
        self.separation.validate()?;
        if self.ocr.whitelist.is_empty() {
            return Err(ConfigError::invalid("ocr.whitelist", "must not be empty"));
        }
        Ok(())
    }
}
