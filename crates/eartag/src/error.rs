//! Error types shared by every pipeline stage and the outer batch layer.

use std::path::PathBuf;

/// A pipeline stage could not produce a usable intermediate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DetectionFailure {
    /// The binarized image holds no ink contours at all.
    #[error("no ink regions found in the binarized tag image")]
    NoInk,
    /// Alignment was asked to work from an empty rectangle set.
    #[error("perspective alignment received no digit rectangles")]
    EmptyRectangleSet,
    /// The digit quadrilateral admits no invertible projective transform.
    #[error("digit quadrilateral is degenerate, no invertible projection exists")]
    DegenerateQuad,
    /// The rectified image holds no character contours.
    #[error("no character contours found in the rectified image")]
    NoCharacters,
}

/// Invalid tunables or an unknown tag kind, raised at construction time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("unknown tag kind `{requested}` (available: {available})")]
    UnknownTagKind { requested: String, available: String },
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// The character-recognition collaborator failed to produce a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("character recognition failed: {message}")]
pub struct RecognitionError {
    message: String,
}

impl RecognitionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Top-level error for recognizing tags from images, files and folders.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("input path is not a regular file: {}", .0.display())]
    InputNotRegularFile(PathBuf),
    #[error("input path is not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),
    #[error("invalid input: {0}")]
    InputTypeInvalid(String),
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to list folder {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Detection(#[from] DetectionFailure),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("tag `{0}` already carries a detection")]
    AlreadyDetected(String),
    #[error("tag `{0}` has no detection yet")]
    MissingDetection(String),
    #[error("failed to serialize detection: {0}")]
    Json(#[from] serde_json::Error),
}

impl TagError {
    /// The stage-level failure behind this error, if any.
    pub fn detection_failure(&self) -> Option<DetectionFailure> {
        match self {
            Self::Detection(f) => Some(*f),
            _ => None,
        }
    }
}
