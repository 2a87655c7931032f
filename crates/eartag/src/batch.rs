//! File and folder driver around a single [`TagRecognizer`].

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::RecognizerConfig;
use crate::error::{ConfigError, TagError};
use crate::recognize::OcrEngine;
use crate::recognizer::{TagKind, TagRecognizer};
use crate::tag::Detection;

/// What a batch run should recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    Folder(PathBuf),
    Images(Vec<PathBuf>),
}

impl BatchRequest {
    /// Exactly one of `folder` or a non-empty `images` list must be given.
    pub fn from_parts(folder: Option<PathBuf>, images: Option<Vec<PathBuf>>) -> Result<Self, TagError> {
        match (folder, images) {
            (Some(folder), None) => Ok(Self::Folder(folder)),
            (None, Some(images)) if images.is_empty() => Err(TagError::InputTypeInvalid(
                "image list is empty".to_string(),
            )),
            (None, Some(images)) => Ok(Self::Images(images)),
            (Some(_), Some(_)) => Err(TagError::InputTypeInvalid(
                "give either a folder or a list of images, not both".to_string(),
            )),
            (None, None) => Err(TagError::InputTypeInvalid(
                "no folder or images given".to_string(),
            )),
        }
    }
}

fn check_file(path: &Path) -> Result<(), TagError> {
    if !path.exists() {
        return Err(TagError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(TagError::InputNotRegularFile(path.to_path_buf()));
    }
    Ok(())
}

/// Regular files with an extension directly inside `dir`, by file name.
fn folder_images(dir: &Path) -> Result<Vec<PathBuf>, TagError> {
    if !dir.exists() {
        return Err(TagError::InputNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(TagError::InputNotDirectory(dir.to_path_buf()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| TagError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some() {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Recognizes tags from image files.
pub struct TagBatchRecognizer {
    recognizer: Box<dyn TagRecognizer>,
}

impl TagBatchRecognizer {
    pub fn new(recognizer: Box<dyn TagRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn for_kind(
        kind: TagKind,
        config: &RecognizerConfig,
        engine: Box<dyn OcrEngine>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(kind.build(config, engine)?))
    }

    /// Decode and recognize one file; the identifier is the path as given.
    pub fn recognize_image(&self, path: &Path) -> Result<Detection, TagError> {
        check_file(path)?;
        let image = image::open(path)
            .map_err(|source| TagError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let identifier = path.display().to_string();
        tracing::info!(image = %identifier, width = image.width(), height = image.height(), "recognizing");
        self.recognizer.recognize(&identifier, image)?.into_detection()
    }

    /// Every path is validated, in order, before any image is decoded.
    pub fn recognize_images(&self, paths: &[PathBuf]) -> Result<Vec<Detection>, TagError> {
        for path in paths {
            check_file(path)?;
        }
        paths.iter().map(|p| self.recognize_image(p)).collect()
    }

    pub fn recognize_folder(&self, dir: &Path) -> Result<Vec<Detection>, TagError> {
        let paths = folder_images(dir)?;
        tracing::info!(folder = %dir.display(), images = paths.len(), "recognizing folder");
        self.recognize_images(&paths)
    }

    pub fn run(&self, request: &BatchRequest) -> Result<Vec<Detection>, TagError> {
        match request {
            BatchRequest::Folder(dir) => self.recognize_folder(dir),
            BatchRequest::Images(paths) => self.recognize_images(paths),
        }
    }

    /// Run `request` and render the detections as a JSON array.
    pub fn process(&self, request: &BatchRequest) -> Result<String, TagError> {
        Ok(serde_json::to_string(&self.run(request)?)?)
    }
}
