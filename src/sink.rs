//! Where finished images go.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::RenderError;

/// Persists a finished image under a name.
pub trait ImageSink {
    /// Store `image` as `name`.
    fn save(&mut self, image: &RgbImage, name: &str) -> Result<(), RenderError>;
}

/// Writes images into a directory.  The encoding follows the extension
/// of the name, so `frame0.png` becomes a PNG.
#[derive(Clone, Debug)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    /// A sink writing into `directory`, which must already exist.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        FileSink {
            directory: directory.into(),
        }
    }

    /// Where an image called `name` ends up.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// The directory images are written into.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ImageSink for FileSink {
    fn save(&mut self, image: &RgbImage, name: &str) -> Result<(), RenderError> {
        let path = self.path_for(name);
        image.save(&path).map_err(|e| RenderError::Save {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), "image saved");
        Ok(())
    }
}

/// Keeps images in memory, in the order they were saved.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Every image saved so far, with its name.
    pub images: Vec<(String, RgbImage)>,
}

impl ImageSink for MemorySink {
    fn save(&mut self, image: &RgbImage, name: &str) -> Result<(), RenderError> {
        self.images.push((name.to_string(), image.clone()));
        Ok(())
    }
}
