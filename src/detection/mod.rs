pub mod postprocess;
pub mod preprocessing;
pub mod scripted;
pub mod yolo;

use anyhow::Result;
use image::DynamicImage;
use std::path::Path;

use crate::models::Detection;

pub use scripted::ScriptedDetector;
pub use yolo::YoloDetector;

/// Object detector used by the batch driver.
///
/// Any model that maps an image to an ordered list of boxes can be plugged in.
/// The returned order is kept as-is by every exported artifact.
pub trait Detector {
    /// Run detection on one decoded image.
    ///
    /// Only detections with `confidence >= conf_threshold` are returned.
    fn detect(
        &mut self,
        image: &DynamicImage,
        conf_threshold: f32,
        device: &str,
    ) -> Result<Vec<Detection>>;

    /// Optional class id to name lookup
    fn class_names(&self) -> Option<&ClassNames> {
        None
    }
}

/// Class names indexed by class id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse one name per line, skipping blank lines
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read class names {}: {}", path.display(), e))?;
        Ok(Self::parse(&content))
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Display name for a class, falling back to the numeric id
pub fn class_label(names: Option<&ClassNames>, class_id: u32) -> String {
    names
        .and_then(|n| n.get(class_id))
        .map(str::to_string)
        .unwrap_or_else(|| class_id.to_string())
}
