use std::path::{Path, PathBuf};

/// Name of the default output directory, created next to the images directory
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "inference_results";

/// Name of the detection ledger inside the output directory
pub const LEDGER_FILE_NAME: &str = "detections.csv";

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_INPUT_SIZE: u32 = 640;
/// Largest accepted model input side
pub const MAX_INPUT_SIZE: u32 = 4096;
pub const DEFAULT_DEVICE: &str = "cpu";

/// Optional artifacts. The ledger is always written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFlags {
    pub save_crops: bool,
    pub save_labels: bool,
    pub save_annotated: bool,
}

impl ExportFlags {
    /// Every optional artifact enabled
    pub fn all() -> Self {
        Self {
            save_crops: true,
            save_labels: true,
            save_annotated: true,
        }
    }
}

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Model weights (`.rten`)
    pub weights: PathBuf,
    /// Directory holding the input images
    pub images_dir: PathBuf,
    /// Output directory, defaults to a sibling of `images_dir`
    pub output_dir: Option<PathBuf>,
    pub flags: ExportFlags,
    pub conf_threshold: f32,
    pub device: String,
    /// Non-maximum suppression IoU threshold
    pub iou_threshold: f32,
    /// Square model input size in pixels
    pub input_size: u32,
    /// Newline-separated class names file
    pub names: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(weights: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            weights: weights.into(),
            images_dir: images_dir.into(),
            output_dir: None,
            flags: ExportFlags::default(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            device: DEFAULT_DEVICE.to_string(),
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            input_size: DEFAULT_INPUT_SIZE,
            names: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_flags(mut self, flags: ExportFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_conf_threshold(mut self, conf_threshold: f32) -> Self {
        self.conf_threshold = conf_threshold;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_names(mut self, names: Option<PathBuf>) -> Self {
        self.names = names;
        self
    }

    /// Output directory actually used for this run
    pub fn resolved_output_dir(&self) -> PathBuf {
        resolve_output_dir(&self.images_dir, self.output_dir.as_deref())
    }
}

/// Explicit directory if given, else `inference_results` next to `images_dir`
pub fn resolve_output_dir(images_dir: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => images_dir
            .parent()
            .unwrap_or(images_dir)
            .join(DEFAULT_OUTPUT_DIR_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("model.rten", "data/images");
        assert_eq!(config.conf_threshold, 0.25);
        assert_eq!(config.device, "cpu");
        assert_eq!(config.flags, ExportFlags::default());
        assert_eq!(config.resolved_output_dir(), PathBuf::from("data/inference_results"));
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let config = RunConfig::new("model.rten", "data/images")
            .with_output_dir(Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.resolved_output_dir(), PathBuf::from("/tmp/out"));
    }
}
