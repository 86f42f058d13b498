use image::ImageReader;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::{
    DEFAULT_CONF_THRESHOLD, DEFAULT_DEVICE, ExportFlags, RunConfig, resolve_output_dir,
};
use crate::detection::Detector;
use crate::error::{ImageJobError, SetupError};
use crate::export::{DetectionExporter, DetectionLedger, OutputLayout};
use crate::models::{ExportResult, ImageJob, RunSummary};

/// Extensions accepted as input images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// True when the file extension is one of [`IMAGE_EXTENSIONS`]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Eligible images directly inside `images_dir`, sorted by file name
pub fn find_images(images_dir: &Path) -> Result<Vec<PathBuf>, SetupError> {
    let read_err = |source| SetupError::ReadImagesDir {
        path: images_dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(images_dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Name of the directory recorded in the `dossier` ledger column
fn dossier_name(images_dir: &Path) -> String {
    images_dir
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(images_dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs a detector over every image of a directory and exports the results.
///
/// Images are handled one at a time. A failure on one image is logged and the
/// run moves on; only setup problems abort the run.
pub struct BatchDriver {
    images_dir: PathBuf,
    output_dir: Option<PathBuf>,
    flags: ExportFlags,
    conf_threshold: f32,
    device: String,
}

impl BatchDriver {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            output_dir: None,
            flags: ExportFlags::default(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            device: DEFAULT_DEVICE.to_string(),
        }
    }

    /// Driver settings taken from a run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            images_dir: config.images_dir.clone(),
            output_dir: config.output_dir.clone(),
            flags: config.flags,
            conf_threshold: config.conf_threshold,
            device: config.device.clone(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
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

    pub fn output_dir(&self) -> PathBuf {
        resolve_output_dir(&self.images_dir, self.output_dir.as_deref())
    }

    fn validate_images_dir(&self) -> Result<(), SetupError> {
        if !self.images_dir.exists() {
            return Err(SetupError::ImagesDirMissing(self.images_dir.clone()));
        }
        if !self.images_dir.is_dir() {
            return Err(SetupError::NotADirectory(self.images_dir.clone()));
        }
        Ok(())
    }

    /// Process every eligible image with `detector`
    pub fn run(&self, detector: &mut dyn Detector) -> Result<RunSummary, SetupError> {
        self.validate_images_dir()?;

        let layout = OutputLayout::new(&self.output_dir(), self.flags);
        layout.create()?;

        let images = find_images(&self.images_dir)?;
        let mut summary = RunSummary::new(images.len(), &layout.root, &layout.ledger_path);

        if images.is_empty() {
            log::info!("No images found in {}", self.images_dir.display());
            return Ok(summary);
        }
        log::info!("Found {} images to process", images.len());

        let mut ledger =
            DetectionLedger::create(&layout.ledger_path).map_err(|source| SetupError::CreateLedger {
                path: layout.ledger_path.clone(),
                source,
            })?;

        let names = detector.class_names().cloned();
        let exporter =
            DetectionExporter::new(&layout, dossier_name(&self.images_dir)).with_names(names.as_ref());

        for path in &images {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::info!("Processing: {}", file_name);

            match self.process_image(path, detector, &exporter, &mut ledger) {
                Ok(result) => {
                    log::debug!("{}: {} detections", file_name, result.detection_count);
                    summary.record(result);
                }
                Err(e) => log::error!("Error processing {}: {}", file_name, e),
            }
        }

        if let Err(e) = ledger.into_inner() {
            log::warn!("Failed to flush {}: {}", layout.ledger_path.display(), e);
        }

        Ok(summary)
    }

    /// Decode, detect and export a single image
    fn process_image(
        &self,
        path: &Path,
        detector: &mut dyn Detector,
        exporter: &DetectionExporter<'_>,
        ledger: &mut DetectionLedger<File>,
    ) -> Result<ExportResult, ImageJobError> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;

        let detections = detector
            .detect(&image, self.conf_threshold, &self.device)
            .map_err(ImageJobError::Detector)?;

        let job = ImageJob::new(path, image, detections);
        exporter.export(&job, ledger)
    }
}
