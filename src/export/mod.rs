pub mod annotate;
pub mod crops;
pub mod glyphs;
pub mod labels;
pub mod ledger;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{ExportFlags, LEDGER_FILE_NAME};
use crate::detection::ClassNames;
use crate::error::{ImageJobError, SetupError};
use crate::models::{ExportResult, ImageJob};

pub use ledger::{DetectionLedger, DetectionLedgerRow, LEDGER_HEADER, NO_DETECTION};

/// Where each artifact of a run goes.
///
/// Artifact directories exist only for enabled flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub ledger_path: PathBuf,
    pub crops_dir: Option<PathBuf>,
    pub labels_dir: Option<PathBuf>,
    pub annotated_dir: Option<PathBuf>,
}

impl OutputLayout {
    pub fn new(root: &Path, flags: ExportFlags) -> Self {
        let sub = |enabled: bool, name: &str| enabled.then(|| root.join(name));
        Self {
            root: root.to_path_buf(),
            ledger_path: root.join(LEDGER_FILE_NAME),
            crops_dir: sub(flags.save_crops, "crops"),
            labels_dir: sub(flags.save_labels, "labels"),
            annotated_dir: sub(flags.save_annotated, "annotated"),
        }
    }

    /// Create the root and enabled artifact directories. Existing directories are fine.
    pub fn create(&self) -> Result<(), SetupError> {
        let dirs = [
            Some(&self.root),
            self.crops_dir.as_ref(),
            self.labels_dir.as_ref(),
            self.annotated_dir.as_ref(),
        ];
        for dir in dirs.into_iter().flatten() {
            std::fs::create_dir_all(dir).map_err(|source| SetupError::CreateOutputDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Fans one image's detections out to the ledger and the enabled artifacts.
///
/// Every artifact is derived from the same decoded image and detection list:
/// ledger rows are appended first, then the label file, the crops and the
/// annotated copy. The first failure aborts the image; artifacts already
/// written for it stay on disk.
///
/// Ledger rows are not rolled back either, so an image that fails on a later
/// artifact still has its `detectionN` rows in the ledger while the run
/// counts it as not processed.
pub struct DetectionExporter<'a> {
    layout: &'a OutputLayout,
    dossier: String,
    names: Option<&'a ClassNames>,
}

impl<'a> DetectionExporter<'a> {
    /// `dossier` is the source directory name recorded in every ledger row
    pub fn new(layout: &'a OutputLayout, dossier: impl Into<String>) -> Self {
        Self {
            layout,
            dossier: dossier.into(),
            names: None,
        }
    }

    pub fn with_names(mut self, names: Option<&'a ClassNames>) -> Self {
        self.names = names;
        self
    }

    pub fn export<W: Write>(
        &self,
        job: &ImageJob,
        ledger: &mut DetectionLedger<W>,
    ) -> Result<ExportResult, ImageJobError> {
        if job.width() == 0 || job.height() == 0 {
            return Err(ImageJobError::EmptyImage {
                width: job.width(),
                height: job.height(),
            });
        }

        ledger.append(&DetectionLedgerRow::rows_for(&self.dossier, job))?;

        if let Some(dir) = &self.layout.labels_dir {
            labels::write_label_file(dir, job)?;
        }

        if job.detections.is_empty() {
            return Ok(ExportResult::default());
        }

        if let Some(dir) = &self.layout.crops_dir {
            let written = crops::write_crops(dir, job)?;
            log::debug!("{}: {} crops", job.file_name(), written.len());
        }

        if let Some(dir) = &self.layout.annotated_dir {
            annotate::write_annotated(dir, job, self.names)?;
        }

        Ok(ExportResult {
            detection_count: job.detections.len(),
        })
    }
}
