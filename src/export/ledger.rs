use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::ImageJob;

/// Column names of the ledger file
pub const LEDGER_HEADER: [&str; 4] = ["dossier", "image", "detection_number", "score"];

/// Label of the row written for an image without detections
pub const NO_DETECTION: &str = "no-detection";

/// One ledger record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionLedgerRow {
    pub dossier: String,
    pub image: String,
    pub detection_number: String,
    pub score: Option<f32>,
}

impl DetectionLedgerRow {
    /// Rows describing one image: one per detection, or a single sentinel
    pub fn rows_for(dossier: &str, job: &ImageJob) -> Vec<Self> {
        let image = job.file_name();

        if job.detections.is_empty() {
            return vec![Self {
                dossier: dossier.to_string(),
                image,
                detection_number: NO_DETECTION.to_string(),
                score: None,
            }];
        }

        job.indexed_detections()
            .map(|(idx, detection)| Self {
                dossier: dossier.to_string(),
                image: image.clone(),
                detection_number: idx.ledger_label(),
                score: Some(detection.confidence),
            })
            .collect()
    }
}

/// Append-only CSV ledger shared by every image of a run
pub struct DetectionLedger<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl DetectionLedger<File> {
    /// Create (or truncate) the ledger file and write the header
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> DetectionLedger<W> {
    pub fn from_writer(inner: W) -> Result<Self, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(LEDGER_HEADER)?;
        writer.flush()?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write all rows of one image, then flush so the image's rows reach
    /// the file together
    pub fn append(&mut self, rows: &[DetectionLedgerRow]) -> Result<(), csv::Error> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        self.rows_written += rows.len();
        Ok(())
    }

    /// Data rows written so far (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}
