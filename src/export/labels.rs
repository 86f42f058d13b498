use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Artifact, ImageJobError};
use crate::models::ImageJob;

/// `<stem>.txt`
pub fn label_file_name(stem: &str) -> String {
    format!("{}.txt", stem)
}

/// Write the YOLO label file of one image. An image without detections
/// still gets an (empty) file.
pub fn write_label_file(dir: &Path, job: &ImageJob) -> Result<PathBuf, ImageJobError> {
    let path = dir.join(label_file_name(&job.stem()));
    let (width, height) = (job.width(), job.height());

    let io_err = |source| ImageJobError::Write {
        artifact: Artifact::Label,
        path: path.clone(),
        source,
    };

    let mut out = BufWriter::new(File::create(&path).map_err(io_err)?);
    for detection in &job.detections {
        let line = detection.bbox.normalized(detection.class_id, width, height);
        writeln!(out, "{}", line).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    Ok(path)
}
