use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::error::{Artifact, ImageJobError};
use crate::models::{DetectionIndex, ImageJob};

/// `<stem>_crop_<NNN>.jpg`
pub fn crop_file_name(stem: &str, index: DetectionIndex) -> String {
    format!("{}_crop_{}.jpg", stem, index.crop_suffix())
}

/// Save one JPEG per detection. Boxes are clamped to the image first; a box
/// with nothing left inside the image is skipped.
pub fn write_crops(dir: &Path, job: &ImageJob) -> Result<Vec<PathBuf>, ImageJobError> {
    let stem = job.stem();
    let mut written = Vec::with_capacity(job.detections.len());

    for (index, detection) in job.indexed_detections() {
        let Some(rect) = detection.bbox.pixel_rect(job.width(), job.height()) else {
            log::warn!(
                "{}: detection {} lies outside the image, no crop written",
                job.file_name(),
                index.number()
            );
            continue;
        };

        let path = dir.join(crop_file_name(&stem, index));
        let cropped = job
            .image
            .crop_imm(rect.x, rect.y, rect.width, rect.height)
            .to_rgb8();

        cropped
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|source| ImageJobError::Encode {
                artifact: Artifact::Crop,
                path: path.clone(),
                source,
            })?;

        written.push(path);
    }

    Ok(written)
}
