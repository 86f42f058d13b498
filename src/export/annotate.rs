use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::detection::{ClassNames, class_label};
use crate::error::{Artifact, ImageJobError};
use crate::export::glyphs::{draw_text, text_size};
use crate::models::{Detection, ImageJob};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BOX_THICKNESS: i32 = 2;
const TEXT_SCALE: u32 = 2;
/// Space between the label background top and the text
const LABEL_MARGIN: i32 = 10;
/// Gap between the text bottom and the box top edge
const LABEL_BASELINE: i32 = 5;

/// `<stem>_annotated<ext>`
pub fn annotated_file_name(stem: &str, extension: &str) -> String {
    format!("{}_annotated{}", stem, extension)
}

/// `"{class}: {confidence:.2}"`
pub fn detection_caption(names: Option<&ClassNames>, detection: &Detection) -> String {
    format!("{}: {:.2}", class_label(names, detection.class_id), detection.confidence)
}

/// Copy of the image with every detection boxed and captioned
pub fn annotate(job: &ImageJob, names: Option<&ClassNames>) -> RgbImage {
    let mut canvas = job.image.to_rgb8();
    let (width, height) = canvas.dimensions();

    for detection in &job.detections {
        let bbox = detection.bbox.clamped(width, height);
        let x1 = bbox.x1 as i32;
        let y1 = bbox.y1 as i32;
        let x2 = bbox.x2 as i32;
        let y2 = bbox.y2 as i32;

        for t in 0..BOX_THICKNESS {
            let w = (x2 - x1 + 1 + 2 * t).max(1) as u32;
            let h = (y2 - y1 + 1 + 2 * t).max(1) as u32;
            draw_hollow_rect_mut(&mut canvas, Rect::at(x1 - t, y1 - t).of_size(w, h), BOX_COLOR);
        }

        let caption = detection_caption(names, detection);
        let (text_w, text_h) = text_size(&caption, TEXT_SCALE);
        let label_top = y1 - text_h as i32 - LABEL_MARGIN;
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(x1, label_top).of_size(text_w.max(1), text_h + LABEL_MARGIN as u32),
            BOX_COLOR,
        );
        draw_text(
            &mut canvas,
            x1,
            y1 - LABEL_BASELINE - text_h as i32,
            &caption,
            TEXT_COLOR,
            TEXT_SCALE,
        );
    }

    canvas
}

/// Render and save the annotated copy next to the other artifacts, in the
/// format given by the source file's extension
pub fn write_annotated(
    dir: &Path,
    job: &ImageJob,
    names: Option<&ClassNames>,
) -> Result<PathBuf, ImageJobError> {
    let path = dir.join(annotated_file_name(&job.stem(), &job.extension()));
    let encode_err = |source| ImageJobError::Encode {
        artifact: Artifact::Annotated,
        path: path.clone(),
        source,
    };

    let format = ImageFormat::from_path(&job.path).map_err(encode_err)?;
    annotate(job, names)
        .save_with_format(&path, format)
        .map_err(encode_err)?;

    Ok(path)
}
