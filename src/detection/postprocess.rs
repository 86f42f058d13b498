use crate::detection::preprocessing::Letterbox;
use crate::models::{BoundingBox, Detection};

/// Decode a YOLOv8-style prediction tensor of shape `[4 + num_classes, anchors]`.
///
/// Rows 0..4 hold `cx, cy, w, h` in model input pixels, the remaining rows hold
/// per-class scores. `value(attr, anchor)` reads one element. Boxes are mapped
/// back through the letterbox and clamped to the source image.
pub fn decode_predictions<F>(
    attrs: usize,
    anchors: usize,
    value: F,
    conf_threshold: f32,
    letterbox: &Letterbox,
    image_size: (u32, u32),
) -> Vec<Detection>
where
    F: Fn(usize, usize) -> f32,
{
    if attrs <= 4 {
        return Vec::new();
    }

    let (img_w, img_h) = image_size;
    let mut detections = Vec::new();

    for anchor in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for class in 0..attrs - 4 {
            let score = value(4 + class, anchor);
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }

        if best_score < conf_threshold {
            continue;
        }

        let model_box = BoundingBox::from_center(
            value(0, anchor),
            value(1, anchor),
            value(2, anchor),
            value(3, anchor),
        );
        let (x1, y1) = letterbox.unmap(model_box.x1, model_box.y1);
        let (x2, y2) = letterbox.unmap(model_box.x2, model_box.y2);

        detections.push(Detection::new(
            best_class as u32,
            best_score,
            BoundingBox::new(x1, y1, x2, y2).clamped(img_w, img_h),
        ));
    }

    detections
}

/// Greedy per-class non-maximum suppression.
///
/// Output is sorted by descending confidence.
pub fn non_maximum_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for candidate in detections {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
