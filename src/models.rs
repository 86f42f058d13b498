use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};

/// Axis-aligned box in absolute pixel coordinates (x1 <= x2, y1 <= y2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from its center and size
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x1: cx - width / 2.0,
            y1: cy - height / 2.0,
            x2: cx + width / 2.0,
            y2: cy + height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    /// Intersection over union, 0 when both boxes are empty
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Clamp the box to [0, width] x [0, height]
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }

    /// Integer pixel region covered by the box once clamped to the image.
    /// Coordinates are truncated; returns None when nothing is left.
    pub fn pixel_rect(&self, width: u32, height: u32) -> Option<PixelRect> {
        let clamped = self.clamped(width, height);
        let x1 = clamped.x1 as u32;
        let y1 = clamped.y1 as u32;
        let x2 = clamped.x2 as u32;
        let y2 = clamped.y2 as u32;

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(PixelRect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }

    /// YOLO normalized representation against an image of the given size
    pub fn normalized(&self, class_id: u32, width: u32, height: u32) -> YoloBox {
        let w = width as f64;
        let h = height as f64;
        let (x1, y1, x2, y2) = (self.x1 as f64, self.y1 as f64, self.x2 as f64, self.y2 as f64);

        YoloBox {
            class_id,
            center_x: ((x1 + x2) / 2.0) / w,
            center_y: ((y1 + y2) / 2.0) / h,
            width: (x2 - x1) / w,
            height: (y2 - y1) / h,
        }
    }
}

/// Integer region inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One line of a YOLO label file: class and box normalized to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub class_id: u32,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloBox {
    /// Back to absolute pixel coordinates
    pub fn to_absolute(&self, width: u32, height: u32) -> BoundingBox {
        let w = width as f64;
        let h = height as f64;
        let cx = self.center_x * w;
        let cy = self.center_y * h;
        let bw = self.width * w;
        let bh = self.height * h;

        BoundingBox {
            x1: (cx - bw / 2.0) as f32,
            y1: (cy - bh / 2.0) as f32,
            x2: (cx + bw / 2.0) as f32,
            y2: (cy + bh / 2.0) as f32,
        }
    }

    /// Parse a `class cx cy w h` line
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let class_id = parts.next()?.parse().ok()?;
        let center_x = parts.next()?.parse().ok()?;
        let center_y = parts.next()?.parse().ok()?;
        let width = parts.next()?.parse().ok()?;
        let height = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            class_id,
            center_x,
            center_y,
            width,
            height,
        })
    }
}

impl fmt::Display for YoloBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.center_x, self.center_y, self.width, self.height
        )
    }
}

/// One raw detector output
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}

/// Position of a detection within its image, in detector order (zero-based).
/// Every per-detection artifact name is derived from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DetectionIndex(pub usize);

impl DetectionIndex {
    /// 1-based number shown to users
    pub fn number(&self) -> usize {
        self.0 + 1
    }

    /// Ledger label, e.g. `detection1`
    pub fn ledger_label(&self) -> String {
        format!("detection{}", self.number())
    }

    /// Crop file suffix, e.g. `001`
    pub fn crop_suffix(&self) -> String {
        format!("{:03}", self.number())
    }
}

/// One image to export: its path, decoded pixels and detections
pub struct ImageJob {
    pub path: PathBuf,
    pub image: DynamicImage,
    pub detections: Vec<Detection>,
}

impl ImageJob {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage, detections: Vec<Detection>) -> Self {
        Self {
            path: path.into(),
            image,
            detections,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// File name as stored in the ledger
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Original extension including the leading dot, or empty
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Detections paired with their canonical index
    pub fn indexed_detections(&self) -> impl Iterator<Item = (DetectionIndex, &Detection)> {
        self.detections
            .iter()
            .enumerate()
            .map(|(i, d)| (DetectionIndex(i), d))
    }
}

/// Per-image outcome reported by the exporter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportResult {
    pub detection_count: usize,
}

/// Aggregate counters of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_images: usize,
    pub processed_images: usize,
    pub total_detections: usize,
    pub output_dir: PathBuf,
    pub ledger_path: PathBuf,
}

impl RunSummary {
    pub fn new(total_images: usize, output_dir: &Path, ledger_path: &Path) -> Self {
        Self {
            total_images,
            processed_images: 0,
            total_detections: 0,
            output_dir: output_dir.to_path_buf(),
            ledger_path: ledger_path.to_path_buf(),
        }
    }

    /// Fold one successful image into the counters
    pub fn record(&mut self, result: ExportResult) {
        self.processed_images += 1;
        self.total_detections += result.detection_count;
    }

    pub fn failed_images(&self) -> usize {
        self.total_images - self.processed_images
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed images: {}/{}", self.processed_images, self.total_images)?;
        if self.failed_images() > 0 {
            writeln!(f, "Failed images: {}", self.failed_images())?;
        }
        writeln!(f, "Total detections: {}", self.total_detections)?;
        writeln!(f, "CSV saved to: {}", self.ledger_path.display())?;
        write!(f, "Output folder: {}", self.output_dir.display())
    }
}
