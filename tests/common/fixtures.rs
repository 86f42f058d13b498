use detexport::{BoundingBox, Detection};
use image::{ImageBuffer, Rgb};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the images folder created inside each workspace
pub const IMAGES_DIR_NAME: &str = "photos";

/// A scratch directory holding `photos/` with the given images.
/// Keep the TempDir alive for the duration of the test.
pub struct Workspace {
    pub dir: TempDir,
    pub images_dir: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let images_dir = dir.path().join(IMAGES_DIR_NAME);
        std::fs::create_dir(&images_dir).expect("Failed to create images directory");
        Self { dir, images_dir }
    }

    /// Add a gradient image; the format follows the file extension
    pub fn add_image(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.images_dir.join(name);
        write_test_image(&path, width, height);
        path
    }

    /// Add a file with an image extension but garbage content
    pub fn add_corrupt_image(&self, name: &str) -> PathBuf {
        let path = self.images_dir.join(name);
        std::fs::write(&path, b"definitely not an image").expect("Failed to write corrupt image");
        path
    }

    pub fn add_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.images_dir.join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Explicit output directory inside the workspace
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }
}

pub fn write_test_image(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128u8])
    });
    img.save(path).expect("Failed to save test image");
}

pub fn det(class_id: u32, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection::new(class_id, confidence, BoundingBox::new(x1, y1, x2, y2))
}

/// All ledger records, header included
pub fn read_ledger(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open ledger");
    reader
        .records()
        .map(|r| r.expect("Bad ledger record").iter().map(str::to_string).collect())
        .collect()
}

pub fn row(dossier: &str, image: &str, label: &str, score: &str) -> Vec<String> {
    [dossier, image, label, score].iter().map(|s| s.to_string()).collect()
}

/// Sorted file names inside a directory
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
