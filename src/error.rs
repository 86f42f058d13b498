use std::fmt;
use std::path::PathBuf;

/// Errors that abort a run before any image is processed.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    /// The images directory does not exist.
    #[error("Images directory does not exist: {0}")]
    ImagesDirMissing(PathBuf),

    /// The images path exists but is not a directory.
    #[error("Images path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The images directory could not be listed.
    #[error("Failed to read images directory {path}: {source}")]
    ReadImagesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger file could not be created.
    #[error("Failed to create detection ledger {path}: {source}")]
    CreateLedger {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The detector does not run on the requested device.
    #[error("Unsupported device '{0}' (only 'cpu' is available)")]
    UnsupportedDevice(String),

    /// The model input size is zero or too large.
    #[error("Invalid model input size {0} (expected 1..={max})", max = crate::config::MAX_INPUT_SIZE)]
    InvalidInputSize(u32),

    /// The model weights or class names could not be loaded.
    #[error("Failed to load model: {0:#}")]
    ModelLoad(anyhow::Error),
}

/// Kind of artifact written for an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Label,
    Crop,
    Annotated,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Label => "label file",
            Artifact::Crop => "crop",
            Artifact::Annotated => "annotated image",
        };
        f.write_str(name)
    }
}

/// Failures confined to a single image. The batch driver logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ImageJobError {
    /// The file could not be opened or decoded.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The file could not be read.
    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),

    /// The decoded pixel grid has no pixels.
    #[error("Decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// The detector failed on this image.
    #[error("Detector failed: {0:#}")]
    Detector(anyhow::Error),

    /// Rows could not be appended to the ledger.
    #[error("Failed to write detection ledger: {0}")]
    Ledger(#[from] csv::Error),

    /// A label, crop or annotated file could not be written.
    #[error("Failed to write {artifact} {path}: {source}")]
    Write {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A crop or annotated image could not be encoded.
    #[error("Failed to encode {artifact} {path}: {source}")]
    Encode {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
