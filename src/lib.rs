pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod models;

pub use batch::{BatchDriver, IMAGE_EXTENSIONS, find_images};
pub use config::{ExportFlags, RunConfig};
pub use detection::{ClassNames, Detector, ScriptedDetector, YoloDetector};
pub use error::{Artifact, ImageJobError, SetupError};
pub use export::{DetectionExporter, DetectionLedger, DetectionLedgerRow, OutputLayout};
pub use models::{BoundingBox, Detection, DetectionIndex, ExportResult, ImageJob, RunSummary, YoloBox};

use config::MAX_INPUT_SIZE;

/// Load the model described by `config` and run it over the images directory
pub fn run(config: &RunConfig) -> Result<RunSummary, SetupError> {
    let mut detector = load_detector(config)?;
    BatchDriver::from_config(config).run(&mut detector)
}

/// Build the rten YOLO detector for `config`
pub fn load_detector(config: &RunConfig) -> Result<YoloDetector, SetupError> {
    if !YoloDetector::supports_device(&config.device) {
        return Err(SetupError::UnsupportedDevice(config.device.clone()));
    }
    if config.input_size == 0 || config.input_size > MAX_INPUT_SIZE {
        return Err(SetupError::InvalidInputSize(config.input_size));
    }

    let names = config
        .names
        .as_deref()
        .map(ClassNames::load)
        .transpose()
        .map_err(SetupError::ModelLoad)?;

    log::info!("Loading model from: {}", config.weights.display());
    let detector = YoloDetector::load(&config.weights)
        .map_err(SetupError::ModelLoad)?
        .with_input_size(config.input_size)
        .with_iou_threshold(config.iou_threshold)
        .with_names(names);

    Ok(detector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_detector_rejects_bad_input_size() {
        for size in [0, MAX_INPUT_SIZE + 1] {
            let config = RunConfig::new("missing.rten", "images").with_input_size(size);
            let err = load_detector(&config).unwrap_err();
            assert!(matches!(err, SetupError::InvalidInputSize(s) if s == size));
        }
    }

    #[test]
    fn test_load_detector_rejects_gpu_device() {
        let config = RunConfig::new("missing.rten", "images").with_device("cuda:0");
        let err = load_detector(&config).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedDevice(_)));
    }
}
