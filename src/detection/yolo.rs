use anyhow::Result;
use image::DynamicImage;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::Path;

use crate::config::{DEFAULT_DEVICE, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD};
use crate::detection::postprocess::{decode_predictions, non_maximum_suppression};
use crate::detection::preprocessing::{letterbox, to_chw};
use crate::detection::{ClassNames, Detector};
use crate::models::Detection;

/// YOLOv8-style detector running on the rten runtime
#[derive(Debug)]
pub struct YoloDetector {
    model: Model,
    input_size: u32,
    iou_threshold: f32,
    names: Option<ClassNames>,
}

impl YoloDetector {
    /// Load `.rten` weights
    pub fn load(weights: &Path) -> Result<Self> {
        if !weights.exists() {
            anyhow::bail!("Model weights not found: {}", weights.display());
        }

        let model = Model::load_file(weights)?;

        Ok(Self {
            model,
            input_size: DEFAULT_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            names: None,
        })
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_names(mut self, names: Option<ClassNames>) -> Self {
        self.names = names;
        self
    }

    /// rten only executes on the CPU
    pub fn supports_device(device: &str) -> bool {
        device.eq_ignore_ascii_case(DEFAULT_DEVICE)
    }
}

impl Detector for YoloDetector {
    fn detect(
        &mut self,
        image: &DynamicImage,
        conf_threshold: f32,
        device: &str,
    ) -> Result<Vec<Detection>> {
        if !Self::supports_device(device) {
            anyhow::bail!("Unsupported device '{}'", device);
        }

        let size = self.input_size as usize;
        let (canvas, placement) = letterbox(image, self.input_size);
        let input = NdTensor::from_data([1, 3, size, size], to_chw(&canvas));

        let output = self.model.run_one(input.view().into(), None)?;
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|e| anyhow::anyhow!("Unexpected model output: {:?}", e))?;

        let [_, attrs, anchors] = output.shape();
        log::debug!("Model output: {} attributes x {} anchors", attrs, anchors);

        let candidates = decode_predictions(
            attrs,
            anchors,
            |a, i| output[[0, a, i]],
            conf_threshold,
            &placement,
            (image.width(), image.height()),
        );

        Ok(non_maximum_suppression(candidates, self.iou_threshold))
    }

    fn class_names(&self) -> Option<&ClassNames> {
        self.names.as_ref()
    }
}
