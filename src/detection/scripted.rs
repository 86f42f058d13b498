use anyhow::Result;
use image::DynamicImage;
use std::collections::VecDeque;

use crate::detection::{ClassNames, Detector};
use crate::models::Detection;

/// Detector that replays a fixed script, one entry per `detect` call.
///
/// Entries are consumed in call order. An exhausted script yields no detections.
/// Used to drive the export pipeline without a model.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<Vec<Detection>, String>>,
    names: Option<ClassNames>,
    calls: usize,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the detections returned by the next call
    pub fn then_detect(mut self, detections: Vec<Detection>) -> Self {
        self.script.push_back(Ok(detections));
        self
    }

    /// Queue a failure for the next call
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(Err(message.into()));
        self
    }

    pub fn with_names(mut self, names: ClassNames) -> Self {
        self.names = Some(names);
        self
    }

    /// Number of `detect` calls so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Detector for ScriptedDetector {
    fn detect(
        &mut self,
        _image: &DynamicImage,
        conf_threshold: f32,
        _device: &str,
    ) -> Result<Vec<Detection>> {
        self.calls += 1;
        match self.script.pop_front() {
            Some(Ok(detections)) => Ok(detections
                .into_iter()
                .filter(|d| d.confidence >= conf_threshold)
                .collect()),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }

    fn class_names(&self) -> Option<&ClassNames> {
        self.names.as_ref()
    }
}
