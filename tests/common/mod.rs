#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from detexport for tests
#[allow(unused_imports)]
pub use detexport::{
    BatchDriver, ClassNames, ExportFlags, ScriptedDetector, SetupError, YoloBox,
};
