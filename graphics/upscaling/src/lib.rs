//! Upscaling over the Streamline SDK
//!
//! This crate drives NVIDIA's reconstruction features:
//! - DLSS super resolution (options, constants, tagging, evaluation)
//! - DLSS frame generation
//! - The render-thread evaluation hand-off and combined presets

pub mod common;
pub mod dlss;
pub mod dlssg;
pub mod pending;
pub mod presets;

pub use common::{tag_resource, TagRequest, UpscalingError};
pub use dlss::{CameraConstants, ConstantsStatus, DlssContext};
pub use dlssg::{FrameGeneration, DEFAULT_FRAMES_TO_GENERATE};
pub use pending::{PendingEvaluation, EVALUATE_EVENT_ID};
pub use presets::{Preset, PresetOutcome};
