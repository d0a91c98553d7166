//! Combined upscaling + frame generation presets

use core::fmt;

use streamline::{DlssMode, DlssgMode};

use crate::common::UpscalingError;

/// One-call quality/frame-generation combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// MaxQuality upscaling, one generated frame
    QualityWithFrameGen2x,
    /// MaxPerformance upscaling, two generated frames
    PerformanceWithFrameGen3x,
}

impl Preset {
    pub fn dlss_mode(&self) -> DlssMode {
        match self {
            Preset::QualityWithFrameGen2x => DlssMode::MaxQuality,
            Preset::PerformanceWithFrameGen3x => DlssMode::MaxPerformance,
        }
    }

    /// Frame generation mode and generated frame count
    pub fn frame_generation(&self) -> (DlssgMode, u32) {
        match self {
            Preset::QualityWithFrameGen2x => (DlssgMode::On, 1),
            Preset::PerformanceWithFrameGen3x => (DlssgMode::On, 2),
        }
    }
}

/// Result of applying a preset whose upscaling step succeeded
///
/// A failed frame generation step still counts as success of the preset
/// because upscaling is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetOutcome<E = UpscalingError> {
    Complete,
    Partial(E),
}

impl<E: fmt::Display> PresetOutcome<E> {
    pub fn from_frame_generation(result: Result<DlssgMode, E>) -> Self {
        match result {
            Ok(_) => PresetOutcome::Complete,
            Err(err) => {
                log::warn!("DLSS enabled but Frame Gen failed - partial success: {}", err);
                PresetOutcome::Partial(err)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PresetOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::SdkError;

    #[test]
    fn test_preset_modes() {
        assert_eq!(Preset::QualityWithFrameGen2x.dlss_mode() as i32, 3);
        assert_eq!(Preset::PerformanceWithFrameGen3x.dlss_mode() as i32, 1);
        assert_eq!(
            Preset::PerformanceWithFrameGen3x.frame_generation(),
            (DlssgMode::On, 2)
        );
    }

    #[test]
    fn test_outcome() {
        assert_eq!(
            PresetOutcome::<UpscalingError>::from_frame_generation(Ok(DlssgMode::On)),
            PresetOutcome::Complete
        );
        let err = UpscalingError::Sdk(SdkError::FEATURE_NOT_SUPPORTED);
        assert_eq!(
            PresetOutcome::from_frame_generation(Err(err)),
            PresetOutcome::Partial(err)
        );
    }
}
