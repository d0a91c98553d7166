//! DLSS frame generation

use streamline::{
    BufferType, DlssgFlags, DlssgFunctions, DlssgMode, DlssgOptions, DlssgState, Streamline,
    ViewportHandle,
};

use crate::common::{tag_resource, TagRequest, UpscalingError};

/// Frames generated per rendered frame until the host asks otherwise
pub const DEFAULT_FRAMES_TO_GENERATE: u32 = 1;

/// Frame generation context
#[derive(Debug)]
pub struct FrameGeneration {
    /// Last options accepted by the SDK
    options: DlssgOptions,
}

impl Default for FrameGeneration {
    fn default() -> Self {
        Self {
            options: DlssgOptions {
                num_frames_to_generate: DEFAULT_FRAMES_TO_GENERATE,
                flags: DlssgFlags::DYNAMIC_RESOLUTION_ENABLED,
                ..DlssgOptions::default()
            },
        }
    }
}

impl FrameGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DlssgMode {
        self.options.mode
    }

    pub fn num_frames_to_generate(&self) -> u32 {
        self.options.num_frames_to_generate
    }

    pub fn options(&self) -> &DlssgOptions {
        &self.options
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_options(
        &mut self,
        functions: &dyn DlssgFunctions,
        viewport: ViewportHandle,
        raw_mode: i32,
        num_frames_to_generate: u32,
        color_size: (u32, u32),
        mvec_depth_size: (u32, u32),
    ) -> Result<DlssgMode, UpscalingError> {
        let mode =
            DlssgMode::from_raw(raw_mode).ok_or(UpscalingError::InvalidFrameGenMode(raw_mode))?;
        let options = DlssgOptions {
            mode,
            num_frames_to_generate,
            color_width: color_size.0,
            color_height: color_size.1,
            mvec_depth_width: mvec_depth_size.0,
            mvec_depth_height: mvec_depth_size.1,
            flags: DlssgFlags::DYNAMIC_RESOLUTION_ENABLED,
        };
        self.apply(functions, viewport, options)
    }

    /// Change mode and frame count, keeping the last buffer sizes
    pub fn set_mode(
        &mut self,
        functions: &dyn DlssgFunctions,
        viewport: ViewportHandle,
        raw_mode: i32,
        num_frames_to_generate: i32,
    ) -> Result<DlssgMode, UpscalingError> {
        let mode =
            DlssgMode::from_raw(raw_mode).ok_or(UpscalingError::InvalidFrameGenMode(raw_mode))?;
        let frames = u32::try_from(num_frames_to_generate)
            .map_err(|_| UpscalingError::InvalidFrameCount(num_frames_to_generate))?;

        let options = DlssgOptions {
            mode,
            num_frames_to_generate: frames,
            ..self.options
        };
        self.apply(functions, viewport, options)
    }

    fn apply(
        &mut self,
        functions: &dyn DlssgFunctions,
        viewport: ViewportHandle,
        options: DlssgOptions,
    ) -> Result<DlssgMode, UpscalingError> {
        functions.set_options(viewport, &options).map_err(|err| {
            log::error!("slDLSSGSetOptions failed: {}", err);
            UpscalingError::Sdk(err)
        })?;

        log::info!(
            "DLSS-G mode set to: {:?}, frames: {}",
            options.mode,
            options.num_frames_to_generate
        );
        self.options = options;
        Ok(options.mode)
    }

    /// Current SDK-side state, optionally with a VRAM estimate
    pub fn state(
        functions: &dyn DlssgFunctions,
        viewport: ViewportHandle,
        request_vram_estimate: bool,
    ) -> Result<DlssgState, UpscalingError> {
        let query = DlssgOptions {
            flags: DlssgFlags::REQUEST_VRAM_ESTIMATE,
            ..DlssgOptions::default()
        };
        let state = functions.get_state(viewport, request_vram_estimate.then_some(&query))?;

        log::debug!(
            "DLSS-G state: status={}, maxFrames={}",
            state.status,
            state.num_frames_to_generate_max
        );
        Ok(state)
    }

    pub fn tag_hudless_color(
        sdk: &dyn Streamline,
        viewport: ViewportHandle,
        request: TagRequest,
        frame_index: u32,
    ) -> Result<(), UpscalingError> {
        let request = TagRequest {
            role: BufferType::HUD_LESS_COLOR,
            ..request
        };
        tag_resource(sdk, viewport, &request, frame_index)
    }

    pub fn tag_ui_color_and_alpha(
        sdk: &dyn Streamline,
        viewport: ViewportHandle,
        request: TagRequest,
        frame_index: u32,
    ) -> Result<(), UpscalingError> {
        let request = TagRequest {
            role: BufferType::UI_COLOR_AND_ALPHA,
            ..request
        };
        tag_resource(sdk, viewport, &request, frame_index)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};
    use streamline::SdkError;

    #[test]
    fn test_defaults() {
        let fg = FrameGeneration::new();
        assert_eq!(fg.mode(), DlssgMode::Off);
        assert_eq!(fg.num_frames_to_generate(), 1);
    }

    #[test]
    fn test_set_options_sets_dynamic_resolution() {
        let sdk = MockStreamline::new();
        let mut fg = FrameGeneration::new();

        fg.set_options(&sdk, ViewportHandle(0), 1, 3, (3840, 2160), (1920, 1080))
            .unwrap();
        assert_eq!(fg.mode(), DlssgMode::On);
        assert_eq!(fg.num_frames_to_generate(), 3);
        match &sdk.calls()[..] {
            [Call::DlssgSetOptions { options, .. }] => {
                assert!(options.flags.contains(DlssgFlags::DYNAMIC_RESOLUTION_ENABLED));
                assert_eq!(options.mvec_depth_width, 1920);
            }
            calls => panic!("unexpected calls {:?}", calls),
        }
    }

    #[test]
    fn test_set_mode_keeps_sizes() {
        let sdk = MockStreamline::new();
        let mut fg = FrameGeneration::new();
        fg.set_options(&sdk, ViewportHandle(0), 1, 1, (2560, 1440), (1280, 720))
            .unwrap();

        fg.set_mode(&sdk, ViewportHandle(0), 0, 0).unwrap();
        assert_eq!(fg.mode(), DlssgMode::Off);
        assert_eq!(fg.num_frames_to_generate(), 0);
        assert_eq!(fg.options().color_width, 2560);
    }

    #[test]
    fn test_failure_keeps_previous_mode() {
        let sdk = MockStreamline::new();
        let mut fg = FrameGeneration::new();
        sdk.fail(EntryPoint::DlssgSetOptions, SdkError::FEATURE_NOT_SUPPORTED);

        assert!(fg.set_mode(&sdk, ViewportHandle(0), 1, 2).is_err());
        assert_eq!(fg.mode(), DlssgMode::Off);
        assert_eq!(fg.num_frames_to_generate(), 1);
        assert_eq!(
            fg.set_mode(&sdk, ViewportHandle(0), 1, -2),
            Err(UpscalingError::InvalidFrameCount(-2))
        );
    }

    #[test]
    fn test_state_vram_request() {
        let sdk = MockStreamline::new();
        let state = FrameGeneration::state(&sdk, ViewportHandle(0), true).unwrap();
        assert_eq!(state.num_frames_to_generate_max, 3);

        FrameGeneration::state(&sdk, ViewportHandle(0), false).unwrap();
        assert_eq!(
            sdk.calls(),
            vec![
                Call::DlssgGetState {
                    viewport: ViewportHandle(0),
                    request_vram_estimate: true,
                },
                Call::DlssgGetState {
                    viewport: ViewportHandle(0),
                    request_vram_estimate: false,
                },
            ]
        );
    }

    #[test]
    fn test_fixed_tag_roles() {
        let sdk = MockStreamline::new();
        let request = TagRequest {
            native: 0x4000 as *mut core::ffi::c_void,
            role: BufferType::DEPTH,
            width: 64,
            height: 64,
            native_format: 28,
            state: 0,
        };

        FrameGeneration::tag_hudless_color(&sdk, ViewportHandle(0), request, 1).unwrap();
        FrameGeneration::tag_ui_color_and_alpha(&sdk, ViewportHandle(0), request, 1).unwrap();

        let roles: Vec<_> = sdk
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetTagForFrame { role, .. } => Some(role),
                _ => None,
            })
            .collect();
        assert_eq!(
            roles,
            vec![BufferType::HUD_LESS_COLOR, BufferType::UI_COLOR_AND_ALPHA]
        );
    }
}
