//! NVIDIA Deep Learning Super Sampling (DLSS) over Streamline

use streamline::{
    Constants, DlssFunctions, DlssMode, DlssOptimalSettings, DlssOptions, Feature, Float4x4,
    NativeHandle, Streamline, ViewportHandle,
};

use crate::common::{tag_resource, TagRequest, UpscalingError};

/// Camera inputs supplied by the host each frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraConstants {
    pub camera_view_to_clip: Float4x4,
    pub clip_to_camera_view: Float4x4,
    pub clip_to_prev_clip: Float4x4,
    pub prev_clip_to_clip: Float4x4,
    pub jitter_offset: [f32; 2],
    pub mvec_scale: [f32; 2],
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_fov: f32,
    pub camera_aspect_ratio: f32,
    pub depth_inverted: bool,
    pub camera_motion_included: bool,
    pub reset: bool,
}

impl CameraConstants {
    /// SDK constants for this camera
    ///
    /// Motion vectors are 2D, undilated and unjittered and the projection is
    /// perspective.
    pub fn to_constants(&self) -> Constants {
        Constants {
            camera_view_to_clip: self.camera_view_to_clip,
            clip_to_camera_view: self.clip_to_camera_view,
            clip_to_prev_clip: self.clip_to_prev_clip,
            prev_clip_to_clip: self.prev_clip_to_clip,
            jitter_offset: self.jitter_offset,
            mvec_scale: self.mvec_scale,
            camera_near: self.camera_near,
            camera_far: self.camera_far,
            camera_fov: self.camera_fov,
            camera_aspect_ratio: self.camera_aspect_ratio,
            depth_inverted: self.depth_inverted,
            camera_motion_included: self.camera_motion_included,
            motion_vectors_3d: false,
            reset: self.reset,
            orthographic_projection: false,
            motion_vectors_dilated: false,
            motion_vectors_jittered: false,
        }
    }
}

/// What became of a constants update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantsStatus {
    Submitted,
    /// No frame token was available; the constants are only kept locally
    StoredOnly,
}

/// DLSS context
#[derive(Debug, Default)]
pub struct DlssContext {
    viewport: ViewportHandle,
    /// Last options accepted by the SDK
    options: DlssOptions,
    constants: Option<Constants>,
}

impl DlssContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, id: u32) {
        self.viewport = ViewportHandle(id);
        log::info!("DLSS viewport set to: {}", id);
    }

    pub fn viewport(&self) -> ViewportHandle {
        self.viewport
    }

    pub fn mode(&self) -> DlssMode {
        self.options.mode
    }

    pub fn options(&self) -> &DlssOptions {
        &self.options
    }

    /// Last constants handed in, submitted or not
    pub fn constants(&self) -> Option<&Constants> {
        self.constants.as_ref()
    }

    pub fn set_options(
        &mut self,
        functions: &dyn DlssFunctions,
        raw_mode: i32,
        output_width: u32,
        output_height: u32,
        color_buffers_hdr: bool,
    ) -> Result<DlssMode, UpscalingError> {
        let mode = DlssMode::from_raw(raw_mode).ok_or(UpscalingError::InvalidMode(raw_mode))?;
        let options = DlssOptions {
            mode,
            output_width,
            output_height,
            color_buffers_hdr,
            pre_exposure: 1.0,
            exposure_scale: 1.0,
        };
        self.apply(functions, options)
    }

    /// Change only the mode, keeping the last output size
    pub fn set_mode(
        &mut self,
        functions: &dyn DlssFunctions,
        raw_mode: i32,
    ) -> Result<DlssMode, UpscalingError> {
        let mode = DlssMode::from_raw(raw_mode).ok_or(UpscalingError::InvalidMode(raw_mode))?;
        let options = DlssOptions {
            mode,
            ..self.options
        };
        self.apply(functions, options)
    }

    fn apply(
        &mut self,
        functions: &dyn DlssFunctions,
        options: DlssOptions,
    ) -> Result<DlssMode, UpscalingError> {
        functions
            .set_options(self.viewport, &options)
            .map_err(|err| {
                log::error!("slDLSSSetOptions failed: {}", err);
                UpscalingError::Sdk(err)
            })?;

        log::info!(
            "DLSS mode set to: {:?}, output: {}x{}",
            options.mode,
            options.output_width,
            options.output_height
        );
        self.options = options;
        Ok(options.mode)
    }

    /// Recommended render size for a mode and output size
    pub fn optimal_settings(
        functions: &dyn DlssFunctions,
        raw_mode: i32,
        output_width: u32,
        output_height: u32,
    ) -> Result<DlssOptimalSettings, UpscalingError> {
        let mode = DlssMode::from_raw(raw_mode).ok_or(UpscalingError::InvalidMode(raw_mode))?;
        let options = DlssOptions {
            mode,
            output_width,
            output_height,
            ..DlssOptions::default()
        };

        let settings = functions.get_optimal_settings(&options)?;
        log::info!(
            "DLSS optimal for mode {:?} @ {}x{}: render={}x{}",
            mode,
            output_width,
            output_height,
            settings.optimal_render_width,
            settings.optimal_render_height
        );
        Ok(settings)
    }

    /// Store and submit per-frame camera constants
    ///
    /// Constants must reach the SDK before tagging and evaluation of the same
    /// frame. A missing frame token is not an error; only a rejected
    /// submission is.
    pub fn set_constants(
        &mut self,
        sdk: &dyn Streamline,
        camera: &CameraConstants,
        frame_index: u32,
    ) -> Result<ConstantsStatus, UpscalingError> {
        let constants = camera.to_constants();
        self.constants = Some(constants);

        let token = match sdk.get_new_frame_token(frame_index) {
            Ok(token) => token,
            Err(err) => {
                log::debug!("no frame token for constants ({}), keeping them locally", err);
                return Ok(ConstantsStatus::StoredOnly);
            }
        };

        sdk.set_constants(&constants, &token, self.viewport)
            .map_err(|err| {
                log::error!("slSetConstants failed: {}", err);
                UpscalingError::Sdk(err)
            })?;
        Ok(ConstantsStatus::Submitted)
    }

    pub fn tag(
        &self,
        sdk: &dyn Streamline,
        request: &TagRequest,
        frame_index: u32,
    ) -> Result<(), UpscalingError> {
        tag_resource(sdk, self.viewport, request, frame_index)
    }

    /// Run upscaling for `frame_index` on `command_buffer`
    pub fn evaluate(
        sdk: &dyn Streamline,
        frame_index: u32,
        command_buffer: NativeHandle,
    ) -> Result<(), UpscalingError> {
        let token = sdk
            .get_new_frame_token(frame_index)
            .map_err(UpscalingError::FrameToken)?;

        sdk.evaluate_feature(Feature::DLSS, &token, command_buffer)
            .map_err(|err| {
                log::error!("slEvaluateFeature(DLSS) failed: {}", err);
                UpscalingError::Sdk(err)
            })
    }

    /// Forget mode, options and constants; the viewport is kept
    pub fn reset(&mut self) {
        self.options = DlssOptions::default();
        self.constants = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};
    use streamline::SdkError;

    #[test]
    fn test_set_options_records_mode() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        dlss.set_viewport(1);

        assert_eq!(
            dlss.set_options(&sdk, 3, 3840, 2160, true),
            Ok(DlssMode::MaxQuality)
        );
        assert_eq!(dlss.mode(), DlssMode::MaxQuality);
        assert_eq!(
            sdk.calls(),
            vec![Call::DlssSetOptions {
                viewport: ViewportHandle(1),
                options: DlssOptions {
                    mode: DlssMode::MaxQuality,
                    output_width: 3840,
                    output_height: 2160,
                    color_buffers_hdr: true,
                    pre_exposure: 1.0,
                    exposure_scale: 1.0,
                },
            }]
        );
    }

    #[test]
    fn test_set_mode_reuses_output_size() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        dlss.set_options(&sdk, 2, 2560, 1440, false).unwrap();
        sdk.clear_calls();

        dlss.set_mode(&sdk, 1).unwrap();
        match &sdk.calls()[..] {
            [Call::DlssSetOptions { options, .. }] => {
                assert_eq!(options.mode, DlssMode::MaxPerformance);
                assert_eq!((options.output_width, options.output_height), (2560, 1440));
            }
            calls => panic!("unexpected calls {:?}", calls),
        }
    }

    #[test]
    fn test_rejected_options_keep_mode() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        sdk.fail(EntryPoint::DlssSetOptions, SdkError::INVALID_PARAMETER);

        assert!(dlss.set_options(&sdk, 3, 1920, 1080, false).is_err());
        assert_eq!(dlss.mode(), DlssMode::Off);
        assert_eq!(dlss.set_mode(&sdk, 9), Err(UpscalingError::InvalidMode(9)));
    }

    #[test]
    fn test_optimal_settings() {
        let sdk = MockStreamline::new();
        let settings = DlssContext::optimal_settings(&sdk, 2, 2560, 1440).unwrap();
        assert_eq!(settings.optimal_render_width, 1280);
        assert_eq!(
            sdk.calls(),
            vec![Call::DlssGetOptimalSettings {
                mode: DlssMode::Balanced,
                output_width: 2560,
                output_height: 1440,
            }]
        );
    }

    #[test]
    fn test_constants_fixed_flags() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        let camera = CameraConstants {
            camera_near: 0.1,
            camera_far: 1000.0,
            depth_inverted: true,
            reset: true,
            ..CameraConstants::default()
        };

        assert_eq!(
            dlss.set_constants(&sdk, &camera, 4),
            Ok(ConstantsStatus::Submitted)
        );
        let submitted = sdk.calls().into_iter().find_map(|call| match call {
            Call::SetConstants {
                frame_index,
                constants,
                ..
            } => Some((frame_index, constants)),
            _ => None,
        });
        let (frame_index, constants) = submitted.unwrap();
        assert_eq!(frame_index, 4);
        assert!(constants.depth_inverted && constants.reset);
        assert!(!constants.motion_vectors_3d);
        assert!(!constants.orthographic_projection);
        assert!(!constants.motion_vectors_dilated);
        assert!(!constants.motion_vectors_jittered);
    }

    #[test]
    fn test_constants_without_token_still_succeed() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        sdk.fail(EntryPoint::GetNewFrameToken, SdkError::INVALID_STATE);

        assert_eq!(
            dlss.set_constants(&sdk, &CameraConstants::default(), 1),
            Ok(ConstantsStatus::StoredOnly)
        );
        assert!(dlss.constants().is_some());

        sdk.succeed(EntryPoint::GetNewFrameToken);
        sdk.fail(EntryPoint::SetConstants, SdkError::MISSING_CONSTANTS);
        assert_eq!(
            dlss.set_constants(&sdk, &CameraConstants::default(), 1),
            Err(UpscalingError::Sdk(SdkError::MISSING_CONSTANTS))
        );
    }

    #[test]
    fn test_evaluate_on_command_buffer() {
        let sdk = MockStreamline::new();
        let cmd = NativeHandle::from_addr(0xc0de0).unwrap();

        DlssContext::evaluate(&sdk, 12, cmd).unwrap();
        assert_eq!(
            sdk.calls().last(),
            Some(&Call::EvaluateFeature {
                feature: Feature::DLSS,
                frame_index: 12,
                command_buffer: 0xc0de0,
            })
        );
    }

    #[test]
    fn test_reset_keeps_viewport() {
        let sdk = MockStreamline::new();
        let mut dlss = DlssContext::new();
        dlss.set_viewport(3);
        dlss.set_options(&sdk, 1, 100, 100, false).unwrap();

        dlss.reset();
        assert_eq!(dlss.mode(), DlssMode::Off);
        assert_eq!(dlss.viewport(), ViewportHandle(3));
    }
}
