//! Backend used when no SDK runtime is linked
//!
//! Every entry point fails, so the bridge stays in its device-bound state and
//! reports the failure through its last-error record.

use crate::result::{SdkError, SdkResult};
use crate::sdk::{FeatureInterface, Streamline};
use crate::types::{
    AdapterInfo, Constants, Feature, FrameToken, NativeHandle, Preferences, ResourceTag,
    ViewportHandle,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Streamline for Detached {
    fn is_available(&self) -> bool {
        false
    }

    fn init(&self, _preferences: &Preferences) -> SdkResult<()> {
        log::warn!("Streamline runtime not linked into this build");
        Err(SdkError::MISSING_OR_INVALID_API)
    }

    fn shutdown(&self) -> SdkResult<()> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn set_d3d_device(&self, _device: NativeHandle) -> SdkResult<()> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn is_feature_supported(&self, _feature: Feature, _adapter: &AdapterInfo) -> SdkResult<()> {
        Err(SdkError::FEATURE_MISSING)
    }

    fn get_new_frame_token(&self, _frame_index: u32) -> SdkResult<FrameToken> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn set_constants(
        &self,
        _constants: &Constants,
        _frame: &FrameToken,
        _viewport: ViewportHandle,
    ) -> SdkResult<()> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn set_tag_for_frame(
        &self,
        _frame: &FrameToken,
        _viewport: ViewportHandle,
        _tags: &[ResourceTag],
        _command_buffer: Option<NativeHandle>,
    ) -> SdkResult<()> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn evaluate_feature(
        &self,
        _feature: Feature,
        _frame: &FrameToken,
        _command_buffer: NativeHandle,
    ) -> SdkResult<()> {
        Err(SdkError::NOT_INITIALIZED)
    }

    fn feature_interface(&self, _feature: Feature) -> Option<FeatureInterface> {
        None
    }
}
