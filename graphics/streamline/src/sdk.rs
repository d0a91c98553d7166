//! SDK entry points

use std::sync::Arc;

use crate::result::SdkResult;
use crate::types::{
    AdapterInfo, Constants, DlssOptimalSettings, DlssOptions, DlssgOptions, DlssgState, Feature,
    FrameToken, NativeHandle, PclMarker, Preferences, ReflexOptions, ReflexState, ResourceTag,
    ViewportHandle,
};

/// Core SDK entry points, always present in any SDK build
///
/// Implementations must be callable from both the simulation and the render
/// thread; the SDK itself is internally synchronized.
pub trait Streamline: Send + Sync {
    /// Whether the SDK runtime can be reached at all
    fn is_available(&self) -> bool;

    fn init(&self, preferences: &Preferences) -> SdkResult<()>;

    fn shutdown(&self) -> SdkResult<()>;

    /// Bind the host's graphics device
    fn set_d3d_device(&self, device: NativeHandle) -> SdkResult<()>;

    fn is_feature_supported(&self, feature: Feature, adapter: &AdapterInfo) -> SdkResult<()>;

    fn get_new_frame_token(&self, frame_index: u32) -> SdkResult<FrameToken>;

    fn set_constants(
        &self,
        constants: &Constants,
        frame: &FrameToken,
        viewport: ViewportHandle,
    ) -> SdkResult<()>;

    fn set_tag_for_frame(
        &self,
        frame: &FrameToken,
        viewport: ViewportHandle,
        tags: &[ResourceTag],
        command_buffer: Option<NativeHandle>,
    ) -> SdkResult<()>;

    fn evaluate_feature(
        &self,
        feature: Feature,
        frame: &FrameToken,
        command_buffer: NativeHandle,
    ) -> SdkResult<()>;

    /// Resolve the function set of an optional feature
    ///
    /// Returns `None` when the loaded SDK build does not export it.
    fn feature_interface(&self, feature: Feature) -> Option<FeatureInterface>;
}

/// Low-latency mode entry points
pub trait ReflexFunctions: Send + Sync {
    fn set_options(&self, options: &ReflexOptions) -> SdkResult<()>;

    fn get_state(&self) -> SdkResult<ReflexState>;

    /// Blocks the caller until the SDK's computed release time
    fn sleep(&self, frame: &FrameToken) -> SdkResult<()>;
}

/// PC-latency marker entry points
pub trait PclFunctions: Send + Sync {
    fn set_marker(&self, marker: PclMarker, frame: &FrameToken) -> SdkResult<()>;
}

/// Super-resolution entry points
pub trait DlssFunctions: Send + Sync {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssOptions) -> SdkResult<()>;

    fn get_optimal_settings(&self, options: &DlssOptions) -> SdkResult<DlssOptimalSettings>;
}

/// Frame-generation entry points
pub trait DlssgFunctions: Send + Sync {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssgOptions) -> SdkResult<()>;

    fn get_state(
        &self,
        viewport: ViewportHandle,
        options: Option<&DlssgOptions>,
    ) -> SdkResult<DlssgState>;
}

/// Function set resolved for one feature
#[derive(Clone)]
pub enum FeatureInterface {
    Reflex(Arc<dyn ReflexFunctions>),
    Pcl(Arc<dyn PclFunctions>),
    Dlss(Arc<dyn DlssFunctions>),
    FrameGeneration(Arc<dyn DlssgFunctions>),
}

impl FeatureInterface {
    /// Feature this function set belongs to
    pub fn feature(&self) -> Feature {
        match self {
            FeatureInterface::Reflex(_) => Feature::REFLEX,
            FeatureInterface::Pcl(_) => Feature::PCL,
            FeatureInterface::Dlss(_) => Feature::DLSS,
            FeatureInterface::FrameGeneration(_) => Feature::DLSS_G,
        }
    }
}
