//! Recording SDK backend for tests
//!
//! Every entry point appends a [`Call`] and can be told to fail with a chosen
//! result code. Feature support and feature interface resolution can be
//! switched off per feature.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::result::{SdkError, SdkResult};
use crate::sdk::{
    DlssFunctions, DlssgFunctions, FeatureInterface, PclFunctions, ReflexFunctions, Streamline,
};
use crate::types::{
    AdapterInfo, BufferType, Constants, DlssMode, DlssOptimalSettings, DlssOptions, DlssgFlags,
    DlssgOptions, DlssgState, Feature, FrameToken, NativeHandle, PclMarker, Preferences,
    ReflexMode, ReflexOptions, ReflexState, ResourceLifecycle, ResourceTag, ViewportHandle,
};

/// Base address of fabricated frame tokens
const TOKEN_BASE: usize = 0x5100_0000;

/// Entry point selector for injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Init,
    Shutdown,
    SetD3dDevice,
    GetNewFrameToken,
    SetConstants,
    SetTagForFrame,
    EvaluateFeature,
    ReflexSetOptions,
    ReflexGetState,
    ReflexSleep,
    PclSetMarker,
    DlssSetOptions,
    DlssGetOptimalSettings,
    DlssgSetOptions,
    DlssgGetState,
}

/// One recorded SDK call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init {
        application_id: u32,
        features: Vec<Feature>,
    },
    Shutdown,
    SetD3dDevice(usize),
    IsFeatureSupported(Feature),
    GetNewFrameToken(u32),
    SetConstants {
        frame_index: u32,
        viewport: ViewportHandle,
        constants: Constants,
    },
    SetTagForFrame {
        frame_index: u32,
        viewport: ViewportHandle,
        role: BufferType,
        native: usize,
        width: u32,
        height: u32,
        lifecycle: ResourceLifecycle,
    },
    EvaluateFeature {
        feature: Feature,
        frame_index: u32,
        command_buffer: usize,
    },
    ReflexSetOptions(ReflexMode),
    ReflexGetState,
    ReflexSleep(u32),
    PclSetMarker {
        marker: u32,
        frame_index: u32,
    },
    DlssSetOptions {
        viewport: ViewportHandle,
        options: DlssOptions,
    },
    DlssGetOptimalSettings {
        mode: DlssMode,
        output_width: u32,
        output_height: u32,
    },
    DlssgSetOptions {
        viewport: ViewportHandle,
        options: DlssgOptions,
    },
    DlssgGetState {
        viewport: ViewportHandle,
        request_vram_estimate: bool,
    },
}

struct MockState {
    calls: Vec<Call>,
    failures: HashMap<EntryPoint, SdkError>,
    unsupported: HashSet<Feature>,
    omitted: HashSet<Feature>,
    available: bool,
    reflex_state: ReflexState,
    optimal_settings: DlssOptimalSettings,
    dlssg_state: DlssgState,
}

/// Shared-handle mock; clones observe the same call log
#[derive(Clone)]
pub struct MockStreamline {
    state: Arc<Mutex<MockState>>,
}

impl MockStreamline {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                failures: HashMap::new(),
                unsupported: HashSet::new(),
                omitted: HashSet::new(),
                available: true,
                reflex_state: ReflexState {
                    low_latency_available: true,
                    latency_report_available: false,
                    flash_indicator_driver_controlled: false,
                    frame_reports: Vec::new(),
                },
                optimal_settings: DlssOptimalSettings {
                    optimal_render_width: 1280,
                    optimal_render_height: 720,
                    optimal_sharpness: 0.25,
                    render_width_min: 960,
                    render_height_min: 540,
                    render_width_max: 1920,
                    render_height_max: 1080,
                },
                dlssg_state: DlssgState {
                    estimated_vram_usage_bytes: 256 << 20,
                    status: 0,
                    min_width_or_height: 128,
                    num_frames_actually_presented: 2,
                    num_frames_to_generate_max: 3,
                },
            })),
        }
    }

    /// Make `entry` return `error` until [`MockStreamline::succeed`] is called
    pub fn fail(&self, entry: EntryPoint, error: SdkError) {
        self.state.lock().failures.insert(entry, error);
    }

    pub fn succeed(&self, entry: EntryPoint) {
        self.state.lock().failures.remove(&entry);
    }

    pub fn mark_unsupported(&self, feature: Feature) {
        self.state.lock().unsupported.insert(feature);
    }

    /// Pretend the SDK build does not export `feature`'s functions
    pub fn omit_interface(&self, feature: Feature) {
        self.state.lock().omitted.insert(feature);
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    pub fn set_reflex_state(&self, state: ReflexState) {
        self.state.lock().reflex_state = state;
    }

    pub fn set_optimal_settings(&self, settings: DlssOptimalSettings) {
        self.state.lock().optimal_settings = settings;
    }

    pub fn set_dlssg_state(&self, state: DlssgState) {
        self.state.lock().dlssg_state = state;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: Call, entry: EntryPoint) -> SdkResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.get(&entry) {
            Some(error) => Err(*error),
            None => Ok(()),
        }
    }
}

impl Default for MockStreamline {
    fn default() -> Self {
        Self::new()
    }
}

impl Streamline for MockStreamline {
    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    fn init(&self, preferences: &Preferences) -> SdkResult<()> {
        self.record(
            Call::Init {
                application_id: preferences.application_id,
                features: preferences.features.clone(),
            },
            EntryPoint::Init,
        )
    }

    fn shutdown(&self) -> SdkResult<()> {
        self.record(Call::Shutdown, EntryPoint::Shutdown)
    }

    fn set_d3d_device(&self, device: NativeHandle) -> SdkResult<()> {
        self.record(Call::SetD3dDevice(device.addr()), EntryPoint::SetD3dDevice)
    }

    fn is_feature_supported(&self, feature: Feature, _adapter: &AdapterInfo) -> SdkResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::IsFeatureSupported(feature));
        if state.unsupported.contains(&feature) {
            Err(SdkError::FEATURE_NOT_SUPPORTED)
        } else {
            Ok(())
        }
    }

    fn get_new_frame_token(&self, frame_index: u32) -> SdkResult<FrameToken> {
        self.record(Call::GetNewFrameToken(frame_index), EntryPoint::GetNewFrameToken)?;
        let raw = NativeHandle::from_addr(TOKEN_BASE + frame_index as usize)
            .ok_or(SdkError::INVALID_STATE)?;
        Ok(FrameToken::new(raw, frame_index))
    }

    fn set_constants(
        &self,
        constants: &Constants,
        frame: &FrameToken,
        viewport: ViewportHandle,
    ) -> SdkResult<()> {
        self.record(
            Call::SetConstants {
                frame_index: frame.index(),
                viewport,
                constants: *constants,
            },
            EntryPoint::SetConstants,
        )
    }

    fn set_tag_for_frame(
        &self,
        frame: &FrameToken,
        viewport: ViewportHandle,
        tags: &[ResourceTag],
        _command_buffer: Option<NativeHandle>,
    ) -> SdkResult<()> {
        for tag in tags {
            self.record(
                Call::SetTagForFrame {
                    frame_index: frame.index(),
                    viewport,
                    role: tag.role,
                    native: tag.resource.native.addr(),
                    width: tag.extent.width,
                    height: tag.extent.height,
                    lifecycle: tag.lifecycle,
                },
                EntryPoint::SetTagForFrame,
            )?;
        }
        Ok(())
    }

    fn evaluate_feature(
        &self,
        feature: Feature,
        frame: &FrameToken,
        command_buffer: NativeHandle,
    ) -> SdkResult<()> {
        self.record(
            Call::EvaluateFeature {
                feature,
                frame_index: frame.index(),
                command_buffer: command_buffer.addr(),
            },
            EntryPoint::EvaluateFeature,
        )
    }

    fn feature_interface(&self, feature: Feature) -> Option<FeatureInterface> {
        if self.state.lock().omitted.contains(&feature) {
            return None;
        }

        let this = Arc::new(self.clone());
        match feature {
            Feature::REFLEX => Some(FeatureInterface::Reflex(this)),
            Feature::PCL => Some(FeatureInterface::Pcl(this)),
            Feature::DLSS => Some(FeatureInterface::Dlss(this)),
            Feature::DLSS_G => Some(FeatureInterface::FrameGeneration(this)),
            _ => None,
        }
    }
}

impl ReflexFunctions for MockStreamline {
    fn set_options(&self, options: &ReflexOptions) -> SdkResult<()> {
        self.record(Call::ReflexSetOptions(options.mode), EntryPoint::ReflexSetOptions)
    }

    fn get_state(&self) -> SdkResult<ReflexState> {
        self.record(Call::ReflexGetState, EntryPoint::ReflexGetState)?;
        Ok(self.state.lock().reflex_state.clone())
    }

    fn sleep(&self, frame: &FrameToken) -> SdkResult<()> {
        self.record(Call::ReflexSleep(frame.index()), EntryPoint::ReflexSleep)
    }
}

impl PclFunctions for MockStreamline {
    fn set_marker(&self, marker: PclMarker, frame: &FrameToken) -> SdkResult<()> {
        self.record(
            Call::PclSetMarker {
                marker: marker.raw(),
                frame_index: frame.index(),
            },
            EntryPoint::PclSetMarker,
        )
    }
}

impl DlssFunctions for MockStreamline {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssOptions) -> SdkResult<()> {
        self.record(
            Call::DlssSetOptions {
                viewport,
                options: *options,
            },
            EntryPoint::DlssSetOptions,
        )
    }

    fn get_optimal_settings(&self, options: &DlssOptions) -> SdkResult<DlssOptimalSettings> {
        self.record(
            Call::DlssGetOptimalSettings {
                mode: options.mode,
                output_width: options.output_width,
                output_height: options.output_height,
            },
            EntryPoint::DlssGetOptimalSettings,
        )?;
        Ok(self.state.lock().optimal_settings)
    }
}

impl DlssgFunctions for MockStreamline {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssgOptions) -> SdkResult<()> {
        self.record(
            Call::DlssgSetOptions {
                viewport,
                options: *options,
            },
            EntryPoint::DlssgSetOptions,
        )
    }

    fn get_state(
        &self,
        viewport: ViewportHandle,
        options: Option<&DlssgOptions>,
    ) -> SdkResult<DlssgState> {
        let request_vram_estimate = options
            .map(|options| options.flags.contains(DlssgFlags::REQUEST_VRAM_ESTIMATE))
            .unwrap_or(false);
        self.record(
            Call::DlssgGetState {
                viewport,
                request_vram_estimate,
            },
            EntryPoint::DlssgGetState,
        )?;
        Ok(self.state.lock().dlssg_state)
    }
}
