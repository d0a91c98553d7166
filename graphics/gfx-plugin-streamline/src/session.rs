//! Streamline session
//!
//! Owns everything the plugin knows between device events: the bound device,
//! the SDK capability table, per-feature support, modes, the frame counter,
//! the pending-evaluation mailbox and the last-error record. Every exported
//! operation maps onto one method here.

use core::ffi::{c_void, CStr};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use latency::{set_marker, FrameCounter, LatencyStats, ReflexContext, SleepTicket};
use streamline::{
    AdapterInfo, Capabilities, DlssFunctions, DlssMode, DlssOptimalSettings, DlssgFunctions,
    DlssgMode, DlssgState, Feature, NativeHandle, PclFunctions, PclMarker, ReflexFunctions,
    ReflexMode, ReflexState, Streamline, ViewportHandle,
};
use unity_gfx::{acquire_device, AcquiredDevice, DeviceEvent, GraphicsHost, Renderer};
use upscaling::{
    CameraConstants, ConstantsStatus, DlssContext, FrameGeneration, PendingEvaluation, Preset,
    PresetOutcome, TagRequest, EVALUATE_EVENT_ID,
};

use crate::config::{BridgeConfig, HostPaths};
use crate::error::BridgeError;
use crate::logging;

/// Last-error code when no device was bound at init time
pub const ERROR_NO_DEVICE: i32 = -999;
/// Device-bind failures are reported as `ERROR_DEVICE_BIND_BASE - code`
pub const ERROR_DEVICE_BIND_BASE: i32 = -100;

/// Render callbacks logged before throttling kicks in
const RENDER_EVENT_LOG_FIRST: u32 = 5;
const RENDER_EVENT_LOG_EVERY: u32 = 300;
const EVALUATION_LOG_EVERY: u32 = 60;

/// The first few render callbacks, then one per `RENDER_EVENT_LOG_EVERY`
fn should_log_render_event(count: u32) -> bool {
    count <= RENDER_EVENT_LOG_FIRST || count % RENDER_EVENT_LOG_EVERY == 1
}

fn should_log_evaluation(count: u32) -> bool {
    count % EVALUATION_LOG_EVERY == 1
}

/// Where the session is in the device / SDK lifecycle
pub enum Lifecycle {
    Unbound,
    DeviceBound(AcquiredDevice),
    SdkInitialized(AcquiredDevice),
}

impl Lifecycle {
    pub fn device(&self) -> Option<&AcquiredDevice> {
        match self {
            Lifecycle::Unbound => None,
            Lifecycle::DeviceBound(device) | Lifecycle::SdkInitialized(device) => Some(device),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Unbound => "Unbound",
            Lifecycle::DeviceBound(_) => "DeviceBound",
            Lifecycle::SdkInitialized(_) => "SdkInitialized",
        }
    }
}

/// Code and static message of the most recent init attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastError {
    pub code: i32,
    pub message: &'static CStr,
}

impl Default for LastError {
    fn default() -> Self {
        Self {
            code: 0,
            message: c"Not initialized yet",
        }
    }
}

/// Per-feature support as probed after the device bind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportedFeatures {
    pub reflex: bool,
    pub pcl: bool,
    pub dlss: bool,
    pub dlssg: bool,
}

impl SupportedFeatures {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::REFLEX => self.reflex,
            Feature::PCL => self.pcl,
            Feature::DLSS => self.dlss,
            Feature::DLSS_G => self.dlssg,
            _ => false,
        }
    }

    fn set(&mut self, feature: Feature, supported: bool) {
        match feature {
            Feature::REFLEX => self.reflex = supported,
            Feature::PCL => self.pcl = supported,
            Feature::DLSS => self.dlss = supported,
            Feature::DLSS_G => self.dlssg = supported,
            _ => {}
        }
    }
}

/// What a render-thread callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEventOutcome {
    /// Not the evaluation event; the mailbox was left alone
    Ignored,
    NothingPending,
    Evaluated(u32),
    /// The request for this frame was consumed but evaluation failed
    Failed(u32, BridgeError),
}

pub struct Session {
    sdk: Arc<dyn Streamline>,
    config: BridgeConfig,
    paths: HostPaths,
    lifecycle: Lifecycle,
    renderer: Renderer,
    capabilities: Capabilities,
    supported: SupportedFeatures,
    last_error: LastError,
    frames: FrameCounter,
    reflex: ReflexContext,
    dlss: DlssContext,
    frame_gen: FrameGeneration,
    pending: PendingEvaluation,
    render_events: u32,
    evaluations: u32,
}

impl Session {
    pub fn new(sdk: Arc<dyn Streamline>, config: BridgeConfig, paths: HostPaths) -> Self {
        Self {
            sdk,
            config,
            paths,
            lifecycle: Lifecycle::Unbound,
            renderer: Renderer::NULL,
            capabilities: Capabilities::default(),
            supported: SupportedFeatures::default(),
            last_error: LastError::default(),
            frames: FrameCounter::new(),
            reflex: ReflexContext::new(),
            dlss: DlssContext::new(),
            frame_gen: FrameGeneration::new(),
            pending: PendingEvaluation::new(),
            render_events: 0,
            evaluations: 0,
        }
    }

    pub fn set_config(&mut self, config: BridgeConfig) {
        self.config = config;
    }

    /// Swap the SDK backend; refused while the SDK is initialized
    pub fn set_runtime(&mut self, sdk: Arc<dyn Streamline>) -> bool {
        if self.is_initialized() {
            log::warn!("Cannot replace the Streamline runtime while it is initialized");
            return false;
        }
        self.capabilities = Capabilities::default();
        self.sdk = sdk;
        true
    }

    /// Directories searched for the SDK runtime and its plugins
    pub fn plugin_paths(&self) -> Vec<PathBuf> {
        self.config.plugin_paths(&self.paths)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        self.sdk.is_available()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::SdkInitialized(_))
    }

    pub fn last_error(&self) -> LastError {
        self.last_error
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    pub fn has_d3d12_device(&self) -> bool {
        self.lifecycle
            .device()
            .is_some_and(|device| device.renderer == Renderer::D3D12)
    }

    pub fn has_d3d11_device(&self) -> bool {
        self.lifecycle
            .device()
            .is_some_and(|device| device.renderer == Renderer::D3D11)
    }

    pub fn supported(&self) -> SupportedFeatures {
        self.supported
    }

    pub fn is_supported(&self, feature: Feature) -> bool {
        self.supported.get(feature)
    }

    fn record_error(&mut self, code: i32, message: &'static CStr) {
        self.last_error = LastError { code, message };
    }

    /// Handle a host device event
    pub fn on_device_event(&mut self, host: &dyn GraphicsHost, event: DeviceEvent) {
        log::info!("Graphics device event: {:?}", event);
        match event {
            DeviceEvent::Initialize => {
                if let Err(err) = self.bind_device(host) {
                    log::error!("Device acquisition failed: {}", err);
                    return;
                }
                if let Err(err) = self.initialize() {
                    log::error!("Streamline initialization failed: {}", err);
                }
            }
            DeviceEvent::Shutdown => self.unbind(),
            DeviceEvent::BeforeReset | DeviceEvent::AfterReset => {}
        }
    }

    /// Capture the host's device
    ///
    /// A device is never swapped under an initialized SDK.
    pub fn bind_device(&mut self, host: &dyn GraphicsHost) -> Result<(), BridgeError> {
        if self.is_initialized() {
            log::info!("Streamline already initialized, keeping bound device");
            return Ok(());
        }

        let device = acquire_device(host)?;
        self.renderer = device.renderer;
        self.lifecycle = Lifecycle::DeviceBound(device);
        Ok(())
    }

    /// Bring the SDK up on the bound device
    ///
    /// Succeeds immediately when already initialized. On failure the session
    /// stays device-bound and the last-error record says which step failed.
    pub fn initialize(&mut self) -> Result<(), BridgeError> {
        let device = match &self.lifecycle {
            Lifecycle::SdkInitialized(_) => {
                log::info!("Streamline already initialized");
                return Ok(());
            }
            Lifecycle::DeviceBound(device) => device.device,
            Lifecycle::Unbound => {
                self.record_error(ERROR_NO_DEVICE, c"No D3D device available");
                return Err(BridgeError::NoDevice);
            }
        };

        log::info!("Initializing Streamline on device {} ({})", device, self.renderer);
        let preferences = self
            .config
            .preferences(&self.paths, Some(logging::sdk_message));
        for path in &preferences.plugin_paths {
            log::debug!("Plugin path: {}", path.display());
        }

        if let Err(err) = self.sdk.init(&preferences) {
            log::error!("slInit failed: {}", err);
            self.record_error(-err.code(), err.c_name());
            return Err(BridgeError::Init(err));
        }

        if let Err(err) = self.sdk.set_d3d_device(device) {
            log::error!("slSetD3DDevice failed: {}", err);
            self.record_error(ERROR_DEVICE_BIND_BASE - err.code(), c"slSetD3DDevice failed");
            if let Err(err) = self.sdk.shutdown() {
                log::warn!("slShutdown after failed device bind: {}", err);
            }
            return Err(BridgeError::DeviceBind(err));
        }

        self.probe_features();
        self.capabilities = Capabilities::resolve(self.sdk.as_ref());
        self.frames.reset();

        self.lifecycle = match mem::replace(&mut self.lifecycle, Lifecycle::Unbound) {
            Lifecycle::DeviceBound(device) => Lifecycle::SdkInitialized(device),
            other => other,
        };
        self.record_error(0, c"Initialized successfully");
        log::info!("Streamline initialized: {:?}", self.supported);
        Ok(())
    }

    fn probe_features(&mut self) {
        let adapter = AdapterInfo::default();
        for feature in Feature::ALL {
            let supported = match self.sdk.is_feature_supported(feature, &adapter) {
                Ok(()) => true,
                Err(err) => {
                    log::info!("{} not supported: {}", feature, err);
                    false
                }
            };
            self.supported.set(feature, supported);
        }
    }

    /// Initialize if a device is bound, otherwise record why not
    pub fn try_initialize(&mut self) -> Result<(), BridgeError> {
        if self.is_initialized() {
            return Ok(());
        }
        self.initialize()
    }

    /// Initialize if a device is bound; without one, fail quietly
    ///
    /// Unlike [`Session::try_initialize`] this leaves the last-error record
    /// alone when no device is bound yet.
    pub fn initialize_if_bound(&mut self) -> Result<(), BridgeError> {
        if matches!(self.lifecycle, Lifecycle::Unbound) {
            log::info!("Initialize requested but no device available yet");
            return Err(BridgeError::NoDevice);
        }
        self.initialize()
    }

    /// Shut the SDK down and drop the device
    ///
    /// Does nothing when the SDK is not initialized.
    pub fn shutdown(&mut self) {
        if !self.is_initialized() {
            log::debug!("Shutdown skipped, Streamline not initialized");
            return;
        }

        log::info!("Shutting down Streamline");
        if let Err(err) = self.sdk.shutdown() {
            log::warn!("slShutdown failed: {}", err);
        }
        self.reset_features();
        self.lifecycle = Lifecycle::Unbound;
        self.renderer = Renderer::NULL;
    }

    /// Device went away: shut down and forget it
    pub fn unbind(&mut self) {
        self.shutdown();
        self.lifecycle = Lifecycle::Unbound;
        self.renderer = Renderer::NULL;
    }

    fn reset_features(&mut self) {
        self.capabilities = Capabilities::default();
        self.supported = SupportedFeatures::default();
        self.frames.reset();
        self.reflex.reset();
        self.dlss.reset();
        self.frame_gen.reset();
        self.pending.clear();
    }

    fn require_initialized(&self) -> Result<(), BridgeError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(BridgeError::NotInitialized)
        }
    }

    fn require_supported(&self, feature: Feature) -> Result<(), BridgeError> {
        self.require_initialized()?;
        if self.supported.get(feature) {
            Ok(())
        } else {
            Err(BridgeError::Unsupported(feature))
        }
    }

    fn reflex_functions(&self) -> Result<Arc<dyn ReflexFunctions>, BridgeError> {
        self.capabilities
            .reflex()
            .cloned()
            .ok_or(BridgeError::Unavailable(Feature::REFLEX))
    }

    fn pcl_functions(&self) -> Result<Arc<dyn PclFunctions>, BridgeError> {
        self.capabilities
            .pcl()
            .cloned()
            .ok_or(BridgeError::Unavailable(Feature::PCL))
    }

    fn dlss_functions(&self) -> Result<Arc<dyn DlssFunctions>, BridgeError> {
        self.capabilities
            .dlss()
            .cloned()
            .ok_or(BridgeError::Unavailable(Feature::DLSS))
    }

    fn dlssg_functions(&self) -> Result<Arc<dyn DlssgFunctions>, BridgeError> {
        self.capabilities
            .dlssg()
            .cloned()
            .ok_or(BridgeError::Unavailable(Feature::DLSS_G))
    }

    pub fn set_reflex_mode(&mut self, raw: i32) -> Result<ReflexMode, BridgeError> {
        self.require_supported(Feature::REFLEX)?;
        let functions = self.reflex_functions()?;
        Ok(self.reflex.set_mode(functions.as_ref(), raw)?)
    }

    pub fn reflex_mode(&self) -> ReflexMode {
        self.reflex.mode()
    }

    pub fn reflex_state(&self) -> Result<ReflexState, BridgeError> {
        self.require_initialized()?;
        let functions = self.reflex_functions()?;
        Ok(ReflexContext::state(functions.as_ref())?)
    }

    /// Advance the frame counter shared by all features
    pub fn begin_frame(&mut self) -> Result<u64, BridgeError> {
        self.require_initialized()?;
        Ok(self.frames.begin_frame())
    }

    pub fn frame_id(&self) -> u64 {
        self.frames.current()
    }

    /// Get the frame token for the pacing sleep
    ///
    /// The returned ticket sleeps without borrowing the session, so callers
    /// can release their lock first.
    pub fn prepare_sleep(&self) -> Result<SleepTicket, BridgeError> {
        self.require_initialized()?;
        let functions = self.reflex_functions()?;
        Ok(SleepTicket::prepare(
            self.sdk.as_ref(),
            functions,
            &self.frames,
        )?)
    }

    pub fn set_marker(&self, raw: i32) -> Result<PclMarker, BridgeError> {
        self.require_initialized()?;
        let pcl = self.pcl_functions()?;
        Ok(set_marker(
            self.sdk.as_ref(),
            pcl.as_ref(),
            raw,
            &self.frames,
        )?)
    }

    pub fn mark(&self, marker: PclMarker) -> Result<PclMarker, BridgeError> {
        self.set_marker(marker.raw() as i32)
    }

    pub fn latency_stats(&self) -> Result<LatencyStats, BridgeError> {
        self.require_initialized()?;
        let functions = self.reflex_functions()?;
        Ok(ReflexContext::latency_stats(functions.as_ref())?)
    }

    pub fn set_viewport(&mut self, id: u32) {
        self.dlss.set_viewport(id);
    }

    pub fn viewport(&self) -> ViewportHandle {
        self.dlss.viewport()
    }

    pub fn set_dlss_options(
        &mut self,
        raw_mode: i32,
        output_width: u32,
        output_height: u32,
        color_buffers_hdr: bool,
    ) -> Result<DlssMode, BridgeError> {
        self.require_supported(Feature::DLSS)?;
        let functions = self.dlss_functions()?;
        Ok(self.dlss.set_options(
            functions.as_ref(),
            raw_mode,
            output_width,
            output_height,
            color_buffers_hdr,
        )?)
    }

    /// Change the upscaling mode only, keeping the output size
    pub fn set_dlss_mode(&mut self, raw_mode: i32) -> Result<DlssMode, BridgeError> {
        self.require_supported(Feature::DLSS)?;
        let functions = self.dlss_functions()?;
        Ok(self.dlss.set_mode(functions.as_ref(), raw_mode)?)
    }

    pub fn dlss_mode(&self) -> DlssMode {
        self.dlss.mode()
    }

    pub fn optimal_settings(
        &self,
        raw_mode: i32,
        output_width: u32,
        output_height: u32,
    ) -> Result<DlssOptimalSettings, BridgeError> {
        self.require_supported(Feature::DLSS)?;
        let functions = self.dlss_functions()?;
        Ok(DlssContext::optimal_settings(
            functions.as_ref(),
            raw_mode,
            output_width,
            output_height,
        )?)
    }

    pub fn set_constants(
        &mut self,
        camera: &CameraConstants,
    ) -> Result<ConstantsStatus, BridgeError> {
        self.require_initialized()?;
        let frame_index = self.frames.token_index();
        Ok(self
            .dlss
            .set_constants(self.sdk.as_ref(), camera, frame_index)?)
    }

    pub fn tag_resource(&self, request: &TagRequest) -> Result<(), BridgeError> {
        self.require_initialized()?;
        Ok(self
            .dlss
            .tag(self.sdk.as_ref(), request, self.frames.token_index())?)
    }

    /// Evaluate upscaling now on the caller's command list
    pub fn evaluate(&self, command_buffer: *mut c_void) -> Result<(), BridgeError> {
        self.require_supported(Feature::DLSS)?;
        let command_buffer = NativeHandle::new(command_buffer).ok_or(BridgeError::NoCommandList)?;
        Ok(DlssContext::evaluate(
            self.sdk.as_ref(),
            self.frames.token_index(),
            command_buffer,
        )?)
    }

    /// Post the current frame for evaluation on the render thread
    pub fn prepare_evaluate(&mut self) -> u32 {
        let frame_index = self.frames.token_index();
        self.pending.post(frame_index);
        log::trace!(
            "evaluation posted for frame {} (initialized={}, dlss={})",
            frame_index,
            self.is_initialized(),
            self.supported.dlss
        );
        frame_index
    }

    pub fn is_evaluation_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Render-thread callback for the deferred evaluation
    ///
    /// A matching event always consumes the pending request, whatever the
    /// outcome of the evaluation.
    pub fn on_render_event(&mut self, event_id: i32) -> RenderEventOutcome {
        self.render_events = self.render_events.wrapping_add(1);
        if should_log_render_event(self.render_events) {
            log::debug!(
                "Render callback #{}, event {:#x}",
                self.render_events,
                event_id as u32
            );
        }

        if event_id != EVALUATE_EVENT_ID {
            return RenderEventOutcome::Ignored;
        }
        let Some(frame_index) = self.pending.take() else {
            return RenderEventOutcome::NothingPending;
        };

        match self.evaluate_on_render_thread(frame_index) {
            Ok(()) => {
                self.evaluations = self.evaluations.wrapping_add(1);
                if should_log_evaluation(self.evaluations) {
                    log::info!(
                        "DLSS evaluated frame {} ({} successful)",
                        frame_index,
                        self.evaluations
                    );
                }
                RenderEventOutcome::Evaluated(frame_index)
            }
            Err(err) => {
                log::warn!("Deferred DLSS evaluation of frame {} failed: {}", frame_index, err);
                RenderEventOutcome::Failed(frame_index, err)
            }
        }
    }

    fn evaluate_on_render_thread(&self, frame_index: u32) -> Result<(), BridgeError> {
        self.require_supported(Feature::DLSS)?;
        let accessor = self
            .lifecycle
            .device()
            .and_then(|device| device.d3d12.clone())
            .ok_or(BridgeError::NoD3d12Interface)?;
        let command_list = accessor
            .command_recording_state()
            .ok_or(BridgeError::NoCommandList)?;

        Ok(DlssContext::evaluate(
            self.sdk.as_ref(),
            frame_index,
            command_list,
        )?)
    }

    pub fn set_frame_gen_options(
        &mut self,
        raw_mode: i32,
        num_frames_to_generate: u32,
        color_size: (u32, u32),
        mvec_depth_size: (u32, u32),
    ) -> Result<DlssgMode, BridgeError> {
        self.require_supported(Feature::DLSS_G)?;
        let functions = self.dlssg_functions()?;
        Ok(self.frame_gen.set_options(
            functions.as_ref(),
            self.dlss.viewport(),
            raw_mode,
            num_frames_to_generate,
            color_size,
            mvec_depth_size,
        )?)
    }

    /// Change frame generation mode and count, keeping buffer sizes
    pub fn set_frame_gen_mode(
        &mut self,
        raw_mode: i32,
        num_frames_to_generate: i32,
    ) -> Result<DlssgMode, BridgeError> {
        self.require_supported(Feature::DLSS_G)?;
        let functions = self.dlssg_functions()?;
        Ok(self.frame_gen.set_mode(
            functions.as_ref(),
            self.dlss.viewport(),
            raw_mode,
            num_frames_to_generate,
        )?)
    }

    pub fn frame_gen_mode(&self) -> DlssgMode {
        self.frame_gen.mode()
    }

    pub fn num_frames_to_generate(&self) -> u32 {
        self.frame_gen.num_frames_to_generate()
    }

    /// Frame generation state; a VRAM estimate also needs DLSS-G support
    pub fn frame_gen_state(&self, request_vram_estimate: bool) -> Result<DlssgState, BridgeError> {
        self.require_initialized()?;
        if request_vram_estimate {
            self.require_supported(Feature::DLSS_G)?;
        }
        let functions = self.dlssg_functions()?;
        Ok(FrameGeneration::state(
            functions.as_ref(),
            self.dlss.viewport(),
            request_vram_estimate,
        )?)
    }

    pub fn tag_hudless_color(&self, request: TagRequest) -> Result<(), BridgeError> {
        self.require_initialized()?;
        Ok(FrameGeneration::tag_hudless_color(
            self.sdk.as_ref(),
            self.dlss.viewport(),
            request,
            self.frames.token_index(),
        )?)
    }

    pub fn tag_ui_color_and_alpha(&self, request: TagRequest) -> Result<(), BridgeError> {
        self.require_initialized()?;
        Ok(FrameGeneration::tag_ui_color_and_alpha(
            self.sdk.as_ref(),
            self.dlss.viewport(),
            request,
            self.frames.token_index(),
        )?)
    }

    /// Upscaling mode, then frame generation
    ///
    /// Fails only when the upscaling step fails.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<PresetOutcome<BridgeError>, BridgeError> {
        log::info!("Applying preset {:?}", preset);
        self.set_dlss_mode(preset.dlss_mode() as i32)?;

        let (mode, frames) = preset.frame_generation();
        let frame_gen = self.set_frame_gen_mode(mode as i32, frames as i32);
        Ok(PresetOutcome::from_frame_generation(frame_gen))
    }

    /// Frame generation off, then upscaling off; both are always attempted
    pub fn disable_upscaling(&mut self) -> Result<(), BridgeError> {
        log::info!("Disabling DLSS and Frame Gen");
        let frame_gen = self.set_frame_gen_mode(DlssgMode::Off as i32, 0);
        let dlss = self.set_dlss_mode(DlssMode::Off as i32);
        frame_gen?;
        dlss?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};
    use streamline::SdkError;
    use unity_gfx::mock::MockHost;

    fn session(sdk: &MockStreamline) -> Session {
        Session::new(
            Arc::new(sdk.clone()),
            BridgeConfig::default(),
            HostPaths::default(),
        )
    }

    fn initialized(sdk: &MockStreamline, host: &MockHost) -> Session {
        let mut session = session(sdk);
        session.on_device_event(host, DeviceEvent::Initialize);
        assert!(session.is_initialized());
        sdk.clear_calls();
        session
    }

    #[test]
    fn test_initial_state() {
        let sdk = MockStreamline::new();
        let session = session(&sdk);
        assert_eq!(session.lifecycle().name(), "Unbound");
        assert_eq!(session.last_error(), LastError::default());
        assert_eq!(session.last_error().message, c"Not initialized yet");
        assert_eq!(session.renderer(), Renderer::NULL);
    }

    #[test]
    fn test_runtime_swap_refused_while_initialized() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d11(0xd11);
        let mut session = initialized(&sdk, &host);

        let replacement = MockStreamline::new();
        assert!(!session.set_runtime(Arc::new(replacement.clone())));

        session.shutdown();
        assert!(session.set_runtime(Arc::new(replacement.clone())));
        session.on_device_event(&host, DeviceEvent::Initialize);
        assert!(session.is_initialized());
        assert_eq!(replacement.count(|call| matches!(call, Call::Init { .. })), 1);
    }

    #[test]
    fn test_initialize_without_device() {
        let sdk = MockStreamline::new();
        let mut session = session(&sdk);

        assert_eq!(session.try_initialize(), Err(BridgeError::NoDevice));
        assert_eq!(session.last_error().code, ERROR_NO_DEVICE);
        assert_eq!(session.last_error().message, c"No D3D device available");
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_initialize_if_bound_keeps_last_error() {
        let sdk = MockStreamline::new();
        let mut session = session(&sdk);

        assert_eq!(session.initialize_if_bound(), Err(BridgeError::NoDevice));
        assert_eq!(session.last_error(), LastError::default());

        let host = MockHost::d3d11(0xd11);
        session.bind_device(&host).unwrap();
        assert_eq!(session.initialize_if_bound(), Ok(()));
        assert!(session.has_d3d11_device());
    }

    #[test]
    fn test_device_event_initializes() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = session(&sdk);

        session.on_device_event(&host, DeviceEvent::Initialize);

        assert!(session.is_initialized());
        assert!(session.has_d3d12_device());
        assert!(!session.has_d3d11_device());
        assert_eq!(session.renderer(), Renderer::D3D12);
        assert_eq!(session.last_error().code, 0);
        assert_eq!(session.last_error().message, c"Initialized successfully");
        assert_eq!(session.supported(), SupportedFeatures {
            reflex: true,
            pcl: true,
            dlss: true,
            dlssg: true,
        });

        let calls = sdk.calls();
        assert!(matches!(calls[0], Call::Init { application_id: 0x0E65_8700, .. }));
        assert_eq!(calls[1], Call::SetD3dDevice(0xd12));
    }

    #[test]
    fn test_init_failure_records_negated_code() {
        let sdk = MockStreamline::new();
        sdk.fail(EntryPoint::Init, SdkError::DRIVER_OUT_OF_DATE);
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = session(&sdk);

        session.on_device_event(&host, DeviceEvent::Initialize);

        assert!(!session.is_initialized());
        assert_eq!(session.lifecycle().name(), "DeviceBound");
        assert_eq!(session.last_error().code, -2);
        assert_eq!(session.last_error().message, c"eErrorDriverOutOfDate");
    }

    #[test]
    fn test_device_bind_failure_tears_sdk_down() {
        let sdk = MockStreamline::new();
        sdk.fail(EntryPoint::SetD3dDevice, SdkError::ADAPTER_NOT_SUPPORTED);
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = session(&sdk);

        session.on_device_event(&host, DeviceEvent::Initialize);

        assert!(!session.is_initialized());
        assert_eq!(session.last_error().code, -107);
        assert_eq!(session.last_error().message, c"slSetD3DDevice failed");
        assert_eq!(sdk.calls().last(), Some(&Call::Shutdown));

        // Retry once the SDK accepts the device
        sdk.succeed(EntryPoint::SetD3dDevice);
        assert_eq!(session.try_initialize(), Ok(()));
        assert!(session.is_initialized());
    }

    #[test]
    fn test_unsupported_feature_is_not_fatal() {
        let sdk = MockStreamline::new();
        sdk.mark_unsupported(Feature::DLSS_G);
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        assert!(session.is_supported(Feature::DLSS));
        assert!(!session.is_supported(Feature::DLSS_G));
        assert_eq!(
            session.set_frame_gen_mode(1, 1),
            Err(BridgeError::Unsupported(Feature::DLSS_G))
        );
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        assert_eq!(session.initialize(), Ok(()));
        session.on_device_event(&host, DeviceEvent::Initialize);
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_device_shutdown_event_unbinds() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);
        session.set_reflex_mode(1).unwrap();

        session.on_device_event(&host, DeviceEvent::Shutdown);

        assert_eq!(session.lifecycle().name(), "Unbound");
        assert_eq!(session.renderer(), Renderer::NULL);
        assert!(!session.has_d3d12_device());
        assert_eq!(session.reflex_mode(), ReflexMode::Off);
        assert_eq!(session.supported(), SupportedFeatures::default());
        assert_eq!(sdk.count(|call| *call == Call::Shutdown), 1);
    }

    #[test]
    fn test_failed_rebind_keeps_bound_device() {
        let sdk = MockStreamline::new();
        sdk.fail(EntryPoint::Init, SdkError::DRIVER_OUT_OF_DATE);
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = session(&sdk);
        session.on_device_event(&host, DeviceEvent::Initialize);
        assert_eq!(session.lifecycle().name(), "DeviceBound");

        // Renderer now reports D3D11 but exposes no D3D11 device
        host.set_renderer(Renderer::D3D11);
        assert!(session.bind_device(&host).is_err());

        assert_eq!(session.lifecycle().name(), "DeviceBound");
        assert!(session.has_d3d12_device());
        assert_eq!(session.renderer(), Renderer::D3D12);
    }

    #[test]
    fn test_render_event_log_throttling() {
        assert!(should_log_render_event(1));
        assert!(should_log_render_event(5));
        assert!(!should_log_render_event(6));
        assert!(!should_log_render_event(300));
        assert!(should_log_render_event(301));
        assert!(!should_log_render_event(302));
        assert!(should_log_render_event(601));

        assert!(should_log_evaluation(1));
        assert!(!should_log_evaluation(2));
        assert!(!should_log_evaluation(60));
        assert!(should_log_evaluation(61));
        assert!(should_log_evaluation(121));
    }

    #[test]
    fn test_reset_events_are_ignored() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        session.on_device_event(&host, DeviceEvent::BeforeReset);
        session.on_device_event(&host, DeviceEvent::AfterReset);
        assert!(session.is_initialized());
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_reflex_mode_gating() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        assert_eq!(session.set_reflex_mode(2), Ok(ReflexMode::LowLatencyWithBoost));
        assert!(matches!(
            session.set_reflex_mode(3),
            Err(BridgeError::Latency(latency::LatencyError::InvalidMode(3)))
        ));
        assert_eq!(session.reflex_mode(), ReflexMode::LowLatencyWithBoost);
        assert_eq!(sdk.count(|call| matches!(call, Call::ReflexSetOptions(_))), 1);
    }

    #[test]
    fn test_missing_interface_is_unavailable() {
        let sdk = MockStreamline::new();
        sdk.omit_interface(Feature::PCL);
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let session = initialized(&sdk, &host);

        assert_eq!(
            session.mark(PclMarker::PRESENT_START),
            Err(BridgeError::Unavailable(Feature::PCL))
        );
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_markers_use_current_frame() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        session.begin_frame().unwrap();
        session.begin_frame().unwrap();
        session.mark(PclMarker::PRESENT_END).unwrap();

        assert_eq!(
            sdk.calls(),
            vec![
                Call::GetNewFrameToken(2),
                Call::PclSetMarker {
                    marker: 5,
                    frame_index: 2
                },
            ]
        );
    }

    #[test]
    fn test_sleep_ticket() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        session.begin_frame().unwrap();
        let ticket = session.prepare_sleep().unwrap();
        ticket.sleep().unwrap();
        assert_eq!(sdk.calls().last(), Some(&Call::ReflexSleep(1)));
    }

    #[test]
    fn test_dlss_options_and_optimal_settings() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        session.set_viewport(2);
        assert_eq!(session.set_dlss_options(2, 3840, 2160, true), Ok(DlssMode::Balanced));
        assert_eq!(session.dlss_mode(), DlssMode::Balanced);

        let settings = session.optimal_settings(2, 3840, 2160).unwrap();
        assert_eq!(settings.optimal_render_width, 1280);
        assert!(matches!(
            sdk.calls()[0],
            Call::DlssSetOptions {
                viewport: ViewportHandle(2),
                ..
            }
        ));
    }

    #[test]
    fn test_constants_without_token_succeed() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);
        sdk.fail(EntryPoint::GetNewFrameToken, SdkError::INVALID_STATE);

        assert_eq!(
            session.set_constants(&CameraConstants::default()),
            Ok(ConstantsStatus::StoredOnly)
        );

        sdk.succeed(EntryPoint::GetNewFrameToken);
        sdk.fail(EntryPoint::SetConstants, SdkError::MISSING_CONSTANTS);
        assert!(session.set_constants(&CameraConstants::default()).is_err());
    }

    #[test]
    fn test_immediate_evaluate_needs_command_buffer() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let session = initialized(&sdk, &host);

        assert_eq!(
            session.evaluate(core::ptr::null_mut()),
            Err(BridgeError::NoCommandList)
        );
        session.evaluate(0xc0de as *mut c_void).unwrap();
        assert_eq!(
            sdk.calls().last(),
            Some(&Call::EvaluateFeature {
                feature: Feature::DLSS,
                frame_index: 0,
                command_buffer: 0xc0de
            })
        );
    }

    #[test]
    fn test_render_event_evaluates_on_recording_list() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        host.set_command_list(Some(0xc0de));
        let mut session = initialized(&sdk, &host);

        session.begin_frame().unwrap();
        assert_eq!(session.prepare_evaluate(), 1);
        assert_eq!(
            session.on_render_event(EVALUATE_EVENT_ID),
            RenderEventOutcome::Evaluated(1)
        );
        assert!(!session.is_evaluation_pending());
        assert_eq!(
            sdk.calls().last(),
            Some(&Call::EvaluateFeature {
                feature: Feature::DLSS,
                frame_index: 1,
                command_buffer: 0xc0de
            })
        );
    }

    #[test]
    fn test_render_event_without_recording_list() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        session.prepare_evaluate();
        assert_eq!(
            session.on_render_event(EVALUATE_EVENT_ID),
            RenderEventOutcome::Failed(0, BridgeError::NoCommandList)
        );
        assert!(!session.is_evaluation_pending());
    }

    #[test]
    fn test_render_event_on_d3d11() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d11(0xd11);
        let mut session = initialized(&sdk, &host);

        session.prepare_evaluate();
        assert_eq!(
            session.on_render_event(EVALUATE_EVENT_ID),
            RenderEventOutcome::Failed(0, BridgeError::NoD3d12Interface)
        );
    }

    #[test]
    fn test_frame_gen_state_forms() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let session = initialized(&sdk, &host);

        session.frame_gen_state(false).unwrap();
        let state = session.frame_gen_state(true).unwrap();
        assert_eq!(state.estimated_vram_usage_bytes, 256 << 20);

        assert_eq!(
            sdk.calls(),
            vec![
                Call::DlssgGetState {
                    viewport: ViewportHandle(0),
                    request_vram_estimate: false
                },
                Call::DlssgGetState {
                    viewport: ViewportHandle(0),
                    request_vram_estimate: true
                },
            ]
        );
    }

    #[test]
    fn test_frame_gen_tags_use_fixed_roles() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let session = initialized(&sdk, &host);
        let request = TagRequest {
            native: 0x7e5 as *mut c_void,
            role: streamline::BufferType::DEPTH,
            width: 1920,
            height: 1080,
            native_format: 28,
            state: 0,
        };

        session.tag_hudless_color(request).unwrap();
        session.tag_ui_color_and_alpha(request).unwrap();

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
            vec![
                streamline::BufferType::HUD_LESS_COLOR,
                streamline::BufferType::UI_COLOR_AND_ALPHA
            ]
        );
    }

    #[test]
    fn test_performance_preset() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);

        let outcome = session.apply_preset(Preset::PerformanceWithFrameGen3x).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(session.dlss_mode(), DlssMode::MaxPerformance);
        assert_eq!(session.frame_gen_mode(), DlssgMode::On);
        assert_eq!(session.num_frames_to_generate(), 2);
    }

    #[test]
    fn test_disable_attempts_both() {
        let sdk = MockStreamline::new();
        let host = MockHost::d3d12(0xd12, 0x0ae0);
        let mut session = initialized(&sdk, &host);
        session.apply_preset(Preset::QualityWithFrameGen2x).unwrap();
        sdk.fail(EntryPoint::DlssgSetOptions, SdkError::INVALID_STATE);
        sdk.clear_calls();

        assert!(session.disable_upscaling().is_err());
        assert_eq!(session.dlss_mode(), DlssMode::Off);
        assert_eq!(session.frame_gen_mode(), DlssgMode::On);
        assert_eq!(sdk.count(|call| matches!(call, Call::DlssSetOptions { .. })), 1);
    }
}
