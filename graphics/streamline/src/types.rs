//! Value types exchanged with the SDK

use core::ffi::c_void;
use core::fmt;
use core::ptr::NonNull;
use std::path::PathBuf;

use bitflags::bitflags;

/// Non-null native pointer owned by the host or by the SDK
///
/// The bridge never dereferences these; it only passes them through.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonNull<c_void>);

// Handles are opaque addresses; ownership stays with the host / SDK.
unsafe impl Send for NativeHandle {}
unsafe impl Sync for NativeHandle {}

impl NativeHandle {
    /// Wrap a raw pointer, `None` if null
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Wrap an address, `None` if zero
    pub fn from_addr(addr: usize) -> Option<Self> {
        Self::new(addr as *mut c_void)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

/// SDK-issued handle for one logical frame
///
/// Borrowed per call; the SDK owns the storage behind `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    raw: NativeHandle,
    index: u32,
}

impl FrameToken {
    pub fn new(raw: NativeHandle, index: u32) -> Self {
        Self { raw, index }
    }

    pub fn raw(&self) -> NativeHandle {
        self.raw
    }

    /// Frame index the token was requested for
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Identifies an independent upscaling output target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewportHandle(pub u32);

/// SDK feature identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feature(pub u32);

impl Feature {
    pub const DLSS: Self = Self(0);
    pub const REFLEX: Self = Self(3);
    pub const PCL: Self = Self(4);
    pub const DLSS_G: Self = Self(1000);

    /// Features requested at init, in load order
    pub const ALL: [Feature; 4] = [Self::REFLEX, Self::PCL, Self::DLSS, Self::DLSS_G];

    pub fn name(&self) -> &'static str {
        match *self {
            Self::DLSS => "DLSS",
            Self::REFLEX => "Reflex",
            Self::PCL => "PCL",
            Self::DLSS_G => "DLSS-G",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic role of a tagged buffer
///
/// The host passes raw role codes; unknown codes are forwarded verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferType(pub u32);

impl BufferType {
    pub const DEPTH: Self = Self(0);
    pub const MOTION_VECTORS: Self = Self(1);
    pub const HUD_LESS_COLOR: Self = Self(2);
    pub const SCALING_INPUT_COLOR: Self = Self(3);
    pub const SCALING_OUTPUT_COLOR: Self = Self(4);
    pub const UI_COLOR_AND_ALPHA: Self = Self(19);
}

/// How long a tag stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLifecycle {
    OnlyValidNow,
    ValidUntilPresent,
    ValidUntilEvaluate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Tex2d,
    Buffer,
}

/// Native GPU resource description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceType,
    pub native: NativeHandle,
    pub width: u32,
    pub height: u32,
    /// DXGI format code
    pub native_format: u32,
    /// D3D12 resource state bits
    pub state: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Binds a resource to a buffer role for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTag {
    pub role: BufferType,
    pub resource: Resource,
    pub extent: Extent,
    pub lifecycle: ResourceLifecycle,
}

/// Low-latency mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReflexMode {
    #[default]
    Off = 0,
    LowLatency = 1,
    LowLatencyWithBoost = 2,
}

impl ReflexMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::LowLatency),
            2 => Some(Self::LowLatencyWithBoost),
            _ => None,
        }
    }
}

/// Upscaling quality mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DlssMode {
    #[default]
    Off = 0,
    MaxPerformance = 1,
    Balanced = 2,
    MaxQuality = 3,
    UltraPerformance = 4,
    UltraQuality = 5,
    Dlaa = 6,
}

impl DlssMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::MaxPerformance),
            2 => Some(Self::Balanced),
            3 => Some(Self::MaxQuality),
            4 => Some(Self::UltraPerformance),
            5 => Some(Self::UltraQuality),
            6 => Some(Self::Dlaa),
            _ => None,
        }
    }
}

/// Frame-generation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DlssgMode {
    #[default]
    Off = 0,
    On = 1,
    Auto = 2,
}

impl DlssgMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Auto),
            _ => None,
        }
    }
}

/// PC-latency marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PclMarker(u32);

impl PclMarker {
    pub const SIMULATION_START: Self = Self(0);
    pub const SIMULATION_END: Self = Self(1);
    pub const RENDER_SUBMIT_START: Self = Self(2);
    pub const RENDER_SUBMIT_END: Self = Self(3);
    pub const PRESENT_START: Self = Self(4);
    pub const PRESENT_END: Self = Self(5);
    pub const TRIGGER_FLASH: Self = Self(7);
    pub const PC_LATENCY_PING: Self = Self(8);
    pub const OUT_OF_BAND_RENDER_SUBMIT_START: Self = Self(9);
    pub const OUT_OF_BAND_RENDER_SUBMIT_END: Self = Self(10);
    pub const OUT_OF_BAND_PRESENT_START: Self = Self(11);
    pub const OUT_OF_BAND_PRESENT_END: Self = Self(12);
    pub const CONTROLLER_INPUT_SAMPLE: Self = Self(13);

    /// One past the last marker the SDK accepts
    pub const MAXIMUM: u32 = 14;

    /// Accepts raw markers in `[0, MAXIMUM)`
    pub fn new(raw: i32) -> Option<Self> {
        u32::try_from(raw)
            .ok()
            .filter(|&value| value < Self::MAXIMUM)
            .map(Self)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Default,
    #[default]
    Verbose,
}

/// Severity of a message emitted by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Info,
    Warn,
    Error,
}

/// Receives messages emitted by the SDK
pub type LogSink = fn(LogType, &str);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderApi {
    D3D11,
    #[default]
    D3D12,
    Vulkan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineType {
    Custom,
    Unreal,
    #[default]
    Unity,
}

bitflags! {
    /// SDK initialization flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PreferenceFlags: u64 {
        const DISABLE_CL_STATE_TRACKING = 1 << 0;
        const DISABLE_DEBUG_TEXT = 1 << 1;
        const USE_MANUAL_HOOKING = 1 << 2;
        const ALLOW_OTA = 1 << 3;
        const LOAD_DOWNLOADED_PLUGINS = 1 << 4;
        const USE_DXGI_FACTORY_PROXY = 1 << 5;
    }
}

bitflags! {
    /// Frame-generation option flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DlssgFlags: u32 {
        const SHOW_ONLY_INTERPOLATED_FRAME = 1 << 0;
        const DYNAMIC_RESOLUTION_ENABLED = 1 << 1;
        const REQUEST_VRAM_ESTIMATE = 1 << 2;
        const RETAIN_RESOURCES_WHEN_OFF = 1 << 3;
        const ENABLE_FULLSCREEN_MENU_DETECTION = 1 << 4;
    }
}

/// SDK initialization preferences
#[derive(Debug, Clone)]
pub struct Preferences {
    pub show_console: bool,
    pub log_level: LogLevel,
    pub log_sink: Option<LogSink>,
    pub flags: PreferenceFlags,
    pub render_api: RenderApi,
    pub application_id: u32,
    pub engine: EngineType,
    pub engine_version: String,
    pub plugin_paths: Vec<PathBuf>,
    pub features: Vec<Feature>,
}

/// Adapter filter for support queries; empty means the bound device
#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    pub luid: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReflexOptions {
    pub mode: ReflexMode,
    pub frame_limit_us: u32,
}

/// Number of per-frame reports in the SDK's latency ring
pub const FRAME_REPORT_COUNT: usize = 64;

/// Per-frame timing report, microsecond timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_id: u64,
    pub input_sample_time: u64,
    pub sim_start_time: u64,
    pub sim_end_time: u64,
    pub render_submit_start_time: u64,
    pub render_submit_end_time: u64,
    pub present_start_time: u64,
    pub present_end_time: u64,
    pub driver_start_time: u64,
    pub driver_end_time: u64,
    pub os_render_queue_start_time: u64,
    pub os_render_queue_end_time: u64,
    pub gpu_render_start_time: u64,
    pub gpu_render_end_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflexState {
    pub low_latency_available: bool,
    pub latency_report_available: bool,
    pub flash_indicator_driver_controlled: bool,
    pub frame_reports: Vec<FrameReport>,
}

/// Row-major 4x4 matrix
pub type Float4x4 = [f32; 16];

/// Per-frame camera constants
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constants {
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
    pub motion_vectors_3d: bool,
    pub reset: bool,
    pub orthographic_projection: bool,
    pub motion_vectors_dilated: bool,
    pub motion_vectors_jittered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DlssOptions {
    pub mode: DlssMode,
    pub output_width: u32,
    pub output_height: u32,
    pub color_buffers_hdr: bool,
    pub pre_exposure: f32,
    pub exposure_scale: f32,
}

impl Default for DlssOptions {
    fn default() -> Self {
        Self {
            mode: DlssMode::Off,
            output_width: 0,
            output_height: 0,
            color_buffers_hdr: false,
            pre_exposure: 1.0,
            exposure_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DlssOptimalSettings {
    pub optimal_render_width: u32,
    pub optimal_render_height: u32,
    pub optimal_sharpness: f32,
    pub render_width_min: u32,
    pub render_height_min: u32,
    pub render_width_max: u32,
    pub render_height_max: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DlssgOptions {
    pub mode: DlssgMode,
    pub num_frames_to_generate: u32,
    pub color_width: u32,
    pub color_height: u32,
    pub mvec_depth_width: u32,
    pub mvec_depth_height: u32,
    pub flags: DlssgFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DlssgState {
    pub estimated_vram_usage_bytes: u64,
    pub status: u32,
    pub min_width_or_height: u32,
    pub num_frames_actually_presented: u32,
    pub num_frames_to_generate_max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_range() {
        assert_eq!(PclMarker::new(0), Some(PclMarker::SIMULATION_START));
        assert_eq!(PclMarker::new(7), Some(PclMarker::TRIGGER_FLASH));
        assert_eq!(PclMarker::new(13), Some(PclMarker::CONTROLLER_INPUT_SAMPLE));
        assert_eq!(PclMarker::new(-1), None);
        assert_eq!(PclMarker::new(PclMarker::MAXIMUM as i32), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(ReflexMode::from_raw(2), Some(ReflexMode::LowLatencyWithBoost));
        assert_eq!(ReflexMode::from_raw(3), None);
        assert_eq!(DlssMode::from_raw(6), Some(DlssMode::Dlaa));
        assert_eq!(DlssMode::from_raw(-1), None);
        assert_eq!(DlssgMode::from_raw(2), Some(DlssgMode::Auto));
    }

    #[test]
    fn test_null_handle_rejected() {
        assert!(NativeHandle::new(core::ptr::null_mut()).is_none());
        let handle = NativeHandle::from_addr(0x1000).unwrap();
        assert_eq!(handle.addr(), 0x1000);
        assert_eq!(format!("{}", handle), "0x1000");
    }
}
