//! Raw C mirrors of the Streamline SDK structures and entry points
//!
//! Matches the SDK 2.x headers (`sl.h`, `sl_consts.h`, `sl_core_types.h`,
//! `sl_reflex.h`, `sl_pcl.h`, `sl_dlss.h`, `sl_dlss_g.h`). Every chained
//! structure starts with a [`BaseStructure`] header and is declared at struct
//! version 1; trailing members of later versions are present but the SDK only
//! reads the prefix the declared version covers.
//!
//! The conversions at the bottom of this file turn the crate's value types
//! into their C form. Pointers inside the produced structures borrow from the
//! caller's storage and must outlive the SDK call they are passed to.

#![allow(dead_code)]

use core::ffi::{c_char, c_void};
use core::ptr;

use crate::types::{
    Constants, DlssOptimalSettings, DlssOptions, DlssgOptions, DlssgState, FrameReport,
    LogLevel, LogType, ReflexOptions, ReflexState, Resource, ResourceLifecycle, ResourceTag, ResourceType,
    ViewportHandle as Viewport,
};

/// SDK version passed to `slInit`: 2.4.0 with the SDK's magic tag
pub const SDK_VERSION: u64 = (2 << 48) | (4 << 32) | (0 << 16) | 0xfedc;

pub const STRUCT_VERSION_1: usize = 1;

pub const INVALID_UINT: u32 = u32::MAX;
pub const INVALID_FLOAT: f32 = f32::MAX;

/// Number of entries in `ReflexState::frame_report`
pub const REFLEX_FRAME_REPORT_COUNT: usize = 64;

/// `sl::Result`
pub type SlResult = i32;

/// GUID-shaped structure type tag
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructType {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl StructType {
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

/// Header shared by every chained SDK structure
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BaseStructure {
    pub next: *mut BaseStructure,
    pub struct_type: StructType,
    pub struct_version: usize,
}

impl BaseStructure {
    pub const fn new(struct_type: StructType) -> Self {
        Self {
            next: ptr::null_mut(),
            struct_type,
            struct_version: STRUCT_VERSION_1,
        }
    }
}

pub const PREFERENCES_TYPE: StructType = StructType::new(
    0x1ca1_0965,
    0xbf8e,
    0x432b,
    [0x8d, 0xa1, 0x67, 0x16, 0xd8, 0x79, 0xfb, 0x14],
);
pub const ADAPTER_INFO_TYPE: StructType = StructType::new(
    0x0677_315f,
    0xa746,
    0x4492,
    [0x9f, 0x42, 0xcb, 0x61, 0x42, 0xc9, 0xc3, 0xd4],
);
pub const VIEWPORT_HANDLE_TYPE: StructType = StructType::new(
    0x171b_6435,
    0x9b3c,
    0x4fc8,
    [0x99, 0x94, 0xfb, 0xe5, 0x25, 0x69, 0xaa, 0xa4],
);
pub const RESOURCE_TYPE: StructType = StructType::new(
    0x3a9d_70cf,
    0x2418,
    0x4b72,
    [0x83, 0x91, 0x13, 0xf8, 0x72, 0x1c, 0x72, 0x61],
);
pub const RESOURCE_TAG_TYPE: StructType = StructType::new(
    0x4c6a_5aad,
    0xb445,
    0x496c,
    [0x87, 0xff, 0x1a, 0xf3, 0x84, 0x5b, 0xe6, 0x53],
);
pub const CONSTANTS_TYPE: StructType = StructType::new(
    0xdcd3_5ad7,
    0x4e4a,
    0x4bad,
    [0xa9, 0x0c, 0xe0, 0xc4, 0x9e, 0xb2, 0x3a, 0xfe],
);
pub const REFLEX_OPTIONS_TYPE: StructType = StructType::new(
    0xf03a_f81a,
    0x6d0b,
    0x4902,
    [0xa6, 0x51, 0xe4, 0x96, 0x5e, 0x21, 0x05, 0x4a],
);
pub const REFLEX_STATE_TYPE: StructType = StructType::new(
    0xf0bb_5985,
    0xdab9,
    0x4f0b,
    [0x89, 0x6e, 0x25, 0x75, 0x6b, 0x29, 0x45, 0x56],
);
pub const DLSS_OPTIONS_TYPE: StructType = StructType::new(
    0x6ac8_26e4,
    0x4c61,
    0x4101,
    [0xa9, 0x2d, 0x63, 0x8d, 0x42, 0x10, 0x57, 0xb8],
);
pub const DLSS_OPTIMAL_SETTINGS_TYPE: StructType = StructType::new(
    0xef1d_0957,
    0xfd58,
    0x4df7,
    [0xb5, 0x04, 0x8b, 0x69, 0xd8, 0xaa, 0x6b, 0x76],
);
pub const DLSSG_OPTIONS_TYPE: StructType = StructType::new(
    0xfac5_f1cb,
    0x2dfd,
    0x4f36,
    [0xa1, 0xe6, 0x3a, 0x9e, 0x86, 0x52, 0x56, 0xc5],
);
pub const DLSSG_STATE_TYPE: StructType = StructType::new(
    0xcc8a_c8e1,
    0xa179,
    0x44f5,
    [0x97, 0xfa, 0xe7, 0x41, 0x12, 0xf9, 0xbc, 0x61],
);

/// `sl::Boolean`, a one-byte tri-state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    False = 0,
    True = 1,
    Invalid = 2,
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        if value {
            Boolean::True
        } else {
            Boolean::False
        }
    }
}

/// `PFun_LogMessageCallback`
pub type LogMessageCallback = unsafe extern "C" fn(kind: u32, message: *const c_char);

#[repr(C)]
pub struct Preferences {
    pub base: BaseStructure,
    pub show_console: bool,
    pub log_level: u32,
    pub paths_to_plugins: *const *const u16,
    pub num_paths_to_plugins: u32,
    pub path_to_logs_and_data: *const u16,
    pub allocate_callback: *const c_void,
    pub release_callback: *const c_void,
    pub log_message_callback: Option<LogMessageCallback>,
    pub flags: u64,
    pub features_to_load: *const u32,
    pub num_features_to_load: u32,
    pub application_id: u32,
    pub engine: u32,
    pub engine_version: *const c_char,
    pub project_id: *const c_char,
    pub render_api: u32,
}

#[repr(C)]
pub struct AdapterInfo {
    pub base: BaseStructure,
    pub device_luid: *const u8,
    pub device_luid_size_in_bytes: u32,
    pub vk_physical_device: *mut c_void,
}

impl AdapterInfo {
    /// Filter for the adapter behind `luid`; empty means the bound device
    pub fn new(luid: &[u8]) -> Self {
        Self {
            base: BaseStructure::new(ADAPTER_INFO_TYPE),
            device_luid: if luid.is_empty() {
                ptr::null()
            } else {
                luid.as_ptr()
            },
            device_luid_size_in_bytes: luid.len() as u32,
            vk_physical_device: ptr::null_mut(),
        }
    }
}

#[repr(C)]
pub struct ViewportHandle {
    pub base: BaseStructure,
    pub value: u32,
}

impl From<Viewport> for ViewportHandle {
    fn from(viewport: Viewport) -> Self {
        Self {
            base: BaseStructure::new(VIEWPORT_HANDLE_TYPE),
            value: viewport.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
pub struct SlResource {
    pub base: BaseStructure,
    /// `sl::ResourceType`, one byte
    pub kind: u8,
    pub native: *mut c_void,
    pub memory: *mut c_void,
    pub view: *mut c_void,
    pub state: u32,
    pub width: u32,
    pub height: u32,
    pub native_format: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub gpu_virtual_address: u64,
    pub flags: u32,
    pub usage: u32,
    pub reserved: u32,
}

impl From<&Resource> for SlResource {
    fn from(resource: &Resource) -> Self {
        Self {
            base: BaseStructure::new(RESOURCE_TYPE),
            kind: match resource.kind {
                ResourceType::Tex2d => 0,
                ResourceType::Buffer => 1,
            },
            native: resource.native.as_ptr(),
            memory: ptr::null_mut(),
            view: ptr::null_mut(),
            state: resource.state,
            width: resource.width,
            height: resource.height,
            native_format: resource.native_format,
            mip_levels: 0,
            array_layers: 0,
            gpu_virtual_address: 0,
            flags: 0,
            usage: 0,
            reserved: 0,
        }
    }
}

#[repr(C)]
pub struct SlResourceTag {
    pub base: BaseStructure,
    pub resource: *mut SlResource,
    pub buffer_type: u32,
    pub lifecycle: u32,
    pub extent: Extent,
}

impl SlResourceTag {
    /// Tag pointing at `resource`, which must outlive the tag
    pub fn new(tag: &ResourceTag, resource: &mut SlResource) -> Self {
        Self {
            base: BaseStructure::new(RESOURCE_TAG_TYPE),
            resource,
            buffer_type: tag.role.0,
            lifecycle: match tag.lifecycle {
                ResourceLifecycle::OnlyValidNow => 0,
                ResourceLifecycle::ValidUntilPresent => 1,
                ResourceLifecycle::ValidUntilEvaluate => 2,
            },
            extent: Extent {
                top: tag.extent.top,
                left: tag.extent.left,
                width: tag.extent.width,
                height: tag.extent.height,
            },
        }
    }
}

pub type Float2 = [f32; 2];
pub type Float3 = [f32; 3];
pub type Float4x4 = [f32; 16];

#[repr(C)]
pub struct SlConstants {
    pub base: BaseStructure,
    pub camera_view_to_clip: Float4x4,
    pub clip_to_camera_view: Float4x4,
    pub clip_to_lens_clip: Float4x4,
    pub clip_to_prev_clip: Float4x4,
    pub prev_clip_to_clip: Float4x4,
    pub jitter_offset: Float2,
    pub mvec_scale: Float2,
    pub camera_pinhole_offset: Float2,
    pub camera_pos: Float3,
    pub camera_up: Float3,
    pub camera_right: Float3,
    pub camera_fwd: Float3,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_fov: f32,
    pub camera_aspect_ratio: f32,
    pub motion_vectors_invalid_value: f32,
    pub depth_inverted: Boolean,
    pub camera_motion_included: Boolean,
    pub motion_vectors_3d: Boolean,
    pub reset: Boolean,
    pub orthographic_projection: Boolean,
    pub motion_vectors_dilated: Boolean,
    pub motion_vectors_jittered: Boolean,
    pub min_relative_linear_depth_object_separation: f32,
}

const IDENTITY: Float4x4 = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

impl From<&Constants> for SlConstants {
    fn from(constants: &Constants) -> Self {
        Self {
            base: BaseStructure::new(CONSTANTS_TYPE),
            camera_view_to_clip: constants.camera_view_to_clip,
            clip_to_camera_view: constants.clip_to_camera_view,
            clip_to_lens_clip: IDENTITY,
            clip_to_prev_clip: constants.clip_to_prev_clip,
            prev_clip_to_clip: constants.prev_clip_to_clip,
            jitter_offset: constants.jitter_offset,
            mvec_scale: constants.mvec_scale,
            camera_pinhole_offset: [0.0; 2],
            camera_pos: [0.0; 3],
            camera_up: [0.0; 3],
            camera_right: [0.0; 3],
            camera_fwd: [0.0; 3],
            camera_near: constants.camera_near,
            camera_far: constants.camera_far,
            camera_fov: constants.camera_fov,
            camera_aspect_ratio: constants.camera_aspect_ratio,
            motion_vectors_invalid_value: INVALID_FLOAT,
            depth_inverted: constants.depth_inverted.into(),
            camera_motion_included: constants.camera_motion_included.into(),
            motion_vectors_3d: constants.motion_vectors_3d.into(),
            reset: constants.reset.into(),
            orthographic_projection: constants.orthographic_projection.into(),
            motion_vectors_dilated: constants.motion_vectors_dilated.into(),
            motion_vectors_jittered: constants.motion_vectors_jittered.into(),
            min_relative_linear_depth_object_separation: 40.0,
        }
    }
}

#[repr(C)]
pub struct SlReflexOptions {
    pub base: BaseStructure,
    pub mode: u32,
    pub frame_limit_us: u32,
    pub use_markers_to_optimize: bool,
    pub virtual_key: u16,
    pub id_thread: u32,
}

impl From<&ReflexOptions> for SlReflexOptions {
    fn from(options: &ReflexOptions) -> Self {
        Self {
            base: BaseStructure::new(REFLEX_OPTIONS_TYPE),
            mode: options.mode as u32,
            frame_limit_us: options.frame_limit_us,
            use_markers_to_optimize: false,
            virtual_key: 0,
            id_thread: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflexReport {
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
    pub gpu_active_render_time_us: u32,
    pub gpu_frame_time_us: u32,
}

impl From<&ReflexReport> for FrameReport {
    fn from(report: &ReflexReport) -> Self {
        Self {
            frame_id: report.frame_id,
            input_sample_time: report.input_sample_time,
            sim_start_time: report.sim_start_time,
            sim_end_time: report.sim_end_time,
            render_submit_start_time: report.render_submit_start_time,
            render_submit_end_time: report.render_submit_end_time,
            present_start_time: report.present_start_time,
            present_end_time: report.present_end_time,
            driver_start_time: report.driver_start_time,
            driver_end_time: report.driver_end_time,
            os_render_queue_start_time: report.os_render_queue_start_time,
            os_render_queue_end_time: report.os_render_queue_end_time,
            gpu_render_start_time: report.gpu_render_start_time,
            gpu_render_end_time: report.gpu_render_end_time,
        }
    }
}

#[repr(C)]
pub struct SlReflexState {
    pub base: BaseStructure,
    pub low_latency_available: bool,
    pub latency_report_available: bool,
    pub flash_indicator_driver_controlled: bool,
    pub frame_report: [ReflexReport; REFLEX_FRAME_REPORT_COUNT],
    pub stats_window_message: u32,
}

impl Default for SlReflexState {
    fn default() -> Self {
        Self {
            base: BaseStructure::new(REFLEX_STATE_TYPE),
            low_latency_available: false,
            latency_report_available: false,
            flash_indicator_driver_controlled: false,
            frame_report: [ReflexReport::default(); REFLEX_FRAME_REPORT_COUNT],
            stats_window_message: 0,
        }
    }
}

impl From<&SlReflexState> for ReflexState {
    fn from(state: &SlReflexState) -> Self {
        Self {
            low_latency_available: state.low_latency_available,
            latency_report_available: state.latency_report_available,
            flash_indicator_driver_controlled: state.flash_indicator_driver_controlled,
            frame_reports: state.frame_report.iter().map(FrameReport::from).collect(),
        }
    }
}

#[repr(C)]
pub struct SlDlssOptions {
    pub base: BaseStructure,
    pub mode: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub sharpness: f32,
    pub pre_exposure: f32,
    pub exposure_scale: f32,
    pub color_buffers_hdr: Boolean,
    pub indicator_invert_axis_x: Boolean,
    pub indicator_invert_axis_y: Boolean,
    pub dlaa_preset: u32,
    pub quality_preset: u32,
    pub balanced_preset: u32,
    pub performance_preset: u32,
    pub ultra_performance_preset: u32,
    pub ultra_quality_preset: u32,
    pub use_auto_exposure: Boolean,
}

impl From<&DlssOptions> for SlDlssOptions {
    fn from(options: &DlssOptions) -> Self {
        Self {
            base: BaseStructure::new(DLSS_OPTIONS_TYPE),
            mode: options.mode as u32,
            output_width: options.output_width,
            output_height: options.output_height,
            sharpness: 0.0,
            pre_exposure: options.pre_exposure,
            exposure_scale: options.exposure_scale,
            color_buffers_hdr: options.color_buffers_hdr.into(),
            indicator_invert_axis_x: Boolean::False,
            indicator_invert_axis_y: Boolean::False,
            dlaa_preset: 0,
            quality_preset: 0,
            balanced_preset: 0,
            performance_preset: 0,
            ultra_performance_preset: 0,
            ultra_quality_preset: 0,
            use_auto_exposure: Boolean::False,
        }
    }
}

#[repr(C)]
pub struct SlDlssOptimalSettings {
    pub base: BaseStructure,
    pub optimal_render_width: u32,
    pub optimal_render_height: u32,
    pub optimal_sharpness: f32,
    pub render_width_min: u32,
    pub render_height_min: u32,
    pub render_width_max: u32,
    pub render_height_max: u32,
}

impl Default for SlDlssOptimalSettings {
    fn default() -> Self {
        Self {
            base: BaseStructure::new(DLSS_OPTIMAL_SETTINGS_TYPE),
            optimal_render_width: 0,
            optimal_render_height: 0,
            optimal_sharpness: 0.0,
            render_width_min: 0,
            render_height_min: 0,
            render_width_max: 0,
            render_height_max: 0,
        }
    }
}

impl From<&SlDlssOptimalSettings> for DlssOptimalSettings {
    fn from(settings: &SlDlssOptimalSettings) -> Self {
        Self {
            optimal_render_width: settings.optimal_render_width,
            optimal_render_height: settings.optimal_render_height,
            optimal_sharpness: settings.optimal_sharpness,
            render_width_min: settings.render_width_min,
            render_height_min: settings.render_height_min,
            render_width_max: settings.render_width_max,
            render_height_max: settings.render_height_max,
        }
    }
}

#[repr(C)]
pub struct SlDlssgOptions {
    pub base: BaseStructure,
    pub mode: u32,
    pub num_frames_to_generate: u32,
    pub flags: u32,
    pub dynamic_res_width: u32,
    pub dynamic_res_height: u32,
    pub num_back_buffers: u32,
    pub mvec_depth_width: u32,
    pub mvec_depth_height: u32,
    pub color_width: u32,
    pub color_height: u32,
    pub color_buffer_format: u32,
    pub mvec_buffer_format: u32,
    pub depth_buffer_format: u32,
    pub hud_less_buffer_format: u32,
    pub ui_buffer_format: u32,
    pub on_error_callback: *const c_void,
}

impl From<&DlssgOptions> for SlDlssgOptions {
    fn from(options: &DlssgOptions) -> Self {
        Self {
            base: BaseStructure::new(DLSSG_OPTIONS_TYPE),
            mode: options.mode as u32,
            num_frames_to_generate: options.num_frames_to_generate,
            flags: options.flags.bits(),
            dynamic_res_width: 0,
            dynamic_res_height: 0,
            num_back_buffers: 0,
            mvec_depth_width: options.mvec_depth_width,
            mvec_depth_height: options.mvec_depth_height,
            color_width: options.color_width,
            color_height: options.color_height,
            color_buffer_format: 0,
            mvec_buffer_format: 0,
            depth_buffer_format: 0,
            hud_less_buffer_format: 0,
            ui_buffer_format: 0,
            on_error_callback: ptr::null(),
        }
    }
}

#[repr(C)]
pub struct SlDlssgState {
    pub base: BaseStructure,
    pub estimated_vram_usage_in_bytes: u64,
    pub status: u32,
    pub min_width_or_height: u32,
    pub num_frames_actually_presented: u32,
    pub num_frames_to_generate_max: u32,
}

impl Default for SlDlssgState {
    fn default() -> Self {
        Self {
            base: BaseStructure::new(DLSSG_STATE_TYPE),
            estimated_vram_usage_in_bytes: 0,
            status: 0,
            min_width_or_height: 0,
            num_frames_actually_presented: 0,
            num_frames_to_generate_max: 0,
        }
    }
}

impl From<&SlDlssgState> for DlssgState {
    fn from(state: &SlDlssgState) -> Self {
        Self {
            estimated_vram_usage_bytes: state.estimated_vram_usage_in_bytes,
            status: state.status,
            min_width_or_height: state.min_width_or_height,
            num_frames_actually_presented: state.num_frames_actually_presented,
            num_frames_to_generate_max: state.num_frames_to_generate_max,
        }
    }
}

pub fn log_level(level: LogLevel) -> u32 {
    match level {
        LogLevel::Off => 0,
        LogLevel::Default => 1,
        LogLevel::Verbose => 2,
    }
}

/// Severity of an SDK log message, unknown values read as errors
pub fn log_type(raw: u32) -> LogType {
    match raw {
        0 => LogType::Info,
        1 => LogType::Warn,
        _ => LogType::Error,
    }
}

// Core entry points exported by the interposer
pub type PfnInit = unsafe extern "C" fn(preferences: *const Preferences, sdk_version: u64) -> SlResult;
pub type PfnShutdown = unsafe extern "C" fn() -> SlResult;
pub type PfnIsFeatureSupported =
    unsafe extern "C" fn(feature: u32, adapter: *const AdapterInfo) -> SlResult;
pub type PfnSetD3dDevice = unsafe extern "C" fn(device: *mut c_void) -> SlResult;
pub type PfnGetNewFrameToken =
    unsafe extern "C" fn(token: *mut *mut c_void, frame_index: *const u32) -> SlResult;
pub type PfnSetConstants = unsafe extern "C" fn(
    constants: *const SlConstants,
    frame: *const c_void,
    viewport: *const ViewportHandle,
) -> SlResult;
pub type PfnSetTagForFrame = unsafe extern "C" fn(
    frame: *const c_void,
    viewport: *const ViewportHandle,
    tags: *const SlResourceTag,
    num_tags: u32,
    command_buffer: *mut c_void,
) -> SlResult;
pub type PfnEvaluateFeature = unsafe extern "C" fn(
    feature: u32,
    frame: *const c_void,
    inputs: *const *const BaseStructure,
    num_inputs: u32,
    command_buffer: *mut c_void,
) -> SlResult;
pub type PfnGetFeatureFunction = unsafe extern "C" fn(
    feature: u32,
    function_name: *const c_char,
    function: *mut *mut c_void,
) -> SlResult;

// Feature entry points resolved through `slGetFeatureFunction`
pub type PfnReflexSetOptions = unsafe extern "C" fn(options: *const SlReflexOptions) -> SlResult;
pub type PfnReflexGetState = unsafe extern "C" fn(state: *mut SlReflexState) -> SlResult;
pub type PfnReflexSleep = unsafe extern "C" fn(frame: *const c_void) -> SlResult;
pub type PfnPclSetMarker = unsafe extern "C" fn(marker: u32, frame: *const c_void) -> SlResult;
pub type PfnDlssSetOptions = unsafe extern "C" fn(
    viewport: *const ViewportHandle,
    options: *const SlDlssOptions,
) -> SlResult;
pub type PfnDlssGetOptimalSettings = unsafe extern "C" fn(
    options: *const SlDlssOptions,
    settings: *mut SlDlssOptimalSettings,
) -> SlResult;
pub type PfnDlssgSetOptions = unsafe extern "C" fn(
    viewport: *const ViewportHandle,
    options: *const SlDlssgOptions,
) -> SlResult;
pub type PfnDlssgGetState = unsafe extern "C" fn(
    viewport: *const ViewportHandle,
    state: *mut SlDlssgState,
    options: *const SlDlssgOptions,
) -> SlResult;

#[cfg(target_pointer_width = "64")]
mod layout {
    use super::*;
    use static_assertions::{assert_eq_size, const_assert_eq};

    assert_eq_size!(StructType, [u8; 16]);
    assert_eq_size!(BaseStructure, [u8; 32]);
    assert_eq_size!(ViewportHandle, [u8; 40]);
    assert_eq_size!(Extent, [u32; 4]);
    assert_eq_size!(ReflexReport, [u64; 15]);
    const_assert_eq!(core::mem::offset_of!(SlResource, native), 40);
    const_assert_eq!(core::mem::offset_of!(SlResourceTag, extent), 48);
    const_assert_eq!(core::mem::offset_of!(SlConstants, jitter_offset), 352);
    const_assert_eq!(core::mem::offset_of!(SlDlssgState, estimated_vram_usage_in_bytes), 32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BufferType, DlssMode, DlssgFlags, DlssgMode, NativeHandle};

    #[test]
    fn test_sdk_version_tag() {
        assert_eq!(SDK_VERSION >> 48, 2);
        assert_eq!(SDK_VERSION & 0xffff, 0xfedc);
    }

    #[test]
    fn test_log_type_mapping() {
        assert_eq!(log_type(0), LogType::Info);
        assert_eq!(log_type(1), LogType::Warn);
        assert_eq!(log_type(2), LogType::Error);
        assert_eq!(log_type(9), LogType::Error);
        assert_eq!(log_level(LogLevel::Verbose), 2);
    }

    #[test]
    fn test_constants_fixed_members() {
        let constants = Constants {
            camera_near: 0.1,
            camera_far: 1000.0,
            depth_inverted: true,
            reset: true,
            ..Constants::default()
        };
        let raw = SlConstants::from(&constants);
        assert_eq!(raw.base.struct_type, CONSTANTS_TYPE);
        assert_eq!(raw.clip_to_lens_clip, IDENTITY);
        assert_eq!(raw.depth_inverted, Boolean::True);
        assert_eq!(raw.reset, Boolean::True);
        assert_eq!(raw.camera_motion_included, Boolean::False);
        assert_eq!(raw.motion_vectors_invalid_value, INVALID_FLOAT);
        assert_eq!(raw.camera_far, 1000.0);
    }

    #[test]
    fn test_resource_tag_points_at_resource() {
        let tag = ResourceTag {
            role: BufferType::DEPTH,
            resource: Resource {
                kind: ResourceType::Tex2d,
                native: NativeHandle::from_addr(0x4000).unwrap(),
                width: 1920,
                height: 1080,
                native_format: 40,
                state: 0x80,
            },
            extent: crate::types::Extent {
                left: 0,
                top: 0,
                width: 1920,
                height: 1080,
            },
            lifecycle: ResourceLifecycle::ValidUntilPresent,
        };
        let mut resource = SlResource::from(&tag.resource);
        let raw = SlResourceTag::new(&tag, &mut resource);

        assert_eq!(raw.buffer_type, 0);
        assert_eq!(raw.lifecycle, 1);
        assert_eq!(raw.extent.width, 1920);
        let resource = unsafe { &*raw.resource };
        assert_eq!(resource.native as usize, 0x4000);
        assert_eq!(resource.state, 0x80);
    }

    #[test]
    fn test_option_conversions() {
        let dlss = SlDlssOptions::from(&DlssOptions {
            mode: DlssMode::MaxQuality,
            output_width: 3840,
            output_height: 2160,
            ..DlssOptions::default()
        });
        assert_eq!(dlss.mode, 3);
        assert_eq!(dlss.color_buffers_hdr, Boolean::False);
        assert_eq!(dlss.pre_exposure, 1.0);

        let dlssg = SlDlssgOptions::from(&DlssgOptions {
            mode: DlssgMode::On,
            num_frames_to_generate: 2,
            flags: DlssgFlags::DYNAMIC_RESOLUTION_ENABLED,
            ..DlssgOptions::default()
        });
        assert_eq!(dlssg.mode, 1);
        assert_eq!(dlssg.num_frames_to_generate, 2);
        assert_eq!(dlssg.flags, 1 << 1);
    }

    #[test]
    fn test_reflex_state_reports() {
        let mut raw = SlReflexState::default();
        raw.latency_report_available = true;
        raw.frame_report[3].frame_id = 42;
        raw.frame_report[3].gpu_render_end_time = 9;

        let state = ReflexState::from(&raw);
        assert!(state.latency_report_available);
        assert_eq!(state.frame_reports.len(), REFLEX_FRAME_REPORT_COUNT);
        assert_eq!(state.frame_reports[3].frame_id, 42);
        assert_eq!(state.frame_reports[3].gpu_render_end_time, 9);
    }
}
