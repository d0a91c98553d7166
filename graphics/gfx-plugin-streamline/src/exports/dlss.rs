//! DLSS super resolution

use core::ffi::c_void;

use streamline::{BufferType, Float4x4};
use unity_gfx::RenderEventCallback;
use upscaling::{CameraConstants, TagRequest, EVALUATE_EVENT_ID};

use super::{report, succeeded, write_out, DlssSettingsExport};
use crate::error::BridgeError;
use crate::plugin;

#[no_mangle]
pub extern "C" fn SLDLSS_BeginFrame() {
    let result = plugin::global().lock().session.begin_frame();
    report("SLDLSS_BeginFrame", result);
}

#[no_mangle]
pub extern "C" fn SLDLSS_GetFrameId() -> u64 {
    plugin::global().lock().session.frame_id()
}

#[no_mangle]
pub extern "C" fn SLDLSS_SetViewport(viewport_id: u32) {
    plugin::global().lock().session.set_viewport(viewport_id);
}

/// # Safety
///
/// `ptr` must be null or point to 16 readable floats.
unsafe fn read_matrix(ptr: *const f32) -> Option<Float4x4> {
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast::<Float4x4>().read_unaligned())
    }
}

/// # Safety
///
/// Each matrix pointer must reference 16 readable row-major floats.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn SLDLSS_SetConstants(
    camera_view_to_clip: *const f32,
    clip_to_camera_view: *const f32,
    clip_to_prev_clip: *const f32,
    prev_clip_to_clip: *const f32,
    jitter_offset_x: f32,
    jitter_offset_y: f32,
    mvec_scale_x: f32,
    mvec_scale_y: f32,
    camera_near: f32,
    camera_far: f32,
    camera_fov: f32,
    camera_aspect_ratio: f32,
    depth_inverted: bool,
    camera_motion_included: bool,
    reset: bool,
) -> bool {
    let matrices = (
        read_matrix(camera_view_to_clip),
        read_matrix(clip_to_camera_view),
        read_matrix(clip_to_prev_clip),
        read_matrix(prev_clip_to_clip),
    );
    let (Some(view_to_clip), Some(clip_to_view), Some(to_prev), Some(from_prev)) = matrices else {
        return succeeded::<()>("SLDLSS_SetConstants", Err(BridgeError::NullPointer));
    };

    let camera = CameraConstants {
        camera_view_to_clip: view_to_clip,
        clip_to_camera_view: clip_to_view,
        clip_to_prev_clip: to_prev,
        prev_clip_to_clip: from_prev,
        jitter_offset: [jitter_offset_x, jitter_offset_y],
        mvec_scale: [mvec_scale_x, mvec_scale_y],
        camera_near,
        camera_far,
        camera_fov,
        camera_aspect_ratio,
        depth_inverted,
        camera_motion_included,
        reset,
    };

    let result = plugin::global().lock().session.set_constants(&camera);
    succeeded("SLDLSS_SetConstants", result)
}

/// `resource` is an `ID3D12Resource*` owned by the host
#[no_mangle]
pub extern "C" fn SLDLSS_TagResourceD3D12(
    resource: *mut c_void,
    buffer_type: u32,
    width: u32,
    height: u32,
    native_format: u32,
    state: u32,
) -> bool {
    let request = TagRequest {
        native: resource,
        role: BufferType(buffer_type),
        width,
        height,
        native_format,
        state,
    };
    let result = plugin::global().lock().session.tag_resource(&request);
    succeeded("SLDLSS_TagResourceD3D12", result)
}

#[no_mangle]
pub extern "C" fn SLDLSS_SetOptions(
    mode: i32,
    output_width: u32,
    output_height: u32,
    color_buffers_hdr: bool,
) -> bool {
    let result = plugin::global().lock().session.set_dlss_options(
        mode,
        output_width,
        output_height,
        color_buffers_hdr,
    );
    succeeded("SLDLSS_SetOptions", result)
}

/// Mode-only form of [`SLDLSS_SetOptions`]
#[no_mangle]
pub extern "C" fn SLDLSS_SetMode(mode: i32) -> bool {
    let result = plugin::global().lock().session.set_dlss_mode(mode);
    succeeded("SLDLSS_SetMode", result)
}

#[no_mangle]
pub extern "C" fn SLDLSS_GetMode() -> i32 {
    plugin::global().lock().session.dlss_mode() as i32
}

/// # Safety
///
/// Each output must be null or valid for a write.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn SLDLSS_GetOptimalSettings(
    mode: i32,
    output_width: u32,
    output_height: u32,
    optimal_render_width: *mut u32,
    optimal_render_height: *mut u32,
    min_render_width: *mut u32,
    min_render_height: *mut u32,
    max_render_width: *mut u32,
    max_render_height: *mut u32,
) -> bool {
    let result = plugin::global()
        .lock()
        .session
        .optimal_settings(mode, output_width, output_height);
    let Some(settings) = report("SLDLSS_GetOptimalSettings", result) else {
        return false;
    };

    write_out(optimal_render_width, settings.optimal_render_width);
    write_out(optimal_render_height, settings.optimal_render_height);
    write_out(min_render_width, settings.render_width_min);
    write_out(min_render_height, settings.render_height_min);
    write_out(max_render_width, settings.render_width_max);
    write_out(max_render_height, settings.render_height_max);
    true
}

/// Struct form of [`SLDLSS_GetOptimalSettings`], adds the sharpness
///
/// # Safety
///
/// `settings` must be null or valid for a write of [`DlssSettingsExport`].
#[no_mangle]
pub unsafe extern "C" fn SLDLSS_GetOptimalSettingsLegacy(
    mode: i32,
    output_width: u32,
    output_height: u32,
    settings: *mut DlssSettingsExport,
) -> bool {
    if settings.is_null() {
        return false;
    }
    let result = plugin::global()
        .lock()
        .session
        .optimal_settings(mode, output_width, output_height);
    match report("SLDLSS_GetOptimalSettingsLegacy", result) {
        Some(optimal) => {
            write_out(settings, optimal.into());
            true
        }
        None => false,
    }
}

/// Evaluate on a command list the caller is recording
#[no_mangle]
pub extern "C" fn SLDLSS_Evaluate(command_buffer: *mut c_void) -> bool {
    let result = plugin::global().lock().session.evaluate(command_buffer);
    succeeded("SLDLSS_Evaluate", result)
}

/// Queue the current frame for [`SLDLSS_GetRenderCallback`]
#[no_mangle]
pub extern "C" fn SLDLSS_PrepareEvaluate() {
    plugin::global().lock().session.prepare_evaluate();
}

unsafe extern "system" fn on_dlss_render_event(event_id: i32) {
    plugin::global().lock().session.on_render_event(event_id);
}

#[no_mangle]
pub extern "C" fn SLDLSS_GetRenderCallback() -> RenderEventCallback {
    on_dlss_render_event
}

#[no_mangle]
pub extern "C" fn SLDLSS_GetEvaluateEventID() -> i32 {
    EVALUATE_EVENT_ID
}
