//! DLSS frame generation and combined presets

use core::ffi::c_void;

use streamline::BufferType;
use upscaling::{Preset, PresetOutcome, TagRequest};

use super::{report, succeeded, write_out, DlssgStateExport};
use crate::plugin;

#[no_mangle]
pub extern "C" fn SLDLSSG_SetOptions(
    mode: i32,
    num_frames_to_generate: u32,
    color_width: u32,
    color_height: u32,
    mvec_depth_width: u32,
    mvec_depth_height: u32,
) -> bool {
    let result = plugin::global().lock().session.set_frame_gen_options(
        mode,
        num_frames_to_generate,
        (color_width, color_height),
        (mvec_depth_width, mvec_depth_height),
    );
    succeeded("SLDLSSG_SetOptions", result)
}

/// Mode and count form of [`SLDLSSG_SetOptions`], keeping buffer sizes
#[no_mangle]
pub extern "C" fn SLDLSSG_SetMode(mode: i32, num_frames_to_generate: i32) -> bool {
    let result = plugin::global()
        .lock()
        .session
        .set_frame_gen_mode(mode, num_frames_to_generate);
    succeeded("SLDLSSG_SetMode", result)
}

#[no_mangle]
pub extern "C" fn SLDLSSG_GetMode() -> i32 {
    plugin::global().lock().session.frame_gen_mode() as i32
}

#[no_mangle]
pub extern "C" fn SLDLSSG_GetNumFramesToGenerate() -> i32 {
    plugin::global().lock().session.num_frames_to_generate() as i32
}

/// # Safety
///
/// Each output must be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn SLDLSSG_GetState(
    estimated_vram_usage: *mut u64,
    status: *mut u32,
    min_width_or_height: *mut u32,
    num_frames_presented: *mut u32,
    num_frames_to_generate_max: *mut u32,
) -> bool {
    let result = plugin::global().lock().session.frame_gen_state(false);
    let Some(state) = report("SLDLSSG_GetState", result) else {
        return false;
    };

    write_out(estimated_vram_usage, state.estimated_vram_usage_bytes);
    write_out(status, state.status);
    write_out(min_width_or_height, state.min_width_or_height);
    write_out(num_frames_presented, state.num_frames_actually_presented);
    write_out(num_frames_to_generate_max, state.num_frames_to_generate_max);
    true
}

/// Struct form of [`SLDLSSG_GetState`], with a VRAM estimate
///
/// # Safety
///
/// `state` must be null or valid for a write of [`DlssgStateExport`].
#[no_mangle]
pub unsafe extern "C" fn SLDLSSG_GetStateLegacy(state: *mut DlssgStateExport) -> bool {
    if state.is_null() {
        return false;
    }
    let result = plugin::global().lock().session.frame_gen_state(true);
    match report("SLDLSSG_GetStateLegacy", result) {
        Some(current) => {
            write_out(state, current.into());
            true
        }
        None => false,
    }
}

fn tag_request(resource: *mut c_void, width: u32, height: u32, native_format: u32, state: u32) -> TagRequest {
    TagRequest {
        native: resource,
        // Replaced by the fixed role of each export
        role: BufferType::HUD_LESS_COLOR,
        width,
        height,
        native_format,
        state,
    }
}

#[no_mangle]
pub extern "C" fn SLDLSSG_TagHUDLessColor(
    resource: *mut c_void,
    width: u32,
    height: u32,
    native_format: u32,
    state: u32,
) -> bool {
    let request = tag_request(resource, width, height, native_format, state);
    let result = plugin::global().lock().session.tag_hudless_color(request);
    succeeded("SLDLSSG_TagHUDLessColor", result)
}

#[no_mangle]
pub extern "C" fn SLDLSSG_TagUIColorAndAlpha(
    resource: *mut c_void,
    width: u32,
    height: u32,
    native_format: u32,
    state: u32,
) -> bool {
    let request = tag_request(resource, width, height, native_format, state);
    let result = plugin::global()
        .lock()
        .session
        .tag_ui_color_and_alpha(request);
    succeeded("SLDLSSG_TagUIColorAndAlpha", result)
}

fn apply_preset(export: &str, preset: Preset) -> bool {
    let result = plugin::global().lock().session.apply_preset(preset);
    match report(export, result) {
        Some(PresetOutcome::Complete) => {
            log::info!("{}: DLSS and Frame Gen enabled", export);
            true
        }
        Some(PresetOutcome::Partial(_)) => true,
        None => false,
    }
}

#[no_mangle]
pub extern "C" fn SLStreamline_EnableDLSSQualityWithFrameGen2x() -> bool {
    apply_preset(
        "SLStreamline_EnableDLSSQualityWithFrameGen2x",
        Preset::QualityWithFrameGen2x,
    )
}

#[no_mangle]
pub extern "C" fn SLStreamline_EnableDLSSPerformanceWithFrameGen3x() -> bool {
    apply_preset(
        "SLStreamline_EnableDLSSPerformanceWithFrameGen3x",
        Preset::PerformanceWithFrameGen3x,
    )
}

#[no_mangle]
pub extern "C" fn SLStreamline_DisableDLSSAndFrameGen() -> bool {
    let result = plugin::global().lock().session.disable_upscaling();
    succeeded("SLStreamline_DisableDLSSAndFrameGen", result)
}
