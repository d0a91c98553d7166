//! Reflex low-latency mode, markers and latency stats

use streamline::PclMarker;
use unity_gfx::RenderEventCallback;

use super::{report, succeeded, write_out, ReflexLatencyStats};
use crate::error::BridgeError;
use crate::plugin;

#[no_mangle]
pub extern "C" fn SLReflex_SetMode(mode: i32) -> bool {
    let result = plugin::global().lock().session.set_reflex_mode(mode);
    succeeded("SLReflex_SetMode", result)
}

#[no_mangle]
pub extern "C" fn SLReflex_GetMode() -> i32 {
    plugin::global().lock().session.reflex_mode() as i32
}

/// # Safety
///
/// Each output must be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn SLReflex_GetState(
    low_latency_available: *mut bool,
    flash_indicator_driver_controlled: *mut bool,
) -> bool {
    let result = plugin::global().lock().session.reflex_state();
    let Some(state) = report("SLReflex_GetState", result) else {
        return false;
    };

    write_out(low_latency_available, state.low_latency_available);
    write_out(
        flash_indicator_driver_controlled,
        state.flash_indicator_driver_controlled,
    );
    true
}

#[no_mangle]
pub extern "C" fn SLReflex_BeginFrame() {
    let result = plugin::global().lock().session.begin_frame();
    report("SLReflex_BeginFrame", result);
}

/// Blocks the calling thread until the SDK releases the frame
#[no_mangle]
pub extern "C" fn SLReflex_Sleep() {
    report("SLReflex_Sleep", plugin::sleep(plugin::global()));
}

#[no_mangle]
pub extern "C" fn SLReflex_SetMarker(marker: i32) {
    let result = plugin::global().lock().session.set_marker(marker);
    report("SLReflex_SetMarker", result);
}

fn mark(export: &str, marker: PclMarker) {
    let result = plugin::global().lock().session.mark(marker);
    report(export, result);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkSimulationStart() {
    mark("SLReflex_MarkSimulationStart", PclMarker::SIMULATION_START);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkSimulationEnd() {
    mark("SLReflex_MarkSimulationEnd", PclMarker::SIMULATION_END);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkRenderSubmitStart() {
    mark("SLReflex_MarkRenderSubmitStart", PclMarker::RENDER_SUBMIT_START);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkRenderSubmitEnd() {
    mark("SLReflex_MarkRenderSubmitEnd", PclMarker::RENDER_SUBMIT_END);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkPresentStart() {
    mark("SLReflex_MarkPresentStart", PclMarker::PRESENT_START);
}

#[no_mangle]
pub extern "C" fn SLReflex_MarkPresentEnd() {
    mark("SLReflex_MarkPresentEnd", PclMarker::PRESENT_END);
}

#[no_mangle]
pub extern "C" fn SLReflex_TriggerFlash() {
    mark("SLReflex_TriggerFlash", PclMarker::TRIGGER_FLASH);
}

/// # Safety
///
/// `stats` must be null or valid for a write of [`ReflexLatencyStats`].
#[no_mangle]
pub unsafe extern "C" fn SLReflex_GetLatencyStats(stats: *mut ReflexLatencyStats) -> bool {
    if stats.is_null() {
        return false;
    }
    let result = plugin::global().lock().session.latency_stats();
    match report("SLReflex_GetLatencyStats", result) {
        Some(latency) => {
            write_out(stats, latency);
            true
        }
        None => false,
    }
}

unsafe extern "system" fn on_reflex_render_event(event_id: i32) {
    match plugin::dispatch_reflex_event(plugin::global(), event_id) {
        Ok(()) | Err(BridgeError::NotInitialized) => {}
        Err(err) => log::trace!("Reflex render event {} failed: {}", event_id, err),
    }
}

/// Callback for the host's render-thread plugin event queue
#[no_mangle]
pub extern "C" fn SLReflex_GetRenderEventFunc() -> RenderEventCallback {
    on_reflex_render_event
}
