//! Availability, lifecycle and support queries

use core::ffi::{c_char, c_void};

use streamline::Feature;

use super::succeeded;
use crate::logging::{self, HostLogCallback};
use crate::plugin;

#[no_mangle]
pub extern "C" fn SLReflex_IsAvailable() -> bool {
    plugin::global().lock().session.is_available()
}

#[no_mangle]
pub extern "C" fn SLReflex_IsInitialized() -> bool {
    plugin::global().lock().session.is_initialized()
}

#[no_mangle]
pub extern "C" fn SLReflex_GetLastErrorCode() -> i32 {
    plugin::global().lock().session.last_error().code
}

/// Static string; valid for the life of the process
#[no_mangle]
pub extern "C" fn SLReflex_GetLastErrorMessage() -> *const c_char {
    plugin::global().lock().session.last_error().message.as_ptr()
}

#[no_mangle]
pub extern "C" fn SLReflex_HasD3D12Device() -> bool {
    plugin::global().lock().session.has_d3d12_device()
}

#[no_mangle]
pub extern "C" fn SLReflex_HasD3D11Device() -> bool {
    plugin::global().lock().session.has_d3d11_device()
}

#[no_mangle]
pub extern "C" fn SLReflex_GetRendererType() -> i32 {
    plugin::global().lock().session.renderer().0
}

#[no_mangle]
pub extern "C" fn SLReflex_TryInitialize() -> bool {
    let result = plugin::global().lock().session.try_initialize();
    succeeded("SLReflex_TryInitialize", result)
}

/// The device argument is ignored; the device always comes from the host
#[no_mangle]
pub extern "C" fn SLReflex_Initialize(_device: *mut c_void) -> bool {
    let result = plugin::global().lock().session.initialize_if_bound();
    succeeded("SLReflex_Initialize", result)
}

#[no_mangle]
pub extern "C" fn SLReflex_Shutdown() {
    plugin::global().lock().session.shutdown();
}

#[no_mangle]
pub extern "C" fn SLReflex_IsSupported() -> bool {
    plugin::global().lock().session.is_supported(Feature::REFLEX)
}

#[no_mangle]
pub extern "C" fn SLReflex_IsPCLSupported() -> bool {
    plugin::global().lock().session.is_supported(Feature::PCL)
}

#[no_mangle]
pub extern "C" fn SLDLSS_IsSupported() -> bool {
    plugin::global().lock().session.is_supported(Feature::DLSS)
}

#[no_mangle]
pub extern "C" fn SLDLSS_IsFrameGenSupported() -> bool {
    plugin::global().lock().session.is_supported(Feature::DLSS_G)
}

/// Route log lines to the host as well; null clears the callback
#[no_mangle]
pub extern "C" fn SLReflex_SetLogCallback(callback: Option<HostLogCallback>) {
    logging::set_host_callback(callback);
}
