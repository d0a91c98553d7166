//! Flat C ABI consumed by the engine's managed bindings
//!
//! Every export locks the global plugin, runs one session operation and
//! collapses its result to a `bool` or sentinel, logging failures once.
#![allow(non_snake_case)]

use static_assertions::{assert_eq_align, assert_eq_size};
use streamline::{DlssOptimalSettings, DlssgState};

pub use latency::LatencyStats as ReflexLatencyStats;

use crate::error::BridgeError;

pub mod diagnostics;
pub mod dlss;
pub mod dlssg;
pub mod reflex;
pub mod unity;

/// Optimal render settings, struct form
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DlssSettingsExport {
    pub optimal_render_width: u32,
    pub optimal_render_height: u32,
    pub min_render_width: u32,
    pub min_render_height: u32,
    pub max_render_width: u32,
    pub max_render_height: u32,
    pub optimal_sharpness: f32,
}

impl From<DlssOptimalSettings> for DlssSettingsExport {
    fn from(settings: DlssOptimalSettings) -> Self {
        Self {
            optimal_render_width: settings.optimal_render_width,
            optimal_render_height: settings.optimal_render_height,
            min_render_width: settings.render_width_min,
            min_render_height: settings.render_height_min,
            max_render_width: settings.render_width_max,
            max_render_height: settings.render_height_max,
            optimal_sharpness: settings.optimal_sharpness,
        }
    }
}

/// Frame generation state, struct form
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DlssgStateExport {
    pub estimated_vram_usage: u64,
    pub status: u32,
    pub min_width_or_height: u32,
    pub num_frames_actually_presented: u32,
    pub num_frames_to_generate_max: u32,
}

impl From<DlssgState> for DlssgStateExport {
    fn from(state: DlssgState) -> Self {
        Self {
            estimated_vram_usage: state.estimated_vram_usage_bytes,
            status: state.status,
            min_width_or_height: state.min_width_or_height,
            num_frames_actually_presented: state.num_frames_actually_presented,
            num_frames_to_generate_max: state.num_frames_to_generate_max,
        }
    }
}

assert_eq_size!(ReflexLatencyStats, [f32; 7]);
assert_eq_size!(DlssSettingsExport, [u32; 7]);
assert_eq_size!(DlssgStateExport, [u64; 3]);
assert_eq_align!(DlssgStateExport, u64);

/// Log a failed operation under its export name, `None` on failure
fn report<T>(export: &str, result: Result<T, BridgeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(BridgeError::NotInitialized) => {
            log::debug!("{} skipped: not initialized", export);
            None
        }
        Err(err) => {
            log::warn!("{} failed: {}", export, err);
            None
        }
    }
}

fn succeeded<T>(export: &str, result: Result<T, BridgeError>) -> bool {
    report(export, result).is_some()
}

/// Store `value` through an optional out-pointer
///
/// # Safety
///
/// `ptr` must be null or valid for a write of `T`.
unsafe fn write_out<T>(ptr: *mut T, value: T) {
    if let Some(slot) = ptr.as_mut() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_conversion() {
        let settings = DlssOptimalSettings {
            optimal_render_width: 1280,
            optimal_render_height: 720,
            optimal_sharpness: 0.5,
            render_width_min: 640,
            render_height_min: 360,
            render_width_max: 1920,
            render_height_max: 1080,
        };
        let export = DlssSettingsExport::from(settings);
        assert_eq!(export.min_render_width, 640);
        assert_eq!(export.max_render_height, 1080);
        assert_eq!(export.optimal_sharpness, 0.5);
    }

    #[test]
    fn test_write_out_tolerates_null() {
        let mut value = 0u32;
        unsafe {
            write_out(core::ptr::null_mut(), 5u32);
            write_out(&mut value, 7);
        }
        assert_eq!(value, 7);
    }

    #[test]
    fn test_report() {
        assert_eq!(report("SLReflex_SetMode", Ok(3)), Some(3));
        assert!(!succeeded::<()>("SLReflex_SetMode", Err(BridgeError::NotInitialized)));
    }
}
