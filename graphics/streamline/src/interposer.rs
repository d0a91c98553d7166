//! Backend over the SDK's interposer library
//!
//! `sl.interposer.dll` is loaded at runtime and its core entry points are
//! resolved into a function table. Feature entry points are resolved through
//! `slGetFeatureFunction` once the device is bound. The library is never
//! unloaded: the SDK keeps its hooks installed for the life of the process.

use core::ffi::{c_char, c_void, CStr};
use core::{mem, ptr};
use std::ffi::CString;
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spin::{Mutex, RwLock};

use crate::result::{SdkError, SdkResult};
use crate::sdk::{
    DlssFunctions, DlssgFunctions, FeatureInterface, PclFunctions, ReflexFunctions, Streamline,
};
use crate::sys::{self, SlResource, SlResourceTag};
use crate::types::{
    AdapterInfo, Constants, DlssOptimalSettings, DlssOptions, DlssgOptions, DlssgState, Feature,
    FrameToken, LogSink, NativeHandle, PclMarker, Preferences, ReflexOptions, ReflexState,
    ResourceTag, ViewportHandle,
};

/// File name of the interposer library
pub const LIBRARY_NAME: &str = "sl.interposer.dll";

#[link(name = "kernel32")]
extern "system" {
    fn LoadLibraryW(file_name: *const u16) -> *mut c_void;
    fn GetProcAddress(module: *mut c_void, name: *const c_char) -> *mut c_void;
    fn GetLastError() -> u32;
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{path} could not be loaded (error {code})")]
    Library { path: String, code: u32 },
    #[error("{0} is not exported by the interposer")]
    Symbol(&'static str),
}

/// Receiver of SDK log messages, shared with the C trampoline
static LOG_SINK: RwLock<Option<LogSink>> = RwLock::new(None);

unsafe extern "C" fn log_trampoline(kind: u32, message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: the SDK passes a NUL-terminated string valid for this call.
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    if let Some(sink) = *LOG_SINK.read() {
        sink(sys::log_type(kind), text.trim_end());
    }
}

fn wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(core::iter::once(0))
        .collect()
}

struct Module(*mut c_void);

// The module handle is a process-wide address with no thread affinity.
unsafe impl Send for Module {}
unsafe impl Sync for Module {}

impl Module {
    fn open(path: &Path) -> Result<Self, LoadError> {
        let name = wide(path);
        // SAFETY: `name` is a NUL-terminated UTF-16 string.
        let handle = unsafe { LoadLibraryW(name.as_ptr()) };
        if handle.is_null() {
            // SAFETY: reads the calling thread's last-error value.
            let code = unsafe { GetLastError() };
            return Err(LoadError::Library {
                path: path.display().to_string(),
                code,
            });
        }
        Ok(Self(handle))
    }

    fn symbol<T: Copy>(&self, name: &'static CStr) -> Result<T, LoadError> {
        // SAFETY: the handle came from LoadLibraryW and `name` is NUL-terminated.
        let raw = unsafe { GetProcAddress(self.0, name.as_ptr()) };
        if raw.is_null() {
            return Err(LoadError::Symbol(name.to_str().unwrap_or("?")));
        }
        // SAFETY: `T` is the function pointer type declared for `name`.
        Ok(unsafe { mem::transmute_copy(&raw) })
    }
}

struct CoreTable {
    init: sys::PfnInit,
    shutdown: sys::PfnShutdown,
    is_feature_supported: sys::PfnIsFeatureSupported,
    set_d3d_device: sys::PfnSetD3dDevice,
    get_new_frame_token: sys::PfnGetNewFrameToken,
    set_constants: sys::PfnSetConstants,
    set_tag_for_frame: sys::PfnSetTagForFrame,
    evaluate_feature: sys::PfnEvaluateFeature,
    get_feature_function: sys::PfnGetFeatureFunction,
}

impl CoreTable {
    fn resolve(module: &Module) -> Result<Self, LoadError> {
        Ok(Self {
            init: module.symbol(c"slInit")?,
            shutdown: module.symbol(c"slShutdown")?,
            is_feature_supported: module.symbol(c"slIsFeatureSupported")?,
            set_d3d_device: module.symbol(c"slSetD3DDevice")?,
            get_new_frame_token: module.symbol(c"slGetNewFrameToken")?,
            set_constants: module.symbol(c"slSetConstants")?,
            set_tag_for_frame: module.symbol(c"slSetTagForFrame")?,
            evaluate_feature: module.symbol(c"slEvaluateFeature")?,
            get_feature_function: module.symbol(c"slGetFeatureFunction")?,
        })
    }
}

/// Buffers the SDK's preference structure points into
///
/// Held from `slInit` until shutdown succeeds.
struct PreferenceStorage {
    paths: Vec<Vec<u16>>,
    path_ptrs: Vec<*const u16>,
    engine_version: CString,
    features: Vec<u32>,
}

// Only ever touched under the interposer's mutex.
unsafe impl Send for PreferenceStorage {}

impl PreferenceStorage {
    fn new(preferences: &Preferences) -> Self {
        let paths: Vec<Vec<u16>> = preferences.plugin_paths.iter().map(|p| wide(p)).collect();
        let path_ptrs = paths.iter().map(|path| path.as_ptr()).collect();
        // Interior NULs cannot reach the SDK; fall back to an empty version string
        let engine_version = CString::new(preferences.engine_version.as_str()).unwrap_or_default();
        Self {
            paths,
            path_ptrs,
            engine_version,
            features: preferences.features.iter().map(|feature| feature.0).collect(),
        }
    }

    fn raw(&self, preferences: &Preferences) -> sys::Preferences {
        sys::Preferences {
            base: sys::BaseStructure::new(sys::PREFERENCES_TYPE),
            show_console: preferences.show_console,
            log_level: sys::log_level(preferences.log_level),
            paths_to_plugins: if self.path_ptrs.is_empty() {
                ptr::null()
            } else {
                self.path_ptrs.as_ptr()
            },
            num_paths_to_plugins: self.path_ptrs.len() as u32,
            path_to_logs_and_data: ptr::null(),
            allocate_callback: ptr::null(),
            release_callback: ptr::null(),
            log_message_callback: preferences.log_sink.map(|_| log_trampoline as sys::LogMessageCallback),
            flags: preferences.flags.bits(),
            features_to_load: self.features.as_ptr(),
            num_features_to_load: self.features.len() as u32,
            application_id: preferences.application_id,
            engine: preferences.engine as u32,
            engine_version: self.engine_version.as_ptr(),
            project_id: ptr::null(),
            render_api: preferences.render_api as u32,
        }
    }
}

fn frame_ptr(frame: &FrameToken) -> *const c_void {
    frame.raw().as_ptr()
}

/// SDK backend over a loaded interposer
pub struct Interposer {
    _module: Module,
    core: CoreTable,
    preferences: Mutex<Option<PreferenceStorage>>,
}

impl Interposer {
    /// Load the interposer from the first directory that has it, then the
    /// system search path
    pub fn load(search_dirs: &[PathBuf]) -> Result<Self, LoadError> {
        let mut candidates: Vec<PathBuf> =
            search_dirs.iter().map(|dir| dir.join(LIBRARY_NAME)).collect();
        candidates.push(PathBuf::from(LIBRARY_NAME));

        let mut last_error = None;
        for candidate in candidates {
            match Module::open(&candidate) {
                Ok(module) => {
                    log::info!("Loaded {}", candidate.display());
                    let core = CoreTable::resolve(&module)?;
                    return Ok(Self {
                        _module: module,
                        core,
                        preferences: Mutex::new(None),
                    });
                }
                Err(err) => {
                    log::debug!("{}", err);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(LoadError::Library {
            path: LIBRARY_NAME.to_string(),
            code: 0,
        }))
    }

    fn feature_function<T: Copy>(&self, feature: Feature, name: &'static CStr) -> Option<T> {
        let mut raw = ptr::null_mut();
        // SAFETY: resolved core entry point; `name` is NUL-terminated and `raw` is writable.
        let code = unsafe { (self.core.get_feature_function)(feature.0, name.as_ptr(), &mut raw) };
        if code != 0 || raw.is_null() {
            log::debug!(
                "{:?} unavailable: {}",
                name,
                SdkError::check(code).err().unwrap_or(SdkError::FEATURE_MISSING)
            );
            return None;
        }
        // SAFETY: `T` is the function pointer type the SDK declares for `name`.
        Some(unsafe { mem::transmute_copy(&raw) })
    }
}

impl Streamline for Interposer {
    fn is_available(&self) -> bool {
        true
    }

    fn init(&self, preferences: &Preferences) -> SdkResult<()> {
        *LOG_SINK.write() = preferences.log_sink;

        let storage = PreferenceStorage::new(preferences);
        let raw = storage.raw(preferences);
        // SAFETY: `raw` points into `storage`, which is kept until shutdown.
        let code = unsafe { (self.core.init)(&raw, sys::SDK_VERSION) };
        *self.preferences.lock() = Some(storage);
        SdkError::check(code)
    }

    fn shutdown(&self) -> SdkResult<()> {
        // SAFETY: resolved core entry point without arguments.
        SdkError::check(unsafe { (self.core.shutdown)() })?;
        *self.preferences.lock() = None;
        Ok(())
    }

    fn set_d3d_device(&self, device: NativeHandle) -> SdkResult<()> {
        // SAFETY: `device` is the host's live device interface.
        SdkError::check(unsafe { (self.core.set_d3d_device)(device.as_ptr()) })
    }

    fn is_feature_supported(&self, feature: Feature, adapter: &AdapterInfo) -> SdkResult<()> {
        let raw = sys::AdapterInfo::new(&adapter.luid);
        // SAFETY: `raw` borrows `adapter.luid` for the duration of the call.
        SdkError::check(unsafe { (self.core.is_feature_supported)(feature.0, &raw) })
    }

    fn get_new_frame_token(&self, frame_index: u32) -> SdkResult<FrameToken> {
        let mut raw = ptr::null_mut();
        // SAFETY: both pointers are valid for the call.
        SdkError::check(unsafe { (self.core.get_new_frame_token)(&mut raw, &frame_index) })?;
        NativeHandle::new(raw)
            .map(|handle| FrameToken::new(handle, frame_index))
            .ok_or(SdkError::INVALID_STATE)
    }

    fn set_constants(
        &self,
        constants: &Constants,
        frame: &FrameToken,
        viewport: ViewportHandle,
    ) -> SdkResult<()> {
        let raw = sys::SlConstants::from(constants);
        let viewport = sys::ViewportHandle::from(viewport);
        // SAFETY: the structures live on this frame for the duration of the call.
        SdkError::check(unsafe { (self.core.set_constants)(&raw, frame_ptr(frame), &viewport) })
    }

    fn set_tag_for_frame(
        &self,
        frame: &FrameToken,
        viewport: ViewportHandle,
        tags: &[ResourceTag],
        command_buffer: Option<NativeHandle>,
    ) -> SdkResult<()> {
        let mut resources: Vec<SlResource> =
            tags.iter().map(|tag| SlResource::from(&tag.resource)).collect();
        let raw_tags: Vec<SlResourceTag> = tags
            .iter()
            .zip(resources.iter_mut())
            .map(|(tag, resource)| SlResourceTag::new(tag, resource))
            .collect();
        let viewport = sys::ViewportHandle::from(viewport);
        let command_buffer = command_buffer.map_or(ptr::null_mut(), NativeHandle::as_ptr);

        // SAFETY: `raw_tags` points into `resources`; both outlive the call.
        SdkError::check(unsafe {
            (self.core.set_tag_for_frame)(
                frame_ptr(frame),
                &viewport,
                raw_tags.as_ptr(),
                raw_tags.len() as u32,
                command_buffer,
            )
        })
    }

    fn evaluate_feature(
        &self,
        feature: Feature,
        frame: &FrameToken,
        command_buffer: NativeHandle,
    ) -> SdkResult<()> {
        // SAFETY: no chained inputs; the SDK uses the state set for this frame.
        SdkError::check(unsafe {
            (self.core.evaluate_feature)(
                feature.0,
                frame_ptr(frame),
                ptr::null(),
                0,
                command_buffer.as_ptr(),
            )
        })
    }

    fn feature_interface(&self, feature: Feature) -> Option<FeatureInterface> {
        let interface = match feature {
            Feature::REFLEX => FeatureInterface::Reflex(Arc::new(ReflexTable {
                set_options: self.feature_function(feature, c"slReflexSetOptions")?,
                get_state: self.feature_function(feature, c"slReflexGetState")?,
                sleep: self.feature_function(feature, c"slReflexSleep")?,
            })),
            Feature::PCL => FeatureInterface::Pcl(Arc::new(PclTable {
                set_marker: self.feature_function(feature, c"slPCLSetMarker")?,
            })),
            Feature::DLSS => FeatureInterface::Dlss(Arc::new(DlssTable {
                set_options: self.feature_function(feature, c"slDLSSSetOptions")?,
                get_optimal_settings: self.feature_function(feature, c"slDLSSGetOptimalSettings")?,
            })),
            Feature::DLSS_G => FeatureInterface::FrameGeneration(Arc::new(DlssgTable {
                set_options: self.feature_function(feature, c"slDLSSGSetOptions")?,
                get_state: self.feature_function(feature, c"slDLSSGGetState")?,
            })),
            _ => return None,
        };
        Some(interface)
    }
}

struct ReflexTable {
    set_options: sys::PfnReflexSetOptions,
    get_state: sys::PfnReflexGetState,
    sleep: sys::PfnReflexSleep,
}

impl ReflexFunctions for ReflexTable {
    fn set_options(&self, options: &ReflexOptions) -> SdkResult<()> {
        let raw = sys::SlReflexOptions::from(options);
        // SAFETY: resolved feature entry point; `raw` outlives the call.
        SdkError::check(unsafe { (self.set_options)(&raw) })
    }

    fn get_state(&self) -> SdkResult<ReflexState> {
        let mut raw = sys::SlReflexState::default();
        // SAFETY: `raw` is a writable, correctly tagged state structure.
        SdkError::check(unsafe { (self.get_state)(&mut raw) })?;
        Ok(ReflexState::from(&raw))
    }

    fn sleep(&self, frame: &FrameToken) -> SdkResult<()> {
        // SAFETY: the frame token was issued by this SDK instance.
        SdkError::check(unsafe { (self.sleep)(frame_ptr(frame)) })
    }
}

struct PclTable {
    set_marker: sys::PfnPclSetMarker,
}

impl PclFunctions for PclTable {
    fn set_marker(&self, marker: PclMarker, frame: &FrameToken) -> SdkResult<()> {
        // SAFETY: the frame token was issued by this SDK instance.
        SdkError::check(unsafe { (self.set_marker)(marker.raw(), frame_ptr(frame)) })
    }
}

struct DlssTable {
    set_options: sys::PfnDlssSetOptions,
    get_optimal_settings: sys::PfnDlssGetOptimalSettings,
}

impl DlssFunctions for DlssTable {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssOptions) -> SdkResult<()> {
        let viewport = sys::ViewportHandle::from(viewport);
        let raw = sys::SlDlssOptions::from(options);
        // SAFETY: both structures outlive the call.
        SdkError::check(unsafe { (self.set_options)(&viewport, &raw) })
    }

    fn get_optimal_settings(&self, options: &DlssOptions) -> SdkResult<DlssOptimalSettings> {
        let raw = sys::SlDlssOptions::from(options);
        let mut settings = sys::SlDlssOptimalSettings::default();
        // SAFETY: `settings` is writable and correctly tagged.
        SdkError::check(unsafe { (self.get_optimal_settings)(&raw, &mut settings) })?;
        Ok(DlssOptimalSettings::from(&settings))
    }
}

struct DlssgTable {
    set_options: sys::PfnDlssgSetOptions,
    get_state: sys::PfnDlssgGetState,
}

impl DlssgFunctions for DlssgTable {
    fn set_options(&self, viewport: ViewportHandle, options: &DlssgOptions) -> SdkResult<()> {
        let viewport = sys::ViewportHandle::from(viewport);
        let raw = sys::SlDlssgOptions::from(options);
        // SAFETY: both structures outlive the call.
        SdkError::check(unsafe { (self.set_options)(&viewport, &raw) })
    }

    fn get_state(
        &self,
        viewport: ViewportHandle,
        options: Option<&DlssgOptions>,
    ) -> SdkResult<DlssgState> {
        let viewport = sys::ViewportHandle::from(viewport);
        let raw_options = options.map(sys::SlDlssgOptions::from);
        let options_ptr = raw_options.as_ref().map_or(ptr::null(), |raw| raw as *const _);
        let mut state = sys::SlDlssgState::default();
        // SAFETY: `state` is writable; the optional options outlive the call.
        SdkError::check(unsafe { (self.get_state)(&viewport, &mut state, options_ptr) })?;
        Ok(DlssgState::from(&state))
    }
}
