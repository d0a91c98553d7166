//! The host's interface registry and graphics services

use core::ffi::c_void;
use core::ptr::NonNull;
use std::sync::Arc;

use static_assertions::assert_eq_size;

use crate::common::{
    D3d11Accessor, D3d12Accessor, D3d12Version, DeviceError, DeviceEventCallback, GraphicsHost,
    Renderer,
};
use crate::d3d11::{UnityD3d11, UNITY_GRAPHICS_D3D11_GUID};
use crate::d3d12::UnityD3d12;

/// 128-bit interface id, split the way the host passes it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceGuid {
    pub high: u64,
    pub low: u64,
}

impl InterfaceGuid {
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }
}

pub const UNITY_GRAPHICS_GUID: InterfaceGuid =
    InterfaceGuid::new(0x7CBA_0A9C_A4DD_B544, 0x8C5A_D492_6EB1_7B11);

/// `IUnityInterfaces` registry table
#[repr(C)]
pub struct IUnityInterfaces {
    pub get_interface: Option<unsafe extern "system" fn(guid: InterfaceGuid) -> *mut c_void>,
    pub register_interface:
        Option<unsafe extern "system" fn(guid: InterfaceGuid, interface: *mut c_void)>,
    pub get_interface_split: Option<unsafe extern "system" fn(high: u64, low: u64) -> *mut c_void>,
    pub register_interface_split:
        Option<unsafe extern "system" fn(high: u64, low: u64, interface: *mut c_void)>,
}

/// `IUnityGraphics` table
#[repr(C)]
pub struct IUnityGraphics {
    pub get_renderer: Option<unsafe extern "system" fn() -> i32>,
    pub register_device_event_callback: Option<unsafe extern "system" fn(DeviceEventCallback)>,
    pub unregister_device_event_callback: Option<unsafe extern "system" fn(DeviceEventCallback)>,
    pub reserve_event_id_range: Option<unsafe extern "system" fn(count: i32) -> i32>,
}

assert_eq_size!(InterfaceGuid, [u64; 2]);
assert_eq_size!(IUnityInterfaces, [usize; 4]);
assert_eq_size!(IUnityGraphics, [usize; 4]);

/// The host as seen through `UnityPluginLoad`'s registry
pub struct UnityHost {
    interfaces: NonNull<IUnityInterfaces>,
    graphics: NonNull<IUnityGraphics>,
}

// SAFETY: registry and graphics tables are owned by the host, immutable and
// callable from any thread while the plugin is loaded.
unsafe impl Send for UnityHost {}
unsafe impl Sync for UnityHost {}

impl UnityHost {
    /// Capture the registry and its graphics service
    ///
    /// # Safety
    ///
    /// `interfaces` must be null or the registry passed to `UnityPluginLoad`,
    /// valid until `UnityPluginUnload`.
    pub unsafe fn from_raw(interfaces: *mut IUnityInterfaces) -> Result<Self, DeviceError> {
        let interfaces = NonNull::new(interfaces).ok_or(DeviceError::NullInterfaces)?;
        let graphics = Self::lookup(interfaces, UNITY_GRAPHICS_GUID);
        let graphics = NonNull::new(graphics.cast::<IUnityGraphics>())
            .ok_or(DeviceError::InterfaceMissing("IUnityGraphics"))?;

        Ok(Self {
            interfaces,
            graphics,
        })
    }

    fn lookup(interfaces: NonNull<IUnityInterfaces>, guid: InterfaceGuid) -> *mut c_void {
        // SAFETY: the registry is valid per `from_raw`'s contract.
        match unsafe { interfaces.as_ref() }.get_interface_split {
            Some(get) => unsafe { get(guid.high, guid.low) },
            None => core::ptr::null_mut(),
        }
    }

    fn interface(&self, guid: InterfaceGuid) -> *mut c_void {
        Self::lookup(self.interfaces, guid)
    }

    fn graphics(&self) -> &IUnityGraphics {
        // SAFETY: checked non-null in `from_raw`, valid until unload.
        unsafe { self.graphics.as_ref() }
    }
}

impl GraphicsHost for UnityHost {
    fn renderer(&self) -> Renderer {
        match self.graphics().get_renderer {
            // SAFETY: host entry point without arguments.
            Some(get) => Renderer(unsafe { get() }),
            None => Renderer::NULL,
        }
    }

    fn d3d12(&self, version: D3d12Version) -> Option<Arc<dyn D3d12Accessor>> {
        let table = self.interface(version.guid());
        // SAFETY: the registry returned this table for `version`'s GUID.
        let accessor = unsafe { UnityD3d12::from_raw(version, table) }?;
        Some(Arc::new(accessor))
    }

    fn d3d11(&self) -> Option<Arc<dyn D3d11Accessor>> {
        let table = self.interface(UNITY_GRAPHICS_D3D11_GUID);
        // SAFETY: the registry returned this table for the D3D11 GUID.
        let accessor = unsafe { UnityD3d11::from_raw(table) }?;
        Some(Arc::new(accessor))
    }

    fn register_device_event_callback(&self, callback: DeviceEventCallback) {
        if let Some(register) = self.graphics().register_device_event_callback {
            // SAFETY: `callback` is a plain function valid for the process lifetime.
            unsafe { register(callback) };
        }
    }

    fn unregister_device_event_callback(&self, callback: DeviceEventCallback) {
        if let Some(unregister) = self.graphics().unregister_device_event_callback {
            // SAFETY: as for registration.
            unsafe { unregister(callback) };
        }
    }
}
