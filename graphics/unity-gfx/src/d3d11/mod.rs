//! D3D11 accessor interface

use core::ffi::c_void;
use core::ptr::NonNull;

use streamline::NativeHandle;

use crate::common::D3d11Accessor;
use crate::host::InterfaceGuid;

pub const UNITY_GRAPHICS_D3D11_GUID: InterfaceGuid =
    InterfaceGuid::new(0xAAB3_7EF8_7A87_D748, 0xBF76_967F_07EF_B177);

/// Leading entries of the `IUnityGraphicsD3D11` function table
///
/// Only the prefix the bridge calls is mirrored; the table is never
/// constructed or copied on this side.
#[repr(C)]
pub struct IUnityGraphicsD3D11 {
    pub get_device: Option<unsafe extern "system" fn() -> *mut c_void>,
}

pub struct UnityD3d11 {
    table: NonNull<IUnityGraphicsD3D11>,
}

// SAFETY: the host's function table is immutable for the plugin's lifetime.
unsafe impl Send for UnityD3d11 {}
unsafe impl Sync for UnityD3d11 {}

impl UnityD3d11 {
    /// # Safety
    ///
    /// `ptr` must be null or the host's D3D11 table, valid until unload.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr.cast()).map(|table| Self { table })
    }
}

impl D3d11Accessor for UnityD3d11 {
    fn device(&self) -> Option<NativeHandle> {
        // SAFETY: the table is valid per `from_raw`'s contract and
        // `GetDevice` takes no arguments.
        let get_device = unsafe { self.table.as_ref() }.get_device?;
        NativeHandle::new(unsafe { get_device() })
    }
}
