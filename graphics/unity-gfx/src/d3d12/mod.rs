//! D3D12 accessor interfaces

use core::ffi::c_void;
use core::ptr::{self, NonNull};

use static_assertions::assert_eq_size;
use streamline::NativeHandle;

use crate::common::{D3d12Accessor, D3d12Version};
use crate::host::InterfaceGuid;

pub const UNITY_GRAPHICS_D3D12_V7_GUID: InterfaceGuid =
    InterfaceGuid::new(0x4624_B0DA_41B6_4AAC, 0x915A_ABCB_9BC3_F0D3);
pub const UNITY_GRAPHICS_D3D12_V6_GUID: InterfaceGuid =
    InterfaceGuid::new(0xA396_DCE5_8CAC_4D78, 0xAFDD_9B28_1F20_B840);

impl D3d12Version {
    pub fn guid(&self) -> InterfaceGuid {
        match self {
            D3d12Version::V7 => UNITY_GRAPHICS_D3D12_V7_GUID,
            D3d12Version::V6 => UNITY_GRAPHICS_D3D12_V6_GUID,
        }
    }
}

/// Command list the host is recording into
#[repr(C)]
pub struct RecordingState {
    pub command_list: *mut c_void,
}

type GetPointer = Option<unsafe extern "system" fn() -> *mut c_void>;
type GetU32 = Option<unsafe extern "system" fn() -> u32>;
type GetU64 = Option<unsafe extern "system" fn() -> u64>;
type ExecuteCommandList =
    Option<unsafe extern "system" fn(command_list: *mut c_void, state_count: i32, states: *mut c_void) -> u64>;
type SetMemoryControl = Option<unsafe extern "system" fn(values: *const c_void)>;
type TextureFrom = Option<unsafe extern "system" fn(handle: *mut c_void) -> *mut c_void>;
type ConfigureEvent = Option<unsafe extern "system" fn(event_id: i32, config: *const c_void)>;
type CommandRecordingState = Option<unsafe extern "system" fn(state: *mut RecordingState) -> bool>;

/// `IUnityGraphicsD3D12v7` function table
#[repr(C)]
pub struct IUnityGraphicsD3D12v7 {
    pub get_device: GetPointer,
    pub get_swap_chain: GetPointer,
    pub get_sync_interval: GetU32,
    pub get_present_flags: GetU32,
    pub get_frame_fence: GetPointer,
    pub get_next_frame_fence_value: GetU64,
    pub execute_command_list: ExecuteCommandList,
    pub set_physical_video_memory_control_values: SetMemoryControl,
    pub get_command_queue: GetPointer,
    pub texture_from_render_buffer: TextureFrom,
    pub texture_from_native_texture: TextureFrom,
    pub configure_event: ConfigureEvent,
    pub command_recording_state: CommandRecordingState,
}

/// `IUnityGraphicsD3D12v6` function table
#[repr(C)]
pub struct IUnityGraphicsD3D12v6 {
    pub get_device: GetPointer,
    pub get_frame_fence: GetPointer,
    pub get_next_frame_fence_value: GetU64,
    pub execute_command_list: ExecuteCommandList,
    pub set_physical_video_memory_control_values: SetMemoryControl,
    pub get_command_queue: GetPointer,
    pub texture_from_render_buffer: TextureFrom,
    pub texture_from_native_texture: TextureFrom,
    pub configure_event: ConfigureEvent,
    pub command_recording_state: CommandRecordingState,
}

assert_eq_size!(IUnityGraphicsD3D12v7, [usize; 13]);
assert_eq_size!(IUnityGraphicsD3D12v6, [usize; 10]);
assert_eq_size!(RecordingState, usize);

enum Table {
    V7(NonNull<IUnityGraphicsD3D12v7>),
    V6(NonNull<IUnityGraphicsD3D12v6>),
}

/// D3D12 accessor backed by a host function table
pub struct UnityD3d12 {
    table: Table,
}

// SAFETY: the host's function tables are immutable and thread-safe for the
// lifetime of the plugin.
unsafe impl Send for UnityD3d12 {}
unsafe impl Sync for UnityD3d12 {}

impl UnityD3d12 {
    /// Wrap a table returned for `version`'s GUID, `None` if null
    ///
    /// # Safety
    ///
    /// `ptr` must point to the host's table for exactly `version` and stay
    /// valid until the plugin is unloaded.
    pub unsafe fn from_raw(version: D3d12Version, ptr: *mut c_void) -> Option<Self> {
        let table = match version {
            D3d12Version::V7 => Table::V7(NonNull::new(ptr.cast())?),
            D3d12Version::V6 => Table::V6(NonNull::new(ptr.cast())?),
        };
        Some(Self { table })
    }

    fn call_pointer(get: GetPointer) -> Option<NativeHandle> {
        // SAFETY: entries come from a live host table and take no arguments.
        get.and_then(|get| NativeHandle::new(unsafe { get() }))
    }

    fn recording_state(get: CommandRecordingState) -> Option<NativeHandle> {
        let get = get?;
        let mut state = RecordingState {
            command_list: ptr::null_mut(),
        };
        // SAFETY: `state` is a valid out-parameter for the duration of the call.
        if unsafe { get(&mut state) } {
            NativeHandle::new(state.command_list)
        } else {
            None
        }
    }
}

impl D3d12Accessor for UnityD3d12 {
    fn version(&self) -> D3d12Version {
        match self.table {
            Table::V7(_) => D3d12Version::V7,
            Table::V6(_) => D3d12Version::V6,
        }
    }

    fn device(&self) -> Option<NativeHandle> {
        // SAFETY: the table pointer is valid per `from_raw`'s contract.
        match self.table {
            Table::V7(table) => Self::call_pointer(unsafe { table.as_ref() }.get_device),
            Table::V6(table) => Self::call_pointer(unsafe { table.as_ref() }.get_device),
        }
    }

    fn command_queue(&self) -> Option<NativeHandle> {
        // SAFETY: the table pointer is valid per `from_raw`'s contract.
        match self.table {
            Table::V7(table) => Self::call_pointer(unsafe { table.as_ref() }.get_command_queue),
            Table::V6(table) => Self::call_pointer(unsafe { table.as_ref() }.get_command_queue),
        }
    }

    fn command_recording_state(&self) -> Option<NativeHandle> {
        // SAFETY: the table pointer is valid per `from_raw`'s contract.
        match self.table {
            Table::V7(table) => {
                Self::recording_state(unsafe { table.as_ref() }.command_recording_state)
            }
            Table::V6(table) => {
                Self::recording_state(unsafe { table.as_ref() }.command_recording_state)
            }
        }
    }
}
