//! Common host graphics types

use core::fmt;
use std::sync::Arc;

use streamline::NativeHandle;

/// Graphics API the host renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Renderer(pub i32);

impl Renderer {
    pub const D3D11: Self = Self(2);
    pub const NULL: Self = Self(4);
    pub const D3D12: Self = Self(18);
    pub const VULKAN: Self = Self(21);

    pub fn name(&self) -> &'static str {
        match *self {
            Self::D3D11 => "Direct3D 11",
            Self::NULL => "Null",
            Self::D3D12 => "Direct3D 12",
            Self::VULKAN => "Vulkan",
            _ => "Other",
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Graphics device lifecycle event delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Initialize,
    Shutdown,
    BeforeReset,
    AfterReset,
}

impl DeviceEvent {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(DeviceEvent::Initialize),
            1 => Some(DeviceEvent::Shutdown),
            2 => Some(DeviceEvent::BeforeReset),
            3 => Some(DeviceEvent::AfterReset),
            _ => None,
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            DeviceEvent::Initialize => 0,
            DeviceEvent::Shutdown => 1,
            DeviceEvent::BeforeReset => 2,
            DeviceEvent::AfterReset => 3,
        }
    }
}

/// Device event callback as registered with the host
pub type DeviceEventCallback = unsafe extern "system" fn(event_type: i32);

/// Render-thread event callback handed to the host's plugin event queue
pub type RenderEventCallback = unsafe extern "system" fn(event_id: i32);

/// Host graphics error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("host interface registry is null")]
    NullInterfaces,
    #[error("host does not expose {0}")]
    InterfaceMissing(&'static str),
    #[error("{0} returned no device")]
    NullDevice(&'static str),
    #[error("renderer {0} is not supported")]
    UnsupportedRenderer(Renderer),
}

/// D3D12 accessor interface revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum D3d12Version {
    V7,
    V6,
}

impl D3d12Version {
    pub fn interface_name(&self) -> &'static str {
        match self {
            D3d12Version::V7 => "IUnityGraphicsD3D12v7",
            D3d12Version::V6 => "IUnityGraphicsD3D12v6",
        }
    }
}

/// Host-side D3D12 accessor
pub trait D3d12Accessor: Send + Sync {
    fn version(&self) -> D3d12Version;

    fn device(&self) -> Option<NativeHandle>;

    fn command_queue(&self) -> Option<NativeHandle>;

    /// Command list the host is currently recording into
    ///
    /// Only meaningful on the render thread, inside a plugin event.
    fn command_recording_state(&self) -> Option<NativeHandle>;
}

/// Host-side D3D11 accessor
pub trait D3d11Accessor: Send + Sync {
    fn device(&self) -> Option<NativeHandle>;
}

/// The host's graphics plugin services
pub trait GraphicsHost: Send + Sync {
    fn renderer(&self) -> Renderer;

    /// Query a D3D12 accessor of exactly `version`
    fn d3d12(&self, version: D3d12Version) -> Option<Arc<dyn D3d12Accessor>>;

    fn d3d11(&self) -> Option<Arc<dyn D3d11Accessor>>;

    fn register_device_event_callback(&self, callback: DeviceEventCallback);

    fn unregister_device_event_callback(&self, callback: DeviceEventCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_event_codes() {
        for raw in 0..4 {
            assert_eq!(DeviceEvent::from_raw(raw).map(|event| event.raw()), Some(raw));
        }
        assert_eq!(DeviceEvent::from_raw(4), None);
    }

    #[test]
    fn test_renderer_display() {
        assert_eq!(Renderer::D3D12.to_string(), "Direct3D 12 (18)");
        assert_eq!(Renderer(99).name(), "Other");
        assert_eq!(Renderer::default(), Renderer::NULL);
    }
}
