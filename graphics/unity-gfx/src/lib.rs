//! Unity native graphics plugin interfaces
//!
//! Mirrors the host's interface registry, its graphics service and the D3D11
//! and D3D12 accessors, and implements the device acquisition policy on top
//! of them.

use std::sync::Arc;

use streamline::NativeHandle;

pub mod common;
pub mod d3d11;
pub mod d3d12;
pub mod host;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use common::{
    D3d11Accessor, D3d12Accessor, D3d12Version, DeviceError, DeviceEvent, DeviceEventCallback,
    GraphicsHost, RenderEventCallback, Renderer,
};
pub use host::{IUnityInterfaces, InterfaceGuid, UnityHost};

/// A device captured from the host
pub struct AcquiredDevice {
    pub renderer: Renderer,
    pub device: NativeHandle,
    /// Graphics queue, D3D12 only
    pub command_queue: Option<NativeHandle>,
    /// Accessor the device came from, D3D12 only
    pub d3d12: Option<Arc<dyn D3d12Accessor>>,
}

impl AcquiredDevice {
    pub fn is_d3d12(&self) -> bool {
        self.d3d12.is_some()
    }
}

/// Capture the host's device for its active renderer
///
/// D3D12 prefers the v7 accessor and falls back to v6 once. D3D11 only ever
/// queries the D3D11 accessor. Other renderers are not supported.
pub fn acquire_device(host: &dyn GraphicsHost) -> Result<AcquiredDevice, DeviceError> {
    let renderer = host.renderer();
    log::info!("Graphics init, renderer: {}", renderer);

    match renderer {
        Renderer::D3D12 => {
            let accessor = match host.d3d12(D3d12Version::V7) {
                Some(accessor) => accessor,
                None => {
                    log::debug!("D3D12 v7 accessor unavailable, trying v6");
                    host.d3d12(D3d12Version::V6)
                        .ok_or(DeviceError::InterfaceMissing("IUnityGraphicsD3D12v6"))?
                }
            };

            let name = accessor.version().interface_name();
            let device = accessor.device().ok_or(DeviceError::NullDevice(name))?;
            let command_queue = accessor.command_queue();
            log::info!(
                "D3D12 device {} (queue {:?}) via {}",
                device,
                command_queue,
                name
            );

            Ok(AcquiredDevice {
                renderer,
                device,
                command_queue,
                d3d12: Some(accessor),
            })
        }
        Renderer::D3D11 => {
            let accessor = host
                .d3d11()
                .ok_or(DeviceError::InterfaceMissing("IUnityGraphicsD3D11"))?;
            let device = accessor
                .device()
                .ok_or(DeviceError::NullDevice("IUnityGraphicsD3D11"))?;
            log::info!("D3D11 device {}", device);

            Ok(AcquiredDevice {
                renderer,
                device,
                command_queue: None,
                d3d12: None,
            })
        }
        other => Err(DeviceError::UnsupportedRenderer(other)),
    }
}
