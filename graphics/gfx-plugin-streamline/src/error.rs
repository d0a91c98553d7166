//! Bridge error types

use latency::LatencyError;
use streamline::{Feature, SdkError};
use unity_gfx::DeviceError;
use upscaling::UpscalingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Streamline not initialized")]
    NotInitialized,
    #[error("no D3D device available")]
    NoDevice,
    #[error("{0} not supported")]
    Unsupported(Feature),
    #[error("{0} functions not exported by the SDK")]
    Unavailable(Feature),
    #[error("slInit failed: {0}")]
    Init(SdkError),
    #[error("slSetD3DDevice failed: {0}")]
    DeviceBind(SdkError),
    #[error("no D3D12 graphics interface")]
    NoD3d12Interface,
    #[error("no command list being recorded")]
    NoCommandList,
    #[error("null pointer argument")]
    NullPointer,
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Latency(#[from] LatencyError),
    #[error(transparent)]
    Upscaling(#[from] UpscalingError),
    #[error(transparent)]
    Sdk(#[from] SdkError),
}
