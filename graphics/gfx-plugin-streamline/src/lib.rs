//! Unity native plugin for NVIDIA Streamline
//!
//! The engine loads this library at startup and drives it through the
//! exports in [`exports`]:
//! - Reflex low-latency mode, pacing sleep and PC-latency markers
//! - DLSS super resolution with immediate or render-thread evaluation
//! - DLSS frame generation and the combined presets
//!
//! Device capture comes from the engine's graphics interfaces. SDK
//! initialization follows the device lifecycle the engine reports.

pub mod config;
pub mod error;
pub mod exports;
pub mod logging;
pub mod plugin;
pub mod session;

pub use config::{BridgeConfig, HostPaths, SdkLogLevel, PLUGIN_NAME};
pub use error::BridgeError;
pub use plugin::Plugin;
pub use session::{LastError, Lifecycle, RenderEventOutcome, Session, SupportedFeatures};
