//! Latency reduction over the Streamline SDK
//!
//! This crate drives the SDK's low-latency features:
//! - NVIDIA Reflex mode control and the pacing sleep
//! - PC-latency markers
//! - Latency report aggregation

pub mod common;
pub mod frame_pacing;
pub mod reflex;

pub use common::{LatencyError, LatencyStats};
pub use frame_pacing::{FrameCounter, SleepTicket};
pub use reflex::{set_marker, ReflexContext, ReflexEvent};
