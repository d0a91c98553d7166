//! Streamline SDK seam
//!
//! The vendor SDK is an opaque collaborator reached through a fixed set of
//! entry points. This crate gives those entry points Rust types:
//! - [`Streamline`]: core calls (init, device bind, frame tokens, tagging,
//!   constants, evaluation)
//! - per-feature function sets resolved by feature id at bind time and kept
//!   in a [`Capabilities`] table
//! - an interposer backend that loads the SDK runtime on Windows, and a
//!   [`Detached`] backend for hosts where it cannot be loaded
//!
//! With the `mock` feature a recording backend is available for tests.

pub mod capability;
pub mod detached;
pub mod result;
pub mod sdk;
pub mod sys;
pub mod types;

#[cfg(windows)]
pub mod interposer;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use capability::Capabilities;
pub use detached::Detached;
pub use result::{SdkError, SdkResult};
pub use sdk::{
    DlssFunctions, DlssgFunctions, FeatureInterface, PclFunctions, ReflexFunctions, Streamline,
};
pub use types::*;

use std::path::PathBuf;
use std::sync::Arc;

/// Load the SDK runtime, searching `dirs` before the system path
///
/// Falls back to [`Detached`] when the runtime cannot be loaded, so the
/// bridge still runs and reports the failure on initialization.
pub fn load_runtime(dirs: &[PathBuf]) -> Arc<dyn Streamline> {
    #[cfg(windows)]
    {
        match interposer::Interposer::load(dirs) {
            Ok(runtime) => return Arc::new(runtime),
            Err(err) => log::warn!("Streamline runtime unavailable: {}", err),
        }
    }
    #[cfg(not(windows))]
    {
        log::debug!(
            "Streamline runtime is Windows-only, {} search paths ignored",
            dirs.len()
        );
    }

    Arc::new(Detached)
}
