//! Process-wide plugin state
//!
//! The exported functions reach the session through one global mutex. Calls
//! that block inside the SDK (the pacing sleep) take what they need under the
//! lock and release it before blocking.

use std::sync::Arc;

use latency::{LatencyError, ReflexEvent};
use parking_lot::Mutex;
use streamline::{Detached, PclMarker};
use unity_gfx::{DeviceEvent, DeviceEventCallback, GraphicsHost};

use crate::config::{BridgeConfig, HostPaths};
use crate::error::BridgeError;
use crate::session::Session;

/// The session plus the host it was loaded by
pub struct Plugin {
    pub session: Session,
    host: Option<Arc<dyn GraphicsHost>>,
}

impl Plugin {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            host: None,
        }
    }

    pub fn host(&self) -> Option<&Arc<dyn GraphicsHost>> {
        self.host.as_ref()
    }

    pub fn attach_host(&mut self, host: Arc<dyn GraphicsHost>) {
        self.host = Some(host);
    }

    pub fn detach_host(&mut self) -> Option<Arc<dyn GraphicsHost>> {
        self.host.take()
    }

    pub fn on_device_event(&mut self, event: DeviceEvent) {
        match self.host.clone() {
            Some(host) => self.session.on_device_event(host.as_ref(), event),
            None => log::warn!("Device event {:?} without a host", event),
        }
    }
}

static PLUGIN: spin::Lazy<Mutex<Plugin>> = spin::Lazy::new(|| {
    Mutex::new(Plugin::new(Session::new(
        Arc::new(Detached),
        BridgeConfig::default(),
        HostPaths::current(),
    )))
});

pub fn global() -> &'static Mutex<Plugin> {
    &PLUGIN
}

/// Attach `host`, listen for its device events and replay the initialize
/// event the host sent before the plugin was loaded
///
/// The host is called without the plugin lock held.
pub fn load(plugin: &Mutex<Plugin>, host: Arc<dyn GraphicsHost>, callback: DeviceEventCallback) {
    plugin.lock().attach_host(host.clone());
    host.register_device_event_callback(callback);
    plugin.lock().on_device_event(DeviceEvent::Initialize);
}

/// Stop listening for device events and shut the SDK down
pub fn unload(plugin: &Mutex<Plugin>, callback: DeviceEventCallback) {
    let host = plugin.lock().detach_host();
    if let Some(host) = host {
        host.unregister_device_event_callback(callback);
    }
    plugin.lock().session.shutdown();
}

/// Pacing sleep for the current frame, run with the lock released
pub fn sleep(plugin: &Mutex<Plugin>) -> Result<(), BridgeError> {
    let ticket = plugin.lock().session.prepare_sleep()?;
    ticket.sleep()?;
    Ok(())
}

/// Handle one event from the host's render-thread event queue
///
/// Frame begin advances the counter, sleeps and marks the simulation start;
/// the start marker is sent even when the sleep could not run.
pub fn dispatch_reflex_event(plugin: &Mutex<Plugin>, event_id: i32) -> Result<(), BridgeError> {
    match ReflexEvent::from_id(event_id) {
        Some(ReflexEvent::FrameBegin) => {
            let ticket = {
                let mut plugin = plugin.lock();
                plugin.session.begin_frame()?;
                plugin.session.prepare_sleep()
            };
            match ticket.map(|ticket| ticket.sleep().map_err(BridgeError::from)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) | Err(err) => log::debug!("Frame begin without sleep: {}", err),
            }
            plugin.lock().session.mark(PclMarker::SIMULATION_START)?;
        }
        Some(ReflexEvent::Marker(marker)) => {
            plugin.lock().session.mark(marker)?;
        }
        None => {
            log::trace!("Unknown Reflex render event {}", event_id);
            return Err(LatencyError::InvalidMarker(event_id).into());
        }
    }
    Ok(())
}
