//! Entry points the engine calls when it loads and unloads the plugin

use std::sync::Arc;

use unity_gfx::{DeviceEvent, IUnityInterfaces, UnityHost};

use crate::config::HostPaths;
use crate::logging;
use crate::plugin;

unsafe extern "system" fn on_graphics_device_event(event_type: i32) {
    match DeviceEvent::from_raw(event_type) {
        Some(event) => plugin::global().lock().on_device_event(event),
        None => log::debug!("Unknown graphics device event {}", event_type),
    }
}

/// # Safety
///
/// `interfaces` must be the registry the engine passes to plugins, valid
/// until [`UnityPluginUnload`].
#[no_mangle]
pub unsafe extern "system" fn UnityPluginLoad(interfaces: *mut IUnityInterfaces) {
    let config = logging::start(&HostPaths::current());

    let host = match UnityHost::from_raw(interfaces) {
        Ok(host) => host,
        Err(err) => {
            log::error!("UnityPluginLoad: {}", err);
            return;
        }
    };

    {
        let mut plugin = plugin::global().lock();
        plugin.session.set_config(config);
        let runtime = streamline::load_runtime(&plugin.session.plugin_paths());
        plugin.session.set_runtime(runtime);
    }
    plugin::load(plugin::global(), Arc::new(host), on_graphics_device_event);
}

#[no_mangle]
pub extern "system" fn UnityPluginUnload() {
    log::info!("UnityPluginUnload called");
    plugin::unload(plugin::global(), on_graphics_device_event);
    logging::close_log_file();
}
