//! Recording host for tests
//!
//! Every host query is logged so tests can assert which accessors were
//! consulted and in which order.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use streamline::NativeHandle;

use crate::common::{
    D3d11Accessor, D3d12Accessor, D3d12Version, DeviceEventCallback, GraphicsHost, Renderer,
};

/// One recorded host query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostQuery {
    Renderer,
    D3d12(D3d12Version),
    D3d11,
    CommandRecordingState(D3d12Version),
    RegisterDeviceEvents,
    UnregisterDeviceEvents,
}

struct MockHostState {
    renderer: Renderer,
    d3d12_versions: HashSet<D3d12Version>,
    d3d12_device: Option<usize>,
    d3d12_queue: Option<usize>,
    d3d11_device: Option<usize>,
    command_list: Option<usize>,
    callback: Option<DeviceEventCallback>,
    queries: Vec<HostQuery>,
}

/// Shared-handle mock host; clones observe the same state
#[derive(Clone)]
pub struct MockHost {
    state: Arc<Mutex<MockHostState>>,
}

impl MockHost {
    /// Host reporting `renderer` with no accessors at all
    pub fn new(renderer: Renderer) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockHostState {
                renderer,
                d3d12_versions: HashSet::new(),
                d3d12_device: None,
                d3d12_queue: None,
                d3d11_device: None,
                command_list: None,
                callback: None,
                queries: Vec::new(),
            })),
        }
    }

    /// D3D12 host exposing both accessor revisions
    pub fn d3d12(device: usize, queue: usize) -> Self {
        let host = Self::new(Renderer::D3D12);
        {
            let mut state = host.state.lock();
            state.d3d12_versions.extend([D3d12Version::V7, D3d12Version::V6]);
            state.d3d12_device = Some(device);
            state.d3d12_queue = Some(queue);
        }
        host
    }

    pub fn d3d11(device: usize) -> Self {
        let host = Self::new(Renderer::D3D11);
        host.state.lock().d3d11_device = Some(device);
        host
    }

    pub fn remove_d3d12(&self, version: D3d12Version) {
        self.state.lock().d3d12_versions.remove(&version);
    }

    pub fn set_renderer(&self, renderer: Renderer) {
        self.state.lock().renderer = renderer;
    }

    pub fn set_d3d12_device(&self, device: Option<usize>) {
        self.state.lock().d3d12_device = device;
    }

    /// Command list reported while "recording", `None` outside a render pass
    pub fn set_command_list(&self, command_list: Option<usize>) {
        self.state.lock().command_list = command_list;
    }

    /// Callback currently registered for device events
    pub fn device_event_callback(&self) -> Option<DeviceEventCallback> {
        self.state.lock().callback
    }

    pub fn queries(&self) -> Vec<HostQuery> {
        self.state.lock().queries.clone()
    }

    pub fn clear_queries(&self) {
        self.state.lock().queries.clear();
    }

    pub fn d3d12_queries(&self) -> usize {
        self.state
            .lock()
            .queries
            .iter()
            .filter(|query| matches!(query, HostQuery::D3d12(_)))
            .count()
    }

    fn record(&self, query: HostQuery) {
        self.state.lock().queries.push(query);
    }
}

impl GraphicsHost for MockHost {
    fn renderer(&self) -> Renderer {
        self.record(HostQuery::Renderer);
        self.state.lock().renderer
    }

    fn d3d12(&self, version: D3d12Version) -> Option<Arc<dyn D3d12Accessor>> {
        self.record(HostQuery::D3d12(version));
        if !self.state.lock().d3d12_versions.contains(&version) {
            return None;
        }
        Some(Arc::new(MockD3d12 {
            host: self.clone(),
            version,
        }))
    }

    fn d3d11(&self) -> Option<Arc<dyn D3d11Accessor>> {
        self.record(HostQuery::D3d11);
        let device = self.state.lock().d3d11_device?;
        Some(Arc::new(MockD3d11 { device }))
    }

    fn register_device_event_callback(&self, callback: DeviceEventCallback) {
        self.record(HostQuery::RegisterDeviceEvents);
        self.state.lock().callback = Some(callback);
    }

    fn unregister_device_event_callback(&self, _callback: DeviceEventCallback) {
        self.record(HostQuery::UnregisterDeviceEvents);
        self.state.lock().callback = None;
    }
}

struct MockD3d12 {
    host: MockHost,
    version: D3d12Version,
}

impl D3d12Accessor for MockD3d12 {
    fn version(&self) -> D3d12Version {
        self.version
    }

    fn device(&self) -> Option<NativeHandle> {
        NativeHandle::from_addr(self.host.state.lock().d3d12_device?)
    }

    fn command_queue(&self) -> Option<NativeHandle> {
        NativeHandle::from_addr(self.host.state.lock().d3d12_queue?)
    }

    fn command_recording_state(&self) -> Option<NativeHandle> {
        self.host
            .record(HostQuery::CommandRecordingState(self.version));
        NativeHandle::from_addr(self.host.state.lock().command_list?)
    }
}

struct MockD3d11 {
    device: usize,
}

impl D3d11Accessor for MockD3d11 {
    fn device(&self) -> Option<NativeHandle> {
        NativeHandle::from_addr(self.device)
    }
}
