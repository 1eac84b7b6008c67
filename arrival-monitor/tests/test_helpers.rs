//! Shared helpers for the arrival-monitor integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arrival_monitor::{
    ArrivalMonitor, InMemoryTargetRegistry, LocalProvider, MonitorConfig, PropertyKind,
    ProviderId, ReportSink, TargetHandle, TargetState,
};
use parking_lot::Mutex;

/// Sink that keeps every reported message.
#[derive(Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn arrivals(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.ends_with("fired a device arrival event"))
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn report(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub type TestMonitor = ArrivalMonitor<Arc<LocalProvider>, InMemoryTargetRegistry, RecordingSink>;

/// Everything a test needs to drive a monitor end to end.
pub struct Harness {
    pub provider: Arc<LocalProvider>,
    pub registry: Arc<InMemoryTargetRegistry>,
    pub sink: RecordingSink,
    pub monitor: TestMonitor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        let provider = Arc::new(LocalProvider::new());
        let registry = Arc::new(InMemoryTargetRegistry::new());
        let sink = RecordingSink::default();
        let monitor = ArrivalMonitor::new(
            Arc::clone(&provider),
            Arc::clone(&registry),
            sink.clone(),
            config,
        )
        .expect("default test config is valid");

        Self {
            provider,
            registry,
            sink,
            monitor,
        }
    }

    /// Add a target with a friendly name.
    pub fn add_named_target(&self, id: u32, state: TargetState, name: &str) -> TargetHandle {
        let handle = self.registry.add_target(Some(ProviderId(id)), state);
        self.registry
            .set_property(handle, PropertyKind::FriendlyName, name);
        handle
    }
}
