//! Configuration for the arrival monitor
//!
//! Selects the event class the monitor subscribes to and the pair of device
//! properties used to name a matched target.

use event_provider::{EventGuid, DEVICE_ARRIVAL_EVENT};

use crate::error::{MonitorError, Result};
use crate::types::PropertyKind;

/// Configuration for an [`ArrivalMonitor`](crate::ArrivalMonitor)
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Event class to subscribe to and match against
    /// Default: the device arrival class
    pub event_class: EventGuid,

    /// Property queried first when naming a target
    /// Default: FriendlyName
    pub primary_property: PropertyKind,

    /// Property queried when the primary one is not populated
    /// Default: DeviceDescription
    pub fallback_property: PropertyKind,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            event_class: DEVICE_ARRIVAL_EVENT,
            primary_property: PropertyKind::FriendlyName,
            fallback_property: PropertyKind::DeviceDescription,
        }
    }
}

impl MonitorConfig {
    /// Create a new MonitorConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.event_class.is_nil() {
            return Err(MonitorError::Configuration(
                "Event class must not be the nil GUID".to_string(),
            ));
        }

        if self.primary_property == self.fallback_property {
            return Err(MonitorError::Configuration(format!(
                "Fallback property must differ from primary property ({:?})",
                self.primary_property
            )));
        }

        Ok(())
    }

    pub fn with_event_class(mut self, event_class: EventGuid) -> Self {
        self.event_class = event_class;
        self
    }

    pub fn with_properties(mut self, primary: PropertyKind, fallback: PropertyKind) -> Self {
        self.primary_property = primary;
        self.fallback_property = fallback;
        self
    }
}
