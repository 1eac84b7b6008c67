//! # arrival-monitor
//!
//! Device arrival notifications for a driver that manages a set of device
//! targets.
//!
//! The monitor subscribes to one event class on an
//! [`EventProvider`](event_provider::EventProvider). When an event arrives it
//! scans the driver's [`TargetRegistry`] under the registry lock, finds the
//! started target whose device fired the event, resolves a display name for it
//! and reports `"<name> fired a device arrival event"` to a [`ReportSink`].
//!
//! ## Components
//!
//! - [`NotificationSubscription`]: at most one provider subscription per
//!   owner; a failed registration never leaks the opened block
//! - [`EventDispatcher`]: the per-event scan, with each target classified into
//!   a [`TargetOutcome`]
//! - [`PropertyResolver`]: friendly name with a device description fallback
//! - [`ArrivalMonitor`]: the owner binding all of the above
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arrival_monitor::prelude::*;
//!
//! let monitor = ArrivalMonitor::new(provider, registry, TracingSink, MonitorConfig::default())?;
//! monitor.register()?;
//! // ... events are dispatched as the provider fires them ...
//! monitor.unregister();
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod subscription;
pub mod types;

pub use config::MonitorConfig;
pub use dispatcher::{DispatchSummary, EventDispatcher, MatchedTarget, SkipReason, TargetOutcome};
pub use error::{DispatchError, MonitorError, PropertyError, Result};
pub use monitor::ArrivalMonitor;
pub use registry::{InMemoryTargetRegistry, LockedTargets, TargetRegistry};
pub use report::{ReportSink, TracingSink};
pub use resolver::PropertyResolver;
pub use subscription::{NotificationSubscription, Subscription};
pub use types::{NameResult, PropertyKind, TargetEntry, TargetHandle, TargetState};

// Re-export commonly used types from the provider crate
pub use event_provider::{
    EventGuid, EventProvider, LocalProvider, NotificationEvent, ProviderId, DEVICE_ARRIVAL_EVENT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArrivalMonitor, DispatchSummary, EventDispatcher, EventGuid, EventProvider,
        InMemoryTargetRegistry, LocalProvider, MonitorConfig, MonitorError, NameResult,
        NotificationEvent, PropertyKind, ProviderId, ReportSink, Result, TargetHandle,
        TargetRegistry, TargetState, TracingSink, DEVICE_ARRIVAL_EVENT,
    };
}
