//! The owner that ties a provider subscription to the event dispatcher.

use std::sync::Arc;

use event_provider::{EventProvider, NotificationCallback, NotificationEvent};

use crate::config::MonitorConfig;
use crate::dispatcher::EventDispatcher;
use crate::error::Result;
use crate::registry::TargetRegistry;
use crate::report::ReportSink;
use crate::subscription::{NotificationSubscription, Subscription};

/// Device arrival monitor for one driver instance.
///
/// Binds the provider, the target registry and the report sink at
/// construction. The notification callback installed by [`register`] holds a
/// typed reference to this monitor's dispatcher, so no untyped context is
/// passed through the provider. Dropping the monitor releases its
/// subscription.
///
/// [`register`]: ArrivalMonitor::register
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrival_monitor::prelude::*;
///
/// let provider = Arc::new(LocalProvider::new());
/// let registry = Arc::new(InMemoryTargetRegistry::new());
/// let toaster = registry.add_target(Some(ProviderId(7)), TargetState::Started);
/// registry.set_property(toaster, PropertyKind::FriendlyName, "Kitchen Toaster");
///
/// let monitor = ArrivalMonitor::new(
///     Arc::clone(&provider),
///     registry,
///     TracingSink,
///     MonitorConfig::default(),
/// )?;
/// monitor.register()?;
///
/// assert_eq!(provider.fire(ProviderId(7), DEVICE_ARRIVAL_EVENT, b""), 1);
/// monitor.unregister();
/// # Ok::<(), MonitorError>(())
/// ```
pub struct ArrivalMonitor<P, R, S>
where
    P: EventProvider,
{
    dispatcher: Arc<EventDispatcher<R, S>>,
    subscription: NotificationSubscription<P>,
}

impl<P, R, S> ArrivalMonitor<P, R, S>
where
    P: EventProvider,
    R: TargetRegistry + 'static,
    S: ReportSink + 'static,
{
    /// Create a monitor after validating `config`.
    pub fn new(provider: P, registry: Arc<R>, sink: S, config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            dispatcher: Arc::new(EventDispatcher::new(registry, sink, &config)),
            subscription: NotificationSubscription::new(provider, config.event_class),
        })
    }

    /// Subscribe to the configured event class.
    ///
    /// See [`NotificationSubscription::register`] for the failure modes.
    pub fn register(&self) -> Result<Subscription> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let callback: NotificationCallback =
            Arc::new(move |buffer: &[u8]| deliver(&dispatcher, buffer));

        self.subscription.register(callback)
    }

    /// Release the subscription. Does nothing if none is active.
    pub fn unregister(&self) {
        self.subscription.unregister();
    }

    pub fn is_registered(&self) -> bool {
        self.subscription.is_registered()
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription.active()
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher<R, S>> {
        &self.dispatcher
    }

    pub fn provider(&self) -> &P {
        self.subscription.provider()
    }
}

/// Provider-facing entry point. The provider has no use for a result, so
/// failures end here as log output.
fn deliver<R: TargetRegistry, S: ReportSink>(dispatcher: &EventDispatcher<R, S>, buffer: &[u8]) {
    let event = match NotificationEvent::parse(buffer) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping malformed notification: {}", e);
            return;
        }
    };

    match dispatcher.dispatch(&event) {
        Ok(summary) => tracing::debug!(
            "Event from provider {} examined {} target(s), matched: {:?}",
            event.provider_id(),
            summary.examined,
            summary.matched.map(|m| m.handle)
        ),
        Err(e) => tracing::warn!(
            "Dispatch of event from provider {} failed: {}",
            event.provider_id(),
            e
        ),
    }
}
