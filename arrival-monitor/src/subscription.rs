//! Notification subscription for one event class.
//!
//! Opening a provider block and installing the callback are two separate
//! provider calls. If the second fails the block opened by the first is
//! released before the error is returned, so a failed `register` never leaves
//! a block behind.

use event_provider::{BlockHandle, EventGuid, EventProvider, NotificationCallback};
use parking_lot::Mutex;

use crate::error::{MonitorError, Result};

/// An active registration with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    block: BlockHandle,
    event_class: EventGuid,
}

impl Subscription {
    pub fn block(&self) -> BlockHandle {
        self.block
    }

    pub fn event_class(&self) -> EventGuid {
        self.event_class
    }
}

/// Holds at most one provider subscription for an owner.
///
/// The subscription slot has its own lock and never contends with the target
/// registry. Dropping the value releases any active subscription.
pub struct NotificationSubscription<P: EventProvider> {
    provider: P,
    event_class: EventGuid,
    active: Mutex<Option<Subscription>>,
}

impl<P: EventProvider> NotificationSubscription<P> {
    pub fn new(provider: P, event_class: EventGuid) -> Self {
        Self {
            provider,
            event_class,
            active: Mutex::new(None),
        }
    }

    /// Open a block for the event class and install `callback` on it.
    ///
    /// # Errors
    ///
    /// - `MonitorError::AlreadyRegistered` if a subscription is active; the
    ///   provider is not called.
    /// - `MonitorError::ProviderUnavailable` if the block cannot be opened.
    /// - `MonitorError::CallbackInstallFailed` if the callback is refused; the
    ///   opened block has been released.
    pub fn register(&self, callback: NotificationCallback) -> Result<Subscription> {
        // Held across both provider calls so concurrent registers cannot both open a block
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(MonitorError::AlreadyRegistered);
        }

        let block = self.provider.open_block(&self.event_class).map_err(|e| {
            tracing::error!("Unable to open notification block for {}: {}", self.event_class, e);
            MonitorError::ProviderUnavailable(e)
        })?;

        if let Err(e) = self.provider.set_notification_callback(block, callback) {
            tracing::error!("Unable to register for notifications on {}: {}", block, e);
            self.provider.release_block(block);
            return Err(MonitorError::CallbackInstallFailed(e));
        }

        let subscription = Subscription {
            block,
            event_class: self.event_class,
        };
        *active = Some(subscription);

        tracing::info!("Subscribed to {} on {}", self.event_class, block);
        Ok(subscription)
    }

    /// Release the active subscription, if any.
    ///
    /// Safe to call repeatedly; only the first call after a successful
    /// `register` reaches the provider. Returns the released subscription.
    pub fn unregister(&self) -> Option<Subscription> {
        let released = self.active.lock().take();

        if let Some(subscription) = released {
            self.provider.release_block(subscription.block);
            tracing::info!(
                "Unsubscribed from {} on {}",
                subscription.event_class,
                subscription.block
            );
        }

        released
    }

    pub fn is_registered(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn active(&self) -> Option<Subscription> {
        *self.active.lock()
    }

    pub fn event_class(&self) -> EventGuid {
        self.event_class
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: EventProvider> Drop for NotificationSubscription<P> {
    fn drop(&mut self) {
        if self.unregister().is_some() {
            tracing::debug!("Released notification subscription on teardown");
        }
    }
}
