//! The provider trait through which consumers open event blocks and install
//! notification callbacks.

use std::sync::Arc;

use crate::error::Result;
use crate::event::EventGuid;

/// Opaque reference to an opened provider block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle(u64);

impl BlockHandle {
    /// Create a new BlockHandle with the given value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Callback invoked by a provider with a raw notification buffer.
///
/// The buffer is owned by the provider and is only valid for the duration of
/// the call.
pub type NotificationCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// A system-wide source of device event notifications.
///
/// Consumers open a block for one event class, install a single callback on
/// it, and release the block when they no longer want notifications. A block
/// holds a reference inside the provider until it is released, so every
/// successful `open_block` must be paired with exactly one `release_block`.
pub trait EventProvider {
    /// Open a notification block for an event class.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the provider cannot serve the class.
    fn open_block(&self, event_class: &EventGuid) -> Result<BlockHandle>;

    /// Install the callback that receives notifications for an open block.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CallbackRejected` or `ProviderError::UnknownBlock`
    /// if the callback could not be installed. The block stays open either way.
    fn set_notification_callback(
        &self,
        block: BlockHandle,
        callback: NotificationCallback,
    ) -> Result<()>;

    /// Release a block, dropping any callback installed on it.
    fn release_block(&self, block: BlockHandle);
}

impl<P: EventProvider + ?Sized> EventProvider for Arc<P> {
    fn open_block(&self, event_class: &EventGuid) -> Result<BlockHandle> {
        (**self).open_block(event_class)
    }

    fn set_notification_callback(
        &self,
        block: BlockHandle,
        callback: NotificationCallback,
    ) -> Result<()> {
        (**self).set_notification_callback(block, callback)
    }

    fn release_block(&self, block: BlockHandle) {
        (**self).release_block(block)
    }
}
