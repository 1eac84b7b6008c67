//! In-process event provider.
//!
//! `LocalProvider` keeps the set of open blocks and their callbacks and
//! delivers fired events synchronously on the caller's thread. It is what the
//! monitor runs against outside a real device stack, and it carries fault
//! injection switches and counters so tests can check that every opened block
//! is released exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{ProviderError, Result};
use crate::event::{encode_notification, EventGuid, ProviderId};
use crate::provider::{BlockHandle, EventProvider, NotificationCallback};

struct OpenBlock {
    event_class: EventGuid,
    callback: Option<NotificationCallback>,
}

/// In-process provider that routes fired events to installed callbacks.
pub struct LocalProvider {
    blocks: Mutex<HashMap<BlockHandle, OpenBlock>>,
    next_id: AtomicU64,
    fail_next_open: AtomicBool,
    fail_next_callback_install: AtomicBool,
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self {
            blocks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fail_next_open: AtomicBool::new(false),
            fail_next_callback_install: AtomicBool::new(false),
            opened: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Make the next `open_block` call fail with `ProviderError::Unavailable`.
    pub fn fail_next_open(&self) {
        self.fail_next_open.store(true, Ordering::SeqCst);
    }

    /// Make the next `set_notification_callback` call fail.
    pub fn fail_next_callback_install(&self) {
        self.fail_next_callback_install.store(true, Ordering::SeqCst);
    }

    /// Fire an event and deliver it to every callback listening on `event_class`.
    ///
    /// Callbacks run synchronously on the calling thread, outside the provider's
    /// own lock. Returns the number of callbacks invoked.
    pub fn fire(&self, provider_id: ProviderId, event_class: EventGuid, payload: &[u8]) -> usize {
        let buffer = match encode_notification(provider_id, event_class, payload) {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::warn!("Dropping event from provider {}: {}", provider_id, e);
                return 0;
            }
        };

        let callbacks: Vec<NotificationCallback> = {
            let blocks = self.blocks.lock();
            blocks
                .values()
                .filter(|block| block.event_class == event_class)
                .filter_map(|block| block.callback.clone())
                .collect()
        };

        tracing::trace!(
            "Delivering event {} from provider {} to {} callback(s)",
            event_class,
            provider_id,
            callbacks.len()
        );

        for callback in &callbacks {
            callback(&buffer[..]);
        }

        callbacks.len()
    }

    /// Number of blocks currently open.
    pub fn open_block_count(&self) -> usize {
        self.blocks.lock().len()
    }

    /// Total number of blocks ever opened.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Total number of blocks released.
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Whether a block has a callback installed.
    pub fn has_callback(&self, block: BlockHandle) -> bool {
        self.blocks
            .lock()
            .get(&block)
            .map_or(false, |b| b.callback.is_some())
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EventProvider for LocalProvider {
    fn open_block(&self, event_class: &EventGuid) -> Result<BlockHandle> {
        if self.fail_next_open.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(format!(
                "event class {} is not registered",
                event_class
            )));
        }

        let block = BlockHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.blocks.lock().insert(
            block,
            OpenBlock {
                event_class: *event_class,
                callback: None,
            },
        );
        self.opened.fetch_add(1, Ordering::SeqCst);

        tracing::debug!("Opened {} for event class {}", block, event_class);
        Ok(block)
    }

    fn set_notification_callback(
        &self,
        block: BlockHandle,
        callback: NotificationCallback,
    ) -> Result<()> {
        if self.fail_next_callback_install.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::CallbackRejected(format!(
                "{} refused the callback",
                block
            )));
        }

        let mut blocks = self.blocks.lock();
        let open = blocks
            .get_mut(&block)
            .ok_or(ProviderError::UnknownBlock(block))?;
        open.callback = Some(callback);
        Ok(())
    }

    fn release_block(&self, block: BlockHandle) {
        if self.blocks.lock().remove(&block).is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Released {}", block);
        } else {
            tracing::warn!("Release of {} which is not open", block);
        }
    }
}
