//! # event-provider
//!
//! Provider-side surface for device event notifications.
//!
//! A provider fires events identified by an event class GUID on behalf of a
//! device identified by a [`ProviderId`]. Consumers open a block for one event
//! class, install a [`NotificationCallback`] on it, and receive each event as a
//! raw buffer that [`NotificationEvent::parse`] decodes.
//!
//! The crate knows nothing about what consumers do with an event. The
//! [`LocalProvider`] implementation delivers events in-process and is suitable
//! for tests and demos.
//!
//! ```
//! use std::sync::Arc;
//! use event_provider::{
//!     EventProvider, LocalProvider, NotificationEvent, ProviderId, DEVICE_ARRIVAL_EVENT,
//! };
//!
//! let provider = LocalProvider::new();
//! let block = provider.open_block(&DEVICE_ARRIVAL_EVENT).unwrap();
//! provider
//!     .set_notification_callback(
//!         block,
//!         Arc::new(|buffer: &[u8]| {
//!             let event = NotificationEvent::parse(buffer).unwrap();
//!             assert_eq!(event.provider_id(), ProviderId(5));
//!         }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(provider.fire(ProviderId(5), DEVICE_ARRIVAL_EVENT, b""), 1);
//! provider.release_block(block);
//! ```

pub mod error;
pub mod event;
pub mod local;
pub mod provider;

pub use error::{ProviderError, Result};
pub use event::{
    encode_notification, EventGuid, EventHeader, NotificationEvent, ProviderId,
    DEVICE_ARRIVAL_EVENT, HEADER_LEN,
};
pub use local::LocalProvider;
pub use provider::{BlockHandle, EventProvider, NotificationCallback};
