//! Event classes, provider identities and the notification buffer format.
//!
//! A notification buffer starts with a fixed little-endian header followed by
//! the event payload:
//!
//! ```text
//! [buffer_size: u32][provider_id: u32][event_class: 16 bytes][payload ...]
//! ```
//!
//! `buffer_size` counts the header as well as the payload. The event class GUID
//! is stored in the mixed-endian layout, where the first three fields are
//! little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::error::{ProviderError, Result};

/// Size in bytes of the notification header.
pub const HEADER_LEN: usize = 24;

/// The well-known device arrival event class.
pub const DEVICE_ARRIVAL_EVENT: EventGuid = EventGuid::from_fields(
    0x01cd_aff1,
    0xc901,
    0x45b4,
    [0xb3, 0x59, 0xb5, 0x54, 0x27, 0x25, 0xe2, 0x9c],
);

/// Provider-recognised identity of a device object.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ProviderId(pub u32);

impl ProviderId {
    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identifier of an event class.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct EventGuid(Uuid);

impl EventGuid {
    /// Build an event class from its GUID fields.
    pub const fn from_fields(d1: u32, d2: u16, d3: u16, d4: [u8; 8]) -> Self {
        Self(Uuid::from_fields(d1, d2, d3, &d4))
    }

    /// Build an event class from its mixed-endian wire layout.
    pub const fn from_bytes_le(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes_le(bytes))
    }

    /// The mixed-endian wire layout of this event class.
    pub fn to_bytes_le(&self) -> [u8; 16] {
        self.0.to_bytes_le()
    }

    /// The nil event class, never fired by any provider.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl std::fmt::Display for EventGuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.hyphenated())
    }
}

/// Decoded notification header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    /// Total buffer size declared by the provider, header included
    pub buffer_size: usize,
    /// Identity of the device that fired the event
    pub provider_id: ProviderId,
    /// Event class of the notification
    pub event_class: EventGuid,
}

/// A notification borrowed from the provider's buffer.
///
/// The payload borrows from the buffer handed to the callback and cannot
/// outlive the delivery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationEvent<'a> {
    pub header: EventHeader,
    pub payload: &'a [u8],
}

impl<'a> NotificationEvent<'a> {
    /// Build an event directly from its parts, bypassing the wire format.
    pub fn new(provider_id: ProviderId, event_class: EventGuid, payload: &'a [u8]) -> Self {
        Self {
            header: EventHeader {
                buffer_size: HEADER_LEN + payload.len(),
                provider_id,
                event_class,
            },
            payload,
        }
    }

    /// Decode a notification buffer.
    ///
    /// Bytes past the declared `buffer_size` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Truncated` if the buffer cannot hold a header and
    /// `ProviderError::SizeMismatch` if the declared size is smaller than the
    /// header or larger than the buffer.
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_LEN {
            return Err(ProviderError::Truncated { len: buffer.len() });
        }

        let mut header = &buffer[..HEADER_LEN];
        let declared = header.get_u32_le() as usize;
        let provider_id = ProviderId(header.get_u32_le());
        let mut guid = [0u8; 16];
        header.copy_to_slice(&mut guid);

        if declared < HEADER_LEN || declared > buffer.len() {
            return Err(ProviderError::SizeMismatch {
                declared,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            header: EventHeader {
                buffer_size: declared,
                provider_id,
                event_class: EventGuid::from_bytes_le(guid),
            },
            payload: &buffer[HEADER_LEN..declared],
        })
    }

    pub fn provider_id(&self) -> ProviderId {
        self.header.provider_id
    }

    pub fn event_class(&self) -> EventGuid {
        self.header.event_class
    }
}

/// Encode a notification buffer for delivery to callbacks.
///
/// # Errors
///
/// Returns `ProviderError::SizeMismatch` if the buffer would not fit the
/// 32-bit size field.
pub fn encode_notification(
    provider_id: ProviderId,
    event_class: EventGuid,
    payload: &[u8],
) -> Result<Bytes> {
    let total = HEADER_LEN + payload.len();
    let declared = u32::try_from(total).map_err(|_| ProviderError::SizeMismatch {
        declared: total,
        actual: u32::MAX as usize,
    })?;

    let mut buffer = BytesMut::with_capacity(total);
    buffer.put_u32_le(declared);
    buffer.put_u32_le(provider_id.as_u32());
    buffer.put_slice(&event_class.to_bytes_le());
    buffer.put_slice(payload);
    Ok(buffer.freeze())
}
