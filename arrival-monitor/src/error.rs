//! Error types for the arrival-monitor crate.

use event_provider::ProviderError;

use crate::types::TargetHandle;

/// Errors returned by subscription management and monitor construction.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The owner already holds an active subscription
    #[error("Notification subscription is already registered")]
    AlreadyRegistered,

    /// The provider could not open a block for the event class
    #[error("Event provider unavailable: {0}")]
    ProviderUnavailable(#[source] ProviderError),

    /// The provider opened the block but refused the callback
    #[error("Failed to install notification callback: {0}")]
    CallbackInstallFailed(#[source] ProviderError),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors from querying a target's device properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property is not populated for this device
    #[error("Property not present")]
    NotPresent,

    /// The query could not allocate the result buffer
    #[error("Insufficient resources")]
    InsufficientResources,

    /// The device does not support property queries
    #[error("Property query unsupported")]
    Unsupported,

    /// The target was closed or removed before the query ran
    #[error("Target closed")]
    TargetClosed,

    /// The property value is not a valid UTF-16 string
    #[error("Property value is not valid UTF-16")]
    InvalidEncoding,
}

/// Errors raised while dispatching a single event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The target's owning device identity could not be resolved
    #[error("Cannot resolve device identity of target {0}")]
    IdentityUnresolvable(TargetHandle),

    /// The matched target's display name could not be resolved
    #[error("Failed to resolve name for target {target}: {source}")]
    NameResolution {
        target: TargetHandle,
        #[source]
        source: PropertyError,
    },
}

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;
