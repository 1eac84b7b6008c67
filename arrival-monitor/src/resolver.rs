//! Display name resolution for matched targets.

use crate::config::MonitorConfig;
use crate::error::PropertyError;
use crate::registry::TargetRegistry;
use crate::types::{NameResult, PropertyKind, TargetHandle};

/// Resolves a human-readable name for a target with a one-step fallback.
///
/// The fallback property is only consulted when the primary property is not
/// populated. Any other failure, resource exhaustion included, is returned
/// as-is.
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver {
    primary: PropertyKind,
    fallback: PropertyKind,
}

impl PropertyResolver {
    pub fn new(primary: PropertyKind, fallback: PropertyKind) -> Self {
        Self { primary, fallback }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.primary_property, config.fallback_property)
    }

    /// Resolve the display name of `target`.
    ///
    /// # Errors
    ///
    /// Returns the primary query's error unless it is `NotPresent`, otherwise
    /// the fallback query's error. A value that is not valid UTF-16 yields
    /// `PropertyError::InvalidEncoding`.
    pub fn resolve<R: TargetRegistry>(
        &self,
        registry: &R,
        target: TargetHandle,
    ) -> Result<NameResult, PropertyError> {
        let value = match registry.query_property(target, self.primary) {
            Ok(value) => value,
            Err(PropertyError::NotPresent) => {
                tracing::debug!(
                    "{:?} not present on {}, falling back to {:?}",
                    self.primary,
                    target,
                    self.fallback
                );
                registry
                    .query_property(target, self.fallback)
                    .map_err(|e| {
                        tracing::debug!("{:?} query on {} failed: {}", self.fallback, target, e);
                        e
                    })?
            }
            Err(e) => {
                tracing::debug!("{:?} query on {} failed: {}", self.primary, target, e);
                return Err(e);
            }
        };

        NameResult::from_utf16le(&value)
    }
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new(PropertyKind::FriendlyName, PropertyKind::DeviceDescription)
    }
}
