//! Event dispatch against the target registry
//!
//! For every event the dispatcher takes the registry lock once and walks the
//! targets in registry order. Each target is classified into a
//! [`TargetOutcome`]:
//!
//! - targets that are not started, or whose device identity cannot be
//!   resolved, are skipped
//! - a target whose identity differs from the event's provider is not a match
//! - an identity match with a foreign event class is reported as an unknown
//!   event and the scan continues
//! - an identity match with the subscribed event class resolves the target's
//!   name, reports it and ends the scan
//!
//! A name resolution failure is reported and also ends the scan. The lock is
//! held for the whole scan, name resolution and reporting included; event
//! arrival is rare enough that the serialisation is acceptable.

use std::sync::Arc;

use event_provider::{EventGuid, NotificationEvent};

use crate::config::MonitorConfig;
use crate::error::DispatchError;
use crate::registry::TargetRegistry;
use crate::report::ReportSink;
use crate::resolver::PropertyResolver;
use crate::types::{NameResult, TargetEntry, TargetHandle, TargetState};

/// Why a target was not considered for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target is not in the started state
    NotStarted(TargetState),
    /// The target's device identity could not be resolved
    IdentityUnresolvable,
}

/// Classification of one target against one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Skipped(SkipReason),
    /// The target belongs to a different device
    IdentityMismatch,
    /// Same device, but an event class this dispatcher does not handle
    UnknownEvent,
    /// Same device and event class; the scan ends here
    Arrival(NameResult),
}

/// The target that matched an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTarget {
    pub handle: TargetHandle,
    pub name: NameResult,
}

/// What a single dispatch call saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Targets classified before the scan ended
    pub examined: usize,
    /// Targets skipped because of state or unresolvable identity
    pub skipped: usize,
    /// Identity matches carrying a foreign event class
    pub unknown_events: usize,
    /// The target that ended the scan, if any
    pub matched: Option<MatchedTarget>,
}

/// Matches provider events to registry targets and reports arrivals.
pub struct EventDispatcher<R, S> {
    registry: Arc<R>,
    resolver: PropertyResolver,
    event_class: EventGuid,
    sink: S,
}

impl<R: TargetRegistry, S: ReportSink> EventDispatcher<R, S> {
    pub fn new(registry: Arc<R>, sink: S, config: &MonitorConfig) -> Self {
        Self {
            registry,
            resolver: PropertyResolver::from_config(config),
            event_class: config.event_class,
            sink,
        }
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The event class treated as a device arrival.
    pub fn event_class(&self) -> EventGuid {
        self.event_class
    }

    /// Dispatch one event.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::NameResolution` when the matched target's name
    /// could not be resolved. The failure has already been reported to the sink.
    pub fn dispatch(&self, event: &NotificationEvent<'_>) -> Result<DispatchSummary, DispatchError> {
        let span = tracing::debug_span!(
            "dispatch",
            provider_id = %event.provider_id(),
            event_class = %event.event_class()
        );
        let _enter = span.enter();

        let targets = self.registry.lock();
        let mut summary = DispatchSummary::default();

        for entry in targets.iter() {
            summary.examined += 1;

            let outcome = match self.classify(entry, event) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.sink.report(&e.to_string());
                    return Err(e);
                }
            };

            match outcome {
                TargetOutcome::Skipped(reason) => {
                    summary.skipped += 1;
                    match reason {
                        SkipReason::NotStarted(state) => {
                            tracing::debug!("{} not in an opened state ({:?})", entry.handle, state)
                        }
                        SkipReason::IdentityUnresolvable => {
                            tracing::debug!("{}", DispatchError::IdentityUnresolvable(entry.handle))
                        }
                    }
                }
                TargetOutcome::IdentityMismatch => {}
                TargetOutcome::UnknownEvent => {
                    summary.unknown_events += 1;
                    self.sink.report(&format!(
                        "Unknown event {} for {}",
                        event.event_class(),
                        entry.handle
                    ));
                }
                TargetOutcome::Arrival(name) => {
                    self.sink
                        .report(&format!("{} fired a device arrival event", name));
                    summary.matched = Some(MatchedTarget {
                        handle: entry.handle,
                        name,
                    });
                    break;
                }
            }
        }

        tracing::trace!(
            "Scanned {} of {} target(s), matched: {}",
            summary.examined,
            targets.len(),
            summary.matched.is_some()
        );
        Ok(summary)
    }

    /// Classify one target. Must be called with the registry lock held.
    fn classify(
        &self,
        entry: &TargetEntry,
        event: &NotificationEvent<'_>,
    ) -> Result<TargetOutcome, DispatchError> {
        if !entry.state.is_started() {
            return Ok(TargetOutcome::Skipped(SkipReason::NotStarted(entry.state)));
        }

        let identity = match self.registry.resolve_identity(entry.handle) {
            Some(identity) => identity,
            None => return Ok(TargetOutcome::Skipped(SkipReason::IdentityUnresolvable)),
        };

        if identity != event.provider_id() {
            return Ok(TargetOutcome::IdentityMismatch);
        }

        if event.event_class() != self.event_class {
            return Ok(TargetOutcome::UnknownEvent);
        }

        self.resolver
            .resolve(&*self.registry, entry.handle)
            .map(TargetOutcome::Arrival)
            .map_err(|source| DispatchError::NameResolution {
                target: entry.handle,
                source,
            })
    }
}
