//! Target registry collaborator
//!
//! The registry is owned by the surrounding driver: its lifecycle code adds,
//! restarts and removes targets, while the dispatcher only reads entries under
//! the registry lock. The lock is exposed as an RAII guard so it is released
//! on every exit path of a scan, including early returns and unwinding.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use event_provider::ProviderId;
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::error::PropertyError;
use crate::types::{NameResult, PropertyKind, TargetEntry, TargetHandle, TargetState};

/// Ordered collection of device targets guarded by a single exclusive lock.
pub trait TargetRegistry: Send + Sync {
    /// Guard returned by [`lock`](TargetRegistry::lock); releases the lock on drop.
    type Guard<'a>: Deref<Target = [TargetEntry]>
    where
        Self: 'a;

    /// Acquire the registry lock and view the targets in registry order.
    fn lock(&self) -> Self::Guard<'_>;

    /// Map a target to the provider identity of its underlying device.
    ///
    /// Returns `None` if the target no longer refers to a device object.
    fn resolve_identity(&self, target: TargetHandle) -> Option<ProviderId>;

    /// Query a device property through a target.
    ///
    /// The value is returned as a UTF-16LE, NUL-terminated buffer.
    fn query_property(
        &self,
        target: TargetHandle,
        kind: PropertyKind,
    ) -> Result<Vec<u8>, PropertyError>;
}

#[derive(Default)]
struct DeviceRecord {
    identity: Option<ProviderId>,
    properties: HashMap<PropertyKind, Result<Vec<u8>, PropertyError>>,
    removed: bool,
}

/// Registry backed by in-process collections.
///
/// Lock ordering is always target sequence first, device records second.
/// The instrumentation counters make the locking discipline observable:
/// `max_concurrent_holders` never exceeds one when the lock is exclusive.
pub struct InMemoryTargetRegistry {
    targets: Mutex<Vec<TargetEntry>>,
    devices: RwLock<HashMap<TargetHandle, DeviceRecord>>,
    next_handle: AtomicU64,
    holders: AtomicUsize,
    max_holders: AtomicUsize,
    acquisitions: AtomicUsize,
    identity_queries: Mutex<Vec<TargetHandle>>,
    property_queries: Mutex<Vec<(TargetHandle, PropertyKind)>>,
}

/// Locked view of an [`InMemoryTargetRegistry`].
pub struct LockedTargets<'a> {
    guard: MutexGuard<'a, Vec<TargetEntry>>,
    holders: &'a AtomicUsize,
}

impl Deref for LockedTargets<'_> {
    type Target = [TargetEntry];

    fn deref(&self) -> &[TargetEntry] {
        &self.guard
    }
}

impl Drop for LockedTargets<'_> {
    fn drop(&mut self) {
        // Runs before `guard` is dropped, so the count only covers held time
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryTargetRegistry {
    pub fn new() -> Self {
        Self {
            targets: Mutex::new(Vec::new()),
            devices: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            holders: AtomicUsize::new(0),
            max_holders: AtomicUsize::new(0),
            acquisitions: AtomicUsize::new(0),
            identity_queries: Mutex::new(Vec::new()),
            property_queries: Mutex::new(Vec::new()),
        }
    }

    /// Append a target whose device has the given identity.
    pub fn add_target(&self, identity: Option<ProviderId>, state: TargetState) -> TargetHandle {
        let handle = TargetHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let mut targets = self.targets.lock();
        self.devices.write().insert(
            handle,
            DeviceRecord {
                identity,
                ..DeviceRecord::default()
            },
        );
        targets.push(TargetEntry::new(handle, state));

        tracing::debug!("Added {} ({:?}) with identity {:?}", handle, state, identity);
        handle
    }

    /// Change a target's lifecycle state. Returns `false` if the target is unknown.
    pub fn set_state(&self, target: TargetHandle, state: TargetState) -> bool {
        let mut targets = self.targets.lock();
        match targets.iter_mut().find(|entry| entry.handle == target) {
            Some(entry) => {
                tracing::debug!("{} {:?} -> {:?}", target, entry.state, state);
                entry.state = state;
                true
            }
            None => false,
        }
    }

    /// Remove a target and its device record. Returns `false` if the target is unknown.
    pub fn remove_target(&self, target: TargetHandle) -> bool {
        let mut targets = self.targets.lock();
        let before = targets.len();
        targets.retain(|entry| entry.handle != target);
        self.devices.write().remove(&target);
        targets.len() != before
    }

    /// Store a string property the way the device would report it.
    pub fn set_property(&self, target: TargetHandle, kind: PropertyKind, value: &str) {
        self.set_property_raw(target, kind, NameResult::encode_utf16le(value));
    }

    /// Store a raw property buffer.
    pub fn set_property_raw(&self, target: TargetHandle, kind: PropertyKind, value: Vec<u8>) {
        if let Some(record) = self.devices.write().get_mut(&target) {
            record.properties.insert(kind, Ok(value));
        }
    }

    /// Make queries for a property fail with `error`.
    pub fn set_property_error(&self, target: TargetHandle, kind: PropertyKind, error: PropertyError) {
        if let Some(record) = self.devices.write().get_mut(&target) {
            record.properties.insert(kind, Err(error));
        }
    }

    /// Replace the identity of a target's device.
    pub fn set_identity(&self, target: TargetHandle, identity: Option<ProviderId>) {
        if let Some(record) = self.devices.write().get_mut(&target) {
            record.identity = identity;
        }
    }

    /// Simulate the underlying device disappearing while the target entry
    /// still reports its old state. Property queries then fail.
    pub fn mark_device_removed(&self, target: TargetHandle) {
        if let Some(record) = self.devices.write().get_mut(&target) {
            record.removed = true;
        }
    }

    /// Snapshot of the target sequence.
    pub fn entries(&self) -> Vec<TargetEntry> {
        self.lock().to_vec()
    }

    /// Number of times the lock has been acquired.
    pub fn lock_acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Largest number of simultaneous lock holders ever observed.
    pub fn max_concurrent_holders(&self) -> usize {
        self.max_holders.load(Ordering::SeqCst)
    }

    /// Targets whose identity was queried, in query order.
    pub fn identity_queries(&self) -> Vec<TargetHandle> {
        self.identity_queries.lock().clone()
    }

    /// Property queries issued, in query order.
    pub fn property_queries(&self) -> Vec<(TargetHandle, PropertyKind)> {
        self.property_queries.lock().clone()
    }

    pub fn clear_query_log(&self) {
        self.identity_queries.lock().clear();
        self.property_queries.lock().clear();
    }
}

impl Default for InMemoryTargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRegistry for InMemoryTargetRegistry {
    type Guard<'a> = LockedTargets<'a>
    where
        Self: 'a;

    fn lock(&self) -> LockedTargets<'_> {
        let guard = self.targets.lock();
        let holders = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_holders.fetch_max(holders, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        LockedTargets {
            guard,
            holders: &self.holders,
        }
    }

    fn resolve_identity(&self, target: TargetHandle) -> Option<ProviderId> {
        self.identity_queries.lock().push(target);
        self.devices.read().get(&target)?.identity
    }

    fn query_property(
        &self,
        target: TargetHandle,
        kind: PropertyKind,
    ) -> Result<Vec<u8>, PropertyError> {
        self.property_queries.lock().push((target, kind));

        let devices = self.devices.read();
        let record = devices.get(&target).ok_or(PropertyError::TargetClosed)?;
        if record.removed {
            return Err(PropertyError::TargetClosed);
        }

        record
            .properties
            .get(&kind)
            .cloned()
            .unwrap_or(Err(PropertyError::NotPresent))
    }
}
