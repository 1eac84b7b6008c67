//! Core types for the arrival-monitor crate.

use crate::error::PropertyError;

/// Handle to a device target owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(u64);

impl TargetHandle {
    /// Create a new TargetHandle with the given value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

/// Lifecycle state of a target as driven by the owning driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    /// Created but not yet opened
    Created,
    /// Open and accepting requests
    Started,
    /// Being stopped
    Stopping,
    /// Stopped but not closed
    Stopped,
    /// Closed; the underlying device may already be gone
    Closed,
}

impl TargetState {
    /// Only started targets may be matched against events.
    pub fn is_started(&self) -> bool {
        matches!(self, TargetState::Started)
    }
}

/// Device property that can be queried through a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    FriendlyName,
    DeviceDescription,
}

/// One element of the registry's ordered target sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEntry {
    pub handle: TargetHandle,
    pub state: TargetState,
}

impl TargetEntry {
    pub fn new(handle: TargetHandle, state: TargetState) -> Self {
        Self { handle, state }
    }
}

/// Display name resolved for a target.
///
/// Owns its buffer; dropping it releases the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResult(String);

impl NameResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Decode a UTF-16LE property buffer, stopping at the first NUL.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidEncoding` if the buffer has an odd length
    /// or is not valid UTF-16.
    pub fn from_utf16le(bytes: &[u8]) -> Result<Self, PropertyError> {
        if bytes.len() % 2 != 0 {
            return Err(PropertyError::InvalidEncoding);
        }

        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();

        String::from_utf16(&units)
            .map(Self)
            .map_err(|_| PropertyError::InvalidEncoding)
    }

    /// Encode a name the way a device property store returns it.
    pub fn encode_utf16le(name: &str) -> Vec<u8> {
        name.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
