//! TEAM_472: Minor number registry.
//!
//! Maps minor numbers to their [`DeviceState`]. Entries are created on first
//! open and live until [`MinorRegistry::teardown`]; closing a handle never
//! removes one.

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::error::RepeatedResult;
use crate::state::DeviceState;

/// Registry of per-minor states owned by one driver instance.
#[derive(Debug, Default)]
pub struct MinorRegistry {
    entries: Mutex<Vec<Arc<DeviceState>>>,
}

impl MinorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with room for `minors` entries.
    pub fn with_capacity(minors: usize) -> RepeatedResult<Self> {
        let mut entries = Vec::new();
        entries.try_reserve(minors)?;
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    /// Return the state for `minor`, creating an unconfigured one if unseen.
    pub fn lookup_or_create(&self, minor: u32) -> RepeatedResult<Arc<DeviceState>> {
        let mut entries = self.entries.lock();
        if let Some(state) = entries.iter().find(|s| s.minor() == minor) {
            return Ok(Arc::clone(state));
        }

        entries.try_reserve(1)?;
        let state = Arc::new(DeviceState::new(minor));
        entries.push(Arc::clone(&state));
        log::debug!("[REPEATED] created state for minor {}", minor);
        Ok(state)
    }

    /// Look up an existing state by exact minor.
    pub fn lookup(&self, minor: u32) -> Option<Arc<DeviceState>> {
        self.entries
            .lock()
            .iter()
            .find(|s| s.minor() == minor)
            .map(Arc::clone)
    }

    /// Release every string and remove all entries. Returns how many were removed.
    ///
    /// In-flight operations that already resolved a state finish against it;
    /// later lookups fail.
    pub fn teardown(&self) -> usize {
        let drained = core::mem::take(&mut *self.entries.lock());
        for state in &drained {
            state.reset();
        }
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
