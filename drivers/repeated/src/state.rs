//! TEAM_472: Per-minor device state.
//!
//! One [`DeviceState`] exists per minor number and is shared by every open
//! handle on that minor. The configured string and the read horizon sit
//! behind one `RwLock`:
//!
//! - readers take the read lock only long enough to clone a [`Snapshot`]
//!   (string `Arc` + horizon), then copy to the caller unlocked
//! - write, SET_STRING and RESET take the write lock
//!
//! Content is only ever replaced through [`Slot::replace_content`]. A
//! replaced string stays alive until the last snapshot holding it is dropped.
//!
//! The horizon is capped at [`MAX_HORIZON`] (`i64::MAX`), so every cursor a
//! handle can reach is a valid `loff_t`.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;
use spin::RwLock;

use crate::cyclic::CyclicReader;
use crate::error::{RepeatedError, RepeatedResult};

/// Content and horizon of one minor.
#[derive(Debug, Default)]
struct Slot {
    /// Configured string (None = not configured since creation or RESET)
    content: Option<Arc<Vec<u8>>>,
    /// Upper bound for cursor advancement
    horizon: u64,
}

impl Slot {
    fn replace_content(&mut self, next: Option<Arc<Vec<u8>>>) -> Option<Arc<Vec<u8>>> {
        mem::replace(&mut self.content, next)
    }
}

/// Largest horizon a minor can reach
pub const MAX_HORIZON: u64 = i64::MAX as u64;

/// Consistent `(content, horizon)` pair taken under the read lock.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    content: Option<Arc<Vec<u8>>>,
    horizon: u64,
}

impl Snapshot {
    pub(crate) fn reader(&self) -> CyclicReader<'_> {
        CyclicReader::new(self.content.as_deref().map(Vec::as_slice), self.horizon)
    }
}

/// Shared state for one minor number.
#[derive(Debug)]
pub struct DeviceState {
    minor: u32,
    slot: RwLock<Slot>,
}

impl DeviceState {
    pub(crate) fn new(minor: u32) -> Self {
        Self {
            minor,
            slot: RwLock::new(Slot::default()),
        }
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn horizon(&self) -> u64 {
        self.slot.read().horizon
    }

    pub fn is_configured(&self) -> bool {
        self.slot.read().content.is_some()
    }

    /// Length of the configured string, if any
    pub fn content_len(&self) -> Option<usize> {
        self.slot.read().content.as_ref().map(|content| content.len())
    }

    /// Advance the horizon by `count`, saturating at [`MAX_HORIZON`].
    pub(crate) fn extend_horizon(&self, count: u64) -> u64 {
        let mut slot = self.slot.write();
        slot.horizon = slot.horizon.saturating_add(count).min(MAX_HORIZON);
        slot.horizon
    }

    /// Install a new string and zero the horizon.
    ///
    /// `content` must already hold the complete caller copy.
    pub(crate) fn configure(&self, content: Vec<u8>) -> RepeatedResult<()> {
        if content.is_empty() {
            return Err(RepeatedError::EmptyConfiguration);
        }
        let content = Arc::new(content);
        let old = {
            let mut slot = self.slot.write();
            slot.horizon = 0;
            slot.replace_content(Some(content))
        };
        drop(old);
        Ok(())
    }

    /// Drop the string and zero the horizon. Returns whether a string was held.
    pub(crate) fn reset(&self) -> bool {
        let old = {
            let mut slot = self.slot.write();
            slot.horizon = 0;
            slot.replace_content(None)
        };
        old.is_some()
    }

    /// Clone the current string and horizon. The lock is released on return.
    pub(crate) fn snapshot(&self) -> Snapshot {
        let slot = self.slot.read();
        Snapshot {
            content: slot.content.clone(),
            horizon: slot.horizon,
        }
    }

    /// `cursor + delta` clamped to `[0, horizon]`.
    pub(crate) fn clamp_seek(&self, cursor: u64, delta: i64) -> u64 {
        let horizon = self.slot.read().horizon;
        let target = if delta >= 0 {
            cursor.saturating_add(delta.unsigned_abs())
        } else {
            cursor.saturating_sub(delta.unsigned_abs())
        };
        target.min(horizon)
    }
}
