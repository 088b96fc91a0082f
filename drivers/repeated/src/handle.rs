//! TEAM_472: Open file handle.

/// One open of a repeated minor.
///
/// Holds the minor as a lookup key, never a reference into the registry,
/// plus its own cursor. Handles on the same minor share content and horizon
/// but seek and read independently.
#[derive(Debug, PartialEq, Eq)]
pub struct OpenHandle {
    /// Instance id of the driver that opened this handle
    pub(crate) driver: u64,
    pub(crate) minor: u32,
    pub(crate) cursor: u64,
}

impl OpenHandle {
    pub(crate) fn new(driver: u64, minor: u32) -> Self {
        Self {
            driver,
            minor,
            cursor: 0,
        }
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Current file position
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}
