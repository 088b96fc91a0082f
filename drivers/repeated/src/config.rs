//! TEAM_472: Repeated device configuration
//!
//! Fixed constants live in small modules; the per-instance knobs are in
//! [`DriverConfig`].

/// Device identity as registered with the host
pub mod device {
    /// Name passed to the host's chrdev registration
    pub const NAME: &str = "repeated";
}

/// Control command encoding
pub mod ioctl {
    /// ioctl type byte shared by all repeated commands
    pub const MAGIC: u8 = b'r';
}

/// Registry sizing
pub mod registry {
    /// Minor slots reserved up front by [`super::DriverConfig::default`]
    pub const DEFAULT_INITIAL_MINORS: usize = 4;
}

/// Per-instance driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Device name used in log messages and host registration
    pub name: &'static str,
    /// Registry capacity reserved when the driver is created
    pub initial_minors: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: device::NAME,
            initial_minors: registry::DEFAULT_INITIAL_MINORS,
        }
    }
}
