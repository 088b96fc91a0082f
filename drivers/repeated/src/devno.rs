//! TEAM_472: Device number helpers.
//!
//! Same rdev layout as devtmpfs: 12-bit major above an 8-bit minor.

/// Bits of rdev below the major field
pub const MINOR_BITS: u32 = 8;

/// Width mask of the minor field
pub const MINOR_MASK: u32 = (1 << MINOR_BITS) - 1;

/// Width mask of the major field
pub const MAJOR_MASK: u32 = 0xfff;

/// Pack a device number. Fields wider than their masks are truncated.
#[inline]
pub const fn makedev(major: u32, minor: u32) -> u64 {
    let major = (major & MAJOR_MASK) as u64;
    let minor = (minor & MINOR_MASK) as u64;
    (major << MINOR_BITS) | minor
}

/// Major half of `rdev`
#[inline]
pub const fn major(rdev: u64) -> u32 {
    ((rdev >> MINOR_BITS) as u32) & MAJOR_MASK
}

/// Minor half of `rdev`; selects the [`DeviceState`](crate::DeviceState)
#[inline]
pub const fn minor(rdev: u64) -> u32 {
    (rdev as u32) & MINOR_MASK
}
