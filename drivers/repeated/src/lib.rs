//! # los-repeated
//!
//! Repeated-string character device for LevitateOS.
//!
//! TEAM_472: Each minor holds one configurable string. Reads return that
//! string cyclically, up to a horizon that writes extend:
//!
//! ```text
//! ioctl(fd, SET_STRING, "abc")   string = "abc", horizon = 0
//! write(fd, "ignored", 7)        horizon = 7, returns 0
//! read(fd, buf, 17)              "abcabca" (7 bytes)
//! ioctl(fd, RESET)               string dropped, horizon = 0
//! ```
//!
//! Module structure:
//! - `cyclic.rs` - cyclic copy over `(content, horizon, cursor)`
//! - `state.rs` - per-minor string + horizon behind a `RwLock`
//! - `registry.rs` - minor -> state map owned by one driver instance
//! - `driver.rs` - open/close/read/write/seek/control
//! - `file_ops.rs` - errno-returning `CharDeviceOps` for the host dispatch table
//! - `ioctl.rs` - SET_STRING / RESET numbers
//! - `user.rs` - caller memory copy traits
//!
//! Device number registration, the dispatch table and module entry points
//! belong to the host.

#![no_std]

extern crate alloc;

pub mod config;
pub mod cyclic;
pub mod devno;
pub mod driver;
pub mod error;
pub mod file_ops;
pub mod handle;
pub mod ioctl;
pub mod registry;
pub mod state;
pub mod user;

pub use config::DriverConfig;
pub use cyclic::{CyclicRead, CyclicReader};
pub use driver::RepeatedDriver;
pub use error::{RepeatedError, RepeatedResult};
pub use file_ops::{CharDeviceOps, DevResult};
pub use handle::OpenHandle;
pub use ioctl::ControlCommand;
pub use registry::MinorRegistry;
pub use state::DeviceState;
pub use user::{UserSink, UserSource};
