//! TEAM_472: Repeated device driver core.
//!
//! Resolves every handle to its [`DeviceState`] by minor on each call, then
//! runs the operation against that state:
//!
//! | Operation           | Effect                                             |
//! |---------------------|----------------------------------------------------|
//! | `open`              | lookup-or-create the minor, new handle at cursor 0 |
//! | `write`             | horizon += count (payload ignored), returns 0      |
//! | `read`              | cyclic copy from the handle's cursor               |
//! | `seek`              | cursor += delta, clamped to `[0, horizon]`         |
//! | `control_configure` | replace the string, horizon = 0                    |
//! | `control_reset`     | drop the string, horizon = 0                       |

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::config::DriverConfig;
use crate::devno;
use crate::error::{RepeatedError, RepeatedResult};
use crate::handle::OpenHandle;
use crate::ioctl::ControlCommand;
use crate::registry::MinorRegistry;
use crate::state::DeviceState;
use crate::user::{UserSink, UserSource};

/// Source of per-instance ids so handles cannot cross drivers.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// One loaded instance of the repeated driver.
#[derive(Debug)]
pub struct RepeatedDriver {
    id: u64,
    config: DriverConfig,
    registry: MinorRegistry,
}

impl Default for RepeatedDriver {
    fn default() -> Self {
        Self::from_parts(DriverConfig::default(), MinorRegistry::new())
    }
}

impl RepeatedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver, reserving registry room up front.
    ///
    /// An allocation failure here aborts driver setup.
    pub fn with_config(config: DriverConfig) -> RepeatedResult<Self> {
        let registry = MinorRegistry::with_capacity(config.initial_minors).inspect_err(|_| {
            log::error!(
                "[REPEATED] {}: cannot reserve {} minors",
                config.name,
                config.initial_minors
            );
        })?;
        Ok(Self::from_parts(config, registry))
    }

    fn from_parts(config: DriverConfig, registry: MinorRegistry) -> Self {
        let id = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        log::info!("[REPEATED] {} driver instance {} initialized", config.name, id);
        Self {
            id,
            config,
            registry,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn registry(&self) -> &MinorRegistry {
        &self.registry
    }

    /// Open `minor`, creating its state on first use.
    pub fn open(&self, minor: u32) -> RepeatedResult<OpenHandle> {
        self.registry.lookup_or_create(minor).inspect_err(|_| {
            log::warn!("[REPEATED] open minor {}: out of memory", minor);
        })?;
        log::debug!("[REPEATED] open minor {}", minor);
        Ok(OpenHandle::new(self.id, minor))
    }

    /// Open by full device number (major is not checked).
    pub fn open_rdev(&self, rdev: u64) -> RepeatedResult<OpenHandle> {
        self.open(devno::minor(rdev))
    }

    /// Close a handle. Device state is untouched.
    pub fn close(&self, handle: OpenHandle) {
        log::debug!(
            "[REPEATED] close minor {} at cursor {}",
            handle.minor,
            handle.cursor
        );
    }

    fn resolve(&self, handle: &OpenHandle) -> RepeatedResult<Arc<DeviceState>> {
        if handle.driver != self.id {
            log::warn!(
                "[REPEATED] handle for minor {} belongs to another driver",
                handle.minor
            );
            return Err(RepeatedError::InvalidHandle);
        }
        self.registry.lookup(handle.minor).ok_or_else(|| {
            log::warn!("[REPEATED] minor {} is not registered", handle.minor);
            RepeatedError::InvalidHandle
        })
    }

    /// Extend the read horizon by `count`. Always reports 0 bytes written.
    pub fn write(&self, handle: &OpenHandle, count: usize) -> RepeatedResult<usize> {
        let state = self.resolve(handle)?;
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        let horizon = state.extend_horizon(count);
        log::trace!(
            "[REPEATED] write minor {}: +{} -> horizon {}",
            handle.minor,
            count,
            horizon
        );
        Ok(0)
    }

    /// Copy up to `requested` bytes into `buf` from the handle's cursor.
    ///
    /// The copy runs on a snapshot with no lock held, so a slow sink does not
    /// stall SET_STRING, RESET or write on the same minor. On a copy fault the
    /// cursor is left where it was; bytes already copied into `buf` are not
    /// rolled back.
    pub fn read<S>(&self, handle: &mut OpenHandle, buf: &mut S, requested: usize) -> RepeatedResult<usize>
    where
        S: UserSink + ?Sized,
    {
        let snapshot = self.resolve(handle)?.snapshot();
        let start = handle.cursor;
        let mut chunks = snapshot.reader().chunks(start, requested);
        let mut produced = 0;
        for chunk in chunks.by_ref() {
            buf.copy_to_user(produced, chunk).inspect_err(|e| {
                log::warn!("[REPEATED] read minor {}: {}", handle.minor, e);
            })?;
            produced += chunk.len();
        }
        let cursor = chunks.cursor();

        handle.cursor = cursor;
        log::trace!(
            "[REPEATED] read minor {}: {} of {} bytes, cursor {} -> {}",
            handle.minor,
            produced,
            requested,
            start,
            cursor
        );
        Ok(produced)
    }

    /// [`read`](Self::read) into a freshly allocated buffer.
    pub fn read_to_vec(&self, handle: &mut OpenHandle, requested: usize) -> RepeatedResult<Vec<u8>> {
        let mut out = Vec::new();
        self.read(handle, &mut out, requested)?;
        Ok(out)
    }

    /// Move the cursor by `delta`, clamped to `[0, horizon]`. Returns the new cursor.
    pub fn seek(&self, handle: &mut OpenHandle, delta: i64) -> RepeatedResult<u64> {
        let state = self.resolve(handle)?;
        let cursor = state.clamp_seek(handle.cursor, delta);
        log::trace!(
            "[REPEATED] seek minor {}: {} {:+} -> {}",
            handle.minor,
            handle.cursor,
            delta,
            cursor
        );
        handle.cursor = cursor;
        Ok(cursor)
    }

    /// SET_STRING: replace the minor's string with the caller's bytes.
    ///
    /// The caller bytes are copied completely before the state is touched, so
    /// a fault or an empty string leaves the previous string and horizon.
    pub fn control_configure<S>(&self, handle: &OpenHandle, src: &S) -> RepeatedResult<()>
    where
        S: UserSource + ?Sized,
    {
        let state = self.resolve(handle)?;
        let len = src.byte_len()?;
        if len == 0 {
            log::warn!("[REPEATED] SET_STRING minor {}: empty string", handle.minor);
            return Err(RepeatedError::EmptyConfiguration);
        }

        let mut content = Vec::new();
        content.try_reserve_exact(len).inspect_err(|_| {
            log::warn!("[REPEATED] SET_STRING minor {}: cannot allocate {} bytes", handle.minor, len);
        })?;
        content.resize(len, 0);
        src.copy_from_user(&mut content).inspect_err(|_| {
            log::warn!("[REPEATED] SET_STRING minor {}: copy from caller faulted", handle.minor);
        })?;

        state.configure(content)?;
        log::debug!("[REPEATED] SET_STRING minor {}: {} bytes", handle.minor, len);
        Ok(())
    }

    /// RESET: drop the minor's string and zero its horizon.
    pub fn control_reset(&self, handle: &OpenHandle) -> RepeatedResult<()> {
        let state = self.resolve(handle)?;
        let had_content = state.reset();
        log::debug!(
            "[REPEATED] RESET minor {} (had string: {})",
            handle.minor,
            had_content
        );
        Ok(())
    }

    /// Any command other than SET_STRING and RESET.
    pub fn control_unknown(&self, cmd: u32) -> RepeatedResult<()> {
        log::warn!("[REPEATED] unsupported control command {:#x}", cmd);
        Err(RepeatedError::UnsupportedOperation(cmd))
    }

    /// Dispatch a raw control command.
    ///
    /// `arg` is the SET_STRING source; `None` stands for a null user pointer.
    pub fn control(&self, handle: &OpenHandle, cmd: u32, arg: Option<&dyn UserSource>) -> RepeatedResult<()> {
        self.resolve(handle)?;
        let Ok(command) = ControlCommand::decode(cmd) else {
            return self.control_unknown(cmd);
        };
        match (command, arg) {
            (command, None) if command.takes_argument() => {
                log::warn!("[REPEATED] {:?} minor {}: null argument", command, handle.minor);
                Err(RepeatedError::CopyFault)
            }
            (ControlCommand::SetString, Some(src)) => self.control_configure(handle, src),
            (ControlCommand::SetString, None) => Err(RepeatedError::CopyFault),
            (ControlCommand::Reset, _) => self.control_reset(handle),
        }
    }

    /// Release all per-minor state. Open handles become invalid.
    pub fn teardown(&self) -> usize {
        let released = self.registry.teardown();
        log::info!(
            "[REPEATED] {} driver instance {} torn down, {} minors released",
            self.config.name,
            self.id,
            released
        );
        released
    }
}
