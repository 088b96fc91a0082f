//! TEAM_472: Character device file operations.
//!
//! Thin errno layer over [`RepeatedDriver`] in the shape the host's dispatch
//! table expects. Results follow the syscall convention: `Ok` carries a count
//! or position, `Err` a positive errno from `linux_raw_sys::errno`.

use linux_raw_sys::errno::{EINVAL, EOVERFLOW};
use linux_raw_sys::general::{SEEK_CUR, SEEK_END, SEEK_SET};

use crate::driver::RepeatedDriver;
use crate::error::RepeatedError;
use crate::handle::OpenHandle;
use crate::user::{UserSink, UserSource};

/// Result of a file operation: count/position, or raw errno.
pub type DevResult = Result<i64, u32>;

/// Character device operations.
///
/// The handle owns the file position, so it doubles as the `f_pos` the
/// host would otherwise pass alongside.
pub trait CharDeviceOps: Send + Sync {
    /// Open the device node `rdev`
    fn open(&self, rdev: u64) -> Result<OpenHandle, u32>;

    /// Release a handle; always 0
    fn release(&self, handle: OpenHandle) -> i64;

    /// Read up to `count` bytes into `buf`
    fn read(&self, handle: &mut OpenHandle, buf: &mut dyn UserSink, count: usize) -> DevResult;

    /// Write `count` bytes from `buf`
    fn write(&self, handle: &mut OpenHandle, buf: &dyn UserSource, count: usize) -> DevResult;

    /// Reposition the handle
    fn llseek(&self, handle: &mut OpenHandle, offset: i64, whence: u32) -> DevResult;

    /// Device-specific control
    fn ioctl(&self, handle: &OpenHandle, cmd: u32, arg: Option<&dyn UserSource>) -> DevResult;
}

fn errno(err: RepeatedError) -> u32 {
    err.errno()
}

impl CharDeviceOps for RepeatedDriver {
    fn open(&self, rdev: u64) -> Result<OpenHandle, u32> {
        self.open_rdev(rdev).map_err(errno)
    }

    fn release(&self, handle: OpenHandle) -> i64 {
        self.close(handle);
        0
    }

    fn read(&self, handle: &mut OpenHandle, buf: &mut dyn UserSink, count: usize) -> DevResult {
        let produced = RepeatedDriver::read(self, handle, buf, count).map_err(errno)?;
        Ok(produced as i64)
    }

    /// The payload is never copied; only `count` advances the horizon.
    fn write(&self, handle: &mut OpenHandle, _buf: &dyn UserSource, count: usize) -> DevResult {
        let accepted = RepeatedDriver::write(self, handle, count).map_err(errno)?;
        Ok(accepted as i64)
    }

    /// Every `whence` is applied relative to the current position.
    fn llseek(&self, handle: &mut OpenHandle, offset: i64, whence: u32) -> DevResult {
        if !matches!(whence, SEEK_SET | SEEK_CUR | SEEK_END) {
            return Err(EINVAL);
        }
        let cursor = self.seek(handle, offset).map_err(errno)?;
        // Horizon is capped at i64::MAX, so this only fails on a broken invariant
        i64::try_from(cursor).map_err(|_| EOVERFLOW)
    }

    fn ioctl(&self, handle: &OpenHandle, cmd: u32, arg: Option<&dyn UserSource>) -> DevResult {
        self.control(handle, cmd, arg).map_err(errno)?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devno::makedev;
    use crate::ioctl::{RESET, SET_STRING};
    use linux_raw_sys::errno::{EBADF, EFAULT, ENOTTY};

    fn ops() -> RepeatedDriver {
        RepeatedDriver::new()
    }

    #[test]
    fn test_file_ops_client_flow() {
        let dev = ops();
        let mut handle = CharDeviceOps::open(&dev, makedev(240, 0)).unwrap();

        let key: &[u8] = b"abc";
        assert_eq!(dev.ioctl(&handle, SET_STRING, Some(&key as &dyn UserSource)), Ok(0));

        let msg: &[u8] = b"ignored";
        assert_eq!(CharDeviceOps::write(&dev, &mut handle, &msg, msg.len()), Ok(0));

        let mut buf = [0u8; 17];
        let n = CharDeviceOps::read(&dev, &mut handle, &mut buf, 17).unwrap();
        assert_eq!(n, 7);
        assert_eq!(&buf[..7], b"abcabca");

        assert_eq!(dev.release(handle), 0);
    }

    #[test]
    fn test_llseek_whence() {
        let dev = ops();
        let mut handle = CharDeviceOps::open(&dev, makedev(240, 1)).unwrap();
        let msg: &[u8] = b"0123456789";
        CharDeviceOps::write(&dev, &mut handle, &msg, msg.len()).unwrap();

        assert_eq!(dev.llseek(&mut handle, 4, SEEK_SET), Ok(4));
        assert_eq!(dev.llseek(&mut handle, 4, SEEK_CUR), Ok(8));
        assert_eq!(dev.llseek(&mut handle, 1000, SEEK_END), Ok(10));
        assert_eq!(dev.llseek(&mut handle, -1000, SEEK_CUR), Ok(0));
        assert_eq!(dev.llseek(&mut handle, 1, 42), Err(EINVAL));
    }

    #[test]
    fn test_llseek_position_matches_cursor_at_limit() {
        let dev = ops();
        let mut handle = CharDeviceOps::open(&dev, makedev(240, 5)).unwrap();
        let msg: &[u8] = b"x";
        CharDeviceOps::write(&dev, &mut handle, &msg, usize::MAX).unwrap();
        CharDeviceOps::write(&dev, &mut handle, &msg, usize::MAX).unwrap();

        assert_eq!(dev.llseek(&mut handle, i64::MAX, SEEK_CUR), Ok(i64::MAX));
        assert_eq!(dev.llseek(&mut handle, i64::MAX, SEEK_CUR), Ok(i64::MAX));
        assert_eq!(handle.cursor(), i64::MAX as u64);
        assert_eq!(dev.llseek(&mut handle, -1, SEEK_CUR), Ok(i64::MAX - 1));
        assert_eq!(handle.cursor(), (i64::MAX - 1) as u64);
    }

    #[test]
    fn test_ioctl_errors() {
        let dev = ops();
        let handle = CharDeviceOps::open(&dev, makedev(240, 2)).unwrap();
        let empty: &[u8] = b"";
        assert_eq!(dev.ioctl(&handle, SET_STRING, Some(&empty as &dyn UserSource)), Err(EINVAL));
        assert_eq!(dev.ioctl(&handle, SET_STRING, None), Err(EFAULT));
        assert_eq!(dev.ioctl(&handle, 0x5401, None), Err(ENOTTY));
        assert_eq!(dev.ioctl(&handle, RESET, None), Ok(0));
    }

    #[test]
    fn test_read_fault_is_efault() {
        let dev = ops();
        let mut handle = CharDeviceOps::open(&dev, makedev(240, 3)).unwrap();
        let key: &[u8] = b"ab";
        dev.ioctl(&handle, SET_STRING, Some(&key as &dyn UserSource)).unwrap();
        RepeatedDriver::write(&dev, &handle, 4).unwrap();

        let mut tiny = [0u8; 1];
        assert_eq!(
            CharDeviceOps::read(&dev, &mut handle, &mut tiny, 4),
            Err(EFAULT)
        );
    }

    #[test]
    fn test_torn_down_handle_is_ebadf() {
        let dev = ops();
        let mut handle = CharDeviceOps::open(&dev, makedev(240, 4)).unwrap();
        dev.teardown();
        let mut buf = [0u8; 4];
        assert_eq!(
            CharDeviceOps::read(&dev, &mut handle, &mut buf, 4),
            Err(EBADF)
        );
        assert_eq!(dev.llseek(&mut handle, 0, SEEK_CUR), Err(EBADF));
        assert_eq!(dev.ioctl(&handle, RESET, None), Err(EBADF));
    }
}
