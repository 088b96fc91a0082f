//! TEAM_472: Error type for the repeated device.
//!
//! Every operation returns [`RepeatedResult`]. The conventional char-device
//! surface converts errors to a raw positive errno with [`RepeatedError::errno`].

use alloc::collections::TryReserveError;
use linux_raw_sys::errno::{EBADF, EFAULT, EINVAL, ENOMEM, ENOTTY};

/// Errors returned by the repeated device core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RepeatedError {
    /// Handle is not bound to a known minor (closed, torn down, or foreign)
    #[error("handle is not bound to a known minor")]
    InvalidHandle,
    /// Heap allocation failed
    #[error("out of memory")]
    AllocationError,
    /// SET_STRING was given a zero-length string
    #[error("configuration string is empty")]
    EmptyConfiguration,
    /// Copy to or from caller memory faulted
    #[error("caller memory transfer faulted")]
    CopyFault,
    /// Unknown control command
    #[error("unsupported control command {0:#x}")]
    UnsupportedOperation(u32),
}

impl RepeatedError {
    /// Raw errno for the Linux ABI (positive, as in `linux_raw_sys::errno`).
    pub const fn errno(self) -> u32 {
        match self {
            Self::InvalidHandle => EBADF,
            Self::AllocationError => ENOMEM,
            Self::EmptyConfiguration => EINVAL,
            Self::CopyFault => EFAULT,
            Self::UnsupportedOperation(_) => ENOTTY,
        }
    }
}

impl From<TryReserveError> for RepeatedError {
    fn from(_: TryReserveError) -> Self {
        Self::AllocationError
    }
}

/// Result alias used across the crate.
pub type RepeatedResult<T> = Result<T, RepeatedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(RepeatedError::InvalidHandle.errno(), EBADF);
        assert_eq!(RepeatedError::AllocationError.errno(), ENOMEM);
        assert_eq!(RepeatedError::EmptyConfiguration.errno(), EINVAL);
        assert_eq!(RepeatedError::CopyFault.errno(), EFAULT);
        assert_eq!(RepeatedError::UnsupportedOperation(7).errno(), ENOTTY);
    }

    #[test]
    fn test_try_reserve_failure_is_allocation_error() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        assert_eq!(RepeatedError::from(err), RepeatedError::AllocationError);
    }

    #[test]
    fn test_display_includes_command() {
        let msg = alloc::format!("{}", RepeatedError::UnsupportedOperation(0x4242));
        assert!(msg.contains("0x4242"));
    }
}
