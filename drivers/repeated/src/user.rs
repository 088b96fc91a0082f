//! TEAM_472: Caller memory boundary.
//!
//! The host supplies the actual user/kernel copy primitives. The core only
//! sees these two traits and treats any failure as [`RepeatedError::CopyFault`].

use alloc::vec::Vec;
use core::ffi::CStr;

use crate::error::{RepeatedError, RepeatedResult};

/// Caller-owned bytes the core copies in (SET_STRING argument).
pub trait UserSource {
    /// Length of the caller's byte sequence (`strlen_user` shape).
    fn byte_len(&self) -> RepeatedResult<usize>;

    /// Copy exactly `dst.len()` bytes from the start of the source.
    fn copy_from_user(&self, dst: &mut [u8]) -> RepeatedResult<()>;
}

/// Caller-owned buffer the core copies out to (read destination).
pub trait UserSink {
    /// Copy `src` into the caller buffer at `offset`.
    fn copy_to_user(&mut self, offset: usize, src: &[u8]) -> RepeatedResult<()>;
}

impl UserSource for [u8] {
    fn byte_len(&self) -> RepeatedResult<usize> {
        Ok(self.len())
    }

    fn copy_from_user(&self, dst: &mut [u8]) -> RepeatedResult<()> {
        let src = self.get(..dst.len()).ok_or(RepeatedError::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSource for CStr {
    fn byte_len(&self) -> RepeatedResult<usize> {
        Ok(self.to_bytes().len())
    }

    fn copy_from_user(&self, dst: &mut [u8]) -> RepeatedResult<()> {
        self.to_bytes().copy_from_user(dst)
    }
}

/// Lets unsized sources travel as `&dyn UserSource`.
impl<T: UserSource + ?Sized> UserSource for &T {
    fn byte_len(&self) -> RepeatedResult<usize> {
        (**self).byte_len()
    }

    fn copy_from_user(&self, dst: &mut [u8]) -> RepeatedResult<()> {
        (**self).copy_from_user(dst)
    }
}

impl UserSink for [u8] {
    fn copy_to_user(&mut self, offset: usize, src: &[u8]) -> RepeatedResult<()> {
        let end = offset.checked_add(src.len()).ok_or(RepeatedError::CopyFault)?;
        let dst = self.get_mut(offset..end).ok_or(RepeatedError::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl<const N: usize> UserSink for [u8; N] {
    fn copy_to_user(&mut self, offset: usize, src: &[u8]) -> RepeatedResult<()> {
        self.as_mut_slice().copy_to_user(offset, src)
    }
}

/// Growable sink; only sequential appends are accepted.
impl UserSink for Vec<u8> {
    fn copy_to_user(&mut self, offset: usize, src: &[u8]) -> RepeatedResult<()> {
        if offset != self.len() {
            return Err(RepeatedError::CopyFault);
        }
        self.try_reserve(src.len())?;
        self.extend_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let src: &[u8] = b"abc";
        assert_eq!(src.byte_len(), Ok(3));
        let mut dst = [0u8; 2];
        src.copy_from_user(&mut dst).unwrap();
        assert_eq!(&dst, b"ab");
    }

    #[test]
    fn test_slice_source_short() {
        let src: &[u8] = b"ab";
        let mut dst = [0u8; 3];
        assert_eq!(src.copy_from_user(&mut dst), Err(RepeatedError::CopyFault));
    }

    #[test]
    fn test_cstr_source_stops_at_nul() {
        let s = CStr::from_bytes_with_nul(b"xyz\0").unwrap();
        assert_eq!(s.byte_len(), Ok(3));
        let mut dst = [0u8; 3];
        s.copy_from_user(&mut dst).unwrap();
        assert_eq!(&dst, b"xyz");
    }

    #[test]
    fn test_slice_sink_bounds() {
        let mut buf = [0u8; 4];
        buf.copy_to_user(1, b"ab").unwrap();
        assert_eq!(&buf, b"\0ab\0");
        assert_eq!(buf.copy_to_user(3, b"ab"), Err(RepeatedError::CopyFault));
        assert_eq!(buf.copy_to_user(usize::MAX, b"a"), Err(RepeatedError::CopyFault));
    }

    #[test]
    fn test_vec_sink_appends() {
        let mut out: Vec<u8> = Vec::new();
        out.copy_to_user(0, b"ab").unwrap();
        out.copy_to_user(2, b"c").unwrap();
        assert_eq!(out, b"abc");
        // Gaps are rejected
        assert_eq!(out.copy_to_user(7, b"d"), Err(RepeatedError::CopyFault));
    }
}
