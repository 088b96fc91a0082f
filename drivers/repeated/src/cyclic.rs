//! TEAM_472: Cyclic read over the configured string.
//!
//! A read walks the string modulo its length, starting at `cursor`, and
//! stops at whichever comes first: `requested` bytes produced, or the cursor
//! reaching `horizon`. Each step yields one contiguous slice of the string,
//! so the driver can hand the pieces straight to the caller-copy primitive.
//!
//! ```text
//! content = "abc", horizon = 7, cursor = 2, requested = 10
//!
//!   cursor:  2 | 3 4 5 | 6
//!   chunk:   c | a b c | a      -> "cabca", new cursor 7
//! ```
//!
//! The functions here are pure: the same inputs always produce the same
//! bytes and the same new cursor.

use alloc::vec::Vec;

use crate::error::RepeatedResult;

/// Read plan over one snapshot of `(content, horizon)`.
#[derive(Debug, Clone, Copy)]
pub struct CyclicReader<'a> {
    content: &'a [u8],
    horizon: u64,
}

/// Bytes produced by [`CyclicReader::read`] and the cursor after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicRead {
    pub bytes: Vec<u8>,
    pub cursor: u64,
}

impl<'a> CyclicReader<'a> {
    /// Absent content reads exactly like an empty string.
    pub fn new(content: Option<&'a [u8]>, horizon: u64) -> Self {
        Self {
            content: content.unwrap_or(&[]),
            horizon,
        }
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Contiguous pieces of content for a read of `requested` bytes at `cursor`.
    pub fn chunks(&self, cursor: u64, requested: usize) -> Chunks<'a> {
        Chunks {
            content: self.content,
            horizon: self.horizon,
            cursor,
            remaining: requested,
        }
    }

    /// Number of bytes a read would produce, without producing them.
    pub fn available(&self, cursor: u64, requested: usize) -> usize {
        if self.content.is_empty() {
            return 0;
        }
        let left = self.horizon.saturating_sub(cursor);
        usize::try_from(left).map_or(requested, |left| left.min(requested))
    }

    /// Fill `buf` from `cursor`. Returns bytes written and the new cursor.
    pub fn read_into(&self, cursor: u64, buf: &mut [u8]) -> (usize, u64) {
        let mut chunks = self.chunks(cursor, buf.len());
        let mut produced = 0;
        for chunk in chunks.by_ref() {
            buf[produced..produced + chunk.len()].copy_from_slice(chunk);
            produced += chunk.len();
        }
        (produced, chunks.cursor())
    }

    /// Allocate and return up to `requested` bytes starting at `cursor`.
    ///
    /// The whole result is reserved up front, so a read larger than the
    /// allocator can satisfy fails with `AllocationError` before producing
    /// anything. Use [`chunks`](Self::chunks) or [`read_into`](Self::read_into)
    /// to stream reads of unbounded size.
    pub fn read(&self, cursor: u64, requested: usize) -> RepeatedResult<CyclicRead> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(self.available(cursor, requested))?;
        let mut chunks = self.chunks(cursor, requested);
        for chunk in chunks.by_ref() {
            bytes.extend_from_slice(chunk);
        }
        Ok(CyclicRead {
            bytes,
            cursor: chunks.cursor(),
        })
    }
}

/// Iterator over the contiguous slices of a cyclic read.
///
/// [`Chunks::cursor`] reports the cursor after the slices yielded so far.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    content: &'a [u8],
    horizon: u64,
    cursor: u64,
    remaining: usize,
}

impl<'a> Chunks<'a> {
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.content.is_empty() || self.remaining == 0 || self.cursor >= self.horizon {
            return None;
        }

        let len = self.content.len();
        // Remainder is < len, so it fits in usize
        let offset = (self.cursor % len as u64) as usize;
        let to_horizon = usize::try_from(self.horizon - self.cursor).unwrap_or(usize::MAX);
        let chunk = (len - offset).min(self.remaining).min(to_horizon);
        if chunk == 0 {
            return None;
        }

        self.cursor += chunk as u64;
        self.remaining -= chunk;
        Some(&self.content[offset..offset + chunk])
    }
}
