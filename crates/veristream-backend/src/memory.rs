//! Read-only memory backend.
//!
//! Wraps a caller-owned byte slice behind the same cursor surface as
//! [`crate::FileBackend`]. The borrow makes the ownership contract a
//! compile-time fact: closing the backend releases only the view, and
//! the buffer outlives the backend by construction.

use veristream_error::{Result, VeristreamError};

use crate::traits::{Backend, Whence};

/// Name reported by memory-backed instances in error context.
pub const STREAM_BUFFER_NAME: &str = "<stream-buffer>";

/// A backend over an immutable, caller-owned byte buffer.
///
/// Writes are rejected; the paged layer marks memory-backed instances
/// read-only and never issues them.
#[derive(Debug)]
pub struct MemoryBackend<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> MemoryBackend<'a> {
    /// Wrap a caller-owned buffer. The cursor starts at zero.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn clamp_err(&mut self, offset: u64, whence: Whence) -> VeristreamError {
        self.pos = self.len();
        VeristreamError::SeekFailed {
            name: STREAM_BUFFER_NAME.to_owned(),
            offset,
            whence: whence.label(),
            detail: format!("clamped to end of {}-byte buffer", self.data.len()),
        }
    }
}

impl Backend for MemoryBackend<'_> {
    fn name(&self) -> &str {
        STREAM_BUFFER_NAME
    }

    /// Seek past the end clamps the cursor to the end and reports the
    /// failure for this call; [`Backend::position`] then reports the
    /// end. `End` is an unsigned distance back from the end.
    fn seek(&mut self, offset: u64, whence: Whence) -> Result<u64> {
        let target = match whence {
            Whence::Set => Some(offset),
            Whence::Cur => self.pos.checked_add(offset),
            Whence::End => self.len().checked_sub(offset),
        };
        match target {
            Some(target) if target <= self.len() => {
                self.pos = target;
                Ok(target)
            }
            _ => Err(self.clamp_err(offset, whence)),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        #[allow(clippy::cast_possible_truncation)]
        let start = self.pos as usize;
        let available = self.data.len().saturating_sub(start);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<()> {
        Err(VeristreamError::FileReadOnly {
            name: STREAM_BUFFER_NAME.to_owned(),
        })
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn end_position(&mut self) -> Result<u64> {
        Ok(self.len())
    }

    fn close(self) -> Result<()> {
        // The view drops here; the caller's buffer is untouched.
        Ok(())
    }
}
