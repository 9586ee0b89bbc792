//! The backend abstraction: positioned reads and writes over a cursor.

use veristream_error::Result;

/// Origin a [`Backend::seek`] offset is measured from.
///
/// Offsets are unsigned throughout. `Set` and `Cur` move forward from
/// the start and the current position respectively. `End` interprets
/// the offset as a distance *back* from the end of the image
/// (`new_pos = len - offset`) — the container's historical reader
/// semantics, not POSIX `lseek(SEEK_END)` with a signed offset. Both
/// backends follow this rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute position from the start of the image.
    Set,
    /// Forward from the current cursor.
    Cur,
    /// Backward from the end of the image.
    End,
}

impl Whence {
    /// Short label used in error context.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Cur => "cur",
            Self::End => "end",
        }
    }
}

/// Cursor-based storage under a checked paged file.
///
/// Exactly two implementations exist: [`crate::FileBackend`] over an
/// OS descriptor and [`crate::MemoryBackend`] over a caller-owned byte
/// slice. All positions are *physical* offsets — the layer above owns
/// the logical/physical distinction.
///
/// Backends are single-owner and keep one cursor; interleaving calls
/// from two callers corrupts both. They never buffer, retry, or sync.
pub trait Backend {
    /// Opaque identifier used in error context (the file name, or a
    /// placeholder for memory-backed instances).
    fn name(&self) -> &str;

    /// Move the cursor and return the new physical position.
    fn seek(&mut self, offset: u64, whence: Whence) -> Result<u64>;

    /// Read up to `buf.len()` bytes at the cursor, advancing it.
    ///
    /// Returns the number of bytes actually read; fewer than requested
    /// means the cursor reached the end of the image. The caller
    /// decides whether a short read is an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write all of `buf` at the cursor, advancing it.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Current physical cursor position.
    fn position(&mut self) -> Result<u64>;

    /// Physical length of the image. The cursor is left where it was.
    fn end_position(&mut self) -> Result<u64>;

    /// Release the underlying resource, reporting the host's verdict.
    ///
    /// Consumes the backend: there is no half-closed state. A memory
    /// backend releases only its view, never the caller's buffer.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
