//! The checked paged file: a logical byte stream over sealed pages.
//!
//! [`CheckedFile`] owns one backend and one cursor. The cursor stored
//! by the backend is always a *physical* offset; logical positions are
//! derived through the bijection in [`crate::geometry`] on demand, so
//! the two can never drift apart.
//!
//! The object is single-owner and synchronous. No page cache sits in
//! between: every `read`/`write`/`extend` loads and stores whole
//! pages on demand, recomputing the tail checksum on every store.
//! Durability is the caller's concern; no fsync is issued.

use std::path::Path;

use veristream_backend::{Backend, FileBackend, MemoryBackend, Whence};
use veristream_error::{Result, VeristreamError};

use crate::checksum;
use crate::geometry::{
    LOGICAL_PAGE_SIZE, PHYSICAL_PAGE_SIZE, logical_to_physical, page_and_offset,
    physical_to_logical,
};
use crate::text;

/// How a file-backed [`CheckedFile`] is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, read-only.
    Read,
    /// New file; existing content is truncated at open.
    Write,
}

/// Which address space an offset or length is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetMode {
    /// Byte index into the on-disk (or in-memory) image.
    Physical,
    /// Byte index into the virtual stream, checksum bytes removed.
    Logical,
}

/// Read-side checksum verification policy.
///
/// A trade-off between coverage and read throughput. Sampling still
/// always verifies the tail of a read (the page most likely to expose
/// a torn write).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Never verify.
    None,
    /// Verify every page read.
    All,
    /// Verify roughly this percentage of pages, `1..=100`.
    Sampled(u32),
}

impl ChecksumPolicy {
    fn validate(self) -> Result<()> {
        match self {
            Self::Sampled(percent) if percent == 0 || percent > 100 => {
                Err(VeristreamError::internal(format!(
                    "sampled checksum percentage must be in 1..=100, got {percent}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Verify pages whose index is a multiple of `round(100 / percent)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_modulus(percent: u32) -> u64 {
    (100.0 / f64::from(percent)).round_ties_even() as u64
}

/// A checksum-protected paged file.
///
/// Upper layers see a contiguous logical byte stream; physically the
/// image is 1024-byte pages each sealed with a CRC-32C tail. Generic
/// over its storage [`Backend`]: [`FileBackend`] for on-disk files,
/// [`MemoryBackend`] for caller-owned read-only buffers.
pub struct CheckedFile<B: Backend> {
    name: String,
    /// `None` once closed; `close` is idempotent.
    backend: Option<B>,
    read_only: bool,
    /// Authoritative only for read-only instances; writable instances
    /// query the backend.
    physical_length: u64,
    logical_length: u64,
    policy: ChecksumPolicy,
}

impl CheckedFile<FileBackend> {
    /// Open a named file.
    ///
    /// `Read` opens an existing image read-only and derives the logical
    /// length from the physical one. `Write` creates the file,
    /// truncating any existing content.
    pub fn open(path: &Path, mode: OpenMode, policy: ChecksumPolicy) -> Result<Self> {
        policy.validate()?;
        match mode {
            OpenMode::Read => {
                let mut backend = FileBackend::open_read(path)?;
                let physical_length = backend.end_position()?;
                Ok(Self {
                    name: backend.name().to_owned(),
                    backend: Some(backend),
                    read_only: true,
                    physical_length,
                    logical_length: physical_to_logical(physical_length),
                    policy,
                })
            }
            OpenMode::Write => {
                let backend = FileBackend::open_write(path)?;
                Ok(Self {
                    name: backend.name().to_owned(),
                    backend: Some(backend),
                    read_only: false,
                    physical_length: 0,
                    logical_length: 0,
                    policy,
                })
            }
        }
    }

    /// Close, then make a best-effort attempt to remove the named
    /// file. Removal failure is intentionally ignored.
    pub fn unlink(&mut self) -> Result<()> {
        self.close()?;
        let _ = std::fs::remove_file(&self.name);
        Ok(())
    }
}

impl<'a> CheckedFile<MemoryBackend<'a>> {
    /// Wrap a caller-owned buffer as a read-only checked file.
    ///
    /// The buffer must be a well-formed image (a whole number of
    /// sealed pages) for reads to span it fully. Closing releases only
    /// the view, never the buffer.
    pub fn from_buffer(data: &'a [u8], policy: ChecksumPolicy) -> Result<Self> {
        policy.validate()?;
        let mut backend = MemoryBackend::new(data);
        let physical_length = backend.end_position()?;
        Ok(Self {
            name: backend.name().to_owned(),
            backend: Some(backend),
            read_only: true,
            physical_length,
            logical_length: physical_to_logical(physical_length),
            policy,
        })
    }
}

impl<B: Backend> CheckedFile<B> {
    /// The opaque identifier this instance was constructed with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether mutations are rejected.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn backend_mut(&mut self) -> Result<&mut B> {
        let name = &self.name;
        self.backend
            .as_mut()
            .ok_or_else(|| VeristreamError::internal(format!("'{name}' used after close")))
    }

    /// Current cursor in the requested address space.
    pub fn position(&mut self, mode: OffsetMode) -> Result<u64> {
        let physical = self.backend_mut()?.position()?;
        Ok(match mode {
            OffsetMode::Physical => physical,
            OffsetMode::Logical => physical_to_logical(physical),
        })
    }

    /// Length of the image (physical) or the stream (logical).
    ///
    /// The physical length of a writable instance is queried from the
    /// backend with the cursor restored afterwards.
    pub fn length(&mut self, mode: OffsetMode) -> Result<u64> {
        match mode {
            OffsetMode::Physical => {
                if self.read_only {
                    Ok(self.physical_length)
                } else {
                    self.backend_mut()?.end_position()
                }
            }
            OffsetMode::Logical => Ok(self.logical_length),
        }
    }

    /// Move the cursor. Logical offsets are converted first.
    ///
    /// No bounds check against the logical length: a caller may
    /// legitimately seek past the end before extending.
    pub fn seek(&mut self, offset: u64, mode: OffsetMode) -> Result<()> {
        let physical = match mode {
            OffsetMode::Physical => offset,
            OffsetMode::Logical => logical_to_physical(offset),
        };
        self.backend_mut()?.seek(physical, Whence::Set)?;
        Ok(())
    }

    fn current_page_and_offset(&mut self) -> Result<(u64, usize)> {
        let logical = self.position(OffsetMode::Logical)?;
        Ok(page_and_offset(logical))
    }

    fn read_physical_page(
        &mut self,
        page_buffer: &mut [u8; PHYSICAL_PAGE_SIZE],
        page: u64,
    ) -> Result<()> {
        self.seek(page * PHYSICAL_PAGE_SIZE as u64, OffsetMode::Physical)?;
        let n = self.backend_mut()?.read(page_buffer)?;
        if n != PHYSICAL_PAGE_SIZE {
            return Err(VeristreamError::ReadFailed {
                name: self.name.clone(),
                detail: format!(
                    "short read on page {page}: expected {PHYSICAL_PAGE_SIZE} bytes, got {n}"
                ),
            });
        }
        Ok(())
    }

    fn write_physical_page(
        &mut self,
        page_buffer: &mut [u8; PHYSICAL_PAGE_SIZE],
        page: u64,
    ) -> Result<()> {
        checksum::seal_page(page_buffer);
        self.seek(page * PHYSICAL_PAGE_SIZE as u64, OffsetMode::Physical)?;
        self.backend_mut()?.write(page_buffer)
    }

    fn verify_checksum(&mut self, page_buffer: &[u8; PHYSICAL_PAGE_SIZE], page: u64) -> Result<()> {
        let computed = checksum::page_checksum(&page_buffer[..LOGICAL_PAGE_SIZE]);
        let stored = checksum::stored_checksum(page_buffer);
        if computed != stored {
            let physical_length = self.length(OffsetMode::Physical)?;
            return Err(VeristreamError::BadChecksum {
                name: self.name.clone(),
                page,
                computed,
                stored,
                physical_length,
            });
        }
        Ok(())
    }

    /// Whether this page of the current read gets verified.
    ///
    /// `remaining` counts the bytes still to deliver including this
    /// page; under sampling, a residue below one physical page means
    /// the read is on its tail, which is always checked.
    fn wants_verification(&self, page: u64, remaining: usize) -> bool {
        match self.policy {
            ChecksumPolicy::None => false,
            ChecksumPolicy::All => true,
            ChecksumPolicy::Sampled(percent) => {
                page % sample_modulus(percent) == 0 || remaining < PHYSICAL_PAGE_SIZE
            }
        }
    }

    /// Read exactly `buf.len()` logical bytes at the cursor.
    ///
    /// Reading past the logical end is a caller bug and yields
    /// [`VeristreamError::Internal`]. On success the cursor sits just
    /// past the last byte read.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.position(OffsetMode::Logical)? + buf.len() as u64;
        let logical_length = self.length(OffsetMode::Logical)?;
        if end > logical_length {
            return Err(VeristreamError::Internal {
                detail: format!(
                    "read past logical end of '{}': end {end}, length {logical_length}",
                    self.name
                ),
            });
        }

        let (mut page, mut page_offset) = self.current_page_and_offset()?;
        let mut page_buffer = [0_u8; PHYSICAL_PAGE_SIZE];
        // First iteration may start mid-page; later ones never do.
        let mut n = buf.len().min(LOGICAL_PAGE_SIZE - page_offset);
        let mut filled = 0;

        while filled < buf.len() {
            let remaining = buf.len() - filled;
            self.read_physical_page(&mut page_buffer, page)?;
            if self.wants_verification(page, remaining) {
                self.verify_checksum(&page_buffer, page)?;
            }
            buf[filled..filled + n].copy_from_slice(&page_buffer[page_offset..page_offset + n]);
            filled += n;
            page_offset = 0;
            page += 1;
            n = (buf.len() - filled).min(LOGICAL_PAGE_SIZE);
        }

        // The page loop parks the cursor at a page boundary; pin it
        // just past the last byte read instead.
        self.seek(end, OffsetMode::Logical)
    }

    /// Write `buf` as logical bytes at the cursor.
    ///
    /// Pages already on disk are load-modify-written so their
    /// untouched bytes survive; every stored page gets a fresh seal.
    /// On success the cursor sits just past the last byte written and
    /// the logical length covers it.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.read_only {
            return Err(VeristreamError::FileReadOnly {
                name: self.name.clone(),
            });
        }

        let end = self.position(OffsetMode::Logical)? + buf.len() as u64;
        let (mut page, mut page_offset) = self.current_page_and_offset()?;
        let mut page_buffer = [0_u8; PHYSICAL_PAGE_SIZE];
        let mut n = buf.len().min(LOGICAL_PAGE_SIZE - page_offset);
        let mut written = 0;

        while written < buf.len() {
            let physical_length = self.length(OffsetMode::Physical)?;
            if page * (PHYSICAL_PAGE_SIZE as u64) < physical_length {
                self.read_physical_page(&mut page_buffer, page)?;
            }
            page_buffer[page_offset..page_offset + n].copy_from_slice(&buf[written..written + n]);
            self.write_physical_page(&mut page_buffer, page)?;
            written += n;
            page_offset = 0;
            page += 1;
            n = (buf.len() - written).min(LOGICAL_PAGE_SIZE);
        }

        if end > self.logical_length {
            self.logical_length = end;
        }
        self.seek(end, OffsetMode::Logical)
    }

    /// Grow the stream to `new_length` with zero-filled logical bytes.
    ///
    /// Shrinking is a caller bug ([`VeristreamError::Internal`]). The
    /// logical length advances page by page as zeros land, so a
    /// failure partway leaves the object consistent with the bytes
    /// actually on disk.
    pub fn extend(&mut self, new_length: u64, mode: OffsetMode) -> Result<()> {
        if self.read_only {
            return Err(VeristreamError::FileReadOnly {
                name: self.name.clone(),
            });
        }

        let new_logical_length = match mode {
            OffsetMode::Physical => physical_to_logical(new_length),
            OffsetMode::Logical => new_length,
        };
        let current_logical_length = self.length(OffsetMode::Logical)?;
        if new_logical_length < current_logical_length {
            return Err(VeristreamError::Internal {
                detail: format!(
                    "extend would shrink '{}': new length {new_logical_length}, \
                     current {current_logical_length}",
                    self.name
                ),
            });
        }

        let mut remaining = new_logical_length - current_logical_length;
        tracing::trace!(
            file = %self.name,
            from = current_logical_length,
            to = new_logical_length,
            "zero-fill extend"
        );

        self.seek(current_logical_length, OffsetMode::Logical)?;
        let (mut page, mut page_offset) = self.current_page_and_offset()?;
        let mut page_buffer = [0_u8; PHYSICAL_PAGE_SIZE];
        #[allow(clippy::cast_possible_truncation)]
        let mut n = remaining.min((LOGICAL_PAGE_SIZE - page_offset) as u64) as usize;

        while remaining > 0 {
            let physical_length = self.length(OffsetMode::Physical)?;
            if page * (PHYSICAL_PAGE_SIZE as u64) < physical_length {
                self.read_physical_page(&mut page_buffer, page)?;
            }
            page_buffer[page_offset..page_offset + n].fill(0);
            self.write_physical_page(&mut page_buffer, page)?;
            remaining -= n as u64;
            self.logical_length = new_logical_length - remaining;
            page_offset = 0;
            page += 1;
            #[allow(clippy::cast_possible_truncation)]
            {
                n = remaining.min(LOGICAL_PAGE_SIZE as u64) as usize;
            }
        }

        self.seek(new_logical_length, OffsetMode::Logical)
    }

    /// Append a UTF-8 string as its raw bytes (no terminator, no
    /// length prefix).
    pub fn write_str(&mut self, value: &str) -> Result<&mut Self> {
        self.write(value.as_bytes())?;
        Ok(self)
    }

    /// Append a signed integer in decimal, no padding.
    pub fn write_i64(&mut self, value: i64) -> Result<&mut Self> {
        self.write_str(&value.to_string())
    }

    /// Append an unsigned integer in decimal, no padding.
    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self> {
        self.write_str(&value.to_string())
    }

    /// Append a 32-bit float at 7 significant digits.
    pub fn write_f32(&mut self, value: f32) -> Result<&mut Self> {
        self.write_str(&text::float32_to_text(value))
    }

    /// Append a 64-bit float at 17 significant digits (lossless for
    /// IEEE-754 binary64).
    pub fn write_f64(&mut self, value: f64) -> Result<&mut Self> {
        self.write_str(&text::float64_to_text(value))
    }

    /// Release the backend. Safe to call more than once; only the
    /// first call can fail.
    pub fn close(&mut self) -> Result<()> {
        if let Some(backend) = self.backend.take() {
            tracing::trace!(file = %self.name, "closing");
            backend.close()?;
        }
        Ok(())
    }
}

impl<B: Backend> Drop for CheckedFile<B> {
    fn drop(&mut self) {
        // Cleanup must not panic, but a discarded close verdict can
        // hide a late write error, so it is at least logged.
        if let Err(err) = self.close() {
            tracing::warn!(file = %self.name, error = %err, "close failed in destructor");
        }
    }
}
