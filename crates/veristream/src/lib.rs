//! Public facade for the veristream workspace.
//!
//! A checksum-protected paged file: upper layers read and write a
//! contiguous *logical* byte stream while the underlying image is a
//! sequence of 1024-byte pages, each sealed with a CRC-32C tail over
//! its 1020-byte data region.
//!
//! ```no_run
//! use std::path::Path;
//! use veristream::{CheckedFile, ChecksumPolicy, OffsetMode, OpenMode};
//!
//! # fn main() -> veristream::Result<()> {
//! let mut file = CheckedFile::open(
//!     Path::new("scan.bin"),
//!     OpenMode::Write,
//!     ChecksumPolicy::All,
//! )?;
//! file.write(b"payload")?;
//! assert_eq!(file.length(OffsetMode::Logical)?, 7);
//! file.close()?;
//! # Ok(())
//! # }
//! ```

pub use veristream_backend::{Backend, FileBackend, MemoryBackend, Whence};
pub use veristream_core::{CheckedFile, ChecksumPolicy, OffsetMode, OpenMode};
pub use veristream_core::{checksum, geometry, text};
pub use veristream_error::{Result, VeristreamError};
