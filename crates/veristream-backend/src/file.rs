//! OS-file backend.
//!
//! A thin wrapper over [`std::fs::File`] that adds the error context
//! the paged layer reports (file name, attempted operation, native
//! error code) and an explicit close that surfaces the descriptor
//! close verdict instead of discarding it in `Drop`.
//!
//! Paths are UTF-8 [`Path`]s; conversion to the host's native form
//! (wide characters on Windows) is the standard library's job.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read as _, Seek as _, SeekFrom, Write as _};
use std::os::fd::IntoRawFd as _;
use std::path::Path;

use veristream_error::{Result, VeristreamError};

use crate::traits::{Backend, Whence};

/// A backend over a real OS file descriptor.
#[derive(Debug)]
pub struct FileBackend {
    name: String,
    file: File,
}

impl FileBackend {
    /// Open an existing file read-only.
    pub fn open_read(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|source| VeristreamError::OpenFailed {
                name: name.clone(),
                source,
            })?;
        tracing::debug!(file = %name, "opened read-only");
        Ok(Self { name, file })
    }

    /// Open a file read-write, creating it and truncating any existing
    /// content to zero length.
    pub fn open_write(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| VeristreamError::OpenFailed {
                name: name.clone(),
                source,
            })?;
        tracing::debug!(file = %name, "opened for writing (truncated)");
        Ok(Self { name, file })
    }

    fn signed(&self, offset: u64, whence: Whence) -> Result<i64> {
        i64::try_from(offset).map_err(|_| VeristreamError::SeekFailed {
            name: self.name.clone(),
            offset,
            whence: whence.label(),
            detail: "offset does not fit in a signed 64-bit seek".to_owned(),
        })
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn seek(&mut self, offset: u64, whence: Whence) -> Result<u64> {
        let target = match whence {
            Whence::Set => SeekFrom::Start(offset),
            Whence::Cur => SeekFrom::Current(self.signed(offset, whence)?),
            // `End` is an unsigned distance back from the end; see `Whence`.
            Whence::End => SeekFrom::End(-self.signed(offset, whence)?),
        };
        self.file
            .seek(target)
            .map_err(|err| VeristreamError::SeekFailed {
                name: self.name.clone(),
                offset,
                whence: whence.label(),
                detail: err.to_string(),
            })
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    return Err(VeristreamError::ReadFailed {
                        name: self.name.clone(),
                        detail: err.to_string(),
                    });
                }
            }
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.file
            .write_all(buf)
            .map_err(|err| VeristreamError::WriteFailed {
                name: self.name.clone(),
                detail: err.to_string(),
            })
    }

    fn position(&mut self) -> Result<u64> {
        self.file
            .stream_position()
            .map_err(|err| VeristreamError::SeekFailed {
                name: self.name.clone(),
                offset: 0,
                whence: Whence::Cur.label(),
                detail: err.to_string(),
            })
    }

    fn end_position(&mut self) -> Result<u64> {
        let original = self.position()?;
        let end = self.seek(0, Whence::End)?;
        self.seek(original, Whence::Set)?;
        Ok(end)
    }

    fn close(self) -> Result<()> {
        // `Drop` on `File` would discard the close result; hand the
        // descriptor to an explicit close so the verdict is reported.
        let name = self.name;
        let fd = self.file.into_raw_fd();
        nix::unistd::close(fd).map_err(|errno| VeristreamError::CloseFailed {
            name,
            source: errno.into(),
        })
    }
}
