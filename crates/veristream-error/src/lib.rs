//! Error taxonomy for veristream.
//!
//! Every failure surfaced by the library is one of the variants below.
//! Variants carry the structured context a caller needs to act on the
//! failure without parsing the message: the file name the instance was
//! opened with, the offending page or offset, and (for OS-level
//! failures) the underlying [`std::io::Error`], whose display includes
//! the native error code.
//!
//! Nothing in the library retries or recovers from these; errors
//! propagate to the caller unchanged.

use thiserror::Error;

/// Primary error type for veristream operations.
#[derive(Error, Debug)]
pub enum VeristreamError {
    /// The backend refused to open the named file.
    #[error("cannot open '{name}': {source}")]
    OpenFailed {
        /// File name passed to the constructor.
        name: String,
        /// The host open failure, including the native error code.
        source: std::io::Error,
    },

    /// The backend rejected a seek, or a memory-backend seek was
    /// clamped to the end of the buffer.
    #[error("seek failed on '{name}' ({whence} {offset}): {detail}")]
    SeekFailed {
        /// File name of the instance.
        name: String,
        /// The offset passed to the failing seek.
        offset: u64,
        /// Origin the offset was measured from.
        whence: &'static str,
        /// What the backend reported.
        detail: String,
    },

    /// A backend read returned an error or fewer bytes than a full page.
    #[error("read failed on '{name}': {detail}")]
    ReadFailed {
        /// File name of the instance.
        name: String,
        /// What the backend reported, including short-read counts.
        detail: String,
    },

    /// A backend write returned an error.
    #[error("write failed on '{name}': {detail}")]
    WriteFailed {
        /// File name of the instance.
        name: String,
        /// What the backend reported.
        detail: String,
    },

    /// The OS rejected the descriptor close.
    #[error("close failed on '{name}': {source}")]
    CloseFailed {
        /// File name of the instance.
        name: String,
        /// The host close failure, including the native error code.
        source: std::io::Error,
    },

    /// A page's stored checksum does not match the recomputed one.
    #[error(
        "checksum mismatch on '{name}': page {page} computed {computed:#010x} \
         stored {stored:#010x} (physical length {physical_length})"
    )]
    BadChecksum {
        /// File name of the instance.
        name: String,
        /// Zero-based physical page index that failed verification.
        page: u64,
        /// Checksum recomputed from the page data region.
        computed: u32,
        /// Checksum found in the page's 4-byte tail.
        stored: u32,
        /// Physical length of the image at the time of the mismatch.
        physical_length: u64,
    },

    /// A mutation was requested on a read-only instance.
    #[error("'{name}' is read-only")]
    FileReadOnly {
        /// File name of the instance.
        name: String,
    },

    /// Caller-side precondition violation: a read past the logical end,
    /// an extend to a smaller length, or use after close.
    #[error("internal error: {detail}")]
    Internal {
        /// Description of the violated precondition.
        detail: String,
    },
}

impl VeristreamError {
    /// Construct an [`VeristreamError::Internal`] from any message.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, VeristreamError>;
