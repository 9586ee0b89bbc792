//! Checksum-protected paged file core.
//!
//! Presents upper layers with a contiguous stream of *logical* bytes
//! while the underlying image is a sequence of fixed-size physical
//! pages, each sealed with a CRC-32C over its data region. Page
//! boundaries, checksum bytes, and the logical/physical address split
//! are invisible above [`CheckedFile`].
//!
//! Layout of the image (no header, no trailer):
//!
//! ```text
//! page 0: [0, 1020) payload | [1020, 1024) CRC-32C (byte-reversed, LE)
//! page 1: [0, 1020) payload | [1020, 1024) CRC-32C
//! ...
//! ```

pub mod checked_file;
pub mod checksum;
pub mod geometry;
pub mod text;

pub use checked_file::{CheckedFile, ChecksumPolicy, OffsetMode, OpenMode};
