//! Storage backends for the checked paged file layer.
//!
//! A [`Backend`] is the raw, cursor-based byte store underneath a
//! checked file: either a real OS file ([`FileBackend`]) or a
//! caller-owned, read-only memory buffer ([`MemoryBackend`]). The
//! paged layer above is the only intended consumer; backends know
//! nothing about pages or checksums.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use traits::{Backend, Whence};
