//! Page sealing: CRC-32C with the container's byte-reversal quirk.
//!
//! The checksum over a page's data region is CRC-32C (Castagnoli
//! polynomial `0x1EDC6F41`, initial value and final XOR `0xFFFFFFFF`,
//! input and output reflected) followed by a 32-bit byte reversal.
//! The reversed value is stored as four little-endian bytes in the
//! page tail — equivalently, the raw CRC in big-endian byte order.
//! The reversal is a format quirk and must be preserved exactly.
//!
//! The `crc32c` crate owns the lookup table / hardware path; nothing
//! here recomputes tables per call.

use crate::geometry::{LOGICAL_PAGE_SIZE, PHYSICAL_PAGE_SIZE};

/// Checksum of a page data region, ready for tail storage.
#[must_use]
pub fn page_checksum(data: &[u8]) -> u32 {
    crc32c::crc32c(data).swap_bytes()
}

/// Compute and store the checksum of `page[..1020]` into the tail.
pub fn seal_page(page: &mut [u8; PHYSICAL_PAGE_SIZE]) {
    let crc = page_checksum(&page[..LOGICAL_PAGE_SIZE]);
    page[LOGICAL_PAGE_SIZE..].copy_from_slice(&crc.to_le_bytes());
}

/// Checksum currently stored in a page's tail.
#[must_use]
pub fn stored_checksum(page: &[u8; PHYSICAL_PAGE_SIZE]) -> u32 {
    let mut tail = [0_u8; 4];
    tail.copy_from_slice(&page[LOGICAL_PAGE_SIZE..]);
    u32::from_le_bytes(tail)
}
