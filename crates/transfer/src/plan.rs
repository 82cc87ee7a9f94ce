//! Part planning: splitting a byte range into 1-based fixed-size parts.

use crate::UploadError;

/// One contiguous byte range of the file, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// 1-based part number, as used in the part PUT URL.
    pub index: u32,
    /// Byte offset within the file.
    pub offset: u64,
    /// Length in bytes. Equal to the chunk size except for the final part.
    pub len: u64,
}

/// Returns the number of parts for a file: `ceil(file_size / chunk_size)`.
///
/// A zero-byte file has zero parts.
pub fn total_parts(file_size: u64, chunk_size: u64) -> u32 {
    if chunk_size == 0 {
        return 0;
    }
    (file_size.div_ceil(chunk_size)) as u32
}

/// Splits `[0, file_size)` into parts of `chunk_size` bytes.
///
/// The result is a contiguous, non-overlapping, gap-free partition; the
/// final part carries the remainder when `file_size` is not a multiple of
/// `chunk_size`.
pub fn plan_parts(file_size: u64, chunk_size: u64) -> Result<Vec<Part>, UploadError> {
    if chunk_size == 0 {
        return Err(UploadError::InvalidChunkSize);
    }

    let count = total_parts(file_size, chunk_size);
    let mut parts = Vec::with_capacity(count as usize);
    let mut offset = 0u64;
    for index in 1..=count {
        let len = chunk_size.min(file_size - offset);
        parts.push(Part { index, offset, len });
        offset += len;
    }
    Ok(parts)
}
