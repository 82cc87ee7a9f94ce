//! Sequential chunked file reading.
//!
//! A [`ChunkReader`] is the single producer for a job: it owns the file
//! handle and advances monotonically, yielding one numbered chunk per read.
//! Upload workers never touch the file themselves.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use crate::UploadError;
use crate::plan::Part;

/// A chunk of file data ready for transfer.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 1-based part number.
    pub index: u32,
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk bytes, `chunk_size` long except for the final chunk.
    pub data: Vec<u8>,
}

/// Reads a file in fixed-size chunks, in ascending offset order.
#[derive(Debug)]
pub struct ChunkReader {
    file: File,
    chunk_size: u64,
    offset: u64,
    file_size: u64,
    next_index: u32,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    pub async fn open(path: &Path, chunk_size: u64) -> Result<Self, UploadError> {
        if chunk_size == 0 {
            return Err(UploadError::InvalidChunkSize);
        }
        let file = File::open(path).await?;
        let file_size = file.metadata().await?.len();
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            file_size,
            next_index: 1,
        })
    }

    /// Reads the next chunk. Returns `None` at EOF.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, UploadError> {
        if self.offset >= self.file_size {
            return Ok(None);
        }

        let len = self.chunk_size.min(self.file_size - self.offset);
        let mut data = vec![0u8; len as usize];
        self.file.read_exact(&mut data).await?;

        let chunk = Chunk {
            index: self.next_index,
            offset: self.offset,
            data,
        };
        self.offset += len;
        self.next_index += 1;
        Ok(Some(chunk))
    }

    /// Reads exactly one planned part, seeking to its offset.
    ///
    /// Used when retrying a subset of parts; sequential reads through
    /// [`next_chunk`](Self::next_chunk) are unaffected afterwards only if
    /// the caller does not mix the two styles on one reader.
    pub async fn read_part(&mut self, part: Part) -> Result<Chunk, UploadError> {
        self.file.seek(SeekFrom::Start(part.offset)).await?;
        let mut data = vec![0u8; part.len as usize];
        self.file.read_exact(&mut data).await?;
        self.offset = part.offset + part.len;
        self.next_index = part.index + 1;
        Ok(Chunk {
            index: part.index,
            offset: part.offset,
            data,
        })
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Current byte offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_all_chunks_in_order() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"AABBCCDDEE");

        let mut reader = ChunkReader::open(&path, 4).await.unwrap();
        assert_eq!(reader.file_size(), 10);

        let c1 = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!((c1.index, c1.offset), (1, 0));
        assert_eq!(&c1.data, b"AABB");

        let c2 = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!((c2.index, c2.offset), (2, 4));
        assert_eq!(&c2.data, b"CCDD");

        let c3 = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!((c3.index, c3.offset), (3, 8));
        assert_eq!(&c3.data, b"EE");

        assert!(reader.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "empty.bin", b"");

        let mut reader = ChunkReader::open(&path, 4).await.unwrap();
        assert!(reader.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_part_seeks_to_offset() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"0123456789");

        let mut reader = ChunkReader::open(&path, 4).await.unwrap();
        let part = Part { index: 2, offset: 4, len: 4 };
        let chunk = reader.read_part(part).await.unwrap();
        assert_eq!(chunk.index, 2);
        assert_eq!(&chunk.data, b"4567");

        // Sequential reading continues after the part just read.
        let next = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!(next.index, 3);
        assert_eq!(&next.data, b"89");
    }

    #[tokio::test]
    async fn zero_chunk_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"x");
        let err = ChunkReader::open(&path, 0).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidChunkSize));
    }
}
