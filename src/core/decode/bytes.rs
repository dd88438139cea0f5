//! Whole-file reads, memory-mapped for large files.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

/// Files at or above this size are memory-mapped instead of copied to the heap
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File contents, either owned or memory-mapped
pub enum FileBytes {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

/// Read an entire file, choosing mmap or a plain read by size
pub fn read_file_bytes(path: &Path) -> io::Result<FileBytes> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: read-only mapping; nothing in this process writes the file.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileBytes::Mmap(mmap))
    } else {
        Ok(FileBytes::Vec(std::fs::read(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn small_files_are_read_into_memory() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"tiny").unwrap();

        let bytes = read_file_bytes(file.path()).unwrap();
        assert!(matches!(bytes, FileBytes::Vec(_)));
        assert_eq!(&*bytes, b"tiny");
    }

    #[test]
    fn large_files_are_mapped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![7u8; MMAP_THRESHOLD as usize]).unwrap();
        file.flush().unwrap();

        let bytes = read_file_bytes(file.path()).unwrap();
        assert!(matches!(bytes, FileBytes::Mmap(_)));
        assert_eq!(bytes.len(), MMAP_THRESHOLD as usize);
        assert!(bytes.iter().all(|b| *b == 7));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(read_file_bytes(Path::new("/nonexistent/photo.jpg")).is_err());
    }
}
