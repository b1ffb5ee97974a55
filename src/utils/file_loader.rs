use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::error::WordlistError;

pub enum FileContent {
    Heap(Vec<u8>),
    Mmap(Mmap),
}

impl std::ops::Deref for FileContent {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            FileContent::Heap(v) => v,
            FileContent::Mmap(m) => m,
        }
    }
}

pub struct FileLoader;

impl FileLoader {
    const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

    /// Load a traffic log, mapping large exports instead of copying them.
    pub fn load(path: &Path) -> Result<FileContent, WordlistError> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Err(WordlistError::EmptyLog);
        }

        if size > Self::MMAP_THRESHOLD {
            debug!("Mapping {} ({} bytes)", path.display(), size);
            // Unsafe: We accept the risk of SIGBUS if the file is truncated while mapped.
            let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
            Ok(FileContent::Mmap(mmap))
        } else {
            let mut buffer = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buffer)?;
            Ok(FileContent::Heap(buffer))
        }
    }
}
