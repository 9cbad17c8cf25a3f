//! This submodule maps a SEED volume into memory so the framer can parse
//! over a byte slice and waveform payloads can be sliced lazily.
use seed_css_core::errors::SeedError;
use seed_css_core::{DATA_HEADER_LEN, LOGICAL_HEADER_LEN};

use memmap2::{Mmap, MmapOptions};

/// A memory map with the underlying SEED file handle.
pub struct MappedSeed {
    pub(crate) map: Mmap,
    _file: std::fs::File,
}

impl MappedSeed {
    /// Map a SEED volume. Fails when the file cannot hold even one logical
    /// record control header and a data header.
    pub fn new(file_name: &str) -> Result<MappedSeed, SeedError> {
        let (map, file) = map_file_to_memory(file_name)?;
        if map.len() <= LOGICAL_HEADER_LEN + DATA_HEADER_LEN {
            return Err(SeedError::FileTooShort);
        }
        Ok(MappedSeed { map, _file: file })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }
}

/// This function creates a memory map from a file.
pub(crate) fn map_file_to_memory(file_name: &str) -> Result<(Mmap, std::fs::File), SeedError> {
    let seed = std::fs::File::open(file_name).map_err(SeedError::MapFile)?;
    let map = unsafe { MmapOptions::new().map(&seed).map_err(SeedError::MapFile)? };
    Ok((map, seed))
}
