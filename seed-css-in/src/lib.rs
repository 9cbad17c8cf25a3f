//! This is a library for reading SEED volumes into rust. It frames the
//! logical records of a memory-mapped volume, parses control blockettes and
//! data records, and groups contiguous data records into continuous time
//! series without holding decompressed samples in memory.
//!
//! The library follows the SEED manual for versions up to 2.3. Reading is
//! strictly single-threaded and sequential with one object of look-ahead;
//! sample payloads stay compressed in the map until a caller decodes them
//! through [`SeedData::read_data`].
extern crate log;
extern crate memmap2;
extern crate seed_css_core;

pub mod data_record;
pub mod input;
pub mod memory_map;
pub mod seed_data;
#[cfg(test)]
mod tests;

use memory_map::MappedSeed;

pub use data_record::DataRecord;
pub use input::{SeedInput, SeedObject};
pub use seed_data::{channel_calib, SeedData};

pub use seed_css_core::errors::*;
pub use seed_css_core::settings::{ExceptionMask, ReadMode, ReadSettings};
pub use seed_css_core::{Channel, Dictionary, Station};

/// A memory-mapped SEED volume and the settings used to read it.
///
/// The file stays mapped for the lifetime of this value, so waveform
/// payloads located during parsing can be decoded afterwards without
/// re-reading the volume.
pub struct SeedFile {
    data: MappedSeed,
    settings: ReadSettings,
}

impl SeedFile {
    /// Map a SEED volume from a given location with a given set of settings.
    pub fn open(file_name: &str, settings: ReadSettings) -> Result<Self, SeedError> {
        let data = MappedSeed::new(file_name)?;
        Ok(SeedFile { data, settings })
    }

    /// A framer positioned at the start of the volume.
    pub fn input(&self) -> SeedInput<'_> {
        SeedInput::new(self.data.bytes(), self.settings.clone())
    }

    /// The raw volume bytes; [`SeedData::read_data`] decodes against these.
    pub fn bytes(&self) -> &[u8] {
        self.data.bytes()
    }

    pub fn get_settings(&self) -> &ReadSettings {
        &self.settings
    }
}
