//! Encoding format codes used by data records.
//!
//! The format of the sample payload normally comes from Blockette 1000. For
//! volumes without one, the framer derives the code from the data format
//! dictionary (Blockette 30) keyed by the channel's format identifier.
use num::FromPrimitive;

use crate::errors::SeedError;

/// Sample payload encoding, field 13 of Blockette 1000.
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
pub enum DataFormat {
    Int16 = 1,
    Int24 = 2,
    Int32 = 3,
    Float32 = 4,
    Steim1 = 10,
    Steim2 = 11,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{:?}", self)
    }
}

impl DataFormat {
    /// NB: We give a result here to make life simpler for ourselves down the line.
    pub fn new(source: i32) -> Result<Self, SeedError> {
        DataFormat::from_i32(source)
            .ok_or_else(|| SeedError::fmt(format!("Cannot decompress format: {}", source)))
    }

    /// The byte length of one stored datum. Steim payloads are framed, so the
    /// length refers to the 32-bit slots inside a frame.
    pub fn datum_byte_length(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int24 => 3,
            Self::Int32 => 4,
            Self::Float32 => 4,
            Self::Steim1 => 4,
            Self::Steim2 => 4,
        }
    }

    /// Derive the format from a Blockette 30 short name, for volumes that
    /// carry no Blockette 1000.
    pub fn from_b30_name(name: &str) -> Option<Self> {
        let s = name.to_uppercase();
        if s.contains("16-BIT") {
            Some(Self::Int16)
        } else if s.contains("24-BIT") {
            Some(Self::Int24)
        } else if s.contains("32-BI") {
            Some(Self::Int32)
        } else if s.contains("SUN I") {
            Some(Self::Float32)
        } else if s.contains("STEIM1") || s.contains("STEIM-1") || s.contains("STEIM 1") {
            Some(Self::Steim1)
        } else if s.contains("STEIM2") || s.contains("STEIM-2") || s.contains("STEIM 2") {
            Some(Self::Steim2)
        } else if s.contains("STEIM INT") {
            Some(Self::Steim2)
        } else {
            None
        }
    }
}
