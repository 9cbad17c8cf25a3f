//! Typed representations of the SEED data-record blockettes.
//!
//! Data blockettes are binary: a 2-byte type and a 2-byte `next` offset
//! (handled by the record walker) followed by a fixed-length body in the
//! record's declared byte order. Most carry side information; Blockette 1000
//! declares the payload encoding, byte order and record length, and
//! Blockette 100 overrides the sample rate.
use crate::byte_order::WordOrder;
use crate::errors::SeedError;
use crate::seed_time::SeedTime;

fn ascii_trim(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Sample Rate Blockette (12 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette100 {
    /// Actual sample rate, overriding the data header fields.
    pub sample_rate: f32,
    pub flags: u8,
}

impl Blockette100 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 8 {
            return Err(SeedError::len("100", "short Sample Rate Blockette"));
        }
        Ok(Blockette100 {
            sample_rate: order.f32_at(bytes, 0),
            flags: bytes[4],
        })
    }
}

/// Generic Event Detection Blockette (52 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette200 {
    pub amplitude: f32,
    pub period: f32,
    pub background: f32,
    pub flags: u8,
    pub time: SeedTime,
    pub name: String,
}

impl Blockette200 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 48 {
            return Err(SeedError::len("200", "short Event Detection Blockette"));
        }
        Ok(Blockette200 {
            amplitude: order.f32_at(bytes, 0),
            period: order.f32_at(bytes, 4),
            background: order.f32_at(bytes, 8),
            flags: bytes[12],
            time: SeedTime::parse_btime(&bytes[14..], order)?,
            name: ascii_trim(&bytes[24..48]),
        })
    }
}

/// Murdock Event Detection Blockette (60 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette201 {
    pub amplitude: f32,
    pub period: f32,
    pub background: f32,
    pub flags: u8,
    pub time: SeedTime,
    /// Signal-to-noise ratio values.
    pub snr: [u8; 6],
    pub look_back: u8,
    pub algorithm: u8,
    pub name: String,
}

impl Blockette201 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 56 {
            return Err(SeedError::len("201", "short Murdock Detection Blockette"));
        }
        let mut snr = [0u8; 6];
        snr.copy_from_slice(&bytes[24..30]);
        Ok(Blockette201 {
            amplitude: order.f32_at(bytes, 0),
            period: order.f32_at(bytes, 4),
            background: order.f32_at(bytes, 8),
            flags: bytes[12],
            time: SeedTime::parse_btime(&bytes[14..], order)?,
            snr,
            look_back: bytes[30],
            algorithm: bytes[31],
            name: ascii_trim(&bytes[32..56]),
        })
    }
}

/// Step Calibration Blockette (60 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette300 {
    pub time: SeedTime,
    pub num_steps: i32,
    pub flags: u8,
    /// Step duration in 0.0001-second ticks.
    pub step: u32,
    pub interval: u32,
    pub amplitude: f32,
    pub channel: String,
    pub ref_amp: u32,
    pub coupling: String,
    pub rolloff: String,
}

impl Blockette300 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 56 {
            return Err(SeedError::len("300", "short Step Calibration Blockette"));
        }
        Ok(Blockette300 {
            time: SeedTime::parse_btime(bytes, order)?,
            num_steps: bytes[10] as i32,
            flags: bytes[11],
            step: order.u32_at(bytes, 12),
            interval: order.u32_at(bytes, 16),
            amplitude: order.f32_at(bytes, 20),
            channel: ascii_trim(&bytes[24..27]),
            ref_amp: order.u32_at(bytes, 28),
            coupling: ascii_trim(&bytes[32..44]),
            rolloff: ascii_trim(&bytes[44..56]),
        })
    }
}

/// Sine Calibration Blockette (60 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette310 {
    pub time: SeedTime,
    pub flags: u8,
    pub duration: u32,
    pub period: f32,
    pub amplitude: f32,
    pub channel: String,
    pub ref_amp: u32,
    pub coupling: String,
    pub rolloff: String,
}

impl Blockette310 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 56 {
            return Err(SeedError::len("310", "short Sine Calibration Blockette"));
        }
        Ok(Blockette310 {
            time: SeedTime::parse_btime(bytes, order)?,
            flags: bytes[11],
            duration: order.u32_at(bytes, 12),
            period: order.f32_at(bytes, 16),
            amplitude: order.f32_at(bytes, 20),
            channel: ascii_trim(&bytes[24..27]),
            ref_amp: order.u32_at(bytes, 28),
            coupling: ascii_trim(&bytes[32..44]),
            rolloff: ascii_trim(&bytes[44..56]),
        })
    }
}

/// Pseudo-random Calibration Blockette (64 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette320 {
    pub time: SeedTime,
    pub flags: u8,
    pub duration: u32,
    /// Peak-to-peak amplitude of the steps.
    pub amplitude: f32,
    pub channel: String,
    pub ref_amp: u32,
    pub coupling: String,
    pub rolloff: String,
    pub noise: String,
}

impl Blockette320 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 60 {
            return Err(SeedError::len(
                "320",
                "short Pseudo-random Calibration Blockette",
            ));
        }
        Ok(Blockette320 {
            time: SeedTime::parse_btime(bytes, order)?,
            flags: bytes[11],
            duration: order.u32_at(bytes, 12),
            amplitude: order.f32_at(bytes, 16),
            channel: ascii_trim(&bytes[20..23]),
            ref_amp: order.u32_at(bytes, 24),
            coupling: ascii_trim(&bytes[28..40]),
            rolloff: ascii_trim(&bytes[40..52]),
            noise: ascii_trim(&bytes[52..60]),
        })
    }
}

/// Generic Calibration Blockette (28 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette390 {
    pub time: SeedTime,
    pub flags: u8,
    pub duration: u32,
    pub amplitude: f32,
    pub channel: String,
}

impl Blockette390 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 24 {
            return Err(SeedError::len("390", "short Generic Calibration Blockette"));
        }
        Ok(Blockette390 {
            time: SeedTime::parse_btime(bytes, order)?,
            flags: bytes[11],
            duration: order.u32_at(bytes, 12),
            amplitude: order.f32_at(bytes, 16),
            channel: ascii_trim(&bytes[20..23]),
        })
    }
}

/// Calibration Abort Blockette (16 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette395 {
    pub end_time: SeedTime,
}

impl Blockette395 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 12 {
            return Err(SeedError::len("395", "short Calibration Abort Blockette"));
        }
        Ok(Blockette395 {
            end_time: SeedTime::parse_btime(bytes, order)?,
        })
    }
}

/// Beam Blockette (16 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette400 {
    pub azimuth: f32,
    /// Beam slowness (sec/degree).
    pub slowness: f32,
    /// Beam configuration, a Blockette 35 lookup.
    pub config: i32,
}

impl Blockette400 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 12 {
            return Err(SeedError::len("400", "short Beam Blockette"));
        }
        Ok(Blockette400 {
            azimuth: order.f32_at(bytes, 0),
            slowness: order.f32_at(bytes, 4),
            config: order.u16_at(bytes, 8) as i32,
        })
    }
}

/// Beam Delay Blockette (6 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette405 {
    /// Delay in 0.0001-second ticks.
    pub delay: i32,
}

impl Blockette405 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 2 {
            return Err(SeedError::len("405", "short Beam Delay Blockette"));
        }
        Ok(Blockette405 {
            delay: order.u16_at(bytes, 0) as i32,
        })
    }
}

/// Timing Blockette (200 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette500 {
    /// VCO correction.
    pub correction: f32,
    pub time: SeedTime,
    pub micro_sec: i32,
    pub quality: i32,
    pub count: u32,
    pub exception_type: String,
    pub model: String,
    pub status: String,
}

impl Blockette500 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 196 {
            return Err(SeedError::len("500", "short Timing Blockette"));
        }
        Ok(Blockette500 {
            correction: order.f32_at(bytes, 0),
            time: SeedTime::parse_btime(&bytes[4..14], order)?,
            micro_sec: bytes[14] as i8 as i32,
            quality: bytes[15] as i32,
            count: order.u32_at(bytes, 16),
            exception_type: ascii_trim(&bytes[20..36]),
            model: ascii_trim(&bytes[36..68]),
            status: ascii_trim(&bytes[68..196]),
        })
    }
}

/// Data Only SEED Blockette (8 bytes).
///
/// Declares the payload encoding format, the byte order and the data record
/// length as a power of 2. When present it overrides the defaults assumed
/// from the station table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette1000 {
    pub format: u8,
    /// 0 little-endian, 1 big-endian.
    pub word_order: u8,
    /// Data record length as a power of 2.
    pub lreclen: i32,
}

impl Blockette1000 {
    pub fn parse(bytes: &[u8], _order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 4 {
            return Err(SeedError::len("1000", "short Data Only SEED Blockette"));
        }
        Ok(Blockette1000 {
            format: bytes[0],
            word_order: bytes[1],
            lreclen: bytes[2] as i32,
        })
    }

    pub fn record_length(&self) -> usize {
        1usize << self.lreclen
    }
}

/// Data Extension Blockette (8 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette1001 {
    /// Timing quality, percent.
    pub timing: i32,
    pub micro_sec: i32,
    /// Frame count.
    pub count: i32,
}

impl Blockette1001 {
    pub fn parse(bytes: &[u8], _order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 4 {
            return Err(SeedError::len("1001", "short Data Extension Blockette"));
        }
        Ok(Blockette1001 {
            timing: bytes[0] as i32,
            micro_sec: bytes[1] as i8 as i32,
            count: bytes[2] as i32,
        })
    }
}

/// Variable Length Opaque Data Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette2000 {
    /// Total blockette length in bytes, including the 4-byte type/next header.
    pub length: i32,
    /// Offset to the opaque data, from the blockette start.
    pub offset: i32,
    pub record: u32,
    pub big_endian: u8,
    pub flags: u8,
    pub num_fields: i32,
    /// Opaque header fields; empty when `num_fields` is zero.
    pub fields: String,
    pub data: Vec<u8>,
}

impl Blockette2000 {
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 2 {
            return Err(SeedError::len("2000", "short Opaque Data Blockette"));
        }
        let length = order.u16_at(bytes, 0) as i32;
        if (bytes.len() as i32) < length - 4 || bytes.len() < 11 {
            return Err(SeedError::len("2000", "short Opaque Data Blockette"));
        }
        let offset = order.u16_at(bytes, 2) as i32;
        if offset > length {
            return Err(SeedError::len("2000", "data offset > blockette length"));
        }
        let num_fields = bytes[10] as i32;
        // Zero header fields means no field metadata at all.
        let fields = if num_fields > 0 {
            String::from_utf8_lossy(&bytes[11..(11 + num_fields as usize).min(bytes.len())])
                .to_string()
        } else {
            String::new()
        };
        let data_length = (length - offset).max(0) as usize;
        let data_start = (offset - 4).max(0) as usize;
        let data = if data_length > 0 && data_start + data_length <= bytes.len() {
            bytes[data_start..data_start + data_length].to_vec()
        } else {
            Vec::new()
        };
        Ok(Blockette2000 {
            length,
            offset,
            record: order.u32_at(bytes, 4),
            big_endian: bytes[8],
            flags: bytes[9],
            num_fields,
            fields,
            data,
        })
    }
}

/// The tagged union of every data blockette kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBlockette {
    B100(Blockette100),
    B200(Blockette200),
    B201(Blockette201),
    B300(Blockette300),
    B310(Blockette310),
    B320(Blockette320),
    B390(Blockette390),
    B395(Blockette395),
    B400(Blockette400),
    B405(Blockette405),
    B500(Blockette500),
    B1000(Blockette1000),
    B1001(Blockette1001),
    B2000(Blockette2000),
}

impl DataBlockette {
    /// Fixed length in bytes including the 4-byte type/next header, used to
    /// skip forward when chaining. `None` for unknown types; Blockette 2000
    /// declares its own length in its body.
    pub fn fixed_len(btype: u16) -> Option<usize> {
        match btype {
            100 => Some(12),
            200 => Some(52),
            201 => Some(60),
            300 => Some(60),
            310 => Some(60),
            320 => Some(64),
            390 => Some(28),
            395 => Some(16),
            400 => Some(16),
            405 => Some(6),
            500 => Some(200),
            1000 => Some(8),
            1001 => Some(8),
            2000 => Some(0),
            _ => None,
        }
    }

    /// Parse the body (4-byte header stripped) of a data blockette. Returns
    /// `None` for types the model does not cover.
    pub fn parse(
        btype: u16,
        bytes: &[u8],
        order: &WordOrder,
    ) -> Option<Result<DataBlockette, SeedError>> {
        use self::DataBlockette::*;
        let b = match btype {
            100 => Blockette100::parse(bytes, order).map(B100),
            200 => Blockette200::parse(bytes, order).map(B200),
            201 => Blockette201::parse(bytes, order).map(B201),
            300 => Blockette300::parse(bytes, order).map(B300),
            310 => Blockette310::parse(bytes, order).map(B310),
            320 => Blockette320::parse(bytes, order).map(B320),
            390 => Blockette390::parse(bytes, order).map(B390),
            395 => Blockette395::parse(bytes, order).map(B395),
            400 => Blockette400::parse(bytes, order).map(B400),
            405 => Blockette405::parse(bytes, order).map(B405),
            500 => Blockette500::parse(bytes, order).map(B500),
            1000 => Blockette1000::parse(bytes, order).map(B1000),
            1001 => Blockette1001::parse(bytes, order).map(B1001),
            2000 => Blockette2000::parse(bytes, order).map(B2000),
            _ => return None,
        };
        Some(b)
    }

    pub fn kind(&self) -> u16 {
        use self::DataBlockette::*;
        match self {
            B100(_) => 100,
            B200(_) => 200,
            B201(_) => 201,
            B300(_) => 300,
            B310(_) => 310,
            B320(_) => 320,
            B390(_) => 390,
            B395(_) => 395,
            B400(_) => 400,
            B405(_) => 405,
            B500(_) => 500,
            B1000(_) => 1000,
            B1001(_) => 1001,
            B2000(_) => 2000,
        }
    }

    pub fn as_b1000(&self) -> Option<&Blockette1000> {
        match self {
            DataBlockette::B1000(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_b100(&self) -> Option<&Blockette100> {
        match self {
            DataBlockette::B100(b) => Some(b),
            _ => None,
        }
    }
}
