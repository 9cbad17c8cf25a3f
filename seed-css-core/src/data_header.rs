//! The fixed 48-byte section of a data record header.
use crate::byte_order::WordOrder;
use crate::errors::SeedError;
use crate::seed_time::SeedTime;

/// Fixed Section of Data Header (48 bytes).
///
/// The parser takes the last 40 bytes, after the 6-byte sequence number, the
/// quality indicator and the reserved byte, which the framer consumes itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DataHeader {
    pub seqno: i32,
    /// Data header/quality indicator (D, R, Q or M).
    pub dhqual: u8,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub network: String,
    pub start_time: SeedTime,
    pub nsamples: i32,
    /// Sample rate factor. > 0: samples/second, < 0: seconds/sample.
    pub sample_rate: i16,
    /// Sample rate multiplier. > 0: multiplication, < 0: division.
    pub multiplier: i16,
    pub activity: u8,
    pub io: u8,
    pub quality: u8,
    /// Number of data blockettes that follow.
    pub num: i32,
    /// Time correction in units of 0.0001 seconds.
    pub correction: i32,
    /// Offset to the beginning of the sample payload.
    pub offset: i32,
    /// Offset to the first data blockette.
    pub boffset: i32,
}

impl Default for DataHeader {
    fn default() -> Self {
        DataHeader {
            seqno: 0,
            dhqual: b'D',
            station: String::new(),
            location: String::new(),
            channel: String::new(),
            network: String::new(),
            start_time: SeedTime::default(),
            nsamples: 0,
            sample_rate: 0,
            multiplier: 0,
            activity: 0,
            io: 0,
            quality: 0,
            num: 0,
            correction: 0,
            offset: 0,
            boffset: 0,
        }
    }
}

impl DataHeader {
    /// Parse the 40-byte body that follows the sequence number, quality
    /// indicator and reserved byte.
    pub fn parse(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 40 {
            return Err(SeedError::hdr("short data header".to_string()));
        }
        Ok(DataHeader {
            station: String::from_utf8_lossy(&bytes[0..5]).trim().to_string(),
            location: String::from_utf8_lossy(&bytes[5..7]).trim().to_string(),
            channel: String::from_utf8_lossy(&bytes[7..10]).trim().to_string(),
            network: String::from_utf8_lossy(&bytes[10..12]).trim().to_string(),
            start_time: SeedTime::parse_btime(&bytes[12..22], order)?,
            nsamples: order.u16_at(bytes, 22) as i32,
            sample_rate: order.i16_at(bytes, 24),
            multiplier: order.i16_at(bytes, 26),
            activity: bytes[28],
            io: bytes[29],
            quality: bytes[30],
            num: bytes[31] as i32,
            correction: order.i32_at(bytes, 32),
            offset: order.u16_at(bytes, 36) as i32,
            boffset: order.u16_at(bytes, 38) as i32,
            ..DataHeader::default()
        })
    }

    /// Resolved sample rate: the factor and multiplier each apply
    /// multiplicatively when positive and divisively when negative, so a
    /// factor of -100 with multiplier 1 means 0.01 Hz.
    pub fn sample_rate(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.;
        }
        let mut samprate = if self.sample_rate > 0 {
            self.sample_rate as f64
        } else {
            -1. / self.sample_rate as f64
        };
        if self.multiplier > 0 {
            samprate *= self.multiplier as f64;
        } else if self.multiplier < 0 {
            samprate /= -(self.multiplier as f64);
        }
        samprate
    }

    /// Record start epoch. The 0.0001-second correction is applied only when
    /// the activity flag does not already mark it as applied (bit 0x02).
    pub fn start_time(&self) -> f64 {
        if self.activity & 0x02 == 0 {
            self.start_time.epoch() + self.correction as f64 / 10000.
        } else {
            self.start_time.epoch()
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time() + (self.nsamples - 1) as f64 / self.sample_rate()
    }
}
