//! Continuous time series assembled from contiguous data records.
use std::f64::consts::PI;

use log::warn;

use seed_css_core::blockettes::Blockette;
use seed_css_core::decoders;
use seed_css_core::dictionary::Dictionary;
use seed_css_core::station::Channel;

use crate::data_record::DataRecord;

/// Resolve the counts-to-displacement conversion for one channel.
///
/// The preferred source is the stage-0 Blockette 58; the fallback is a
/// Blockette 60 whose stage-0 reference resolves to a dictionary
/// Blockette 48. When the channel's input-signal-unit description matches a
/// velocity or acceleration, the sensitivity is converted to displacement
/// with 2πf or (2πf)² at the sensitivity frequency. Returns
/// `(calib, calper)` where calib is `1e9 / (sensitivity × factor)` in
/// nanometres per count and calper is `1 / frequency` in seconds.
pub fn channel_calib(channel: &Channel, dictionary: &Dictionary) -> Option<(f64, f64)> {
    let b58_stage0 = channel.response.iter().find_map(|b| match b {
        Blockette::B58(x) if x.stage == 0 => Some(x),
        _ => None,
    });

    let mut displacement_factor = 1.0;
    if let Some(b58) = b58_stage0 {
        if let Some(b34) = dictionary.get_b34(channel.b52.signal_units) {
            let d = b34.description.to_uppercase();
            if d.contains("VEL") {
                displacement_factor = 2. * PI * b58.frequency;
            } else if d.contains("ACCEL") {
                displacement_factor = 4. * PI * PI * b58.frequency * b58.frequency;
            }
        }
    }

    for b in &channel.response {
        match b {
            Blockette::B58(x) if x.stage == 0 => {
                return Some((
                    1.0e9 / (x.sensitivity * displacement_factor),
                    1.0 / x.frequency,
                ));
            }
            Blockette::B60(x) => {
                let b48 = x
                    .response
                    .iter()
                    .filter(|r| r.stage == 0)
                    .flat_map(|r| r.code.iter())
                    .find_map(|&c| dictionary.get_b48(c));
                if let Some(b48) = b48 {
                    return Some((
                        1.0e9 / (b48.sensitivity * displacement_factor),
                        1.0 / b48.frequency,
                    ));
                }
            }
            _ => {}
        }
    }
    None
}

/// Data records that concatenate into one continuous time series.
///
/// All members share `(network, station, channel, location, rate, quality)`
/// and successive records are contiguous within the clock tolerance
/// `max(0.5/rate, nsamples * clock_drift)`.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    /// Counts-to-displacement conversion, nanometres per count. Zero when
    /// the volume carries no response for this channel.
    pub calib: f64,
    /// Calibration period, seconds.
    pub calper: f64,
    /// The channel the series belongs to, when the station headers carry it.
    pub channel: Option<Channel>,
    pub records: Vec<DataRecord>,
}

impl SeedData {
    pub fn new(dr: DataRecord) -> Self {
        SeedData {
            calib: 0.,
            calper: 0.,
            channel: None,
            records: vec![dr],
        }
    }

    pub fn nsamples(&self) -> usize {
        self.records.iter().map(|r| r.header.nsamples.max(0) as usize).sum()
    }

    pub fn samprate(&self) -> f64 {
        self.records.first().map(|r| r.samprate).unwrap_or(0.)
    }

    pub fn start_time(&self) -> f64 {
        self.records.first().map(|r| r.header.start_time()).unwrap_or(0.)
    }

    pub fn end_time(&self) -> f64 {
        let rate = self.samprate();
        if rate != 0. {
            self.start_time() + (self.nsamples() as f64 - 1.) / rate
        } else {
            0.
        }
    }

    /// Decode the member records against the source volume, concatenating
    /// into `data`. Returns the number of samples written. A record whose
    /// decoded count disagrees with its header produces a warning, not an
    /// error.
    pub fn read_data(&self, volume: &[u8], data: &mut [f32]) -> usize {
        let mut nsamp = 0usize;
        for r in &self.records {
            let want = r.header.nsamples.max(0) as usize;
            if nsamp + want > data.len() {
                break;
            }
            let end = (r.data_file_offset + r.data_length).min(volume.len());
            let bytes = &volume[r.data_file_offset.min(volume.len())..end];
            let n = decoders::decode(
                r.format,
                bytes,
                &r.order,
                want,
                &mut data[nsamp..nsamp + want],
            );
            if n != want {
                warn!(
                    "decoded nsamples != header nsamples, seqno: {} record: {}",
                    r.header.seqno, r
                );
            }
            nsamp += n.min(want);
        }
        nsamp
    }
}
