//! Typed representations of the SEED control blockettes.
//!
//! Control blockettes travel as ASCII: a 3-digit type, a 4-digit length and a
//! body of fixed-width fields interleaved with tilde-terminated variable
//! fields. Every kind gets a struct with the field set of the SEED manual
//! (volume 5/8/10-12, dictionary 30-35/41-48, station 50-62, time span
//! 70-74), and [`Blockette`] is the tagged union the framer dispatches on.
//!
//! Parsers take the blockette body with the type/length framing already
//! stripped. Numeric conversion is strict: trailing garbage fails with an
//! error carrying the blockette type and field name.
use crate::errors::SeedError;
use crate::seed_time::SeedTime;

/// Strict integer conversion. An all-blank field is allowed and reads as -1
/// (some fields, e.g. 052.subchannel, may be blank).
pub fn parse_int(s: &str, blockette: &str, field: &str) -> Result<i32, SeedError> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(-1);
    }
    t.parse::<i32>()
        .map_err(|_| SeedError::format(blockette, field, s))
}

/// Strict floating point conversion. Blank fields are an error.
pub fn parse_float(s: &str, blockette: &str, field: &str) -> Result<f64, SeedError> {
    let t = s.trim();
    t.parse::<f64>()
        .map_err(|_| SeedError::format(blockette, field, s))
}

/// A cursor over a blockette body.
///
/// Fixed-width reads fail with a `Len` error when the body is exhausted;
/// variable reads stop at the first '~' and advance past it.
pub struct Fields<'a> {
    body: &'a str,
    pos: usize,
    btype: &'a str,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a str, btype: &'a str) -> Self {
        Fields { body, pos: 0, btype }
    }

    pub fn remaining(&self) -> usize {
        self.body.len().saturating_sub(self.pos)
    }

    pub fn fixed(&mut self, n: usize) -> Result<&'a str, SeedError> {
        // get() also rejects slicing into a non-ASCII replacement character
        let s = self
            .body
            .get(self.pos..self.pos + n)
            .ok_or_else(|| SeedError::len(self.btype, "short blockette"))?;
        self.pos += n;
        Ok(s)
    }

    pub fn trimmed(&mut self, n: usize) -> Result<String, SeedError> {
        Ok(self.fixed(n)?.trim().to_string())
    }

    pub fn int(&mut self, n: usize, field: &str) -> Result<i32, SeedError> {
        let s = self.fixed(n)?;
        parse_int(s, self.btype, field)
    }

    pub fn float(&mut self, n: usize, field: &str) -> Result<f64, SeedError> {
        let s = self.fixed(n)?;
        parse_float(s, self.btype, field)
    }

    /// A tilde-terminated variable field. Without a terminator the rest of
    /// the body is taken.
    pub fn var(&mut self) -> Result<&'a str, SeedError> {
        let rest = self
            .body
            .get(self.pos..)
            .ok_or_else(|| SeedError::len(self.btype, "short blockette"))?;
        match rest.find('~') {
            Some(i) => {
                self.pos += i + 1;
                Ok(&rest[..i])
            }
            None => {
                self.pos = self.body.len() + 1;
                Ok(rest)
            }
        }
    }

    pub fn time(&mut self, field: &str) -> Result<SeedTime, SeedError> {
        let v = self.var()?;
        SeedTime::parse(v, field)
    }
}

/// Field Volume Identifier Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette5 {
    /// SEED version number ##.#.
    pub version_of_format: String,
    /// Logical record length, expressed as a power of 2.
    pub logical_record_length: i32,
    /// Beginning of volume data.
    pub beginning_time: SeedTime,
}

impl Blockette5 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "005");
        Ok(Blockette5 {
            version_of_format: f.trimmed(4)?,
            logical_record_length: f.int(2, "logical_record_length")?,
            beginning_time: f.time("005.beginning_time")?,
        })
    }
}

/// Telemetry Volume Identifier Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette8 {
    pub version_of_format: String,
    /// Logical record length, expressed as a power of 2.
    pub logical_record_length: i32,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub beginning_time: SeedTime,
    pub end_time: SeedTime,
    /// Station information effective date.
    pub station_date: SeedTime,
    /// Channel information effective date.
    pub channel_date: SeedTime,
    pub network: String,
}

impl Blockette8 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "008");
        Ok(Blockette8 {
            version_of_format: f.trimmed(4)?,
            logical_record_length: f.int(2, "logical_record_length")?,
            station: f.trimmed(5)?,
            location: f.trimmed(2)?,
            channel: f.trimmed(3)?,
            beginning_time: f.time("008.beginning_time")?,
            end_time: f.time("008.end_time")?,
            station_date: f.time("008.station_date")?,
            channel_date: f.time("008.channel_date")?,
            network: f.trimmed(2)?,
        })
    }
}

/// Volume Identifier Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette10 {
    pub version_of_format: String,
    /// Logical record length, expressed as a power of 2.
    pub logical_record_length: i32,
    pub beginning_time: SeedTime,
    pub end_time: SeedTime,
    /// Creation date of the volume.
    pub volume_time: SeedTime,
    pub organization: String,
    pub label: String,
}

impl Blockette10 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "010");
        Ok(Blockette10 {
            version_of_format: f.trimmed(4)?,
            logical_record_length: f.int(2, "logical_record_length")?,
            beginning_time: f.time("010.beginning_time")?,
            end_time: f.time("010.end_time")?,
            volume_time: f.time("010.volume_time")?,
            organization: f.var()?.trim().to_string(),
            label: f.var()?.trim().to_string(),
        })
    }
}

/// Volume Station Header Index Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette11 {
    pub station: Vec<String>,
    /// Sequence number of each station header.
    pub seqno: Vec<i32>,
}

impl Blockette11 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "011");
        let num = f.int(3, "num_stations")?;
        let mut b = Blockette11::default();
        for _ in 0..num {
            b.station.push(f.trimmed(5)?);
            b.seqno.push(f.int(6, "seqno")?);
        }
        Ok(b)
    }
}

/// Volume Time Span Index Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette12 {
    pub beg: Vec<SeedTime>,
    pub end: Vec<SeedTime>,
    pub seqno: Vec<i32>,
}

impl Blockette12 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "012");
        let num = f.int(4, "num_spans")?;
        let mut b = Blockette12::default();
        for _ in 0..num {
            b.beg.push(f.time("012.beginning_span")?);
            b.end.push(f.time("012.end_span")?);
            b.seqno.push(f.int(6, "seqno")?);
        }
        Ok(b)
    }
}

/// Data Format Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette30 {
    pub lookup_code: i32,
    /// Short descriptive name, e.g. "Steim2 Integer Compression Format".
    pub name: String,
    pub family_type: i32,
    pub keys: Vec<String>,
}

impl Blockette30 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "030");
        let name = f.var()?.to_string();
        let lookup_code = f.int(4, "code")?;
        let family_type = f.int(3, "family_type")?;
        let num_keys = f.int(2, "num_keys")?;
        let mut keys = Vec::new();
        for _ in 0..num_keys {
            keys.push(f.var()?.to_string());
        }
        Ok(Blockette30 {
            lookup_code,
            name,
            family_type,
            keys,
        })
    }
}

/// Comment Description Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette31 {
    pub lookup_code: i32,
    pub class_code: String,
    pub comment: String,
    /// Units of the comment level.
    pub units: i32,
}

impl Blockette31 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "031");
        Ok(Blockette31 {
            lookup_code: f.int(4, "comment_code")?,
            class_code: f.fixed(1)?.to_string(),
            comment: f.var()?.to_string(),
            units: f.int(3, "units")?,
        })
    }
}

/// Cited Source Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette32 {
    pub lookup_code: i32,
    pub author: String,
    pub catalog: String,
    pub publisher: String,
}

impl Blockette32 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "032");
        Ok(Blockette32 {
            lookup_code: f.int(2, "lookup_code")?,
            author: f.var()?.to_string(),
            catalog: f.var()?.to_string(),
            publisher: f.var()?.to_string(),
        })
    }
}

/// Generic Abbreviation Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette33 {
    pub lookup_code: i32,
    pub description: String,
}

impl Blockette33 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "033");
        Ok(Blockette33 {
            lookup_code: f.int(3, "lookup_code")?,
            description: f.var()?.to_string(),
        })
    }
}

/// Units Abbreviations Blockette.
///
/// The unit name ("M/S", "COUNTS", ...) and description drive the
/// velocity/acceleration to displacement conversion downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette34 {
    pub lookup_code: i32,
    pub name: String,
    pub description: String,
}

impl Blockette34 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "034");
        Ok(Blockette34 {
            lookup_code: f.int(3, "lookup_code")?,
            name: f.var()?.to_string(),
            description: f.var()?.to_string(),
        })
    }

    pub fn to_seed_string(&self) -> String {
        format!("{:3}{}~{}~", self.lookup_code, self.name, self.description)
    }
}

/// Beam Configuration Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette35 {
    pub lookup_code: i32,
    pub station: Vec<String>,
    pub location: Vec<String>,
    pub channel: Vec<String>,
    pub subchannel: Vec<i32>,
    pub weight: Vec<f64>,
}

impl Blockette35 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "035");
        let lookup_code = f.int(3, "lookup_code")?;
        let num = f.int(4, "num_components")?;
        let mut b = Blockette35 {
            lookup_code,
            ..Blockette35::default()
        };
        for _ in 0..num {
            b.station.push(f.trimmed(5)?);
            b.location.push(f.trimmed(2)?);
            b.channel.push(f.trimmed(3)?);
            b.subchannel.push(f.int(4, "subchannel")?);
            b.weight.push(f.float(5, "weight")?);
        }
        Ok(b)
    }
}

/// FIR Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette41 {
    pub lookup_code: i32,
    pub name: String,
    /// "A" as declared, "B" odd symmetric, "C" even symmetric.
    pub symmetry_code: String,
    pub input_units: i32,
    pub output_units: i32,
    pub coef: Vec<f64>,
}

impl Blockette41 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "041");
        let lookup_code = f.int(4, "lookup_code")?;
        let name = f.var()?.to_string();
        let symmetry_code = f.fixed(1)?.to_string();
        let input_units = f.int(3, "input_units")?;
        let output_units = f.int(3, "output_units")?;
        let num = f.int(4, "num_factors")?;
        let mut coef = Vec::with_capacity(num.max(0) as usize);
        for _ in 0..num {
            coef.push(f.float(14, "coefficient")?);
        }
        Ok(Blockette41 {
            lookup_code,
            name,
            symmetry_code,
            input_units,
            output_units,
            coef,
        })
    }
}

/// Response (Polynomial) Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette42 {
    pub lookup_code: i32,
    pub name: String,
    pub transfer_type: String,
    pub input_units: i32,
    pub output_units: i32,
    pub poly_type: String,
    pub freq_units: String,
    pub min_freq: f64,
    pub max_freq: f64,
    pub min_approx: f64,
    pub max_approx: f64,
    pub max_error: f64,
    pub coef: Vec<f64>,
    pub error: Vec<f64>,
}

impl Blockette42 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "042");
        let mut b = Blockette42 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            transfer_type: f.fixed(1)?.to_string(),
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            poly_type: f.fixed(1)?.to_string(),
            freq_units: f.fixed(1)?.to_string(),
            min_freq: f.float(12, "min_freq")?,
            max_freq: f.float(12, "max_freq")?,
            min_approx: f.float(12, "min_approx")?,
            max_approx: f.float(12, "max_approx")?,
            max_error: f.float(12, "max_error")?,
            ..Blockette42::default()
        };
        let num = f.int(3, "num_factors")?;
        for _ in 0..num {
            b.coef.push(f.float(12, "coefficient")?);
            b.error.push(f.float(12, "error")?);
        }
        Ok(b)
    }
}

/// Response (Poles & Zeros) Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette43 {
    pub lookup_code: i32,
    pub name: String,
    /// Transfer function type: "A" rad/s, "B" Hz, "D" digital.
    pub response_type: String,
    pub input_units: i32,
    pub output_units: i32,
    /// A0 normalization factor (1.0 if none).
    pub a0_norm: f64,
    pub norm_freq: f64,
    pub zr: Vec<f64>,
    pub zi: Vec<f64>,
    pub zr_error: Vec<f64>,
    pub zi_error: Vec<f64>,
    pub pr: Vec<f64>,
    pub pi: Vec<f64>,
    pub pr_error: Vec<f64>,
    pub pi_error: Vec<f64>,
}

impl Blockette43 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "043");
        let mut b = Blockette43 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            response_type: f.fixed(1)?.to_string(),
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            a0_norm: f.float(12, "a0_norm")?,
            norm_freq: f.float(12, "norm_freq")?,
            ..Blockette43::default()
        };
        let num_zeros = f.int(3, "num_zeros")?;
        for _ in 0..num_zeros {
            b.zr.push(f.float(12, "real zero")?);
            b.zi.push(f.float(12, "imag zero")?);
            b.zr_error.push(f.float(12, "real zero-error")?);
            b.zi_error.push(f.float(12, "imag zero-error")?);
        }
        let num_poles = f.int(3, "num_poles")?;
        for _ in 0..num_poles {
            b.pr.push(f.float(12, "real pole")?);
            b.pi.push(f.float(12, "imag pole")?);
            b.pr_error.push(f.float(12, "real pole-error")?);
            b.pi_error.push(f.float(12, "imag pole-error")?);
        }
        Ok(b)
    }
}

/// Response (Coefficients) Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette44 {
    pub lookup_code: i32,
    pub name: String,
    pub response_type: String,
    pub input_units: i32,
    pub output_units: i32,
    pub numerator: Vec<f64>,
    pub nerror: Vec<f64>,
    pub denominator: Vec<f64>,
    pub derror: Vec<f64>,
}

impl Blockette44 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "044");
        let mut b = Blockette44 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            response_type: f.fixed(1)?.to_string(),
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette44::default()
        };
        let num_n = f.int(4, "num_numerators")?;
        for _ in 0..num_n {
            b.numerator.push(f.float(12, "numerator")?);
            b.nerror.push(f.float(12, "numerator-error")?);
        }
        let num_d = f.int(4, "num_denominators")?;
        for _ in 0..num_d {
            b.denominator.push(f.float(12, "denominator")?);
            b.derror.push(f.float(12, "denominator-error")?);
        }
        Ok(b)
    }
}

/// Response List Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette45 {
    pub lookup_code: i32,
    pub name: String,
    pub input_units: i32,
    pub output_units: i32,
    pub frequency: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub amp_error: Vec<f64>,
    pub phase: Vec<f64>,
    pub phase_error: Vec<f64>,
}

impl Blockette45 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "045");
        let mut b = Blockette45 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette45::default()
        };
        let num = f.int(4, "num_responses")?;
        for _ in 0..num {
            b.frequency.push(f.float(12, "frequency")?);
            b.amplitude.push(f.float(12, "amplitude")?);
            b.amp_error.push(f.float(12, "amp_error")?);
            b.phase.push(f.float(12, "phase")?);
            b.phase_error.push(f.float(12, "phase_error")?);
        }
        Ok(b)
    }
}

/// Generic Response Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette46 {
    pub lookup_code: i32,
    pub name: String,
    pub input_units: i32,
    pub output_units: i32,
    pub corner_freq: Vec<f64>,
    pub corner_slope: Vec<f64>,
}

impl Blockette46 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "046");
        let mut b = Blockette46 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette46::default()
        };
        let num = f.int(4, "num_responses")?;
        for _ in 0..num {
            b.corner_freq.push(f.float(12, "corner_freq")?);
            b.corner_slope.push(f.float(12, "corner_slope")?);
        }
        Ok(b)
    }
}

/// Decimation Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette47 {
    pub lookup_code: i32,
    pub name: String,
    pub input_sample_rate: f64,
    pub decimation_factor: i32,
    pub decimation_offset: i32,
    /// Estimated delay (seconds).
    pub delay: f64,
    /// Correction applied (seconds).
    pub correction: f64,
}

impl Blockette47 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "047");
        Ok(Blockette47 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            input_sample_rate: f.float(10, "input_sample_rate")?,
            decimation_factor: f.int(5, "decimation_factor")?,
            decimation_offset: f.int(5, "decimation_offset")?,
            delay: f.float(11, "delay")?,
            correction: f.float(11, "correction")?,
        })
    }
}

/// Channel Sensitivity/Gain Dictionary Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette48 {
    pub lookup_code: i32,
    pub name: String,
    pub sensitivity: f64,
    pub frequency: f64,
    pub cal_sensitivity: Vec<f64>,
    pub cal_frequency: Vec<f64>,
    pub cal_time: Vec<SeedTime>,
}

impl Blockette48 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "048");
        let mut b = Blockette48 {
            lookup_code: f.int(4, "lookup_code")?,
            name: f.var()?.to_string(),
            sensitivity: f.float(12, "sensitivity")?,
            frequency: f.float(12, "frequency")?,
            ..Blockette48::default()
        };
        let num = f.int(2, "num_histories")?;
        for _ in 0..num {
            b.cal_sensitivity.push(f.float(12, "cal_sensitivity")?);
            b.cal_frequency.push(f.float(12, "cal_frequency")?);
            b.cal_time.push(f.time("048.time")?);
        }
        Ok(b)
    }
}

/// Station Identifier Blockette.
#[derive(Debug, Clone, PartialEq)]
pub struct Blockette50 {
    /// Station call letters.
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation (m).
    pub elevation: f64,
    pub num_channels: i32,
    pub num_comments: i32,
    /// Site name.
    pub name: String,
    pub network_id: i32,
    /// 32 bit word order, e.g. "3210".
    pub word_order: String,
    /// 16 bit word order, e.g. "10".
    pub short_order: String,
    pub start: SeedTime,
    pub end: SeedTime,
    pub update: String,
    /// Network code; present from SEED version 2.3 on.
    pub network: String,
}

impl Default for Blockette50 {
    fn default() -> Self {
        Blockette50 {
            station: String::new(),
            latitude: 0.,
            longitude: 0.,
            elevation: 0.,
            num_channels: 0,
            num_comments: 0,
            name: String::new(),
            network_id: 0,
            word_order: "3210".to_string(),
            short_order: "10".to_string(),
            start: SeedTime::default(),
            end: SeedTime::default(),
            update: String::new(),
            network: String::new(),
        }
    }
}

impl Blockette50 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "050");
        let mut b = Blockette50 {
            station: f.trimmed(5)?,
            latitude: f.float(10, "latitude")?,
            longitude: f.float(11, "longitude")?,
            elevation: f.float(7, "elevation")?,
            num_channels: f.int(4, "num_channels")?,
            num_comments: f.int(3, "num_comments")?,
            name: f.var()?.to_string(),
            network_id: f.int(3, "network_id")?,
            word_order: f.fixed(4)?.to_string(),
            short_order: f.fixed(2)?.to_string(),
            ..Blockette50::default()
        };
        b.start = f.time("050.start_date")?;
        b.end = f.time("050.end_date")?;
        b.update = f.fixed(1)?.to_string();
        // SEED version >= 2.3 carries the two-character network code; probe
        // the total length to decide.
        if f.remaining() >= 2 {
            b.network = f.trimmed(2)?;
        }
        Ok(b)
    }

    pub fn to_seed_string(&self) -> String {
        let end = if self.end.is_unset() {
            String::new()
        } else {
            seed_date(&self.end)
        };
        format!(
            "{:<5}{:10.6}{:11.6}{:7.1}{:4}{:3}{}~{:3}{}{}{}~{}~{}{}",
            self.station,
            self.latitude,
            self.longitude,
            self.elevation,
            self.num_channels,
            self.num_comments,
            self.name,
            self.network_id,
            self.word_order,
            self.short_order,
            seed_date(&self.start),
            end,
            self.update,
            self.network,
        )
    }
}

impl std::fmt::Display for Blockette50 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sta={} lat={:.6} lon={:.6} elev={:.1} nchan={} site={} net={}",
            self.station,
            self.latitude,
            self.longitude,
            self.elevation,
            self.num_channels,
            self.name,
            self.network,
        )
    }
}

/// Render a SeedTime in the `YYYY,DDD,HH,MM,SS.FFFF` volume form.
pub fn seed_date(t: &SeedTime) -> String {
    let sec = t.seconds as i32;
    let frac = ((t.seconds - sec as f64) * 10000.).round() as i32;
    format!(
        "{:04},{:03},{:02},{:02},{:02}.{:04}",
        t.year, t.doy, t.hour, t.minute, sec, frac
    )
}

/// Station Comment Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette51 {
    pub beg: SeedTime,
    pub end: SeedTime,
    pub comment_code: i32,
    pub comment_level: i32,
}

impl Blockette51 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "051");
        Ok(Blockette51 {
            beg: f.time("051.beginning_time")?,
            end: f.time("051.end_time")?,
            comment_code: f.int(4, "comment_code")?,
            comment_level: f.int(6, "comment_level")?,
        })
    }
}

/// Channel Identifier Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette52 {
    pub location: String,
    pub channel: String,
    pub subchannel: i32,
    /// Instrument identifier, a Blockette 33 lookup.
    pub instrument: i32,
    pub comment: String,
    /// Units of signal response, a Blockette 34 lookup.
    pub signal_units: i32,
    /// Units of calibration input, a Blockette 34 lookup.
    pub calib_units: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    /// Local depth (m).
    pub local_depth: f64,
    pub azimuth: f64,
    pub dip: f64,
    /// Data format identifier code, a Blockette 30 lookup.
    pub format_code: i32,
    /// Data record length (as a power of 2).
    pub reclen: i32,
    pub sample_rate: f64,
    /// Max clock drift (seconds per sample).
    pub clock_drift: f64,
    pub num_comments: i32,
    pub channel_flags: String,
    pub start: SeedTime,
    pub end: SeedTime,
    pub update: String,
}

impl Blockette52 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "052");
        let mut b = Blockette52 {
            location: f.trimmed(2)?,
            channel: f.trimmed(3)?,
            subchannel: f.int(4, "subchannel")?,
            instrument: f.int(3, "instrument")?,
            comment: f.var()?.to_string(),
            signal_units: f.int(3, "signal_units")?,
            calib_units: f.int(3, "calib_units")?,
            latitude: f.float(10, "latitude")?,
            longitude: f.float(11, "longitude")?,
            elevation: f.float(7, "elevation")?,
            local_depth: f.float(5, "local_depth")?,
            azimuth: f.float(5, "azimuth")?,
            dip: f.float(5, "dip")?,
            format_code: f.int(4, "format_code")?,
            reclen: f.int(2, "reclen")?,
            sample_rate: f.float(10, "sample_rate")?,
            clock_drift: f.float(10, "clock_drift")?,
            num_comments: f.int(4, "num_comments")?,
            channel_flags: f.var()?.to_string(),
            ..Blockette52::default()
        };
        b.start = f.time("052.start_date")?;
        b.end = f.time("052.end_date")?;
        b.update = f.fixed(1)?.to_string();
        Ok(b)
    }

    pub fn to_seed_string(&self) -> String {
        let end = if self.end.is_unset() {
            String::new()
        } else {
            seed_date(&self.end)
        };
        format!(
            "{:<2}{:<3}{:4}{:3}{}~{:3}{:3}{:10.6}{:11.6}{:7.1}{:5.1}{:5.1}{:5.1}{:4}{:2}{:10.4E}{:10.4E}{:4}{}~{}~{}~{}",
            self.location,
            self.channel,
            self.subchannel,
            self.instrument,
            self.comment,
            self.signal_units,
            self.calib_units,
            self.latitude,
            self.longitude,
            self.elevation,
            self.local_depth,
            self.azimuth,
            self.dip,
            self.format_code,
            self.reclen,
            self.sample_rate,
            self.clock_drift,
            self.num_comments,
            self.channel_flags,
            seed_date(&self.start),
            end,
            self.update,
        )
    }
}

impl std::fmt::Display for Blockette52 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loc={} chan={} inst={} fmt={} srate={:.4} start={}",
            self.location,
            self.channel,
            self.instrument,
            self.format_code,
            self.sample_rate,
            self.start,
        )
    }
}

/// Response (Poles & Zeros) Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette53 {
    /// Transfer function type: "A" Laplace rad/s, "B" analog Hz, "D" digital.
    pub transfer_type: String,
    pub stage: i32,
    pub input_units: i32,
    pub output_units: i32,
    /// A0 normalization factor (1.0 if none).
    pub a0_norm: f64,
    pub norm_freq: f64,
    pub zr: Vec<f64>,
    pub zi: Vec<f64>,
    pub zr_error: Vec<f64>,
    pub zi_error: Vec<f64>,
    pub pr: Vec<f64>,
    pub pi: Vec<f64>,
    pub pr_error: Vec<f64>,
    pub pi_error: Vec<f64>,
    /// True if synthesised from a dictionary Blockette 43 via Blockette 60.
    pub from_b43: bool,
}

impl Blockette53 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "053");
        let mut b = Blockette53 {
            transfer_type: f.fixed(1)?.to_string(),
            stage: f.int(2, "stage")?,
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            a0_norm: f.float(12, "a0_norm")?,
            norm_freq: f.float(12, "norm_freq")?,
            ..Blockette53::default()
        };
        let num_zeros = f.int(3, "num_zeros")?;
        for _ in 0..num_zeros {
            b.zr.push(f.float(12, "real zero")?);
            b.zi.push(f.float(12, "imag zero")?);
            b.zr_error.push(f.float(12, "real zero-error")?);
            b.zi_error.push(f.float(12, "imag zero-error")?);
        }
        let num_poles = f.int(3, "num_poles")?;
        for _ in 0..num_poles {
            b.pr.push(f.float(12, "real pole")?);
            b.pi.push(f.float(12, "imag pole")?);
            b.pr_error.push(f.float(12, "real pole-error")?);
            b.pi_error.push(f.float(12, "imag pole-error")?);
        }
        Ok(b)
    }

    /// Clone a dictionary Blockette 43 into a stage-tagged Blockette 53.
    pub fn from_b43(stage: i32, b: &Blockette43) -> Self {
        Blockette53 {
            transfer_type: b.response_type.clone(),
            stage,
            input_units: b.input_units,
            output_units: b.output_units,
            a0_norm: b.a0_norm,
            norm_freq: b.norm_freq,
            zr: b.zr.clone(),
            zi: b.zi.clone(),
            zr_error: b.zr_error.clone(),
            zi_error: b.zi_error.clone(),
            pr: b.pr.clone(),
            pi: b.pi.clone(),
            pr_error: b.pr_error.clone(),
            pi_error: b.pi_error.clone(),
            from_b43: true,
        }
    }

    pub fn to_seed_string(&self) -> String {
        let mut s = format!(
            "{}{:2}{:3}{:3}{:12.5E}{:12.5E}{:3}",
            self.transfer_type,
            self.stage,
            self.input_units,
            self.output_units,
            self.a0_norm,
            self.norm_freq,
            self.zr.len(),
        );
        for i in 0..self.zr.len() {
            s.push_str(&format!(
                "{:12.5E}{:12.5E}{:12.5E}{:12.5E}",
                self.zr[i], self.zi[i], self.zr_error[i], self.zi_error[i]
            ));
        }
        s.push_str(&format!("{:3}", self.pr.len()));
        for i in 0..self.pr.len() {
            s.push_str(&format!(
                "{:12.5E}{:12.5E}{:12.5E}{:12.5E}",
                self.pr[i], self.pi[i], self.pr_error[i], self.pi_error[i]
            ));
        }
        s
    }
}

/// Response (Coefficients) Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette54 {
    pub transfer_type: String,
    pub stage: i32,
    pub input_units: i32,
    pub output_units: i32,
    pub numerator: Vec<f64>,
    pub nerror: Vec<f64>,
    pub denominator: Vec<f64>,
    pub derror: Vec<f64>,
    /// True if synthesised from a dictionary Blockette 44 via Blockette 60.
    pub from_b44: bool,
}

impl Blockette54 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "054");
        let mut b = Blockette54 {
            transfer_type: f.fixed(1)?.to_string(),
            stage: f.int(2, "stage")?,
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette54::default()
        };
        let num_n = f.int(4, "num_numerators")?;
        for _ in 0..num_n {
            b.numerator.push(f.float(12, "numerator")?);
            b.nerror.push(f.float(12, "numerator-error")?);
        }
        let num_d = f.int(4, "num_denominators")?;
        for _ in 0..num_d {
            b.denominator.push(f.float(12, "denominator")?);
            b.derror.push(f.float(12, "denominator-error")?);
        }
        Ok(b)
    }

    pub fn from_b44(stage: i32, b: &Blockette44) -> Self {
        Blockette54 {
            transfer_type: b.response_type.clone(),
            stage,
            input_units: b.input_units,
            output_units: b.output_units,
            numerator: b.numerator.clone(),
            nerror: b.nerror.clone(),
            denominator: b.denominator.clone(),
            derror: b.derror.clone(),
            from_b44: true,
        }
    }
}

/// Response List Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette55 {
    pub stage: i32,
    pub input_units: i32,
    pub output_units: i32,
    pub frequency: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub amp_error: Vec<f64>,
    pub phase: Vec<f64>,
    pub phase_error: Vec<f64>,
    /// True if synthesised from a dictionary Blockette 45 via Blockette 60.
    pub from_b45: bool,
}

impl Blockette55 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "055");
        let mut b = Blockette55 {
            stage: f.int(2, "stage")?,
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette55::default()
        };
        let num = f.int(4, "num_responses")?;
        for _ in 0..num {
            b.frequency.push(f.float(12, "frequency")?);
            b.amplitude.push(f.float(12, "amplitude")?);
            b.amp_error.push(f.float(12, "amp_error")?);
            b.phase.push(f.float(12, "phase")?);
            b.phase_error.push(f.float(12, "phase_error")?);
        }
        Ok(b)
    }

    pub fn from_b45(stage: i32, b: &Blockette45) -> Self {
        Blockette55 {
            stage,
            input_units: b.input_units,
            output_units: b.output_units,
            frequency: b.frequency.clone(),
            amplitude: b.amplitude.clone(),
            amp_error: b.amp_error.clone(),
            phase: b.phase.clone(),
            phase_error: b.phase_error.clone(),
            from_b45: true,
        }
    }
}

/// Generic Response Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette56 {
    pub stage: i32,
    pub input_units: i32,
    pub output_units: i32,
    pub corner_freq: Vec<f64>,
    pub corner_slope: Vec<f64>,
    /// True if synthesised from a dictionary Blockette 46 via Blockette 60.
    pub from_b46: bool,
}

impl Blockette56 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "056");
        let mut b = Blockette56 {
            stage: f.int(2, "stage")?,
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            ..Blockette56::default()
        };
        let num = f.int(4, "num_responses")?;
        for _ in 0..num {
            b.corner_freq.push(f.float(12, "corner_freq")?);
            b.corner_slope.push(f.float(12, "corner_slope")?);
        }
        Ok(b)
    }

    pub fn from_b46(stage: i32, b: &Blockette46) -> Self {
        Blockette56 {
            stage,
            input_units: b.input_units,
            output_units: b.output_units,
            corner_freq: b.corner_freq.clone(),
            corner_slope: b.corner_slope.clone(),
            from_b46: true,
        }
    }
}

/// Decimation Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette57 {
    pub stage: i32,
    pub input_sample_rate: f64,
    pub decimation_factor: i32,
    pub decimation_offset: i32,
    pub delay: f64,
    pub correction: f64,
    /// True if synthesised from a dictionary Blockette 47 via Blockette 60.
    pub from_b47: bool,
}

impl Blockette57 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "057");
        Ok(Blockette57 {
            stage: f.int(2, "stage")?,
            input_sample_rate: f.float(10, "input_sample_rate")?,
            decimation_factor: f.int(5, "decimation_factor")?,
            decimation_offset: f.int(5, "decimation_offset")?,
            delay: f.float(11, "delay")?,
            correction: f.float(11, "correction")?,
            from_b47: false,
        })
    }

    pub fn from_b47(stage: i32, b: &Blockette47) -> Self {
        Blockette57 {
            stage,
            input_sample_rate: b.input_sample_rate,
            decimation_factor: b.decimation_factor,
            decimation_offset: b.decimation_offset,
            delay: b.delay,
            correction: b.correction,
            from_b47: true,
        }
    }

    pub fn to_seed_string(&self) -> String {
        format!(
            "{:2}{:10.4E}{:5}{:5}{:11.4E}{:11.4E}",
            self.stage,
            self.input_sample_rate,
            self.decimation_factor,
            self.decimation_offset,
            self.delay,
            self.correction,
        )
    }
}

/// Channel Sensitivity/Gain Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette58 {
    /// Stage sequence number; stage 0 is the overall channel sensitivity.
    pub stage: i32,
    pub sensitivity: f64,
    pub frequency: f64,
    pub cal_sensitivity: Vec<f64>,
    pub cal_frequency: Vec<f64>,
    pub cal_time: Vec<SeedTime>,
    /// True if synthesised from a dictionary Blockette 48 via Blockette 60.
    pub from_b48: bool,
}

impl Blockette58 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "058");
        let mut b = Blockette58 {
            stage: f.int(2, "stage")?,
            sensitivity: f.float(12, "sensitivity")?,
            frequency: f.float(12, "frequency")?,
            ..Blockette58::default()
        };
        let num = f.int(2, "num_histories")?;
        for _ in 0..num {
            b.cal_sensitivity.push(f.float(12, "cal_sensitivity")?);
            b.cal_frequency.push(f.float(12, "cal_frequency")?);
            b.cal_time.push(f.time("058.time")?);
        }
        Ok(b)
    }

    pub fn from_b48(stage: i32, b: &Blockette48) -> Self {
        Blockette58 {
            stage,
            sensitivity: b.sensitivity,
            frequency: b.frequency,
            cal_sensitivity: b.cal_sensitivity.clone(),
            cal_frequency: b.cal_frequency.clone(),
            cal_time: b.cal_time.clone(),
            from_b48: true,
        }
    }

    pub fn to_seed_string(&self) -> String {
        format!(
            "{:2}{:12.5E}{:12.5E}{:2}",
            self.stage,
            self.sensitivity,
            self.frequency,
            self.cal_time.len(),
        )
    }
}

/// Channel Comment Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette59 {
    pub beg: SeedTime,
    pub end: SeedTime,
    pub comment_code: i32,
    pub comment_level: i32,
}

impl Blockette59 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "059");
        Ok(Blockette59 {
            beg: f.time("059.beginning_time")?,
            end: f.time("059.end_time")?,
            comment_code: f.int(4, "comment_code")?,
            comment_level: f.int(6, "comment_level")?,
        })
    }
}

/// One stage of a Response Reference Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStage {
    pub stage: i32,
    /// Dictionary lookup keys for each response of this stage.
    pub code: Vec<i32>,
}

/// Response Reference Blockette.
///
/// Carries no response data itself; each (stage, code) pair is resolved
/// against the dictionary and cloned into the matching station-level
/// blockette (41→61, 43→53, 44→54, 45→55, 46→56, 47→57, 48→58).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette60 {
    pub response: Vec<ResponseStage>,
}

impl Blockette60 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "060");
        let num_stages = f.int(2, "num_stages")?;
        let mut b = Blockette60::default();
        for _ in 0..num_stages {
            let stage = f.int(2, "stage")?;
            let num = f.int(2, "num_responses")?;
            let mut r = ResponseStage {
                stage,
                code: Vec::new(),
            };
            for _ in 0..num {
                r.code.push(f.int(4, "lookup_code")?);
            }
            b.response.push(r);
        }
        Ok(b)
    }
}

/// FIR Response Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette61 {
    pub stage: i32,
    pub name: String,
    /// "A" as declared, "B" odd symmetric, "C" even symmetric.
    pub symmetry_code: String,
    pub input_units: i32,
    pub output_units: i32,
    pub coef: Vec<f64>,
    /// True if synthesised from a dictionary Blockette 41 via Blockette 60.
    pub from_b41: bool,
}

impl Blockette61 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "061");
        let stage = f.int(2, "stage")?;
        let name = f.var()?.to_string();
        let symmetry_code = f.fixed(1)?.to_string();
        let input_units = f.int(3, "input_units")?;
        let output_units = f.int(3, "output_units")?;
        let num = f.int(4, "num_factors")?;
        let mut coef = Vec::with_capacity(num.max(0) as usize);
        for _ in 0..num {
            coef.push(f.float(14, "coefficient")?);
        }
        Ok(Blockette61 {
            stage,
            name,
            symmetry_code,
            input_units,
            output_units,
            coef,
            from_b41: false,
        })
    }

    pub fn from_b41(stage: i32, b: &Blockette41) -> Self {
        Blockette61 {
            stage,
            name: b.name.clone(),
            symmetry_code: b.symmetry_code.clone(),
            input_units: b.input_units,
            output_units: b.output_units,
            coef: b.coef.clone(),
            from_b41: true,
        }
    }
}

/// Response (Polynomial) Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette62 {
    pub transfer_type: String,
    pub stage: i32,
    pub input_units: i32,
    pub output_units: i32,
    pub poly_type: String,
    pub freq_units: String,
    pub min_freq: f64,
    pub max_freq: f64,
    pub min_approx: f64,
    pub max_approx: f64,
    pub max_error: f64,
    pub coef: Vec<f64>,
    pub error: Vec<f64>,
}

impl Blockette62 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "062");
        let mut b = Blockette62 {
            transfer_type: f.fixed(1)?.to_string(),
            stage: f.int(2, "stage")?,
            input_units: f.int(3, "input_units")?,
            output_units: f.int(3, "output_units")?,
            poly_type: f.fixed(1)?.to_string(),
            freq_units: f.fixed(1)?.to_string(),
            min_freq: f.float(12, "min_freq")?,
            max_freq: f.float(12, "max_freq")?,
            min_approx: f.float(12, "min_approx")?,
            max_approx: f.float(12, "max_approx")?,
            max_error: f.float(12, "max_error")?,
            ..Blockette62::default()
        };
        let num = f.int(3, "num_factors")?;
        for _ in 0..num {
            b.coef.push(f.float(12, "coefficient")?);
            b.error.push(f.float(12, "error")?);
        }
        Ok(b)
    }
}

/// Time Span Identifier Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette70 {
    pub flag: String,
    pub beg: SeedTime,
    pub end: SeedTime,
}

impl Blockette70 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "070");
        Ok(Blockette70 {
            flag: f.fixed(1)?.to_string(),
            beg: f.time("070.beginning_time")?,
            end: f.time("070.end_time")?,
        })
    }
}

/// Hypocenter Information Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette71 {
    pub origin_time: SeedTime,
    pub source_code: i32,
    pub latitude: f64,
    pub longitude: f64,
    /// Depth (km).
    pub depth: f64,
    pub magnitude: Vec<f64>,
    pub mag_type: Vec<String>,
    pub mag_source: Vec<i32>,
    pub seismic_region: i32,
    pub seismic_location: i32,
    pub region_name: String,
}

impl Blockette71 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "071");
        let mut b = Blockette71 {
            origin_time: f.time("071.origin_time")?,
            source_code: f.int(2, "source_code")?,
            latitude: f.float(10, "latitude")?,
            longitude: f.float(11, "longitude")?,
            depth: f.float(7, "depth")?,
            ..Blockette71::default()
        };
        let num = f.int(2, "num_magnitudes")?;
        for _ in 0..num {
            b.magnitude.push(f.float(5, "magnitude")?);
            b.mag_type.push(f.var()?.to_string());
            b.mag_source.push(f.int(2, "mag_source")?);
        }
        // Region fields appear from version 2.3 on.
        if f.remaining() >= 7 {
            b.seismic_region = f.int(3, "seismic_region")?;
            b.seismic_location = f.int(4, "seismic_location")?;
            b.region_name = f.var()?.to_string();
        }
        Ok(b)
    }
}

/// Event Phases Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette72 {
    pub station: String,
    pub location: String,
    pub channel: String,
    pub time: SeedTime,
    pub amplitude: f64,
    pub period: f64,
    pub snr: f64,
    pub phase_name: String,
    pub source: i32,
    pub network: String,
}

impl Blockette72 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "072");
        let mut b = Blockette72 {
            station: f.trimmed(5)?,
            location: f.trimmed(2)?,
            channel: f.trimmed(3)?,
            time: f.time("072.arrival_time")?,
            amplitude: f.float(10, "amplitude")?,
            period: f.float(10, "period")?,
            snr: f.float(10, "snr")?,
            phase_name: f.var()?.to_string(),
            ..Blockette72::default()
        };
        // Source and network appear from version 2.3 on.
        if f.remaining() >= 4 {
            b.source = f.int(2, "source")?;
            b.network = f.trimmed(2)?;
        }
        Ok(b)
    }
}

/// Time Span Data Start Index Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette73 {
    pub station: Vec<String>,
    pub location: Vec<String>,
    pub channel: Vec<String>,
    pub time: Vec<SeedTime>,
    pub seqno: Vec<i32>,
    pub subseqno: Vec<i32>,
}

impl Blockette73 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "073");
        let num = f.int(4, "num_data")?;
        let mut b = Blockette73::default();
        for _ in 0..num {
            b.station.push(f.trimmed(5)?);
            b.location.push(f.trimmed(2)?);
            b.channel.push(f.trimmed(3)?);
            b.time.push(f.time("073.time")?);
            b.seqno.push(f.int(6, "seqno")?);
            b.subseqno.push(f.int(2, "subseqno")?);
        }
        Ok(b)
    }
}

/// Time Series Index Blockette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blockette74 {
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: SeedTime,
    pub start_seqno: i32,
    pub start_subseqno: i32,
    pub end_time: SeedTime,
    pub end_seqno: i32,
    pub end_subseqno: i32,
    pub accel_time: Vec<SeedTime>,
    pub accel_seqno: Vec<i32>,
    pub accel_subseqno: Vec<i32>,
    pub network: String,
}

impl Blockette74 {
    pub fn parse(body: &str) -> Result<Self, SeedError> {
        let mut f = Fields::new(body, "074");
        let mut b = Blockette74 {
            station: f.trimmed(5)?,
            location: f.trimmed(2)?,
            channel: f.trimmed(3)?,
            start_time: f.time("074.series_start_time")?,
            start_seqno: f.int(6, "start_seqno")?,
            start_subseqno: f.int(2, "start_subseqno")?,
            ..Blockette74::default()
        };
        b.end_time = f.time("074.series_end_time")?;
        b.end_seqno = f.int(6, "end_seqno")?;
        b.end_subseqno = f.int(2, "end_subseqno")?;
        let num = f.int(3, "num_accels")?;
        for _ in 0..num {
            b.accel_time.push(f.time("074.record_time")?);
            b.accel_seqno.push(f.int(6, "accel_seqno")?);
            b.accel_subseqno.push(f.int(2, "accel_subseqno")?);
        }
        if f.remaining() >= 2 {
            b.network = f.trimmed(2)?;
        }
        Ok(b)
    }
}

/// A control blockette of a type the parser does not understand; the raw
/// body is kept so nothing is lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownBlockette {
    pub btype: String,
    pub fields: String,
}

/// The tagged union of every control blockette kind. All payloads are
/// immutable after parse; the framer dispatches on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Blockette {
    B5(Blockette5),
    B8(Blockette8),
    B10(Blockette10),
    B11(Blockette11),
    B12(Blockette12),
    B30(Blockette30),
    B31(Blockette31),
    B32(Blockette32),
    B33(Blockette33),
    B34(Blockette34),
    B35(Blockette35),
    B41(Blockette41),
    B42(Blockette42),
    B43(Blockette43),
    B44(Blockette44),
    B45(Blockette45),
    B46(Blockette46),
    B47(Blockette47),
    B48(Blockette48),
    B50(Blockette50),
    B51(Blockette51),
    B52(Blockette52),
    B53(Blockette53),
    B54(Blockette54),
    B55(Blockette55),
    B56(Blockette56),
    B57(Blockette57),
    B58(Blockette58),
    B59(Blockette59),
    B60(Blockette60),
    B61(Blockette61),
    B62(Blockette62),
    B70(Blockette70),
    B71(Blockette71),
    B72(Blockette72),
    B73(Blockette73),
    B74(Blockette74),
    Unknown(UnknownBlockette),
}

impl Blockette {
    /// Parse a control blockette body for a numeric type. Returns `None` for
    /// a type the model does not cover; the caller decides whether to keep
    /// it as [`Blockette::Unknown`].
    pub fn parse_control(btype: i32, body: &str) -> Option<Result<Blockette, SeedError>> {
        use self::Blockette::*;
        let b = match btype {
            5 => Blockette5::parse(body).map(B5),
            8 => Blockette8::parse(body).map(B8),
            10 => Blockette10::parse(body).map(B10),
            11 => Blockette11::parse(body).map(B11),
            12 => Blockette12::parse(body).map(B12),
            30 => Blockette30::parse(body).map(B30),
            31 => Blockette31::parse(body).map(B31),
            32 => Blockette32::parse(body).map(B32),
            33 => Blockette33::parse(body).map(B33),
            34 => Blockette34::parse(body).map(B34),
            35 => Blockette35::parse(body).map(B35),
            41 => Blockette41::parse(body).map(B41),
            42 => Blockette42::parse(body).map(B42),
            43 => Blockette43::parse(body).map(B43),
            44 => Blockette44::parse(body).map(B44),
            45 => Blockette45::parse(body).map(B45),
            46 => Blockette46::parse(body).map(B46),
            47 => Blockette47::parse(body).map(B47),
            48 => Blockette48::parse(body).map(B48),
            50 => Blockette50::parse(body).map(B50),
            51 => Blockette51::parse(body).map(B51),
            52 => Blockette52::parse(body).map(B52),
            53 => Blockette53::parse(body).map(B53),
            54 => Blockette54::parse(body).map(B54),
            55 => Blockette55::parse(body).map(B55),
            56 => Blockette56::parse(body).map(B56),
            57 => Blockette57::parse(body).map(B57),
            58 => Blockette58::parse(body).map(B58),
            59 => Blockette59::parse(body).map(B59),
            60 => Blockette60::parse(body).map(B60),
            61 => Blockette61::parse(body).map(B61),
            62 => Blockette62::parse(body).map(B62),
            70 => Blockette70::parse(body).map(B70),
            71 => Blockette71::parse(body).map(B71),
            72 => Blockette72::parse(body).map(B72),
            73 => Blockette73::parse(body).map(B73),
            74 => Blockette74::parse(body).map(B74),
            _ => return None,
        };
        Some(b)
    }

    /// The numeric blockette type, or `None` for unknown kinds.
    pub fn kind(&self) -> Option<i32> {
        use self::Blockette::*;
        Some(match self {
            B5(_) => 5,
            B8(_) => 8,
            B10(_) => 10,
            B11(_) => 11,
            B12(_) => 12,
            B30(_) => 30,
            B31(_) => 31,
            B32(_) => 32,
            B33(_) => 33,
            B34(_) => 34,
            B35(_) => 35,
            B41(_) => 41,
            B42(_) => 42,
            B43(_) => 43,
            B44(_) => 44,
            B45(_) => 45,
            B46(_) => 46,
            B47(_) => 47,
            B48(_) => 48,
            B50(_) => 50,
            B51(_) => 51,
            B52(_) => 52,
            B53(_) => 53,
            B54(_) => 54,
            B55(_) => 55,
            B56(_) => 56,
            B57(_) => 57,
            B58(_) => 58,
            B59(_) => 59,
            B60(_) => 60,
            B61(_) => 61,
            B62(_) => 62,
            B70(_) => 70,
            B71(_) => 71,
            B72(_) => 72,
            B73(_) => 73,
            B74(_) => 74,
            Unknown(_) => return None,
        })
    }
}
