//! The logical-record framer.
//!
//! A SEED volume is a contiguous sequence of fixed-length logical records,
//! each starting with an 8-byte control header: a 6-byte ASCII sequence
//! number, a type byte and a continuation flag. Control records carry ASCII
//! blockettes (3-digit type + 4-digit length + body, bodies may straddle
//! logical records); data records carry a 48-byte fixed header, chained
//! binary blockettes and the sample payload.
//!
//! [`SeedInput`] walks the records in on-disk order, maintains the station
//! table and the abbreviation dictionary, and groups contiguous data records
//! into continuous [`SeedData`] series with one object of look-ahead.
use std::collections::VecDeque;

use log::warn;

use seed_css_core::blockettes::Blockette;
use seed_css_core::blockettes::UnknownBlockette;
use seed_css_core::data_blockettes::DataBlockette;
use seed_css_core::enums::DataFormat;
use seed_css_core::errors::SeedError;
use seed_css_core::settings::{ExceptionMask, ReadMode, ReadSettings};
use seed_css_core::station::{Channel, Station};
use seed_css_core::{Dictionary, WordOrder, DEFAULT_LRECLEN, LOGICAL_HEADER_LEN};

use crate::data_record::DataRecord;
use crate::seed_data::SeedData;

/// Anything the framer can yield: a control blockette, a raw data record
/// (RAW mode) or a continuous data group.
#[derive(Debug)]
pub enum SeedObject {
    Blockette(Blockette),
    DataRecord(DataRecord),
    SeedData(SeedData),
}

/// A reader of SEED objects over a byte slice.
pub struct SeedInput<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Logical record length; updated by blockettes 5, 8 and 10.
    lreclen: usize,
    /// Byte offset within the current logical record.
    logical_offset: usize,
    record_index: usize,
    settings: ReadSettings,
    record_type: u8,
    record_continuation: u8,
    /// Soft-error flags accumulated since the last returned object.
    state: ExceptionMask,
    record_seqno: i32,
    reading_data: bool,
    /// One-slot look-ahead plus the groups produced by a data run.
    next: VecDeque<SeedObject>,
    pub stations: Vec<Station>,
    pub dictionary: Dictionary,
}

impl<'a> SeedInput<'a> {
    pub fn new(buf: &'a [u8], settings: ReadSettings) -> Self {
        SeedInput {
            buf,
            pos: 0,
            lreclen: DEFAULT_LRECLEN,
            logical_offset: 0,
            record_index: 0,
            settings,
            record_type: 0,
            record_continuation: 0,
            state: ExceptionMask::NONE,
            record_seqno: 0,
            reading_data: false,
            next: VecDeque::new(),
            stations: Vec::new(),
            dictionary: Dictionary::default(),
        }
    }

    /// The logical record length currently in force.
    pub fn logical_record_length(&self) -> usize {
        self.lreclen
    }

    /// Byte offset within the current logical record.
    pub fn logical_offset(&self) -> usize {
        self.logical_offset
    }

    pub fn record_type(&self) -> u8 {
        self.record_type
    }

    pub fn record_continuation(&self) -> u8 {
        self.record_continuation
    }

    pub fn record_sequence_number(&self) -> i32 {
        self.record_seqno
    }

    /// Soft-error flags set while producing the last object.
    pub fn state(&self) -> ExceptionMask {
        self.state
    }

    pub fn good(&self) -> bool {
        self.state.is_empty()
    }

    /// Read the next SEED object, grouping data records into [`SeedData`]
    /// series unless RAW mode is selected. Returns `None` at the end of the
    /// volume.
    pub fn read_seed(&mut self) -> Result<Option<SeedObject>, SeedError> {
        let mut o = self.get_next_object()?;

        // drop data records with no samples or a non-positive rate
        if self.settings.get_mode() != ReadMode::Raw {
            while matches!(
                &o,
                Some(SeedObject::DataRecord(dr))
                    if dr.header.nsamples <= 0 || dr.samprate <= 0.
            ) {
                o = self.get_next_object()?;
            }
        }

        match o {
            None => Ok(None),
            Some(SeedObject::DataRecord(dr)) => {
                if self.settings.get_mode() == ReadMode::Raw {
                    Ok(Some(SeedObject::DataRecord(dr)))
                } else {
                    self.get_seed_data(dr).map(Some)
                }
            }
            other => Ok(other),
        }
    }

    /// Collect the data run starting at `dr` into continuous groups.
    ///
    /// All records with the same (station, network) are gathered until a
    /// different object arrives (which is buffered), sorted by channel,
    /// location, rate and time, and split wherever the continuity tolerance
    /// is exceeded.
    fn get_seed_data(&mut self, dr: DataRecord) -> Result<SeedObject, SeedError> {
        let sta = dr.header.station.clone();
        let net = dr.header.network.clone();
        let mut records = vec![dr];
        let mut trailing = None;

        loop {
            match self.get_next_object()? {
                None => break,
                Some(SeedObject::DataRecord(d))
                    if d.header.station == sta && d.header.network == net =>
                {
                    if d.header.nsamples > 0 {
                        records.push(d);
                    }
                }
                Some(other) => {
                    trailing = Some(other);
                    break;
                }
            }
        }

        records.sort_by(|a, b| {
            a.header
                .channel
                .cmp(&b.header.channel)
                .then(a.header.location.cmp(&b.header.location))
                .then(
                    a.samprate
                        .partial_cmp(&b.samprate)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(
                    a.header
                        .start_time
                        .epoch()
                        .partial_cmp(&b.header.start_time.epoch())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut groups: Vec<SeedData> = Vec::new();
        for r in records {
            let continuous = match groups.last().and_then(|g| g.records.last()) {
                Some(last) => {
                    let tnext =
                        last.header.start_time() + last.header.nsamples as f64 / last.samprate;
                    let diff = (r.header.start_time() - tnext).abs();
                    last.header.channel == r.header.channel
                        && last.header.location == r.header.location
                        && last.header.dhqual == r.header.dhqual
                        && last.samprate == r.samprate
                        && (diff < 0.5 / last.samprate
                            || diff <= last.header.nsamples as f64 * last.clock_drift)
                }
                None => false,
            };
            if continuous {
                groups.last_mut().unwrap().records.push(r);
            } else {
                let mut sd = SeedData::new(r);
                self.resolve_calib(&mut sd);
                groups.push(sd);
            }
        }

        for g in groups {
            self.next.push_back(SeedObject::SeedData(g));
        }
        if let Some(t) = trailing {
            self.next.push_back(t);
        }
        Ok(self.next.pop_front().expect("at least one group"))
    }

    /// Resolve calib (nm/count displacement) and calper (seconds) for a
    /// group from the final-stage sensitivity of its channel response, and
    /// attach a copy of the channel.
    fn resolve_calib(&self, sd: &mut SeedData) {
        sd.calib = 0.;
        sd.calper = 0.;
        let h = match sd.records.first() {
            Some(r) => r.header.clone(),
            None => return,
        };
        let channel = match self.find_channel(&h.network, &h.station, &h.channel, &h.location) {
            Some(c) => c,
            None => return,
        };
        sd.channel = Some(channel.clone());

        if let Some((calib, calper)) = crate::seed_data::channel_calib(channel, &self.dictionary) {
            sd.calib = calib;
            sd.calper = calper;
        }
    }

    /// Pop the look-ahead queue or parse forward, classifying soft errors
    /// against the exception mask: a masked class propagates, an unmasked
    /// one sets its state flag and skips per the propagation policy.
    fn get_next_object(&mut self) -> Result<Option<SeedObject>, SeedError> {
        if let Some(o) = self.next.pop_front() {
            return Ok(Some(o));
        }
        self.state = ExceptionMask::NONE;

        loop {
            match self.read_seed_object() {
                Ok(o) => return Ok(Some(o)),
                Err(e) => match e {
                    SeedError::Len { .. } => {
                        self.state.insert(ExceptionMask::LEN);
                        if self.settings.get_exceptions().contains(ExceptionMask::LEN) {
                            return Err(e);
                        }
                        self.skip_rec();
                    }
                    SeedError::Hdr { .. } => {
                        self.state.insert(ExceptionMask::HDR);
                        if self.settings.get_exceptions().contains(ExceptionMask::HDR) {
                            return Err(e);
                        }
                        self.skip_rec();
                    }
                    SeedError::Skip { .. } => self.skip_rec(),
                    SeedError::Eof => return Ok(None),
                    SeedError::Format { .. } | SeedError::Fmt { .. } => {
                        self.state.insert(ExceptionMask::FMT);
                        if self.settings.get_exceptions().contains(ExceptionMask::FMT) {
                            return Err(e);
                        }
                        // skip to the next blockette, not the next record
                    }
                    SeedError::Seqno { .. } => return Err(e),
                    other => return Err(other),
                },
            }
        }
    }

    /// Parse one object at the current position.
    fn read_seed_object(&mut self) -> Result<SeedObject, SeedError> {
        // less than 7 bytes left cannot hold another blockette header
        if self.logical_offset != 0 && self.lreclen.saturating_sub(self.logical_offset) < 7 {
            return Err(SeedError::skip("EOR"));
        }

        let s = self.read_string(3)?;

        if self.reading_data {
            return self.read_data_record(s);
        }

        if s == "   " {
            return Err(SeedError::skip("blockette type"));
        }

        let btype_str = s.trim().to_string();
        let len_str = self.read_string(4)?;
        let blockette_length: i32 = match len_str.trim().parse() {
            Ok(n) => n,
            Err(_) => return Err(SeedError::len(&btype_str, "bad length")),
        };
        let body = self.read_string((blockette_length - 7).max(0) as usize)?;

        let blockette = match btype_str
            .parse::<i32>()
            .ok()
            .and_then(|t| Blockette::parse_control(t, &body))
        {
            Some(Ok(b)) => b,
            Some(Err(e)) => return Err(e),
            None => {
                warn!("unknown blockette type: {}", s);
                self.state.insert(ExceptionMask::FMT);
                Blockette::Unknown(UnknownBlockette {
                    btype: btype_str,
                    fields: body,
                })
            }
        };

        match &blockette {
            Blockette::B5(x) => {
                self.set_lreclen(x.logical_record_length);
                self.reset_volume();
            }
            Blockette::B8(x) => self.set_lreclen(x.logical_record_length),
            Blockette::B10(x) => {
                self.set_lreclen(x.logical_record_length);
                self.reset_volume();
            }
            Blockette::B11(_) | Blockette::B12(_) => self.reset_volume(),
            Blockette::B50(x) => {
                // a later station with the same identity replaces the old one
                if let Some(i) = self
                    .stations
                    .iter()
                    .position(|st| st.b50.station == x.station && st.b50.network == x.network)
                {
                    log::debug!("replacing station {}", x);
                    self.stations.remove(i);
                }
                self.stations.push(Station::new(x.clone()));
            }
            Blockette::B60(x) => {
                if self.stations.is_empty() {
                    warn!("blockette 60 found before blockette 50");
                } else {
                    let expanded = self.dictionary.expand_b60(x);
                    let station = self.stations.last_mut().unwrap();
                    for b in expanded {
                        station.add(b);
                    }
                }
            }
            other if Dictionary::is_dictionary_blockette(other) => {
                self.dictionary.add(other);
            }
            other => {
                if let Some(51..=59) | Some(61) | Some(62) = other.kind() {
                    match self.stations.last_mut() {
                        Some(station) => station.add(other.clone()),
                        None => warn!(
                            "blockette {} found before blockette 50",
                            other.kind().unwrap_or(0)
                        ),
                    }
                }
            }
        }

        Ok(SeedObject::Blockette(blockette))
    }

    /// Parse one data record starting at the 3 bytes already consumed.
    fn read_data_record(&mut self, s: String) -> Result<SeedObject, SeedError> {
        let mut data_record_len = self.lreclen;

        let (hdr_bytes, rtype, seqno) = if self.logical_offset > 11 {
            // not the first data record in this logical record: the 48-byte
            // header starts here, so read its sequence number inline
            let mut first = s.into_bytes();
            first.extend_from_slice(&self.read_bytes(4)?);
            let rtype = first[6];
            if rtype == b' ' {
                return Err(SeedError::skip("data record type"));
            }
            let seqno = match String::from_utf8_lossy(&first[0..6]).trim().parse::<i32>() {
                Ok(n) => n,
                Err(_) => {
                    let msg = "bad record sequence number for data record".to_string();
                    if self.settings.get_exceptions().contains(ExceptionMask::SEQNO) {
                        return Err(SeedError::Seqno { msg });
                    }
                    self.state.insert(ExceptionMask::SEQNO);
                    warn!("{}", msg);
                    -1
                }
            };
            self.read_bytes(1)?; // reserved byte
            (self.read_bytes(40)?, rtype, seqno)
        } else {
            // the logical record header has been read, plus 3 header bytes
            let mut b = s.into_bytes();
            b.extend_from_slice(&self.read_bytes(37)?);
            (b, self.record_type, self.record_seqno)
        };

        // byte order comes from the station's blockette 50 when known,
        // otherwise big-endian is assumed
        let sta = String::from_utf8_lossy(&hdr_bytes[0..5]).trim().to_string();
        let net = String::from_utf8_lossy(&hdr_bytes[10..12]).trim().to_string();
        let (mut word_order, mut short_order) = self.get_word_order(&sta, &net);

        let mut dr = DataRecord::new(&hdr_bytes, &word_order, &short_order)?;
        dr.header.seqno = seqno;
        dr.header.dhqual = rtype;
        dr.reclen = data_record_len;

        // start of this record, in logical record coordinates
        let logical_pos = self.logical_offset as i64 - 48;
        dr.record_offset = self.pos - 48;
        dr.data_file_offset = dr.record_offset + dr.header.offset as usize;

        // skip to the first data blockette
        let boffs = dr.header.boffset as i64 - 48;
        if boffs > 0 {
            self.advance(boffs as usize)?;
        }

        let mut b1000_format = None;
        for _ in 0..dr.header.num {
            let b4 = self.read_bytes(4)?;
            let mut btype = dr.order.u16_at(&b4, 0);

            if btype == 59395 {
                // 1000 with the bytes reversed: a mini-SEED volume (no
                // blockette 50) whose header is not big-endian. Reverse the
                // byte order and reload the header.
                word_order = WordOrder::flipped(&word_order);
                short_order = WordOrder::flipped(&short_order);
                dr.reset_word_order(&hdr_bytes, &word_order, &short_order)?;
                dr.data_file_offset = dr.record_offset + dr.header.offset as usize;
                btype = 1000;
            }

            let next_blockette = dr.order.u16_at(&b4, 2) as i64;

            match DataBlockette::fixed_len(btype) {
                None => warn!("unknown data blockette type: '{}'", btype),
                Some(flen) => {
                    let body = if btype == 2000 {
                        // blockette 2000 declares its own total length
                        let mut body = self.read_bytes(2)?;
                        let total = dr.order.u16_at(&body, 0) as usize;
                        if total > 6 {
                            body.extend_from_slice(&self.read_bytes(total - 6)?);
                        }
                        body
                    } else {
                        self.read_bytes(flen - 4)?
                    };
                    match DataBlockette::parse(btype, &body, &dr.order) {
                        Some(Ok(db)) => {
                            if let DataBlockette::B1000(x) = &db {
                                data_record_len = x.record_length();
                                dr.reclen = data_record_len;
                                if x.word_order != 0 {
                                    word_order = "3210".to_string();
                                    short_order = "10".to_string();
                                } else {
                                    word_order = "0123".to_string();
                                    short_order = "01".to_string();
                                }
                                dr.word_order = word_order.clone();
                                dr.short_order = short_order.clone();
                                dr.order = WordOrder::new(&word_order, &short_order);
                                b1000_format = Some(x.format as i32);
                            } else if let DataBlockette::B100(x) = &db {
                                dr.samprate = x.sample_rate as f64;
                            }
                            dr.blockettes.push(db);
                        }
                        Some(Err(e @ SeedError::Len { .. })) => {
                            if self.settings.get_exceptions().contains(ExceptionMask::LEN) {
                                return Err(e);
                            }
                            // short data blockette dropped, record continues
                        }
                        Some(Err(e)) => return Err(e),
                        None => {}
                    }
                }
            }

            if next_blockette > 0 {
                let n = logical_pos + next_blockette - self.logical_offset as i64;
                if n > 0 {
                    self.advance(n as usize)?;
                }
            }
        }

        dr.header.num = dr.blockettes.len() as i32;
        dr.data_length = data_record_len.saturating_sub(dr.header.offset as usize);

        // jump over the payload to the end of the record
        let n = logical_pos + dr.header.offset as i64 + dr.data_length as i64
            - self.logical_offset as i64;
        self.seek_raw(n);

        self.resolve_format(&mut dr, b1000_format)?;

        Ok(SeedObject::DataRecord(dr))
    }

    /// Fill in the payload format and clock drift.
    ///
    /// Blockette 1000 wins; without one the data format dictionary
    /// (Blockette 30, keyed by the channel's format code) is consulted.
    fn resolve_format(&self, dr: &mut DataRecord, b1000_format: Option<i32>) -> Result<(), SeedError> {
        let channel = self.find_channel(
            &dr.header.network,
            &dr.header.station,
            &dr.header.channel,
            &dr.header.location,
        );

        dr.clock_drift = match channel {
            Some(c) if c.b52.clock_drift > 0. => c.b52.clock_drift,
            _ => 0.0001,
        };

        match b1000_format {
            Some(code) => {
                dr.format = DataFormat::new(code)?;
            }
            None => {
                let b30 = channel.and_then(|c| self.dictionary.get_b30(c.b52.format_code));
                match b30 {
                    Some(b30) => match DataFormat::from_b30_name(&b30.name) {
                        Some(f) => dr.format = f,
                        None => warn!("cannot determine encoding format: {}", b30.name),
                    },
                    None => {
                        return Err(SeedError::hdr(format!(
                            "data header with no blockette 1000 for {}/{}/{} encountered before corresponding blockette 30",
                            dr.header.network, dr.header.station, dr.header.channel
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    fn find_channel(&self, net: &str, sta: &str, chan: &str, loc: &str) -> Option<&Channel> {
        self.stations
            .iter()
            .filter(|s| s.b50.network == net && s.b50.station == sta)
            .find_map(|s| s.channel(loc, chan))
    }

    /// Byte order declared by the station's blockette 50, defaulting to
    /// big-endian when the station is unknown or the declaration invalid.
    fn get_word_order(&self, sta: &str, net: &str) -> (String, String) {
        let station = self
            .stations
            .iter()
            .find(|s| s.b50.station == sta && s.b50.network == net);
        match station {
            Some(s) => {
                let wo = &s.b50.word_order;
                let word = if wo.len() == 4 && "0123".chars().all(|c| wo.contains(c)) {
                    wo.clone()
                } else {
                    warn!("invalid blockette 50 32 bit word order");
                    "3210".to_string()
                };
                let so = &s.b50.short_order;
                let short = if so.len() == 2 && "01".chars().all(|c| so.contains(c)) {
                    so.clone()
                } else {
                    warn!("invalid blockette 50 16 bit word order");
                    "10".to_string()
                };
                (word, short)
            }
            None => ("3210".to_string(), "10".to_string()),
        }
    }

    fn set_lreclen(&mut self, exponent: i32) {
        // the stored value is an exponent: actual byte length is 2^value.
        // 256 is the smallest logical record the format allows.
        self.lreclen = 1usize << exponent.max(8).min(30);
    }

    fn reset_volume(&mut self) {
        self.dictionary.clear();
        self.stations.clear();
    }

    /// Read and classify the next 8-byte logical record control header.
    fn read_volume_header(&mut self) -> Result<(), SeedError> {
        let c = self.raw(LOGICAL_HEADER_LEN)?.to_vec();
        self.logical_offset = LOGICAL_HEADER_LEN;
        self.record_index += 1;

        match String::from_utf8_lossy(&c[0..6]).trim().parse::<i32>() {
            Ok(n) => self.record_seqno = n,
            Err(_) => {
                let msg = format!(
                    "bad record sequence number for record {}",
                    self.record_index
                );
                if self.settings.get_exceptions().contains(ExceptionMask::SEQNO) {
                    return Err(SeedError::Seqno { msg });
                }
                self.state.insert(ExceptionMask::SEQNO);
                warn!("{}", msg);
            }
        }

        self.record_type = c[6];
        self.record_continuation = c[7];

        if self.record_type == b' ' {
            Err(SeedError::skip("record type"))
        } else if self
            .settings
            .get_ctrl_types()
            .contains(self.record_type as char)
        {
            self.reading_data = false;
            Ok(())
        } else if self
            .settings
            .get_data_types()
            .contains(self.record_type as char)
        {
            self.reading_data = true;
            Ok(())
        } else if !self.reading_data && self.record_continuation == b'*' {
            Ok(())
        } else {
            Err(SeedError::hdr(format!(
                "unknown header type (byte 7): '{}'",
                self.record_type as char
            )))
        }
    }

    /// Skip to the next logical record boundary.
    fn skip_rec(&mut self) {
        let n = self.lreclen.saturating_sub(self.logical_offset);
        if self.logical_offset > 0 {
            self.pos += n;
        }
        self.logical_offset = 0;
    }

    fn raw(&mut self, len: usize) -> Result<&'a [u8], SeedError> {
        if self.pos + len > self.buf.len() {
            self.pos = self.buf.len();
            return Err(SeedError::Eof);
        }
        let b = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(b)
    }

    /// Read `len` bytes, transparently consuming the 8-byte control header
    /// of each logical record crossed.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SeedError> {
        if self.logical_offset + len > self.lreclen {
            let mut out = Vec::with_capacity(len);
            let n = self.lreclen.saturating_sub(self.logical_offset);
            out.extend_from_slice(self.raw(n)?);
            let mut len = len - n;
            self.read_volume_header()?;
            while len > self.lreclen - LOGICAL_HEADER_LEN {
                out.extend_from_slice(self.raw(self.lreclen - LOGICAL_HEADER_LEN)?);
                len -= self.lreclen - LOGICAL_HEADER_LEN;
                self.read_volume_header()?;
            }
            if len > 0 {
                out.extend_from_slice(self.raw(len)?);
                self.logical_offset += len;
            }
            Ok(out)
        } else {
            if self.logical_offset == 0 {
                self.read_volume_header()?;
            }
            let b = self.raw(len)?.to_vec();
            self.logical_offset += len;
            Ok(b)
        }
    }

    fn read_string(&mut self, len: usize) -> Result<String, SeedError> {
        let b = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&b).to_string())
    }

    /// Skip forward, respecting logical record boundaries.
    fn advance(&mut self, len: usize) -> Result<(), SeedError> {
        self.read_bytes(len).map(|_| ())
    }

    /// Seek relative without boundary handling; used to jump over sample
    /// payloads whose extent is known from the record length.
    fn seek_raw(&mut self, n: i64) {
        self.pos = (self.pos as i64 + n).max(0) as usize;
        self.logical_offset = (self.logical_offset as i64 + n).max(0) as usize;
    }
}
