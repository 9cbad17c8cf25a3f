use seed_css_core::blockettes::*;
use seed_css_core::settings::{ExceptionMask, ReadMode, ReadSettings};

use crate::input::{SeedInput, SeedObject};

/// Wrap a blockette body with its 3-digit type and 4-digit length.
fn frame(btype: u32, body: &str) -> String {
    format!("{:03}{:04}{}", btype, 7 + body.len(), body)
}

/// A volume blockette 10 declaring `2^exp` byte logical records.
fn b10(exp: u32) -> String {
    frame(10, &format!(" 2.3{:02}~~~IDC~~", exp))
}

/// Lay control blockettes out into logical records of `lreclen` bytes,
/// splitting bodies across records and padding the tail with blanks.
fn control_volume(blockettes: &[String], lreclen: usize) -> Vec<u8> {
    let payload: String = blockettes.concat();
    let bytes = payload.as_bytes();
    let mut out = vec![];
    let mut seq = 1;
    let mut i = 0;
    while i < bytes.len() {
        let cont = if seq == 1 { ' ' } else { '*' };
        out.extend_from_slice(format!("{:06}V{}", seq, cont).as_bytes());
        let n = (lreclen - 8).min(bytes.len() - i);
        out.extend_from_slice(&bytes[i..i + n]);
        i += n;
        if i >= bytes.len() {
            out.resize(out.len() + (lreclen - 8 - n), b' ');
        }
        seq += 1;
    }
    out
}

struct RecordSpec<'a> {
    seqno: u32,
    sta: &'a str,
    loc: &'a str,
    chan: &'a str,
    net: &'a str,
    /// (year, doy, hour, minute, second, 0.0001s ticks)
    start: (u16, u16, u8, u8, u8, u16),
    nsamples: u16,
    factor: i16,
    multiplier: i16,
    /// Blockette 1000 encoding format.
    format: u8,
    /// Blockette 1000 word order flag: 1 big-endian, 0 little-endian.
    big_endian: bool,
    /// Record length exponent; the record is padded to `2^exp`.
    reclen_exp: u8,
    payload: Vec<u8>,
}

/// Build one data record: 48-byte header, a blockette 1000 at offset 48 and
/// the payload at offset 64, padded to the declared record length.
///
/// `header_be` controls the byte order of the multi-byte header fields; the
/// blockette 1000 type bytes follow it, so a little-endian header produces
/// the swapped-1000 pattern the reader detects.
fn data_record(spec: &RecordSpec, header_be: bool) -> Vec<u8> {
    let u16b = |v: u16| -> [u8; 2] {
        if header_be {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };
    let i16b = |v: i16| -> [u8; 2] {
        if header_be {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };

    let mut out = vec![];
    out.extend_from_slice(format!("{:06}D ", spec.seqno).as_bytes());
    out.extend_from_slice(format!("{:<5}", spec.sta).as_bytes());
    out.extend_from_slice(format!("{:<2}", spec.loc).as_bytes());
    out.extend_from_slice(format!("{:<3}", spec.chan).as_bytes());
    out.extend_from_slice(format!("{:<2}", spec.net).as_bytes());
    let (year, doy, hour, minute, second, ticks) = spec.start;
    out.extend_from_slice(&u16b(year));
    out.extend_from_slice(&u16b(doy));
    out.push(hour);
    out.push(minute);
    out.push(second);
    out.push(0);
    out.extend_from_slice(&u16b(ticks));
    out.extend_from_slice(&u16b(spec.nsamples));
    out.extend_from_slice(&i16b(spec.factor));
    out.extend_from_slice(&i16b(spec.multiplier));
    out.extend_from_slice(&[0, 0, 0, 1]); // activity, io, quality, num
    if header_be {
        out.extend_from_slice(&0i32.to_be_bytes());
    } else {
        out.extend_from_slice(&0i32.to_le_bytes());
    }
    out.extend_from_slice(&u16b(64)); // offset to data
    // boffset is read before any byte-order flip, so it stays big-endian
    out.extend_from_slice(&48u16.to_be_bytes());
    assert_eq!(out.len(), 48);

    // blockette 1000
    out.extend_from_slice(&u16b(1000));
    out.extend_from_slice(&u16b(0)); // no next blockette
    out.push(spec.format);
    out.push(if spec.big_endian { 1 } else { 0 });
    out.push(spec.reclen_exp);
    out.push(0);
    out.resize(64, 0);

    out.extend_from_slice(&spec.payload);
    out.resize(1 << spec.reclen_exp, 0);
    out
}

fn int32_payload(samples: &[i32], be: bool) -> Vec<u8> {
    let mut out = vec![];
    for &s in samples {
        if be {
            out.extend_from_slice(&s.to_be_bytes());
        } else {
            out.extend_from_slice(&s.to_le_bytes());
        }
    }
    out
}

/// A Steim-2 payload of one 30-bit difference per slot.
fn steim2_payload(samples: &[i32], be: bool) -> Vec<u8> {
    let put = |v: u32, out: &mut Vec<u8>| {
        if be {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    };
    let mut diffs = Vec::with_capacity(samples.len());
    for (i, &s) in samples.iter().enumerate() {
        diffs.push(if i == 0 { 0 } else { s - samples[i - 1] });
    }
    let mut out = vec![];
    let mut di = 0;
    let mut frame_no = 0;
    while di < diffs.len() {
        let first_slot = if frame_no == 0 { 3 } else { 1 };
        let mut control = 0u32;
        let mut words = vec![];
        for slot in first_slot..16 {
            if di < diffs.len() {
                control |= 2 << (2 * (15 - slot));
                words.push((1u32 << 30) | (diffs[di] as u32 & 0x3fff_ffff));
                di += 1;
            } else {
                words.push(0);
            }
        }
        put(control, &mut out);
        if frame_no == 0 {
            put(samples[0] as u32, &mut out);
            put(*samples.last().unwrap() as u32, &mut out);
        }
        for w in words {
            put(w, &mut out);
        }
        frame_no += 1;
    }
    out
}

fn read_all(volume: &[u8], settings: ReadSettings) -> (Vec<SeedObject>, SeedInput<'_>) {
    let mut input = SeedInput::new(volume, settings);
    let mut objects = vec![];
    while let Some(o) = input.read_seed().expect("read_seed failed") {
        objects.push(o);
    }
    (objects, input)
}

fn seed_data_objects(objects: Vec<SeedObject>) -> Vec<crate::SeedData> {
    objects
        .into_iter()
        .filter_map(|o| match o {
            SeedObject::SeedData(sd) => Some(sd),
            _ => None,
        })
        .collect()
}

mod framing {
    use super::*;

    #[test]
    fn blockette_body_straddles_logical_records() {
        let long_desc: String = std::iter::repeat('x').take(400).collect();
        let blockettes = vec![b10(8), frame(33, &format!("  1{}~", long_desc))];
        let volume = control_volume(&blockettes, 256);
        assert!(volume.len() > 256);

        let (objects, input) = read_all(&volume, ReadSettings::default());
        assert_eq!(input.logical_record_length(), 256);
        assert_eq!(objects.len(), 2);
        match &objects[1] {
            SeedObject::Blockette(Blockette::B33(b)) => assert_eq!(b.description, long_desc),
            other => panic!("expected blockette 33, got {:?}", other),
        }
    }

    #[test]
    fn unknown_blockette_sets_fmt_state_and_continues() {
        let blockettes = vec![
            b10(12),
            frame(999, "who knows"),
            frame(33, "  1known~"),
        ];
        let volume = control_volume(&blockettes, 4096);
        let mut input = SeedInput::new(&volume, ReadSettings::default());

        let _b10 = input.read_seed().unwrap().unwrap();
        assert!(input.good());

        match input.read_seed().unwrap().unwrap() {
            SeedObject::Blockette(Blockette::Unknown(u)) => {
                assert_eq!(u.btype, "999");
                assert_eq!(u.fields, "who knows");
            }
            other => panic!("expected unknown blockette, got {:?}", other),
        }
        assert!(input.state().contains(ExceptionMask::FMT));

        // the following blockette still arrives
        match input.read_seed().unwrap().unwrap() {
            SeedObject::Blockette(Blockette::B33(b)) => assert_eq!(b.description, "known"),
            other => panic!("expected blockette 33, got {:?}", other),
        }
    }

    #[test]
    fn format_error_skips_blockette_unless_elevated() {
        // blockette 33 with a non-numeric lookup code
        let blockettes = vec![b10(12), frame(33, "abcbad~"), frame(33, "  1good~")];
        let volume = control_volume(&blockettes, 4096);

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        assert_eq!(objects.len(), 2); // b10 and the good b33

        let mut settings = ReadSettings::default();
        settings.set_exceptions(ExceptionMask::FMT);
        let mut input = SeedInput::new(&volume, settings);
        let _b10 = input.read_seed().unwrap();
        assert!(input.read_seed().is_err());
    }

    #[test]
    fn bad_sequence_number_is_soft_by_default() {
        let blockettes = vec![b10(12)];
        let mut volume = control_volume(&blockettes, 4096);
        volume[0..6].copy_from_slice(b"No NUM");

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        assert_eq!(objects.len(), 1);

        let mut settings = ReadSettings::default();
        settings.set_exceptions(ExceptionMask::SEQNO);
        let mut input = SeedInput::new(&volume, settings);
        assert!(matches!(
            input.read_seed(),
            Err(seed_css_core::SeedError::Seqno { .. })
        ));
    }

    #[test]
    fn unknown_record_type_is_skipped_with_hdr_state() {
        let blockettes = vec![b10(12)];
        let mut volume = control_volume(&blockettes, 4096);
        let more = control_volume(&[frame(33, "  1later~")], 4096);
        volume.extend_from_slice(&more);
        volume[4096 + 6] = b'Z'; // corrupt the second record's type byte

        let mut input = SeedInput::new(&volume, ReadSettings::default());
        let _b10 = input.read_seed().unwrap().unwrap();
        // the bad record is skipped entirely; next object is the EOF
        assert!(input.read_seed().unwrap().is_none());
        assert!(input.state().contains(ExceptionMask::HDR));
    }
}

mod stations {
    use super::stations_helpers::*;
    use super::*;

    #[test]
    fn station_with_channel_and_response() {
        let b58 = Blockette58 {
            stage: 0,
            sensitivity: 6.28e8,
            frequency: 1.0,
            ..Blockette58::default()
        };
        let blockettes = vec![
            b10(12),
            frame(50, &b50_abkt().to_seed_string()),
            frame(52, &b52_bhz().to_seed_string()),
            frame(58, &b58.to_seed_string()),
        ];
        let volume = control_volume(&blockettes, 4096);
        let (_objects, input) = read_all(&volume, ReadSettings::default());

        assert_eq!(input.stations.len(), 1);
        let station = &input.stations[0];
        assert_eq!(station.b50.station, "ABKT");
        assert_eq!(station.channels.len(), 1);
        let chan = &station.channels[0];
        assert_eq!(chan.b52.channel, "BHZ");
        assert_eq!(chan.response.len(), 1);
        match &chan.response[0] {
            Blockette::B58(b) => assert_eq!(b.sensitivity, 6.28e8),
            other => panic!("expected blockette 58, got {:?}", other),
        }
    }

    #[test]
    fn later_station_with_same_identity_replaces() {
        let mut second = b50_abkt();
        second.name = "Replaced".to_string();
        let blockettes = vec![
            b10(12),
            frame(50, &b50_abkt().to_seed_string()),
            frame(50, &second.to_seed_string()),
        ];
        let volume = control_volume(&blockettes, 4096);
        let (_objects, input) = read_all(&volume, ReadSettings::default());
        assert_eq!(input.stations.len(), 1);
        assert_eq!(input.stations[0].b50.name, "Replaced");
    }

    #[test]
    fn b60_reference_expands_from_dictionary() {
        // dictionary blockette 43, lookup code 17
        let b43_body = format!(
            "{:4}PAZ~A{:3}{:3}{:12.5E}{:12.5E}{:3}{:3}{:12.5E}{:12.5E}{:12.5E}{:12.5E}",
            17, 4, 2, 1.0, 1.0, 0, 1, -1.0, 0.0, 0.0, 0.0
        );
        let b60_body = format!("{:2}{:2}{:2}{:4}", 1, 1, 1, 17);
        let blockettes = vec![
            b10(12),
            frame(43, &b43_body),
            frame(50, &b50_abkt().to_seed_string()),
            frame(52, &b52_bhz().to_seed_string()),
            frame(60, &b60_body),
        ];
        let volume = control_volume(&blockettes, 4096);
        let (_objects, input) = read_all(&volume, ReadSettings::default());

        let chan = &input.stations[0].channels[0];
        assert_eq!(chan.response.len(), 1);
        match &chan.response[0] {
            Blockette::B53(b53) => {
                assert!(b53.from_b43);
                assert_eq!(b53.stage, 1);
                assert_eq!(b53.pr, vec![-1.0]);
                assert_eq!(b53.transfer_type, "A");
            }
            other => panic!("expected synthesised blockette 53, got {:?}", other),
        }
    }

    #[test]
    fn new_volume_resets_stations_and_dictionary() {
        let blockettes = vec![
            b10(12),
            frame(33, "  1inst~"),
            frame(50, &b50_abkt().to_seed_string()),
            b10(12),
        ];
        let volume = control_volume(&blockettes, 4096);
        let (_objects, input) = read_all(&volume, ReadSettings::default());
        assert!(input.stations.is_empty());
        assert!(input.dictionary.get_b33(1).is_none());
    }
}

mod data {
    use super::*;

    fn lcg_samples(n: usize, range: i32) -> Vec<i32> {
        let mut state = 0x9e37_79b9u64;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            out.push(((state >> 33) as i32) % range);
        }
        out
    }

    #[test]
    fn single_steim2_little_endian_record() {
        let samples = lcg_samples(500, 1 << 20);
        let spec = RecordSpec {
            seqno: 1,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start: (2020, 100, 0, 0, 0, 0),
            nsamples: 500,
            factor: 40,
            multiplier: 1,
            format: 11,
            big_endian: false,
            reclen_exp: 12,
            payload: steim2_payload(&samples, false),
        };
        let volume = data_record(&spec, true);
        assert_eq!(volume.len(), 4096);

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 1);
        let sd = &groups[0];
        assert_eq!(sd.nsamples(), 500);
        assert_eq!(sd.samprate(), 40.0);
        let start = seed_css_core::SeedTime::parse("2020,100,00,00,00.0000", "t").unwrap();
        assert_eq!(sd.start_time(), start.epoch());
        // no station headers: no response, calib stays zero
        assert_eq!(sd.calib, 0.0);

        let mut data = vec![0f32; 500];
        let n = sd.read_data(&volume, &mut data);
        assert_eq!(n, 500);
        for (d, s) in data.iter().zip(samples.iter()) {
            assert_eq!(*d, *s as f32);
        }
    }

    #[test]
    fn contiguous_records_join() {
        let a = lcg_samples(100, 1000);
        let b = lcg_samples(100, 1000);
        let mk = |seqno, start, samples: &[i32]| RecordSpec {
            seqno,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start,
            nsamples: samples.len() as u16,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: true,
            reclen_exp: 9,
            payload: int32_payload(samples, true),
        };
        // record B starts exactly at A's end: 100 samples at 40 Hz = 2.5 s
        let mut volume = data_record(&mk(1, (2020, 100, 0, 0, 0, 0), &a), true);
        volume.extend(data_record(&mk(2, (2020, 100, 0, 0, 2, 5000), &b), true));

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 1);
        let sd = &groups[0];
        assert_eq!(sd.records.len(), 2);
        assert_eq!(sd.nsamples(), 200);

        // the continuity invariant holds between successive members
        let r0 = &sd.records[0];
        let r1 = &sd.records[1];
        let tnext = r0.header.start_time() + r0.header.nsamples as f64 / r0.samprate;
        let diff = (r1.header.start_time() - tnext).abs();
        assert!(diff <= (0.5 / r0.samprate).max(r0.header.nsamples as f64 * r0.clock_drift));

        let mut data = vec![0f32; 200];
        assert_eq!(sd.read_data(&volume, &mut data), 200);
        assert_eq!(data[99], a[99] as f32);
        assert_eq!(data[100], b[0] as f32);
    }

    #[test]
    fn gap_beyond_tolerance_splits() {
        let a = lcg_samples(100, 1000);
        let b = lcg_samples(100, 1000);
        let mk = |seqno, start, samples: &[i32]| RecordSpec {
            seqno,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start,
            nsamples: samples.len() as u16,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: true,
            reclen_exp: 9,
            payload: int32_payload(samples, true),
        };
        // A ends at 2.5 s; B starts 1.2 sample intervals late (2.53 s)
        let mut volume = data_record(&mk(1, (2020, 100, 0, 0, 0, 0), &a), true);
        volume.extend(data_record(&mk(2, (2020, 100, 0, 0, 2, 5300), &b), true));

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nsamples(), 100);
        assert_eq!(groups[1].nsamples(), 100);
    }

    #[test]
    fn raw_mode_yields_individual_records() {
        let a = lcg_samples(10, 100);
        let spec = RecordSpec {
            seqno: 1,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start: (2020, 100, 0, 0, 0, 0),
            nsamples: 10,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: true,
            reclen_exp: 9,
            payload: int32_payload(&a, true),
        };
        let mut volume = data_record(&spec, true);
        let mut second = spec;
        second.seqno = 2;
        second.nsamples = 0; // raw mode keeps even empty records
        second.payload = vec![];
        volume.extend(data_record(&second, true));

        let mut settings = ReadSettings::default();
        settings.set_mode(ReadMode::Raw);
        let (objects, _input) = read_all(&volume, settings);
        let records: Vec<_> = objects
            .into_iter()
            .filter_map(|o| match o {
                SeedObject::DataRecord(dr) => Some(dr),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].header.nsamples, 10);
        assert_eq!(records[1].header.nsamples, 0);
    }

    #[test]
    fn empty_records_dropped_in_grouped_mode() {
        let a = lcg_samples(10, 100);
        let mk = |seqno, nsamples: u16, payload: Vec<u8>| RecordSpec {
            seqno,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start: (2020, 100, 0, 0, 0, 0),
            nsamples,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: true,
            reclen_exp: 9,
            payload,
        };
        let mut volume = data_record(&mk(1, 0, vec![]), true);
        volume.extend(data_record(&mk(2, 10, int32_payload(&a, true)), true));

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].nsamples(), 10);
    }

    #[test]
    fn swapped_blockette_1000_flips_byte_order() {
        let samples = lcg_samples(20, 1000);
        let spec = RecordSpec {
            seqno: 1,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start: (2020, 100, 0, 0, 0, 0),
            nsamples: 20,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: false,
            reclen_exp: 9,
            payload: int32_payload(&samples, false),
        };
        // little-endian header with no blockette 50: the reader assumes
        // big-endian until it sees the 1000 with its bytes reversed
        let volume = data_record(&spec, false);

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 1);
        let sd = &groups[0];
        assert_eq!(sd.nsamples(), 20);
        assert_eq!(sd.samprate(), 40.0);
        assert_eq!(sd.records[0].word_order, "0123");

        let mut data = vec![0f32; 20];
        assert_eq!(sd.read_data(&volume, &mut data), 20);
        assert_eq!(data[0], samples[0] as f32);
        assert_eq!(data[19], samples[19] as f32);
    }

    #[test]
    fn velocity_response_resolves_calib() {
        use super::stations_helpers::*;

        let b58 = Blockette58 {
            stage: 0,
            sensitivity: 6.28e8,
            frequency: 1.0,
            ..Blockette58::default()
        };
        let blockettes = vec![
            b10(12),
            frame(34, &Blockette34 {
                lookup_code: 4,
                name: "M/S".to_string(),
                description: "Velocity in Meters Per Second".to_string(),
            }
            .to_seed_string()),
            frame(50, &b50_abkt().to_seed_string()),
            frame(52, &b52_bhz().to_seed_string()),
            frame(58, &b58.to_seed_string()),
        ];
        let mut volume = control_volume(&blockettes, 4096);

        let samples = lcg_samples(50, 1000);
        let spec = RecordSpec {
            seqno: 2,
            sta: "ABKT",
            loc: "",
            chan: "BHZ",
            net: "II",
            start: (2020, 100, 0, 0, 0, 0),
            nsamples: 50,
            factor: 40,
            multiplier: 1,
            format: 3,
            big_endian: true,
            reclen_exp: 9,
            payload: int32_payload(&samples, true),
        };
        volume.extend(data_record(&spec, true));

        let (objects, _input) = read_all(&volume, ReadSettings::default());
        let groups = seed_data_objects(objects);
        assert_eq!(groups.len(), 1);
        let sd = &groups[0];

        // velocity units: sensitivity converted to displacement with 2πf
        let expected = 1.0e9 / (6.28e8 * 2.0 * std::f64::consts::PI * 1.0);
        assert!((sd.calib - expected).abs() < 1e-12 * expected.abs());
        assert_eq!(sd.calper, 1.0);
        assert!(sd.channel.is_some());
        assert_eq!(sd.channel.as_ref().unwrap().b52.channel, "BHZ");
    }
}

/// Shared builders for station-level control blockettes.
mod stations_helpers {
    use super::*;

    pub fn b52_bhz() -> Blockette52 {
        Blockette52 {
            channel: "BHZ".to_string(),
            instrument: 1,
            signal_units: 4,
            calib_units: 2,
            latitude: 37.9304,
            longitude: 58.1189,
            elevation: 678.0,
            dip: -90.0,
            format_code: 1,
            reclen: 12,
            sample_rate: 40.0,
            clock_drift: 1e-4,
            channel_flags: "CG".to_string(),
            start: seed_css_core::SeedTime::parse("2020,001", "t").unwrap(),
            end: seed_css_core::SeedTime::parse("", "t").unwrap(),
            update: "N".to_string(),
            subchannel: -1,
            ..Blockette52::default()
        }
    }

    pub fn b50_abkt() -> Blockette50 {
        Blockette50 {
            station: "ABKT".to_string(),
            latitude: 37.9304,
            longitude: 58.1189,
            elevation: 678.0,
            num_channels: 1,
            name: "Alibek".to_string(),
            network_id: 1,
            start: seed_css_core::SeedTime::parse("2020,001", "t").unwrap(),
            end: seed_css_core::SeedTime::parse("", "t").unwrap(),
            update: "N".to_string(),
            network: "II".to_string(),
            ..Blockette50::default()
        }
    }
}
