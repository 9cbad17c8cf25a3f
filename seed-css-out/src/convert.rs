//! The end-to-end SEED to CSS conversion driver.
//!
//! One pass over the volume collects the continuous data groups and the
//! station headers; the station table is then mapped onto the CSS rows
//! (affiliation, site, sitechan, sensor, instrument) with response files
//! written beside them, and the groups become wfdisc rows plus per-segment
//! waveform files when data extraction is requested.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use fnv::FnvHashMap;
use log::warn;

use seed_css_core::blockettes::Blockette;
use seed_css_core::errors::SeedError;
use seed_css_core::seed_time::SeedTime;
use seed_css_core::settings::ReadSettings;
use seed_css_core::station::{Channel, Station};
use seed_css_in::{channel_calib, SeedData, SeedFile, SeedObject};

use crate::response::css_response;
use crate::tables::*;

/// Parameters of one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Output directory for the CSS tables and waveform files.
    pub dir: String,
    /// CSS file prefix: tables are written as `<prefix>.<table>`.
    pub prefix: String,
    /// Directory for the response files.
    pub respdir: String,
    /// When set, tables go to `<geo>/static` and responses to
    /// `<geo>/response`, overriding `dir` and `respdir`.
    pub geo_table_dir: Option<String>,
    /// Update merges into existing tables; otherwise they are overwritten.
    pub update: bool,
    /// Decode waveforms and write wfdisc rows.
    pub getdata: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            dir: ".".to_string(),
            prefix: "out".to_string(),
            respdir: ".".to_string(),
            geo_table_dir: None,
            update: true,
            getdata: true,
        }
    }
}

/// Row counts of a finished conversion.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConvertSummary {
    pub stations: usize,
    pub channels: usize,
    pub segments: usize,
    pub wfdisc_rows: usize,
}

/// Julian date YYYYDDD of a SEED time, -1 when unset.
fn jdate_of(t: &SeedTime) -> i64 {
    if t.is_unset() {
        -1
    } else {
        t.year as i64 * 1000 + t.doy as i64
    }
}

/// Julian date YYYYDDD of an epoch time.
fn jdate_of_epoch(epoch: f64) -> i64 {
    match chrono::DateTime::from_timestamp(epoch as i64, 0) {
        Some(d) => d.year() as i64 * 1000 + d.ordinal() as i64,
        None => -1,
    }
}

fn load_date() -> String {
    Utc::now().format("%m/%d/%y %H:%M:%S").to_string()
}

fn load_table<T>(
    path: &Path,
    parse: fn(&str) -> Result<T, SeedError>,
) -> Result<Vec<T>, SeedError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(line) {
            Ok(r) => rows.push(r),
            Err(e) => warn!("skipping bad row in {}: {}", path.display(), e),
        }
    }
    Ok(rows)
}

fn write_table(path: &Path, lines: &[String]) -> Result<(), SeedError> {
    let mut f = fs::File::create(path)?;
    for l in lines {
        writeln!(f, "{}", l)?;
    }
    Ok(())
}

/// The CSS response type of a channel: poles-and-zeros wins over FIR, FIR
/// over a frequency/amplitude/phase list.
fn response_type(channel: &Channel) -> &'static str {
    let mut has_fir = false;
    let mut has_fap = false;
    for b in &channel.response {
        match b {
            Blockette::B53(_) => return "paz",
            Blockette::B54(_) | Blockette::B61(_) => has_fir = true,
            Blockette::B55(_) => has_fap = true,
            _ => {}
        }
    }
    if has_fir {
        "fir"
    } else if has_fap {
        "fap"
    } else {
        "-"
    }
}

/// A stable response file name derived from the channel identity and epoch,
/// so reruns produce identical paths.
fn response_file_name(station: &Station, channel: &Channel) -> String {
    let ondate = jdate_of(&channel.b52.start);
    if channel.b52.location.is_empty() {
        format!(
            "{}.{}.{}.{}",
            station.b50.network, station.b50.station, channel.b52.channel, ondate
        )
    } else {
        format!(
            "{}.{}.{}.{}.{}",
            station.b50.network,
            station.b50.station,
            channel.b52.location,
            channel.b52.channel,
            ondate
        )
    }
}

/// Convert one SEED volume to CSS flat files.
///
/// Any IO failure aborts the conversion with partial outputs left in place;
/// parse failures inside blockettes follow the framer's exception mask.
pub fn convert_to_css(seedfile: &str, opts: &ConvertOptions) -> Result<ConvertSummary, SeedError> {
    let (dir, respdir) = match &opts.geo_table_dir {
        Some(geo) => (
            format!("{}/static", geo),
            format!("{}/response", geo),
        ),
        None => (opts.dir.clone(), opts.respdir.clone()),
    };
    fs::create_dir_all(&dir)?;
    fs::create_dir_all(&respdir)?;
    let dir = PathBuf::from(dir);

    // single pass: collect continuous groups, then take the station table
    let file = SeedFile::open(seedfile, ReadSettings::default())?;
    let mut input = file.input();
    let mut segments: Vec<SeedData> = Vec::new();
    while let Some(o) = input.read_seed()? {
        if let SeedObject::SeedData(sd) = o {
            segments.push(sd);
        }
    }
    let stations = &input.stations;
    let dictionary = &input.dictionary;

    let lddate = load_date();
    let table = |name: &str| dir.join(format!("{}.{}", opts.prefix, name));
    let mut summary = ConvertSummary {
        stations: stations.len(),
        segments: segments.len(),
        ..ConvertSummary::default()
    };

    // affiliation: one row per station, earliest insertion first
    let mut affiliations = if opts.update {
        load_table(&table("affiliation"), Affiliation::from_line)?
    } else {
        Vec::new()
    };
    for st in stations {
        let row = Affiliation {
            net: st.b50.network.clone(),
            sta: st.b50.station.clone(),
            lddate: lddate.clone(),
        };
        if !affiliations.iter().any(|a| a.key() == row.key()) {
            affiliations.push(row);
        }
    }

    // site: one row per (station, ondate)
    let mut sites = if opts.update {
        load_table(&table("site"), Site::from_line)?
    } else {
        Vec::new()
    };
    for st in stations {
        let row = Site {
            sta: st.b50.station.clone(),
            ondate: jdate_of(&st.b50.start),
            offdate: jdate_of(&st.b50.end),
            lat: st.b50.latitude,
            lon: st.b50.longitude,
            elev: st.b50.elevation / 1000.,
            staname: st.b50.name.clone(),
            statype: "-".to_string(),
            refsta: st.b50.station.clone(),
            dnorth: 0.,
            deast: 0.,
            lddate: lddate.clone(),
        };
        if !sites.iter().any(|s| s.key() == row.key()) {
            sites.push(row);
        }
    }

    // sitechan: chanid continues from the maximum already on disk
    let mut sitechans = if opts.update {
        load_table(&table("sitechan"), Sitechan::from_line)?
    } else {
        Vec::new()
    };
    let mut max_chanid = sitechans.iter().map(|s| s.chanid).max().unwrap_or(0);
    let mut chanids: FnvHashMap<(String, String, i64), i64> = FnvHashMap::default();
    for s in &sitechans {
        chanids.insert(s.key(), s.chanid);
    }
    for st in stations {
        for ch in &st.channels {
            summary.channels += 1;
            let key = (
                st.b50.station.clone(),
                ch.b52.channel.clone(),
                jdate_of(&ch.b52.start),
            );
            if chanids.contains_key(&key) {
                continue;
            }
            max_chanid += 1;
            chanids.insert(key, max_chanid);
            log::debug!("sitechan {} for channel {}", max_chanid, ch.b52);
            let descrip = dictionary
                .get_b33(ch.b52.instrument)
                .map(|b| b.description.clone())
                .unwrap_or_default();
            sitechans.push(Sitechan {
                sta: st.b50.station.clone(),
                chan: ch.b52.channel.clone(),
                ondate: jdate_of(&ch.b52.start),
                chanid: max_chanid,
                offdate: jdate_of(&ch.b52.end),
                ctype: "n".to_string(),
                edepth: ch.b52.local_depth / 1000.,
                hang: ch.b52.azimuth,
                // CSS measures the vertical angle from vertical; SEED dip is
                // from horizontal with -90 pointing up
                vang: 90. + ch.b52.dip,
                descrip,
                lddate: lddate.clone(),
            });
        }
    }

    // instrument: one row per distinct response, with the response file
    // written under a stable name
    let mut instruments = if opts.update {
        load_table(&table("instrument"), Instrument::from_line)?
    } else {
        Vec::new()
    };
    let mut max_inid = instruments.iter().map(|i| i.inid).max().unwrap_or(0);
    let mut inids: FnvHashMap<String, i64> = FnvHashMap::default();
    for i in &instruments {
        inids.insert(i.dfile.clone(), i.inid);
    }
    for st in stations {
        for ch in &st.channels {
            if ch.response.is_empty() {
                continue;
            }
            let dfile = response_file_name(st, ch);
            if inids.contains_key(&dfile) {
                continue;
            }
            max_inid += 1;
            inids.insert(dfile.clone(), max_inid);

            let resp = css_response(st, ch, dictionary);
            fs::write(Path::new(&respdir).join(&dfile), resp)?;

            let insname = dictionary
                .get_b33(ch.b52.instrument)
                .map(|b| b.description.clone())
                .unwrap_or_else(|| "-".to_string());
            let instype: String = insname.chars().take(6).collect::<String>().trim().to_string();
            let (ncalib, ncalper) = channel_calib(ch, dictionary).unwrap_or((0., -1.));
            instruments.push(Instrument {
                inid: max_inid,
                insname,
                instype,
                band: "-".to_string(),
                digital: "d".to_string(),
                samprate: ch.b52.sample_rate,
                ncalib,
                ncalper,
                dir: respdir.clone(),
                dfile,
                rsptype: response_type(ch).to_string(),
                lddate: lddate.clone(),
            });
        }
    }

    // sensor: joins chanid and inid over the channel epoch
    let mut sensors = if opts.update {
        load_table(&table("sensor"), Sensor::from_line)?
    } else {
        Vec::new()
    };
    for st in stations {
        for ch in &st.channels {
            let time = ch.b52.start.epoch();
            let endtime = if ch.b52.end.is_unset() {
                ENDTIME_NULL
            } else {
                ch.b52.end.epoch()
            };
            let key = (
                st.b50.station.clone(),
                ch.b52.channel.clone(),
                (time * 1000.) as i64,
                (endtime * 1000.) as i64,
            );
            if sensors.iter().any(|s| s.key() == key) {
                continue;
            }
            let chan_key = (
                st.b50.station.clone(),
                ch.b52.channel.clone(),
                jdate_of(&ch.b52.start),
            );
            let (_, calper) = channel_calib(ch, dictionary).unwrap_or((0., -1.));
            sensors.push(Sensor {
                sta: st.b50.station.clone(),
                chan: ch.b52.channel.clone(),
                time,
                endtime,
                inid: *inids.get(&response_file_name(st, ch)).unwrap_or(&-1),
                chanid: *chanids.get(&chan_key).unwrap_or(&-1),
                jdate: jdate_of(&ch.b52.start),
                calratio: 1.,
                calper,
                tshift: 0.,
                instant: "y".to_string(),
                lddate: lddate.clone(),
            });
        }
    }

    // wfdisc plus one waveform file per segment
    let mut wfdiscs = if opts.update && opts.getdata {
        load_table(&table("wfdisc"), Wfdisc::from_line)?
    } else {
        Vec::new()
    };
    if opts.getdata {
        let mut max_wfid = wfdiscs.iter().map(|w| w.wfid).max().unwrap_or(0);
        for sd in &segments {
            let r = match sd.records.first() {
                Some(r) => r,
                None => continue,
            };
            let nsamp = sd.nsamples();
            let exists = wfdiscs.iter().any(|w| {
                w.sta == r.header.station
                    && w.chan == r.header.channel
                    && (w.time - sd.start_time()).abs() < 1e-3
                    && w.nsamp == nsamp as i64
            });
            if exists {
                continue;
            }
            max_wfid += 1;
            let mut data = vec![0f32; nsamp];
            let n = sd.read_data(file.bytes(), &mut data);
            if n != nsamp {
                warn!(
                    "segment {}/{}: decoded {} of {} samples",
                    r.header.station, r.header.channel, n, nsamp
                );
            }

            let dfile = format!("{}.{}.{}.w", r.header.station, r.header.channel, max_wfid);
            let mut f = fs::File::create(dir.join(&dfile))?;
            for v in &data {
                f.write_all(&v.to_ne_bytes())?;
            }

            let chan_key = sd.channel.as_ref().map(|c| {
                (
                    r.header.station.clone(),
                    c.b52.channel.clone(),
                    jdate_of(&c.b52.start),
                )
            });
            wfdiscs.push(Wfdisc {
                sta: r.header.station.clone(),
                chan: r.header.channel.clone(),
                time: sd.start_time(),
                wfid: max_wfid,
                chanid: chan_key
                    .and_then(|k| chanids.get(&k).copied())
                    .unwrap_or(-1),
                jdate: jdate_of_epoch(sd.start_time()),
                endtime: sd.end_time(),
                nsamp: nsamp as i64,
                samprate: sd.samprate(),
                calib: sd.calib,
                calper: if sd.calper > 0. { sd.calper } else { -1. },
                instype: "-".to_string(),
                segtype: "o".to_string(),
                datatype: host_float_datatype().to_string(),
                clip: "-".to_string(),
                dir: dir.to_string_lossy().to_string(),
                dfile,
                foff: 0,
                commid: -1,
                lddate: lddate.clone(),
            });
        }
        summary.wfdisc_rows = wfdiscs.len();
    }

    write_table(
        &table("affiliation"),
        &affiliations.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
    )?;
    write_table(
        &table("site"),
        &sites.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
    )?;
    write_table(
        &table("sitechan"),
        &sitechans.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
    )?;
    write_table(
        &table("sensor"),
        &sensors.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
    )?;
    write_table(
        &table("instrument"),
        &instruments.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
    )?;
    if opts.getdata {
        write_table(
            &table("wfdisc"),
            &wfdiscs.iter().map(|r| r.to_line()).collect::<Vec<_>>(),
        )?;
    }

    Ok(summary)
}
