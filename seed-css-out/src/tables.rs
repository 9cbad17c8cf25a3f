//! CSS 3.0 relational rows and their fixed-width external representation.
//!
//! Each row type renders to one fixed-width line (single-space separated
//! columns) and parses back from the same layout, so tables written here can
//! be reloaded in update mode. Null conventions follow CSS 3.0: -1 for
//! absent ids and dates, 9999999999.999 for an open end time.
use seed_css_core::errors::SeedError;

/// Open-ended endtime value.
pub const ENDTIME_NULL: f64 = 9999999999.999;

/// A cursor over one fixed-width table line.
struct Cols<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cols<'a> {
    fn new(line: &'a str) -> Self {
        Cols { line, pos: 0 }
    }

    fn take(&mut self, width: usize) -> Result<&'a str, SeedError> {
        if self.pos > self.line.len() {
            return Err(SeedError::fmt("short table line".to_string()));
        }
        let end = (self.pos + width).min(self.line.len());
        let s = self
            .line
            .get(self.pos..end)
            .ok_or_else(|| SeedError::fmt("bad table line".to_string()))?;
        self.pos = end + 1; // the separating space
        Ok(s)
    }

    fn string(&mut self, width: usize) -> Result<String, SeedError> {
        Ok(self.take(width)?.trim().to_string())
    }

    fn int(&mut self, width: usize, field: &str) -> Result<i64, SeedError> {
        let s = self.take(width)?;
        s.trim()
            .parse()
            .map_err(|_| SeedError::format("css", field, s))
    }

    fn float(&mut self, width: usize, field: &str) -> Result<f64, SeedError> {
        let s = self.take(width)?;
        s.trim()
            .parse()
            .map_err(|_| SeedError::format("css", field, s))
    }
}

/// Network membership of a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Affiliation {
    pub net: String,
    pub sta: String,
    pub lddate: String,
}

impl Affiliation {
    pub fn to_line(&self) -> String {
        format!("{:<8} {:<6} {:<17}", self.net, self.sta, self.lddate)
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Affiliation {
            net: c.string(8)?,
            sta: c.string(6)?,
            lddate: c.string(17)?,
        })
    }

    /// Identity for de-duplication in update mode.
    pub fn key(&self) -> (String, String) {
        (self.net.clone(), self.sta.clone())
    }
}

/// A station location epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub sta: String,
    pub ondate: i64,
    pub offdate: i64,
    pub lat: f64,
    pub lon: f64,
    /// Elevation, km.
    pub elev: f64,
    pub staname: String,
    pub statype: String,
    pub refsta: String,
    pub dnorth: f64,
    pub deast: f64,
    pub lddate: String,
}

impl Site {
    pub fn to_line(&self) -> String {
        format!(
            "{:<6} {:8} {:8} {:9.4} {:9.4} {:9.4} {:<50} {:<4} {:<6} {:9.4} {:9.4} {:<17}",
            self.sta,
            self.ondate,
            self.offdate,
            self.lat,
            self.lon,
            self.elev,
            self.staname,
            self.statype,
            self.refsta,
            self.dnorth,
            self.deast,
            self.lddate,
        )
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Site {
            sta: c.string(6)?,
            ondate: c.int(8, "site.ondate")?,
            offdate: c.int(8, "site.offdate")?,
            lat: c.float(9, "site.lat")?,
            lon: c.float(9, "site.lon")?,
            elev: c.float(9, "site.elev")?,
            staname: c.string(50)?,
            statype: c.string(4)?,
            refsta: c.string(6)?,
            dnorth: c.float(9, "site.dnorth")?,
            deast: c.float(9, "site.deast")?,
            lddate: c.string(17)?,
        })
    }

    pub fn key(&self) -> (String, i64) {
        (self.sta.clone(), self.ondate)
    }
}

/// A channel epoch with its orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sitechan {
    pub sta: String,
    pub chan: String,
    pub ondate: i64,
    pub chanid: i64,
    pub offdate: i64,
    pub ctype: String,
    /// Emplacement depth, km.
    pub edepth: f64,
    /// Horizontal angle, degrees clockwise from north.
    pub hang: f64,
    /// Vertical angle, degrees from vertical.
    pub vang: f64,
    pub descrip: String,
    pub lddate: String,
}

impl Sitechan {
    pub fn to_line(&self) -> String {
        format!(
            "{:<6} {:<8} {:8} {:8} {:8} {:<4} {:9.4} {:6.1} {:6.1} {:<50} {:<17}",
            self.sta,
            self.chan,
            self.ondate,
            self.chanid,
            self.offdate,
            self.ctype,
            self.edepth,
            self.hang,
            self.vang,
            self.descrip,
            self.lddate,
        )
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Sitechan {
            sta: c.string(6)?,
            chan: c.string(8)?,
            ondate: c.int(8, "sitechan.ondate")?,
            chanid: c.int(8, "sitechan.chanid")?,
            offdate: c.int(8, "sitechan.offdate")?,
            ctype: c.string(4)?,
            edepth: c.float(9, "sitechan.edepth")?,
            hang: c.float(6, "sitechan.hang")?,
            vang: c.float(6, "sitechan.vang")?,
            descrip: c.string(50)?,
            lddate: c.string(17)?,
        })
    }

    pub fn key(&self) -> (String, String, i64) {
        (self.sta.clone(), self.chan.clone(), self.ondate)
    }
}

/// The instrument deployed on a channel over a time interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub sta: String,
    pub chan: String,
    pub time: f64,
    pub endtime: f64,
    pub inid: i64,
    pub chanid: i64,
    pub jdate: i64,
    pub calratio: f64,
    pub calper: f64,
    pub tshift: f64,
    pub instant: String,
    pub lddate: String,
}

impl Sensor {
    pub fn to_line(&self) -> String {
        format!(
            "{:<6} {:<8} {:17.5} {:17.5} {:8} {:8} {:8} {:16.6} {:16.6} {:6.2} {:<1} {:<17}",
            self.sta,
            self.chan,
            self.time,
            self.endtime,
            self.inid,
            self.chanid,
            self.jdate,
            self.calratio,
            self.calper,
            self.tshift,
            self.instant,
            self.lddate,
        )
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Sensor {
            sta: c.string(6)?,
            chan: c.string(8)?,
            time: c.float(17, "sensor.time")?,
            endtime: c.float(17, "sensor.endtime")?,
            inid: c.int(8, "sensor.inid")?,
            chanid: c.int(8, "sensor.chanid")?,
            jdate: c.int(8, "sensor.jdate")?,
            calratio: c.float(16, "sensor.calratio")?,
            calper: c.float(16, "sensor.calper")?,
            tshift: c.float(6, "sensor.tshift")?,
            instant: c.string(1)?,
            lddate: c.string(17)?,
        })
    }

    pub fn key(&self) -> (String, String, i64, i64) {
        (
            self.sta.clone(),
            self.chan.clone(),
            (self.time * 1000.) as i64,
            (self.endtime * 1000.) as i64,
        )
    }
}

/// One distinct instrument response.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub inid: i64,
    pub insname: String,
    pub instype: String,
    pub band: String,
    pub digital: String,
    pub samprate: f64,
    /// Nominal calibration, nm/count.
    pub ncalib: f64,
    pub ncalper: f64,
    pub dir: String,
    pub dfile: String,
    pub rsptype: String,
    pub lddate: String,
}

impl Instrument {
    pub fn to_line(&self) -> String {
        format!(
            "{:8} {:<50} {:<6} {:<1} {:<1} {:11.7} {:16.6} {:16.6} {:<64} {:<32} {:<6} {:<17}",
            self.inid,
            self.insname,
            self.instype,
            self.band,
            self.digital,
            self.samprate,
            self.ncalib,
            self.ncalper,
            self.dir,
            self.dfile,
            self.rsptype,
            self.lddate,
        )
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Instrument {
            inid: c.int(8, "instrument.inid")?,
            insname: c.string(50)?,
            instype: c.string(6)?,
            band: c.string(1)?,
            digital: c.string(1)?,
            samprate: c.float(11, "instrument.samprate")?,
            ncalib: c.float(16, "instrument.ncalib")?,
            ncalper: c.float(16, "instrument.ncalper")?,
            dir: c.string(64)?,
            dfile: c.string(32)?,
            rsptype: c.string(6)?,
            lddate: c.string(17)?,
        })
    }
}

/// Locator of one waveform segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Wfdisc {
    pub sta: String,
    pub chan: String,
    pub time: f64,
    pub wfid: i64,
    pub chanid: i64,
    pub jdate: i64,
    pub endtime: f64,
    pub nsamp: i64,
    pub samprate: f64,
    pub calib: f64,
    pub calper: f64,
    pub instype: String,
    pub segtype: String,
    /// "t4" IEEE float big-endian, "f4" IEEE float little-endian.
    pub datatype: String,
    pub clip: String,
    pub dir: String,
    pub dfile: String,
    pub foff: i64,
    pub commid: i64,
    pub lddate: String,
}

impl Wfdisc {
    pub fn to_line(&self) -> String {
        format!(
            "{:<6} {:<8} {:17.5} {:8} {:8} {:8} {:17.5} {:8} {:11.7} {:16.6} {:16.6} {:<6} {:<1} {:<2} {:<1} {:<64} {:<32} {:10} {:8} {:<17}",
            self.sta,
            self.chan,
            self.time,
            self.wfid,
            self.chanid,
            self.jdate,
            self.endtime,
            self.nsamp,
            self.samprate,
            self.calib,
            self.calper,
            self.instype,
            self.segtype,
            self.datatype,
            self.clip,
            self.dir,
            self.dfile,
            self.foff,
            self.commid,
            self.lddate,
        )
    }

    pub fn from_line(line: &str) -> Result<Self, SeedError> {
        let mut c = Cols::new(line);
        Ok(Wfdisc {
            sta: c.string(6)?,
            chan: c.string(8)?,
            time: c.float(17, "wfdisc.time")?,
            wfid: c.int(8, "wfdisc.wfid")?,
            chanid: c.int(8, "wfdisc.chanid")?,
            jdate: c.int(8, "wfdisc.jdate")?,
            endtime: c.float(17, "wfdisc.endtime")?,
            nsamp: c.int(8, "wfdisc.nsamp")?,
            samprate: c.float(11, "wfdisc.samprate")?,
            calib: c.float(16, "wfdisc.calib")?,
            calper: c.float(16, "wfdisc.calper")?,
            instype: c.string(6)?,
            segtype: c.string(1)?,
            datatype: c.string(2)?,
            clip: c.string(1)?,
            dir: c.string(64)?,
            dfile: c.string(32)?,
            foff: c.int(10, "wfdisc.foff")?,
            commid: c.int(8, "wfdisc.commid")?,
            lddate: c.string(17)?,
        })
    }
}

/// The wfdisc datatype for host-order IEEE float samples.
pub fn host_float_datatype() -> &'static str {
    if cfg!(target_endian = "big") {
        "t4"
    } else {
        "f4"
    }
}
