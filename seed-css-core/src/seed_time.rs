//! Time values parsed from a SEED volume.
//!
//! Times appear in two encodings: the ASCII form `YYYY,DDD,HH,MM,SS.FFFF`
//! inside control blockettes, and the 10-byte binary BTIME inside data
//! headers and data blockettes.
use crate::byte_order::WordOrder;
use crate::errors::SeedError;

/// A time value parsed from a SEED volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedTime {
    pub year: i32,
    /// Day of year, 1..=366.
    pub doy: i32,
    pub hour: i32,
    pub minute: i32,
    pub seconds: f64,
}

impl Default for SeedTime {
    /// 0000,001,00,00,00.0000
    fn default() -> Self {
        SeedTime {
            year: 0,
            doy: 1,
            hour: 0,
            minute: 0,
            seconds: 0.,
        }
    }
}

fn is_leap_year(yr: i32) -> bool {
    yr % 4 == 0 && (yr % 100 != 0 || yr % 400 == 0)
}

impl SeedTime {
    /// Parse the ASCII form `YYYY,DDD,HH,MM,SS.FFFF`.
    ///
    /// An empty string is accepted (station off-dates can be empty) as are
    /// truncated forms: date only, date plus hour, and so on. A comma is
    /// tolerated in place of the decimal point in the seconds field.
    /// `name` identifies the containing blockette field in errors.
    pub fn parse(s: &str, name: &str) -> Result<Self, SeedError> {
        let mut t = SeedTime {
            doy: 0,
            ..SeedTime::default()
        };
        let n = s.len();

        if n == 0 {
            return Ok(t);
        }
        if n < 4 || !s.is_ascii() {
            return Err(SeedError::format("time", name, s));
        }

        let field = |sub: &str| -> Result<i32, SeedError> {
            sub.trim()
                .parse::<i32>()
                .map_err(|_| SeedError::format("time", name, s))
        };

        t.year = field(&s[0..4])?;
        if n >= 8 {
            t.doy = field(&s[5..8])?;
        }
        if n >= 11 {
            t.hour = field(&s[9..11])?;
        }
        if n >= 14 {
            t.minute = field(&s[12..14])?;
        }
        if n >= 17 {
            // allow ',' instead of '.'
            let mut sec = s[15..].to_string();
            if sec.as_bytes().get(2) == Some(&b',') {
                sec.replace_range(2..3, ".");
            }
            t.seconds = sec
                .trim()
                .parse::<f64>()
                .map_err(|_| SeedError::format("time", name, s))?;
        }
        Ok(t)
    }

    /// Parse the 10-byte binary BTIME: 2-byte year, 2-byte day of year,
    /// one byte each of hour/minute/second, one unused byte, and a 2-byte
    /// count of 0.0001-second ticks folded into `seconds`.
    pub fn parse_btime(bytes: &[u8], order: &WordOrder) -> Result<Self, SeedError> {
        if bytes.len() < 10 {
            return Err(SeedError::format("time", "btime", "short time bytes"));
        }
        let frac = order.u16_at(bytes, 8);
        Ok(SeedTime {
            year: order.u16_at(bytes, 0) as i32,
            doy: order.u16_at(bytes, 2) as i32,
            hour: bytes[4] as i32,
            minute: bytes[5] as i32,
            seconds: bytes[6] as f64 + frac as f64 / 10000.,
        })
    }

    /// UTC seconds since 1970-01-01, walking years additively.
    pub fn epoch(&self) -> f64 {
        let mut days = 0.0f64;
        if self.year > 1970 {
            let mut yr = self.year - 1;
            while yr >= 1970 {
                days += if is_leap_year(yr) { 366. } else { 365. };
                yr -= 1;
            }
        } else if self.year < 1970 {
            let mut yr = self.year;
            while yr < 1970 {
                days -= if is_leap_year(yr) { 366. } else { 365. };
                yr += 1;
            }
        }
        (days + (self.doy - 1) as f64) * 86400.
            + 3600. * self.hour as f64
            + 60. * self.minute as f64
            + self.seconds
    }

    /// True when no date was ever set (e.g. an empty station off-date).
    pub fn is_unset(&self) -> bool {
        self.year == 0
    }
}

impl std::fmt::Display for SeedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}/{:03} {:02}:{:02}:{:7.4}",
            self.year, self.doy, self.hour, self.minute, self.seconds
        )
    }
}
