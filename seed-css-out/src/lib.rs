//! This is a library for writing CSS 3.0 flat files from parsed SEED
//! volumes. It synthesises CSS response files from the channel response
//! stages, composes the affiliation, site, sitechan, sensor, instrument and
//! wfdisc tables with stable id allocation, and optionally decodes the
//! waveforms into per-segment sample files.
//!
//! The `seedtocss` binary drives the whole conversion from the command
//! line.
extern crate chrono;
extern crate fnv;
extern crate log;
extern crate num;
extern crate seed_css_core;
extern crate seed_css_in;
#[cfg(test)]
extern crate tempfile;

pub mod convert;
pub mod response;
pub mod tables;
#[cfg(test)]
mod tests;

pub use convert::{convert_to_css, ConvertOptions, ConvertSummary};
pub use response::{a0_normalization, css_response, expand_fir};
pub use tables::{Affiliation, Instrument, Sensor, Site, Sitechan, Wfdisc};

pub use seed_css_core::errors::*;
