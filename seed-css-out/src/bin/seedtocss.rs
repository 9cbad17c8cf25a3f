//! The `seedtocss` shell: convert a SEED volume to CSS 3.0 flat files.
//!
//! ```text
//! seedtocss <seedfile> [dir=<out>] [prefix=<name>] [respdir=<dir>]
//!                      [update=(0|1|t|f)] [getdata=(0|1|t|f)]
//! ```
extern crate env_logger;
extern crate log;
extern crate seed_css_out;

use std::process::exit;

use seed_css_out::{convert_to_css, ConvertOptions};

const USAGE: &str =
    "Usage: seedtocss seed_file [dir=] [prefix=] [respdir=] [update=(1,0)] [getdata=(1,0)]";

fn truthy(v: &str) -> bool {
    matches!(v.as_bytes().first(), Some(b'1') | Some(b't') | Some(b'T'))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        exit(1);
    }
    if args.len() == 1 && args[0].contains("-version") {
        println!("seedtocss {}", env!("CARGO_PKG_VERSION"));
        exit(0);
    }

    let mut seedfile = None;
    let mut opts = ConvertOptions::default();
    // the embedding application may provide the geo-table base directory
    opts.geo_table_dir = std::env::var("GEO_TABLE_DIR").ok().filter(|s| !s.is_empty());

    for arg in &args {
        if let Some(v) = arg.strip_prefix("dir=") {
            opts.dir = v.to_string();
        } else if let Some(v) = arg.strip_prefix("prefix=") {
            opts.prefix = v.to_string();
        } else if let Some(v) = arg.strip_prefix("respdir=") {
            opts.respdir = v.to_string();
        } else if let Some(v) = arg.strip_prefix("update=") {
            opts.update = truthy(v);
        } else if let Some(v) = arg.strip_prefix("getdata=") {
            opts.getdata = truthy(v);
        } else if !arg.contains('=') {
            seedfile = Some(arg.clone());
        }
    }

    let seedfile = match seedfile {
        Some(f) => f,
        None => {
            eprintln!("{}", USAGE);
            exit(1);
        }
    };

    match convert_to_css(&seedfile, &opts) {
        Ok(summary) => {
            log::info!(
                "converted {}: {} stations, {} channels, {} segments",
                seedfile,
                summary.stations,
                summary.channels,
                summary.segments
            );
        }
        Err(e) => {
            eprintln!("seedtocss: {}", e);
            exit(1);
        }
    }
}
