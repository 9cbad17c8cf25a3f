//! This library is the foundation for the `seed-css-in` and `seed-css-out`
//! crates. It holds the typed SEED blockette model, byte-order handling,
//! time parsing and the sample decompression routines, with no file IO of
//! its own.
//!
//! The library was designed to follow the SEED manual for versions up to
//! 2.3 (control blockettes, mini-SEED data records, Steim compression).
extern crate log;
extern crate num;
#[macro_use]
extern crate num_derive;
extern crate num_traits;

pub mod blockettes;
pub mod byte_order;
pub mod data_blockettes;
pub mod data_header;
pub mod decoders;
pub mod dictionary;
pub mod enums;
pub mod errors;
pub mod seed_time;
pub mod settings;
pub mod station;

pub use errors::SeedError;

pub use blockettes::Blockette;
pub use byte_order::WordOrder;
pub use data_blockettes::DataBlockette;
pub use data_header::DataHeader;
pub use dictionary::Dictionary;
pub use enums::DataFormat;
pub use seed_time::SeedTime;
pub use settings::{ExceptionMask, ReadMode, ReadSettings};
pub use station::{Channel, Station};

/// The 8-byte control header that starts every logical record.
pub const LOGICAL_HEADER_LEN: usize = 8;
/// The fixed section of a data record header.
pub const DATA_HEADER_LEN: usize = 48;
/// Logical record length assumed until a volume blockette declares one.
pub const DEFAULT_LRECLEN: usize = 4096;
/// One Steim compression frame: sixteen 32-bit slots.
pub const STEIM_FRAME_LEN: usize = 64;
