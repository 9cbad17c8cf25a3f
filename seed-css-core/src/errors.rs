/// Basic Error types.
#[derive(Debug)]
pub enum SeedError {
    /// A field inside a blockette cannot be parsed. Carries the blockette
    /// type and the field name, e.g. "050" / "latitude".
    Format {
        blockette: String,
        field: String,
        value: String,
    },
    /// A declared blockette length is shorter than the fields require.
    Len { blockette: String, msg: String },
    /// The 8-byte logical record control header is malformed.
    Hdr { msg: String },
    /// A decode format is unsupported or inconsistent.
    Fmt { msg: String },
    /// A logical record sequence number is not an integer.
    Seqno { msg: String },
    /// Internal marker: discard the rest of the current logical record.
    Skip { msg: String },
    /// End of the input volume. Never surfaced to callers of the framer.
    Eof,
    /// File is too short to be a SEED volume.
    FileTooShort,
    /// IoError from the std library.
    StdIoError(std::io::Error),
    /// Map file error (this is just a `std::io` error when mapping files).
    MapFile(std::io::Error),
}

impl SeedError {
    pub fn format(blockette: &str, field: &str, value: &str) -> Self {
        SeedError::Format {
            blockette: blockette.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn len(blockette: &str, msg: &str) -> Self {
        SeedError::Len {
            blockette: blockette.to_string(),
            msg: msg.to_string(),
        }
    }

    pub fn hdr(msg: String) -> Self {
        SeedError::Hdr { msg }
    }

    pub fn fmt(msg: String) -> Self {
        SeedError::Fmt { msg }
    }

    pub fn skip(msg: &str) -> Self {
        SeedError::Skip {
            msg: msg.to_string(),
        }
    }
}

impl From<std::io::Error> for SeedError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::SeedError::*;
        match self {
            Format { blockette, field, value } => {
                write!(fmt, "Cannot parse '{}' for {}.{}", value, blockette, field)
            }
            Len { blockette, msg } => write!(fmt, "Blockette {}: {}", blockette, msg),
            Hdr { msg } => write!(fmt, "Bad logical record header: {}", msg),
            Fmt { msg } => write!(fmt, "Bad format: {}", msg),
            Seqno { msg } => write!(fmt, "Bad sequence number: {}", msg),
            Skip { msg } => write!(fmt, "Skip record: {}", msg),
            Eof => write!(fmt, "EOF"),
            FileTooShort => write!(fmt, "File is too short to be SEED"),
            StdIoError(x) => write!(fmt, "{}", x),
            MapFile(e) => write!(fmt, "Could not create file map: {}", e),
        }
    }
}

impl From<SeedError> for String {
    fn from(e: SeedError) -> String {
        e.to_string()
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::SeedError::*;
        match self {
            StdIoError(x) | MapFile(x) => x.source(),
            _ => None,
        }
    }
}
