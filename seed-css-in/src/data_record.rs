//! One data record: fixed header, chained data blockettes and the location
//! of its compressed sample payload.
use seed_css_core::byte_order::WordOrder;
use seed_css_core::data_blockettes::DataBlockette;
use seed_css_core::data_header::DataHeader;
use seed_css_core::enums::DataFormat;
use seed_css_core::errors::SeedError;

/// A parsed data record.
///
/// The sample payload is not held here; `data_file_offset`/`data_length`
/// locate the compressed bytes in the source volume, and they stay
/// compressed until a consumer asks for decoded samples.
#[derive(Debug, Clone)]
pub struct DataRecord {
    /// 32 bit word order, from blockette 50 or 1000.
    pub word_order: String,
    /// 16 bit word order, from blockette 50 or 1000.
    pub short_order: String,
    /// Permutations built from the declared orders; kept on the record so
    /// decoding never rederives them per sample.
    pub order: WordOrder,
    /// Data record length, from blockette 1000.
    pub reclen: usize,
    pub header: DataHeader,
    pub blockettes: Vec<DataBlockette>,
    /// Byte offset of this record in the source.
    pub record_offset: usize,
    /// Byte offset of the compressed payload in the source.
    pub data_file_offset: usize,
    /// Number of bytes of compressed payload.
    pub data_length: usize,
    /// Sample rate from the header, or from a Blockette 100 override.
    pub samprate: f64,
    /// Payload encoding from Blockette 1000, or derived from Blockette 30.
    pub format: DataFormat,
    /// From Blockette 52, defaulting to 0.0001 s per sample.
    pub clock_drift: f64,
}

impl DataRecord {
    /// Parse the 40-byte header body under the declared byte orders.
    pub fn new(
        header_bytes: &[u8],
        word_order: &str,
        short_order: &str,
    ) -> Result<Self, SeedError> {
        let order = WordOrder::new(word_order, short_order);
        let header = DataHeader::parse(header_bytes, &order)?;
        let samprate = header.sample_rate();
        Ok(DataRecord {
            word_order: word_order.to_string(),
            short_order: short_order.to_string(),
            order,
            reclen: 0,
            header,
            blockettes: Vec::new(),
            record_offset: 0,
            data_file_offset: 0,
            data_length: 0,
            samprate,
            format: DataFormat::Steim2,
            clock_drift: 0.0001,
        })
    }

    /// Re-parse the header after the true byte order turned out to be the
    /// reverse of the declared one (swapped Blockette 1000 detection).
    pub fn reset_word_order(
        &mut self,
        header_bytes: &[u8],
        word_order: &str,
        short_order: &str,
    ) -> Result<(), SeedError> {
        let seqno = self.header.seqno;
        let dhqual = self.header.dhqual;
        self.word_order = word_order.to_string();
        self.short_order = short_order.to_string();
        self.order = WordOrder::new(word_order, short_order);
        self.header = DataHeader::parse(header_bytes, &self.order)?;
        self.header.seqno = seqno;
        self.header.dhqual = dhqual;
        self.samprate = self.header.sample_rate();
        Ok(())
    }

    pub fn b1000(&self) -> Option<&seed_css_core::data_blockettes::Blockette1000> {
        self.blockettes.iter().find_map(|b| b.as_b1000())
    }
}

impl std::fmt::Display for DataRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.header.station,
            self.header.location,
            self.header.channel,
            self.header.start_time,
            self.header.nsamples,
        )
    }
}
