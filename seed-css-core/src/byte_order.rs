//! This submodule deals with reordering multi-byte words from the byte order
//! declared by a SEED volume into the host order.
//!
//! SEED declares word order as a permutation string: "3210" is big-endian and
//! "0123" little-endian for 32-bit words, "10" and "01" for 16-bit words. The
//! digit at position `i` is the significance of the byte stored at offset `i`.
use log::warn;

/// The byte permutations for one data source.
///
/// `wo[i]` (`so[i]`) is the host byte slot that input byte `i` of a 32-bit
/// (16-bit) word must be copied into, so that reading the word natively
/// reconstructs the declared value. The permutations are built once per
/// record and applied per word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordOrder {
    pub wo: [usize; 4],
    pub so: [usize; 2],
}

impl Default for WordOrder {
    /// Big-endian input, the SEED default.
    fn default() -> Self {
        WordOrder::new("3210", "10")
    }
}

/// Significance of each host byte slot, probed by laying down the word
/// 0x03020100: slot `j` of the result holds the significance stored there.
fn host_word_order() -> [u8; 4] {
    0x0302_0100u32.to_ne_bytes()
}

fn host_short_order() -> [u8; 2] {
    0x0100u16.to_ne_bytes()
}

impl WordOrder {
    /// Build the permutations for a declared 32-bit and 16-bit order string.
    ///
    /// A declaration of the wrong length or containing unexpected digits
    /// falls back to big-endian ("3210"/"10") with a warning.
    pub fn new(word_order: &str, short_order: &str) -> Self {
        let word_order = if valid_order(word_order, 4) {
            word_order
        } else {
            warn!("invalid 32 bit word order: {:?}", word_order);
            "3210"
        };
        let short_order = if valid_order(short_order, 2) {
            short_order
        } else {
            warn!("invalid 16 bit word order: {:?}", short_order);
            "10"
        };

        let host = host_word_order();
        let mut wo = [0usize; 4];
        for (i, c) in word_order.bytes().enumerate() {
            let k = c - b'0';
            wo[i] = host.iter().position(|&h| h == k).unwrap();
        }

        let host = host_short_order();
        let mut so = [0usize; 2];
        for (i, c) in short_order.bytes().enumerate() {
            let k = c - b'0';
            so[i] = host.iter().position(|&h| h == k).unwrap();
        }

        WordOrder { wo, so }
    }

    /// Reverse both permutations. Used when a data record turns out to have
    /// been written in the opposite order to its declaration.
    pub fn flipped(order: &str) -> String {
        order.chars().rev().collect()
    }

    pub fn u32_at(&self, bytes: &[u8], at: usize) -> u32 {
        let mut b = [0u8; 4];
        for i in 0..4 {
            b[self.wo[i]] = bytes[at + i];
        }
        u32::from_ne_bytes(b)
    }

    pub fn i32_at(&self, bytes: &[u8], at: usize) -> i32 {
        self.u32_at(bytes, at) as i32
    }

    pub fn f32_at(&self, bytes: &[u8], at: usize) -> f32 {
        f32::from_bits(self.u32_at(bytes, at))
    }

    pub fn u16_at(&self, bytes: &[u8], at: usize) -> u16 {
        let mut b = [0u8; 2];
        for i in 0..2 {
            b[self.so[i]] = bytes[at + i];
        }
        u16::from_ne_bytes(b)
    }

    pub fn i16_at(&self, bytes: &[u8], at: usize) -> i16 {
        self.u16_at(bytes, at) as i16
    }
}

fn valid_order(order: &str, len: usize) -> bool {
    order.len() == len
        && (0..len).all(|d| order.bytes().any(|c| c == b'0' + d as u8))
}
