//! SEED sample payload decompression.
//!
//! All decoders are pure functions over `(bytes, byte order, nsamples)`
//! writing host-order samples into a caller-provided buffer and returning
//! the number actually decoded.
//!
//! Steim-1 and Steim-2 payloads are sequences of 64-byte frames of sixteen
//! 32-bit slots. Slot 0 is a control word whose sixteen two-bit nibbles
//! classify each slot; frame 0 slots 1 and 2 carry the absolute initial and
//! final sample values. The decoders accumulate differences onto a running
//! last value seeded from `initial - first_difference`.
use log::warn;

use crate::byte_order::WordOrder;
use crate::enums::DataFormat;

/// Decode any supported format into floats. Returns the decoded count; a
/// shortfall against `nsamples` has already been zero-filled and warned
/// about by the Steim decoders.
pub fn decode(
    format: DataFormat,
    bytes: &[u8],
    order: &WordOrder,
    nsamples: usize,
    data: &mut [f32],
) -> usize {
    match format {
        DataFormat::Float32 => fdata32(bytes, order, nsamples, data),
        DataFormat::Steim1 => steim1(bytes, order, nsamples, data),
        DataFormat::Steim2 => steim2(bytes, order, nsamples, data),
        DataFormat::Int16 | DataFormat::Int24 | DataFormat::Int32 => {
            let mut idata = vec![0i32; nsamples];
            let n = decode_ints(format, bytes, order, nsamples, &mut idata);
            for (d, i) in data.iter_mut().zip(idata.iter()) {
                *d = *i as f32;
            }
            n
        }
    }
}

/// Decode any supported format into integers.
pub fn decode_ints(
    format: DataFormat,
    bytes: &[u8],
    order: &WordOrder,
    nsamples: usize,
    data: &mut [i32],
) -> usize {
    match format {
        DataFormat::Int16 => data16(bytes, order, nsamples, data),
        DataFormat::Int24 => data24(bytes, order, nsamples, data),
        DataFormat::Int32 => data32(bytes, order, nsamples, data),
        DataFormat::Float32 | DataFormat::Steim1 | DataFormat::Steim2 => {
            let mut fdata = vec![0f32; nsamples];
            let n = decode(format, bytes, order, nsamples, &mut fdata);
            for (d, f) in data.iter_mut().zip(fdata.iter()) {
                *d = *f as i32;
            }
            n
        }
    }
}

/// The per-slot two-bit classes of one control word, most significant slot
/// first, so `flags[j]` classifies slot `j`.
fn control_flags(word: u32) -> [u8; 16] {
    let mut flags = [0u8; 16];
    for j in 0..16 {
        flags[15 - j] = ((word >> (2 * j)) & 3) as u8;
    }
    flags
}

/// Decompress a Steim-1 payload.
pub fn steim1(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [f32]) -> usize {
    let num_frames = bytes.len() / 64;
    if num_frames == 0 {
        return 0;
    }
    let initial_value = order.i32_at(bytes, 4);

    let mut last_value = 0f64;
    let mut first = true;
    let mut counter = 0usize;

    let mut push = |diff: i32, counter: &mut usize| {
        if first {
            last_value = (initial_value - diff) as f64;
            first = false;
        }
        let sample = diff as f64 + last_value;
        if *counter < nsamples {
            data[*counter] = sample as f32;
        }
        last_value = sample;
        *counter += 1;
    };

    for i in 0..num_frames {
        let frame = &bytes[i * 64..(i + 1) * 64];
        let flags = control_flags(order.u32_at(frame, 0));

        for j in 1..16 {
            if i == 0 && j < 3 {
                // frame 0 slots 1 and 2 hold the absolute values
                continue;
            }
            let at = j * 4;
            match flags[j] {
                // four 8-bit differences
                1 => {
                    for k in 0..4 {
                        push(frame[at + k] as i8 as i32, &mut counter);
                    }
                }
                // two 16-bit differences
                2 => {
                    for k in 0..2 {
                        push(order.i16_at(frame, at + k * 2) as i32, &mut counter);
                    }
                }
                // one 32-bit difference
                3 => {
                    push(order.i32_at(frame, at), &mut counter);
                }
                // 0: no data
                _ => {}
            }
        }
    }

    for d in data.iter_mut().take(nsamples).skip(counter) {
        *d = 0.;
    }
    if counter < nsamples {
        warn!(
            "steim1 decompress sample count error: {} of {}",
            counter, nsamples
        );
    }
    counter
}

/// Decompress a Steim-2 payload.
///
/// Same framing as Steim-1; the two high bits of each data slot further
/// subdivide its 30 low bits into the packings listed in the match arms.
pub fn steim2(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [f32]) -> usize {
    let num_frames = bytes.len() / 64;
    if num_frames == 0 {
        return 0;
    }
    let initial_value = order.i32_at(bytes, 4);

    let mut last_value = 0f64;
    let mut first = true;
    let mut counter = 0usize;

    let mut push = |diff: i32, counter: &mut usize| {
        if first {
            last_value = (initial_value - diff) as f64;
            first = false;
        }
        let sample = diff as f64 + last_value;
        if *counter < nsamples {
            data[*counter] = sample as f32;
        }
        last_value = sample;
        *counter += 1;
    };

    for i in 0..num_frames {
        let frame = &bytes[i * 64..(i + 1) * 64];
        let flags = control_flags(order.u32_at(frame, 0));

        for j in 1..16 {
            if i == 0 && j < 3 {
                // frame 0 slots 1 and 2 hold the absolute values
                continue;
            }
            let word = order.i32_at(frame, j * 4);
            match flags[j] {
                // four 8-bit differences
                1 => {
                    let at = j * 4;
                    for k in 0..4 {
                        push(frame[at + k] as i8 as i32, &mut counter);
                    }
                }
                // dnib-selected 30, 15 or 10 bit differences
                2 => {
                    let dnib = (word >> 30) & 3;
                    match dnib {
                        1 => push((word << 2) >> 2, &mut counter),
                        2 => {
                            let mut ci = word << 2;
                            for _ in 0..2 {
                                push(ci >> 17, &mut counter);
                                ci <<= 15;
                            }
                        }
                        3 => {
                            let mut ci = word << 2;
                            for _ in 0..3 {
                                push(ci >> 22, &mut counter);
                                ci <<= 10;
                            }
                        }
                        _ => {}
                    }
                }
                // dnib-selected 6, 5 or 4 bit differences
                3 => {
                    let dnib = (word >> 30) & 3;
                    match dnib {
                        0 => {
                            let mut ci = word << 2;
                            for _ in 0..5 {
                                push(ci >> 26, &mut counter);
                                ci <<= 6;
                            }
                        }
                        1 => {
                            let mut ci = word << 2;
                            for _ in 0..6 {
                                push(ci >> 27, &mut counter);
                                ci <<= 5;
                            }
                        }
                        2 => {
                            let mut ci = word << 4;
                            for _ in 0..7 {
                                push(ci >> 28, &mut counter);
                                ci <<= 4;
                            }
                        }
                        _ => {}
                    }
                }
                // 0: no data
                _ => {}
            }
        }
    }

    for d in data.iter_mut().take(nsamples).skip(counter) {
        *d = 0.;
    }
    if counter < nsamples {
        warn!(
            "steim2 decompress sample count error: {} of {}",
            counter, nsamples
        );
    }
    counter
}

/// 16-bit signed integers.
pub fn data16(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [i32]) -> usize {
    let n = nsamples.min(bytes.len() / 2);
    for (i, d) in data.iter_mut().enumerate().take(n) {
        *d = order.i16_at(bytes, i * 2) as i32;
    }
    n
}

/// 24-bit integers, stored as three bytes per sample with the high byte of
/// the reconstructed word set to 0.
pub fn data24(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [i32]) -> usize {
    let n = nsamples.min(bytes.len() / 3);
    // host slot that carries the most significant byte
    let hi = 0x0302_0100u32
        .to_ne_bytes()
        .iter()
        .position(|&b| b == 3)
        .unwrap();

    let mut at = 0usize;
    for d in data.iter_mut().take(n) {
        let mut b = [0u8; 4];
        for j in 0..4 {
            if order.wo[j] != hi {
                b[order.wo[j]] = bytes[at];
                at += 1;
            }
        }
        *d = i32::from_ne_bytes(b);
    }
    n
}

/// 32-bit signed integers.
pub fn data32(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [i32]) -> usize {
    let n = nsamples.min(bytes.len() / 4);
    for (i, d) in data.iter_mut().enumerate().take(n) {
        *d = order.i32_at(bytes, i * 4);
    }
    n
}

/// IEEE single-precision floats.
pub fn fdata32(bytes: &[u8], order: &WordOrder, nsamples: usize, data: &mut [f32]) -> usize {
    let n = nsamples.min(bytes.len() / 4);
    for (i, d) in data.iter_mut().enumerate().take(n) {
        *d = order.f32_at(bytes, i * 4);
    }
    n
}
