//! QFS (RefPack) decompression.
//!
//! A compressed record starts with a 9-byte header:
//!
//! | offset | size | meaning                                   |
//! |--------|------|-------------------------------------------|
//! | 0      | 4    | compressed size, little-endian            |
//! | 4      | 2    | magic `0x10 0xFB`                         |
//! | 6      | 3    | decompressed size, big-endian             |
//!
//! followed by a stream of commands. Each command appends up to a few literal
//! bytes from the input and then copies a run from earlier output. Runs may
//! overlap the bytes they produce, which is how RefPack encodes repetition.

use crate::core::Sc4pacError;

/// Size of the header preceding the command stream.
pub const HEADER_LEN: usize = 9;

/// The two magic bytes at offset 4.
pub const MAGIC: [u8; 2] = [0x10, 0xFB];

/// Decompressed size declared in the header.
pub fn declared_size(data: &[u8]) -> Result<usize, Sc4pacError> {
    if data.len() < HEADER_LEN {
        return Err(Sc4pacError::decode(format!(
            "QFS payload of {} bytes is shorter than its header",
            data.len()
        )));
    }
    if data[4..6] != MAGIC {
        return Err(Sc4pacError::decode(format!(
            "bad QFS magic {:02x} {:02x}",
            data[4], data[5]
        )));
    }
    Ok((usize::from(data[6]) << 16) | (usize::from(data[7]) << 8) | usize::from(data[8]))
}

/// Decompress a QFS payload, header included.
///
/// Fails when the magic is wrong, a command runs past the input, a copy
/// references bytes before the start of the output, or the output length
/// differs from the declared size.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Sc4pacError> {
    let expected = declared_size(data)?;
    let mut out: Vec<u8> = Vec::with_capacity(expected);
    let mut pos = HEADER_LEN;

    let byte = |at: usize| -> Result<usize, Sc4pacError> {
        data.get(at).map(|b| usize::from(*b)).ok_or_else(|| {
            Sc4pacError::decode(format!("QFS command truncated at offset {at}"))
        })
    };

    while pos < data.len() {
        let cc = byte(pos)?;

        let (numplain, numcopy, offset) = if cc >= 0xFC {
            (cc & 0x03, 0, 0)
        } else if cc >= 0xE0 {
            (((cc & 0x1F) << 2) + 4, 0, 0)
        } else if cc >= 0xC0 {
            let (b1, b2, b3) = (byte(pos + 1)?, byte(pos + 2)?, byte(pos + 3)?);
            pos += 3;
            (cc & 0x03, ((cc & 0x0C) << 6) + b3 + 5, ((cc & 0x10) << 12) + (b1 << 8) + b2 + 1)
        } else if cc >= 0x80 {
            let (b1, b2) = (byte(pos + 1)?, byte(pos + 2)?);
            pos += 2;
            ((b1 >> 6) & 0x03, (cc & 0x3F) + 4, ((b1 & 0x3F) << 8) + b2 + 1)
        } else {
            let b1 = byte(pos + 1)?;
            pos += 1;
            (cc & 0x03, ((cc & 0x1C) >> 2) + 3, ((cc & 0x60) << 3) + b1 + 1)
        };
        pos += 1;

        let literal = data.get(pos..pos + numplain).ok_or_else(|| {
            Sc4pacError::decode(format!("QFS literal run of {numplain} bytes truncated at offset {pos}"))
        })?;
        out.extend_from_slice(literal);
        pos += numplain;

        if numcopy > 0 {
            let start = out.len().checked_sub(offset).ok_or_else(|| {
                Sc4pacError::decode(format!(
                    "QFS back-reference {offset} reaches before the start of {} output bytes",
                    out.len()
                ))
            })?;
            // Byte by byte: the source may overlap the bytes being written.
            for i in 0..numcopy {
                let b = out[start + i];
                out.push(b);
            }
        }

        if cc >= 0xFC {
            break;
        }
    }

    if out.len() != expected {
        return Err(Sc4pacError::decode(format!(
            "QFS output is {} bytes, header declares {expected}",
            out.len()
        )));
    }

    Ok(out)
}

/// Compress `data` into a QFS payload using only literal runs.
///
/// The result is a valid stream that any RefPack decoder accepts, without
/// attempting to find repetitions. Used to build fixtures.
#[cfg(any(test, feature = "test-utils"))]
pub fn compress_literal(data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + data.len() / 112 + 2);
    let mut rest = data;

    while rest.len() >= 4 {
        let run = std::cmp::min(112, rest.len() & !0x03);
        body.push(0xE0 | u8::try_from((run - 4) >> 2).unwrap_or(0x1B));
        body.extend_from_slice(&rest[..run]);
        rest = &rest[run..];
    }
    body.push(0xFC | u8::try_from(rest.len()).unwrap_or(0));
    body.extend_from_slice(rest);

    let total = u32::try_from(HEADER_LEN + body.len()).unwrap_or(u32::MAX);
    let size = u32::try_from(data.len()).unwrap_or(u32::MAX);

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&size.to_be_bytes()[1..]);
    out.extend_from_slice(&body);
    out
}
