//! Modified UTF-8 (MUTF-8 / CESU-8-with-overlong-NUL), the string encoding
//! NBT strings and compound keys are written in. U+0000 is the overlong
//! 2-byte form `C0 80`, and codepoints above U+FFFF are written as a
//! surrogate pair, each half itself a 3-byte sequence rather than one
//! 4-byte UTF-8 sequence.

use crate::error::Error;

/// Decodes a MUTF-8 byte slice into an owned UTF-8 `String`.
///
/// `position` is the offset of `bytes` within the enclosing buffer, used
/// only to annotate errors.
pub fn decode(bytes: &[u8], position: usize) -> Result<String, Error> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    let mut pending_high_surrogate: Option<u16> = None;

    while i < bytes.len() {
        let (unit, width) = read_code_unit(bytes, i, position)?;
        i += width;

        match pending_high_surrogate.take() {
            Some(high) => {
                if is_low_surrogate(unit) {
                    let combined = combine_surrogates(high, unit);
                    push_codepoint(&mut out, combined, position)?;
                } else {
                    // A lone high surrogate followed by something that
                    // isn't its low half is malformed input.
                    return Err(Error::invalid_data(
                        position,
                        "unpaired high surrogate in MUTF-8 string",
                    ));
                }
            }
            None => {
                if is_high_surrogate(unit) {
                    pending_high_surrogate = Some(unit);
                } else if is_low_surrogate(unit) {
                    return Err(Error::invalid_data(
                        position,
                        "unpaired low surrogate in MUTF-8 string",
                    ));
                } else {
                    push_codepoint(&mut out, unit as u32, position)?;
                }
            }
        }
    }

    if pending_high_surrogate.is_some() {
        return Err(Error::invalid_data(
            position,
            "string ended with an unpaired high surrogate",
        ));
    }

    Ok(out)
}

fn push_codepoint(out: &mut String, codepoint: u32, position: usize) -> Result<(), Error> {
    match char::from_u32(codepoint) {
        Some(c) => {
            out.push(c);
            Ok(())
        }
        None => Err(Error::invalid_data(
            position,
            format!("codepoint U+{codepoint:04X} is not a valid scalar value"),
        )),
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

fn combine_surrogates(high: u16, low: u16) -> u32 {
    let high = (high as u32) - 0xD800;
    let low = (low as u32) - 0xDC00;
    0x10000 + (high << 10) + low
}

/// Reads one 16-bit code unit starting at `bytes[i]`, returning the unit and
/// how many bytes it consumed (1, 2, or 3). A 4-byte leading byte is never
/// produced by valid MUTF-8 and is always a decode error here -- never an
/// unspecified/garbage result.
fn read_code_unit(bytes: &[u8], i: usize, position: usize) -> Result<(u16, usize), Error> {
    let lead = bytes[i];
    if lead & 0x80 == 0 {
        // 0xxxxxxx
        Ok((lead as u16, 1))
    } else if lead & 0xE0 == 0xC0 {
        // 110xxxxx 10xxxxxx
        let b1 = continuation_byte(bytes, i + 1, position)?;
        let unit = ((lead as u16 & 0x1F) << 6) | (b1 as u16 & 0x3F);
        Ok((unit, 2))
    } else if lead & 0xF0 == 0xE0 {
        // 1110xxxx 10xxxxxx 10xxxxxx
        let b1 = continuation_byte(bytes, i + 1, position)?;
        let b2 = continuation_byte(bytes, i + 2, position)?;
        let unit = ((lead as u16 & 0x0F) << 12) | ((b1 as u16 & 0x3F) << 6) | (b2 as u16 & 0x3F);
        Ok((unit, 3))
    } else {
        // Includes the 4-byte lead pattern (11110xxx), which standard
        // UTF-8 uses for supplementary codepoints but MUTF-8 never does.
        Err(Error::invalid_data(
            position + i,
            format!("byte 0x{lead:02X} is not a valid MUTF-8 leading byte"),
        ))
    }
}

fn continuation_byte(bytes: &[u8], i: usize, position: usize) -> Result<u8, Error> {
    let byte = *bytes
        .get(i)
        .ok_or_else(|| Error::invalid_data(position + i, "truncated MUTF-8 sequence"))?;
    if byte & 0xC0 != 0x80 {
        return Err(Error::invalid_data(
            position + i,
            format!("byte 0x{byte:02X} is not a valid MUTF-8 continuation byte"),
        ));
    }
    Ok(byte)
}

/// Encodes a UTF-8 `str` into MUTF-8 bytes.
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        encode_codepoint(c as u32, &mut out);
    }
    out
}

fn encode_codepoint(c: u32, out: &mut Vec<u8>) {
    match c {
        0 => out.extend_from_slice(&[0xC0, 0x80]),
        1..=0x7F => out.push(c as u8),
        0x80..=0x7FF => {
            out.push(0xC0 | ((c >> 6) as u8));
            out.push(0x80 | ((c & 0x3F) as u8));
        }
        0x800..=0xFFFF => encode_three_byte(c as u16, out),
        _ => {
            let c = c - 0x10000;
            let high = 0xD800 | (c >> 10) as u16;
            let low = 0xDC00 | (c & 0x3FF) as u16;
            encode_three_byte(high, out);
            encode_three_byte(low, out);
        }
    }
}

fn encode_three_byte(unit: u16, out: &mut Vec<u8>) {
    out.push(0xE0 | ((unit >> 12) as u8));
    out.push(0x80 | (((unit >> 6) & 0x3F) as u8));
    out.push(0x80 | ((unit & 0x3F) as u8));
}

/// The on-wire byte length MUTF-8 encoding `text` would take, without
/// allocating. Used by the encoder to write the 16-bit length prefix.
pub fn encoded_len(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0 => 2,
            1..=0x7F => 1,
            0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 6,
        })
        .sum()
}
