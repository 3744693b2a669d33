// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Encode and decode KWallet map entries to and from their wire form.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wire codec for KWallet `Map` entries.
//!
//! kwalletd serialises a map entry (a string→string dictionary) as:
//!
//! - a 4-byte big-endian entry count, then per entry
//! - a 4-byte big-endian byte length of the encoded key, the key bytes,
//! - a 4-byte big-endian byte length of the encoded value, the value bytes.
//!
//! Key and value byte runs are the UTF-8 bytes of the string with a single
//! 0x00 separator between consecutive bytes (no leading or trailing null; an
//! empty string encodes to an empty run). Decoding strips every 0x00 byte
//! from a run before interpreting it as UTF-8.
//!
//! # Lossy for embedded NUL
//!
//! The separator is in-band: a literal 0x00 byte inside a key or value is
//! indistinguishable from an injected separator and is lost on decode. This
//! is a property of the foreign wire format, owned by kwalletd, and is
//! deliberately preserved rather than worked around. `decode_map(&encode_map
//! (Some(&m))?)` round-trips exactly for every map whose keys and values are
//! free of NUL bytes.
//!
//! Both functions are pure, synchronous, and stateless; they may be called
//! from any number of threads without coordination.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors produced while encoding or decoding a map entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Encode was handed the absence of a dictionary. An empty dictionary is
    /// valid; no dictionary at all is not.
    #[error("map value is absent; an empty map must still be a map")]
    MissingMap,
    /// A declared length would require reading past the end of the buffer.
    #[error("truncated map buffer: {field} needs {needed} bytes, {remaining} remain")]
    Truncated {
        /// The field being read when the buffer ran out.
        field: &'static str,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were actually available.
        remaining: usize,
    },
    /// A key or value run was not valid UTF-8 after null stripping.
    #[error("invalid utf8 in decoded map string")]
    InvalidUtf8,
    /// A value does not fit the 4-byte wire field that must carry it: the
    /// entry count, or a string whose interleaved run exceeds `u32::MAX`.
    #[error("oversized {field}: {len} does not fit a 4-byte wire field")]
    Oversized {
        /// The wire field that overflowed.
        field: &'static str,
        /// The offending size, in entries or source bytes.
        len: usize,
    },
}

/// Encode a dictionary into the kwalletd map wire form.
///
/// `None` is rejected with [`CodecError::MissingMap`]; `Some` of an empty
/// map is valid and encodes to the 4-byte zero count. Entries are written in
/// the map's iteration order, which the wire contract treats as meaningless:
/// the only guarantee is round-trip equality of the full mapping. A string
/// whose interleaved run cannot be described by the 4-byte length field is
/// rejected with [`CodecError::Oversized`].
pub fn encode_map(map: Option<&BTreeMap<String, String>>) -> Result<Vec<u8>, CodecError> {
    let map = map.ok_or(CodecError::MissingMap)?;
    let count: u32 = map.len().try_into().map_err(|_| CodecError::Oversized {
        field: "entry count",
        len: map.len(),
    })?;

    let mut buffer = Vec::with_capacity(4 + map.len() * 8);
    buffer.extend_from_slice(&count.to_be_bytes());
    for (key, value) in map {
        put_run(&mut buffer, key)?;
        put_run(&mut buffer, value)?;
    }
    Ok(buffer)
}

/// Decode the kwalletd map wire form into a dictionary.
///
/// Returns the dictionary together with the entry count read from the
/// header. Entries are processed strictly in wire order; should a malformed
/// or adversarial buffer yield the same decoded key twice, the last write
/// wins, which the returned count makes observable. Every read is
/// bounds-checked up front: a shortfall anywhere fails with
/// [`CodecError::Truncated`] and no partial dictionary is returned.
pub fn decode_map(buf: &[u8]) -> Result<(BTreeMap<String, String>, u32), CodecError> {
    let mut cursor = Cursor::new(buf);
    let count = cursor.read_u32("entry count")?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = read_run(&mut cursor, "key length", "key run")?;
        let value = read_run(&mut cursor, "value length", "value run")?;
        map.insert(key, value);
    }
    Ok((map, count))
}

/// Append a length-prefixed, null-interleaved string run to `buffer`.
fn put_run(buffer: &mut Vec<u8>, value: &str) -> Result<(), CodecError> {
    let raw = value.as_bytes();
    let prefix = run_length(raw.len())?;
    buffer.extend_from_slice(&prefix.to_be_bytes());
    for (idx, byte) in raw.iter().enumerate() {
        if idx > 0 {
            buffer.push(0x00);
        }
        buffer.push(*byte);
    }
    Ok(())
}

/// Encoded length of a `byte_len`-byte run: `2N - 1` interleaved bytes
/// (0 for the empty run). Fails when the result does not fit the 4-byte
/// length field.
fn run_length(byte_len: usize) -> Result<u32, CodecError> {
    let encoded = (byte_len as u64).saturating_mul(2).saturating_sub(1);
    encoded.try_into().map_err(|_| CodecError::Oversized {
        field: "string run",
        len: byte_len,
    })
}

/// Read one length-prefixed run, strip the interleaved nulls, and interpret
/// the remainder as UTF-8.
fn read_run(
    cursor: &mut Cursor<'_>,
    len_field: &'static str,
    data_field: &'static str,
) -> Result<String, CodecError> {
    let len = cursor.read_u32(len_field)? as usize;
    let raw = cursor.read_bytes(len, data_field)?;
    let stripped: Vec<u8> = raw.iter().copied().filter(|byte| *byte != 0x00).collect();
    String::from_utf8(stripped).map_err(|_| CodecError::InvalidUtf8)
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        // Guard before the read: a forged length must never drive an
        // out-of-bounds slice or a speculative allocation.
        if len > self.remaining() {
            return Err(CodecError::Truncated {
                field,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        let raw = self.read_bytes(4, field)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn round_trip_preserves_map_and_count() {
        let map = sample_map(&[("a", "1"), ("bb", "22"), ("user", "alice")]);
        let wire = encode_map(Some(&map)).expect("encode");
        let (decoded, count) = decode_map(&wire).expect("decode");
        assert_eq!(decoded, map);
        assert_eq!(count as usize, map.len());
    }

    #[test]
    fn empty_map_is_four_zero_bytes() {
        let map = BTreeMap::new();
        let wire = encode_map(Some(&map)).expect("encode");
        assert_eq!(wire, vec![0, 0, 0, 0]);
        let (decoded, count) = decode_map(&wire).expect("decode");
        assert!(decoded.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn missing_map_is_rejected() {
        assert_eq!(encode_map(None), Err(CodecError::MissingMap));
    }

    #[test]
    fn run_length_overflow_errors_instead_of_panicking() {
        assert_eq!(run_length(0), Ok(0));
        assert_eq!(run_length(4), Ok(7));
        // Largest run the 4-byte field can describe: 2^31 source bytes.
        let widest = (u32::MAX as usize) / 2 + 1;
        assert_eq!(run_length(widest), Ok(u32::MAX));
        assert_eq!(
            run_length(widest + 1),
            Err(CodecError::Oversized {
                field: "string run",
                len: widest + 1,
            })
        );
    }

    #[test]
    fn zero_length_value_round_trips() {
        let map = sample_map(&[("k", "")]);
        let wire = encode_map(Some(&map)).expect("encode");
        let (decoded, count) = decode_map(&wire).expect("decode");
        assert_eq!(decoded, map);
        assert_eq!(count, 1);
        // The empty value still carries its own zero-length prefix.
        assert_eq!(&wire[wire.len() - 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn single_entry_layout_matches_wire_contract() {
        let map = sample_map(&[("ab", "c")]);
        let wire = encode_map(Some(&map)).expect("encode");
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 1,             // entry count
            0, 0, 0, 3,             // key run length
            0x61, 0x00, 0x62,       // "ab" interleaved
            0, 0, 0, 1,             // value run length
            0x63,                   // "c"
        ];
        assert_eq!(wire, expected);
    }

    #[test]
    fn null_interleaved_key_decodes_to_plain_string() {
        // Hand-built buffer: one entry, key bytes "a\0b", empty value.
        let wire = vec![
            0, 0, 0, 1, 0, 0, 0, 3, 0x61, 0x00, 0x62, 0, 0, 0, 0,
        ];
        let (decoded, count) = decode_map(&wire).expect("decode");
        assert_eq!(count, 1);
        assert_eq!(decoded.get("ab").map(String::as_str), Some(""));
    }

    #[test]
    fn every_truncation_fails_without_partial_results() {
        let map = sample_map(&[("a", "1"), ("bb", "22")]);
        let wire = encode_map(Some(&map)).expect("encode");
        for cut in 0..wire.len() {
            let result = decode_map(&wire[..cut]);
            assert!(
                matches!(result, Err(CodecError::Truncated { .. })),
                "expected truncation failure at prefix length {cut}, got {result:?}"
            );
        }
        let (decoded, _) = decode_map(&wire).expect("full buffer decodes");
        assert_eq!(decoded, map);
    }

    #[test]
    fn forged_entry_count_fails_instead_of_allocating() {
        let wire = vec![0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            decode_map(&wire),
            Err(CodecError::Truncated {
                field: "key length",
                ..
            })
        ));
    }

    #[test]
    fn declared_run_length_beyond_buffer_is_truncation() {
        // One entry, key claims 16 bytes but only 2 follow.
        let wire = vec![0, 0, 0, 1, 0, 0, 0, 16, 0x61, 0x62];
        assert_eq!(
            decode_map(&wire),
            Err(CodecError::Truncated {
                field: "key run",
                needed: 16,
                remaining: 2,
            })
        );
    }

    #[test]
    fn duplicate_decoded_keys_collapse_last_write_wins() {
        // Two entries whose keys decode identically: "ab" interleaved and a
        // raw "ab" run with no separator. Legal encoders never emit this;
        // the decoder must still behave predictably.
        #[rustfmt::skip]
        let wire = vec![
            0, 0, 0, 2,
            0, 0, 0, 3, 0x61, 0x00, 0x62, // key "ab"
            0, 0, 0, 1, 0x31,             // value "1"
            0, 0, 0, 2, 0x61, 0x62,       // key "ab" again (no interleave)
            0, 0, 0, 1, 0x32,             // value "2"
        ];
        let (decoded, count) = decode_map(&wire).expect("decode");
        assert_eq!(count, 2);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("ab").map(String::as_str), Some("2"));
    }

    #[test]
    fn invalid_utf8_run_is_rejected() {
        let wire = vec![0, 0, 0, 1, 0, 0, 0, 2, 0xfe, 0xff, 0, 0, 0, 0];
        assert_eq!(decode_map(&wire), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn multibyte_utf8_round_trips() {
        let map = sample_map(&[("clé", "vælue"), ("鍵", "値")]);
        let wire = encode_map(Some(&map)).expect("encode");
        let (decoded, _) = decode_map(&wire).expect("decode");
        assert_eq!(decoded, map);
    }

    #[test]
    fn embedded_nul_is_documented_as_lossy() {
        // Not a defect: the separator is in-band, so a literal NUL cannot
        // survive the round trip. Pin the behaviour so it stays documented.
        let map = sample_map(&[("k", "a\0b")]);
        let wire = encode_map(Some(&map)).expect("encode");
        let (decoded, _) = decode_map(&wire).expect("decode");
        assert_eq!(decoded.get("k").map(String::as_str), Some("ab"));
    }
}
