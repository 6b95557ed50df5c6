//! Key argument parsing and key serialization helpers.

use thiserror::Error;

use crate::types::KeyRange;

/// Errors produced while parsing key arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid escape in key argument {arg:?} at byte {offset}")]
    Unescape { arg: String, offset: usize },
}

/// Decode a URL-query-escaped key argument into raw bytes.
///
/// `%XX` sequences become the byte `0xXX` and `+` becomes a space. A `%`
/// that is not followed by two hex digits is rejected.
pub fn unescape_key(arg: &str) -> Result<Vec<u8>, KeyError> {
    let bytes = arg.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(KeyError::Unescape {
                    arg: arg.to_string(),
                    offset: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = arg.replace('+', " ");
    Ok(urlencoding::decode_binary(spaced.as_bytes()).into_owned())
}

/// Build key ranges from positional `start end [start end ...]` arguments.
///
/// A trailing unpaired argument is ignored. With no complete pair the
/// result is a single range covering the whole keyspace.
pub fn get_key_ranges(args: &[String]) -> Result<Vec<KeyRange>, KeyError> {
    let mut ranges = Vec::new();
    for pair in args.chunks_exact(2) {
        let start = unescape_key(&pair[0])?;
        let end = unescape_key(&pair[1])?;
        ranges.push(KeyRange::new(start, end));
    }
    if ranges.is_empty() {
        ranges.push(KeyRange::full());
    }
    Ok(ranges)
}

/// Serde adapter for raw keys: standard base64 strings, `null` → empty key.
pub mod base64_key {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
