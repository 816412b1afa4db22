//! Shared helpers for entity identity, clocks and text normalization.
//!
//! # Invariants
//! - `new_id()` always yields a value accepted by `is_valid_id()`.
//! - `remove_duplicate_strings()` keeps first occurrences in input order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Length of every generated entity identifier.
pub const ID_LENGTH: usize = 26;

const ID_ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{26}$").expect("valid id regex"));

/// Generates a new 26-character identifier from a random v4 UUID.
pub fn new_id() -> String {
    encode_id(Uuid::new_v4().as_bytes())
}

/// Returns whether `value` has the identifier shape produced by `new_id()`.
pub fn is_valid_id(value: &str) -> bool {
    ID_RE.is_match(value)
}

/// Current wall-clock time in epoch milliseconds.
pub fn get_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

/// Strips invisible formatting and bidi control code points.
///
/// These characters render as nothing but can make two visually identical
/// names compare unequal.
pub fn sanitize_unicode(value: &str) -> String {
    value.chars().filter(|c| !is_skipped_code_point(*c)).collect()
}

/// Removes duplicates, keeping the first occurrence of each value.
pub fn remove_duplicate_strings(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn is_skipped_code_point(c: char) -> bool {
    matches!(
        u32::from(c),
        0x200B..=0x200D
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x2069
            | 0x206A..=0x206F
            | 0xFEFF
            | 0x1D173..=0x1D17A
    )
}

// Unpadded base32 over the id alphabet; 16 input bytes yield 26 symbols.
fn encode_id(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(ID_LENGTH);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            encoded.push(symbol((buffer >> bits) & 0x1f));
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        encoded.push(symbol((buffer << (5 - bits)) & 0x1f));
    }

    encoded
}

fn symbol(index: u32) -> char {
    char::from(ID_ALPHABET[index as usize])
}
