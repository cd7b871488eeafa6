//! String values
//!
//! A Monkey string keeps two representations: the decoded bytes, which every
//! operation works on, and the spelling of the literal it came from, which is
//! what the value displays as.

use rustc_hash::FxHasher;
use std::hash::Hasher;

#[derive(Debug, Clone)]
pub struct MonkeyString {
    bytes: Vec<u8>,
    literal: String,
}

fn unescape(raw: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut iter = raw.bytes();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b't') => bytes.push(b'\t'),
            Some(b'b') => bytes.push(0x08),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'f') => bytes.push(0x0c),
            Some(b'"') => bytes.push(b'"'),
            Some(b'\\') => bytes.push(b'\\'),
            // unknown escapes keep the escaped byte
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    bytes
}

impl MonkeyString {
    /// Build from the raw text of a string literal, resolving escapes
    pub fn from_literal(raw: &str) -> Self {
        MonkeyString {
            bytes: unescape(raw),
            literal: raw.to_string(),
        }
    }

    /// Build from computed content; the spelling is the content itself
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let literal = String::from_utf8_lossy(&bytes).into_owned();
        MonkeyString { bytes, literal }
    }

    /// Original spelling, used for display
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Decoded content as text, lossily for non UTF-8 content
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One-byte string at `index`, `None` when out of range
    pub fn byte_at(&self, index: i64) -> Option<MonkeyString> {
        let index = usize::try_from(index).ok()?;
        self.bytes
            .get(index)
            .map(|b| MonkeyString::from_bytes(vec![*b]))
    }

    pub fn concat(&self, other: &MonkeyString) -> MonkeyString {
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(&self.bytes);
        bytes.extend_from_slice(&other.bytes);
        MonkeyString::from_bytes(bytes)
    }

    /// Byte-wise comparison: the difference of the first mismatching bytes,
    /// otherwise the difference of the lengths
    pub fn compare(&self, other: &MonkeyString) -> i64 {
        for (a, b) in self.bytes.iter().zip(other.bytes.iter()) {
            if a != b {
                return i64::from(*a) - i64::from(*b);
            }
        }
        self.bytes.len() as i64 - other.bytes.len() as i64
    }

    /// Numeric hash of the decoded content
    pub fn hash_value(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(&self.bytes);
        hasher.finish()
    }
}

impl PartialEq for MonkeyString {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == 0
    }
}

impl Eq for MonkeyString {}
