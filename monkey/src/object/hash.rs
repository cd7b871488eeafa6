//! Bucketed hash map
//!
//! Entries are grouped into buckets by [`HashKey`]. String keys may collide on
//! the numeric hash, so a string lookup scans its bucket comparing decoded
//! content. Integer and boolean keys map one-to-one onto their hash key, and a
//! lookup takes the first entry of the bucket as the match.

use super::Object;
use crate::interp::{InterpResult, RuntimeError};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Integer,
    Boolean,
    String,
}

/// Derived key: type plus a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: KeyKind,
    pub value: u64,
}

impl HashKey {
    pub fn new(kind: KeyKind, value: u64) -> Self {
        HashKey { kind, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

#[derive(Debug, Clone, Default)]
pub struct Hash {
    buckets: FxHashMap<HashKey, Vec<HashPair>>,
    count: usize,
}

fn key_of(key: &Object) -> InterpResult<HashKey> {
    key.hash_key()
        .ok_or_else(|| RuntimeError::unusable_hash_key(key.type_name()))
}

/// Position of `key` inside its bucket
fn find_in(pairs: &[HashPair], key: &Object) -> Option<usize> {
    match key {
        Object::Str(wanted) => pairs
            .iter()
            .position(|pair| matches!(&pair.key, Object::Str(s) if s == wanted)),
        _ => (!pairs.is_empty()).then_some(0),
    }
}

impl Hash {
    pub fn new() -> Self {
        Hash::default()
    }

    /// Number of stored pairs
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert or overwrite. Returns the replaced value, if any.
    pub fn set(&mut self, key: Object, value: Object) -> InterpResult<Option<Object>> {
        let hk = key_of(&key)?;
        Ok(self.set_in_bucket(hk, key, value))
    }

    pub fn get(&self, key: &Object) -> InterpResult<Option<Object>> {
        let hk = key_of(key)?;
        Ok(self.get_in_bucket(hk, key))
    }

    /// Remove `key`. Returns the removed value, if any.
    pub fn delete(&mut self, key: &Object) -> InterpResult<Option<Object>> {
        let hk = key_of(key)?;
        Ok(self.delete_in_bucket(hk, key))
    }

    /// Copy of this hash with `key` set
    pub fn with_set(&self, key: Object, value: Object) -> InterpResult<Hash> {
        let mut copy = self.clone();
        copy.set(key, value)?;
        Ok(copy)
    }

    /// Copy of this hash with `key` removed
    pub fn with_deleted(&self, key: &Object) -> InterpResult<Hash> {
        let mut copy = self.clone();
        copy.delete(key)?;
        Ok(copy)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &HashPair> {
        self.buckets.values().flatten()
    }

    fn set_in_bucket(&mut self, hk: HashKey, key: Object, value: Object) -> Option<Object> {
        let bucket = self.buckets.entry(hk).or_default();
        match find_in(bucket, &key) {
            Some(idx) => Some(std::mem::replace(&mut bucket[idx].value, value)),
            None => {
                bucket.push(HashPair { key, value });
                self.count += 1;
                None
            }
        }
    }

    fn get_in_bucket(&self, hk: HashKey, key: &Object) -> Option<Object> {
        let bucket = self.buckets.get(&hk)?;
        find_in(bucket, key).map(|idx| bucket[idx].value.clone())
    }

    fn delete_in_bucket(&mut self, hk: HashKey, key: &Object) -> Option<Object> {
        let bucket = self.buckets.get_mut(&hk)?;
        let idx = find_in(bucket, key)?;
        if matches!(key, Object::Str(_)) {
            let removed = bucket.remove(idx);
            if bucket.is_empty() {
                self.buckets.remove(&hk);
            }
            self.count -= 1;
            Some(removed.value)
        } else {
            // non-string keys drop the whole bucket
            let removed = self.buckets.remove(&hk)?;
            self.count -= removed.len();
            removed.into_iter().next().map(|pair| pair.value)
        }
    }
}

impl PartialEq for Hash {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self.pairs().all(|pair| {
                matches!(other.get(&pair.key), Ok(Some(ref v)) if *v == pair.value)
            })
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pair) in self.pairs().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", pair.key, pair.value)?;
        }
        write!(f, "}}")
    }
}
