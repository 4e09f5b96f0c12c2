//! RAM-backed store
//!
//! Implements [`KvStore`] over a sorted map. Used on hosts and in tests, and
//! as a scratch store on targets without a config partition. Contents are
//! lost on reset.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use heapless::String as HString;

use crate::store::{KvStore, StoreError};

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 32;

type Key = HString<MAX_KEY_LEN>;

/// A typed entry
///
/// Lookups are typed: reading a key through another type's accessor reports
/// `NotFound`, the way NVS-style stores behave.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Str(String),
    U32(u32),
    U16(u16),
    Blob(Vec<u8>),
}

/// In-memory key-value store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<Key, Entry>,
    /// Maximum number of entries, `None` for unbounded
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `capacity` entries
    ///
    /// Writing a new key to a full store fails with [`StoreError::Full`];
    /// overwriting an existing key always succeeds.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Check if any value is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        match make_key(key) {
            Ok(key) => self.entries.contains_key(&key),
            Err(_) => false,
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stored keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    fn get(&self, key: &str) -> Result<&Entry, StoreError> {
        let key = make_key(key)?;
        self.entries.get(&key).ok_or(StoreError::NotFound)
    }

    fn put(&mut self, key: &str, entry: Entry) -> Result<(), StoreError> {
        let key = make_key(key)?;
        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity && !self.entries.contains_key(&key) {
                return Err(StoreError::Full);
            }
        }
        trace!("put {}", key.as_str());
        self.entries.insert(key, entry);
        Ok(())
    }
}

fn make_key(key: &str) -> Result<Key, StoreError> {
    let mut k = Key::new();
    k.push_str(key).map_err(|_| StoreError::KeyTooLong)?;
    Ok(k)
}

impl KvStore for MemoryStore {
    fn init(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), StoreError> {
        debug!("Erasing {} entries", self.entries.len());
        self.entries.clear();
        Ok(())
    }

    fn read_str(&mut self, key: &str) -> Result<String, StoreError> {
        match self.get(key)? {
            Entry::Str(s) => Ok(s.to_string()),
            _ => Err(StoreError::NotFound),
        }
    }

    fn read_u32(&mut self, key: &str) -> Result<u32, StoreError> {
        match self.get(key)? {
            Entry::U32(v) => Ok(*v),
            _ => Err(StoreError::NotFound),
        }
    }

    fn read_u16(&mut self, key: &str) -> Result<u16, StoreError> {
        match self.get(key)? {
            Entry::U16(v) => Ok(*v),
            _ => Err(StoreError::NotFound),
        }
    }

    fn read_f32(&mut self, key: &str) -> Result<f32, StoreError> {
        match self.get(key)? {
            Entry::Blob(bytes) => {
                let raw: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::InvalidSize)?;
                Ok(f32::from_le_bytes(raw))
            }
            _ => Err(StoreError::NotFound),
        }
    }

    fn write_str(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.put(key, Entry::Str(value.to_string()))
    }

    fn write_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.put(key, Entry::U32(value))
    }

    fn write_u16(&mut self, key: &str, value: u16) -> Result<(), StoreError> {
        self.put(key, Entry::U16(value))
    }

    fn write_f32(&mut self, key: &str, value: f32) -> Result<(), StoreError> {
        self.put(key, Entry::Blob(value.to_le_bytes().to_vec()))
    }
}
