//! Persistent key-value store abstraction
//!
//! Flat string keys map to typed values that survive power loss. The
//! configuration layer assumes it is the sole user of the store handle and
//! that the implementation serializes access to the underlying media.

use alloc::string::String;

/// Errors from persistent store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No value stored under the key (or stored with another type)
    NotFound,
    /// Key exceeds the backend's maximum key length
    KeyTooLong,
    /// Stored blob has an unexpected length
    InvalidSize,
    /// Storage is full
    Full,
    /// Partition has no free pages and must be erased before use
    NoFreePages,
    /// Partition was written by a newer layout version and must be erased
    NewVersion,
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Data corrupted or invalid
    Corrupted,
}

/// Typed key-value storage on persistent media
///
/// Every call takes `&mut self`: flash drivers need exclusive access to the
/// peripheral even for reads. All operations are synchronous and bounded.
pub trait KvStore {
    /// Prepare the store for use
    fn init(&mut self) -> Result<(), StoreError>;

    /// Erase every key in the store
    ///
    /// This is not limited to keys the caller knows about. Use with caution!
    fn erase_all(&mut self) -> Result<(), StoreError>;

    /// Read a string value
    fn read_str(&mut self, key: &str) -> Result<String, StoreError>;

    /// Read a 32-bit unsigned value
    fn read_u32(&mut self, key: &str) -> Result<u32, StoreError>;

    /// Read a 16-bit unsigned value
    fn read_u16(&mut self, key: &str) -> Result<u16, StoreError>;

    /// Read a float stored as a 4-byte blob
    fn read_f32(&mut self, key: &str) -> Result<f32, StoreError>;

    /// Write a string value
    fn write_str(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write a 32-bit unsigned value
    fn write_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError>;

    /// Write a 16-bit unsigned value
    fn write_u16(&mut self, key: &str, value: u16) -> Result<(), StoreError>;

    /// Write a float as a 4-byte blob
    fn write_f32(&mut self, key: &str, value: f32) -> Result<(), StoreError>;
}

/// Initialize the store, recovering from an unusable partition
///
/// A partition that was truncated (no free pages) or written by a newer
/// layout cannot be mounted; it is erased and initialized again. Any other
/// failure is returned as-is.
pub fn open<S: KvStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    match store.init() {
        Err(e @ (StoreError::NoFreePages | StoreError::NewVersion)) => {
            info!("Store unusable ({:?}), erasing", e);
            store.erase_all()?;
            store.init()
        }
        other => other,
    }
}

/// Erase the whole store and leave it ready for writes
pub fn wipe<S: KvStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.erase_all()?;
    store.init()
}
