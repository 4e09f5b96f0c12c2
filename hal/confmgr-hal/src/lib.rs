//! Confmgr Hardware Abstraction Layer
//!
//! This crate defines the persistent key-value store that the configuration
//! registry sits on. Chip-specific drivers (ESP-IDF NVS, sequential-storage
//! on a NOR flash partition, ...) implement [`store::KvStore`]; the registry
//! in `confmgr-core` only ever talks to the trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  confmgr-core (registry, backup)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  confmgr-hal (this crate - KvStore)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  flash / NVS  │       │  MemoryStore  │
//! │    drivers    │       │  (host, RAM)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Lifecycle
//!
//! - [`store::open`] - initialize, erasing and retrying if the partition
//!   layout is unusable
//! - [`store::wipe`] - erase everything and leave the store ready for writes

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod memory;
pub mod store;

// Re-export key types at crate root for convenience
pub use memory::{MemoryStore, MAX_KEY_LEN};
pub use store::{open, wipe, KvStore, StoreError};
