//! Typed persistent configuration for embedded devices
//!
//! This crate keeps a registry of named, typed settings on top of a
//! [`KvStore`]:
//!
//! - Pages and items registered once at startup ([`Registry`], [`Page`], [`Item`])
//! - Load with default and validation hooks ([`Hooks`])
//! - Type-agnostic string accessors for administrative surfaces
//! - Line-oriented export/import for backup and restore ([`backup`])
//!
//! Items bind to caller-owned cells. The registry never owns the live
//! values; it reads and writes through the binding.
//!
//! ```text
//!   register_page ──► load ──► runtime reads/writes ──► export
//!                       ▲                                  │
//!                       └──────── import (wipe + replay) ◄─┘
//! ```
//!
//! Everything runs synchronously on the caller's thread. No locking is done
//! here; the caller is assumed to be the only user of the store handle.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod backup;
pub mod defaults;
pub mod error;
pub mod item;
pub mod registry;
pub mod value;

pub use backup::{export, export_to, import, parse_record, Record, RecordValue};
pub use confmgr_hal::{wipe, KvStore, StoreError};
pub use error::{ConfigError, ParseError, ParseErrorKind};
pub use item::{Binding, DefaultFn, Hooks, Item, ValidateFn, KEY_PREFIX};
pub use registry::{Page, Registry};
pub use value::{parse_decimal, ItemType, Value};
