//! Backup and restore
//!
//! The backup format is plain text, one record per line:
//!
//! ```text
//! <full-name> SP <type-tag> SP <value> LF
//! ```
//!
//! - `type-tag` is `str`, `u32` or `u16`
//! - the value is everything after the second space, spaces included
//! - integers are unsigned decimal
//! - the last line may omit the trailing newline
//!
//! Values cannot contain newlines; there is no escaping.
//!
//! **Secrets are exported in cleartext** under the `str` tag. Treat an export
//! blob as a credential.
//!
//! Import is destructive: it wipes the whole store before replaying the blob,
//! and stops at the first bad line. There is no rollback, so a failed import
//! leaves the store holding exactly the records before the bad line. Import
//! only writes the store; run [`Registry::load`] afterwards to refresh the
//! bound values.

use alloc::string::String;
use core::fmt;

use confmgr_hal::{wipe, KvStore, StoreError};

use crate::error::{ConfigError, ParseError, ParseErrorKind};
use crate::registry::Registry;
use crate::value::{parse_decimal, ItemType};

/// Write one line per item, in registry order
///
/// Values are resolved like a load, so items missing from the store are
/// exported with their (validated) default.
pub fn export_to<S: KvStore + ?Sized, W: fmt::Write>(
    registry: &Registry<'_>,
    store: &mut S,
    out: &mut W,
) -> fmt::Result {
    for item in registry.items() {
        let value = item.read(store);
        writeln!(out, "{} {} {}", item.full_name(), item.item_type().tag(), value)?;
    }
    Ok(())
}

/// Export every item into a string
pub fn export<S: KvStore + ?Sized>(registry: &Registry<'_>, store: &mut S) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = export_to(registry, store, &mut out);
    out
}

/// Value of one import record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValue<'a> {
    Str(&'a str),
    U32(u32),
    U16(u16),
}

/// One parsed import line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Store key
    pub name: &'a str,
    pub value: RecordValue<'a>,
}

impl Record<'_> {
    /// Write this record to the store
    pub fn apply<S: KvStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        match self.value {
            RecordValue::Str(s) => store.write_str(self.name, s),
            RecordValue::U32(v) => store.write_u32(self.name, v),
            RecordValue::U16(v) => store.write_u16(self.name, v),
        }
    }
}

/// Split a line (without its terminator) into a record
///
/// The name ends at the first space and the tag at the second; the value
/// is the rest of the line. Integer values are parsed best-effort, and
/// `u16` values keep the low 16 bits.
pub fn parse_record(line: &str) -> Result<Record<'_>, ParseErrorKind> {
    let (name, rest) = line.split_once(' ').ok_or(ParseErrorKind::MissingType)?;
    let (tag, value) = rest.split_once(' ').ok_or(ParseErrorKind::MissingValue)?;

    let value = match ItemType::from_tag(tag).ok_or(ParseErrorKind::UnknownType)? {
        ItemType::Str | ItemType::Secret => RecordValue::Str(value),
        ItemType::U32 => RecordValue::U32(parse_decimal(value)),
        ItemType::U16 => RecordValue::U16(parse_decimal(value) as u16),
    };

    Ok(Record { name, value })
}

/// Wipe the store and replay a backup blob into it
///
/// Returns the number of records written. Empty lines are skipped. The
/// first malformed line or failed write aborts the import; records before
/// it stay written.
pub fn import<S: KvStore + ?Sized>(store: &mut S, blob: &str) -> Result<usize, ConfigError> {
    info!("Import: wiping store");
    wipe(store)?;

    let mut applied = 0;
    for (index, line) in blob.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }

        let record = parse_record(line).map_err(|kind| {
            warn!("Import line {}: {:?}", index + 1, kind);
            ParseError {
                line: index + 1,
                kind,
            }
        })?;

        record.apply(store).map_err(|e| {
            warn!("Import of {} failed: {:?}", record.name, e);
            e
        })?;
        trace!("applied {}", record.name);
        applied += 1;
    }

    info!("Imported {} records", applied);
    Ok(applied)
}
