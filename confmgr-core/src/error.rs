//! Error types
//!
//! Store read failures never reach the caller of a load; they fall back to
//! the item's default. Write paths and import report errors here.

use core::fmt;

use confmgr_hal::StoreError;

/// Why an import line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// No space between the name and the type tag
    MissingType,
    /// No space between the type tag and the value
    MissingValue,
    /// Type tag is not one of `str`, `u32`, `u16`
    UnknownType,
}

/// A rejected import line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// 1-based line number within the blob
    pub line: usize,
    /// What was wrong with it
    pub kind: ParseErrorKind,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Persistent store operation failed
    Store(StoreError),
    /// Import blob is malformed
    Parse(ParseError),
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Store(e)
    }
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingType => f.write_str("missing type tag"),
            ParseErrorKind::MissingValue => f.write_str("missing value"),
            ParseErrorKind::UnknownType => f.write_str("unknown type tag"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Store(e) => write!(f, "store error: {:?}", e),
            ConfigError::Parse(e) => write!(f, "parse error: {}", e),
        }
    }
}
