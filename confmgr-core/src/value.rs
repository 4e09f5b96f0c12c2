//! Item types and values
//!
//! The set of item types is closed. Strings and secrets share storage and
//! serialization; the distinction only exists so callers know which items
//! hold credentials.

use alloc::string::{String, ToString};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Item type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemType {
    /// Free-form string
    Str,
    /// String holding a credential (stored and exported like `Str`)
    Secret,
    /// 32-bit unsigned integer
    U32,
    /// 16-bit unsigned integer
    U16,
}

impl ItemType {
    /// Tag used in the export format
    ///
    /// Secrets are exported as `str`, in cleartext.
    pub const fn tag(self) -> &'static str {
        match self {
            ItemType::Str | ItemType::Secret => "str",
            ItemType::U32 => "u32",
            ItemType::U16 => "u16",
        }
    }

    /// Parse an export tag
    ///
    /// `str` always maps to [`ItemType::Str`]; the export format cannot tell
    /// secrets apart.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "str" => Some(ItemType::Str),
            "u32" => Some(ItemType::U32),
            "u16" => Some(ItemType::U16),
            _ => None,
        }
    }

    /// Check if the type holds text
    pub const fn is_string(self) -> bool {
        matches!(self, ItemType::Str | ItemType::Secret)
    }
}

/// A resolved item value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Str(String),
    U32(u32),
    U16(u16),
}

impl Value {
    /// Get the text, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the number, widened to 32 bits, if this is an integer value
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            Value::U16(v) => Some(u32::from(*v)),
            Value::Str(_) => None,
        }
    }

    /// Convert into the canonical string form
    pub fn into_string(self) -> String {
        match self {
            Value::Str(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::U32(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

/// Best-effort base-10 parse
///
/// Follows C `strtoull` with base 10: skips leading whitespace (including
/// vertical tab), accepts one optional `+` or `-`, then reads digits up to
/// the first non-digit. A `-` negates modulo 2^64. Overflow saturates at
/// `u64::MAX` regardless of sign. The result is truncated to 32 bits, and
/// text without digits parses as 0.
pub fn parse_decimal(text: &str) -> u32 {
    let text = text.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B');
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut acc: u64 = 0;
    let mut overflow = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        match acc.checked_mul(10).and_then(|v| v.checked_add(u64::from(b - b'0'))) {
            Some(v) => acc = v,
            None => overflow = true,
        }
    }

    if overflow {
        u64::MAX as u32
    } else if negative {
        acc.wrapping_neg() as u32
    } else {
        acc as u32
    }
}
