//! Stock default providers
//!
//! Used by [`Hooks::default`](crate::Hooks) when an item has no better
//! fallback than "empty".

use alloc::string::String;

/// Empty string
pub fn empty_str() -> String {
    String::new()
}

/// Zero
pub fn zero_u32() -> u32 {
    0
}

/// Zero
pub fn zero_u16() -> u16 {
    0
}
