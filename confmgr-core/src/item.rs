//! Configuration items and the typed read path
//!
//! An item binds a caller-owned cell to a key in the persistent store. Every
//! read resolves the same way regardless of type:
//!
//! 1. Read the value from the store
//! 2. On any store error (including "not found"), call the default provider
//! 3. If a validator is registered, run it on the value, whatever its origin
//!
//! The validator runs on good stored values too, so it can clamp ranges or
//! repair values that were corrupted on flash.

use alloc::format;
use alloc::string::String;
use core::cell::{Cell, OnceCell, RefCell};
use core::fmt;

use confmgr_hal::{KvStore, StoreError};

use crate::defaults;
use crate::value::{parse_decimal, ItemType, Value};

/// Namespace prefix of every key the registry writes
pub const KEY_PREFIX: &str = "cm";

/// Produces a value when the store has none
pub type DefaultFn<T> = fn() -> T;

/// Inspects a resolved value and may overwrite it
pub type ValidateFn<T> = fn(&mut T);

/// Default and validation hooks for one item
pub struct Hooks<T> {
    default: DefaultFn<T>,
    validate: Option<ValidateFn<T>>,
}

impl<T> Hooks<T> {
    /// Hooks with the given default provider and no validator
    pub const fn new(default: DefaultFn<T>) -> Self {
        Self {
            default,
            validate: None,
        }
    }

    /// Add a validator
    pub fn with_validator(self, validate: ValidateFn<T>) -> Self {
        Self {
            default: self.default,
            validate: Some(validate),
        }
    }

    /// Check if a validator is registered
    pub fn has_validator(&self) -> bool {
        self.validate.is_some()
    }

    /// Produce the default value
    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

impl Default for Hooks<String> {
    fn default() -> Self {
        Self::new(defaults::empty_str)
    }
}

impl Default for Hooks<u32> {
    fn default() -> Self {
        Self::new(defaults::zero_u32)
    }
}

impl Default for Hooks<u16> {
    fn default() -> Self {
        Self::new(defaults::zero_u16)
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Hooks<T> {}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Values that can be fetched from the store by key
trait Stored: Sized {
    fn fetch<S: KvStore + ?Sized>(store: &mut S, key: &str) -> Result<Self, StoreError>;
}

impl Stored for String {
    fn fetch<S: KvStore + ?Sized>(store: &mut S, key: &str) -> Result<Self, StoreError> {
        store.read_str(key)
    }
}

impl Stored for u32 {
    fn fetch<S: KvStore + ?Sized>(store: &mut S, key: &str) -> Result<Self, StoreError> {
        store.read_u32(key)
    }
}

impl Stored for u16 {
    fn fetch<S: KvStore + ?Sized>(store: &mut S, key: &str) -> Result<Self, StoreError> {
        store.read_u16(key)
    }
}

/// Read with default and validation
fn resolve<T: Stored, S: KvStore + ?Sized>(store: &mut S, key: &str, hooks: &Hooks<T>) -> T {
    let mut value = match T::fetch(store, key) {
        Ok(value) => value,
        Err(e) => {
            debug!("{}: {:?}, using default", key, e);
            hooks.default_value()
        }
    };

    if let Some(validate) = hooks.validate {
        validate(&mut value);
    }

    value
}

/// Where an item's live value lives, and how to resolve it
///
/// One variant per item type. The registry does not own the cells; they
/// belong to whoever registered the item.
pub enum Binding<'a> {
    Str(&'a RefCell<String>, Hooks<String>),
    Secret(&'a RefCell<String>, Hooks<String>),
    U32(&'a Cell<u32>, Hooks<u32>),
    U16(&'a Cell<u16>, Hooks<u16>),
}

impl Binding<'_> {
    /// Type of the bound value
    pub fn item_type(&self) -> ItemType {
        match self {
            Binding::Str(..) => ItemType::Str,
            Binding::Secret(..) => ItemType::Secret,
            Binding::U32(..) => ItemType::U32,
            Binding::U16(..) => ItemType::U16,
        }
    }
}

/// A named, typed configuration item
///
/// An item only has a meaningful store key once it has been added to a page
/// with [`Page::with`](crate::Page::with). Before that its page slug is empty
/// and every store access goes to `cm//<slug>`, so read, load and write it
/// through its page or the [`Registry`](crate::Registry).
pub struct Item<'a> {
    slug: &'static str,
    page: &'static str,
    binding: Binding<'a>,
    full_name: OnceCell<String>,
}

impl<'a> Item<'a> {
    /// Create an item from a binding
    ///
    /// The item is not usable against a store until it is added to a page
    /// with [`Page::with`](crate::Page::with), which sets its page slug and
    /// drops any full name cached before that.
    pub fn new(slug: &'static str, binding: Binding<'a>) -> Self {
        Self {
            slug,
            page: "",
            binding,
            full_name: OnceCell::new(),
        }
    }

    /// String item
    pub fn string(slug: &'static str, slot: &'a RefCell<String>, hooks: Hooks<String>) -> Self {
        Self::new(slug, Binding::Str(slot, hooks))
    }

    /// Credential item
    ///
    /// Behaves exactly like a string item, except that its value is never
    /// logged. It is still exported in cleartext.
    pub fn secret(slug: &'static str, slot: &'a RefCell<String>, hooks: Hooks<String>) -> Self {
        Self::new(slug, Binding::Secret(slot, hooks))
    }

    /// 32-bit unsigned item
    pub fn u32(slug: &'static str, slot: &'a Cell<u32>, hooks: Hooks<u32>) -> Self {
        Self::new(slug, Binding::U32(slot, hooks))
    }

    /// 16-bit unsigned item
    pub fn u16(slug: &'static str, slot: &'a Cell<u16>, hooks: Hooks<u16>) -> Self {
        Self::new(slug, Binding::U16(slot, hooks))
    }

    pub fn slug(&self) -> &'static str {
        self.slug
    }

    /// Slug of the page this item belongs to
    pub fn page(&self) -> &'static str {
        self.page
    }

    pub fn item_type(&self) -> ItemType {
        self.binding.item_type()
    }

    pub fn binding(&self) -> &Binding<'a> {
        &self.binding
    }

    pub(crate) fn attach(&mut self, page: &'static str) {
        self.page = page;
        self.full_name = OnceCell::new();
    }

    /// Store key, `cm/<page>/<item>`
    ///
    /// Computed on first use and cached for the life of the item.
    pub fn full_name(&self) -> &str {
        self.full_name
            .get_or_init(|| format!("{}/{}/{}", KEY_PREFIX, self.page, self.slug))
    }

    /// Resolve the current value from the store
    ///
    /// Falls back to the default on any store error and applies the
    /// validator. Does not touch the bound cell.
    pub fn read<S: KvStore + ?Sized>(&self, store: &mut S) -> Value {
        let key = self.full_name();
        match &self.binding {
            Binding::Str(_, hooks) | Binding::Secret(_, hooks) => {
                Value::Str(resolve(store, key, hooks))
            }
            Binding::U32(_, hooks) => Value::U32(resolve(store, key, hooks)),
            Binding::U16(_, hooks) => Value::U16(resolve(store, key, hooks)),
        }
    }

    /// Resolve the current value and write it into the bound cell
    ///
    /// # Panics
    ///
    /// Panics if the bound string cell is borrowed elsewhere.
    pub fn load<S: KvStore + ?Sized>(&self, store: &mut S) {
        let key = self.full_name();
        debug!("load item {}", key);

        match &self.binding {
            Binding::Str(slot, hooks) => {
                let value = resolve(store, key, hooks);
                debug!("value \"{}\"", value.as_str());
                *slot.borrow_mut() = value;
            }
            Binding::Secret(slot, hooks) => {
                *slot.borrow_mut() = resolve(store, key, hooks);
            }
            Binding::U32(slot, hooks) => {
                let value = resolve(store, key, hooks);
                debug!("value {}", value);
                slot.set(value);
            }
            Binding::U16(slot, hooks) => {
                let value = resolve(store, key, hooks);
                debug!("value {}", value);
                slot.set(value);
            }
        }
    }

    /// Resolve the current value as its canonical string
    ///
    /// Strings pass through verbatim, integers render as unsigned decimal.
    pub fn read_as_str<S: KvStore + ?Sized>(&self, store: &mut S) -> String {
        self.read(store).into_string()
    }

    /// Write a value given as text straight to the store
    ///
    /// Integer items parse `text` as best-effort decimal; 16-bit items keep
    /// the low 16 bits. The bound cell is not updated until the next load.
    pub fn write_as_str<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        text: &str,
    ) -> Result<(), StoreError> {
        let key = self.full_name();
        match &self.binding {
            Binding::Str(..) => {
                debug!("write \"{}\" -> {}", text, key);
                store.write_str(key, text)
            }
            Binding::Secret(..) => {
                debug!("write <secret> -> {}", key);
                store.write_str(key, text)
            }
            Binding::U32(..) => {
                let value = parse_decimal(text);
                debug!("write {} -> {}", value, key);
                store.write_u32(key, value)
            }
            Binding::U16(..) => {
                let value = parse_decimal(text) as u16;
                debug!("write {} -> {}", value, key);
                store.write_u16(key, value)
            }
        }
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("page", &self.page)
            .field("slug", &self.slug)
            .field("type", &self.item_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;
    use confmgr_hal::MemoryStore;
    use proptest::prelude::*;

    fn clamp_port(port: &mut u16) {
        if *port < 1024 {
            *port = 1024;
        }
    }

    fn force_42(v: &mut u32) {
        *v = 42;
    }

    fn lowercase(s: &mut String) {
        *s = s.to_lowercase();
    }

    /// Attach an item to a page and hand it back
    fn attached<'a>(page: &'static str, item: Item<'a>) -> Item<'a> {
        let mut item = item;
        item.attach(page);
        item
    }

    #[test]
    fn test_full_name() {
        let port = Cell::new(0u16);
        let item = attached("net", Item::u16("port", &port, Hooks::default()));
        assert_eq!(item.full_name(), "cm/net/port");
        assert_eq!(item.page(), "net");
        assert_eq!(item.slug(), "port");
    }

    #[test]
    fn test_full_name_set_by_page() {
        let port = Cell::new(0u16);
        let page = Page::new("net").with(Item::u16("port", &port, Hooks::default()));
        assert_eq!(page.items()[0].full_name(), "cm/net/port");
    }

    #[test]
    fn test_attach_replaces_unattached_name() {
        let port = Cell::new(0u16);
        let item = Item::u16("port", &port, Hooks::default());
        assert_eq!(item.page(), "");
        assert_eq!(item.full_name(), "cm//port");

        let page = Page::new("net").with(item);
        let item = page.item("port").unwrap();
        assert_eq!(item.full_name(), "cm/net/port");

        let mut store = MemoryStore::new();
        item.write_as_str(&mut store, "8080").unwrap();
        assert!(store.contains("cm/net/port"));
        assert!(!store.contains("cm//port"));
    }

    #[test]
    fn test_item_types() {
        let s = RefCell::new(String::new());
        let a = Cell::new(0u32);
        let b = Cell::new(0u16);
        assert_eq!(Item::string("s", &s, Hooks::default()).item_type(), ItemType::Str);
        assert_eq!(Item::secret("p", &s, Hooks::default()).item_type(), ItemType::Secret);
        assert_eq!(Item::u32("a", &a, Hooks::default()).item_type(), ItemType::U32);
        assert_eq!(Item::u16("b", &b, Hooks::default()).item_type(), ItemType::U16);
    }

    #[test]
    fn test_missing_string_uses_default() {
        let ssid = RefCell::new(String::from("stale"));
        let item = attached("net", Item::string("ssid", &ssid, Hooks::default()));
        let mut store = MemoryStore::new();

        assert_eq!(item.read_as_str(&mut store), "");
        item.load(&mut store);
        assert_eq!(*ssid.borrow(), "");
    }

    #[test]
    fn test_custom_default() {
        let port = Cell::new(0u16);
        let item = attached("net", Item::u16("port", &port, Hooks::new(|| 8080)));
        let mut store = MemoryStore::new();

        item.load(&mut store);
        assert_eq!(port.get(), 8080);
    }

    #[test]
    fn test_stored_value_wins_over_default() {
        let port = Cell::new(0u16);
        let item = attached("net", Item::u16("port", &port, Hooks::new(|| 1)));
        let mut store = MemoryStore::new();
        store.write_u16("cm/net/port", 8080).unwrap();

        assert_eq!(item.read_as_str(&mut store), "8080");
        item.load(&mut store);
        assert_eq!(port.get(), 8080);
    }

    #[test]
    fn test_validator_runs_on_stored_value() {
        let port = Cell::new(0u16);
        let hooks = Hooks::new(|| 8080).with_validator(clamp_port);
        let item = attached("net", Item::u16("port", &port, hooks));
        let mut store = MemoryStore::new();
        store.write_u16("cm/net/port", 80).unwrap();

        item.load(&mut store);
        assert_eq!(port.get(), 1024);
    }

    #[test]
    fn test_validator_runs_on_default() {
        let port = Cell::new(0u16);
        let hooks = Hooks::new(|| 22).with_validator(clamp_port);
        let item = attached("net", Item::u16("port", &port, hooks));
        let mut store = MemoryStore::new();

        item.load(&mut store);
        assert_eq!(port.get(), 1024);
    }

    #[test]
    fn test_fixed_validator_ignores_source() {
        let v = Cell::new(0u32);
        let hooks = Hooks::<u32>::default().with_validator(force_42);
        let item = attached("p", Item::u32("v", &v, hooks));
        let mut store = MemoryStore::new();

        item.load(&mut store);
        assert_eq!(v.get(), 42);

        store.write_u32("cm/p/v", 7).unwrap();
        item.load(&mut store);
        assert_eq!(v.get(), 42);
        assert_eq!(item.read_as_str(&mut store), "42");
    }

    #[test]
    fn test_string_validator() {
        let host = RefCell::new(String::new());
        let hooks = Hooks::<String>::default().with_validator(lowercase);
        let item = attached("net", Item::string("host", &host, hooks));
        let mut store = MemoryStore::new();
        store.write_str("cm/net/host", "Example.ORG").unwrap();

        item.load(&mut store);
        assert_eq!(*host.borrow(), "example.org");
        // Stored value is untouched
        assert_eq!(store.read_str("cm/net/host").unwrap(), "Example.ORG");
    }

    #[test]
    fn test_wrong_typed_entry_uses_default() {
        let port = Cell::new(0u16);
        let item = attached("net", Item::u16("port", &port, Hooks::new(|| 8080)));
        let mut store = MemoryStore::new();
        store.write_str("cm/net/port", "9090").unwrap();

        item.load(&mut store);
        assert_eq!(port.get(), 8080);
    }

    #[test]
    fn test_store_error_uses_default() {
        let v = Cell::new(0u32);
        let item = attached(
            "a_page_slug_that_is_far_too_long",
            Item::u32("v", &v, Hooks::new(|| 5)),
        );
        let mut store = MemoryStore::new();

        assert_eq!(store.read_u32(item.full_name()), Err(StoreError::KeyTooLong));
        item.load(&mut store);
        assert_eq!(v.get(), 5);
    }

    #[test]
    fn test_write_then_read() {
        let port = Cell::new(0u16);
        let item = attached("net", Item::u16("port", &port, Hooks::default()));
        let mut store = MemoryStore::new();
        store.write_u16("cm/net/port", 8080).unwrap();
        item.load(&mut store);

        item.write_as_str(&mut store, "9090").unwrap();

        assert_eq!(item.read_as_str(&mut store), "9090");
        // Bound memory is stale until the next load
        assert_eq!(port.get(), 8080);
        item.load(&mut store);
        assert_eq!(port.get(), 9090);
    }

    #[test]
    fn test_write_string_verbatim() {
        let ssid = RefCell::new(String::new());
        let item = attached("net", Item::string("ssid", &ssid, Hooks::default()));
        let mut store = MemoryStore::new();

        item.write_as_str(&mut store, " my net 42 ").unwrap();
        assert_eq!(store.read_str("cm/net/ssid").unwrap(), " my net 42 ");
        assert_eq!(item.read_as_str(&mut store), " my net 42 ");
    }

    #[test]
    fn test_write_secret() {
        let pass = RefCell::new(String::new());
        let item = attached("net", Item::secret("pass", &pass, Hooks::default()));
        let mut store = MemoryStore::new();

        item.write_as_str(&mut store, "hunter2").unwrap();
        item.load(&mut store);
        assert_eq!(*pass.borrow(), "hunter2");
    }

    #[test]
    fn test_write_integer_boundaries() {
        let a = Cell::new(0u32);
        let b = Cell::new(0u16);
        let wide = attached("p", Item::u32("a", &a, Hooks::default()));
        let narrow = attached("p", Item::u16("b", &b, Hooks::default()));
        let mut store = MemoryStore::new();

        for text in ["0", "65535", "4294967295"] {
            wide.write_as_str(&mut store, text).unwrap();
            assert_eq!(wide.read_as_str(&mut store), text);
        }

        narrow.write_as_str(&mut store, "0").unwrap();
        assert_eq!(narrow.read_as_str(&mut store), "0");
        narrow.write_as_str(&mut store, "65535").unwrap();
        assert_eq!(narrow.read_as_str(&mut store), "65535");

        // Out of range for 16 bits: low half kept
        narrow.write_as_str(&mut store, "4294967295").unwrap();
        assert_eq!(narrow.read_as_str(&mut store), "65535");
        narrow.write_as_str(&mut store, "65536").unwrap();
        assert_eq!(narrow.read_as_str(&mut store), "0");
        narrow.write_as_str(&mut store, "70000").unwrap();
        assert_eq!(narrow.read_as_str(&mut store), "4464");
    }

    #[test]
    fn test_write_integer_best_effort() {
        let a = Cell::new(0u32);
        let item = attached("p", Item::u32("a", &a, Hooks::default()));
        let mut store = MemoryStore::new();

        item.write_as_str(&mut store, "123xyz").unwrap();
        assert_eq!(store.read_u32("cm/p/a"), Ok(123));
        item.write_as_str(&mut store, "nope").unwrap();
        assert_eq!(store.read_u32("cm/p/a"), Ok(0));
        item.write_as_str(&mut store, "-1").unwrap();
        assert_eq!(store.read_u32("cm/p/a"), Ok(u32::MAX));
        item.write_as_str(&mut store, "\x0B 9").unwrap();
        assert_eq!(store.read_u32("cm/p/a"), Ok(9));
    }

    #[test]
    fn test_write_propagates_store_error() {
        let a = Cell::new(0u32);
        let item = attached("p", Item::u32("a", &a, Hooks::default()));
        let mut store = MemoryStore::with_capacity(0);

        assert_eq!(item.write_as_str(&mut store, "1"), Err(StoreError::Full));
    }

    #[test]
    fn test_debug_hides_value() {
        let pass = RefCell::new(String::from("hunter2"));
        let item = attached("net", Item::secret("pass", &pass, Hooks::default()));
        let shown = format!("{:?}", item);
        assert!(shown.contains("Secret"));
        assert!(!shown.contains("hunter2"));
    }

    proptest! {
        #[test]
        fn prop_u32_text_roundtrip(v in any::<u32>()) {
            let a = Cell::new(0u32);
            let item = attached("p", Item::u32("a", &a, Hooks::default()));
            let mut store = MemoryStore::new();

            item.write_as_str(&mut store, &v.to_string()).unwrap();
            prop_assert_eq!(item.read_as_str(&mut store), v.to_string());
        }

        #[test]
        fn prop_u16_write_keeps_low_bits(v in any::<u32>()) {
            let b = Cell::new(0u16);
            let item = attached("p", Item::u16("b", &b, Hooks::default()));
            let mut store = MemoryStore::new();

            item.write_as_str(&mut store, &v.to_string()).unwrap();
            item.load(&mut store);
            prop_assert_eq!(b.get(), v as u16);
        }
    }
}
