//! Page and item registry
//!
//! Pages are registered once at startup, in order, and never removed. The
//! registry is an explicit object: build it once and pass it by reference to
//! whatever needs to load, export or look up items.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use confmgr_hal::KvStore;

use crate::backup;
use crate::item::Item;

/// A named group of related items
#[derive(Debug)]
pub struct Page<'a> {
    slug: &'static str,
    items: Vec<Item<'a>>,
}

impl<'a> Page<'a> {
    /// Create an empty page
    pub fn new(slug: &'static str) -> Self {
        Self {
            slug,
            items: Vec::new(),
        }
    }

    /// Append an item
    ///
    /// Item slugs must be unique within the page; this is not checked.
    pub fn with(mut self, mut item: Item<'a>) -> Self {
        item.attach(self.slug);
        self.items.push(item);
        self
    }

    pub fn slug(&self) -> &'static str {
        self.slug
    }

    /// Items in registration order
    pub fn items(&self) -> &[Item<'a>] {
        &self.items
    }

    /// Find an item by slug
    pub fn item(&self, slug: &str) -> Option<&Item<'a>> {
        self.items.iter().find(|item| item.slug() == slug)
    }
}

/// Ordered, append-only collection of pages
#[derive(Debug, Default)]
pub struct Registry<'a> {
    pages: Vec<Page<'a>>,
}

impl<'a> Registry<'a> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page
    ///
    /// Page slugs, and therefore full names, must be unique across the
    /// registry; this is not checked.
    pub fn register_page(&mut self, page: Page<'a>) {
        debug!("register page {} ({} items)", page.slug, page.items.len());
        self.pages.push(page);
    }

    /// Pages in registration order
    pub fn pages(&self) -> &[Page<'a>] {
        &self.pages
    }

    /// All items, page by page, in registration order
    pub fn items(&self) -> impl Iterator<Item = &Item<'a>> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Find an item by page and item slug
    pub fn find(&self, page: &str, item: &str) -> Option<&Item<'a>> {
        self.pages
            .iter()
            .find(|p| p.slug == page)
            .and_then(|p| p.item(item))
    }

    /// Find an item by its full name (`cm/<page>/<item>`)
    pub fn find_by_name(&self, full_name: &str) -> Option<&Item<'a>> {
        self.items().find(|item| item.full_name() == full_name)
    }

    /// Populate every bound cell from the store
    ///
    /// Never fails: items the store cannot produce get their default. Every
    /// value passes through its item's validator.
    ///
    /// # Panics
    ///
    /// Panics if a bound string cell is borrowed elsewhere.
    pub fn load<S: KvStore + ?Sized>(&self, store: &mut S) {
        for page in &self.pages {
            debug!("load page {}", page.slug);
            for item in &page.items {
                item.load(store);
            }
        }
    }

    /// Export every item's current value
    ///
    /// See [`backup::export`].
    pub fn export<S: KvStore + ?Sized>(&self, store: &mut S) -> String {
        backup::export(self, store)
    }

    /// Stream the export to a writer
    ///
    /// See [`backup::export_to`].
    pub fn export_to<S: KvStore + ?Sized, W: fmt::Write>(
        &self,
        store: &mut S,
        out: &mut W,
    ) -> fmt::Result {
        backup::export_to(self, store, out)
    }
}
