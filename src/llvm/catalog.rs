//! Catalog of precompiled device bitcode modules.
//!
//! The catalog is read-only: lookups hand out shared references and loading
//! parses a private copy of the bytes, so a catalog can be shared across
//! threads without locking.

use std::borrow::Cow;

use super::target::{ArchFamily, TargetDescriptor};

/// Generic 32-bit device module.
pub const WASM32_GENERIC: &str = "libdevice_wasm32_generic.bc";
/// Generic 64-bit device module.
pub const WASM64_GENERIC: &str = "libdevice_wasm64_generic.bc";

/// One precompiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: Cow<'static, str>,
    pub family: ArchFamily,
    pub bit_width: u32,
    pub data: Cow<'static, [u8]>,
}

impl CatalogEntry {
    /// Entry over bytes embedded in the binary.
    pub const fn from_static(
        name: &'static str,
        family: ArchFamily,
        bit_width: u32,
        data: &'static [u8],
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            family,
            bit_width,
            data: Cow::Borrowed(data),
        }
    }

    pub fn new(name: impl Into<String>, family: ArchFamily, bit_width: u32, data: Vec<u8>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            family,
            bit_width,
            data: Cow::Owned(data),
        }
    }

    /// Was this module built for `target`'s family and width?
    pub fn serves(&self, target: &TargetDescriptor) -> bool {
        self.family == target.family && self.bit_width == target.bit_width
    }
}

/// Read-only set of modules queried by exact file name.
pub trait BitcodeCatalog {
    fn entries(&self) -> &[CatalogEntry];

    /// Entry named exactly `name`.
    fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries().iter().find(|entry| entry.name == name)
    }
}

/// Catalog backed by a fixed list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BitcodeCatalog for StaticCatalog {
    fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl BitcodeCatalog for &'static [CatalogEntry] {
    fn entries(&self) -> &[CatalogEntry] {
        self
    }
}
