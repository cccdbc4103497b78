// This module selects and loads the precompiled device bitcode module that is linked into
// every generated artifact. DeviceBitcodeSelector maps a TargetDescriptor to a catalog file:
// targets of the generic family get the generic module of their bit width, and every other
// target gets NotFound unless the caller explicitly opts into the generic-bit-width fallback.
// A catalog entry whose recorded family/width disagree with the selection is also NotFound,
// so a mismatched ISA is never handed out. Loading parses a private copy of the entry bytes
// with inkwell, reporting LLVM's parse error verbatim, then patches the platform override
// globals: each present global, defined or only declared, becomes a private constant holding
// the requested value typed by the global's own integer type, and a global stripped from
// the module (because nothing used it) is skipped silently.

//! Device bitcode selection and patching.

use inkwell::context::Context;
use inkwell::memory_buffer::MemoryBuffer;
use inkwell::module::{Linkage, Module};
use inkwell::types::AnyTypeEnum;

use super::catalog::{BitcodeCatalog, CatalogEntry, WASM32_GENERIC, WASM64_GENERIC};
use super::target::{ArchFamily, TargetDescriptor};
use crate::core::error::{BitcodeError, BitcodeResult};

/// Global carrying the example platform flag in the device library.
pub const PLATFORM_EXAMPLE_FLAG: &str = "libdevice_platform_example_flag";

/// Values injected into the device library's platform globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformOverrides {
    pub example_flag: u32,
}

impl PlatformOverrides {
    /// `(global name, value)` for every overridable global.
    pub fn globals(&self) -> [(&'static str, u32); 1] {
        [(PLATFORM_EXAMPLE_FLAG, self.example_flag)]
    }
}

/// What to do for targets outside the generic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Only generic-family targets get a module.
    #[default]
    Strict,
    /// Any 32/64-bit target gets the generic module of its width.
    GenericBitWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorConfig {
    pub fallback: FallbackPolicy,
    pub overrides: PlatformOverrides,
}

/// Picks, parses and patches device bitcode for a target.
#[derive(Debug, Clone)]
pub struct DeviceBitcodeSelector<C: BitcodeCatalog> {
    catalog: C,
    config: SelectorConfig,
}

impl<C: BitcodeCatalog> DeviceBitcodeSelector<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, SelectorConfig::default())
    }

    pub fn with_config(catalog: C, config: SelectorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Catalog file name to use for `target`, if any.
    pub fn select_file_name(&self, target: &TargetDescriptor) -> Option<&'static str> {
        if target.family.is_generic() {
            return generic_file_name(target.bit_width);
        }
        match self.config.fallback {
            FallbackPolicy::Strict => None,
            FallbackPolicy::GenericBitWidth => generic_file_name(target.bit_width),
        }
    }

    /// Catalog entry to use for `target`.
    pub fn select(&self, target: &TargetDescriptor) -> BitcodeResult<&CatalogEntry> {
        let not_found = || BitcodeError::NotFound { target: *target };

        let name = self.select_file_name(target).ok_or_else(not_found)?;
        let entry = self.catalog.find(name).ok_or_else(not_found)?;

        let expected = TargetDescriptor::new(ArchFamily::Wasm, target.bit_width);
        if !entry.serves(&expected) {
            log::warn!(
                "catalog entry {} is recorded as {}-bit {}, expected {}",
                entry.name,
                entry.bit_width,
                entry.family.name(),
                expected
            );
            return Err(not_found());
        }

        log::debug!("selected device bitcode {} for {}", entry.name, target);
        Ok(entry)
    }

    /// Select, parse and patch the device module for `target`.
    pub fn load<'ctx>(
        &self,
        target: &TargetDescriptor,
        context: &'ctx Context,
    ) -> BitcodeResult<Module<'ctx>> {
        let entry = self.select(target)?;
        let module = parse_device_bitcode(entry, context)?;

        for (name, value) in self.config.overrides.globals() {
            if override_platform_global(&module, name, value) {
                log::debug!("patched {} = {}", name, value);
            } else {
                log::trace!("{} not present in {}, skipped", name, entry.name);
            }
        }

        log::info!("loaded device bitcode {} for {}", entry.name, target);
        Ok(module)
    }
}

fn generic_file_name(bit_width: u32) -> Option<&'static str> {
    match bit_width {
        32 => Some(WASM32_GENERIC),
        64 => Some(WASM64_GENERIC),
        _ => None,
    }
}

/// Parse a private copy of `entry`'s bytes into `context`.
pub fn parse_device_bitcode<'ctx>(
    entry: &CatalogEntry,
    context: &'ctx Context,
) -> BitcodeResult<Module<'ctx>> {
    let buffer = MemoryBuffer::create_from_memory_range_copy(&entry.data, &entry.name);
    Module::parse_bitcode_from_buffer(&buffer, context).map_err(|e| BitcodeError::Parse {
        name: entry.name.to_string(),
        message: e.to_string(),
    })
}

/// Turn global `name` into a private constant holding `value`.
///
/// Declarations are patched too: they gain the initializer. Returns false
/// when the module has no such global or the global is not an integer.
pub fn override_platform_global(module: &Module<'_>, name: &str, value: u32) -> bool {
    let Some(global) = module.get_global(name) else {
        return false;
    };

    let AnyTypeEnum::IntType(int_type) = global.get_value_type() else {
        log::warn!("global {} is not an integer, not patched", name);
        return false;
    };

    global.set_initializer(&int_type.const_int(u64::from(value), false));
    global.set_constant(true);
    global.set_linkage(Linkage::Private);
    true
}
