//! Device bitcode support on top of LLVM.
//!
//! Every artifact produced by the backend links a small precompiled runtime
//! library (math helpers and platform hooks). This module picks the library
//! build matching the compilation target and patches its platform globals.
//!
//! # Example
//! ```ignore
//! use codegen_strategy::llvm::{DeviceBitcodeSelector, StaticCatalog, TargetDescriptor};
//! use inkwell::context::Context;
//!
//! let selector = DeviceBitcodeSelector::new(catalog);
//! let context = Context::create();
//! let target = TargetDescriptor::from_triple("wasm32-unknown-unknown");
//! let device_module = selector.load(&target, &context)?;
//! module.link_in_module(device_module)?;
//! ```

pub mod catalog;
pub mod device;
pub mod target;

pub use catalog::{BitcodeCatalog, CatalogEntry, StaticCatalog, WASM32_GENERIC, WASM64_GENERIC};
pub use device::{
    override_platform_global, parse_device_bitcode, DeviceBitcodeSelector, FallbackPolicy,
    PlatformOverrides, SelectorConfig, PLATFORM_EXAMPLE_FLAG,
};
pub use target::{ArchFamily, TargetDescriptor};
