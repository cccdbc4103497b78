//! Device bitcode inspection tool.
//!
//! Loads every `libdevice_<arch>_<variant>.bc` file of a directory into a
//! catalog, selects the module for a target triple, patches its platform
//! globals and optionally writes the patched module out.

use clap::Parser;
use inkwell::context::Context;
use std::fs;
use std::path::{Path, PathBuf};

use codegen_strategy::llvm::{
    BitcodeCatalog, CatalogEntry, DeviceBitcodeSelector, FallbackPolicy, PlatformOverrides,
    SelectorConfig, StaticCatalog, TargetDescriptor,
};

#[derive(Parser, Debug)]
#[command(name = "device-bitcode", about = "Select and patch device bitcode for a target")]
struct Args {
    /// Directory holding libdevice_*.bc files.
    #[arg(long)]
    catalog: PathBuf,

    /// Target triple to select a module for.
    #[arg(long, default_value = "wasm32-unknown-unknown")]
    triple: String,

    /// Value written into libdevice_platform_example_flag.
    #[arg(long, default_value_t = 0)]
    example_flag: u32,

    /// Hand the generic module of matching bit width to non-generic targets.
    #[arg(long)]
    generic_fallback: bool,

    /// Write the patched module to this path.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// List catalog entries and exit.
    #[arg(long)]
    list: bool,
}

/// Read `libdevice_*.bc` files, deriving family and width from the
/// architecture part of the file name.
fn load_catalog(dir: &Path) -> Result<StaticCatalog, Box<dyn std::error::Error>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = name
            .strip_prefix("libdevice_")
            .and_then(|rest| rest.strip_suffix(".bc"))
        else {
            continue;
        };
        let arch = stem.split('_').next().unwrap_or("");
        let target = TargetDescriptor::from_triple(arch);
        let data = fs::read(&path)?;
        log::debug!("catalog entry {} ({}, {} bytes)", name, target, data.len());
        entries.push(CatalogEntry::new(name, target.family, target.bit_width, data));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(StaticCatalog::new(entries))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let catalog = load_catalog(&args.catalog)?;
    if args.list {
        for entry in catalog.entries() {
            println!(
                "{}  {} {}-bit  {} bytes",
                entry.name,
                entry.family.name(),
                entry.bit_width,
                entry.data.len()
            );
        }
        return Ok(());
    }

    let config = SelectorConfig {
        fallback: if args.generic_fallback {
            FallbackPolicy::GenericBitWidth
        } else {
            FallbackPolicy::Strict
        },
        overrides: PlatformOverrides {
            example_flag: args.example_flag,
        },
    };
    let selector = DeviceBitcodeSelector::with_config(catalog, config);
    let target = TargetDescriptor::from_triple(&args.triple);

    let context = Context::create();
    let module = match selector.load(&target, &context) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let functions = module.get_functions().count();
    let globals = module.get_globals().count();
    println!("{}: {} functions, {} globals", target, functions, globals);

    if let Some(output) = args.output {
        if !module.write_bitcode_to_path(&output) {
            return Err(format!("failed to write {}", output.display()).into());
        }
        println!("wrote {}", output.display());
    }
    Ok(())
}
