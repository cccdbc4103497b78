//! Target descriptors for device bitcode selection.
//!
//! Only the architecture family and pointer bit width take part in
//! selection; CPU features are ignored.

use inkwell::targets::TargetMachine;
use std::fmt;

/// Architecture family of a compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchFamily {
    Wasm,
    X86,
    Arm,
    RiscV,
    Unknown,
}

impl ArchFamily {
    /// Families served by the machine-agnostic generic modules.
    pub fn is_generic(self) -> bool {
        matches!(self, ArchFamily::Wasm)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArchFamily::Wasm => "wasm",
            ArchFamily::X86 => "x86",
            ArchFamily::Arm => "arm",
            ArchFamily::RiscV => "riscv",
            ArchFamily::Unknown => "unknown",
        }
    }
}

/// Architecture family and bit width of a compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    pub family: ArchFamily,
    /// Pointer width in bits; 0 when unknown.
    pub bit_width: u32,
}

impl TargetDescriptor {
    pub fn new(family: ArchFamily, bit_width: u32) -> Self {
        Self { family, bit_width }
    }

    /// Describe a target from the architecture component of its triple.
    ///
    /// ```
    /// use codegen_strategy::llvm::{ArchFamily, TargetDescriptor};
    ///
    /// let target = TargetDescriptor::from_triple("wasm32-unknown-emscripten");
    /// assert_eq!(target, TargetDescriptor::new(ArchFamily::Wasm, 32));
    /// ```
    pub fn from_triple(triple: &str) -> Self {
        let arch = triple.split('-').next().unwrap_or("");
        let (family, bit_width) = match arch {
            "wasm32" => (ArchFamily::Wasm, 32),
            "wasm64" => (ArchFamily::Wasm, 64),
            "x86_64" | "amd64" | "x86_64h" => (ArchFamily::X86, 64),
            "i386" | "i486" | "i586" | "i686" | "x86" => (ArchFamily::X86, 32),
            "aarch64" | "aarch64_be" | "arm64" | "arm64e" => (ArchFamily::Arm, 64),
            "aarch64_32" | "arm64_32" => (ArchFamily::Arm, 32),
            a if a.starts_with("arm") || a.starts_with("thumb") => (ArchFamily::Arm, 32),
            a if a.starts_with("riscv32") => (ArchFamily::RiscV, 32),
            a if a.starts_with("riscv64") => (ArchFamily::RiscV, 64),
            "mips64" | "mips64el" | "mipsisa64r6" | "mipsisa64r6el" | "powerpc64"
            | "powerpc64le" | "ppc64" | "ppc64le" | "s390x" | "systemz" | "loongarch64"
            | "sparcv9" | "sparc64" | "nvptx64" | "amdgcn" | "bpf" | "bpfel" | "bpfeb" | "ve"
            | "spirv64" | "le64" => (ArchFamily::Unknown, 64),
            "mips" | "mipsel" | "mipsisa32r6" | "mipsisa32r6el" | "powerpc" | "powerpcle"
            | "ppc" | "ppcle" | "loongarch32" | "sparc" | "sparcel" | "nvptx" | "r600"
            | "hexagon" | "xcore" | "lanai" | "m68k" | "csky" | "xtensa" | "arc" | "spirv32"
            | "le32" => (ArchFamily::Unknown, 32),
            "msp430" | "avr" => (ArchFamily::Unknown, 16),
            _ => (ArchFamily::Unknown, 0),
        };
        Self { family, bit_width }
    }

    /// Describe the target an LLVM target machine generates code for.
    ///
    /// The family comes from the triple, the width from the machine's data
    /// layout, so architectures missing from the triple table still get one.
    pub fn from_target_machine(machine: &TargetMachine) -> Self {
        let triple = machine.get_triple();
        let family = Self::from_triple(&triple.as_str().to_string_lossy()).family;
        let bit_width = machine.get_target_data().get_pointer_byte_size(None) * 8;
        Self { family, bit_width }
    }

    pub fn is_32_bit(&self) -> bool {
        self.bit_width == 32
    }

    pub fn is_64_bit(&self) -> bool {
        self.bit_width == 64
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-bit)", self.family.name(), self.bit_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triple() {
        let cases = [
            ("wasm64-unknown-unknown", ArchFamily::Wasm, 64),
            ("x86_64-unknown-linux-gnu", ArchFamily::X86, 64),
            ("i686-pc-windows-msvc", ArchFamily::X86, 32),
            ("aarch64-apple-darwin", ArchFamily::Arm, 64),
            ("armv7-none-eabi", ArchFamily::Arm, 32),
            ("thumbv7em-none-eabihf", ArchFamily::Arm, 32),
            ("riscv64gc-unknown-linux-gnu", ArchFamily::RiscV, 64),
            ("riscv32imac-unknown-none-elf", ArchFamily::RiscV, 32),
            ("mips-unknown-linux-gnu", ArchFamily::Unknown, 32),
            ("powerpc64le-unknown-linux-gnu", ArchFamily::Unknown, 64),
            ("s390x-unknown-linux-gnu", ArchFamily::Unknown, 64),
            ("loongarch64-unknown-linux-gnu", ArchFamily::Unknown, 64),
            ("sparcv9-sun-solaris", ArchFamily::Unknown, 64),
            ("avr-unknown-unknown", ArchFamily::Unknown, 16),
            ("frobnicator-unknown-unknown", ArchFamily::Unknown, 0),
            ("", ArchFamily::Unknown, 0),
        ];
        for (triple, family, width) in cases {
            assert_eq!(
                TargetDescriptor::from_triple(triple),
                TargetDescriptor::new(family, width),
                "{}",
                triple
            );
        }
    }

    #[test]
    fn test_generic_families() {
        assert!(ArchFamily::Wasm.is_generic());
        assert!(!ArchFamily::X86.is_generic());
        assert!(!ArchFamily::Unknown.is_generic());
        assert_eq!(
            TargetDescriptor::new(ArchFamily::Arm, 64).to_string(),
            "arm (64-bit)"
        );
    }
}
