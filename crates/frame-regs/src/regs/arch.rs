//! Built-in register catalogs.
//!
//! Register blocks are laid out in DWARF order with one 8-byte slot per
//! integer register, followed by the 16-byte vector registers. EH-frame
//! numbers equal DWARF numbers on both supported targets.

use std::fmt;
use std::str::FromStr;

use super::{RegisterCatalog, RegisterDescriptor, RegisterRole};
use crate::Result;

// ── x86-64 (System V psABI numbering) ──

const X86_64_GPRS: [&str; 16] = [
    "rax", "rdx", "rcx", "rbx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];

/// DWARF number of `rip` (the return address column).
const X86_64_RIP_ID: u32 = 16;

/// DWARF number of `xmm0`; `xmm1`..`xmm15` follow.
const X86_64_XMM_BASE_ID: u32 = 17;

const X86_64_EFLAGS_ID: u32 = 49;

/// Segment registers in DWARF order, starting at number 50.
const X86_64_SEGMENTS: [&str; 6] = ["es", "cs", "ss", "ds", "fs", "gs"];
const X86_64_SEGMENT_BASE_ID: u32 = 50;

// ── AArch64 (DWARF for the Arm 64-bit Architecture) ──

const AARCH64_SP_ID: u32 = 31;
const AARCH64_PC_ID: u32 = 32;

/// DWARF number of `v0`; `v1`..`v31` follow.
const AARCH64_V_BASE_ID: u32 = 64;

/// Target architectures with a built-in register catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_64,
    Aarch64,
}

impl Architecture {
    pub const ALL: [Self; 2] = [Self::X86_64, Self::Aarch64];

    pub fn catalog(self) -> Result<RegisterCatalog> {
        match self {
            Self::X86_64 => RegisterCatalog::new(x86_64_registers()),
            Self::Aarch64 => RegisterCatalog::new(aarch64_registers()),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => f.write_str("x86_64"),
            Self::Aarch64 => f.write_str("aarch64"),
        }
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "x86_64" | "x86-64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            other => Err(format!(
                "unknown architecture '{other}', expected 'x86_64' or 'aarch64'"
            )),
        }
    }
}

/// Integer register with the same number in both schemes.
fn numbered(name: impl Into<String>, offset: usize, size: usize, id: u32) -> RegisterDescriptor {
    RegisterDescriptor::new(name, offset, size)
        .with_dwarf_id(id)
        .with_eh_frame_id(id)
}

fn x86_64_registers() -> Vec<RegisterDescriptor> {
    let mut regs = Vec::new();
    let mut offset = 0;

    for (id, name) in (0u32..).zip(X86_64_GPRS) {
        let reg = numbered(name, offset, 8, id);
        regs.push(match name {
            "rsp" => reg.with_role(RegisterRole::Sp),
            "rbp" => reg.with_role(RegisterRole::Fp),
            _ => reg,
        });
        offset += 8;
    }

    regs.push(numbered("rip", offset, 8, X86_64_RIP_ID).with_role(RegisterRole::Pc));
    offset += 8;
    regs.push(numbered("eflags", offset, 8, X86_64_EFLAGS_ID));
    offset += 8;

    // Selectors are 2 bytes wide but keep an 8-byte slot, as in `user_regs_struct`.
    for (id, name) in (X86_64_SEGMENT_BASE_ID..).zip(X86_64_SEGMENTS) {
        regs.push(numbered(name, offset, 2, id));
        offset += 8;
    }

    for (i, id) in (X86_64_XMM_BASE_ID..X86_64_XMM_BASE_ID + 16).enumerate() {
        regs.push(numbered(format!("xmm{i}"), offset, 16, id));
        offset += 16;
    }

    regs
}

fn aarch64_registers() -> Vec<RegisterDescriptor> {
    let mut regs = Vec::new();
    let mut offset = 0;

    for id in 0u32..=30 {
        let reg = numbered(format!("x{id}"), offset, 8, id);
        regs.push(match id {
            29 => reg.with_role(RegisterRole::Fp),
            30 => reg.with_role(RegisterRole::Ra),
            _ => reg,
        });
        offset += 8;
    }

    regs.push(numbered("sp", offset, 8, AARCH64_SP_ID).with_role(RegisterRole::Sp));
    offset += 8;
    regs.push(numbered("pc", offset, 8, AARCH64_PC_ID).with_role(RegisterRole::Pc));
    offset += 8;
    // No DWARF number.
    regs.push(RegisterDescriptor::new("cpsr", offset, 4));
    offset += 8;

    for (i, id) in (AARCH64_V_BASE_ID..AARCH64_V_BASE_ID + 32).enumerate() {
        regs.push(numbered(format!("v{i}"), offset, 16, id));
        offset += 16;
    }

    regs
}
