//! # isa-asm — ISA-Parameterized Assembler / Disassembler
//!
//! `isa-asm` is a pure Rust, two-way assembler core for fixed-width 32-bit
//! RISC instruction sets. The core is generic over an ISA description
//! ([`Isa`]): the description supplies instruction, pseudo-instruction, and
//! directive tables, and the core supplies the multi-pass pipeline —
//! lexing, label handling, pseudo-instruction expansion, encoding, and
//! symbol linkage — plus the matching disassembler. An RV32I description
//! ([`Rv32i`]) ships in the crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use isa_asm::{Assembler, Rv32i};
//!
//! let asm = Assembler::new(Rv32i);
//! let out = asm.assemble("addi x1, x0, 5");
//! assert!(out.is_ok());
//! assert_eq!(out.bytes, vec![0x93, 0x00, 0x50, 0x00]);
//!
//! let dis = asm.disassemble(&out.bytes, 0);
//! assert_eq!(dis.lines, vec!["addi ra zero 5"]);
//! ```
//!
//! ## Features
//!
//! - **Pure Rust** — no C/C++ FFI, no system assembler at runtime.
//! - **ISA-parameterized** — bring your own 32-bit RISC encoding tables.
//! - **Two-way** — byte-exact assembly and matching disassembly.
//! - **Labels** — forward and backward references, resolved in a link pass.
//! - **Multi-error** — each pass reports every diagnostic it finds.
//! - **`no_std` + `alloc`** — embeddable in firmware, kernels, WASM.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// An assembler intentionally performs many narrowing / sign-changing casts
// between integer widths (i64→u32, u32→u8, …) and uses dense hex literals
// without separators. The lints below are expected and acceptable in this
// context.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::return_self_not_must_use
)]

extern crate alloc;

/// The multi-pass assembler core, data model, and disassembly driver.
pub mod assembler;
/// Diagnostic records.
pub mod error;
/// Bit-level operand field codec.
pub mod field;
/// Instruction, pseudo-instruction, and directive descriptors.
pub mod instruction;
/// The ISA description interface.
pub mod isa;
/// Per-line tokenizer.
pub mod lexer;
/// Word → descriptor decision-tree matcher.
pub mod matcher;
/// Bundled RV32I ISA description.
pub mod rv32i;

// Re-exports
pub use assembler::{
    AssembleResult, Assembler, DisassembleResult, Program, ReverseSymbolMap, SymbolMap,
    TokenizedLine,
};
pub use error::{Error, Errors};
pub use field::{parse_int, BitRange, Field, FieldLink, ImmField, RegisterFile};
pub use instruction::{
    AssembledInstr, Directive, DirectiveFn, ExpandFn, InstrDesc, PseudoExpansion, PseudoInstr,
};
pub use isa::Isa;
pub use lexer::{tokenize, unescape, LineTokens};
pub use matcher::Matcher;
pub use rv32i::Rv32i;

/// Assemble source text with a one-shot assembler for `isa`.
///
/// Builds the descriptor tables on every call; construct an [`Assembler`]
/// once instead when assembling repeatedly.
///
/// # Examples
///
/// ```rust
/// use isa_asm::{assemble, Rv32i};
///
/// let out = assemble(Rv32i, "loop:\n  nop\n  beq x0, x0, loop");
/// assert!(out.is_ok());
/// assert_eq!(out.symbol("loop"), Some(0));
/// ```
pub fn assemble<I: Isa>(isa: I, source: &str) -> AssembleResult {
    Assembler::new(isa).assemble(source)
}

/// Disassemble a byte image with a one-shot assembler for `isa`.
///
/// # Examples
///
/// ```rust
/// use isa_asm::{disassemble, Rv32i};
///
/// let dis = disassemble(Rv32i, &[0x93, 0x00, 0x50, 0x00], 0);
/// assert_eq!(dis.lines, vec!["addi ra zero 5"]);
/// ```
pub fn disassemble<I: Isa>(isa: I, image: &[u8], base_address: u32) -> DisassembleResult {
    Assembler::new(isa).disassemble(image, base_address)
}
