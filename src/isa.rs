//! The ISA description interface.
//!
//! The assembler core is generic over an [`Isa`]: a concrete instruction-set
//! description supplies the descriptor tables, the comment delimiter, and
//! the register name mapping, and the core supplies everything else. The
//! bundled [`Rv32i`](crate::rv32i::Rv32i) description is one implementor;
//! embedders with their own 32-bit RISC ISA implement this trait instead of
//! forking the core.

use alloc::vec::Vec;

use crate::field::RegisterFile;
use crate::instruction::{Directive, InstrDesc, PseudoInstr};

/// A concrete instruction-set description.
///
/// The three descriptor tables are requested exactly once, when the
/// assembler is constructed, and are immutable afterwards. Mnemonics must be
/// unique within each table; a duplicate is a programming error and panics
/// during construction.
pub trait Isa: RegisterFile {
    /// Human-readable ISA name (for diagnostics and tooling).
    fn name(&self) -> &str;

    /// The machine instruction descriptors.
    fn instructions(&self) -> Vec<InstrDesc>;

    /// The pseudo-instruction descriptors expanded in pass 1.
    fn pseudo_instructions(&self) -> Vec<PseudoInstr>;

    /// The directive descriptors handled in pass 2.
    fn directives(&self) -> Vec<Directive>;

    /// The character that starts a line comment (e.g. `#`).
    fn comment_delimiter(&self) -> char;

    /// Name of the instruction segment directive.
    fn text_segment(&self) -> &str {
        ".text"
    }

    /// Name of the data segment directive.
    fn data_segment(&self) -> &str {
        ".data"
    }
}
