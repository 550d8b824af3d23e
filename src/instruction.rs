//! Instruction, pseudo-instruction, and directive descriptors.
//!
//! Descriptor tables are handed to the assembler by the ISA description at
//! construction time and are immutable afterwards. An [`InstrDesc`] owns the
//! complete recipe for one machine instruction: its mnemonic, the operand
//! fields in token order, and the fixed bits that identify it. Pseudo-
//! instructions and directives are mnemonic + behavior pairs; their behavior
//! lives in boxed closures so ISA descriptions can capture whatever state
//! they need.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::assembler::{ReverseSymbolMap, TokenizedLine};
use crate::error::Error;
use crate::field::{Field, FieldLink, RegisterFile};
use crate::lexer::LineTokens;

// ── Instructions ────────────────────────────────────────────────────────

/// The result of assembling one instruction: the (possibly partially
/// encoded) word, and an unresolved symbol reference if an immediate operand
/// named a symbol instead of a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledInstr {
    /// The 32-bit instruction word. If `link` is set, the linked field's
    /// bits are zero and will be patched in pass 3.
    pub word: u32,
    /// Deferred symbol resolution, if any.
    pub link: Option<FieldLink>,
}

/// Descriptor for one machine instruction.
///
/// The fixed mask covers exactly the bits no field occupies; together they
/// account for all 32 bits of the word. This invariant is checked at
/// construction, since a violation is a bug in the ISA description rather
/// than a user error.
#[derive(Debug, Clone)]
pub struct InstrDesc {
    mnemonic: String,
    fields: Vec<Field>,
    fixed_pattern: u32,
    fixed_mask: u32,
}

impl InstrDesc {
    /// Create a descriptor, validating field/mask coverage.
    ///
    /// # Panics
    ///
    /// Panics when fields overlap each other or the fixed mask, when fields
    /// plus mask do not cover all 32 bits, or when the pattern has bits
    /// outside the mask.
    #[must_use]
    pub fn new(
        mnemonic: impl Into<String>,
        fields: Vec<Field>,
        fixed_pattern: u32,
        fixed_mask: u32,
    ) -> Self {
        let mnemonic = mnemonic.into();
        let mut union = 0u32;
        for field in &fields {
            let mask = field.bit_mask();
            assert_eq!(
                union & mask,
                0,
                "overlapping fields in instruction '{mnemonic}'"
            );
            union |= mask;
        }
        assert_eq!(
            union & fixed_mask,
            0,
            "fixed mask of instruction '{mnemonic}' overlaps its fields"
        );
        assert_eq!(
            union | fixed_mask,
            u32::MAX,
            "fields and fixed mask of instruction '{mnemonic}' do not cover 32 bits"
        );
        assert_eq!(
            fixed_pattern & !fixed_mask,
            0,
            "fixed pattern of instruction '{mnemonic}' has bits outside its mask"
        );
        Self {
            mnemonic,
            fields,
            fixed_pattern,
            fixed_mask,
        }
    }

    /// The instruction mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The value of the fixed bits.
    #[must_use]
    pub fn fixed_pattern(&self) -> u32 {
        self.fixed_pattern
    }

    /// Mask of the bits that are constant for this instruction.
    #[must_use]
    pub fn fixed_mask(&self) -> u32 {
        self.fixed_mask
    }

    /// Whether `word` carries this instruction's fixed bits.
    #[inline]
    #[must_use]
    pub fn matches(&self, word: u32) -> bool {
        word & self.fixed_mask == self.fixed_pattern
    }

    /// Assemble a tokenized line into a 32-bit word.
    ///
    /// `tokens[0]` is the mnemonic (the caller selected this descriptor by
    /// it); the remaining tokens map onto the fields in order. Parenthesis
    /// tokens produced by address operands like `4(sp)` are skipped, so
    /// `lw x1, 4(sp)` and `lw x1 4 sp` assemble identically.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] at `source_line` when the operand count is wrong
    /// or a field rejects its token.
    pub fn assemble(
        &self,
        regs: &dyn RegisterFile,
        tokens: &[String],
        source_line: u32,
    ) -> Result<AssembledInstr, Error> {
        let operands: Vec<&str> = tokens
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|t| *t != "(" && *t != ")")
            .collect();
        if operands.len() < self.fields.len() {
            return Err(Error::new(source_line, "Too few tokens"));
        }
        if operands.len() > self.fields.len() {
            return Err(Error::new(source_line, "Too many tokens"));
        }

        let mut word = self.fixed_pattern;
        let mut link = None;
        for (field, token) in self.fields.iter().zip(operands) {
            match field.encode(regs, token, word) {
                Ok((encoded, None)) => word = encoded,
                Ok((encoded, Some(symbol))) => {
                    word = encoded;
                    if let Field::Immediate(imm) = field {
                        link = Some(FieldLink {
                            imm: imm.clone(),
                            symbol,
                        });
                    }
                }
                Err(message) => return Err(Error::new(source_line, message)),
            }
        }
        Ok(AssembledInstr { word, link })
    }

    /// Disassemble a 32-bit word into tokens, mnemonic first.
    ///
    /// `address` is the word's address in the image (base address + offset);
    /// PC-relative immediates whose target address appears in `symbols` are
    /// rendered as the symbol name instead of a numeric offset.
    ///
    /// # Errors
    ///
    /// Returns a message when the word does not carry this instruction's
    /// fixed bits or a register slice holds an unnamed index.
    pub fn disassemble(
        &self,
        regs: &dyn RegisterFile,
        word: u32,
        address: u32,
        symbols: &ReverseSymbolMap,
    ) -> Result<LineTokens, String> {
        if !self.matches(word) {
            return Err(format!(
                "Word 0x{word:08x} does not match instruction '{}'",
                self.mnemonic
            ));
        }
        let mut tokens = Vec::with_capacity(self.fields.len() + 1);
        tokens.push(self.mnemonic.clone());
        for field in &self.fields {
            let text = match field {
                Field::Immediate(imm) if imm.is_pc_relative() => {
                    let value = imm.decode_value(word);
                    let target = address.wrapping_add(value as u32);
                    match symbols.get(&target) {
                        Some(name) => name.clone(),
                        None => field.decode(regs, word)?,
                    }
                }
                _ => field.decode(regs, word)?,
            };
            tokens.push(text);
        }
        Ok(tokens)
    }
}

// ── Pseudo-instructions ─────────────────────────────────────────────────

/// The token lists a pseudo-instruction expands to, in emission order.
pub type PseudoExpansion = Vec<LineTokens>;

/// Expansion callback: tokenized line in, real instruction token lists out.
/// Errors are plain messages; the caller attaches the source line.
pub type ExpandFn = Box<dyn Fn(&TokenizedLine) -> Result<PseudoExpansion, String> + Send + Sync>;

/// A mnemonic that expands to zero or more real instructions in pass 1.
pub struct PseudoInstr {
    mnemonic: String,
    expand: ExpandFn,
}

impl PseudoInstr {
    /// Create a pseudo-instruction descriptor.
    #[must_use]
    pub fn new(mnemonic: impl Into<String>, expand: ExpandFn) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            expand,
        }
    }

    /// The pseudo-instruction mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Run the expansion for one tokenized line.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] at the line's source line when the expansion
    /// rejects the operands.
    pub fn expand(&self, line: &TokenizedLine) -> Result<PseudoExpansion, Error> {
        (self.expand)(line).map_err(|message| Error::new(line.source_line, message))
    }
}

impl fmt::Debug for PseudoInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudoInstr")
            .field("mnemonic", &self.mnemonic)
            .finish_non_exhaustive()
    }
}

// ── Directives ──────────────────────────────────────────────────────────

/// Directive callback: tokenized line in, raw bytes out. Segment switches
/// and other stateless markers return an empty vector.
pub type DirectiveFn = Box<dyn Fn(&TokenizedLine) -> Result<Vec<u8>, String> + Send + Sync>;

/// A dot-prefixed mnemonic handled in pass 2 instead of instruction
/// encoding.
pub struct Directive {
    name: String,
    handle: DirectiveFn,
}

impl Directive {
    /// Create a directive descriptor. `name` includes the leading dot.
    #[must_use]
    pub fn new(name: impl Into<String>, handle: DirectiveFn) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// The directive name, including the leading dot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the directive's bytes for one tokenized line.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] at the line's source line when the operands are
    /// invalid.
    pub fn handle(&self, line: &TokenizedLine) -> Result<Vec<u8>, Error> {
        (self.handle)(line).map_err(|message| Error::new(line.source_line, message))
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
