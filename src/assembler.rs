//! The multi-pass assembler core and disassembly driver.
//!
//! Assembly runs four passes over the source:
//!
//! 0. **Classify** — lex each line, split label definitions and directives
//!    from the instruction tokens, and carry bare labels onto the next
//!    line that emits anything.
//! 1. **Expand** — rewrite pseudo-instructions into their real expansions.
//! 2. **Encode** — bind symbols to byte offsets, emit instruction words and
//!    directive bytes, and record link requests for symbolic immediates.
//! 3. **Link** — patch resolved symbol values into the recorded fields.
//!
//! Errors accumulate within a pass so one run reports as many diagnostics
//! as possible; any error short-circuits the remaining passes. Disassembly
//! is a single sweep: match each 32-bit word to its descriptor and decode.
//!
//! An [`Assembler`] is immutable after construction, so one instance can
//! serve concurrent `assemble`/`disassemble` calls; all per-call state lives
//! on the caller's stack.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Errors};
use crate::field::ImmField;
use crate::instruction::{Directive, InstrDesc, PseudoInstr};
use crate::isa::Isa;
use crate::lexer::{self, LineTokens};
use crate::matcher::Matcher;

// ── Data model ──────────────────────────────────────────────────────────

/// One source line after pass-0 classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizedLine {
    /// 1-based line index in the original input; preserved verbatim across
    /// pseudo-instruction expansion.
    pub source_line: u32,
    /// Labels defined on (or carried onto) this line, each mapped to the
    /// 1-based line where it was written.
    pub symbols: BTreeMap<String, u32>,
    /// Dot-prefixed tokens at the head of the line — classification
    /// metadata validated in pass 0. The tokens themselves remain in
    /// `tokens`, so a directive line's mnemonic sits at position 0 like any
    /// other; pass 2 dispatches on that mnemonic, not on this set. A
    /// directive line therefore always has tokens, which is why the carry
    /// rule only needs to look at `tokens`.
    pub directives: BTreeSet<String>,
    /// The remaining tokens, mnemonic first.
    pub tokens: LineTokens,
}

/// An ordered, classified program — the unit passed between passes.
pub type Program = Vec<TokenizedLine>;

/// Symbol name → byte offset into the emitted image.
pub type SymbolMap = BTreeMap<String, u32>;

/// Byte offset → symbol name, for symbolizing disassembly output.
pub type ReverseSymbolMap = BTreeMap<u32, String>;

/// A deferred symbol resolution recorded in pass 2.
#[derive(Debug, Clone)]
struct LinkRequest {
    source_line: u32,
    /// Byte offset of the instruction word to patch.
    offset: u32,
    /// The immediate field that receives the value.
    field: ImmField,
    symbol: String,
}

/// Everything `assemble` produces.
///
/// `bytes` holds the flat little-endian image. It is empty unless pass 2
/// ran without errors; when only pass 3 fails, the pass-2 image is
/// returned with every resolvable field patched. `errors` is the union of
/// all diagnostics, ordered by pass and, within a pass, by detection
/// order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct AssembleResult {
    /// The emitted byte image.
    pub bytes: Vec<u8>,
    /// Symbols bound during pass 2.
    pub symbols: SymbolMap,
    /// Segment directives encountered, with the byte offset at each switch.
    pub segments: Vec<(String, u32)>,
    /// Accumulated diagnostics; empty means success.
    pub errors: Errors,
}

impl AssembleResult {
    /// Whether assembly completed without diagnostics.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Look up a symbol's byte offset.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).copied()
    }
}

/// Everything `disassemble` produces.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct DisassembleResult {
    /// One listing line per successfully decoded word, in image order.
    pub lines: Vec<String>,
    /// Diagnostics; `line` is the 1-based word index in the image.
    pub errors: Errors,
}

impl DisassembleResult {
    /// Whether disassembly completed without diagnostics.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ── Assembler ───────────────────────────────────────────────────────────

/// A two-way assembler parameterized by an ISA description.
///
/// Construction pulls the descriptor tables out of the ISA once and derives
/// the matcher; everything is immutable afterwards.
#[derive(Debug)]
pub struct Assembler<I: Isa> {
    isa: I,
    instructions: Vec<InstrDesc>,
    instruction_map: BTreeMap<String, usize>,
    pseudo_map: BTreeMap<String, PseudoInstr>,
    directive_map: BTreeMap<String, Directive>,
    matcher: Matcher,
}

impl<I: Isa> Assembler<I> {
    /// Build an assembler for `isa`.
    ///
    /// # Panics
    ///
    /// Panics when a mnemonic is registered twice within a table or two
    /// instructions share identical fixed bits (the matcher could never
    /// tell them apart). These are bugs in the ISA description.
    pub fn new(isa: I) -> Self {
        let instructions = isa.instructions();
        let mut instruction_map = BTreeMap::new();
        for (index, desc) in instructions.iter().enumerate() {
            if instruction_map.insert(String::from(desc.mnemonic()), index).is_some() {
                panic!("instruction '{}' registered twice", desc.mnemonic());
            }
        }

        let mut pseudo_map = BTreeMap::new();
        for pseudo in isa.pseudo_instructions() {
            let name = String::from(pseudo.mnemonic());
            if pseudo_map.insert(name.clone(), pseudo).is_some() {
                panic!("pseudo-instruction '{name}' registered twice");
            }
        }

        let mut directive_map = BTreeMap::new();
        for directive in isa.directives() {
            let name = String::from(directive.name());
            if directive_map.insert(name.clone(), directive).is_some() {
                panic!("directive '{name}' registered twice");
            }
        }

        let matcher = Matcher::new(&instructions);
        Self {
            isa,
            instructions,
            instruction_map,
            pseudo_map,
            directive_map,
            matcher,
        }
    }

    /// The ISA description this assembler was built for.
    pub fn isa(&self) -> &I {
        &self.isa
    }

    /// The derived word → descriptor matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Match a raw word against the instruction table.
    #[must_use]
    pub fn match_instruction(&self, word: u32) -> Option<&InstrDesc> {
        self.matcher.lookup(word).map(|index| &self.instructions[index])
    }

    // ── Assembly ────────────────────────────────────────────────────────

    /// Assemble newline-separated source text into a byte image.
    pub fn assemble(&self, source: &str) -> AssembleResult {
        let lines: Vec<&str> = source.lines().collect();
        self.assemble_lines(&lines)
    }

    /// Assemble pre-split source lines into a byte image.
    pub fn assemble_lines(&self, lines: &[&str]) -> AssembleResult {
        let mut result = AssembleResult::default();

        let program = match self.pass0(lines) {
            Ok(program) => program,
            Err(errors) => {
                result.errors = errors;
                return result;
            }
        };

        let expanded = match self.pass1(program) {
            Ok(expanded) => expanded,
            Err(errors) => {
                result.errors = errors;
                return result;
            }
        };

        let mut output = match self.pass2(&expanded) {
            Ok(output) => output,
            Err(errors) => {
                result.errors = errors;
                return result;
            }
        };

        if let Err(errors) = self.pass3(&mut output.image, &output.symbols, &output.links) {
            result.errors = errors;
        }
        result.bytes = output.image;
        result.symbols = output.symbols;
        result.segments = output.segments;
        result
    }

    /// Pass 0: lex and classify each line.
    ///
    /// Bare-label lines are not emitted; their symbols are carried onto the
    /// next line that produces tokens, so a label on its own line binds to
    /// the following instruction or directive. The carry survives empty and
    /// comment-only lines.
    fn pass0(&self, lines: &[&str]) -> Result<Program, Errors> {
        let mut errors = Errors::new();
        let mut program = Program::new();
        let mut carry: BTreeMap<String, u32> = BTreeMap::new();

        for (index, raw) in lines.iter().enumerate() {
            let source_line = index as u32 + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let tokens = match lexer::tokenize(
                raw,
                source_line,
                self.isa.comment_delimiter(),
                |name| self.isa.index_of(name).is_some(),
            ) {
                Ok(tokens) => tokens,
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            };
            if tokens.is_empty() {
                continue;
            }

            let (symbols, rest) = match split_symbols(tokens, source_line) {
                Ok(split) => split,
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            };
            let directives = match scan_directives(&rest, source_line) {
                Ok(directives) => directives,
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            };

            let mut line = TokenizedLine {
                source_line,
                symbols,
                directives,
                tokens: rest,
            };
            if !line.symbols.is_empty() && line.tokens.is_empty() {
                carry.append(&mut line.symbols);
                continue;
            }
            if !line.tokens.is_empty() {
                for (name, defined_at) in core::mem::take(&mut carry) {
                    line.symbols.entry(name).or_insert(defined_at);
                }
            }
            program.push(line);
        }

        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Pass 1: expand pseudo-instructions.
    ///
    /// Every expanded line keeps the original source line; only the first
    /// one inherits symbols and directives, so a label binds to the address
    /// of the first emitted instruction. Expansion output is not re-scanned.
    fn pass1(&self, program: Program) -> Result<Program, Errors> {
        let mut errors = Errors::new();
        let mut expanded = Program::with_capacity(program.len());

        for line in program {
            let pseudo = line.tokens.first().and_then(|m| self.pseudo_map.get(m));
            let Some(pseudo) = pseudo else {
                expanded.push(line);
                continue;
            };
            match pseudo.expand(&line) {
                Ok(expansions) => {
                    for (index, tokens) in expansions.into_iter().enumerate() {
                        let mut out = TokenizedLine {
                            source_line: line.source_line,
                            tokens,
                            ..TokenizedLine::default()
                        };
                        if index == 0 {
                            out.symbols = line.symbols.clone();
                            out.directives = line.directives.clone();
                        }
                        expanded.push(out);
                    }
                }
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(expanded)
        } else {
            Err(errors)
        }
    }

    /// Pass 2: encode instructions and directives, bind symbols, record
    /// link requests.
    fn pass2(&self, program: &Program) -> Result<Pass2Output, Errors> {
        let mut errors = Errors::new();
        let mut image: Vec<u8> = Vec::new();
        let mut symbols = SymbolMap::new();
        let mut segments: Vec<(String, u32)> = Vec::new();
        let mut links: Vec<LinkRequest> = Vec::new();

        for line in program {
            let offset = image.len() as u32;
            for (name, defined_at) in &line.symbols {
                if symbols.contains_key(name) {
                    errors.push(Error::new(
                        *defined_at,
                        format!("Multiple definitions of symbol '{name}'"),
                    ));
                } else {
                    symbols.insert(name.clone(), offset);
                }
            }

            let Some(mnemonic) = line.tokens.first() else {
                continue;
            };

            if let Some(directive) = self.directive_map.get(mnemonic) {
                if mnemonic == self.isa.text_segment() || mnemonic == self.isa.data_segment() {
                    segments.push((mnemonic.clone(), offset));
                }
                match directive.handle(line) {
                    Ok(bytes) => image.extend_from_slice(&bytes),
                    Err(error) => errors.push(error),
                }
                continue;
            }

            let Some(&index) = self.instruction_map.get(mnemonic) else {
                errors.push(Error::new(
                    line.source_line,
                    format!("Unknown opcode '{mnemonic}'"),
                ));
                continue;
            };
            match self.instructions[index].assemble(&self.isa, &line.tokens, line.source_line) {
                Ok(assembled) => {
                    if let Some(link) = assembled.link {
                        links.push(LinkRequest {
                            source_line: line.source_line,
                            offset,
                            field: link.imm,
                            symbol: link.symbol,
                        });
                    }
                    image.extend_from_slice(&assembled.word.to_le_bytes());
                }
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(Pass2Output {
                image,
                symbols,
                segments,
                links,
            })
        } else {
            Err(errors)
        }
    }

    /// Pass 3: patch resolved symbol values into the image.
    ///
    /// Only read-modify-write of existing words — the image size is fixed
    /// by the end of pass 2.
    fn pass3(
        &self,
        image: &mut [u8],
        symbols: &SymbolMap,
        links: &[LinkRequest],
    ) -> Result<(), Errors> {
        let mut errors = Errors::new();
        for request in links {
            let Some(&value) = symbols.get(&request.symbol) else {
                errors.push(Error::new(
                    request.source_line,
                    format!("Unknown symbol '{}'", request.symbol),
                ));
                continue;
            };

            let offset = request.offset as usize;
            assert!(
                offset + 4 <= image.len(),
                "link request at offset {offset} lies outside the image"
            );
            let word = u32::from_le_bytes([
                image[offset],
                image[offset + 1],
                image[offset + 2],
                image[offset + 3],
            ]);
            match request.field.apply_symbol_resolution(value, word, request.offset) {
                Ok(patched) => image[offset..offset + 4].copy_from_slice(&patched.to_le_bytes()),
                Err(message) => errors.push(Error::new(request.source_line, message)),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    // ── Disassembly ─────────────────────────────────────────────────────

    /// Disassemble a byte image into listing lines.
    ///
    /// The image length must be a multiple of the 4-byte instruction width.
    /// Unknown words are reported and skipped; decoding continues with the
    /// next word.
    pub fn disassemble(&self, image: &[u8], base_address: u32) -> DisassembleResult {
        self.disassemble_with_symbols(image, base_address, &ReverseSymbolMap::new())
    }

    /// Disassemble with a symbol table: PC-relative operands whose target
    /// address appears in `symbols` are rendered as the symbol name.
    pub fn disassemble_with_symbols(
        &self,
        image: &[u8],
        base_address: u32,
        symbols: &ReverseSymbolMap,
    ) -> DisassembleResult {
        let mut result = DisassembleResult::default();
        if image.len() % 4 != 0 {
            result.errors.push(Error::new(
                image.len() as u32 / 4 + 1,
                "Program size must be a multiple of 4 bytes",
            ));
            return result;
        }

        for (index, chunk) in image.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let line = index as u32 + 1;
            let address = base_address.wrapping_add(index as u32 * 4);

            let Some(desc_index) = self.matcher.lookup(word) else {
                result.errors.push(Error::new(
                    line,
                    format!("Unknown instruction word 0x{word:08x}"),
                ));
                continue;
            };
            match self.instructions[desc_index].disassemble(&self.isa, word, address, symbols) {
                Ok(tokens) => result.lines.push(tokens.join(" ")),
                Err(message) => result.errors.push(Error::new(line, message)),
            }
        }
        result
    }
}

/// Pass-2 output bundle.
struct Pass2Output {
    image: Vec<u8>,
    symbols: SymbolMap,
    segments: Vec<(String, u32)>,
    links: Vec<LinkRequest>,
}

// ── Pass-0 helpers ──────────────────────────────────────────────────────

/// Split leading `label:` tokens into a symbol set.
///
/// A `:`-bearing token after the first non-symbol token, a bare `:`, and a
/// duplicate label on one line are all errors.
fn split_symbols(
    tokens: LineTokens,
    source_line: u32,
) -> Result<(BTreeMap<String, u32>, LineTokens), Error> {
    let mut symbols = BTreeMap::new();
    let mut rest = LineTokens::new();
    let mut symbols_allowed = true;

    for token in tokens {
        if token.contains(':') {
            if !symbols_allowed {
                return Err(Error::new(source_line, "Stray ':' in line"));
            }
            let name: String = token.chars().filter(|c| *c != ':').collect();
            if name.is_empty() {
                return Err(Error::new(source_line, "Stray ':' in line"));
            }
            if symbols.insert(name.clone(), source_line).is_some() {
                return Err(Error::new(
                    source_line,
                    format!("Multiple definitions of symbol '{name}'"),
                ));
            }
        } else {
            symbols_allowed = false;
            rest.push(token);
        }
    }
    Ok((symbols, rest))
}

/// Collect the leading `.name` tokens of a line.
///
/// The tokens themselves stay in place (the directive is the line's
/// mnemonic); a dot-prefixed token after the first non-directive token is
/// an error.
fn scan_directives(tokens: &LineTokens, source_line: u32) -> Result<BTreeSet<String>, Error> {
    let mut directives = BTreeSet::new();
    let mut directives_allowed = true;

    for token in tokens {
        if token.starts_with('.') {
            if !directives_allowed {
                return Err(Error::new(source_line, "Stray '.' in line"));
            }
            directives.insert(token.clone());
        } else {
            directives_allowed = false;
        }
    }
    Ok(directives)
}
