//! RV32I reference ISA description.
//!
//! The base integer instruction set in the six standard formats:
//!
//! ```text
//! R-type:  [funct7 | rs2 | rs1 | funct3 | rd  | opcode]
//! I-type:  [  imm[11:0]  | rs1 | funct3 | rd  | opcode]
//! S-type:  [imm[11:5]|rs2| rs1 | funct3 |imm[4:0]|opcode]
//! B-type:  [imm[12|10:5]|rs2|rs1|funct3|imm[4:1|11]|opcode]
//! U-type:  [      imm[31:12]             | rd  | opcode]
//! J-type:  [imm[20|10:1|11|19:12]        | rd  | opcode]
//! ```
//!
//! The scattered B- and J-type immediates are expressed as slice lists so a
//! single table drives both encoding and decoding. Alongside the machine
//! instructions the description registers the common pseudo-instructions
//! (`li`, `mv`, `j`, `ret`, …) and the usual data/segment directives.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::assembler::TokenizedLine;
use crate::field::{parse_int, BitRange, Field, ImmField, RegisterFile};
use crate::instruction::{Directive, InstrDesc, PseudoInstr};
use crate::isa::Isa;
use crate::lexer::{unescape, LineTokens};

// ── Opcodes ─────────────────────────────────────────────────────────────

const OP_LUI: u32 = 0b011_0111;
const OP_AUIPC: u32 = 0b001_0111;
const OP_JAL: u32 = 0b110_1111;
const OP_JALR: u32 = 0b110_0111;
const OP_BRANCH: u32 = 0b110_0011;
const OP_LOAD: u32 = 0b000_0011;
const OP_STORE: u32 = 0b010_0011;
const OP_IMM: u32 = 0b001_0011;
const OP_REG: u32 = 0b011_0011;
const OP_SYSTEM: u32 = 0b111_0011;

/// ABI register names, indexed by register number.
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// The RV32I instruction-set description.
///
/// Stateless: all tables are built on demand from constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rv32i;

impl RegisterFile for Rv32i {
    fn index_of(&self, mnemonic: &str) -> Option<u32> {
        if let Some(number) = mnemonic.strip_prefix('x') {
            if let Ok(index) = number.parse::<u32>() {
                return (index < 32).then_some(index);
            }
        }
        if mnemonic == "fp" {
            return Some(8);
        }
        ABI_NAMES
            .iter()
            .position(|name| *name == mnemonic)
            .map(|index| index as u32)
    }

    fn name_of(&self, index: u32) -> Option<&str> {
        ABI_NAMES.get(index as usize).copied()
    }
}

// ── Operand fields ──────────────────────────────────────────────────────

fn rd() -> Field {
    Field::register(11, 7)
}

fn rs1() -> Field {
    Field::register(19, 15)
}

fn rs2() -> Field {
    Field::register(24, 20)
}

/// I-type immediate: bits 31:20, 12-bit signed.
fn imm_i() -> Field {
    Field::Immediate(ImmField::new(vec![BitRange::new(31, 20)], true))
}

/// S-type immediate: imm[11:5] in 31:25, imm[4:0] in 11:7.
fn imm_s() -> Field {
    Field::Immediate(ImmField::new(
        vec![BitRange::new(31, 25), BitRange::new(11, 7)],
        true,
    ))
}

/// B-type immediate: imm[12|11|10:5|4:1] scattered, bit 0 implicit.
fn imm_b() -> Field {
    Field::Immediate(
        ImmField::new(
            vec![
                BitRange::new(31, 31),
                BitRange::new(7, 7),
                BitRange::new(30, 25),
                BitRange::new(11, 8),
            ],
            true,
        )
        .with_shift(1)
        .pc_relative(),
    )
}

/// U-type immediate: the raw 20-bit value placed in bits 31:12.
fn imm_u() -> Field {
    Field::Immediate(ImmField::new(vec![BitRange::new(31, 12)], false))
}

/// J-type immediate: imm[20|19:12|11|10:1] scattered, bit 0 implicit.
fn imm_j() -> Field {
    Field::Immediate(
        ImmField::new(
            vec![
                BitRange::new(31, 31),
                BitRange::new(19, 12),
                BitRange::new(20, 20),
                BitRange::new(30, 21),
            ],
            true,
        )
        .with_shift(1)
        .pc_relative(),
    )
}

/// Shift amount: 5-bit unsigned in bits 24:20 (funct7 stays fixed).
fn shamt() -> Field {
    Field::Immediate(ImmField::new(vec![BitRange::new(24, 20)], false))
}

// ── Descriptor builders ─────────────────────────────────────────────────

fn r_type(mnemonic: &str, funct3: u32, funct7: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rd(), rs1(), rs2()],
        OP_REG | (funct3 << 12) | (funct7 << 25),
        0xFE00_707F,
    )
}

fn i_type(mnemonic: &str, opcode: u32, funct3: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rd(), rs1(), imm_i()],
        opcode | (funct3 << 12),
        0x0000_707F,
    )
}

/// Loads use `rd, imm(rs1)` operand order.
fn load(mnemonic: &str, funct3: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rd(), imm_i(), rs1()],
        OP_LOAD | (funct3 << 12),
        0x0000_707F,
    )
}

/// Stores use `rs2, imm(rs1)` operand order.
fn store(mnemonic: &str, funct3: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rs2(), imm_s(), rs1()],
        OP_STORE | (funct3 << 12),
        0x0000_707F,
    )
}

fn branch(mnemonic: &str, funct3: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rs1(), rs2(), imm_b()],
        OP_BRANCH | (funct3 << 12),
        0x0000_707F,
    )
}

fn shift(mnemonic: &str, funct3: u32, funct7: u32) -> InstrDesc {
    InstrDesc::new(
        mnemonic,
        vec![rd(), rs1(), shamt()],
        OP_IMM | (funct3 << 12) | (funct7 << 25),
        0xFE00_707F,
    )
}

// ── Pseudo-instruction helpers ──────────────────────────────────────────

/// The operand tokens of `line`, checked against the expected count.
fn operands(line: &TokenizedLine, count: usize) -> Result<&[String], String> {
    match line.tokens.len().cmp(&(count + 1)) {
        Ordering::Less => Err(String::from("Too few tokens")),
        Ordering::Greater => Err(String::from("Too many tokens")),
        Ordering::Equal => Ok(&line.tokens[1..]),
    }
}

fn line_of(parts: &[&str]) -> LineTokens {
    parts.iter().map(|part| String::from(*part)).collect()
}

/// Expand `li rd, value` into `addi` or `lui` + `addi`.
///
/// The low 12 bits are taken sign-extended, and the upper 20 bits are
/// adjusted to compensate, matching the standard `%hi`/`%lo` split.
fn expand_li(line: &TokenizedLine) -> Result<Vec<LineTokens>, String> {
    let ops = operands(line, 2)?;
    let rd = ops[0].as_str();
    let value = parse_int(&ops[1])
        .ok_or_else(|| format!("Invalid immediate value '{}'", ops[1]))?;
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return Err(format!(
            "Immediate value {value} out of range [{}..{}]",
            i32::MIN,
            u32::MAX
        ));
    }
    if (-2048..=2047).contains(&value) {
        return Ok(vec![line_of(&["addi", rd, "x0", &value.to_string()])]);
    }

    let bits = value as u32;
    let low = ((bits as i32) << 20) >> 20;
    let high = bits.wrapping_sub(low as u32) >> 12;
    let mut expansion = vec![line_of(&["lui", rd, &format!("0x{high:x}")])];
    if low != 0 {
        expansion.push(line_of(&["addi", rd, rd, &low.to_string()]));
    }
    Ok(expansion)
}

// ── Directive builders ──────────────────────────────────────────────────

/// A data directive emitting one little-endian item of `width` bytes per
/// operand.
fn data_directive(name: &str, min: i64, max: i64, width: usize) -> Directive {
    Directive::new(
        name,
        Box::new(move |line: &TokenizedLine| {
            if line.tokens.len() < 2 {
                return Err(String::from("Too few tokens"));
            }
            let mut out = Vec::with_capacity((line.tokens.len() - 1) * width);
            for token in &line.tokens[1..] {
                let value = parse_int(token)
                    .ok_or_else(|| format!("Invalid immediate value '{token}'"))?;
                if value < min || value > max {
                    return Err(format!(
                        "Immediate value {value} out of range [{min}..{max}]"
                    ));
                }
                out.extend_from_slice(&(value as u32).to_le_bytes()[..width]);
            }
            Ok(out)
        }),
    )
}

/// A NUL-terminated string directive.
fn string_directive(name: &str) -> Directive {
    Directive::new(
        name,
        Box::new(|line: &TokenizedLine| {
            match line.tokens.len().cmp(&2) {
                Ordering::Less => return Err(String::from("Too few tokens")),
                Ordering::Greater => return Err(String::from("Too many tokens")),
                Ordering::Equal => {}
            }
            let mut bytes = unescape(&line.tokens[1])?;
            bytes.push(0);
            Ok(bytes)
        }),
    )
}

/// A segment-switch directive: emits no bytes.
fn segment_directive(name: &str) -> Directive {
    Directive::new(name, Box::new(|_: &TokenizedLine| Ok(Vec::new())))
}

impl Isa for Rv32i {
    fn name(&self) -> &str {
        "RV32I"
    }

    fn instructions(&self) -> Vec<InstrDesc> {
        vec![
            InstrDesc::new("lui", vec![rd(), imm_u()], OP_LUI, 0x7F),
            InstrDesc::new("auipc", vec![rd(), imm_u()], OP_AUIPC, 0x7F),
            InstrDesc::new("jal", vec![rd(), imm_j()], OP_JAL, 0x7F),
            i_type("jalr", OP_JALR, 0),
            branch("beq", 0),
            branch("bne", 1),
            branch("blt", 4),
            branch("bge", 5),
            branch("bltu", 6),
            branch("bgeu", 7),
            load("lb", 0),
            load("lh", 1),
            load("lw", 2),
            load("lbu", 4),
            load("lhu", 5),
            store("sb", 0),
            store("sh", 1),
            store("sw", 2),
            i_type("addi", OP_IMM, 0),
            i_type("slti", OP_IMM, 2),
            i_type("sltiu", OP_IMM, 3),
            i_type("xori", OP_IMM, 4),
            i_type("ori", OP_IMM, 6),
            i_type("andi", OP_IMM, 7),
            shift("slli", 1, 0),
            shift("srli", 5, 0),
            shift("srai", 5, 0x20),
            r_type("add", 0, 0),
            r_type("sub", 0, 0x20),
            r_type("sll", 1, 0),
            r_type("slt", 2, 0),
            r_type("sltu", 3, 0),
            r_type("xor", 4, 0),
            r_type("srl", 5, 0),
            r_type("sra", 5, 0x20),
            r_type("or", 6, 0),
            r_type("and", 7, 0),
            InstrDesc::new("ecall", vec![], OP_SYSTEM, u32::MAX),
            InstrDesc::new("ebreak", vec![], OP_SYSTEM | (1 << 20), u32::MAX),
        ]
    }

    fn pseudo_instructions(&self) -> Vec<PseudoInstr> {
        vec![
            PseudoInstr::new(
                "nop",
                Box::new(|line: &TokenizedLine| {
                    operands(line, 0)?;
                    Ok(vec![line_of(&["addi", "x0", "x0", "0"])])
                }),
            ),
            PseudoInstr::new(
                "mv",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["addi", &ops[0], &ops[1], "0"])])
                }),
            ),
            PseudoInstr::new(
                "not",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["xori", &ops[0], &ops[1], "-1"])])
                }),
            ),
            PseudoInstr::new(
                "neg",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["sub", &ops[0], "x0", &ops[1]])])
                }),
            ),
            PseudoInstr::new(
                "seqz",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["sltiu", &ops[0], &ops[1], "1"])])
                }),
            ),
            PseudoInstr::new(
                "snez",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["sltu", &ops[0], "x0", &ops[1]])])
                }),
            ),
            PseudoInstr::new("li", Box::new(expand_li)),
            PseudoInstr::new(
                "j",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 1)?;
                    Ok(vec![line_of(&["jal", "x0", &ops[0]])])
                }),
            ),
            PseudoInstr::new(
                "jr",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 1)?;
                    Ok(vec![line_of(&["jalr", "x0", &ops[0], "0"])])
                }),
            ),
            PseudoInstr::new(
                "ret",
                Box::new(|line: &TokenizedLine| {
                    operands(line, 0)?;
                    Ok(vec![line_of(&["jalr", "x0", "x1", "0"])])
                }),
            ),
            // Near call: the ±1 MiB jal range covers a single translation
            // unit, so no auipc prelude is emitted.
            PseudoInstr::new(
                "call",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 1)?;
                    Ok(vec![line_of(&["jal", "x1", &ops[0]])])
                }),
            ),
            PseudoInstr::new(
                "beqz",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["beq", &ops[0], "x0", &ops[1]])])
                }),
            ),
            PseudoInstr::new(
                "bnez",
                Box::new(|line: &TokenizedLine| {
                    let ops = operands(line, 2)?;
                    Ok(vec![line_of(&["bne", &ops[0], "x0", &ops[1]])])
                }),
            ),
        ]
    }

    fn directives(&self) -> Vec<Directive> {
        vec![
            segment_directive(".text"),
            segment_directive(".data"),
            data_directive(".byte", i64::from(i8::MIN), i64::from(u8::MAX), 1),
            data_directive(".half", i64::from(i16::MIN), i64::from(u16::MAX), 2),
            data_directive(".word", i64::from(i32::MIN), i64::from(u32::MAX), 4),
            Directive::new(
                ".zero",
                Box::new(|line: &TokenizedLine| {
                    match line.tokens.len().cmp(&2) {
                        Ordering::Less => return Err(String::from("Too few tokens")),
                        Ordering::Greater => return Err(String::from("Too many tokens")),
                        Ordering::Equal => {}
                    }
                    let count = parse_int(&line.tokens[1]).ok_or_else(|| {
                        format!("Invalid immediate value '{}'", line.tokens[1])
                    })?;
                    if count < 0 || count > i64::from(u32::MAX) {
                        return Err(format!(
                            "Immediate value {count} out of range [0..{}]",
                            u32::MAX
                        ));
                    }
                    Ok(vec![0u8; count as usize])
                }),
            ),
            string_directive(".string"),
            string_directive(".asciz"),
        ]
    }

    fn comment_delimiter(&self) -> char {
        '#'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Assembler;

    fn asm() -> Assembler<Rv32i> {
        Assembler::new(Rv32i)
    }

    fn word_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn assemble_word(source: &str) -> u32 {
        let out = asm().assemble(source);
        assert!(out.is_ok(), "{source}: {:?}", out.errors);
        assert_eq!(out.bytes.len(), 4, "{source}");
        word_at(&out.bytes, 0)
    }

    #[test]
    fn register_aliases() {
        assert_eq!(Rv32i.index_of("x0"), Some(0));
        assert_eq!(Rv32i.index_of("zero"), Some(0));
        assert_eq!(Rv32i.index_of("ra"), Some(1));
        assert_eq!(Rv32i.index_of("sp"), Some(2));
        assert_eq!(Rv32i.index_of("fp"), Some(8));
        assert_eq!(Rv32i.index_of("s0"), Some(8));
        assert_eq!(Rv32i.index_of("t6"), Some(31));
        assert_eq!(Rv32i.index_of("x31"), Some(31));
        assert_eq!(Rv32i.index_of("x32"), None);
        assert_eq!(Rv32i.index_of("xori"), None);
        assert_eq!(Rv32i.name_of(2), Some("sp"));
        assert_eq!(Rv32i.name_of(32), None);
    }

    #[test]
    fn table_construction_is_unambiguous() {
        // Building the assembler validates descriptor coverage and matcher
        // uniqueness for the whole table.
        let _ = asm();
    }

    // Golden encodings cross-checked against GNU as output.

    #[test]
    fn encode_addi() {
        assert_eq!(assemble_word("addi x1, x0, 5"), 0x0050_0093);
    }

    #[test]
    fn encode_abi_names() {
        assert_eq!(assemble_word("addi ra, zero, 5"), 0x0050_0093);
    }

    #[test]
    fn encode_lui() {
        assert_eq!(assemble_word("lui t0, 0x12"), 0x0001_22B7);
    }

    #[test]
    fn encode_auipc() {
        assert_eq!(assemble_word("auipc a0, 1"), 0x0000_1517);
    }

    #[test]
    fn encode_jal() {
        assert_eq!(assemble_word("jal ra, 8"), 0x0080_00EF);
    }

    #[test]
    fn encode_jalr() {
        assert_eq!(assemble_word("jalr x0, x1, 0"), 0x0000_8067);
    }

    #[test]
    fn encode_branch_negative_offset() {
        assert_eq!(assemble_word("beq x0, x0, -4"), 0xFE00_0EE3);
    }

    #[test]
    fn encode_load() {
        assert_eq!(assemble_word("lw x1, 4(sp)"), 0x0041_2083);
    }

    #[test]
    fn encode_store() {
        assert_eq!(assemble_word("sw t0, 8(sp)"), 0x0051_2423);
    }

    #[test]
    fn encode_shifts() {
        assert_eq!(assemble_word("slli x1, x2, 3"), 0x0031_1093);
        assert_eq!(assemble_word("srai x1, x2, 3"), 0x4031_5093);
    }

    #[test]
    fn encode_sub() {
        assert_eq!(assemble_word("sub gp, ra, sp"), 0x4020_81B3);
    }

    #[test]
    fn encode_system() {
        assert_eq!(assemble_word("ecall"), 0x0000_0073);
        assert_eq!(assemble_word("ebreak"), 0x0010_0073);
    }

    #[test]
    fn shift_amount_out_of_range() {
        let out = asm().assemble("slli x1, x2, 32");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("out of range"));
    }

    #[test]
    fn branch_offset_must_be_even() {
        let out = asm().assemble("beq x0, x0, 3");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("not aligned"));
    }

    // Pseudo-instruction expansions.

    #[test]
    fn nop_is_canonical() {
        assert_eq!(assemble_word("nop"), 0x0000_0013);
    }

    #[test]
    fn mv_is_addi_zero() {
        assert_eq!(assemble_word("mv a0, a1"), assemble_word("addi a0, a1, 0"));
    }

    #[test]
    fn ret_is_jalr_ra() {
        assert_eq!(assemble_word("ret"), 0x0000_8067);
    }

    #[test]
    fn li_small_fits_one_addi() {
        assert_eq!(assemble_word("li a0, 42"), assemble_word("addi a0, x0, 42"));
    }

    #[test]
    fn li_negative_small() {
        assert_eq!(assemble_word("li a0, -1"), assemble_word("addi a0, x0, -1"));
    }

    #[test]
    fn li_large_splits_hi_lo() {
        let out = asm().assemble("li t0, 0x12345");
        assert!(out.is_ok(), "{:?}", out.errors);
        assert_eq!(out.bytes.len(), 8);
        assert_eq!(word_at(&out.bytes, 0), assemble_word("lui t0, 0x12"));
        assert_eq!(word_at(&out.bytes, 4), assemble_word("addi t0, t0, 0x345"));
    }

    #[test]
    fn li_adjusts_high_when_low_is_negative() {
        // 0x12FFF: low 12 bits sign-extend to -1, so the lui constant is
        // one larger than the raw upper bits.
        let out = asm().assemble("li t0, 0x12FFF");
        assert_eq!(word_at(&out.bytes, 0), assemble_word("lui t0, 0x13"));
        assert_eq!(word_at(&out.bytes, 4), assemble_word("addi t0, t0, -1"));
    }

    #[test]
    fn li_exact_lui_omits_addi() {
        let out = asm().assemble("li t0, 0x12000");
        assert_eq!(out.bytes.len(), 4);
        assert_eq!(word_at(&out.bytes, 0), assemble_word("lui t0, 0x12"));
    }

    #[test]
    fn li_rejects_symbols() {
        let out = asm().assemble("li t0, somewhere");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("Invalid immediate value 'somewhere'"));
    }

    #[test]
    fn li_rejects_oversized_values() {
        let out = asm().assemble("li t0, 0x100000000");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("out of range"));
    }

    #[test]
    fn j_and_branch_pseudos() {
        assert_eq!(assemble_word("j 8"), assemble_word("jal x0, 8"));
        assert_eq!(assemble_word("beqz a0, 8"), assemble_word("beq a0, x0, 8"));
        assert_eq!(assemble_word("bnez a0, 8"), assemble_word("bne a0, x0, 8"));
    }

    #[test]
    fn pseudo_operand_count_is_checked() {
        let out = asm().assemble("mv a0");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "Too few tokens");
    }

    // Directives.

    #[test]
    fn byte_directive() {
        let out = asm().assemble(".byte 1, 2, 0xFF, -1");
        assert_eq!(out.bytes, vec![1, 2, 0xFF, 0xFF]);
    }

    #[test]
    fn half_directive_little_endian() {
        let out = asm().assemble(".half 0xBEEF");
        assert_eq!(out.bytes, vec![0xEF, 0xBE]);
    }

    #[test]
    fn word_directive_little_endian() {
        let out = asm().assemble(".word 0xDEADBEEF");
        assert_eq!(out.bytes, vec![0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn byte_directive_range_checked() {
        let out = asm().assemble(".byte 256");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("out of range [-128..255]"));
    }

    #[test]
    fn zero_directive() {
        let out = asm().assemble(".zero 5");
        assert_eq!(out.bytes, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn string_directive_nul_terminates() {
        let out = asm().assemble(".string \"hi\"");
        assert_eq!(out.bytes, b"hi\0");
    }

    #[test]
    fn string_directive_unescapes() {
        let out = asm().assemble(".asciz \"a\\nb\"");
        assert_eq!(out.bytes, b"a\nb\0");
    }

    #[test]
    fn segment_directives_emit_nothing() {
        let out = asm().assemble(".text\nnop\n.data\n.byte 1");
        assert!(out.is_ok(), "{:?}", out.errors);
        assert_eq!(out.bytes.len(), 5);
    }

    // Disassembly uses ABI names.

    #[test]
    fn disassemble_uses_abi_names() {
        let dis = asm().disassemble(&0x0050_0093u32.to_le_bytes(), 0);
        assert_eq!(dis.lines, vec!["addi ra zero 5"]);
    }

    #[test]
    fn disassemble_branch_offset() {
        let dis = asm().disassemble(&0xFE00_0EE3u32.to_le_bytes(), 0);
        assert_eq!(dis.lines, vec!["beq zero zero -4"]);
    }
}
