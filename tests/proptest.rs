//! Property-based tests using proptest.
//!
//! These tests verify assembler invariants across large, randomly generated
//! input spaces — complementing the targeted unit/integration tests:
//!
//! - assemble → disassemble → assemble is byte-identical,
//! - every word the matcher accepts decodes and re-encodes to itself,
//! - arbitrary text and byte images never panic the core.

use isa_asm::{Assembler, InstrDesc, ReverseSymbolMap, Rv32i};
use proptest::prelude::*;

fn asm() -> Assembler<Rv32i> {
    Assembler::new(Rv32i)
}

// ── Strategies ──────────────────────────────────────────────────────────

/// Arbitrary ASCII strings, including control characters and partial
/// syntax — the assembler must reject them gracefully, never panic.
fn arb_asm_input() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::char::range('\0', '\x7f'), 0..256)
        .prop_map(|v| v.into_iter().collect())
}

/// Valid RV32I instruction lines from a curated pool.
fn valid_rv32i_insn() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "nop",
        "ret",
        "ecall",
        "ebreak",
        "mv a0, a1",
        "not a0, a1",
        "neg a0, a1",
        "seqz a0, a1",
        "snez a0, a1",
        "li a0, 0",
        "li a0, 42",
        "li a0, -1",
        "li t0, 0x12345",
        "addi sp, sp, -16",
        "addi x1, x0, 5",
        "slti a0, a1, 7",
        "sltiu a0, a1, 7",
        "xori a0, a1, 0xFF",
        "ori a0, a1, 0x0F",
        "andi a0, a1, 3",
        "slli a0, a1, 4",
        "srli a0, a1, 4",
        "srai a0, a1, 4",
        "add a0, a1, a2",
        "sub a0, a1, a2",
        "sll a0, a1, a2",
        "slt a0, a1, a2",
        "sltu a0, a1, a2",
        "xor a0, a1, a2",
        "srl a0, a1, a2",
        "sra a0, a1, a2",
        "or a0, a1, a2",
        "and a0, a1, a2",
        "lw a0, 0(sp)",
        "lb a0, -4(s0)",
        "lbu a0, 1(a1)",
        "lh a0, 2(a1)",
        "lhu a0, 2(a1)",
        "sw a0, 0(sp)",
        "sb a0, -1(s0)",
        "sh a0, 2(a1)",
        "lui t0, 0xFF",
        "auipc t0, 1",
        "jal ra, 8",
        "jalr x0, x1, 0",
        "beq x0, x0, -4",
        "bne a0, a1, 16",
        "blt a0, a1, -16",
        "bge a0, a1, 32",
        "bltu a0, a1, 4",
        "bgeu a0, a1, 8",
    ])
}

/// A program of 1–40 valid instructions.
fn valid_program() -> impl Strategy<Value = String> {
    prop::collection::vec(valid_rv32i_insn(), 1..40).prop_map(|lines| lines.join("\n"))
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    /// Valid programs assemble cleanly, to exactly one word per line after
    /// expansion (every pool entry expands to a fixed instruction count).
    #[test]
    fn valid_programs_assemble(source in valid_program()) {
        let out = asm().assemble(&source);
        prop_assert!(out.is_ok(), "errors: {:?}", out.errors);
        prop_assert_eq!(out.bytes.len() % 4, 0);
        prop_assert!(!out.bytes.is_empty());
    }

    /// Invariant: assemble(disassemble(assemble(P))) == assemble(P).
    #[test]
    fn assembly_is_idempotent_through_disassembly(source in valid_program()) {
        let assembler = asm();
        let first = assembler.assemble(&source);
        prop_assert!(first.is_ok(), "errors: {:?}", first.errors);

        let dis = assembler.disassemble(&first.bytes, 0);
        prop_assert!(dis.is_ok(), "errors: {:?}", dis.errors);

        let second = assembler.assemble(&dis.lines.join("\n"));
        prop_assert!(second.is_ok(), "errors: {:?}", second.errors);
        prop_assert_eq!(second.bytes, first.bytes);
    }

    /// Invariant: for every word the matcher accepts,
    /// descriptor.assemble(descriptor.disassemble(W)) == W.
    #[test]
    fn matched_words_reencode_exactly(word in any::<u32>()) {
        let assembler = asm();
        if let Some(desc) = assembler.match_instruction(word) {
            prop_assert!(desc.matches(word));
            let tokens = desc
                .disassemble(&Rv32i, word, 0, &ReverseSymbolMap::new())
                .expect("matched word must decode");
            let back = desc.assemble(&Rv32i, &tokens, 1).expect("decoded tokens must re-encode");
            prop_assert_eq!(back.word, word);
            prop_assert!(back.link.is_none());
        }
    }

    /// The matcher never confuses two descriptors: a matched descriptor's
    /// fixed bits are present in the word.
    #[test]
    fn matcher_respects_fixed_bits(word in any::<u32>()) {
        if let Some(desc) = asm().match_instruction(word) {
            prop_assert_eq!(word & desc.fixed_mask(), desc.fixed_pattern());
        }
    }

    /// I-type immediates round-trip across their full range.
    #[test]
    fn addi_immediate_roundtrip(imm in -2048i32..=2047) {
        let assembler = asm();
        let out = assembler.assemble(&format!("addi a0, a1, {imm}"));
        prop_assert!(out.is_ok(), "errors: {:?}", out.errors);
        let dis = assembler.disassemble(&out.bytes, 0);
        prop_assert_eq!(dis.lines[0].as_str(), format!("addi a0 a1 {imm}"));
    }

    /// Branch offsets round-trip across their full even range.
    #[test]
    fn branch_offset_roundtrip(raw in -2048i32..=2047) {
        let offset = raw * 2;
        let assembler = asm();
        let out = assembler.assemble(&format!("beq t0, t1, {offset}"));
        prop_assert!(out.is_ok(), "errors: {:?}", out.errors);
        let dis = assembler.disassemble(&out.bytes, 0);
        prop_assert_eq!(dis.lines[0].as_str(), format!("beq t0 t1 {offset}"));
    }

    /// `li` always materializes exactly its operand value.
    ///
    /// The expansion's `lui`/`addi` words are interpreted the way the
    /// hardware would execute them.
    #[test]
    fn li_materializes_value(value in any::<i32>()) {
        let out = asm().assemble(&format!("li t0, {value}"));
        prop_assert!(out.is_ok(), "errors: {:?}", out.errors);

        let mut reg: i32 = 0;
        for chunk in out.bytes.chunks_exact(4) {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            match word & 0x7F {
                0x37 => reg = (word & 0xFFFF_F000) as i32, // lui
                0x13 => {
                    let imm = ((word as i32) >> 20) & 0xFFF;
                    let imm = (imm << 20) >> 20; // sign-extend
                    reg = reg.wrapping_add(imm);
                }
                other => prop_assert!(false, "unexpected opcode {other:#x}"),
            }
        }
        prop_assert_eq!(reg, value);
    }

    /// Arbitrary text never panics the assembler.
    #[test]
    fn arbitrary_input_never_panics(source in arb_asm_input()) {
        let _ = asm().assemble(&source);
    }

    /// Arbitrary byte images never panic the disassembler.
    #[test]
    fn arbitrary_images_never_panic(image in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = asm().disassemble(&image, 0);
    }

    /// Labels always resolve to the offset of the next emitted bytes.
    #[test]
    fn label_offsets_track_emission(pre in 0usize..8, post in 0usize..8) {
        let mut source = String::new();
        for _ in 0..pre {
            source.push_str("nop\n");
        }
        source.push_str("here:\n");
        for _ in 0..post {
            source.push_str("nop\n");
        }
        source.push_str("nop\n");
        let out = asm().assemble(&source);
        prop_assert!(out.is_ok(), "errors: {:?}", out.errors);
        prop_assert_eq!(out.symbol("here"), Some(pre as u32 * 4));
    }
}

// ── Non-proptest sanity anchors ─────────────────────────────────────────

/// The curated pool itself stays valid — catches pool rot if the ISA
/// tables change.
#[test]
fn instruction_pool_is_valid() {
    let assembler = asm();
    let pool = [
        "nop",
        "ret",
        "lw a0, 0(sp)",
        "beq x0, x0, -4",
        "li t0, 0x12345",
    ];
    for line in pool {
        let out = assembler.assemble(line);
        assert!(out.is_ok(), "{line}: {:?}", out.errors);
    }
}

/// `InstrDesc` is exposed for ISA authors; make sure the public pieces
/// compose outside the crate.
#[test]
fn descriptor_api_is_usable_externally() {
    use isa_asm::{BitRange, Field, ImmField};

    let desc = InstrDesc::new(
        "addi",
        vec![
            Field::register(11, 7),
            Field::register(19, 15),
            Field::Immediate(ImmField::new(vec![BitRange::new(31, 20)], true)),
        ],
        0x13,
        0x0000_707F,
    );
    let tokens: Vec<String> = ["addi", "x1", "x0", "5"].iter().map(|s| s.to_string()).collect();
    let out = desc.assemble(&Rv32i, &tokens, 1).unwrap();
    assert_eq!(out.word, 0x0050_0093);
}
