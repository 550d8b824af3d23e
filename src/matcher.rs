//! Word → instruction descriptor matching.
//!
//! Built once from the instruction table, the matcher partitions
//! descriptors by the bits they all treat as fixed and branches on the
//! value of those bits, recursing until a single candidate remains. Lookup
//! therefore touches a logarithmic number of nodes instead of scanning the
//! whole table per word.
//!
//! Two descriptors with identical `(fixed_mask, fixed_pattern)` can never
//! be told apart; that is a bug in the ISA description and panics at
//! construction.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::instruction::InstrDesc;

/// One candidate at a leaf: descriptor index plus its fixed bits for final
/// verification.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    mask: u32,
    pattern: u32,
}

#[derive(Debug, Clone)]
enum Node {
    /// Branch on `word & mask`; absent keys mean no instruction matches.
    Branch { mask: u32, arms: BTreeMap<u32, Node> },
    /// Verify the remaining candidates in table order.
    Leaf(Vec<Candidate>),
}

/// Decision tree mapping a raw 32-bit word to its instruction descriptor.
#[derive(Debug, Clone)]
pub struct Matcher {
    root: Node,
}

impl Matcher {
    /// Build the decision tree for an instruction table.
    ///
    /// # Panics
    ///
    /// Panics when two descriptors share both fixed mask and fixed pattern —
    /// such a table is ambiguous by construction.
    #[must_use]
    pub fn new(instructions: &[InstrDesc]) -> Self {
        for (i, a) in instructions.iter().enumerate() {
            for b in &instructions[i + 1..] {
                assert!(
                    a.fixed_mask() != b.fixed_mask() || a.fixed_pattern() != b.fixed_pattern(),
                    "ambiguous instruction descriptors: '{}' and '{}' share fixed mask {:#010x} and pattern {:#010x}",
                    a.mnemonic(),
                    b.mnemonic(),
                    a.fixed_mask(),
                    a.fixed_pattern(),
                );
            }
        }

        let candidates: Vec<Candidate> = instructions
            .iter()
            .enumerate()
            .map(|(index, desc)| Candidate {
                index,
                mask: desc.fixed_mask(),
                pattern: desc.fixed_pattern(),
            })
            .collect();
        Self {
            root: build(candidates, 0),
        }
    }

    /// Find the instruction whose fixed bits match `word`.
    ///
    /// Returns the descriptor's index in the table the matcher was built
    /// from, or `None` for an unknown word.
    #[must_use]
    pub fn lookup(&self, word: u32) -> Option<usize> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Branch { mask, arms } => {
                    node = arms.get(&(word & mask))?;
                }
                Node::Leaf(candidates) => {
                    return candidates
                        .iter()
                        .find(|c| word & c.mask == c.pattern)
                        .map(|c| c.index);
                }
            }
        }
    }
}

fn build(candidates: Vec<Candidate>, tested: u32) -> Node {
    if candidates.len() <= 1 {
        return Node::Leaf(candidates);
    }
    // Bits every remaining candidate fixes and that we have not branched on
    // yet. When none remain the candidates overlap; fall back to in-order
    // verification (a descriptor with a wider mask shadows a narrower one).
    let common = candidates.iter().fold(u32::MAX, |m, c| m & c.mask) & !tested;
    if common == 0 {
        return Node::Leaf(candidates);
    }

    let mut groups: BTreeMap<u32, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry(candidate.pattern & common)
            .or_default()
            .push(candidate);
    }
    let arms = groups
        .into_iter()
        .map(|(key, group)| (key, build(group, tested | common)))
        .collect();
    Node::Branch { mask: common, arms }
}
