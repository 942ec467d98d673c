// src/huffman.rs

//! Frequency analysis and Huffman code construction.
//!
//! Codes are built per entry from a full first pass over the input. The
//! tree is assembled over an index arena with a binary min-heap; ties in
//! frequency are broken by insertion sequence, with leaves inserted in
//! ascending symbol order, so equal-frequency symbols always combine
//! smaller-symbol-first and the produced archive bytes are identical
//! across runs and platforms.

use crate::symbol::{SymbolReader, SymbolWidth};
use crate::utils::error::{ArchiveError, Result};
use log::debug;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::Read;

/// Longest representable code, bounded by the 64-bit code word.
pub const MAX_CODE_LEN: u32 = 64;

/// The code assigned to one symbol: `len` bits right-aligned in `bits`.
///
/// `len == 0` marks a symbol that does not occur in the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u32,
}

/// Dense symbol-indexed code table covering the whole alphabet.
pub struct CodeTable {
    codes: Vec<Code>,
}

impl CodeTable {
    fn empty(width: SymbolWidth) -> Self {
        Self {
            codes: vec![Code::default(); width.alphabet_size()],
        }
    }

    pub fn get(&self, symbol: u16) -> Code {
        self.codes[symbol as usize]
    }

    /// Symbols with an assigned code, in ascending symbol order.
    pub fn assigned(&self) -> impl Iterator<Item = (u16, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.len > 0)
            .map(|(symbol, code)| (symbol as u16, *code))
    }

    /// Number of symbols with an assigned code.
    pub fn assigned_count(&self) -> usize {
        self.codes.iter().filter(|code| code.len > 0).count()
    }
}

/// Counts symbol occurrences in `input` under the given framing.
///
/// `len` is the byte length of the stream. A trailing half symbol is
/// padded by the framing, so the counts cover every input byte:
/// the counted symbols always span `len` rounded up to a symbol multiple.
pub fn count_frequencies<R: Read>(input: R, len: u64, width: SymbolWidth) -> Result<Vec<u64>> {
    let mut freq = vec![0u64; width.alphabet_size()];
    let mut symbols = SymbolReader::new(input, len, width);
    while let Some((symbol, _)) = symbols.next_symbol()? {
        freq[symbol as usize] += 1;
    }
    Ok(freq)
}

struct Node {
    symbol: u16,
    left: Option<usize>,
    right: Option<usize>,
}

/// Builds the code table for one entry from its frequency counts.
///
/// All-zero counts (an empty entry) produce an all-zero table. A lone
/// nonzero symbol is assigned a one-bit zero code: zero length would be
/// indistinguishable from an absent symbol.
pub fn build_codes(freq: &[u64], width: SymbolWidth) -> Result<CodeTable> {
    debug_assert_eq!(freq.len(), width.alphabet_size());

    let mut table = CodeTable::empty(width);
    let mut nodes: Vec<Node> = Vec::new();
    // Min-heap of (frequency, arena index); indices grow in insertion
    // order, which makes the tie-break deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();

    for (symbol, &count) in freq.iter().enumerate() {
        if count > 0 {
            let index = nodes.len();
            nodes.push(Node {
                symbol: symbol as u16,
                left: None,
                right: None,
            });
            heap.push(Reverse((count, index)));
        }
    }
    debug!("alphabet holds {} distinct symbols", nodes.len());

    while heap.len() > 1 {
        if let (Some(Reverse((freq_a, a))), Some(Reverse((freq_b, b)))) = (heap.pop(), heap.pop()) {
            let index = nodes.len();
            nodes.push(Node {
                symbol: 0,
                left: Some(a),
                right: Some(b),
            });
            heap.push(Reverse((freq_a + freq_b, index)));
        }
    }

    let root = match heap.pop() {
        Some(Reverse((_, index))) => index,
        None => return Ok(table),
    };

    if nodes[root].left.is_none() && nodes[root].right.is_none() {
        table.codes[nodes[root].symbol as usize] = Code { bits: 0, len: 1 };
        return Ok(table);
    }

    // Root-to-leaf walk: 0 descends left, 1 descends right; a leaf at
    // depth d takes the d path bits as its code.
    let mut stack: Vec<(usize, u64, u32)> = vec![(root, 0, 0)];
    while let Some((index, bits, len)) = stack.pop() {
        let node = &nodes[index];
        if node.left.is_none() && node.right.is_none() {
            if len > MAX_CODE_LEN {
                return Err(ArchiveError::CodeTooLong(len));
            }
            table.codes[node.symbol as usize] = Code { bits, len };
            continue;
        }
        if let Some(right) = node.right {
            stack.push((right, (bits << 1) | 1, len + 1));
        }
        if let Some(left) = node.left {
            stack.push((left, bits << 1, len + 1));
        }
    }

    Ok(table)
}
