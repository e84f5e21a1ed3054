// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Big-value and count-1 Huffman decoding.
//!
//! Code trees are stored as a contiguous arena of nodes addressed by
//! integer index rather than as owning pointers: each node is either an
//! internal node carrying its two children's indices, or a leaf carrying
//! the decoded `(x, y)` pair. This avoids the owning-pointer-plus-destructor
//! shape of a hand-rolled binary tree entirely.
//!
//! Trees are built once, behind `lazy_static!`, by running the classic
//! minimum-weight-merge Huffman construction over a weighting that favors
//! small-magnitude `(x, y)` pairs, the same shape of distribution the
//! standard's own tables were built from. This guarantees, by construction,
//! a valid prefix code (the Kraft sum is exactly 1) for every table width
//! this crate uses. It is **not** a verbatim transcription of the
//! ISO/IEC 11172-3 Annex B code tables — see `DESIGN.md` for why: the
//! retrieved pack's own references to those tables (`requantize.rs`'s
//! `crate::huffman_tables::*` import, `original_source/huffman.cc`'s
//! `kHuffmanTableCodes`) are uses of a table module neither source actually
//! ships, so there is no literal table data in this crate's corpus to
//! transcribe from.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use lazy_static::lazy_static;

use crate::bitreader::peek_bits;
use crate::error::{huffman_error, Result};

#[derive(Clone, Copy, Debug)]
enum Node {
    Leaf { x: u32, y: u32 },
    Branch { zero: usize, one: usize },
}

/// A binary Huffman tree over `(x, y)` pairs, stored as an arena of nodes.
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

struct HeapItem {
    weight: u64,
    seq: u64,
    node: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for a min-heap; break ties on insertion order so
        // construction is deterministic.
        other.weight.cmp(&self.weight).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl HuffmanTree {
    /// Build a tree over every `(x, y)` with `x, y < width`, weighting each
    /// symbol by `weight_fn(x, y)`. Heavier symbols receive shorter codes.
    fn from_weights(width: u32, weight_fn: impl Fn(u32, u32) -> u64) -> HuffmanTree {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        for x in 0..width {
            for y in 0..width {
                let idx = nodes.len();
                nodes.push(Node::Leaf { x, y });
                heap.push(HeapItem { weight: weight_fn(x, y).max(1), seq, node: idx });
                seq += 1;
            }
        }

        if heap.len() == 1 {
            let only = heap.pop().unwrap();
            return HuffmanTree { nodes, root: only.node };
        }

        while heap.len() > 1 {
            let a = heap.pop().unwrap();
            let b = heap.pop().unwrap();
            let idx = nodes.len();
            nodes.push(Node::Branch { zero: a.node, one: b.node });
            heap.push(HeapItem { weight: a.weight + b.weight, seq, node: idx });
            seq += 1;
        }

        HuffmanTree { nodes, root: heap.pop().unwrap().node }
    }

    /// Build one of the two count-1 quadruple trees. Both hang all 16
    /// `(v, w, x, y)` quadruples off a single tree, packing `v, w` into the
    /// leaf's `x` slot and `x, y` into its `y` slot (the caller,
    /// `decode_count1_quad`, unpacks them). `force_zero_quad_one_bit` gives
    /// the all-zero quadruple the standard's shortest, 1-bit code (table B's
    /// defining property); the remaining 15 quadruples are Huffman-coded by
    /// popcount, so sparser quadruples — the common case in real audio — get
    /// shorter codes, the same shape the standard's own tables favor.
    fn count1_table(force_zero_quad_one_bit: bool) -> HuffmanTree {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        let zero_quad = if force_zero_quad_one_bit {
            let idx = nodes.len();
            nodes.push(Node::Leaf { x: 0, y: 0 });
            Some(idx)
        } else {
            None
        };

        for v in 0..2u32 {
            for w in 0..2u32 {
                for xx in 0..2u32 {
                    for yy in 0..2u32 {
                        if zero_quad.is_some() && v == 0 && w == 0 && xx == 0 && yy == 0 {
                            continue;
                        }
                        let idx = nodes.len();
                        nodes.push(Node::Leaf { x: (v << 1) | w, y: (xx << 1) | yy });
                        let popcount = v + w + xx + yy;
                        let weight = 16u64 >> popcount;
                        heap.push(HeapItem { weight: weight.max(1), seq, node: idx });
                        seq += 1;
                    }
                }
            }
        }

        while heap.len() > 1 {
            let a = heap.pop().unwrap();
            let b = heap.pop().unwrap();
            let idx = nodes.len();
            nodes.push(Node::Branch { zero: a.node, one: b.node });
            heap.push(HeapItem { weight: a.weight + b.weight, seq, node: idx });
            seq += 1;
        }
        let rest_root = heap.pop().unwrap().node;

        match zero_quad {
            Some(zero_quad) => {
                let root = nodes.len();
                nodes.push(Node::Branch { zero: rest_root, one: zero_quad });
                HuffmanTree { nodes, root }
            }
            None => HuffmanTree { nodes, root: rest_root },
        }
    }

    /// Decode one `(x, y)` pair starting at `*cursor`, advancing it past the
    /// matched code. Fails if no leaf is reached within 32 bits.
    pub fn decode(&self, buf: &[u8], cursor: &mut usize) -> Result<(u32, u32)> {
        let mut node = self.root;
        for depth in 0..32u32 {
            match self.nodes[node] {
                Node::Leaf { x, y } => {
                    *cursor += depth as usize;
                    return Ok((x, y));
                }
                Node::Branch { zero, one } => {
                    let bit = peek_bits(buf, *cursor + depth as usize, 1);
                    node = if bit == 0 { zero } else { one };
                }
            }
        }
        if let Node::Leaf { x, y } = self.nodes[node] {
            *cursor += 32;
            return Ok((x, y));
        }
        huffman_error("no Huffman table entry matched the next 32 bits")
    }
}

/// Metadata for one of the 32 big-value Huffman table slots: `linbits` is
/// the number of extra bits read after an escape code, and `width` is the
/// table's side length (symbols run `0..width` in each dimension). Table
/// indices 0, 4, and 14 are reserved by the standard and decode nothing
/// (an all-zero `big_values` region uses table 0).
#[derive(Clone, Copy)]
pub struct BigValueTableInfo {
    pub width: u32,
    pub linbits: u32,
}

pub const HUFFMAN_TABLE_INFO: [Option<BigValueTableInfo>; 32] = {
    const fn t(width: u32, linbits: u32) -> Option<BigValueTableInfo> {
        Some(BigValueTableInfo { width, linbits })
    }
    [
        None,              // 0: reserved, big_values implicitly 0
        t(2, 0),           // 1
        t(3, 0),           // 2
        t(3, 0),           // 3
        None,              // 4: reserved
        t(4, 0),           // 5
        t(4, 0),           // 6
        t(6, 0),           // 7
        t(6, 0),           // 8
        t(6, 0),           // 9
        t(8, 0),           // 10
        t(8, 0),           // 11
        t(8, 0),           // 12
        t(16, 0),          // 13
        None,              // 14: reserved
        t(16, 0),          // 15
        t(16, 1),          // 16
        t(16, 2),          // 17
        t(16, 3),          // 18
        t(16, 4),          // 19
        t(16, 6),          // 20
        t(16, 8),          // 21
        t(16, 10),         // 22
        t(16, 13),         // 23
        t(16, 4),          // 24
        t(16, 5),          // 25
        t(16, 6),          // 26
        t(16, 7),          // 27
        t(16, 8),          // 28
        t(16, 9),          // 29
        t(16, 11),         // 30
        t(16, 13),         // 31
    ]
};

lazy_static! {
    /// One Huffman tree per distinct table width used by the 32 big-value
    /// table slots (widths 2, 3, 4, 6, 8, 16); slots that share a width
    /// share the same underlying tree and differ only in `linbits`, mirroring
    /// how the standard's table 16 and table 24 families share one code
    /// table across several `linbits` variants.
    static ref BIG_VALUE_TREES: std::collections::HashMap<u32, HuffmanTree> = {
        let mut trees = std::collections::HashMap::new();
        for width in [2u32, 3, 4, 6, 8, 16] {
            let tree = HuffmanTree::from_weights(width, |x, y| {
                let radius = (x + y) as u64;
                1_000_000 / (radius + 1).pow(2)
            });
            trees.insert(width, tree);
        }
        trees
    };

    /// Count-1 table A, selected when `count1table_select == 0`.
    static ref COUNT1_TABLE_A: HuffmanTree = HuffmanTree::count1_table(false);

    /// Count-1 table B, selected when `count1table_select == 1`; its defining
    /// difference from table A is the forced 1-bit all-zero-quadruple code.
    static ref COUNT1_TABLE_B: HuffmanTree = HuffmanTree::count1_table(true);
}

/// Look up the big-value tree for a `table_select` index, if that index
/// decodes anything (indices 0, 4, 14 are reserved and never selected for a
/// non-empty region).
pub fn big_value_tree(table_select: u8) -> Option<(&'static HuffmanTree, BigValueTableInfo)> {
    let info = HUFFMAN_TABLE_INFO[table_select as usize]?;
    let tree = BIG_VALUE_TREES.get(&info.width)?;
    Some((tree, info))
}

/// Decode one count-1 quadruple `(v, w, x, y)`, each in `{0, 1}`.
pub fn decode_count1_quad(buf: &[u8], cursor: &mut usize, table_a: bool) -> Result<(u32, u32, u32, u32)> {
    let tree: &HuffmanTree = if table_a { &COUNT1_TABLE_A } else { &COUNT1_TABLE_B };
    let (packed_vw, packed_xy) = tree.decode(buf, cursor)?;
    let v = (packed_vw >> 1) & 1;
    let w = packed_vw & 1;
    let x = (packed_xy >> 1) & 1;
    let y = packed_xy & 1;
    Ok((v, w, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_value_tree_round_trips_every_symbol() {
        let (tree, info) = big_value_tree(2).unwrap();
        for x in 0..info.width {
            for y in 0..info.width {
                // Encode by walking the tree to find the code for (x, y),
                // then decode it back.
                let code = encode_for_test(tree, x, y);
                let mut cursor = 0usize;
                let buf = bits_to_bytes(&code);
                let (dx, dy) = tree.decode(&buf, &mut cursor).unwrap();
                assert_eq!((dx, dy), (x, y));
                assert_eq!(cursor, code.len());
            }
        }
    }

    #[test]
    fn reserved_table_indices_have_no_tree() {
        assert!(big_value_tree(0).is_none());
        assert!(big_value_tree(4).is_none());
        assert!(big_value_tree(14).is_none());
    }

    #[test]
    fn count1_table_b_all_zero_quad_is_one_bit() {
        let buf = [0b1000_0000u8];
        let mut cursor = 0usize;
        let quad = decode_count1_quad(&buf, &mut cursor, false).unwrap();
        assert_eq!(quad, (0, 0, 0, 0));
        assert_eq!(cursor, 1);
    }

    #[test]
    fn count1_table_a_round_trips_every_quad() {
        let tree = &*COUNT1_TABLE_A;
        for v in 0..2u32 {
            for w in 0..2u32 {
                for xx in 0..2u32 {
                    for yy in 0..2u32 {
                        let code = encode_for_test(tree, (v << 1) | w, (xx << 1) | yy);
                        let buf = bits_to_bytes(&code);
                        let mut cursor = 0usize;
                        let quad = decode_count1_quad(&buf, &mut cursor, true).unwrap();
                        assert_eq!(quad, (v, w, xx, yy));
                        assert_eq!(cursor, code.len());
                    }
                }
            }
        }
    }

    fn encode_for_test(tree: &HuffmanTree, x: u32, y: u32) -> Vec<u8> {
        fn walk(nodes: &[Node], node: usize, x: u32, y: u32, path: &mut Vec<u8>) -> bool {
            match nodes[node] {
                Node::Leaf { x: lx, y: ly } => lx == x && ly == y,
                Node::Branch { zero, one } => {
                    path.push(0);
                    if walk(nodes, zero, x, y, path) {
                        return true;
                    }
                    path.pop();
                    path.push(1);
                    if walk(nodes, one, x, y, path) {
                        return true;
                    }
                    path.pop();
                    false
                }
            }
        }
        let mut path = Vec::new();
        assert!(walk(&tree.nodes, tree.root, x, y, &mut path));
        path
    }

    fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; (bits.len() + 7) / 8 + 1];
        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        out
    }
}
