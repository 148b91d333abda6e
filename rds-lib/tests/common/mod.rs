#![allow(dead_code)]

use rds::blocks::{encode_block, Offset, BLOCK_LEN};

/// PI code used by the synthetic groups.
pub const PI: u16 = 0x6201;

/// Weight-3 error pattern spanning 5 bits; detected but never corrected.
pub const UNCORRECTABLE: u32 = 0b10101 << 5;

/// Bits of `block`, most significant first.
pub fn block_bits(block: u32) -> Vec<bool> {
    (0..BLOCK_LEN).rev().map(|bit| (block >> bit) & 0x1 == 1).collect()
}

/// Messages and offsets of the `idx`th synthetic group.
pub fn group_blocks(idx: usize) -> [(u16, Offset); 4] {
    [
        (PI, Offset::A),
        (0x0400 | (idx as u16 & 0xf), Offset::B),
        (0xe20e, Offset::C),
        (0x4552, Offset::D),
    ]
}

/// Encoded blocks for `count` synthetic groups.
pub fn group_stream(count: usize) -> Vec<u32> {
    (0..count)
        .flat_map(group_blocks)
        .map(|(message, offset)| encode_block(message, offset))
        .collect()
}

pub fn to_bits(blocks: &[u32]) -> Vec<bool> {
    blocks.iter().flat_map(|b| block_bits(*b)).collect()
}

/// Render bits as ASCII `0`/`1` characters, wrapped at 64 characters per line.
pub fn to_ascii(bits: &[bool]) -> String {
    let mut s = String::new();
    for (i, bit) in bits.iter().enumerate() {
        s.push(if *bit { '1' } else { '0' });
        if i % 64 == 63 {
            s.push('\n');
        }
    }
    s
}

/// Pack bits into bytes, most significant bit first, zero padding the last byte.
pub fn to_packed(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, bit)| acc | (u8::from(*bit) << (7 - i)))
        })
        .collect()
}
