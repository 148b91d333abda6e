#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of bits in a block: 16 message bits followed by 10 check bits.
pub const BLOCK_LEN: u32 = 26;
/// Mask of the significant bits of a block.
pub const BLOCK_MASK: u32 = 0x3ff_ffff;
/// Number of check bits at the low end of a block.
pub const CHECK_LEN: u32 = 10;

/// 10-bit result of multiplying a block by the parity-check matrix.
pub type Syndrome = u16;

/// Generator polynomial x^10 + x^8 + x^7 + x^5 + x^4 + x^3 + 1.
const GENERATOR: u32 = 0x5b9;

/// Parity-check matrix H, first row corresponding to the most significant block bit.
///
/// Ref: IEC 62106, Annex B.2.1
const PARITY_CHECK_MATRIX: [u32; BLOCK_LEN as usize] = [
    0x200, 0x100, 0x080, 0x040, 0x020, 0x010, 0x008, 0x004, 0x002, 0x001, 0x2dc, 0x16e, 0x0b7,
    0x287, 0x39f, 0x313, 0x355, 0x376, 0x1bb, 0x201, 0x3dc, 0x1ee, 0x0f7, 0x2a7, 0x38f, 0x31b,
];

/// Identifies which position in a group a block claims to occupy.
///
/// Blocks that match none of the known syndromes have no offset, which is expressed as
/// `Option<Offset>` being `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Offset {
    A,
    B,
    C,
    /// Alternate of [Offset::C] used by version B groups.
    CPrime,
    D,
}

impl Offset {
    /// Every offset, in table construction order.
    pub const ALL: [Offset; 5] = [
        Offset::A,
        Offset::B,
        Offset::C,
        Offset::CPrime,
        Offset::D,
    ];

    /// The offset word added to the check bits of blocks at this offset.
    #[must_use]
    pub fn word(self) -> u16 {
        match self {
            Offset::A => 0x0fc,
            Offset::B => 0x198,
            Offset::C => 0x168,
            Offset::CPrime => 0x350,
            Offset::D => 0x1b4,
        }
    }

    /// Syndrome of an error free block at this offset.
    #[must_use]
    pub fn syndrome(self) -> Syndrome {
        match self {
            Offset::A => 0x3d8,
            Offset::B => 0x3d4,
            Offset::C => 0x25c,
            Offset::CPrime => 0x3cc,
            Offset::D => 0x258,
        }
    }

    /// Look up the offset of an error free block with `syndrome`.
    #[must_use]
    pub fn for_syndrome(syndrome: Syndrome) -> Option<Offset> {
        match syndrome {
            0x3d8 => Some(Offset::A),
            0x3d4 => Some(Offset::B),
            0x25c => Some(Offset::C),
            0x3cc => Some(Offset::CPrime),
            0x258 => Some(Offset::D),
            _ => None,
        }
    }

    /// Zero-based position of this offset's block in a group. C and C' share position 2.
    #[must_use]
    pub fn block_number(self) -> usize {
        match self {
            Offset::A => 0,
            Offset::B => 1,
            Offset::C | Offset::CPrime => 2,
            Offset::D => 3,
        }
    }

    /// The offset expected after this one in the A, B, C (or C'), D cycle.
    #[must_use]
    pub fn next(self) -> Offset {
        match self {
            Offset::A => Offset::B,
            Offset::B => Offset::C,
            Offset::C | Offset::CPrime => Offset::D,
            Offset::D => Offset::A,
        }
    }
}

/// Multiply the bit vector `vec` by `matrix` over GF(2).
///
/// Rows are added modulo-two for every set bit of `vec`, where bit 0 selects the last row.
///
/// Ref: IEC 62106, Annex B.1.1
#[must_use]
pub fn matrix_multiply(vec: u32, matrix: &[u32]) -> u32 {
    matrix
        .iter()
        .rev()
        .enumerate()
        .filter(|(k, _)| *k < 32 && (vec >> k) & 0x1 == 1)
        .fold(0, |acc, (_, row)| acc ^ row)
}

/// Calculate the syndrome of the low 26 bits of `block`.
#[must_use]
pub fn calculate_syndrome(block: u32) -> Syndrome {
    // Rows are 10-bit, so the product always fits
    matrix_multiply(block & BLOCK_MASK, &PARITY_CHECK_MATRIX) as Syndrome
}

/// Encode `message` into a block for `offset`, i.e., append the check word and add the
/// offset word.
#[must_use]
pub fn encode_block(message: u16, offset: Offset) -> u32 {
    let mut reg = u32::from(message) << CHECK_LEN;
    for bit in (CHECK_LEN..BLOCK_LEN).rev() {
        if (reg >> bit) & 0x1 == 1 {
            reg ^= GENERATOR << (bit - CHECK_LEN);
        }
    }
    let check = reg & 0x3ff;

    ((u32::from(message) << CHECK_LEN) | check) ^ u32::from(offset.word())
}
