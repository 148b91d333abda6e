use std::collections::HashMap;

use super::syndrome::{calculate_syndrome, Offset, Syndrome, BLOCK_LEN, BLOCK_MASK};

/// Burst patterns eligible for correction: a single bit, or two adjacent bits.
///
/// "...the error-correction system should be enabled, but should be restricted by
/// attempting to correct bursts of errors spanning one or two bits."
/// Kopitz & Marks 1999: "RDS: The Radio Data System", p. 224
const BURST_PATTERNS: [u32; 2] = [0b1, 0b11];

/// Precomputed mapping of (syndrome, expected offset) to the error vector that produced
/// the syndrome.
///
/// The table is immutable once built and may be shared, e.g., in an `Arc`, between any
/// number of [BlockStream](super::BlockStream)s.
///
/// Ref: IEC 62106, Annex B.2.2
#[derive(Clone, Debug)]
pub struct ErrorLookup {
    table: HashMap<(Syndrome, Offset), u32>,
}

impl ErrorLookup {
    /// Build the table for every offset, burst pattern and bit shift.
    ///
    /// When two error vectors share a key, the one enumerated first is kept.
    #[must_use]
    pub fn new() -> Self {
        let mut table = HashMap::new();
        for offset in Offset::ALL {
            for error_bits in BURST_PATTERNS {
                for shift in 0..BLOCK_LEN {
                    let error_vector = (error_bits << shift) & BLOCK_MASK;
                    let syndrome = calculate_syndrome(error_vector ^ u32::from(offset.word()));
                    table.entry((syndrome, offset)).or_insert(error_vector);
                }
            }
        }
        ErrorLookup { table }
    }

    /// Error vector for a block with `syndrome` that was expected at `offset`, if any.
    #[must_use]
    pub fn get(&self, syndrome: Syndrome, offset: Offset) -> Option<u32> {
        self.table.get(&(syndrome, offset)).copied()
    }

    /// Correct a burst error in `block` assuming it was transmitted at `offset`.
    ///
    /// Returns `block` unchanged if the syndrome does not correspond to a correctable
    /// burst.
    #[must_use]
    pub fn correct_burst_errors(&self, block: u32, offset: Offset) -> u32 {
        match self.get(calculate_syndrome(block), offset) {
            Some(error_vector) => block ^ error_vector,
            None => block,
        }
    }
}

impl Default for ErrorLookup {
    fn default() -> Self {
        Self::new()
    }
}
