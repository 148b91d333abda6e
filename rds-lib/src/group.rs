//! Groups of up to four message blocks.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of blocks in a group.
pub const GROUP_LEN: usize = 4;

/// A 16-bit message received in one block of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupBlock {
    pub data: u16,
    /// The block was not received error free and had to be corrected.
    pub had_errors: bool,
}

/// Blocks A, B, C (or C') and D of a group as received.
///
/// Blocks that could not be received or corrected are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    blocks: [Option<GroupBlock>; GROUP_LEN],
    c_prime: bool,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for the zero-based `block_number`.
    ///
    /// # Panics
    /// If `block_number` is not a valid block position.
    pub fn set(&mut self, block_number: usize, data: u16, had_errors: bool) {
        assert!(block_number < GROUP_LEN, "invalid block number {block_number}");
        self.blocks[block_number] = Some(GroupBlock { data, had_errors });
        if block_number == 2 {
            self.c_prime = false;
        }
    }

    /// Set the third block from a block received at offset C'.
    pub fn set_c_prime(&mut self, data: u16, had_errors: bool) {
        self.blocks[2] = Some(GroupBlock { data, had_errors });
        self.c_prime = true;
    }

    #[must_use]
    pub fn get(&self, block_number: usize) -> Option<&GroupBlock> {
        self.blocks.get(block_number).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn blocks(&self) -> &[Option<GroupBlock>; GROUP_LEN] {
        &self.blocks
    }

    /// The third block was received at offset C'.
    #[must_use]
    pub fn has_c_prime(&self) -> bool {
        self.c_prime && self.blocks[2].is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.blocks.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Option::is_none)
    }

    /// Number of received blocks that had errors.
    #[must_use]
    pub fn num_errors(&self) -> usize {
        self.blocks
            .iter()
            .flatten()
            .filter(|b| b.had_errors)
            .count()
    }

    #[must_use]
    pub fn has_pi(&self) -> bool {
        self.pi().is_some()
    }

    /// Program identification code, from block A or, in version B groups, block C'.
    #[must_use]
    pub fn pi(&self) -> Option<u16> {
        if let Some(block) = self.blocks[0] {
            return Some(block.data);
        }
        if self.c_prime {
            return self.blocks[2].map(|b| b.data);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_group_is_empty() {
        let group = Group::new();
        assert!(group.is_empty());
        assert!(!group.is_complete());
        assert!(!group.has_pi());
        assert_eq!(group.num_errors(), 0);
    }

    #[test]
    fn complete_group() {
        let mut group = Group::new();
        group.set(0, 0x6201, false);
        group.set(1, 0x0408, true);
        group.set(2, 0xe20e, false);
        assert!(!group.is_complete());
        group.set(3, 0x4552, false);

        assert!(group.is_complete());
        assert_eq!(group.pi(), Some(0x6201));
        assert_eq!(group.num_errors(), 1);
        assert_eq!(
            group.get(1),
            Some(&GroupBlock {
                data: 0x0408,
                had_errors: true
            })
        );
        assert_eq!(group.get(4), None);
    }

    #[test]
    fn pi_from_c_prime() {
        let mut group = Group::new();
        group.set_c_prime(0x6201, false);
        assert!(group.has_c_prime());
        assert_eq!(group.pi(), Some(0x6201));

        // Block A takes precedence
        group.set(0, 0x6202, false);
        assert_eq!(group.pi(), Some(0x6202));
    }

    #[test]
    fn block_c_is_not_pi() {
        let mut group = Group::new();
        group.set(2, 0x6201, false);
        assert!(!group.has_c_prime());
        assert!(!group.has_pi());
    }

    #[test]
    #[should_panic(expected = "invalid block number")]
    fn set_invalid_block_number_panics() {
        Group::new().set(4, 0, false);
    }
}
