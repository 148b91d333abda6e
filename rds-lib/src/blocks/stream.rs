use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::correction::ErrorLookup;
use super::running_sum::RunningSum;
use super::syndrome::{calculate_syndrome, Offset, BLOCK_LEN, BLOCK_MASK, CHECK_LEN};
use crate::group::Group;
use crate::Options;

/// Window, in blocks, used to decide when sync is lost.
const ERROR_WINDOW: usize = 50;
/// Sync is lost when more than this many blocks in [ERROR_WINDOW] had errors.
///
/// Ref: IEC 62106, Section C.1.2
const ERROR_THRESHOLD: u32 = 45;
/// Window, in blocks, of the block error rate statistic.
const BLER_WINDOW: usize = 12;
/// Maximum distance between two offsets that can establish sync, allowing for a skipped
/// block.
const MAX_SYNC_DISTANCE: u64 = 6 * BLOCK_LEN as u64;

/// Block synchronization state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Searching bit-by-bit for two offsets a consistent number of blocks apart.
    Searching,
    /// Aligned to block boundaries, expecting the next block at `expected`.
    Synced { expected: Offset },
}

/// The most recent offset seen while searching for sync.
#[derive(Clone, Copy, Debug)]
struct Provisional {
    offset: Offset,
    bitcount: u64,
}

/// Counters accumulated over the life of a [BlockStream].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Blocks evaluated while in sync.
    pub blocks: u64,
    /// Blocks received at an unexpected offset.
    pub blocks_with_errors: u64,
    /// Blocks recovered using burst error correction.
    pub corrected: u64,
    pub uncorrectable: u64,
    pub sync_acquired: u64,
    pub sync_lost: u64,
}

/// Recovers [Group]s from a stream of demodulated bits.
///
/// Bits are pushed one at a time. Until sync is acquired every bit position is tested as
/// a possible block boundary; once synchronized, one block is evaluated every 26 bits.
/// Completed groups are queued until drained with [BlockStream::pop_groups].
///
/// ```
/// use rds::blocks::{encode_block, BlockStream, Offset};
/// use rds::Options;
///
/// let mut stream = BlockStream::new(Options::default());
/// let blocks = [
///     (0x0000, Offset::D),
///     (0x6201, Offset::A),
///     (0x0408, Offset::B),
///     (0xe20e, Offset::C),
///     (0x4552, Offset::D),
/// ];
/// for (message, offset) in blocks {
///     let block = encode_block(message, offset);
///     for bit in (0..26).rev() {
///         stream.push_bit((block >> bit) & 0x1 == 1);
///     }
/// }
/// let groups = stream.pop_groups();
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].pi(), Some(0x6201));
/// ```
#[derive(Clone, Debug)]
pub struct BlockStream {
    lookup: Arc<ErrorLookup>,
    options: Options,
    bitcount: u64,
    left_to_read: u32,
    register: u32,
    provisional: Provisional,
    received_offset: Option<Offset>,
    state: SyncState,
    pi: Option<u16>,
    block_error_sum: RunningSum,
    bler_average: RunningSum,
    current_group: Group,
    groups: Vec<Group>,
    stats: SyncStats,
}

impl BlockStream {
    /// Create a stream with its own error correction table.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self::with_lookup(options, Arc::new(ErrorLookup::new()))
    }

    /// Create a stream using a shared error correction table.
    #[must_use]
    pub fn with_lookup(options: Options, lookup: Arc<ErrorLookup>) -> Self {
        BlockStream {
            lookup,
            options,
            bitcount: 0,
            left_to_read: 1,
            register: 0,
            provisional: Provisional {
                offset: Offset::A,
                bitcount: 0,
            },
            received_offset: None,
            state: SyncState::Searching,
            pi: None,
            block_error_sum: RunningSum::new(ERROR_WINDOW),
            bler_average: RunningSum::new(BLER_WINDOW),
            current_group: Group::new(),
            groups: Vec::new(),
            stats: SyncStats::default(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        matches!(self.state, SyncState::Synced { .. })
    }

    /// Last known program identification code. Cleared when sync is lost.
    #[must_use]
    pub fn pi(&self) -> Option<u16> {
        self.pi
    }

    /// Total number of bits pushed.
    #[must_use]
    pub fn bitcount(&self) -> u64 {
        self.bitcount
    }

    /// Number of blocks with errors among the last 12 blocks evaluated in sync.
    #[must_use]
    pub fn bler_sum(&self) -> u32 {
        self.bler_average.sum()
    }

    #[must_use]
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Push the next bit of the stream.
    pub fn push_bit(&mut self, bit: bool) {
        self.register = (self.register << 1) | u32::from(bit);
        self.left_to_read -= 1;
        self.bitcount += 1;

        if self.left_to_read > 0 {
            return;
        }

        let block = self.register & BLOCK_MASK;
        self.received_offset = Offset::for_syndrome(calculate_syndrome(block));

        if self.acquire_sync() {
            self.decode_block(block);
        }

        self.left_to_read = if self.is_in_sync() { BLOCK_LEN } else { 1 };
    }

    /// Push every bit from `bits`.
    pub fn push_bits<I>(&mut self, bits: I)
    where
        I: IntoIterator<Item = bool>,
    {
        for bit in bits {
            self.push_bit(bit);
        }
    }

    /// Take all groups completed since the last call.
    pub fn pop_groups(&mut self) -> Vec<Group> {
        std::mem::take(&mut self.groups)
    }

    /// Queue the group currently being assembled, if it has any blocks, e.g., at the end
    /// of input.
    pub fn flush(&mut self) {
        let group = std::mem::take(&mut self.current_group);
        if !group.is_empty() {
            self.groups.push(group);
        }
    }

    /// Try to establish sync from the offset just received.
    ///
    /// Sync is acquired when the previous offset seen is a whole number of blocks back,
    /// at most 6, and the block numbers of the two offsets agree with that distance.
    fn acquire_sync(&mut self) -> bool {
        if self.is_in_sync() {
            return true;
        }
        let Some(received) = self.received_offset else {
            return false;
        };

        let block_len = u64::from(BLOCK_LEN);
        let dist = self.bitcount - self.provisional.bitcount;
        let consistent = (self.provisional.offset.block_number() as u64 + dist / block_len) % 4
            == received.block_number() as u64;

        if dist > 0 && dist % block_len == 0 && dist <= MAX_SYNC_DISTANCE && consistent {
            debug!(bitcount = self.bitcount, offset = ?received, "sync acquired");
            self.state = SyncState::Synced { expected: received };
            self.current_group = Group::new();
            self.stats.sync_acquired += 1;
            true
        } else {
            self.provisional = Provisional {
                offset: received,
                bitcount: self.bitcount,
            };
            false
        }
    }

    fn decode_block(&mut self, block: u32) {
        let SyncState::Synced { mut expected } = self.state else {
            return;
        };
        if expected == Offset::C && self.received_offset == Some(Offset::CPrime) {
            expected = Offset::CPrime;
        }

        let had_errors = self.received_offset != Some(expected);
        self.block_error_sum.push(u32::from(had_errors));
        self.bler_average.push(u32::from(had_errors));
        self.stats.blocks += 1;

        // Message is the high 16 bits of the block
        let mut message = (block >> CHECK_LEN) as u16;
        let mut received = self.received_offset;

        if had_errors {
            self.stats.blocks_with_errors += 1;
            let corrected = self.lookup.correct_burst_errors(block, expected);
            if corrected != block {
                message = (corrected >> CHECK_LEN) as u16;
                received = Some(expected);
                self.stats.corrected += 1;
            }
            if received != Some(expected) {
                self.uncorrectable();
            }
        }

        if received == Some(expected) {
            if expected == Offset::CPrime {
                self.current_group.set_c_prime(message, had_errors);
            } else {
                self.current_group
                    .set(expected.block_number(), message, had_errors);
            }
            if let Some(pi) = self.current_group.pi() {
                self.pi = Some(pi);
            }
        }

        let next = expected.next();
        if next == Offset::A {
            let group = std::mem::take(&mut self.current_group);
            self.groups.push(group);
        }
        // Sync may have been dropped above
        if let SyncState::Synced { expected } = &mut self.state {
            *expected = next;
        }
    }

    /// Handle a block that could not be corrected, dropping sync if errors are sustained.
    fn uncorrectable(&mut self) {
        self.stats.uncorrectable += 1;
        trace!(bitcount = self.bitcount, "uncorrectable block");

        let error_sum = self.block_error_sum.sum();
        if self.is_in_sync() && error_sum > ERROR_THRESHOLD {
            debug!(bitcount = self.bitcount, error_sum, "sync lost");
            self.state = SyncState::Searching;
            self.block_error_sum.clear();
            self.pi = None;
            self.stats.sync_lost += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::encode_block;
    use test_case::test_case;

    fn block_bits(block: u32) -> impl Iterator<Item = bool> {
        (0..BLOCK_LEN).rev().map(move |bit| (block >> bit) & 0x1 == 1)
    }

    fn push_block(stream: &mut BlockStream, message: u16, offset: Offset) {
        stream.push_bits(block_bits(encode_block(message, offset)));
    }

    /// Push a D block so the following A block establishes sync.
    fn synced_stream() -> BlockStream {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        push_block(&mut stream, 0x6201, Offset::A);
        assert!(stream.is_in_sync());
        stream
    }

    #[test]
    fn initial_state() {
        let stream = BlockStream::new(Options::default());
        assert_eq!(stream.state(), SyncState::Searching);
        assert_eq!(stream.pi(), None);
        assert_eq!(stream.bitcount(), 0);
        assert_eq!(stream.bler_sum(), 0);
    }

    #[test]
    fn single_offset_does_not_sync() {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x6201, Offset::A);
        assert!(!stream.is_in_sync());
        assert_eq!(stream.bitcount(), 26);
    }

    #[test]
    fn sync_on_consecutive_offsets() {
        let stream = synced_stream();
        assert_eq!(
            stream.state(),
            SyncState::Synced {
                expected: Offset::B
            }
        );
        assert_eq!(stream.pi(), Some(0x6201));
        assert_eq!(stream.stats().sync_acquired, 1);
    }

    #[test]
    fn sync_across_a_skipped_block() {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        assert!(!stream.is_in_sync());
        // Block A lost in the noise
        stream.push_bits(block_bits(0));
        push_block(&mut stream, 0x0408, Offset::B);
        assert_eq!(
            stream.state(),
            SyncState::Synced {
                expected: Offset::C
            }
        );
    }

    #[test_case(4, 0x6201, Offset::A, true; "five blocks apart")]
    #[test_case(5, 0x0408, Offset::B, true; "six blocks apart")]
    #[test_case(6, 0xe20e, Offset::C, false; "seven blocks apart")]
    fn sync_distance_limit(gap: usize, message: u16, offset: Offset, synced: bool) {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        for _ in 0..gap {
            stream.push_bits(block_bits(0));
        }
        push_block(&mut stream, message, offset);
        assert_eq!(stream.is_in_sync(), synced);
        assert_eq!(stream.stats().sync_acquired, u64::from(synced));
    }

    #[test]
    fn rejected_offset_becomes_the_reference() {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        for _ in 0..6 {
            stream.push_bits(block_bits(0));
        }
        push_block(&mut stream, 0xe20e, Offset::C);
        assert!(!stream.is_in_sync());

        push_block(&mut stream, 0x4552, Offset::D);
        assert_eq!(
            stream.state(),
            SyncState::Synced {
                expected: Offset::A
            }
        );
    }

    #[test]
    fn offsets_not_block_aligned_do_not_sync() {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        // Half a block, so A is 39 bits after D with a consistent block number
        stream.push_bits(std::iter::repeat(false).take(13));
        push_block(&mut stream, 0x6201, Offset::A);
        assert!(!stream.is_in_sync());
        assert_eq!(stream.bitcount(), 26 + 13 + 26);

        // A is now the reference for the next aligned block
        push_block(&mut stream, 0x0408, Offset::B);
        assert_eq!(
            stream.state(),
            SyncState::Synced {
                expected: Offset::C
            }
        );
    }

    #[test]
    fn inconsistent_offsets_do_not_sync() {
        let mut stream = BlockStream::new(Options::default());
        push_block(&mut stream, 0x0000, Offset::D);
        push_block(&mut stream, 0x0408, Offset::B);
        assert!(!stream.is_in_sync());
    }

    #[test]
    fn c_prime_replaces_c() {
        let mut stream = synced_stream();
        push_block(&mut stream, 0x1408, Offset::B);
        push_block(&mut stream, 0x6201, Offset::CPrime);
        push_block(&mut stream, 0x4552, Offset::D);

        let groups = stream.pop_groups();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert!(group.is_complete());
        assert!(group.has_c_prime());
        assert_eq!(group.num_errors(), 0);
        assert_eq!(stream.stats().blocks_with_errors, 0);
    }

    #[test]
    fn burst_error_is_corrected() {
        let mut stream = synced_stream();
        push_block(&mut stream, 0x0408, Offset::B);
        stream.push_bits(block_bits(encode_block(0xe20e, Offset::C) ^ (0b11 << 12)));
        push_block(&mut stream, 0x4552, Offset::D);

        let groups = stream.pop_groups();
        assert_eq!(groups.len(), 1);
        let block = groups[0].get(2).unwrap();
        assert_eq!(block.data, 0xe20e);
        assert!(block.had_errors);
        assert_eq!(stream.stats().corrected, 1);
        assert_eq!(stream.bler_sum(), 1);
    }

    #[test]
    fn uncorrectable_block_is_left_unset() {
        let mut stream = synced_stream();
        push_block(&mut stream, 0x0408, Offset::B);
        stream.push_bits(block_bits(encode_block(0xe20e, Offset::C) ^ (0b10101 << 5)));
        push_block(&mut stream, 0x4552, Offset::D);

        let groups = stream.pop_groups();
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].is_complete());
        assert_eq!(groups[0].get(2), None);
        assert_eq!(stream.stats().uncorrectable, 1);
        assert!(stream.is_in_sync());
    }

    #[test]
    fn flush_queues_partial_group() {
        let mut stream = synced_stream();
        stream.flush();
        let groups = stream.pop_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pi(), Some(0x6201));

        // Nothing left to flush
        stream.flush();
        assert!(stream.pop_groups().is_empty());
    }

    #[test]
    fn shared_lookup() {
        let lookup = Arc::new(ErrorLookup::new());
        let a = BlockStream::with_lookup(Options::default(), lookup.clone());
        let b = BlockStream::with_lookup(Options::default(), lookup.clone());
        assert_eq!(Arc::strong_count(&lookup), 3);
        drop((a, b));
    }
}
