use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;

use super::{BlockStream, ErrorLookup};
use crate::bits::{read_bits, BitReader};
use crate::group::Group;
use crate::prelude::*;
use crate::Options;

/// Iterates over [Group]s decoded from a source of bits. Created using [decode_groups]
/// or [read_groups].
///
/// When the bits are exhausted the group being assembled, if any, is produced as well.
/// Bit source errors are passed on to the consumer.
pub struct GroupIter<I>
where
    I: Iterator<Item = Result<bool>>,
{
    bits: I,
    stream: BlockStream,
    pending: VecDeque<Group>,
    done: bool,
}

impl<I> GroupIter<I>
where
    I: Iterator<Item = Result<bool>>,
{
    pub fn new(bits: I, stream: BlockStream) -> Self {
        GroupIter {
            bits,
            stream,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The underlying stream, e.g., to inspect sync state or counters.
    pub fn stream(&self) -> &BlockStream {
        &self.stream
    }
}

impl<I> Iterator for GroupIter<I>
where
    I: Iterator<Item = Result<bool>>,
{
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(group) = self.pending.pop_front() {
                return Some(Ok(group));
            }
            if self.done {
                return None;
            }
            match self.bits.next() {
                Some(Ok(bit)) => self.stream.push_bit(bit),
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.done = true;
                    self.stream.flush();
                }
            }
            self.pending.extend(self.stream.pop_groups());
        }
    }
}

/// Decode groups from an iterator of bits.
///
/// ```
/// use rds::blocks::decode_groups;
/// use rds::Options;
///
/// let bits = vec![false; 1024];
/// let groups: Vec<_> = decode_groups(bits, Options::default()).collect();
/// assert!(groups.is_empty());
/// ```
pub fn decode_groups<B>(
    bits: B,
    options: Options,
) -> GroupIter<impl Iterator<Item = Result<bool>>>
where
    B: IntoIterator<Item = bool>,
{
    GroupIter::new(bits.into_iter().map(Ok), BlockStream::new(options))
}

/// Decode groups from `reader`, interpreting its bytes according to
/// [Options::input_type].
pub fn read_groups<R>(reader: R, options: Options) -> GroupIter<BitReader<R>>
where
    R: Read,
{
    read_groups_with_lookup(reader, options, Arc::new(ErrorLookup::new()))
}

/// Like [read_groups], using `lookup` as the error correction table so it may be shared
/// by concurrent decodes.
pub fn read_groups_with_lookup<R>(
    reader: R,
    options: Options,
    lookup: Arc<ErrorLookup>,
) -> GroupIter<BitReader<R>>
where
    R: Read,
{
    let bits = read_bits(reader, options.input_type);
    GroupIter::new(bits, BlockStream::with_lookup(options, lookup))
}
