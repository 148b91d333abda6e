//! Bit sources.
use std::io::{self, BufReader, ErrorKind, Read};

use crate::prelude::*;
use crate::InputType;

/// Reads demodulated bits from a byte stream encoded according to an [InputType].
///
/// The iterator ends at the end of the input. Any other read error is yielded, after
/// which iteration may be continued or abandoned by the caller.
pub struct BitReader<R>
where
    R: Read,
{
    reader: BufReader<R>,
    input_type: InputType,
    buf: [u8; 1],
    // Bits of the current byte not yet yielded, most significant first
    byte: u8,
    remaining: u8,
    num_read: usize,
}

impl<R> BitReader<R>
where
    R: Read,
{
    pub fn new(reader: R, input_type: InputType) -> Self {
        BitReader {
            reader: BufReader::new(reader),
            input_type,
            buf: [0u8; 1],
            byte: 0,
            remaining: 0,
            num_read: 0,
        }
    }

    /// Number of bytes consumed from the underlying reader.
    pub fn offset(&self) -> usize {
        self.num_read
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.num_read += 1;
                    return Ok(Some(self.buf[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn next_ascii_bit(&mut self) -> io::Result<Option<bool>> {
        while let Some(b) = self.next_byte()? {
            match b {
                b'0' => return Ok(Some(false)),
                b'1' => return Ok(Some(true)),
                _ => {}
            }
        }
        Ok(None)
    }

    fn next_packed_bit(&mut self) -> io::Result<Option<bool>> {
        if self.remaining == 0 {
            let Some(b) = self.next_byte()? else {
                return Ok(None);
            };
            self.byte = b;
            self.remaining = 8;
        }
        self.remaining -= 1;
        Ok(Some((self.byte >> self.remaining) & 0x1 == 1))
    }
}

impl<R> Iterator for BitReader<R>
where
    R: Read,
{
    type Item = Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        let zult = match self.input_type {
            InputType::AsciiBits => self.next_ascii_bit(),
            InputType::PackedBits => self.next_packed_bit(),
        };
        match zult {
            Ok(Some(bit)) => Some(Ok(bit)),
            Ok(None) => None,
            Err(err) => Some(Err(Error::Io(err))),
        }
    }
}

/// Creates an iterator of the bits in `reader` encoded as `input_type`.
pub fn read_bits<R>(reader: R, input_type: InputType) -> BitReader<R>
where
    R: Read,
{
    BitReader::new(reader, input_type)
}
