//! Every dynamic composite (`dynvec` and `table`) starts with an offset table. The first four bytes hold the total
//! size of the encoded value, including the table itself, as a little-endian `u32`. They are followed by one `u32`
//! per item, each pointing at the first byte of that item's body relative to the start of the value. The bodies
//! follow in order, so the end of item `i` is the start of item `i + 1` and the end of the last item is the total
//! size.
//!
//! ```text
//!  total_size | offset_0 | offset_1 | ... | offset_{n-1} | body_0 | body_1 | ... | body_{n-1}
//! ```
//!
//! A table knows how many fields it has, a dynvec has to infer the item count from `offset_0`, which equals the size
//! of the offset table. The whole table is validated before any count is derived or any body is sliced out.

use crate::error::ErrorKind;
use std::ops::Range;

/// Size of a single `u32` header word.
pub const WORD: usize = 4;

/// How many offsets the decoder should expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Derive the count from the first offset, as dynvecs do
    Inferred,
    /// A table with exactly this many fields
    Exactly(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    total_size: usize,
    offsets: Vec<usize>,
}

impl Header {

    /// Lay out the offset table for the given item bodies.
    pub fn for_items<B: AsRef<[u8]>>(items: &[B]) -> Result<Self, ErrorKind> {
        let mut offset = WORD + WORD * items.len();
        let mut offsets = Vec::with_capacity(items.len());
        for item in items {
            offsets.push(offset);
            offset += item.as_ref().len();
        }
        let header = Header { total_size: offset, offsets };
        to_u32(header.total_size)?;
        Ok(header)
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the number of written bytes
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<usize, ErrorKind> {
        w.extend_from_slice(&to_u32(self.total_size)?.to_le_bytes());
        for &offset in &self.offsets {
            w.extend_from_slice(&to_u32(offset)?.to_le_bytes());
        }
        Ok(WORD + WORD * self.offsets.len())
    }

    /// Validate the offset table at the start of `buf`, which has to be the complete encoded value.
    pub fn decode(buf: &[u8], count: Count) -> Result<Self, ErrorKind> {
        let total_size = read_u32(buf, 0).ok_or_else(|| {
            tracing::trace!(len = buf.len(), "buffer too short for a total size");
            ErrorKind::MinLength { expected: WORD, actual: buf.len() }
        })?;
        if total_size != buf.len() {
            tracing::trace!(total_size, len = buf.len(), "total size disagrees with buffer length");
            return Err(ErrorKind::Length { expected: total_size, actual: buf.len() });
        }
        if total_size == WORD || count == Count::Exactly(0) {
            return Ok(Header { total_size, offsets: Vec::new() });
        }
        if total_size < 2 * WORD {
            return Err(reject(format!("total size {} leaves no room for an offset", total_size)));
        }
        let header_len = match count {
            Count::Inferred => {
                let first = read_u32(buf, WORD).unwrap_or_default();
                if first < 2 * WORD || first % WORD != 0 || first > total_size {
                    return Err(reject(format!("first offset {} is not a valid header size", first)));
                }
                first
            },
            Count::Exactly(n) => {
                let header_len = n.checked_mul(WORD).and_then(|len| len.checked_add(WORD))
                    .filter(|&len| len <= total_size)
                    .ok_or_else(|| reject(format!("{} offsets do not fit into {} bytes", n, total_size)))?;
                let first = read_u32(buf, WORD).unwrap_or_default();
                if first != header_len {
                    return Err(reject(format!("first offset {} should be {}", first, header_len)));
                }
                header_len
            },
        };
        let mut offsets = Vec::with_capacity(header_len / WORD - 1);
        let mut previous = header_len;
        for at in (WORD..header_len).step_by(WORD) {
            let offset = read_u32(buf, at).unwrap_or_default();
            if offset < previous || offset > total_size {
                return Err(reject(format!("offset {} at position {} is out of order or out of bounds", offset, at / WORD - 1)));
            }
            offsets.push(offset);
            previous = offset;
        }
        Ok(Header { total_size, offsets })
    }

    /// The byte range of every item body, in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.offsets.iter().enumerate().map(move |(i, &start)| {
            start..self.offsets.get(i + 1).copied().unwrap_or(self.total_size)
        })
    }

}

/// Assemble a complete dynamic composite from its item bodies.
pub fn pack_dynamic<B: AsRef<[u8]>>(items: &[B]) -> Result<Vec<u8>, ErrorKind> {
    let header = Header::for_items(items)?;
    let mut buf = Vec::with_capacity(header.total_size);
    header.encode(&mut buf)?;
    for item in items {
        buf.extend_from_slice(item.as_ref());
    }
    Ok(buf)
}

/// Read the little-endian `u32` at `at`, if there are enough bytes.
pub fn read_u32(buf: &[u8], at: usize) -> Option<usize> {
    let word = buf.get(at..at.checked_add(WORD)?)?;
    let mut tmp = [0u8; WORD];
    tmp.copy_from_slice(word);
    usize::try_from(u32::from_le_bytes(tmp)).ok()
}

pub fn to_u32(value: usize) -> Result<u32, ErrorKind> {
    u32::try_from(value).map_err(|_| ErrorKind::TooLarge(value))
}

fn reject(reason: String) -> ErrorKind {
    tracing::trace!(%reason, "offset table rejected");
    ErrorKind::Offset(reason)
}
