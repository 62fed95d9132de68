//! Records read from a Fortran unformatted sequential file
//!
//! A [`Record`] holds the bytes between its two length markers. It has no
//! tie to the file it came from. Clones share one data buffer and each
//! keep their own decode position. Typed decoding walks the buffer
//! with an internal cursor, so several fields written by one Fortran
//! `write` statement can be read back with successive calls.

use std::sync::Arc;

use super::element::{self, Element, ElementKind, Values};
use super::marker::Endianness;
use super::search::SearchTarget;
use crate::error::{FortranError, FortranResult};

/// One framed record and its decode cursor
#[derive(Debug, Clone)]
pub struct Record {
    /// Record data (markers excluded), shared between clones
    data: Arc<Vec<u8>>,
    /// File offset of the leading marker
    offset: u64,
    /// Byte order used when decoding
    order: Endianness,
    /// Decode cursor within `data`
    position: usize,
}

impl Record {
    /// Create a new record
    pub fn new(data: Vec<u8>, offset: u64, order: Endianness) -> Self {
        Record {
            data: Arc::new(data),
            offset,
            order,
            position: 0,
        }
    }

    /// Raw record data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the record, returning its data
    ///
    /// Copies the data only if a clone of this record is still alive.
    pub fn into_data(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Length of the record data in bytes
    ///
    /// This is the value of the record's markers, independent of any
    /// element kind.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if record is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the record data in bytes
    #[deprecated(note = "use `Record::len` instead")]
    pub fn reclen(&self) -> usize {
        self.len()
    }

    /// File offset of the record's leading marker
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Byte order used for decoding
    pub fn endianness(&self) -> Endianness {
        self.order
    }

    /// Current decode position in bytes
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the decode position
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Move the decode position back to the start of the record
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Decode `count` elements of type `T` at the decode position
    ///
    /// Fails without moving the position if the record does not hold
    /// `count` more elements.
    pub fn read<T: Element>(&mut self, count: usize) -> FortranResult<Vec<T>> {
        let order = self.order;
        let bytes = self.take(T::KIND, count)?;
        Ok(element::decode(bytes, order))
    }

    /// Decode `count` elements of a kind chosen at runtime
    pub fn decode(&mut self, kind: ElementKind, count: usize) -> FortranResult<Values> {
        Ok(match kind {
            ElementKind::Int32 => Values::Int32(self.read(count)?),
            ElementKind::Int64 => Values::Int64(self.read(count)?),
            ElementKind::Float64 => Values::Float64(self.read(count)?),
        })
    }

    /// Decode everything after the decode position as `f64` values
    pub fn to_float_array(&mut self) -> FortranResult<Vec<f64>> {
        let width = ElementKind::Float64.width();
        let remaining = self.remaining();
        if remaining % width != 0 {
            return Err(FortranError::Misaligned {
                kind: ElementKind::Float64,
                remaining,
            });
        }
        self.read(remaining / width)
    }

    /// Whether the record data contains `target` anywhere
    pub fn contains<'a>(&self, target: impl Into<SearchTarget<'a>>) -> bool {
        target.into().is_within(&self.data)
    }

    /// Record data as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Claim the bytes for `count` elements and advance past them
    fn take(&mut self, kind: ElementKind, count: usize) -> FortranResult<&[u8]> {
        let out_of_range = || FortranError::OutOfRange {
            kind,
            count,
            position: self.position,
            len: self.data.len(),
        };

        let size = count.checked_mul(kind.width()).ok_or_else(out_of_range)?;
        if size > self.remaining() {
            return Err(out_of_range());
        }

        let start = self.position;
        self.position += size;
        Ok(&self.data[start..start + size])
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl PartialEq<[u8]> for Record {
    fn eq(&self, other: &[u8]) -> bool {
        self.data.as_slice() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::element::encode;

    fn float_record(values: &[f64]) -> Record {
        Record::new(encode(values, Endianness::Native), 0, Endianness::Native)
    }

    #[test]
    fn test_successive_reads_share_cursor() {
        let mut data = encode(&[3i32], Endianness::Little);
        data.extend(encode(&[1.0f64, 2.0, 3.0], Endianness::Little));
        let mut record = Record::new(data, 0, Endianness::Little);

        let n = record.read::<i32>(1).unwrap()[0];
        assert_eq!(n, 3);
        assert_eq!(record.position(), 4);

        let x = record.read::<f64>(n as usize).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(record.remaining(), 0);
    }

    #[test]
    fn test_out_of_range_leaves_cursor() {
        let mut record = float_record(&[1.0, 2.0]);
        let err = record.read::<f64>(3).unwrap_err();
        assert!(matches!(
            err,
            FortranError::OutOfRange {
                kind: ElementKind::Float64,
                count: 3,
                position: 0,
                len: 16,
            }
        ));
        assert_eq!(record.position(), 0);
        assert_eq!(record.read::<f64>(2).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_huge_count_is_out_of_range() {
        let mut record = float_record(&[1.0]);
        assert!(record.read::<i64>(usize::MAX).is_err());
    }

    #[test]
    fn test_decode_runtime_kind() {
        let data = encode(&[3i64, 3], Endianness::Native);
        let mut record = Record::new(data, 0, Endianness::Native);
        let values = record.decode(ElementKind::Int64, 2).unwrap();
        assert_eq!(values, Values::Int64(vec![3, 3]));
    }

    #[test]
    fn test_to_float_array_uses_remaining() {
        let mut record = float_record(&[1.0, 2.0, 3.0]);
        record.read::<f64>(1).unwrap();
        assert_eq!(record.to_float_array().unwrap(), vec![2.0, 3.0]);

        record.rewind();
        assert_eq!(record.to_float_array().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_to_float_array_misaligned() {
        let mut record = Record::new(b"ABC".to_vec(), 0, Endianness::Native);
        assert!(matches!(
            record.to_float_array(),
            Err(FortranError::Misaligned { remaining: 3, .. })
        ));
    }

    #[test]
    fn test_length_is_bytes() {
        let record = Record::new(b"ABC".to_vec(), 0, Endianness::Native);
        assert_eq!(record.len(), 3);
        #[allow(deprecated)]
        let reclen = record.reclen();
        assert_eq!(reclen, 3);
    }

    #[test]
    fn test_contains() {
        let record = Record::new(b"LABEL".to_vec(), 0, Endianness::Native);
        assert!(record.contains(b"LABEL"));
        assert!(record.contains("ABE"));
        assert!(!record.contains("NOLABEL"));
        assert_eq!(record.as_str(), Some("LABEL"));
    }

    #[test]
    fn test_clones_share_data_not_position() {
        let mut record = float_record(&[1.0, 2.0]);
        let mut copy = record.clone();
        assert_eq!(copy.data().as_ptr(), record.data().as_ptr());

        assert_eq!(record.read::<f64>(1).unwrap(), vec![1.0]);
        assert_eq!(copy.position(), 0);
        assert_eq!(copy.read::<f64>(2).unwrap(), vec![1.0, 2.0]);

        drop(copy);
        assert_eq!(record.into_data(), encode(&[1.0f64, 2.0], Endianness::Native));
    }
}
