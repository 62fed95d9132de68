//! Storage layer for Fortran unformatted sequential files
//!
//! This module handles the low-level binary format:
//! - Record length markers (width and byte order)
//! - Element kinds and their encoding
//! - Records and typed decoding of their bytes
//! - Search targets matched against record data

/// Calls a `byteorder::ByteOrder` function on the endian type selected at
/// runtime by an [`Endianness`](marker::Endianness) value.
macro_rules! endian_call {
    ($order:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $order {
            $crate::storage::marker::Endianness::Native => {
                <byteorder::NativeEndian as byteorder::ByteOrder>::$func($($arg),*)
            }
            $crate::storage::marker::Endianness::Little => {
                <byteorder::LittleEndian as byteorder::ByteOrder>::$func($($arg),*)
            }
            $crate::storage::marker::Endianness::Big => {
                <byteorder::BigEndian as byteorder::ByteOrder>::$func($($arg),*)
            }
        }
    };
}

pub mod marker;
pub mod element;
pub mod record;
pub mod search;

pub use marker::{Endianness, MarkerWidth};
pub use element::{Element, ElementKind, Values};
pub use record::Record;
pub use search::SearchTarget;
