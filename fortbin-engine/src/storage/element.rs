//! Element kinds used to interpret record bytes
//!
//! The framing says nothing about what a record holds; the caller names the
//! element kind when decoding. Each kind has a fixed byte width.

use std::fmt;

use super::marker::Endianness;

/// Numeric element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `integer` / `integer*4`
    Int32,
    /// `integer*8`
    Int64,
    /// `double precision` / `real*8`
    Float64,
}

impl ElementKind {
    /// Width of one element in bytes
    pub fn width(&self) -> usize {
        match self {
            ElementKind::Int32 => 4,
            ElementKind::Int64 => 8,
            ElementKind::Float64 => 8,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Int32 => "Int32",
            ElementKind::Int64 => "Int64",
            ElementKind::Float64 => "Float64",
        })
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// A Rust type with a matching [`ElementKind`]
///
/// Implemented for `i32`, `i64` and `f64`.
pub trait Element: Copy + Default + fmt::Debug + sealed::Sealed {
    const KIND: ElementKind;

    /// Decode `dst.len()` elements from `src`, which must hold exactly
    /// `dst.len() * KIND.width()` bytes.
    fn decode_into(order: Endianness, src: &[u8], dst: &mut [Self]);

    /// Encode `src` into `dst`, which must hold exactly
    /// `src.len() * KIND.width()` bytes.
    fn encode_into(order: Endianness, src: &[Self], dst: &mut [u8]);
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::Int32;

    fn decode_into(order: Endianness, src: &[u8], dst: &mut [Self]) {
        endian_call!(order, read_i32_into(src, dst))
    }

    fn encode_into(order: Endianness, src: &[Self], dst: &mut [u8]) {
        endian_call!(order, write_i32_into(src, dst))
    }
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Int64;

    fn decode_into(order: Endianness, src: &[u8], dst: &mut [Self]) {
        endian_call!(order, read_i64_into(src, dst))
    }

    fn encode_into(order: Endianness, src: &[Self], dst: &mut [u8]) {
        endian_call!(order, write_i64_into(src, dst))
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    fn decode_into(order: Endianness, src: &[u8], dst: &mut [Self]) {
        endian_call!(order, read_f64_into(src, dst))
    }

    fn encode_into(order: Endianness, src: &[Self], dst: &mut [u8]) {
        endian_call!(order, write_f64_into(src, dst))
    }
}

/// Values decoded under a kind chosen at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
}

impl Values {
    /// Element kind of the values
    pub fn kind(&self) -> ElementKind {
        match self {
            Values::Int32(_) => ElementKind::Int32,
            Values::Int64(_) => ElementKind::Int64,
            Values::Float64(_) => ElementKind::Float64,
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            Values::Int32(v) => v.len(),
            Values::Int64(v) => v.len(),
            Values::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the values in bytes
    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().width()
    }
}

/// Encode a slice of values as record data
pub fn encode<T: Element>(values: &[T], order: Endianness) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * T::KIND.width()];
    T::encode_into(order, values, &mut buf);
    buf
}

/// Decode a byte slice holding a whole number of elements
pub(crate) fn decode<T: Element>(src: &[u8], order: Endianness) -> Vec<T> {
    let mut values = vec![T::default(); src.len() / T::KIND.width()];
    T::decode_into(order, &src[..values.len() * T::KIND.width()], &mut values);
    values
}
