//! Record length markers
//!
//! Every record on disk is framed as
//!
//! ```text
//! [length][data: length bytes][length]
//! ```
//!
//! where both length fields are unsigned integers of the same width and
//! byte order. Most compilers write 4-byte markers in the byte order of the
//! machine that produced the file.

use std::fmt;
use std::io::{self, Read, Write};

use serde::Deserialize;

use crate::error::{FortranError, FortranResult};

/// Width of a record length marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum MarkerWidth {
    /// 4-byte markers (gfortran, ifort default)
    #[default]
    Four,
    /// 8-byte markers (older gfortran `-frecord-marker=8`)
    Eight,
}

impl MarkerWidth {
    /// Number of bytes in one marker
    pub fn bytes(&self) -> usize {
        match self {
            MarkerWidth::Four => 4,
            MarkerWidth::Eight => 8,
        }
    }

    /// Largest record length this marker can describe
    pub fn max_len(&self) -> u64 {
        match self {
            MarkerWidth::Four => u32::MAX as u64,
            MarkerWidth::Eight => u64::MAX,
        }
    }
}

impl TryFrom<u8> for MarkerWidth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(MarkerWidth::Four),
            8 => Ok(MarkerWidth::Eight),
            other => Err(format!("marker width must be 4 or 8, got {}", other)),
        }
    }
}

impl fmt::Display for MarkerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// Byte order of markers and record data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Byte order of the running machine
    #[default]
    Native,
    Little,
    Big,
}

impl std::str::FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Endianness::Native),
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" => Ok(Endianness::Big),
            other => Err(format!("unknown byte order: {}", other)),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endianness::Native => "native",
            Endianness::Little => "little",
            Endianness::Big => "big",
        })
    }
}

/// Outcome of reading one marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerRead {
    /// A complete marker
    Length(u64),
    /// End of file before the first marker byte
    Eof,
    /// End of file partway through the marker; holds the bytes read
    Partial(usize),
}

/// Read as many bytes as are available, up to `buf.len()`
fn fill_buf<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read one marker
fn read_marker<R: Read>(
    reader: &mut R,
    width: MarkerWidth,
    order: Endianness,
) -> io::Result<MarkerRead> {
    let mut buf = [0u8; 8];
    let buf = &mut buf[..width.bytes()];
    let n = fill_buf(reader, buf)?;

    if n == 0 {
        return Ok(MarkerRead::Eof);
    }
    if n < buf.len() {
        return Ok(MarkerRead::Partial(n));
    }

    Ok(MarkerRead::Length(decode_marker(buf, width, order)))
}

/// Decode a marker from exactly `width.bytes()` bytes
fn decode_marker(buf: &[u8], width: MarkerWidth, order: Endianness) -> u64 {
    match width {
        MarkerWidth::Four => endian_call!(order, read_u32(buf)) as u64,
        MarkerWidth::Eight => endian_call!(order, read_u64(buf)),
    }
}

/// Encode a record length as a marker
fn encode_marker(
    len: usize,
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<Vec<u8>> {
    if len as u64 > width.max_len() {
        return Err(FortranError::RecordTooLarge {
            len,
            width: width.bytes(),
        });
    }

    let mut buf = vec![0u8; width.bytes()];
    match width {
        MarkerWidth::Four => endian_call!(order, write_u32(&mut buf, len as u32)),
        MarkerWidth::Eight => endian_call!(order, write_u64(&mut buf, len as u64)),
    }
    Ok(buf)
}

/// Read one framed record, returning its data
///
/// Returns `None` on a clean end of file before the leading marker.
pub(crate) fn read_framed<R: Read>(
    reader: &mut R,
    offset: u64,
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<Option<Vec<u8>>> {
    let len = match read_leading(reader, offset, width, order)? {
        Some(len) => len,
        None => return Ok(None),
    };

    let mut data = Vec::new();
    let found = reader.by_ref().take(len).read_to_end(&mut data)? as u64;
    if found < len {
        return Err(FortranError::Truncated {
            offset,
            expected: len,
            found,
        });
    }

    read_trailing(reader, offset, len, width, order)?;
    Ok(Some(data))
}

/// Step over one framed record without keeping its data
///
/// Markers are still checked against each other. Returns the record
/// length, or `None` at a clean end of file.
pub(crate) fn skip_framed<R: Read>(
    reader: &mut R,
    offset: u64,
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<Option<u64>> {
    let len = match read_leading(reader, offset, width, order)? {
        Some(len) => len,
        None => return Ok(None),
    };

    let found = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if found < len {
        return Err(FortranError::Truncated {
            offset,
            expected: len,
            found,
        });
    }

    read_trailing(reader, offset, len, width, order)?;
    Ok(Some(len))
}

fn read_leading<R: Read>(
    reader: &mut R,
    offset: u64,
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<Option<u64>> {
    match read_marker(reader, width, order)? {
        MarkerRead::Length(len) => Ok(Some(len)),
        MarkerRead::Eof => Ok(None),
        MarkerRead::Partial(found) => Err(FortranError::Truncated {
            offset,
            expected: width.bytes() as u64,
            found: found as u64,
        }),
    }
}

fn read_trailing<R: Read>(
    reader: &mut R,
    offset: u64,
    leading: u64,
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<()> {
    match read_marker(reader, width, order)? {
        MarkerRead::Length(trailing) if trailing == leading => Ok(()),
        MarkerRead::Length(trailing) => Err(FortranError::MarkerMismatch {
            offset,
            leading,
            trailing,
        }),
        MarkerRead::Eof => Err(FortranError::Truncated {
            offset,
            expected: width.bytes() as u64,
            found: 0,
        }),
        MarkerRead::Partial(found) => Err(FortranError::Truncated {
            offset,
            expected: width.bytes() as u64,
            found: found as u64,
        }),
    }
}

/// Write one framed record: marker, data, marker
pub(crate) fn write_framed<W: Write>(
    writer: &mut W,
    data: &[u8],
    width: MarkerWidth,
    order: Endianness,
) -> FortranResult<()> {
    let marker = encode_marker(data.len(), width, order)?;
    writer.write_all(&marker)?;
    writer.write_all(data)?;
    writer.write_all(&marker)?;
    Ok(())
}
