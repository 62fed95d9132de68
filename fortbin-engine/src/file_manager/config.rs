//! Format settings for reading and writing records

use serde::Deserialize;

use crate::storage::marker::{Endianness, MarkerWidth};

/// How records are framed and how their data is encoded
///
/// Deserializes from a table such as:
///
/// ```toml
/// marker_width = 4
/// byte_order = "little"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Width of the record length markers
    pub marker_width: MarkerWidth,
    /// Byte order of markers and data
    pub byte_order: Endianness,
}

impl FormatConfig {
    pub fn new(marker_width: MarkerWidth, byte_order: Endianness) -> Self {
        FormatConfig {
            marker_width,
            byte_order,
        }
    }

    pub fn with_marker_width(mut self, marker_width: MarkerWidth) -> Self {
        self.marker_width = marker_width;
        self
    }

    pub fn with_byte_order(mut self, byte_order: Endianness) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Bytes of framing around each record
    pub fn framing_overhead(&self) -> u64 {
        2 * self.marker_width.bytes() as u64
    }
}
