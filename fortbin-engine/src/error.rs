//! Error kinds and error handling
//!
//! Every fallible operation in the engine returns [`FortranError`]. Callers
//! that only care about the broad category (for example to pick a process
//! exit code) use [`FortranError::kind`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::file_manager::store::OpenMode;
use crate::storage::element::ElementKind;

/// Broad error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The file could not be opened
    OpenFailure,
    /// I/O error on an already open file
    Io,
    /// Leading and trailing markers disagree, or a record is cut short
    Framing,
    /// A decode ran past the end of a record
    OutOfRange,
    /// The store was used after close
    Closed,
    /// The operation does not apply to the store's current mode or state
    Usage,
}

impl ErrorKind {
    /// Whether the file itself does not conform to the record format
    pub fn is_corruption(&self) -> bool {
        matches!(self, ErrorKind::Framing)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::OpenFailure => "open failure",
            ErrorKind::Io => "I/O error",
            ErrorKind::Framing => "framing error",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::Closed => "store closed",
            ErrorKind::Usage => "usage error",
        })
    }
}

/// Main error type for the fortbin engine
#[derive(Error, Debug)]
pub enum FortranError {
    #[error("cannot open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("record at offset {offset}: leading marker {leading} does not match trailing marker {trailing}")]
    MarkerMismatch {
        offset: u64,
        leading: u64,
        trailing: u64,
    },

    #[error("record at offset {offset} truncated: expected {expected} bytes, found {found}")]
    Truncated {
        offset: u64,
        expected: u64,
        found: u64,
    },

    #[error("cannot decode {count} x {kind} at byte {position}: record holds {len} bytes")]
    OutOfRange {
        kind: ElementKind,
        count: usize,
        position: usize,
        len: usize,
    },

    #[error("{remaining} remaining bytes are not a whole number of {kind} values")]
    Misaligned { kind: ElementKind, remaining: usize },

    #[error("record of {len} bytes does not fit a {width}-byte marker")]
    RecordTooLarge { len: usize, width: usize },

    #[error("store is closed")]
    Closed,

    #[error("cannot {operation} a store opened in {mode} mode")]
    WrongMode {
        mode: OpenMode,
        operation: &'static str,
    },

    #[error("no current record")]
    NoCurrentRecord,
}

impl FortranError {
    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            FortranError::Open { .. } => ErrorKind::OpenFailure,
            FortranError::Io(_) => ErrorKind::Io,
            FortranError::MarkerMismatch { .. } | FortranError::Truncated { .. } => {
                ErrorKind::Framing
            }
            FortranError::OutOfRange { .. } | FortranError::Misaligned { .. } => {
                ErrorKind::OutOfRange
            }
            FortranError::Closed => ErrorKind::Closed,
            FortranError::RecordTooLarge { .. }
            | FortranError::WrongMode { .. }
            | FortranError::NoCurrentRecord => ErrorKind::Usage,
        }
    }
}

/// Result type for engine operations
pub type FortranResult<T> = Result<T, FortranError>;
