//! fortbin Engine - Fortran unformatted sequential files
//!
//! This crate reads and writes the binary files produced by Fortran
//! `form='unformatted'` sequential I/O: a sequence of records, each framed
//! by a leading and a trailing length marker that must agree.
//!
//! ```no_run
//! use fortbin_engine::FortranBinaryFile;
//!
//! # fn main() -> fortbin_engine::FortranResult<()> {
//! let mut file = FortranBinaryFile::open("fort.1")?;
//! let n = file.advance()?.expect("header record").read::<i32>(1)?[0];
//! let x = file.advance()?.expect("data record").read::<f64>(n as usize)?;
//! println!("{:?}", x);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod storage;
pub mod file_manager;

pub use error::{ErrorKind, FortranError, FortranResult};
pub use file_manager::{FormatConfig, FortranBinaryFile, OpenMode, Records};
pub use storage::{Element, ElementKind, Endianness, MarkerWidth, Record, SearchTarget, Values};
