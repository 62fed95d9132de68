//! File manager for Fortran unformatted sequential files
//!
//! Manages the open store, its cursor, and format settings.

pub mod config;
pub mod cursor;
pub mod store;

pub use config::FormatConfig;
pub use cursor::{CursorState, StoreCursor};
pub use store::{FortranBinaryFile, OpenMode, Records};
