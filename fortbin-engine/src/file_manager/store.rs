//! The record store - an open Fortran unformatted sequential file
//!
//! A [`FortranBinaryFile`] owns the file handle and a forward-only cursor
//! over the record sequence. Records are produced one at a time by
//! [`FortranBinaryFile::advance`]; every produced [`Record`] holds its own
//! copy of the data.
//!
//! The handle is released by [`FortranBinaryFile::close`], by
//! [`FortranBinaryFile::scoped`] on every exit path, or on drop.
//!
//! A store is not meant to be shared between threads: every read moves
//! the cursor.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::config::FormatConfig;
use super::cursor::StoreCursor;
use crate::error::{FortranError, FortranResult};
use crate::storage::element::{self, Element};
use crate::storage::marker;
use crate::storage::record::Record;
use crate::storage::search::SearchTarget;

/// Access mode of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Read an existing file
    Read,
    /// Create the file, or truncate it if it exists, and write records
    WriteCreate,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenMode::Read => "read",
            OpenMode::WriteCreate => "write-create",
        })
    }
}

enum Handle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

/// An open Fortran unformatted sequential file
pub struct FortranBinaryFile {
    /// File path
    path: PathBuf,
    /// Open mode
    mode: OpenMode,
    /// Marker width and byte order
    config: FormatConfig,
    /// Underlying file handle, `None` once closed
    handle: Option<Handle>,
    /// Position of the next record
    cursor: StoreCursor,
    /// Most recently produced record
    current: Option<Record>,
    /// The reader is not at `cursor.offset` (after a scan or a failed read)
    needs_seek: bool,
}

impl FortranBinaryFile {
    /// Open an existing file for reading with the default format
    pub fn open(path: impl AsRef<Path>) -> FortranResult<Self> {
        Self::open_with(path, OpenMode::Read, FormatConfig::default())
    }

    /// Create (or truncate) a file for writing with the default format
    pub fn create(path: impl AsRef<Path>) -> FortranResult<Self> {
        Self::open_with(path, OpenMode::WriteCreate, FormatConfig::default())
    }

    /// Open a file in the given mode and format
    ///
    /// The file is opened immediately; a missing file in read mode fails
    /// here, not on the first read.
    pub fn open_with(
        path: impl AsRef<Path>,
        mode: OpenMode,
        config: FormatConfig,
    ) -> FortranResult<Self> {
        let path = path.as_ref();

        let opened = match mode {
            OpenMode::Read => OpenOptions::new().read(true).open(path),
            OpenMode::WriteCreate => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path),
        };
        let file = opened.map_err(|source| FortranError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let handle = match mode {
            OpenMode::Read => Handle::Reader(BufReader::new(file)),
            OpenMode::WriteCreate => Handle::Writer(BufWriter::new(file)),
        };

        debug!(
            "Opened {} ({} mode, {}-byte markers, {} byte order)",
            path.display(),
            mode,
            config.marker_width,
            config.byte_order
        );

        Ok(FortranBinaryFile {
            path: path.to_path_buf(),
            mode,
            config,
            handle: Some(handle),
            cursor: StoreCursor::new(),
            current: None,
            needs_seek: false,
        })
    }

    /// Open a file for reading, run `f`, and close the file afterwards
    ///
    /// The file is closed whether `f` succeeds or fails.
    pub fn with_open<T, E, F>(path: impl AsRef<Path>, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<FortranError>,
    {
        let mut store = Self::open(path)?;
        store.scoped(f)
    }

    /// Run `f` against this store, then close it
    ///
    /// The store is closed on both the success and the error path. An
    /// error from `f` takes precedence over an error from closing.
    pub fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<FortranError>,
    {
        let result = f(self);
        let closed = self.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Produce the next record, or `None` once the file is exhausted
    ///
    /// Each call consumes exactly one record. Calls after the end keep
    /// returning `None`. A framing error leaves the cursor at the start of
    /// the bad record.
    ///
    /// The store keeps a clone of the record for [`read_buf`](Self::read_buf).
    /// Clones share the record's data buffer, so this does not copy the data.
    pub fn advance(&mut self) -> FortranResult<Option<Record>> {
        let record = self.next_frame()?;
        if let Some(record) = &record {
            self.current = Some(record.clone());
        }
        Ok(record)
    }

    /// Iterate over the remaining records
    pub fn records(&mut self) -> Records<'_> {
        Records {
            store: self,
            done: false,
        }
    }

    /// Find the first record, from the cursor on, whose data equals `target`
    ///
    /// Text targets are compared by their UTF-8 bytes. Records passed over
    /// are consumed; when nothing matches the store is left at the end and
    /// `None` is returned.
    pub fn find<'a>(&mut self, target: impl Into<SearchTarget<'a>>) -> FortranResult<Option<Record>> {
        let target = target.into();
        let needle = target.as_bytes();

        while let Some(record) = self.next_frame()? {
            if record.data() == needle {
                debug!(
                    "Found {} byte label at offset {} in {}",
                    needle.len(),
                    record.offset(),
                    self.path.display()
                );
                self.current = Some(record.clone());
                return Ok(Some(record));
            }
            self.current = Some(record);
        }

        debug!("Label not found in {}", self.path.display());
        Ok(None)
    }

    /// Byte lengths of every record in the file, in file order
    ///
    /// Scans from the start of the file regardless of the cursor, checking
    /// each record's markers, and leaves the cursor where it was.
    pub fn record_byte_lengths(&mut self) -> FortranResult<Vec<u64>> {
        let config = self.config;
        self.needs_seek = true;
        let reader = reader_of(&mut self.handle, self.mode, "scan")?;
        reader.seek(SeekFrom::Start(0))?;

        let mut lengths = Vec::new();
        let mut offset = 0;
        while let Some(len) =
            marker::skip_framed(reader, offset, config.marker_width, config.byte_order)?
        {
            lengths.push(len);
            offset += len + config.framing_overhead();
        }

        debug!("Scanned {} records in {}", lengths.len(), self.path.display());
        Ok(lengths)
    }

    /// Number of records in the file
    pub fn record_count(&mut self) -> FortranResult<usize> {
        Ok(self.record_byte_lengths()?.len())
    }

    /// Move the cursor back to the first record
    pub fn rewind(&mut self) -> FortranResult<()> {
        let reader = reader_of(&mut self.handle, self.mode, "rewind")?;
        reader.seek(SeekFrom::Start(0))?;
        self.cursor.reset();
        self.current = None;
        self.needs_seek = false;
        debug!("Rewound {}", self.path.display());
        Ok(())
    }

    /// Most recently produced record
    pub fn current_record(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    pub fn current_record_mut(&mut self) -> Option<&mut Record> {
        self.current.as_mut()
    }

    /// Decode `count` elements from the current record
    ///
    /// Continues from the current record's decode position. This is the
    /// store's own copy of the record, separate from the one returned by
    /// `advance` or `find`.
    pub fn read_buf<T: Element>(&mut self, count: usize) -> FortranResult<Vec<T>> {
        self.current
            .as_mut()
            .ok_or(FortranError::NoCurrentRecord)?
            .read(count)
    }

    /// Append one record holding `data`
    pub fn write_record(&mut self, data: &[u8]) -> FortranResult<()> {
        let config = self.config;
        let writer = writer_of(&mut self.handle, self.mode)?;
        marker::write_framed(writer, data, config.marker_width, config.byte_order)?;

        trace!(
            "Wrote record {} at offset {}: {} bytes",
            self.cursor.records,
            self.cursor.offset,
            data.len()
        );
        self.cursor.advance(data.len() as u64 + config.framing_overhead());
        Ok(())
    }

    /// Append one record holding `values`
    pub fn write_values<T: Element>(&mut self, values: &[T]) -> FortranResult<()> {
        let data = element::encode(values, self.config.byte_order);
        self.write_record(&data)
    }

    /// Flush buffered writes to the file
    pub fn flush(&mut self) -> FortranResult<()> {
        writer_of(&mut self.handle, self.mode)?.flush()?;
        Ok(())
    }

    /// Release the file handle
    ///
    /// Buffered writes are flushed first. Closing a closed store does
    /// nothing. Any later read or write fails with [`FortranError::Closed`].
    pub fn close(&mut self) -> FortranResult<()> {
        match self.handle.take() {
            Some(Handle::Writer(mut writer)) => {
                debug!("Closing {} after {} records", self.path.display(), self.cursor.records);
                writer.flush()?;
            }
            Some(Handle::Reader(_)) => {
                debug!("Closing {}", self.path.display());
            }
            None => {}
        }
        Ok(())
    }

    /// Check if the handle has been released
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Check if the record sequence is exhausted
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Byte offset of the next record
    pub fn position(&self) -> u64 {
        self.cursor.offset
    }

    /// Records read or written since open or the last rewind
    pub fn records_read(&self) -> u64 {
        self.cursor.records
    }

    pub fn cursor(&self) -> &StoreCursor {
        &self.cursor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Read the next framed record without touching `current`
    fn next_frame(&mut self) -> FortranResult<Option<Record>> {
        let reader = reader_of(&mut self.handle, self.mode, "read")?;
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let offset = self.cursor.offset;
        if self.needs_seek {
            reader.seek(SeekFrom::Start(offset))?;
            self.needs_seek = false;
        }

        let config = self.config;
        match marker::read_framed(reader, offset, config.marker_width, config.byte_order) {
            Ok(Some(data)) => {
                trace!(
                    "Read record {} at offset {}: {} bytes",
                    self.cursor.records,
                    offset,
                    data.len()
                );
                self.cursor
                    .advance(data.len() as u64 + config.framing_overhead());
                Ok(Some(Record::new(data, offset, config.byte_order)))
            }
            Ok(None) => {
                debug!(
                    "End of {} after {} records",
                    self.path.display(),
                    self.cursor.records
                );
                self.cursor.set_at_end();
                Ok(None)
            }
            Err(e) => {
                warn!("Bad record in {}: {}", self.path.display(), e);
                self.needs_seek = true;
                Err(e)
            }
        }
    }
}

impl fmt::Debug for FortranBinaryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FortranBinaryFile")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Drop for FortranBinaryFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error closing {}: {}", self.path.display(), e);
        }
    }
}

fn reader_of<'a>(
    handle: &'a mut Option<Handle>,
    mode: OpenMode,
    operation: &'static str,
) -> FortranResult<&'a mut BufReader<File>> {
    match handle {
        Some(Handle::Reader(reader)) => Ok(reader),
        Some(Handle::Writer(_)) => Err(FortranError::WrongMode { mode, operation }),
        None => Err(FortranError::Closed),
    }
}

fn writer_of(handle: &mut Option<Handle>, mode: OpenMode) -> FortranResult<&mut BufWriter<File>> {
    match handle {
        Some(Handle::Writer(writer)) => Ok(writer),
        Some(Handle::Reader(_)) => Err(FortranError::WrongMode {
            mode,
            operation: "write",
        }),
        None => Err(FortranError::Closed),
    }
}

/// Iterator over the remaining records of a store
///
/// Yields each record once, stops after the first error.
pub struct Records<'a> {
    store: &'a mut FortranBinaryFile,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = FortranResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.store.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Records<'_> {}

impl<'a> IntoIterator for &'a mut FortranBinaryFile {
    type Item = FortranResult<Record>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.records()
    }
}
