//! Cursor management for the record store
//!
//! The cursor tracks where the next record starts and whether the
//! sequence has been exhausted. It only moves forward, except on rewind.

/// Cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing read yet
    Start,
    /// At least one record has been produced
    Positioned,
    /// The file is exhausted
    AtEnd,
}

/// Position of a store within its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCursor {
    /// Byte offset of the next leading marker
    pub offset: u64,
    /// Current state
    pub state: CursorState,
    /// Records read or written since open or the last rewind
    pub records: u64,
}

impl StoreCursor {
    /// Create a cursor at the start of the file
    pub fn new() -> Self {
        StoreCursor {
            offset: 0,
            state: CursorState::Start,
            records: 0,
        }
    }

    /// Check if the sequence is exhausted
    pub fn is_at_end(&self) -> bool {
        matches!(self.state, CursorState::AtEnd)
    }

    /// Step over one record of `frame_len` bytes, markers included
    pub fn advance(&mut self, frame_len: u64) {
        self.offset += frame_len;
        self.records += 1;
        self.state = CursorState::Positioned;
    }

    /// Mark the sequence as exhausted
    pub fn set_at_end(&mut self) {
        self.state = CursorState::AtEnd;
    }

    /// Return to the start of the file
    pub fn reset(&mut self) {
        *self = StoreCursor::new();
    }
}

impl Default for StoreCursor {
    fn default() -> Self {
        Self::new()
    }
}
