use core::ops::Range;

use crate::ledger::LedgerError;

/// Absolute byte range inside the edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) off: usize,
    pub(crate) len: usize,
}

impl Span {
    #[inline]
    pub(crate) fn range(&self) -> Range<usize> {
        self.off..self.off + self.len
    }

    /// Range relative to a sub-slice that starts at `base`.
    ///
    /// `base` must not exceed `off`.
    #[inline]
    pub(crate) fn range_from(&self, base: usize) -> Range<usize> {
        let start = self.off - base;
        start..start + self.len
    }
}

/// Two-watermark bump allocator over one edit buffer.
///
/// Allocations grow backward from the end of the buffer (`back_cursor`
/// bytes used) while the front is reserved for the re-encoded record. The
/// back half is the whole budget: the arena never grows past the midpoint,
/// and never below `front_cursor`, the bytes at the front that are still in
/// use (the existing record while it is being imported). Nothing is ever
/// freed individually.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arena {
    len: usize,
    front_cursor: usize,
    back_cursor: usize,
}

impl Arena {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            len,
            front_cursor: 0,
            back_cursor: 0,
        }
    }

    /// Total bytes the arena may ever hand out.
    #[inline]
    pub(crate) fn budget(&self) -> usize {
        self.len / 2
    }

    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.back_cursor
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.budget() - self.back_cursor
    }

    /// Offset of the lowest allocated byte; everything before it is free
    /// for encoding.
    #[inline]
    pub(crate) fn boundary(&self) -> usize {
        self.len - self.back_cursor
    }

    /// Protects the first `len` bytes from allocations.
    pub(crate) fn hold_front(&mut self, len: usize) {
        self.front_cursor = len.min(self.len);
    }

    pub(crate) fn release_front(&mut self) {
        self.front_cursor = 0;
    }

    /// Checks that `size` more bytes fit, returning the new back cursor.
    pub(crate) fn check(&self, size: usize) -> Result<usize, LedgerError> {
        let used = self
            .back_cursor
            .checked_add(size)
            .ok_or(LedgerError::ResourceExhausted)?;
        if used > self.budget() || self.len - used < self.front_cursor {
            return Err(LedgerError::ResourceExhausted);
        }
        Ok(used)
    }

    pub(crate) fn alloc(&mut self, size: usize) -> Result<Span, LedgerError> {
        let used = self.check(size)?;
        self.back_cursor = used;
        Ok(Span {
            off: self.len - used,
            len: size,
        })
    }
}
