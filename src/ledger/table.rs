use heapless::Vec;

use crate::ledger::{LedgerError, arena::Span, types::MAX_PROPERTIES};

/// Stored value of one property. Variable-length payloads live in the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    Text(Span),
    Bytes(Span),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PropertyEntry {
    pub(crate) key: Span,
    pub(crate) value: PropValue,
}

/// Fixed-capacity property table with tombstones.
///
/// Entries are never moved or deleted during an edit session; removing one
/// sets its bit in `removed` so the slot can be reused and indices stay stable.
pub(crate) struct PropertyTable {
    entries: Vec<PropertyEntry, MAX_PROPERTIES>,
    removed: bitmaps::Bitmap<MAX_PROPERTIES>,
}

impl PropertyTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            removed: bitmaps::Bitmap::new(),
        }
    }

    /// Slots used so far, live or tombstoned.
    #[inline]
    pub(crate) fn allocated(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn live_count(&self) -> usize {
        self.entries.len() - self.removed.len()
    }

    /// Returns true if [`claim`](Self::claim) would succeed.
    pub(crate) fn has_vacancy(&self) -> bool {
        !self.removed.is_empty() || self.entries.len() < MAX_PROPERTIES
    }

    /// Finds the live entry whose key equals `key`.
    ///
    /// `data` is the part of the edit buffer that starts at offset `base`
    /// and holds every key.
    pub(crate) fn find(&self, data: &[u8], base: usize, key: &[u8]) -> Option<usize> {
        self.entries.iter().enumerate().position(|(idx, entry)| {
            !self.removed.get(idx) && data.get(entry.key.range_from(base)) == Some(key)
        })
    }

    /// Stores `entry`, reusing the first tombstoned slot before growing.
    pub(crate) fn claim(&mut self, entry: PropertyEntry) -> Result<usize, LedgerError> {
        if let Some(idx) = self.removed.first_index() {
            self.entries[idx] = entry;
            self.removed.set(idx, false);
            return Ok(idx);
        }
        self.entries
            .push(entry)
            .map_err(|_| LedgerError::ResourceExhausted)?;
        Ok(self.entries.len() - 1)
    }

    pub(crate) fn set_value(&mut self, idx: usize, value: PropValue) {
        self.entries[idx].value = value;
    }

    pub(crate) fn entry(&self, idx: usize) -> &PropertyEntry {
        &self.entries[idx]
    }

    pub(crate) fn remove(&mut self, idx: usize) {
        self.removed.set(idx, true);
    }

    /// Live entries in slot order.
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = &PropertyEntry> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.removed.get(*idx))
            .map(|(_, entry)| entry)
    }
}
