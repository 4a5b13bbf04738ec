use heapless::{String, Vec};

use crate::ledger::{
    BlobStore, LedgerError,
    types::{DEFAULT_PROPERTY_BUFFER_SIZE, MAX_DATA_SIZE, MAX_NAME_SIZE, MAX_RECORD_COUNT},
};

#[derive(Debug)]
struct RamRecord<const DC: usize> {
    name: String<MAX_NAME_SIZE>,
    data: Vec<u8, DC>,
}

/// RAM-backed [`BlobStore`] holding up to `RC` records of up to `DC` bytes.
///
/// Nothing survives a reset. The defaults hold [`MAX_RECORD_COUNT`] records
/// that each fit the read-through scratch buffer.
#[derive(Debug)]
pub struct RamBlobStore<
    const RC: usize = MAX_RECORD_COUNT,
    const DC: usize = DEFAULT_PROPERTY_BUFFER_SIZE,
> {
    records: Vec<RamRecord<DC>, RC>,
}

impl<const RC: usize, const DC: usize> RamBlobStore<RC, DC> {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Number of stored records.
    #[inline]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if a record named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Names of the stored records, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|record| record.name.as_str())
    }

    /// Deletes the record `name`.
    ///
    /// # Errors
    /// [`LedgerError::NotFound`] if there is no such record.
    pub fn purge(&mut self, name: &str) -> Result<(), LedgerError> {
        let idx = self.position(name).ok_or(LedgerError::NotFound)?;
        self.records.swap_remove(idx);
        Ok(())
    }

    /// Deletes every record.
    pub fn purge_all(&mut self) {
        self.records.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.name.as_str() == name)
    }
}

impl<const RC: usize, const DC: usize> Default for RamBlobStore<RC, DC> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RC: usize, const DC: usize> BlobStore for RamBlobStore<RC, DC> {
    /// # Errors
    /// * [`LedgerError::NotFound`] - if there is no such record
    /// * [`LedgerError::ResourceExhausted`] - if `buf` is smaller than the record
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, LedgerError> {
        let idx = self.position(name).ok_or(LedgerError::NotFound)?;
        let data = &self.records[idx].data;
        buf.get_mut(..data.len())
            .ok_or(LedgerError::ResourceExhausted)?
            .copy_from_slice(data);
        Ok(data.len())
    }

    /// # Errors
    /// * [`LedgerError::InvalidArgument`] - if `name` is empty or too long
    /// * [`LedgerError::ResourceExhausted`] - if `data` exceeds `DC` or
    ///   [`MAX_DATA_SIZE`], or a new record would exceed `RC`
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), LedgerError> {
        if name.is_empty() || name.len() > MAX_NAME_SIZE {
            return Err(LedgerError::InvalidArgument);
        }
        if data.len() > DC.min(MAX_DATA_SIZE) {
            return Err(LedgerError::ResourceExhausted);
        }

        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                let mut stored = String::new();
                stored
                    .push_str(name)
                    .map_err(|_| LedgerError::InvalidArgument)?;
                self.records
                    .push(RamRecord {
                        name: stored,
                        data: Vec::new(),
                    })
                    .map_err(|_| LedgerError::ResourceExhausted)?;
                self.records.len() - 1
            }
        };

        let record = &mut self.records[idx];
        record.data.clear();
        record
            .data
            .extend_from_slice(data)
            .map_err(|_| LedgerError::ResourceExhausted)
    }
}
