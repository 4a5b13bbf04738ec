use heapless::String;

use crate::ledger::{
    BlobStore, Decoder, LedgerError, PropertyStore,
    macros::impl_read_through,
    types::{DEFAULT_PROPERTY_BUFFER_SIZE, MAX_DATA_SIZE, MAX_NAME_SIZE},
};

/// A named record in a [`BlobStore`].
///
/// Reads go straight to the store: each typed getter fetches the record into
/// a [`DEFAULT_PROPERTY_BUFFER_SIZE`] stack buffer and walks it with a
/// [`Decoder`] until the key turns up. Use [`edit`](Self::edit) to change
/// properties.
#[derive(Debug)]
pub struct Ledger<S>
where
    S: BlobStore,
{
    store: S,
    name: String<MAX_NAME_SIZE>,
}

impl<S> Ledger<S>
where
    S: BlobStore,
{
    /// Creates a handle for the record `name` in `store`.
    ///
    /// # Errors
    /// [`LedgerError::InvalidArgument`] if `name` is empty or longer than
    /// [`MAX_NAME_SIZE`] bytes.
    pub fn new(store: S, name: &str) -> Result<Self, LedgerError> {
        if name.is_empty() {
            return Err(LedgerError::InvalidArgument);
        }
        let mut stored = String::new();
        stored
            .push_str(name)
            .map_err(|_| LedgerError::InvalidArgument)?;
        Ok(Self {
            store,
            name: stored,
        })
    }

    /// Record name this handle reads and writes.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrows the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the handle and returns the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads the raw record into `buf` and returns its length.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, LedgerError> {
        self.store.read(&self.name, buf)
    }

    /// Replaces the raw record with `data`.
    ///
    /// # Errors
    /// [`LedgerError::ResourceExhausted`] if `data` exceeds [`MAX_DATA_SIZE`],
    /// otherwise whatever the store reports.
    pub fn write(&mut self, data: &[u8]) -> Result<(), LedgerError> {
        if data.len() > MAX_DATA_SIZE {
            return Err(LedgerError::ResourceExhausted);
        }
        self.store.write(&self.name, data)
    }

    /// Loads the record into `buf` and opens an editor over it.
    ///
    /// A missing record opens as an empty one. `buf` must hold the whole
    /// record; its size also bounds the editor's arena and the size of the
    /// record it can commit.
    pub fn edit<'b>(&mut self, buf: &'b mut [u8]) -> Result<PropertyStore<'b, '_, S>, LedgerError> {
        let existing = match self.read(buf) {
            Ok(len) => len,
            Err(LedgerError::NotFound) => {
                #[cfg(feature = "logging")]
                log::debug!("record {} not found, starting empty", self.name);
                0
            }
            Err(e) => return Err(e),
        };
        Ok(PropertyStore::open(buf, existing, self))
    }

    /// Returns true if the record exists and holds `key`.
    pub fn has(&mut self, key: &str) -> bool {
        let mut scratch = [0u8; DEFAULT_PROPERTY_BUFFER_SIZE];
        self.locate(key, &mut scratch).is_some()
    }

    impl_read_through!(bool, read_bool);
    impl_read_through!(i32, read_int);
    impl_read_through!(i64, read_int);
    impl_read_through!(u32, read_uint);
    impl_read_through!(u64, read_uint);
    impl_read_through!(f64, read_double);

    /// Copies the text value of `key` into `out`.
    ///
    /// # Errors
    /// * [`LedgerError::NotFound`] - if the record or key is missing
    /// * [`LedgerError::DataLoss`] - if the value is not text
    /// * [`LedgerError::ResourceExhausted`] - if `out` is too small
    pub fn get_string<'o>(&mut self, key: &str, out: &'o mut [u8]) -> Result<&'o str, LedgerError> {
        let mut scratch = [0u8; DEFAULT_PROPERTY_BUFFER_SIZE];
        let mut decoder = self
            .locate(key, &mut scratch)
            .ok_or(LedgerError::NotFound)?;
        decoder.read_string(out)
    }

    /// Copies the byte-string value of `key` into `out`.
    ///
    /// Errors as for [`get_string`](Self::get_string).
    pub fn get_bytes<'o>(&mut self, key: &str, out: &'o mut [u8]) -> Result<&'o [u8], LedgerError> {
        let mut scratch = [0u8; DEFAULT_PROPERTY_BUFFER_SIZE];
        let mut decoder = self
            .locate(key, &mut scratch)
            .ok_or(LedgerError::NotFound)?;
        decoder.read_bytes(out)
    }

    /// Reads the record into `scratch` and positions a decoder on the value
    /// of `key`.
    ///
    /// Keys longer than [`MAX_NAME_SIZE`] never match and are skipped.
    fn locate<'s>(&mut self, key: &str, scratch: &'s mut [u8]) -> Option<Decoder<'s>> {
        let len = self.read(scratch).ok()?;
        let data: &'s [u8] = scratch;
        let mut decoder = Decoder::new(&data[..len]);
        let count = decoder.read_map_header().ok()?;

        let mut key_buf = [0u8; MAX_NAME_SIZE];
        for _ in 0..count {
            match decoder.read_key(&mut key_buf) {
                Ok(found) if found == key => return Some(decoder),
                Ok(_) => {}
                Err(LedgerError::ResourceExhausted) => decoder.skip_value().ok()?,
                Err(_) => return None,
            }
            decoder.skip_value().ok()?;
        }
        None
    }
}
