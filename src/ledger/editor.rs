use crate::ledger::{
    BlobStore, Decoder, Encoder, Ledger, LedgerError,
    arena::{Arena, Span},
    macros::{impl_arena_setter, impl_inline_setter},
    table::{PropValue, PropertyEntry, PropertyTable},
    types::{FLOAT64, MAX_PROPERTIES, MajorType, SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_TRUE, Value},
};

/// Bounded-memory read-modify-write editor for one record.
///
/// The editor works entirely inside the caller's buffer. Keys and
/// variable-length values are copied into an arena that grows backward from
/// the end of the buffer and may use at most half of it; the front is kept
/// for the re-encoded record. At most [`MAX_PROPERTIES`] entries exist at
/// once, and removed entries leave a tombstone whose slot is reused by the
/// next new key.
///
/// Edits only reach the [`BlobStore`] through [`commit`](Self::commit).
/// Dropping the editor discards them.
pub struct PropertyStore<'b, 'l, S>
where
    S: BlobStore,
{
    buf: &'b mut [u8],
    arena: Arena,
    table: PropertyTable,
    ledger: &'l mut Ledger<S>,
}

impl<'b, 'l, S> PropertyStore<'b, 'l, S>
where
    S: BlobStore,
{
    /// Opens an editor over `buf`, whose first `existing_len` bytes hold the
    /// current record (0 for a fresh one).
    ///
    /// Import is best effort and never fails: decoding stops silently at the
    /// first malformed value or once [`MAX_PROPERTIES`] entries exist, and
    /// values of types the editor does not store (arrays, maps, tags, other
    /// simple values) are skipped. Whatever was imported up to that point
    /// stays editable.
    pub fn open(buf: &'b mut [u8], existing_len: usize, ledger: &'l mut Ledger<S>) -> Self {
        let existing = existing_len.min(buf.len());
        let mut store = Self {
            arena: Arena::new(buf.len()),
            buf,
            table: PropertyTable::new(),
            ledger,
        };

        if existing > 0 {
            store.arena.hold_front(existing);
            if let Err(_e) = store.import(existing) {
                #[cfg(feature = "logging")]
                log::debug!(
                    "import of {} stopped after {} properties: {}",
                    store.ledger.name(),
                    store.table.live_count(),
                    _e
                );
            }
            store.arena.release_front();
        }

        store
    }

    fn import(&mut self, existing: usize) -> Result<(), LedgerError> {
        // Arena spans never start below `floor`, so the record can be read
        // from the front while copies land in the tail.
        let len = self.buf.len();
        let floor = existing.max(len - len / 2);
        let (input, tail) = self.buf.split_at_mut(floor);

        let mut decoder = Decoder::new(&input[..existing]);
        let count = decoder.read_map_header()?;

        for _ in 0..count {
            if self.table.allocated() >= MAX_PROPERTIES {
                break;
            }

            let mut probe = decoder.clone();
            probe.skip_value()?;
            if !is_importable(&probe)? {
                #[cfg(feature = "logging")]
                log::trace!("skipping foreign value at offset {}", probe.position());
                decoder = probe;
                decoder.skip_value()?;
                continue;
            }

            let key = self.arena.alloc(decoder.peek_string_length()?)?;
            decoder.read_key(&mut tail[key.range_from(floor)])?;

            let value = match decoder.peek_type()? {
                MajorType::UnsignedInt => PropValue::Uint(decoder.read_uint()?),
                MajorType::NegativeInt => PropValue::Int(decoder.read_int()?),
                MajorType::TextString => {
                    let span = self.arena.alloc(decoder.peek_string_length()?)?;
                    decoder.read_string(&mut tail[span.range_from(floor)])?;
                    PropValue::Text(span)
                }
                MajorType::ByteString => {
                    let span = self.arena.alloc(decoder.peek_string_length()?)?;
                    decoder.read_bytes(&mut tail[span.range_from(floor)])?;
                    PropValue::Bytes(span)
                }
                _ => match decoder.peek_initial_byte()? {
                    SIMPLE_FALSE | SIMPLE_TRUE => PropValue::Bool(decoder.read_bool()?),
                    FLOAT64 => PropValue::Double(decoder.read_double()?),
                    _ => {
                        decoder.skip_value()?;
                        PropValue::Null
                    }
                },
            };

            // A repeated key keeps its first slot and takes the later value.
            let name = &tail[key.range_from(floor)];
            match self.table.find(tail, floor, name) {
                Some(idx) => self.table.set_value(idx, value),
                None => {
                    self.table.claim(PropertyEntry { key, value })?;
                }
            }
        }

        Ok(())
    }

    impl_inline_setter!(bool, bool, Bool);
    impl_inline_setter!(int, i64, Int);
    impl_inline_setter!(uint, u64, Uint);
    impl_inline_setter!(double, f64, Double);
    impl_arena_setter!(string, &str, Text);
    impl_arena_setter!(bytes, &[u8], Bytes);

    /// Sets `key` to null, creating the property if needed.
    pub fn set_null(&mut self, key: &str) -> Result<(), LedgerError> {
        let idx = self.slot_for(key, 0)?;
        self.table.set_value(idx, PropValue::Null);
        Ok(())
    }

    /// Removes `key`. Removing a missing key succeeds and changes nothing.
    pub fn remove(&mut self, key: &str) -> Result<(), LedgerError> {
        if let Some(idx) = self.table.find(&self.buf, 0, key.as_bytes()) {
            self.table.remove(idx);
        }
        Ok(())
    }

    /// Number of live (non-removed) properties.
    #[inline]
    pub fn property_count(&self) -> usize {
        self.table.live_count()
    }

    /// Returns the value of the live property `key`.
    pub fn get(&self, key: &str) -> Option<Value<'_>> {
        let idx = self.table.find(&self.buf, 0, key.as_bytes())?;
        value_at(&self.buf, 0, self.table.entry(idx).value)
    }

    /// Returns true if `key` is a live property.
    pub fn contains(&self, key: &str) -> bool {
        self.table.find(&self.buf, 0, key.as_bytes()).is_some()
    }

    /// Live properties in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value<'_>)> + '_ {
        let data: &[u8] = &self.buf;
        self.table.iter_live().filter_map(move |entry| {
            Some((text_at(data, 0, entry.key)?, value_at(data, 0, entry.value)?))
        })
    }

    /// Arena bytes handed out so far, including superseded copies.
    #[inline]
    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Arena bytes still available before the midpoint.
    #[inline]
    pub fn arena_remaining(&self) -> usize {
        self.arena.remaining()
    }

    /// Encodes the live properties into the front of the buffer and writes
    /// the result to the record.
    ///
    /// Consumes the editor: open a new one to keep editing.
    ///
    /// # Errors
    /// The first failure from the [`Encoder`] (usually
    /// [`LedgerError::ResourceExhausted`] when the front of the buffer is too
    /// small) or from the [`BlobStore`] write. On an encode failure nothing
    /// is written and the buffer front holds a partial map.
    pub fn commit(self) -> Result<(), LedgerError> {
        let Self {
            buf,
            arena,
            table,
            ledger,
        } = self;

        let boundary = arena.boundary();
        let (front, tail) = buf.split_at_mut(boundary);
        let tail: &[u8] = tail;

        let mut encoder = Encoder::new(front);
        let result = encode_live(&mut encoder, &table, tail, boundary)
            .and_then(|()| ledger.write(encoder.as_bytes()));

        #[cfg(feature = "logging")]
        if let Err(e) = &result {
            log::warn!("commit of {} failed: {}", ledger.name(), e);
        }

        result
    }

    /// Returns the slot for `key`, claiming one for a new key.
    ///
    /// Checks up front that the key copy and `extra` arena bytes both fit,
    /// so a failed setter leaves no trace.
    fn slot_for(&mut self, key: &str, extra: usize) -> Result<usize, LedgerError> {
        if let Some(idx) = self.table.find(&self.buf, 0, key.as_bytes()) {
            self.arena.check(extra)?;
            return Ok(idx);
        }

        if !self.table.has_vacancy() {
            return Err(LedgerError::ResourceExhausted);
        }
        let total = key
            .len()
            .checked_add(extra)
            .ok_or(LedgerError::ResourceExhausted)?;
        self.arena.check(total)?;

        let span = self.stash(key.as_bytes())?;
        self.table.claim(PropertyEntry {
            key: span,
            value: PropValue::Null,
        })
    }

    /// Copies `data` into fresh arena space.
    fn stash(&mut self, data: &[u8]) -> Result<Span, LedgerError> {
        let span = self.arena.alloc(data.len())?;
        self.buf[span.range()].copy_from_slice(data);
        Ok(span)
    }
}

impl<S> core::fmt::Debug for PropertyStore<'_, '_, S>
where
    S: BlobStore,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("record", &self.ledger.name())
            .field("properties", &self.table.live_count())
            .field("arena_used", &self.arena.used())
            .field("capacity", &self.buf.len())
            .finish_non_exhaustive()
    }
}

/// Returns true if the value under the decoder is one the editor stores.
fn is_importable(decoder: &Decoder<'_>) -> Result<bool, LedgerError> {
    Ok(match decoder.peek_type()? {
        MajorType::UnsignedInt
        | MajorType::NegativeInt
        | MajorType::ByteString
        | MajorType::TextString => true,
        MajorType::SimpleFloat => matches!(
            decoder.peek_initial_byte()?,
            SIMPLE_FALSE | SIMPLE_TRUE | SIMPLE_NULL | FLOAT64
        ),
        MajorType::Array | MajorType::Map | MajorType::Tag => false,
    })
}

fn encode_live(
    encoder: &mut Encoder<'_>,
    table: &PropertyTable,
    data: &[u8],
    base: usize,
) -> Result<(), LedgerError> {
    encoder.begin_map(table.live_count())?;
    for entry in table.iter_live() {
        let key = text_at(data, base, entry.key).ok_or(LedgerError::DataLoss)?;
        let value = value_at(data, base, entry.value).ok_or(LedgerError::DataLoss)?;
        encoder.write_value(key, value)?;
    }
    Ok(())
}

fn text_at(data: &[u8], base: usize, span: Span) -> Option<&str> {
    core::str::from_utf8(data.get(span.range_from(base))?).ok()
}

fn value_at(data: &[u8], base: usize, value: PropValue) -> Option<Value<'_>> {
    Some(match value {
        PropValue::Null => Value::Null,
        PropValue::Bool(v) => Value::Bool(v),
        PropValue::Int(v) => Value::Int(v),
        PropValue::Uint(v) => Value::Uint(v),
        PropValue::Double(v) => Value::Double(v),
        PropValue::Text(span) => Value::Text(text_at(data, base, span)?),
        PropValue::Bytes(span) => Value::Bytes(data.get(span.range_from(base))?),
    })
}
