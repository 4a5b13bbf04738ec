use crate::ledger::{
    LedgerError,
    helpers::{encode_header, header_len},
    types::{FLOAT64, MajorType, SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_TRUE, Value},
};

/// Sequential map encoder over a caller-owned buffer.
///
/// Call [`begin_map`](Self::begin_map) with the number of pairs, then one
/// `write_*` per pair. Keys are always text strings. Integer arguments,
/// lengths, and counts use the smallest header width that fits.
///
/// Each call either writes its whole header/pair or nothing. Earlier
/// successful writes stay in the buffer when a later one fails.
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> core::fmt::Debug for Encoder<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Encoder")
            .field("size", &self.pos)
            .field("capacity", &self.buf.len())
            .finish()
    }
}

impl<'a> Encoder<'a> {
    /// Creates an encoder that writes from the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn size(&self) -> usize {
        self.pos
    }

    /// Remaining buffer capacity in bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the encoded prefix of the buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Writes a map header announcing `count` pairs.
    ///
    /// The number of pairs that actually follow is not checked.
    pub fn begin_map(&mut self, count: usize) -> Result<(), LedgerError> {
        let count = count as u64;
        self.ensure(header_len(count))?;
        self.put_header(MajorType::Map, count);
        Ok(())
    }

    /// Writes `key` with a null value (`0xf6`).
    pub fn write_null(&mut self, key: &str) -> Result<(), LedgerError> {
        self.begin_pair(key, 1)?;
        self.put_raw(&[SIMPLE_NULL]);
        Ok(())
    }

    /// Writes `key` with `0xf5` for true or `0xf4` for false.
    pub fn write_bool(&mut self, key: &str, value: bool) -> Result<(), LedgerError> {
        self.begin_pair(key, 1)?;
        self.put_raw(&[if value { SIMPLE_TRUE } else { SIMPLE_FALSE }]);
        Ok(())
    }

    /// Writes a signed integer.
    ///
    /// Negative values use the negative-int major type with argument
    /// `-1 - value`, so `-1` encodes as `0x20` and `-10` as `0x29`.
    pub fn write_int(&mut self, key: &str, value: i64) -> Result<(), LedgerError> {
        let (major, argument) = if value >= 0 {
            (MajorType::UnsignedInt, value as u64)
        } else {
            (MajorType::NegativeInt, (-1 - value) as u64)
        };
        self.begin_pair(key, header_len(argument))?;
        self.put_header(major, argument);
        Ok(())
    }

    /// Writes an unsigned integer using the smallest header that fits.
    pub fn write_uint(&mut self, key: &str, value: u64) -> Result<(), LedgerError> {
        self.begin_pair(key, header_len(value))?;
        self.put_header(MajorType::UnsignedInt, value);
        Ok(())
    }

    /// Writes a double as `0xfb` plus 8 big-endian bytes.
    ///
    /// Half and single precision forms are never produced.
    pub fn write_double(&mut self, key: &str, value: f64) -> Result<(), LedgerError> {
        self.begin_pair(key, 9)?;
        self.put_raw(&[FLOAT64]);
        self.put_raw(&value.to_be_bytes());
        Ok(())
    }

    /// Writes a text string: length header, then the UTF-8 bytes.
    pub fn write_string(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.write_span(key, MajorType::TextString, value.as_bytes())
    }

    /// Writes a byte string: length header, then the raw bytes.
    pub fn write_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.write_span(key, MajorType::ByteString, value)
    }

    /// Writes `value` with the `write_*` call matching its variant.
    pub fn write_value(&mut self, key: &str, value: Value<'_>) -> Result<(), LedgerError> {
        match value {
            Value::Null => self.write_null(key),
            Value::Bool(v) => self.write_bool(key, v),
            Value::Int(v) => self.write_int(key, v),
            Value::Uint(v) => self.write_uint(key, v),
            Value::Double(v) => self.write_double(key, v),
            Value::Text(v) => self.write_string(key, v),
            Value::Bytes(v) => self.write_bytes(key, v),
        }
    }

    fn write_span(&mut self, key: &str, major: MajorType, data: &[u8]) -> Result<(), LedgerError> {
        let len = data.len() as u64;
        let value_size = header_len(len)
            .checked_add(data.len())
            .ok_or(LedgerError::ResourceExhausted)?;
        self.begin_pair(key, value_size)?;
        self.put_header(major, len);
        self.put_raw(data);
        Ok(())
    }

    /// Checks room for the key plus `value_size` bytes, then writes the key.
    fn begin_pair(&mut self, key: &str, value_size: usize) -> Result<(), LedgerError> {
        let key_len = key.len() as u64;
        let needed = header_len(key_len)
            .checked_add(key.len())
            .and_then(|n| n.checked_add(value_size))
            .ok_or(LedgerError::ResourceExhausted)?;
        self.ensure(needed)?;
        self.put_header(MajorType::TextString, key_len);
        self.put_raw(key.as_bytes());
        Ok(())
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<(), LedgerError> {
        if needed > self.remaining() {
            return Err(LedgerError::ResourceExhausted);
        }
        Ok(())
    }

    // Callers must `ensure` first.
    fn put_header(&mut self, major: MajorType, argument: u64) {
        let (bytes, len) = encode_header(major, argument);
        self.put_raw(&bytes[..len]);
    }

    fn put_raw(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }
}
