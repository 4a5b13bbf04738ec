use crate::ledger::{
    LedgerError,
    helpers::{Header, parse_header},
    types::{FLOAT64, MAX_SKIP_DEPTH, MajorType, SIMPLE_FALSE, SIMPLE_TRUE},
};

/// Sequential, stateful reader over an encoded record.
///
/// Every `read_*` advances past exactly one value on success and leaves the
/// cursor untouched on failure, so a caller can fall back to
/// [`skip_value`](Self::skip_value). `peek_*` never advance.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if there is data left to read.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Reads a map header and returns its pair count.
    pub fn read_map_header(&mut self) -> Result<usize, LedgerError> {
        let header = self.peek_header_of(MajorType::Map)?;
        let count = usize::try_from(header.argument).map_err(|_| LedgerError::OutOfRange)?;
        self.pos += header.len;
        Ok(count)
    }

    /// Reads a text key into `key_buf` and returns it as a string slice.
    ///
    /// # Errors
    /// * [`LedgerError::ResourceExhausted`] - if `key_buf` is smaller than the key
    /// * [`LedgerError::DataLoss`] - on type mismatch, truncation, or invalid UTF-8
    pub fn read_key<'k>(&mut self, key_buf: &'k mut [u8]) -> Result<&'k str, LedgerError> {
        self.read_string(key_buf)
    }

    /// Peeks the major type of the next value.
    pub fn peek_type(&self) -> Result<MajorType, LedgerError> {
        Ok(MajorType::from_initial(self.peek_initial_byte()?))
    }

    /// Peeks the raw initial byte of the next value.
    pub fn peek_initial_byte(&self) -> Result<u8, LedgerError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(LedgerError::DataLoss)
    }

    /// Peeks the length of the next text or byte string.
    ///
    /// Used to size a destination before the real read.
    ///
    /// # Errors
    /// * [`LedgerError::FailedPrecondition`] - if the next value is not a string
    pub fn peek_string_length(&self) -> Result<usize, LedgerError> {
        let major = self.peek_type()?;
        if major != MajorType::TextString && major != MajorType::ByteString {
            return Err(LedgerError::FailedPrecondition);
        }
        let header = self.peek_header()?;
        usize::try_from(header.argument).map_err(|_| LedgerError::OutOfRange)
    }

    /// Reads a `true` or `false` simple value.
    pub fn read_bool(&mut self) -> Result<bool, LedgerError> {
        let value = match self.peek_initial_byte()? {
            SIMPLE_FALSE => false,
            SIMPLE_TRUE => true,
            _ => return Err(LedgerError::DataLoss),
        };
        self.pos += 1;
        Ok(value)
    }

    /// Reads a signed integer from either integer major type.
    ///
    /// A negative-int argument `n` yields `-1 - n`.
    ///
    /// # Errors
    /// * [`LedgerError::OutOfRange`] - if the value does not fit in `i64`
    pub fn read_int(&mut self) -> Result<i64, LedgerError> {
        let header = self.peek_header()?;
        let value = match header.major {
            MajorType::UnsignedInt => {
                i64::try_from(header.argument).map_err(|_| LedgerError::OutOfRange)?
            }
            MajorType::NegativeInt => {
                let n = i64::try_from(header.argument).map_err(|_| LedgerError::OutOfRange)?;
                -1 - n
            }
            _ => return Err(LedgerError::DataLoss),
        };
        self.pos += header.len;
        Ok(value)
    }

    /// Reads an unsigned integer; negative integers are a type mismatch.
    pub fn read_uint(&mut self) -> Result<u64, LedgerError> {
        let header = self.peek_header_of(MajorType::UnsignedInt)?;
        self.pos += header.len;
        Ok(header.argument)
    }

    /// Reads a double, widening integer values.
    ///
    /// Integers go through [`read_int`](Self::read_int), so they must fit in
    /// `i64`. Only the 8-byte float form is accepted.
    ///
    /// # Errors
    /// * [`LedgerError::OutOfRange`] - if an integer does not fit in `i64`
    pub fn read_double(&mut self) -> Result<f64, LedgerError> {
        let initial = self.peek_initial_byte()?;
        match MajorType::from_initial(initial) {
            MajorType::UnsignedInt | MajorType::NegativeInt => {
                return self.read_int().map(|value| value as f64);
            }
            MajorType::SimpleFloat if initial == FLOAT64 => {}
            _ => return Err(LedgerError::DataLoss),
        }
        let header = self.peek_header()?;
        self.pos += header.len;
        Ok(f64::from_bits(header.argument))
    }

    /// Reads a text string into `buf` and returns the validated prefix.
    pub fn read_string<'o>(&mut self, buf: &'o mut [u8]) -> Result<&'o str, LedgerError> {
        let (header, src) = self.peek_span(MajorType::TextString)?;
        let out = buf
            .get_mut(..src.len())
            .ok_or(LedgerError::ResourceExhausted)?;
        out.copy_from_slice(src);
        let out: &'o [u8] = out;
        let text = core::str::from_utf8(out).map_err(|_| LedgerError::DataLoss)?;
        self.pos += header.len + src.len();
        Ok(text)
    }

    /// Reads a byte string into `buf` and returns the filled prefix.
    pub fn read_bytes<'o>(&mut self, buf: &'o mut [u8]) -> Result<&'o [u8], LedgerError> {
        let (header, src) = self.peek_span(MajorType::ByteString)?;
        let out = buf
            .get_mut(..src.len())
            .ok_or(LedgerError::ResourceExhausted)?;
        out.copy_from_slice(src);
        self.pos += header.len + src.len();
        Ok(out)
    }

    /// Skips exactly one value, descending into arrays, maps, and tags.
    ///
    /// Integers and simple/float values are fully covered by their header.
    ///
    /// # Errors
    /// * [`LedgerError::DataLoss`] - if the value is truncated
    /// * [`LedgerError::Unimplemented`] - for indefinite-length forms
    /// * [`LedgerError::ResourceExhausted`] - if nesting exceeds [`MAX_SKIP_DEPTH`]
    pub fn skip_value(&mut self) -> Result<(), LedgerError> {
        let start = self.pos;
        let result = self.skip_nested(0);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn skip_nested(&mut self, depth: usize) -> Result<(), LedgerError> {
        if depth > MAX_SKIP_DEPTH {
            return Err(LedgerError::ResourceExhausted);
        }

        let header = self.peek_header()?;
        self.pos += header.len;

        match header.major {
            MajorType::UnsignedInt | MajorType::NegativeInt | MajorType::SimpleFloat => Ok(()),
            MajorType::ByteString | MajorType::TextString => {
                let len = usize::try_from(header.argument).map_err(|_| LedgerError::DataLoss)?;
                if len > self.remaining() {
                    return Err(LedgerError::DataLoss);
                }
                self.pos += len;
                Ok(())
            }
            MajorType::Array => {
                for _ in 0..header.argument {
                    self.skip_nested(depth + 1)?;
                }
                Ok(())
            }
            MajorType::Map => {
                for _ in 0..header.argument {
                    self.skip_nested(depth + 1)?; // key
                    self.skip_nested(depth + 1)?; // value
                }
                Ok(())
            }
            MajorType::Tag => self.skip_nested(depth + 1),
        }
    }

    fn peek_header(&self) -> Result<Header, LedgerError> {
        parse_header(&self.data[self.pos..])
    }

    fn peek_header_of(&self, expected: MajorType) -> Result<Header, LedgerError> {
        let header = self.peek_header()?;
        if header.major != expected {
            return Err(LedgerError::DataLoss);
        }
        Ok(header)
    }

    fn peek_span(&self, expected: MajorType) -> Result<(Header, &'a [u8]), LedgerError> {
        let header = self.peek_header_of(expected)?;
        let len = usize::try_from(header.argument).map_err(|_| LedgerError::DataLoss)?;
        let start = self.pos + header.len;
        let data: &'a [u8] = self.data;
        let src = start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or(LedgerError::DataLoss)?;
        Ok((header, src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Encoder, test_support::encode_with};

    #[test]
    fn empty_map() {
        let mut dec = Decoder::new(&[0xa0]);
        assert_eq!(dec.read_map_header(), Ok(0));
        assert!(!dec.has_next());
    }

    #[test]
    fn enabled_count_scenario() {
        let data = [
            0xa2, 0x67, b'e', b'n', b'a', b'b', b'l', b'e', b'd', 0xf5, 0x65, b'c', b'o', b'u',
            b'n', b't', 0x18, 0x2a,
        ];
        let mut dec = Decoder::new(&data);
        let mut key_buf = [0u8; 16];

        assert_eq!(dec.read_map_header(), Ok(2));
        assert_eq!(dec.read_key(&mut key_buf), Ok("enabled"));
        assert_eq!(dec.read_bool(), Ok(true));
        assert_eq!(dec.read_key(&mut key_buf), Ok("count"));
        assert_eq!(dec.read_int(), Ok(42));
        assert!(!dec.has_next());
    }

    #[test]
    fn negative_ints_follow_minus_one_rule() {
        let mut dec = Decoder::new(&[0x20, 0x29, 0x38, 0x63]);
        assert_eq!(dec.read_int(), Ok(-1));
        assert_eq!(dec.read_int(), Ok(-10));
        assert_eq!(dec.read_int(), Ok(-100));
    }

    #[test]
    fn int_range_errors() {
        // u64::MAX does not fit an i64
        let data = [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let mut dec = Decoder::new(&data);
        assert_eq!(dec.read_int(), Err(LedgerError::OutOfRange));
        assert_eq!(dec.position(), 0);
        assert_eq!(dec.read_uint(), Ok(u64::MAX));

        // -1 - 2^63 does not fit either
        let data = [0x3b, 0x80, 0, 0, 0, 0, 0, 0, 0];
        let mut dec = Decoder::new(&data);
        assert_eq!(dec.read_int(), Err(LedgerError::OutOfRange));

        // i64::MIN is representable
        let data = [0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(Decoder::new(&data).read_int(), Ok(i64::MIN));
    }

    #[test]
    fn read_uint_rejects_negative() {
        let mut dec = Decoder::new(&[0x20]);
        assert_eq!(dec.read_uint(), Err(LedgerError::DataLoss));
    }

    #[test]
    fn read_double_widens_integers() {
        let mut dec = Decoder::new(&[0x18, 0x2a, 0x29, 0xfb, 0xbf, 0xe0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(dec.read_double(), Ok(42.0));
        assert_eq!(dec.read_double(), Ok(-10.0));
        assert_eq!(dec.read_double(), Ok(-0.5));
    }

    #[test]
    fn read_double_rejects_integers_outside_i64() {
        let mut dec = Decoder::new(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(dec.read_double(), Err(LedgerError::OutOfRange));
        assert_eq!(dec.position(), 0);

        let mut dec = Decoder::new(&[0x3b, 0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(dec.read_double(), Err(LedgerError::OutOfRange));

        let mut dec = Decoder::new(&[0x1b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(dec.read_double(), Ok(i64::MAX as f64));
        assert!(!dec.has_next());
    }

    #[test]
    fn read_double_rejects_other_floats() {
        // Single precision 1.0
        let mut dec = Decoder::new(&[0xfa, 0x3f, 0x80, 0x00, 0x00]);
        assert_eq!(dec.read_double(), Err(LedgerError::DataLoss));
        assert_eq!(Decoder::new(&[0xf5]).read_double(), Err(LedgerError::DataLoss));
    }

    #[test]
    fn truncated_inputs_are_data_loss() {
        assert_eq!(Decoder::new(&[]).read_bool(), Err(LedgerError::DataLoss));
        assert_eq!(Decoder::new(&[0x19, 0x01]).read_uint(), Err(LedgerError::DataLoss));
        assert_eq!(
            Decoder::new(&[0xfb, 0x3f, 0xf0]).read_double(),
            Err(LedgerError::DataLoss)
        );

        let mut buf = [0u8; 8];
        assert_eq!(
            Decoder::new(&[0x63, b'a', b'b']).read_string(&mut buf),
            Err(LedgerError::DataLoss)
        );
    }

    #[test]
    fn type_mismatch_leaves_cursor() {
        let mut dec = Decoder::new(&[0x62, b'h', b'i']);
        let mut buf = [0u8; 4];
        assert_eq!(dec.read_bool(), Err(LedgerError::DataLoss));
        assert_eq!(dec.read_bytes(&mut buf), Err(LedgerError::DataLoss));
        assert_eq!(dec.read_map_header(), Err(LedgerError::DataLoss));
        assert_eq!(dec.position(), 0);
        assert_eq!(dec.read_string(&mut buf), Ok("hi"));
        assert_eq!(dec.position(), 3);
    }

    #[test]
    fn read_key_requires_text_and_room() {
        let mut small = [0u8; 2];
        let mut dec = Decoder::new(&[0x63, b'a', b'b', b'c']);
        assert_eq!(dec.read_key(&mut small), Err(LedgerError::ResourceExhausted));
        assert_eq!(dec.position(), 0);

        let mut buf = [0u8; 4];
        let mut dec = Decoder::new(&[0x43, b'a', b'b', b'c']);
        assert_eq!(dec.read_key(&mut buf), Err(LedgerError::DataLoss));

        let mut dec = Decoder::new(&[0x62, 0xff, 0xfe]);
        assert_eq!(dec.read_key(&mut buf), Err(LedgerError::DataLoss));
    }

    #[test]
    fn bytes_read_back() {
        let mut dec = Decoder::new(&[0x43, 0x01, 0x02, 0x03, 0x40]);
        let mut buf = [0u8; 8];
        assert_eq!(dec.read_bytes(&mut buf), Ok(&[1u8, 2, 3][..]));
        assert_eq!(dec.read_bytes(&mut buf), Ok(&[][..]));
    }

    #[test]
    fn peek_does_not_consume() {
        let dec = Decoder::new(&[0x78, 0x20]);
        assert_eq!(dec.peek_type(), Ok(MajorType::TextString));
        assert_eq!(dec.peek_initial_byte(), Ok(0x78));
        assert_eq!(dec.peek_string_length(), Ok(32));
        assert_eq!(dec.position(), 0);
    }

    #[test]
    fn peek_string_length_forms() {
        assert_eq!(Decoder::new(&[0x65]).peek_string_length(), Ok(5));
        assert_eq!(Decoder::new(&[0x44]).peek_string_length(), Ok(4));
        assert_eq!(Decoder::new(&[0x59, 0x01, 0x00]).peek_string_length(), Ok(256));
        assert_eq!(
            Decoder::new(&[0x18, 0x2a]).peek_string_length(),
            Err(LedgerError::FailedPrecondition)
        );
        assert_eq!(
            Decoder::new(&[0x7f]).peek_string_length(),
            Err(LedgerError::Unimplemented)
        );
        assert_eq!(Decoder::new(&[]).peek_string_length(), Err(LedgerError::DataLoss));
    }

    #[test]
    fn skip_value_consumes_exactly_one_value() {
        // {"a": {"x": [1, 2, "s"], "y": h'0102'}, "b": 7}
        let data = [
            0xa2, //
            0x61, b'a', 0xa2, //
            0x61, b'x', 0x83, 0x01, 0x02, 0x61, b's', //
            0x61, b'y', 0x42, 0x01, 0x02, //
            0x61, b'b', 0x07,
        ];
        let mut dec = Decoder::new(&data);
        let mut key_buf = [0u8; 4];

        assert_eq!(dec.read_map_header(), Ok(2));
        assert_eq!(dec.read_key(&mut key_buf), Ok("a"));
        dec.skip_value().unwrap();
        assert_eq!(dec.read_key(&mut key_buf), Ok("b"));
        assert_eq!(dec.read_uint(), Ok(7));
        assert!(!dec.has_next());
    }

    #[test]
    fn skip_value_covers_scalars_tags_and_floats() {
        let data = [
            0x1a, 0, 0, 0, 1, // uint
            0x38, 0x63, // -100
            0xf6, // null
            0xfb, 0, 0, 0, 0, 0, 0, 0, 0, // float64
            0xf9, 0x3c, 0x00, // half float
            0xc1, 0x1a, 0x5f, 0x00, 0x00, 0x00, // tag 1 (epoch time)
            0x01,
        ];
        let mut dec = Decoder::new(&data);
        for _ in 0..6 {
            dec.skip_value().unwrap();
        }
        assert_eq!(dec.read_uint(), Ok(1));
    }

    #[test]
    fn skip_value_errors() {
        // Indefinite-length array
        assert_eq!(
            Decoder::new(&[0x9f, 0x01, 0xff]).skip_value(),
            Err(LedgerError::Unimplemented)
        );

        // String longer than the data
        let mut dec = Decoder::new(&[0x65, b'a']);
        assert_eq!(dec.skip_value(), Err(LedgerError::DataLoss));
        assert_eq!(dec.position(), 0);

        // Array missing elements
        assert_eq!(
            Decoder::new(&[0x82, 0x01]).skip_value(),
            Err(LedgerError::DataLoss)
        );

        // Nesting past the limit
        let deep = [0x81u8; MAX_SKIP_DEPTH + 2];
        assert_eq!(
            Decoder::new(&deep).skip_value(),
            Err(LedgerError::ResourceExhausted)
        );
    }

    #[test]
    fn round_trip_all_types() {
        let bytes = encode_with(|enc: &mut Encoder<'_>| {
            enc.begin_map(12)?;
            enc.write_bool("t", true)?;
            enc.write_bool("f", false)?;
            enc.write_int("min", i64::MIN)?;
            enc.write_int("max", i64::MAX)?;
            enc.write_int("neg", -24)?;
            enc.write_uint("u", u64::from(u32::MAX) + 1)?;
            enc.write_double("pi", -3.25)?;
            enc.write_double("tiny", f64::MIN_POSITIVE)?;
            enc.write_string("s", "grüezi")?;
            enc.write_string("empty", "")?;
            enc.write_bytes("b", &[0x00, 0xff, 0x10])?;
            enc.write_bytes("nob", &[])
        });

        let mut dec = Decoder::new(bytes.as_slice());
        let mut key = [0u8; 8];
        let mut out = [0u8; 16];

        assert_eq!(dec.read_map_header(), Ok(12));
        assert_eq!(dec.read_key(&mut key), Ok("t"));
        assert_eq!(dec.read_bool(), Ok(true));
        assert_eq!(dec.read_key(&mut key), Ok("f"));
        assert_eq!(dec.read_bool(), Ok(false));
        assert_eq!(dec.read_key(&mut key), Ok("min"));
        assert_eq!(dec.read_int(), Ok(i64::MIN));
        assert_eq!(dec.read_key(&mut key), Ok("max"));
        assert_eq!(dec.read_int(), Ok(i64::MAX));
        assert_eq!(dec.read_key(&mut key), Ok("neg"));
        assert_eq!(dec.read_int(), Ok(-24));
        assert_eq!(dec.read_key(&mut key), Ok("u"));
        assert_eq!(dec.read_uint(), Ok(u64::from(u32::MAX) + 1));
        assert_eq!(dec.read_key(&mut key), Ok("pi"));
        assert_eq!(dec.read_double(), Ok(-3.25));
        assert_eq!(dec.read_key(&mut key), Ok("tiny"));
        assert_eq!(dec.read_double(), Ok(f64::MIN_POSITIVE));
        assert_eq!(dec.read_key(&mut key), Ok("s"));
        assert_eq!(dec.read_string(&mut out), Ok("grüezi"));
        assert_eq!(dec.read_key(&mut key), Ok("empty"));
        assert_eq!(dec.read_string(&mut out), Ok(""));
        assert_eq!(dec.read_key(&mut key), Ok("b"));
        assert_eq!(dec.read_bytes(&mut out), Ok(&[0x00u8, 0xff, 0x10][..]));
        assert_eq!(dec.read_key(&mut key), Ok("nob"));
        assert_eq!(dec.read_bytes(&mut out), Ok(&[][..]));
        assert!(!dec.has_next());
    }
}
