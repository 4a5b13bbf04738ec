/// Maximum number of properties in one record.
pub const MAX_PROPERTIES: usize = 16;

/// Maximum record name length in bytes.
///
/// Also the size of the key buffer used by read-through lookups.
pub const MAX_NAME_SIZE: usize = 32;

/// Maximum encoded record size accepted by the blob store (16 KiB).
pub const MAX_DATA_SIZE: usize = 16384;

/// Stack scratch size for read-through property lookups.
///
/// Records larger than this cannot be queried through the `get_*` helpers;
/// open them with [`Ledger::edit`](crate::ledger::Ledger::edit) and a
/// larger buffer instead.
pub const DEFAULT_PROPERTY_BUFFER_SIZE: usize = 1024;

/// Default record count of a [`RamBlobStore`](crate::ledger::RamBlobStore).
pub const MAX_RECORD_COUNT: usize = 16;

/// Maximum container nesting followed by [`Decoder::skip_value`](crate::ledger::Decoder::skip_value).
pub const MAX_SKIP_DEPTH: usize = 32;

/// Initial byte of `false`.
pub const SIMPLE_FALSE: u8 = 0xf4;
/// Initial byte of `true`.
pub const SIMPLE_TRUE: u8 = 0xf5;
/// Initial byte of `null`.
pub const SIMPLE_NULL: u8 = 0xf6;
/// Initial byte of an 8-byte IEEE 754 double.
pub const FLOAT64: u8 = 0xfb;

/// Major type held in the upper 3 bits of a value's initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MajorType {
    UnsignedInt = 0,
    NegativeInt = 1,
    ByteString = 2,
    TextString = 3,
    Array = 4,
    Map = 5,
    Tag = 6,
    SimpleFloat = 7,
}

impl MajorType {
    /// Extracts the major type from an initial byte.
    #[inline]
    pub fn from_initial(byte: u8) -> Self {
        match byte >> 5 {
            0 => MajorType::UnsignedInt,
            1 => MajorType::NegativeInt,
            2 => MajorType::ByteString,
            3 => MajorType::TextString,
            4 => MajorType::Array,
            5 => MajorType::Map,
            6 => MajorType::Tag,
            _ => MajorType::SimpleFloat,
        }
    }

    /// Returns the major type shifted into initial-byte position.
    #[inline]
    pub fn initial_bits(self) -> u8 {
        (self as u8) << 5
    }
}

/// Borrowed view of a property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> Value<'a> {
    /// Returns the major type this value encodes as.
    pub fn major_type(&self) -> MajorType {
        match self {
            Value::Null | Value::Bool(_) | Value::Double(_) => MajorType::SimpleFloat,
            Value::Int(v) if *v < 0 => MajorType::NegativeInt,
            Value::Int(_) | Value::Uint(_) => MajorType::UnsignedInt,
            Value::Text(_) => MajorType::TextString,
            Value::Bytes(_) => MajorType::ByteString,
        }
    }

    /// Returns the value as `bool` if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64`, accepting unsigned values that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `u64`, accepting non-negative signed values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the text if the value is a text string.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the bytes if the value is a byte string.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
