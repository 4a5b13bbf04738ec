//! Header width selection and parsing shared by the encoder and decoder.
//!
//! Every wire value starts with an initial byte `(major << 5) | info` followed
//! by 0, 1, 2, 4, or 8 big-endian argument bytes. These helpers are useful when
//! sizing buffers ahead of an [`Encoder`](crate::ledger::Encoder) run or when
//! inspecting raw records.

use crate::ledger::{LedgerError, types::MajorType};

/// Largest argument embedded directly in the initial byte.
const INLINE_MAX: u64 = 23;

/// A parsed value header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Major type from the upper 3 bits.
    pub major: MajorType,
    /// Additional info from the lower 5 bits.
    pub info: u8,
    /// Argument value (length, count, or the integer itself).
    pub argument: u64,
    /// Number of bytes the header occupies.
    pub len: usize,
}

/// Returns the number of bytes needed to encode a header with `argument`.
///
/// Always the smallest sufficient width.
///
/// # Example
/// ```
/// use embedded_ledger::ledger::helpers::header_len;
///
/// assert_eq!(header_len(23), 1);
/// assert_eq!(header_len(24), 2);
/// assert_eq!(header_len(256), 3);
/// assert_eq!(header_len(0x1_0000), 5);
/// assert_eq!(header_len(u64::MAX), 9);
/// ```
#[inline]
pub fn header_len(argument: u64) -> usize {
    if argument <= INLINE_MAX {
        1
    } else if argument <= 0xff {
        2
    } else if argument <= 0xffff {
        3
    } else if argument <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Encodes a header into a 9-byte scratch array.
///
/// Returns the array and the number of leading bytes that make up the header.
///
/// # Example
/// ```
/// use embedded_ledger::ledger::{MajorType, helpers::encode_header};
///
/// let (bytes, len) = encode_header(MajorType::UnsignedInt, 256);
/// assert_eq!(&bytes[..len], &[0x19, 0x01, 0x00]);
///
/// let (bytes, len) = encode_header(MajorType::NegativeInt, 99);
/// assert_eq!(&bytes[..len], &[0x38, 0x63]);
/// ```
pub fn encode_header(major: MajorType, argument: u64) -> ([u8; 9], usize) {
    let mut out = [0u8; 9];
    let bits = major.initial_bits();
    let len = header_len(argument);
    match len {
        1 => out[0] = bits | argument as u8,
        2 => {
            out[0] = bits | 24;
            out[1] = argument as u8;
        }
        3 => {
            out[0] = bits | 25;
            out[1..3].copy_from_slice(&(argument as u16).to_be_bytes());
        }
        5 => {
            out[0] = bits | 26;
            out[1..5].copy_from_slice(&(argument as u32).to_be_bytes());
        }
        _ => {
            out[0] = bits | 27;
            out[1..9].copy_from_slice(&argument.to_be_bytes());
        }
    }
    (out, len)
}

/// Parses the header at the start of `data` without consuming anything.
///
/// # Errors
/// * [`LedgerError::DataLoss`] - if `data` is empty or the argument bytes are truncated
/// * [`LedgerError::Unimplemented`] - for reserved (28-30) or indefinite (31) forms
pub fn parse_header(data: &[u8]) -> Result<Header, LedgerError> {
    let initial = *data.first().ok_or(LedgerError::DataLoss)?;
    let major = MajorType::from_initial(initial);
    let info = initial & 0x1f;

    let width = match info {
        0..=23 => {
            return Ok(Header {
                major,
                info,
                argument: u64::from(info),
                len: 1,
            });
        }
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        _ => return Err(LedgerError::Unimplemented),
    };

    let bytes = data.get(1..1 + width).ok_or(LedgerError::DataLoss)?;
    let argument = bytes
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

    Ok(Header {
        major,
        info,
        argument,
        len: 1 + width,
    })
}

#[test]
fn header_width_boundaries() {
    let cases: [(u64, &[u8]); 10] = [
        (0, &[0x00]),
        (23, &[0x17]),
        (24, &[0x18, 0x18]),
        (0xff, &[0x18, 0xff]),
        (0x100, &[0x19, 0x01, 0x00]),
        (0xffff, &[0x19, 0xff, 0xff]),
        (0x1_0000, &[0x1a, 0x00, 0x01, 0x00, 0x00]),
        (0xffff_ffff, &[0x1a, 0xff, 0xff, 0xff, 0xff]),
        (
            0x1_0000_0000,
            &[0x1b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00],
        ),
        (
            u64::MAX,
            &[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        ),
    ];

    for (argument, expected) in cases {
        let (bytes, len) = encode_header(MajorType::UnsignedInt, argument);
        assert_eq!(&bytes[..len], expected);
        assert_eq!(header_len(argument), expected.len());

        let header = parse_header(expected).unwrap();
        assert_eq!(header.argument, argument);
        assert_eq!(header.len, expected.len());
        assert_eq!(header.major, MajorType::UnsignedInt);
    }
}

#[test]
fn parse_header_edge_cases() {
    // Empty input
    assert_eq!(parse_header(&[]), Err(LedgerError::DataLoss));

    // Truncated 2-byte argument
    assert_eq!(parse_header(&[0x19, 0x01]), Err(LedgerError::DataLoss));

    // Reserved and indefinite forms
    assert_eq!(parse_header(&[0x1c]), Err(LedgerError::Unimplemented));
    assert_eq!(parse_header(&[0x5f]), Err(LedgerError::Unimplemented));
    assert_eq!(parse_header(&[0xff]), Err(LedgerError::Unimplemented));

    // Trailing bytes are ignored
    let header = parse_header(&[0x65, b'c', b'o']).unwrap();
    assert_eq!(header.major, MajorType::TextString);
    assert_eq!(header.argument, 5);
    assert_eq!(header.len, 1);

    // Float64 header carries its payload as the argument
    let header = parse_header(&[0xfb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]).unwrap();
    assert_eq!(header.info, 27);
    assert_eq!(header.argument, 1.0f64.to_bits());
}
