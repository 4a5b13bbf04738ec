/// Errors that can occur while encoding, decoding, or editing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// Output buffer, entry table, or arena capacity exceeded.
    ResourceExhausted,
    /// Malformed input: type mismatch, truncated data, or invalid UTF-8.
    DataLoss,
    /// Integer does not fit the requested type.
    OutOfRange,
    /// Indefinite-length or reserved header form encountered.
    Unimplemented,
    /// Operation not valid in the current state.
    FailedPrecondition,
    /// The blob store holds no record under the given name.
    NotFound,
    /// Record name is empty or too long.
    InvalidArgument,
}

impl core::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LedgerError::ResourceExhausted => write!(f, "buffer or table capacity exceeded"),
            LedgerError::DataLoss => write!(f, "malformed or truncated data"),
            LedgerError::OutOfRange => write!(f, "value out of representable range"),
            LedgerError::Unimplemented => write!(f, "unsupported encoding form"),
            LedgerError::FailedPrecondition => write!(f, "operation not valid in current state"),
            LedgerError::NotFound => write!(f, "record not found"),
            LedgerError::InvalidArgument => write!(f, "invalid record name"),
        }
    }
}
