//! Test support utilities - only compiled in test builds.

use crate::ledger::{BlobStore, Encoder, Ledger, LedgerError, RamBlobStore};

/// Standard test store: 4 records of up to 512 bytes
pub type TestStore = RamBlobStore<4, 512>;

/// Keys "k0".."k16", one more than the property table holds.
pub const KEYS: [&str; 17] = [
    "k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9", "k10", "k11", "k12", "k13", "k14",
    "k15", "k16",
];

/// Store whose every operation fails.
#[derive(Debug)]
pub struct FailingStore;

impl BlobStore for FailingStore {
    fn read(&mut self, _name: &str, _buf: &mut [u8]) -> Result<usize, LedgerError> {
        Err(LedgerError::FailedPrecondition)
    }

    fn write(&mut self, _name: &str, _data: &[u8]) -> Result<(), LedgerError> {
        Err(LedgerError::FailedPrecondition)
    }
}

/// Helper to create an empty ledger named "settings".
pub fn test_ledger() -> Ledger<TestStore> {
    Ledger::new(TestStore::new(), "settings").unwrap()
}

/// Runs `f` against a fresh encoder and returns the bytes it wrote.
pub fn encode_with(
    f: impl FnOnce(&mut Encoder<'_>) -> Result<(), LedgerError>,
) -> heapless::Vec<u8, 256> {
    let mut buf = [0u8; 256];
    let mut enc = Encoder::new(&mut buf);
    f(&mut enc).unwrap();

    let mut out = heapless::Vec::new();
    out.extend_from_slice(enc.as_bytes()).unwrap();
    out
}

/// Encodes `value` and returns just the value bytes, without the key.
pub fn encoded_int(value: i64) -> heapless::Vec<u8, 16> {
    let mut buf = [0u8; 16];
    let mut enc = Encoder::new(&mut buf);
    enc.write_int("", value).unwrap();

    // Skip the empty key, 0x60
    let mut out = heapless::Vec::new();
    out.extend_from_slice(&enc.as_bytes()[1..]).unwrap();
    out
}
