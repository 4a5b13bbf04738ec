mod arena;
pub mod blob;
pub mod codec;
pub mod editor;
pub mod error;
pub mod handle;
pub mod helpers;
mod macros;
pub mod ram;
mod table;
pub mod types;

#[cfg(test)]
mod test_support;

pub use blob::{BlobStore, SharedBlobStore};
pub use codec::{Decoder, Encoder};
pub use editor::PropertyStore;
pub use error::LedgerError;
pub use handle::Ledger;
pub use ram::RamBlobStore;
pub use types::{
    DEFAULT_PROPERTY_BUFFER_SIZE, MAX_DATA_SIZE, MAX_NAME_SIZE, MAX_PROPERTIES, MAX_RECORD_COUNT,
    MajorType, Value,
};

pub mod prelude {
    pub use super::{
        BlobStore, Decoder, Encoder, Ledger, LedgerError, MajorType, PropertyStore, RamBlobStore,
        SharedBlobStore, Value,
    };
}
