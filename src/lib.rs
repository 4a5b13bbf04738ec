//! A `no_std`, no-alloc property record store for embedded systems.
//!
//! A record is a small map of named properties (booleans, integers, doubles,
//! strings, byte blobs) kept as one contiguous blob in a [`BlobStore`]. The
//! blob is canonical-minimal CBOR, so any CBOR decoder can read it.
//!
//! # Features
//!
//! - **Zero heap allocation** - Editing works inside one caller buffer
//! - **Streaming codec** - [`Encoder`] and [`Decoder`] over plain byte slices
//! - **Bounded editor** - At most 16 properties, arena capped at half the buffer
//! - **Best-effort import** - Truncated or foreign records still open
//! - **Pluggable storage** - Any [`BlobStore`]; RAM and shared adapters included
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────── edit buffer ─────────────────────────────┐
//! │ re-encoded record ──▶                       ◀── arena (keys, strings) │
//! │ 0                              len/2                                len │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`Ledger::edit`] reads the record into the front of the buffer
//! - The [`PropertyStore`] imports it, copying keys and strings into the arena
//! - Setters update the in-memory table; the arena never grows past `len/2`
//! - [`PropertyStore::commit`] encodes the live properties in front of the arena
//!   and writes them back
//!
//! # Example
//!
//! ```rust
//! use embedded_ledger::prelude::*;
//!
//! let mut ledger = Ledger::new(RamBlobStore::<4, 256>::new(), "motor").unwrap();
//!
//! // Edit: every change lives in `buf` until commit
//! let mut buf = [0u8; 256];
//! let mut props = ledger.edit(&mut buf).unwrap();
//! props.set_bool("enabled", true).unwrap();
//! props.set_uint("rpm", 1200).unwrap();
//! props.set_string("label", "fan-1").unwrap();
//! props.commit().unwrap();
//!
//! // Read-through lookups with defaults
//! assert!(ledger.get_bool("enabled", false));
//! assert_eq!(ledger.get_u32("rpm", 0), 1200);
//! assert_eq!(ledger.get_i32("missing", -1), -1);
//!
//! let mut out = [0u8; 16];
//! assert_eq!(ledger.get_string("label", &mut out), Ok("fan-1"));
//! ```
//!
//! [`BlobStore`]: ledger::BlobStore
//! [`Encoder`]: ledger::Encoder
//! [`Decoder`]: ledger::Decoder
//! [`Ledger::edit`]: ledger::Ledger::edit
//! [`PropertyStore`]: ledger::PropertyStore
//! [`PropertyStore::commit`]: ledger::PropertyStore::commit

#![deny(unsafe_code)]
#![no_std]

pub mod ledger;

pub mod prelude {
    pub use crate::ledger::prelude::*;
}
