//! Map codec for the record wire format.
//!
//! A record is a single map with text keys and scalar values: null, bool,
//! signed and unsigned integers, 8-byte doubles, text, and byte strings.
//! The encoding is the canonical-minimal subset of CBOR (RFC 8949) without
//! indefinite-length forms.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;
