//! Wire formats for operations.

pub mod json;

pub use json::{from_json, from_json_batch, to_json, to_json_batch, CodecError};
