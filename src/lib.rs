//! HDF5 datatype messages for Rust.
//!
//! This crate reads and writes the binary datatype message that HDF5 files use to describe
//! the element type of datasets and attributes. Some of the features include:
//!
//! - All eleven type classes, nested to any depth (up to a configurable limit).
//! - Message versions 1 to 4, with in-place upgrades of legacy content while decoding.
//! - Exact size computation ahead of encoding, so buffers can be sized up front.
//! - A multi-line diagnostic dump in the style of the HDF5 debugging tools.
//!
//! The in-memory descriptor tree lives in the `hdf5-dtype-types` crate and is re-exported
//! here as [`types`].

#![cfg_attr(feature = "cargo-clippy", warn(clippy::pedantic))]
#![cfg_attr(feature = "cargo-clippy", warn(clippy::all))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::identity_op))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::cast_possible_truncation))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::module_name_repetitions))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::missing_errors_doc))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::must_use_candidate))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::return_self_not_must_use))]
#![cfg_attr(all(feature = "cargo-clippy", test), allow(clippy::cognitive_complexity))]

#[macro_use]
mod macros;

pub mod codec;
pub mod debug;
mod error;
pub mod globals;
mod options;
pub mod version;

pub use crate::codec::{
    decode, decode_from, decode_with, encode, encode_as, encode_into, encode_to_vec,
    encoded_size, Decoded, ReadCursor, WriteCursor,
};
pub use crate::debug::Dump;
pub use crate::error::{Error, Result};
pub use crate::options::{DecodeOptions, DecodeOptionsBuilder, DEFAULT_MAX_DEPTH};
pub use crate::version::{required_version, upgrade_version, with_version};

pub mod types {
    pub use hdf5_dtype_types::*;
}
