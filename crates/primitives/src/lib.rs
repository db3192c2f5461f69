//! Primitive types for the ABI codec: the dynamic value model and the JSON ABI descriptors.

pub use item::{AbiError, AbiItem, Constructor, Event, Function, JsonAbi};
mod item;

pub use json::JsonValueError;
mod json;

pub use param::Param;
mod param;

pub use signature::{
    canonical_type, error_signature, function_signature, selector, split_top_level,
};
mod signature;

pub use value::AbiValue;
mod value;

/// The size of an ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// The size of a function selector in bytes.
pub const SELECTOR_SIZE: usize = 4;
