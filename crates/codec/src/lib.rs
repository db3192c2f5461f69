//! An EVM ABI codec over dynamically typed values.
//!
//! A [`DataTypeFactory`] turns JSON ABI descriptors into a tree of [`DataType`] nodes. Encoding
//! walks the tree to build a [`Layout`] of blocks, which the linearizer orders and flattens to
//! the head/tail encoding, optionally after the optimizer pointed identical dynamic values to a
//! single copy. Decoding walks the same tree over a [`Cursor`].

pub use codec::{
    decode, decode_hex, decode_node, decode_params, encode, encode_node, encode_params,
    encode_to_bytes, Encoded,
};
mod codec;

pub use cursor::Cursor;
mod cursor;

pub use error::{
    ArityMismatchError, BufferUnderrunError, CodecError, DecodingError, EncodingRangeError,
    LayoutError, SelectorMismatchError, TupleShapeError, TypeGrammarError,
};
mod error;

pub use event::{EventExt, MAX_TOPICS};
mod event;

pub use factory::{DataTypeFactory, FactoryConfig, DEFAULT_MAX_DEPTH};
mod factory;

pub use function::{AbiErrorExt, FunctionExt};
mod function;

pub use grammar::TypeSpec;
mod grammar;

pub use layout::{Block, BlockId, BlockKind, Layout};
mod layout;

pub mod linearizer;

pub mod optimizer;

pub use registry::{DecodedCall, RegistryEntry, SelectorRegistry, SelectorRegistryBuilder};
mod registry;

pub use rules::{DecodeRules, EncodeRules, DEFAULT_DECODE_BUDGET_FACTOR};
mod rules;

pub mod types;
pub use types::{Blob, BlobKind, DataType, Pointer, Set, SetKind, TupleMember};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
