use alloy_primitives::{Selector, B256};

/// An error occurring during the codec process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// An invalid type string or descriptor.
    #[error(transparent)]
    TypeGrammar(#[from] TypeGrammarError),
    /// A value outside of the domain of its type.
    #[error(transparent)]
    EncodingRange(#[from] EncodingRangeError),
    /// A tuple value with missing or unknown members.
    #[error(transparent)]
    TupleShape(#[from] TupleShapeError),
    /// A fixed size array or a positional tuple with the wrong number of elements.
    #[error(transparent)]
    ArityMismatch(#[from] ArityMismatchError),
    /// The decoder ran past the end of the input.
    #[error(transparent)]
    BufferUnderrun(#[from] BufferUnderrunError),
    /// The input is meant for another function.
    #[error(transparent)]
    SelectorMismatch(#[from] SelectorMismatchError),
    /// Any other decoding failure.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    /// An inconsistent layout tree.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The event has more indexed parameters than the log can hold topics.
    #[error("event {event} needs {count} topics, a log holds at most 4")]
    TooManyTopics {
        /// The event name.
        event: String,
        /// The number of topics the event needs.
        count: usize,
    },
}

/// An error parsing a type string or building a node from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeGrammarError {
    /// No type matches the string.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// An integer type with a width that is not a multiple of 8 in `[8, 256]`.
    #[error("invalid integer width {bits} in `{ty}`")]
    InvalidIntegerWidth {
        /// The type string.
        ty: String,
        /// The width.
        bits: usize,
    },
    /// A `bytesN` type with `N` outside of `[1, 32]`.
    #[error("invalid fixed bytes size {size} in `{ty}`")]
    InvalidFixedBytesSize {
        /// The type string.
        ty: String,
        /// The size.
        size: usize,
    },
    /// An array suffix which is neither empty nor a positive integer.
    #[error("invalid array size `{size}` in `{ty}`")]
    InvalidArraySize {
        /// The type string.
        ty: String,
        /// The content of the brackets.
        size: String,
    },
    /// An inline tuple with unbalanced parentheses.
    #[error("unbalanced parentheses in `{0}`")]
    UnbalancedParentheses(String),
    /// The type nests deeper than the factory allows.
    #[error("`{name}` nests deeper than {max} levels")]
    NestingTooDeep {
        /// The type string, or the name of the node, that exceeded the depth.
        name: String,
        /// The maximum depth.
        max: usize,
    },
}

/// A value outside of the domain of its type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingRangeError {
    /// The value kind can't represent the type.
    #[error("{name}: expected a value of type {ty}, got {found}")]
    UnexpectedValue {
        /// The path of the value.
        name: String,
        /// The expected type.
        ty: String,
        /// The kind of the provided value.
        found: &'static str,
    },
    /// An integer below the minimum of its type.
    #[error("{name}: {value} is below the minimum {min} of {ty}")]
    Underflow {
        /// The path of the value.
        name: String,
        /// The type.
        ty: String,
        /// The value.
        value: String,
        /// The minimum of the type.
        min: String,
    },
    /// An integer above the maximum of its type.
    #[error("{name}: {value} is above the maximum {max} of {ty}")]
    Overflow {
        /// The path of the value.
        name: String,
        /// The type.
        ty: String,
        /// The value.
        value: String,
        /// The maximum of the type.
        max: String,
    },
    /// A byte value with an invalid length.
    #[error("{name}: {ty} expects {expected} bytes, got {actual}")]
    InvalidLength {
        /// The path of the value.
        name: String,
        /// The type.
        ty: String,
        /// The expected length, or maximal length for `bytesN`.
        expected: usize,
        /// The provided length.
        actual: usize,
    },
    /// A string which is not a valid hex encoding.
    #[error("{name}: invalid hex string `{input}`")]
    InvalidHex {
        /// The path of the value.
        name: String,
        /// The provided string.
        input: String,
    },
    /// A hex string with an odd number of digits.
    #[error("{name}: odd length hex string `{input}`")]
    OddLengthHex {
        /// The path of the value.
        name: String,
        /// The provided string.
        input: String,
    },
    /// A string which is not a valid integer.
    #[error("{name}: invalid integer `{input}`")]
    InvalidInteger {
        /// The path of the value.
        name: String,
        /// The provided string.
        input: String,
    },
}

/// A tuple value that does not match the declared members.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TupleShapeError {
    /// Declared members without a value.
    #[error("{tuple}: missing members {keys:?}")]
    MissingKeys {
        /// The path of the tuple.
        tuple: String,
        /// The missing member names.
        keys: Vec<String>,
    },
    /// Values for members that are not declared.
    #[error("{tuple}: unknown members {keys:?}")]
    UnknownKeys {
        /// The path of the tuple.
        tuple: String,
        /// The unknown member names.
        keys: Vec<String>,
    },
    /// Members provided more than once.
    #[error("{tuple}: duplicate members {keys:?}")]
    DuplicateKeys {
        /// The path of the tuple.
        tuple: String,
        /// The duplicated member names.
        keys: Vec<String>,
    },
}

/// A fixed size set given the wrong number of elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: expected {expected} elements, got {actual}")]
pub struct ArityMismatchError {
    /// The path of the set.
    pub name: String,
    /// The declared arity.
    pub expected: usize,
    /// The provided number of elements.
    pub actual: usize,
}

/// The decoder tried to read past the end of the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("buffer underrun: reading {requested} bytes at offset {offset}, {available} available")]
pub struct BufferUnderrunError {
    /// The offset of the read.
    pub offset: usize,
    /// The number of bytes requested.
    pub requested: usize,
    /// The length of the input.
    pub available: usize,
}

/// The decoded input starts with the selector of another function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("selector mismatch for {signature}: expected {expected}, got {found}")]
pub struct SelectorMismatchError {
    /// The signature of the expected function.
    pub signature: String,
    /// The expected selector.
    pub expected: Selector,
    /// The selector found in the input.
    pub found: Selector,
}

/// An error occurring during the decoding, other than running out of input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodingError {
    /// A `bool` word other than `0` or `1`.
    #[error("{name}: invalid bool word {word}")]
    InvalidBool {
        /// The name of the node.
        name: String,
        /// The word read.
        word: B256,
    },
    /// A word that is not the canonical padding of a value of the type.
    #[error("{name}: word {word} is not a valid {ty}")]
    NonCanonicalWord {
        /// The name of the node.
        name: String,
        /// The type.
        ty: String,
        /// The word read.
        word: B256,
    },
    /// A `string` that is not valid UTF-8.
    #[error("{name}: invalid utf-8 string")]
    InvalidUtf8 {
        /// The name of the node.
        name: String,
    },
    /// An offset or length that does not fit the input.
    #[error("{name}: offset or length {value} out of bounds")]
    OutOfBounds {
        /// The name of the node.
        name: String,
        /// The offending value, as read.
        value: B256,
    },
    /// The hex input could not be parsed.
    #[error("invalid hex input: {0}")]
    InvalidHex(String),
    /// Decoding took more work than the budget allows for the size of the input. Happens when
    /// many offsets point to the same nested content.
    #[error("decoding {input} bytes exceeds the budget of {budget} words")]
    BudgetExceeded {
        /// The budget, in words.
        budget: usize,
        /// The length of the input.
        input: usize,
    },
    /// No entry of the registry matches the selector.
    #[error("unknown selector {0}")]
    UnknownSelector(Selector),
    /// The log does not hold the expected number of topics.
    #[error("event {event}: expected {expected} topics, got {found}")]
    TopicCount {
        /// The event name.
        event: String,
        /// The expected number of topics.
        expected: usize,
        /// The number of topics of the log.
        found: usize,
    },
    /// The first topic is not the hash of the event signature.
    #[error("event {event}: expected topic {expected}, got {found}")]
    TopicMismatch {
        /// The event name.
        event: String,
        /// The expected topic.
        expected: B256,
        /// The topic found in the log.
        found: B256,
    },
}

/// An inconsistent layout tree, only reachable through misuse of the layout API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A block was read before offsets were assigned.
    #[error("block {0} has no assigned offset")]
    UnassignedOffset(String),
    /// A pointer resolves to a destination placed before its parent.
    #[error("pointer {0} resolves to a negative offset")]
    NegativeOffset(String),
    /// A pointer is not enclosed in a set.
    #[error("pointer {0} has no parent")]
    MissingParent(String),
    /// The layout has no root block.
    #[error("layout has no root")]
    MissingRoot,
}
