//! Maps selectors to the functions and errors they belong to.

use crate::{
    cursor::Cursor,
    error::{CodecError, DecodingError},
    function::{AbiErrorExt, FunctionExt},
    rules::DecodeRules,
};
use abi_primitives::{AbiError, AbiValue, Function, JsonAbi, Param};
use alloy_primitives::Selector;
use std::{collections::HashMap, sync::Arc};

/// An item of the [`SelectorRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum RegistryEntry {
    /// A function, matched against call data.
    Function(Function),
    /// A custom error, matched against revert data.
    Error(AbiError),
}

impl RegistryEntry {
    /// Returns the name of the item.
    pub fn name(&self) -> &str {
        match self {
            Self::Function(function) => &function.name,
            Self::Error(error) => &error.name,
        }
    }

    /// Returns the canonical signature of the item.
    pub fn signature(&self) -> String {
        match self {
            Self::Function(function) => function.signature(),
            Self::Error(error) => error.signature(),
        }
    }

    /// Returns the selector of the item.
    pub fn selector(&self) -> Selector {
        match self {
            Self::Function(function) => function.selector(),
            Self::Error(error) => error.selector(),
        }
    }
}

/// Call data or revert data decoded against the matching registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    /// The signature of the matched item.
    pub signature: String,
    /// The decoded arguments.
    pub value: AbiValue,
}

/// An immutable map of selectors, built once and shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    entries: Arc<HashMap<Selector, RegistryEntry>>,
}

impl SelectorRegistry {
    /// Returns a new [`SelectorRegistryBuilder`].
    pub fn builder() -> SelectorRegistryBuilder {
        SelectorRegistryBuilder::default()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry registered for the selector.
    pub fn lookup(&self, selector: Selector) -> Option<&RegistryEntry> {
        self.entries.get(&selector)
    }

    /// Decodes call data or revert data with the entry matching its selector.
    pub fn decode(&self, data: &[u8], rules: DecodeRules) -> Result<DecodedCall, CodecError> {
        let mut cursor = Cursor::with_selector(data)?;
        let selector = cursor.selector().unwrap_or_default();
        let entry = self.lookup(selector).ok_or(DecodingError::UnknownSelector(selector))?;
        tracing::trace!(target: "abi::registry", %selector, signature = %entry.signature(), "matched selector");

        let value = match entry {
            RegistryEntry::Function(function) => function.decode_input(&mut cursor, &rules)?,
            RegistryEntry::Error(error) => error.decode_error(data, rules)?,
        };
        Ok(DecodedCall { signature: entry.signature(), value })
    }
}

/// Builds a [`SelectorRegistry`]. A later entry with an already registered selector
/// replaces the former.
#[derive(Debug, Default)]
pub struct SelectorRegistryBuilder {
    entries: HashMap<Selector, RegistryEntry>,
}

impl SelectorRegistryBuilder {
    /// Registers a function.
    pub fn function(self, function: Function) -> Self {
        self.entry(function.into())
    }

    /// Registers a custom error.
    pub fn error(self, error: AbiError) -> Self {
        self.entry(error.into())
    }

    /// Registers every function and error of the contract ABI.
    pub fn abi(self, abi: &JsonAbi) -> Self {
        let builder = abi.functions().cloned().fold(self, Self::function);
        abi.errors().cloned().fold(builder, Self::error)
    }

    /// Registers the errors raised by `revert` and `require`, `Error(string)`, and by failed
    /// assertions, `Panic(uint256)`.
    pub fn with_builtin_errors(self) -> Self {
        self.error(AbiError::new("Error", vec![Param::new("message", "string")]))
            .error(AbiError::new("Panic", vec![Param::new("code", "uint256")]))
    }

    /// Returns the registry.
    pub fn build(self) -> SelectorRegistry {
        tracing::debug!(target: "abi::registry", entries = self.entries.len(), "built selector registry");
        SelectorRegistry { entries: Arc::new(self.entries) }
    }

    fn entry(mut self, entry: RegistryEntry) -> Self {
        let selector = entry.selector();
        if let Some(previous) = self.entries.insert(selector, entry) {
            tracing::warn!(target: "abi::registry", %selector, previous = %previous.signature(), "replaced registry entry");
        }
        self
    }
}
