//! JSON ABI items.

use crate::{
    signature::{error_signature, function_signature, selector},
    Param,
};
use alloy_primitives::{keccak256, Selector, B256};
use serde::{Deserialize, Serialize};

/// A function of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// The name of the function.
    pub name: String,
    /// The arguments of the function.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// The returned values of the function.
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// The state mutability, e.g. `view` or `payable`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

impl Function {
    /// Returns a new [`Function`].
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self { name: name.into(), inputs, outputs, state_mutability: None }
    }

    /// Returns the canonical signature, e.g. `stake(uint256,(address,uint96)[])`.
    pub fn signature(&self) -> String {
        function_signature(&self.name, &self.inputs)
    }

    /// Returns the 4 bytes selector of the function.
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }
}

/// An event emitted by a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The name of the event.
    pub name: String,
    /// The parameters of the event.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Whether the event is anonymous. Anonymous events do not emit their signature hash as
    /// first topic.
    #[serde(default)]
    pub anonymous: bool,
}

impl Event {
    /// Returns a new, non anonymous, [`Event`].
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self { name: name.into(), inputs, anonymous: false }
    }

    /// Returns the canonical signature of the event.
    pub fn signature(&self) -> String {
        function_signature(&self.name, &self.inputs)
    }

    /// Returns the hash of the signature, emitted as first topic of non anonymous events.
    pub fn topic(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    /// Returns the indexed parameters of the event.
    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Returns the parameters of the event stored in the log data.
    pub fn data_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| !p.indexed)
    }
}

/// A custom error of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiError {
    /// The name of the error.
    pub name: String,
    /// The parameters of the error.
    #[serde(default)]
    pub inputs: Vec<Param>,
}

impl AbiError {
    /// Returns a new [`AbiError`].
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self { name: name.into(), inputs }
    }

    /// Returns the canonical signature of the error.
    pub fn signature(&self) -> String {
        error_signature(&self.name, &self.inputs)
    }

    /// Returns the 4 bytes selector of the error.
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }
}

/// The constructor of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    /// The constructor arguments.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// The state mutability of the constructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

/// An item of a JSON ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    /// A function.
    Function(Function),
    /// An event.
    Event(Event),
    /// A custom error.
    Error(AbiError),
    /// The constructor.
    Constructor(Constructor),
    /// The fallback function.
    #[from(ignore)]
    Fallback {},
    /// The receive function.
    #[from(ignore)]
    Receive {},
}

/// A contract JSON ABI: a list of [`AbiItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonAbi {
    /// The items of the ABI, in declaration order.
    pub items: Vec<AbiItem>,
}

impl JsonAbi {
    /// Parses a [`JsonAbi`] from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns an iterator over the functions of the ABI.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Returns an iterator over the events of the ABI.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Event(e) => Some(e),
            _ => None,
        })
    }

    /// Returns an iterator over the custom errors of the ABI.
    pub fn errors(&self) -> impl Iterator<Item = &AbiError> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Error(e) => Some(e),
            _ => None,
        })
    }

    /// Returns the first function named `name`. Overloads can be found through
    /// [`JsonAbi::functions`].
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|f| f.name == name)
    }

    /// Returns the first event named `name`.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events().find(|e| e.name == name)
    }

    /// Returns the constructor, if any.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Constructor(c) => Some(c),
            _ => None,
        })
    }
}
