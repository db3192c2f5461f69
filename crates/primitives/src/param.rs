//! The JSON ABI parameter descriptor.

use crate::signature::canonical_type;
use serde::{Deserialize, Serialize};

/// A parameter of a function, an event or an error, as found in a JSON ABI.
///
/// Tuple parameters carry their members in `components` and use the `tuple` keyword in `ty`
/// (e.g. `tuple`, `tuple[]`, `tuple[3]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    /// The declared name, possibly empty.
    #[serde(default)]
    pub name: String,
    /// The type string.
    #[serde(rename = "type")]
    pub ty: String,
    /// The members of a tuple type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
    /// The Solidity type the parameter was declared with, e.g. `struct Pool.Stake[]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    /// Whether the parameter is an indexed event parameter.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub indexed: bool,
}

impl Param {
    /// Returns a new [`Param`] of the provided type.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into(), ..Default::default() }
    }

    /// Returns a new tuple [`Param`]. `ty` is expected to start with the `tuple` keyword.
    pub fn tuple(name: impl Into<String>, ty: impl Into<String>, components: Vec<Self>) -> Self {
        Self { name: name.into(), ty: ty.into(), components, ..Default::default() }
    }

    /// Returns the parameter marked as indexed.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Returns true if the parameter is a tuple or an array of tuples.
    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with("tuple")
    }

    /// Returns the canonical type of the parameter, ignoring member names.
    pub fn canonical_type(&self) -> String {
        canonical_type(&self.ty, &self.components)
    }
}
