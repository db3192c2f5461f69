use crate::{
    cursor::Cursor,
    error::{ArityMismatchError, CodecError, DecodingError, EncodingRangeError, TupleShapeError},
    layout::{Block, BlockId, Layout},
    rules::DecodeRules,
    types::{scoped, word_to_usize, DataType},
};
use abi_primitives::AbiValue;
use std::collections::HashSet;

/// A named member of a tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleMember {
    /// The member name, unique in the tuple.
    pub key: String,
    /// The node of the member.
    pub node: DataType,
}

/// The shape of a [`Set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetKind {
    /// A tuple, with members in declaration order.
    Tuple(Vec<TupleMember>),
    /// An array of `arity` elements, or a dynamic array if `None`.
    Array {
        /// The node of every element.
        element: Box<DataType>,
        /// The number of elements of a fixed size array.
        arity: Option<usize>,
    },
}

/// A node made of other nodes: a tuple or an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    name: String,
    kind: SetKind,
}

impl Set {
    /// Returns a new tuple [`Set`]. Dynamic members are placed behind a
    /// [`Pointer`](crate::types::Pointer).
    pub fn tuple(name: impl Into<String>, members: Vec<(String, DataType)>) -> Self {
        let name = name.into();
        let members = members
            .into_iter()
            .map(|(key, node)| TupleMember { key, node: node.into_member(&name) })
            .collect();
        Self { name, kind: SetKind::Tuple(members) }
    }

    /// Returns a new array [`Set`]. A dynamic element is placed behind a
    /// [`Pointer`](crate::types::Pointer).
    pub fn array(name: impl Into<String>, element: DataType, arity: Option<usize>) -> Self {
        let name = name.into();
        let element = Box::new(element.into_member(&name));
        Self { name, kind: SetKind::Array { element, arity } }
    }

    /// Returns the scoped name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shape of the set.
    pub const fn kind(&self) -> &SetKind {
        &self.kind
    }

    /// Returns the members of a tuple.
    pub fn members(&self) -> Option<&[TupleMember]> {
        match &self.kind {
            SetKind::Tuple(members) => Some(members),
            SetKind::Array { .. } => None,
        }
    }

    /// Returns true if the arity is fixed and no member is a
    /// [`Pointer`](crate::types::Pointer).
    pub fn is_static(&self) -> bool {
        match &self.kind {
            SetKind::Tuple(members) => members.iter().all(|member| !member.node.is_pointer()),
            SetKind::Array { element, arity } => arity.is_some() && !element.is_pointer(),
        }
    }

    /// Returns the canonical type string.
    pub fn signature(&self) -> String {
        match &self.kind {
            SetKind::Tuple(members) => {
                let members: Vec<_> = members.iter().map(|member| member.node.signature()).collect();
                format!("({})", members.join(","))
            }
            SetKind::Array { element, arity: Some(arity) } => {
                format!("{}[{arity}]", element.signature())
            }
            SetKind::Array { element, arity: None } => format!("{}[]", element.signature()),
        }
    }

    /// Returns the size of the encoding if it does not depend on the value.
    pub fn static_size(&self) -> Option<usize> {
        match &self.kind {
            SetKind::Tuple(members) => {
                members.iter().map(|member| member.node.static_size()).sum()
            }
            SetKind::Array { element, arity } => Some(element.static_size()? * (*arity)?),
        }
    }

    /// Encodes the value into a member block holding the blocks of every member.
    pub fn encode_fragment(
        &self,
        value: &AbiValue,
        layout: &mut Layout,
        path: &str,
    ) -> Result<BlockId, CodecError> {
        let id = layout.push(Block::member(path, self.signature()));

        let values = self.member_values(value, path)?;
        let children = match &self.kind {
            SetKind::Tuple(members) => members
                .iter()
                .zip(values)
                .map(|(member, value)| {
                    member.node.encode_fragment(value, layout, &scoped(path, &member.key))
                })
                .collect::<Result<Vec<_>, _>>()?,
            SetKind::Array { element, .. } => values
                .into_iter()
                .enumerate()
                .map(|(i, value)| element.encode_fragment(value, layout, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()?,
        };
        let len = match &self.kind {
            SetKind::Array { arity: None, .. } => Some(children.len()),
            _ => None,
        };

        layout.set_members(id, children, len);
        Ok(id)
    }

    /// Returns the value of every member of the set, in order.
    pub(crate) fn member_values<'v>(
        &self,
        value: &'v AbiValue,
        path: &str,
    ) -> Result<Vec<&'v AbiValue>, CodecError> {
        match &self.kind {
            SetKind::Tuple(members) => self.tuple_values(members, value, path),
            SetKind::Array { arity, .. } => {
                let values = match value {
                    AbiValue::Array(values) | AbiValue::Tuple(values) => values,
                    other => return Err(self.unexpected(other, path).into()),
                };
                if let Some(arity) = arity {
                    if values.len() != *arity {
                        return Err(ArityMismatchError {
                            name: path.to_owned(),
                            expected: *arity,
                            actual: values.len(),
                        }
                        .into())
                    }
                }
                Ok(values.iter().collect())
            }
        }
    }

    /// Returns the value of every member of a tuple, in declaration order. Accepts values keyed
    /// by member name or positional.
    fn tuple_values<'v>(
        &self,
        members: &[TupleMember],
        value: &'v AbiValue,
        path: &str,
    ) -> Result<Vec<&'v AbiValue>, CodecError> {
        let fields = match value {
            AbiValue::Struct(fields) => fields,
            AbiValue::Tuple(values) | AbiValue::Array(values) => {
                if values.len() != members.len() {
                    return Err(ArityMismatchError {
                        name: path.to_owned(),
                        expected: members.len(),
                        actual: values.len(),
                    }
                    .into())
                }
                return Ok(values.iter().collect())
            }
            other => return Err(self.unexpected(other, path).into()),
        };

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        for (key, _) in fields {
            if !seen.insert(key.as_str()) && !duplicates.contains(key) {
                duplicates.push(key.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(TupleShapeError::DuplicateKeys { tuple: path.to_owned(), keys: duplicates }.into())
        }

        let unknown: Vec<String> = fields
            .iter()
            .filter(|(key, _)| !members.iter().any(|member| &member.key == key))
            .map(|(key, _)| key.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(TupleShapeError::UnknownKeys { tuple: path.to_owned(), keys: unknown }.into())
        }

        let missing: Vec<String> = members
            .iter()
            .filter(|member| !seen.contains(member.key.as_str()))
            .map(|member| member.key.clone())
            .collect();
        if !missing.is_empty() {
            return Err(TupleShapeError::MissingKeys { tuple: path.to_owned(), keys: missing }.into())
        }

        Ok(members.iter().filter_map(|member| value.field(&member.key)).collect())
    }

    /// Decodes the members at the cursor, in a new scope.
    pub fn decode_fragment(
        &self,
        cursor: &mut Cursor<'_>,
        rules: &DecodeRules,
    ) -> Result<AbiValue, CodecError> {
        match &self.kind {
            SetKind::Tuple(members) => {
                cursor.start_scope();
                let values = members
                    .iter()
                    .map(|member| Ok((member.key.clone(), member.node.decode_fragment(cursor, rules)?)))
                    .collect::<Result<Vec<_>, CodecError>>();
                cursor.end_scope();

                let values = values?;
                Ok(if rules.should_convert_structs_to_objects {
                    AbiValue::Struct(values)
                } else {
                    AbiValue::Tuple(values.into_iter().map(|(_, value)| value).collect())
                })
            }
            SetKind::Array { element, arity } => {
                let head_size = element.head_size();
                let len = match arity {
                    Some(arity) => *arity,
                    None => {
                        cursor.charge(1, rules.decode_budget_factor)?;
                        let word = cursor.pop_word()?;
                        // every element takes room in the head, unless it is an empty tuple.
                        word_to_usize(word)
                            .filter(|len| {
                                head_size == 0 || len.saturating_mul(head_size) <= cursor.remaining()
                            })
                            .ok_or_else(|| DecodingError::OutOfBounds {
                                name: self.name.clone(),
                                value: word,
                            })?
                    }
                };
                if head_size == 0 {
                    cursor.charge(len, rules.decode_budget_factor)?;
                }

                cursor.start_scope();
                let values = (0..len)
                    .map(|_| element.decode_fragment(cursor, rules))
                    .collect::<Result<Vec<_>, _>>();
                cursor.end_scope();

                Ok(AbiValue::Array(values?))
            }
        }
    }

    fn unexpected(&self, value: &AbiValue, path: &str) -> EncodingRangeError {
        EncodingRangeError::UnexpectedValue {
            name: path.to_owned(),
            ty: self.signature(),
            found: value.kind(),
        }
    }
}
