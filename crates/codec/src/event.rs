//! Topics and data of event logs.

use crate::{
    codec::{decode_node, encode_node},
    cursor::Cursor,
    error::{CodecError, DecodingError},
    factory::DataTypeFactory,
    rules::{DecodeRules, EncodeRules},
    types::{scoped, DataType, Set, SetKind, TupleMember},
};
use abi_primitives::{AbiValue, Event, WORD_SIZE};
use alloy_primitives::{keccak256, Bytes, LogData, B256};

/// The maximum number of topics of a log.
pub const MAX_TOPICS: usize = 4;

/// Encoding and decoding of the logs of an [`Event`].
pub trait EventExt {
    /// Encodes the values of the event parameters into a log. The value is keyed by parameter
    /// name or positional, over all parameters in declaration order.
    fn encode_event(&self, value: &AbiValue, rules: EncodeRules) -> Result<LogData, CodecError>;

    /// Decodes the log into the values of the event parameters, in declaration order. Indexed
    /// parameters of dynamic type only keep the hash of their value and decode to it as bytes.
    fn decode_event(&self, log: &LogData, rules: DecodeRules) -> Result<AbiValue, CodecError>;
}

impl EventExt for Event {
    fn encode_event(&self, value: &AbiValue, rules: EncodeRules) -> Result<LogData, CodecError> {
        let members = self.members()?;
        let node = Set::tuple(&self.name, pairs(&members));
        let values = node.member_values(value, &self.name)?;

        let mut topics = Vec::with_capacity(MAX_TOPICS);
        if !self.anonymous {
            topics.push(self.topic());
        }
        let mut data = Vec::new();
        for ((param, member), value) in self.inputs.iter().zip(&members).zip(values) {
            if param.indexed {
                topics.push(topic(&member.node, value, &scoped(&self.name, &member.key))?);
            } else {
                data.push(value.clone());
            }
        }
        if topics.len() > MAX_TOPICS {
            return Err(CodecError::TooManyTopics { event: self.name.clone(), count: topics.len() })
        }

        let data_node = self.data_type(&members);
        let data = encode_node(&data_node, &AbiValue::Tuple(data), None, &rules)?.to_bytes()?;
        tracing::trace!(target: "abi::codec", event = %self.name, topics = topics.len(), data = data.len(), "encoded log");

        Ok(LogData::new_unchecked(topics, data))
    }

    fn decode_event(&self, log: &LogData, rules: DecodeRules) -> Result<AbiValue, CodecError> {
        let members = self.members()?;
        let mut topics = log.topics().iter();

        let expected = self.indexed_inputs().count() + usize::from(!self.anonymous);
        if log.topics().len() != expected {
            return Err(DecodingError::TopicCount {
                event: self.name.clone(),
                expected,
                found: log.topics().len(),
            }
            .into())
        }
        if !self.anonymous {
            let expected = self.topic();
            let found = topics.next().copied().unwrap_or_default();
            if found != expected {
                return Err(DecodingError::TopicMismatch { event: self.name.clone(), expected, found }.into())
            }
        }

        let data_node = self.data_type(&members);
        let mut data = match decode_node(&data_node, &mut Cursor::new(&log.data), &rules)? {
            AbiValue::Struct(fields) => fields.into_iter().map(|(_, value)| value).collect(),
            AbiValue::Tuple(values) => values,
            _ => Vec::new(),
        }
        .into_iter();

        let mut fields = Vec::with_capacity(members.len());
        for (param, member) in self.inputs.iter().zip(members) {
            let value = if param.indexed {
                let topic = topics.next().copied().unwrap_or_default();
                decode_topic(&member.node, topic)?
            } else {
                data.next().ok_or(DecodingError::TopicCount {
                    event: self.name.clone(),
                    expected,
                    found: log.topics().len(),
                })?
            };
            fields.push((member.key, value));
        }

        Ok(if rules.should_convert_structs_to_objects {
            AbiValue::Struct(fields)
        } else {
            AbiValue::Tuple(fields.into_iter().map(|(_, value)| value).collect())
        })
    }
}

/// Helpers shared by the encoder and the decoder of an event.
trait EventMembers {
    /// Returns a member for each parameter, in declaration order.
    fn members(&self) -> Result<Vec<TupleMember>, CodecError>;

    /// Returns the tuple of the parameters stored in the log data.
    fn data_type(&self, members: &[TupleMember]) -> DataType;
}

impl EventMembers for Event {
    fn members(&self) -> Result<Vec<TupleMember>, CodecError> {
        let node = DataTypeFactory::default().create_tuple(&self.name, &self.inputs)?;
        match node {
            DataType::Set(set) => match set.kind() {
                SetKind::Tuple(members) => Ok(members.clone()),
                SetKind::Array { .. } => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }

    fn data_type(&self, members: &[TupleMember]) -> DataType {
        let data = self
            .inputs
            .iter()
            .zip(members)
            .filter(|(param, _)| !param.indexed)
            .map(|(_, member)| member.clone());
        Set::tuple(&self.name, pairs(&data.collect::<Vec<_>>())).into()
    }
}

fn pairs(members: &[TupleMember]) -> Vec<(String, DataType)> {
    members.iter().map(|member| (member.key.clone(), member.node.clone())).collect()
}

/// Returns the topic of an indexed value: the word of a value type, the hash of the content
/// of `bytes` and `string`, the hash of the in place encoding of arrays and tuples.
fn topic(node: &DataType, value: &AbiValue, path: &str) -> Result<B256, CodecError> {
    match node {
        DataType::Pointer(pointer) => topic(pointer.destination(), value, path),
        DataType::Blob(blob) if blob.is_static() => Ok(blob.encode_word(value, path)?),
        DataType::Blob(blob) => Ok(keccak256(blob.dynamic_bytes(value, path)?)),
        DataType::Set(_) => {
            let mut preimage = Vec::new();
            write_in_place(node, value, path, &mut preimage)?;
            Ok(keccak256(preimage))
        }
    }
}

/// Writes the in place encoding of the value: every element padded to a word, without
/// offsets nor lengths.
fn write_in_place(
    node: &DataType,
    value: &AbiValue,
    path: &str,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match node {
        DataType::Pointer(pointer) => write_in_place(pointer.destination(), value, path, out)?,
        DataType::Blob(blob) if blob.is_static() => {
            out.extend_from_slice(blob.encode_word(value, path)?.as_slice())
        }
        DataType::Blob(blob) => {
            let bytes = blob.dynamic_bytes(value, path)?;
            out.extend_from_slice(&bytes);
            out.resize(out.len() + (WORD_SIZE - bytes.len() % WORD_SIZE) % WORD_SIZE, 0);
        }
        DataType::Set(set) => {
            let values = set.member_values(value, path)?;
            match set.kind() {
                SetKind::Tuple(members) => {
                    for (member, value) in members.iter().zip(values) {
                        write_in_place(&member.node, value, &scoped(path, &member.key), out)?;
                    }
                }
                SetKind::Array { element, .. } => {
                    for (i, value) in values.into_iter().enumerate() {
                        write_in_place(element, value, &format!("{path}[{i}]"), out)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Decodes an indexed value from its topic. Only value types can be recovered, other types
/// decode to the hash held by the topic.
fn decode_topic(node: &DataType, topic: B256) -> Result<AbiValue, CodecError> {
    match node {
        DataType::Blob(blob) if blob.is_static() => Ok(blob.decode_word(topic)?),
        _ => Ok(AbiValue::Bytes(Bytes::copy_from_slice(topic.as_slice()))),
    }
}
