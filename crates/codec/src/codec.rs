//! The encode and decode entry points.

use crate::{
    cursor::Cursor,
    error::{CodecError, DecodingError},
    factory::DataTypeFactory,
    layout::{BlockId, Layout},
    linearizer, optimizer,
    rules::{DecodeRules, EncodeRules},
    types::DataType,
};
use abi_primitives::{AbiValue, Param};
use alloy_primitives::{hex, Bytes, Selector};
use std::collections::VecDeque;

/// A value encoded into a linearized [`Layout`], ready to be rendered.
#[derive(Debug, Clone)]
pub struct Encoded {
    layout: Layout,
    order: VecDeque<BlockId>,
    size: usize,
}

impl Encoded {
    /// Returns the layout, with offsets assigned.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the blocks in output order.
    pub const fn order(&self) -> &VecDeque<BlockId> {
        &self.order
    }

    /// Returns the size of the encoding, selector excluded.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the encoded bytes.
    pub fn to_bytes(&self) -> Result<Bytes, CodecError> {
        Ok(linearizer::to_bytes(&self.layout, &self.order)?)
    }

    /// Returns the `0x` prefixed hex encoding.
    pub fn to_hex(&self) -> Result<String, CodecError> {
        Ok(hex::encode_prefixed(self.to_bytes()?))
    }

    /// Returns the annotated dump of the encoding.
    pub fn annotate(&self) -> Result<String, CodecError> {
        Ok(linearizer::annotate(&self.layout, &self.order)?)
    }

    /// Renders the encoding as hex, or annotated if the rules say so.
    pub fn render(&self, rules: &EncodeRules) -> Result<String, CodecError> {
        if rules.should_annotate {
            self.annotate()
        } else {
            self.to_hex()
        }
    }
}

/// Encodes the value with the node as root, optionally prefixed by a selector.
pub fn encode_node(
    node: &DataType,
    value: &AbiValue,
    selector: Option<Selector>,
    rules: &EncodeRules,
) -> Result<Encoded, CodecError> {
    let mut layout = selector.map(Layout::with_selector).unwrap_or_default();
    let root = node.encode_fragment(value, &mut layout, node.name())?;
    layout.set_root(root);

    if rules.should_optimize {
        optimizer::optimize(&mut layout)?;
    }

    let order = linearizer::linearize(&layout)?;
    let size = linearizer::assign_offsets(&mut layout, &order);
    tracing::debug!(target: "abi::codec", name = node.name(), signature = %node.signature(), blocks = layout.len(), size, "encoded value");

    Ok(Encoded { layout, order, size })
}

/// Decodes a value of the node at the cursor.
pub fn decode_node(
    node: &DataType,
    cursor: &mut Cursor<'_>,
    rules: &DecodeRules,
) -> Result<AbiValue, CodecError> {
    let value = node.decode_fragment(cursor, rules)?;
    tracing::debug!(target: "abi::codec", name = node.name(), signature = %node.signature(), size = cursor.len(), "decoded value");
    Ok(value)
}

/// Encodes the value of the parameter. Returns a hex string, or the annotated dump if
/// [`EncodeRules::should_annotate`] is set.
pub fn encode(param: &Param, value: &AbiValue, rules: EncodeRules) -> Result<String, CodecError> {
    let node = DataTypeFactory::default().create(param)?;
    encode_node(&node, value, None, &rules)?.render(&rules)
}

/// Encodes the value of the parameter.
pub fn encode_to_bytes(
    param: &Param,
    value: &AbiValue,
    rules: EncodeRules,
) -> Result<Bytes, CodecError> {
    let node = DataTypeFactory::default().create(param)?;
    encode_node(&node, value, None, &rules)?.to_bytes()
}

/// Encodes the values of a parameter list, as a tuple of the parameters.
pub fn encode_params(
    params: &[Param],
    value: &AbiValue,
    rules: EncodeRules,
) -> Result<Bytes, CodecError> {
    let node = DataTypeFactory::default().create_tuple("", params)?;
    encode_node(&node, value, None, &rules)?.to_bytes()
}

/// Decodes a value of the parameter.
pub fn decode(param: &Param, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError> {
    let node = DataTypeFactory::default().create(param)?;
    decode_node(&node, &mut Cursor::new(data), &rules)
}

/// Decodes a value of the parameter from a hex string, `0x` prefixed or not.
pub fn decode_hex(param: &Param, data: &str, rules: DecodeRules) -> Result<AbiValue, CodecError> {
    decode(param, &parse_hex(data)?, rules)
}

/// Decodes the values of a parameter list, as a tuple of the parameters.
pub fn decode_params(
    params: &[Param],
    data: &[u8],
    rules: DecodeRules,
) -> Result<AbiValue, CodecError> {
    let node = DataTypeFactory::default().create_tuple("", params)?;
    decode_node(&node, &mut Cursor::new(data), &rules)
}

/// Parses hex input data.
pub(crate) fn parse_hex(data: &str) -> Result<Vec<u8>, DecodingError> {
    hex::decode(data.trim()).map_err(|err| DecodingError::InvalidHex(err.to_string()))
}
