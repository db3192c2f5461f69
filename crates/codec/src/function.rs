//! Call data and return data of functions.

use crate::{
    codec::{decode_node, encode_node, Encoded},
    cursor::Cursor,
    error::{CodecError, SelectorMismatchError},
    factory::DataTypeFactory,
    rules::{DecodeRules, EncodeRules},
    types::DataType,
};
use abi_primitives::{AbiError, AbiValue, Function};
use alloy_primitives::Bytes;

/// Encoding and decoding of the call data and return data of a [`Function`].
pub trait FunctionExt {
    /// Returns the node of the arguments, a tuple named after the function.
    fn input_type(&self, factory: &mut DataTypeFactory) -> Result<DataType, CodecError>;

    /// Returns the node of the return values.
    fn output_type(&self, factory: &mut DataTypeFactory) -> Result<DataType, CodecError>;

    /// Encodes the arguments, prefixed by the selector.
    fn encode_input(&self, value: &AbiValue, rules: &EncodeRules) -> Result<Encoded, CodecError>;

    /// Decodes the arguments from call data, after checking its selector.
    fn decode_input(&self, cursor: &mut Cursor<'_>, rules: &DecodeRules) -> Result<AbiValue, CodecError>;

    /// Returns the call data for the arguments.
    fn encode_call(&self, value: &AbiValue, rules: EncodeRules) -> Result<Bytes, CodecError> {
        self.encode_input(value, &rules)?.to_bytes()
    }

    /// Decodes the arguments of the call data.
    fn decode_call(&self, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError> {
        self.decode_input(&mut Cursor::with_selector(data)?, &rules)
    }

    /// Returns the return data for the values.
    fn encode_output(&self, value: &AbiValue, rules: EncodeRules) -> Result<Bytes, CodecError>;

    /// Decodes the return data.
    fn decode_output(&self, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError>;
}

impl FunctionExt for Function {
    fn input_type(&self, factory: &mut DataTypeFactory) -> Result<DataType, CodecError> {
        Ok(factory.create_tuple(&self.name, &self.inputs)?)
    }

    fn output_type(&self, factory: &mut DataTypeFactory) -> Result<DataType, CodecError> {
        Ok(factory.create_tuple(&self.name, &self.outputs)?)
    }

    fn encode_input(&self, value: &AbiValue, rules: &EncodeRules) -> Result<Encoded, CodecError> {
        let node = self.input_type(&mut DataTypeFactory::default())?;
        encode_node(&node, value, Some(self.selector()), rules)
    }

    fn decode_input(&self, cursor: &mut Cursor<'_>, rules: &DecodeRules) -> Result<AbiValue, CodecError> {
        let expected = self.selector();
        if let Some(found) = cursor.selector().filter(|found| *found != expected) {
            return Err(SelectorMismatchError { signature: self.signature(), expected, found }.into())
        }
        let node = self.input_type(&mut DataTypeFactory::default())?;
        decode_node(&node, cursor, rules)
    }

    fn encode_output(&self, value: &AbiValue, rules: EncodeRules) -> Result<Bytes, CodecError> {
        let node = self.output_type(&mut DataTypeFactory::default())?;
        encode_node(&node, value, None, &rules)?.to_bytes()
    }

    fn decode_output(&self, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError> {
        let node = self.output_type(&mut DataTypeFactory::default())?;
        decode_node(&node, &mut Cursor::new(data), &rules)
    }
}

/// Encoding and decoding of the revert data of a custom [`AbiError`].
pub trait AbiErrorExt {
    /// Returns the revert data for the values.
    fn encode_error(&self, value: &AbiValue, rules: EncodeRules) -> Result<Bytes, CodecError>;

    /// Decodes the revert data, after checking its selector.
    fn decode_error(&self, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError>;
}

impl AbiErrorExt for AbiError {
    fn encode_error(&self, value: &AbiValue, rules: EncodeRules) -> Result<Bytes, CodecError> {
        let node = DataTypeFactory::default().create_tuple(&self.name, &self.inputs)?;
        encode_node(&node, value, Some(self.selector()), &rules)?.to_bytes()
    }

    fn decode_error(&self, data: &[u8], rules: DecodeRules) -> Result<AbiValue, CodecError> {
        let mut cursor = Cursor::with_selector(data)?;
        let expected = self.selector();
        if let Some(found) = cursor.selector().filter(|found| *found != expected) {
            return Err(SelectorMismatchError { signature: self.signature(), expected, found }.into())
        }
        let node = DataTypeFactory::default().create_tuple(&self.name, &self.inputs)?;
        decode_node(&node, &mut cursor, &rules)
    }
}
