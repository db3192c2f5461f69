//! Test utilities for the codec.

use crate::types::{BlobKind, DataType, SetKind};
use abi_primitives::{AbiValue, JsonAbi};
use alloy_primitives::{Address, Bytes, I256, U256};
use arbitrary::Unstructured;

/// The upper bound of the length of generated `bytes`, `string` and dynamic arrays.
const MAX_DYNAMIC_LEN: usize = 48;

/// Read the JSON ABI at `path`.
pub fn read_abi<P: AsRef<std::path::Path>>(path: P) -> eyre::Result<JsonAbi> {
    Ok(JsonAbi::from_json_str(&std::fs::read_to_string(path)?)?)
}

/// Returns the path of a file of the `testdata` directory.
pub fn testdata<P: AsRef<std::path::Path>>(file: P) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(file)
}

/// Generates a value of the node, in the canonical form the decoder produces: tuples are
/// positional and byte types are [`AbiValue::Bytes`].
pub fn arbitrary_value(node: &DataType, u: &mut Unstructured<'_>) -> arbitrary::Result<AbiValue> {
    let value = match node {
        DataType::Pointer(pointer) => arbitrary_value(pointer.destination(), u)?,
        DataType::Blob(blob) => match blob.kind() {
            BlobKind::Address => AbiValue::Address(Address::from(u.arbitrary::<[u8; 20]>()?)),
            BlobKind::Bool => AbiValue::Bool(u.arbitrary()?),
            BlobKind::Uint(bits) => AbiValue::Uint(arbitrary_word(u)? >> (256 - bits)),
            BlobKind::Int(bits) => {
                let shift = 256 - bits;
                AbiValue::Int(I256::from_raw(arbitrary_word(u)? << shift).asr(shift))
            }
            BlobKind::FixedBytes(size) => AbiValue::Bytes(arbitrary_bytes(u, size)?),
            BlobKind::Bytes => {
                let len = u.int_in_range(0..=MAX_DYNAMIC_LEN)?;
                AbiValue::Bytes(arbitrary_bytes(u, len)?)
            }
            BlobKind::String => {
                let s: String = u.arbitrary()?;
                AbiValue::String(s.chars().take(MAX_DYNAMIC_LEN).collect())
            }
        },
        DataType::Set(set) => match set.kind() {
            SetKind::Tuple(members) => AbiValue::Tuple(
                members
                    .iter()
                    .map(|member| arbitrary_value(&member.node, u))
                    .collect::<arbitrary::Result<_>>()?,
            ),
            SetKind::Array { element, arity } => {
                let len = match arity {
                    Some(arity) => *arity,
                    None => u.int_in_range(0..=4)?,
                };
                AbiValue::Array(
                    (0..len).map(|_| arbitrary_value(element, u)).collect::<arbitrary::Result<_>>()?,
                )
            }
        },
    };
    Ok(value)
}

/// Zero filled once the data runs out.
fn arbitrary_bytes(u: &mut Unstructured<'_>, len: usize) -> arbitrary::Result<Bytes> {
    let mut buf = vec![0u8; len];
    u.fill_buffer(&mut buf)?;
    Ok(buf.into())
}

fn arbitrary_word(u: &mut Unstructured<'_>) -> arbitrary::Result<U256> {
    Ok(U256::from_be_bytes(u.arbitrary::<[u8; 32]>()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::encode_node,
        cursor::Cursor,
        factory::DataTypeFactory,
        rules::{DecodeRules, EncodeRules},
    };
    use abi_primitives::Param;
    use rand::Rng;

    const TYPES: [&str; 8] = [
        "uint8",
        "int24",
        "(address,bytes,bool)",
        "string[]",
        "bytes7[3]",
        "(int256,string)[2]",
        "uint64[][]",
        "((bytes,uint16[])[],string,address[2])",
    ];

    #[test]
    fn test_should_round_trip_random_values() -> eyre::Result<()> {
        let mut factory = DataTypeFactory::default();
        for ty in TYPES {
            // Generate unstructured bytes.
            let mut bytes = [0u8; 2048];
            rand::rng().fill(bytes.as_mut_slice());
            let mut u = Unstructured::new(&bytes);

            let node = factory.create(&Param::new("value", ty))?;
            let value = arbitrary_value(&node, &mut u)?;

            // Round trip the value through both encodings.
            let canonical = encode_node(&node, &value, None, &EncodeRules::canonical())?.to_bytes()?;
            let optimized = encode_node(&node, &value, None, &EncodeRules::default())?.to_bytes()?;
            assert!(optimized.len() <= canonical.len(), "{ty}: optimized encoding grew");

            for encoded in [canonical, optimized] {
                let decoded =
                    node.decode_fragment(&mut Cursor::new(&encoded), &DecodeRules::default())?;
                assert_eq!(decoded, value, "{ty}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_should_encode_deterministically() -> eyre::Result<()> {
        let mut bytes = [0u8; 1024];
        rand::rng().fill(bytes.as_mut_slice());
        let mut u = Unstructured::new(&bytes);

        let node = DataTypeFactory::default().create(&Param::new("value", TYPES[7]))?;
        let value = arbitrary_value(&node, &mut u)?;

        let first = encode_node(&node, &value, None, &EncodeRules::default())?.to_bytes()?;
        let second = encode_node(&node, &value, None, &EncodeRules::default())?.to_bytes()?;
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_should_read_abi() -> eyre::Result<()> {
        let abi = read_abi(testdata("staking_pool.json"))?;
        assert_eq!(abi.functions().count(), 3);
        assert_eq!(abi.errors().count(), 2);
        assert_eq!(
            abi.function("stake").map(|f| f.signature()).as_deref(),
            Some("stake(uint256,(address,uint96,bytes32)[],string)")
        );
        Ok(())
    }
}
