use crate::{
    cursor::Cursor,
    error::{CodecError, DecodingError, EncodingRangeError, TypeGrammarError},
    layout::{Block, BlockId, Layout},
    rules::DecodeRules,
    types::word_to_usize,
};
use abi_primitives::{AbiValue, WORD_SIZE};
use alloy_primitives::{hex, Address, Bytes, B256, I256, U256};

/// The elementary types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// `address`.
    Address,
    /// `bool`.
    Bool,
    /// `intN`, with `N` bits.
    Int(usize),
    /// `uintN`, with `N` bits.
    Uint(usize),
    /// `bytesN`, with `N` bytes.
    FixedBytes(usize),
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
}

impl BlobKind {
    /// Returns the canonical type string.
    pub fn signature(&self) -> String {
        match self {
            Self::Address => "address".to_owned(),
            Self::Bool => "bool".to_owned(),
            Self::Int(bits) => format!("int{bits}"),
            Self::Uint(bits) => format!("uint{bits}"),
            Self::FixedBytes(size) => format!("bytes{size}"),
            Self::Bytes => "bytes".to_owned(),
            Self::String => "string".to_owned(),
        }
    }

    /// Returns true if the value is encoded in a single word.
    pub const fn is_static(&self) -> bool {
        !matches!(self, Self::Bytes | Self::String)
    }
}

const ADDRESS_SIZE: usize = 20;

/// An integer value before its range is checked.
enum Integer {
    Signed(I256),
    Unsigned(U256),
}

/// A node of elementary type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    name: String,
    kind: BlobKind,
}

impl Blob {
    /// Returns a new [`Blob`]. Integer widths must be a multiple of 8 in `[8, 256]` and fixed
    /// bytes sizes in `[1, 32]`.
    pub fn new(name: impl Into<String>, kind: BlobKind) -> Result<Self, TypeGrammarError> {
        match kind {
            BlobKind::Int(bits) | BlobKind::Uint(bits)
                if bits == 0 || bits > 256 || bits % 8 != 0 =>
            {
                Err(TypeGrammarError::InvalidIntegerWidth { ty: kind.signature(), bits })
            }
            BlobKind::FixedBytes(size) if !(1..=WORD_SIZE).contains(&size) => {
                Err(TypeGrammarError::InvalidFixedBytesSize { ty: kind.signature(), size })
            }
            _ => Ok(Self { name: name.into(), kind }),
        }
    }

    /// Returns the scoped name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the elementary type.
    pub const fn kind(&self) -> BlobKind {
        self.kind
    }

    /// Returns the canonical type string.
    pub fn signature(&self) -> String {
        self.kind.signature()
    }

    /// Returns true if the value is encoded in a single word.
    pub const fn is_static(&self) -> bool {
        self.kind.is_static()
    }

    /// Returns the size of the encoding if it does not depend on the value.
    pub const fn static_size(&self) -> Option<usize> {
        if self.is_static() {
            Some(WORD_SIZE)
        } else {
            None
        }
    }

    /// Encodes the value into a payload block.
    pub fn encode_fragment(
        &self,
        value: &AbiValue,
        layout: &mut Layout,
        path: &str,
    ) -> Result<BlockId, CodecError> {
        let (data, header_size) = if self.is_static() {
            (self.encode_word(value, path)?.to_vec(), 0)
        } else {
            (pad_dynamic(&self.dynamic_bytes(value, path)?), WORD_SIZE)
        };
        Ok(layout.push(Block::payload(path, self.signature(), data, header_size)))
    }

    /// Encodes a value of a static kind into its word.
    pub fn encode_word(&self, value: &AbiValue, path: &str) -> Result<B256, EncodingRangeError> {
        match self.kind {
            BlobKind::Address => Ok(self.coerce_address(value, path)?.into_word()),
            BlobKind::Bool => match value {
                AbiValue::Bool(b) => Ok(B256::with_last_byte(u8::from(*b))),
                other => Err(self.unexpected(other, path)),
            },
            BlobKind::Int(bits) => self.encode_int(bits, value, path),
            BlobKind::Uint(bits) => self.encode_uint(bits, value, path),
            BlobKind::FixedBytes(size) => {
                let bytes = self.coerce_bytes(value, path)?;
                if bytes.len() > size {
                    return Err(EncodingRangeError::InvalidLength {
                        name: path.to_owned(),
                        ty: self.signature(),
                        expected: size,
                        actual: bytes.len(),
                    })
                }
                let mut word = B256::ZERO;
                word[..bytes.len()].copy_from_slice(&bytes);
                Ok(word)
            }
            BlobKind::Bytes | BlobKind::String => Err(self.unexpected(value, path)),
        }
    }

    /// Returns the content of a `bytes` or `string` value, without length nor padding.
    pub(crate) fn dynamic_bytes(&self, value: &AbiValue, path: &str) -> Result<Vec<u8>, EncodingRangeError> {
        match (self.kind, value) {
            (BlobKind::Bytes, _) => self.coerce_bytes(value, path),
            (BlobKind::String, AbiValue::String(s)) => Ok(s.as_bytes().to_vec()),
            _ => Err(self.unexpected(value, path)),
        }
    }

    fn encode_int(&self, bits: usize, value: &AbiValue, path: &str) -> Result<B256, EncodingRangeError> {
        let (min, max) = int_bounds(bits);
        let value = match self.coerce_integer(value, path)? {
            Integer::Signed(i) => i,
            Integer::Unsigned(u) if u > max.into_raw() => {
                return Err(self.overflow(path, u.to_string(), max.to_string()))
            }
            Integer::Unsigned(u) => I256::from_raw(u),
        };

        if value < min {
            return Err(EncodingRangeError::Underflow {
                name: path.to_owned(),
                ty: self.signature(),
                value: value.to_string(),
                min: min.to_string(),
            })
        }
        if value > max {
            return Err(self.overflow(path, value.to_string(), max.to_string()))
        }
        // two's complement, sign extended to the word.
        Ok(B256::from(value.into_raw()))
    }

    fn encode_uint(&self, bits: usize, value: &AbiValue, path: &str) -> Result<B256, EncodingRangeError> {
        let max = uint_max(bits);
        let value = match self.coerce_integer(value, path)? {
            Integer::Unsigned(u) => u,
            Integer::Signed(i) if i.is_negative() => {
                return Err(EncodingRangeError::Underflow {
                    name: path.to_owned(),
                    ty: self.signature(),
                    value: i.to_string(),
                    min: "0".to_owned(),
                })
            }
            Integer::Signed(i) => i.into_raw(),
        };

        if value > max {
            return Err(self.overflow(path, value.to_string(), max.to_string()))
        }
        Ok(B256::from(value))
    }

    fn coerce_integer(&self, value: &AbiValue, path: &str) -> Result<Integer, EncodingRangeError> {
        match value {
            AbiValue::Uint(u) => Ok(Integer::Unsigned(*u)),
            AbiValue::Int(i) => Ok(Integer::Signed(*i)),
            AbiValue::String(s) => parse_integer(s).ok_or_else(|| {
                EncodingRangeError::InvalidInteger { name: path.to_owned(), input: s.clone() }
            }),
            other => Err(self.unexpected(other, path)),
        }
    }

    fn coerce_bytes(&self, value: &AbiValue, path: &str) -> Result<Vec<u8>, EncodingRangeError> {
        match value {
            AbiValue::Bytes(bytes) => Ok(bytes.to_vec()),
            AbiValue::String(s) => decode_hex(s, path),
            other => Err(self.unexpected(other, path)),
        }
    }

    fn coerce_address(&self, value: &AbiValue, path: &str) -> Result<Address, EncodingRangeError> {
        let bytes = match value {
            AbiValue::Address(address) => return Ok(*address),
            AbiValue::Bytes(bytes) => bytes.to_vec(),
            AbiValue::String(s) => decode_hex(s, path)?,
            other => return Err(self.unexpected(other, path)),
        };
        if bytes.len() != ADDRESS_SIZE {
            return Err(EncodingRangeError::InvalidLength {
                name: path.to_owned(),
                ty: self.signature(),
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            })
        }
        Ok(Address::from_slice(&bytes))
    }

    /// Decodes the value at the cursor.
    pub fn decode_fragment(
        &self,
        cursor: &mut Cursor<'_>,
        rules: &DecodeRules,
    ) -> Result<AbiValue, CodecError> {
        cursor.charge(1, rules.decode_budget_factor)?;
        match self.kind {
            BlobKind::Bytes | BlobKind::String => {
                let word = cursor.pop_word()?;
                let len = word_to_usize(word)
                    .filter(|len| *len <= cursor.remaining())
                    .ok_or_else(|| DecodingError::OutOfBounds { name: self.name.clone(), value: word })?;
                let words = len.div_ceil(WORD_SIZE);
                cursor.charge(words, rules.decode_budget_factor)?;
                let data = &cursor.pop_words(words)?[..len];

                if self.kind == BlobKind::Bytes {
                    return Ok(AbiValue::Bytes(Bytes::copy_from_slice(data)))
                }
                let s = std::str::from_utf8(data)
                    .map_err(|_| DecodingError::InvalidUtf8 { name: self.name.clone() })?;
                Ok(AbiValue::String(s.to_owned()))
            }
            BlobKind::Bool if rules.allow_empty_bool && cursor.remaining() == 0 => {
                tracing::trace!(target: "abi::codec", name = %self.name, "empty bool decoded as false");
                Ok(AbiValue::Bool(false))
            }
            _ => Ok(self.decode_word(cursor.pop_word()?)?),
        }
    }

    /// Decodes a value of a static kind from its word. Words which are not the canonical
    /// encoding of a value of the type are rejected.
    pub fn decode_word(&self, word: B256) -> Result<AbiValue, DecodingError> {
        let non_canonical = || DecodingError::NonCanonicalWord {
            name: self.name.clone(),
            ty: self.signature(),
            word,
        };

        match self.kind {
            BlobKind::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(non_canonical())
                }
                Ok(AbiValue::Address(Address::from_word(word)))
            }
            BlobKind::Bool => match word {
                w if w == B256::ZERO => Ok(AbiValue::Bool(false)),
                w if w == B256::with_last_byte(1) => Ok(AbiValue::Bool(true)),
                _ => Err(DecodingError::InvalidBool { name: self.name.clone(), word }),
            },
            BlobKind::Int(bits) => {
                let (min, max) = int_bounds(bits);
                let value = I256::from_raw(U256::from_be_bytes(word.0));
                if value < min || value > max {
                    return Err(non_canonical())
                }
                Ok(AbiValue::Int(value))
            }
            BlobKind::Uint(bits) => {
                let value = U256::from_be_bytes(word.0);
                if value > uint_max(bits) {
                    return Err(non_canonical())
                }
                Ok(AbiValue::Uint(value))
            }
            BlobKind::FixedBytes(size) => {
                if word[size..].iter().any(|b| *b != 0) {
                    return Err(non_canonical())
                }
                Ok(AbiValue::Bytes(Bytes::copy_from_slice(&word[..size])))
            }
            BlobKind::Bytes | BlobKind::String => Err(non_canonical()),
        }
    }

    fn unexpected(&self, value: &AbiValue, path: &str) -> EncodingRangeError {
        EncodingRangeError::UnexpectedValue {
            name: path.to_owned(),
            ty: self.signature(),
            found: value.kind(),
        }
    }

    fn overflow(&self, path: &str, value: String, max: String) -> EncodingRangeError {
        EncodingRangeError::Overflow { name: path.to_owned(), ty: self.signature(), value, max }
    }
}

/// Returns the minimum and maximum of `intN`.
fn int_bounds(bits: usize) -> (I256, I256) {
    let max = U256::MAX >> (257 - bits);
    (I256::from_raw(!max), I256::from_raw(max))
}

/// Returns the maximum of `uintN`.
fn uint_max(bits: usize) -> U256 {
    U256::MAX >> (256 - bits)
}

/// Returns the length word followed by the data right padded to a multiple of 32 bytes.
fn pad_dynamic(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD_SIZE + data.len().div_ceil(WORD_SIZE) * WORD_SIZE);
    out.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
    out.extend_from_slice(data);
    out.resize(WORD_SIZE + data.len().div_ceil(WORD_SIZE) * WORD_SIZE, 0);
    out
}

/// Parses a decimal, negative decimal or `0x` hex integer.
fn parse_integer(s: &str) -> Option<Integer> {
    let s = s.trim();
    if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if digits.is_empty() {
            return None
        }
        return U256::from_str_radix(digits, 16).ok().map(Integer::Unsigned)
    }
    if s.starts_with('-') {
        return I256::from_dec_str(s).ok().map(Integer::Signed)
    }
    if s.is_empty() {
        return None
    }
    U256::from_str_radix(s, 10).ok().map(Integer::Unsigned)
}

/// Decodes a `0x` prefixed hex string.
fn decode_hex(s: &str, path: &str) -> Result<Vec<u8>, EncodingRangeError> {
    let invalid = || EncodingRangeError::InvalidHex { name: path.to_owned(), input: s.to_owned() };
    let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
    hex::decode(digits).map_err(|err| match err {
        hex::FromHexError::OddLength => {
            EncodingRangeError::OddLengthHex { name: path.to_owned(), input: s.to_owned() }
        }
        _ => invalid(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linearizer;
    use alloy_primitives::{address, b256, bytes};

    fn encode(blob: &Blob, value: &AbiValue) -> Result<Bytes, CodecError> {
        let mut layout = Layout::new();
        let root = blob.encode_fragment(value, &mut layout, blob.name())?;
        layout.set_root(root);
        let order = linearizer::linearize(&layout)?;
        linearizer::assign_offsets(&mut layout, &order);
        Ok(linearizer::to_bytes(&layout, &order)?)
    }

    fn decode(blob: &Blob, data: &[u8]) -> Result<AbiValue, CodecError> {
        blob.decode_fragment(&mut Cursor::new(data), &DecodeRules::default())
    }

    #[test]
    fn test_should_encode_signed_integers_in_twos_complement() -> eyre::Result<()> {
        let int = Blob::new("delta", BlobKind::Int(256))?;
        let encoded = encode(&int, &AbiValue::Int(I256::MINUS_ONE))?;
        assert_eq!(encoded, bytes!("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"));
        assert_eq!(decode(&int, &encoded)?, AbiValue::Int(I256::MINUS_ONE));

        let int8 = Blob::new("delta", BlobKind::Int(8))?;
        let min = AbiValue::Int(I256::try_from(-128i64).unwrap());
        let encoded = int8.encode_word(&min, "delta")?;
        assert_eq!(encoded, b256!("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff80"));
        assert_eq!(int8.decode_word(encoded)?, min);

        Ok(())
    }

    #[test]
    fn test_should_reject_invalid_kinds() {
        assert_eq!(
            Blob::new("delta", BlobKind::Int(300)),
            Err(TypeGrammarError::InvalidIntegerWidth { ty: "int300".into(), bits: 300 })
        );
        assert_eq!(
            Blob::new("amount", BlobKind::Uint(12)),
            Err(TypeGrammarError::InvalidIntegerWidth { ty: "uint12".into(), bits: 12 })
        );
        assert_eq!(
            Blob::new("salt", BlobKind::FixedBytes(40)),
            Err(TypeGrammarError::InvalidFixedBytesSize { ty: "bytes40".into(), size: 40 })
        );
        assert!(matches!(
            Blob::new("salt", BlobKind::FixedBytes(0)),
            Err(TypeGrammarError::InvalidFixedBytesSize { size: 0, .. })
        ));
        assert!(Blob::new("salt", BlobKind::FixedBytes(32)).is_ok());
        assert!(Blob::new("delta", BlobKind::Int(8)).is_ok());
    }

    #[test]
    fn test_should_check_integer_bounds() -> eyre::Result<()> {
        let uint8 = Blob::new("amount", BlobKind::Uint(8))?;
        assert!(uint8.encode_word(&AbiValue::from(255u64), "amount").is_ok());
        assert_eq!(
            uint8.encode_word(&AbiValue::from(256u64), "amount"),
            Err(EncodingRangeError::Overflow {
                name: "amount".into(),
                ty: "uint8".into(),
                value: "256".into(),
                max: "255".into()
            })
        );
        assert_eq!(
            uint8.encode_word(&AbiValue::from(-1i64), "amount"),
            Err(EncodingRangeError::Underflow {
                name: "amount".into(),
                ty: "uint8".into(),
                value: "-1".into(),
                min: "0".into()
            })
        );

        let int16 = Blob::new("delta", BlobKind::Int(16))?;
        assert!(matches!(
            int16.encode_word(&AbiValue::from(-32769i64), "delta"),
            Err(EncodingRangeError::Underflow { min, .. }) if min == "-32768"
        ));
        assert!(matches!(
            int16.encode_word(&AbiValue::from(32768u64), "delta"),
            Err(EncodingRangeError::Overflow { max, .. }) if max == "32767"
        ));

        Ok(())
    }

    #[test]
    fn test_should_coerce_loose_inputs() -> eyre::Result<()> {
        let uint = Blob::new("amount", BlobKind::Uint(256))?;
        assert_eq!(uint.encode_word(&AbiValue::from("0x10"), "amount")?, B256::from(U256::from(16)));
        assert_eq!(uint.encode_word(&AbiValue::from("1000"), "amount")?, B256::from(U256::from(1000)));
        assert_eq!(
            uint.encode_word(&AbiValue::from("ten"), "amount"),
            Err(EncodingRangeError::InvalidInteger { name: "amount".into(), input: "ten".into() })
        );

        let owner = Blob::new("owner", BlobKind::Address)?;
        let expected = address!("52908400098527886E0F7030069857D2E4169EE7");
        let word = owner.encode_word(&AbiValue::from("0x52908400098527886e0f7030069857d2e4169ee7"), "owner")?;
        assert_eq!(word, expected.into_word());
        assert_eq!(
            owner.encode_word(&AbiValue::Bytes(bytes!("5290")), "owner"),
            Err(EncodingRangeError::InvalidLength {
                name: "owner".into(),
                ty: "address".into(),
                expected: 20,
                actual: 2
            })
        );

        let salt = Blob::new("salt", BlobKind::FixedBytes(4))?;
        assert_eq!(
            salt.encode_word(&AbiValue::from("0xc0ffee"), "salt")?,
            b256!("c0ffee0000000000000000000000000000000000000000000000000000000000")
        );
        assert_eq!(
            salt.encode_word(&AbiValue::from("0xc0ffe"), "salt"),
            Err(EncodingRangeError::OddLengthHex { name: "salt".into(), input: "0xc0ffe".into() })
        );
        assert_eq!(
            salt.encode_word(&AbiValue::from("0xzz"), "salt"),
            Err(EncodingRangeError::InvalidHex { name: "salt".into(), input: "0xzz".into() })
        );
        assert!(matches!(
            salt.encode_word(&AbiValue::from("0xc0ffee0011"), "salt"),
            Err(EncodingRangeError::InvalidLength { expected: 4, actual: 5, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_should_encode_dynamic_blobs_with_length() -> eyre::Result<()> {
        let message = Blob::new("message", BlobKind::String)?;
        let encoded = encode(&message, &AbiValue::from("hi"))?;
        assert_eq!(
            encoded,
            bytes!(
                "0000000000000000000000000000000000000000000000000000000000000002"
                "6869000000000000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(decode(&message, &encoded)?, AbiValue::from("hi"));

        let data = Blob::new("data", BlobKind::Bytes)?;
        let encoded = encode(&data, &AbiValue::Bytes(Bytes::new()))?;
        assert_eq!(encoded.len(), 32);
        assert_eq!(decode(&data, &encoded)?, AbiValue::Bytes(Bytes::new()));

        Ok(())
    }

    #[test]
    fn test_should_reject_non_canonical_words() -> eyre::Result<()> {
        let flag = Blob::new("flag", BlobKind::Bool)?;
        let word = b256!("0000000000000000000000000000000000000000000000000000000000000002");
        assert_eq!(
            flag.decode_word(word),
            Err(DecodingError::InvalidBool { name: "flag".into(), word })
        );

        let owner = Blob::new("owner", BlobKind::Address)?;
        let mut word = address!("52908400098527886E0F7030069857D2E4169EE7").into_word();
        word[0] = 1;
        assert!(matches!(owner.decode_word(word), Err(DecodingError::NonCanonicalWord { .. })));

        let amount = Blob::new("amount", BlobKind::Uint(8))?;
        let word = b256!("0000000000000000000000000000000000000000000000000000000000000100");
        assert!(matches!(amount.decode_word(word), Err(DecodingError::NonCanonicalWord { .. })));

        let delta = Blob::new("delta", BlobKind::Int(8))?;
        let word = b256!("00000000000000000000000000000000000000000000000000000000000000ff");
        assert!(matches!(delta.decode_word(word), Err(DecodingError::NonCanonicalWord { .. })));

        Ok(())
    }

    #[test]
    fn test_should_decode_empty_bool_when_allowed() -> eyre::Result<()> {
        let flag = Blob::new("flag", BlobKind::Bool)?;
        assert!(matches!(decode(&flag, &[]), Err(CodecError::BufferUnderrun(_))));

        let rules = DecodeRules { allow_empty_bool: true, ..Default::default() };
        assert_eq!(flag.decode_fragment(&mut Cursor::new(&[]), &rules)?, AbiValue::Bool(false));

        Ok(())
    }

    #[test]
    fn test_should_reject_out_of_bounds_length() -> eyre::Result<()> {
        let data = Blob::new("data", BlobKind::Bytes)?;
        let mut encoded = vec![0u8; 64];
        encoded[31] = 33;
        assert!(matches!(
            decode(&data, &encoded),
            Err(CodecError::Decoding(DecodingError::OutOfBounds { .. }))
        ));

        // the length fits but the padding is missing.
        encoded.truncate(32 + 2);
        encoded[31] = 2;
        assert!(matches!(decode(&data, &encoded), Err(CodecError::BufferUnderrun(_))));

        Ok(())
    }
}
