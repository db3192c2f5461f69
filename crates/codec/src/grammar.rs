//! The ABI type string grammar.
//!
//! ```text
//! type    := base array*
//! base    := "address" | "bool" | "string" | "bytes" | "tuple"
//!          | ("int" | "uint") bits? | "bytes" size | "(" (type ("," type)*)? ")"
//! array   := "[" digits? "]"
//! ```

use crate::error::TypeGrammarError;
use abi_primitives::split_top_level;

/// A parsed type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
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
    /// Dynamic `bytes`.
    Bytes,
    /// `string`.
    String,
    /// The `tuple` keyword. The members come from the descriptor components.
    Tuple,
    /// An inline tuple `(t1,t2,...)`.
    InlineTuple(Vec<TypeSpec>),
    /// `T[k]` with `Some(k)`, or `T[]` with `None`.
    Array(Box<TypeSpec>, Option<usize>),
}

impl TypeSpec {
    /// Parses the type string. Arrays and inline tuples nesting deeper than `max_depth` are
    /// rejected with [`TypeGrammarError::NestingTooDeep`].
    pub fn parse(ty: &str, max_depth: usize) -> Result<Self, TypeGrammarError> {
        Self::parse_at(ty, 0, max_depth)
    }

    fn parse_at(ty: &str, depth: usize, max_depth: usize) -> Result<Self, TypeGrammarError> {
        let too_deep =
            || TypeGrammarError::NestingTooDeep { name: ty.trim().to_owned(), max: max_depth };
        if depth > max_depth {
            return Err(too_deep())
        }

        // outermost dimension first.
        let mut base = ty.trim();
        let mut arities = Vec::new();
        while let Some((element, arity)) = strip_array_suffix(base)? {
            if depth + arities.len() >= max_depth {
                return Err(too_deep())
            }
            arities.push(arity);
            base = element.trim();
        }

        let spec = Self::parse_base(base, depth + arities.len(), max_depth)?;
        Ok(arities
            .into_iter()
            .rev()
            .fold(spec, |element, arity| Self::Array(Box::new(element), arity)))
    }

    fn parse_base(ty: &str, depth: usize, max_depth: usize) -> Result<Self, TypeGrammarError> {
        if let Some(rest) = ty.strip_prefix('(') {
            let members = rest
                .strip_suffix(')')
                .and_then(split_top_level)
                .ok_or_else(|| TypeGrammarError::UnbalancedParentheses(ty.to_owned()))?;
            return Ok(Self::InlineTuple(
                members
                    .into_iter()
                    .map(|member| Self::parse_at(member, depth + 1, max_depth))
                    .collect::<Result<_, _>>()?,
            ))
        }

        match ty {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            "string" => return Ok(Self::String),
            "bytes" => return Ok(Self::Bytes),
            "tuple" => return Ok(Self::Tuple),
            "byte" => return Ok(Self::FixedBytes(1)),
            _ => {}
        }

        if let Some(bits) = ty.strip_prefix("uint") {
            return parse_bits(ty, bits).map(Self::Uint)
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return parse_bits(ty, bits).map(Self::Int)
        }
        if let Some(size) = ty.strip_prefix("bytes") {
            let size = parse_digits(size).ok_or_else(|| unknown(ty))?;
            if !(1..=32).contains(&size) {
                return Err(TypeGrammarError::InvalidFixedBytesSize { ty: ty.to_owned(), size })
            }
            return Ok(Self::FixedBytes(size))
        }

        Err(unknown(ty))
    }
}

fn unknown(ty: &str) -> TypeGrammarError {
    TypeGrammarError::UnknownType(ty.to_owned())
}

/// Parses the width of an integer type, defaulting to 256 bits.
fn parse_bits(ty: &str, bits: &str) -> Result<usize, TypeGrammarError> {
    if bits.is_empty() {
        return Ok(256)
    }
    let bits = parse_digits(bits).ok_or_else(|| unknown(ty))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(TypeGrammarError::InvalidIntegerWidth { ty: ty.to_owned(), bits })
    }
    Ok(bits)
}

/// Parses a non-empty string of ascii digits without leading zeros.
fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None
    }
    s.parse().ok()
}

/// Strips a trailing `[<digits-or-empty>]` from `ty`. Returns `None` if the type is not an
/// array.
fn strip_array_suffix(ty: &str) -> Result<Option<(&str, Option<usize>)>, TypeGrammarError> {
    let Some(rest) = ty.strip_suffix(']') else { return Ok(None) };
    let open = rest.rfind('[').ok_or_else(|| unknown(ty))?;
    let (element, size) = (&rest[..open], &rest[open + 1..]);

    if size.is_empty() {
        return Ok(Some((element, None)))
    }
    match parse_digits(size) {
        Some(arity) if arity > 0 => Ok(Some((element, Some(arity)))),
        _ => Err(TypeGrammarError::InvalidArraySize { ty: ty.to_owned(), size: size.to_owned() }),
    }
}
