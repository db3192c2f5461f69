//! Builds [`DataType`] trees from ABI parameter descriptors.

use crate::{
    error::TypeGrammarError,
    grammar::TypeSpec,
    types::{scoped, Blob, BlobKind, DataType, Set},
};
use abi_primitives::Param;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The default maximum nesting depth of a type.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration of the [`DataTypeFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactoryConfig {
    /// The maximum nesting depth of tuples and arrays.
    pub max_depth: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Builds node trees from descriptors, caching parsed type strings.
#[derive(Debug, Default)]
pub struct DataTypeFactory {
    config: FactoryConfig,
    cache: HashMap<String, TypeSpec>,
}

impl DataTypeFactory {
    /// Returns a new [`DataTypeFactory`].
    pub fn new(config: FactoryConfig) -> Self {
        Self { config, cache: HashMap::new() }
    }

    /// Returns the node for the parameter, named after it.
    pub fn create(&mut self, param: &Param) -> Result<DataType, TypeGrammarError> {
        let spec = self.parse(&param.ty)?;
        self.build(param.name.clone(), &spec, &param.components, 0)
    }

    /// Returns a tuple node named `name` holding the parameters, as used for the arguments
    /// of a function or the data of an event.
    pub fn create_tuple(&mut self, name: &str, params: &[Param]) -> Result<DataType, TypeGrammarError> {
        self.build_tuple(name.to_owned(), params, 0)
    }

    fn parse(&mut self, ty: &str) -> Result<TypeSpec, TypeGrammarError> {
        if let Some(spec) = self.cache.get(ty) {
            return Ok(spec.clone())
        }
        let spec = TypeSpec::parse(ty, self.config.max_depth)?;
        self.cache.insert(ty.to_owned(), spec.clone());
        Ok(spec)
    }

    fn build(
        &mut self,
        name: String,
        spec: &TypeSpec,
        components: &[Param],
        depth: usize,
    ) -> Result<DataType, TypeGrammarError> {
        if depth > self.config.max_depth {
            return Err(TypeGrammarError::NestingTooDeep { name, max: self.config.max_depth })
        }

        let kind = match spec {
            TypeSpec::Address => BlobKind::Address,
            TypeSpec::Bool => BlobKind::Bool,
            TypeSpec::Int(bits) => BlobKind::Int(*bits),
            TypeSpec::Uint(bits) => BlobKind::Uint(*bits),
            TypeSpec::FixedBytes(size) => BlobKind::FixedBytes(*size),
            TypeSpec::Bytes => BlobKind::Bytes,
            TypeSpec::String => BlobKind::String,
            TypeSpec::Tuple => return self.build_tuple(name, components, depth),
            TypeSpec::InlineTuple(specs) => {
                let mut members = Vec::with_capacity(specs.len());
                for (i, spec) in specs.iter().enumerate() {
                    let key = i.to_string();
                    let node = self.build(scoped(&name, &key), spec, &[], depth + 1)?;
                    members.push((key, node));
                }
                return Ok(Set::tuple(name, members).into())
            }
            TypeSpec::Array(element, arity) => {
                let node = self.build(format!("{name}[]"), element, components, depth + 1)?;
                return Ok(Set::array(name, node, *arity).into())
            }
        };
        Ok(Blob::new(name, kind)?.into())
    }

    fn build_tuple(
        &mut self,
        name: String,
        params: &[Param],
        depth: usize,
    ) -> Result<DataType, TypeGrammarError> {
        let mut members = Vec::with_capacity(params.len());
        for (key, param) in member_keys(params).into_iter().zip(params) {
            let spec = self.parse(&param.ty)?;
            let node = self.build(scoped(&name, &key), &spec, &param.components, depth + 1)?;
            members.push((key, node));
        }
        Ok(Set::tuple(name, members).into())
    }
}

/// Returns unique member names: unnamed members are named by position, later occurrences of
/// a name get a `_1`, `_2`, ... suffix.
fn member_keys(params: &[Param]) -> Vec<String> {
    let mut used = HashSet::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(params.len());

    for (i, param) in params.iter().enumerate() {
        let base = if param.name.is_empty() { i.to_string() } else { param.name.clone() };
        let mut key = base.clone();
        while !used.insert(key.clone()) {
            let n = occurrences.entry(param.name.as_str()).or_default();
            *n += 1;
            key = format!("{base}_{n}");
        }
        keys.push(key);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SetKind;

    fn stake_params() -> Vec<Param> {
        vec![
            Param::new("poolId", "uint256"),
            Param::tuple(
                "deposits",
                "tuple[]",
                vec![Param::new("owner", "address"), Param::new("amount", "uint96")],
            ),
            Param::new("memo", "string"),
        ]
    }

    #[test]
    fn test_should_build_scoped_names() -> Result<(), TypeGrammarError> {
        let mut factory = DataTypeFactory::default();
        let node = factory.create_tuple("stake", &stake_params())?;

        assert_eq!(node.signature(), "(uint256,(address,uint96)[],string)");
        let DataType::Set(set) = &node else { panic!("expected a set") };
        let members = set.members().unwrap();
        assert_eq!(members[0].node.name(), "stake.poolId");
        assert!(members[1].node.is_pointer());
        assert_eq!(members[1].node.name(), "stake.deposits");

        let DataType::Pointer(pointer) = &members[1].node else { panic!("expected a pointer") };
        let DataType::Set(deposits) = pointer.destination() else { panic!("expected a set") };
        let SetKind::Array { element, arity: None } = deposits.kind() else {
            panic!("expected a dynamic array")
        };
        assert_eq!(element.name(), "stake.deposits[]");
        assert!(element.is_static());

        Ok(())
    }

    #[test]
    fn test_should_name_inline_tuple_members_by_position() -> Result<(), TypeGrammarError> {
        let mut factory = DataTypeFactory::default();
        let node = factory.create(&Param::new("pair", "(address,string)[2]"))?;

        assert_eq!(node.signature(), "(address,string)[2]");
        assert!(!node.is_static());
        let DataType::Set(pairs) = &node else { panic!("expected a set") };
        let SetKind::Array { element, .. } = pairs.kind() else { panic!("expected an array") };
        let DataType::Pointer(pointer) = element.as_ref() else { panic!("expected a pointer") };
        let DataType::Set(pair) = pointer.destination() else { panic!("expected a set") };
        let keys: Vec<_> = pair.members().unwrap().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["0", "1"]);
        assert_eq!(pair.members().unwrap()[1].node.name(), "pair[].1");

        Ok(())
    }

    #[test]
    fn test_should_disambiguate_member_names() {
        let params = [
            Param::new("amount", "uint256"),
            Param::new("", "address"),
            Param::new("amount", "uint128"),
            Param::new("amount", "uint64"),
            Param::new("amount_1", "bool"),
        ];
        assert_eq!(member_keys(&params), ["amount", "1", "amount_1", "amount_2", "amount_1_1"]);
    }

    #[test]
    fn test_should_limit_depth() {
        let mut factory = DataTypeFactory::new(FactoryConfig { max_depth: 2 });
        assert!(factory.create(&Param::new("ids", "uint8[][]")).is_ok());
        assert_eq!(
            factory.create(&Param::new("ids", "uint8[][][]")),
            Err(TypeGrammarError::NestingTooDeep { name: "uint8[][][]".into(), max: 2 })
        );

        // nesting through descriptor components is checked while building.
        let nested = Param::tuple(
            "outer",
            "tuple[]",
            vec![Param::tuple("inner", "tuple[]", vec![Param::new("id", "uint8")])],
        );
        assert_eq!(
            factory.create(&nested),
            Err(TypeGrammarError::NestingTooDeep { name: "outer[].inner[]".into(), max: 2 })
        );
    }

    #[test]
    fn test_should_reject_long_array_suffix_chains() {
        let mut factory = DataTypeFactory::default();
        let ty = format!("uint8{}", "[]".repeat(10_000));
        assert!(matches!(
            factory.create(&Param::new("x", ty)),
            Err(TypeGrammarError::NestingTooDeep { max: DEFAULT_MAX_DEPTH, .. })
        ));

        let ty = format!("{}uint8{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            factory.create(&Param::new("x", ty)),
            Err(TypeGrammarError::NestingTooDeep { max: DEFAULT_MAX_DEPTH, .. })
        ));
    }

    #[test]
    fn test_should_match_descriptor_canonical_types() -> Result<(), TypeGrammarError> {
        let mut factory = DataTypeFactory::default();
        let params = [
            Param::new("amount", "uint"),
            Param::new("flags", "byte[2][]"),
            Param::new("pair", "(int, (address,string)[])[3]"),
            stake_params().swap_remove(1),
        ];
        for param in params {
            assert_eq!(factory.create(&param)?.signature(), param.canonical_type());
        }
        Ok(())
    }

    #[test]
    fn test_should_reject_invalid_descriptor() {
        let mut factory = DataTypeFactory::default();
        assert_eq!(
            factory.create(&Param::new("x", "uint7")),
            Err(TypeGrammarError::InvalidIntegerWidth { ty: "uint7".into(), bits: 7 })
        );
    }
}
