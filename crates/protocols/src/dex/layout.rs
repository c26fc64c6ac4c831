//! Schema of the deployed DEX contract.
//!
//! Matches what the contract embeds in its module. Used by local tooling
//! and test doubles that need to serve a schema without a node.

use crate::schema::{EmbeddedSchema, Fields, SchemaVersion, SizeLength, Type};
use concordium_contracts_common::schema::{
    ContractV1, ContractV3, FunctionV1, FunctionV2, ModuleV1, ModuleV3,
};
use concordium_contracts_common::to_bytes;
use std::collections::BTreeMap;

/// Contract name the DEX is deployed under.
pub const DEX_CONTRACT_NAME: &str = "dex_contract";

fn named(fields: Vec<(&str, Type)>) -> Type {
    Type::Struct(Fields::Named(
        fields
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect(),
    ))
}

fn option(inner: Type) -> Type {
    Type::Enum(vec![
        ("None".to_string(), Fields::None),
        ("Some".to_string(), Fields::Unnamed(vec![inner])),
    ])
}

fn unit_variants(names: &[&str]) -> impl Iterator<Item = (String, Fields)> {
    names.iter().map(|name| (name.to_string(), Fields::None))
}

/// `TokenPair` as the contract declares it; token ids are `TokenIdU8`.
pub fn token_pair_type() -> Type {
    named(vec![
        ("token0_address", Type::ContractAddress),
        ("token1_address", Type::ContractAddress),
        ("token0_id", Type::ByteList(SizeLength::U8)),
        ("token1_id", Type::ByteList(SizeLength::U8)),
    ])
}

pub fn liquidity_pool_type() -> Type {
    named(vec![
        ("token0_reserve", Type::U64),
        ("token1_reserve", Type::U64),
        ("total_shares", Type::U64),
    ])
}

fn error_type() -> Type {
    let cis2 = Type::Enum(
        unit_variants(&["InvalidTokenId", "InsufficientFunds", "Unauthorized"])
            .chain(std::iter::once((
                "Custom".to_string(),
                Fields::Unnamed(vec![Type::Unit]),
            )))
            .collect(),
    );
    Type::Enum(
        unit_variants(&[
            "ParseParams",
            "InsufficientLiquidity",
            "PoolNotFound",
            "InvalidTokenPair",
            "InsufficientAmount",
        ])
        .chain(std::iter::once((
            "Cis2Error".to_string(),
            Fields::Unnamed(vec![cis2]),
        )))
        .chain(unit_variants(&[
            "InsufficientShares",
            "TransferError",
            "UnauthorizedToken",
            "FailedTokenTransfer",
        ]))
        .collect(),
    )
}

/// Receive functions as `(name, parameter, return value)`.
fn receive_functions() -> Vec<(&'static str, Type, Option<Type>)> {
    let amount = || Type::U64;
    vec![
        ("getPool", token_pair_type(), Some(option(liquidity_pool_type()))),
        (
            "getShares",
            Type::Pair(Box::new(token_pair_type()), Box::new(Type::AccountAddress)),
            Some(amount()),
        ),
        (
            "addLiquidity",
            named(vec![
                ("token_pair", token_pair_type()),
                ("amount0", amount()),
                ("amount1", amount()),
                ("min_liquidity", amount()),
            ]),
            None,
        ),
        (
            "removeLiquidity",
            named(vec![
                ("token_pair", token_pair_type()),
                ("shares", amount()),
                ("min_amount0", amount()),
                ("min_amount1", amount()),
            ]),
            None,
        ),
        (
            "swap",
            named(vec![
                ("token_pair", token_pair_type()),
                ("amount_in", amount()),
                ("min_amount_out", amount()),
                ("is_token0", Type::Bool),
            ]),
            None,
        ),
    ]
}

/// Module schema as the current toolchain embeds it. Updates declare the
/// contract's error type.
pub fn dex_module_v3() -> ModuleV3 {
    let receive = receive_functions()
        .into_iter()
        .map(|(name, parameter, return_value)| {
            let error = return_value.is_none().then(error_type);
            let function = FunctionV2 {
                parameter: Some(parameter),
                return_value,
                error,
            };
            (name.to_string(), function)
        })
        .collect();
    let contract = ContractV3 {
        init: None,
        receive,
        event: None,
    };
    ModuleV3 {
        contracts: BTreeMap::from([(DEX_CONTRACT_NAME.to_string(), contract)]),
    }
}

/// Module schema in the older unversioned layout, without error types.
pub fn dex_module_v1() -> ModuleV1 {
    let receive = receive_functions()
        .into_iter()
        .map(|(name, parameter, return_value)| {
            let function = match return_value {
                Some(return_value) => FunctionV1::Both {
                    parameter,
                    return_value,
                },
                None => FunctionV1::Parameter(parameter),
            };
            (name.to_string(), function)
        })
        .collect();
    let contract = ContractV1 {
        init: None,
        receive,
    };
    ModuleV1 {
        contracts: BTreeMap::from([(DEX_CONTRACT_NAME.to_string(), contract)]),
    }
}

/// Schema bytes as a module built with the current toolchain carries them.
pub fn dex_embedded_schema() -> EmbeddedSchema {
    let mut bytes = vec![0xff, 0xff, SchemaVersion::V3.as_u8()];
    bytes.extend(to_bytes(&dex_module_v3()));
    EmbeddedSchema::versioned(bytes)
}

/// Schema bytes as a legacy `concordium-schema-v2` section carries them.
pub fn dex_legacy_embedded_schema() -> EmbeddedSchema {
    EmbeddedSchema::unversioned(to_bytes(&dex_module_v1()), SchemaVersion::V1)
}
