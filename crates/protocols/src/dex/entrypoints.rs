//! Typed entrypoints of the DEX contract.
//!
//! Each entrypoint binds its on-chain name to a parameter record and, for
//! queries, a return record. Records convert to and from schema JSON; the
//! schema decides the bytes.

use crate::error::DecodingError;
use ccd_dex_domain::address::AccountAddress;
use ccd_dex_domain::entities::LiquidityPool;
use ccd_dex_domain::enums::SwapDirection;
use ccd_dex_domain::token::{TokenAmount, TokenPair};
use primitive_types::U256;
use serde_json::{Map, Value, json};

/// Conversion of a parameter record into schema JSON.
pub trait ToSchemaJson {
    fn to_schema_json(&self) -> Value;
}

/// Conversion of decoded schema JSON into a typed record.
pub trait FromSchemaJson: Sized {
    /// Name of the expected shape, for error messages.
    const EXPECTED: &'static str;

    /// # Errors
    /// Returns [`DecodingError::Shape`] if the value has the wrong layout.
    fn from_schema_json(value: Value) -> Result<Self, DecodingError>;
}

/// A receive function of the DEX contract.
pub trait Entrypoint {
    /// On-chain entrypoint name.
    const NAME: &'static str;
    type Param: ToSchemaJson + Send + Sync;
}

/// An entrypoint read through a dry run. Its return value is decoded.
pub trait QueryEntrypoint: Entrypoint {
    type Return: FromSchemaJson;
}

/// An entrypoint that changes contract state and is submitted as a signed
/// update. Its return value is discarded.
pub trait UpdateEntrypoint: Entrypoint {}

fn shape_error<T: FromSchemaJson>(detail: impl Into<String>) -> DecodingError {
    DecodingError::Shape {
        expected: T::EXPECTED,
        detail: detail.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Integer types up to 64 bits are JSON numbers in schema JSON; wider ones
// are decimal strings. Amounts follow whichever form the value fits.
impl ToSchemaJson for TokenAmount {
    fn to_schema_json(&self) -> Value {
        let raw = self.as_u256();
        if raw <= U256::from(u64::MAX) {
            json!(raw.low_u64())
        } else {
            Value::String(raw.to_string())
        }
    }
}

impl FromSchemaJson for TokenAmount {
    const EXPECTED: &'static str = "token amount";

    fn from_schema_json(value: Value) -> Result<Self, DecodingError> {
        match &value {
            Value::Number(n) => n
                .as_u64()
                .map(TokenAmount::from)
                .ok_or_else(|| shape_error::<Self>(format!("`{n}` is not an unsigned integer"))),
            Value::String(s) => s
                .parse()
                .map_err(|_| shape_error::<Self>(format!("`{s}` is not an unsigned integer"))),
            other => Err(shape_error::<Self>(format!("got {}", kind(other)))),
        }
    }
}

impl ToSchemaJson for TokenPair {
    fn to_schema_json(&self) -> Value {
        let address = |a: ccd_dex_domain::address::ContractAddress| {
            json!({ "index": a.index, "subindex": a.subindex })
        };
        json!({
            "token0_address": address(self.token0.contract),
            "token1_address": address(self.token1.contract),
            "token0_id": self.token0.id.to_string(),
            "token1_id": self.token1.id.to_string(),
        })
    }
}

impl ToSchemaJson for (TokenPair, AccountAddress) {
    fn to_schema_json(&self) -> Value {
        json!([self.0.to_schema_json(), self.1.to_string()])
    }
}

fn take_amount<T: FromSchemaJson>(
    fields: &mut Map<String, Value>,
    name: &str,
) -> Result<TokenAmount, DecodingError> {
    let value = fields
        .remove(name)
        .ok_or_else(|| shape_error::<T>(format!("missing field `{name}`")))?;
    TokenAmount::from_schema_json(value)
        .map_err(|_| shape_error::<T>(format!("field `{name}` is not an amount")))
}

impl FromSchemaJson for LiquidityPool {
    const EXPECTED: &'static str = "liquidity pool";

    fn from_schema_json(value: Value) -> Result<Self, DecodingError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(shape_error::<Self>(format!("got {}", kind(&other)))),
        };
        Ok(LiquidityPool {
            token0_reserve: take_amount::<Self>(&mut fields, "token0_reserve")?,
            token1_reserve: take_amount::<Self>(&mut fields, "token1_reserve")?,
            total_shares: take_amount::<Self>(&mut fields, "total_shares")?,
        })
    }
}

/// `Option<T>` is the enum `{"None": []}` / `{"Some": [value]}`.
impl<T: FromSchemaJson> FromSchemaJson for Option<T> {
    const EXPECTED: &'static str = "option";

    fn from_schema_json(value: Value) -> Result<Self, DecodingError> {
        let mut variant = match value {
            Value::Object(map) if map.len() == 1 => map,
            other => return Err(shape_error::<Self>(format!("got {}", kind(&other)))),
        };
        if let Some(fields) = variant.remove("None") {
            return match fields {
                Value::Null => Ok(None),
                Value::Array(items) if items.is_empty() => Ok(None),
                _ => Err(shape_error::<Self>("`None` carries fields")),
            };
        }
        match variant.remove("Some") {
            Some(Value::Array(mut items)) if items.len() == 1 => {
                items.pop().map(T::from_schema_json).transpose()
            }
            Some(_) => Err(shape_error::<Self>("`Some` must carry one field")),
            None => Err(shape_error::<Self>("unknown variant")),
        }
    }
}

/// Parameter of `addLiquidity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub pair: TokenPair,
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,
    /// Minimum shares to mint, otherwise the contract rejects.
    pub min_liquidity: TokenAmount,
}

impl ToSchemaJson for AddLiquidityParams {
    fn to_schema_json(&self) -> Value {
        json!({
            "token_pair": self.pair.to_schema_json(),
            "amount0": self.amount0.to_schema_json(),
            "amount1": self.amount1.to_schema_json(),
            "min_liquidity": self.min_liquidity.to_schema_json(),
        })
    }
}

/// Parameter of `removeLiquidity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub pair: TokenPair,
    pub shares: TokenAmount,
    pub min_amount0: TokenAmount,
    pub min_amount1: TokenAmount,
}

impl ToSchemaJson for RemoveLiquidityParams {
    fn to_schema_json(&self) -> Value {
        json!({
            "token_pair": self.pair.to_schema_json(),
            "shares": self.shares.to_schema_json(),
            "min_amount0": self.min_amount0.to_schema_json(),
            "min_amount1": self.min_amount1.to_schema_json(),
        })
    }
}

/// Parameter of `swap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub pair: TokenPair,
    pub amount_in: TokenAmount,
    pub min_amount_out: TokenAmount,
    pub direction: SwapDirection,
}

impl ToSchemaJson for SwapParams {
    fn to_schema_json(&self) -> Value {
        json!({
            "token_pair": self.pair.to_schema_json(),
            "amount_in": self.amount_in.to_schema_json(),
            "min_amount_out": self.min_amount_out.to_schema_json(),
            "is_token0": self.direction.input_is_token0(),
        })
    }
}

/// `getPool(TokenPair) -> Option<LiquidityPool>`
pub struct GetPool;

impl Entrypoint for GetPool {
    const NAME: &'static str = "getPool";
    type Param = TokenPair;
}

impl QueryEntrypoint for GetPool {
    type Return = Option<LiquidityPool>;
}

/// `getShares((TokenPair, AccountAddress)) -> TokenAmount`
pub struct GetShares;

impl Entrypoint for GetShares {
    const NAME: &'static str = "getShares";
    type Param = (TokenPair, AccountAddress);
}

impl QueryEntrypoint for GetShares {
    type Return = TokenAmount;
}

pub struct AddLiquidity;

impl Entrypoint for AddLiquidity {
    const NAME: &'static str = "addLiquidity";
    type Param = AddLiquidityParams;
}

impl UpdateEntrypoint for AddLiquidity {}

pub struct RemoveLiquidity;

impl Entrypoint for RemoveLiquidity {
    const NAME: &'static str = "removeLiquidity";
    type Param = RemoveLiquidityParams;
}

impl UpdateEntrypoint for RemoveLiquidity {}

pub struct Swap;

impl Entrypoint for Swap {
    const NAME: &'static str = "swap";
    type Param = SwapParams;
}

impl UpdateEntrypoint for Swap {}

#[cfg(test)]
mod tests {
    use super::*;
    use ccd_dex_domain::address::ContractAddress;
    use ccd_dex_domain::token::{TokenId, TokenRef};
    use rstest::rstest;

    fn pair() -> TokenPair {
        TokenPair::new(
            TokenRef::new(ContractAddress::new(1, 0), TokenId::from_u8(0)),
            TokenRef::new(ContractAddress::new(2, 0), TokenId::from_u8(7)),
        )
    }

    #[test]
    fn test_token_pair_schema_json() {
        let value = pair().to_schema_json();
        assert_eq!(value["token0_address"], json!({ "index": 1, "subindex": 0 }));
        assert_eq!(value["token1_id"], json!("07"));
    }

    #[test]
    fn test_shares_param_is_pair_then_account() {
        let account = AccountAddress([3u8; 32]);
        let value = (pair(), account).to_schema_json();
        assert_eq!(value[1], json!(account.to_string()));
        assert_eq!(value[0]["token0_id"], json!("00"));
    }

    #[test]
    fn test_swap_direction_maps_to_is_token0() {
        let params = SwapParams {
            pair: pair(),
            amount_in: 10u64.into(),
            min_amount_out: 1u64.into(),
            direction: SwapDirection::Token1ToToken0,
        };
        assert_eq!(params.to_schema_json()["is_token0"], json!(false));
    }

    #[rstest]
    #[case(TokenAmount::from(500u64), json!(500))]
    #[case(TokenAmount::from(u64::MAX), json!(u64::MAX))]
    #[case(TokenAmount::from(u128::from(u64::MAX) + 1), json!("18446744073709551616"))]
    fn test_amount_json_form(#[case] amount: TokenAmount, #[case] expected: Value) {
        assert_eq!(amount.to_schema_json(), expected);
        assert_eq!(TokenAmount::from_schema_json(expected).unwrap(), amount);
    }

    #[test]
    fn test_amount_rejects_negative_and_non_numeric() {
        assert!(TokenAmount::from_schema_json(json!(-1)).is_err());
        assert!(TokenAmount::from_schema_json(json!("12a")).is_err());
        assert!(TokenAmount::from_schema_json(json!(true)).is_err());
    }

    #[test]
    fn test_option_pool_from_json() {
        let some = json!({ "Some": [{
            "token0_reserve": 500,
            "token1_reserve": 1000,
            "total_shares": "1000",
        }] });
        let pool = Option::<LiquidityPool>::from_schema_json(some).unwrap();
        assert_eq!(pool, Some(LiquidityPool::new(500u64, 1000u64, 1000u64)));

        let none = Option::<LiquidityPool>::from_schema_json(json!({ "None": [] })).unwrap();
        assert!(none.is_none());
        assert!(Option::<LiquidityPool>::from_schema_json(json!({ "Maybe": [] })).is_err());
    }

    #[test]
    fn test_pool_missing_field_is_shape_error() {
        let value = json!({ "token0_reserve": 1 });
        assert!(matches!(
            LiquidityPool::from_schema_json(value),
            Err(DecodingError::Shape { expected: "liquidity pool", .. })
        ));
    }

    #[test]
    fn test_entrypoint_names() {
        assert_eq!(GetPool::NAME, "getPool");
        assert_eq!(GetShares::NAME, "getShares");
        assert_eq!(AddLiquidity::NAME, "addLiquidity");
        assert_eq!(RemoveLiquidity::NAME, "removeLiquidity");
        assert_eq!(Swap::NAME, "swap");
    }
}
