use crate::address::ContractAddress;
use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a CIS-2 token id in bytes.
pub const MAX_TOKEN_ID_LEN: usize = 255;

/// CIS-2 token identifier inside a token contract.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId(Vec<u8>);

impl TokenId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_TOKEN_ID_LEN {
            return Err(DomainError::InvalidTokenId(format!(
                "{} bytes exceeds the {MAX_TOKEN_ID_LEN} byte limit",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Single-byte id, the form used by `TokenIdU8` token contracts.
    #[must_use]
    pub fn from_u8(id: u8) -> Self {
        Self(vec![id])
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for TokenId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| DomainError::InvalidTokenId(format!("`{s}` is not hex: {e}")))?;
        Self::new(bytes)
    }
}

impl TryFrom<String> for TokenId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(value: TokenId) -> Self {
        value.to_string()
    }
}

/// A token: the CIS-2 contract that issues it plus its id within that contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub contract: ContractAddress,
    pub id: TokenId,
}

impl TokenRef {
    pub fn new(contract: ContractAddress, id: TokenId) -> Self {
        Self { contract, id }
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.contract, self.id)
    }
}

/// Ordered pair of tokens traded in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub token0: TokenRef,
    pub token1: TokenRef,
}

impl TokenPair {
    pub fn new(token0: TokenRef, token1: TokenRef) -> Self {
        Self { token0, token1 }
    }

    /// The same two tokens in the opposite display order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            token0: self.token1.clone(),
            token1: self.token0.clone(),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

/// Raw on-chain token amount. On-chain values may exceed `u64`, so the
/// amount is kept as a 256-bit unsigned integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Scales the raw amount down by `decimals` for display.
    pub fn to_decimal(&self, decimals: u32) -> Result<Decimal, DomainError> {
        let raw = Decimal::from_str(&self.0.to_string())
            .map_err(|_| DomainError::AmountOutOfRange(self.0.to_string()))?;
        let mut scaled = raw;
        scaled
            .set_scale(decimals)
            .map_err(|_| DomainError::AmountOutOfRange(self.0.to_string()))?;
        Ok(scaled.normalize())
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl FromStr for TokenAmount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidAmount(s.to_string()));
        }
        U256::from_dec_str(trimmed)
            .map(Self)
            .map_err(|_| DomainError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
