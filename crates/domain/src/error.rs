use thiserror::Error;

/// Errors raised while constructing or parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A contract address string could not be parsed.
    #[error("invalid contract address `{0}`: expected `<index,subindex>`")]
    InvalidContractAddress(String),
    /// An account address string is not valid base58check.
    #[error("invalid account address `{0}`")]
    InvalidAccountAddress(String),
    /// A module reference is not 32 hex-encoded bytes.
    #[error("invalid module reference `{0}`")]
    InvalidModuleRef(String),
    /// A token id is malformed or too long.
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),
    /// A token amount string is not a non-negative decimal integer.
    #[error("invalid token amount `{0}`")]
    InvalidAmount(String),
    /// A contract or receive name violates the on-chain naming rules.
    #[error("invalid contract name `{name}`: {reason}")]
    InvalidContractName { name: String, reason: String },
    /// An entrypoint name violates the on-chain naming rules.
    #[error("invalid entrypoint name `{name}`: {reason}")]
    InvalidEntrypointName { name: String, reason: String },
    /// An amount does not fit the requested representation.
    #[error("amount {0} is out of range for conversion")]
    AmountOutOfRange(String),
}
