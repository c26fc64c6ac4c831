//! Operation errors.

use ccd_dex_protocols::error::{DecodingError, EncodingError, InvocationError, SchemaFetchError};
use thiserror::Error;

/// Why an operation failed, by pipeline stage.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Required input missing or unusable, or another transaction is in flight.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A mutation was requested without a connected account.
    #[error("no account connected")]
    NotConnected,
    #[error(transparent)]
    SchemaFetch(#[from] SchemaFetchError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

impl OperationError {
    /// Pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotConnected => "wallet",
            Self::SchemaFetch(_) => "schema",
            Self::Encoding(_) => "encoding",
            Self::Invocation(_) => "invocation",
            Self::Decoding(_) => "decoding",
        }
    }
}
