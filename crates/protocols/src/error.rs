//! Error types for schema handling and contract calls.

use thiserror::Error;

/// Transport-level failure talking to a node.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The node could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
    /// The node rejected or failed the query.
    #[error("node error: {0}")]
    Node(String),
    /// A request could not be built from the given values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// No signing keys are available for the update's sender.
    #[error("no signing keys for account {0}")]
    NoSigner(String),
}

/// Schema bytes could not be parsed at the requested version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaParseError {
    #[error("schema is versioned as V{found} but V{pinned} was requested")]
    VersionMismatch { pinned: u8, found: u8 },
    #[error("malformed schema: {0}")]
    Invalid(String),
}

/// The schema for a contract could not be obtained.
#[derive(Debug, Clone, Error)]
pub enum SchemaFetchError {
    /// The node could not be reached or rejected the lookup.
    #[error("failed to fetch schema for module {module_ref}: {source}")]
    Rpc {
        module_ref: String,
        #[source]
        source: RpcError,
    },
    /// The module carries no embedded schema.
    #[error("module {0} has no embedded schema")]
    MissingSchema(String),
    /// The embedded schema is malformed or pinned to another version.
    #[error("schema of module {module_ref} is invalid: {source}")]
    Parse {
        module_ref: String,
        #[source]
        source: SchemaParseError,
    },
}

/// A typed parameter does not match the schema's parameter layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The schema has no parameter type for the entrypoint.
    #[error("no parameter type for `{contract}.{entrypoint}`: {reason}")]
    Lookup {
        contract: String,
        entrypoint: String,
        reason: String,
    },
    /// The value does not fit the declared type.
    #[error("parameter does not match its schema: {0}")]
    Value(String),
}

/// Return-value bytes do not match the schema's return layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// The schema has no return type for the entrypoint.
    #[error("no return type for `{contract}.{entrypoint}`: {reason}")]
    Lookup {
        contract: String,
        entrypoint: String,
        reason: String,
    },
    /// The bytes are truncated or carry an invalid tag, length or string.
    #[error("malformed return value: {0}")]
    Malformed(String),
    #[error("{0} trailing bytes after return value")]
    TrailingBytes(usize),
    #[error("array of {0} zero-sized elements exceeds the decoding limit")]
    ArrayTooLong(u32),
    /// Bytes decoded cleanly but do not form the expected typed record.
    #[error("decoded value does not match {expected}: {detail}")]
    Shape {
        expected: &'static str,
        detail: String,
    },
}

/// A contract call failed: transport, revert or energy exhaustion.
#[derive(Debug, Clone, Error)]
#[error("{mode} `{receive_name}` failed: {reason}")]
pub struct InvocationError {
    pub receive_name: String,
    pub mode: &'static str,
    pub reason: String,
}
