use super::entrypoints::{Entrypoint, FromSchemaJson, QueryEntrypoint, ToSchemaJson};
use crate::error::{DecodingError, EncodingError, SchemaFetchError};
use crate::rpc::NodeClient;
use crate::schema::{SchemaVersion, VersionedModuleSchema, decode_value, encode_value};
use ccd_dex_domain::contract::ContractDescriptor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Moves typed entrypoint records in and out of the contract's binary format.
///
/// Holds no schema between calls; every pipeline fetches its own.
#[derive(Clone)]
pub struct SchemaCodec {
    node: Arc<dyn NodeClient>,
    version: SchemaVersion,
}

impl SchemaCodec {
    pub fn new(node: Arc<dyn NodeClient>, version: SchemaVersion) -> Self {
        Self { node, version }
    }

    /// Schema version every parse is pinned to.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Fetches and parses the schema embedded in the descriptor's module.
    ///
    /// # Errors
    /// Returns an error if the node cannot be reached, the module has no
    /// schema, or the schema does not parse at the pinned version.
    pub async fn fetch_schema(
        &self,
        descriptor: &ContractDescriptor,
    ) -> Result<VersionedModuleSchema, SchemaFetchError> {
        let module_ref = descriptor.module_ref();
        debug!(module = %module_ref, version = %self.version, "Fetching embedded schema");

        let embedded = self
            .node
            .get_embedded_schema(module_ref)
            .await
            .map_err(|source| SchemaFetchError::Rpc {
                module_ref: module_ref.to_string(),
                source,
            })?
            .ok_or_else(|| SchemaFetchError::MissingSchema(module_ref.to_string()))?;

        embedded.parse(self.version).map_err(|source| {
            warn!(module = %module_ref, error = %source, "Embedded schema rejected");
            SchemaFetchError::Parse {
                module_ref: module_ref.to_string(),
                source,
            }
        })
    }

    /// Encodes the parameter of entrypoint `E` of `contract`.
    ///
    /// # Errors
    /// Returns an error if the schema does not describe `E` or the record
    /// does not fit its declared parameter type.
    pub fn encode<E: Entrypoint>(
        &self,
        schema: &VersionedModuleSchema,
        contract: &str,
        params: &E::Param,
    ) -> Result<Vec<u8>, EncodingError> {
        let ty = schema
            .get_receive_param_schema(contract, E::NAME)
            .map_err(|e| EncodingError::Lookup {
                contract: contract.to_string(),
                entrypoint: E::NAME.to_string(),
                reason: format!("{e:?}"),
            })?;
        let bytes = encode_value(&ty, &params.to_schema_json())?;
        debug!(entrypoint = E::NAME, len = bytes.len(), "Encoded parameter");
        Ok(bytes)
    }

    /// Decodes the return value of query `E` of `contract`.
    ///
    /// # Errors
    /// Returns an error if the schema declares no return type for `E` or the
    /// bytes do not match it.
    pub fn decode<E: QueryEntrypoint>(
        &self,
        schema: &VersionedModuleSchema,
        contract: &str,
        bytes: &[u8],
    ) -> Result<E::Return, DecodingError> {
        let ty = schema
            .get_receive_return_value_schema(contract, E::NAME)
            .map_err(|e| DecodingError::Lookup {
                contract: contract.to_string(),
                entrypoint: E::NAME.to_string(),
                reason: format!("{e:?}"),
            })?;
        let value = decode_value(&ty, bytes)?;
        E::Return::from_schema_json(value)
    }
}
