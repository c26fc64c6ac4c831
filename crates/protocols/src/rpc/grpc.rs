use super::{InvokeInstanceRequest, InvokeInstanceResult, NodeClient, UpdateOutcome, UpdateRequest};
use crate::error::RpcError;
use crate::schema::{EmbeddedSchema, SchemaVersion};
use async_trait::async_trait;
use ccd_dex_domain::address::{AccountAddress, ContractAddress, ModuleReference};
use concordium_contracts_common::OwnedReceiveName;
use concordium_rust_sdk::common::types::{Amount, TransactionTime};
use concordium_rust_sdk::types::smart_contracts::{
    self as sdk_contracts, ContractContext, InvokeContractResult, OwnedParameter, WasmVersion,
};
use concordium_rust_sdk::types::transactions::{UpdateContractPayload, send};
use concordium_rust_sdk::types::{self as sdk, Address, WalletAccount};
use concordium_rust_sdk::{id, v2};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default gRPC endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:20000";

/// Seconds an update stays valid for inclusion.
const UPDATE_EXPIRY_SECS: u32 = 300;

const WASM_MAGIC: &[u8; 4] = b"\0asm";
const CUSTOM_SECTION: u8 = 0;
const VERSIONED_SCHEMA_SECTION: &str = "concordium-schema";
const WASM_V0_SCHEMA_SECTION: &str = "concordium-schema-v1";
const WASM_V1_SCHEMA_SECTION: &str = "concordium-schema-v2";

/// Connection settings for [`GrpcNodeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcConfig {
    pub endpoint: String,
    /// Per-request and connect timeout.
    pub timeout_secs: u64,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// [`NodeClient`] over the node's v2 gRPC API.
///
/// Dry runs need no keys. Updates are signed with the wallet export loaded
/// through [`GrpcNodeClient::with_wallet_file`].
#[derive(Clone)]
pub struct GrpcNodeClient {
    client: v2::Client,
    signer: Option<Arc<WalletAccount>>,
}

impl GrpcNodeClient {
    /// Connects to the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint is malformed or unreachable.
    pub async fn connect(config: &GrpcConfig) -> Result<Self, RpcError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let endpoint = v2::Endpoint::from_str(&config.endpoint)
            .map_err(|e| RpcError::InvalidRequest(format!("endpoint `{}`: {e}", config.endpoint)))?
            .timeout(timeout)
            .connect_timeout(timeout);
        let client = v2::Client::new(endpoint)
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        info!(endpoint = %config.endpoint, "Connected to node");
        Ok(Self {
            client,
            signer: None,
        })
    }

    /// Loads signing keys from a wallet export (`.export` JSON).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn with_wallet_file(mut self, path: impl AsRef<Path>) -> Result<Self, RpcError> {
        let wallet = WalletAccount::from_json_file(path.as_ref())
            .map_err(|e| RpcError::InvalidRequest(format!("wallet file: {e}")))?;
        self.signer = Some(Arc::new(wallet));
        Ok(self)
    }

    /// Account the loaded keys sign for.
    pub fn signer_address(&self) -> Option<AccountAddress> {
        self.signer
            .as_ref()
            .map(|wallet| AccountAddress(wallet.address.0))
    }
}

fn sdk_contract(address: ContractAddress) -> sdk::ContractAddress {
    sdk::ContractAddress::new(address.index, address.subindex)
}

fn sdk_receive_name(
    name: &OwnedReceiveName,
) -> Result<sdk_contracts::OwnedReceiveName, RpcError> {
    let chain_name = name.as_receive_name().get_chain_name();
    sdk_contracts::OwnedReceiveName::new(chain_name.to_string())
        .map_err(|e| RpcError::InvalidRequest(format!("receive name `{chain_name}`: {e}")))
}

fn sdk_parameter(bytes: &[u8]) -> Result<OwnedParameter, RpcError> {
    OwnedParameter::try_from(bytes.to_vec())
        .map_err(|e| RpcError::InvalidRequest(format!("parameter: {e:?}")))
}

#[async_trait]
impl NodeClient for GrpcNodeClient {
    async fn get_embedded_schema(
        &self,
        module_ref: &ModuleReference,
    ) -> Result<Option<EmbeddedSchema>, RpcError> {
        let reference = module_ref
            .to_string()
            .parse::<sdk_contracts::ModuleReference>()
            .map_err(|e| RpcError::InvalidRequest(format!("module reference: {e:?}")))?;
        let mut client = self.client.clone();
        let module = client
            .get_module_source(&reference, &v2::BlockIdentifier::LastFinal)
            .await
            .map_err(|e| RpcError::Node(e.to_string()))?
            .response;
        let is_v0 = matches!(module.version, WasmVersion::V0);
        debug!(module = %module_ref, wasm_v0 = is_v0, "Fetched module source");
        embedded_schema(module.source.as_ref(), is_v0)
    }

    async fn invoke_instance(
        &self,
        request: &InvokeInstanceRequest,
    ) -> Result<InvokeInstanceResult, RpcError> {
        let mut context = ContractContext::new(
            sdk_contract(request.contract),
            sdk_receive_name(&request.receive_name)?,
        );
        context.invoker = request
            .invoker
            .map(|account| Address::Account(id::types::AccountAddress(account.0)));
        context.amount = Amount::zero();
        context.parameter = sdk_parameter(&request.parameter)?;
        context.energy = sdk::Energy::from(request.energy.0).into();
        let mut client = self.client.clone();
        let result = client
            .invoke_instance(&v2::BlockIdentifier::LastFinal, &context)
            .await
            .map_err(|e| RpcError::Node(e.to_string()))?
            .response;
        Ok(match result {
            InvokeContractResult::Success {
                return_value,
                used_energy,
                ..
            } => InvokeInstanceResult::Success {
                return_value: return_value.map(|rv| rv.value),
                used_energy: used_energy.energy,
            },
            InvokeContractResult::Failure {
                reason,
                used_energy,
                ..
            } => InvokeInstanceResult::Failure {
                reason: format!("{reason:?}"),
                used_energy: used_energy.energy,
            },
        })
    }

    async fn send_update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, RpcError> {
        let wallet = self
            .signer
            .as_ref()
            .filter(|wallet| wallet.address.0 == request.sender.0)
            .ok_or_else(|| RpcError::NoSigner(request.sender.to_string()))?;

        let mut client = self.client.clone();
        let nonce = client
            .get_next_account_sequence_number(&wallet.address)
            .await
            .map_err(|e| RpcError::Node(e.to_string()))?
            .nonce;
        let payload = UpdateContractPayload {
            amount: Amount::from_micro_ccd(request.amount),
            address: sdk_contract(request.contract),
            receive_name: sdk_receive_name(&request.receive_name)?,
            message: sdk_parameter(&request.parameter)?,
        };
        let transaction = send::update_contract(
            &wallet.keys,
            wallet.address,
            nonce,
            TransactionTime::seconds_after(UPDATE_EXPIRY_SECS),
            payload,
            sdk::Energy::from(request.energy.0),
        );

        let hash = client
            .send_account_transaction(transaction)
            .await
            .map_err(|e| RpcError::Node(e.to_string()))?;
        debug!(tx_hash = %hash, "Update submitted, awaiting finalization");
        let (block, summary) = client
            .wait_until_finalized(&hash)
            .await
            .map_err(|e| RpcError::Node(e.to_string()))?;
        debug!(tx_hash = %hash, block = %block, "Update finalized");

        let tx_hash = hash.to_string();
        Ok(match summary.is_rejected_account_transaction() {
            Some(reason) => UpdateOutcome::Rejected {
                tx_hash,
                reason: format!("{reason:?}"),
            },
            None => UpdateOutcome::Success { tx_hash },
        })
    }
}

fn read_u32_leb(bytes: &[u8], pos: &mut usize) -> Result<u32, RpcError> {
    let mut result: u32 = 0;
    for shift in (0..35).step_by(7) {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| RpcError::MalformedResponse("truncated wasm module".into()))?;
        *pos += 1;
        result |= u32::from(byte & 0x7f).checked_shl(shift).unwrap_or(0);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(RpcError::MalformedResponse("oversized LEB128 in wasm module".into()))
}

/// Custom sections of a Wasm module, in order.
fn custom_sections(wasm: &[u8]) -> Result<Vec<(&str, &[u8])>, RpcError> {
    let malformed = |what: &str| RpcError::MalformedResponse(format!("wasm module: {what}"));
    if wasm.len() < 8 || &wasm[..4] != WASM_MAGIC {
        return Err(malformed("missing header"));
    }

    let mut sections = Vec::new();
    let mut pos = 8;
    while pos < wasm.len() {
        let id = wasm[pos];
        pos += 1;
        let size = read_u32_leb(wasm, &mut pos)? as usize;
        let end = pos
            .checked_add(size)
            .filter(|end| *end <= wasm.len())
            .ok_or_else(|| malformed("section exceeds module"))?;
        if id == CUSTOM_SECTION {
            let mut cursor = pos;
            let name_len = read_u32_leb(wasm, &mut cursor)? as usize;
            let name_end = cursor
                .checked_add(name_len)
                .filter(|name_end| *name_end <= end)
                .ok_or_else(|| malformed("section name exceeds section"))?;
            let name = std::str::from_utf8(&wasm[cursor..name_end])
                .map_err(|_| malformed("section name is not UTF-8"))?;
            sections.push((name, &wasm[name_end..end]));
        }
        pos = end;
    }
    Ok(sections)
}

/// Locates the schema section of a module. A versioned section wins over
/// the legacy unversioned one for the module's Wasm version.
fn embedded_schema(wasm: &[u8], is_v0: bool) -> Result<Option<EmbeddedSchema>, RpcError> {
    let sections = custom_sections(wasm)?;
    let find = |wanted: &str| {
        sections
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, content)| content.to_vec())
    };

    if let Some(bytes) = find(VERSIONED_SCHEMA_SECTION) {
        return Ok(Some(EmbeddedSchema::versioned(bytes)));
    }
    let (legacy, version) = if is_v0 {
        (WASM_V0_SCHEMA_SECTION, SchemaVersion::V0)
    } else {
        (WASM_V1_SCHEMA_SECTION, SchemaVersion::V1)
    };
    Ok(find(legacy).map(|bytes| EmbeddedSchema::unversioned(bytes, version)))
}
