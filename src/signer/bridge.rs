//! Bridge signing backend
//!
//! A signer whose key is held by an external agent (typically a wallet
//! extension) reachable only through a raw `request(method, params)`
//! call. The typed-data payload is assembled here and rendered/approved
//! by the external agent; that interaction has no latency bound and may
//! never resolve if abandoned. Callers wanting bounded latency wrap the
//! call with their own timeout.

use std::collections::HashMap;

use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::eip712::{domain_fields, Eip712Domain, TypedDataField};
use crate::error::{AuthError, AuthResult};
use crate::signer::checksum_address;

/// The raw signing method the bridge understands.
pub const SIGN_TYPED_DATA_METHOD: &str = "eth_signTypedData_v4";

/// Errors surfaced by a bridge transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The external agent declined the request (user cancellation).
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The bridge endpoint is not reachable.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    /// Anything else the transport reports.
    #[error("transport error: {0}")]
    Other(String),
}

/// Message-passing seam to the external signing agent. The call blocks
/// until the agent responds; this crate imposes no timeout or retry.
pub trait BridgeTransport: Send + Sync {
    fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, TransportError>;
}

pub struct BridgeSigner {
    address: [u8; 20],
    transport: Box<dyn BridgeTransport>,
}

impl BridgeSigner {
    pub fn new(address: [u8; 20], transport: Box<dyn BridgeTransport>) -> Self {
        Self { address, transport }
    }

    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    /// Assemble the typed-data payload and drive the raw signing call.
    pub fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        primary_type: &str,
        message: &serde_json::Value,
        types: &HashMap<String, Vec<TypedDataField>>,
    ) -> AuthResult<[u8; 65]> {
        let payload = build_typed_data_payload(domain, primary_type, message, types);
        let serialized = serde_json::to_string(&payload)
            .map_err(|e| AuthError::EncodingFailure(e.to_string()))?;

        debug!(method = SIGN_TYPED_DATA_METHOD, primary_type, "dispatching bridge signing request");
        let response = self
            .transport
            .request(
                SIGN_TYPED_DATA_METHOD,
                json!([checksum_address(&self.address), serialized]),
            )
            .map_err(AuthError::from)?;

        parse_signature_response(&response)
    }
}

impl std::fmt::Debug for BridgeSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSigner")
            .field("address", &checksum_address(&self.address))
            .finish_non_exhaustive()
    }
}

/// The JSON object the bridge renders for approval: the standard domain
/// type plus the operation's type subset, the primary type, the domain,
/// and the message with display-friendly values (decimal strings for
/// uints, 0x-hex for binary fields).
pub fn build_typed_data_payload(
    domain: &Eip712Domain,
    primary_type: &str,
    message: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> serde_json::Value {
    let mut all_types = serde_json::Map::new();
    all_types.insert(
        "EIP712Domain".to_string(),
        serde_json::to_value(domain_fields()).expect("static fields serialize"),
    );
    for (name, fields) in types {
        all_types.insert(
            name.clone(),
            serde_json::to_value(fields).expect("schema fields serialize"),
        );
    }

    json!({
        "types": all_types,
        "primaryType": primary_type,
        "domain": {
            "name": domain.name,
            "version": domain.version,
            "chainId": domain.chain_id,
            "verifyingContract": checksum_address(&domain.verifying_contract),
        },
        "message": message,
    })
}

/// Expect a 0x-hex 65-byte signature; accept v as 0/1/27/28 and
/// normalize to 27/28.
fn parse_signature_response(response: &serde_json::Value) -> AuthResult<[u8; 65]> {
    let s = response
        .as_str()
        .ok_or_else(|| AuthError::SignatureRejected("non-string bridge response".to_string()))?;
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|e| AuthError::SignatureRejected(format!("malformed signature hex: {}", e)))?;
    if bytes.len() != 65 {
        return Err(AuthError::SignatureRejected(format!(
            "expected 65 signature bytes, got {}",
            bytes.len()
        )));
    }

    let mut sig = [0u8; 65];
    sig.copy_from_slice(&bytes);
    sig[64] = match sig[64] {
        0 | 27 => 27,
        1 | 28 => 28,
        v => {
            return Err(AuthError::SignatureRejected(format!(
                "invalid recovery byte: {}",
                v
            )))
        }
    };
    Ok(sig)
}
