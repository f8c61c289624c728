//! Signing backends and the digest/signature producer
//!
//! Regardless of which backend produced the raw signature, the producer
//! recomputes the digest from (domain, types, message) with the canonical
//! encoder (a digest reported by a backend is never trusted) and splits
//! the signature into its (v, r, s) parts. Local and bridge paths must
//! agree byte for byte for identical inputs.

pub mod local;
pub mod bridge;
pub mod detect;

pub use local::LocalKeySigner;
pub use bridge::{BridgeSigner, BridgeTransport, TransportError};
pub use detect::{needs_bridge, select_backend, BackendKind, ProviderKind, ProviderShape, SignerShape};

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use tracing::debug;

use crate::eip712::{keccak256, typed_data_digest, Eip712Domain};
use crate::error::{AuthError, AuthResult};
use crate::operations::AuthorizationRequest;

/// A structured signature plus the digest that was actually signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSignature {
    /// 65-byte raw signature, r || s || v
    pub signature: [u8; 65],
    /// Recovery byte, 27 or 28
    pub v: u8,
    /// r component
    pub r: [u8; 32],
    /// s component
    pub s: [u8; 32],
    /// The 32-byte digest that was signed
    pub signed_data: [u8; 32],
}

impl AuthSignature {
    /// Split a raw 65-byte signature around the digest it covers.
    pub fn from_raw(signature: [u8; 65], signed_data: [u8; 32]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature[..32]);
        s.copy_from_slice(&signature[32..64]);
        Self {
            signature,
            v: signature[64],
            r,
            s,
            signed_data,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature))
    }
}

/// The explicit two-variant signing interface. Chosen once by the caller;
/// [`detect::select_backend`] classifies opaque handles at the boundary.
#[derive(Debug)]
pub enum SigningBackend {
    Local(LocalKeySigner),
    Bridge(BridgeSigner),
}

impl SigningBackend {
    pub fn address(&self) -> [u8; 20] {
        match self {
            SigningBackend::Local(signer) => signer.address(),
            SigningBackend::Bridge(signer) => signer.address(),
        }
    }
}

/// Drive the chosen backend for one authorization request and return the
/// normalized signature.
pub fn sign_request(
    domain: &Eip712Domain,
    backend: &SigningBackend,
    request: &AuthorizationRequest,
) -> AuthResult<AuthSignature> {
    let primary_type = request.kind.primary_type();

    // independent recomputation; the backend's own hashing is not trusted
    let digest = typed_data_digest(domain, primary_type, &request.message, &request.types)?;
    debug!(operation = %request.kind, digest = %hex::encode(digest), "computed typed-data digest");

    let raw = match backend {
        SigningBackend::Local(signer) => {
            signer.sign_typed_data(domain, primary_type, &request.message, &request.types)?
        }
        SigningBackend::Bridge(signer) => {
            let raw =
                signer.sign_typed_data(domain, primary_type, &request.message, &request.types)?;
            // an external agent that hashed a divergent payload produces a
            // signature recovering to some other address; catch it here
            let recovered = recover_signer(&digest, &raw)?;
            if recovered != signer.address() {
                return Err(AuthError::SignatureRejected(format!(
                    "bridge signature recovers to 0x{}, expected 0x{}",
                    hex::encode(recovered),
                    hex::encode(signer.address())
                )));
            }
            raw
        }
    };

    Ok(AuthSignature::from_raw(raw, digest))
}

/// Recover the signing address from a digest and a 65-byte signature.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8; 65]) -> AuthResult<[u8; 20]> {
    let v = signature[64];
    let recovery = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => {
            return Err(AuthError::SignatureRejected(format!(
                "invalid recovery byte: {}",
                v
            )))
        }
    };

    let secp = Secp256k1::new();
    let recovery_id = RecoveryId::from_i32(recovery as i32)
        .map_err(|e| AuthError::SignatureRejected(e.to_string()))?;
    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| AuthError::SignatureRejected(e.to_string()))?;
    let message = Message::from_digest_slice(digest)
        .map_err(|e| AuthError::SignatureRejected(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| AuthError::SignatureRejected(e.to_string()))?;

    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Ok(address)
}

/// True when the signature over `digest` recovers to `expected`.
pub fn verify_signature(
    digest: &[u8; 32],
    signature: &[u8; 65],
    expected: &[u8; 20],
) -> AuthResult<bool> {
    Ok(recover_signer(digest, signature)? == *expected)
}

/// EIP-55 mixed-case checksum encoding of an address.
pub fn checksum_address(address: &[u8; 20]) -> String {
    let hex_addr = hex::encode(address);
    let hash = hex::encode(keccak256(hex_addr.as_bytes()));

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in hex_addr.chars().zip(hash.chars()) {
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap() >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
