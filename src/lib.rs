//! Warm storage authorization core
//!
//! Produces the EIP-712 structured signatures a warm storage service
//! contract verifies when a storage provider acts on a client's behalf
//! (creating a data set, adding pieces, scheduling piece removal,
//! deleting a data set), and packs those signatures with auxiliary
//! parameters into the fixed extraData layouts the contract decodes.
//!
//! # Architecture
//!
//! - **eip712**: static type schema registry, canonical type strings and
//!   hashes, and digest computation
//! - **operations**: per-operation builders with input validation
//! - **signer**: local-key and wallet-bridge backends behind one
//!   two-variant interface, plus the digest/signature producer
//! - **abi**: head/tail tuple codec for contract payloads
//! - **extra_data**: the per-operation wire layouts
//! - **auth**: `WarmStorageAuth`, the domain-fixed facade
//!
//! Transport to the storage server, on-chain reads, payment bookkeeping,
//! and content-commitment computation live in the surrounding client, not
//! here. Signing through a wallet bridge can block indefinitely on user
//! interaction; callers needing bounded latency wrap calls with their own
//! timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use warm_storage_auth::{LocalKeySigner, SigningBackend, WarmStorageAuth};
//!
//! let auth = WarmStorageAuth::new(31337, contract_address);
//! let backend = SigningBackend::Local(LocalKeySigner::from_hex(key_hex)?);
//! let sig = auth.delete_data_set(&backend, 12345)?;
//! println!("signature: {}", sig.to_hex());
//! ```

pub mod error;
pub mod abi;
pub mod eip712;
pub mod operations;
pub mod signer;
pub mod extra_data;
pub mod auth;

// Re-export the surface most callers need
pub use auth::{WarmStorageAuth, DOMAIN_NAME, DOMAIN_VERSION};
pub use error::{AuthError, AuthResult};
pub use eip712::{Eip712Domain, TypedDataField};
pub use operations::{
    resolve_pieces, AuthorizationRequest, MetadataEntry, OperationKind, PieceReference,
    PieceResolver,
};
pub use signer::{
    needs_bridge, recover_signer, select_backend, sign_request, verify_signature, AuthSignature,
    BackendKind, BridgeSigner, BridgeTransport, LocalKeySigner, ProviderKind, ProviderShape,
    SignerShape, SigningBackend, TransportError,
};
pub use extra_data::{
    decode_add_pieces, decode_create_data_set, encode_add_pieces, encode_add_pieces_hex,
    encode_create_data_set, encode_create_data_set_hex, AddPiecesExtra, CreateDataSetExtra,
};
