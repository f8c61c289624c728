//! EIP-712 typed structured data hashing
//!
//! Canonical type strings, type hashes, struct hashing, and the final
//! signing digest for the warm storage authorization operations.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>

pub mod types;
pub mod schema;
pub mod encoder;
pub mod hasher;

pub use types::{Eip712Domain, Eip712Error, TypedDataField};

// registry-level names; the generic helpers stay under encoder::
pub use schema::{encode_type, primary_type_of, type_hash, types_for};
pub use encoder::{keccak256, parse_address};
pub use hasher::{
    domain_fields, domain_separator, hash_struct, typed_data_digest, EIP712_DOMAIN_TYPE,
};
