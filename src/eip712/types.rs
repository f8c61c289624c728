//! EIP-712 type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field in a struct type definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "MetadataEntry[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// The signing domain, fixed at construction and identical for every
/// operation signed by a component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    #[serde(with = "hex_address")]
    pub verifying_contract: [u8; 20],
}

impl Eip712Domain {
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: [u8; 20]) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    /// Chain id as a big-endian 32-byte word.
    pub fn chain_id_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.chain_id.to_be_bytes());
        bytes
    }
}

/// Serde helper: 20-byte address as a 0x-prefixed hex string.
mod hex_address {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(addr: &[u8; 20], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(addr)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 20], D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("address must be 20 bytes"))
    }
}

/// Errors from canonical encoding and hashing.
#[derive(Debug, Clone, Error)]
pub enum Eip712Error {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_serde_roundtrip() {
        let domain = Eip712Domain::new(
            "FilecoinWarmStorageService",
            "1",
            31337,
            [0x56; 20],
        );
        let json = serde_json::to_string(&domain).unwrap();
        assert!(json.contains("\"chainId\":31337"));
        assert!(json.contains("0x5656"));
        let back: Eip712Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, domain);
    }

    #[test]
    fn test_chain_id_bytes() {
        let domain = Eip712Domain::new("t", "1", 31337, [0u8; 20]);
        let bytes = domain.chain_id_bytes();
        assert_eq!(&bytes[30..], &[0x7a, 0x69]);
        assert!(bytes[..24].iter().all(|&b| b == 0));
    }
}
