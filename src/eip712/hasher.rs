//! EIP-712 digest computation
//!
//! domainSeparator, hashStruct, and the final
//! `keccak256("\x19\x01" || domainSeparator || hashStruct(message))`.

use std::collections::HashMap;

use super::encoder::{encode_value, keccak256};
use super::types::*;

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Canonical signature of the fixed four-field domain struct.
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// The standard domain field list, for embedding in bridge payloads.
pub fn domain_fields() -> Vec<TypedDataField> {
    vec![
        TypedDataField::new("name", "string"),
        TypedDataField::new("version", "string"),
        TypedDataField::new("chainId", "uint256"),
        TypedDataField::new("verifyingContract", "address"),
    ]
}

/// domainSeparator = hashStruct(eip712Domain)
pub fn domain_separator(domain: &Eip712Domain) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
    encoded.extend_from_slice(&keccak256(domain.name.as_bytes()));
    encoded.extend_from_slice(&keccak256(domain.version.as_bytes()));
    encoded.extend_from_slice(&domain.chain_id_bytes());
    let mut contract_word = [0u8; 32];
    contract_word[12..].copy_from_slice(&domain.verifying_contract);
    encoded.extend_from_slice(&contract_word);
    keccak256(&encoded)
}

/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    message: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<[u8; 32], Eip712Error> {
    // encode_value on a struct type already prepends the type hash
    Ok(keccak256(&encode_value(type_name, message, types)?))
}

/// The 32-byte digest that is actually signed.
pub fn typed_data_digest(
    domain: &Eip712Domain,
    primary_type: &str,
    message: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<[u8; 32], Eip712Error> {
    let separator = domain_separator(domain);
    let struct_hash = hash_struct(primary_type, message, types)?;

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&separator);
    data.extend_from_slice(&struct_hash);

    Ok(keccak256(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::schema;
    use serde_json::json;

    fn test_domain() -> Eip712Domain {
        Eip712Domain::new(
            "FilecoinWarmStorageService",
            "1",
            31337,
            crate::eip712::encoder::parse_address("0x5615dEB798BB3E4dFa0139dFa1b3D433Cc23b72f")
                .unwrap(),
        )
    }

    #[test]
    fn test_domain_separator_pinned() {
        assert_eq!(
            hex::encode(domain_separator(&test_domain())),
            "62ef5e11007063d470b2e85638bf452adae7cc646a776144c9ecfc7a9c42a3ba"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        let types = schema::types_for(schema::TYPE_DELETE_DATA_SET).unwrap();
        let message = json!({ "clientDataSetId": "12345" });
        let d1 =
            typed_data_digest(&test_domain(), schema::TYPE_DELETE_DATA_SET, &message, &types)
                .unwrap();
        let d2 =
            typed_data_digest(&test_domain(), schema::TYPE_DELETE_DATA_SET, &message, &types)
                .unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_digest_changes_with_domain() {
        let types = schema::types_for(schema::TYPE_DELETE_DATA_SET).unwrap();
        let message = json!({ "clientDataSetId": "12345" });
        let mut other = test_domain();
        other.chain_id = 1;
        let d1 =
            typed_data_digest(&test_domain(), schema::TYPE_DELETE_DATA_SET, &message, &types)
                .unwrap();
        let d2 = typed_data_digest(&other, schema::TYPE_DELETE_DATA_SET, &message, &types).unwrap();
        assert_ne!(d1, d2);
    }
}
