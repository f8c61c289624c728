//! extraData wire layouts
//!
//! Packs a signature and auxiliary fields into the ABI tuple the
//! receiving contract decodes. Field order and shape are a fixed wire
//! contract; any change is a new layout, not an extension of the old
//! one. Empty arrays are always encoded explicitly. One encode and one
//! decode function per layout; the decoders mirror the contract side and
//! back the round-trip tests.

use crate::abi::{AbiDecoder, AbiEncoder, AbiType, AbiValue, U256};
use crate::error::{AuthError, AuthResult};
use crate::operations::MetadataEntry;

fn string_array() -> AbiType {
    AbiType::Array(Box::new(AbiType::String))
}

fn nested_string_array() -> AbiType {
    AbiType::Array(Box::new(string_array()))
}

fn create_data_set_layout() -> Vec<AbiType> {
    vec![
        AbiType::Address,
        AbiType::Uint256,
        string_array(),
        string_array(),
        AbiType::Bytes,
    ]
}

fn add_pieces_layout() -> Vec<AbiType> {
    vec![AbiType::Bytes, nested_string_array(), nested_string_array()]
}

fn keys_of(metadata: &[MetadataEntry]) -> AbiValue {
    AbiValue::Array(
        metadata
            .iter()
            .map(|m| AbiValue::String(m.key.clone()))
            .collect(),
    )
}

fn values_of(metadata: &[MetadataEntry]) -> AbiValue {
    AbiValue::Array(
        metadata
            .iter()
            .map(|m| AbiValue::String(m.value.clone()))
            .collect(),
    )
}

/// create-data-set layout:
/// `(address payer, uint256 clientDataSetId, string[] metadataKeys,
///   string[] metadataValues, bytes signature)`
pub fn encode_create_data_set(
    payer: [u8; 20],
    client_data_set_id: u64,
    metadata: &[MetadataEntry],
    signature: &[u8],
) -> AuthResult<Vec<u8>> {
    let values = vec![
        AbiValue::Address(payer),
        AbiValue::uint(client_data_set_id),
        keys_of(metadata),
        values_of(metadata),
        AbiValue::Bytes(signature.to_vec()),
    ];
    Ok(AbiEncoder::encode(&values, &create_data_set_layout())?)
}

/// Decoded form of the create-data-set layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDataSetExtra {
    pub payer: [u8; 20],
    pub client_data_set_id: u64,
    pub metadata_keys: Vec<String>,
    pub metadata_values: Vec<String>,
    pub signature: Vec<u8>,
}

pub fn decode_create_data_set(data: &[u8]) -> AuthResult<CreateDataSetExtra> {
    let decoded = AbiDecoder::decode(data, &create_data_set_layout())?;
    Ok(CreateDataSetExtra {
        payer: field(&decoded, 0)?.as_address().ok_or_else(|| shape("payer"))?,
        client_data_set_id: uint_u64(field(&decoded, 1)?, "clientDataSetId")?,
        metadata_keys: string_vec(field(&decoded, 2)?, "metadataKeys")?,
        metadata_values: string_vec(field(&decoded, 3)?, "metadataValues")?,
        signature: field(&decoded, 4)?
            .as_bytes()
            .ok_or_else(|| shape("signature"))?
            .to_vec(),
    })
}

/// add-pieces layout:
/// `(bytes signature, string[][] metadataKeys, string[][] metadataValues)`
///
/// `metadata` holds one entry list per piece, in piece order.
pub fn encode_add_pieces(metadata: &[Vec<MetadataEntry>], signature: &[u8]) -> AuthResult<Vec<u8>> {
    let keys = AbiValue::Array(metadata.iter().map(|m| keys_of(m)).collect());
    let values = AbiValue::Array(metadata.iter().map(|m| values_of(m)).collect());
    let tuple = vec![AbiValue::Bytes(signature.to_vec()), keys, values];
    Ok(AbiEncoder::encode(&tuple, &add_pieces_layout())?)
}

/// Decoded form of the add-pieces layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPiecesExtra {
    pub signature: Vec<u8>,
    pub metadata_keys: Vec<Vec<String>>,
    pub metadata_values: Vec<Vec<String>>,
}

pub fn decode_add_pieces(data: &[u8]) -> AuthResult<AddPiecesExtra> {
    let decoded = AbiDecoder::decode(data, &add_pieces_layout())?;
    let nested = |value: &AbiValue, name: &str| -> AuthResult<Vec<Vec<String>>> {
        value
            .as_array()
            .ok_or_else(|| shape(name))?
            .iter()
            .map(|inner| string_vec(inner, name))
            .collect()
    };
    Ok(AddPiecesExtra {
        signature: field(&decoded, 0)?
            .as_bytes()
            .ok_or_else(|| shape("signature"))?
            .to_vec(),
        metadata_keys: nested(field(&decoded, 1)?, "metadataKeys")?,
        metadata_values: nested(field(&decoded, 2)?, "metadataValues")?,
    })
}

/// create-data-set layout as a 0x-hex string, ready to embed in a
/// contract invocation or request body.
pub fn encode_create_data_set_hex(
    payer: [u8; 20],
    client_data_set_id: u64,
    metadata: &[MetadataEntry],
    signature: &[u8],
) -> AuthResult<String> {
    let encoded = encode_create_data_set(payer, client_data_set_id, metadata, signature)?;
    Ok(format!("0x{}", hex::encode(encoded)))
}

/// add-pieces layout as a 0x-hex string.
pub fn encode_add_pieces_hex(
    metadata: &[Vec<MetadataEntry>],
    signature: &[u8],
) -> AuthResult<String> {
    let encoded = encode_add_pieces(metadata, signature)?;
    Ok(format!("0x{}", hex::encode(encoded)))
}

fn field<'a>(decoded: &'a [AbiValue], index: usize) -> AuthResult<&'a AbiValue> {
    decoded
        .get(index)
        .ok_or_else(|| AuthError::EncodingFailure(format!("missing tuple field {}", index)))
}

fn uint_u64(value: &AbiValue, name: &str) -> AuthResult<u64> {
    value
        .as_uint()
        .and_then(U256::try_to_u64)
        .ok_or_else(|| AuthError::EncodingFailure(format!("{} out of u64 range", name)))
}

fn string_vec(value: &AbiValue, name: &str) -> AuthResult<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| shape(name))?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(|| shape(name)))
        .collect()
}

fn shape(name: &str) -> AuthError {
    AuthError::EncodingFailure(format!("unexpected shape for {}", name))
}
