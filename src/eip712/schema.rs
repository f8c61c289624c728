//! Static schema registry for the authorization operations
//!
//! The typed-data struct definitions are a fixed table; canonical strings
//! and type hashes are pure functions over it. Field order here is part of
//! the wire contract with the verifying contract and must not change.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::encoder;
use super::types::{Eip712Error, TypedDataField};

pub const TYPE_METADATA_ENTRY: &str = "MetadataEntry";
pub const TYPE_CID: &str = "Cid";
pub const TYPE_PIECE_METADATA: &str = "PieceMetadata";
pub const TYPE_CREATE_DATA_SET: &str = "CreateDataSet";
pub const TYPE_ADD_PIECES: &str = "AddPieces";
pub const TYPE_SCHEDULE_PIECE_REMOVALS: &str = "SchedulePieceRemovals";
pub const TYPE_DELETE_DATA_SET: &str = "DeleteDataSet";

/// The fixed struct definitions, in declared field order.
static SCHEMA: &[(&str, &[(&str, &str)])] = &[
    (TYPE_METADATA_ENTRY, &[("key", "string"), ("value", "string")]),
    (TYPE_CID, &[("data", "bytes")]),
    (
        TYPE_PIECE_METADATA,
        &[("pieceIndex", "uint256"), ("metadata", "MetadataEntry[]")],
    ),
    (
        TYPE_CREATE_DATA_SET,
        &[
            ("clientDataSetId", "uint256"),
            ("payee", "address"),
            ("metadata", "MetadataEntry[]"),
        ],
    ),
    (
        TYPE_ADD_PIECES,
        &[
            ("clientDataSetId", "uint256"),
            ("firstPieceId", "uint256"),
            ("pieceData", "Cid[]"),
            ("pieceMetadata", "PieceMetadata[]"),
        ],
    ),
    (
        TYPE_SCHEDULE_PIECE_REMOVALS,
        &[("clientDataSetId", "uint256"), ("pieceIds", "uint256[]")],
    ),
    (TYPE_DELETE_DATA_SET, &[("clientDataSetId", "uint256")]),
];

lazy_static! {
    static ref SCHEMA_TYPES: HashMap<String, Vec<TypedDataField>> = SCHEMA
        .iter()
        .map(|(name, fields)| {
            (
                name.to_string(),
                fields
                    .iter()
                    .map(|(n, t)| TypedDataField::new(n, t))
                    .collect(),
            )
        })
        .collect();
}

/// Canonical type string for a registered type: its own signature followed
/// by all dependent type signatures, lexicographically sorted, each once.
pub fn encode_type(type_name: &str) -> Result<String, Eip712Error> {
    encoder::encode_type(type_name, &SCHEMA_TYPES)
}

/// keccak256 of the canonical type string.
pub fn type_hash(type_name: &str) -> Result<[u8; 32], Eip712Error> {
    encoder::type_hash(type_name, &SCHEMA_TYPES)
}

/// The closed type subset for one operation: the primary type plus every
/// struct it transitively references. This is what gets embedded in an
/// authorization request and in the bridge payload.
pub fn types_for(primary: &str) -> Result<HashMap<String, Vec<TypedDataField>>, Eip712Error> {
    if !SCHEMA_TYPES.contains_key(primary) {
        return Err(Eip712Error::UnknownType(primary.to_string()));
    }
    let deps = encoder::find_type_dependencies(primary, &SCHEMA_TYPES);
    Ok(SCHEMA_TYPES
        .iter()
        .filter(|(name, _)| deps.contains(name.as_str()))
        .map(|(name, fields)| (name.clone(), fields.clone()))
        .collect())
}

/// The one type in a set that no other type references.
pub fn primary_type_of(types: &HashMap<String, Vec<TypedDataField>>) -> Option<String> {
    let referenced: Vec<&str> = types
        .values()
        .flatten()
        .map(|f| encoder::get_base_type(&f.type_name))
        .collect();
    let mut candidates: Vec<&String> = types
        .keys()
        .filter(|name| !referenced.contains(&name.as_str()))
        .collect();
    candidates.sort();
    candidates.first().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_strings() {
        assert_eq!(
            encode_type(TYPE_DELETE_DATA_SET).unwrap(),
            "DeleteDataSet(uint256 clientDataSetId)"
        );
        assert_eq!(
            encode_type(TYPE_CREATE_DATA_SET).unwrap(),
            "CreateDataSet(uint256 clientDataSetId,address payee,MetadataEntry[] metadata)\
             MetadataEntry(string key,string value)"
        );
        // dependents in strict lexicographic order, each exactly once
        assert_eq!(
            encode_type(TYPE_ADD_PIECES).unwrap(),
            "AddPieces(uint256 clientDataSetId,uint256 firstPieceId,Cid[] pieceData,\
             PieceMetadata[] pieceMetadata)Cid(bytes data)MetadataEntry(string key,string value)\
             PieceMetadata(uint256 pieceIndex,MetadataEntry[] metadata)"
        );
        assert_eq!(
            encode_type(TYPE_SCHEDULE_PIECE_REMOVALS).unwrap(),
            "SchedulePieceRemovals(uint256 clientDataSetId,uint256[] pieceIds)"
        );
    }

    #[test]
    fn test_type_hashes_pinned() {
        let cases = [
            (
                TYPE_CREATE_DATA_SET,
                "25ebf20299107c91b4624d5bac3a16d32cabf0db23b450ee09ab7732983b1dc9",
            ),
            (
                TYPE_ADD_PIECES,
                "43bc1d1e097d7c35dde026f24d88fde2a05eedee09379e2c11276174305ff992",
            ),
            (
                TYPE_SCHEDULE_PIECE_REMOVALS,
                "5415701e313bb627e755b16924727217bb356574fe20e7061442c200b0822b22",
            ),
            (
                TYPE_DELETE_DATA_SET,
                "b5d6b3fc97881f05e96958136ac09d7e0bc7cbf17ea92fce7c431d88132d2b58",
            ),
            (
                TYPE_METADATA_ENTRY,
                "d20856dd76daca72c7d233da76c03b33508847cecc71e5fc20ef738b2ef04eb7",
            ),
            (
                TYPE_CID,
                "b133a34cdf83b795869363895c88d1904d84c621b8ee0650bb0b344f1b718238",
            ),
            (
                TYPE_PIECE_METADATA,
                "e5b0c046d30e511a7859ebd167de463746ba8486dc8ea101f6164df83bb41bd8",
            ),
        ];
        for (name, expected) in cases {
            assert_eq!(hex::encode(type_hash(name).unwrap()), expected, "{}", name);
        }
    }

    #[test]
    fn test_types_for_closed_subsets() {
        let delete = types_for(TYPE_DELETE_DATA_SET).unwrap();
        assert_eq!(delete.len(), 1);

        let create = types_for(TYPE_CREATE_DATA_SET).unwrap();
        assert_eq!(create.len(), 2);
        assert!(create.contains_key(TYPE_METADATA_ENTRY));

        let add = types_for(TYPE_ADD_PIECES).unwrap();
        assert_eq!(add.len(), 4);
        assert!(add.contains_key(TYPE_CID));
        assert!(add.contains_key(TYPE_PIECE_METADATA));

        assert!(types_for("NoSuchType").is_err());
    }

    #[test]
    fn test_primary_type_of() {
        let add = types_for(TYPE_ADD_PIECES).unwrap();
        assert_eq!(primary_type_of(&add).unwrap(), TYPE_ADD_PIECES);

        let delete = types_for(TYPE_DELETE_DATA_SET).unwrap();
        assert_eq!(primary_type_of(&delete).unwrap(), TYPE_DELETE_DATA_SET);
    }
}
