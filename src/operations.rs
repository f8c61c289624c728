//! Operation builders
//!
//! One builder per operation kind. Each validates its inputs, then
//! produces the `{types, message}` pair the hasher and both signing
//! backends consume. Requests are ephemeral: built fresh per call, never
//! persisted, never reused across operations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::eip712::schema;
use crate::eip712::TypedDataField;
use crate::error::{AuthError, AuthResult};

/// A single key/value metadata pair. Order within a metadata list is
/// significant: it is part of the signed value and of the ABI-encoded
/// arrays. Key uniqueness is not enforced at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The raw binary content commitment identifying a unit of stored data.
/// Always the byte form, never the human-readable string encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceReference(Vec<u8>);

impl PieceReference {
    /// Wrap raw commitment bytes. The commitment itself is opaque here;
    /// only the degenerate empty case is rejected.
    pub fn from_bytes(bytes: Vec<u8>) -> AuthResult<Self> {
        if bytes.is_empty() {
            return Err(AuthError::InvalidPieceReference(
                "empty content commitment".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

/// Turns an external piece identifier into raw commitment bytes.
/// Provided by the surrounding client, not implemented here.
pub trait PieceResolver {
    fn resolve(&self, piece: &str) -> Option<Vec<u8>>;
}

/// Resolve a batch of identifiers, failing on the first one the resolver
/// cannot turn into a valid commitment.
pub fn resolve_pieces<S: AsRef<str>>(
    resolver: &dyn PieceResolver,
    pieces: &[S],
) -> AuthResult<Vec<PieceReference>> {
    pieces
        .iter()
        .map(|p| {
            let ident = p.as_ref();
            let bytes = resolver
                .resolve(ident)
                .ok_or_else(|| AuthError::InvalidPieceReference(ident.to_string()))?;
            PieceReference::from_bytes(bytes)
                .map_err(|_| AuthError::InvalidPieceReference(ident.to_string()))
        })
        .collect()
}

/// The closed set of authorized operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    CreateDataSet,
    AddPieces,
    SchedulePieceRemovals,
    DeleteDataSet,
}

impl OperationKind {
    /// The primary typed-data struct name for this operation.
    pub fn primary_type(&self) -> &'static str {
        match self {
            OperationKind::CreateDataSet => schema::TYPE_CREATE_DATA_SET,
            OperationKind::AddPieces => schema::TYPE_ADD_PIECES,
            OperationKind::SchedulePieceRemovals => schema::TYPE_SCHEDULE_PIECE_REMOVALS,
            OperationKind::DeleteDataSet => schema::TYPE_DELETE_DATA_SET,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_type())
    }
}

/// An operation-specific value object ready for hashing and signing.
/// Uint fields are carried as decimal strings and binary fields as 0x-hex
/// so the same message feeds both the local hashing path and the bridge
/// payload.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub kind: OperationKind,
    pub types: HashMap<String, Vec<TypedDataField>>,
    pub message: serde_json::Value,
}

fn metadata_to_json(metadata: &[MetadataEntry]) -> serde_json::Value {
    json!(metadata
        .iter()
        .map(|m| json!({ "key": m.key, "value": m.value }))
        .collect::<Vec<_>>())
}

/// CreateDataSet(clientDataSetId, payee, metadata). No validation beyond
/// type shape.
pub fn create_data_set(
    client_data_set_id: u64,
    payee: [u8; 20],
    metadata: &[MetadataEntry],
) -> AuthResult<AuthorizationRequest> {
    let kind = OperationKind::CreateDataSet;
    Ok(AuthorizationRequest {
        kind,
        types: schema::types_for(kind.primary_type())?,
        message: json!({
            "clientDataSetId": client_data_set_id.to_string(),
            "payee": format!("0x{}", hex::encode(payee)),
            "metadata": metadata_to_json(metadata),
        }),
    })
}

/// AddPieces(clientDataSetId, firstPieceId, pieces, metadata).
///
/// When `metadata` is omitted one empty list per piece is synthesized.
/// When supplied, its length must match the piece count; a mismatch fails
/// before any signing attempt. Each piece's positional index is paired
/// with its metadata list in the nested `pieceMetadata` array.
pub fn add_pieces(
    client_data_set_id: u64,
    first_piece_id: u64,
    pieces: &[PieceReference],
    metadata: Option<Vec<Vec<MetadataEntry>>>,
) -> AuthResult<AuthorizationRequest> {
    let metadata = match metadata {
        Some(m) => {
            if m.len() != pieces.len() {
                return Err(AuthError::MetadataLengthMismatch {
                    pieces: pieces.len(),
                    metadata: m.len(),
                });
            }
            m
        }
        None => vec![Vec::new(); pieces.len()],
    };

    let piece_data: Vec<_> = pieces
        .iter()
        .map(|p| json!({ "data": p.to_hex() }))
        .collect();
    let piece_metadata: Vec<_> = metadata
        .iter()
        .enumerate()
        .map(|(index, entries)| {
            json!({
                "pieceIndex": index.to_string(),
                "metadata": metadata_to_json(entries),
            })
        })
        .collect();

    let kind = OperationKind::AddPieces;
    Ok(AuthorizationRequest {
        kind,
        types: schema::types_for(kind.primary_type())?,
        message: json!({
            "clientDataSetId": client_data_set_id.to_string(),
            "firstPieceId": first_piece_id.to_string(),
            "pieceData": piece_data,
            "pieceMetadata": piece_metadata,
        }),
    })
}

/// SchedulePieceRemovals(clientDataSetId, pieceIds). Operates on already
/// assigned integer piece ids; no resolution involved.
pub fn schedule_piece_removals(
    client_data_set_id: u64,
    piece_ids: &[u64],
) -> AuthResult<AuthorizationRequest> {
    let kind = OperationKind::SchedulePieceRemovals;
    Ok(AuthorizationRequest {
        kind,
        types: schema::types_for(kind.primary_type())?,
        message: json!({
            "clientDataSetId": client_data_set_id.to_string(),
            "pieceIds": piece_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        }),
    })
}

/// DeleteDataSet(clientDataSetId). Single-field struct.
pub fn delete_data_set(client_data_set_id: u64) -> AuthResult<AuthorizationRequest> {
    let kind = OperationKind::DeleteDataSet;
    Ok(AuthorizationRequest {
        kind,
        types: schema::types_for(kind.primary_type())?,
        message: json!({
            "clientDataSetId": client_data_set_id.to_string(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedResolver;

    impl PieceResolver for FixedResolver {
        fn resolve(&self, piece: &str) -> Option<Vec<u8>> {
            match piece {
                "known" => Some(vec![1, 2, 3]),
                "empty" => Some(Vec::new()),
                _ => None,
            }
        }
    }

    fn some_pieces(n: usize) -> Vec<PieceReference> {
        (0..n)
            .map(|i| PieceReference::from_bytes(vec![i as u8 + 1; 39]).unwrap())
            .collect()
    }

    #[test]
    fn test_resolve_pieces() {
        let refs = resolve_pieces(&FixedResolver, &["known"]).unwrap();
        assert_eq!(refs[0].as_bytes(), &[1, 2, 3]);

        let unknown = resolve_pieces(&FixedResolver, &["missing"]);
        assert!(matches!(unknown, Err(AuthError::InvalidPieceReference(_))));

        // a resolver handing back nothing useful is as bad as not resolving
        let empty = resolve_pieces(&FixedResolver, &["empty"]);
        assert!(matches!(empty, Err(AuthError::InvalidPieceReference(_))));
    }

    #[test]
    fn test_add_pieces_metadata_length_mismatch() {
        let pieces = some_pieces(3);
        let result = add_pieces(1, 0, &pieces, Some(vec![Vec::new(), Vec::new()]));
        match result {
            Err(AuthError::MetadataLengthMismatch { pieces: p, metadata: m }) => {
                assert_eq!((p, m), (3, 2));
            }
            other => panic!("expected MetadataLengthMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_add_pieces_synthesizes_empty_metadata() {
        let pieces = some_pieces(2);
        let request = add_pieces(1, 7, &pieces, None).unwrap();
        let piece_metadata = request.message["pieceMetadata"].as_array().unwrap();
        assert_eq!(piece_metadata.len(), 2);
        assert_eq!(piece_metadata[0]["pieceIndex"], "0");
        assert_eq!(piece_metadata[1]["pieceIndex"], "1");
        assert!(piece_metadata[0]["metadata"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_metadata_order_preserved() {
        let entries = vec![
            MetadataEntry::new("z", "1"),
            MetadataEntry::new("a", "2"),
        ];
        let request = create_data_set(1, [0u8; 20], &entries).unwrap();
        let metadata = request.message["metadata"].as_array().unwrap();
        assert_eq!(metadata[0]["key"], "z");
        assert_eq!(metadata[1]["key"], "a");
    }

    #[test]
    fn test_builders_carry_their_type_subsets() {
        let request = delete_data_set(12345).unwrap();
        assert_eq!(request.types.len(), 1);
        assert_eq!(request.kind.primary_type(), "DeleteDataSet");

        let request = schedule_piece_removals(1, &[1, 3, 5]).unwrap();
        assert_eq!(request.types.len(), 1);
        assert_eq!(
            request.message["pieceIds"].as_array().unwrap().len(),
            3
        );
    }
}
