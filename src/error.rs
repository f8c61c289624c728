//! Unified error types for the authorization core
//!
//! Every fallible operation in this crate surfaces one of these variants
//! to the immediate caller; nothing is retried or suppressed internally.

use thiserror::Error;

use crate::abi::AbiError;
use crate::eip712::Eip712Error;
use crate::signer::bridge::TransportError;

/// Errors produced while building, signing, or encoding an authorization.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// An input piece identifier could not be resolved to a valid
    /// content-commitment byte sequence.
    #[error("invalid piece reference: {0}")]
    InvalidPieceReference(String),

    /// The per-piece metadata array length disagrees with the piece array
    /// length. Raised before any signing attempt.
    #[error("metadata length mismatch: {metadata} metadata lists for {pieces} pieces")]
    MetadataLengthMismatch { pieces: usize, metadata: usize },

    /// No usable signer or provider is reachable for the selected path.
    #[error("signing unavailable: {0}")]
    SigningUnavailable(String),

    /// The signing backend declined, including user cancellation on the
    /// bridge path.
    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    /// A structurally invalid value reached an encoder. Unreachable when
    /// upstream validation ran.
    #[error("encoding failure: {0}")]
    EncodingFailure(String),
}

/// Result type alias for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl From<Eip712Error> for AuthError {
    fn from(e: Eip712Error) -> Self {
        AuthError::EncodingFailure(e.to_string())
    }
}

impl From<AbiError> for AuthError {
    fn from(e: AbiError) -> Self {
        AuthError::EncodingFailure(e.to_string())
    }
}

impl From<TransportError> for AuthError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Rejected(msg) => AuthError::SignatureRejected(msg),
            TransportError::Unavailable(msg) => AuthError::SigningUnavailable(msg),
            TransportError::Other(msg) => AuthError::SigningUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_mapping() {
        let rejected: AuthError = TransportError::Rejected("user denied".into()).into();
        assert!(matches!(rejected, AuthError::SignatureRejected(_)));

        let gone: AuthError = TransportError::Unavailable("no provider".into()).into();
        assert!(matches!(gone, AuthError::SigningUnavailable(_)));
    }

    #[test]
    fn test_display_includes_counts() {
        let err = AuthError::MetadataLengthMismatch { pieces: 3, metadata: 2 };
        assert!(err.to_string().contains("2 metadata lists for 3 pieces"));
    }
}
