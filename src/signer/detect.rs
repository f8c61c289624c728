//! Backend selection for opaque signer handles
//!
//! Hosts that hold a concrete key or transport construct a
//! `SigningBackend` directly. When all the host has is an opaque signer
//! object from some wallet library, it describes the object's observable
//! shape here and lets the classifier pick a path. Best effort: the
//! classifier is total, never fails, and defaults to Local.

use tracing::trace;

/// The two signing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Direct in-process signing call.
    Local,
    /// Out-of-process wallet bridge via raw request.
    Bridge,
}

/// What kind of network-access object backs a signer, as far as the host
/// can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// In-page wallet extension reachable by message passing.
    WalletExtension,
    /// Direct HTTP JSON-RPC connection.
    JsonRpcHttp,
    /// Direct WebSocket JSON-RPC connection.
    JsonRpcWebSocket,
    /// Could not be identified as any known kind.
    Unknown,
}

/// Observable shape of a provider.
#[derive(Debug, Clone)]
pub struct ProviderShape {
    pub kind: ProviderKind,
    /// The provider exposes a generic `request(method, params)` entry
    /// point.
    pub has_raw_request: bool,
}

/// Observable shape of an externally supplied signer handle.
#[derive(Debug, Clone, Default)]
pub struct SignerShape {
    /// Set when the handle is a nonce-managing decorator around another
    /// signer.
    pub wraps: Option<Box<SignerShape>>,
    /// The signer is backed directly by an in-process private key.
    pub has_private_key: bool,
    /// The signer's attached network-access object, if any.
    pub provider: Option<ProviderShape>,
}

/// Classify a signer shape into a backend kind.
///
/// Decision order:
/// 1. unwrap nonce-managing decorators;
/// 2. private-key backed signers are Local;
/// 3. no provider means no bridge to reach: Local;
/// 4. wallet-extension providers are Bridge;
/// 5. direct HTTP/WebSocket connections are Local;
/// 6. an unidentified provider with a raw request entry point is Bridge;
/// 7. everything else is Local.
pub fn select_backend(shape: &SignerShape) -> BackendKind {
    let mut signer = shape;
    while let Some(inner) = &signer.wraps {
        signer = inner;
    }

    let kind = if signer.has_private_key {
        BackendKind::Local
    } else {
        match &signer.provider {
            None => BackendKind::Local,
            Some(provider) => match provider.kind {
                ProviderKind::WalletExtension => BackendKind::Bridge,
                ProviderKind::JsonRpcHttp | ProviderKind::JsonRpcWebSocket => BackendKind::Local,
                ProviderKind::Unknown => {
                    if provider.has_raw_request {
                        BackendKind::Bridge
                    } else {
                        BackendKind::Local
                    }
                }
            },
        }
    };

    trace!(?kind, "classified signer shape");
    kind
}

/// Boolean capability flag form of [`select_backend`].
pub fn needs_bridge(shape: &SignerShape) -> bool {
    select_backend(shape) == BackendKind::Bridge
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(kind: ProviderKind, has_raw_request: bool) -> Option<ProviderShape> {
        Some(ProviderShape { kind, has_raw_request })
    }

    #[test]
    fn test_private_key_wins() {
        let shape = SignerShape {
            has_private_key: true,
            provider: provider(ProviderKind::WalletExtension, true),
            ..Default::default()
        };
        assert_eq!(select_backend(&shape), BackendKind::Local);
    }

    #[test]
    fn test_no_provider_is_local() {
        assert_eq!(select_backend(&SignerShape::default()), BackendKind::Local);
    }

    #[test]
    fn test_wallet_extension_is_bridge() {
        let shape = SignerShape {
            provider: provider(ProviderKind::WalletExtension, true),
            ..Default::default()
        };
        assert_eq!(select_backend(&shape), BackendKind::Bridge);
        assert!(needs_bridge(&shape));
    }

    #[test]
    fn test_direct_connections_are_local() {
        for kind in [ProviderKind::JsonRpcHttp, ProviderKind::JsonRpcWebSocket] {
            let shape = SignerShape {
                provider: provider(kind, true),
                ..Default::default()
            };
            assert_eq!(select_backend(&shape), BackendKind::Local);
        }
    }

    #[test]
    fn test_unknown_provider_falls_back_on_raw_request() {
        let with_request = SignerShape {
            provider: provider(ProviderKind::Unknown, true),
            ..Default::default()
        };
        assert_eq!(select_backend(&with_request), BackendKind::Bridge);

        let without = SignerShape {
            provider: provider(ProviderKind::Unknown, false),
            ..Default::default()
        };
        assert_eq!(select_backend(&without), BackendKind::Local);
    }

    #[test]
    fn test_decorators_are_unwrapped() {
        let inner = SignerShape {
            provider: provider(ProviderKind::WalletExtension, true),
            ..Default::default()
        };
        let wrapped = SignerShape {
            wraps: Some(Box::new(SignerShape {
                wraps: Some(Box::new(inner)),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(select_backend(&wrapped), BackendKind::Bridge);
    }
}
