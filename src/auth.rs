//! Authorization facade
//!
//! `WarmStorageAuth` fixes the signing domain once at construction and
//! exposes one method per operation. All methods are single-call
//! request/response; the only state a component instance holds is the
//! immutable domain, so concurrent calls do not interfere.

use tracing::debug;

use crate::eip712::Eip712Domain;
use crate::error::AuthResult;
use crate::operations::{self, MetadataEntry, PieceReference};
use crate::signer::{sign_request, AuthSignature, SigningBackend};

/// Domain name fixed by the verifying contract.
pub const DOMAIN_NAME: &str = "FilecoinWarmStorageService";
/// Domain version fixed by the verifying contract.
pub const DOMAIN_VERSION: &str = "1";

#[derive(Debug, Clone)]
pub struct WarmStorageAuth {
    domain: Eip712Domain,
}

impl WarmStorageAuth {
    /// Component for the service contract at `verifying_contract` on
    /// `chain_id`, with the service's fixed domain name and version.
    pub fn new(chain_id: u64, verifying_contract: [u8; 20]) -> Self {
        Self::with_domain(Eip712Domain::new(
            DOMAIN_NAME,
            DOMAIN_VERSION,
            chain_id,
            verifying_contract,
        ))
    }

    /// Component with a fully caller-supplied domain.
    pub fn with_domain(domain: Eip712Domain) -> Self {
        debug!(name = %domain.name, chain_id = domain.chain_id, "constructed authorization component");
        Self { domain }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Authorize creating a data set for `payee` with the given metadata.
    pub fn create_data_set(
        &self,
        backend: &SigningBackend,
        client_data_set_id: u64,
        payee: [u8; 20],
        metadata: &[MetadataEntry],
    ) -> AuthResult<AuthSignature> {
        let request = operations::create_data_set(client_data_set_id, payee, metadata)?;
        sign_request(&self.domain, backend, &request)
    }

    /// Authorize appending `pieces` starting at `first_piece_id`.
    /// `metadata` is per-piece; omitted metadata means one empty list per
    /// piece.
    pub fn add_pieces(
        &self,
        backend: &SigningBackend,
        client_data_set_id: u64,
        first_piece_id: u64,
        pieces: &[PieceReference],
        metadata: Option<Vec<Vec<MetadataEntry>>>,
    ) -> AuthResult<AuthSignature> {
        let request =
            operations::add_pieces(client_data_set_id, first_piece_id, pieces, metadata)?;
        sign_request(&self.domain, backend, &request)
    }

    /// Authorize scheduling the removal of already assigned piece ids.
    pub fn schedule_piece_removals(
        &self,
        backend: &SigningBackend,
        client_data_set_id: u64,
        piece_ids: &[u64],
    ) -> AuthResult<AuthSignature> {
        let request = operations::schedule_piece_removals(client_data_set_id, piece_ids)?;
        sign_request(&self.domain, backend, &request)
    }

    /// Authorize deleting the data set.
    pub fn delete_data_set(
        &self,
        backend: &SigningBackend,
        client_data_set_id: u64,
    ) -> AuthResult<AuthSignature> {
        let request = operations::delete_data_set(client_data_set_id)?;
        sign_request(&self.domain, backend, &request)
    }
}
