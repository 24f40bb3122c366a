use crate::workflows::hiring::error::RepositoryError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};
use crate::workflows::hiring::postings::PostingId;

use super::domain::{OfferId, OfferLetter, OfferStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub client_id: Option<ClientId>,
    pub freelancer_id: Option<FreelancerId>,
    pub status: Option<OfferStatus>,
}

impl OfferFilter {
    pub fn matches(&self, offer: &OfferLetter) -> bool {
        self.client_id
            .as_ref()
            .map_or(true, |client_id| &offer.client_id == client_id)
            && self
                .freelancer_id
                .as_ref()
                .map_or(true, |freelancer_id| &offer.freelancer_id == freelancer_id)
            && self.status.map_or(true, |status| offer.status == status)
    }
}

/// Storage for offer letters. Offers are never deleted.
pub trait OfferRepository: Send + Sync {
    /// Fails with `Conflict` when an offer exists for the same (posting, freelancer).
    fn insert(&self, offer: OfferLetter) -> Result<OfferLetter, RepositoryError>;

    fn fetch(&self, id: &OfferId) -> Result<Option<OfferLetter>, RepositoryError>;

    fn find_for_pair(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<OfferLetter>, RepositoryError>;

    /// Atomic read-modify-write; the change is kept only when `mutation` succeeds.
    fn modify<T, E, F>(&self, id: &OfferId, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut OfferLetter) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Matching offers, most recently sent first.
    fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferLetter>, RepositoryError>;
}
