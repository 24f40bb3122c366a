use crate::workflows::hiring::error::RepositoryError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};

use super::domain::{JobPosting, PostingId, PostingStatus};

/// Selection criteria for posting lookups; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    pub client_id: Option<ClientId>,
    pub status: Option<PostingStatus>,
    pub applicant: Option<FreelancerId>,
}

impl PostingFilter {
    pub fn matches(&self, posting: &JobPosting) -> bool {
        if let Some(client_id) = &self.client_id {
            if &posting.client_id != client_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if posting.status != status {
                return false;
            }
        }
        if let Some(freelancer_id) = &self.applicant {
            if posting.applicant(freelancer_id).is_none() {
                return false;
            }
        }
        true
    }
}

/// Document storage for postings.
///
/// `modify` and `remove_if` are the only write paths after insertion. Both run
/// their closure against the current document as one atomic step; `modify`
/// commits the working copy only when the closure returns `Ok`.
pub trait PostingRepository: Send + Sync {
    /// Fails with `Conflict` when the id or the (client, job code) pair exists.
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError>;

    fn fetch(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError>;

    fn modify<T, E, F>(&self, id: &PostingId, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut JobPosting) -> Result<T, E>,
        E: From<RepositoryError>;

    fn remove_if<E, F>(&self, id: &PostingId, guard: F) -> Result<JobPosting, E>
    where
        F: FnOnce(&JobPosting) -> Result<(), E>,
        E: From<RepositoryError>;

    /// Matching postings ordered by id.
    fn list(&self, filter: &PostingFilter) -> Result<Vec<JobPosting>, RepositoryError>;
}
