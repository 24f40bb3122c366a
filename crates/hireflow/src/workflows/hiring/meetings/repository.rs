use crate::workflows::hiring::error::RepositoryError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};
use crate::workflows::hiring::postings::PostingId;

use super::domain::{MeetingEvent, MeetingId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingFilter {
    pub client_id: Option<ClientId>,
    pub freelancer_id: Option<FreelancerId>,
    pub posting_id: Option<PostingId>,
}

impl MeetingFilter {
    pub fn for_pair(posting_id: &PostingId, freelancer_id: &FreelancerId) -> Self {
        Self {
            posting_id: Some(posting_id.clone()),
            freelancer_id: Some(freelancer_id.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, meeting: &MeetingEvent) -> bool {
        self.client_id
            .as_ref()
            .map_or(true, |client_id| &meeting.client_id == client_id)
            && self
                .freelancer_id
                .as_ref()
                .map_or(true, |freelancer_id| &meeting.freelancer_id == freelancer_id)
            && self
                .posting_id
                .as_ref()
                .map_or(true, |posting_id| &meeting.posting_id == posting_id)
    }
}

/// Storage for interview events.
pub trait MeetingRepository: Send + Sync {
    fn insert(&self, meeting: MeetingEvent) -> Result<MeetingEvent, RepositoryError>;
    /// Replaces an existing meeting; `NotFound` when it was deleted meanwhile.
    fn update(&self, meeting: MeetingEvent) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &MeetingId) -> Result<Option<MeetingEvent>, RepositoryError>;
    fn remove(&self, id: &MeetingId) -> Result<Option<MeetingEvent>, RepositoryError>;
    /// Matching meetings ordered by start time.
    fn list(&self, filter: &MeetingFilter) -> Result<Vec<MeetingEvent>, RepositoryError>;
}
