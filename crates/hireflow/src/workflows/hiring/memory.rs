//! In-process adapters for every hiring port.
//!
//! They back the demo binary and the test suites. Each repository guards its
//! collection with one mutex, which makes `modify` and `remove_if` atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::admin::{AdminAccount, AdminRegistry};
use super::error::RepositoryError;
use super::identity::{ClientId, FreelancerId};
use super::meetings::{MeetingEvent, MeetingFilter, MeetingId, MeetingRepository};
use super::offers::{
    MailError, OfferDocument, OfferFilter, OfferId, OfferLetter, OfferLetterContext, OfferMailer,
    OfferRepository,
};
use super::ports::{
    ClientProfile, DirectoryError, FreelancerProfile, Notification, Notifier, NotifyError,
    ProfileDirectory,
};
use super::postings::{JobPosting, PostingFilter, PostingId, PostingRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub struct InMemoryPostingRepository {
    postings: Arc<Mutex<BTreeMap<PostingId, JobPosting>>>,
}

impl PostingRepository for InMemoryPostingRepository {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.postings)?;
        let code_taken = guard.values().any(|existing| {
            existing.client_id == posting.client_id && existing.job_code == posting.job_code
        });
        if code_taken || guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn fetch(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(lock(&self.postings)?.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &PostingId, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut JobPosting) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.postings)?;
        let current = guard.get(id).ok_or(RepositoryError::NotFound)?;
        let mut working = current.clone();
        let outcome = mutation(&mut working)?;
        guard.insert(id.clone(), working);
        Ok(outcome)
    }

    fn remove_if<E, F>(&self, id: &PostingId, check: F) -> Result<JobPosting, E>
    where
        F: FnOnce(&JobPosting) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.postings)?;
        let current = guard.get(id).ok_or(RepositoryError::NotFound)?;
        check(current)?;
        guard
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    fn list(&self, filter: &PostingFilter) -> Result<Vec<JobPosting>, RepositoryError> {
        Ok(lock(&self.postings)?
            .values()
            .filter(|posting| filter.matches(posting))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMeetingRepository {
    meetings: Arc<Mutex<HashMap<MeetingId, MeetingEvent>>>,
}

impl MeetingRepository for InMemoryMeetingRepository {
    fn insert(&self, meeting: MeetingEvent) -> Result<MeetingEvent, RepositoryError> {
        let mut guard = lock(&self.meetings)?;
        if guard.contains_key(&meeting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(meeting.id.clone(), meeting.clone());
        Ok(meeting)
    }

    fn update(&self, meeting: MeetingEvent) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.meetings)?;
        match guard.get_mut(&meeting.id) {
            Some(slot) => {
                *slot = meeting;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &MeetingId) -> Result<Option<MeetingEvent>, RepositoryError> {
        Ok(lock(&self.meetings)?.get(id).cloned())
    }

    fn remove(&self, id: &MeetingId) -> Result<Option<MeetingEvent>, RepositoryError> {
        Ok(lock(&self.meetings)?.remove(id))
    }

    fn list(&self, filter: &MeetingFilter) -> Result<Vec<MeetingEvent>, RepositoryError> {
        let mut meetings: Vec<MeetingEvent> = lock(&self.meetings)?
            .values()
            .filter(|meeting| filter.matches(meeting))
            .cloned()
            .collect();
        meetings.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(meetings)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryOfferRepository {
    offers: Arc<Mutex<HashMap<OfferId, OfferLetter>>>,
}

impl OfferRepository for InMemoryOfferRepository {
    fn insert(&self, offer: OfferLetter) -> Result<OfferLetter, RepositoryError> {
        let mut guard = lock(&self.offers)?;
        let pair_taken = guard.values().any(|existing| {
            existing.posting_id == offer.posting_id && existing.freelancer_id == offer.freelancer_id
        });
        if pair_taken || guard.contains_key(&offer.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(offer.id.clone(), offer.clone());
        Ok(offer)
    }

    fn fetch(&self, id: &OfferId) -> Result<Option<OfferLetter>, RepositoryError> {
        Ok(lock(&self.offers)?.get(id).cloned())
    }

    fn find_for_pair(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
    ) -> Result<Option<OfferLetter>, RepositoryError> {
        Ok(lock(&self.offers)?
            .values()
            .find(|offer| &offer.posting_id == posting_id && &offer.freelancer_id == freelancer_id)
            .cloned())
    }

    fn modify<T, E, F>(&self, id: &OfferId, mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut OfferLetter) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.offers)?;
        let current = guard.get(id).ok_or(RepositoryError::NotFound)?;
        let mut working = current.clone();
        let outcome = mutation(&mut working)?;
        guard.insert(id.clone(), working);
        Ok(outcome)
    }

    fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferLetter>, RepositoryError> {
        let mut offers: Vec<OfferLetter> = lock(&self.offers)?
            .values()
            .filter(|offer| filter.matches(offer))
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.sent_on.cmp(&a.sent_on).then_with(|| b.id.cmp(&a.id)));
        Ok(offers)
    }
}

/// Admin accounts keyed by e-mail. Credentials are kept only as a presence marker.
#[derive(Default, Clone)]
pub struct InMemoryAdminRegistry {
    accounts: Arc<Mutex<BTreeMap<String, AdminAccount>>>,
}

impl InMemoryAdminRegistry {
    pub fn accounts(&self) -> Vec<AdminAccount> {
        lock(&self.accounts)
            .map(|guard| guard.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl AdminRegistry for InMemoryAdminRegistry {
    fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, RepositoryError> {
        Ok(lock(&self.accounts)?.get(&email.to_ascii_lowercase()).cloned())
    }

    fn create(
        &self,
        account: AdminAccount,
        credential: &str,
    ) -> Result<AdminAccount, RepositoryError> {
        if credential.is_empty() {
            return Err(RepositoryError::Unavailable(
                "refusing to store an empty credential".to_string(),
            ));
        }
        let mut guard = lock(&self.accounts)?;
        let key = account.email.to_ascii_lowercase();
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, account.clone());
        Ok(account)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    freelancers: Arc<Mutex<HashMap<FreelancerId, FreelancerProfile>>>,
    clients: Arc<Mutex<HashMap<ClientId, ClientProfile>>>,
}

impl InMemoryDirectory {
    pub fn register_freelancer(&self, id: FreelancerId, profile: FreelancerProfile) {
        if let Ok(mut guard) = self.freelancers.lock() {
            guard.insert(id, profile);
        }
    }

    pub fn register_client(&self, id: ClientId, profile: ClientProfile) {
        if let Ok(mut guard) = self.clients.lock() {
            guard.insert(id, profile);
        }
    }
}

impl ProfileDirectory for InMemoryDirectory {
    fn freelancer(&self, id: &FreelancerId) -> Result<Option<FreelancerProfile>, DirectoryError> {
        self.freelancers
            .lock()
            .map(|guard| guard.get(id).cloned())
            .map_err(|_| DirectoryError::Unavailable("directory poisoned".to_string()))
    }

    fn client(&self, id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError> {
        self.clients
            .lock()
            .map(|guard| guard.get(id).cloned())
            .map_err(|_| DirectoryError::Unavailable("directory poisoned".to_string()))
    }
}

/// Keeps every delivered notification for later inspection.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|_| NotifyError::Transport("notification log poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub recipient: String,
    pub subject: String,
    pub attachment: OfferDocument,
}

/// Mailer that queues messages instead of sending them.
#[derive(Default, Clone)]
pub struct OutboxMailer {
    sent: Arc<Mutex<Vec<OutboundMail>>>,
}

impl OutboxMailer {
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl OfferMailer for OutboxMailer {
    fn send(
        &self,
        context: &OfferLetterContext,
        document: &OfferDocument,
    ) -> Result<(), MailError> {
        if !context.candidate_email.contains('@') {
            return Err(MailError::Recipient(context.candidate_email.clone()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("outbox poisoned".to_string()))?
            .push(OutboundMail {
                recipient: context.candidate_email.clone(),
                subject: format!("Offer letter: {}", context.job_title),
                attachment: document.clone(),
            });
        Ok(())
    }
}
