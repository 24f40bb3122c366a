use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::workflows::hiring::error::{HiringError, RepositoryError};
use crate::workflows::hiring::identity::{Actor, ClientId, FreelancerId};
use crate::workflows::hiring::ports::{HiringPorts, Notification};
use crate::workflows::hiring::postings::{
    ApplicantFlag, ApplicantStatus, JobPostingStore, PostingId, PostingRepository,
};

use super::domain::{MeetingChanges, MeetingEvent, MeetingId, MeetingRequest, MeetingStatus};
use super::repository::{MeetingFilter, MeetingRepository};

static MEETING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_meeting_id() -> MeetingId {
    let id = MEETING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MeetingId(format!("mtg-{id:06}"))
}

fn meeting_not_found(id: &MeetingId) -> HiringError {
    HiringError::NotFound(format!("meeting {id}"))
}

/// Interview lifecycle for (posting, freelancer) pairs.
///
/// The meeting records are the source of truth; the applicant interview flags
/// on the posting are a cache kept in step on a best-effort basis.
pub struct MeetingScheduler<P, M> {
    store: Arc<JobPostingStore<P>>,
    meetings: Arc<M>,
    ports: HiringPorts,
}

impl<P, M> MeetingScheduler<P, M>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
{
    pub fn new(store: Arc<JobPostingStore<P>>, meetings: Arc<M>, ports: HiringPorts) -> Self {
        Self {
            store,
            meetings,
            ports,
        }
    }

    fn owned_meeting(
        &self,
        meeting_id: &MeetingId,
        client_id: &ClientId,
    ) -> Result<MeetingEvent, HiringError> {
        let meeting = self
            .meetings
            .fetch(meeting_id)?
            .ok_or_else(|| meeting_not_found(meeting_id))?;
        if !meeting.is_owned_by(client_id) {
            return Err(HiringError::Unauthorized(format!(
                "meeting {meeting_id} belongs to another client"
            )));
        }
        Ok(meeting)
    }

    fn sync_flag(&self, meeting: &MeetingEvent, flag: ApplicantFlag, value: bool) {
        if let Err(err) = self.store.sync_applicant_flag(
            &meeting.posting_id,
            &meeting.freelancer_id,
            flag,
            value,
        ) {
            warn!(
                meeting_id = %meeting.id,
                posting_id = %meeting.posting_id,
                ?flag,
                error = %err,
                "applicant interview flag sync failed"
            );
        }
    }

    fn notify_freelancer(&self, meeting: &MeetingEvent, title: &str, message: String) {
        self.ports.notify(Notification::for_freelancer(
            &meeting.freelancer_id,
            title,
            message,
            format!("/meetings/{}", meeting.id),
        ));
    }

    pub fn schedule(
        &self,
        client_id: &ClientId,
        request: MeetingRequest,
    ) -> Result<MeetingEvent, HiringError> {
        request.validate()?;

        let posting = self.store.posting_for_client(&request.posting_id, client_id)?;

        let freelancer = self
            .ports
            .directory
            .freelancer(&request.freelancer_id)
            .map_err(|err| HiringError::dependency("profile directory", err))?
            .ok_or_else(|| HiringError::NotFound(format!("freelancer {}", request.freelancer_id)))?;

        let applicant = posting.applicant(&request.freelancer_id).ok_or_else(|| {
            HiringError::NotFound(format!(
                "applicant {} on job posting {}",
                request.freelancer_id, posting.id
            ))
        })?;
        if applicant.status == ApplicantStatus::Rejected {
            return Err(HiringError::InvalidState(format!(
                "applicant {} was rejected for job posting {}",
                request.freelancer_id, posting.id
            )));
        }

        let client_name = match self.ports.directory.client(client_id) {
            Ok(Some(profile)) => profile.full_name,
            Ok(None) => client_id.to_string(),
            Err(err) => {
                warn!(%client_id, error = %err, "client profile lookup failed");
                client_id.to_string()
            }
        };

        let now = self.ports.now();
        let meeting = MeetingEvent {
            id: next_meeting_id(),
            client_id: client_id.clone(),
            client_name,
            freelancer_id: request.freelancer_id,
            freelancer_name: freelancer.full_name,
            posting_id: posting.id.clone(),
            job_title: posting.title.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            meeting_join_url: request.meeting_join_url,
            status: MeetingStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let stored = self.meetings.insert(meeting)?;
        info!(
            meeting_id = %stored.id,
            posting_id = %stored.posting_id,
            freelancer_id = %stored.freelancer_id,
            "interview scheduled"
        );

        self.sync_flag(&stored, ApplicantFlag::InterviewScheduled, true);
        self.notify_freelancer(
            &stored,
            "Interview scheduled",
            format!(
                "{} scheduled an interview for {} at {}",
                stored.client_name,
                stored.job_title,
                stored.start_time.to_rfc3339()
            ),
        );
        Ok(stored)
    }

    pub fn reschedule(
        &self,
        meeting_id: &MeetingId,
        client_id: &ClientId,
        changes: MeetingChanges,
    ) -> Result<MeetingEvent, HiringError> {
        let mut meeting = self.owned_meeting(meeting_id, client_id)?;
        changes.apply_to(&mut meeting)?;
        meeting.updated_at = self.ports.now();

        self.meetings.update(meeting.clone()).map_err(|err| match err {
            RepositoryError::NotFound => meeting_not_found(meeting_id),
            other => other.into(),
        })?;
        info!(%meeting_id, start_time = %meeting.start_time, "interview rescheduled");

        self.notify_freelancer(
            &meeting,
            "Interview rescheduled",
            format!(
                "Your interview for {} moved to {}",
                meeting.job_title,
                meeting.start_time.to_rfc3339()
            ),
        );
        Ok(meeting)
    }

    pub fn update_status(
        &self,
        meeting_id: &MeetingId,
        client_id: &ClientId,
        status: MeetingStatus,
    ) -> Result<MeetingEvent, HiringError> {
        let mut meeting = self.owned_meeting(meeting_id, client_id)?;
        meeting.status = status;
        meeting.updated_at = self.ports.now();

        self.meetings.update(meeting.clone()).map_err(|err| match err {
            RepositoryError::NotFound => meeting_not_found(meeting_id),
            other => other.into(),
        })?;
        info!(%meeting_id, status = status.label(), "interview status updated");

        match status {
            MeetingStatus::Completed => {
                self.sync_flag(&meeting, ApplicantFlag::InterviewCompleted, true)
            }
            MeetingStatus::Scheduled => {
                self.sync_flag(&meeting, ApplicantFlag::InterviewScheduled, true)
            }
            MeetingStatus::NotCompleted => {
                self.sync_flag(&meeting, ApplicantFlag::InterviewCompleted, false)
            }
        }
        Ok(meeting)
    }

    /// Cancels an interview and clears the scheduled flag once the pair has no
    /// meetings left.
    pub fn delete(
        &self,
        meeting_id: &MeetingId,
        client_id: &ClientId,
    ) -> Result<MeetingEvent, HiringError> {
        let meeting = self.owned_meeting(meeting_id, client_id)?;
        let removed = self
            .meetings
            .remove(meeting_id)?
            .ok_or_else(|| meeting_not_found(meeting_id))?;
        info!(%meeting_id, posting_id = %removed.posting_id, "interview cancelled");

        let pair = MeetingFilter::for_pair(&removed.posting_id, &removed.freelancer_id);
        let meetings = Arc::clone(&self.meetings);
        let cleared = self.store.clear_interview_flag_if(
            &removed.posting_id,
            &removed.freelancer_id,
            move || match meetings.list(&pair) {
                Ok(remaining) => remaining.is_empty(),
                Err(err) => {
                    warn!(error = %err, "could not count remaining meetings; keeping flag");
                    false
                }
            },
        );
        if let Err(err) = cleared {
            warn!(
                %meeting_id,
                posting_id = %removed.posting_id,
                error = %err,
                "applicant interview flag reset failed"
            );
        }

        self.notify_freelancer(
            &meeting,
            "Interview cancelled",
            format!("Your interview for {} was cancelled", meeting.job_title),
        );
        Ok(removed)
    }

    pub fn list_for_client(&self, actor: &Actor) -> Result<Vec<MeetingEvent>, HiringError> {
        let client_id = actor.as_client()?;
        let filter = MeetingFilter {
            client_id: Some(client_id.clone()),
            ..MeetingFilter::default()
        };
        Ok(self.meetings.list(&filter)?)
    }

    pub fn list_for_freelancer(&self, actor: &Actor) -> Result<Vec<MeetingEvent>, HiringError> {
        let freelancer_id = actor.as_freelancer()?;
        let filter = MeetingFilter {
            freelancer_id: Some(freelancer_id.clone()),
            ..MeetingFilter::default()
        };
        Ok(self.meetings.list(&filter)?)
    }

    pub fn list_all(&self, actor: &Actor) -> Result<Vec<MeetingEvent>, HiringError> {
        actor.as_admin()?;
        Ok(self.meetings.list(&MeetingFilter::default())?)
    }

    /// Fetches a meeting visible to the requester: the owning client, the
    /// invited freelancer, or an admin.
    pub fn get_by_id(
        &self,
        actor: &Actor,
        meeting_id: &MeetingId,
    ) -> Result<MeetingEvent, HiringError> {
        let meeting = self
            .meetings
            .fetch(meeting_id)?
            .ok_or_else(|| meeting_not_found(meeting_id))?;
        let visible = match actor {
            Actor::Admin(_) => true,
            Actor::Client(client_id) => meeting.is_owned_by(client_id),
            Actor::Freelancer(freelancer_id) => &meeting.freelancer_id == freelancer_id,
        };
        if !visible {
            return Err(HiringError::Unauthorized(format!(
                "meeting {meeting_id} is not visible to this {}",
                actor.role().label()
            )));
        }
        Ok(meeting)
    }

    /// Rebuilds the interview flags of every applicant of a posting from the
    /// meeting records. Returns how many applicants changed.
    pub fn reconcile(&self, actor: &Actor, posting_id: &PostingId) -> Result<usize, HiringError> {
        match actor {
            Actor::Admin(_) => {
                self.store.posting(posting_id)?;
            }
            Actor::Client(client_id) => {
                self.store.posting_for_client(posting_id, client_id)?;
            }
            Actor::Freelancer(_) => {
                return Err(HiringError::Unauthorized(
                    "freelancers cannot reconcile interview flags".to_string(),
                ))
            }
        }

        let filter = MeetingFilter {
            posting_id: Some(posting_id.clone()),
            ..MeetingFilter::default()
        };
        let mut flags: BTreeMap<FreelancerId, (bool, bool)> = BTreeMap::new();
        for meeting in self.meetings.list(&filter)? {
            let entry = flags.entry(meeting.freelancer_id).or_insert((false, false));
            entry.0 = true;
            entry.1 |= meeting.status == MeetingStatus::Completed;
        }

        let changed = self.store.apply_interview_flags(posting_id, &flags)?;
        if changed > 0 {
            warn!(%posting_id, changed, "interview flags drifted and were reconciled");
        }
        Ok(changed)
    }
}
