use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::workflows::hiring::error::{HiringError, RepositoryError};
use crate::workflows::hiring::identity::{Actor, ClientId, FreelancerId, Role};

use super::domain::{
    Applicant, ApplicantFlag, ApplicantListing, ApplicantStatus, AppliedPosting, JobPosting,
    PostingChanges, PostingDraft, PostingId, PostingStatus, WITHDRAWAL_WINDOW_MINUTES,
};
use super::repository::{PostingFilter, PostingRepository};

static POSTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_posting_id() -> PostingId {
    let id = POSTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PostingId(format!("job-{id:06}"))
}

/// Closure failures inside an atomic update, kept apart from storage failures
/// so a missing document can be reported with its id.
enum GuardFailure {
    Rejected(HiringError),
    Storage(RepositoryError),
}

impl From<RepositoryError> for GuardFailure {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<HiringError> for GuardFailure {
    fn from(value: HiringError) -> Self {
        Self::Rejected(value)
    }
}

impl GuardFailure {
    fn into_hiring(self, id: &PostingId) -> HiringError {
        match self {
            GuardFailure::Rejected(error) => error,
            GuardFailure::Storage(RepositoryError::NotFound) => posting_not_found(id),
            GuardFailure::Storage(other) => other.into(),
        }
    }
}

fn posting_not_found(id: &PostingId) -> HiringError {
    HiringError::NotFound(format!("job posting {id}"))
}

fn applicant_not_found(id: &PostingId, freelancer_id: &FreelancerId) -> HiringError {
    HiringError::NotFound(format!("applicant {freelancer_id} on job posting {id}"))
}

fn ensure_owner(posting: &JobPosting, client_id: &ClientId) -> Result<(), HiringError> {
    if posting.is_owned_by(client_id) {
        Ok(())
    } else {
        Err(HiringError::Unauthorized(format!(
            "client {client_id} does not own job posting {}",
            posting.id
        )))
    }
}

/// Validates a status change against the posting state machine.
///
/// Pending -> Open | Rejected belongs to admins; Open <-> Closed belongs to the
/// owning client. Freelancers never transition postings.
fn check_transition(
    posting: &JobPosting,
    actor: &Actor,
    target: PostingStatus,
) -> Result<(), HiringError> {
    use PostingStatus::{Closed, Open, Pending, Rejected};

    if let Actor::Freelancer(_) = actor {
        return Err(HiringError::Unauthorized(
            "freelancers cannot change job posting status".to_string(),
        ));
    }

    let reserved_for = match (posting.status, target) {
        (Pending, Open) | (Pending, Rejected) => Role::Admin,
        (Open, Closed) | (Closed, Open) => Role::Client,
        (from, to) => {
            return Err(HiringError::InvalidTransition {
                entity: "job posting",
                from: from.label(),
                to: to.label(),
            })
        }
    };

    match (reserved_for, actor) {
        (Role::Admin, Actor::Admin(_)) => Ok(()),
        (Role::Client, Actor::Client(client_id)) => ensure_owner(posting, client_id),
        (Role::Admin, _) => Err(HiringError::Unauthorized(format!(
            "only admins may move a job posting to {}",
            target.label()
        ))),
        _ => Err(HiringError::Unauthorized(format!(
            "only the owning client may move a job posting to {}",
            target.label()
        ))),
    }
}

/// Authoritative state of postings and their embedded applicant lists.
///
/// Every write goes through `PostingRepository::modify` or `remove_if`, so
/// guards are evaluated against the same document version they mutate.
pub struct JobPostingStore<P> {
    repository: Arc<P>,
}

impl<P> JobPostingStore<P>
where
    P: PostingRepository + 'static,
{
    pub fn new(repository: Arc<P>) -> Self {
        Self { repository }
    }

    fn guarded<T, F>(&self, id: &PostingId, mutation: F) -> Result<T, HiringError>
    where
        F: FnOnce(&mut JobPosting) -> Result<T, HiringError>,
    {
        self.repository
            .modify(id, |posting| mutation(posting).map_err(GuardFailure::from))
            .map_err(|failure: GuardFailure| failure.into_hiring(id))
    }

    pub fn create_posting(
        &self,
        client_id: &ClientId,
        draft: PostingDraft,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, HiringError> {
        draft.validate(now)?;
        let job_code = draft.job_code.trim().to_string();
        let posting = JobPosting::from_draft(next_posting_id(), client_id.clone(), draft, now);

        let stored = self.repository.insert(posting).map_err(|err| match err {
            RepositoryError::Conflict => HiringError::Duplicate(format!(
                "client {client_id} already has a job posting with code {job_code}"
            )),
            other => other.into(),
        })?;

        info!(posting_id = %stored.id, %client_id, "job posting created pending review");
        Ok(stored)
    }

    pub fn transition_status(
        &self,
        posting_id: &PostingId,
        actor: &Actor,
        target: PostingStatus,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, HiringError> {
        let updated = self.guarded(posting_id, |posting| {
            check_transition(posting, actor, target)?;
            match target {
                PostingStatus::Open if posting.status == PostingStatus::Pending => {
                    posting.verified_by_admin = true;
                    posting.admin_reviewed_on = Some(now);
                }
                PostingStatus::Rejected => {
                    posting.verified_by_admin = false;
                    posting.admin_reviewed_on = Some(now);
                }
                _ => {}
            }
            posting.status = target;
            Ok(posting.clone())
        })?;

        info!(
            %posting_id,
            status = updated.status.label(),
            role = actor.role().label(),
            "job posting status changed"
        );
        Ok(updated)
    }

    pub fn update_posting(
        &self,
        posting_id: &PostingId,
        client_id: &ClientId,
        changes: PostingChanges,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, HiringError> {
        self.guarded(posting_id, |posting| {
            ensure_owner(posting, client_id)?;
            changes.apply_to(posting, now)?;
            Ok(posting.clone())
        })
    }

    pub fn delete_posting(
        &self,
        posting_id: &PostingId,
        client_id: &ClientId,
    ) -> Result<JobPosting, HiringError> {
        let removed = self
            .repository
            .remove_if(posting_id, |posting| {
                ensure_owner(posting, client_id)?;
                if posting.status != PostingStatus::Closed {
                    return Err(GuardFailure::Rejected(HiringError::InvalidState(format!(
                        "only closed job postings can be deleted (status is {})",
                        posting.status.label()
                    ))));
                }
                Ok(())
            })
            .map_err(|failure: GuardFailure| failure.into_hiring(posting_id))?;

        info!(%posting_id, %client_id, "job posting deleted");
        Ok(removed)
    }

    /// Appends a pending applicant; the posting must be open.
    pub fn add_applicant(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, HiringError> {
        self.guarded(posting_id, |posting| {
            if posting.status != PostingStatus::Open {
                return Err(HiringError::InvalidState(format!(
                    "job posting {} is not accepting applications (status is {})",
                    posting.id,
                    posting.status.label()
                )));
            }
            if posting.applicant(freelancer_id).is_some() {
                return Err(HiringError::Duplicate(format!(
                    "freelancer {freelancer_id} already applied to job posting {}",
                    posting.id
                )));
            }
            posting
                .applicants
                .push(Applicant::new(freelancer_id.clone(), now));
            posting.recount();
            Ok(posting.clone())
        })
    }

    /// Removes a live application within the withdrawal window. Rejected
    /// applicants and applicants holding an offer stay on the posting.
    pub fn remove_applicant(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, HiringError> {
        self.guarded(posting_id, |posting| {
            let index = posting
                .applicants
                .iter()
                .position(|applicant| &applicant.freelancer_id == freelancer_id)
                .ok_or_else(|| applicant_not_found(posting_id, freelancer_id))?;

            let applicant = &posting.applicants[index];
            if applicant.status == ApplicantStatus::Rejected || applicant.offer_letter {
                return Err(HiringError::InvalidState(format!(
                    "application of {freelancer_id} to job posting {posting_id} already has a \
                     hiring outcome and cannot be withdrawn"
                )));
            }
            if now > applicant.withdrawal_deadline() {
                let elapsed = now - applicant.applied_at;
                // Partial minutes count as a full minute past the deadline.
                let elapsed_minutes = elapsed.num_minutes()
                    + i64::from(elapsed > chrono::Duration::minutes(elapsed.num_minutes()));
                return Err(HiringError::WindowExpired {
                    window_minutes: WITHDRAWAL_WINDOW_MINUTES,
                    elapsed_minutes,
                });
            }

            posting.applicants.remove(index);
            posting.recount();
            Ok(posting.clone())
        })
    }

    pub fn set_applicant_status(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        client_id: &ClientId,
        status: ApplicantStatus,
    ) -> Result<Applicant, HiringError> {
        if status == ApplicantStatus::Pending {
            return Err(HiringError::validation(
                "status",
                "applicants can only be moved to Shortlisted or Rejected",
            ));
        }

        self.guarded(posting_id, |posting| {
            ensure_owner(posting, client_id)?;
            let applicant = posting
                .applicant_mut(freelancer_id)
                .ok_or_else(|| applicant_not_found(posting_id, freelancer_id))?;
            applicant.status = status;
            Ok(applicant.clone())
        })
    }

    /// Idempotent setter for the meeting/offer mirror flags.
    pub fn sync_applicant_flag(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        flag: ApplicantFlag,
        value: bool,
    ) -> Result<(), HiringError> {
        self.guarded(posting_id, |posting| {
            let applicant = posting
                .applicant_mut(freelancer_id)
                .ok_or_else(|| applicant_not_found(posting_id, freelancer_id))?;
            applicant.set_flag(flag, value);
            Ok(())
        })?;
        debug!(%posting_id, %freelancer_id, ?flag, value, "applicant flag synced");
        Ok(())
    }

    /// Resets `interview_scheduled` when `still_unscheduled` holds at commit time.
    ///
    /// The predicate runs inside the posting's atomic update, so a meeting
    /// created for the pair before the reset is observed and keeps the flag.
    pub fn clear_interview_flag_if<F>(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        still_unscheduled: F,
    ) -> Result<bool, HiringError>
    where
        F: FnOnce() -> bool,
    {
        self.guarded(posting_id, |posting| {
            let applicant = posting
                .applicant_mut(freelancer_id)
                .ok_or_else(|| applicant_not_found(posting_id, freelancer_id))?;
            if !still_unscheduled() {
                return Ok(false);
            }
            applicant.interview_scheduled = false;
            Ok(true)
        })
    }

    /// Overwrites both interview flags for every applicant; applicants missing
    /// from `flags` are reset. Returns how many applicants changed.
    pub fn apply_interview_flags(
        &self,
        posting_id: &PostingId,
        flags: &BTreeMap<FreelancerId, (bool, bool)>,
    ) -> Result<usize, HiringError> {
        self.guarded(posting_id, |posting| {
            let mut changed = 0;
            for applicant in posting.applicants.iter_mut() {
                let (scheduled, completed) = flags
                    .get(&applicant.freelancer_id)
                    .copied()
                    .unwrap_or((false, false));
                if applicant.interview_scheduled != scheduled
                    || applicant.interview_completed != completed
                {
                    applicant.interview_scheduled = scheduled;
                    applicant.interview_completed = completed;
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }

    pub fn posting(&self, posting_id: &PostingId) -> Result<JobPosting, HiringError> {
        self.repository
            .fetch(posting_id)?
            .ok_or_else(|| posting_not_found(posting_id))
    }

    pub fn posting_for_client(
        &self,
        posting_id: &PostingId,
        client_id: &ClientId,
    ) -> Result<JobPosting, HiringError> {
        let posting = self.posting(posting_id)?;
        ensure_owner(&posting, client_id)?;
        Ok(posting)
    }

    pub fn postings_for_client(
        &self,
        client_id: &ClientId,
        status: Option<PostingStatus>,
    ) -> Result<Vec<JobPosting>, HiringError> {
        let filter = PostingFilter {
            client_id: Some(client_id.clone()),
            status,
            ..PostingFilter::default()
        };
        Ok(self.repository.list(&filter)?)
    }

    pub fn open_postings(&self) -> Result<Vec<JobPosting>, HiringError> {
        let filter = PostingFilter {
            status: Some(PostingStatus::Open),
            ..PostingFilter::default()
        };
        Ok(self.repository.list(&filter)?)
    }

    pub fn all_postings(&self) -> Result<Vec<JobPosting>, HiringError> {
        Ok(self.repository.list(&PostingFilter::default())?)
    }

    pub fn applied_postings(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<Vec<AppliedPosting>, HiringError> {
        let filter = PostingFilter {
            applicant: Some(freelancer_id.clone()),
            ..PostingFilter::default()
        };
        let postings = self.repository.list(&filter)?;
        Ok(postings
            .iter()
            .filter_map(|posting| {
                posting.applicant(freelancer_id).map(|applicant| AppliedPosting {
                    posting: posting.summary(),
                    applied_at: applicant.applied_at,
                    application_status: applicant.status,
                })
            })
            .collect())
    }

    pub fn has_applied(
        &self,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
    ) -> Result<bool, HiringError> {
        Ok(self
            .repository
            .fetch(posting_id)?
            .map(|posting| posting.applicant(freelancer_id).is_some())
            .unwrap_or(false))
    }

    pub fn applicants_for_client(
        &self,
        posting_id: &PostingId,
        client_id: &ClientId,
    ) -> Result<Vec<Applicant>, HiringError> {
        Ok(self.posting_for_client(posting_id, client_id)?.applicants)
    }

    pub fn all_applicants(&self) -> Result<Vec<ApplicantListing>, HiringError> {
        let postings = self.repository.list(&PostingFilter::default())?;
        Ok(postings
            .into_iter()
            .flat_map(|posting| {
                let JobPosting {
                    id,
                    client_id,
                    job_code,
                    title,
                    applicants,
                    ..
                } = posting;
                applicants.into_iter().map(move |applicant| ApplicantListing {
                    posting_id: id.clone(),
                    job_code: job_code.clone(),
                    job_title: title.clone(),
                    client_id: client_id.clone(),
                    applicant,
                })
            })
            .collect())
    }
}
