use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::hiring::error::HiringError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};

/// Withdrawal is allowed while `now - applied_at` stays within this window.
pub const WITHDRAWAL_WINDOW_MINUTES: i64 = 60;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub String);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingStatus {
    Pending,
    Open,
    Closed,
    Rejected,
}

impl PostingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PostingStatus::Pending => "Pending",
            PostingStatus::Open => "Open",
            PostingStatus::Closed => "Closed",
            PostingStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicantStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "Pending",
            ApplicantStatus::Shortlisted => "Shortlisted",
            ApplicantStatus::Rejected => "Rejected",
        }
    }
}

/// Denormalized flags mirrored from the meeting and offer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicantFlag {
    InterviewScheduled,
    InterviewCompleted,
    OfferLetter,
}

/// One freelancer's application to one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub freelancer_id: FreelancerId,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicantStatus,
    pub interview_scheduled: bool,
    pub interview_completed: bool,
    pub offer_letter: bool,
}

impl Applicant {
    pub fn new(freelancer_id: FreelancerId, applied_at: DateTime<Utc>) -> Self {
        Self {
            freelancer_id,
            applied_at,
            status: ApplicantStatus::Pending,
            interview_scheduled: false,
            interview_completed: false,
            offer_letter: false,
        }
    }

    pub fn withdrawal_deadline(&self) -> DateTime<Utc> {
        self.applied_at + Duration::minutes(WITHDRAWAL_WINDOW_MINUTES)
    }

    pub fn flag(&self, flag: ApplicantFlag) -> bool {
        match flag {
            ApplicantFlag::InterviewScheduled => self.interview_scheduled,
            ApplicantFlag::InterviewCompleted => self.interview_completed,
            ApplicantFlag::OfferLetter => self.offer_letter,
        }
    }

    pub(crate) fn set_flag(&mut self, flag: ApplicantFlag, value: bool) {
        match flag {
            ApplicantFlag::InterviewScheduled => self.interview_scheduled = value,
            ApplicantFlag::InterviewCompleted => self.interview_completed = value,
            ApplicantFlag::OfferLetter => self.offer_letter = value,
        }
    }
}

/// A job listing and its embedded applicant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    pub client_id: ClientId,
    pub job_code: String,
    pub title: String,
    pub job_type: String,
    pub category: String,
    pub experience: String,
    pub salary: String,
    pub vacancy: String,
    pub location: String,
    pub qualification: String,
    pub description: String,
    pub apply_by_date: DateTime<Utc>,
    pub posted_on: DateTime<Utc>,
    pub status: PostingStatus,
    pub verified_by_admin: bool,
    pub admin_reviewed_on: Option<DateTime<Utc>>,
    pub applicants: Vec<Applicant>,
    pub total_applicants: usize,
}

impl JobPosting {
    pub(crate) fn from_draft(
        id: PostingId,
        client_id: ClientId,
        draft: PostingDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            job_code: draft.job_code.trim().to_string(),
            title: draft.title,
            job_type: draft.job_type,
            category: draft.category,
            experience: draft.experience,
            salary: draft.salary,
            vacancy: draft.vacancy,
            location: draft.location,
            qualification: draft.qualification,
            description: draft.description,
            apply_by_date: draft.apply_by_date,
            posted_on: now,
            status: PostingStatus::Pending,
            verified_by_admin: false,
            admin_reviewed_on: None,
            applicants: Vec::new(),
            total_applicants: 0,
        }
    }

    pub fn is_owned_by(&self, client_id: &ClientId) -> bool {
        &self.client_id == client_id
    }

    pub fn applicant(&self, freelancer_id: &FreelancerId) -> Option<&Applicant> {
        self.applicants
            .iter()
            .find(|applicant| &applicant.freelancer_id == freelancer_id)
    }

    pub(crate) fn applicant_mut(&mut self, freelancer_id: &FreelancerId) -> Option<&mut Applicant> {
        self.applicants
            .iter_mut()
            .find(|applicant| &applicant.freelancer_id == freelancer_id)
    }

    pub(crate) fn recount(&mut self) {
        self.total_applicants = self.applicants.len();
    }

    pub fn summary(&self) -> PostingSummary {
        PostingSummary {
            id: self.id.clone(),
            job_code: self.job_code.clone(),
            title: self.title.clone(),
            job_type: self.job_type.clone(),
            category: self.category.clone(),
            experience: self.experience.clone(),
            salary: self.salary.clone(),
            vacancy: self.vacancy.clone(),
            location: self.location.clone(),
            qualification: self.qualification.clone(),
            description: self.description.clone(),
            apply_by_date: self.apply_by_date,
            posted_on: self.posted_on,
            status: self.status,
            total_applicants: self.total_applicants,
        }
    }
}

/// Public projection of a posting without applicant details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingSummary {
    pub id: PostingId,
    pub job_code: String,
    pub title: String,
    pub job_type: String,
    pub category: String,
    pub experience: String,
    pub salary: String,
    pub vacancy: String,
    pub location: String,
    pub qualification: String,
    pub description: String,
    pub apply_by_date: DateTime<Utc>,
    pub posted_on: DateTime<Utc>,
    pub status: PostingStatus,
    pub total_applicants: usize,
}

/// Client supplied fields for a new posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDraft {
    pub job_code: String,
    pub title: String,
    pub job_type: String,
    pub category: String,
    pub experience: String,
    pub salary: String,
    pub vacancy: String,
    pub location: String,
    pub qualification: String,
    pub description: String,
    pub apply_by_date: DateTime<Utc>,
}

impl PostingDraft {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), HiringError> {
        let required: [(&'static str, &str); 10] = [
            ("job_code", self.job_code.as_str()),
            ("title", self.title.as_str()),
            ("job_type", self.job_type.as_str()),
            ("category", self.category.as_str()),
            ("experience", self.experience.as_str()),
            ("salary", self.salary.as_str()),
            ("vacancy", self.vacancy.as_str()),
            ("location", self.location.as_str()),
            ("qualification", self.qualification.as_str()),
            ("description", self.description.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(HiringError::validation(field, "is required"));
            }
        }
        ensure_future_apply_by(self.apply_by_date, now)
    }
}

/// Partial edit of descriptive fields; status and applicants are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub vacancy: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub apply_by_date: Option<DateTime<Utc>>,
}

impl PostingChanges {
    pub(crate) fn apply_to(
        self,
        posting: &mut JobPosting,
        now: DateTime<Utc>,
    ) -> Result<(), HiringError> {
        if let Some(apply_by_date) = self.apply_by_date {
            ensure_future_apply_by(apply_by_date, now)?;
            posting.apply_by_date = apply_by_date;
        }

        let edits = [
            ("title", self.title, &mut posting.title),
            ("job_type", self.job_type, &mut posting.job_type),
            ("category", self.category, &mut posting.category),
            ("experience", self.experience, &mut posting.experience),
            ("salary", self.salary, &mut posting.salary),
            ("vacancy", self.vacancy, &mut posting.vacancy),
            ("location", self.location, &mut posting.location),
            ("qualification", self.qualification, &mut posting.qualification),
            ("description", self.description, &mut posting.description),
        ];
        for (field, value, target) in edits {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(HiringError::validation(field, "cannot be blank"));
                }
                *target = value;
            }
        }
        Ok(())
    }
}

fn ensure_future_apply_by(
    apply_by_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), HiringError> {
    if apply_by_date <= now {
        return Err(HiringError::validation(
            "apply_by_date",
            "must be in the future",
        ));
    }
    Ok(())
}

/// Row in the admin-wide applicant listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantListing {
    pub posting_id: PostingId,
    pub job_code: String,
    pub job_title: String,
    pub client_id: ClientId,
    pub applicant: Applicant,
}

/// A posting seen from the freelancer who applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedPosting {
    pub posting: PostingSummary,
    pub applied_at: DateTime<Utc>,
    pub application_status: ApplicantStatus,
}
