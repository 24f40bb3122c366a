use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::hiring::error::HiringError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};
use crate::workflows::hiring::postings::PostingId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub String);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferStatus::Pending => "Pending",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Rejected => "Rejected",
        }
    }
}

/// Hiring proposal from a client to one applicant of a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferLetter {
    pub id: OfferId,
    pub posting_id: PostingId,
    pub freelancer_id: FreelancerId,
    pub client_id: ClientId,
    pub message: String,
    pub offered_salary: String,
    pub joining_date: NaiveDate,
    pub status: OfferStatus,
    pub sent_on: DateTime<Utc>,
    pub responded_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRequest {
    pub posting_id: PostingId,
    pub freelancer_id: FreelancerId,
    pub message: String,
    pub offered_salary: String,
    pub joining_date: NaiveDate,
}

impl OfferRequest {
    pub fn validate(&self) -> Result<(), HiringError> {
        if self.message.trim().is_empty() {
            return Err(HiringError::validation("message", "is required"));
        }
        if self.offered_salary.trim().is_empty() {
            return Err(HiringError::validation("offered_salary", "is required"));
        }
        Ok(())
    }
}

/// Offer as listed to the freelancer it is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreelancerOfferView {
    pub offer_id: OfferId,
    pub status: OfferStatus,
    pub sent_on: DateTime<Utc>,
    pub offered_salary: String,
    pub joining_date: NaiveDate,
    pub posting_id: PostingId,
    pub job_code: Option<String>,
    pub job_title: Option<String>,
    pub job_type: Option<String>,
    pub job_category: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
}

/// Offer as listed to the client who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOfferView {
    pub offer_id: OfferId,
    pub freelancer_id: FreelancerId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub posting_id: PostingId,
    pub job_code: Option<String>,
    pub job_title: Option<String>,
    pub offered_salary: String,
    pub joining_date: NaiveDate,
    pub status: OfferStatus,
    pub sent_on: DateTime<Utc>,
    pub responded_on: Option<DateTime<Utc>>,
}
