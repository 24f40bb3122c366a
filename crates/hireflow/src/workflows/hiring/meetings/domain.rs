use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::hiring::error::HiringError;
use crate::workflows::hiring::identity::{ClientId, FreelancerId};
use crate::workflows::hiring::postings::PostingId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(pub String);

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    #[serde(rename = "Not Completed")]
    NotCompleted,
}

impl MeetingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "Scheduled",
            MeetingStatus::Completed => "Completed",
            MeetingStatus::NotCompleted => "Not Completed",
        }
    }
}

/// Interview between a client and one applicant of one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingEvent {
    pub id: MeetingId,
    pub client_id: ClientId,
    pub client_name: String,
    pub freelancer_id: FreelancerId,
    pub freelancer_name: String,
    pub posting_id: PostingId,
    pub job_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub meeting_join_url: String,
    pub status: MeetingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingEvent {
    pub fn is_owned_by(&self, client_id: &ClientId) -> bool {
        &self.client_id == client_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub posting_id: PostingId,
    pub freelancer_id: FreelancerId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub meeting_join_url: String,
}

impl MeetingRequest {
    pub fn validate(&self) -> Result<(), HiringError> {
        ensure_ordered(self.start_time, self.end_time)?;
        ensure_join_url(&self.meeting_join_url)
    }
}

/// Reschedule payload; omitted fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingChanges {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meeting_join_url: Option<String>,
}

impl MeetingChanges {
    pub(crate) fn apply_to(self, meeting: &mut MeetingEvent) -> Result<(), HiringError> {
        let start_time = self.start_time.unwrap_or(meeting.start_time);
        let end_time = self.end_time.unwrap_or(meeting.end_time);
        ensure_ordered(start_time, end_time)?;
        if let Some(url) = &self.meeting_join_url {
            ensure_join_url(url)?;
        }

        meeting.start_time = start_time;
        meeting.end_time = end_time;
        if let Some(url) = self.meeting_join_url {
            meeting.meeting_join_url = url;
        }
        Ok(())
    }
}

fn ensure_ordered(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<(), HiringError> {
    if end_time <= start_time {
        return Err(HiringError::validation(
            "end_time",
            "must be after start_time",
        ));
    }
    Ok(())
}

fn ensure_join_url(url: &str) -> Result<(), HiringError> {
    if url.trim().is_empty() {
        return Err(HiringError::validation("meeting_join_url", "is required"));
    }
    Ok(())
}
