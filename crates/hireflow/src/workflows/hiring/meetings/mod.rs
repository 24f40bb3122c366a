//! Interview scheduling tied to a (posting, freelancer) pair.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{MeetingChanges, MeetingEvent, MeetingId, MeetingRequest, MeetingStatus};
pub use repository::{MeetingFilter, MeetingRepository};
pub use service::MeetingScheduler;
