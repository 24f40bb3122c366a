//! Job postings and their embedded applicant lists.

pub mod domain;
pub mod repository;
pub mod store;

pub use domain::{
    Applicant, ApplicantFlag, ApplicantListing, ApplicantStatus, AppliedPosting, JobPosting,
    PostingChanges, PostingDraft, PostingId, PostingStatus, PostingSummary,
    WITHDRAWAL_WINDOW_MINUTES,
};
pub use repository::{PostingFilter, PostingRepository};
pub use store::JobPostingStore;
