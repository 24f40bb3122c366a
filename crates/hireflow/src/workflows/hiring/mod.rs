//! Job application and hiring lifecycle: postings move through admin review,
//! freelancers apply and withdraw, clients interview and send offers.
//!
//! Postings own their applicant lists. Meetings and offers are separate
//! records that mirror their existence onto applicant flags.

pub mod admin;
pub mod applications;
pub mod error;
pub mod identity;
pub mod meetings;
pub mod memory;
pub mod offers;
pub mod ports;
pub mod postings;
pub mod router;

#[cfg(test)]
mod tests;

pub use admin::{ensure_default_admin, AdminAccount, AdminRegistry, BootstrapOutcome};
pub use applications::ApplicationService;
pub use error::{ErrorKind, HiringError, RepositoryError};
pub use identity::{Actor, AdminId, ClientId, FreelancerId, Role};
pub use meetings::{
    MeetingChanges, MeetingEvent, MeetingFilter, MeetingId, MeetingRepository, MeetingRequest,
    MeetingScheduler, MeetingStatus,
};
pub use memory::{
    InMemoryAdminRegistry, InMemoryDirectory, InMemoryMeetingRepository, InMemoryOfferRepository,
    InMemoryPostingRepository, OutboundMail, OutboxMailer, RecordingNotifier,
};
pub use offers::{
    ClientOfferView, DocumentError, FreelancerOfferView, MailError, OfferDocument,
    OfferDocumentRenderer, OfferFilter, OfferId, OfferLetter, OfferLetterContext, OfferMailer,
    OfferRepository, OfferRequest, OfferService, OfferStatus, PlainTextOfferRenderer,
};
pub use ports::{
    ClientProfile, Clock, DirectoryError, FreelancerProfile, HiringPorts, ManualClock,
    Notification, Notifier, NotifyError, ProfileDirectory, RecipientKind, SystemClock,
};
pub use postings::{
    Applicant, ApplicantFlag, ApplicantListing, ApplicantStatus, AppliedPosting, JobPosting,
    JobPostingStore, PostingChanges, PostingDraft, PostingFilter, PostingId, PostingRepository,
    PostingStatus, PostingSummary, WITHDRAWAL_WINDOW_MINUTES,
};
pub use router::{hiring_router, HiringServices, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
