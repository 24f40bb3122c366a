use std::sync::Arc;

use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::hiring::error::RepositoryError;
use crate::workflows::hiring::identity::{Actor, AdminId, ClientId, FreelancerId};
use crate::workflows::hiring::meetings::MeetingRequest;
use crate::workflows::hiring::memory::{
    InMemoryDirectory, InMemoryMeetingRepository, InMemoryOfferRepository,
    InMemoryPostingRepository, OutboxMailer, RecordingNotifier,
};
use crate::workflows::hiring::offers::{
    MailError, OfferDocument, OfferLetterContext, OfferMailer, OfferRequest,
    PlainTextOfferRenderer,
};
use crate::workflows::hiring::ports::{
    ClientProfile, DirectoryError, FreelancerProfile, HiringPorts, ManualClock, Notification,
    Notifier, NotifyError, ProfileDirectory,
};
use crate::workflows::hiring::postings::{
    JobPosting, PostingDraft, PostingFilter, PostingId, PostingRepository, PostingStatus,
};
use crate::workflows::hiring::router::{HiringServices, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

pub(super) type MemoryServices =
    HiringServices<InMemoryPostingRepository, InMemoryMeetingRepository, InMemoryOfferRepository>;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub(super) fn client() -> ClientId {
    ClientId("client-acme".to_string())
}

pub(super) fn other_client() -> ClientId {
    ClientId("client-globex".to_string())
}

pub(super) fn freelancer() -> FreelancerId {
    FreelancerId("freelancer-ada".to_string())
}

pub(super) fn second_freelancer() -> FreelancerId {
    FreelancerId("freelancer-grace".to_string())
}

pub(super) fn admin() -> Actor {
    Actor::Admin(AdminId("admin-root".to_string()))
}

pub(super) fn draft(job_code: &str, now: DateTime<Utc>) -> PostingDraft {
    PostingDraft {
        job_code: job_code.to_string(),
        title: "Backend Engineer".to_string(),
        job_type: "Full time".to_string(),
        category: "Engineering".to_string(),
        experience: "3+ years".to_string(),
        salary: "USD 120k".to_string(),
        vacancy: "2".to_string(),
        location: "Remote".to_string(),
        qualification: "BSc or equivalent".to_string(),
        description: "Build and run the billing platform.".to_string(),
        apply_by_date: now + Duration::days(7),
    }
}

/// Services over in-memory adapters with a seeded directory and a manual clock.
pub(super) struct Harness {
    pub(super) services: MemoryServices,
    pub(super) postings: Arc<InMemoryPostingRepository>,
    pub(super) meetings: Arc<InMemoryMeetingRepository>,
    pub(super) offers: Arc<InMemoryOfferRepository>,
    pub(super) directory: Arc<InMemoryDirectory>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) outbox: Arc<OutboxMailer>,
    pub(super) clock: Arc<ManualClock>,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::assemble(None, None, None)
    }

    pub(super) fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self::assemble(Some(notifier), None, None)
    }

    pub(super) fn with_mailer(mailer: Arc<dyn OfferMailer>) -> Self {
        Self::assemble(None, Some(mailer), None)
    }

    pub(super) fn with_directory(directory: Arc<dyn ProfileDirectory>) -> Self {
        Self::assemble(None, None, Some(directory))
    }

    fn assemble(
        notifier: Option<Arc<dyn Notifier>>,
        mailer: Option<Arc<dyn OfferMailer>>,
        directory_override: Option<Arc<dyn ProfileDirectory>>,
    ) -> Self {
        let postings = Arc::new(InMemoryPostingRepository::default());
        let meetings = Arc::new(InMemoryMeetingRepository::default());
        let offers = Arc::new(InMemoryOfferRepository::default());
        let directory = Arc::new(seeded_directory());
        let recorder = Arc::new(RecordingNotifier::default());
        let outbox = Arc::new(OutboxMailer::default());
        let clock = Arc::new(ManualClock::starting_at(start()));

        let ports = HiringPorts::new(
            directory_override.unwrap_or_else(|| directory.clone() as Arc<dyn ProfileDirectory>),
            notifier.unwrap_or_else(|| recorder.clone() as Arc<dyn Notifier>),
            clock.clone(),
        );
        let services = HiringServices::new(
            postings.clone(),
            meetings.clone(),
            offers.clone(),
            Arc::new(PlainTextOfferRenderer),
            mailer.unwrap_or_else(|| outbox.clone() as Arc<dyn OfferMailer>),
            ports,
        );

        Self {
            services,
            postings,
            meetings,
            offers,
            directory,
            notifier: recorder,
            outbox,
            clock,
        }
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        self.services.ports.now()
    }

    pub(super) fn pending_posting(&self, client_id: &ClientId, job_code: &str) -> JobPosting {
        self.services
            .store
            .create_posting(client_id, draft(job_code, self.now()), self.now())
            .expect("posting created")
    }

    pub(super) fn open_posting(&self, client_id: &ClientId, job_code: &str) -> JobPosting {
        let posting = self.pending_posting(client_id, job_code);
        self.services
            .store
            .transition_status(&posting.id, &admin(), PostingStatus::Open, self.now())
            .expect("admin approves posting")
    }

    /// Open posting owned by `client()` with `freelancer()` as an applicant.
    pub(super) fn posting_with_applicant(&self) -> JobPosting {
        let posting = self.open_posting(&client(), "BE-001");
        self.services
            .applications
            .apply(&freelancer(), &posting.id)
            .expect("freelancer applies");
        self.stored(&posting.id)
    }

    pub(super) fn stored(&self, posting_id: &PostingId) -> JobPosting {
        self.postings
            .fetch(posting_id)
            .expect("fetch succeeds")
            .expect("posting present")
    }

    pub(super) fn meeting_request(&self, posting_id: &PostingId) -> MeetingRequest {
        let start_time = self.now() + Duration::days(1);
        MeetingRequest {
            posting_id: posting_id.clone(),
            freelancer_id: freelancer(),
            start_time,
            end_time: start_time + Duration::minutes(45),
            meeting_join_url: "https://meet.example.com/acme-ada".to_string(),
        }
    }
}

pub(super) fn offer_request(posting_id: &PostingId, freelancer_id: &FreelancerId) -> OfferRequest {
    OfferRequest {
        posting_id: posting_id.clone(),
        freelancer_id: freelancer_id.clone(),
        message: "We would love to have you on the team.".to_string(),
        offered_salary: "USD 125k".to_string(),
        joining_date: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
    }
}

fn seeded_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::default();
    directory.register_freelancer(
        freelancer(),
        FreelancerProfile {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        },
    );
    directory.register_freelancer(
        second_freelancer(),
        FreelancerProfile {
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
        },
    );
    directory.register_client(
        client(),
        ClientProfile {
            full_name: "Wile E. Coyote".to_string(),
            company_name: Some("Acme Corp".to_string()),
            company_address: Some("1 Desert Road".to_string()),
        },
    );
    directory
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("push gateway offline".to_string()))
    }
}

pub(super) struct FailingMailer;

impl OfferMailer for FailingMailer {
    fn send(
        &self,
        _context: &OfferLetterContext,
        _document: &OfferDocument,
    ) -> Result<(), MailError> {
        Err(MailError::Transport("smtp relay refused connection".to_string()))
    }
}

pub(super) struct UnavailableDirectory;

impl ProfileDirectory for UnavailableDirectory {
    fn freelancer(&self, _id: &FreelancerId) -> Result<Option<FreelancerProfile>, DirectoryError> {
        Err(DirectoryError::Unavailable("profile service timed out".to_string()))
    }

    fn client(&self, _id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError> {
        Err(DirectoryError::Unavailable("profile service timed out".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl PostingRepository for UnavailableRepository {
    fn insert(&self, _posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &PostingId) -> Result<Option<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify<T, E, F>(&self, _id: &PostingId, _mutation: F) -> Result<T, E>
    where
        F: FnOnce(&mut JobPosting) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn remove_if<E, F>(&self, _id: &PostingId, _guard: F) -> Result<JobPosting, E>
    where
        F: FnOnce(&JobPosting) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn list(&self, _filter: &PostingFilter) -> Result<Vec<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn request(
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match actor {
        Some((id, role)) => builder
            .header(ACTOR_ID_HEADER, id)
            .header(ACTOR_ROLE_HEADER, role),
        None => builder,
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    actor: (&str, &str),
    payload: &Value,
) -> Request<axum::body::Body> {
    request(method, uri, Some(actor))
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request builds")
}

pub(super) fn empty_request(
    method: &str,
    uri: &str,
    actor: (&str, &str),
) -> Request<axum::body::Body> {
    request(method, uri, Some(actor))
        .body(axum::body::Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn assert_error(response: Response, status: StatusCode, kind: &str) -> Value {
    assert_eq!(response.status(), status);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], kind);
    payload
}
