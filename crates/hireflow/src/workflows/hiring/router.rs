use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::applications::ApplicationService;
use super::error::HiringError;
use super::identity::{Actor, FreelancerId, Role};
use super::meetings::{
    MeetingChanges, MeetingId, MeetingRepository, MeetingRequest, MeetingScheduler, MeetingStatus,
};
use super::offers::{
    OfferDocumentRenderer, OfferId, OfferMailer, OfferRepository, OfferRequest, OfferService,
    OfferStatus,
};
use super::ports::HiringPorts;
use super::postings::{
    ApplicantStatus, JobPostingStore, PostingChanges, PostingDraft, PostingId, PostingRepository,
    PostingStatus,
};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Every hiring service wired over one set of repositories.
pub struct HiringServices<P, M, O> {
    pub store: Arc<JobPostingStore<P>>,
    pub applications: Arc<ApplicationService<P>>,
    pub meetings: Arc<MeetingScheduler<P, M>>,
    pub offers: Arc<OfferService<P, O>>,
    pub ports: HiringPorts,
}

impl<P, M, O> Clone for HiringServices<P, M, O> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            applications: Arc::clone(&self.applications),
            meetings: Arc::clone(&self.meetings),
            offers: Arc::clone(&self.offers),
            ports: self.ports.clone(),
        }
    }
}

impl<P, M, O> HiringServices<P, M, O>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    pub fn new(
        postings: Arc<P>,
        meetings: Arc<M>,
        offers: Arc<O>,
        renderer: Arc<dyn OfferDocumentRenderer>,
        mailer: Arc<dyn OfferMailer>,
        ports: HiringPorts,
    ) -> Self {
        let store = Arc::new(JobPostingStore::new(postings));
        Self {
            applications: Arc::new(ApplicationService::new(Arc::clone(&store), ports.clone())),
            meetings: Arc::new(MeetingScheduler::new(
                Arc::clone(&store),
                meetings,
                ports.clone(),
            )),
            offers: Arc::new(OfferService::new(
                Arc::clone(&store),
                offers,
                renderer,
                mailer,
                ports.clone(),
            )),
            store,
            ports,
        }
    }
}

fn unauthenticated(message: &str) -> Response {
    let payload = json!({
        "error": "UnauthenticatedError",
        "message": message,
    });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

/// Reads the identity forwarded by the identity provider.
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let id = header(ACTOR_ID_HEADER)
            .ok_or_else(|| unauthenticated("missing x-actor-id header"))?;
        let role = header(ACTOR_ROLE_HEADER)
            .and_then(Role::parse)
            .ok_or_else(|| unauthenticated("missing or unknown x-actor-role header"))?;

        Ok(Actor::from_parts(id, role))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PostingQuery {
    status: Option<PostingStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OfferQuery {
    status: Option<OfferStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange<T> {
    status: T,
}

/// Router exposing the hiring lifecycle. Callers identify themselves with the
/// `x-actor-id` and `x-actor-role` headers.
pub fn hiring_router<P, M, O>(services: HiringServices<P, M, O>) -> Router
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    Router::new()
        .route("/jobPost", post(create_posting::<P, M, O>))
        .route("/jobPosts", get(list_postings::<P, M, O>))
        .route(
            "/jobPost/:posting_id",
            get(get_posting::<P, M, O>)
                .patch(update_posting::<P, M, O>)
                .delete(delete_posting::<P, M, O>),
        )
        .route(
            "/jobPost/:posting_id/status",
            patch(transition_posting::<P, M, O>),
        )
        .route(
            "/jobPost/:posting_id/apply",
            post(apply::<P, M, O>).delete(withdraw::<P, M, O>),
        )
        .route(
            "/jobPost/:posting_id/applicants",
            get(list_applicants::<P, M, O>),
        )
        .route(
            "/jobPost/:posting_id/applicants/:freelancer_id/status",
            patch(review_applicant::<P, M, O>),
        )
        .route(
            "/jobPost/:posting_id/reconcile",
            post(reconcile_flags::<P, M, O>),
        )
        .route("/applications", get(applied_postings::<P, M, O>))
        .route("/admin/applicants", get(all_applicants::<P, M, O>))
        .route(
            "/meetings",
            post(schedule_meeting::<P, M, O>).get(list_meetings::<P, M, O>),
        )
        .route(
            "/meetings/:meeting_id",
            get(get_meeting::<P, M, O>)
                .patch(reschedule_meeting::<P, M, O>)
                .delete(delete_meeting::<P, M, O>),
        )
        .route(
            "/meetings/:meeting_id/status",
            patch(meeting_status::<P, M, O>),
        )
        .route(
            "/offers",
            post(send_offer::<P, M, O>).get(list_offers::<P, M, O>),
        )
        .route(
            "/offers/:offer_id/respond",
            post(respond_to_offer::<P, M, O>),
        )
        .with_state(services)
}

type Services<P, M, O> = State<HiringServices<P, M, O>>;

pub(crate) async fn create_posting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Json(draft): Json<PostingDraft>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let posting = services
        .store
        .create_posting(client_id, draft, services.ports.now())?;
    Ok((StatusCode::CREATED, Json(posting)).into_response())
}

async fn list_postings<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Query(query): Query<PostingQuery>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let response = match &actor {
        Actor::Admin(_) => {
            let mut postings = services.store.all_postings()?;
            if let Some(status) = query.status {
                postings.retain(|posting| posting.status == status);
            }
            Json(postings).into_response()
        }
        Actor::Client(client_id) => {
            Json(services.store.postings_for_client(client_id, query.status)?).into_response()
        }
        Actor::Freelancer(_) => {
            let summaries: Vec<_> = services
                .store
                .open_postings()?
                .iter()
                .map(|posting| posting.summary())
                .collect();
            Json(summaries).into_response()
        }
    };
    Ok(response)
}

async fn get_posting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let posting_id = PostingId(posting_id);
    let response = match &actor {
        Actor::Admin(_) => Json(services.store.posting(&posting_id)?).into_response(),
        Actor::Client(client_id) => {
            Json(services.store.posting_for_client(&posting_id, client_id)?).into_response()
        }
        Actor::Freelancer(freelancer_id) => {
            let posting = services.store.posting(&posting_id)?;
            // Applicants keep access to postings that closed after they applied.
            if posting.status != PostingStatus::Open && posting.applicant(freelancer_id).is_none() {
                return Err(HiringError::NotFound(format!("job posting {posting_id}")));
            }
            Json(posting.summary()).into_response()
        }
    };
    Ok(response)
}

async fn update_posting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
    Json(changes): Json<PostingChanges>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let posting = services.store.update_posting(
        &PostingId(posting_id),
        client_id,
        changes,
        services.ports.now(),
    )?;
    Ok(Json(posting).into_response())
}

async fn transition_posting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
    Json(change): Json<StatusChange<PostingStatus>>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let posting = services.store.transition_status(
        &PostingId(posting_id),
        &actor,
        change.status,
        services.ports.now(),
    )?;
    Ok(Json(posting).into_response())
}

async fn delete_posting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    services
        .store
        .delete_posting(&PostingId(posting_id), client_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn apply<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let freelancer_id = actor.as_freelancer()?;
    let applicant = services
        .applications
        .apply(freelancer_id, &PostingId(posting_id))?;
    Ok((StatusCode::CREATED, Json(applicant)).into_response())
}

async fn withdraw<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let freelancer_id = actor.as_freelancer()?;
    services
        .applications
        .withdraw(freelancer_id, &PostingId(posting_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_applicants<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let applicants = services
        .store
        .applicants_for_client(&PostingId(posting_id), client_id)?;
    Ok(Json(applicants).into_response())
}

async fn review_applicant<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path((posting_id, freelancer_id)): Path<(String, String)>,
    Json(change): Json<StatusChange<ApplicantStatus>>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let applicant = services.applications.review(
        client_id,
        &PostingId(posting_id),
        &FreelancerId(freelancer_id),
        change.status,
    )?;
    Ok(Json(applicant).into_response())
}

async fn reconcile_flags<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let changed = services
        .meetings
        .reconcile(&actor, &PostingId(posting_id))?;
    Ok(Json(json!({ "changed": changed })).into_response())
}

async fn applied_postings<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let freelancer_id = actor.as_freelancer()?;
    Ok(Json(services.store.applied_postings(freelancer_id)?).into_response())
}

async fn all_applicants<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    actor.as_admin()?;
    Ok(Json(services.store.all_applicants()?).into_response())
}

async fn schedule_meeting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Json(request): Json<MeetingRequest>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let meeting = services.meetings.schedule(client_id, request)?;
    Ok((StatusCode::CREATED, Json(meeting)).into_response())
}

async fn list_meetings<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let meetings = match actor.role() {
        Role::Admin => services.meetings.list_all(&actor)?,
        Role::Client => services.meetings.list_for_client(&actor)?,
        Role::Freelancer => services.meetings.list_for_freelancer(&actor)?,
    };
    Ok(Json(meetings).into_response())
}

async fn get_meeting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(meeting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let meeting = services
        .meetings
        .get_by_id(&actor, &MeetingId(meeting_id))?;
    Ok(Json(meeting).into_response())
}

async fn reschedule_meeting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(meeting_id): Path<String>,
    Json(changes): Json<MeetingChanges>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let meeting = services
        .meetings
        .reschedule(&MeetingId(meeting_id), client_id, changes)?;
    Ok(Json(meeting).into_response())
}

async fn meeting_status<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(meeting_id): Path<String>,
    Json(change): Json<StatusChange<MeetingStatus>>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let meeting = services
        .meetings
        .update_status(&MeetingId(meeting_id), client_id, change.status)?;
    Ok(Json(meeting).into_response())
}

async fn delete_meeting<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(meeting_id): Path<String>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let meeting = services
        .meetings
        .delete(&MeetingId(meeting_id), client_id)?;
    Ok(Json(meeting).into_response())
}

async fn send_offer<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Json(request): Json<OfferRequest>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let client_id = actor.as_client()?;
    let offer = services.offers.send_offer(client_id, request)?;
    Ok((StatusCode::CREATED, Json(offer)).into_response())
}

async fn list_offers<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Query(query): Query<OfferQuery>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let response = match &actor {
        Actor::Client(client_id) => {
            Json(services.offers.list_for_client(client_id)?).into_response()
        }
        Actor::Freelancer(freelancer_id) => Json(
            services
                .offers
                .list_for_freelancer(freelancer_id, query.status)?,
        )
        .into_response(),
        Actor::Admin(_) => {
            return Err(HiringError::Unauthorized(
                "offers are listed to their client or freelancer only".to_string(),
            ))
        }
    };
    Ok(response)
}

async fn respond_to_offer<P, M, O>(
    State(services): Services<P, M, O>,
    actor: Actor,
    Path(offer_id): Path<String>,
    Json(change): Json<StatusChange<OfferStatus>>,
) -> Result<Response, HiringError>
where
    P: PostingRepository + 'static,
    M: MeetingRepository + 'static,
    O: OfferRepository + 'static,
{
    let freelancer_id = actor.as_freelancer()?;
    let offer = services
        .offers
        .respond_to_offer(freelancer_id, &OfferId(offer_id), change.status)?;
    Ok(Json(offer).into_response())
}
