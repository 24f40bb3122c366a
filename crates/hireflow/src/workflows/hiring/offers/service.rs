use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::workflows::hiring::error::{HiringError, RepositoryError};
use crate::workflows::hiring::identity::{ClientId, FreelancerId};
use crate::workflows::hiring::ports::{ClientProfile, HiringPorts, Notification};
use crate::workflows::hiring::postings::{
    ApplicantFlag, ApplicantStatus, JobPostingStore, PostingId, PostingRepository,
};

use super::document::{OfferDocumentRenderer, OfferLetterContext, OfferMailer};
use super::domain::{
    ClientOfferView, FreelancerOfferView, OfferId, OfferLetter, OfferRequest, OfferStatus,
};
use super::repository::{OfferFilter, OfferRepository};

static OFFER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_offer_id() -> OfferId {
    let id = OFFER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OfferId(format!("offer-{id:06}"))
}

fn duplicate_offer(posting_id: &PostingId, freelancer_id: &FreelancerId) -> HiringError {
    HiringError::Duplicate(format!(
        "an offer for freelancer {freelancer_id} on job posting {posting_id} already exists"
    ))
}

/// One-shot offer workflow, at most one offer per (posting, freelancer).
///
/// The letter is rendered and mailed before anything is stored: a delivery
/// failure leaves no offer behind.
pub struct OfferService<P, O> {
    store: Arc<JobPostingStore<P>>,
    offers: Arc<O>,
    renderer: Arc<dyn OfferDocumentRenderer>,
    mailer: Arc<dyn OfferMailer>,
    ports: HiringPorts,
}

impl<P, O> OfferService<P, O>
where
    P: PostingRepository + 'static,
    O: OfferRepository + 'static,
{
    pub fn new(
        store: Arc<JobPostingStore<P>>,
        offers: Arc<O>,
        renderer: Arc<dyn OfferDocumentRenderer>,
        mailer: Arc<dyn OfferMailer>,
        ports: HiringPorts,
    ) -> Self {
        Self {
            store,
            offers,
            renderer,
            mailer,
            ports,
        }
    }

    fn client_profile(&self, client_id: &ClientId) -> Option<ClientProfile> {
        match self.ports.directory.client(client_id) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(%client_id, error = %err, "client profile lookup failed");
                None
            }
        }
    }

    pub fn send_offer(
        &self,
        client_id: &ClientId,
        request: OfferRequest,
    ) -> Result<OfferLetter, HiringError> {
        request.validate()?;

        let posting = self
            .store
            .posting_for_client(&request.posting_id, client_id)?;
        if self
            .offers
            .find_for_pair(&request.posting_id, &request.freelancer_id)?
            .is_some()
        {
            return Err(duplicate_offer(&request.posting_id, &request.freelancer_id));
        }

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

        let freelancer = self
            .ports
            .directory
            .freelancer(&request.freelancer_id)
            .map_err(|err| HiringError::dependency("profile directory", err))?
            .ok_or_else(|| HiringError::NotFound(format!("freelancer {}", request.freelancer_id)))?;

        let now = self.ports.now();
        let client = self.client_profile(client_id);
        let signatory = client
            .as_ref()
            .map(|profile| profile.full_name.clone())
            .unwrap_or_else(|| client_id.to_string());
        let company_name = client
            .and_then(|profile| profile.company_name)
            .unwrap_or_else(|| signatory.clone());

        let context = OfferLetterContext {
            candidate_name: freelancer.full_name,
            candidate_email: freelancer.email,
            company_name,
            signatory,
            job_title: posting.title.clone(),
            offered_salary: request.offered_salary.clone(),
            joining_date: request.joining_date,
            message: request.message.clone(),
            issued_on: now,
        };
        let document = self
            .renderer
            .render(&context)
            .map_err(|err| HiringError::dependency("offer document renderer", err))?;
        self.mailer
            .send(&context, &document)
            .map_err(|err| HiringError::dependency("offer mailer", err))?;

        let freelancer_id = request.freelancer_id;
        let offer = OfferLetter {
            id: next_offer_id(),
            posting_id: posting.id.clone(),
            freelancer_id: freelancer_id.clone(),
            client_id: client_id.clone(),
            message: request.message,
            offered_salary: request.offered_salary,
            joining_date: request.joining_date,
            status: OfferStatus::Pending,
            sent_on: now,
            responded_on: None,
        };
        let stored = self.offers.insert(offer).map_err(|err| match err {
            RepositoryError::Conflict => duplicate_offer(&posting.id, &freelancer_id),
            other => other.into(),
        })?;
        info!(
            offer_id = %stored.id,
            posting_id = %stored.posting_id,
            freelancer_id = %stored.freelancer_id,
            "offer letter sent"
        );

        if let Err(err) = self.store.sync_applicant_flag(
            &stored.posting_id,
            &stored.freelancer_id,
            ApplicantFlag::OfferLetter,
            true,
        ) {
            warn!(offer_id = %stored.id, error = %err, "applicant offer flag sync failed");
        }

        self.ports.notify(Notification::for_freelancer(
            &stored.freelancer_id,
            "Offer received",
            format!("You received an offer for {}", posting.title),
            format!("/offers/{}", stored.id),
        ));
        Ok(stored)
    }

    /// Accepts or rejects a pending offer addressed to `freelancer_id`.
    pub fn respond_to_offer(
        &self,
        freelancer_id: &FreelancerId,
        offer_id: &OfferId,
        response: OfferStatus,
    ) -> Result<OfferLetter, HiringError> {
        if response == OfferStatus::Pending {
            return Err(HiringError::validation(
                "status",
                "an offer can only be Accepted or Rejected",
            ));
        }

        let not_found = || HiringError::NotFound(format!("offer {offer_id}"));
        let now = self.ports.now();
        let updated = self
            .offers
            .modify(offer_id, |offer| {
                if &offer.freelancer_id != freelancer_id {
                    return Err(not_found());
                }
                if offer.status != OfferStatus::Pending {
                    return Err(HiringError::InvalidState(format!(
                        "offer {offer_id} was already {}",
                        offer.status.label().to_ascii_lowercase()
                    )));
                }
                offer.status = response;
                offer.responded_on = Some(now);
                Ok(offer.clone())
            })
            .map_err(|err| match err {
                HiringError::NotFound(_) => not_found(),
                other => other,
            })?;
        info!(%offer_id, %freelancer_id, status = response.label(), "offer answered");

        let job_title = self
            .store
            .posting(&updated.posting_id)
            .map(|posting| posting.title)
            .unwrap_or_else(|_| updated.posting_id.to_string());
        let name = self
            .ports
            .directory
            .freelancer(freelancer_id)
            .ok()
            .flatten()
            .map(|profile| profile.full_name)
            .unwrap_or_else(|| freelancer_id.to_string());
        self.ports.notify(Notification::for_client(
            &updated.client_id,
            "Offer answered",
            format!(
                "{name} {} your offer for {job_title}",
                response.label().to_ascii_lowercase()
            ),
            format!("/offers/{offer_id}"),
        ));
        Ok(updated)
    }

    pub fn list_for_freelancer(
        &self,
        freelancer_id: &FreelancerId,
        status: Option<OfferStatus>,
    ) -> Result<Vec<FreelancerOfferView>, HiringError> {
        let filter = OfferFilter {
            freelancer_id: Some(freelancer_id.clone()),
            status,
            ..OfferFilter::default()
        };
        let offers = self.offers.list(&filter)?;

        Ok(offers
            .into_iter()
            .map(|offer| {
                let posting = self.store.posting(&offer.posting_id).ok();
                let company = self.client_profile(&offer.client_id);
                FreelancerOfferView {
                    offer_id: offer.id,
                    status: offer.status,
                    sent_on: offer.sent_on,
                    offered_salary: offer.offered_salary,
                    joining_date: offer.joining_date,
                    posting_id: offer.posting_id,
                    job_code: posting.as_ref().map(|p| p.job_code.clone()),
                    job_title: posting.as_ref().map(|p| p.title.clone()),
                    job_type: posting.as_ref().map(|p| p.job_type.clone()),
                    job_category: posting.as_ref().map(|p| p.category.clone()),
                    company_name: company.as_ref().and_then(|c| c.company_name.clone()),
                    company_address: company.and_then(|c| c.company_address),
                }
            })
            .collect())
    }

    pub fn list_for_client(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<ClientOfferView>, HiringError> {
        let filter = OfferFilter {
            client_id: Some(client_id.clone()),
            ..OfferFilter::default()
        };
        let offers = self.offers.list(&filter)?;

        Ok(offers
            .into_iter()
            .map(|offer| {
                let posting = self.store.posting(&offer.posting_id).ok();
                let profile = match self.ports.directory.freelancer(&offer.freelancer_id) {
                    Ok(profile) => profile,
                    Err(err) => {
                        warn!(
                            freelancer_id = %offer.freelancer_id,
                            error = %err,
                            "freelancer profile lookup failed"
                        );
                        None
                    }
                };
                ClientOfferView {
                    offer_id: offer.id,
                    freelancer_id: offer.freelancer_id,
                    full_name: profile.as_ref().map(|p| p.full_name.clone()),
                    email: profile.map(|p| p.email),
                    posting_id: offer.posting_id,
                    job_code: posting.as_ref().map(|p| p.job_code.clone()),
                    job_title: posting.map(|p| p.title),
                    offered_salary: offer.offered_salary,
                    joining_date: offer.joining_date,
                    status: offer.status,
                    sent_on: offer.sent_on,
                    responded_on: offer.responded_on,
                }
            })
            .collect())
    }
}
