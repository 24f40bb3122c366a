use std::sync::Arc;

use tracing::info;

use super::error::HiringError;
use super::identity::{ClientId, FreelancerId};
use super::ports::{FreelancerProfile, HiringPorts, Notification};
use super::postings::{
    Applicant, ApplicantStatus, JobPostingStore, PostingId, PostingRepository,
};

/// Apply/withdraw workflow layered over the posting store.
pub struct ApplicationService<P> {
    store: Arc<JobPostingStore<P>>,
    ports: HiringPorts,
}

impl<P> ApplicationService<P>
where
    P: PostingRepository + 'static,
{
    pub fn new(store: Arc<JobPostingStore<P>>, ports: HiringPorts) -> Self {
        Self { store, ports }
    }

    fn resolve_freelancer(
        &self,
        freelancer_id: &FreelancerId,
    ) -> Result<FreelancerProfile, HiringError> {
        self.ports
            .directory
            .freelancer(freelancer_id)
            .map_err(|err| HiringError::dependency("profile directory", err))?
            .ok_or_else(|| HiringError::NotFound(format!("freelancer {freelancer_id}")))
    }

    /// Records an application, then tells the owning client.
    pub fn apply(
        &self,
        freelancer_id: &FreelancerId,
        posting_id: &PostingId,
    ) -> Result<Applicant, HiringError> {
        let profile = self.resolve_freelancer(freelancer_id)?;
        let now = self.ports.now();
        let posting = self.store.add_applicant(posting_id, freelancer_id, now)?;

        info!(
            %posting_id,
            %freelancer_id,
            total_applicants = posting.total_applicants,
            "application recorded"
        );

        self.ports.notify(Notification::for_client(
            &posting.client_id,
            "New application",
            format!("{} applied for {}", profile.full_name, posting.title),
            format!("/jobPost/{}/applicants", posting.id),
        ));

        posting
            .applicant(freelancer_id)
            .cloned()
            .ok_or_else(|| HiringError::NotFound(format!("applicant {freelancer_id}")))
    }

    /// Retracts an application inside the withdrawal window.
    pub fn withdraw(
        &self,
        freelancer_id: &FreelancerId,
        posting_id: &PostingId,
    ) -> Result<(), HiringError> {
        let now = self.ports.now();
        let posting = self.store.remove_applicant(posting_id, freelancer_id, now)?;

        info!(
            %posting_id,
            %freelancer_id,
            total_applicants = posting.total_applicants,
            "application withdrawn"
        );

        let name = self
            .ports
            .directory
            .freelancer(freelancer_id)
            .ok()
            .flatten()
            .map(|profile| profile.full_name)
            .unwrap_or_else(|| freelancer_id.to_string());

        self.ports.notify(Notification::for_client(
            &posting.client_id,
            "Application withdrawn",
            format!("{name} withdrew their application for {}", posting.title),
            format!("/jobPost/{}/applicants", posting.id),
        ));
        Ok(())
    }

    /// Client decision on an applicant; the freelancer is told the outcome.
    pub fn review(
        &self,
        client_id: &ClientId,
        posting_id: &PostingId,
        freelancer_id: &FreelancerId,
        status: ApplicantStatus,
    ) -> Result<Applicant, HiringError> {
        let applicant =
            self.store
                .set_applicant_status(posting_id, freelancer_id, client_id, status)?;

        info!(%posting_id, %freelancer_id, status = status.label(), "applicant reviewed");

        let title = self
            .store
            .posting(posting_id)
            .map(|posting| posting.title)
            .unwrap_or_else(|_| posting_id.to_string());
        self.ports.notify(Notification::for_freelancer(
            freelancer_id,
            "Application update",
            format!(
                "Your application for {title} is now {}",
                status.label().to_ascii_lowercase()
            ),
            format!("/jobPost/{posting_id}"),
        ));

        Ok(applicant)
    }
}
