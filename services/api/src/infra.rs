use hireflow::error::AppError;
use hireflow::workflows::hiring::{
    ClientId, ClientProfile, Clock, FreelancerId, FreelancerProfile, HiringPorts, HiringServices,
    InMemoryDirectory, InMemoryMeetingRepository, InMemoryOfferRepository,
    InMemoryPostingRepository, MailError, Notification, Notifier, NotifyError, OfferDocument,
    OfferLetterContext, OfferMailer, PlainTextOfferRenderer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryServices =
    HiringServices<InMemoryPostingRepository, InMemoryMeetingRepository, InMemoryOfferRepository>;

/// Hiring services over process-local storage.
pub(crate) fn memory_services(
    directory: Arc<InMemoryDirectory>,
    notifier: Arc<dyn Notifier>,
    mailer: Arc<dyn OfferMailer>,
    clock: Arc<dyn Clock>,
) -> MemoryServices {
    HiringServices::new(
        Arc::new(InMemoryPostingRepository::default()),
        Arc::new(InMemoryMeetingRepository::default()),
        Arc::new(InMemoryOfferRepository::default()),
        Arc::new(PlainTextOfferRenderer),
        mailer,
        HiringPorts::new(directory, notifier, clock),
    )
}

/// Delivers notifications to the service log.
#[derive(Default, Clone, Copy)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            user_id = %notification.user_id,
            user_kind = ?notification.user_kind,
            title = %notification.title,
            link = %notification.link,
            "notification delivered"
        );
        Ok(())
    }
}

/// Logs offer letters instead of handing them to a mail relay.
#[derive(Default, Clone, Copy)]
pub(crate) struct LogMailer;

impl OfferMailer for LogMailer {
    fn send(
        &self,
        context: &OfferLetterContext,
        document: &OfferDocument,
    ) -> Result<(), MailError> {
        if !context.candidate_email.contains('@') {
            return Err(MailError::Recipient(context.candidate_email.clone()));
        }
        info!(
            recipient = %context.candidate_email,
            file_name = %document.file_name,
            bytes = document.body.len(),
            "offer letter dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DirectorySeed {
    #[serde(default)]
    pub(crate) freelancers: Vec<FreelancerSeed>,
    #[serde(default)]
    pub(crate) clients: Vec<ClientSeed>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreelancerSeed {
    pub(crate) id: String,
    #[serde(flatten)]
    pub(crate) profile: FreelancerProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClientSeed {
    pub(crate) id: String,
    #[serde(flatten)]
    pub(crate) profile: ClientProfile,
}

impl DirectorySeed {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw)
            .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
    }

    pub(crate) fn into_directory(self) -> InMemoryDirectory {
        let directory = InMemoryDirectory::default();
        for seed in self.freelancers {
            directory.register_freelancer(FreelancerId(seed.id), seed.profile);
        }
        for seed in self.clients {
            directory.register_client(ClientId(seed.id), seed.profile);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hireflow::workflows::hiring::ProfileDirectory;

    #[test]
    fn directory_seed_registers_profiles() {
        let seed = DirectorySeed::from_json(
            r#"{
                "freelancers": [
                    {
                        "id": "freelancer-ada",
                        "full_name": "Ada Lovelace",
                        "email": "ada@example.com"
                    }
                ],
                "clients": [
                    {
                        "id": "client-acme",
                        "full_name": "Wile E. Coyote",
                        "company_name": "Acme Corp",
                        "company_address": null
                    }
                ]
            }"#,
        )
        .expect("seed parses");

        let directory = seed.into_directory();
        let ada = directory
            .freelancer(&FreelancerId("freelancer-ada".to_string()))
            .expect("lookup")
            .expect("registered");
        assert_eq!(ada.email, "ada@example.com");
        let acme = directory
            .client(&ClientId("client-acme".to_string()))
            .expect("lookup")
            .expect("registered");
        assert_eq!(acme.company_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn malformed_seed_is_an_io_error() {
        assert!(matches!(
            DirectorySeed::from_json("{ \"freelancers\": 3 }"),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn log_mailer_refuses_addresses_without_a_domain() {
        let context = OfferLetterContext {
            candidate_name: "Ada Lovelace".to_string(),
            candidate_email: "ada".to_string(),
            company_name: "Acme Corp".to_string(),
            signatory: "Wile E. Coyote".to_string(),
            job_title: "Backend Engineer".to_string(),
            offered_salary: "USD 125k".to_string(),
            joining_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
            message: "Welcome aboard.".to_string(),
            issued_on: chrono::Utc
                .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        };
        let document = OfferDocument {
            file_name: "offer-letter-ada-lovelace.txt".to_string(),
            content_type: "text/plain",
            body: b"letter".to_vec(),
        };

        assert!(matches!(
            LogMailer.send(&context, &document),
            Err(MailError::Recipient(_))
        ));
    }
}
