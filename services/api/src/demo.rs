use crate::infra::memory_services;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use hireflow::error::AppError;
use hireflow::workflows::hiring::{
    Actor, AdminId, ApplicantStatus, ClientId, ClientProfile, FreelancerId, FreelancerProfile,
    HiringError, InMemoryDirectory, ManualClock, MeetingRequest, MeetingStatus, OfferRequest,
    OfferStatus, OutboxMailer, PostingDraft, PostingStatus, RecordingNotifier,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Simulated start of the scenario (RFC 3339); defaults to a fixed Monday morning
    #[arg(long)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Print the rendered offer letter
    #[arg(long)]
    pub(crate) show_letter: bool,
}

fn default_start() -> Result<DateTime<Utc>, AppError> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .ok_or_else(|| HiringError::validation("start", "ambiguous demo start").into())
}

fn seeded_directory(
    client: &ClientId,
    ada: &FreelancerId,
    grace: &FreelancerId,
) -> InMemoryDirectory {
    let directory = InMemoryDirectory::default();
    directory.register_client(
        client.clone(),
        ClientProfile {
            full_name: "Wile E. Coyote".to_string(),
            company_name: Some("Acme Corp".to_string()),
            company_address: Some("1 Desert Road".to_string()),
        },
    );
    directory.register_freelancer(
        ada.clone(),
        FreelancerProfile {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        },
    );
    directory.register_freelancer(
        grace.clone(),
        FreelancerProfile {
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
        },
    );
    directory
}

/// Walks one posting from submission to an accepted offer against in-memory
/// storage and a simulated clock.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = match args.start {
        Some(start) => start,
        None => default_start()?,
    };

    let client = ClientId("client-acme".to_string());
    let ada = FreelancerId("freelancer-ada".to_string());
    let grace = FreelancerId("freelancer-grace".to_string());
    let admin = Actor::Admin(AdminId("admin-demo".to_string()));

    let clock = Arc::new(ManualClock::starting_at(start));
    let notifier = Arc::new(RecordingNotifier::default());
    let outbox = Arc::new(OutboxMailer::default());
    let services = memory_services(
        Arc::new(seeded_directory(&client, &ada, &grace)),
        notifier.clone(),
        outbox.clone(),
        clock.clone(),
    );
    let now = || services.ports.now();

    println!("Hiring lifecycle demo (simulated clock starts {start})");

    let posting = services.store.create_posting(
        &client,
        PostingDraft {
            job_code: "BE-001".to_string(),
            title: "Backend Engineer".to_string(),
            job_type: "Full time".to_string(),
            category: "Engineering".to_string(),
            experience: "3+ years".to_string(),
            salary: "USD 120k".to_string(),
            vacancy: "1".to_string(),
            location: "Remote".to_string(),
            qualification: "BSc or equivalent".to_string(),
            description: "Build and run the billing platform.".to_string(),
            apply_by_date: now() + Duration::days(14),
        },
        now(),
    )?;
    println!(
        "- {} created posting {} ({}) -> {}",
        client,
        posting.id,
        posting.job_code,
        posting.status.label()
    );

    let posting = services
        .store
        .transition_status(&posting.id, &admin, PostingStatus::Open, now())?;
    println!(
        "- admin approved {} -> {} (verified: {})",
        posting.id,
        posting.status.label(),
        posting.verified_by_admin
    );

    for freelancer in [&ada, &grace] {
        services.applications.apply(freelancer, &posting.id)?;
        println!("- {freelancer} applied");
    }

    clock.advance(Duration::minutes(15));
    services.applications.withdraw(&grace, &posting.id)?;
    println!("- {grace} withdrew 15 minutes after applying");

    clock.advance(Duration::minutes(75));
    match services.applications.withdraw(&ada, &posting.id) {
        Err(err @ HiringError::WindowExpired { .. }) => {
            println!("- {ada} tried to withdraw after 90 minutes: {err}")
        }
        Err(err) => return Err(err.into()),
        Ok(()) => println!("- {ada} withdrew unexpectedly late"),
    }

    let applicant = services
        .applications
        .review(&client, &posting.id, &ada, ApplicantStatus::Shortlisted)?;
    println!(
        "- {} marked {}",
        applicant.freelancer_id,
        applicant.status.label()
    );

    let interview_at = now() + Duration::days(1);
    let meeting = services.meetings.schedule(
        &client,
        MeetingRequest {
            posting_id: posting.id.clone(),
            freelancer_id: ada.clone(),
            start_time: interview_at,
            end_time: interview_at + Duration::minutes(45),
            meeting_join_url: "https://meet.example.com/acme-ada".to_string(),
        },
    )?;
    println!(
        "- interview {} booked for {} with {}",
        meeting.id, meeting.start_time, meeting.freelancer_name
    );

    clock.set(meeting.end_time + Duration::minutes(5));
    let meeting = services
        .meetings
        .update_status(&meeting.id, &client, MeetingStatus::Completed)?;
    println!("- interview {} -> {}", meeting.id, meeting.status.label());

    let offer = services.offers.send_offer(
        &client,
        OfferRequest {
            posting_id: posting.id.clone(),
            freelancer_id: ada.clone(),
            message: "We would love to have you on the team.".to_string(),
            offered_salary: "USD 125k".to_string(),
            joining_date: (now() + Duration::days(30)).date_naive(),
        },
    )?;
    println!("- offer {} sent ({})", offer.id, offer.offered_salary);

    for mail in outbox.sent() {
        println!(
            "  mail to {}: {} [{} bytes, {}]",
            mail.recipient,
            mail.subject,
            mail.attachment.body.len(),
            mail.attachment.file_name
        );
        if args.show_letter {
            println!("{}", String::from_utf8_lossy(&mail.attachment.body));
        }
    }

    clock.advance(Duration::hours(4));
    let offer = services
        .offers
        .respond_to_offer(&ada, &offer.id, OfferStatus::Accepted)?;
    println!("- {ada} answered offer {} -> {}", offer.id, offer.status.label());

    let stored = services.store.posting(&posting.id)?;
    println!("\nFinal applicant roster for {}", stored.job_code);
    for applicant in &stored.applicants {
        println!(
            "- {} {} | interview scheduled: {} | completed: {} | offer letter: {}",
            applicant.freelancer_id,
            applicant.status.label(),
            applicant.interview_scheduled,
            applicant.interview_completed,
            applicant.offer_letter
        );
    }

    println!("\nNotifications");
    for event in notifier.events() {
        println!(
            "- [{:?} {}] {}: {}",
            event.user_kind, event.user_id, event.title, event.message
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_to_an_accepted_offer() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }
}
