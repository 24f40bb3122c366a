use super::common::*;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::workflows::hiring::error::HiringError;
use crate::workflows::hiring::identity::{Actor, FreelancerId};
use crate::workflows::hiring::offers::OfferStatus;
use crate::workflows::hiring::ports::{FreelancerProfile, RecipientKind};
use crate::workflows::hiring::postings::{ApplicantStatus, PostingStatus};

#[test]
fn applying_adds_a_pending_applicant_and_tells_the_client() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");

    let applicant = harness
        .services
        .applications
        .apply(&freelancer(), &posting.id)
        .expect("application accepted");

    assert_eq!(applicant.status, ApplicantStatus::Pending);
    assert_eq!(applicant.applied_at, harness.now());
    assert!(!applicant.interview_scheduled && !applicant.offer_letter);

    let stored = harness.stored(&posting.id);
    assert_eq!(stored.total_applicants, 1);

    let events = harness.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, client().0);
    assert_eq!(events[0].user_kind, RecipientKind::Client);
    assert!(events[0].message.contains("Ada Lovelace"));
}

#[test]
fn applying_twice_is_a_duplicate() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();

    let again = harness.services.applications.apply(&freelancer(), &posting.id);
    assert!(matches!(again, Err(HiringError::Duplicate(_))));
    assert_eq!(harness.stored(&posting.id).total_applicants, 1);
}

#[test]
fn unknown_freelancers_cannot_apply() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");

    let ghost = FreelancerId("freelancer-ghost".to_string());
    let result = harness.services.applications.apply(&ghost, &posting.id);
    assert!(matches!(result, Err(HiringError::NotFound(_))));
    assert_eq!(harness.stored(&posting.id).total_applicants, 0);
    assert!(harness.notifier.events().is_empty());
}

#[test]
fn directory_outage_blocks_applications() {
    let harness = Harness::with_directory(Arc::new(UnavailableDirectory));
    let posting = harness.open_posting(&client(), "BE-001");

    let result = harness.services.applications.apply(&freelancer(), &posting.id);
    assert!(matches!(result, Err(HiringError::Dependency { .. })));
    assert_eq!(harness.stored(&posting.id).total_applicants, 0);
}

#[test]
fn rejected_postings_refuse_applications() {
    let harness = Harness::new();
    let posting = harness.pending_posting(&client(), "BE-001");

    let while_pending = harness.services.applications.apply(&freelancer(), &posting.id);
    assert!(matches!(while_pending, Err(HiringError::InvalidState(_))));

    harness
        .services
        .store
        .transition_status(&posting.id, &admin(), PostingStatus::Rejected, harness.now())
        .expect("admin rejects");

    for candidate in [freelancer(), second_freelancer()] {
        let result = harness.services.applications.apply(&candidate, &posting.id);
        assert!(matches!(result, Err(HiringError::InvalidState(_))));
    }
    assert_eq!(harness.stored(&posting.id).total_applicants, 0);
}

#[test]
fn closed_postings_refuse_applications() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");
    harness
        .services
        .store
        .transition_status(
            &posting.id,
            &Actor::Client(client()),
            PostingStatus::Closed,
            harness.now(),
        )
        .expect("owner closes");

    let result = harness.services.applications.apply(&freelancer(), &posting.id);
    assert!(matches!(result, Err(HiringError::InvalidState(_))));
}

#[test]
fn withdrawal_inside_the_window_removes_the_applicant() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    harness.clock.advance(Duration::minutes(59));

    harness
        .services
        .applications
        .withdraw(&freelancer(), &posting.id)
        .expect("withdrawal inside window");

    let stored = harness.stored(&posting.id);
    assert_eq!(stored.total_applicants, 0);
    assert!(stored.applicant(&freelancer()).is_none());

    let last = harness.notifier.events().pop().expect("client notified");
    assert_eq!(last.title, "Application withdrawn");
}

#[test]
fn withdrawal_at_exactly_sixty_minutes_is_allowed() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    harness.clock.advance(Duration::minutes(60));

    assert!(harness
        .services
        .applications
        .withdraw(&freelancer(), &posting.id)
        .is_ok());
}

#[test]
fn late_withdrawal_fails_and_leaves_the_posting_untouched() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    let before = harness.stored(&posting.id);
    let notified = harness.notifier.events().len();

    harness
        .clock
        .advance(Duration::minutes(60) + Duration::seconds(1));
    let result = harness.services.applications.withdraw(&freelancer(), &posting.id);
    assert_eq!(
        result,
        Err(HiringError::WindowExpired {
            window_minutes: 60,
            elapsed_minutes: 61,
        })
    );

    harness.clock.advance(Duration::seconds(59));
    match harness.services.applications.withdraw(&freelancer(), &posting.id) {
        Err(HiringError::WindowExpired {
            elapsed_minutes, ..
        }) => assert_eq!(elapsed_minutes, 61),
        other => panic!("expected window expiry, got {other:?}"),
    }

    assert_eq!(harness.stored(&posting.id), before);
    assert_eq!(harness.notifier.events().len(), notified);
}

#[test]
fn rejected_applicants_cannot_withdraw_and_reapply() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    harness
        .services
        .applications
        .review(&client(), &posting.id, &freelancer(), ApplicantStatus::Rejected)
        .expect("owner rejects");
    harness.clock.advance(Duration::minutes(5));

    let withdrawal = harness.services.applications.withdraw(&freelancer(), &posting.id);
    assert!(matches!(withdrawal, Err(HiringError::InvalidState(_))));

    let reapply = harness.services.applications.apply(&freelancer(), &posting.id);
    assert!(matches!(reapply, Err(HiringError::Duplicate(_))));

    let stored = harness.stored(&posting.id);
    assert_eq!(stored.total_applicants, 1);
    assert_eq!(
        stored.applicant(&freelancer()).map(|applicant| applicant.status),
        Some(ApplicantStatus::Rejected)
    );
}

#[test]
fn applicants_holding_an_offer_stay_on_the_posting() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    harness
        .services
        .applications
        .review(&client(), &posting.id, &freelancer(), ApplicantStatus::Shortlisted)
        .expect("owner shortlists");
    let offer = harness
        .services
        .offers
        .send_offer(&client(), offer_request(&posting.id, &freelancer()))
        .expect("offer sent");
    harness
        .services
        .offers
        .respond_to_offer(&freelancer(), &offer.id, OfferStatus::Accepted)
        .expect("freelancer accepts");
    harness.clock.advance(Duration::minutes(10));

    let withdrawal = harness.services.applications.withdraw(&freelancer(), &posting.id);
    assert!(matches!(withdrawal, Err(HiringError::InvalidState(_))));

    let stored = harness.stored(&posting.id);
    let applicant = stored.applicant(&freelancer()).expect("applicant kept");
    assert!(applicant.offer_letter);
    assert_eq!(stored.total_applicants, 1);
}

#[test]
fn shortlisted_applicants_may_still_withdraw_inside_the_window() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();
    harness
        .services
        .applications
        .review(&client(), &posting.id, &freelancer(), ApplicantStatus::Shortlisted)
        .expect("owner shortlists");
    harness.clock.advance(Duration::minutes(30));

    harness
        .services
        .applications
        .withdraw(&freelancer(), &posting.id)
        .expect("withdrawal inside window");
    assert_eq!(harness.stored(&posting.id).total_applicants, 0);
}

#[test]
fn withdrawing_without_an_application_is_not_found() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");

    let result = harness.services.applications.withdraw(&freelancer(), &posting.id);
    assert!(matches!(result, Err(HiringError::NotFound(_))));
}

#[test]
fn notification_failures_never_undo_an_application() {
    let harness = Harness::with_notifier(Arc::new(FailingNotifier));
    let posting = harness.open_posting(&client(), "BE-001");

    harness
        .services
        .applications
        .apply(&freelancer(), &posting.id)
        .expect("application survives notifier outage");
    assert_eq!(harness.stored(&posting.id).total_applicants, 1);

    harness
        .services
        .applications
        .withdraw(&freelancer(), &posting.id)
        .expect("withdrawal survives notifier outage");
    assert_eq!(harness.stored(&posting.id).total_applicants, 0);
}

#[test]
fn review_updates_the_applicant_and_tells_the_freelancer() {
    let harness = Harness::new();
    let posting = harness.posting_with_applicant();

    let reviewed = harness
        .services
        .applications
        .review(&client(), &posting.id, &freelancer(), ApplicantStatus::Shortlisted)
        .expect("owner shortlists");
    assert_eq!(reviewed.status, ApplicantStatus::Shortlisted);

    let last = harness.notifier.events().pop().expect("freelancer notified");
    assert_eq!(last.user_kind, RecipientKind::Freelancer);
    assert!(last.message.contains("shortlisted"));

    let stranger = harness.services.applications.review(
        &other_client(),
        &posting.id,
        &freelancer(),
        ApplicantStatus::Rejected,
    );
    assert!(matches!(stranger, Err(HiringError::Unauthorized(_))));
}

fn roster(harness: &Harness, size: usize) -> Vec<FreelancerId> {
    (0..size)
        .map(|index| {
            let id = FreelancerId(format!("freelancer-{index:02}"));
            harness.directory.register_freelancer(
                id.clone(),
                FreelancerProfile {
                    full_name: format!("Candidate {index}"),
                    email: format!("candidate{index}@example.com"),
                },
            );
            id
        })
        .collect()
}

#[test]
fn applicant_count_tracks_random_apply_and_withdraw_sequences() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");
    let candidates = roster(&harness, 6);
    let mut live: HashMap<FreelancerId, DateTime<Utc>> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..300 {
        harness
            .clock
            .advance(Duration::minutes(rng.gen_range(0..25)));
        let candidate = &candidates[rng.gen_range(0..candidates.len())];
        let now = harness.now();

        if rng.gen_bool(0.5) {
            let result = harness.services.applications.apply(candidate, &posting.id);
            if live.contains_key(candidate) {
                assert!(matches!(result, Err(HiringError::Duplicate(_))));
            } else {
                result.expect("fresh application accepted");
                live.insert(candidate.clone(), now);
            }
        } else {
            let result = harness.services.applications.withdraw(candidate, &posting.id);
            match live.get(candidate).copied() {
                None => assert!(matches!(result, Err(HiringError::NotFound(_)))),
                Some(applied_at) if now - applied_at > Duration::minutes(60) => {
                    assert!(matches!(result, Err(HiringError::WindowExpired { .. })));
                }
                Some(_) => {
                    result.expect("withdrawal inside window");
                    live.remove(candidate);
                }
            }
        }

        let stored = harness.stored(&posting.id);
        assert_eq!(stored.total_applicants, stored.applicants.len());
        assert_eq!(stored.total_applicants, live.len());
    }
}

#[test]
fn concurrent_applications_are_all_kept() {
    let harness = Harness::new();
    let posting = harness.open_posting(&client(), "BE-001");
    let candidates = roster(&harness, 16);

    std::thread::scope(|scope| {
        for candidate in &candidates {
            let applications = Arc::clone(&harness.services.applications);
            let posting_id = posting.id.clone();
            scope.spawn(move || {
                applications
                    .apply(candidate, &posting_id)
                    .expect("application accepted");
            });
        }
    });

    let stored = harness.stored(&posting.id);
    assert_eq!(stored.total_applicants, candidates.len());
    for candidate in &candidates {
        assert!(stored.applicant(candidate).is_some());
    }
}
