mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use bidwork_core::error::CoreError;
use bidwork_core::project::{ManagementType, ProjectStatus};
use bidwork_core::roles::Actor;
use bidwork_lifecycle::LifecycleError;
use common::*;

#[tokio::test]
async fn quote_is_suggested_submitted_rejected_and_resubmitted() {
    let (market, events) = harness();
    seed_specialist(&market, 42, "Dana Reyes", Some("Structural Engineer")).await;
    seed_specialist(&market, 43, "Sam Okafor", Some("MEP Engineer")).await;
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    assert_eq!(project.status, ProjectStatus::QuotePending);

    accepted_bid(&market, project.id, 42, "1000", "0").await;
    accepted_bid(&market, project.id, 43, "1250", "20").await;

    let data = market.quotes.get_quote_data(project.id, &admin()).await.unwrap();
    assert_eq!(data.suggested_amount, money("2500"));
    assert_eq!(data.accepted_bids.len(), 2);
    assert_eq!(data.quoted_amount, None);

    events.clear();
    let submitted = market
        .quotes
        .submit_quote(project.id, money("2400"), Some("Includes site visit".into()), &admin())
        .await
        .unwrap();
    assert_eq!(submitted.status, ProjectStatus::QuoteSubmitted);
    assert_eq!(submitted.quoted_amount, Some(money("2400")));
    let first_submitted_at = submitted.quote_submitted_at.unwrap();

    let rejected = market
        .quotes
        .reject_quote(project.id, Some("too high".into()), &client())
        .await
        .unwrap();
    assert_eq!(rejected.status, ProjectStatus::QuoteRejected);
    assert_eq!(rejected.quote_rejection_reason.as_deref(), Some("too high"));
    assert_eq!(rejected.quote_notes.as_deref(), Some("Includes site visit"));
    assert!(rejected.quote_rejected_at.is_some());

    tokio::time::sleep(Duration::from_millis(5)).await;
    let resubmitted = market
        .quotes
        .submit_quote(project.id, money("2200"), None, &admin())
        .await
        .unwrap();
    assert_eq!(resubmitted.status, ProjectStatus::QuoteSubmitted);
    assert_eq!(resubmitted.quoted_amount, Some(money("2200")));
    assert!(resubmitted.quote_submitted_at.unwrap() > first_submitted_at);
    assert_eq!(resubmitted.quote_rejection_reason, None);
    assert_eq!(resubmitted.quote_rejected_at, None);

    let data = market.quotes.get_quote_data(project.id, &client()).await.unwrap();
    assert_eq!(data.quoted_amount, Some(money("2200")));
    assert_eq!(data.quote_rejection_reason, None);

    assert_eq!(
        events.event_types(),
        vec!["quote.submitted", "quote.rejected", "quote.submitted"]
    );
}

#[tokio::test]
async fn suggested_amount_tracks_bids_accepted_after_submission() {
    let (market, _) = harness();
    seed_specialist(&market, 42, "Dana Reyes", Some("Structural Engineer")).await;
    seed_specialist(&market, 43, "Sam Okafor", Some("MEP Engineer")).await;
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    accepted_bid(&market, project.id, 42, "1000", "10").await;
    market
        .quotes
        .submit_quote(project.id, money("1100"), None, &admin())
        .await
        .unwrap();

    accepted_bid(&market, project.id, 43, "500", "0").await;

    let data = market.quotes.get_quote_data(project.id, &client()).await.unwrap();
    assert_eq!(data.suggested_amount, money("1600"));
    assert_eq!(data.quoted_amount, Some(money("1100")));
}

#[tokio::test]
async fn empty_project_suggests_zero() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    let data = market.quotes.get_quote_data(project.id, &admin()).await.unwrap();
    assert_eq!(data.suggested_amount, money("0"));
    assert!(data.accepted_bids.is_empty());
}

#[tokio::test]
async fn quote_data_is_hidden_from_other_clients() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    let err = market
        .quotes
        .get_quote_data(project.id, &Actor::client(OTHER_CLIENT_ID))
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Forbidden(_)));
}

#[tokio::test]
async fn second_submission_while_pending_is_a_conflict() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    market
        .quotes
        .submit_quote(project.id, money("2400"), None, &admin())
        .await
        .unwrap();

    let err = market
        .quotes
        .submit_quote(project.id, money("2300"), None, &admin())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::QuoteAlreadySubmitted { .. }));
}

#[tokio::test]
async fn submission_outside_quoting_statuses_is_refused() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    force_status(&market, project.id, ProjectStatus::InitialPaymentPending).await;

    let err = market
        .quotes
        .submit_quote(project.id, money("2400"), None, &admin())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        LifecycleError::Core(CoreError::InvalidProjectStatusForQuote {
            status: "initial_payment_pending",
            ..
        })
    );

    let err = market
        .quotes
        .submit_quote(project.id, money("0"), None, &admin())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn clients_cannot_submit_platform_quotes() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::ClientManaged).await;
    let err = market
        .quotes
        .submit_quote(project.id, money("2400"), None, &client())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Forbidden(_)));
}

#[tokio::test]
async fn owning_client_self_prices_in_progress_work() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::ClientManaged).await;
    force_status(&market, project.id, ProjectStatus::InProgress).await;

    let err = market
        .quotes
        .submit_quote(project.id, money("900"), None, &Actor::client(OTHER_CLIENT_ID))
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Forbidden(_)));

    let saved = market
        .quotes
        .submit_quote(project.id, money("900"), Some("Phase 2".into()), &client())
        .await
        .unwrap();
    assert_eq!(saved.status, ProjectStatus::QuoteSubmitted);
    assert_eq!(saved.quoted_amount, Some(money("900")));

    let saved = market
        .quotes
        .update_quote(project.id, money("950"), None, &client())
        .await
        .unwrap();
    assert_eq!(saved.quoted_amount, Some(money("950")));
    assert_eq!(saved.quote_notes.as_deref(), Some("Phase 2"));
}

#[tokio::test]
async fn in_progress_platform_project_is_not_self_priced() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    force_status(&market, project.id, ProjectStatus::InProgress).await;
    let err = market
        .quotes
        .submit_quote(project.id, money("900"), None, &admin())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::InvalidProjectStatusForQuote { .. }));
}

#[tokio::test]
async fn update_replaces_notes_only_when_given() {
    let (market, events) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    let submitted = market
        .quotes
        .submit_quote(project.id, money("2400"), Some("Initial".into()), &admin())
        .await
        .unwrap();

    let updated = market
        .quotes
        .update_quote(project.id, money("2350"), None, &admin())
        .await
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::QuoteSubmitted);
    assert_eq!(updated.quoted_amount, Some(money("2350")));
    assert_eq!(updated.quote_notes.as_deref(), Some("Initial"));
    assert_eq!(updated.quote_submitted_at, submitted.quote_submitted_at);

    let updated = market
        .quotes
        .update_quote(project.id, money("2300"), Some("Revised".into()), &admin())
        .await
        .unwrap();
    assert_eq!(updated.quote_notes.as_deref(), Some("Revised"));
    assert!(events.event_types().ends_with(&["quote.updated".to_string(), "quote.updated".to_string()]));
}

#[tokio::test]
async fn update_requires_a_submitted_quote_and_permission() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;

    let err = market
        .quotes
        .update_quote(project.id, money("2300"), None, &admin())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::InvalidProjectStatusForQuote { .. }));

    market
        .quotes
        .submit_quote(project.id, money("2400"), None, &admin())
        .await
        .unwrap();
    let err = market
        .quotes
        .update_quote(project.id, money("2300"), None, &client())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Forbidden(_)));
}

#[tokio::test]
async fn owner_answers_quote_regardless_of_management_type() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::PlatformManaged).await;
    market
        .quotes
        .submit_quote(project.id, money("2400"), None, &admin())
        .await
        .unwrap();

    let err = market
        .quotes
        .accept_quote(project.id, &Actor::client(OTHER_CLIENT_ID))
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::Forbidden(_)));

    let accepted = market.quotes.accept_quote(project.id, &client()).await.unwrap();
    assert_eq!(accepted.status, ProjectStatus::QuoteAccepted);
    assert_eq!(accepted.quoted_amount, Some(money("2400")));
    assert!(accepted.quote_accepted_at.is_some());

    let err = market.quotes.accept_quote(project.id, &client()).await.unwrap_err();
    assert_matches!(
        err,
        LifecycleError::Core(CoreError::InvalidProjectStatusForQuote { status: "quote_accepted", .. })
    );
}

#[tokio::test]
async fn answering_without_a_submitted_quote_is_refused() {
    let (market, _) = harness();
    let project = create_project(&market, ManagementType::ClientManaged).await;
    let err = market
        .quotes
        .reject_quote(project.id, Some("no".into()), &client())
        .await
        .unwrap_err();
    assert_matches!(err, LifecycleError::Core(CoreError::InvalidProjectStatusForQuote { .. }));
}
