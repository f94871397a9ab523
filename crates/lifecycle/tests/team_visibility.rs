mod common;

use bidwork_core::assignment::ANONYMIZED_DISPLAY_NAME;
use bidwork_core::project::ManagementType;
use bidwork_core::roles::Actor;
use bidwork_lifecycle::Marketplace;
use common::*;

async fn project_with_member(market: &Marketplace, management: ManagementType) -> i64 {
    seed_specialist(market, 42, "Dana Reyes", Some("Structural Engineer")).await;
    let project = create_project(market, management).await;
    accepted_bid(market, project.id, 42, "1000", "20").await;
    project.id
}

#[tokio::test]
async fn platform_managed_team_is_anonymized() {
    let (market, _) = harness();
    let project_id = project_with_member(&market, ManagementType::PlatformManaged).await;

    assert!(market.assignments.compute_anonymization(project_id).await.unwrap());
    let team = market.assignments.team_members(project_id).await.unwrap();
    assert!(team.anonymized);
    assert_eq!(team.members.len(), 1);
    let member = &team.members[0];
    assert_eq!(member.display_name, ANONYMIZED_DISPLAY_NAME);
    assert_eq!(member.specialist_id, None);
    assert_eq!(member.avatar_url, None);
    assert_eq!(member.role, "Structural Engineer");
    assert_eq!(member.profession.as_deref(), Some("Structural Engineer"));
}

#[tokio::test]
async fn client_managed_team_shows_identity() {
    let (market, _) = harness();
    let project_id = project_with_member(&market, ManagementType::ClientManaged).await;

    assert!(!market.assignments.compute_anonymization(project_id).await.unwrap());
    let team = market.assignments.team_members(project_id).await.unwrap();
    assert!(!team.anonymized);
    let member = &team.members[0];
    assert_eq!(member.display_name, "Dana Reyes");
    assert_eq!(member.specialist_id, Some(42));
    assert_eq!(
        member.avatar_url.as_deref(),
        Some("https://cdn.example/avatars/42.png")
    );
}

#[tokio::test]
async fn visibility_follows_management_type_changes() {
    let (market, _) = harness();
    let project_id = project_with_member(&market, ManagementType::PlatformManaged).await;

    market
        .projects
        .set_management_type(project_id, ManagementType::ClientManaged, &client())
        .await
        .unwrap();
    let team = market.assignments.team_members(project_id).await.unwrap();
    assert!(!team.anonymized);
    assert_eq!(team.members[0].display_name, "Dana Reyes");

    market
        .projects
        .set_management_type(project_id, ManagementType::PlatformManaged, &admin())
        .await
        .unwrap();
    let team = market.assignments.team_members(project_id).await.unwrap();
    assert!(team.anonymized);
    assert_eq!(team.members[0].display_name, ANONYMIZED_DISPLAY_NAME);
}

#[tokio::test]
async fn direct_assignment_is_exclusive_per_project() {
    let (market, events) = harness();
    seed_specialist(&market, 42, "Dana Reyes", Some("Structural Engineer")).await;
    let project = create_project(&market, ManagementType::ClientManaged).await;
    let other = create_project(&market, ManagementType::ClientManaged).await;
    events.clear();

    let assignment = market
        .assignments
        .assign(project.id, 42, "Peer reviewer".into(), &admin())
        .await
        .unwrap();
    assert_eq!(assignment.bid_response_id, None);
    assert_eq!(events.event_types(), vec!["specialist.assigned"]);

    let err = market
        .assignments
        .assign(project.id, 42, "Lead".into(), &admin())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_core(),
        Some(bidwork_core::error::CoreError::SpecialistAlreadyAssigned { .. })
    ));

    // The same specialist may still join a different project.
    market
        .assignments
        .assign(other.id, 42, "Lead".into(), &admin())
        .await
        .unwrap();

    let err = market
        .assignments
        .assign(project.id, 42, "Lead".into(), &Actor::specialist(42))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_core(),
        Some(bidwork_core::error::CoreError::Forbidden(_))
    ));
}

#[tokio::test]
async fn team_view_is_identical_for_every_reader() {
    let (market, _) = harness();
    let project_id = project_with_member(&market, ManagementType::PlatformManaged).await;
    let first = market.assignments.team_members(project_id).await.unwrap();
    let second = market.assignments.team_members(project_id).await.unwrap();
    assert_eq!(first.members, second.members);
}
