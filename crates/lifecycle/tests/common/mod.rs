//! Shared helpers for lifecycle integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bidwork_core::project::{ManagementType, ProjectStatus};
use bidwork_core::roles::Actor;
use bidwork_core::types::{DbId, Money};
use bidwork_db::models::bid::AcceptedBidOutcome;
use bidwork_db::models::project::Project;
use bidwork_db::models::specialist::CreateSpecialist;
use bidwork_events::PlatformEvent;
use bidwork_lifecycle::{AcceptBid, BidRequestOutcome, Marketplace, Notifier};

pub const ADMIN_ID: DbId = 1;
pub const CLIENT_ID: DbId = 500;
pub const OTHER_CLIENT_ID: DbId = 501;

pub fn admin() -> Actor {
    Actor::admin(ADMIN_ID)
}

pub fn client() -> Actor {
    Actor::client(CLIENT_ID)
}

pub fn money(s: &str) -> Money {
    s.parse().expect("valid decimal literal")
}

/// Notifier that keeps every event for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<PlatformEvent>>,
}

impl RecordingNotifier {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: PlatformEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A marketplace over a fresh memory store plus its recorded events.
pub fn harness() -> (Arc<Marketplace>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let market = Arc::new(Marketplace::in_memory(notifier.clone()));
    (market, notifier)
}

pub async fn seed_specialist(market: &Marketplace, id: DbId, name: &str, profession: Option<&str>) {
    market
        .store()
        .upsert_specialist(CreateSpecialist {
            id,
            display_name: name.to_string(),
            avatar_url: Some(format!("https://cdn.example/avatars/{id}.png")),
            profession: profession.map(str::to_string),
        })
        .await
        .unwrap();
}

pub async fn create_project(market: &Marketplace, management_type: ManagementType) -> Project {
    market
        .projects
        .create_project(
            CLIENT_ID,
            "Warehouse retrofit".into(),
            Some("Seismic upgrade of a 1970s warehouse".into()),
            management_type,
        )
        .await
        .unwrap()
}

/// Write a status directly through the store, bypassing the transition
/// table. Statuses that carry a quote get a quoted amount.
pub async fn force_status(market: &Marketplace, project_id: DbId, status: ProjectStatus) -> Project {
    let store = market.store();
    let mut project = store.load_project(project_id).await.unwrap().unwrap();
    let version = project.version;
    project.status = status;
    project.quoted_amount = if status.carries_quote() {
        Some(money("2400"))
    } else {
        None
    };
    store.save_project(&project, version).await.unwrap()
}

/// Invite a specialist and record their proposal. Returns the response id.
pub async fn responded_bid(
    market: &Marketplace,
    project_id: DbId,
    specialist_id: DbId,
    proposed_price: &str,
) -> DbId {
    let outcomes = market
        .bids
        .send_bids(project_id, &[specialist_id], "Structural review".into(), &admin())
        .await
        .unwrap();
    let request_id = match &outcomes[0] {
        BidRequestOutcome::Sent { bid_request, .. } => bid_request.id,
        other => panic!("bid request not sent: {other:?}"),
    };
    market
        .bids
        .submit_response(
            request_id,
            money(proposed_price),
            14,
            "Available to start next week".into(),
            &Actor::specialist(specialist_id),
        )
        .await
        .unwrap()
        .id
}

pub fn accept_with_markup(markup: &str) -> AcceptBid {
    AcceptBid {
        markup_percentage: money(markup),
        admin_comment: None,
        role: None,
    }
}

/// Run the full bid flow and accept at `markup`.
pub async fn accepted_bid(
    market: &Marketplace,
    project_id: DbId,
    specialist_id: DbId,
    proposed_price: &str,
    markup: &str,
) -> AcceptedBidOutcome {
    let response_id = responded_bid(market, project_id, specialist_id, proposed_price).await;
    market
        .bids
        .accept_response(response_id, accept_with_markup(markup), &admin())
        .await
        .unwrap()
}
