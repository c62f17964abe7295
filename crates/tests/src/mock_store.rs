/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! In-process Notification Store implementing the contract the client
//! consumes: snapshot listing, atomic check-and-set claims, idempotent
//! release, dismissal, and single-shot transfer decisions.

use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::Utc;
use notification_client::common::types::{
    ActorId, Claimant, Notification, NotificationId, NotificationKind, NotificationState,
    PayloadData, Priority, TransferId,
};
use notification_client::outbound::store::StoreClient;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct StoreState {
    notifications: Vec<Notification>,
    actor_names: HashMap<String, String>,
    resolved_transfers: HashSet<String>,
    release_transitions: usize,
}

#[derive(Default)]
pub struct MockState {
    inner: Mutex<StoreState>,
}

pub struct MockStore {
    pub base_url: String,
    state: web::Data<MockState>,
    _handle: actix_web::dev::ServerHandle,
}

impl MockStore {
    pub async fn spawn() -> anyhow::Result<MockStore> {
        let state = web::Data::new(MockState::default());
        let state_for_server = state.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state_for_server.clone())
                .route("/pending", web::post().to(pending))
                .route("/claim", web::post().to(claim))
                .route("/release", web::post().to(release))
                .route("/acknowledge", web::post().to(acknowledge))
                .route("/responded", web::post().to(responded))
                .route("/transfer/decide", web::post().to(decide_transfer))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))?;

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        tokio::spawn(server);

        Ok(MockStore {
            base_url: format!("http://{addr}"),
            state,
            _handle: handle,
        })
    }

    pub fn client_for(&self, actor_id: &str) -> StoreClient {
        StoreClient::new(
            Url::parse(&self.base_url).expect("mock base url"),
            "test-api-key".to_string(),
            ActorId(actor_id.to_string()),
        )
    }

    pub fn register_actor(&self, actor_id: &str, name: &str) {
        let mut state = self.state.inner.lock().unwrap();
        state
            .actor_names
            .insert(actor_id.to_string(), name.to_string());
    }

    pub fn add(&self, notification: Notification) {
        let mut state = self.state.inner.lock().unwrap();
        state.notifications.push(notification);
    }

    pub fn claimant_of(&self, notification_id: &str) -> Option<String> {
        let state = self.state.inner.lock().unwrap();
        state
            .notifications
            .iter()
            .find(|n| n.id.as_str() == notification_id)
            .and_then(|n| n.claimant.as_ref().map(|c| c.id.as_str().to_string()))
    }

    pub fn pending_count(&self) -> usize {
        self.state.inner.lock().unwrap().notifications.len()
    }

    /// Claimant-cleared transitions; releasing an unclaimed notification
    /// does not count.
    pub fn release_transitions(&self) -> usize {
        self.state.inner.lock().unwrap().release_transitions
    }

    pub fn pre_resolve_transfer(&self, transfer_id: &str) {
        let mut state = self.state.inner.lock().unwrap();
        state.resolved_transfers.insert(transfer_id.to_string());
    }

    pub fn transfer_resolved(&self, transfer_id: &str) -> bool {
        self.state
            .inner
            .lock()
            .unwrap()
            .resolved_transfers
            .contains(transfer_id)
    }
}

#[derive(Deserialize)]
struct NotificationActorBody {
    notification_id: String,
    actor_id: String,
}

#[derive(Deserialize)]
struct DecideBody {
    transfer_id: String,
    #[allow(dead_code)]
    actor_id: String,
    #[allow(dead_code)]
    decision: String,
}

async fn pending(state: web::Data<MockState>) -> HttpResponse {
    let state = state.inner.lock().unwrap();
    HttpResponse::Ok().json(json!({ "notifications": state.notifications }))
}

async fn claim(
    state: web::Data<MockState>,
    body: web::Json<NotificationActorBody>,
) -> HttpResponse {
    let mut guard = state.inner.lock().unwrap();
    let state = &mut *guard;
    let name = state
        .actor_names
        .get(&body.actor_id)
        .cloned()
        .unwrap_or_else(|| body.actor_id.clone());

    match state
        .notifications
        .iter_mut()
        .find(|n| n.id.as_str() == body.notification_id)
    {
        None => HttpResponse::NotFound().json(json!({ "error": "not_found" })),
        Some(notification) => match &notification.claimant {
            Some(claimant) if claimant.id.as_str() != body.actor_id => {
                HttpResponse::Ok().json(json!({ "error": "claimed_by", "holder": claimant.name }))
            }
            _ => {
                notification.claimant = Some(Claimant {
                    id: ActorId(body.actor_id.clone()),
                    name,
                });
                notification.state = NotificationState::InProgress;
                HttpResponse::Ok().json(json!({ "ok": true }))
            }
        },
    }
}

async fn release(
    state: web::Data<MockState>,
    body: web::Json<NotificationActorBody>,
) -> HttpResponse {
    let mut guard = state.inner.lock().unwrap();
    let state = &mut *guard;

    if let Some(notification) = state
        .notifications
        .iter_mut()
        .find(|n| n.id.as_str() == body.notification_id)
    {
        let held_by_actor = notification
            .claimant
            .as_ref()
            .map(|c| c.id.as_str() == body.actor_id)
            .unwrap_or(false);
        if held_by_actor {
            notification.claimant = None;
            notification.state = NotificationState::Pending;
            state.release_transitions += 1;
        }
    }

    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn acknowledge(
    state: web::Data<MockState>,
    body: web::Json<NotificationActorBody>,
) -> HttpResponse {
    let mut state = state.inner.lock().unwrap();
    state
        .notifications
        .retain(|n| n.id.as_str() != body.notification_id);
    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn responded(
    state: web::Data<MockState>,
    body: web::Json<NotificationActorBody>,
) -> HttpResponse {
    let mut state = state.inner.lock().unwrap();
    state
        .notifications
        .retain(|n| n.id.as_str() != body.notification_id);
    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn decide_transfer(state: web::Data<MockState>, body: web::Json<DecideBody>) -> HttpResponse {
    let mut guard = state.inner.lock().unwrap();
    let state = &mut *guard;

    if !state.resolved_transfers.insert(body.transfer_id.clone()) {
        return HttpResponse::Conflict().json(json!({ "error": "already_resolved" }));
    }

    state
        .notifications
        .retain(|n| n.payload.transfer_id.as_ref().map(|t| t.as_str()) != Some(body.transfer_id.as_str()));
    HttpResponse::Ok().json(json!({ "ok": true }))
}

pub fn task_assigned(id: &str) -> Notification {
    Notification {
        id: NotificationId(id.to_string()),
        kind: NotificationKind::TaskAssigned,
        state: NotificationState::Pending,
        priority: Priority::Medium,
        title: format!("Task {id}"),
        body: "A task awaits a response".to_string(),
        claimant: None,
        source: None,
        payload: PayloadData {
            case_id: Some("case-7".to_string()),
            case_code: Some("C-0007".to_string()),
            transfer_id: None,
            urgency: None,
        },
        action_url: None,
        created_at: Utc::now(),
    }
}

/// A resolved event whose stored state lags behind: the client must present
/// it as completed anyway.
pub fn task_completed_lagging_state(id: &str) -> Notification {
    Notification {
        state: NotificationState::Pending,
        kind: NotificationKind::TaskCompleted,
        ..task_assigned(id)
    }
}

pub fn transfer_pending(id: &str, transfer_id: &str) -> Notification {
    Notification {
        id: NotificationId(id.to_string()),
        kind: NotificationKind::TransferPending,
        state: NotificationState::Pending,
        priority: Priority::High,
        title: format!("Transfer {transfer_id}"),
        body: "A case transfer awaits a decision".to_string(),
        claimant: None,
        source: None,
        payload: PayloadData {
            case_id: Some("case-9".to_string()),
            case_code: Some("C-0009".to_string()),
            transfer_id: Some(TransferId(transfer_id.to_string())),
            urgency: Some(3),
        },
        action_url: None,
        created_at: Utc::now(),
    }
}
