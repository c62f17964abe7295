/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::{
    common::types::{ActorId, Notification, NotificationId, TransferId},
    tools::{
        callapi::{call_api, CallApiError},
        error::AppError,
    },
};
use actix_http::StatusCode;
use reqwest::{Method, Url};
use tracing::warn;

/// HTTP client for the Notification Store. Claim arbitration lives entirely
/// at the store; this client only reports the outcome.
#[derive(Clone)]
pub struct StoreClient {
    base_url: Url,
    api_key: String,
    actor: ActorId,
}

impl StoreClient {
    pub fn new(base_url: Url, api_key: String, actor: ActorId) -> Self {
        StoreClient {
            base_url,
            api_key,
            actor,
        }
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().expect("Invalid base URL");
            // A bare-host base URL carries one empty segment; dropping it
            // keeps the joined path free of double slashes.
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("content-type", "application/json"),
            ("api-key", self.api_key.as_str()),
        ]
    }

    /// Full snapshot of the actor's currently pending notifications.
    pub async fn list_pending(&self) -> Result<Vec<Notification>, AppError> {
        let resp: Result<PendingResponse, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["pending"]),
            self.headers(),
            Some(PendingRequest {
                actor_id: self.actor.clone(),
            }),
        )
        .await;

        match resp {
            Ok(resp) => Ok(resp.notifications),
            Err(err) => Err(to_app_error(err)),
        }
    }

    /// Atomic check-and-set at the store; `AlreadyClaimed` is the only
    /// source of truth about contention.
    pub async fn claim(&self, notification_id: &NotificationId) -> Result<(), AppError> {
        let resp: Result<ClaimOutcome, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["claim"]),
            self.headers(),
            Some(ClaimRequest {
                notification_id: notification_id.clone(),
                actor_id: self.actor.clone(),
            }),
        )
        .await;

        match resp {
            Ok(ClaimOutcome::Granted(_)) => Ok(()),
            Ok(ClaimOutcome::Denied { error, holder }) if error == "claimed_by" => {
                Err(AppError::AlreadyClaimed { holder })
            }
            Ok(ClaimOutcome::Denied { error, .. }) => Err(AppError::InternalError(error)),
            Err(err) => Err(to_app_error(err)),
        }
    }

    /// Idempotent at the store: releasing an unclaimed notification is `{ok}`.
    pub async fn release(&self, notification_id: &NotificationId) -> Result<(), AppError> {
        let resp: Result<ApiSuccess, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["release"]),
            self.headers(),
            Some(ReleaseRequest {
                notification_id: notification_id.clone(),
                actor_id: self.actor.clone(),
            }),
        )
        .await;

        match resp {
            Ok(_) => Ok(()),
            Err(err) => Err(to_app_error(err)),
        }
    }

    /// Departure-path release: detached, non-blocking, response discarded.
    /// Delivery is not guaranteed; the store's claim lease timeout is the
    /// authoritative cleanup when this send never arrives.
    pub fn spawn_release_best_effort(&self, notification_id: NotificationId) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(err) = store.release(&notification_id).await {
                warn!(
                    tag = "[BEST EFFORT RELEASE]",
                    "Release of {} not delivered : {}", notification_id, err
                );
            }
        });
    }

    pub async fn acknowledge(&self, notification_id: &NotificationId) -> Result<(), AppError> {
        let resp: Result<ApiSuccess, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["acknowledge"]),
            self.headers(),
            Some(AcknowledgeRequest {
                notification_id: notification_id.clone(),
                actor_id: self.actor.clone(),
            }),
        )
        .await;

        match resp {
            Ok(_) => Ok(()),
            Err(err) => Err(to_app_error(err)),
        }
    }

    pub async fn mark_responded(&self, notification_id: &NotificationId) -> Result<(), AppError> {
        let resp: Result<ApiSuccess, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["responded"]),
            self.headers(),
            Some(RespondedRequest {
                notification_id: notification_id.clone(),
                actor_id: self.actor.clone(),
            }),
        )
        .await;

        match resp {
            Ok(_) => Ok(()),
            Err(err) => Err(to_app_error(err)),
        }
    }

    /// Single irreversible store call. A decision that lost the race to
    /// another actor comes back as `StaleDecision`.
    pub async fn decide_transfer(
        &self,
        transfer_id: &TransferId,
        decision: TransferDecision,
    ) -> Result<(), AppError> {
        let resp: Result<DecideOutcome, CallApiError> = call_api(
            Method::POST,
            &self.endpoint(&["transfer", "decide"]),
            self.headers(),
            Some(DecideTransferRequest {
                transfer_id: transfer_id.clone(),
                actor_id: self.actor.clone(),
                decision,
            }),
        )
        .await;

        match resp {
            Ok(DecideOutcome::Done(_)) => Ok(()),
            Ok(DecideOutcome::Failed { error }) if error == "already_resolved" => {
                Err(AppError::StaleDecision)
            }
            Ok(DecideOutcome::Failed { error }) => Err(AppError::InternalError(error)),
            Err(CallApiError::ExternalAPICallError(resp))
                if resp.status() == StatusCode::CONFLICT =>
            {
                Err(AppError::StaleDecision)
            }
            Err(err) => Err(to_app_error(err)),
        }
    }
}

fn to_app_error(err: CallApiError) -> AppError {
    match err {
        CallApiError::ConnectionError(err) => AppError::TransportError(err),
        CallApiError::ExternalAPICallError(resp) => {
            AppError::TransportError(format!("Unexpected Response Status : {}", resp.status()))
        }
        err => AppError::InternalError(err.to_string()),
    }
}
