/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::{ActorId, Notification, NotificationId, TransferId};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Serialize, Debug)]
pub struct PendingRequest {
    pub actor_id: ActorId,
}

#[derive(Deserialize, Debug)]
pub struct PendingResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Serialize, Debug)]
pub struct ClaimRequest {
    pub notification_id: NotificationId,
    pub actor_id: ActorId,
}

#[derive(Deserialize, Debug)]
pub struct ApiSuccess {
    pub ok: bool,
}

/// The store answers a claim request with `{ok}` or with the holder of the
/// existing claim; both arrive with a success status.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ClaimOutcome {
    Granted(ApiSuccess),
    Denied { error: String, holder: String },
}

#[derive(Serialize, Debug)]
pub struct ReleaseRequest {
    pub notification_id: NotificationId,
    pub actor_id: ActorId,
}

#[derive(Serialize, Debug)]
pub struct AcknowledgeRequest {
    pub notification_id: NotificationId,
    pub actor_id: ActorId,
}

#[derive(Serialize, Debug)]
pub struct RespondedRequest {
    pub notification_id: NotificationId,
    pub actor_id: ActorId,
}

#[derive(Serialize, Display, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransferDecision {
    Accept,
    Reject,
}

#[derive(Serialize, Debug)]
pub struct DecideTransferRequest {
    pub transfer_id: TransferId,
    pub actor_id: ActorId,
    pub decision: TransferDecision,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum DecideOutcome {
    Done(ApiSuccess),
    Failed { error: String },
}
