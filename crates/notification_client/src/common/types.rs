/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct TransferId(pub String);

impl TransferId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Classification of a notification on the wire. The kind is authoritative
/// over the stored state when deciding whether an item is already resolved:
/// a `TaskCompleted` event is presented as resolved even if the store still
/// reports its state as `Pending`.
#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    TaskAssigned,
    TaskCompleted,
    TaskCancelled,
    TaskExpired,
    TransferPending,
    TransferAccepted,
    TransferRejected,
    CaseCreated,
    /// Wire values introduced after this build. Kept so new server-side
    /// kinds never break deserialization of the whole snapshot.
    #[serde(other)]
    Unknown,
}

impl NotificationKind {
    /// Kinds whose meaning is inherently resolved, whatever `state` says.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NotificationKind::TaskCompleted
                | NotificationKind::TaskCancelled
                | NotificationKind::TaskExpired
                | NotificationKind::TransferAccepted
                | NotificationKind::TransferRejected
                | NotificationKind::CaseCreated
        )
    }

    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            NotificationKind::TransferPending
                | NotificationKind::TransferAccepted
                | NotificationKind::TransferRejected
        )
    }

    pub fn is_task(&self) -> bool {
        matches!(
            self,
            NotificationKind::TaskAssigned
                | NotificationKind::TaskCompleted
                | NotificationKind::TaskCancelled
                | NotificationKind::TaskExpired
        )
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationState {
    Pending,
    InProgress,
    Responded,
    Cancelled,
    Expired,
}

impl NotificationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NotificationState::Responded | NotificationState::Cancelled | NotificationState::Expired
        )
    }
}

/// Presentation ordering only. Never consulted for lock precedence.
#[derive(
    Debug,
    Clone,
    Copy,
    EnumString,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn from_level(level: u8) -> Urgency {
        match level {
            3 => Urgency::High,
            2 => Urgency::Medium,
            _ => Urgency::Low,
        }
    }
}

/// Actor currently holding the exclusive claim on a notification.
#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq)]
pub struct Claimant {
    pub id: ActorId,
    pub name: String,
}

/// Originating actor and sector, display only.
#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct Source {
    #[serde(default)]
    pub actor_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Kind-specific data carried through to the Presenter. The core only reads
/// the transfer id (to address transfer decisions) and the urgency level.
#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct PayloadData {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub case_code: Option<String>,
    #[serde(default)]
    pub transfer_id: Option<TransferId>,
    #[serde(default)]
    pub urgency: Option<u8>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub state: NotificationState,
    pub priority: Priority,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub claimant: Option<Claimant>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub payload: PayloadData,
    #[serde(default)]
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_claimed_by_other(&self, actor: &ActorId) -> bool {
        self.claimant
            .as_ref()
            .map(|claimant| claimant.id != *actor)
            .unwrap_or(false)
    }

    pub fn claim_holder_name(&self) -> Option<&str> {
        self.claimant.as_ref().map(|claimant| claimant.name.as_str())
    }

    pub fn urgency(&self) -> Option<Urgency> {
        self.payload.urgency.map(Urgency::from_level)
    }
}
