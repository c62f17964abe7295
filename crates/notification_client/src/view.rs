/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Read-only snapshot handed to the Presenter. Recomputed wholesale on
//! every state change; the Presenter never mutates it.

use crate::{
    classify::{disposition, Disposition},
    common::{
        types::{ActorId, Notification, NotificationId, NotificationKind, Priority, Source, Urgency},
        utils::presentation_order,
    },
    tools::error::AppError,
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct NotificationCard {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub display: Disposition,
    pub priority: Priority,
    pub urgency: Option<Urgency>,
    pub source: Option<Source>,
    pub case_code: Option<String>,
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counts per family, used for the prompt heading ("2 tasks and 1 transfer").
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Default)]
pub struct CompositionSummary {
    pub tasks: usize,
    pub transfers: usize,
    pub cases: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Dismissible message for the actor. Contention and stale decisions are
/// informational; only user-initiated transport failures rate an error.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn from_error(err: &AppError) -> Notice {
        match err {
            AppError::AlreadyClaimed { holder } => Notice {
                kind: NoticeKind::Info,
                text: format!("{holder} is already responding to this notification"),
            },
            AppError::StaleDecision => Notice {
                kind: NoticeKind::Info,
                text: "This transfer was already resolved by another actor".to_string(),
            },
            AppError::PersistenceError(_) => Notice {
                kind: NoticeKind::Warning,
                text: "Could not save local state; continuing for this session only".to_string(),
            },
            err => Notice {
                kind: NoticeKind::Error,
                text: err.to_string(),
            },
        }
    }
}

/// Where the Presenter should take the actor next, produced by a
/// successfully dispatched intent.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub enum Navigation {
    ActionPage { id: NotificationId, url: String },
    DeclineForm { id: NotificationId },
}

#[derive(Debug, Clone, Serialize, Eq, PartialEq, Default)]
pub struct ViewModel {
    pub cards: Vec<NotificationCard>,
    pub badge_count: usize,
    pub prompt_open: bool,
    pub summary: CompositionSummary,
    pub notice: Option<Notice>,
    pub navigation: Option<Navigation>,
}

pub fn build_view_model(
    actor: &ActorId,
    working_set: &[Notification],
    prompt_open: bool,
    notice: Option<Notice>,
    navigation: Option<Navigation>,
) -> ViewModel {
    let cards: Vec<NotificationCard> = working_set
        .iter()
        .sorted_by(|a, b| presentation_order(a, b))
        .map(|notification| card(actor, notification))
        .collect();

    ViewModel {
        badge_count: cards.len(),
        summary: summarize(working_set),
        cards,
        prompt_open,
        notice,
        navigation,
    }
}

fn card(actor: &ActorId, notification: &Notification) -> NotificationCard {
    let claimed_by_other = notification.is_claimed_by_other(actor);
    NotificationCard {
        id: notification.id.clone(),
        kind: notification.kind,
        title: notification.title.clone(),
        body: notification.body.clone(),
        display: disposition(notification.kind, notification.state, claimed_by_other),
        priority: notification.priority,
        urgency: notification.urgency(),
        source: notification.source.clone(),
        case_code: notification.payload.case_code.clone(),
        claimed_by: claimed_by_other
            .then(|| notification.claim_holder_name().map(str::to_string))
            .flatten(),
        created_at: notification.created_at,
    }
}

fn summarize(working_set: &[Notification]) -> CompositionSummary {
    let mut summary = CompositionSummary::default();
    for notification in working_set {
        if notification.kind.is_task() {
            summary.tasks += 1;
        } else if notification.kind.is_transfer() {
            summary.transfers += 1;
        } else if notification.kind == NotificationKind::CaseCreated {
            summary.cases += 1;
        }
    }
    summary
}
