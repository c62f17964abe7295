/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{NotificationKind, NotificationState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
pub enum Action {
    Respond,
    Decline,
    Accept,
    Reject,
    View,
    Acknowledge,
}

/// Derived display state of one notification card. `locked` marks the
/// claimed-by-another-actor case: no actions, disabled affordance only.
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
pub struct Disposition {
    pub label: &'static str,
    pub icon: &'static str,
    pub actions: &'static [Action],
    pub locked: bool,
}

const RESOLVE_ACTIONS: &[Action] = &[Action::View, Action::Acknowledge];
const RESPOND_ACTIONS: &[Action] = &[Action::Respond, Action::Decline];
const DECIDE_ACTIONS: &[Action] = &[Action::Accept, Action::Reject, Action::View];
const VIEW_ONLY: &[Action] = &[Action::View];
const NO_ACTIONS: &[Action] = &[];

const fn resolved(label: &'static str, icon: &'static str) -> Disposition {
    Disposition {
        label,
        icon,
        actions: RESOLVE_ACTIONS,
        locked: false,
    }
}

const fn locked() -> Disposition {
    Disposition {
        label: "Claimed",
        icon: "lock",
        actions: NO_ACTIONS,
        locked: true,
    }
}

/// Single source of truth for label, icon and enabled action set, keyed by
/// `(kind, state)` with the claimant gate applied on top.
///
/// Kind dominates state: an inherently resolved event keeps its resolved
/// presentation even when the stored state lags behind, so nothing resolved
/// can be acted on twice. Transfer decisions are atomic single-shot calls
/// at the store and therefore bypass the claim gate entirely.
pub fn disposition(
    kind: NotificationKind,
    state: NotificationState,
    claimed_by_other: bool,
) -> Disposition {
    match kind {
        NotificationKind::TaskCompleted => resolved("Completed", "check-circle"),
        NotificationKind::TaskCancelled => resolved("Cancelled", "times-circle"),
        NotificationKind::TaskExpired => resolved("Expired", "clock"),
        NotificationKind::TransferAccepted => resolved("Accepted", "check-circle"),
        NotificationKind::TransferRejected => resolved("Rejected", "times-circle"),
        NotificationKind::CaseCreated => resolved("New Case", "folder-open"),
        NotificationKind::TransferPending => Disposition {
            label: "Transfer Pending",
            icon: "exchange",
            actions: DECIDE_ACTIONS,
            locked: false,
        },
        NotificationKind::TaskAssigned => match state {
            NotificationState::Responded => resolved("Responded", "check-circle"),
            NotificationState::Cancelled => resolved("Cancelled", "times-circle"),
            NotificationState::Expired => resolved("Expired", "clock"),
            NotificationState::Pending | NotificationState::InProgress => {
                if claimed_by_other {
                    locked()
                } else {
                    Disposition {
                        label: match state {
                            NotificationState::InProgress => "In Progress",
                            _ => "Pending",
                        },
                        icon: "check-square",
                        actions: RESPOND_ACTIONS,
                        locked: false,
                    }
                }
            }
        },
        // Unknown kinds say nothing about resolution; fall back to state and
        // never hand out a respond affordance for semantics we cannot see.
        NotificationKind::Unknown => match state {
            NotificationState::Responded => resolved("Responded", "check-circle"),
            NotificationState::Cancelled => resolved("Cancelled", "times-circle"),
            NotificationState::Expired => resolved("Expired", "clock"),
            NotificationState::Pending | NotificationState::InProgress => Disposition {
                label: "Pending",
                icon: "bell",
                actions: VIEW_ONLY,
                locked: false,
            },
        },
    }
}
