/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{ActorId, Notification};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Stable file-name material for per-actor state. Actor ids may contain
/// path separators or other characters unfit for a file name.
pub fn hash_actor_id(ActorId(actor_id): &ActorId) -> String {
    sha256::digest(actor_id.as_str())
}

pub fn abs_diff_utc_as_sec(old: DateTime<Utc>, new: DateTime<Utc>) -> u64 {
    new.signed_duration_since(old).num_seconds().abs_diff(0)
}

/// Presentation order: priority first, newest within the same priority.
pub fn presentation_order(a: &Notification, b: &Notification) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.created_at.cmp(&a.created_at))
}
