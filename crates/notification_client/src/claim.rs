/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{types::NotificationId, utils::abs_diff_utc_as_sec},
    outbound::store::StoreClient,
    tools::{
        error::AppError,
        prometheus::{CLAIMS_ACQUIRED, CLAIM_CONFLICTS, RELEASED_CLAIMS},
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ActiveClaim {
    pub id: NotificationId,
    pub acquired_at: DateTime<Utc>,
}

/// Owns the locally-active claim and every path that releases it. The store
/// performs the actual arbitration; this side never assumes a claim it once
/// held is still valid after a suspend; re-acquiring is the only check.
pub struct ClaimManager {
    store: Arc<StoreClient>,
    active: Option<ActiveClaim>,
}

impl ClaimManager {
    pub fn new(store: Arc<StoreClient>) -> ClaimManager {
        ClaimManager {
            store,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveClaim> {
        self.active.as_ref()
    }

    /// One remote check-and-set. Contention is not retried here; the caller
    /// surfaces the holder to the user.
    pub async fn acquire(&mut self, id: &NotificationId) -> Result<(), AppError> {
        match self.store.claim(id).await {
            Ok(()) => {
                CLAIMS_ACQUIRED.inc();
                info!(tag = "[CLAIM]", "Acquired claim on {}", id);
                self.active = Some(ActiveClaim {
                    id: id.clone(),
                    acquired_at: Utc::now(),
                });
                Ok(())
            }
            Err(err) => {
                if matches!(err, AppError::AlreadyClaimed { .. }) {
                    CLAIM_CONFLICTS.inc();
                }
                Err(err)
            }
        }
    }

    /// Idempotent. Failures are swallowed: there is nothing actionable for
    /// the client, and the store-side lease timeout is the safety net.
    pub async fn release(&mut self, id: &NotificationId) {
        if let Some(claim) = self.active.take() {
            if claim.id != *id {
                self.active = Some(claim);
            } else {
                info!(
                    tag = "[CLAIM]",
                    "Releasing claim on {} held for {}s",
                    id,
                    abs_diff_utc_as_sec(claim.acquired_at, Utc::now())
                );
            }
        }

        match self.store.release(id).await {
            Ok(()) => RELEASED_CLAIMS.inc(),
            Err(err) => warn!(tag = "[CLAIM]", "Release of {} failed : {}", id, err),
        }
    }

    /// No-op when nothing is held.
    pub async fn release_active(&mut self) {
        if let Some(claim) = self.active.clone() {
            self.release(&claim.id).await;
        }
    }

    /// The claim was destroyed store-side by a resolving action; only the
    /// local record remains to drop.
    pub fn forget(&mut self, id: &NotificationId) {
        if self.active.as_ref().map(|claim| &claim.id == id) == Some(true) {
            self.active = None;
        }
    }

    /// Departure path: the release is handed to the detached best-effort
    /// sender and this client stops tracking the claim immediately.
    pub fn release_on_departure(&mut self) {
        if let Some(claim) = self.active.take() {
            info!(
                tag = "[CLAIM]",
                "Departing with claim on {}; sending best-effort release", claim.id
            );
            RELEASED_CLAIMS.inc();
            self.store.spawn_release_best_effort(claim.id);
        }
    }
}
