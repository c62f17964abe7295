/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::Notification,
    outbound::store::StoreClient,
    tools::{
        error::AppError,
        prometheus::{FAILED_POLL_CYCLES, POLL_CYCLES},
    },
};
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fixed-interval snapshot poll driver. No backoff: volume is actor-scoped
/// and low. Stopping is the session's concern: dropping the poller with
/// the session cancels all future ticks, and the stopped session discards
/// whatever an in-flight fetch returns.
pub struct Poller {
    period: Duration,
    timer: Interval,
    paused: bool,
}

impl Poller {
    /// The first tick fires immediately, not one interval in.
    pub fn start(period: Duration) -> Poller {
        Poller {
            period,
            timer: fresh_timer(Instant::now(), period),
            paused: false,
        }
    }

    /// Resolves at the next tick. While paused it never resolves; intents
    /// and shutdown keep the session loop live.
    pub async fn tick(&mut self) {
        if self.paused {
            std::future::pending::<()>().await;
        }
        self.timer.tick().await;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// The next fetch lands one full period after resuming.
    pub fn resume(&mut self) {
        self.paused = false;
        self.timer = fresh_timer(Instant::now() + self.period, self.period);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

fn fresh_timer(start: Instant, period: Duration) -> Interval {
    let mut timer = interval_at(start, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// One full-refresh fetch: the complete pending snapshot for the actor,
/// replacing the working set wholesale. The caller logs and swallows
/// transport failures; the next tick retries.
pub async fn fetch_once(store: &StoreClient) -> Result<Vec<Notification>, AppError> {
    POLL_CYCLES.inc();
    store.list_pending().await.map_err(|err| {
        FAILED_POLL_CYCLES.inc();
        err
    })
}
