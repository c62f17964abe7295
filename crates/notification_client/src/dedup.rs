/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::{
    types::{ActorId, Notification, NotificationId},
    utils::hash_actor_id,
};
use rustc_hash::FxHashSet;
use std::{
    fs,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Durable per-actor record of notification ids already surfaced as "new".
///
/// The set only grows; an id leaves it through `reset` alone. Every update
/// rewrites the whole set through a temp file + rename so a concurrent
/// reader never observes a partial write. A failed write degrades the store
/// to in-memory-only for the rest of the session instead of failing the
/// poll loop.
pub struct SeenStore {
    path: PathBuf,
    seen: FxHashSet<NotificationId>,
    degraded: bool,
}

impl SeenStore {
    /// Missing file means first use; an unreadable file is logged and
    /// treated as first use rather than blocking the session.
    pub fn load(dir: &Path, actor: &ActorId) -> SeenStore {
        let path = dir.join(format!("seen-{}.json", hash_actor_id(actor)));
        let seen = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<NotificationId>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(err) => {
                    warn!(
                        tag = "[SEEN STORE]",
                        "Discarding unreadable seen record {} : {}",
                        path.display(),
                        err
                    );
                    FxHashSet::default()
                }
            },
            Err(_) => FxHashSet::default(),
        };

        SeenStore {
            path,
            seen,
            degraded: false,
        }
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.seen.contains(id)
    }

    /// Subset of the batch not yet surfaced to this actor. The caller must
    /// `mark_seen` from the same batch before handling any other fetch
    /// result.
    pub fn filter_new<'a>(&self, batch: &'a [Notification]) -> Vec<&'a Notification> {
        batch
            .iter()
            .filter(|notification| !self.seen.contains(&notification.id))
            .collect()
    }

    /// Persists immediately when anything was actually added.
    pub fn mark_seen<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NotificationId>,
    {
        let mut added = false;
        for id in ids {
            added |= self.seen.insert(id);
        }
        if added {
            self.persist();
        }
    }

    /// Sign-out path: empties the record and removes the backing file.
    pub fn reset(&mut self) {
        self.seen.clear();
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(
                    tag = "[SEEN STORE]",
                    "Failed to remove seen record {} : {}",
                    self.path.display(),
                    err
                );
            }
        }
        info!(tag = "[SEEN STORE]", "Seen record reset");
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        if let Err(err) = self.try_persist() {
            self.degraded = true;
            warn!(
                tag = "[SEEN STORE]",
                "Persistence failed, continuing in-memory only : {}", err
            );
        }
    }

    fn try_persist(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let ids: Vec<&NotificationId> = self.seen.iter().collect();
        let raw =
            serde_json::to_string(&ids).map_err(|err| Error::new(ErrorKind::InvalidData, err))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)
    }
}
