/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! The single cooperative event loop of the client. One task owns the
//! working set, the dedup record, the claim and the prompt/responding
//! context; the Presenter observes immutable snapshots and feeds structured
//! intents back in.

use crate::{
    claim::ClaimManager,
    common::types::{ActorId, Notification, NotificationId, NotificationKind},
    dedup::SeenStore,
    outbound::{store::StoreClient, types::TransferDecision},
    poller::{fetch_once, Poller},
    tools::{
        error::AppError,
        prometheus::{
            ACKNOWLEDGED_NOTIFICATIONS, PRESENTED_NOTIFICATIONS, STALE_TRANSFER_DECISIONS,
            SUPPRESSED_NOTIFICATIONS,
        },
    },
    view::{build_view_model, Navigation, Notice, NoticeKind, ViewModel},
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::timeout,
};
use tracing::{info, warn};

const DEPARTURE_RELEASE_GRACE: Duration = Duration::from_secs(2);

/// Structured Presenter intents. A single dispatcher maps these onto claim
/// manager and store calls; there is no per-button callback wiring.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Intent {
    /// Claim the notification and navigate into its action flow.
    Respond(NotificationId),
    /// Open the decline flow; requires the claim to be free but takes none.
    Decline(NotificationId),
    /// Dismiss a resolved notification.
    Acknowledge(NotificationId),
    /// Navigate to the related record; resolved items are acknowledged on
    /// the way out, pending transfers never are.
    View(NotificationId),
    /// The confirmation dialog opened; polling pauses until a decision or
    /// cancel so a background refresh cannot invalidate the choice mid-air.
    BeginTransferDecision(NotificationId),
    CancelTransferDecision,
    AcceptTransfer(NotificationId),
    RejectTransfer(NotificationId),
    /// The claimed task's flow finished; resolves the notification.
    MarkResponded(NotificationId),
    ClosePrompt,
    DismissNotice,
    /// Window hidden or backgrounded while engaged; releases the claim so
    /// the rest of the group is not blocked on an abandoned tab.
    Suspend,
    /// Manual immediate fetch.
    Refresh,
    /// Sign-out: empties the durable dedup record.
    ResetSeen,
}

pub struct SessionConfig {
    pub actor: ActorId,
    pub poll_interval: Duration,
    pub seen_store_dir: PathBuf,
    /// Set when the current surface is itself the response to a claimed
    /// notification; snapshots are then recorded silently, never prompted.
    pub responding_to: Option<NotificationId>,
}

pub struct SessionHandle {
    pub view: watch::Receiver<ViewModel>,
    pub intents: mpsc::Sender<Intent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Departure signal. The session releases any active claim (bounded
    /// best-effort) and ends.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    pub async fn stopped(self) {
        let _ = self.task.await;
    }

    pub async fn shutdown_and_wait(mut self) {
        self.shutdown();
        let _ = self.task.await;
    }
}

pub fn spawn_session(store: Arc<StoreClient>, config: SessionConfig) -> SessionHandle {
    let (view_tx, view_rx) = watch::channel(ViewModel::default());
    let (intent_tx, intent_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let session = Session {
        actor: config.actor.clone(),
        seen: SeenStore::load(&config.seen_store_dir, &config.actor),
        claims: ClaimManager::new(store.clone()),
        store,
        working_set: Vec::new(),
        prompt_open: false,
        responding_to: config.responding_to,
        notice: None,
        navigation: None,
        view_tx,
    };
    let poller = Poller::start(config.poll_interval);

    let task = tokio::spawn(session.run(poller, intent_rx, shutdown_rx));

    SessionHandle {
        view: view_rx,
        intents: intent_tx,
        shutdown: Some(shutdown_tx),
        task,
    }
}

struct Session {
    actor: ActorId,
    store: Arc<StoreClient>,
    seen: SeenStore,
    claims: ClaimManager,
    working_set: Vec<Notification>,
    prompt_open: bool,
    responding_to: Option<NotificationId>,
    notice: Option<Notice>,
    navigation: Option<Navigation>,
    view_tx: watch::Sender<ViewModel>,
}

impl Session {
    async fn run(
        mut self,
        mut poller: Poller,
        mut intent_rx: mpsc::Receiver<Intent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        info!(tag = "[SESSION]", "Session started for {}", self.actor);
        self.publish();

        loop {
            tokio::select! {
                _ = poller.tick() => {
                    self.poll_cycle().await;
                    self.publish();
                }
                intent = intent_rx.recv() => {
                    match intent {
                        Some(intent) => self.dispatch(intent, &mut poller).await,
                        None => {
                            info!(tag = "[SESSION]", "Presenter channel closed");
                            break;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!(tag = "[SESSION]", "Shutdown requested");
                    break;
                }
            }
        }

        // Departure: bounded best-effort release; the store-side lease
        // timeout covers the case where this never lands.
        if timeout(DEPARTURE_RELEASE_GRACE, self.claims.release_active())
            .await
            .is_err()
        {
            warn!(tag = "[SESSION]", "Departure release timed out");
        }
        info!(tag = "[SESSION]", "Session ended for {}", self.actor);
    }

    fn publish(&self) {
        let _ = self.view_tx.send(build_view_model(
            &self.actor,
            &self.working_set,
            self.prompt_open,
            self.notice.clone(),
            self.navigation.clone(),
        ));
    }

    async fn poll_cycle(&mut self) {
        match fetch_once(&self.store).await {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            // Passive polling never surfaces transport errors; the next
            // tick retries.
            Err(err) => warn!(tag = "[POLL]", "Fetch failed, retrying next tick : {}", err),
        }
    }

    /// Same-batch rule: the membership check and mark-seen below run
    /// synchronously against one fetched batch, before any other fetch
    /// result is handled by this loop.
    fn apply_snapshot(&mut self, snapshot: Vec<Notification>) {
        let new_count = self.seen.filter_new(&snapshot).len();

        if new_count > 0 {
            if self.responding_to.is_none() && !self.prompt_open {
                self.prompt_open = true;
                PRESENTED_NOTIFICATIONS.inc_by(new_count as u64);
                info!(
                    tag = "[PROMPT]",
                    "Presenting {} new of {} pending",
                    new_count,
                    snapshot.len()
                );
            } else {
                // Already engaged or already prompting: record silently.
                SUPPRESSED_NOTIFICATIONS.inc_by(new_count as u64);
            }
        }

        self.seen
            .mark_seen(snapshot.iter().map(|notification| notification.id.clone()));

        if snapshot.is_empty() {
            self.prompt_open = false;
        }
        self.working_set = snapshot;
    }

    async fn dispatch(&mut self, intent: Intent, poller: &mut Poller) {
        // Navigation is edge-triggered: it belongs to exactly one intent.
        self.navigation = None;

        match intent {
            Intent::Respond(id) => self.respond(id).await,
            Intent::Decline(id) => self.decline(id),
            Intent::Acknowledge(id) => self.acknowledge(id).await,
            Intent::View(id) => self.view(id).await,
            Intent::BeginTransferDecision(id) => {
                info!(tag = "[TRANSFER]", "Decision dialog open for {}", id);
                poller.pause();
            }
            Intent::CancelTransferDecision => poller.resume(),
            Intent::AcceptTransfer(id) => {
                self.decide_transfer(id, TransferDecision::Accept).await;
                poller.resume();
            }
            Intent::RejectTransfer(id) => {
                self.decide_transfer(id, TransferDecision::Reject).await;
                poller.resume();
            }
            Intent::MarkResponded(id) => self.mark_responded(id).await,
            Intent::ClosePrompt => {
                self.prompt_open = false;
                self.claims.release_active().await;
            }
            Intent::DismissNotice => self.notice = None,
            Intent::Suspend => self.suspend(),
            Intent::Refresh => self.poll_cycle().await,
            Intent::ResetSeen => self.seen.reset(),
        }

        self.publish();
    }

    async fn respond(&mut self, id: NotificationId) {
        let Some(notification) = self.find(&id) else {
            self.notice = Some(gone_notice());
            return;
        };

        if notification.is_claimed_by_other(&self.actor) {
            let holder = notification
                .claim_holder_name()
                .unwrap_or("another actor")
                .to_string();
            self.notice = Some(Notice::from_error(&AppError::AlreadyClaimed { holder }));
            return;
        }

        match self.claims.acquire(&id).await {
            Ok(()) => {
                self.prompt_open = false;
                self.navigation = action_target(&notification)
                    .map(|url| Navigation::ActionPage { id: id.clone(), url });
                self.responding_to = Some(id);
            }
            Err(err @ AppError::AlreadyClaimed { .. }) => {
                self.notice = Some(Notice::from_error(&err));
                // Pick up the winner's claimant record right away so the
                // card reads as unavailable.
                self.poll_cycle().await;
            }
            Err(err) => self.notice = Some(Notice::from_error(&err)),
        }
    }

    fn decline(&mut self, id: NotificationId) {
        let Some(notification) = self.find(&id) else {
            self.notice = Some(gone_notice());
            return;
        };

        if notification.is_claimed_by_other(&self.actor) {
            let holder = notification
                .claim_holder_name()
                .unwrap_or("another actor")
                .to_string();
            self.notice = Some(Notice::from_error(&AppError::AlreadyClaimed { holder }));
            return;
        }

        self.prompt_open = false;
        self.navigation = Some(Navigation::DeclineForm { id });
    }

    async fn acknowledge(&mut self, id: NotificationId) {
        match self.store.acknowledge(&id).await {
            Ok(()) => {
                ACKNOWLEDGED_NOTIFICATIONS.inc();
                self.remove_from_working_set(&id);
            }
            // Retryable: the user may simply click again.
            Err(err) => self.notice = Some(Notice::from_error(&err)),
        }
    }

    async fn view(&mut self, id: NotificationId) {
        let Some(notification) = self.find(&id) else {
            return;
        };

        // Resolved items are dismissed on the way out; a pending transfer
        // stays pending; viewing it must not consume the decision.
        if notification.kind != NotificationKind::TransferPending
            && (notification.kind.is_terminal() || notification.state.is_terminal())
        {
            self.acknowledge(id.clone()).await;
        }

        self.navigation =
            action_target(&notification).map(|url| Navigation::ActionPage { id, url });
    }

    async fn decide_transfer(&mut self, id: NotificationId, decision: TransferDecision) {
        let Some(notification) = self.find(&id) else {
            self.notice = Some(gone_notice());
            return;
        };
        let Some(transfer_id) = notification.payload.transfer_id.clone() else {
            self.notice = Some(Notice {
                kind: NoticeKind::Error,
                text: "Transfer details are missing for this notification".to_string(),
            });
            return;
        };

        match self.store.decide_transfer(&transfer_id, decision).await {
            Ok(()) => {
                info!(
                    tag = "[TRANSFER]",
                    "Transfer {} resolved : {}",
                    transfer_id.as_str(),
                    decision
                );
                self.remove_from_working_set(&id);
            }
            Err(AppError::StaleDecision) => {
                STALE_TRANSFER_DECISIONS.inc();
                self.notice = Some(Notice::from_error(&AppError::StaleDecision));
                self.poll_cycle().await;
            }
            Err(err) => self.notice = Some(Notice::from_error(&err)),
        }
    }

    async fn mark_responded(&mut self, id: NotificationId) {
        match self.store.mark_responded(&id).await {
            Ok(()) => {
                // Resolution destroyed the claim store-side.
                self.claims.forget(&id);
                if self.responding_to == Some(id.clone()) {
                    self.responding_to = None;
                }
                self.poll_cycle().await;
            }
            Err(err) => self.notice = Some(Notice::from_error(&err)),
        }
    }

    /// A backgrounded client holding a claim is operationally a departed
    /// one: other actors must not wait on it. Re-engaging goes through
    /// `acquire` again, never through the cached claim.
    fn suspend(&mut self) {
        if self.prompt_open || self.responding_to.is_some() {
            self.claims.release_on_departure();
            self.responding_to = None;
            self.prompt_open = false;
        }
    }

    fn find(&self, id: &NotificationId) -> Option<Notification> {
        self.working_set
            .iter()
            .find(|notification| notification.id == *id)
            .cloned()
    }

    fn remove_from_working_set(&mut self, id: &NotificationId) {
        self.working_set.retain(|notification| notification.id != *id);
        if self.working_set.is_empty() {
            self.prompt_open = false;
        }
    }
}

fn gone_notice() -> Notice {
    Notice {
        kind: NoticeKind::Warning,
        text: "Notification is no longer pending".to_string(),
    }
}

fn action_target(notification: &Notification) -> Option<String> {
    let base = notification.action_url.clone().or_else(|| {
        notification
            .payload
            .case_id
            .as_ref()
            .map(|case_id| format!("/cases/{case_id}"))
    })?;

    Some(if base.contains('?') {
        format!("{base}&notification_id={}", notification.id)
    } else {
        format!("{base}?notification_id={}", notification.id)
    })
}
