/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::mock_store::{task_assigned, transfer_pending, MockStore};
use notification_client::{
    common::types::{NotificationId, TransferId},
    outbound::types::TransferDecision,
    tools::error::AppError,
};
use std::time::Duration;

#[tokio::test]
async fn concurrent_acquire_has_exactly_one_winner() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.register_actor("a", "Ana");
    store.register_actor("b", "Bruno");
    store.add(task_assigned("n-1"));

    let client_a = store.client_for("a");
    let client_b = store.client_for("b");
    let id = NotificationId("n-1".to_string());

    let results =
        futures::future::join_all([client_a.claim(&id), client_b.claim(&id)]).await;

    let granted = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(granted, 1, "exactly one of a concurrent pair may win");

    let winner_name = match store.claimant_of("n-1").as_deref() {
        Some("a") => "Ana",
        Some("b") => "Bruno",
        other => panic!("store has no claimant after a granted claim: {other:?}"),
    };
    let loser = results.into_iter().find(|result| result.is_err()).unwrap();
    match loser {
        Err(AppError::AlreadyClaimed { holder }) => assert_eq!(holder, winner_name),
        other => panic!("loser should see AlreadyClaimed, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn claim_denial_wire_shape_names_the_holder() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.register_actor("a", "Ana");
    store.add(task_assigned("n-1"));
    store
        .client_for("a")
        .claim(&NotificationId("n-1".to_string()))
        .await?;

    let resp: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/claim", store.base_url))
        .json(&serde_json::json!({ "notification_id": "n-1", "actor_id": "b" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(resp["error"], "claimed_by");
    assert_eq!(resp["holder"], "Ana");
    Ok(())
}

#[tokio::test]
async fn loser_is_told_who_holds_the_claim() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.register_actor("a", "Ana");
    store.add(task_assigned("n-1"));
    let id = NotificationId("n-1".to_string());

    store.client_for("a").claim(&id).await?;

    match store.client_for("b").claim(&id).await {
        Err(AppError::AlreadyClaimed { holder }) => assert_eq!(holder, "Ana"),
        other => panic!("expected AlreadyClaimed, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn release_is_idempotent() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.add(task_assigned("n-1"));
    let id = NotificationId("n-1".to_string());

    let client_a = store.client_for("a");
    client_a.claim(&id).await?;

    for _ in 0..3 {
        client_a.release(&id).await?;
    }

    assert_eq!(store.claimant_of("n-1"), None);
    assert_eq!(
        store.release_transitions(),
        1,
        "n releases after one acquire must unclaim exactly once"
    );

    // The notification is free again for the next actor.
    store.client_for("b").claim(&id).await?;
    assert_eq!(store.claimant_of("n-1").as_deref(), Some("b"));

    Ok(())
}

#[tokio::test]
async fn release_without_a_claim_is_a_quiet_no_op() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.add(task_assigned("n-1"));

    store
        .client_for("a")
        .release(&NotificationId("n-1".to_string()))
        .await?;

    assert_eq!(store.release_transitions(), 0);
    Ok(())
}

#[tokio::test]
async fn best_effort_departure_release_frees_the_claim() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.add(task_assigned("n-1"));
    let id = NotificationId("n-1".to_string());

    let client_a = store.client_for("a");
    client_a.claim(&id).await?;
    assert_eq!(store.claimant_of("n-1").as_deref(), Some("a"));

    // The departing client fires and forgets; the send lands shortly after.
    client_a.spawn_release_best_effort(id.clone());

    let mut freed = false;
    for _ in 0..50 {
        if store.claimant_of("n-1").is_none() {
            freed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(freed, "best-effort release never reached the store");

    store.client_for("b").claim(&id).await?;
    assert_eq!(store.claimant_of("n-1").as_deref(), Some("b"));

    Ok(())
}

#[tokio::test]
async fn second_decision_on_a_transfer_is_stale() -> anyhow::Result<()> {
    let store = MockStore::spawn().await?;
    store.add(transfer_pending("n-5", "t-5"));
    let transfer_id = TransferId("t-5".to_string());

    store
        .client_for("a")
        .decide_transfer(&transfer_id, TransferDecision::Accept)
        .await?;
    assert!(store.transfer_resolved("t-5"));

    match store
        .client_for("b")
        .decide_transfer(&transfer_id, TransferDecision::Reject)
        .await
    {
        Err(AppError::StaleDecision) => {}
        other => panic!("expected StaleDecision, got {other:?}"),
    }

    Ok(())
}
