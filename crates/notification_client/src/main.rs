/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Result;
use notification_client::{
    environment::{AppConfig, AppState},
    session::spawn_session,
    tools::{logger::setup_tracing, prometheus::prometheus_metrics},
};
use std::{env::var, net::Ipv4Addr};
use tokio::signal::unix::{signal, SignalKind};
use tracing::*;

#[tokio::main]
async fn main() -> Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/notification_client.dhall".to_string());
    let app_config = serde_dhall::from_file(dhall_config_path).parse::<AppConfig>()?;

    let _guard = setup_tracing(app_config.logger_cfg.clone());

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic Occured : {:?}", panic_info);
    }));

    let app_state = AppState::new(app_config);
    info!(
        tag = "[STARTED]",
        "Notification client up for actor {} (instance {})", app_state.actor, app_state.instance_id
    );

    let mut session = spawn_session(app_state.store.clone(), app_state.session_config());

    // Headless presenter: trace every snapshot the session publishes.
    let mut view_rx = session.view.clone();
    tokio::spawn(async move {
        while view_rx.changed().await.is_ok() {
            let snapshot = view_rx.borrow().clone();
            debug!(
                tag = "[VIEW]",
                badge = snapshot.badge_count,
                prompt = snapshot.prompt_open,
                "View model updated"
            );
        }
    });

    // SIGTERM / SIGINT are the departure path: the session releases any
    // active claim before the process goes away.
    let (termination_tx, termination_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        let _ = termination_tx.send(());
    });

    let prometheus = prometheus_metrics();
    let http_server = HttpServer::new(move || {
        App::new().wrap(prometheus.clone()).route(
            "/health",
            web::get()
                .to(|| Box::pin(async { HttpResponse::Ok().body("Notification Client Is Up!") })),
        )
    })
    .bind((Ipv4Addr::UNSPECIFIED, app_state.http_server_port))?
    .run();
    let http_handle = http_server.handle();

    let termination_task = async move {
        let _ = termination_rx.await;
        info!(tag = "[SHUTDOWN]", "Termination requested");
        session.shutdown();
        session.stopped().await;
        http_handle.stop(true).await;
    };

    let (http_result, _) = tokio::join!(http_server, termination_task);
    http_result?;

    Ok(())
}
