/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use crate::{
    common::types::{ActorId, NotificationId},
    outbound::store::StoreClient,
    session::SessionConfig,
    tools::logger::LoggerConfig,
};
use reqwest::Url;
use serde::Deserialize;
use std::{path::PathBuf, sync::Arc, time::Duration};
use uuid::Uuid;

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_server_port: u16,
    pub actor_id: String,
    pub poll_interval_seconds: u64,
    pub seen_store_path: String,
    pub responding_to: Option<String>,
    pub store_cfg: StoreConfig,
    pub logger_cfg: LoggerConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub actor: ActorId,
    pub instance_id: Uuid,
    pub poll_interval: Duration,
    pub seen_store_dir: PathBuf,
    pub responding_to: Option<NotificationId>,
    pub http_server_port: u16,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> AppState {
        let actor = ActorId(app_config.actor_id);
        let store = Arc::new(StoreClient::new(
            Url::parse(app_config.store_cfg.base_url.as_str())
                .expect("Failed to parse store base_url."),
            app_config.store_cfg.api_key,
            actor.clone(),
        ));

        AppState {
            store,
            actor,
            instance_id: Uuid::new_v4(),
            poll_interval: Duration::from_secs(app_config.poll_interval_seconds),
            seen_store_dir: PathBuf::from(app_config.seen_store_path),
            responding_to: app_config.responding_to.map(NotificationId),
            http_server_port: app_config.http_server_port,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            actor: self.actor.clone(),
            poll_interval: self.poll_interval,
            seen_store_dir: self.seen_store_dir.clone(),
            responding_to: self.responding_to.clone(),
        }
    }
}
