/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug, Deserialize, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::TRACE => "trace",
            LogLevel::DEBUG => "debug",
            LogLevel::INFO => "info",
            LogLevel::WARN => "warn",
            LogLevel::ERROR => "error",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
}

const LOG_DIR: &str = "./logs";
const LOG_FILE_PREFIX: &str = "notification-client.log";

/// Installs the global tracing subscriber: env-filtered, bunyan JSON to
/// stdout, optionally mirrored to a daily-rotated file. The returned guards
/// must stay alive for the lifetime of the process or buffered log lines
/// are lost on shutdown.
pub fn setup_tracing(logger_cfg: LoggerConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logger_cfg.level.as_str()));

    LogTracer::init().expect("Failed to set log tracer");

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout_layer =
        BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").to_string(), stdout_writer);

    let file_layer = if logger_cfg.log_to_file {
        let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);
        Some(BunyanFormattingLayer::new(
            env!("CARGO_PKG_NAME").to_string(),
            file_writer,
        ))
    } else {
        None
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(stdout_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global tracing subscriber");

    guards
}
