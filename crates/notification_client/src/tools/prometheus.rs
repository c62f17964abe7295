/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{opts, register_histogram_vec, register_int_counter, HistogramVec, IntCounter};

pub static POLL_CYCLES: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("poll_cycles", "Poll Cycles")
        .expect("Failed to register poll cycles metrics")
});

pub static FAILED_POLL_CYCLES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("failed_poll_cycles", "Failed Poll Cycles")
            .expect("Failed to register failed poll cycles metrics")
    });

pub static PRESENTED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("presented_notifications", "Presented Notifications")
            .expect("Failed to register presented notifications metrics")
    });

pub static SUPPRESSED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("suppressed_notifications", "Suppressed Notifications")
            .expect("Failed to register suppressed notifications metrics")
    });

pub static CLAIMS_ACQUIRED: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("claims_acquired", "Claims Acquired")
        .expect("Failed to register claims acquired metrics")
});

pub static CLAIM_CONFLICTS: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("claim_conflicts", "Claim Conflicts")
        .expect("Failed to register claim conflicts metrics")
});

pub static RELEASED_CLAIMS: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("released_claims", "Released Claims")
        .expect("Failed to register released claims metrics")
});

pub static ACKNOWLEDGED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("acknowledged_notifications", "Acknowledged Notifications")
            .expect("Failed to register acknowledged notifications metrics")
    });

pub static STALE_TRANSFER_DECISIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("stale_transfer_decisions", "Stale Transfer Decisions")
            .expect("Failed to register stale transfer decisions metrics")
    });

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("external_request_duration", "Call external API requests").into(),
            &["method", "host", "service", "status"]
        )
        .expect("Failed to register call external API metrics")
    });

#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Initializes and returns a `PrometheusMetrics` instance configured for the application.
///
/// Registers every counter above and exposes them, together with request
/// metrics, on the `/metrics` endpoint of the health server.
///
/// # Panics
///
/// * If there's a failure initializing metrics, registering metrics to the Prometheus registry, or any other unexpected error during the setup.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .buckets(&[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ])
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(POLL_CYCLES.to_owned()))
        .expect("Failed to register poll cycles");

    prometheus
        .registry
        .register(Box::new(FAILED_POLL_CYCLES.to_owned()))
        .expect("Failed to register failed poll cycles");

    prometheus
        .registry
        .register(Box::new(PRESENTED_NOTIFICATIONS.to_owned()))
        .expect("Failed to register presented notifications");

    prometheus
        .registry
        .register(Box::new(SUPPRESSED_NOTIFICATIONS.to_owned()))
        .expect("Failed to register suppressed notifications");

    prometheus
        .registry
        .register(Box::new(CLAIMS_ACQUIRED.to_owned()))
        .expect("Failed to register claims acquired");

    prometheus
        .registry
        .register(Box::new(CLAIM_CONFLICTS.to_owned()))
        .expect("Failed to register claim conflicts");

    prometheus
        .registry
        .register(Box::new(RELEASED_CLAIMS.to_owned()))
        .expect("Failed to register released claims");

    prometheus
        .registry
        .register(Box::new(ACKNOWLEDGED_NOTIFICATIONS.to_owned()))
        .expect("Failed to register acknowledged notifications");

    prometheus
        .registry
        .register(Box::new(STALE_TRANSFER_DECISIONS.to_owned()))
        .expect("Failed to register stale transfer decisions");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register call external API metrics");

    prometheus
}
