//! Prometheus metrics setup and metric definitions

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> PrometheusHandle {
    // Histogram buckets (seconds) for request latency metrics
    let buckets = vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Register metric descriptions so Prometheus output includes HELP/TYPE
/// lines from startup.
pub fn describe_metrics() {
    describe_counter!(
        "perks_enrollment_decisions_total",
        "Enrollment decisions by decision and outcome"
    );
    describe_counter!(
        "perks_cards_issued_total",
        "Loyalty cards issued through enrollment approvals"
    );
    describe_counter!(
        "perks_notifications_created_total",
        "Notification records created"
    );
    describe_counter!(
        "perks_sync_events_total",
        "Sync events published to live sessions"
    );
    describe_histogram!(
        "perks_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
}
